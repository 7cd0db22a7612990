//! Progress reporting for the CLI
//!
//! The engine pushes events into a [`provider::ChannelProvider`]; a separate
//! task drains the channel into indicatif bars.

pub mod provider;
pub mod renderer;
pub mod utils;

pub use provider::{ChannelProvider, create_progress_infrastructure};
pub use renderer::{ProgressRenderer, render_progress};
pub use utils::{format_bytes, format_duration};
