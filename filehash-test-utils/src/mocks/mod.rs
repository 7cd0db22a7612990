//! Mock implementations for testing

mod file_source;
mod provider;

pub use file_source::MockFileSource;
pub use provider::RecordingProvider;
