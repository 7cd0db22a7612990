//! Channel-backed progress provider

use filehash_core::{ProgressProvider, ProgressUpdate};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;

const CHANNEL_CAPACITY: usize = 256;

/// Forwards engine events to a rendering task
///
/// Sending never blocks the worker: when the channel is full the update is
/// dropped. `complete` drops the sender so the renderer loop can end.
pub struct ChannelProvider {
    tx: Mutex<Option<mpsc::Sender<ProgressUpdate>>>,
}

impl ChannelProvider {
    pub fn new(tx: mpsc::Sender<ProgressUpdate>) -> Self {
        Self {
            tx: Mutex::new(Some(tx)),
        }
    }

    fn sender(&self) -> Option<mpsc::Sender<ProgressUpdate>> {
        self.tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ProgressProvider for ChannelProvider {
    fn report(&self, update: ProgressUpdate) {
        if let Some(tx) = self.sender() {
            let _ = tx.try_send(update);
        }
    }

    fn complete(&self) {
        self.tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

/// Create a provider and the receiving end for its renderer
pub fn create_progress_infrastructure()
-> (Arc<dyn ProgressProvider>, mpsc::Receiver<ProgressUpdate>) {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let provider = Arc::new(ChannelProvider::new(tx)) as Arc<dyn ProgressProvider>;
    (provider, rx)
}
