//! `tokio::sync::mpsc`-backed [`EventEmitter`] (§4.8 Collaborator
//! implementations): lifecycle events are published onto a channel a
//! caller can drain as a stream of [`EncodeEvent`]s.

use async_trait::async_trait;
use encode_engine::EventEmitter;
use encode_types::{EncodeEvent, FinishRecord, JobId};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Publishes lifecycle events onto a bounded channel. The receiving half
/// ([`ChannelEventEmitter::subscribe`]) can only be taken once; later
/// subscribers get `None`.
pub struct ChannelEventEmitter {
    tx: mpsc::Sender<EncodeEvent>,
    rx: std::sync::Mutex<Option<mpsc::Receiver<EncodeEvent>>>,
}

impl ChannelEventEmitter {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        Self {
            tx,
            rx: std::sync::Mutex::new(Some(rx)),
        }
    }

    /// Take the receiving half of the event channel. Callable once.
    pub fn subscribe(&self) -> Option<mpsc::Receiver<EncodeEvent>> {
        self.rx.lock().expect("event emitter mutex poisoned").take()
    }
}

impl Default for ChannelEventEmitter {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl EventEmitter for ChannelEventEmitter {
    async fn emit_add_encode(&self, job_id: JobId) {
        info!(%job_id, "job added to wait queue");
        if let Err(e) = self.tx.send(EncodeEvent::AddEncode { job_id }).await {
            warn!(error = %e, "no subscriber for addEncode event");
        }
    }

    async fn emit_finish_encode(&self, record: FinishRecord) {
        info!(recorded_id = record.recorded_id, mode = %record.mode, "job finished");
        if let Err(e) = self.tx.send(EncodeEvent::FinishEncode { record }).await {
            warn!(error = %e, "no subscriber for finishEncode event");
        }
    }

    async fn emit_error_encode(&self) {
        warn!("job failed");
        if let Err(e) = self.tx.send(EncodeEvent::ErrorEncode).await {
            warn!(error = %e, "no subscriber for errorEncode event");
        }
    }
}
