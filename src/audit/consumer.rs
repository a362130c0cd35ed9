use std::sync::Arc;

use async_trait::async_trait;
use metrics::counter;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

use crate::application::repos::RepoError;

use super::events::GoodEvent;

const METRIC_AUDIT_BATCH_FLUSHED_TOTAL: &str = "merce_audit_batch_flushed_total";
const METRIC_AUDIT_EVENT_DROPPED_TOTAL: &str = "merce_audit_event_dropped_total";

/// Events accumulated before a bulk insert.
pub const AUDIT_BATCH_SIZE: usize = 10;

/// Append-only destination for audit batches.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn insert(&self, events: &[GoodEvent]) -> Result<(), RepoError>;
}

/// Drains the audit channel and bulk-inserts batches of [`AUDIT_BATCH_SIZE`].
///
/// A partial batch is flushed only when the channel closes; there is no
/// flush-on-timer, so the tail of a quiet stream waits for the next record
/// or shutdown. A failed insert drops the batch after logging it.
pub struct AuditConsumer {
    rx: UnboundedReceiver<GoodEvent>,
    sink: Arc<dyn AuditSink>,
}

impl AuditConsumer {
    pub(super) fn new(rx: UnboundedReceiver<GoodEvent>, sink: Arc<dyn AuditSink>) -> Self {
        Self { rx, sink }
    }

    pub async fn run(mut self) {
        let mut batch: Vec<GoodEvent> = Vec::with_capacity(AUDIT_BATCH_SIZE);

        while let Some(event) = self.rx.recv().await {
            batch.push(event);
            if batch.len() >= AUDIT_BATCH_SIZE {
                self.flush(&mut batch).await;
            }
        }

        if !batch.is_empty() {
            self.flush(&mut batch).await;
        }

        info!("audit consumer stopped");
    }

    async fn flush(&self, batch: &mut Vec<GoodEvent>) {
        match self.sink.insert(batch).await {
            Ok(()) => {
                counter!(METRIC_AUDIT_BATCH_FLUSHED_TOTAL).increment(1);
                debug!(events = batch.len(), "flushed audit batch");
            }
            Err(err) => {
                counter!(METRIC_AUDIT_EVENT_DROPPED_TOTAL).increment(batch.len() as u64);
                warn!(
                    error = %err,
                    dropped = batch.len(),
                    "audit batch insert failed, dropping batch"
                );
            }
        }
        batch.clear();
    }
}
