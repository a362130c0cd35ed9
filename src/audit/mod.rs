//! Asynchronous audit trail for goods mutations.
//!
//! Every mutation emits one event per affected row onto an unbounded channel.
//! A consumer task drains the channel, batches events and bulk-inserts them
//! through an [`AuditSink`]. Delivery is best-effort: publish and sink
//! failures are logged, never surfaced to the mutating caller.

mod consumer;
mod events;
mod publisher;

pub use consumer::{AUDIT_BATCH_SIZE, AuditConsumer, AuditSink};
pub use events::GoodEvent;
pub use publisher::AuditPublisher;

use std::sync::Arc;

use tokio::sync::mpsc;

/// Wire a publisher/consumer pair over a fresh unbounded channel.
pub fn pipeline(sink: Arc<dyn AuditSink>) -> (AuditPublisher, AuditConsumer) {
    let (tx, rx) = mpsc::unbounded_channel();
    (AuditPublisher::new(tx), AuditConsumer::new(rx, sink))
}
