use metrics::counter;
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

use super::events::GoodEvent;

const METRIC_AUDIT_EVENT_DROPPED_TOTAL: &str = "merce_audit_event_dropped_total";

/// Fire-and-forget producer side of the audit pipeline.
///
/// `publish` never blocks and never fails the caller: when the consumer is
/// gone the event is counted, logged and dropped.
#[derive(Clone)]
pub struct AuditPublisher {
    tx: UnboundedSender<GoodEvent>,
}

impl AuditPublisher {
    pub(super) fn new(tx: UnboundedSender<GoodEvent>) -> Self {
        Self { tx }
    }

    pub fn publish(&self, event: GoodEvent) {
        if let Err(err) = self.tx.send(event) {
            counter!(METRIC_AUDIT_EVENT_DROPPED_TOTAL).increment(1);
            warn!(
                good_id = err.0.id,
                project_id = err.0.project_id,
                "audit channel closed, dropping event"
            );
        }
    }
}
