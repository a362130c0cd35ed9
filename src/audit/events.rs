use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::goods::Good;

/// Snapshot of a good after a mutation, stamped at emission time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoodEvent {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub priority: i32,
    pub removed: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub event_time: OffsetDateTime,
}

impl GoodEvent {
    pub fn snapshot(good: &Good) -> Self {
        Self {
            id: good.id,
            project_id: good.project_id,
            name: good.name.clone(),
            description: good.description.clone(),
            priority: good.priority,
            removed: good.removed,
            event_time: OffsetDateTime::now_utc(),
        }
    }
}
