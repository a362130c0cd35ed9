use async_trait::async_trait;
use sqlx::QueryBuilder;

use crate::application::repos::RepoError;
use crate::audit::{AuditSink, GoodEvent};

use super::{PostgresRepositories, map_sqlx_error};

#[async_trait]
impl AuditSink for PostgresRepositories {
    async fn insert(&self, events: &[GoodEvent]) -> Result<(), RepoError> {
        if events.is_empty() {
            return Ok(());
        }

        let mut qb = QueryBuilder::new(
            "INSERT INTO good_audit \
             (good_id, project_id, name, description, priority, removed, event_time) ",
        );
        qb.push_values(events, |mut row, event| {
            row.push_bind(event.id)
                .push_bind(event.project_id)
                .push_bind(event.name.as_str())
                .push_bind(event.description.as_deref())
                .push_bind(event.priority)
                .push_bind(event.removed)
                .push_bind(event.event_time);
        });

        qb.build()
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }
}
