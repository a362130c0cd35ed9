//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::goods::Good;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("resource not found")]
    NotFound,
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct UpdateGoodParams {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    /// `None` leaves the stored description untouched; it never clears it.
    pub description: Option<String>,
}

/// Persistence contract for the goods collection.
///
/// Structural writes (`update`, `delete`, `change_priority`) are serialized
/// against each other by the implementation so the reprioritization cascade
/// never observes a half-updated ordering. Readers are not blocked.
#[async_trait]
pub trait GoodsRepo: Send + Sync {
    /// Point lookup by `(id, project_id)`. A missing row is `Ok(false)`,
    /// never an error.
    async fn is_exists(&self, id: i64, project_id: i64) -> Result<bool, RepoError>;

    /// Insert a new good. The store assigns `id`, the default priority
    /// (`max(priority) + 1` over the whole collection), `removed = false`
    /// and `created_at`, and returns the full row.
    async fn create(&self, project_id: i64, name: &str) -> Result<Good, RepoError>;

    async fn update(&self, params: UpdateGoodParams) -> Result<Good, RepoError>;

    /// Soft-delete: sets `removed = true` and returns the updated row.
    /// Deleted rows stay addressable, so a repeat delete succeeds.
    async fn delete(&self, id: i64, project_id: i64) -> Result<Good, RepoError>;

    /// Read-only page ordered by id; `offset` is a row count to skip.
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Good>, RepoError>;

    /// Reassign `new_priority` to the target row and a contiguous increasing
    /// sequence to every row with a larger id, returning the affected rows
    /// ordered by id.
    async fn change_priority(
        &self,
        id: i64,
        project_id: i64,
        new_priority: i32,
    ) -> Result<Vec<Good>, RepoError>;
}
