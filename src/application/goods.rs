//! Goods service: cache-aside reads, existence-gated writes, audit emission.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::application::repos::{GoodsRepo, RepoError, UpdateGoodParams};
use crate::audit::{AuditPublisher, GoodEvent};
use crate::cache::{CacheError, CacheStore};
use crate::domain::goods::{Good, GoodPage};

/// Fixed lifetime of a cached listing page. Single-good writes never touch
/// the list cache, so this is also the staleness ceiling of `list`.
pub const GOOD_LIST_CACHE_TTL: Duration = Duration::from_secs(60);

/// Cache key for one good, addressed by `(id, project_id)`.
pub fn good_cache_key(id: i64, project_id: i64) -> String {
    format!("good_{id}_{project_id}")
}

/// Cache key for one listing page.
pub fn good_list_cache_key(limit: i64, offset: i64) -> String {
    format!("good_list_limit_{limit}_offset_{offset}")
}

#[derive(Debug, Error)]
pub enum GoodError {
    #[error("good not found")]
    NotFound,
    #[error(transparent)]
    Storage(RepoError),
    #[error(transparent)]
    Cache(CacheError),
    #[error("cache payload codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

impl From<RepoError> for GoodError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => Self::NotFound,
            other => Self::Storage(other),
        }
    }
}

impl From<CacheError> for GoodError {
    fn from(err: CacheError) -> Self {
        Self::Cache(err)
    }
}

/// Orchestrates the store, the cache and the audit publisher.
///
/// The store stays authoritative throughout: the cache is read before it only
/// on `list`, and every mutation invalidates the single-good entries it
/// touched before returning. Audit emission happens after the store call
/// succeeds and can never fail the operation.
pub struct GoodService {
    repo: Arc<dyn GoodsRepo>,
    cache: Arc<dyn CacheStore>,
    audit: AuditPublisher,
}

impl GoodService {
    pub fn new(repo: Arc<dyn GoodsRepo>, cache: Arc<dyn CacheStore>, audit: AuditPublisher) -> Self {
        Self { repo, cache, audit }
    }

    /// Create a good. Nothing is cached for it yet, so there is no
    /// invalidation to perform.
    pub async fn create(&self, project_id: i64, name: &str) -> Result<Good, GoodError> {
        let good = self.repo.create(project_id, name).await?;
        self.audit.publish(GoodEvent::snapshot(&good));
        Ok(good)
    }

    pub async fn update(
        &self,
        id: i64,
        project_id: i64,
        name: &str,
        description: Option<String>,
    ) -> Result<Good, GoodError> {
        if !self.repo.is_exists(id, project_id).await? {
            return Err(GoodError::NotFound);
        }

        let good = self
            .repo
            .update(UpdateGoodParams {
                id,
                project_id,
                name: name.to_string(),
                description,
            })
            .await?;

        self.invalidate(vec![good_cache_key(id, project_id)]).await?;
        self.audit.publish(GoodEvent::snapshot(&good));
        Ok(good)
    }

    pub async fn delete(&self, id: i64, project_id: i64) -> Result<Good, GoodError> {
        let good = self.repo.delete(id, project_id).await?;

        self.invalidate(vec![good_cache_key(id, project_id)]).await?;
        self.audit.publish(GoodEvent::snapshot(&good));
        Ok(good)
    }

    /// Cache-aside listing. A hit skips the store entirely; a miss queries
    /// the store and repopulates the entry for [`GOOD_LIST_CACHE_TTL`].
    pub async fn list(&self, limit: i64, offset: i64) -> Result<GoodPage, GoodError> {
        let key = good_list_cache_key(limit, offset);

        match self.cache.get(&key).await {
            Ok(payload) => {
                let goods: Vec<Good> = serde_json::from_str(&payload)?;
                return Ok(GoodPage::assemble(goods, limit, offset));
            }
            Err(CacheError::Miss) => {}
            Err(err) => return Err(err.into()),
        }

        let goods = self.repo.list(limit, offset).await?;

        let payload = serde_json::to_string(&goods)?;
        self.cache.set(&key, payload, GOOD_LIST_CACHE_TTL).await?;

        Ok(GoodPage::assemble(goods, limit, offset))
    }

    /// Reprioritize the target and cascade over every id-greater row, then
    /// invalidate the single-good entry of each affected row in one call.
    pub async fn change_priority(
        &self,
        id: i64,
        project_id: i64,
        new_priority: i32,
    ) -> Result<Vec<Good>, GoodError> {
        if !self.repo.is_exists(id, project_id).await? {
            return Err(GoodError::NotFound);
        }

        let goods = self.repo.change_priority(id, project_id, new_priority).await?;

        let keys = goods
            .iter()
            .map(|good| good_cache_key(good.id, good.project_id))
            .collect();
        self.invalidate(keys).await?;

        for good in &goods {
            self.audit.publish(GoodEvent::snapshot(good));
        }
        Ok(goods)
    }

    /// Drop cache entries, tolerating keys that were never cached.
    async fn invalidate(&self, keys: Vec<String>) -> Result<(), GoodError> {
        match self.cache.delete(&keys).await {
            Ok(()) | Err(CacheError::Miss) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
