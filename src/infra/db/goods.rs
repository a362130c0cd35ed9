//! Goods repository on Postgres.
//!
//! Structural writes run inside a transaction that takes `LOCK TABLE goods
//! IN SHARE ROW EXCLUSIVE MODE` before touching any row. That serializes
//! update/delete/reprioritize against each other while leaving plain readers
//! unblocked, which is what keeps the priority ordering total under
//! concurrent writers. Transactions roll back on drop; commit happens only
//! on the success path.

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::application::repos::{GoodsRepo, RepoError, UpdateGoodParams};
use crate::domain::goods::Good;

use super::{PostgresRepositories, map_sqlx_error};

const LOCK_GOODS: &str = "LOCK TABLE goods IN SHARE ROW EXCLUSIVE MODE";

const GOOD_COLUMNS: &str = "id, project_id, name, description, priority, removed, created_at";

#[derive(sqlx::FromRow)]
struct GoodRow {
    id: i64,
    project_id: i64,
    name: String,
    description: Option<String>,
    priority: i32,
    removed: bool,
    created_at: OffsetDateTime,
}

impl From<GoodRow> for Good {
    fn from(row: GoodRow) -> Self {
        Self {
            id: row.id,
            project_id: row.project_id,
            name: row.name,
            description: row.description,
            priority: row.priority,
            removed: row.removed,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl GoodsRepo for PostgresRepositories {
    async fn is_exists(&self, id: i64, project_id: i64) -> Result<bool, RepoError> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM goods WHERE id = $1 AND project_id = $2)",
        )
        .bind(id)
        .bind(project_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn create(&self, project_id: i64, name: &str) -> Result<Good, RepoError> {
        let mut tx = self.pool().begin().await.map_err(map_sqlx_error)?;

        // The default priority reads max(priority) over the whole table, so
        // creation takes the same lock as the structural writes: two
        // concurrent creates must not observe the same maximum.
        sqlx::query(LOCK_GOODS)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        let row: GoodRow = sqlx::query_as(&format!(
            "INSERT INTO goods (project_id, name, priority) \
             VALUES ($1, $2, (SELECT COALESCE(MAX(priority), 0) + 1 FROM goods)) \
             RETURNING {GOOD_COLUMNS}"
        ))
        .bind(project_id)
        .bind(name)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(Good::from(row))
    }

    async fn update(&self, params: UpdateGoodParams) -> Result<Good, RepoError> {
        let UpdateGoodParams {
            id,
            project_id,
            name,
            description,
        } = params;

        let mut tx = self.pool().begin().await.map_err(map_sqlx_error)?;

        sqlx::query(LOCK_GOODS)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        // COALESCE keeps the stored description when the caller sent none.
        let row: Option<GoodRow> = sqlx::query_as(&format!(
            "UPDATE goods \
                SET name = $3, \
                    description = COALESCE($4, description) \
              WHERE id = $1 AND project_id = $2 \
             RETURNING {GOOD_COLUMNS}"
        ))
        .bind(id)
        .bind(project_id)
        .bind(name)
        .bind(description)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let row = row.ok_or(RepoError::NotFound)?;

        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(Good::from(row))
    }

    async fn delete(&self, id: i64, project_id: i64) -> Result<Good, RepoError> {
        let mut tx = self.pool().begin().await.map_err(map_sqlx_error)?;

        sqlx::query(LOCK_GOODS)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        let row: Option<GoodRow> = sqlx::query_as(&format!(
            "UPDATE goods \
                SET removed = TRUE \
              WHERE id = $1 AND project_id = $2 \
             RETURNING {GOOD_COLUMNS}"
        ))
        .bind(id)
        .bind(project_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let row = row.ok_or(RepoError::NotFound)?;

        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(Good::from(row))
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Good>, RepoError> {
        let rows: Vec<GoodRow> = sqlx::query_as(&format!(
            "SELECT {GOOD_COLUMNS} FROM goods ORDER BY id LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Good::from).collect())
    }

    async fn change_priority(
        &self,
        id: i64,
        project_id: i64,
        new_priority: i32,
    ) -> Result<Vec<Good>, RepoError> {
        let mut tx = self.pool().begin().await.map_err(map_sqlx_error)?;

        sqlx::query(LOCK_GOODS)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        // The target row takes exactly the requested priority; every row with
        // a larger id is renumbered to keep a contiguous increasing sequence
        // behind it (ordering by id, the same key the listing holds).
        let mut rows: Vec<GoodRow> = sqlx::query_as(
            "WITH reordered AS ( \
                 SELECT id, ($3 + ROW_NUMBER() OVER (ORDER BY id) - 1)::INT AS next_priority \
                   FROM goods \
                  WHERE (id = $1 AND project_id = $2) OR id > $1 \
             ) \
             UPDATE goods \
                SET priority = reordered.next_priority \
               FROM reordered \
              WHERE goods.id = reordered.id \
             RETURNING goods.id, goods.project_id, goods.name, goods.description, \
                       goods.priority, goods.removed, goods.created_at",
        )
        .bind(id)
        .bind(project_id)
        .bind(new_priority)
        .fetch_all(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        // The cascade must never commit without its anchor: when the target
        // row did not match, id-greater rows were still renumbered above.
        if !rows
            .iter()
            .any(|row| row.id == id && row.project_id == project_id)
        {
            tx.rollback().await.map_err(map_sqlx_error)?;
            return Err(RepoError::NotFound);
        }

        tx.commit().await.map_err(map_sqlx_error)?;

        rows.sort_by_key(|row| row.id);
        Ok(rows.into_iter().map(Good::from).collect())
    }
}
