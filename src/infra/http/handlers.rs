//! Goods handlers.
//!
//! Query parameters carry the addressing (`id`, `projectId`), bodies carry
//! the mutable fields; both arrive already type-checked by the extractors.

use axum::Json;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use crate::domain::goods::Good;

use super::AppState;
use super::error::ApiError;

const DEFAULT_LIST_LIMIT: i64 = 10;
const DEFAULT_LIST_OFFSET: i64 = 0;

#[derive(Debug, Deserialize)]
pub struct ProjectScopedQuery {
    #[serde(rename = "projectId")]
    pub project_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct GoodAddressQuery {
    pub id: i64,
    #[serde(rename = "projectId")]
    pub project_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateGoodRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateGoodRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReprioritizeRequest {
    #[serde(rename = "newPriority")]
    pub new_priority: i32,
}

#[derive(Debug, Serialize)]
pub struct ReprioritizeResponse {
    pub priorities: Vec<PriorityView>,
}

#[derive(Debug, Serialize)]
pub struct PriorityView {
    pub id: i64,
    pub priority: i32,
}

impl From<&Good> for PriorityView {
    fn from(good: &Good) -> Self {
        Self {
            id: good.id,
            priority: good.priority,
        }
    }
}

pub async fn create_good(
    State(state): State<AppState>,
    Query(query): Query<ProjectScopedQuery>,
    Json(payload): Json<CreateGoodRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("name must not be empty", None));
    }

    let good = state.goods.create(query.project_id, name).await?;
    Ok(Json(good))
}

pub async fn update_good(
    State(state): State<AppState>,
    Query(query): Query<GoodAddressQuery>,
    Json(payload): Json<UpdateGoodRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("name must not be empty", None));
    }

    let good = state
        .goods
        .update(query.id, query.project_id, name, payload.description)
        .await?;
    Ok(Json(good))
}

pub async fn remove_good(
    State(state): State<AppState>,
    Query(query): Query<GoodAddressQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let good = state.goods.delete(query.id, query.project_id).await?;
    Ok(Json(good))
}

pub async fn list_goods(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    if limit < 0 {
        return Err(ApiError::bad_request("limit must not be negative", None));
    }

    let offset = query.offset.unwrap_or(DEFAULT_LIST_OFFSET);
    if offset < 0 {
        return Err(ApiError::bad_request("offset must not be negative", None));
    }

    let page = state.goods.list(limit, offset).await?;
    Ok(Json(page))
}

pub async fn reprioritize_good(
    State(state): State<AppState>,
    Query(query): Query<GoodAddressQuery>,
    Json(payload): Json<ReprioritizeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let goods = state
        .goods
        .change_priority(query.id, query.project_id, payload.new_priority)
        .await?;

    let priorities = goods.iter().map(PriorityView::from).collect();
    Ok(Json(ReprioritizeResponse { priorities }))
}
