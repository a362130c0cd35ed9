//! HTTP surface: thin handlers over the goods service.

pub mod error;
pub mod handlers;
mod middleware;

use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn,
    routing::{delete, get, patch, post},
};

use crate::application::goods::GoodService;

#[derive(Clone)]
pub struct AppState {
    pub goods: Arc<GoodService>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/good/create", post(handlers::create_good))
        .route("/api/v1/good/update", patch(handlers::update_good))
        .route(
            "/api/v1/good/reprioritize",
            patch(handlers::reprioritize_good),
        )
        .route("/api/v1/good/remove", delete(handlers::remove_good))
        .route("/api/v1/goods/list", get(handlers::list_goods))
        .layer(from_fn(middleware::log_requests))
        .with_state(state)
}
