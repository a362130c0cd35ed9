use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::Value;
use time::OffsetDateTime;
use tower::ServiceExt;

use merce::application::goods::GoodService;
use merce::application::repos::{GoodsRepo, RepoError, UpdateGoodParams};
use merce::audit::{self, AuditSink, GoodEvent};
use merce::cache::MemoryCache;
use merce::domain::goods::Good;
use merce::infra::http::{AppState, build_router};

#[derive(Default)]
struct InMemoryGoodsRepo {
    rows: Mutex<Vec<Good>>,
}

impl InMemoryGoodsRepo {
    fn seeded(rows: Vec<Good>) -> Self {
        Self {
            rows: Mutex::new(rows),
        }
    }
}

#[async_trait]
impl GoodsRepo for InMemoryGoodsRepo {
    async fn is_exists(&self, id: i64, project_id: i64) -> Result<bool, RepoError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .any(|good| good.id == id && good.project_id == project_id))
    }

    async fn create(&self, project_id: i64, name: &str) -> Result<Good, RepoError> {
        let mut rows = self.rows.lock().unwrap();
        let id = rows.iter().map(|good| good.id).max().unwrap_or(0) + 1;
        let priority = rows.iter().map(|good| good.priority).max().unwrap_or(0) + 1;
        let good = Good {
            id,
            project_id,
            name: name.to_string(),
            description: None,
            priority,
            removed: false,
            created_at: OffsetDateTime::now_utc(),
        };
        rows.push(good.clone());
        Ok(good)
    }

    async fn update(&self, params: UpdateGoodParams) -> Result<Good, RepoError> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|good| good.id == params.id && good.project_id == params.project_id)
            .ok_or(RepoError::NotFound)?;
        row.name = params.name;
        if let Some(description) = params.description {
            row.description = Some(description);
        }
        Ok(row.clone())
    }

    async fn delete(&self, id: i64, project_id: i64) -> Result<Good, RepoError> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|good| good.id == id && good.project_id == project_id)
            .ok_or(RepoError::NotFound)?;
        row.removed = true;
        Ok(row.clone())
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Good>, RepoError> {
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by_key(|good| good.id);
        Ok(rows
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn change_priority(
        &self,
        id: i64,
        project_id: i64,
        new_priority: i32,
    ) -> Result<Vec<Good>, RepoError> {
        let mut rows = self.rows.lock().unwrap();
        if !rows
            .iter()
            .any(|good| good.id == id && good.project_id == project_id)
        {
            return Err(RepoError::NotFound);
        }

        rows.sort_by_key(|good| good.id);
        let mut next = new_priority;
        let mut affected = Vec::new();
        for good in rows
            .iter_mut()
            .filter(|good| (good.id == id && good.project_id == project_id) || good.id > id)
        {
            good.priority = next;
            next += 1;
            affected.push(good.clone());
        }
        Ok(affected)
    }
}

struct NullSink;

#[async_trait]
impl AuditSink for NullSink {
    async fn insert(&self, _events: &[GoodEvent]) -> Result<(), RepoError> {
        Ok(())
    }
}

fn router(rows: Vec<Good>) -> Router {
    let repo = Arc::new(InMemoryGoodsRepo::seeded(rows));
    let (publisher, consumer) = audit::pipeline(Arc::new(NullSink));
    tokio::spawn(consumer.run());
    let goods = Arc::new(GoodService::new(
        repo,
        Arc::new(MemoryCache::new()),
        publisher,
    ));
    build_router(AppState { goods })
}

fn sample_good(id: i64, project_id: i64, priority: i32) -> Good {
    Good {
        id,
        project_id,
        name: format!("good-{id}"),
        description: None,
        priority,
        removed: false,
        created_at: OffsetDateTime::now_utc(),
    }
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body is readable");
    serde_json::from_slice(&bytes).expect("body is JSON")
}

#[tokio::test]
async fn create_returns_the_stored_row() {
    let app = router(Vec::new());

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/good/create?projectId=3",
            r#"{"name":"Lamp"}"#,
        ))
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["id"], 1);
    assert_eq!(body["projectId"], 3);
    assert_eq!(body["name"], "Lamp");
    assert_eq!(body["priority"], 1);
    assert_eq!(body["removed"], false);
    assert!(body["createdAt"].is_string());
}

#[tokio::test]
async fn create_rejects_a_blank_name() {
    let app = router(Vec::new());

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/good/create?projectId=3",
            r#"{"name":"   "}"#,
        ))
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn update_of_an_unknown_good_is_a_404() {
    let app = router(vec![sample_good(1, 1, 1)]);

    let response = app
        .oneshot(json_request(
            "PATCH",
            "/api/v1/good/update?id=1&projectId=2",
            r#"{"name":"renamed"}"#,
        ))
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn remove_marks_the_row_removed() {
    let app = router(vec![sample_good(4, 2, 1)]);

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/v1/good/remove?id=4&projectId=2")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["id"], 4);
    assert_eq!(body["removed"], true);
}

#[tokio::test]
async fn list_defaults_and_counts_removed_rows() {
    let mut removed = sample_good(2, 1, 2);
    removed.removed = true;
    let app = router(vec![sample_good(1, 1, 1), removed]);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/goods/list")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["meta"]["limit"], 10);
    assert_eq!(body["meta"]["offset"], 0);
    assert_eq!(body["meta"]["total"], 2);
    assert_eq!(body["meta"]["removed"], 1);
    assert_eq!(body["goods"].as_array().expect("goods array").len(), 2);
}

#[tokio::test]
async fn list_rejects_negative_paging() {
    let app = router(Vec::new());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/goods/list?limit=-1")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reprioritize_returns_the_cascaded_pairs() {
    let app = router(vec![sample_good(10, 1, 3), sample_good(11, 1, 4)]);

    let response = app
        .oneshot(json_request(
            "PATCH",
            "/api/v1/good/reprioritize?id=10&projectId=1",
            r#"{"newPriority":5}"#,
        ))
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let priorities = body["priorities"].as_array().expect("priorities array");
    assert_eq!(priorities.len(), 2);
    assert_eq!(priorities[0]["id"], 10);
    assert_eq!(priorities[0]["priority"], 5);
    assert_eq!(priorities[1]["id"], 11);
    assert_eq!(priorities[1]["priority"], 6);
}
