use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::goods::GoodError;

pub mod codes {
    pub const BAD_REQUEST: &str = "bad_request";
    pub const NOT_FOUND: &str = "not_found";
    pub const STORAGE: &str = "storage_error";
    pub const CACHE: &str = "cache_error";
    pub const CODEC: &str = "codec_error";
    pub const DB_TIMEOUT: &str = "db_timeout";
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorMessage,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorMessage {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: &'static str,
    hint: Option<String>,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        code: &'static str,
        message: &'static str,
        hint: Option<String>,
    ) -> Self {
        Self {
            status,
            code,
            message,
            hint,
        }
    }

    pub fn bad_request(message: &'static str, hint: Option<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::BAD_REQUEST, message, hint)
    }

    pub fn not_found(message: &'static str) -> Self {
        Self::new(StatusCode::NOT_FOUND, codes::NOT_FOUND, message, None)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: ApiErrorMessage {
                code: self.code.to_string(),
                message: self.message.to_string(),
                hint: self.hint,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<GoodError> for ApiError {
    fn from(err: GoodError) -> Self {
        match err {
            GoodError::NotFound => ApiError::not_found("good not found"),
            GoodError::Storage(inner) => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                match inner {
                    crate::application::repos::RepoError::Timeout => codes::DB_TIMEOUT,
                    _ => codes::STORAGE,
                },
                "storage failure",
                Some(inner.to_string()),
            ),
            GoodError::Cache(inner) => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                codes::CACHE,
                "cache failure",
                Some(inner.to_string()),
            ),
            GoodError::Codec(inner) => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                codes::CODEC,
                "cache payload could not be decoded",
                Some(inner.to_string()),
            ),
        }
    }
}
