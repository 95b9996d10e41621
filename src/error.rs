use std::sync::OnceLock;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

/// Whether error responses may carry a `debug` field with internal detail.
/// Set once at startup from the configured environment.
static DEBUG_ERRORS: OnceLock<bool> = OnceLock::new();

pub fn set_debug_errors(enabled: bool) {
    let _ = DEBUG_ERRORS.set(enabled);
}

fn debug_errors() -> bool {
    *DEBUG_ERRORS.get().unwrap_or(&false)
}

/// API error taxonomy. Every handler returns `Result<_, ApiError>`; the
/// `IntoResponse` impl renders the uniform `{success:false, error}` envelope.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("Insufficient permissions")]
    Forbidden,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Internal(e.into())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    debug: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let debug = match &self {
            ApiError::Internal(source) => {
                error!(error = %source, "request failed");
                debug_errors().then(|| format!("{source:#}"))
            }
            _ => None,
        };
        let body = ErrorBody {
            success: false,
            error: self.to_string(),
            debug,
        };
        (status, Json(body)).into_response()
    }
}

/// Success envelope for data-carrying responses.
#[derive(Debug, Serialize)]
pub struct ApiData<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiData<T> {
    pub fn new(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

/// Bare `{success:true}` acknowledgement.
#[derive(Debug, Serialize)]
pub struct Ack {
    pub success: bool,
}

impl Ack {
    pub fn ok() -> Json<Ack> {
        Json(Ack { success: true })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized("x").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_message_is_generic() {
        let err = ApiError::Internal(anyhow::anyhow!("connection refused"));
        assert_eq!(err.to_string(), "Internal server error");
    }

    #[test]
    fn envelope_shapes() {
        let ok = serde_json::to_value(Ack { success: true }).unwrap();
        assert_eq!(ok, serde_json::json!({"success": true}));

        let body = ErrorBody {
            success: false,
            error: "Not found".into(),
            debug: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "error": "Not found"}));
    }
}
