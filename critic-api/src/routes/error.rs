use axum::http::StatusCode;
use axum::Json;
use critic_core::Error;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
}

pub fn map_error(err: &Error) -> (StatusCode, Json<ErrorEnvelope>) {
    let (status, code, message) = match err {
        Error::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message.clone()),
        Error::InvalidRequest(message) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "invalid_input",
            message.clone(),
        ),
        Error::Queue(message) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "queue_unavailable",
            message.clone(),
        ),
        Error::Upstream(_) => (StatusCode::BAD_GATEWAY, "upstream_error", err.to_string()),
        Error::Store(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "store_error",
            err.to_string(),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            err.to_string(),
        ),
    };

    (
        status,
        Json(ErrorEnvelope {
            code: code.to_string(),
            message,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_keeps_bare_message() {
        let (status, Json(body)) = map_error(&Error::NotFound(
            "Results not found or task not completed.".to_string(),
        ));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.code, "not_found");
        assert_eq!(body.message, "Results not found or task not completed.");
    }

    #[test]
    fn test_queue_closed_is_unavailable() {
        let (status, Json(body)) = map_error(&Error::Queue("task queue is closed".to_string()));
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.code, "queue_unavailable");
    }

    #[test]
    fn test_store_failure_is_internal() {
        let (status, Json(body)) = map_error(&Error::Store("disk I/O error".to_string()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.code, "store_error");
    }
}
