use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use judgeline_common::{ErrorKind, JudgeError};
use serde_json::json;

/// A `JudgeError` rendered as `{success: false, error, kind}`.
#[derive(Debug)]
pub struct ApiError(pub JudgeError);

impl From<JudgeError> for ApiError {
    fn from(err: JudgeError) -> Self {
        ApiError(err)
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::ValidationError => StatusCode::BAD_REQUEST,
        ErrorKind::BackendUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::BackendTimeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::ConfigError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        (
            status_for(kind),
            Json(json!({
                "success": false,
                "error": self.0.to_string(),
                "kind": kind.as_str(),
            })),
        )
            .into_response()
    }
}
