// HTTP route handlers for the Judgeline API

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use judgeline_common::types::TestCase;
use judgeline_common::JudgeError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::ApiError;
use crate::metrics;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    #[serde(default)]
    pub code: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub test_cases: Option<Vec<TestCase>>,
    #[serde(default)]
    pub expected_output: Option<String>,
    #[serde(default)]
    pub stdin: String,
}

fn default_language() -> String {
    "java".to_string()
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub text: String,
}

/// Successful body with `success: true` next to the payload's own fields.
#[derive(Debug, Serialize)]
struct Success<T: Serialize> {
    success: bool,
    #[serde(flatten)]
    body: T,
}

fn success<T: Serialize>(body: T) -> Response {
    (StatusCode::OK, Json(Success { success: true, body })).into_response()
}

/// Unreadable or mistyped request bodies are validation errors.
fn parse_body<T>(
    route: &str,
    request_id: Uuid,
    payload: std::result::Result<Json<T>, JsonRejection>,
) -> Result<T, ApiError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        failure(route, request_id, JudgeError::Validation(rejection.body_text()))
    })
}

fn failure(route: &str, request_id: Uuid, err: JudgeError) -> ApiError {
    error!(request_id = %request_id, route, kind = %err.kind(), error = %err, "Request failed");
    metrics::record_request(route, err.kind().as_str());
    ApiError(err)
}

/// POST /execute-code - Run code in one of three modes
///
/// - `testCases` present: batch evaluation, returns the verdict
/// - `expectedOutput` present: single run compared against it
/// - neither: single raw run
pub async fn execute_code(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<ExecuteRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request_id = Uuid::new_v4();
    let payload = parse_body("execute", request_id, payload)?;
    let harness = &state.harness;

    if let Some(test_cases) = payload.test_cases {
        info!(
            request_id = %request_id,
            language = %payload.language,
            test_cases = test_cases.len(),
            source_size = payload.code.len(),
            "Batch execution requested"
        );

        let verdict = harness
            .run_batch(&payload.code, &payload.language, &test_cases)
            .await
            .map_err(|e| failure("execute", request_id, e))?;

        metrics::record_batch(verdict.passed_count, verdict.total_count, verdict.score_percent);
        metrics::record_request("execute", "ok");
        info!(
            request_id = %request_id,
            passed = verdict.passed_count,
            total = verdict.total_count,
            score = verdict.score_percent,
            "Batch evaluated"
        );
        return Ok(success(verdict));
    }

    if let Some(expected) = payload.expected_output {
        let result = harness
            .run_with_expected(&payload.code, &payload.language, &expected)
            .await
            .map_err(|e| failure("execute", request_id, e))?;

        metrics::record_request("execute", "ok");
        info!(request_id = %request_id, is_correct = result.is_correct, "Comparison evaluated");
        return Ok(success(result));
    }

    let raw = harness
        .run_single(&payload.code, &payload.language, &payload.stdin)
        .await
        .map_err(|e| failure("execute", request_id, e))?;

    metrics::record_request("execute", "ok");
    info!(request_id = %request_id, status_code = raw.status_code, "Single run completed");
    Ok(success(raw))
}

/// POST /generate - Cached text generation
pub async fn generate(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let request_id = Uuid::new_v4();
    let payload = parse_body("generate", request_id, payload)?;

    let text = state
        .cache
        .cached_generate(&payload.prompt)
        .await
        .map_err(|e| failure("generate", request_id, e))?;

    metrics::record_request("generate", "ok");
    info!(request_id = %request_id, response_len = text.len(), "Generation served");
    Ok(Json(GenerateResponse {
        success: true,
        text,
    }))
}

/// GET /languages - Language to version index table
pub async fn list_languages(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.harness.languages().entries())
}

/// GET /health - Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({ "status": "ok", "model": state.model }))
}

/// GET /metrics - Prometheus scrape endpoint
pub async fn export_metrics(State(state): State<Arc<AppState>>) -> Response {
    match metrics::render(state.cache.stats()) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
