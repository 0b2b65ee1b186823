//! Execution Engine - Remote Code Execution Backend
//!
//! **Core Responsibility:**
//! Send one script plus stdin to the external execution service and hand back
//! whatever it reported.
//!
//! **Critical Architectural Boundary:**
//! - Engine knows HOW to reach the backend (HTTP, credentials, wire format)
//! - Engine does NOT know scoring rules
//! - Engine does NOT enforce batch concurrency
//! - Engine returns raw results for the Evaluator to judge
//!
//! Code never runs locally. Isolation is the backend's job.

use async_trait::async_trait;
use judgeline_common::config::ExecutionConfig;
use judgeline_common::error::{JudgeError, Result};
use judgeline_common::types::RawExecutionResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// A single run as handed to an execution backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub script: String,
    pub language: String,
    pub version_index: String,
    pub stdin: String,
}

/// Anything that can execute a script once and report its output.
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    /// Fail fast, without network traffic, when the backend cannot be called.
    fn ensure_configured(&self) -> Result<()> {
        Ok(())
    }

    async fn execute(&self, request: &ExecutionRequest) -> Result<RawExecutionResult>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JdoodlePayload<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    script: &'a str,
    language: &'a str,
    version_index: &'a str,
    stdin: &'a str,
}

/// Every field is optional: a missing field becomes an empty result, not an error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JdoodleResponse {
    output: Option<String>,
    status_code: Option<Value>,
    memory: Option<Value>,
    cpu_time: Option<Value>,
    error: Option<String>,
}

impl JdoodleResponse {
    fn into_raw(self) -> RawExecutionResult {
        RawExecutionResult {
            output: self.output.unwrap_or_default(),
            status_code: self.status_code.as_ref().and_then(value_to_i64).unwrap_or(-1),
            memory: self.memory.and_then(value_to_text),
            cpu_time: self.cpu_time.and_then(value_to_text),
        }
    }
}

fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// HTTP client for a JDoodle-compatible execution API.
pub struct JdoodleEngine {
    client: reqwest::Client,
    url: String,
    client_id: Option<String>,
    client_secret: Option<String>,
    timeout: Duration,
}

impl JdoodleEngine {
    pub fn new(config: &ExecutionConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| JudgeError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: config.url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            timeout: config.timeout,
        })
    }

    fn credentials(&self) -> Result<(&str, &str)> {
        match (self.client_id.as_deref(), self.client_secret.as_deref()) {
            (Some(id), Some(secret)) => Ok((id, secret)),
            _ => Err(JudgeError::Config(
                "JD_CLIENT_ID and JD_CLIENT_SECRET must be set".to_string(),
            )),
        }
    }

    fn classify(&self, err: reqwest::Error) -> JudgeError {
        if err.is_timeout() {
            JudgeError::ExecutionTimeout(self.timeout)
        } else {
            JudgeError::ExecutionBackend(err.to_string())
        }
    }
}

#[async_trait]
impl ExecutionBackend for JdoodleEngine {
    fn ensure_configured(&self) -> Result<()> {
        self.credentials().map(|_| ())
    }

    async fn execute(&self, request: &ExecutionRequest) -> Result<RawExecutionResult> {
        let (client_id, client_secret) = self.credentials()?;

        let payload = JdoodlePayload {
            client_id,
            client_secret,
            script: &request.script,
            language: &request.language,
            version_index: &request.version_index,
            stdin: &request.stdin,
        };

        debug!(
            language = %request.language,
            version_index = %request.version_index,
            stdin_len = request.stdin.len(),
            "Calling execution backend"
        );

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.classify(e))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<JdoodleResponse>(&text)
                .ok()
                .and_then(|body| body.error)
                .unwrap_or(text);
            return Err(JudgeError::ExecutionBackend(format!(
                "backend returned HTTP {}: {}",
                status.as_u16(),
                detail
            )));
        }

        let body: JdoodleResponse = serde_json::from_str(&text).map_err(|e| {
            JudgeError::ExecutionBackend(format!("Failed to decode backend response: {}", e))
        })?;

        Ok(body.into_raw())
    }
}
