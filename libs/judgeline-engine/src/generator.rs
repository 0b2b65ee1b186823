// Text generation backend (Gemini generateContent API)

use async_trait::async_trait;
use judgeline_common::config::GenerationConfig;
use judgeline_common::error::{JudgeError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

/// Anything that turns a prompt into text.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

pub(crate) fn validate_prompt(prompt: &str) -> Result<()> {
    if prompt.trim().is_empty() {
        return Err(JudgeError::Validation("'prompt' is required".to_string()));
    }
    Ok(())
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Text of the first candidate's parts joined by newlines.
///
/// Absent candidates, content or parts yield an empty string.
fn extract_text(response: &GenerateContentResponse) -> String {
    let parts = response
        .candidates
        .as_deref()
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate.content.as_ref())
        .and_then(|content| content.parts.as_deref())
        .unwrap_or_default();

    parts
        .iter()
        .filter_map(|part| part.text.as_deref())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// HTTP client for the Gemini `generateContent` endpoint.
pub struct GeminiGenerator {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    api_base: String,
    timeout: Duration,
}

impl GeminiGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| JudgeError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            timeout: config.timeout,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }

    fn classify(&self, err: reqwest::Error) -> JudgeError {
        if err.is_timeout() {
            JudgeError::GenerationTimeout(self.timeout)
        } else {
            JudgeError::GenerationUnavailable(err.to_string())
        }
    }

    async fn call(&self, api_key: &str, prompt: &str) -> Result<String> {
        let body = GenerateContentRequest {
            contents: [RequestContent {
                role: "user",
                parts: [RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(JudgeError::GenerationUnavailable(format!(
                "backend returned HTTP {}: {}",
                status.as_u16(),
                detail.trim()
            )));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                JudgeError::GenerationTimeout(self.timeout)
            } else {
                JudgeError::GenerationUnavailable(format!("Failed to decode response: {}", e))
            }
        })?;

        Ok(extract_text(&parsed))
    }
}

#[async_trait]
impl GenerationBackend for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        validate_prompt(prompt)?;
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| JudgeError::Config("GEMINI_API_KEY is not set".to_string()))?;

        info!(model = %self.model, prompt_len = prompt.len(), "Calling generation backend");

        let text = match tokio::time::timeout(self.timeout, self.call(api_key, prompt)).await {
            Ok(result) => result?,
            Err(_) => return Err(JudgeError::GenerationTimeout(self.timeout)),
        };

        info!(response_len = text.len(), "Generation response received");
        Ok(text)
    }
}
