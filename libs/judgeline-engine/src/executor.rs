//! Execution Harness - High-Level Orchestration
//!
//! **Responsibility:**
//! Coordinate the execution backend and the evaluator to produce verdicts.
//!
//! **Architecture:**
//! 1. Validate the submission before any network traffic
//! 2. Resolve the language to a backend version index (engine.rs request)
//! 3. Dispatch runs under a per-call deadline
//! 4. Score outputs with the evaluator (evaluator.rs)
//!
//! Single runs propagate backend errors. Batch members absorb them into a
//! failing outcome so the rest of the batch still counts.

use crate::engine::{ExecutionBackend, ExecutionRequest};
use crate::evaluator;
use futures_util::stream::{self, StreamExt};
use judgeline_common::config::ExecutionConfig;
use judgeline_common::error::{JudgeError, Result};
use judgeline_common::languages::LanguageTable;
use judgeline_common::types::{BatchVerdict, ComparisonResult, RawExecutionResult, TestCase};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

#[derive(Clone)]
pub struct Harness {
    backend: Arc<dyn ExecutionBackend>,
    languages: LanguageTable,
    timeout: Duration,
    concurrency: usize,
}

impl Harness {
    pub fn new(
        backend: Arc<dyn ExecutionBackend>,
        languages: LanguageTable,
        config: &ExecutionConfig,
    ) -> Self {
        Self {
            backend,
            languages,
            timeout: config.timeout,
            concurrency: config.concurrency.max(1),
        }
    }

    pub fn languages(&self) -> &LanguageTable {
        &self.languages
    }

    /// Execute `code` once with `stdin` and return what the backend reported.
    #[instrument(skip(self, code, stdin), fields(language = %language))]
    pub async fn run_single(
        &self,
        code: &str,
        language: &str,
        stdin: &str,
    ) -> Result<RawExecutionResult> {
        validate_submission(code, language)?;
        self.backend.ensure_configured()?;

        let request = self.build_request(code, language, stdin);
        let raw = self.dispatch(&request).await?;

        debug!(status_code = raw.status_code, output_len = raw.output.len(), "Run completed");
        Ok(raw)
    }

    /// Execute once with empty stdin and compare against `expected`.
    pub async fn run_with_expected(
        &self,
        code: &str,
        language: &str,
        expected: &str,
    ) -> Result<ComparisonResult> {
        let raw = self.run_single(code, language, "").await?;
        let result = evaluator::compare(raw, expected);

        info!(language = %language, is_correct = result.is_correct, "Comparison completed");
        Ok(result)
    }

    /// Run every test case concurrently and reduce the results into a verdict.
    ///
    /// At most `concurrency` runs are in flight at once. A backend failure or
    /// timeout for one case marks only that case as failed. The call returns once
    /// every case has resolved.
    #[instrument(skip(self, code, test_cases), fields(language = %language, test_cases = test_cases.len()))]
    pub async fn run_batch(
        &self,
        code: &str,
        language: &str,
        test_cases: &[TestCase],
    ) -> Result<BatchVerdict> {
        validate_submission(code, language)?;

        if test_cases.is_empty() {
            info!("Empty batch, nothing to run");
            return Ok(BatchVerdict::empty());
        }

        self.backend.ensure_configured()?;

        let runs: Vec<_> = test_cases
            .iter()
            .enumerate()
            .map(|(index, test_case)| {
                let request = self.build_request(code, language, &test_case.input);
                async move {
                    let result = self.dispatch(&request).await;
                    if let Err(ref e) = result {
                        warn!(
                            test_num = index + 1,
                            kind = %e.kind(),
                            error = %e,
                            "Test case execution failed; marking as failed"
                        );
                    }
                    (index, evaluator::evaluate_case(test_case, result))
                }
            })
            .collect();
        let outcomes = stream::iter(runs)
            .buffer_unordered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        let verdict = evaluator::aggregate(outcomes);

        info!(
            passed = verdict.passed_count,
            total = verdict.total_count,
            score = verdict.score_percent,
            "Batch evaluation complete"
        );
        Ok(verdict)
    }

    fn build_request(&self, code: &str, language: &str, stdin: &str) -> ExecutionRequest {
        let language = language.trim().to_lowercase();
        if !self.languages.is_known(&language) {
            debug!(language = %language, "Unknown language, sending fallback version index");
        }
        let version_index = self.languages.version_index(&language).to_string();
        ExecutionRequest {
            script: code.to_string(),
            language,
            version_index,
            stdin: stdin.to_string(),
        }
    }

    /// One backend call bounded by the per-call deadline.
    async fn dispatch(&self, request: &ExecutionRequest) -> Result<RawExecutionResult> {
        match tokio::time::timeout(self.timeout, self.backend.execute(request)).await {
            Ok(result) => result,
            Err(_) => Err(JudgeError::ExecutionTimeout(self.timeout)),
        }
    }
}

fn validate_submission(code: &str, language: &str) -> Result<()> {
    if code.trim().is_empty() {
        return Err(JudgeError::Validation("'code' is required".to_string()));
    }
    if language.trim().is_empty() {
        return Err(JudgeError::Validation("'language' is required".to_string()));
    }
    Ok(())
}
