use serde::{Deserialize, Serialize};

/// An input/expected-output pair used to verify a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    #[serde(default)]
    pub input: String,
    #[serde(alias = "output")]
    pub expected_output: String,
}

impl TestCase {
    pub fn new(input: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            expected_output: expected_output.into(),
        }
    }
}

/// What the execution backend reported for a single run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawExecutionResult {
    pub output: String,
    /// Backend status indicator, `-1` when the backend did not send one.
    pub status_code: i64,
    pub memory: Option<String>,
    pub cpu_time: Option<String>,
}

/// Result of a single run compared against one expected output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub actual_output: String,
    pub expected_output: String,
    pub is_correct: bool,
    pub status_code: i64,
    pub memory: Option<String>,
    pub cpu_time: Option<String>,
}

/// Verdict for one test case of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionOutcome {
    pub input: String,
    pub expected_output: String,
    pub actual_output: String,
    pub passed: bool,
}

/// Aggregated verdict over every test case of a batch.
///
/// Outcomes are listed in the order the test cases were submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchVerdict {
    pub passed_count: usize,
    pub total_count: usize,
    pub score_percent: f64,
    pub outcomes: Vec<ExecutionOutcome>,
}

impl BatchVerdict {
    /// Verdict for a batch with nothing to run.
    pub fn empty() -> Self {
        Self {
            passed_count: 0,
            total_count: 0,
            score_percent: 0.0,
            outcomes: Vec::new(),
        }
    }
}
