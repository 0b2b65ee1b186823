//! Test Evaluator - Language-Agnostic Scoring Logic
//!
//! **Core Responsibility:**
//! Compare raw execution outputs against expected outputs and aggregate scores.
//!
//! **Critical Properties:**
//! - Knows nothing about HTTP or the execution backend
//! - Knows nothing about language runtimes
//! - Pure functions: (raw results, expected outputs) → verdicts
//!
//! **Scoring Rules:**
//! - A test case passes when its normalized output equals the normalized expectation
//! - score_percent = passed / total * 100, rounded to 2 decimals
//! - An empty batch scores 0.0
//!
//! **Normalization Rules:**
//! - Trim leading and trailing whitespace: YES
//! - Internal whitespace: preserved
//! - Case sensitivity: YES (exact match required)
//! - Numeric tolerance: NO ("42" != "42.0")

use judgeline_common::error::Result;
use judgeline_common::types::{
    BatchVerdict, ComparisonResult, ExecutionOutcome, RawExecutionResult, TestCase,
};

fn normalize_output(output: &str) -> &str {
    output.trim()
}

/// Exact comparison after trimming both sides.
pub fn outputs_match(actual: &str, expected: &str) -> bool {
    normalize_output(actual) == normalize_output(expected)
}

/// Compare a single run against one expected output.
pub fn compare(raw: RawExecutionResult, expected: &str) -> ComparisonResult {
    let is_correct = outputs_match(&raw.output, expected);
    let actual = normalize_output(&raw.output).to_string();

    ComparisonResult {
        actual_output: actual,
        expected_output: expected.to_string(),
        is_correct,
        status_code: raw.status_code,
        memory: raw.memory,
        cpu_time: raw.cpu_time,
    }
}

/// Turn the result of one batch member's run into its outcome.
///
/// A failed run is absorbed: it yields `passed = false` with an empty actual output.
pub fn evaluate_case(test_case: &TestCase, result: Result<RawExecutionResult>) -> ExecutionOutcome {
    let expected = normalize_output(&test_case.expected_output).to_string();

    let (actual_output, passed) = match result {
        Ok(raw) => {
            let passed = outputs_match(&raw.output, &expected);
            (normalize_output(&raw.output).to_string(), passed)
        }
        Err(_) => (String::new(), false),
    };

    ExecutionOutcome {
        input: test_case.input.clone(),
        expected_output: expected,
        actual_output,
        passed,
    }
}

/// Percentage of passed cases rounded to 2 decimals, `0.0` for an empty batch.
///
/// Exact ties round to even, so 1 of 32 scores 3.12 rather than 3.13.
pub fn score_percent(passed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = passed as f64 / total as f64 * 100.0;
    (raw * 100.0).round_ties_even() / 100.0
}

/// Reduce outcomes tagged with their test case index into a verdict.
///
/// Outcomes may arrive in any completion order; the verdict lists them by index.
pub fn aggregate(mut outcomes: Vec<(usize, ExecutionOutcome)>) -> BatchVerdict {
    outcomes.sort_by_key(|(index, _)| *index);

    let outcomes: Vec<ExecutionOutcome> = outcomes.into_iter().map(|(_, o)| o).collect();
    let total_count = outcomes.len();
    let passed_count = outcomes.iter().filter(|o| o.passed).count();

    BatchVerdict {
        passed_count,
        total_count,
        score_percent: score_percent(passed_count, total_count),
        outcomes,
    }
}
