//! Verdicts: actual outputs graded against expected outputs by index.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Output recorded for a case whose process failed.
pub const EXECUTION_ERROR_SENTINEL: &str = "Execution Error";

/// Shown in place of the expected output for ungraded (custom) cases.
pub const NO_EXPECTED_OUTPUT: &str = "N/A";

/// What one case produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseResult {
    /// Trimmed stdout, or [`EXECUTION_ERROR_SENTINEL`].
    pub output: String,
    /// Failure message when the process did not exit cleanly.
    pub execution_error: Option<String>,
}

impl CaseResult {
    pub fn completed(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            execution_error: None,
        }
    }

    pub fn execution_failed(message: impl Into<String>) -> Self {
        Self {
            output: EXECUTION_ERROR_SENTINEL.to_string(),
            execution_error: Some(message.into()),
        }
    }
}

/// Graded outcome of a single case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Zero-based case index.
    pub index: usize,
    pub declaration: String,
    pub actual: String,
    /// `None` when no expected output exists for this index.
    pub expected: Option<String>,
    /// `None` for ungraded cases.
    pub passed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_error: Option<String>,
}

impl Verdict {
    pub fn status(&self) -> VerdictStatus {
        match self.passed {
            Some(true) => VerdictStatus::Passed,
            Some(false) => VerdictStatus::Failed,
            None => VerdictStatus::Custom,
        }
    }

    pub fn expected_display(&self) -> &str {
        self.expected.as_deref().unwrap_or(NO_EXPECTED_OUTPUT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    Passed,
    Failed,
    Custom,
}

impl fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VerdictStatus::Passed => "Passed",
            VerdictStatus::Failed => "Failed",
            VerdictStatus::Custom => "Custom",
        })
    }
}

/// Pair each case result with its expected output, by index.
///
/// Comparison trims surrounding whitespace on both sides and is otherwise
/// exact. Indices past the end of `expected` are ungraded.
pub fn grade(declarations: &[String], results: &[CaseResult], expected: &[String]) -> Vec<Verdict> {
    results
        .iter()
        .enumerate()
        .map(|(index, result)| {
            let expected = expected.get(index).map(|line| line.trim().to_string());
            let passed = expected
                .as_deref()
                .map(|expected| result.output.trim() == expected);
            Verdict {
                index,
                declaration: declarations.get(index).cloned().unwrap_or_default(),
                actual: result.output.clone(),
                expected,
                passed,
                execution_error: result.execution_error.clone(),
            }
        })
        .collect()
}

/// Counts over a verdict list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeSummary {
    /// Graded cases that passed.
    pub passed: usize,
    /// Cases with an expected output. The pass ratio denominator.
    pub graded: usize,
    /// Every case that was run, custom cases included.
    pub total: usize,
    /// Cases whose output is the execution error sentinel.
    pub execution_errors: usize,
}

impl GradeSummary {
    pub fn from_verdicts(verdicts: &[Verdict]) -> Self {
        let mut summary = GradeSummary {
            total: verdicts.len(),
            ..GradeSummary::default()
        };
        for verdict in verdicts {
            match verdict.passed {
                Some(true) => {
                    summary.passed += 1;
                    summary.graded += 1;
                }
                Some(false) => summary.graded += 1,
                None => {}
            }
            if verdict.execution_error.is_some() {
                summary.execution_errors += 1;
            }
        }
        summary
    }

    /// Fraction of graded cases that passed; `None` when nothing was graded.
    pub fn pass_ratio(&self) -> Option<f64> {
        (self.graded > 0).then(|| self.passed as f64 / self.graded as f64)
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.graded
    }
}

impl fmt::Display for GradeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Passed {}/{} official test cases. Run {} total cases.",
            self.passed, self.graded, self.total
        )
    }
}
