use harness::core::grading::GradeSummary;
use harness::exit_codes;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    Failed,
    CompileError,
}

impl Outcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Passed => exit_codes::OK,
            Outcome::Failed => exit_codes::FAILED,
            Outcome::CompileError => exit_codes::COMPILE_ERROR,
        }
    }
}

/// `None` means the build failed before any case ran.
pub fn classify_outcome(summary: Option<&GradeSummary>) -> Outcome {
    match summary {
        None => Outcome::CompileError,
        Some(summary) if summary.all_passed() => Outcome::Passed,
        Some(_) => Outcome::Failed,
    }
}
