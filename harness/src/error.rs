//! Error taxonomy for a harness invocation.
//!
//! Only [`ExecutionError`] is recoverable: the session turns it into a
//! sentinel output for that case and moves on. Every other
//! [`HarnessError`] aborts the invocation before any verdict is produced.

use thiserror::Error;

/// A solution process that did not finish cleanly.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Execution error ({}): {}", exit_label(.exit_code), .stderr.trim())]
    NonZeroExit {
        exit_code: Option<i32>,
        stderr: String,
    },
    #[error("Execution timed out after {timeout_secs}s: {}", .stderr.trim())]
    TimedOut { timeout_secs: u64, stderr: String },
}

fn exit_label(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

#[derive(Debug, Error)]
pub enum HarnessError {
    /// The compiler rejected the solution. Carries the full diagnostics.
    #[error("Compilation failed:\n{diagnostics}")]
    Compile { diagnostics: String },
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    /// Missing workspace, test-case file or solution source.
    #[error("{0}")]
    Resource(String),
    /// Anything unexpected: spawning the toolchain, pipes, filesystem writes.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HarnessError {
    pub fn is_recoverable(&self) -> bool {
        matches!(self, HarnessError::Execution(_))
    }
}
