//! Harness session: build once, run every case in order, grade.
//!
//! ```text
//! Idle -> Building -> BuildFailed                      (Err, no verdicts)
//!                  -> Running(0..n) -> Graded          (Ok(HarnessReport))
//! ```
//!
//! A session owns its builder and runner and keeps no state between
//! invocations, so running it twice on the same inputs yields the same report.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::core::grading::{CaseResult, GradeSummary, Verdict, grade};
use crate::core::parser::parse_declaration;
use crate::core::serializer::serialize_bindings;
use crate::core::types::Language;
use crate::error::HarnessError;
use crate::io::build::{Artifact, Builder, ToolchainBuilder};
use crate::io::config::HarnessConfig;
use crate::io::executor::{ProcessRunner, ProgramRunner};

/// Inputs for one harness invocation.
#[derive(Debug, Clone, Copy)]
pub struct HarnessRequest<'a> {
    pub solution: &'a Path,
    pub language: Language,
    /// One non-blank declaration line per case.
    pub declarations: &'a [String],
    /// Expected outputs aligned by index; may be shorter than `declarations`.
    pub expected: &'a [String],
}

/// Everything a successful invocation produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HarnessReport {
    pub verdicts: Vec<Verdict>,
    /// One entry per declaration line, in order.
    pub actual_outputs: Vec<String>,
    pub summary: GradeSummary,
}

/// Progress notifications emitted while a session runs.
#[derive(Debug)]
pub enum SessionEvent<'a> {
    Building { language: Language },
    Built { artifact: &'a Artifact },
    CaseFinished {
        index: usize,
        total: usize,
        result: &'a CaseResult,
    },
    Graded { summary: &'a GradeSummary },
}

pub struct HarnessSession<B, R> {
    builder: B,
    runner: R,
}

impl HarnessSession<ToolchainBuilder, ProcessRunner> {
    /// Session backed by the real compiler and child processes.
    pub fn with_toolchain(config: &HarnessConfig, artifact_path: impl Into<PathBuf>) -> Self {
        Self::new(
            ToolchainBuilder::new(config.clone(), artifact_path),
            ProcessRunner::new(config.clone()),
        )
    }
}

impl<B: Builder, R: ProgramRunner> HarnessSession<B, R> {
    pub fn new(builder: B, runner: R) -> Self {
        Self { builder, runner }
    }

    pub fn builder(&self) -> &B {
        &self.builder
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn run(&self, request: &HarnessRequest<'_>) -> Result<HarnessReport, HarnessError> {
        self.run_with_progress(request, |_| {})
    }

    /// Run the whole invocation, reporting progress to `on_event`.
    ///
    /// A build failure aborts before any case runs. An execution error on a
    /// case records the sentinel output and the loop continues; any other
    /// error aborts the invocation and no partial report is returned.
    #[instrument(skip_all, fields(language = %request.language, cases = request.declarations.len()))]
    pub fn run_with_progress<F: FnMut(&SessionEvent<'_>)>(
        &self,
        request: &HarnessRequest<'_>,
        mut on_event: F,
    ) -> Result<HarnessReport, HarnessError> {
        info!(solution = %request.solution.display(), "harness run started");

        on_event(&SessionEvent::Building {
            language: request.language,
        });
        let artifact = self.builder.build(request.solution, request.language)?;
        on_event(&SessionEvent::Built {
            artifact: &artifact,
        });

        let total = request.declarations.len();
        let mut results = Vec::with_capacity(total);
        for (index, line) in request.declarations.iter().enumerate() {
            let result = self.run_case(&artifact, index, line)?;
            on_event(&SessionEvent::CaseFinished {
                index,
                total,
                result: &result,
            });
            results.push(result);
        }

        let verdicts = grade(request.declarations, &results, request.expected);
        let summary = GradeSummary::from_verdicts(&verdicts);
        on_event(&SessionEvent::Graded { summary: &summary });
        info!(
            passed = summary.passed,
            graded = summary.graded,
            total = summary.total,
            "harness run graded"
        );

        Ok(HarnessReport {
            verdicts,
            actual_outputs: results.into_iter().map(|result| result.output).collect(),
            summary,
        })
    }

    fn run_case(
        &self,
        artifact: &Artifact,
        index: usize,
        line: &str,
    ) -> Result<CaseResult, HarnessError> {
        let case = index + 1;
        let parsed = parse_declaration(line);
        for issue in &parsed.issues {
            warn!(case, %issue, "declaration parse issue");
        }
        if parsed.bindings.is_empty() {
            debug!(case, "declaration has no bindings");
        }
        let stdin = serialize_bindings(&parsed.bindings);

        match self.runner.run(artifact, &stdin) {
            Ok(output) => {
                debug!(case, "case finished");
                Ok(CaseResult::completed(output))
            }
            Err(HarnessError::Execution(err)) => {
                warn!(case, err = %err, "case execution failed");
                Ok(CaseResult::execution_failed(err.to_string()))
            }
            Err(err) => Err(err),
        }
    }
}
