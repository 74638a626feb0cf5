//! Solution run orchestration.
//!
//! Coordinates config loading, the harness session, and result capture.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use harness::core::grading::{CaseResult, Verdict};
use harness::core::types::Language;
use harness::error::HarnessError;
use harness::io::config::load_config;
use harness::io::suite::{SuitePaths, run_suite};
use harness::session::{HarnessReport, HarnessSession, SessionEvent};
use tracing::{debug, info, instrument};

use crate::config::{ConfigOverrides, apply_overrides};
use crate::outcome::{Outcome, classify_outcome};
use crate::results::{CaptureInput, capture_run, generate_run_id};

/// What `judge run` was asked to do.
#[derive(Debug)]
pub struct RunRequest<'a> {
    pub workspace: &'a Path,
    pub solution: &'a Path,
    pub language: Option<Language>,
    pub overrides: ConfigOverrides,
}

/// Result of running a solution against the workspace suite.
#[derive(Debug)]
pub struct RunOutcome {
    pub run_id: String,
    pub results_dir: PathBuf,
    pub language: Language,
    pub outcome: Outcome,
    /// Absent when the build failed.
    pub report: Option<HarnessReport>,
    /// Compiler output when the build failed.
    pub diagnostics: Option<String>,
}

impl RunOutcome {
    pub fn verdicts(&self) -> &[Verdict] {
        self.report
            .as_ref()
            .map(|report| report.verdicts.as_slice())
            .unwrap_or_default()
    }
}

/// Run a solution end to end: build, cases, grading, output file, capture.
///
/// A compile error is an [`Outcome`], not an `Err`; resource and unexpected
/// errors propagate.
#[instrument(skip_all, fields(solution = %request.solution.display()))]
pub fn run_solution(request: &RunRequest<'_>) -> Result<RunOutcome> {
    let language = match request.language {
        Some(language) => language,
        None => Language::from_path(request.solution)?,
    };
    let paths = SuitePaths::new(request.workspace);
    let config = load_config(&paths.config_path).context("load harness config")?;
    let config = apply_overrides(config, &request.overrides)?;
    let solution = absolute(request.solution)?;

    let started_at = Utc::now();
    let run_id = generate_run_id(started_at);
    info!(run_id, %language, "solution run started");

    let session = HarnessSession::with_toolchain(&config, paths.artifact_path(&config));
    let result = run_suite(&session, &paths, &solution, language, log_event);
    let finished_at = Utc::now();

    let (report, diagnostics) = match result {
        Ok(report) => (Some(report), None),
        Err(HarnessError::Compile { diagnostics }) => (None, Some(diagnostics)),
        Err(err) => return Err(err.into()),
    };
    let summary = report.as_ref().map(|report| report.summary);
    let outcome = classify_outcome(summary.as_ref());
    let verdicts = report
        .as_ref()
        .map(|report| report.verdicts.as_slice())
        .unwrap_or_default();

    let results_dir = capture_run(
        &paths.results_dir,
        &CaptureInput {
            run_id: &run_id,
            solution: &solution,
            language,
            outcome,
            summary,
            verdicts,
            started_at,
            finished_at,
        },
    )
    .context("capture run")?;

    info!(?outcome, results_dir = %results_dir.display(), "solution run complete");
    Ok(RunOutcome {
        run_id,
        results_dir,
        language,
        outcome,
        report,
        diagnostics,
    })
}

fn log_event(event: &SessionEvent<'_>) {
    match event {
        SessionEvent::Building { language } => debug!(%language, "building"),
        SessionEvent::Built { artifact } => {
            debug!(artifact = %artifact.path.display(), "built");
        }
        SessionEvent::CaseFinished {
            index,
            total,
            result,
        } => log_case(*index, *total, result),
        SessionEvent::Graded { summary } => debug!(%summary, "graded"),
    }
}

fn log_case(index: usize, total: usize, result: &CaseResult) {
    debug!(
        case = index + 1,
        total,
        failed = result.execution_error.is_some(),
        "case finished"
    );
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("resolve current dir")?;
    Ok(cwd.join(path))
}
