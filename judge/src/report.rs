//! Run aggregation and the HTML result page.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use harness::core::grading::{GradeSummary, Verdict, VerdictStatus};
use harness::core::types::Language;
use minijinja::{Environment, context};
use serde::Serialize;

use crate::outcome::Outcome;
use crate::results::{read_meta, read_verdicts};

const REPORT_TEMPLATE: &str = include_str!("templates/report.html");

#[derive(Debug, Default)]
pub struct ReportSummary {
    pub runs: usize,
    pub passed: usize,
    pub failed: usize,
    pub compile_error: usize,
    pub avg_duration_secs: Option<f64>,
    /// Per zero-based case index: (runs where it passed, runs where it was graded).
    pub case_pass_rates: BTreeMap<usize, (usize, usize)>,
}

pub fn load_run_dirs(results_dir: &Path) -> Result<Vec<PathBuf>> {
    if !results_dir.exists() {
        return Ok(Vec::new());
    }
    let mut dirs = Vec::new();
    for entry in
        fs::read_dir(results_dir).with_context(|| format!("read {}", results_dir.display()))?
    {
        let entry = entry.context("read entry")?;
        if entry.path().is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

pub fn aggregate(results_dir: &Path) -> Result<(ReportSummary, Vec<String>)> {
    let mut summary = ReportSummary::default();
    let mut warnings = Vec::new();

    for run_dir in load_run_dirs(results_dir)? {
        let meta = match read_meta(&run_dir) {
            Ok(meta) => meta,
            Err(err) => {
                warnings.push(format!(
                    "skip {}: meta.json invalid ({err:#})",
                    run_dir.display()
                ));
                continue;
            }
        };

        let verdicts = if meta.outcome == Outcome::CompileError {
            Vec::new()
        } else {
            match read_verdicts(&run_dir) {
                Ok(verdicts) => verdicts,
                Err(err) => {
                    warnings.push(format!(
                        "skip {}: verdicts.json invalid ({err:#})",
                        run_dir.display()
                    ));
                    continue;
                }
            }
        };

        summary.runs += 1;
        match meta.outcome {
            Outcome::Passed => summary.passed += 1,
            Outcome::Failed => summary.failed += 1,
            Outcome::CompileError => summary.compile_error += 1,
        }

        summary.avg_duration_secs = Some(match summary.avg_duration_secs {
            None => meta.duration_secs,
            Some(avg) => {
                let total = avg * (summary.runs as f64 - 1.0) + meta.duration_secs;
                total / summary.runs as f64
            }
        });

        for verdict in &verdicts {
            if let Some(passed) = verdict.passed {
                let entry = summary.case_pass_rates.entry(verdict.index).or_insert((0, 0));
                if passed {
                    entry.0 += 1;
                }
                entry.1 += 1;
            }
        }
    }

    Ok((summary, warnings))
}

#[derive(Debug, Serialize)]
struct RowContext<'a> {
    number: usize,
    status: String,
    class: &'static str,
    actual: &'a str,
    expected: &'a str,
    execution_error: Option<&'a str>,
}

impl<'a> RowContext<'a> {
    fn from_verdict(verdict: &'a Verdict) -> Self {
        let status = verdict.status();
        Self {
            number: verdict.index + 1,
            status: status.to_string(),
            class: match status {
                VerdictStatus::Passed => "passed",
                VerdictStatus::Failed => "failed",
                VerdictStatus::Custom => "custom",
            },
            actual: &verdict.actual,
            expected: verdict.expected_display(),
            execution_error: verdict.execution_error.as_deref(),
        }
    }
}

/// Render the result table for one run as a standalone HTML page.
pub fn render_html(
    solution: &Path,
    language: Language,
    summary: &GradeSummary,
    verdicts: &[Verdict],
) -> Result<String> {
    let mut env = Environment::new();
    env.add_template("report.html", REPORT_TEMPLATE)
        .context("load report template")?;
    let template = env.get_template("report.html")?;
    let rows: Vec<_> = verdicts.iter().map(RowContext::from_verdict).collect();
    let rendered = template.render(context! {
        solution => solution.display().to_string(),
        language => language.as_str(),
        summary_line => summary.to_string(),
        has_custom => verdicts.iter().any(|verdict| verdict.passed.is_none()),
        rows => rows,
    })?;
    Ok(rendered)
}
