//! Result capture and persistence.
//!
//! Every `judge run` is recorded under `test_cases/results/<run-id>/` with a
//! `meta.json` and, when cases ran, a `verdicts.json` for later aggregation.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use harness::core::grading::{GradeSummary, Verdict};
use harness::core::types::Language;
use rand::{Rng, distributions::Alphanumeric};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, instrument, warn};

use crate::outcome::Outcome;

pub const META_FILE: &str = "meta.json";
pub const VERDICTS_FILE: &str = "verdicts.json";

/// Input for capturing one finished run.
#[derive(Debug)]
pub struct CaptureInput<'a> {
    pub run_id: &'a str,
    pub solution: &'a Path,
    pub language: Language,
    pub outcome: Outcome,
    pub summary: Option<GradeSummary>,
    pub verdicts: &'a [Verdict],
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Metadata for a run, persisted to `meta.json`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RunMeta {
    pub run_id: String,
    pub solution: String,
    pub language: Language,
    /// SHA-256 of the solution source, to tell runs of different revisions apart.
    pub source_hash: String,
    pub outcome: Outcome,
    /// Absent when the build failed.
    pub summary: Option<GradeSummary>,
    pub start_time: String,
    pub end_time: String,
    pub duration_secs: f64,
    /// Non-fatal errors encountered during capture.
    pub errors: Vec<String>,
}

/// `run-<UTC timestamp>-<6 random lowercase alphanumerics>`.
pub fn generate_run_id(now: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let short_id = std::iter::repeat_with(|| rng.sample(Alphanumeric))
        .map(char::from)
        .take(6)
        .collect::<String>()
        .to_lowercase();
    format!("run-{}-{short_id}", now.format("%Y%m%d_%H%M%S"))
}

pub fn run_dir(results_dir: &Path, run_id: &str) -> PathBuf {
    results_dir.join(run_id)
}

/// Write `meta.json` (and `verdicts.json` when cases ran) for a finished run.
#[instrument(skip_all, fields(run_id = %input.run_id))]
pub fn capture_run(results_dir: &Path, input: &CaptureInput<'_>) -> Result<PathBuf> {
    let dir = run_dir(results_dir, input.run_id);
    fs::create_dir_all(&dir).with_context(|| format!("create results dir {}", dir.display()))?;

    let mut errors = Vec::new();
    let source_hash = match file_sha256(input.solution) {
        Ok(hash) => hash,
        Err(err) => {
            errors.push(format!("source hash: {err}"));
            String::new()
        }
    };
    if !errors.is_empty() {
        warn!(errors = ?errors, "run capture had errors");
    }

    let duration = input.finished_at - input.started_at;
    let meta = RunMeta {
        run_id: input.run_id.to_string(),
        solution: input.solution.display().to_string(),
        language: input.language,
        source_hash,
        outcome: input.outcome,
        summary: input.summary,
        start_time: input.started_at.to_rfc3339(),
        end_time: input.finished_at.to_rfc3339(),
        duration_secs: duration.num_milliseconds() as f64 / 1000.0,
        errors,
    };
    write_json(&dir.join(META_FILE), &meta)?;
    if input.summary.is_some() {
        write_json(&dir.join(VERDICTS_FILE), &input.verdicts)?;
    }
    debug!(dir = %dir.display(), "run captured");
    Ok(dir)
}

pub fn read_meta(run_dir: &Path) -> Result<RunMeta> {
    read_json(&run_dir.join(META_FILE))
}

pub fn read_verdicts(run_dir: &Path) -> Result<Vec<Verdict>> {
    read_json(&run_dir.join(VERDICTS_FILE))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse {}", path.display()))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let contents = serde_json::to_string_pretty(value).context("serialize json")?;
    fs::write(path, format!("{contents}\n")).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

fn file_sha256(path: &Path) -> Result<String> {
    let contents = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let mut hasher = Sha256::new();
    hasher.update(contents);
    Ok(hex::encode(hasher.finalize()))
}
