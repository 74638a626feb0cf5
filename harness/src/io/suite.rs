//! Test-case files in a workspace.
//!
//! ```text
//! <workspace>/
//!   harness.toml                  optional toolchain config
//!   problem_executable            compiled C++ artifact
//!   test_cases/
//!     input.txt                   one declaration line per case
//!     expected_output.txt         expected outputs, aligned by line
//!     output.txt                  actual outputs, written after a run
//!     results/<run-id>/           captured runs
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info, instrument};

use crate::core::types::Language;
use crate::error::HarnessError;
use crate::io::build::Builder;
use crate::io::config::{HarnessConfig, write_atomic};
use crate::io::executor::ProgramRunner;
use crate::session::{HarnessReport, HarnessRequest, HarnessSession, SessionEvent};

/// All canonical paths for a workspace root.
#[derive(Debug, Clone)]
pub struct SuitePaths {
    pub root: PathBuf,
    pub cases_dir: PathBuf,
    pub input_path: PathBuf,
    pub expected_path: PathBuf,
    pub output_path: PathBuf,
    pub results_dir: PathBuf,
    pub config_path: PathBuf,
}

impl SuitePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let cases_dir = root.join("test_cases");
        Self {
            root: root.clone(),
            cases_dir: cases_dir.clone(),
            input_path: cases_dir.join("input.txt"),
            expected_path: cases_dir.join("expected_output.txt"),
            output_path: cases_dir.join("output.txt"),
            results_dir: cases_dir.join("results"),
            config_path: root.join("harness.toml"),
        }
    }

    pub fn artifact_path(&self, config: &HarnessConfig) -> PathBuf {
        self.root.join(config.artifact_file_name())
    }
}

/// Declarations and expected outputs read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suite {
    pub declarations: Vec<String>,
    pub expected: Vec<String>,
}

/// Read both test-case files, dropping blank lines.
pub fn load_suite(paths: &SuitePaths) -> Result<Suite, HarnessError> {
    let declarations = load_declarations(paths)?;
    require_file(&paths.expected_path)?;
    let suite = Suite {
        declarations,
        expected: read_non_blank_lines(&paths.expected_path)?,
    };
    debug!(
        declarations = suite.declarations.len(),
        expected = suite.expected.len(),
        "suite loaded"
    );
    Ok(suite)
}

/// Read only `input.txt`; the expected file may be absent.
pub fn load_declarations(paths: &SuitePaths) -> Result<Vec<String>, HarnessError> {
    if !paths.root.is_dir() {
        return Err(HarnessError::Resource(format!(
            "workspace not found at {}",
            paths.root.display()
        )));
    }
    require_file(&paths.input_path)?;
    read_non_blank_lines(&paths.input_path)
}

fn require_file(path: &Path) -> Result<(), HarnessError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(HarnessError::Resource(format!(
            "test cases not found at {}",
            path.display()
        )))
    }
}

fn read_non_blank_lines(path: &Path) -> Result<Vec<String>, HarnessError> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    Ok(non_blank_lines(&contents))
}

/// Lines that are not blank after trimming, with any `\r` removed.
pub fn non_blank_lines(contents: &str) -> Vec<String> {
    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect()
}

/// Write actual outputs joined by `\n`, replacing any previous file at once.
pub fn write_outputs(path: &Path, outputs: &[String]) -> Result<(), HarnessError> {
    write_atomic(path, &outputs.join("\n"))?;
    Ok(())
}

/// Load the suite, run the session and write `output.txt`.
///
/// Nothing is written when the invocation fails.
#[instrument(skip_all, fields(workspace = %paths.root.display(), language = %language))]
pub fn run_suite<B, R, F>(
    session: &HarnessSession<B, R>,
    paths: &SuitePaths,
    solution: &Path,
    language: Language,
    on_event: F,
) -> Result<HarnessReport, HarnessError>
where
    B: Builder,
    R: ProgramRunner,
    F: FnMut(&SessionEvent<'_>),
{
    let suite = load_suite(paths)?;
    let report = session.run_with_progress(
        &HarnessRequest {
            solution,
            language,
            declarations: &suite.declarations,
            expected: &suite.expected,
        },
        on_event,
    )?;
    write_outputs(&paths.output_path, &report.actual_outputs)?;
    info!(output = %paths.output_path.display(), "outputs written");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Scripted, ScriptedBuilder, ScriptedRunner, TestWorkspace};

    #[test]
    fn paths_are_stable() {
        let paths = SuitePaths::new("/ws");
        assert_eq!(paths.input_path, PathBuf::from("/ws/test_cases/input.txt"));
        assert_eq!(
            paths.expected_path,
            PathBuf::from("/ws/test_cases/expected_output.txt")
        );
        assert_eq!(paths.output_path, PathBuf::from("/ws/test_cases/output.txt"));
        assert_eq!(paths.config_path, PathBuf::from("/ws/harness.toml"));
        let artifact = paths.artifact_path(&HarnessConfig::default());
        assert_eq!(
            artifact,
            PathBuf::from(format!(
                "/ws/problem_executable{}",
                std::env::consts::EXE_SUFFIX
            ))
        );
    }

    #[test]
    fn blank_lines_are_dropped() {
        assert_eq!(
            non_blank_lines("a = 1\r\n\n   \nb = 2\n"),
            vec!["a = 1", "b = 2"]
        );
    }

    #[test]
    fn missing_expected_file_is_a_resource_error() {
        let ws = TestWorkspace::new().expect("workspace");
        ws.write_inputs(&["a = 1"]).expect("inputs");
        let err = load_suite(&ws.paths).expect_err("missing expected");
        match err {
            HarnessError::Resource(message) => assert!(message.contains("expected_output.txt")),
            other => panic!("expected resource error, got {other:?}"),
        }
    }

    #[test]
    fn missing_workspace_is_a_resource_error() {
        let err = load_suite(&SuitePaths::new("/definitely/not/here")).expect_err("missing");
        assert!(matches!(err, HarnessError::Resource(_)));
    }

    #[test]
    fn run_suite_writes_outputs_once() {
        let ws = TestWorkspace::new().expect("workspace");
        ws.write_inputs(&["a = 1", "", "a = [2 3]"]).expect("inputs");
        ws.write_expected(&["1"]).expect("expected");
        let solution = ws.write_solution("solution.py", "").expect("solution");

        let session = HarnessSession::new(ScriptedBuilder::succeeding(), ScriptedRunner::echo());
        let report = run_suite(&session, &ws.paths, &solution, Language::Python, |_| {})
            .expect("run");

        assert_eq!(report.actual_outputs, vec!["1", "2 3"]);
        assert_eq!(ws.read_outputs().expect("outputs"), "1\n2 3");
        assert_eq!(report.summary.graded, 1);
        assert_eq!(report.summary.total, 2);
    }

    #[test]
    fn compile_error_leaves_no_output_file() {
        let ws = TestWorkspace::new().expect("workspace");
        ws.write_inputs(&["a = 1"]).expect("inputs");
        ws.write_expected(&["1"]).expect("expected");
        let solution = ws.write_solution("solution.cpp", "").expect("solution");

        let session = HarnessSession::new(
            ScriptedBuilder::failing("error: expected ';'"),
            ScriptedRunner::always(Scripted::output("1")),
        );
        let err = run_suite(&session, &ws.paths, &solution, Language::Cpp, |_| {})
            .expect_err("compile error");
        assert!(matches!(err, HarnessError::Compile { .. }));
        assert!(!ws.paths.output_path.exists());
        assert!(session.runner().stdin_seen().is_empty());
    }
}
