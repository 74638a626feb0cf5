//! Test-only helpers: scripted build/run seams and a throwaway workspace.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

use crate::core::types::Language;
use crate::error::{ExecutionError, HarnessError};
use crate::io::build::{Artifact, Builder};
use crate::io::executor::ProgramRunner;
use crate::io::suite::SuitePaths;

/// Owned lines from string literals.
pub fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

/// Builder that never touches a compiler.
pub struct ScriptedBuilder {
    diagnostics: Option<String>,
    builds: Cell<usize>,
}

impl ScriptedBuilder {
    /// Every build succeeds with the source itself as the artifact.
    pub fn succeeding() -> Self {
        Self {
            diagnostics: None,
            builds: Cell::new(0),
        }
    }

    /// Every build fails with `diagnostics`.
    pub fn failing(diagnostics: &str) -> Self {
        Self {
            diagnostics: Some(diagnostics.to_string()),
            builds: Cell::new(0),
        }
    }

    pub fn builds(&self) -> usize {
        self.builds.get()
    }
}

impl Builder for ScriptedBuilder {
    fn build(&self, source: &Path, language: Language) -> Result<Artifact, HarnessError> {
        self.builds.set(self.builds.get() + 1);
        match &self.diagnostics {
            Some(diagnostics) => Err(HarnessError::Compile {
                diagnostics: diagnostics.clone(),
            }),
            None => Ok(Artifact {
                language,
                path: source.to_path_buf(),
            }),
        }
    }
}

/// One queued response of a [`ScriptedRunner`].
#[derive(Debug, Clone)]
pub enum Scripted {
    /// Process exits 0 and prints this (trimmed like the real runner).
    Output(String),
    /// Process exits 1 with this stderr.
    Crash(String),
    /// The runner itself fails (e.g. interpreter missing).
    Fatal(String),
    /// Process exits 0 and prints its stdin with whitespace collapsed.
    Echo,
}

impl Scripted {
    pub fn output(text: &str) -> Self {
        Scripted::Output(text.to_string())
    }

    pub fn crash(stderr: &str) -> Self {
        Scripted::Crash(stderr.to_string())
    }
}

/// Runner that replays queued responses and records every stdin it receives.
pub struct ScriptedRunner {
    queue: RefCell<VecDeque<Scripted>>,
    fallback: Option<Scripted>,
    stdin_seen: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new(responses: Vec<Scripted>) -> Self {
        Self {
            queue: RefCell::new(responses.into()),
            fallback: None,
            stdin_seen: RefCell::new(Vec::new()),
        }
    }

    /// Respond with `response` to every call.
    pub fn always(response: Scripted) -> Self {
        Self {
            fallback: Some(response),
            ..Self::new(Vec::new())
        }
    }

    /// Echo each case's stdin back as its output (newlines become spaces).
    pub fn echo() -> Self {
        Self::always(Scripted::Echo)
    }

    pub fn stdin_seen(&self) -> Vec<String> {
        self.stdin_seen.borrow().clone()
    }
}

impl ProgramRunner for ScriptedRunner {
    fn run(&self, _artifact: &Artifact, stdin: &str) -> Result<String, HarnessError> {
        self.stdin_seen.borrow_mut().push(stdin.to_string());
        let next = self
            .queue
            .borrow_mut()
            .pop_front()
            .or_else(|| self.fallback.clone());
        match next {
            Some(Scripted::Echo) => Ok(stdin.split_whitespace().collect::<Vec<_>>().join(" ")),
            Some(Scripted::Output(text)) => Ok(text.trim().to_string()),
            Some(Scripted::Crash(stderr)) => Err(ExecutionError::NonZeroExit {
                exit_code: Some(1),
                stderr,
            }
            .into()),
            Some(Scripted::Fatal(message)) => Err(HarnessError::Other(anyhow!(message))),
            None => Err(HarnessError::Other(anyhow!("no scripted response left"))),
        }
    }
}

/// A temporary workspace laid out like a real one (`test_cases/...`).
pub struct TestWorkspace {
    temp: tempfile::TempDir,
    pub paths: SuitePaths,
}

impl TestWorkspace {
    pub fn new() -> Result<Self> {
        let temp = tempfile::tempdir().context("create temp workspace")?;
        let paths = SuitePaths::new(temp.path());
        fs::create_dir_all(&paths.cases_dir)
            .with_context(|| format!("create {}", paths.cases_dir.display()))?;
        Ok(Self { temp, paths })
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn write_inputs(&self, declarations: &[&str]) -> Result<()> {
        write_lines(&self.paths.input_path, declarations)
    }

    pub fn write_expected(&self, expected: &[&str]) -> Result<()> {
        write_lines(&self.paths.expected_path, expected)
    }

    pub fn write_config(&self, contents: &str) -> Result<()> {
        fs::write(&self.paths.config_path, contents)
            .with_context(|| format!("write {}", self.paths.config_path.display()))
    }

    /// Write a solution file into the workspace root and return its path.
    pub fn write_solution(&self, name: &str, body: &str) -> Result<PathBuf> {
        let path = self.path().join(name);
        fs::write(&path, body).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }

    pub fn read_outputs(&self) -> Result<String> {
        fs::read_to_string(&self.paths.output_path)
            .with_context(|| format!("read {}", self.paths.output_path.display()))
    }
}

fn write_lines(path: &Path, lines: &[&str]) -> Result<()> {
    let mut contents = lines.join("\n");
    contents.push('\n');
    fs::write(path, contents).with_context(|| format!("write {}", path.display()))
}
