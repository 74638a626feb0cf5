//! Process runner: execute one artifact against one stdin blob.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Context;
use tracing::{debug, instrument, warn};

use crate::core::types::Language;
use crate::error::{ExecutionError, HarnessError};
use crate::io::build::Artifact;
use crate::io::config::HarnessConfig;
use crate::io::process::run_command;

pub trait ProgramRunner {
    /// Run `artifact` to completion with `stdin` and return its trimmed stdout.
    ///
    /// A non-zero exit (or a timeout) is [`HarnessError::Execution`]; failing
    /// to start the process at all is fatal.
    fn run(&self, artifact: &Artifact, stdin: &str) -> Result<String, HarnessError>;
}

/// Runner that spawns a fresh child process per call.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    config: HarnessConfig,
}

impl ProcessRunner {
    pub fn new(config: HarnessConfig) -> Self {
        Self { config }
    }

    /// Compiled artifacts run directly; Python sources go through the
    /// configured interpreter.
    pub fn command_for(&self, artifact: &Artifact) -> Command {
        match artifact.language {
            Language::Cpp => Command::new(executable_path(&artifact.path)),
            Language::Python => {
                let mut cmd = Command::new(&self.config.python.interpreter);
                cmd.arg(&artifact.path);
                cmd
            }
        }
    }
}

impl ProgramRunner for ProcessRunner {
    #[instrument(skip_all, fields(language = %artifact.language, stdin_bytes = stdin.len()))]
    fn run(&self, artifact: &Artifact, stdin: &str) -> Result<String, HarnessError> {
        let output = run_command(
            self.command_for(artifact),
            Some(stdin.as_bytes()),
            self.config.execution_timeout(),
            self.config.output_limit_bytes,
        )
        .with_context(|| format!("launch {}", artifact.path.display()))?;

        if output.timed_out {
            let timeout_secs = self.config.execution_timeout_secs.unwrap_or_default();
            warn!(timeout_secs, "solution timed out");
            return Err(ExecutionError::TimedOut {
                timeout_secs,
                stderr: output.stderr_lossy(),
            }
            .into());
        }
        if !output.status.success() {
            return Err(ExecutionError::NonZeroExit {
                exit_code: output.status.code(),
                stderr: output.stderr_lossy(),
            }
            .into());
        }

        let stdout = output.stdout_lossy();
        debug!(stdout_bytes = stdout.len(), "solution finished");
        Ok(stdout.trim().to_string())
    }
}

/// A bare file name would be looked up on `PATH`; anchor it to the current dir.
fn executable_path(path: &Path) -> PathBuf {
    if path.is_relative() && path.parent().is_none_or(|parent| parent.as_os_str().is_empty()) {
        Path::new(".").join(path)
    } else {
        path.to_path_buf()
    }
}
