//! Build step: turn a solution source into something runnable.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Context;
use tracing::{debug, info, instrument, warn};

use crate::core::types::Language;
use crate::error::HarnessError;
use crate::io::config::HarnessConfig;
use crate::io::process::run_command;

/// A runnable solution: the compiled executable for C++, the untouched
/// source for Python.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub language: Language,
    pub path: PathBuf,
}

pub trait Builder {
    /// Build `source` once. A non-zero compiler exit is
    /// [`HarnessError::Compile`] with the full diagnostics.
    fn build(&self, source: &Path, language: Language) -> Result<Artifact, HarnessError>;
}

/// Builder that shells out to the configured compiler.
#[derive(Debug, Clone)]
pub struct ToolchainBuilder {
    config: HarnessConfig,
    artifact_path: PathBuf,
}

impl ToolchainBuilder {
    /// `artifact_path` is overwritten by every C++ build.
    pub fn new(config: HarnessConfig, artifact_path: impl Into<PathBuf>) -> Self {
        Self {
            config,
            artifact_path: artifact_path.into(),
        }
    }

    /// `<compiler> <source> -o <artifact> <flags...>`
    pub fn compile_command(&self, source: &Path) -> Command {
        let mut cmd = Command::new(&self.config.cpp.compiler);
        cmd.arg(source)
            .arg("-o")
            .arg(&self.artifact_path)
            .args(&self.config.cpp.flags);
        cmd
    }

    fn compile(&self, source: &Path) -> Result<Artifact, HarnessError> {
        if let Some(parent) = self.artifact_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("create artifact dir {}", parent.display()))?;
        }
        if self.artifact_path.exists() {
            debug!(artifact = %self.artifact_path.display(), "removing stale artifact");
            fs::remove_file(&self.artifact_path).with_context(|| {
                format!("remove stale artifact {}", self.artifact_path.display())
            })?;
        }

        let output = run_command(
            self.compile_command(source),
            None,
            self.config.compile_timeout(),
            self.config.output_limit_bytes,
        )
        .with_context(|| format!("run compiler {}", self.config.cpp.compiler))?;

        if output.timed_out {
            let timeout_secs = self.config.compile_timeout_secs.unwrap_or_default();
            warn!(timeout_secs, "compiler timed out");
            return Err(HarnessError::Compile {
                diagnostics: format!(
                    "compiler timed out after {timeout_secs}s\n{}",
                    output.stderr_lossy()
                ),
            });
        }
        if !output.status.success() {
            let mut diagnostics = output.stderr_lossy();
            let stdout = output.stdout_lossy();
            if !stdout.trim().is_empty() {
                diagnostics.push_str(&stdout);
            }
            warn!(exit_code = ?output.status.code(), "compilation failed");
            return Err(HarnessError::Compile { diagnostics });
        }

        info!(artifact = %self.artifact_path.display(), "compiled");
        Ok(Artifact {
            language: Language::Cpp,
            path: self.artifact_path.clone(),
        })
    }
}

impl Builder for ToolchainBuilder {
    #[instrument(skip_all, fields(language = %language, source = %source.display()))]
    fn build(&self, source: &Path, language: Language) -> Result<Artifact, HarnessError> {
        if !source.is_file() {
            return Err(HarnessError::Resource(format!(
                "solution source not found at {}",
                source.display()
            )));
        }
        match language {
            Language::Cpp => self.compile(source),
            Language::Python => {
                debug!("interpreted language, nothing to build");
                Ok(Artifact {
                    language,
                    path: source.to_path_buf(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder_with(compiler: &str, artifact: PathBuf) -> ToolchainBuilder {
        let mut config = HarnessConfig::default();
        config.cpp.compiler = compiler.to_string();
        ToolchainBuilder::new(config, artifact)
    }

    #[test]
    fn compile_command_pins_flags_after_output() {
        let builder = builder_with("g++", PathBuf::from("/ws/problem_executable"));
        let cmd = builder.compile_command(Path::new("/ws/solution.cpp"));
        assert_eq!(cmd.get_program(), "g++");
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(
            args,
            vec!["/ws/solution.cpp", "-o", "/ws/problem_executable", "-std=c++17"]
        );
    }

    #[test]
    fn python_build_returns_source() {
        let temp = tempfile::tempdir().expect("tempdir");
        let source = temp.path().join("solution.py");
        fs::write(&source, "print(1)\n").expect("write");

        let builder = builder_with("g++", temp.path().join("problem_executable"));
        let artifact = builder.build(&source, Language::Python).expect("build");
        assert_eq!(artifact.path, source);
        assert_eq!(artifact.language, Language::Python);
        assert!(!temp.path().join("problem_executable").exists());
    }

    #[test]
    fn missing_source_is_a_resource_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let builder = builder_with("g++", temp.path().join("a.out"));
        let err = builder
            .build(&temp.path().join("nope.cpp"), Language::Cpp)
            .expect_err("missing");
        assert!(matches!(err, HarnessError::Resource(_)));
    }

    #[cfg(unix)]
    #[test]
    fn failing_compiler_reports_full_diagnostics() {
        let temp = tempfile::tempdir().expect("tempdir");
        // `sh <source> -o <artifact> ...` runs the source as the "compiler".
        let source = temp.path().join("solution.cpp");
        fs::write(
            &source,
            "echo \"solution.cpp:3: error: expected ';'\" >&2\necho 'note: here' >&2\nexit 1\n",
        )
        .expect("write");

        let builder = builder_with("sh", temp.path().join("problem_executable"));
        let err = builder.build(&source, Language::Cpp).expect_err("compile error");
        match err {
            HarnessError::Compile { diagnostics } => {
                assert_eq!(
                    diagnostics,
                    "solution.cpp:3: error: expected ';'\nnote: here\n"
                );
            }
            other => panic!("expected compile error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn successful_compile_yields_artifact_path() {
        let temp = tempfile::tempdir().expect("tempdir");
        let source = temp.path().join("solution.cpp");
        fs::write(&source, "printf 'built' > \"$2\"\n").expect("write");
        let artifact_path = temp.path().join("bin").join("problem_executable");

        let builder = builder_with("sh", artifact_path.clone());
        let artifact = builder.build(&source, Language::Cpp).expect("build");
        assert_eq!(artifact.path, artifact_path);
        assert_eq!(fs::read_to_string(&artifact_path).expect("read"), "built");
    }

    #[test]
    fn missing_compiler_is_not_a_compile_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let source = temp.path().join("solution.cpp");
        fs::write(&source, "int main() {}\n").expect("write");

        let builder = builder_with("no-such-compiler-xyz", temp.path().join("a.out"));
        let err = builder.build(&source, Language::Cpp).expect_err("spawn fails");
        assert!(matches!(err, HarnessError::Other(_)));
    }
}
