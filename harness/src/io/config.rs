//! Toolchain configuration stored in `<workspace>/harness.toml`.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Harness configuration (TOML).
///
/// Every field has a default, so an empty or missing file is valid. Without
/// `execution_timeout_secs` a hung solution blocks the run indefinitely.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HarnessConfig {
    pub cpp: CppConfig,

    pub python: PythonConfig,

    /// Kill a case after this many seconds and record an execution error.
    pub execution_timeout_secs: Option<u64>,

    /// Kill the compiler after this many seconds and fail the build.
    pub compile_timeout_secs: Option<u64>,

    /// Keep at most this many bytes of stdout/stderr per process.
    pub output_limit_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CppConfig {
    pub compiler: String,
    /// Appended after `<source> -o <artifact>`.
    pub flags: Vec<String>,
    /// File name of the compiled executable inside the workspace.
    pub artifact_name: String,
}

impl Default for CppConfig {
    fn default() -> Self {
        Self {
            compiler: "g++".to_string(),
            flags: vec!["-std=c++17".to_string()],
            artifact_name: "problem_executable".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PythonConfig {
    pub interpreter: String,
}

impl Default for PythonConfig {
    fn default() -> Self {
        let interpreter = if cfg!(windows) { "python" } else { "python3" };
        Self {
            interpreter: interpreter.to_string(),
        }
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            cpp: CppConfig::default(),
            python: PythonConfig::default(),
            execution_timeout_secs: None,
            compile_timeout_secs: None,
            output_limit_bytes: 16 * 1024 * 1024,
        }
    }
}

impl HarnessConfig {
    pub fn validate(&self) -> Result<()> {
        if self.cpp.compiler.trim().is_empty() {
            return Err(anyhow!("cpp.compiler must be non-empty"));
        }
        if self.cpp.artifact_name.trim().is_empty() {
            return Err(anyhow!("cpp.artifact_name must be non-empty"));
        }
        if self.python.interpreter.trim().is_empty() {
            return Err(anyhow!("python.interpreter must be non-empty"));
        }
        if self.execution_timeout_secs == Some(0) {
            return Err(anyhow!("execution_timeout_secs must be > 0"));
        }
        if self.compile_timeout_secs == Some(0) {
            return Err(anyhow!("compile_timeout_secs must be > 0"));
        }
        if self.output_limit_bytes == 0 {
            return Err(anyhow!("output_limit_bytes must be > 0"));
        }
        Ok(())
    }

    pub fn execution_timeout(&self) -> Option<Duration> {
        self.execution_timeout_secs.map(Duration::from_secs)
    }

    pub fn compile_timeout(&self) -> Option<Duration> {
        self.compile_timeout_secs.map(Duration::from_secs)
    }

    /// Artifact file name with the platform executable suffix.
    pub fn artifact_file_name(&self) -> String {
        format!("{}{}", self.cpp.artifact_name, std::env::consts::EXE_SUFFIX)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `HarnessConfig::default()`.
pub fn load_config(path: &Path) -> Result<HarnessConfig> {
    if !path.exists() {
        let cfg = HarnessConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: HarnessConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &HarnessConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

/// Write `contents` next to `path` and rename it into place.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let mut tmp_name = path
        .file_name()
        .with_context(|| format!("path missing file name {}", path.display()))?
        .to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = parent.join(tmp_name);
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp file {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace {}", path.display()))?;
    Ok(())
}
