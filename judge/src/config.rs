//! Harness configuration merging.
//!
//! Applies command-line overrides on top of the workspace `harness.toml`.

use anyhow::Result;
use harness::io::config::HarnessConfig;

/// Toolchain settings given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub timeout_secs: Option<u64>,
    pub interpreter: Option<String>,
    pub compiler: Option<String>,
}

/// Apply command-line overrides to the base harness config.
pub fn apply_overrides(mut base: HarnessConfig, overrides: &ConfigOverrides) -> Result<HarnessConfig> {
    if let Some(timeout_secs) = overrides.timeout_secs {
        base.execution_timeout_secs = Some(timeout_secs);
    }
    if let Some(interpreter) = &overrides.interpreter {
        base.python.interpreter = interpreter.clone();
    }
    if let Some(compiler) = &overrides.compiler {
        base.cpp.compiler = compiler.clone();
    }
    base.validate()?;
    Ok(base)
}
