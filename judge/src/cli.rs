//! CLI command implementations.
//!
//! Each command returns the process exit code; `Err` always maps to
//! [`exit_codes::INVALID`] in `main`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use harness::core::grading::{Verdict, VerdictStatus};
use harness::core::parser::parse_declaration;
use harness::core::serializer::serialize_bindings;
use harness::core::types::{Language, Value};
use harness::exit_codes;
use harness::io::config::{load_config, write_atomic};
use harness::io::suite::{SuitePaths, load_declarations};
use tracing::debug;

use crate::config::ConfigOverrides;
use crate::report::{aggregate, render_html};
use crate::run::{RunRequest, run_solution};

#[derive(Debug)]
pub struct RunArgs<'a> {
    pub solution: &'a Path,
    pub workspace: &'a Path,
    pub language: Option<Language>,
    pub overrides: ConfigOverrides,
    pub html: Option<&'a Path>,
    pub json: bool,
}

/// Run a solution against the workspace test cases and print the verdicts.
pub fn run_command(args: RunArgs<'_>) -> Result<i32> {
    let outcome = run_solution(&RunRequest {
        workspace: args.workspace,
        solution: args.solution,
        language: args.language,
        overrides: args.overrides,
    })?;

    let Some(report) = &outcome.report else {
        eprintln!(
            "Compilation failed:\n{}",
            outcome.diagnostics.as_deref().unwrap_or_default().trim_end()
        );
        eprintln!("run: id={} outcome=compile_error", outcome.run_id);
        return Ok(outcome.outcome.exit_code());
    };

    if args.json {
        let json = serde_json::to_string_pretty(outcome.verdicts()).context("serialize verdicts")?;
        println!("{json}");
    } else {
        for verdict in &report.verdicts {
            print_verdict(verdict);
        }
        println!("{}", report.summary);
    }

    if let Some(html_path) = args.html {
        let html = render_html(
            args.solution,
            outcome.language,
            &report.summary,
            &report.verdicts,
        )?;
        write_atomic(html_path, &html)?;
        debug!(path = %html_path.display(), "html report written");
    }

    eprintln!(
        "run: id={} outcome={:?} results={}",
        outcome.run_id,
        outcome.outcome,
        outcome.results_dir.display()
    );
    Ok(outcome.outcome.exit_code())
}

fn print_verdict(verdict: &Verdict) {
    let status = verdict.status();
    println!("Test Case {}: {status}", verdict.index + 1);
    if status == VerdictStatus::Failed {
        println!("  expected: {}", verdict.expected_display());
        println!("  actual:   {}", verdict.actual);
    }
    if let Some(error) = &verdict.execution_error {
        for line in error.lines() {
            println!("  | {line}");
        }
    }
}

/// Show how each declaration line is parsed and what stdin it produces.
pub fn inspect_command(workspace: &Path) -> Result<i32> {
    let paths = SuitePaths::new(workspace);
    let declarations = load_declarations(&paths)?;
    for (index, line) in declarations.iter().enumerate() {
        let parsed = parse_declaration(line);
        println!("case {}: {line}", index + 1);
        for binding in &parsed.bindings {
            match &binding.value {
                Value::Sequence(_) => println!("  {} = [{}]", binding.key, binding.value),
                Value::Scalar(_) => println!("  {} = {}", binding.key, binding.value),
            }
        }
        for issue in &parsed.issues {
            println!("  issue: {issue}");
        }
        println!("  stdin: {:?}", serialize_bindings(&parsed.bindings));
    }
    Ok(exit_codes::OK)
}

/// Show aggregated results over captured runs.
pub fn report_command(workspace: &Path) -> Result<i32> {
    let paths = SuitePaths::new(workspace);
    let (summary, warnings) = aggregate(&paths.results_dir)?;
    println!("report: runs={}", summary.runs);
    println!(
        "report: passed={} failed={} compile_error={}",
        summary.passed, summary.failed, summary.compile_error
    );
    if let Some(avg) = summary.avg_duration_secs {
        println!("report: avg_duration_secs={avg:.2}");
    }
    for (index, (passed, graded)) in &summary.case_pass_rates {
        println!("report: case {} {passed}/{graded}", index + 1);
    }
    for warning in warnings {
        eprintln!("warning: {warning}");
    }
    Ok(exit_codes::OK)
}

/// Remove captured results, `output.txt` and the compiled artifact.
pub fn clean_command(workspace: &Path) -> Result<i32> {
    let paths = SuitePaths::new(workspace);
    let config = load_config(&paths.config_path).context("load harness config")?;
    let artifact = paths.artifact_path(&config);

    if paths.results_dir.exists() {
        fs::remove_dir_all(&paths.results_dir)
            .with_context(|| format!("remove {}", paths.results_dir.display()))?;
    }
    for file in [&paths.output_path, &artifact] {
        if file.exists() {
            fs::remove_file(file).with_context(|| format!("remove {}", file.display()))?;
        }
    }

    println!(
        "clean: results={} output={} artifact={}",
        paths.results_dir.display(),
        paths.output_path.display(),
        artifact.display()
    );
    Ok(exit_codes::OK)
}
