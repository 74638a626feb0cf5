//! Invocation-level tests for the harness session.
//!
//! These drive `HarnessSession` end to end through scripted build and run
//! seams: one build, cases in order, sentinel substitution, and grading.

use std::path::Path;

use harness::core::grading::{EXECUTION_ERROR_SENTINEL, VerdictStatus};
use harness::core::types::Language;
use harness::error::HarnessError;
use harness::io::suite::run_suite;
use harness::session::{HarnessRequest, HarnessSession};
use harness::test_support::{Scripted, ScriptedBuilder, ScriptedRunner, TestWorkspace, lines};

fn request<'a>(declarations: &'a [String], expected: &'a [String]) -> HarnessRequest<'a> {
    HarnessRequest {
        solution: Path::new("solution.cpp"),
        language: Language::Cpp,
        declarations,
        expected,
    }
}

/// Two-sum style invocation: every case passes and each program sees the
/// serialized stdin for its own line.
#[test]
fn all_cases_pass_with_serialized_stdin() {
    let session = HarnessSession::new(
        ScriptedBuilder::succeeding(),
        ScriptedRunner::new(vec![
            Scripted::output("[0,1]\n"),
            Scripted::output("  [1,2]"),
            Scripted::output("[0,1]"),
        ]),
    );
    let declarations = lines(&[
        "nums = [2 7 11 15], target = 9",
        "nums = [3 2 4], target = 6",
        "nums = [3 3], target = 6",
    ]);
    let expected = lines(&["[0,1]", "[1,2]", "[0,1]"]);

    let report = session.run(&request(&declarations, &expected)).expect("run");

    assert_eq!(session.builder().builds(), 1);
    assert_eq!(
        session.runner().stdin_seen(),
        vec!["2 7 11 15\n9\n", "3 2 4\n6\n", "3 3\n6\n"]
    );
    assert_eq!(report.actual_outputs, vec!["[0,1]", "[1,2]", "[0,1]"]);
    assert_eq!(report.summary.passed, 3);
    assert_eq!(report.summary.pass_ratio(), Some(1.0));
    assert_eq!(
        report.summary.to_string(),
        "Passed 3/3 official test cases. Run 3 total cases."
    );
}

#[test]
fn compile_failure_runs_nothing() {
    let session = HarnessSession::new(
        ScriptedBuilder::failing("solution.cpp:4:5: error: expected ';' before '}' token"),
        ScriptedRunner::always(Scripted::output("1")),
    );
    let declarations = lines(&["a = 1", "a = 2"]);
    let expected = lines(&["1", "2"]);

    let err = session
        .run(&request(&declarations, &expected))
        .expect_err("compile error");

    match err {
        HarnessError::Compile { diagnostics } => {
            assert!(diagnostics.contains("expected ';'"));
        }
        other => panic!("expected compile error, got {other:?}"),
    }
    assert_eq!(session.builder().builds(), 1);
    assert!(session.runner().stdin_seen().is_empty());
}

/// A crash in case 3 of 5 fails only that case; the loop keeps going.
#[test]
fn crash_is_isolated_to_its_case() {
    let session = HarnessSession::new(
        ScriptedBuilder::succeeding(),
        ScriptedRunner::new(vec![
            Scripted::output("1"),
            Scripted::output("2"),
            Scripted::crash("Segmentation fault"),
            Scripted::output("4"),
            Scripted::output("5"),
        ]),
    );
    let declarations = lines(&["n = 1", "n = 2", "n = 3", "n = 4", "n = 5"]);
    let expected = lines(&["1", "2", "3", "4", "5"]);

    let report = session.run(&request(&declarations, &expected)).expect("run");

    assert_eq!(session.runner().stdin_seen().len(), 5);
    assert_eq!(report.actual_outputs[2], EXECUTION_ERROR_SENTINEL);
    let passed: Vec<_> = report.verdicts.iter().map(|v| v.passed).collect();
    assert_eq!(
        passed,
        vec![Some(true), Some(true), Some(false), Some(true), Some(true)]
    );
    assert_eq!(report.summary.passed, 4);
    assert_eq!(report.summary.execution_errors, 1);
    assert!(!report.summary.all_passed());
}

/// Extra declarations beyond the expected file are custom cases: they run
/// and are reported, but never count toward the pass ratio.
#[test]
fn extra_cases_are_ungraded() {
    let session = HarnessSession::new(
        ScriptedBuilder::succeeding(),
        ScriptedRunner::always(Scripted::output("x")),
    );
    let declarations = lines(&["a = 1", "a = 2", "a = 3", "a = 4", "a = 5"]);
    let expected = lines(&["x", "x", "y"]);

    let report = session.run(&request(&declarations, &expected)).expect("run");

    let passed: Vec<_> = report.verdicts.iter().map(|v| v.passed).collect();
    assert_eq!(passed, vec![Some(true), Some(true), Some(false), None, None]);
    assert_eq!(report.verdicts[4].status(), VerdictStatus::Custom);
    assert_eq!(report.verdicts[4].expected_display(), "N/A");
    assert_eq!(report.summary.graded, 3);
    assert_eq!(report.summary.total, 5);
    assert_eq!(report.summary.pass_ratio(), Some(2.0 / 3.0));
}

#[test]
fn repeated_runs_are_identical() {
    let declarations = lines(&["xs = [1 2 3], k = 2", "name = ab"]);
    let expected = lines(&["1 2 3 2", "ab"]);
    let session = HarnessSession::new(ScriptedBuilder::succeeding(), ScriptedRunner::echo());

    let first = session.run(&request(&declarations, &expected)).expect("first");
    let second = session.run(&request(&declarations, &expected)).expect("second");

    assert_eq!(first, second);
    assert!(first.summary.all_passed());
    assert_eq!(session.builder().builds(), 2);
}

/// Malformed declarations still produce a case, keeping outputs aligned
/// with input lines.
#[test]
fn malformed_line_still_runs() {
    let session = HarnessSession::new(ScriptedBuilder::succeeding(), ScriptedRunner::echo());
    let declarations = lines(&["nums = [1 2", "just some words", "k = 7"]);

    let report = session.run(&request(&declarations, &[])).expect("run");

    assert_eq!(
        session.runner().stdin_seen(),
        vec!["1 2\n", "\n", "7\n"]
    );
    assert_eq!(report.actual_outputs, vec!["1 2", "", "7"]);
    assert_eq!(report.summary.graded, 0);
    assert_eq!(report.summary.pass_ratio(), None);
}

#[test]
fn fatal_runner_error_aborts_without_outputs() {
    let ws = TestWorkspace::new().expect("workspace");
    ws.write_inputs(&["a = 1", "a = 2", "a = 3"]).expect("inputs");
    ws.write_expected(&["1", "2", "3"]).expect("expected");
    let solution = ws.write_solution("solution.py", "").expect("solution");

    let session = HarnessSession::new(
        ScriptedBuilder::succeeding(),
        ScriptedRunner::new(vec![
            Scripted::output("1"),
            Scripted::Fatal("interpreter vanished".to_string()),
            Scripted::output("3"),
        ]),
    );
    let err = run_suite(&session, &ws.paths, &solution, Language::Python, |_| {})
        .expect_err("fatal");

    assert!(!err.is_recoverable());
    assert_eq!(session.runner().stdin_seen().len(), 2);
    assert!(!ws.paths.output_path.exists());
}
