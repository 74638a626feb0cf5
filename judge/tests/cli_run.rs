//! CLI tests for `judge`.
//!
//! Spawns the judge binary against throwaway workspaces and checks exit
//! codes plus the files each command leaves behind.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use harness::exit_codes;

fn judge(workspace: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_judge"))
        .current_dir(workspace)
        .args(args)
        .output()
        .expect("run judge")
}

fn write_cases(workspace: &Path, inputs: &str, expected: &str) {
    let cases = workspace.join("test_cases");
    fs::create_dir_all(&cases).expect("cases dir");
    fs::write(cases.join("input.txt"), inputs).expect("input");
    fs::write(cases.join("expected_output.txt"), expected).expect("expected");
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn missing_test_cases_exit_invalid() {
    let temp = tempfile::tempdir().expect("tempdir");
    fs::write(temp.path().join("solution.py"), "print(1)\n").expect("solution");

    let output = judge(temp.path(), &["run", "solution.py"]);

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(String::from_utf8_lossy(&output.stderr).contains("input.txt"));
}

#[test]
fn unsupported_extension_exits_invalid() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_cases(temp.path(), "a = 1\n", "1\n");
    fs::write(temp.path().join("solution.rb"), "puts 1\n").expect("solution");

    let output = judge(temp.path(), &["run", "solution.rb"]);

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(!temp.path().join("test_cases/output.txt").exists());
}

#[test]
fn inspect_prints_serialized_stdin() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_cases(temp.path(), "nums = [2 7 11 15], target = 9\nxs = [1 2\n", "");

    let output = judge(temp.path(), &["inspect"]);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let text = stdout(&output);
    assert!(text.contains("nums = [2 7 11 15]"));
    assert!(text.contains(r#"stdin: "2 7 11 15\n9\n""#));
    assert!(text.contains("issue:"));
}

#[cfg(unix)]
mod unix {
    use super::*;

    const SH_CONFIG: &str = "[cpp]\ncompiler = \"sh\"\nflags = []\n\n[python]\ninterpreter = \"sh\"\n";

    /// Prints `n * 2` for the single scalar on stdin.
    const DOUBLER: &str = "read n\necho $((n * 2))\n";

    fn sh_workspace(inputs: &str, expected: &str) -> tempfile::TempDir {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join("harness.toml"), SH_CONFIG).expect("config");
        write_cases(temp.path(), inputs, expected);
        temp
    }

    fn run_dirs(workspace: &Path) -> Vec<std::path::PathBuf> {
        let results = workspace.join("test_cases/results");
        match fs::read_dir(&results) {
            Ok(entries) => entries.map(|entry| entry.expect("entry").path()).collect(),
            Err(_) => Vec::new(),
        }
    }

    #[test]
    fn all_passing_exits_ok_and_captures_run() {
        let ws = sh_workspace("n = 1\nn = 2\n\nn = 5\n", "2\n4\n");
        fs::write(ws.path().join("solution.py"), DOUBLER).expect("solution");

        let output = judge(ws.path(), &["run", "solution.py", "--html", "report.html"]);

        assert_eq!(output.status.code(), Some(exit_codes::OK));
        let text = stdout(&output);
        assert!(text.contains("Test Case 3: Custom"));
        assert!(text.contains("Passed 2/2 official test cases. Run 3 total cases."));
        assert_eq!(
            fs::read_to_string(ws.path().join("test_cases/output.txt")).expect("output"),
            "2\n4\n10"
        );
        let runs = run_dirs(ws.path());
        assert_eq!(runs.len(), 1);
        assert!(runs[0].join("meta.json").is_file());
        assert!(runs[0].join("verdicts.json").is_file());
        let html = fs::read_to_string(ws.path().join("report.html")).expect("html");
        assert!(html.contains("Test Case 3"));
    }

    #[test]
    fn failing_case_exits_failed() {
        let ws = sh_workspace("n = 1\nn = 2\n", "2\n5\n");
        fs::write(ws.path().join("solution.py"), DOUBLER).expect("solution");

        let output = judge(ws.path(), &["run", "solution.py"]);

        assert_eq!(output.status.code(), Some(exit_codes::FAILED));
        let text = stdout(&output);
        assert!(text.contains("Test Case 2: Failed"));
        assert!(text.contains("Passed 1/2 official test cases. Run 2 total cases."));
    }

    #[test]
    fn json_flag_prints_verdicts() {
        let ws = sh_workspace("n = 4\n", "8\n");
        fs::write(ws.path().join("solution.py"), DOUBLER).expect("solution");

        let output = judge(ws.path(), &["run", "solution.py", "--json"]);

        assert_eq!(output.status.code(), Some(exit_codes::OK));
        let verdicts: serde_json::Value =
            serde_json::from_slice(&output.stdout).expect("json verdicts");
        assert_eq!(verdicts[0]["actual"], "8");
        assert_eq!(verdicts[0]["passed"], true);
    }

    #[test]
    fn compile_error_exits_compile_error() {
        let ws = sh_workspace("n = 1\n", "2\n");
        fs::write(
            ws.path().join("solution.cpp"),
            "echo \"solution.cpp:2:1: error: expected ';'\" >&2\nexit 1\n",
        )
        .expect("solution");

        let output = judge(ws.path(), &["run", "solution.cpp"]);

        assert_eq!(output.status.code(), Some(exit_codes::COMPILE_ERROR));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Compilation failed"));
        assert!(stderr.contains("expected ';'"));
        assert!(!ws.path().join("test_cases/output.txt").exists());
        let runs = run_dirs(ws.path());
        assert_eq!(runs.len(), 1);
        assert!(!runs[0].join("verdicts.json").exists());
    }

    #[test]
    fn report_then_clean() {
        let ws = sh_workspace("n = 1\n", "2\n");
        fs::write(ws.path().join("solution.py"), DOUBLER).expect("solution");
        assert_eq!(
            judge(ws.path(), &["run", "solution.py"]).status.code(),
            Some(exit_codes::OK)
        );

        let report = judge(ws.path(), &["report"]);
        assert_eq!(report.status.code(), Some(exit_codes::OK));
        let text = stdout(&report);
        assert!(text.contains("report: runs=1"));
        assert!(text.contains("report: case 1 1/1"));

        let clean = judge(ws.path(), &["clean"]);
        assert_eq!(clean.status.code(), Some(exit_codes::OK));
        assert!(!ws.path().join("test_cases/results").exists());
        assert!(!ws.path().join("test_cases/output.txt").exists());
        assert!(ws.path().join("test_cases/input.txt").exists());
    }
}
