//! Stable exit codes for the `judge` CLI.

/// Every graded case passed (custom cases are never graded).
pub const OK: i32 = 0;
/// Invalid invocation, missing test-case files, bad config or other errors.
pub const INVALID: i32 = 1;
/// The solution failed to compile; no case was run.
pub const COMPILE_ERROR: i32 = 2;
/// At least one graded case failed.
pub const FAILED: i32 = 3;
