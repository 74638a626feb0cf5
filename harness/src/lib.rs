//! Judge-style test harness for single-file C++ and Python solutions.
//!
//! A run takes a solution source, one declaration line per test case
//! (`nums = [2 7 11 15], target = 9`) and the expected output lines, and
//! produces one verdict per case plus the raw program output. The crate is split
//! into two layers:
//!
//! - **[`core`]**: Pure, deterministic logic (declaration parsing, stdin
//!   serialization, grading). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (configuration, compiling, child
//!   process supervision, test-case files).
//!
//! [`session`] ties both together: it builds once, runs every case in order,
//! and grades the collected outputs.

pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod session;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
