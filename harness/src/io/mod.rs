//! I/O helpers for building and running solutions.

pub mod build;
pub mod config;
pub mod executor;
pub mod process;
pub mod suite;
