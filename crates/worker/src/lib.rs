//! `formcheck-worker` library crate.
//!
//! Batch runner around `formcheck-core`: reads a workout request, analyzes
//! its sets in parallel and writes a workout report. The binary entrypoint
//! lives in `main.rs`; modules are public for integration testing.

pub mod config;
pub mod error;
pub mod request;
pub mod runner;
