//! Form analysis engine.
//!
//! Turns a per-frame landmark stream for one exercise video into detected
//! repetitions, per-rep verdicts, and set- and workout-level scores. Every
//! module here is pure: no I/O, no clocks, no randomness.

pub mod aggregate;
pub mod analysis;
pub mod angle;
pub mod classifier;
pub mod config;
pub mod error;
pub mod feedback;
pub mod landmark;
pub mod profile;
pub mod segmenter;
pub mod signal;
pub mod threshold_validation;
pub mod types;
pub mod workout;
