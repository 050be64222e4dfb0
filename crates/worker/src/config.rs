//! Worker configuration loaded from environment variables.

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;

use formcheck_core::config::{AnalysisConfig, DEFAULT_MIN_VISIBILITY};
use formcheck_core::feedback::DEFAULT_CAUTIONARY_BAD_FRACTION;

use crate::error::WorkerError;

/// Used when the available parallelism cannot be queried.
const FALLBACK_MAX_PARALLEL: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct WorkerConfig {
    /// Workout request JSON to analyze.
    pub input: PathBuf,
    /// Report destination; `None` writes to stdout.
    pub output: Option<PathBuf>,
    pub analysis: AnalysisConfig,
    /// Upper bound on sets analyzed concurrently.
    pub max_parallel: usize,
}

impl WorkerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                      | Default                 |
    /// |------------------------------|-------------------------|
    /// | `FORMCHECK_INPUT`            | first CLI argument      |
    /// | `FORMCHECK_OUTPUT`           | stdout                  |
    /// | `FORMCHECK_MIN_VISIBILITY`   | `0.5`                   |
    /// | `FORMCHECK_CAUTION_FRACTION` | `0.30`                  |
    /// | `FORMCHECK_MAX_PARALLEL`     | available parallelism   |
    ///
    /// Unparseable or out-of-range values are errors.
    pub fn from_env() -> Result<Self, WorkerError> {
        Self::from_lookup(|key| std::env::var(key).ok(), std::env::args().nth(1))
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        first_arg: Option<String>,
    ) -> Result<Self, WorkerError> {
        let input = lookup("FORMCHECK_INPUT")
            .or(first_arg)
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| {
                WorkerError::Config(
                    "no input: set FORMCHECK_INPUT or pass a request path".to_string(),
                )
            })?;

        let output = lookup("FORMCHECK_OUTPUT")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let analysis = AnalysisConfig {
            min_visibility: parse_or(&lookup, "FORMCHECK_MIN_VISIBILITY", DEFAULT_MIN_VISIBILITY)?,
            cautionary_bad_fraction: parse_or(
                &lookup,
                "FORMCHECK_CAUTION_FRACTION",
                DEFAULT_CAUTIONARY_BAD_FRACTION,
            )?,
        };
        analysis.validate()?;

        let default_parallel = std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(FALLBACK_MAX_PARALLEL);
        let max_parallel: usize = parse_or(&lookup, "FORMCHECK_MAX_PARALLEL", default_parallel)?;
        if max_parallel == 0 {
            return Err(WorkerError::Config(
                "FORMCHECK_MAX_PARALLEL must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            input,
            output,
            analysis,
            max_parallel,
        })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, WorkerError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| WorkerError::Config(format!("{key} has invalid value '{raw}'"))),
    }
}
