//! Tunable analysis settings shared by every set in a run.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::feedback::{FeedbackTable, DEFAULT_CAUTIONARY_BAD_FRACTION};
use crate::threshold_validation::validate_unit_range;

/// Landmarks reported with lower visibility than this are treated as absent.
pub const DEFAULT_MIN_VISIBILITY: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub min_visibility: f64,
    pub cautionary_bad_fraction: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_visibility: DEFAULT_MIN_VISIBILITY,
            cautionary_bad_fraction: DEFAULT_CAUTIONARY_BAD_FRACTION,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_unit_range(self.min_visibility, "min_visibility")?;
        validate_unit_range(self.cautionary_bad_fraction, "cautionary_bad_fraction")?;
        Ok(())
    }

    pub fn feedback_table(&self) -> Result<FeedbackTable, CoreError> {
        FeedbackTable::with_cautionary_threshold(self.cautionary_bad_fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn visibility_out_of_range_rejected() {
        let config = AnalysisConfig {
            min_visibility: 1.2,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn fraction_out_of_range_rejected() {
        let config = AnalysisConfig {
            cautionary_bad_fraction: -0.1,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
