//! Overall feedback decision table.
//!
//! One table maps a "fraction bad" to a feedback level. The set aggregator
//! feeds it the fraction of bad reps, or the fraction of bad in-motion frames
//! when no rep completed, so both granularities share the same policy.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::profile::ExerciseProfile;
use crate::threshold_validation::validate_unit_range;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Sets with more than this fraction of bad reps get cautionary feedback.
pub const DEFAULT_CAUTIONARY_BAD_FRACTION: f64 = 0.30;

pub const AFFIRMING_MESSAGE: &str = "Great form!";
pub const NO_REPETITIONS_MESSAGE: &str = "No repetitions detected";
pub const NO_USABLE_FRAMES_MESSAGE: &str = "No pose detected in video";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackLevel {
    Affirming,
    Cautionary,
    /// Nothing to judge: no reps and no frames in motion.
    Inconclusive,
}

/// One row of the table: fractions strictly above `above` map to `level`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedbackRule {
    pub above: f64,
    pub level: FeedbackLevel,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackTable {
    /// Sorted by `above`, highest first.
    rules: Vec<FeedbackRule>,
    /// Level when no rule matches.
    otherwise: FeedbackLevel,
}

impl Default for FeedbackTable {
    fn default() -> Self {
        Self {
            rules: vec![FeedbackRule {
                above: DEFAULT_CAUTIONARY_BAD_FRACTION,
                level: FeedbackLevel::Cautionary,
            }],
            otherwise: FeedbackLevel::Affirming,
        }
    }
}

impl FeedbackTable {
    pub fn new(mut rules: Vec<FeedbackRule>, otherwise: FeedbackLevel) -> Result<Self, CoreError> {
        for rule in &rules {
            validate_unit_range(rule.above, "feedback rule threshold")?;
        }
        rules.sort_by(|a, b| b.above.total_cmp(&a.above));
        Ok(Self { rules, otherwise })
    }

    /// The default two-level table with a custom cautionary threshold.
    pub fn with_cautionary_threshold(above: f64) -> Result<Self, CoreError> {
        Self::new(
            vec![FeedbackRule {
                above,
                level: FeedbackLevel::Cautionary,
            }],
            FeedbackLevel::Affirming,
        )
    }

    pub fn level_for(&self, bad_fraction: f64) -> FeedbackLevel {
        self.rules
            .iter()
            .find(|rule| bad_fraction > rule.above)
            .map_or(self.otherwise, |rule| rule.level)
    }
}

/// Display text for a level under a given profile.
pub fn message_for(level: FeedbackLevel, profile: &ExerciseProfile) -> &'static str {
    match level {
        FeedbackLevel::Affirming => AFFIRMING_MESSAGE,
        FeedbackLevel::Cautionary => profile.cautionary_message,
        FeedbackLevel::Inconclusive => NO_REPETITIONS_MESSAGE,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
