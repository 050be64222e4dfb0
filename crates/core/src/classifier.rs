//! Per-repetition pass/fail classification.

use serde::{Deserialize, Serialize};

use crate::profile::RepCriterion;
use crate::segmenter::RepetitionCycle;
use crate::types::FrameIndex;

/// A finalized, classified repetition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Repetition {
    pub entry_frame: FrameIndex,
    pub peak_value: f64,
    pub peak_frame: FrameIndex,
    pub descent_value: f64,
    pub descent_frame: FrameIndex,
    pub exit_frame: FrameIndex,
    pub is_good: bool,
}

impl Repetition {
    pub fn classify(cycle: RepetitionCycle, criterion: &RepCriterion) -> Self {
        Self {
            entry_frame: cycle.entry_frame,
            peak_value: cycle.peak_value,
            peak_frame: cycle.peak_frame,
            descent_value: cycle.descent_value,
            descent_frame: cycle.descent_frame,
            exit_frame: cycle.exit_frame,
            is_good: passes(cycle.peak_value, criterion),
        }
    }
}

/// Whether an extremal value satisfies `criterion`.
///
/// Also used frame-by-frame for the fallback feedback heuristic.
pub fn passes(peak: f64, criterion: &RepCriterion) -> bool {
    match *criterion {
        RepCriterion::MaxPeak { max } => peak <= max,
        RepCriterion::PeakBand { min, max } => (min..=max).contains(&peak),
        RepCriterion::ClearsBar { min_clearance } => peak > min_clearance,
    }
}
