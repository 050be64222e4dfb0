//! Set-level aggregation (one video → one [`SetResult`]).

use serde::{Deserialize, Serialize};

use crate::classifier::{passes, Repetition};
use crate::error::CoreError;
use crate::feedback::{message_for, FeedbackLevel, FeedbackTable, NO_USABLE_FRAMES_MESSAGE};
use crate::profile::{ExerciseProfile, ExerciseType};
use crate::signal::SignalSample;

// ---------------------------------------------------------------------------
// SetStatus
// ---------------------------------------------------------------------------

/// Whether a set could be scored, and if not, why.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetStatus {
    Scored,
    NoRepetitionsDetected,
    NoUsableFrames,
}

// ---------------------------------------------------------------------------
// FrameStats
// ---------------------------------------------------------------------------

/// Frame-level counts for one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub analyzed: usize,
    pub usable: usize,
    /// Usable frames whose signal was outside the rest band.
    pub in_motion: usize,
    /// In-motion frames whose value would fail the rep criterion.
    pub in_motion_bad: usize,
}

impl FrameStats {
    pub fn collect(samples: &[SignalSample], profile: &ExerciseProfile) -> Self {
        let seg = &profile.segmentation;
        let enter_level = profile.direction.orient(seg.rest_threshold) + seg.hysteresis;

        let mut stats = Self {
            analyzed: samples.len(),
            ..Self::default()
        };
        for value in samples.iter().filter_map(|s| s.value) {
            stats.usable += 1;
            if profile.direction.orient(value) > enter_level {
                stats.in_motion += 1;
                if !passes(value, &profile.criterion) {
                    stats.in_motion_bad += 1;
                }
            }
        }
        stats
    }

    /// Fraction of in-motion frames failing the criterion, if any were in
    /// motion.
    pub fn bad_fraction(&self) -> Option<f64> {
        (self.in_motion > 0).then(|| self.in_motion_bad as f64 / self.in_motion as f64)
    }
}

// ---------------------------------------------------------------------------
// SetResult
// ---------------------------------------------------------------------------

/// Serialized shape of a set. Deserializing goes through
/// [`SetResult::try_from`], which checks the counts, status and score
/// against each other.
#[derive(Serialize, Deserialize)]
struct SetRecord {
    exercise: ExerciseType,
    status: SetStatus,
    total_frames_analyzed: usize,
    usable_frames: usize,
    total_reps: usize,
    good_reps: usize,
    bad_reps: usize,
    incomplete_cycles: usize,
    average_peak_angle: Option<f64>,
    average_descent_angle: Option<f64>,
    feedback_level: FeedbackLevel,
    overall_feedback: String,
    score: Option<f64>,
    repetitions: Vec<Repetition>,
}

/// Largest gap tolerated between a stored score and `good / total`.
const SCORE_TOLERANCE: f64 = 1e-9;

/// Aggregate outcome of one analyzed video.
///
/// Built once by [`aggregate_set`] and read through accessors; edits to a
/// workout recompute sets from their source frames rather than patching
/// them. `good_reps + bad_reps == total_reps` holds for every value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "SetRecord", try_from = "SetRecord")]
pub struct SetResult {
    exercise: ExerciseType,
    status: SetStatus,
    total_frames_analyzed: usize,
    usable_frames: usize,
    total_reps: usize,
    good_reps: usize,
    bad_reps: usize,
    incomplete_cycles: usize,
    average_peak_angle: Option<f64>,
    average_descent_angle: Option<f64>,
    feedback_level: FeedbackLevel,
    overall_feedback: String,
    score: Option<f64>,
    repetitions: Vec<Repetition>,
}

fn inconsistent(detail: String) -> CoreError {
    CoreError::Validation(format!("inconsistent set result: {detail}"))
}

impl TryFrom<SetRecord> for SetResult {
    type Error = CoreError;

    fn try_from(r: SetRecord) -> Result<Self, CoreError> {
        if r.good_reps + r.bad_reps != r.total_reps {
            return Err(inconsistent(format!(
                "good_reps ({}) + bad_reps ({}) != total_reps ({})",
                r.good_reps, r.bad_reps, r.total_reps
            )));
        }
        if r.repetitions.len() != r.total_reps {
            return Err(inconsistent(format!(
                "{} repetitions listed for total_reps {}",
                r.repetitions.len(),
                r.total_reps
            )));
        }
        let listed_good = r.repetitions.iter().filter(|rep| rep.is_good).count();
        if listed_good != r.good_reps {
            return Err(inconsistent(format!(
                "{listed_good} good repetitions listed for good_reps {}",
                r.good_reps
            )));
        }
        if r.usable_frames > r.total_frames_analyzed {
            return Err(inconsistent(format!(
                "usable_frames ({}) exceeds total_frames_analyzed ({})",
                r.usable_frames, r.total_frames_analyzed
            )));
        }

        let expected_status = status_for(r.usable_frames, r.total_reps);
        if r.status != expected_status {
            return Err(inconsistent(format!(
                "status {:?} does not match counts (expected {expected_status:?})",
                r.status
            )));
        }
        let expected_score = score_for(expected_status, r.good_reps, r.total_reps);
        let score_matches = match (r.score, expected_score) {
            (Some(stored), Some(expected)) => (stored - expected).abs() <= SCORE_TOLERANCE,
            (None, None) => true,
            _ => false,
        };
        if !score_matches {
            return Err(inconsistent(format!(
                "score {:?} does not match counts (expected {expected_score:?})",
                r.score
            )));
        }

        Ok(Self {
            exercise: r.exercise,
            status: r.status,
            total_frames_analyzed: r.total_frames_analyzed,
            usable_frames: r.usable_frames,
            total_reps: r.total_reps,
            good_reps: r.good_reps,
            bad_reps: r.bad_reps,
            incomplete_cycles: r.incomplete_cycles,
            average_peak_angle: r.average_peak_angle,
            average_descent_angle: r.average_descent_angle,
            feedback_level: r.feedback_level,
            overall_feedback: r.overall_feedback,
            score: expected_score,
            repetitions: r.repetitions,
        })
    }
}

impl From<SetResult> for SetRecord {
    fn from(set: SetResult) -> Self {
        Self {
            exercise: set.exercise,
            status: set.status,
            total_frames_analyzed: set.total_frames_analyzed,
            usable_frames: set.usable_frames,
            total_reps: set.total_reps,
            good_reps: set.good_reps,
            bad_reps: set.bad_reps,
            incomplete_cycles: set.incomplete_cycles,
            average_peak_angle: set.average_peak_angle,
            average_descent_angle: set.average_descent_angle,
            feedback_level: set.feedback_level,
            overall_feedback: set.overall_feedback,
            score: set.score,
            repetitions: set.repetitions,
        }
    }
}

impl SetResult {
    pub fn exercise(&self) -> ExerciseType {
        self.exercise
    }

    pub fn status(&self) -> SetStatus {
        self.status
    }

    pub fn total_frames_analyzed(&self) -> usize {
        self.total_frames_analyzed
    }

    pub fn usable_frames(&self) -> usize {
        self.usable_frames
    }

    pub fn total_reps(&self) -> usize {
        self.total_reps
    }

    pub fn good_reps(&self) -> usize {
        self.good_reps
    }

    pub fn bad_reps(&self) -> usize {
        self.bad_reps
    }

    /// Cycles started but not finished before the stream ended.
    pub fn incomplete_cycles(&self) -> usize {
        self.incomplete_cycles
    }

    /// Mean extremal value over reps. For pull-ups this is bar clearance,
    /// not an angle.
    pub fn average_peak_angle(&self) -> Option<f64> {
        self.average_peak_angle
    }

    /// Mean lockout value the reps descended from.
    pub fn average_descent_angle(&self) -> Option<f64> {
        self.average_descent_angle
    }

    pub fn feedback_level(&self) -> FeedbackLevel {
        self.feedback_level
    }

    pub fn overall_feedback(&self) -> &str {
        &self.overall_feedback
    }

    /// `good_reps / total_reps`; absent unless `status` is `Scored`.
    pub fn score(&self) -> Option<f64> {
        self.score
    }

    pub fn repetitions(&self) -> &[Repetition] {
        &self.repetitions
    }

    /// The score, or the reason there is none.
    pub fn try_score(&self) -> Result<f64, CoreError> {
        match (self.status, self.score) {
            (SetStatus::Scored, Some(score)) => Ok(score),
            (SetStatus::NoUsableFrames, _) => Err(CoreError::NoUsableFrames),
            _ => Err(CoreError::NoRepetitionsDetected),
        }
    }

    pub fn score_percent(&self) -> Option<f64> {
        self.score.map(|s| s * 100.0)
    }
}

fn status_for(usable_frames: usize, total_reps: usize) -> SetStatus {
    if usable_frames == 0 {
        SetStatus::NoUsableFrames
    } else if total_reps == 0 {
        SetStatus::NoRepetitionsDetected
    } else {
        SetStatus::Scored
    }
}

fn score_for(status: SetStatus, good_reps: usize, total_reps: usize) -> Option<f64> {
    (status == SetStatus::Scored).then(|| good_reps as f64 / total_reps as f64)
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Reduce classified repetitions and frame counts into a [`SetResult`].
pub fn aggregate_set(
    profile: &ExerciseProfile,
    repetitions: Vec<Repetition>,
    frames: FrameStats,
    incomplete_cycles: usize,
    table: &FeedbackTable,
) -> SetResult {
    let total_reps = repetitions.len();
    let good_reps = repetitions.iter().filter(|r| r.is_good).count();
    let bad_reps = total_reps - good_reps;

    let status = status_for(frames.usable, total_reps);
    let score = score_for(status, good_reps, total_reps);

    let feedback_level = match status {
        SetStatus::Scored => table.level_for(bad_reps as f64 / total_reps as f64),
        // Without reps there is nothing to praise; frames can still warn.
        SetStatus::NoRepetitionsDetected => {
            match frames.bad_fraction().map(|f| table.level_for(f)) {
                Some(FeedbackLevel::Cautionary) => FeedbackLevel::Cautionary,
                _ => FeedbackLevel::Inconclusive,
            }
        }
        SetStatus::NoUsableFrames => FeedbackLevel::Inconclusive,
    };
    let overall_feedback = match status {
        SetStatus::NoUsableFrames => NO_USABLE_FRAMES_MESSAGE,
        _ => message_for(feedback_level, profile),
    };

    SetResult {
        exercise: profile.exercise,
        status,
        total_frames_analyzed: frames.analyzed,
        usable_frames: frames.usable,
        total_reps,
        good_reps,
        bad_reps,
        incomplete_cycles,
        average_peak_angle: mean(repetitions.iter().map(|r| r.peak_value)),
        average_descent_angle: mean(repetitions.iter().map(|r| r.descent_value)),
        feedback_level,
        overall_feedback: overall_feedback.to_string(),
        score,
        repetitions,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
