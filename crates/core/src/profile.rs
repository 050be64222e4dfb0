//! Exercise profiles and the process-wide profile registry.
//!
//! A profile is static data: which signal to track, which way a repetition
//! moves it, the thresholds the segmenter uses, and the criterion the
//! classifier applies. The segmenter and classifier only ever see profile
//! data, never an exercise name.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::angle::JointTriple;
use crate::error::CoreError;
use crate::landmark::Joint;
use crate::threshold_validation::{validate_angle_range, validate_positive};

// ---------------------------------------------------------------------------
// Exercise identifiers
// ---------------------------------------------------------------------------

/// Canonical identifiers, as written in results.
pub const EXERCISE_SQUAT: &str = "squat";
pub const EXERCISE_BENCH: &str = "bench";
pub const EXERCISE_PUSHUPS: &str = "pushups";
pub const EXERCISE_PULLUP: &str = "pullup";

pub const VALID_EXERCISE_TYPES: &[&str] = &[
    EXERCISE_SQUAT,
    EXERCISE_BENCH,
    EXERCISE_PUSHUPS,
    EXERCISE_PULLUP,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseType {
    Squat,
    Bench,
    Pushups,
    Pullup,
}

impl ExerciseType {
    /// Parse an identifier, accepting the plural and hyphenated spellings
    /// the upload form sends. Case and surrounding whitespace are ignored.
    pub fn parse(id: &str) -> Result<Self, CoreError> {
        match id.trim().to_ascii_lowercase().as_str() {
            "squat" | "squats" => Ok(Self::Squat),
            "bench" | "bench_press" | "benchpress" => Ok(Self::Bench),
            "pushups" | "pushup" | "push-ups" | "push-up" | "push_ups" => Ok(Self::Pushups),
            "pullup" | "pullups" | "pull-up" | "pull-ups" | "pull_ups" => Ok(Self::Pullup),
            _ => Err(CoreError::UnknownExerciseType(id.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Squat => EXERCISE_SQUAT,
            Self::Bench => EXERCISE_BENCH,
            Self::Pushups => EXERCISE_PUSHUPS,
            Self::Pullup => EXERCISE_PULLUP,
        }
    }
}

impl std::fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Profile building blocks
// ---------------------------------------------------------------------------

/// The per-frame scalar a profile tracks.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// Mean angle over whichever of the triples are computable on a frame.
    JointAngle(Vec<JointTriple>),
    /// Height of the nose above the higher wrist, in normalized image units.
    /// Positive once the nose has risen above the bar-height proxy.
    BarClearance,
}

/// Which extremum of the signal marks the effortful end of a repetition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// The rep bottoms out at a local minimum (squat depth, elbow flex).
    Minimum,
    /// The rep tops out at a local maximum (pull-up height).
    Maximum,
}

impl Direction {
    /// Map a raw signal value so that effort always increases the result.
    pub fn orient(self, value: f64) -> f64 {
        match self {
            Self::Minimum => -value,
            Self::Maximum => value,
        }
    }
}

/// Thresholds driving the repetition state machine, in signal units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentationParams {
    /// Boundary between the rest position and motion.
    pub rest_threshold: f64,
    /// Band around thresholds that a signal must clear to count as crossing.
    pub hysteresis: f64,
    /// Consecutive usable frames a crossing must hold before it counts.
    pub sustain_frames: u32,
    /// Usable frames without improvement after which the extremum is settled.
    pub settle_frames: u32,
}

/// Pass/fail policy for one repetition's extremal value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RepCriterion {
    /// Bad if the extremum is above `max` (not deep enough).
    MaxPeak { max: f64 },
    /// Bad if the extremum lies outside `[min, max]`.
    PeakBand { min: f64, max: f64 },
    /// Bad unless bar clearance exceeded `min_clearance` at the top.
    ClearsBar { min_clearance: f64 },
}

// ---------------------------------------------------------------------------
// ExerciseProfile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseProfile {
    pub exercise: ExerciseType,
    pub signal: Signal,
    pub direction: Direction,
    pub segmentation: SegmentationParams,
    pub criterion: RepCriterion,
    /// Feedback text used when too many reps (or frames) fail the criterion.
    pub cautionary_message: &'static str,
}

impl ExerciseProfile {
    /// Check the internal consistency of a profile's thresholds.
    pub fn validate(&self) -> Result<(), CoreError> {
        let seg = &self.segmentation;
        validate_positive(seg.hysteresis, "hysteresis")?;
        if seg.sustain_frames == 0 {
            return Err(CoreError::Validation(
                "sustain_frames must be at least 1".to_string(),
            ));
        }
        if seg.settle_frames == 0 {
            return Err(CoreError::Validation(
                "settle_frames must be at least 1".to_string(),
            ));
        }

        match &self.signal {
            Signal::JointAngle(triples) => {
                if triples.is_empty() {
                    return Err(CoreError::Validation(format!(
                        "{} profile tracks no joint triples",
                        self.exercise
                    )));
                }
                validate_angle_range(seg.rest_threshold, "rest_threshold")?;
            }
            Signal::BarClearance => {}
        }

        if let RepCriterion::PeakBand { min, max } = self.criterion {
            if min > max {
                return Err(CoreError::Validation(format!(
                    "peak band min ({min}) must be <= max ({max})"
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Built-in profiles
// ---------------------------------------------------------------------------

const LEFT_KNEE: JointTriple = JointTriple::new(Joint::LeftHip, Joint::LeftKnee, Joint::LeftAnkle);
const RIGHT_KNEE: JointTriple =
    JointTriple::new(Joint::RightHip, Joint::RightKnee, Joint::RightAnkle);
const LEFT_ELBOW: JointTriple =
    JointTriple::new(Joint::LeftShoulder, Joint::LeftElbow, Joint::LeftWrist);
const RIGHT_ELBOW: JointTriple =
    JointTriple::new(Joint::RightShoulder, Joint::RightElbow, Joint::RightWrist);

/// Squat reps deeper than this knee angle are good.
pub const SQUAT_MAX_DEPTH_ANGLE: f64 = 130.0;
/// Acceptable elbow flex at the bottom of a press.
pub const PRESS_MIN_ELBOW_ANGLE: f64 = 70.0;
pub const PRESS_MAX_ELBOW_ANGLE: f64 = 120.0;

/// A near-straight joint above this angle counts as the rest position.
pub const ANGLE_REST_THRESHOLD: f64 = 160.0;
pub const ANGLE_HYSTERESIS: f64 = 5.0;

/// Hanging clearance boundary (nose well below the wrists).
pub const CLEARANCE_REST_THRESHOLD: f64 = -0.15;
pub const CLEARANCE_HYSTERESIS: f64 = 0.03;

pub const DEFAULT_SUSTAIN_FRAMES: u32 = 2;
pub const DEFAULT_SETTLE_FRAMES: u32 = 3;

fn angle_segmentation() -> SegmentationParams {
    SegmentationParams {
        rest_threshold: ANGLE_REST_THRESHOLD,
        hysteresis: ANGLE_HYSTERESIS,
        sustain_frames: DEFAULT_SUSTAIN_FRAMES,
        settle_frames: DEFAULT_SETTLE_FRAMES,
    }
}

fn press_profile(exercise: ExerciseType, cautionary_message: &'static str) -> ExerciseProfile {
    ExerciseProfile {
        exercise,
        signal: Signal::JointAngle(vec![LEFT_ELBOW, RIGHT_ELBOW]),
        direction: Direction::Minimum,
        segmentation: angle_segmentation(),
        criterion: RepCriterion::PeakBand {
            min: PRESS_MIN_ELBOW_ANGLE,
            max: PRESS_MAX_ELBOW_ANGLE,
        },
        cautionary_message,
    }
}

fn builtin_profiles() -> Vec<ExerciseProfile> {
    vec![
        ExerciseProfile {
            exercise: ExerciseType::Squat,
            signal: Signal::JointAngle(vec![LEFT_KNEE, RIGHT_KNEE]),
            direction: Direction::Minimum,
            segmentation: angle_segmentation(),
            criterion: RepCriterion::MaxPeak {
                max: SQUAT_MAX_DEPTH_ANGLE,
            },
            cautionary_message: "Try to squat deeper!",
        },
        press_profile(ExerciseType::Bench, "Try to go lower on the bench!"),
        press_profile(ExerciseType::Pushups, "Try to go lower on your push-ups!"),
        ExerciseProfile {
            exercise: ExerciseType::Pullup,
            signal: Signal::BarClearance,
            direction: Direction::Maximum,
            segmentation: SegmentationParams {
                rest_threshold: CLEARANCE_REST_THRESHOLD,
                hysteresis: CLEARANCE_HYSTERESIS,
                sustain_frames: DEFAULT_SUSTAIN_FRAMES,
                settle_frames: DEFAULT_SETTLE_FRAMES,
            },
            criterion: RepCriterion::ClearsBar { min_clearance: 0.0 },
            cautionary_message: "Focus on getting your chin above the bar consistently!",
        },
    ]
}

// ---------------------------------------------------------------------------
// ProfileRegistry
// ---------------------------------------------------------------------------

static REGISTRY: LazyLock<ProfileRegistry> = LazyLock::new(|| ProfileRegistry {
    profiles: builtin_profiles(),
});

/// Read-only lookup table from exercise type to profile.
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: Vec<ExerciseProfile>,
}

impl ProfileRegistry {
    /// The shared registry of built-in profiles.
    pub fn global() -> &'static ProfileRegistry {
        &REGISTRY
    }

    /// Build a registry from custom profiles, validating each one.
    ///
    /// Later profiles for the same exercise replace earlier ones.
    pub fn new(profiles: Vec<ExerciseProfile>) -> Result<Self, CoreError> {
        let mut deduped: Vec<ExerciseProfile> = Vec::with_capacity(profiles.len());
        for profile in profiles {
            profile.validate()?;
            deduped.retain(|p| p.exercise != profile.exercise);
            deduped.push(profile);
        }
        Ok(Self { profiles: deduped })
    }

    pub fn get(&self, exercise: ExerciseType) -> Result<&ExerciseProfile, CoreError> {
        self.profiles
            .iter()
            .find(|p| p.exercise == exercise)
            .ok_or_else(|| CoreError::UnknownExerciseType(exercise.to_string()))
    }

    /// Resolve an identifier string to its profile.
    pub fn lookup(&self, id: &str) -> Result<&ExerciseProfile, CoreError> {
        self.get(ExerciseType::parse(id)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
