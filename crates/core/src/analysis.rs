//! End-to-end analysis: landmark stream in, [`SetResult`] out.
//!
//! Wires the stages together in order: profile lookup, stream validation,
//! signal extraction, segmentation, classification, aggregation. Each call
//! is independent, so sets can be analyzed on separate threads sharing one
//! [`SetAnalyzer`].

use crate::aggregate::{aggregate_set, FrameStats, SetResult};
use crate::classifier::Repetition;
use crate::config::AnalysisConfig;
use crate::error::CoreError;
use crate::feedback::FeedbackTable;
use crate::landmark::{validate_stream, LandmarkFrame};
use crate::profile::{ExerciseProfile, ExerciseType, ProfileRegistry};
use crate::segmenter::segment;
use crate::signal::extract;
use crate::types::WorkoutDate;
use crate::workout::WorkoutResult;

#[derive(Debug, Clone)]
pub struct SetAnalyzer<'r> {
    registry: &'r ProfileRegistry,
    config: AnalysisConfig,
    table: FeedbackTable,
}

impl SetAnalyzer<'static> {
    /// Analyzer over the built-in profiles.
    pub fn new(config: AnalysisConfig) -> Result<Self, CoreError> {
        Self::with_registry(ProfileRegistry::global(), config)
    }
}

impl<'r> SetAnalyzer<'r> {
    pub fn with_registry(
        registry: &'r ProfileRegistry,
        config: AnalysisConfig,
    ) -> Result<Self, CoreError> {
        config.validate()?;
        let table = config.feedback_table()?;
        Ok(Self {
            registry,
            config,
            table,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze one video's frames as a set of `exercise_id`.
    ///
    /// Fails only on structural problems: unknown exercise, empty stream,
    /// or frames out of order. Unusable frames and discarded partial
    /// cycles are recovered and reported as counts.
    pub fn analyze(
        &self,
        exercise_id: &str,
        frames: &[LandmarkFrame],
    ) -> Result<SetResult, CoreError> {
        let profile = self.registry.lookup(exercise_id)?;
        self.analyze_with_profile(profile, frames)
    }

    pub fn analyze_with_profile(
        &self,
        profile: &ExerciseProfile,
        frames: &[LandmarkFrame],
    ) -> Result<SetResult, CoreError> {
        validate_stream(frames)?;

        let samples = extract(frames, &profile.signal, self.config.min_visibility);
        let segmentation = segment(&samples, profile.segmentation, profile.direction);
        let repetitions = segmentation
            .cycles
            .into_iter()
            .map(|cycle| Repetition::classify(cycle, &profile.criterion))
            .collect();

        Ok(aggregate_set(
            profile,
            repetitions,
            FrameStats::collect(&samples, profile),
            usize::from(segmentation.incomplete_cycle),
            &self.table,
        ))
    }
}

/// Analyze a single set with the built-in profiles.
pub fn analyze_set(
    exercise_id: &str,
    frames: &[LandmarkFrame],
    config: AnalysisConfig,
) -> Result<SetResult, CoreError> {
    SetAnalyzer::new(config)?.analyze(exercise_id, frames)
}

// ---------------------------------------------------------------------------
// Workouts
// ---------------------------------------------------------------------------

/// One video submitted as part of a workout.
#[derive(Debug, Clone, Copy)]
pub struct SetInput<'a> {
    /// Overrides the workout's exercise type when present.
    pub exercise_id: Option<&'a str>,
    pub frames: &'a [LandmarkFrame],
}

/// Exercise type a set is analyzed as: its own override, else the workout's.
pub fn set_exercise<'a>(set_override: Option<&'a str>, workout_exercise: &'a str) -> &'a str {
    set_override.unwrap_or(workout_exercise)
}

/// A set that could not be analyzed, by submission position.
#[derive(Debug)]
pub struct SetFailure {
    pub set_index: usize,
    pub error: CoreError,
}

#[derive(Debug)]
pub struct WorkoutAnalysis {
    pub workout: WorkoutResult,
    pub failures: Vec<SetFailure>,
}

/// Analyze every set of a workout in submission order.
///
/// An unknown workout-level exercise type is fatal. A failing set is
/// recorded in `failures` and does not affect its siblings. The worker's
/// `run_workout` applies the same rules to sets analyzed in parallel.
pub fn analyze_workout(
    analyzer: &SetAnalyzer<'_>,
    workout_date: WorkoutDate,
    exercise_id: &str,
    sets: &[SetInput<'_>],
) -> Result<WorkoutAnalysis, CoreError> {
    let exercise_type = ExerciseType::parse(exercise_id)?;

    let mut results = Vec::with_capacity(sets.len());
    let mut failures = Vec::new();
    for (set_index, input) in sets.iter().enumerate() {
        let id = set_exercise(input.exercise_id, exercise_id);
        match analyzer.analyze(id, input.frames) {
            Ok(set) => results.push(set),
            Err(error) => failures.push(SetFailure { set_index, error }),
        }
    }

    Ok(WorkoutAnalysis {
        workout: WorkoutResult::new(workout_date, exercise_type, results),
        failures,
    })
}
