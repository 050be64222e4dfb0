//! Workout-level aggregation across sets.
//!
//! [`WorkoutResult`] keeps its score private and re-derives it from the set
//! scores on every change, so it can never drift from its sets. Adding or
//! removing a set never touches the other [`SetResult`]s.

use serde::{Deserialize, Serialize};

use crate::aggregate::SetResult;
use crate::error::CoreError;
use crate::profile::ExerciseType;
use crate::types::WorkoutDate;

/// Mean of the defined set scores; sets without a score are excluded.
pub fn workout_score(sets: &[SetResult]) -> Option<f64> {
    let scores: Vec<f64> = sets.iter().filter_map(SetResult::score).collect();
    if scores.is_empty() {
        return None;
    }
    Some(scores.iter().sum::<f64>() / scores.len() as f64)
}

/// Serialized shape of a workout. Deserializing goes through
/// [`WorkoutResult::new`], so a stored score is never trusted.
#[derive(Serialize, Deserialize)]
struct WorkoutRecord {
    workout_date: WorkoutDate,
    exercise_type: ExerciseType,
    sets: Vec<SetResult>,
    #[serde(default)]
    score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "WorkoutRecord", from = "WorkoutRecord")]
pub struct WorkoutResult {
    workout_date: WorkoutDate,
    exercise_type: ExerciseType,
    sets: Vec<SetResult>,
    score: Option<f64>,
}

impl From<WorkoutRecord> for WorkoutResult {
    fn from(record: WorkoutRecord) -> Self {
        Self::new(record.workout_date, record.exercise_type, record.sets)
    }
}

impl From<WorkoutResult> for WorkoutRecord {
    fn from(workout: WorkoutResult) -> Self {
        Self {
            workout_date: workout.workout_date,
            exercise_type: workout.exercise_type,
            sets: workout.sets,
            score: workout.score,
        }
    }
}

impl WorkoutResult {
    pub fn new(
        workout_date: WorkoutDate,
        exercise_type: ExerciseType,
        sets: Vec<SetResult>,
    ) -> Self {
        let score = workout_score(&sets);
        Self {
            workout_date,
            exercise_type,
            sets,
            score,
        }
    }

    pub fn workout_date(&self) -> WorkoutDate {
        self.workout_date
    }

    pub fn exercise_type(&self) -> ExerciseType {
        self.exercise_type
    }

    pub fn sets(&self) -> &[SetResult] {
        &self.sets
    }

    pub fn score(&self) -> Option<f64> {
        self.score
    }

    pub fn score_percent(&self) -> Option<f64> {
        self.score.map(|s| s * 100.0)
    }

    /// Append a set and re-derive the workout score.
    pub fn add_set(&mut self, set: SetResult) {
        self.sets.push(set);
        self.score = workout_score(&self.sets);
    }

    /// Remove the set at `index` and re-derive the workout score.
    pub fn remove_set(&mut self, index: usize) -> Result<SetResult, CoreError> {
        if index >= self.sets.len() {
            return Err(CoreError::Validation(format!(
                "set index {index} out of range for workout with {} sets",
                self.sets.len()
            )));
        }
        let removed = self.sets.remove(index);
        self.score = workout_score(&self.sets);
        Ok(removed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
