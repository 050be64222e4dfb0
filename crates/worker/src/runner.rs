//! Parallel workout analysis.
//!
//! Each set runs as its own task: frames are loaded asynchronously, then the
//! CPU-bound analysis moves to the blocking pool. A semaphore caps how many
//! sets are in flight. Results are reassembled in submission order, so the
//! report does not depend on scheduling.

use std::path::Path;
use std::sync::Arc;

use formcheck_core::aggregate::SetResult;
use formcheck_core::analysis::SetAnalyzer;
use formcheck_core::profile::ExerciseType;
use formcheck_core::workout::WorkoutResult;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::WorkerConfig;
use crate::error::WorkerError;
use crate::request::{FrameSource, WorkoutRequest};

/// A set that produced no result, by submission position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedSet {
    pub set_index: usize,
    pub exercise_type: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutReport {
    pub workout: WorkoutResult,
    pub failed_sets: Vec<FailedSet>,
}

struct SetOutcome {
    set_index: usize,
    exercise_type: String,
    result: Result<SetResult, WorkerError>,
}

/// Analyze every set of `request` and assemble the report.
///
/// Mirrors `formcheck_core::analysis::analyze_workout`, with frame loading
/// and cancellation folded into each set. An unknown workout-level exercise
/// type or invalid analysis settings fail the whole run. Anything that goes
/// wrong inside one set is reported in `failed_sets`. Once `cancel` fires, sets still waiting for a slot are
/// reported as cancelled rather than analyzed.
pub async fn run_workout(
    request: WorkoutRequest,
    base_dir: &Path,
    config: &WorkerConfig,
    cancel: CancellationToken,
) -> Result<WorkoutReport, WorkerError> {
    let exercise_type = ExerciseType::parse(&request.exercise_type)?;
    let analyzer = SetAnalyzer::new(config.analysis)?;
    let semaphore = Arc::new(Semaphore::new(config.max_parallel));
    let set_count = request.sets.len();

    tracing::info!(
        workout_date = %request.workout_date,
        exercise = %exercise_type,
        sets = set_count,
        max_parallel = config.max_parallel,
        "Analyzing workout",
    );

    let mut tasks = JoinSet::new();
    for (set_index, set) in request.sets.iter().enumerate() {
        let exercise_id = request.exercise_for(set).to_string();
        let source = set.source.clone();
        let analyzer = analyzer.clone();
        let semaphore = Arc::clone(&semaphore);
        let cancel = cancel.clone();
        let base_dir = base_dir.to_path_buf();

        tasks.spawn(async move {
            let result =
                analyze_one(&exercise_id, source, &base_dir, analyzer, semaphore, cancel).await;
            SetOutcome {
                set_index,
                exercise_type: exercise_id,
                result,
            }
        });
    }

    let mut outcomes: Vec<Option<SetOutcome>> = (0..set_count).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        let outcome = joined?;
        let index = outcome.set_index;
        outcomes[index] = Some(outcome);
    }

    let mut sets = Vec::with_capacity(set_count);
    let mut failed_sets = Vec::new();
    for outcome in outcomes.into_iter().flatten() {
        match outcome.result {
            Ok(set) => {
                tracing::info!(
                    set_index = outcome.set_index,
                    exercise = %set.exercise(),
                    status = ?set.status(),
                    total_reps = set.total_reps(),
                    good_reps = set.good_reps(),
                    usable_frames = set.usable_frames(),
                    incomplete_cycles = set.incomplete_cycles(),
                    score = ?set.score(),
                    "Set analyzed",
                );
                sets.push(set);
            }
            Err(e) => {
                tracing::warn!(
                    set_index = outcome.set_index,
                    exercise = %outcome.exercise_type,
                    error = %e,
                    "Set failed",
                );
                failed_sets.push(FailedSet {
                    set_index: outcome.set_index,
                    exercise_type: outcome.exercise_type,
                    error: e.to_string(),
                });
            }
        }
    }

    let workout = WorkoutResult::new(request.workout_date, exercise_type, sets);
    tracing::info!(
        scored_sets = workout.sets().len(),
        failed_sets = failed_sets.len(),
        score = ?workout.score(),
        "Workout analyzed",
    );

    Ok(WorkoutReport {
        workout,
        failed_sets,
    })
}

async fn analyze_one(
    exercise_id: &str,
    source: FrameSource,
    base_dir: &Path,
    analyzer: SetAnalyzer<'static>,
    semaphore: Arc<Semaphore>,
    cancel: CancellationToken,
) -> Result<SetResult, WorkerError> {
    let _permit = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(WorkerError::Cancelled),
        permit = semaphore.acquire_owned() => {
            permit.map_err(|_| WorkerError::Cancelled)?
        }
    };
    if cancel.is_cancelled() {
        return Err(WorkerError::Cancelled);
    }

    let frames = source.load(base_dir).await?;
    let exercise_id = exercise_id.to_string();
    let set = tokio::task::spawn_blocking(move || analyzer.analyze(&exercise_id, &frames)).await??;
    Ok(set)
}

/// Write the report as pretty JSON to `output`, or stdout when `None`.
pub async fn write_report(
    report: &WorkoutReport,
    output: Option<&Path>,
) -> Result<(), WorkerError> {
    let mut json = serde_json::to_string_pretty(report)?;
    json.push('\n');

    let written = match output {
        Some(path) => tokio::fs::write(path, &json).await,
        None => write_stdout(json.as_bytes()).await,
    };
    written.map_err(|source| WorkerError::Io {
        path: output.map_or_else(|| "<stdout>".into(), Path::to_path_buf),
        source,
    })
}

async fn write_stdout(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(bytes).await?;
    stdout.flush().await
}
