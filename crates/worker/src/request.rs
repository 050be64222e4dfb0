//! Workout request format and frame loading.
//!
//! A request names the workout date, its default exercise type, and one
//! frame source per set. Frames are either inlined or referenced by path;
//! relative paths resolve against the request file's directory.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use formcheck_core::analysis::set_exercise;
use formcheck_core::landmark::LandmarkFrame;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::WorkerError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRequest {
    pub workout_date: NaiveDate,
    pub exercise_type: String,
    pub sets: Vec<SetRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetRequest {
    /// Overrides the workout's exercise type for this set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise_type: Option<String>,
    #[serde(flatten)]
    pub source: FrameSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrameSource {
    Inline { frames: Vec<LandmarkFrame> },
    /// JSON array of landmark frames on disk.
    File { frames_path: PathBuf },
}

impl WorkoutRequest {
    pub async fn load(path: &Path) -> Result<Self, WorkerError> {
        read_json(path).await
    }

    /// Exercise type a given set is analyzed as.
    pub fn exercise_for<'a>(&'a self, set: &'a SetRequest) -> &'a str {
        set_exercise(set.exercise_type.as_deref(), &self.exercise_type)
    }
}

impl FrameSource {
    /// Materialize the frames, reading from disk if needed.
    pub async fn load(self, base_dir: &Path) -> Result<Vec<LandmarkFrame>, WorkerError> {
        match self {
            Self::Inline { frames } => Ok(frames),
            Self::File { frames_path } => read_json(&base_dir.join(frames_path)).await,
        }
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, WorkerError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| WorkerError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| WorkerError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parses_inline_and_file_sets() {
        let json = r#"{
            "workout_date": "2026-04-01",
            "exercise_type": "squats",
            "sets": [
                { "frames": [ { "index": 0, "landmarks": {} } ] },
                { "exercise_type": "pushups", "frames_path": "set2.json" }
            ]
        }"#;
        let request: WorkoutRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.workout_date, NaiveDate::from_ymd_opt(2026, 4, 1).unwrap());
        assert_matches!(
            &request.sets[0].source,
            FrameSource::Inline { frames } if frames.len() == 1
        );
        assert_matches!(
            &request.sets[1].source,
            FrameSource::File { frames_path } if frames_path == Path::new("set2.json")
        );
        assert_eq!(request.exercise_for(&request.sets[0]), "squats");
        assert_eq!(request.exercise_for(&request.sets[1]), "pushups");
    }

    #[test]
    fn set_without_frames_is_rejected() {
        let json = r#"{ "workout_date": "2026-04-01", "exercise_type": "squat", "sets": [ {} ] }"#;
        assert!(serde_json::from_str::<WorkoutRequest>(json).is_err());
    }

    #[tokio::test]
    async fn missing_frames_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = FrameSource::File {
            frames_path: PathBuf::from("absent.json"),
        };
        assert_matches!(source.load(dir.path()).await, Err(WorkerError::Io { .. }));
    }

    #[tokio::test]
    async fn malformed_frames_file_is_json_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.json"), "[{ \"index\": ").unwrap();
        let source = FrameSource::File {
            frames_path: PathBuf::from("bad.json"),
        };
        assert_matches!(source.load(dir.path()).await, Err(WorkerError::Json { .. }));
    }
}
