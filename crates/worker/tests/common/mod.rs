//! Request fixtures written to temporary directories.

#![allow(dead_code)]

use std::f64::consts::PI;
use std::path::{Path, PathBuf};

use formcheck_core::config::AnalysisConfig;
use formcheck_core::landmark::{Joint, Landmark, LandmarkFrame};
use formcheck_worker::config::WorkerConfig;

/// Squat stream whose knee angle swings between 170 degrees and `bottom`.
pub fn squat_frames(bottom: f64, cycles: usize) -> Vec<LandmarkFrame> {
    const PERIOD: usize = 30;
    let mid = (170.0 + bottom) / 2.0;
    let amp = (170.0 - bottom) / 2.0;
    (0..=cycles * PERIOD)
        .map(|t| {
            let angle = mid + amp * (2.0 * PI * t as f64 / PERIOD as f64).cos();
            knee_frame(t as u64, angle)
        })
        .collect()
}

fn knee_frame(index: u64, degrees: f64) -> LandmarkFrame {
    let theta = degrees.to_radians();
    let mut frame = LandmarkFrame::new(index);
    for (side, knee_x, hip, knee, ankle) in [
        (-1.0, 0.4, Joint::LeftHip, Joint::LeftKnee, Joint::LeftAnkle),
        (1.0, 0.6, Joint::RightHip, Joint::RightKnee, Joint::RightAnkle),
    ] {
        frame = frame
            .with(
                hip,
                Landmark::new(
                    knee_x + side * 0.3 * theta.sin(),
                    0.5 + 0.3 * theta.cos(),
                    0.9,
                ),
            )
            .with(knee, Landmark::new(knee_x, 0.5, 0.9))
            .with(ankle, Landmark::new(knee_x, 0.8, 0.9));
    }
    frame
}

pub fn write_json(dir: &Path, name: &str, value: &serde_json::Value) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
    path
}

pub fn config(input: PathBuf, max_parallel: usize) -> WorkerConfig {
    WorkerConfig {
        input,
        output: None,
        analysis: AnalysisConfig::default(),
        max_parallel,
    }
}
