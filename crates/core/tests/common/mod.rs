//! Synthetic landmark streams for integration tests.

#![allow(dead_code)]

use std::f64::consts::PI;

use formcheck_core::landmark::{Joint, Landmark, LandmarkFrame};

const VISIBLE: f64 = 0.9;
const LIMB: f64 = 0.3;

/// Cosine between `high` and `low`, starting and ending at `high`.
pub fn oscillate(high: f64, low: f64, cycles: usize, period: usize) -> Vec<f64> {
    let mid = (high + low) / 2.0;
    let amp = (high - low) / 2.0;
    (0..=cycles * period)
        .map(|t| mid + amp * (2.0 * PI * t as f64 / period as f64).cos())
        .collect()
}

/// Place `a` so that the angle a-vertex-c is `degrees`, with `c` straight
/// below the vertex. `mirror` flips the limb to the other side.
fn limb(vertex: (f64, f64), degrees: f64, mirror: bool) -> (Landmark, Landmark, Landmark) {
    let theta = degrees.to_radians();
    let side = if mirror { 1.0 } else { -1.0 };
    let a = Landmark::new(
        vertex.0 + side * LIMB * theta.sin(),
        vertex.1 + LIMB * theta.cos(),
        VISIBLE,
    );
    let b = Landmark::new(vertex.0, vertex.1, VISIBLE);
    let c = Landmark::new(vertex.0, vertex.1 + LIMB, VISIBLE);
    (a, b, c)
}

/// Both knees flexed to `knee_angle`.
pub fn squat_frame(index: u64, knee_angle: f64) -> LandmarkFrame {
    let (lh, lk, la) = limb((0.4, 0.5), knee_angle, false);
    let (rh, rk, ra) = limb((0.6, 0.5), knee_angle, true);
    LandmarkFrame::new(index)
        .with(Joint::LeftHip, lh)
        .with(Joint::LeftKnee, lk)
        .with(Joint::LeftAnkle, la)
        .with(Joint::RightHip, rh)
        .with(Joint::RightKnee, rk)
        .with(Joint::RightAnkle, ra)
}

/// Both elbows flexed to `elbow_angle`.
pub fn press_frame(index: u64, elbow_angle: f64) -> LandmarkFrame {
    let (ls, le, lw) = limb((0.4, 0.4), elbow_angle, false);
    let (rs, re, rw) = limb((0.6, 0.4), elbow_angle, true);
    LandmarkFrame::new(index)
        .with(Joint::LeftShoulder, ls)
        .with(Joint::LeftElbow, le)
        .with(Joint::LeftWrist, lw)
        .with(Joint::RightShoulder, rs)
        .with(Joint::RightElbow, re)
        .with(Joint::RightWrist, rw)
}

/// Hands on a bar at y = 0.2, nose `clearance` above it.
pub fn pullup_frame(index: u64, clearance: f64) -> LandmarkFrame {
    let bar_y = 0.2;
    LandmarkFrame::new(index)
        .with(Joint::Nose, Landmark::new(0.5, bar_y - clearance, VISIBLE))
        .with(Joint::LeftWrist, Landmark::new(0.4, bar_y, VISIBLE))
        .with(Joint::RightWrist, Landmark::new(0.6, bar_y, VISIBLE))
}

pub fn stream(values: &[f64], frame: fn(u64, f64) -> LandmarkFrame) -> Vec<LandmarkFrame> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| frame(i as u64, v))
        .collect()
}
