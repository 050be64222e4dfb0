//! Landmark frames produced by the external pose-estimation model.
//!
//! A [`LandmarkFrame`] is one snapshot of tracked joints for a single video
//! frame. Landmarks below the configured visibility floor are treated as
//! absent; [`LandmarkFrame::visible`] is the only accessor the rest of the
//! engine uses, so that rule lives in one place.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::FrameIndex;

// ---------------------------------------------------------------------------
// Joint
// ---------------------------------------------------------------------------

/// Tracked body joints, named after the pose model's landmark set.
///
/// `Ord` is derived so that frames keyed by joint serialize in a stable order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Joint {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftHeel,
    RightHeel,
    LeftFootIndex,
    RightFootIndex,
}

// ---------------------------------------------------------------------------
// Landmark
// ---------------------------------------------------------------------------

/// One joint's position in normalized image space.
///
/// `y` grows downward, as in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    /// Model confidence that the joint is visible, in `[0, 1]`.
    pub visibility: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, visibility: f64) -> Self {
        Self { x, y, visibility }
    }
}

// ---------------------------------------------------------------------------
// LandmarkFrame
// ---------------------------------------------------------------------------

/// All landmarks reported for a single video frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LandmarkFrame {
    pub index: FrameIndex,
    #[serde(default)]
    pub landmarks: BTreeMap<Joint, Landmark>,
}

impl LandmarkFrame {
    pub fn new(index: FrameIndex) -> Self {
        Self {
            index,
            landmarks: BTreeMap::new(),
        }
    }

    /// Builder-style insert, mostly for fixtures.
    pub fn with(mut self, joint: Joint, landmark: Landmark) -> Self {
        self.landmarks.insert(joint, landmark);
        self
    }

    /// The landmark for `joint` if it was reported with at least
    /// `min_visibility` confidence.
    pub fn visible(&self, joint: Joint, min_visibility: f64) -> Option<&Landmark> {
        self.landmarks
            .get(&joint)
            .filter(|lm| lm.visibility >= min_visibility)
    }
}

/// Check that a stream is non-empty and strictly increasing by frame index.
pub fn validate_stream(frames: &[LandmarkFrame]) -> Result<(), CoreError> {
    if frames.is_empty() {
        return Err(CoreError::EmptyLandmarkStream);
    }
    for pair in frames.windows(2) {
        if pair[1].index <= pair[0].index {
            return Err(CoreError::FrameOrder {
                previous: pair[0].index,
                current: pair[1].index,
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
