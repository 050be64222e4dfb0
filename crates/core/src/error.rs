use crate::types::FrameIndex;

/// Why a single frame's signal could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegenerateReason {
    /// A required joint was not reported, or was below minimum visibility.
    JointAbsent,
    /// Two of the three points coincide, so one vector has no direction.
    CoincidentPoints,
}

impl std::fmt::Display for DegenerateReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::JointAbsent => f.write_str("required joint absent or low visibility"),
            Self::CoincidentPoints => f.write_str("coincident landmark positions"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Unknown exercise type: '{0}'")]
    UnknownExerciseType(String),

    #[error("Angle undefined for this frame: {0}")]
    DegenerateAngle(DegenerateReason),

    #[error("No repetitions detected")]
    NoRepetitionsDetected,

    #[error("No usable frames: every frame was missing a required joint")]
    NoUsableFrames,

    #[error("Landmark stream is empty")]
    EmptyLandmarkStream,

    #[error("Frames out of order: frame {current} follows frame {previous}")]
    FrameOrder {
        previous: FrameIndex,
        current: FrameIndex,
    },

    #[error("Validation failed: {0}")]
    Validation(String),
}
