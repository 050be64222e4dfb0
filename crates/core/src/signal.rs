//! Per-frame signal extraction.
//!
//! Reduces each landmark frame to the single scalar its profile tracks. A
//! frame whose signal cannot be computed yields `None` and is counted as
//! unusable; it never aborts the stream.

use crate::angle::joint_angle;
use crate::error::{CoreError, DegenerateReason};
use crate::landmark::{Joint, LandmarkFrame};
use crate::profile::Signal;
use crate::types::FrameIndex;

/// Signal value for one frame, or `None` when the frame was unusable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalSample {
    pub frame: FrameIndex,
    pub value: Option<f64>,
}

/// Compute `signal` on one frame.
///
/// For joint-angle signals the result is the mean over the triples that
/// are computable; the first failure is returned only if none are.
pub fn frame_signal(
    frame: &LandmarkFrame,
    signal: &Signal,
    min_visibility: f64,
) -> Result<f64, CoreError> {
    match signal {
        Signal::JointAngle(triples) => {
            let mut sum = 0.0;
            let mut count = 0usize;
            let mut first_err = None;
            for triple in triples {
                match joint_angle(frame, triple, min_visibility) {
                    Ok(angle) => {
                        sum += angle;
                        count += 1;
                    }
                    Err(e) => {
                        first_err.get_or_insert(e);
                    }
                }
            }
            if count > 0 {
                Ok(sum / count as f64)
            } else {
                Err(first_err
                    .unwrap_or(CoreError::DegenerateAngle(DegenerateReason::JointAbsent)))
            }
        }
        Signal::BarClearance => bar_clearance(frame, min_visibility),
    }
}

/// Height of the nose above the higher visible wrist.
///
/// Image `y` grows downward, so the higher wrist has the smaller `y` and
/// clearance is `wrist_y - nose_y`.
fn bar_clearance(frame: &LandmarkFrame, min_visibility: f64) -> Result<f64, CoreError> {
    let absent = || CoreError::DegenerateAngle(DegenerateReason::JointAbsent);

    let nose = frame.visible(Joint::Nose, min_visibility).ok_or_else(absent)?;
    let bar_y = [Joint::LeftWrist, Joint::RightWrist]
        .into_iter()
        .filter_map(|j| frame.visible(j, min_visibility))
        .map(|lm| lm.y)
        .reduce(f64::min)
        .ok_or_else(absent)?;

    Ok(bar_y - nose.y)
}

/// Extract the signal for every frame of a stream, in order.
pub fn extract(
    frames: &[LandmarkFrame],
    signal: &Signal,
    min_visibility: f64,
) -> Vec<SignalSample> {
    frames
        .iter()
        .map(|frame| SignalSample {
            frame: frame.index,
            value: frame_signal(frame, signal, min_visibility).ok(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
