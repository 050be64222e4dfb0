//! Joint angle calculation using the dot product.
//!
//! The angle at vertex `b` is the angle between vectors `b→a` and `b→c`:
//! `cos(θ) = (v1 · v2) / (|v1| × |v2|)`, reported in degrees in `[0, 180]`.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, DegenerateReason};
use crate::landmark::{Joint, Landmark, LandmarkFrame};
use crate::types::Degrees;

/// Vectors shorter than this (in normalized image units) have no usable
/// direction.
pub const MIN_VECTOR_MAGNITUDE: f64 = 1e-6;

/// Three joints whose middle member is the vertex of the measured angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JointTriple {
    pub a: Joint,
    pub vertex: Joint,
    pub c: Joint,
}

impl JointTriple {
    pub const fn new(a: Joint, vertex: Joint, c: Joint) -> Self {
        Self { a, vertex, c }
    }
}

/// Angle at `b` formed by `a` and `c`, in degrees.
///
/// Fails with [`DegenerateReason::CoincidentPoints`] when either arm of the
/// angle has near-zero length.
pub fn angle_at(a: &Landmark, b: &Landmark, c: &Landmark) -> Result<Degrees, CoreError> {
    let v1 = (a.x - b.x, a.y - b.y);
    let v2 = (c.x - b.x, c.y - b.y);

    let mag1 = v1.0.hypot(v1.1);
    let mag2 = v2.0.hypot(v2.1);
    if mag1 < MIN_VECTOR_MAGNITUDE || mag2 < MIN_VECTOR_MAGNITUDE {
        return Err(CoreError::DegenerateAngle(DegenerateReason::CoincidentPoints));
    }

    let dot = v1.0 * v2.0 + v1.1 * v2.1;
    // Rounding can push the ratio a hair outside [-1, 1].
    let cos_angle = (dot / (mag1 * mag2)).clamp(-1.0, 1.0);

    Ok(cos_angle.acos().to_degrees())
}

/// Angle for `triple` on one frame, honouring the visibility floor.
pub fn joint_angle(
    frame: &LandmarkFrame,
    triple: &JointTriple,
    min_visibility: f64,
) -> Result<Degrees, CoreError> {
    let absent = || CoreError::DegenerateAngle(DegenerateReason::JointAbsent);

    let a = frame.visible(triple.a, min_visibility).ok_or_else(absent)?;
    let b = frame.visible(triple.vertex, min_visibility).ok_or_else(absent)?;
    let c = frame.visible(triple.c, min_visibility).ok_or_else(absent)?;

    angle_at(a, b, c)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const TOLERANCE: f64 = 1e-3;

    fn lm(x: f64, y: f64) -> Landmark {
        Landmark::new(x, y, 1.0)
    }

    #[test]
    fn straight_line_is_180() {
        let angle = angle_at(&lm(0.0, 0.0), &lm(0.5, 0.0), &lm(1.0, 0.0)).unwrap();
        assert!((angle - 180.0).abs() < TOLERANCE, "got {angle}");
    }

    #[test]
    fn right_angle_is_90() {
        let angle = angle_at(&lm(0.0, 0.0), &lm(0.5, 0.0), &lm(0.5, 0.5)).unwrap();
        assert!((angle - 90.0).abs() < TOLERANCE, "got {angle}");
    }

    #[test]
    fn folded_back_is_zero() {
        let angle = angle_at(&lm(0.2, 0.2), &lm(0.5, 0.5), &lm(0.3, 0.3)).unwrap();
        assert!(angle.abs() < TOLERANCE, "got {angle}");
    }

    #[test]
    fn symmetric_and_in_range() {
        let points = [
            (lm(0.1, 0.9), lm(0.4, 0.5), lm(0.8, 0.7)),
            (lm(0.3, 0.2), lm(0.3, 0.6), lm(0.35, 0.95)),
            (lm(0.9, 0.1), lm(0.2, 0.2), lm(0.85, 0.15)),
        ];
        for (a, b, c) in points {
            let forward = angle_at(&a, &b, &c).unwrap();
            let backward = angle_at(&c, &b, &a).unwrap();
            assert!((forward - backward).abs() < 1e-9);
            assert!((0.0..=180.0).contains(&forward));
        }
    }

    #[test]
    fn coincident_points_are_degenerate() {
        assert_matches!(
            angle_at(&lm(0.5, 0.5), &lm(0.5, 0.5), &lm(0.9, 0.1)),
            Err(CoreError::DegenerateAngle(DegenerateReason::CoincidentPoints))
        );
    }

    // -- joint_angle ------------------------------------------------------------

    const KNEE: JointTriple = JointTriple::new(Joint::LeftHip, Joint::LeftKnee, Joint::LeftAnkle);

    #[test]
    fn joint_angle_reads_frame() {
        let frame = LandmarkFrame::new(0)
            .with(Joint::LeftHip, lm(0.5, 0.2))
            .with(Joint::LeftKnee, lm(0.5, 0.5))
            .with(Joint::LeftAnkle, lm(0.8, 0.5));

        let angle = joint_angle(&frame, &KNEE, 0.5).unwrap();
        assert!((angle - 90.0).abs() < TOLERANCE);
    }

    #[test]
    fn low_visibility_joint_is_absent() {
        let frame = LandmarkFrame::new(0)
            .with(Joint::LeftHip, lm(0.5, 0.2))
            .with(Joint::LeftKnee, Landmark::new(0.5, 0.5, 0.2))
            .with(Joint::LeftAnkle, lm(0.8, 0.5));

        assert_matches!(
            joint_angle(&frame, &KNEE, 0.5),
            Err(CoreError::DegenerateAngle(DegenerateReason::JointAbsent))
        );
    }
}
