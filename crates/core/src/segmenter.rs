//! Repetition segmentation state machine.
//!
//! [`RepetitionSegmenter`] consumes one [`SignalSample`] at a time and emits
//! a [`RepetitionCycle`] each time it observes a full cycle: motion away from
//! rest, a settled extremum, and a sustained return past the start level
//! (`rest_threshold` moved by `hysteresis` toward effort). The same level
//! opens and closes a cycle, so a lockout just short of full extension still
//! ends the rep.
//!
//! Internally the signal is oriented with [`Direction::orient`] so that
//! effort always means "increasing", which lets one machine serve both
//! minimum-seeking (squat, press) and maximum-seeking (pull-up) profiles.
//!
//! ```text
//! IDLE --beyond rest+h, sustained--> IN_MOTION --no gain for settle frames--> AT_EXTREMUM
//!   ^                                    ^  ^                                    |   |
//!   |                                    |  +------gain beyond best+h------------+   |
//!   |                                    +-------new best-------+                    |
//!   +---back past rest+h, sustained (emit)- RETURNING <--retreat beyond h, sustained--+
//! ```

use crate::profile::{Direction, SegmentationParams};
use crate::signal::SignalSample;
use crate::types::FrameIndex;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmenterState {
    Idle,
    InMotion,
    AtExtremum,
    Returning,
}

/// Boundaries and captured values of one completed cycle, in raw signal
/// units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepetitionCycle {
    pub entry_frame: FrameIndex,
    /// Extremal signal value reached during the cycle.
    pub peak_value: f64,
    pub peak_frame: FrameIndex,
    /// Rest-side value the descent started from: the fullest lockout seen
    /// between the previous cycle and this one.
    pub descent_value: f64,
    pub descent_frame: FrameIndex,
    pub exit_frame: FrameIndex,
}

/// Result of running a whole sample stream through a segmenter.
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    pub cycles: Vec<RepetitionCycle>,
    /// `true` when the stream ended part-way through a cycle, which was
    /// discarded.
    pub incomplete_cycle: bool,
}

// ---------------------------------------------------------------------------
// RepetitionSegmenter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RepetitionSegmenter {
    params: SegmentationParams,
    direction: Direction,
    state: SegmenterState,
    /// Consecutive usable frames satisfying the pending transition.
    run: u32,
    /// Consecutive usable frames without a new best, while in motion.
    stall: u32,
    entry_frame: FrameIndex,
    entry_value: f64,
    /// Best oriented value of the current cycle.
    best: f64,
    best_frame: FrameIndex,
    /// Lowest oriented value seen at rest since the last cycle.
    lockout: Option<(FrameIndex, f64)>,
}

impl RepetitionSegmenter {
    pub fn new(params: SegmentationParams, direction: Direction) -> Self {
        Self {
            params,
            direction,
            state: SegmenterState::Idle,
            run: 0,
            stall: 0,
            entry_frame: 0,
            entry_value: 0.0,
            best: f64::NEG_INFINITY,
            best_frame: 0,
            lockout: None,
        }
    }

    pub fn state(&self) -> SegmenterState {
        self.state
    }

    /// Oriented level a signal must exceed to leave rest, and fall back below
    /// to return to it.
    fn start_level(&self) -> f64 {
        self.direction.orient(self.params.rest_threshold) + self.params.hysteresis
    }

    fn note_rest(&mut self, frame: FrameIndex, value: f64) {
        let fuller = match self.lockout {
            Some((_, rested)) => value < rested,
            None => true,
        };
        if fuller {
            self.lockout = Some((frame, value));
        }
    }

    fn record_best(&mut self, frame: FrameIndex, value: f64) {
        self.best = value;
        self.best_frame = frame;
        self.stall = 0;
    }

    /// Feed one sample. Unusable samples hold the current state and leave
    /// run counters untouched.
    pub fn push(&mut self, sample: SignalSample) -> Option<RepetitionCycle> {
        let raw = sample.value?;
        let value = self.direction.orient(raw);
        let frame = sample.frame;
        let h = self.params.hysteresis;

        match self.state {
            SegmenterState::Idle => {
                if value > self.start_level() {
                    if self.run == 0 {
                        self.entry_frame = frame;
                        self.entry_value = value;
                        self.record_best(frame, value);
                    } else if value > self.best {
                        self.record_best(frame, value);
                    }
                    self.run += 1;
                    if self.run >= self.params.sustain_frames {
                        self.state = SegmenterState::InMotion;
                        self.run = 0;
                        self.stall = 0;
                    }
                } else {
                    self.run = 0;
                    self.note_rest(frame, value);
                }
            }
            SegmenterState::InMotion => {
                if value > self.best {
                    self.record_best(frame, value);
                } else {
                    self.stall += 1;
                }
                if self.stall >= self.params.settle_frames {
                    self.state = SegmenterState::AtExtremum;
                    self.run = 0;
                }
            }
            SegmenterState::AtExtremum => {
                if value > self.best + h {
                    self.record_best(frame, value);
                    self.run = 0;
                    self.state = SegmenterState::InMotion;
                    return None;
                }
                if value > self.best {
                    // Within the hysteresis band: refine the extremum quietly.
                    self.best = value;
                    self.best_frame = frame;
                }
                if self.best - value > h {
                    self.run += 1;
                    if self.run >= self.params.sustain_frames {
                        self.state = SegmenterState::Returning;
                        self.run = 0;
                    }
                } else {
                    self.run = 0;
                }
            }
            SegmenterState::Returning => {
                if value > self.best {
                    // Went deeper again before reaching rest: same rep.
                    self.record_best(frame, value);
                    self.run = 0;
                    self.state = SegmenterState::InMotion;
                    return None;
                }
                if value < self.start_level() {
                    self.run += 1;
                    if self.run >= self.params.sustain_frames {
                        return Some(self.finalize(frame, value));
                    }
                } else {
                    self.run = 0;
                }
            }
        }
        None
    }

    fn finalize(&mut self, exit_frame: FrameIndex, exit_value: f64) -> RepetitionCycle {
        let (descent_frame, descent) = self
            .lockout
            .take()
            .unwrap_or((self.entry_frame, self.entry_value));
        let cycle = RepetitionCycle {
            entry_frame: self.entry_frame,
            peak_value: self.direction.orient(self.best),
            peak_frame: self.best_frame,
            descent_value: self.direction.orient(descent),
            descent_frame,
            exit_frame,
        };

        self.state = SegmenterState::Idle;
        self.run = 0;
        self.stall = 0;
        self.best = f64::NEG_INFINITY;
        self.note_rest(exit_frame, exit_value);
        cycle
    }

    /// `true` if a cycle has started but not yet completed.
    pub fn is_mid_cycle(&self) -> bool {
        self.state != SegmenterState::Idle
    }
}

/// Segment a full sample stream, discarding a trailing partial cycle.
pub fn segment(
    samples: &[SignalSample],
    params: SegmentationParams,
    direction: Direction,
) -> Segmentation {
    let mut segmenter = RepetitionSegmenter::new(params, direction);
    let cycles = samples
        .iter()
        .filter_map(|&sample| segmenter.push(sample))
        .collect();

    Segmentation {
        cycles,
        incomplete_cycle: segmenter.is_mid_cycle(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::*;

    const ANGLE_PARAMS: SegmentationParams = SegmentationParams {
        rest_threshold: 160.0,
        hysteresis: 5.0,
        sustain_frames: 2,
        settle_frames: 3,
    };

    fn samples(values: &[f64]) -> Vec<SignalSample> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| SignalSample {
                frame: i as FrameIndex,
                value: Some(v),
            })
            .collect()
    }

    /// Cosine between `high` and `low`, starting and ending at `high`.
    fn oscillate(high: f64, low: f64, cycles: usize, period: usize) -> Vec<f64> {
        let mid = (high + low) / 2.0;
        let amp = (high - low) / 2.0;
        (0..=cycles * period)
            .map(|t| mid + amp * (2.0 * PI * t as f64 / period as f64).cos())
            .collect()
    }

    /// Linear steps from `from` (exclusive) to `to` (inclusive).
    fn ramp(from: f64, to: f64, steps: usize) -> Vec<f64> {
        (1..=steps)
            .map(|i| from + (to - from) * i as f64 / steps as f64)
            .collect()
    }

    fn run(values: &[f64]) -> Segmentation {
        segment(&samples(values), ANGLE_PARAMS, Direction::Minimum)
    }

    // -- full cycles ------------------------------------------------------------

    #[test]
    fn counts_each_deep_cycle() {
        let result = run(&oscillate(170.0, 80.0, 4, 30));

        assert_eq!(result.cycles.len(), 4);
        assert!(!result.incomplete_cycle);
        for (i, cycle) in result.cycles.iter().enumerate() {
            assert!((cycle.peak_value - 80.0).abs() < 1e-9);
            assert_eq!(cycle.peak_frame, (i * 30 + 15) as FrameIndex);
            assert!(cycle.descent_frame < cycle.entry_frame);
            assert!(cycle.entry_frame < cycle.peak_frame);
            assert!(cycle.peak_frame < cycle.exit_frame);
            assert!((cycle.descent_value - 170.0).abs() < 1e-6);
        }
    }

    #[test]
    fn lockout_short_of_rest_threshold_still_ends_rep() {
        let result = run(&oscillate(162.0, 80.0, 5, 30));

        assert_eq!(result.cycles.len(), 5);
        assert!(!result.incomplete_cycle);
        assert_eq!(result.cycles[0].exit_frame, 29);
    }

    #[test]
    fn counts_shallow_cycles_too() {
        let result = run(&oscillate(170.0, 150.0, 3, 30));

        assert_eq!(result.cycles.len(), 3);
        for cycle in &result.cycles {
            assert!((cycle.peak_value - 150.0).abs() < 1e-9);
        }
    }

    #[test]
    fn descent_value_is_the_preceding_lockout() {
        let mut values: Vec<f64> = oscillate(170.0, 80.0, 1, 30).into_iter().take(28).collect();
        values.extend([163.0, 164.0, 163.0]);
        values.extend(ramp(163.0, 80.0, 10));
        values.extend(ramp(80.0, 170.0, 10));

        let result = run(&values);
        assert_eq!(result.cycles.len(), 2);
        assert_eq!(result.cycles[0].descent_frame, 0);
        assert!((result.cycles[0].descent_value - 170.0).abs() < 1e-9);
        assert_eq!(result.cycles[1].descent_frame, 29);
        assert_eq!(result.cycles[1].descent_value, 164.0);
    }

    // -- noise rejection --------------------------------------------------------

    #[test]
    fn single_frame_spike_ignored() {
        let result = run(&[170.0, 170.0, 140.0, 170.0, 170.0, 170.0]);

        assert!(result.cycles.is_empty());
        assert!(!result.incomplete_cycle);
    }

    #[test]
    fn jitter_at_bottom_is_one_rep() {
        let mut values = vec![170.0];
        values.extend(ramp(170.0, 80.0, 18));
        values.extend([83.0, 79.0, 84.0, 80.0, 83.0]);
        values.extend(ramp(83.0, 170.0, 18));
        values.extend([170.0, 170.0]);

        let result = run(&values);
        assert_eq!(result.cycles.len(), 1);
        assert!((result.cycles[0].peak_value - 79.0).abs() < 1e-9);
    }

    #[test]
    fn jitter_at_rest_does_not_trigger() {
        let result = run(&[170.0, 156.0, 171.0, 154.0, 168.0, 157.0, 170.0]);
        assert!(result.cycles.is_empty());
        assert!(!result.incomplete_cycle);
    }

    #[test]
    fn second_bottom_within_one_rep() {
        let mut values = vec![170.0];
        values.extend(ramp(170.0, 100.0, 14));
        values.extend(ramp(100.0, 115.0, 3));
        values.extend(ramp(115.0, 90.0, 5));
        values.extend(ramp(90.0, 170.0, 16));
        values.extend([170.0, 170.0]);

        let result = run(&values);
        assert_eq!(result.cycles.len(), 1);
        assert!((result.cycles[0].peak_value - 90.0).abs() < 1e-9);
    }

    // -- missing frames ---------------------------------------------------------

    #[test]
    fn unusable_frames_hold_state() {
        let mut s = samples(&oscillate(170.0, 80.0, 3, 30));
        for sample in s.iter_mut().filter(|s| s.frame % 4 == 1) {
            sample.value = None;
        }

        let result = segment(&s, ANGLE_PARAMS, Direction::Minimum);
        assert_eq!(result.cycles.len(), 3);
    }

    #[test]
    fn unusable_sample_leaves_state_unchanged() {
        let mut seg = RepetitionSegmenter::new(ANGLE_PARAMS, Direction::Minimum);
        for s in samples(&[170.0, 150.0, 145.0]) {
            seg.push(s);
        }
        assert_eq!(seg.state(), SegmenterState::InMotion);

        seg.push(SignalSample { frame: 3, value: None });
        assert_eq!(seg.state(), SegmenterState::InMotion);
    }

    // -- partial cycles ---------------------------------------------------------

    #[test]
    fn trailing_partial_cycle_discarded() {
        let mut values = oscillate(170.0, 80.0, 2, 30);
        values.extend(ramp(170.0, 80.0, 15));
        values.extend(ramp(80.0, 120.0, 8));

        let result = run(&values);
        assert_eq!(result.cycles.len(), 2);
        assert!(result.incomplete_cycle);
    }

    #[test]
    fn descent_only_yields_nothing() {
        let mut values = vec![170.0];
        values.extend(ramp(170.0, 80.0, 18));

        let result = run(&values);
        assert!(result.cycles.is_empty());
        assert!(result.incomplete_cycle);
    }

    // -- maximum direction ------------------------------------------------------

    #[test]
    fn maximum_direction_counts_peaks() {
        let params = SegmentationParams {
            rest_threshold: -0.15,
            hysteresis: 0.03,
            sustain_frames: 2,
            settle_frames: 3,
        };
        // Hanging at -0.30, pulling up to +0.05.
        let values: Vec<f64> = oscillate(0.05, -0.30, 3, 30)
            .into_iter()
            .map(|v| -0.25 - v)
            .collect();

        let result = segment(&samples(&values), params, Direction::Maximum);
        assert_eq!(result.cycles.len(), 3);
        for cycle in &result.cycles {
            assert!((cycle.peak_value - 0.05).abs() < 1e-9);
        }
    }
}
