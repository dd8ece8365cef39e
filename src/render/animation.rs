//! Animation scheduler
//!
//! A motion is decomposed into an ordered queue of [`AnimationStep`]s which
//! are drained one at a time. Whether a step pays the device delay is a pure
//! function of the throttle state ([`plan_step`]); how a delay is waited out
//! is the injected [`Pacer`]. Suspension happens only between steps.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use super::defaults;
use super::device::DeviceHandle;
use super::turtle::Turtle;
use crate::errors::Result;
use crate::log;
use crate::types::{Color, Vector};

// ============================================================================
// Pacing
// ============================================================================

/// Waits out the delay of a visible animation step.
pub trait Pacer {
    fn pause(&self, delay: Duration) -> Pin<Box<dyn Future<Output = ()> + '_>>;
}

/// Never waits: every motion runs to completion in one go. For headless
/// rendering and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct Immediate;

impl Pacer for Immediate {
    fn pause(&self, _delay: Duration) -> Pin<Box<dyn Future<Output = ()> + '_>> {
        Box::pin(std::future::ready(()))
    }
}

/// Yields to the tokio timer for each paused step.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioPacer;

impl Pacer for TokioPacer {
    fn pause(&self, delay: Duration) -> Pin<Box<dyn Future<Output = ()> + '_>> {
        Box::pin(tokio::time::sleep(delay))
    }
}

/// What to do before executing one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pace {
    /// Below the throttle threshold: run immediately.
    CatchUp,
    /// Threshold reached but no delay configured: reset the counter and run.
    Render,
    /// Threshold reached: reset the counter and wait before running.
    Pause(Duration),
}

/// Decide the pacing of a step from the live render count (already
/// incremented for this step), the throttle threshold and the device delay.
pub fn plan_step(count: u32, threshold: u32, delay: Duration) -> Pace {
    if count < threshold {
        Pace::CatchUp
    } else if delay.is_zero() {
        Pace::Render
    } else {
        Pace::Pause(delay)
    }
}

// ============================================================================
// Steps
// ============================================================================

/// One discrete draw step of a motion.
#[derive(Debug, Clone, PartialEq)]
pub enum AnimationStep {
    /// Pen up: move without drawing.
    Move { from: Vector, to: Vector },
    /// Pen down: stroke from `from` to `to`.
    Line { from: Vector, to: Vector, color: Color },
    /// Part of a circle, relative to the turtle's pose when it runs.
    Arc { radius: f64, extent: f64 },
}

/// Position and heading committed when a motion completes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vector,
    pub heading: Vector,
}

/// Chop the straight motion `start -> end` into steps of `segment_length`,
/// plus a final step landing exactly on `end` unless the last full step
/// already did. `pen` carries the stroke color when the pen is down.
pub fn segment_line(
    start: Vector,
    end: Vector,
    segment_length: f64,
    pen: Option<&Color>,
) -> Vec<AnimationStep> {
    let step = |from: Vector, to: Vector| match pen {
        Some(color) => AnimationStep::Line {
            from,
            to,
            color: color.clone(),
        },
        None => AnimationStep::Move { from, to },
    };

    let delta = end - start;
    let direction = delta.normalize();
    let Some(count) = step_count(delta.len(), segment_length) else {
        return if delta == Vector::ZERO {
            Vec::new()
        } else {
            vec![step(start, end)]
        };
    };

    let mut steps = Vec::with_capacity(count + 1);
    let mut at = start;
    for _ in 0..count {
        let next = at.linear(1.0, segment_length, direction);
        steps.push(step(at, next));
        at = next;
    }
    if at.x() != end.x() || at.y() != end.y() {
        steps.push(step(at, end));
    }
    steps
}

/// Chop an arc into steps whose arc length is about `segment_length`.
/// Arcs no longer than one segment stay whole; a leftover of at most
/// 0.01 degrees is dropped.
pub fn segment_arc(radius: f64, extent: f64, segment_length: f64) -> Vec<AnimationStep> {
    let whole = vec![AnimationStep::Arc { radius, extent }];
    let arc_length = (radius * std::f64::consts::TAU * extent / 360.0).abs();
    if arc_length <= segment_length {
        return whole;
    }
    let Some(count) = step_count(arc_length, segment_length) else {
        return whole;
    };

    let part = segment_length / arc_length * extent;
    let mut steps = vec![
        AnimationStep::Arc {
            radius,
            extent: part,
        };
        count
    ];
    let left = extent - count as f64 * part;
    if left.abs() > defaults::ARC_REMAINDER_EPSILON {
        steps.push(AnimationStep::Arc {
            radius,
            extent: left,
        });
    }
    steps
}

/// Number of full segments in `length`, or `None` when the motion should
/// not be split: no usable segment length, or more steps than
/// [`defaults::MAX_ANIMATION_STEPS`].
fn step_count(length: f64, segment_length: f64) -> Option<usize> {
    if segment_length.is_nan() || segment_length <= 0.0 {
        return None;
    }
    let count = (length / segment_length).floor();
    (count < defaults::MAX_ANIMATION_STEPS as f64).then_some(count as usize)
}

// ============================================================================
// Execution
// ============================================================================

/// Keeps the device's in-flight count up for the lifetime of one motion,
/// including when the motion future is dropped early.
struct InFlight(DeviceHandle);

impl InFlight {
    fn enter(device: &DeviceHandle) -> Result<Self> {
        device.borrow_mut().begin_motion()?;
        Ok(Self(device.clone()))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if let Ok(mut device) = self.0.try_borrow_mut() {
            device.end_motion();
        }
    }
}

/// Drain `steps` against `turtle`, pacing them through the device throttle,
/// then commit `end` if given. Resolves once the turtle is in its final state.
pub(crate) async fn run(
    turtle: &mut Turtle,
    steps: Vec<AnimationStep>,
    end: Option<Pose>,
) -> Result<()> {
    let device = turtle.device().clone();
    let _flight = InFlight::enter(&device)?;
    let (delay, threshold, pacer) = {
        let d = device.borrow();
        (d.delay(), d.counter(), d.pacer())
    };
    log::debug!(turtle = %turtle.id(), steps = steps.len(), ?delay, "motion started");

    for step in steps {
        let count = device.borrow_mut().increment_render_count();
        log::trace!(turtle = %turtle.id(), count, threshold, "animation step");
        match plan_step(count, threshold, delay) {
            Pace::CatchUp => {}
            Pace::Render => device.borrow_mut().reset_render_count(),
            Pace::Pause(delay) => {
                device.borrow_mut().reset_render_count();
                pacer.pause(delay).await;
            }
        }
        turtle.exec_step(step)?;
    }

    if let Some(pose) = end {
        turtle.commit(pose);
    }
    log::debug!(turtle = %turtle.id(), "motion finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ends(steps: &[AnimationStep]) -> Vec<Vector> {
        steps
            .iter()
            .map(|s| match s {
                AnimationStep::Line { to, .. } | AnimationStep::Move { to, .. } => *to,
                AnimationStep::Arc { .. } => panic!("unexpected arc"),
            })
            .collect()
    }

    #[test]
    fn line_splits_into_full_segments_and_remainder() {
        let black = Color::black();
        let steps = segment_line(Vector::ZERO, Vector::xy(25.0, 0.0), 10.0, Some(&black));
        assert_eq!(steps.len(), 3);
        assert!(matches!(steps[0], AnimationStep::Line { .. }));
        assert_eq!(
            ends(&steps),
            vec![Vector::xy(10.0, 0.0), Vector::xy(20.0, 0.0), Vector::xy(25.0, 0.0)]
        );
    }

    #[test]
    fn exact_multiple_has_no_remainder() {
        let steps = segment_line(Vector::ZERO, Vector::xy(0.0, 30.0), 10.0, None);
        assert_eq!(steps.len(), 3);
        assert!(steps.iter().all(|s| matches!(s, AnimationStep::Move { .. })));
    }

    #[test]
    fn diagonal_lands_exactly_on_target() {
        let target = Vector::xy(-37.3, 81.9);
        let steps = segment_line(Vector::xy(1.5, -2.0), target, 7.0, None);
        let ends = ends(&steps);
        assert_eq!(*ends.last().unwrap(), target);
        let mut at = Vector::xy(1.5, -2.0);
        for (i, end) in ends.iter().enumerate() {
            let len = at.distance(*end);
            if i + 1 < ends.len() {
                assert!((len - 7.0).abs() < 1e-9);
            } else {
                assert!(len <= 7.0 + 1e-9);
            }
            at = *end;
        }
    }

    #[test]
    fn zero_length_motion_has_no_steps() {
        assert!(segment_line(Vector::xy(3.0, 3.0), Vector::xy(3.0, 3.0), 10.0, None).is_empty());
    }

    #[test]
    fn short_arc_is_one_step() {
        let steps = segment_arc(1.0, 90.0, 10.0);
        assert_eq!(steps, vec![AnimationStep::Arc { radius: 1.0, extent: 90.0 }]);
    }

    #[test]
    fn long_arc_splits_by_segment_length() {
        // Circumference 100 with 10-unit segments: ten 36-degree parts.
        let radius = 100.0 / std::f64::consts::TAU;
        let steps = segment_arc(radius, 360.0, 10.0);
        let total: f64 = steps
            .iter()
            .map(|s| match s {
                AnimationStep::Arc { extent, .. } => *extent,
                _ => 0.0,
            })
            .sum();
        assert!((9..=10).contains(&steps.len()));
        assert!((total - 360.0).abs() < 0.011);
    }

    fn extents(steps: &[AnimationStep]) -> Vec<f64> {
        steps
            .iter()
            .map(|s| match s {
                AnimationStep::Arc { extent, .. } => *extent,
                _ => panic!("expected an arc"),
            })
            .collect()
    }

    #[test]
    fn arc_leftover_within_a_hundredth_of_a_degree_is_dropped() {
        // Circumference 360: one degree per unit, so 10-unit segments are
        // 10 degrees and 90.005 leaves 0.005 over.
        let radius = 360.0 / std::f64::consts::TAU;
        let extents = extents(&segment_arc(radius, 90.005, 10.0));
        assert_eq!(extents.len(), 9);
        assert!(extents.iter().all(|e| (e - 10.0).abs() < 1e-9));
    }

    #[test]
    fn arc_leftover_above_a_hundredth_of_a_degree_gets_one_step() {
        let radius = 360.0 / std::f64::consts::TAU;
        let extents = extents(&segment_arc(radius, 90.5, 10.0));
        assert_eq!(extents.len(), 10);
        assert!(extents[..9].iter().all(|e| (e - 10.0).abs() < 1e-9));
        assert!((extents[9] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn huge_line_is_drawn_in_one_step() {
        let steps = segment_line(Vector::ZERO, Vector::xy(1e300, 0.0), 10.0, None);
        assert_eq!(ends(&steps), vec![Vector::xy(1e300, 0.0)]);

        let steps = segment_line(Vector::ZERO, Vector::xy(0.0, 1e10), 10.0, None);
        assert_eq!(steps.len(), 1);
    }

    #[test]
    fn huge_circle_is_drawn_in_one_step() {
        let steps = segment_arc(1e20, 360.0, 10.0);
        assert_eq!(steps, vec![AnimationStep::Arc { radius: 1e20, extent: 360.0 }]);
        let steps = segment_arc(1.0, 1e12, 10.0);
        assert_eq!(steps.len(), 1);
    }

    #[test]
    fn longest_split_stays_under_the_step_limit() {
        let length = 10.0 * (defaults::MAX_ANIMATION_STEPS as f64 - 0.5);
        let steps = segment_line(Vector::ZERO, Vector::xy(length, 0.0), 10.0, None);
        assert_eq!(steps.len(), defaults::MAX_ANIMATION_STEPS);
    }

    #[test]
    fn negative_extent_keeps_sign() {
        let steps = segment_arc(50.0, -180.0, 10.0);
        assert!(steps.len() > 1);
        assert!(steps.iter().all(|s| matches!(s, AnimationStep::Arc { extent, .. } if *extent < 0.0)));
    }

    #[test]
    fn pacing_is_pure() {
        let d = Duration::from_millis(25);
        assert_eq!(plan_step(1, 3, d), Pace::CatchUp);
        assert_eq!(plan_step(3, 3, d), Pace::Pause(d));
        assert_eq!(plan_step(1, 1, Duration::ZERO), Pace::Render);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_pacer_waits_for_the_delay() {
        let start = tokio::time::Instant::now();
        TokioPacer.pause(Duration::from_millis(40)).await;
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn immediate_pacer_is_ready() {
        Immediate.pause(Duration::from_secs(3600)).await;
    }
}
