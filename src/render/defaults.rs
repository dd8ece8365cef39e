//! Default tunables for devices and turtles

use std::time::Duration;

pub const CANVAS_ID: &str = "mycanvas";

/// Milliseconds per speed unit.
pub const TIME_FACTOR: f64 = 5.0;
/// Step delay of an animating device: five speed units.
pub const ANIMATED_DELAY: Duration = Duration::from_millis(25);
/// World units per animation step.
pub const SEGMENT_LENGTH: f64 = 10.0;
/// Render every queued step.
pub const RENDER_COUNTER: u32 = 1;
/// Arc remainders at or below this many degrees are not emitted.
pub const ARC_REMAINDER_EPSILON: f64 = 0.01;
/// Motions that would split into more steps than this run as a single step.
pub const MAX_ANIMATION_STEPS: usize = 100_000;

pub const PEN_COLOR: &str = "black";
pub const FILL_COLOR: &str = "black";
pub const PEN_WIDTH: f64 = 2.0;
pub const DOT_SIZE: f64 = 2.0;

/// Surface size used when the host does not dictate one.
pub const WINDOW_WIDTH: u32 = 500;
pub const WINDOW_HEIGHT: u32 = 500;
