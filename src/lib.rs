//! Incremental turtle graphics.
//!
//! Turtles carry a position, a heading and a pen, and draw onto a 2D canvas
//! surface through a [`render::CanvasDevice`] that maps world coordinates to
//! pixels. Motions can be animated: they are split into short steps which an
//! async scheduler feeds to the surface, pausing between steps as the device's
//! delay and render throttle ask.
//!
//! ```no_run
//! use std::rc::Rc;
//! use turtle_canvas::{Session, TurtleConfig};
//! use turtle_canvas::render::Immediate;
//! use turtle_canvas::surface::RecordingHost;
//!
//! # async fn demo() -> miette::Result<()> {
//! let host = RecordingHost::new(400, 400);
//! let mut session = Session::new(Box::new(host), Rc::new(Immediate), TurtleConfig::default());
//! session.run_source("square", "fd(100); lt(90); fd(100)").await?;
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod errors;
pub mod log;
pub mod render;
pub mod script;
pub mod session;
pub mod surface;
pub mod types;

pub use command::{Command, Reply, Value};
pub use errors::{Result, ScriptError, TurtleError};
pub use render::{DeviceRegistry, Heading, Turtle};
pub use script::Script;
pub use session::Session;
pub use types::{Color, Vector};

/// Options for new turtles and their devices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurtleConfig {
    /// Surface used by [`Session`] for its anonymous turtle.
    pub canvas_id: String,
    /// Whether motions animate by default.
    pub animate: bool,
    /// Report `heading`/`towards` in degrees (otherwise radians).
    pub degrees: bool,
    /// Hide the surface when a close-on-click tears it down.
    pub fade_on_exit: bool,
}

impl Default for TurtleConfig {
    fn default() -> Self {
        Self {
            canvas_id: render::defaults::CANVAS_ID.to_string(),
            animate: true,
            degrees: true,
            fade_on_exit: true,
        }
    }
}
