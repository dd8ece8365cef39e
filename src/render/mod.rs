//! Turtle rendering engine
//!
//! This module is organized into submodules:
//! - `defaults`: Default delays, sizes and styles
//! - `geometry`: World mapping and arc planning
//! - `shapes`: Icon outlines
//! - `device`: One canvas device per drawing surface
//! - `animation`: Step decomposition and the cooperative scheduler
//! - `turtle`: The turtle state machine
//! - `registry`: Surface id to device lookup

pub mod animation;
pub mod defaults;
pub mod device;
pub mod geometry;
pub mod registry;
pub mod shapes;
pub mod turtle;

pub use animation::{Immediate, Pacer, TokioPacer};
pub use device::{CanvasDevice, DeviceHandle, TurtleId};
pub use geometry::{WorldBox, WorldMapping};
pub use registry::DeviceRegistry;
pub use shapes::Shape;
pub use turtle::{Heading, Turtle};
