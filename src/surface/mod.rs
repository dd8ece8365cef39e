//! Drawing surface adapter
//!
//! The engine never paints pixels itself. Devices and turtles talk to a
//! [`Surface`], a thin contract modelled on a 2D canvas context: path
//! construction, stroke/fill, a canvas-style `arc`, rectangles, text, styles
//! and an affine transform stack. A [`SurfaceHost`] resolves surface
//! identifiers to surfaces.
//!
//! Two implementations ship with the crate:
//! - [`recording::RecordingSurface`]: records every call (headless, tests)
//! - [`raster::RasterSurface`]: rasterizes with tiny-skia

pub mod raster;
pub mod recording;

pub use raster::{RasterHost, RasterSurface};
pub use recording::{DrawLog, DrawOp, RecordingHost, RecordingSurface};

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Line end style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

/// Line corner style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

impl fmt::Display for LineCap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LineCap::Butt => "butt",
            LineCap::Round => "round",
            LineCap::Square => "square",
        })
    }
}

impl fmt::Display for LineJoin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LineJoin::Miter => "miter",
            LineJoin::Round => "round",
            LineJoin::Bevel => "bevel",
        })
    }
}

/// A paintable 2D surface.
///
/// Coordinates passed to path and rectangle calls are in user space: they go
/// through the current transform, which the owning device sets up once (origin
/// at the center, y up) and again whenever the world mapping changes.
///
/// Angles for [`Surface::arc`] are radians measured in user space, and
/// `counter_clockwise` selects the decreasing-angle sweep, as with a canvas.
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Resize the backing store; clears it and resets the transform stack.
    fn resize(&mut self, width: u32, height: u32);

    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn close_path(&mut self);
    fn stroke(&mut self);
    fn fill(&mut self);
    fn arc(
        &mut self,
        cx: f64,
        cy: f64,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        counter_clockwise: bool,
    );

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn fill_text(&mut self, text: &str, x: f64, y: f64);

    fn set_stroke_style(&mut self, style: &str);
    fn set_fill_style(&mut self, style: &str);
    fn set_line_width(&mut self, width: f64);
    fn set_line_cap(&mut self, cap: LineCap);
    fn set_line_join(&mut self, join: LineJoin);
    fn set_font(&mut self, font: &str);

    fn save(&mut self);
    fn restore(&mut self);
    fn reset_transform(&mut self);
    fn translate(&mut self, tx: f64, ty: f64);
    fn scale(&mut self, sx: f64, sy: f64);

    /// Background shown behind everything painted (not part of the pixels).
    fn set_background(&mut self, _color: &str) {}

    /// Show or hide the whole surface.
    fn set_visible(&mut self, _visible: bool) {}
}

/// Resolves surface identifiers to surfaces.
pub trait SurfaceHost {
    /// The persistent drawing surface for `id`, or `None` if it does not exist.
    fn open(&mut self, id: &str) -> Option<Box<dyn Surface>>;

    /// A transient overlay stacked on top of `id`, used for the turtle icons.
    /// Hosts without one get no icon animation.
    fn open_overlay(&mut self, _id: &str) -> Option<Box<dyn Surface>> {
        None
    }
}

/// A shared surface: the host keeps one handle, the device another.
impl<S: Surface + ?Sized> Surface for Rc<RefCell<S>> {
    fn width(&self) -> u32 {
        self.borrow().width()
    }
    fn height(&self) -> u32 {
        self.borrow().height()
    }
    fn resize(&mut self, width: u32, height: u32) {
        self.borrow_mut().resize(width, height)
    }
    fn begin_path(&mut self) {
        self.borrow_mut().begin_path()
    }
    fn move_to(&mut self, x: f64, y: f64) {
        self.borrow_mut().move_to(x, y)
    }
    fn line_to(&mut self, x: f64, y: f64) {
        self.borrow_mut().line_to(x, y)
    }
    fn close_path(&mut self) {
        self.borrow_mut().close_path()
    }
    fn stroke(&mut self) {
        self.borrow_mut().stroke()
    }
    fn fill(&mut self) {
        self.borrow_mut().fill()
    }
    fn arc(&mut self, cx: f64, cy: f64, radius: f64, start: f64, end: f64, ccw: bool) {
        self.borrow_mut().arc(cx, cy, radius, start, end, ccw)
    }
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.borrow_mut().fill_rect(x, y, width, height)
    }
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.borrow_mut().clear_rect(x, y, width, height)
    }
    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        self.borrow_mut().fill_text(text, x, y)
    }
    fn set_stroke_style(&mut self, style: &str) {
        self.borrow_mut().set_stroke_style(style)
    }
    fn set_fill_style(&mut self, style: &str) {
        self.borrow_mut().set_fill_style(style)
    }
    fn set_line_width(&mut self, width: f64) {
        self.borrow_mut().set_line_width(width)
    }
    fn set_line_cap(&mut self, cap: LineCap) {
        self.borrow_mut().set_line_cap(cap)
    }
    fn set_line_join(&mut self, join: LineJoin) {
        self.borrow_mut().set_line_join(join)
    }
    fn set_font(&mut self, font: &str) {
        self.borrow_mut().set_font(font)
    }
    fn save(&mut self) {
        self.borrow_mut().save()
    }
    fn restore(&mut self) {
        self.borrow_mut().restore()
    }
    fn reset_transform(&mut self) {
        self.borrow_mut().reset_transform()
    }
    fn translate(&mut self, tx: f64, ty: f64) {
        self.borrow_mut().translate(tx, ty)
    }
    fn scale(&mut self, sx: f64, sy: f64) {
        self.borrow_mut().scale(sx, sy)
    }
    fn set_background(&mut self, color: &str) {
        self.borrow_mut().set_background(color)
    }
    fn set_visible(&mut self, visible: bool) {
        self.borrow_mut().set_visible(visible)
    }
}
