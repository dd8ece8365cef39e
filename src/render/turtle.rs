//! Turtle state machine
//!
//! A turtle holds its pose (position, heading, normal), pen and fill state
//! and icon shape, and draws through the [`CanvasDevice`] it is attached to.
//! Motions are `async`: they resolve once the turtle is in its final state.
//! Because they take `&mut self`, motions on one turtle are serialized by
//! construction.
//!
//! [`CanvasDevice`]: super::device::CanvasDevice

use super::animation::{self, AnimationStep, Pose};
use super::defaults;
use super::device::{DeviceHandle, TurtleId};
use super::geometry::ArcPlan;
use super::shapes::Shape;
use crate::TurtleConfig;
use crate::errors::{Result, TurtleError};
use crate::surface::{LineCap, LineJoin, Surface};
use crate::types::{Color, Vector};

/// Argument of [`Turtle::set_heading`]: an angle in degrees or a direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Heading {
    Degrees(f64),
    Direction(Vector),
}

impl From<f64> for Heading {
    fn from(degrees: f64) -> Self {
        Heading::Degrees(degrees)
    }
}

impl From<Vector> for Heading {
    fn from(direction: Vector) -> Self {
        Heading::Direction(direction)
    }
}

pub struct Turtle {
    id: TurtleId,
    device: DeviceHandle,
    position: Vector,
    heading: Vector,
    normal: Vector,
    pen_down: bool,
    pen_color: Color,
    pen_width: f64,
    fill_color: Color,
    filling: bool,
    visible: bool,
    shape: Shape,
    animate: bool,
    animate_by_default: bool,
    degrees: bool,
}

fn finite(operation: &'static str, name: &str, value: f64) -> Result<f64> {
    TurtleError::check_finite(operation, name, value)
}

fn apply_pen(surface: &mut dyn Surface, width: f64, color: &Color) {
    surface.set_line_cap(LineCap::Round);
    surface.set_line_join(LineJoin::Round);
    surface.set_line_width(width);
    surface.set_stroke_style(&color.to_string());
}

impl Turtle {
    /// Attach a new turtle to `device` in the home pose.
    pub fn new(device: DeviceHandle, config: &TurtleConfig) -> Result<Self> {
        let id = {
            let mut dev = device.borrow_mut();
            dev.surface()?;
            dev.register_turtle()
        };
        let mut turtle = Self {
            id,
            device,
            position: Vector::ZERO,
            heading: Vector::X,
            normal: Vector::NEG_Z,
            pen_down: true,
            pen_color: Color::Named(defaults::PEN_COLOR.to_string()),
            pen_width: defaults::PEN_WIDTH,
            fill_color: Color::Named(defaults::FILL_COLOR.to_string()),
            filling: false,
            visible: true,
            shape: Shape::default(),
            animate: config.animate,
            animate_by_default: config.animate,
            degrees: config.degrees,
        };
        turtle.home()?;
        Ok(turtle)
    }

    pub fn id(&self) -> TurtleId {
        self.id
    }

    pub fn device(&self) -> &DeviceHandle {
        &self.device
    }

    /// Whether this turtle animates its motions (before any device-wide tracer).
    pub fn is_animated(&self) -> bool {
        self.animate
    }

    fn animates(&self) -> bool {
        self.animate && !self.device.borrow().is_instant()
    }

    fn pose(&self) -> Pose {
        Pose {
            position: self.position,
            heading: self.heading,
        }
    }

    pub(crate) fn commit(&mut self, pose: Pose) {
        self.position = pose.position;
        self.heading = pose.heading;
    }

    // ------------------------------------------------------------------------
    // Motion
    // ------------------------------------------------------------------------

    pub async fn forward(&mut self, distance: f64) -> Result<()> {
        let distance = finite("forward", "distance", distance)?;
        let target = self.position.linear(1.0, distance, self.heading);
        self.travel(target, false).await
    }

    pub async fn backward(&mut self, distance: f64) -> Result<()> {
        let distance = finite("backward", "distance", distance)?;
        self.forward(-distance).await
    }

    /// Move to `(x, y)`, drawing if the pen is down.
    pub async fn goto(&mut self, x: f64, y: f64) -> Result<()> {
        let target = Vector::xy(finite("goto", "x", x)?, finite("goto", "y", y)?);
        self.travel(target, false).await
    }

    /// Move to a point given as 2 or 3 components.
    pub async fn goto_point(&mut self, point: &[f64]) -> Result<()> {
        let target = Vector::try_from(point)?;
        for (name, v) in [("x", target.x()), ("y", target.y())] {
            finite("goto", name, v)?;
        }
        self.travel(Vector::xy(target.x(), target.y()), false).await
    }

    /// Move to `(x, y)` without drawing.
    pub async fn set_position(&mut self, x: f64, y: f64) -> Result<()> {
        let target = Vector::xy(
            finite("set_position", "x", x)?,
            finite("set_position", "y", y)?,
        );
        self.travel(target, true).await
    }

    pub async fn set_x(&mut self, x: f64) -> Result<()> {
        let target = Vector::xy(finite("set_x", "x", x)?, self.position.y());
        self.travel(target, false).await
    }

    pub async fn set_y(&mut self, y: f64) -> Result<()> {
        let target = Vector::xy(self.position.x(), finite("set_y", "y", y)?);
        self.travel(target, false).await
    }

    async fn travel(&mut self, target: Vector, suppress_pen: bool) -> Result<()> {
        if self.pen_down && !suppress_pen {
            return self.draw_line(target).await;
        }
        if self.animates() {
            let segment = self.device.borrow().segment_length();
            let steps = animation::segment_line(self.position, target, segment, None);
            let end = Pose {
                position: target,
                heading: self.heading,
            };
            animation::run(self, steps, Some(end)).await
        } else {
            self.device
                .borrow_mut()
                .surface()?
                .move_to(target.x(), target.y());
            self.position = target;
            self.refresh_icon()
        }
    }

    async fn draw_line(&mut self, target: Vector) -> Result<()> {
        if self.animates() {
            let segment = self.device.borrow().segment_length();
            let steps =
                animation::segment_line(self.position, target, segment, Some(&self.pen_color));
            let end = Pose {
                position: target,
                heading: self.heading,
            };
            return animation::run(self, steps, Some(end)).await;
        }
        self.stroke_segment(self.position, target, &self.pen_color.clone())?;
        self.position = target;
        self.refresh_icon()
    }

    /// One straight stroke. While filling, the segment joins the fill path
    /// instead of opening its own.
    fn stroke_segment(&mut self, from: Vector, to: Vector, color: &Color) -> Result<()> {
        let mut dev = self.device.borrow_mut();
        let width = self.pen_width * dev.line_scale();
        let surface = dev.surface()?;
        if !self.filling {
            surface.begin_path();
            surface.move_to(from.x(), from.y());
        }
        apply_pen(surface, width, color);
        surface.line_to(to.x(), to.y());
        surface.stroke();
        if !self.filling {
            surface.close_path();
        }
        Ok(())
    }

    /// Execute one scheduled step and refresh the icon at the new pose.
    pub(crate) fn exec_step(&mut self, step: AnimationStep) -> Result<()> {
        match step {
            AnimationStep::Line { from, to, color } => {
                self.stroke_segment(from, to, &color)?;
                self.position = to;
            }
            AnimationStep::Move { to, .. } => {
                self.device.borrow_mut().surface()?.move_to(to.x(), to.y());
                self.position = to;
            }
            AnimationStep::Arc { radius, extent } => self.arc(radius, extent)?,
        }
        self.refresh_icon()
    }

    pub fn right(&mut self, angle: f64) -> Result<()> {
        let angle = finite("right", "angle", angle)?;
        self.turn(angle);
        self.refresh_icon()
    }

    pub fn left(&mut self, angle: f64) -> Result<()> {
        let angle = finite("left", "angle", angle)?;
        self.turn(-angle);
        self.refresh_icon()
    }

    /// Rotate the heading clockwise by `degrees` within the heading/normal plane.
    fn turn(&mut self, degrees: f64) {
        let axis = self.normal.cross(self.heading);
        self.heading = self.heading.rotate_normal(axis, degrees.to_radians());
    }

    /// Back to the origin facing +x, without drawing.
    pub fn home(&mut self) -> Result<()> {
        self.device.borrow_mut().surface()?.move_to(0.0, 0.0);
        self.position = Vector::ZERO;
        self.heading = Vector::X;
        self.normal = Vector::NEG_Z;
        self.refresh_icon()
    }

    pub fn set_heading(&mut self, heading: impl Into<Heading>) -> Result<()> {
        self.heading = match heading.into() {
            Heading::Degrees(d) => Vector::from_angle(finite("set_heading", "angle", d)?),
            Heading::Direction(v) => Vector::xy(v.x(), v.y()).try_normalize("set_heading")?,
        };
        self.refresh_icon()
    }

    /// Draw a circle (or an arc of `extent` degrees, default a full turn) of
    /// `radius`. Positive radii curve left. Whole turns leave the pose as it was.
    pub async fn circle(&mut self, radius: f64, extent: Option<f64>) -> Result<()> {
        let radius = finite("circle", "radius", radius)?;
        let extent = finite("circle", "extent", extent.unwrap_or(360.0))?;
        let whole_turn = extent % 360.0 == 0.0;
        let start = self.pose();

        if self.animates() {
            let segment = self.device.borrow().segment_length();
            let steps = animation::segment_arc(radius, extent, segment);
            animation::run(self, steps, whole_turn.then_some(start)).await
        } else {
            self.arc(radius, extent)?;
            if whole_turn {
                self.commit(start);
            }
            self.refresh_icon()
        }
    }

    /// Draw one arc in a single surface call and advance to its end.
    pub(crate) fn arc(&mut self, radius: f64, extent: f64) -> Result<()> {
        let plan = ArcPlan::new(self.position, self.heading.to_angle(), radius, extent);
        if self.pen_down || self.filling {
            let mut dev = self.device.borrow_mut();
            let width = self.pen_width * dev.line_scale();
            let surface = dev.surface()?;
            apply_pen(surface, width, &self.pen_color);
            if !self.filling {
                surface.begin_path();
            }
            surface.arc(
                plan.center.x,
                plan.center.y,
                plan.radius,
                plan.start,
                plan.end,
                plan.counter_clockwise,
            );
            if self.pen_down {
                surface.stroke();
            }
            if !self.filling {
                surface.close_path();
            }
        }
        if let Some((position, heading)) = plan.end_pose {
            self.position = position;
            self.heading = Vector::from_angle(heading);
        }
        Ok(())
    }

    /// Paint a square dot of side `size` (default 2) centered on the turtle,
    /// optionally in `color` instead of the current fill.
    pub fn dot(&mut self, size: Option<f64>, color: Option<&Color>) -> Result<()> {
        let size = finite("dot", "size", size.unwrap_or(defaults::DOT_SIZE))?;
        let mut dev = self.device.borrow_mut();
        let size = size * dev.line_scale();
        let surface = dev.surface()?;
        if let Some(color) = color {
            let style = color.to_string();
            surface.set_fill_style(&style);
            surface.set_stroke_style(&style);
        }
        surface.fill_rect(
            self.position.x() - size / 2.0,
            self.position.y() - size / 2.0,
            size,
            size,
        );
        if color.is_some() {
            surface.set_fill_style(&self.fill_color.to_string());
            surface.set_stroke_style(&self.pen_color.to_string());
        }
        Ok(())
    }

    pub fn write(&mut self, text: &str, font: Option<&str>) -> Result<()> {
        let mut dev = self.device.borrow_mut();
        let surface = dev.surface()?;
        if let Some(font) = font {
            surface.set_font(font);
        }
        // Flip back so the glyphs are upright.
        surface.scale(1.0, -1.0);
        surface.fill_text(text, self.position.x(), -self.position.y());
        surface.scale(1.0, -1.0);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Animation control
    // ------------------------------------------------------------------------

    /// Speed 0 draws instantly; 1..=10 animate, faster with larger values
    /// (wrapping past 10). `segment` sets the world units per animation step.
    pub fn speed(&mut self, speed: f64, segment: Option<f64>) -> Result<()> {
        let speed = finite("speed", "speed", speed)?;
        let segment = segment
            .filter(|t| *t != 0.0)
            .unwrap_or(defaults::SEGMENT_LENGTH);
        if !(segment.is_finite() && segment > 0.0) {
            return Err(TurtleError::invalid(
                "speed",
                format!("segment length must be positive, got {segment}"),
            ));
        }

        let mut dev = self.device.borrow_mut();
        if speed > 0.0 && !self.animate {
            self.animate = true;
            dev.set_speed_delay(speed)?;
        } else if speed == 0.0 {
            self.animate = false;
            dev.reset_render_count();
        } else {
            dev.set_speed_delay(speed)?;
        }
        dev.set_segment_length(segment)
    }

    /// Set the device delay (absolute value, milliseconds) and return the
    /// delay in effect.
    pub fn delay(&mut self, delay_ms: Option<f64>) -> Result<f64> {
        let mut dev = self.device.borrow_mut();
        if let Some(ms) = delay_ms {
            dev.set_delay_ms(finite("delay", "delay", ms)?.abs())?;
        }
        Ok(dev.delay().as_nanos() as f64 / 1_000_000.0)
    }

    /// Render throttle: pause on every `n`-th step; `0` turns animation off.
    pub fn tracer(&mut self, n: i64, delay_ms: Option<f64>) -> Result<()> {
        let mut dev = self.device.borrow_mut();
        if let Some(ms) = delay_ms {
            dev.set_delay_ms(ms)?;
        }
        dev.set_counter(n);
        if n == 0 {
            self.animate = false;
            dev.reset_render_count();
        }
        Ok(())
    }

    pub fn render_counter(&self) -> u32 {
        self.device.borrow().counter()
    }

    pub fn set_world_coordinates(&mut self, llx: f64, lly: f64, urx: f64, ury: f64) -> Result<()> {
        self.device
            .borrow_mut()
            .set_world_coordinates(llx, lly, urx, ury)?;
        self.refresh_icon()
    }

    // ------------------------------------------------------------------------
    // State queries
    // ------------------------------------------------------------------------

    fn angle_out(&self, degrees: f64) -> f64 {
        if self.degrees {
            degrees
        } else {
            degrees.to_radians()
        }
    }

    /// Heading in `[0, 360)` degrees, or radians when degrees are off.
    pub fn heading(&self) -> f64 {
        self.angle_out(self.heading.to_angle())
    }

    pub fn heading_vector(&self) -> Vector {
        self.heading
    }

    pub fn position(&self) -> (f64, f64) {
        (self.position.x(), self.position.y())
    }

    pub fn position_vector(&self) -> Vector {
        self.position
    }

    pub fn xcor(&self) -> f64 {
        self.position.x()
    }

    pub fn ycor(&self) -> f64 {
        self.position.y()
    }

    /// Angle from the turtle to `(x, y)`.
    pub fn towards(&self, x: f64, y: f64) -> Result<f64> {
        let to = Vector::xy(finite("towards", "x", x)?, finite("towards", "y", y)?);
        Ok(self.angle_out((to - self.position).normalize().to_angle()))
    }

    pub fn distance(&self, x: f64, y: f64) -> Result<f64> {
        let to = Vector::xy(finite("distance", "x", x)?, finite("distance", "y", y)?);
        Ok(self.position.distance(to))
    }

    // ------------------------------------------------------------------------
    // Pen and fill
    // ------------------------------------------------------------------------

    pub fn pen_up(&mut self) {
        self.pen_down = false;
    }

    pub fn pen_down(&mut self) {
        self.pen_down = true;
    }

    pub fn is_down(&self) -> bool {
        self.pen_down
    }

    /// Pen width in world units; scaled by the device line scale when drawn.
    pub fn width(&mut self, width: f64) -> Result<()> {
        let width = finite("width", "width", width)?;
        if width < 0.0 {
            return Err(TurtleError::invalid(
                "width",
                format!("pen width must not be negative, got {width}"),
            ));
        }
        self.pen_width = width;
        Ok(())
    }

    pub fn pen_width(&self) -> f64 {
        self.pen_width
    }

    pub fn pen_color(&self) -> &Color {
        &self.pen_color
    }

    pub fn set_pen_color(&mut self, color: Color) -> Result<()> {
        self.device
            .borrow_mut()
            .surface()?
            .set_stroke_style(&color.to_string());
        self.pen_color = color;
        Ok(())
    }

    pub fn fill_color(&self) -> &Color {
        &self.fill_color
    }

    pub fn set_fill_color(&mut self, color: Color) -> Result<()> {
        self.device
            .borrow_mut()
            .surface()?
            .set_fill_style(&color.to_string());
        self.fill_color = color;
        Ok(())
    }

    /// `(pen, fill)`
    pub fn color(&self) -> (&Color, &Color) {
        (&self.pen_color, &self.fill_color)
    }

    pub fn set_color(&mut self, color: Color) -> Result<()> {
        self.set_pen_color(color.clone())?;
        self.set_fill_color(color)
    }

    pub fn begin_fill(&mut self) -> Result<()> {
        let mut dev = self.device.borrow_mut();
        let surface = dev.surface()?;
        surface.begin_path();
        surface.move_to(self.position.x(), self.position.y());
        self.filling = true;
        Ok(())
    }

    pub fn end_fill(&mut self) -> Result<()> {
        let mut dev = self.device.borrow_mut();
        let surface = dev.surface()?;
        surface.stroke();
        surface.set_fill_style(&self.fill_color.to_string());
        surface.fill();
        surface.close_path();
        self.filling = false;
        Ok(())
    }

    /// `None` queries the fill state; `Some(true)`/`Some(false)` begin/end a fill.
    pub fn fill(&mut self, on: Option<bool>) -> Result<bool> {
        match on {
            Some(true) => self.begin_fill()?,
            Some(false) => self.end_fill()?,
            None => {}
        }
        Ok(self.filling)
    }

    pub fn is_filling(&self) -> bool {
        self.filling
    }

    // ------------------------------------------------------------------------
    // Appearance
    // ------------------------------------------------------------------------

    pub fn show_turtle(&mut self) -> Result<()> {
        self.visible = true;
        self.draw_icon(false)
    }

    pub fn hide_turtle(&mut self) -> Result<()> {
        self.visible = false;
        self.draw_icon(false)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn shape(&mut self, name: &str) -> Result<()> {
        self.shape = name.parse()?;
        self.refresh_icon()
    }

    pub fn current_shape(&self) -> Shape {
        self.shape
    }

    /// Paint the icon permanently onto the drawing surface.
    pub fn stamp(&mut self) -> Result<()> {
        self.draw_icon(true)
    }

    fn refresh_icon(&mut self) -> Result<()> {
        if self.visible {
            self.draw_icon(false)
        } else {
            Ok(())
        }
    }

    /// Render the icon at the current pose. Transient renders go to the
    /// overlay, which is cleared first; without an overlay they are skipped.
    fn draw_icon(&mut self, permanent: bool) -> Result<()> {
        let mut dev = self.device.borrow_mut();
        let world = dev.world();
        let point_scale = dev.point_scale();
        let surface = if permanent {
            dev.surface()?
        } else {
            match dev.overlay() {
                Some(overlay) => overlay,
                None => return Ok(()),
            }
        };

        if !permanent {
            surface.clear_rect(world.llx, world.lly, world.width(), world.height());
            if !self.visible {
                return Ok(());
            }
        }

        let points = self
            .shape
            .place(self.position, self.heading.to_angle(), point_scale);
        let Some((first, rest)) = points.split_first() else {
            return Ok(());
        };
        surface.set_fill_style(&self.fill_color.to_string());
        surface.set_stroke_style(&self.pen_color.to_string());
        surface.begin_path();
        surface.move_to(first.x(), first.y());
        for p in rest {
            surface.line_to(p.x(), p.y());
        }
        surface.close_path();
        surface.stroke();
        surface.fill();
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Clearing
    // ------------------------------------------------------------------------

    /// Erase the drawing and restore default pen and fill; the pose is kept.
    pub fn clear(&mut self) -> Result<()> {
        self.device.borrow_mut().clear()?;
        self.pen_color = Color::Named(defaults::PEN_COLOR.to_string());
        self.pen_width = defaults::PEN_WIDTH;
        self.fill_color = Color::Named(defaults::FILL_COLOR.to_string());
        Ok(())
    }

    /// Erase the drawing and return the turtle to its initial state.
    pub fn reset(&mut self) -> Result<()> {
        self.clear()?;
        self.pen_down = true;
        self.filling = false;
        self.visible = true;
        self.shape = Shape::default();
        self.animate = self.animate_by_default;
        self.home()
    }
}

impl Drop for Turtle {
    fn drop(&mut self) {
        if let Ok(mut device) = self.device.try_borrow_mut() {
            device.remove(self.id);
        }
    }
}

impl std::fmt::Debug for Turtle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Turtle")
            .field("id", &self.id)
            .field("position", &self.position)
            .field("heading", &self.heading)
            .field("pen_down", &self.pen_down)
            .field("filling", &self.filling)
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::render::animation::Immediate;
    use crate::render::device::CanvasDevice;
    use crate::surface::{DrawLog, DrawOp, RecordingSurface};

    fn turtle(animate: bool) -> (Turtle, DrawLog, DrawLog) {
        let main = RecordingSurface::new(400, 400);
        let overlay = RecordingSurface::new(400, 400);
        let (main_log, overlay_log) = (main.log(), overlay.log());
        let device = CanvasDevice::new(
            "t",
            Box::new(main),
            Some(Box::new(overlay)),
            Rc::new(Immediate),
            animate,
        )
        .into_handle();
        let config = TurtleConfig {
            animate,
            ..TurtleConfig::default()
        };
        let turtle = Turtle::new(device, &config).unwrap();
        main_log.clear();
        overlay_log.clear();
        (turtle, main_log, overlay_log)
    }

    fn near(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
    }

    #[tokio::test]
    async fn instant_line_is_one_stroke() {
        let (mut t, main, _) = turtle(false);
        t.forward(100.0).await.unwrap();
        assert_eq!(t.position(), (100.0, 0.0));
        assert_eq!(main.count(|op| *op == DrawOp::Stroke), 1);
        assert_eq!(main.line_ends(), vec![(100.0, 0.0)]);
    }

    #[tokio::test]
    async fn animated_line_is_segmented() {
        let (mut t, main, overlay) = turtle(true);
        t.forward(35.0).await.unwrap();
        assert_eq!(main.line_ends(), vec![(10.0, 0.0), (20.0, 0.0), (30.0, 0.0), (35.0, 0.0)]);
        // The icon follows every step.
        assert_eq!(overlay.count(|op| matches!(op, DrawOp::ClearRect { .. })), 4);
    }

    #[tokio::test]
    async fn set_position_never_draws() {
        let (mut t, main, _) = turtle(true);
        t.set_position(30.0, 40.0).await.unwrap();
        assert_eq!(t.position(), (30.0, 40.0));
        assert_eq!(main.count(|op| *op == DrawOp::Stroke), 0);
    }

    #[test]
    fn right_turns_clockwise() {
        let (mut t, _, _) = turtle(false);
        t.right(90.0).unwrap();
        assert_eq!(t.heading(), 270.0);
        t.left(180.0).unwrap();
        assert_eq!(t.heading(), 90.0);
    }

    #[tokio::test]
    async fn half_circle_moves_across() {
        let (mut t, _, _) = turtle(false);
        t.circle(50.0, Some(180.0)).await.unwrap();
        assert!(near(t.position(), (0.0, 100.0)));
        assert!((t.heading() - 180.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn pen_up_circle_moves_without_ink() {
        let (mut t, main, _) = turtle(false);
        t.pen_up();
        t.circle(10.0, Some(90.0)).await.unwrap();
        assert!(near(t.position(), (10.0, 10.0)));
        assert_eq!(main.count(|op| matches!(op, DrawOp::Arc { .. })), 0);
    }

    #[test]
    fn dot_restores_styles_after_override() {
        let (mut t, main, _) = turtle(false);
        t.dot(Some(4.0), Some(&Color::Named("red".into()))).unwrap();
        let ops = main.ops();
        assert_eq!(
            ops,
            vec![
                DrawOp::FillStyle("red".into()),
                DrawOp::StrokeStyle("red".into()),
                DrawOp::FillRect { x: -2.0, y: -2.0, width: 4.0, height: 4.0 },
                DrawOp::FillStyle("black".into()),
                DrawOp::StrokeStyle("black".into()),
            ]
        );
    }

    #[tokio::test]
    async fn filling_accumulates_one_path() {
        let (mut t, main, _) = turtle(false);
        t.begin_fill().unwrap();
        t.forward(10.0).await.unwrap();
        t.left(90.0).unwrap();
        t.forward(10.0).await.unwrap();
        t.end_fill().unwrap();
        assert_eq!(main.count(|op| *op == DrawOp::BeginPath), 1);
        assert_eq!(main.count(|op| *op == DrawOp::Fill), 1);
        assert!(!t.is_filling());
    }

    #[test]
    fn numeric_pen_color_is_hex() {
        let (mut t, main, _) = turtle(false);
        t.set_pen_color(Color::from_channels(255.0, 0.0, 0.0).unwrap())
            .unwrap();
        assert_eq!(t.pen_color().to_string(), "#ff0000");
        assert_eq!(main.ops(), vec![DrawOp::StrokeStyle("#ff0000".into())]);
    }

    #[test]
    fn zero_heading_vector_is_rejected() {
        let (mut t, _, _) = turtle(false);
        let before = t.heading_vector();
        let err = t.set_heading(Vector::ZERO).unwrap_err();
        assert!(matches!(err, TurtleError::DegenerateGeometry { .. }));
        assert_eq!(t.heading_vector(), before);
        t.set_heading(Vector::xy(0.0, -3.0)).unwrap();
        assert_eq!(t.heading(), 270.0);
    }

    #[test]
    fn unknown_shape_is_rejected() {
        let (mut t, _, _) = turtle(false);
        assert!(t.shape("dragon").is_err());
        assert_eq!(t.current_shape(), Shape::Arrow);
        t.shape("turtle").unwrap();
        assert_eq!(t.current_shape(), Shape::Turtle);
    }

    #[test]
    fn hiding_clears_the_overlay() {
        let (mut t, _, overlay) = turtle(false);
        t.hide_turtle().unwrap();
        assert_eq!(
            overlay.ops(),
            vec![DrawOp::ClearRect { x: -200.0, y: -200.0, width: 400.0, height: 400.0 }]
        );
        assert!(!t.is_visible());
    }

    #[test]
    fn speed_zero_stops_animation() {
        let (mut t, _, _) = turtle(true);
        t.speed(0.0, None).unwrap();
        assert!(!t.is_animated());
        t.speed(3.0, Some(5.0)).unwrap();
        assert!(t.is_animated());
        assert_eq!(t.device().borrow().segment_length(), 5.0);
        assert_eq!(t.delay(None).unwrap(), 40.0);
    }

    #[test]
    fn dropping_unregisters() {
        let (t, _, _) = turtle(false);
        let device = t.device().clone();
        assert!(device.borrow().is_animating());
        drop(t);
        assert!(!device.borrow().is_animating());
    }
}
