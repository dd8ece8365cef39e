//! Canvas device: one per drawing surface
//!
//! Owns the world-to-pixel mapping, the per-surface animation policy (delay,
//! segment length, render throttle) and the registry of turtles drawing on
//! the surface. Turtles share a device through [`DeviceHandle`].

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use glam::{DAffine2, DVec2};

use super::animation::Pacer;
use super::defaults;
use super::geometry::{WorldBox, WorldMapping, centered_transform};
use crate::errors::{Result, TurtleError};
use crate::log;
use crate::surface::Surface;
use crate::types::Color;

pub type DeviceHandle = Rc<RefCell<CanvasDevice>>;

/// Identity of a turtle within its device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TurtleId(pub(crate) u64);

impl std::fmt::Display for TurtleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "turtle#{}", self.0)
    }
}

pub struct CanvasDevice {
    id: String,
    main: Box<dyn Surface>,
    overlay: Option<Box<dyn Surface>>,
    pacer: Rc<dyn Pacer>,
    animate_by_default: bool,

    width: u32,
    height: u32,
    mapping: Option<WorldMapping>,
    world: WorldBox,
    transform: DAffine2,
    line_scale: f64,
    point_scale: DVec2,

    time_factor: f64,
    delay: Duration,
    segment_length: f64,
    counter: u32,
    render_count: u32,
    instant: bool,

    turtles: Vec<TurtleId>,
    next_turtle: u64,
    in_flight: usize,
    background: Option<Color>,
    closed: bool,
}

impl CanvasDevice {
    /// Wrap an opened surface (and optional icon overlay) as a device sized
    /// to the surface.
    pub fn new(
        id: impl Into<String>,
        main: Box<dyn Surface>,
        overlay: Option<Box<dyn Surface>>,
        pacer: Rc<dyn Pacer>,
        animate_by_default: bool,
    ) -> Self {
        let (width, height) = (main.width(), main.height());
        let mut device = Self {
            id: id.into(),
            main,
            overlay,
            pacer,
            animate_by_default,
            width,
            height,
            mapping: None,
            world: WorldBox::centered(width, height),
            transform: DAffine2::IDENTITY,
            line_scale: 1.0,
            point_scale: DVec2::ONE,
            time_factor: defaults::TIME_FACTOR,
            delay: Duration::ZERO,
            segment_length: defaults::SEGMENT_LENGTH,
            counter: defaults::RENDER_COUNTER,
            render_count: 0,
            instant: false,
            turtles: Vec::new(),
            next_turtle: 0,
            in_flight: 0,
            background: None,
            closed: false,
        };
        device.configure();
        log::debug!(id = %device.id, width, height, "canvas device created");
        device
    }

    pub fn into_handle(self) -> DeviceHandle {
        Rc::new(RefCell::new(self))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Reset scales, world box, throttle and delay, and re-center the origin.
    fn configure(&mut self) {
        self.mapping = None;
        self.world = WorldBox::centered(self.width, self.height);
        self.line_scale = 1.0;
        self.point_scale = DVec2::ONE;
        self.time_factor = defaults::TIME_FACTOR;
        self.counter = defaults::RENDER_COUNTER;
        self.render_count = 0;
        self.delay = if self.animate_by_default {
            defaults::ANIMATED_DELAY
        } else {
            Duration::ZERO
        };
        self.transform = centered_transform(self.width, self.height);

        let (w, h) = (f64::from(self.width), f64::from(self.height));
        for surface in self.surfaces() {
            surface.reset_transform();
            surface.translate(w / 2.0, h / 2.0);
            surface.scale(1.0, -1.0);
            surface.clear_rect(-w / 2.0, -h / 2.0, w, h);
        }
    }

    fn surfaces(&mut self) -> impl Iterator<Item = &mut Box<dyn Surface>> {
        std::iter::once(&mut self.main).chain(self.overlay.as_mut())
    }

    /// Resize the surface and reset the device to its initial mapping.
    pub fn setup(&mut self, width: u32, height: u32) -> Result<()> {
        self.ensure_open()?;
        if width == 0 || height == 0 {
            return Err(TurtleError::invalid(
                "setup",
                format!("surface size {width}x{height} has no area"),
            ));
        }
        self.width = width;
        self.height = height;
        for surface in self.surfaces() {
            surface.resize(width, height);
        }
        self.configure();
        log::debug!(id = %self.id, width, height, "device setup");
        Ok(())
    }

    /// Remap world units so `(llx, lly)`-`(urx, ury)` covers the surface.
    ///
    /// Must not be called while a motion on this device is running.
    pub fn set_world_coordinates(&mut self, llx: f64, lly: f64, urx: f64, ury: f64) -> Result<()> {
        self.ensure_open()?;
        if self.in_flight > 0 {
            return Err(TurtleError::MotionInFlight {
                id: self.id.clone(),
            });
        }
        let mapping = WorldMapping::new(WorldBox::new(llx, lly, urx, ury), self.width, self.height)?;
        for surface in self.surfaces() {
            surface.reset_transform();
            surface.scale(mapping.scale.x, mapping.scale.y);
            surface.translate(mapping.translate.x, mapping.translate.y);
        }
        self.world = mapping.world;
        self.point_scale = mapping.point_scale;
        self.line_scale = mapping.line_scale;
        self.transform = mapping.transform();
        self.mapping = Some(mapping);
        log::debug!(id = %self.id, llx, lly, urx, ury, "world coordinates remapped");
        Ok(())
    }

    pub fn world(&self) -> WorldBox {
        self.world
    }

    pub fn mapping(&self) -> Option<&WorldMapping> {
        self.mapping.as_ref()
    }

    /// Where a world point lands on the surface, in pixels from the top-left.
    pub fn world_to_pixel(&self, x: f64, y: f64) -> DVec2 {
        self.transform.transform_point2(DVec2::new(x, y))
    }

    pub fn line_scale(&self) -> f64 {
        self.line_scale
    }

    pub fn point_scale(&self) -> (f64, f64) {
        (self.point_scale.x, self.point_scale.y)
    }

    pub fn window_width(&self) -> u32 {
        self.width
    }

    pub fn window_height(&self) -> u32 {
        self.height
    }

    pub fn bgcolor(&mut self, color: Color) -> Result<()> {
        self.ensure_open()?;
        self.main.set_background(&color.to_string());
        self.background = Some(color);
        Ok(())
    }

    pub fn background(&self) -> Option<&Color> {
        self.background.as_ref()
    }

    // ------------------------------------------------------------------------
    // Animation policy
    // ------------------------------------------------------------------------

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Delay in (possibly fractional) milliseconds.
    pub fn set_delay_ms(&mut self, ms: f64) -> Result<()> {
        self.delay = millis("delay", ms)?;
        Ok(())
    }

    /// `delay = (10 - s mod 11 + 1) * time_factor` milliseconds. Speeds past
    /// 10 wrap around.
    pub fn set_speed_delay(&mut self, speed: f64) -> Result<()> {
        let speed = TurtleError::check_finite("speed", "speed", speed)?;
        let factor = 10.0 - speed % 11.0 + 1.0;
        self.delay = millis("speed", factor * self.time_factor)?;
        Ok(())
    }

    pub fn time_factor(&self) -> f64 {
        self.time_factor
    }

    pub fn segment_length(&self) -> f64 {
        self.segment_length
    }

    pub fn set_segment_length(&mut self, length: f64) -> Result<()> {
        let length = TurtleError::check_finite("speed", "segment length", length)?;
        if length <= 0.0 {
            return Err(TurtleError::invalid(
                "speed",
                format!("segment length must be positive, got {length}"),
            ));
        }
        self.segment_length = length;
        Ok(())
    }

    /// Render throttle: pause on every `n`-th queued step. Clamped to at least 1.
    pub fn set_counter(&mut self, n: i64) {
        self.counter = u32::try_from(n.max(1)).unwrap_or(u32::MAX);
        log::debug!(id = %self.id, counter = self.counter, "render throttle changed");
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn reset_render_count(&mut self) {
        self.render_count = 0;
    }

    pub fn increment_render_count(&mut self) -> u32 {
        self.render_count = self.render_count.saturating_add(1);
        self.render_count
    }

    pub fn render_count(&self) -> u32 {
        self.render_count
    }

    /// Screen-wide tracer: set the throttle, and with `n == 0` draw every
    /// turtle on this device without animation.
    pub fn tracer(&mut self, n: i64, delay_ms: Option<f64>) -> Result<()> {
        if let Some(ms) = delay_ms {
            self.set_delay_ms(ms)?;
        }
        self.set_counter(n);
        self.instant = n == 0;
        if self.instant {
            self.reset_render_count();
        }
        Ok(())
    }

    /// Whether the device forces motions to complete without animation.
    pub fn is_instant(&self) -> bool {
        self.instant
    }

    pub fn pacer(&self) -> Rc<dyn Pacer> {
        self.pacer.clone()
    }

    // ------------------------------------------------------------------------
    // Turtle registry
    // ------------------------------------------------------------------------

    pub(crate) fn register_turtle(&mut self) -> TurtleId {
        let id = TurtleId(self.next_turtle);
        self.next_turtle += 1;
        self.add_to_canvas(id);
        id
    }

    pub fn add_to_canvas(&mut self, turtle: TurtleId) {
        if !self.on_canvas(turtle) {
            self.turtles.push(turtle);
        }
    }

    pub fn on_canvas(&self, turtle: TurtleId) -> bool {
        self.turtles.contains(&turtle)
    }

    pub fn remove(&mut self, turtle: TurtleId) {
        self.turtles.retain(|t| *t != turtle);
    }

    /// True while any turtle is attached to this device.
    pub fn is_animating(&self) -> bool {
        !self.turtles.is_empty()
    }

    pub fn turtles(&self) -> &[TurtleId] {
        &self.turtles
    }

    pub fn motions_in_flight(&self) -> usize {
        self.in_flight
    }

    pub(crate) fn begin_motion(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.in_flight += 1;
        Ok(())
    }

    pub(crate) fn end_motion(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    // ------------------------------------------------------------------------
    // Surfaces
    // ------------------------------------------------------------------------

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(TurtleError::SurfaceUnavailable {
                id: self.id.clone(),
            })
        } else {
            Ok(())
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// The persistent drawing surface.
    pub fn surface(&mut self) -> Result<&mut dyn Surface> {
        self.ensure_open()?;
        Ok(self.main.as_mut())
    }

    /// The icon overlay, if the host provided one and the device is open.
    pub fn overlay(&mut self) -> Option<&mut dyn Surface> {
        if self.closed {
            return None;
        }
        match self.overlay.as_mut() {
            Some(overlay) => Some(overlay.as_mut()),
            None => None,
        }
    }

    /// Erase everything drawn on the surface and its overlay.
    pub fn clear(&mut self) -> Result<()> {
        self.ensure_open()?;
        let (w, h) = (f64::from(self.width), f64::from(self.height));
        for surface in self.surfaces() {
            surface.save();
            surface.reset_transform();
            surface.clear_rect(0.0, 0.0, w, h);
            surface.restore();
        }
        Ok(())
    }

    /// Tear the device down: every later drawing call on it fails with
    /// `SurfaceUnavailable`.
    pub(crate) fn close(&mut self, hide: bool) {
        if hide {
            for surface in self.surfaces() {
                surface.set_visible(false);
            }
        }
        self.closed = true;
        log::debug!(id = %self.id, hide, "canvas device closed");
    }
}

fn millis(operation: &'static str, ms: f64) -> Result<Duration> {
    let ms = TurtleError::check_finite(operation, "delay", ms)?;
    if ms < 0.0 {
        return Err(TurtleError::invalid(
            operation,
            format!("delay must not be negative, got {ms}ms"),
        ));
    }
    Ok(Duration::from_nanos((ms * 1_000_000.0).round() as u64))
}
