//! tiny-skia backed surface.
//!
//! Paths are flattened to device-space polylines as they are built, so the
//! transform in effect at each `move_to`/`line_to`/`arc` call is the one that
//! applies, as on a canvas. Text is recorded but not rasterized.

use std::cell::RefCell;
use std::collections::HashMap;
use std::f64::consts::TAU;
use std::rc::Rc;

use glam::{DAffine2, DVec2};
use tiny_skia::{
    BlendMode, Color as SkColor, FillRule, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke,
    Transform,
};

use super::{LineCap, LineJoin, Surface, SurfaceHost};
use crate::log;
use crate::types::Color;

/// Angular step used to flatten arcs.
const ARC_STEP: f64 = std::f64::consts::PI / 64.0;

#[derive(Debug, Clone, Default)]
struct Subpath {
    points: Vec<DVec2>,
    closed: bool,
}

#[derive(Debug, Clone, Copy)]
struct State {
    transform: DAffine2,
    stroke: SkColor,
    fill: SkColor,
    line_width: f64,
    line_cap: LineCap,
    line_join: LineJoin,
}

impl Default for State {
    fn default() -> Self {
        Self {
            transform: DAffine2::IDENTITY,
            stroke: SkColor::BLACK,
            fill: SkColor::BLACK,
            line_width: 1.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
        }
    }
}

/// A pixel surface rendered with tiny-skia.
pub struct RasterSurface {
    pixmap: Pixmap,
    state: State,
    stack: Vec<State>,
    path: Vec<Subpath>,
    background: Option<SkColor>,
    visible: bool,
    texts: Vec<(String, DVec2)>,
}

impl RasterSurface {
    /// `None` when either dimension is zero.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        Some(Self {
            pixmap: Pixmap::new(width, height)?,
            state: State::default(),
            stack: Vec::new(),
            path: Vec::new(),
            background: None,
            visible: true,
            texts: Vec::new(),
        })
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Unpremultiplied RGBA at a device pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }

    /// Text drawn so far, with device-space anchors.
    pub fn texts(&self) -> impl Iterator<Item = (&str, f64, f64)> {
        self.texts.iter().map(|(t, p)| (t.as_str(), p.x, p.y))
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// PNG bytes, composited over the background color if one was set.
    pub fn encode_png(&self) -> Option<Vec<u8>> {
        match self.background {
            Some(bg) => {
                let mut out = Pixmap::new(self.pixmap.width(), self.pixmap.height())?;
                out.fill(bg);
                out.draw_pixmap(
                    0,
                    0,
                    self.pixmap.as_ref(),
                    &PixmapPaint::default(),
                    Transform::identity(),
                    None,
                );
                out.encode_png().ok()
            }
            None => self.pixmap.encode_png().ok(),
        }
    }

    fn to_device(&self, x: f64, y: f64) -> DVec2 {
        self.state.transform.transform_point2(DVec2::new(x, y))
    }

    fn push_point(&mut self, p: DVec2) {
        match self.path.last_mut() {
            Some(sub) if !sub.closed => sub.points.push(p),
            _ => self.path.push(Subpath {
                points: vec![p],
                closed: false,
            }),
        }
    }

    fn build_path(&self) -> Option<tiny_skia::Path> {
        let mut pb = PathBuilder::new();
        for sub in &self.path {
            let Some((first, rest)) = sub.points.split_first() else {
                continue;
            };
            pb.move_to(first.x as f32, first.y as f32);
            for p in rest {
                pb.line_to(p.x as f32, p.y as f32);
            }
            if sub.closed {
                pb.close();
            }
        }
        pb.finish()
    }

    fn polygon(&self, x: f64, y: f64, w: f64, h: f64) -> Option<tiny_skia::Path> {
        let corners = [
            self.to_device(x, y),
            self.to_device(x + w, y),
            self.to_device(x + w, y + h),
            self.to_device(x, y + h),
        ];
        let mut pb = PathBuilder::new();
        pb.move_to(corners[0].x as f32, corners[0].y as f32);
        for c in &corners[1..] {
            pb.line_to(c.x as f32, c.y as f32);
        }
        pb.close();
        pb.finish()
    }

    fn paint(color: SkColor) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color(color);
        paint.anti_alias = true;
        paint
    }

    fn device_line_width(&self) -> f32 {
        let det = self.state.transform.matrix2.determinant().abs();
        (self.state.line_width * det.sqrt()) as f32
    }

    fn parse_style(style: &str) -> Option<SkColor> {
        let parsed = style.parse::<Color>().ok().and_then(|c| c.to_rgb());
        if parsed.is_none() {
            log::warn!(style, "unrecognized color style, keeping previous");
        }
        parsed.map(|(r, g, b)| SkColor::from_rgba8(r, g, b, 255))
    }
}

impl Surface for RasterSurface {
    fn width(&self) -> u32 {
        self.pixmap.width()
    }

    fn height(&self) -> u32 {
        self.pixmap.height()
    }

    fn resize(&mut self, width: u32, height: u32) {
        match Pixmap::new(width, height) {
            Some(pixmap) => {
                self.pixmap = pixmap;
                self.state.transform = DAffine2::IDENTITY;
                self.stack.clear();
                self.path.clear();
            }
            None => {
                log::warn!(width, height, "ignoring resize to an empty pixmap");
            }
        }
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        let p = self.to_device(x, y);
        self.path.push(Subpath {
            points: vec![p],
            closed: false,
        });
    }

    fn line_to(&mut self, x: f64, y: f64) {
        let p = self.to_device(x, y);
        self.push_point(p);
    }

    fn close_path(&mut self) {
        let Some(sub) = self.path.last_mut() else {
            return;
        };
        if sub.closed {
            return;
        }
        sub.closed = true;
        if let Some(&first) = sub.points.first() {
            self.path.push(Subpath {
                points: vec![first],
                closed: false,
            });
        }
    }

    fn stroke(&mut self) {
        let Some(path) = self.build_path() else {
            return;
        };
        let stroke = Stroke {
            width: self.device_line_width(),
            line_cap: match self.state.line_cap {
                LineCap::Butt => tiny_skia::LineCap::Butt,
                LineCap::Round => tiny_skia::LineCap::Round,
                LineCap::Square => tiny_skia::LineCap::Square,
            },
            line_join: match self.state.line_join {
                LineJoin::Miter => tiny_skia::LineJoin::Miter,
                LineJoin::Round => tiny_skia::LineJoin::Round,
                LineJoin::Bevel => tiny_skia::LineJoin::Bevel,
            },
            ..Stroke::default()
        };
        let paint = Self::paint(self.state.stroke);
        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    fn fill(&mut self) {
        let Some(path) = self.build_path() else {
            return;
        };
        let paint = Self::paint(self.state.fill);
        self.pixmap
            .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }

    fn arc(&mut self, cx: f64, cy: f64, radius: f64, start: f64, end: f64, ccw: bool) {
        let sweep = if !ccw {
            if end - start >= TAU {
                TAU
            } else {
                (end - start).rem_euclid(TAU)
            }
        } else if start - end >= TAU {
            -TAU
        } else {
            -(start - end).rem_euclid(TAU)
        };
        let steps = (sweep.abs() / ARC_STEP).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let theta = start + sweep * i as f64 / steps as f64;
            let p = self.to_device(cx + radius * theta.cos(), cy + radius * theta.sin());
            self.push_point(p);
        }
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        if let Some(rect) = self.polygon(x, y, width, height) {
            let paint = Self::paint(self.state.fill);
            self.pixmap
                .fill_path(&rect, &paint, FillRule::Winding, Transform::identity(), None);
        }
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        if let Some(rect) = self.polygon(x, y, width, height) {
            let mut paint = Self::paint(SkColor::TRANSPARENT);
            paint.blend_mode = BlendMode::Clear;
            paint.anti_alias = false;
            self.pixmap
                .fill_path(&rect, &paint, FillRule::Winding, Transform::identity(), None);
        }
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        let anchor = self.to_device(x, y);
        self.texts.push((text.to_string(), anchor));
    }

    fn set_stroke_style(&mut self, style: &str) {
        if let Some(c) = Self::parse_style(style) {
            self.state.stroke = c;
        }
    }

    fn set_fill_style(&mut self, style: &str) {
        if let Some(c) = Self::parse_style(style) {
            self.state.fill = c;
        }
    }

    fn set_line_width(&mut self, width: f64) {
        if width.is_finite() && width > 0.0 {
            self.state.line_width = width;
        }
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.state.line_cap = cap;
    }

    fn set_line_join(&mut self, join: LineJoin) {
        self.state.line_join = join;
    }

    fn set_font(&mut self, _font: &str) {}

    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn reset_transform(&mut self) {
        self.state.transform = DAffine2::IDENTITY;
    }

    fn translate(&mut self, tx: f64, ty: f64) {
        self.state.transform = self.state.transform * DAffine2::from_translation(DVec2::new(tx, ty));
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.state.transform = self.state.transform * DAffine2::from_scale(DVec2::new(sx, sy));
    }

    fn set_background(&mut self, color: &str) {
        if let Some(c) = Self::parse_style(color) {
            self.background = Some(c);
        }
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

/// Hands out raster surfaces and keeps a handle to each so the caller can
/// read the pixels back once drawing is done.
pub struct RasterHost {
    width: u32,
    height: u32,
    surfaces: HashMap<String, Rc<RefCell<RasterSurface>>>,
}

impl RasterHost {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            surfaces: HashMap::new(),
        }
    }

    /// The surface for `id`, creating it on first use.
    pub fn surface(&mut self, id: &str) -> Option<Rc<RefCell<RasterSurface>>> {
        if let Some(s) = self.surfaces.get(id) {
            return Some(s.clone());
        }
        let surface = Rc::new(RefCell::new(RasterSurface::new(self.width, self.height)?));
        self.surfaces.insert(id.to_string(), surface.clone());
        Some(surface)
    }
}

impl SurfaceHost for RasterHost {
    fn open(&mut self, id: &str) -> Option<Box<dyn Surface>> {
        let surface = self.surface(id)?;
        Some(Box::new(surface))
    }
}
