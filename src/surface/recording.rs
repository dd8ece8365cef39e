//! Headless surface that records every call.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use super::{LineCap, LineJoin, Surface, SurfaceHost};

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    BeginPath,
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    ClosePath,
    Stroke,
    Fill,
    Arc {
        cx: f64,
        cy: f64,
        radius: f64,
        start: f64,
        end: f64,
        counter_clockwise: bool,
    },
    FillRect { x: f64, y: f64, width: f64, height: f64 },
    ClearRect { x: f64, y: f64, width: f64, height: f64 },
    FillText { text: String, x: f64, y: f64 },
    StrokeStyle(String),
    FillStyle(String),
    LineWidth(f64),
    LineCap(LineCap),
    LineJoin(LineJoin),
    Font(String),
    Save,
    Restore,
    ResetTransform,
    Translate { x: f64, y: f64 },
    Scale { x: f64, y: f64 },
    Resize { width: u32, height: u32 },
    Background(String),
    Visible(bool),
}

impl DrawOp {
    /// Ops that put ink on the surface.
    pub fn is_paint(&self) -> bool {
        matches!(
            self,
            DrawOp::Stroke | DrawOp::Fill | DrawOp::FillRect { .. } | DrawOp::FillText { .. }
        )
    }
}

impl fmt::Display for DrawOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawOp::BeginPath => write!(f, "begin_path"),
            DrawOp::MoveTo { x, y } => write!(f, "move_to {} {}", x, y),
            DrawOp::LineTo { x, y } => write!(f, "line_to {} {}", x, y),
            DrawOp::ClosePath => write!(f, "close_path"),
            DrawOp::Stroke => write!(f, "stroke"),
            DrawOp::Fill => write!(f, "fill"),
            DrawOp::Arc {
                cx,
                cy,
                radius,
                start,
                end,
                counter_clockwise,
            } => write!(
                f,
                "arc {:.3} {:.3} r={:.3} {:.4}..{:.4}{}",
                cx,
                cy,
                radius,
                start,
                end,
                if *counter_clockwise { " ccw" } else { "" }
            ),
            DrawOp::FillRect { x, y, width, height } => {
                write!(f, "fill_rect {} {} {} {}", x, y, width, height)
            }
            DrawOp::ClearRect { x, y, width, height } => {
                write!(f, "clear_rect {} {} {} {}", x, y, width, height)
            }
            DrawOp::FillText { text, x, y } => write!(f, "fill_text {:?} {} {}", text, x, y),
            DrawOp::StrokeStyle(s) => write!(f, "stroke_style {}", s),
            DrawOp::FillStyle(s) => write!(f, "fill_style {}", s),
            DrawOp::LineWidth(w) => write!(f, "line_width {}", w),
            DrawOp::LineCap(c) => write!(f, "line_cap {}", c),
            DrawOp::LineJoin(j) => write!(f, "line_join {}", j),
            DrawOp::Font(s) => write!(f, "font {}", s),
            DrawOp::Save => write!(f, "save"),
            DrawOp::Restore => write!(f, "restore"),
            DrawOp::ResetTransform => write!(f, "reset_transform"),
            DrawOp::Translate { x, y } => write!(f, "translate {} {}", x, y),
            DrawOp::Scale { x, y } => write!(f, "scale {} {}", x, y),
            DrawOp::Resize { width, height } => write!(f, "resize {} {}", width, height),
            DrawOp::Background(s) => write!(f, "background {}", s),
            DrawOp::Visible(v) => write!(f, "visible {}", v),
        }
    }
}

/// Shared handle to a recorded op list. Clones see the same log.
#[derive(Debug, Clone, Default)]
pub struct DrawLog(Rc<RefCell<Vec<DrawOp>>>);

impl DrawLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, op: DrawOp) {
        self.0.borrow_mut().push(op);
    }

    /// Snapshot of everything recorded so far.
    pub fn ops(&self) -> Vec<DrawOp> {
        self.0.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Number of recorded ops matching `pred`.
    pub fn count(&self, pred: impl Fn(&DrawOp) -> bool) -> usize {
        self.0.borrow().iter().filter(|op| pred(op)).count()
    }

    /// End points of every `line_to`, in order.
    pub fn line_ends(&self) -> Vec<(f64, f64)> {
        self.0
            .borrow()
            .iter()
            .filter_map(|op| match op {
                DrawOp::LineTo { x, y } => Some((*x, *y)),
                _ => None,
            })
            .collect()
    }
}

impl fmt::Display for DrawLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for op in self.0.borrow().iter() {
            writeln!(f, "{}", op)?;
        }
        Ok(())
    }
}

/// A surface that paints nothing and remembers every call.
#[derive(Debug)]
pub struct RecordingSurface {
    log: DrawLog,
    width: u32,
    height: u32,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_log(width, height, DrawLog::new())
    }

    pub fn with_log(width: u32, height: u32, log: DrawLog) -> Self {
        Self { log, width, height }
    }

    pub fn log(&self) -> DrawLog {
        self.log.clone()
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.log.push(DrawOp::Resize { width, height });
    }

    fn begin_path(&mut self) {
        self.log.push(DrawOp::BeginPath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.log.push(DrawOp::MoveTo { x, y });
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.log.push(DrawOp::LineTo { x, y });
    }

    fn close_path(&mut self) {
        self.log.push(DrawOp::ClosePath);
    }

    fn stroke(&mut self) {
        self.log.push(DrawOp::Stroke);
    }

    fn fill(&mut self) {
        self.log.push(DrawOp::Fill);
    }

    fn arc(&mut self, cx: f64, cy: f64, radius: f64, start: f64, end: f64, counter_clockwise: bool) {
        self.log.push(DrawOp::Arc {
            cx,
            cy,
            radius,
            start,
            end,
            counter_clockwise,
        });
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.log.push(DrawOp::FillRect { x, y, width, height });
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.log.push(DrawOp::ClearRect { x, y, width, height });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        self.log.push(DrawOp::FillText {
            text: text.to_string(),
            x,
            y,
        });
    }

    fn set_stroke_style(&mut self, style: &str) {
        self.log.push(DrawOp::StrokeStyle(style.to_string()));
    }

    fn set_fill_style(&mut self, style: &str) {
        self.log.push(DrawOp::FillStyle(style.to_string()));
    }

    fn set_line_width(&mut self, width: f64) {
        self.log.push(DrawOp::LineWidth(width));
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.log.push(DrawOp::LineCap(cap));
    }

    fn set_line_join(&mut self, join: LineJoin) {
        self.log.push(DrawOp::LineJoin(join));
    }

    fn set_font(&mut self, font: &str) {
        self.log.push(DrawOp::Font(font.to_string()));
    }

    fn save(&mut self) {
        self.log.push(DrawOp::Save);
    }

    fn restore(&mut self) {
        self.log.push(DrawOp::Restore);
    }

    fn reset_transform(&mut self) {
        self.log.push(DrawOp::ResetTransform);
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.log.push(DrawOp::Translate { x, y });
    }

    fn scale(&mut self, x: f64, y: f64) {
        self.log.push(DrawOp::Scale { x, y });
    }

    fn set_background(&mut self, color: &str) {
        self.log.push(DrawOp::Background(color.to_string()));
    }

    fn set_visible(&mut self, visible: bool) {
        self.log.push(DrawOp::Visible(visible));
    }
}

/// Hands out recording surfaces of a fixed size.
///
/// Logs can be fetched before the host is given away, so a test keeps a view
/// of what the engine drew on each surface and its overlay.
#[derive(Debug)]
pub struct RecordingHost {
    width: u32,
    height: u32,
    logs: HashMap<String, (DrawLog, DrawLog)>,
    allowed: Option<HashSet<String>>,
}

impl RecordingHost {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            logs: HashMap::new(),
            allowed: None,
        }
    }

    /// Restrict the host to the given identifiers; others are unavailable.
    pub fn only<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    /// `(main, overlay)` logs for `id`.
    pub fn logs(&mut self, id: &str) -> (DrawLog, DrawLog) {
        self.logs.entry(id.to_string()).or_default().clone()
    }

    fn available(&self, id: &str) -> bool {
        self.allowed.as_ref().is_none_or(|ids| ids.contains(id))
    }
}

impl SurfaceHost for RecordingHost {
    fn open(&mut self, id: &str) -> Option<Box<dyn Surface>> {
        if !self.available(id) {
            return None;
        }
        let (main, _) = self.logs(id);
        Some(Box::new(RecordingSurface::with_log(self.width, self.height, main)))
    }

    fn open_overlay(&mut self, id: &str) -> Option<Box<dyn Surface>> {
        if !self.available(id) {
            return None;
        }
        let (_, overlay) = self.logs(id);
        Some(Box::new(RecordingSurface::with_log(self.width, self.height, overlay)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_one_log() {
        let log = DrawLog::new();
        let mut surface = RecordingSurface::with_log(10, 10, log.clone());
        surface.begin_path();
        surface.move_to(1.0, 2.0);
        surface.line_to(3.0, 4.5);
        assert_eq!(log.len(), 3);
        assert_eq!(log.line_ends(), vec![(3.0, 4.5)]);
        assert_eq!(log.to_string(), "begin_path\nmove_to 1 2\nline_to 3 4.5\n");
    }

    #[test]
    fn host_respects_allow_list() {
        let mut host = RecordingHost::new(100, 50).only(["main"]);
        assert!(host.open("main").is_some());
        assert!(host.open("other").is_none());
        assert!(host.open_overlay("other").is_none());
    }

    #[test]
    fn host_logs_are_shared_with_opened_surfaces() {
        let mut host = RecordingHost::new(100, 50);
        let (main, overlay) = host.logs("c");
        let mut surface = host.open("c").unwrap();
        let mut over = host.open_overlay("c").unwrap();
        surface.stroke();
        over.fill();
        assert_eq!(main.ops(), vec![DrawOp::Stroke]);
        assert_eq!(overlay.ops(), vec![DrawOp::Fill]);
        assert_eq!(surface.width(), 100);
    }
}
