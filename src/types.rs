//! Value types shared by every layer: the 3-component [`Vector`] and [`Color`].
//!
//! `Vector` is a thin immutable wrapper over `glam::DVec3`: every operation
//! returns a new value. Positions are stored as-is; headings and normals are
//! kept at unit length by the turtle.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use glam::{DVec2, DVec3};

use crate::errors::TurtleError;

/// Components below this magnitude are snapped to zero by [`Vector::to_angle`].
pub const ANGLE_SNAP_EPSILON: f64 = 1e-5;

/// A real triple used for positions, headings and normals.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Vector(DVec3);

impl Vector {
    pub const ZERO: Vector = Vector(DVec3::ZERO);
    /// Canonical home heading: along +x.
    pub const X: Vector = Vector(DVec3::X);
    /// Canonical home normal: along -z.
    pub const NEG_Z: Vector = Vector(DVec3::NEG_Z);

    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Vector(DVec3::new(x, y, z))
    }

    /// A point in the drawing plane.
    #[inline]
    pub const fn xy(x: f64, y: f64) -> Self {
        Vector(DVec3::new(x, y, 0.0))
    }

    /// Unit direction `(cos φ, sin φ, 0)` for an angle in degrees.
    pub fn from_angle(phi_degrees: f64) -> Self {
        let (s, c) = phi_degrees.to_radians().sin_cos();
        Vector::new(c, s, 0.0).normalize()
    }

    #[inline]
    pub fn x(self) -> f64 {
        self.0.x
    }

    #[inline]
    pub fn y(self) -> f64 {
        self.0.y
    }

    #[inline]
    pub fn z(self) -> f64 {
        self.0.z
    }

    /// Drop z for 2D consumers (surfaces, the pixel map).
    #[inline]
    pub fn truncate(self) -> DVec2 {
        self.0.truncate()
    }

    /// Anisotropic plane scale for the device point-scale. z becomes 1 as a
    /// scratch marker; it carries no geometric meaning.
    pub fn scale(self, sx: f64, sy: f64) -> Self {
        Vector::new(self.0.x * sx, self.0.y * sy, 1.0)
    }

    /// `a * self + b * v`.
    pub fn linear(self, a: f64, b: f64, v: Vector) -> Self {
        Vector(self.0 * a + v.0 * b)
    }

    pub fn cross(self, v: Vector) -> Self {
        Vector(self.0.cross(v.0))
    }

    /// Counter-clockwise rotation about z by `angle_degrees`, built from the
    /// perpendicular `(-y, x, 0)`. z is dropped.
    pub fn rotate(self, angle_degrees: f64) -> Self {
        let perp = DVec2::new(-self.0.y, self.0.x);
        let (s, c) = angle_degrees.to_radians().sin_cos();
        Vector::new(
            self.0.x * c + perp.x * s,
            self.0.y * c + perp.y * s,
            0.0,
        )
    }

    /// `cos(α) * self + sin(α) * other`: rotation of `self` towards `other`
    /// in the plane they span. Both are expected to be orthonormal.
    pub fn rotate_normal(self, other: Vector, alpha_radians: f64) -> Self {
        let (s, c) = alpha_radians.sin_cos();
        self.linear(c, s, other)
    }

    pub fn len(self) -> f64 {
        self.0.length()
    }

    /// Component-wise division; `None` for a zero divisor.
    pub fn checked_div(self, n: f64) -> Option<Self> {
        if n == 0.0 {
            None
        } else {
            Some(Vector(self.0 / n))
        }
    }

    /// Unit vector in the same direction. The zero vector normalizes to the
    /// zero vector instead of NaN; use [`Vector::try_normalize`] to reject it.
    pub fn normalize(self) -> Self {
        self.checked_div(self.len()).unwrap_or(Vector::ZERO)
    }

    pub fn try_normalize(self, operation: &'static str) -> Result<Self, TurtleError> {
        self.checked_div(self.len())
            .filter(|v| v.0.is_finite())
            .ok_or_else(|| TurtleError::degenerate(operation, "cannot normalize a zero-length vector"))
    }

    /// Direction as an angle in `[0, 360)` degrees.
    ///
    /// Components within [`ANGLE_SNAP_EPSILON`] of zero count as exactly zero
    /// so axis-aligned headings do not flicker between 0 and 360 (or 180 and
    /// 180 ± ε). The zero vector reports 0.
    pub fn to_angle(self) -> f64 {
        let snap = |v: f64| if v.abs() < ANGLE_SNAP_EPSILON { 0.0 } else { v };
        let x = snap(self.0.x);
        let y = snap(self.0.y);
        if x == 0.0 && y == 0.0 {
            return 0.0;
        }

        let deg = (y.abs() / x.abs()).atan().to_degrees();
        if x < 0.0 && y > 0.0 {
            180.0 - deg
        } else if x < 0.0 && y <= 0.0 {
            180.0 + deg
        } else if x >= 0.0 && y < 0.0 {
            360.0 - deg
        } else {
            deg
        }
    }

    pub fn distance(self, other: Vector) -> f64 {
        (self - other).len()
    }
}

impl From<DVec3> for Vector {
    fn from(v: DVec3) -> Self {
        Vector(v)
    }
}

impl From<Vector> for DVec3 {
    fn from(v: Vector) -> Self {
        v.0
    }
}

/// Build a vector from a caller-supplied slice: two components (z = 0) or three.
impl TryFrom<&[f64]> for Vector {
    type Error = TurtleError;

    fn try_from(components: &[f64]) -> Result<Self, Self::Error> {
        match *components {
            [x, y] => Ok(Vector::xy(x, y)),
            [x, y, z] => Ok(Vector::new(x, y, z)),
            _ => Err(TurtleError::invalid(
                "vector",
                format!("expected 2 or 3 components, got {}", components.len()),
            )),
        }
    }
}

impl Add for Vector {
    type Output = Vector;
    fn add(self, rhs: Vector) -> Vector {
        Vector(self.0 + rhs.0)
    }
}

impl Sub for Vector {
    type Output = Vector;
    fn sub(self, rhs: Vector) -> Vector {
        Vector(self.0 - rhs.0)
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;
    fn mul(self, rhs: f64) -> Vector {
        Vector(self.0 * rhs)
    }
}

impl Neg for Vector {
    type Output = Vector;
    fn neg(self) -> Vector {
        Vector(-self.0)
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.0.x, self.0.y, self.0.z)
    }
}

// ============================================================================
// Color
// ============================================================================

/// A pen or fill color as handed to the drawing surface.
#[derive(Clone, Debug, PartialEq)]
pub enum Color {
    /// Any CSS-style string: a name, `#rgb`, `#rrggbb`.
    Named(String),
    Rgb(u8, u8, u8),
}

impl Color {
    pub fn black() -> Self {
        Color::Named("black".to_string())
    }

    /// Numeric channels: absolute value, two hex digits each.
    pub fn from_channels(r: f64, g: f64, b: f64) -> Result<Self, TurtleError> {
        let channel = |name: &str, v: f64| -> Result<u8, TurtleError> {
            let v = TurtleError::check_finite("color", name, v)?.abs().round();
            if v > 255.0 {
                return Err(TurtleError::invalid(
                    "color",
                    format!("{name} channel {v} is outside 0..=255"),
                ));
            }
            Ok(v as u8)
        };
        Ok(Color::Rgb(channel("red", r)?, channel("green", g)?, channel("blue", b)?))
    }

    /// Resolve to concrete channels (named colors via a small CSS table).
    /// `None` for unknown names and for `none`/`transparent`.
    pub fn to_rgb(&self) -> Option<(u8, u8, u8)> {
        match self {
            Color::Rgb(r, g, b) => Some((*r, *g, *b)),
            Color::Named(name) => parse_css_color(name),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Named(s) => write!(f, "{}", s),
            Color::Rgb(r, g, b) => write!(f, "#{:02x}{:02x}{:02x}", r, g, b),
        }
    }
}

impl FromStr for Color {
    type Err = TurtleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TurtleError::invalid("color", "empty color string"));
        }
        Ok(Color::Named(s.to_string()))
    }
}

fn parse_css_color(name: &str) -> Option<(u8, u8, u8)> {
    let name = name.trim().to_ascii_lowercase();
    if let Some(hex) = name.strip_prefix('#') {
        return parse_hex(hex);
    }
    let rgb = match name.as_str() {
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "green" => (0, 128, 0),
        "lime" => (0, 255, 0),
        "blue" => (0, 0, 255),
        "navy" => (0, 0, 128),
        "yellow" => (255, 255, 0),
        "cyan" | "aqua" => (0, 255, 255),
        "magenta" | "fuchsia" => (255, 0, 255),
        "orange" => (255, 165, 0),
        "purple" => (128, 0, 128),
        "brown" => (165, 42, 42),
        "pink" => (255, 192, 203),
        "gray" | "grey" => (128, 128, 128),
        "lightgray" | "lightgrey" => (211, 211, 211),
        "darkgray" | "darkgrey" => (169, 169, 169),
        "silver" => (192, 192, 192),
        "gold" => (255, 215, 0),
        "violet" => (238, 130, 238),
        _ => return None,
    };
    Some(rgb)
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let digit = |i: usize, len: usize| u8::from_str_radix(hex.get(i..i + len)?, 16).ok();
    match hex.len() {
        3 => {
            let (r, g, b) = (digit(0, 1)?, digit(1, 1)?, digit(2, 1)?);
            Some((r * 17, g * 17, b * 17))
        }
        6 => Some((digit(0, 2)?, digit(2, 2)?, digit(4, 2)?)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, eps: f64) {
        assert!(
            (actual - expected).abs() < eps,
            "expected {expected}, got {actual}"
        );
    }

    // ==================== Vector tests ====================

    #[test]
    fn from_angle_round_trips_through_to_angle() {
        let mut phi = -720.0;
        while phi <= 720.0 {
            let back = Vector::from_angle(phi).to_angle();
            let expected = phi.rem_euclid(360.0);
            let diff = (back - expected).abs();
            assert!(
                diff < 1e-3 || (diff - 360.0).abs() < 1e-3,
                "phi {phi}: got {back}, expected {expected}"
            );
            phi += 7.5;
        }
    }

    #[test]
    fn to_angle_snaps_noise_on_axes() {
        assert_eq!(Vector::new(1.0, -1e-12, 0.0).to_angle(), 0.0);
        assert_eq!(Vector::new(-1.0, 1e-9, 0.0).to_angle(), 180.0);
        assert_eq!(Vector::new(3e-7, -2.0, 0.0).to_angle(), 270.0);
        assert_eq!(Vector::new(-4e-6, 2.0, 0.0).to_angle(), 90.0);
    }

    #[test]
    fn to_angle_of_zero_vector_is_zero() {
        assert_eq!(Vector::ZERO.to_angle(), 0.0);
    }

    #[test]
    fn normalize_gives_unit_length() {
        for v in [
            Vector::new(3.0, 4.0, 0.0),
            Vector::new(-0.001, 0.002, 5.0),
            Vector::new(1e6, -1e6, 1.0),
        ] {
            assert_close(v.normalize().len(), 1.0, 1e-9);
        }
    }

    #[test]
    fn normalize_zero_is_zero() {
        assert_eq!(Vector::ZERO.normalize(), Vector::ZERO);
        assert!(matches!(
            Vector::ZERO.try_normalize("towards"),
            Err(TurtleError::DegenerateGeometry { operation: "towards", .. })
        ));
    }

    #[test]
    fn linear_moves_along_heading() {
        let p = Vector::xy(1.0, 2.0).linear(1.0, 10.0, Vector::X);
        assert_eq!(p, Vector::xy(11.0, 2.0));
    }

    #[test]
    fn cross_of_normal_and_heading_points_right() {
        // normal (0,0,-1) x heading (1,0,0) = (0,-1,0): a right turn goes clockwise
        assert_eq!(Vector::NEG_Z.cross(Vector::X), Vector::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn rotate_is_counter_clockwise() {
        let v = Vector::X.rotate(90.0);
        assert_close(v.x(), 0.0, 1e-12);
        assert_close(v.y(), 1.0, 1e-12);
        assert_eq!(v.z(), 0.0);
    }

    #[test]
    fn rotate_normal_blends_towards_other() {
        let left = Vector::new(0.0, 1.0, 0.0);
        let v = Vector::X.rotate_normal(left, std::f64::consts::FRAC_PI_2);
        assert_close(v.x(), 0.0, 1e-12);
        assert_close(v.y(), 1.0, 1e-12);
    }

    #[test]
    fn scale_marks_z() {
        assert_eq!(Vector::xy(2.0, 3.0).scale(0.5, 2.0), Vector::new(1.0, 6.0, 1.0));
    }

    #[test]
    fn checked_div_by_zero() {
        assert_eq!(Vector::X.checked_div(0.0), None);
        assert_eq!(Vector::xy(2.0, 4.0).checked_div(2.0), Some(Vector::xy(1.0, 2.0)));
    }

    #[test]
    fn try_from_slice_checks_arity() {
        assert_eq!(Vector::try_from(&[1.0, 2.0][..]), Ok(Vector::xy(1.0, 2.0)));
        assert_eq!(Vector::try_from(&[1.0, 2.0, 3.0][..]), Ok(Vector::new(1.0, 2.0, 3.0)));
        assert!(matches!(
            Vector::try_from(&[1.0][..]),
            Err(TurtleError::InvalidArgument { .. })
        ));
        assert!(Vector::try_from(&[1.0, 2.0, 3.0, 4.0][..]).is_err());
    }

    // ==================== Color tests ====================

    #[test]
    fn channels_render_as_hex() {
        assert_eq!(Color::from_channels(255.0, 0.0, 0.0).unwrap().to_string(), "#ff0000");
        assert_eq!(Color::from_channels(-10.0, 5.0, 171.0).unwrap().to_string(), "#0a05ab");
    }

    #[test]
    fn channels_out_of_range_are_rejected() {
        assert!(Color::from_channels(256.0, 0.0, 0.0).is_err());
        assert!(Color::from_channels(0.0, f64::NAN, 0.0).is_err());
    }

    #[test]
    fn named_colors_resolve() {
        assert_eq!(Color::black().to_rgb(), Some((0, 0, 0)));
        assert_eq!("Orange".parse::<Color>().unwrap().to_rgb(), Some((255, 165, 0)));
        assert_eq!("#0f8".parse::<Color>().unwrap().to_rgb(), Some((0, 255, 136)));
        assert_eq!("#102030".parse::<Color>().unwrap().to_rgb(), Some((16, 32, 48)));
        assert_eq!("none".parse::<Color>().unwrap().to_rgb(), None);
        assert!("  ".parse::<Color>().is_err());
    }
}
