//! Turtle icon outlines
//!
//! Each outline is authored pointing "up" (+y) in a local frame roughly
//! spanning -10..10 units; the icon renderer rotates it by `heading - 90`.

use std::fmt;
use std::str::FromStr;

use crate::errors::TurtleError;
use crate::types::Vector;

#[rustfmt::skip]
const TURTLE: [(f64, f64); 24] = [
    (0.0, 16.0), (-2.0, 14.0), (-1.0, 10.0), (-4.0, 7.0),
    (-7.0, 9.0), (-9.0, 8.0), (-6.0, 5.0), (-7.0, 1.0),
    (-5.0, -3.0), (-8.0, -6.0), (-6.0, -8.0), (-4.0, -5.0),
    (0.0, -7.0), (4.0, -5.0), (6.0, -8.0), (8.0, -6.0),
    (5.0, -3.0), (7.0, 1.0), (6.0, 5.0), (9.0, 8.0),
    (7.0, 9.0), (4.0, 7.0), (1.0, 10.0), (2.0, 14.0),
];

const ARROW: [(f64, f64); 3] = [(-10.0, 0.0), (10.0, 0.0), (0.0, 10.0)];

#[rustfmt::skip]
const CIRCLE: [(f64, f64); 20] = [
    (10.0, 0.0), (9.51, 3.09), (8.09, 5.88), (5.88, 8.09), (3.09, 9.51),
    (0.0, 10.0), (-3.09, 9.51), (-5.88, 8.09), (-8.09, 5.88), (-9.51, 3.09),
    (-10.0, 0.0), (-9.51, -3.09), (-8.09, -5.88), (-5.88, -8.09), (-3.09, -9.51),
    (0.0, -10.0), (3.09, -9.51), (5.88, -8.09), (8.09, -5.88), (9.51, -3.09),
];

const SQUARE: [(f64, f64); 4] = [(10.0, -10.0), (10.0, 10.0), (-10.0, 10.0), (-10.0, -10.0)];

const TRIANGLE: [(f64, f64); 3] = [(10.0, -5.77), (0.0, 11.55), (-10.0, -5.77)];

const BLANK: [(f64, f64); 1] = [(0.0, 0.0)];

const CLASSIC: [(f64, f64); 4] = [(0.0, 0.0), (-5.0, -9.0), (0.0, -7.0), (5.0, -9.0)];

/// The fixed catalog of icon shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shape {
    Turtle,
    #[default]
    Arrow,
    Circle,
    Square,
    Triangle,
    Blank,
    Classic,
}

impl Shape {
    pub const ALL: [Shape; 7] = [
        Shape::Turtle,
        Shape::Arrow,
        Shape::Circle,
        Shape::Square,
        Shape::Triangle,
        Shape::Blank,
        Shape::Classic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Shape::Turtle => "turtle",
            Shape::Arrow => "arrow",
            Shape::Circle => "circle",
            Shape::Square => "square",
            Shape::Triangle => "triangle",
            Shape::Blank => "blank",
            Shape::Classic => "classic",
        }
    }

    fn outline(self) -> &'static [(f64, f64)] {
        match self {
            Shape::Turtle => &TURTLE,
            Shape::Arrow => &ARROW,
            Shape::Circle => &CIRCLE,
            Shape::Square => &SQUARE,
            Shape::Triangle => &TRIANGLE,
            Shape::Blank => &BLANK,
            Shape::Classic => &CLASSIC,
        }
    }

    /// Outline points in the local frame.
    pub fn points(self) -> impl Iterator<Item = Vector> {
        self.outline().iter().map(|&(x, y)| Vector::xy(x, y))
    }

    /// Outline placed in the world: point-scaled, turned to `heading_degrees`,
    /// moved to `position`.
    pub fn place(
        self,
        position: Vector,
        heading_degrees: f64,
        point_scale: (f64, f64),
    ) -> Vec<Vector> {
        let turn = heading_degrees - 90.0;
        self.points()
            .map(|p| p.scale(point_scale.0, point_scale.1).rotate(turn) + position)
            .collect()
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Shape {
    type Err = TurtleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Shape::ALL
            .into_iter()
            .find(|shape| shape.name() == s)
            .ok_or_else(|| TurtleError::invalid("shape", format!("unknown shape `{s}`")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for shape in Shape::ALL {
            assert_eq!(shape.name().parse::<Shape>(), Ok(shape));
        }
        assert!("hexagon".parse::<Shape>().is_err());
    }

    #[test]
    fn arrow_points_along_heading() {
        // Heading 0 (+x): the arrow tip (0, 10) ends up at (10, 0).
        let placed = Shape::Arrow.place(Vector::ZERO, 0.0, (1.0, 1.0));
        let tip = placed[2];
        assert!((tip.x() - 10.0).abs() < 1e-9);
        assert!(tip.y().abs() < 1e-9);
    }

    #[test]
    fn placement_applies_point_scale_and_offset() {
        let placed = Shape::Square.place(Vector::xy(5.0, 5.0), 90.0, (0.5, 2.0));
        assert_eq!(placed[0], Vector::xy(10.0, -15.0));
    }

    #[test]
    fn blank_is_a_single_point() {
        assert_eq!(Shape::Blank.points().count(), 1);
    }
}
