//! Geometry for the device mapping and arc rasterization

use glam::{DAffine2, DVec2};

use crate::errors::{Result, TurtleError};
use crate::types::Vector;

/// World bounding box `(llx, lly)`-`(urx, ury)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBox {
    pub llx: f64,
    pub lly: f64,
    pub urx: f64,
    pub ury: f64,
}

impl WorldBox {
    pub fn new(llx: f64, lly: f64, urx: f64, ury: f64) -> Self {
        Self { llx, lly, urx, ury }
    }

    /// The default box: one world unit per pixel, origin in the middle.
    pub fn centered(width: u32, height: u32) -> Self {
        let (w, h) = (f64::from(width), f64::from(height));
        Self::new(-w / 2.0, -h / 2.0, w / 2.0, h / 2.0)
    }

    pub fn width(&self) -> f64 {
        self.urx - self.llx
    }

    pub fn height(&self) -> f64 {
        self.ury - self.lly
    }
}

/// Transform that puts the origin at the surface center with y pointing up.
pub fn centered_transform(width: u32, height: u32) -> DAffine2 {
    let (w, h) = (f64::from(width), f64::from(height));
    DAffine2::from_translation(DVec2::new(w / 2.0, h / 2.0))
        * DAffine2::from_scale(DVec2::new(1.0, -1.0))
}

/// Everything a world remap changes on a device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldMapping {
    pub world: WorldBox,
    /// Surface `scale(..)` arguments.
    pub scale: DVec2,
    /// Surface `translate(..)` arguments, applied after the scale.
    pub translate: DVec2,
    /// World units per pixel along x and y.
    pub point_scale: DVec2,
    pub line_scale: f64,
}

impl WorldMapping {
    /// Map `world` onto a `width` x `height` surface.
    ///
    /// The translation has three branches on the sign of `lly`; they are kept
    /// as-is for compatibility with existing drawings.
    pub fn new(world: WorldBox, width: u32, height: u32) -> Result<Self> {
        for (name, v) in [
            ("llx", world.llx),
            ("lly", world.lly),
            ("urx", world.urx),
            ("ury", world.ury),
        ] {
            TurtleError::check_finite("set_world_coordinates", name, v)?;
        }
        if world.width() == 0.0 || world.height() == 0.0 {
            return Err(TurtleError::degenerate(
                "set_world_coordinates",
                format!(
                    "world box ({}, {})-({}, {}) has no area",
                    world.llx, world.lly, world.urx, world.ury
                ),
            ));
        }
        let (w, h) = (f64::from(width), f64::from(height));
        let scale = DVec2::new(w / world.width(), -h / world.height());
        let ty = if world.lly == 0.0 {
            world.lly - world.height()
        } else if world.lly > 0.0 {
            -world.lly * 2.0
        } else {
            -world.ury
        };
        let point_scale = DVec2::new(world.width() / w, world.height() / h);
        Ok(Self {
            world,
            scale,
            translate: DVec2::new(-world.llx, ty),
            point_scale,
            line_scale: point_scale.x.min(point_scale.y),
        })
    }

    pub fn transform(&self) -> DAffine2 {
        DAffine2::from_scale(self.scale) * DAffine2::from_translation(self.translate)
    }
}

/// One arc as handed to the surface, plus where the turtle ends up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcPlan {
    pub center: DVec2,
    pub radius: f64,
    /// Surface angles in radians.
    pub start: f64,
    pub end: f64,
    pub counter_clockwise: bool,
    /// Final `(position, heading in degrees)`; `None` when the extent is a
    /// whole number of turns.
    pub end_pose: Option<(Vector, f64)>,
}

impl ArcPlan {
    /// Plan an arc of `extent` degrees on a circle of `radius` from a turtle at
    /// `position` facing `heading` degrees. Positive radii put the center on
    /// the turtle's left. An extent of zero draws the full circle.
    pub fn new(position: Vector, heading: f64, radius: f64, extent: f64) -> Self {
        let to_center = (heading + 90.0).to_radians();
        let center = DVec2::new(
            position.x() + radius * to_center.cos(),
            position.y() + radius * to_center.sin(),
        );

        let sweep = if extent != 0.0 { extent } else { 360.0 };
        let (start_deg, end_deg) = if radius >= 0.0 {
            (heading - 90.0, heading - 90.0 + sweep)
        } else {
            (heading + 90.0, heading + 90.0 - sweep)
        };
        // Turtle degrees run counter-clockwise; surface angles run clockwise
        // and the y axis is already flipped by the device transform.
        let surface = |deg: f64| (-(360.0 - deg)).to_radians();

        let end_pose = (extent != 0.0 && extent % 360.0 != 0.0).then(|| {
            let turned = if radius >= 0.0 { extent } else { -extent };
            let mut new_heading = (heading + turned) % 360.0;
            if new_heading < 0.0 {
                new_heading += 360.0;
            }
            let from_center = (new_heading - 90.0).to_radians();
            let end = Vector::xy(
                center.x + radius * from_center.cos(),
                center.y + radius * from_center.sin(),
            );
            (end, new_heading)
        });

        Self {
            center,
            radius: radius.abs(),
            start: surface(start_deg),
            end: surface(end_deg),
            counter_clockwise: radius * extent <= 0.0,
            end_pose,
        }
    }
}
