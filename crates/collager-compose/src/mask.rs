//! Synthetic circular alpha mask.

use collager_core::{Point, Rect, Size};
use image::Rgba;

use crate::canvas::Surface;

/// Alpha-only surface that is opaque inside a circle and transparent outside.
///
/// A pixel belongs to the circle when its center, `(x + 0.5, y + 0.5)`, lies
/// strictly inside the radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircleMask {
    center: Point,
    radius: u32,
}

impl CircleMask {
    /// Creates a mask around `center`.
    pub fn new(center: Point, radius: u32) -> Self {
        Self { center, radius }
    }

    /// Centered mask for a `diameter x diameter` tile.
    pub fn for_tile(diameter: u32) -> Self {
        let half = i32::try_from(diameter / 2).unwrap_or(i32::MAX);
        Self::new(Point::new(half, half), diameter / 2)
    }

    /// Mask radius.
    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Coverage at `(x, y)`: `255` inside, `0` outside.
    pub fn alpha_at(&self, x: i32, y: i32) -> u8 {
        let dx = f64::from(x) - f64::from(self.center.x) + 0.5;
        let dy = f64::from(y) - f64::from(self.center.y) + 0.5;
        let radius = f64::from(self.radius);
        if dx * dx + dy * dy < radius * radius {
            255
        } else {
            0
        }
    }
}

impl Surface for CircleMask {
    fn bounds(&self) -> Rect {
        let radius = i32::try_from(self.radius).unwrap_or(i32::MAX);
        Rect::new(
            Point::new(
                self.center.x.saturating_sub(radius),
                self.center.y.saturating_sub(radius),
            ),
            Size::new(self.radius.saturating_mul(2), self.radius.saturating_mul(2)),
        )
    }

    fn get_pixel(&self, x: i32, y: i32) -> Option<Rgba<u8>> {
        if !self.bounds().contains(i64::from(x), i64::from(y)) {
            return None;
        }
        Some(Rgba([0, 0, 0, self.alpha_at(x, y)]))
    }
}
