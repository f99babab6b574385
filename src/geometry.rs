//! 2D integer geometry in canvas space.
//!
//! Angle convention: 0 degrees points along +x and positive angles rotate
//! counter-clockwise in the usual math sense. The canvas origin is top-left,
//! so the y component of a polar offset is inverted.

use serde::{Deserialize, Serialize};

/// An integer point on (or near) the canvas.
///
/// Coordinates may transiently fall outside canvas bounds during path
/// construction; clipping happens only at draw time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Translate by a per-axis offset.
    pub fn translate(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Translate both axes by the same scalar.
    pub fn offset(self, d: i32) -> Self {
        self.translate(d, d)
    }

    /// Offset this point by `length` along `angle_deg`.
    ///
    /// Components are rounded with `ceil` before the y inversion, matching
    /// the rasterization everywhere else in the generator.
    pub fn add_polar(self, length: f64, angle_deg: f64) -> Self {
        let rad = angle_deg.to_radians();
        Self::new(
            self.x + (length * rad.cos()).ceil() as i32,
            self.y - (length * rad.sin()).ceil() as i32,
        )
    }

    /// Bearing from this point toward `target`, in degrees, in the inverted-y
    /// convention above. Range is (-180, 180].
    pub fn angle_between(self, target: Point) -> f64 {
        ((self.y - target.y) as f64)
            .atan2((target.x - self.x) as f64)
            .to_degrees()
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// An ordered run of points with a stroke width, accumulated by the path
/// generator and consumed once by the renderer.
#[derive(Clone, Debug)]
pub struct Path {
    pub width: u32,
    pub points: Vec<Point>,
}

impl Path {
    pub fn new(width: u32) -> Self {
        Self {
            width,
            points: Vec::new(),
        }
    }

    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }
}
