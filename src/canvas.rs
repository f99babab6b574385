//! Mutable RGBA canvas with software drawing primitives.
//!
//! Every primitive silently drops pixel writes outside the canvas; the
//! padding and margin arithmetic used by the feature generators relies on
//! that tolerance. Strokes with alpha below 255 are composited src-over,
//! and each primitive de-duplicates its covered pixels so a translucent
//! stroke never compounds where stamps overlap.

use crate::color::Rgba;
use crate::geometry::Point;
use image::RgbaImage;
use std::collections::HashSet;

#[derive(Clone)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    data: Vec<u8>,
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Byte length of a `width` x `height` RGBA buffer. Computed in `usize`:
/// the pixel count alone can exceed `u32` at the largest permitted sizes.
fn buffer_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 4
}

impl Canvas {
    /// Allocate a canvas filled with `fill`.
    pub fn new(width: u32, height: u32, fill: Rgba) -> Self {
        let mut data = Vec::with_capacity(buffer_len(width, height));
        for _ in 0..width as usize * height as usize {
            data.extend_from_slice(&[fill.r, fill.g, fill.b, fill.a]);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Wrap an existing RGBA image, e.g. to overlay a grid on a rendered map.
    pub fn from_image(image: &RgbaImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            data: image.as_raw().clone(),
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    fn index(&self, x: i32, y: i32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba> {
        if !self.contains(x, y) {
            return None;
        }
        let i = self.index(x, y);
        Some(Rgba::new(
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ))
    }

    /// Replace a pixel without blending. Out-of-bounds writes are dropped.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if !self.contains(x, y) {
            return;
        }
        let i = self.index(x, y);
        self.data[i] = color.r;
        self.data[i + 1] = color.g;
        self.data[i + 2] = color.b;
        self.data[i + 3] = color.a;
    }

    /// Composite a pixel src-over. Out-of-bounds writes are dropped.
    pub fn put_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if !self.contains(x, y) {
            return;
        }
        if color.a == 255 {
            self.set_pixel(x, y, color);
            return;
        }
        if color.a == 0 {
            return;
        }
        let i = self.index(x, y);
        let sa = color.a as u32;
        let blend = |dst: u8, src: u8| ((src as u32 * sa + dst as u32 * (255 - sa)) / 255) as u8;
        self.data[i] = blend(self.data[i], color.r);
        self.data[i + 1] = blend(self.data[i + 1], color.g);
        self.data[i + 2] = blend(self.data[i + 2], color.b);
        self.data[i + 3] = self.data[i + 3].max(color.a);
    }

    /// Raw RGBA bytes, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let i = (y as usize * self.width as usize + x as usize) * 4;
            image::Rgba([
                self.data[i],
                self.data[i + 1],
                self.data[i + 2],
                self.data[i + 3],
            ])
        })
    }

    /// Stroke a single segment with round caps.
    pub fn draw_line(&mut self, a: Point, b: Point, width: u32, color: Rgba) {
        self.draw_polyline(&[a, b], width, color);
    }

    /// Stroke a polyline with round joints: all segment stamps are collected
    /// into one coverage set before compositing, so joints and overlaps get
    /// painted exactly once.
    pub fn draw_polyline(&mut self, points: &[Point], width: u32, color: Rgba) {
        if points.is_empty() {
            return;
        }
        let radius = (width / 2) as i32;
        let mut covered = HashSet::new();
        if points.len() == 1 {
            stamp_disc(&mut covered, points[0].x, points[0].y, radius);
        }
        for pair in points.windows(2) {
            for (x, y) in line_pixels(pair[0], pair[1]) {
                stamp_disc(&mut covered, x, y, radius);
            }
        }
        for (x, y) in covered {
            self.put_pixel(x, y, color);
        }
    }

    /// Fill a polygon (even-odd rule) given its vertices in order.
    pub fn fill_polygon(&mut self, vertices: &[Point], color: Rgba) {
        if vertices.len() < 3 {
            return;
        }
        let min_y = vertices.iter().map(|p| p.y).min().unwrap_or(0);
        let max_y = vertices.iter().map(|p| p.y).max().unwrap_or(0);
        for y in min_y..=max_y {
            let scan = y as f64 + 0.5;
            let mut crossings = Vec::new();
            for i in 0..vertices.len() {
                let p1 = vertices[i];
                let p2 = vertices[(i + 1) % vertices.len()];
                let (y1, y2) = (p1.y as f64, p2.y as f64);
                if (y1 <= scan && y2 > scan) || (y2 <= scan && y1 > scan) {
                    let t = (scan - y1) / (y2 - y1);
                    crossings.push(p1.x as f64 + t * (p2.x - p1.x) as f64);
                }
            }
            crossings.sort_by(|a, b| a.total_cmp(b));
            for pair in crossings.chunks(2) {
                if let [x1, x2] = pair {
                    for x in x1.floor() as i32..=x2.ceil() as i32 {
                        self.put_pixel(x, y, color);
                    }
                }
            }
        }
    }

    /// Stroke a polygon outline, closing the ring.
    pub fn stroke_polygon(&mut self, vertices: &[Point], width: u32, color: Rgba) {
        if vertices.len() < 2 {
            return;
        }
        let mut ring: Vec<Point> = vertices.to_vec();
        ring.push(vertices[0]);
        self.draw_polyline(&ring, width, color);
    }

    /// Fill the axis-aligned ellipse inscribed in the given bounding box.
    pub fn fill_ellipse(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: Rgba) {
        let (x1, x2) = (x1.min(x2), x1.max(x2));
        let (y1, y2) = (y1.min(y2), y1.max(y2));
        let cx = (x1 + x2) as f64 / 2.0;
        let cy = (y1 + y2) as f64 / 2.0;
        let rx = ((x2 - x1) as f64 / 2.0).max(0.5);
        let ry = ((y2 - y1) as f64 / 2.0).max(0.5);
        for y in y1..=y2 {
            for x in x1..=x2 {
                let nx = (x as f64 - cx) / rx;
                let ny = (y as f64 - cy) / ry;
                if nx * nx + ny * ny <= 1.0 {
                    self.put_pixel(x, y, color);
                }
            }
        }
    }

    /// Stroke the outline of the ellipse inscribed in the bounding box.
    pub fn stroke_ellipse(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, width: u32, color: Rgba) {
        let (x1, x2) = (x1.min(x2), x1.max(x2));
        let (y1, y2) = (y1.min(y2), y1.max(y2));
        let cx = (x1 + x2) as f64 / 2.0;
        let cy = (y1 + y2) as f64 / 2.0;
        let rx = ((x2 - x1) as f64 / 2.0).max(0.5);
        let ry = ((y2 - y1) as f64 / 2.0).max(0.5);
        let radius = (width / 2) as i32;
        let steps = (((rx + ry) * 4.0) as usize).max(16);
        let mut covered = HashSet::new();
        for i in 0..steps {
            let t = i as f64 / steps as f64 * std::f64::consts::TAU;
            let x = (cx + rx * t.cos()).round() as i32;
            let y = (cy + ry * t.sin()).round() as i32;
            stamp_disc(&mut covered, x, y, radius);
        }
        for (x, y) in covered {
            self.put_pixel(x, y, color);
        }
    }

    /// Fill a disc of the given radius around `center`.
    pub fn fill_disc(&mut self, center: Point, radius: i32, color: Rgba) {
        self.fill_ellipse(
            center.x - radius,
            center.y - radius,
            center.x + radius,
            center.y + radius,
            color,
        );
    }
}

/// Bresenham line rasterization over the full integer segment.
fn line_pixels(a: Point, b: Point) -> Vec<(i32, i32)> {
    let mut pixels = Vec::new();
    let dx = (b.x - a.x).abs();
    let dy = -(b.y - a.y).abs();
    let sx = if a.x < b.x { 1 } else { -1 };
    let sy = if a.y < b.y { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (a.x, a.y);
    loop {
        pixels.push((x, y));
        if x == b.x && y == b.y {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
    pixels
}

fn stamp_disc(covered: &mut HashSet<(i32, i32)>, cx: i32, cy: i32, radius: i32) {
    if radius <= 0 {
        covered.insert((cx, cy));
        return;
    }
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                covered.insert((cx + dx, cy + dy));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_fills_background() {
        let canvas = Canvas::new(4, 3, Rgba::opaque(10, 20, 30));
        assert_eq!(canvas.data().len(), 4 * 3 * 4);
        assert_eq!(canvas.pixel(3, 2), Some(Rgba::opaque(10, 20, 30)));
        assert_eq!(canvas.pixel(4, 0), None);
    }

    #[test]
    fn test_buffer_len_exceeds_u32_at_largest_size() {
        // 128 cells x 2048 px/cell on both axes is the largest permitted
        // canvas; its byte length no longer fits in u32
        assert_eq!(buffer_len(32768, 32768), 1usize << 32);
        assert_eq!(buffer_len(320, 200), 320 * 200 * 4);
    }

    #[test]
    fn test_debug_format_skips_pixel_data() {
        let canvas = Canvas::new(4, 2, Rgba::BLACK);
        let dump = format!("{canvas:?}");
        assert!(dump.contains("width: 4"));
        assert!(dump.contains("bytes: 32"));
    }

    #[test]
    fn test_out_of_bounds_writes_dropped() {
        let mut canvas = Canvas::new(8, 8, Rgba::WHITE);
        canvas.put_pixel(-3, 2, Rgba::BLACK);
        canvas.put_pixel(2, 100, Rgba::BLACK);
        canvas.draw_line(
            Point::new(-20, -20),
            Point::new(30, 30),
            3,
            Rgba::opaque(255, 0, 0),
        );
        // In-bounds part of the line landed, nothing panicked
        assert_eq!(canvas.pixel(4, 4), Some(Rgba::opaque(255, 0, 0)));
    }

    #[test]
    fn test_line_covers_endpoints() {
        let mut canvas = Canvas::new(20, 20, Rgba::WHITE);
        canvas.draw_line(Point::new(2, 2), Point::new(17, 9), 1, Rgba::BLACK);
        assert_eq!(canvas.pixel(2, 2), Some(Rgba::BLACK));
        assert_eq!(canvas.pixel(17, 9), Some(Rgba::BLACK));
    }

    #[test]
    fn test_translucent_stroke_blends_once() {
        let mut canvas = Canvas::new(30, 30, Rgba::WHITE);
        // Sharp bend: joint pixels are stamped by both segments
        let pts = [Point::new(5, 15), Point::new(15, 15), Point::new(5, 25)];
        canvas.draw_polyline(&pts, 5, Rgba::new(0, 0, 0, 128));
        let joint = canvas.pixel(15, 15).unwrap();
        let middle = canvas.pixel(10, 15).unwrap();
        assert_eq!(joint, middle);
    }

    #[test]
    fn test_fill_polygon_interior_and_exterior() {
        let mut canvas = Canvas::new(20, 20, Rgba::WHITE);
        let square = [
            Point::new(5, 5),
            Point::new(15, 5),
            Point::new(15, 15),
            Point::new(5, 15),
        ];
        canvas.fill_polygon(&square, Rgba::opaque(0, 128, 0));
        assert_eq!(canvas.pixel(10, 10), Some(Rgba::opaque(0, 128, 0)));
        assert_eq!(canvas.pixel(2, 2), Some(Rgba::WHITE));
    }

    #[test]
    fn test_fill_ellipse_stays_in_bbox() {
        let mut canvas = Canvas::new(30, 30, Rgba::WHITE);
        canvas.fill_ellipse(10, 10, 20, 18, Rgba::BLACK);
        assert_eq!(canvas.pixel(15, 14), Some(Rgba::BLACK));
        assert_eq!(canvas.pixel(9, 14), Some(Rgba::WHITE));
        assert_eq!(canvas.pixel(15, 9), Some(Rgba::WHITE));
        assert_eq!(canvas.pixel(21, 14), Some(Rgba::WHITE));
    }

    #[test]
    fn test_to_image_round_trip() {
        let mut canvas = Canvas::new(6, 4, Rgba::opaque(1, 2, 3));
        canvas.set_pixel(5, 3, Rgba::new(9, 8, 7, 6));
        let image = canvas.to_image();
        let back = Canvas::from_image(&image);
        assert_eq!(back.data(), canvas.data());
    }
}
