//! Compass rose overlay.
//!
//! Two concentric outline rings and eight two-tone arrows at 45-degree
//! spacing. The rose is placed by an edge/corner keyword; an unknown
//! keyword is a configuration error and aborts the call.

use crate::canvas::Canvas;
use crate::color::Rgba;
use crate::error::ConfigError;
use crate::geometry::Point;
use serde::{Deserialize, Serialize};

const HALF_BLACK: Rgba = Rgba::new(0, 0, 0, 128);
const HALF_WHITE: Rgba = Rgba::new(255, 255, 255, 128);

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompassSpec {
    /// Placement keyword: `center`, an edge (`north`, `south`, `east`,
    /// `west`), or a corner (`northwest`, `top-left`, ...).
    pub position: String,
    /// Arrow length in pixels; the rose spans roughly twice this.
    pub size: i32,
    /// Clockwise rotation of the whole rose in degrees.
    pub rotation: i32,
}

impl CompassSpec {
    pub fn new(position: &str, size: i32, rotation: i32) -> Self {
        Self {
            position: position.to_string(),
            size,
            rotation,
        }
    }
}

/// Resolve a placement keyword to a canvas point, keeping the rose `margin`
/// pixels clear of the edges it hugs.
pub fn parse_position(
    keyword: &str,
    width: u32,
    height: u32,
    margin: i32,
) -> Result<Point, ConfigError> {
    let w = width as i32;
    let h = height as i32;
    let (cx, cy) = (w / 2, h / 2);
    let (lo_x, hi_x) = (margin, w - margin);
    let (lo_y, hi_y) = (margin, h - margin);
    let point = match keyword.trim().to_ascii_lowercase().as_str() {
        "center" | "middle" => Point::new(cx, cy),
        "north" | "top" => Point::new(cx, lo_y),
        "south" | "bottom" => Point::new(cx, hi_y),
        "east" | "right" => Point::new(hi_x, cy),
        "west" | "left" => Point::new(lo_x, cy),
        "northwest" | "top-left" => Point::new(lo_x, lo_y),
        "northeast" | "top-right" => Point::new(hi_x, lo_y),
        "southwest" | "bottom-left" => Point::new(lo_x, hi_y),
        "southeast" | "bottom-right" => Point::new(hi_x, hi_y),
        _ => return Err(ConfigError::UnknownPosition(keyword.to_string())),
    };
    Ok(point)
}

/// Draw the compass rose per `spec`. Fails before touching the canvas if the
/// position keyword does not resolve.
pub fn overlay_compass(canvas: &mut Canvas, spec: &CompassSpec) -> Result<(), ConfigError> {
    let margin = spec.size * 2;
    let center = parse_position(&spec.position, canvas.width, canvas.height, margin)?;

    for ring in [0.8, 0.7] {
        let r = (spec.size as f64 * ring) as i32;
        canvas.stroke_ellipse(
            center.x - r,
            center.y - r,
            center.x + r,
            center.y + r,
            2,
            HALF_BLACK,
        );
    }
    // Minor (intercardinal) arrows first so the cardinal arrows overlap them
    for angle in (0..360).step_by(90) {
        draw_arrow(canvas, center, angle + 45 + spec.rotation, spec.size);
    }
    for angle in (0..360).step_by(90) {
        draw_arrow(canvas, center, angle + spec.rotation, spec.size);
    }
    Ok(())
}

/// One two-tone arrow: a dark and a light triangle mirrored about the shaft.
fn draw_arrow(canvas: &mut Canvas, center: Point, angle: i32, size: i32) {
    let angle = angle as f64;
    let flank1 = center.add_polar(size as f64 / 4.0, 45.0 + angle);
    let tip = center.add_polar(size as f64, 90.0 + angle);
    let flank2 = center.add_polar(size as f64 / 4.0, 135.0 + angle);
    canvas.fill_polygon(&[center, flank1, tip], HALF_BLACK);
    canvas.fill_polygon(&[center, tip, flank2], HALF_WHITE);
}
