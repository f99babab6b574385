//! Cluster feature placement: tree stars, rock polygons/ellipses, flowers.
//!
//! A cluster is a stack of concentric layers drawn outermost first so the
//! inner colors stay visible. One size multiplier is drawn per cluster and
//! shared by all its layers, which keeps the layers visually coherent.
//! Every cluster ends with a localized noise pass over its padded bounding
//! box to blend the synthetic shape into the background.

use crate::canvas::Canvas;
use crate::color::{hsv_to_rgb, Rgba};
use crate::geometry::Point;
use crate::texture::{apply_noise, FEATURE_NOISE_AMPLITUDE};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// One concentric layer: its nominal radius and fill color.
#[derive(Clone, Copy, Debug)]
pub struct ClusterLayer {
    pub radius: i32,
    pub color: Rgba,
}

/// Outer-to-inner tree layers: bark shadow, then darker to lighter foliage.
pub const TREE_LAYERS: [ClusterLayer; 4] = [
    ClusterLayer { radius: 45, color: Rgba::opaque(169, 169, 169) },
    ClusterLayer { radius: 40, color: Rgba::opaque(0, 100, 0) },
    ClusterLayer { radius: 30, color: Rgba::opaque(0, 128, 0) },
    ClusterLayer { radius: 20, color: Rgba::opaque(144, 238, 144) },
];

/// Outer-to-inner rock layers, near-black rim to lighter core.
pub const ROCK_LAYERS: [ClusterLayer; 3] = [
    ClusterLayer { radius: 60, color: Rgba::opaque(0x11, 0x11, 0x11) },
    ClusterLayer { radius: 50, color: Rgba::opaque(169, 169, 169) },
    ClusterLayer { radius: 40, color: Rgba::opaque(128, 128, 128) },
];

/// Vertex counts rocks are drawn with; 7 is skipped on purpose, it reads as
/// too regular next to the hex grid.
const ROCK_VERTEX_CHOICES: [u32; 7] = [3, 4, 5, 6, 8, 9, 10];

const ROCK_CLUSTER_COUNT: u32 = 10;
const FLOWER_RADIUS: (i32, i32) = (2, 6);
const CLUSTER_NOISE_PADDING: i32 = 10;

fn random_center(canvas: &Canvas, rng: &mut ChaCha8Rng) -> Point {
    Point::new(
        rng.gen_range(0..=canvas.width as i32),
        rng.gen_range(0..=canvas.height as i32),
    )
}

/// Radial segment length: never shorter than a fifth of the layer radius,
/// otherwise uniform up to `radius * multiplier`.
fn layer_length(radius: i32, multiplier: f64, rng: &mut ChaCha8Rng) -> f64 {
    (radius as f64 / 5.0).max(radius as f64 * rng.gen::<f64>() * multiplier)
}

/// A "star" cluster: rings of line segments radiating from the center at
/// every 5 degrees of arc. Used for trees.
pub fn star_cluster(canvas: &mut Canvas, layers: &[ClusterLayer], rng: &mut ChaCha8Rng) {
    let center = random_center(canvas, rng);
    let multiplier: f64 = rng.gen();
    for layer in layers {
        for angle in (0..360).step_by(5) {
            let length = layer_length(layer.radius, multiplier, rng);
            let tip = center.add_polar(length, angle as f64);
            let width = (7 + rng.gen_range(-2..=2)) as u32;
            canvas.draw_line(center, tip, width, layer.color);
        }
    }
    let size = layers.first().map_or(0, |l| l.radius);
    apply_noise(
        canvas,
        center.x - size,
        center.y - size,
        center.x + size,
        center.y + size,
        CLUSTER_NOISE_PADDING,
        FEATURE_NOISE_AMPLITUDE,
        rng,
    );
}

/// A polygon cluster: per layer, `vertex_count` vertices at evenly spaced
/// angles with randomized radius, filled and outlined. Used for rocks.
pub fn polygon_cluster(
    canvas: &mut Canvas,
    layers: &[ClusterLayer],
    vertex_count: u32,
    rng: &mut ChaCha8Rng,
) {
    let center = random_center(canvas, rng);
    let multiplier = rng.gen::<f64>().max(0.5);
    for layer in layers {
        let step = (360 / vertex_count.max(3)) as usize;
        let mut vertices = Vec::new();
        for angle in (0..360).step_by(step) {
            let length = layer_length(layer.radius, multiplier, rng);
            vertices.push(center.add_polar(length, angle as f64));
        }
        canvas.fill_polygon(&vertices, layer.color);
        canvas.stroke_polygon(&vertices, 2, Rgba::BLACK);
    }
    let size = layers.first().map_or(0, |l| l.radius);
    apply_noise(
        canvas,
        center.x - size,
        center.y - size,
        center.x + size,
        center.y + size,
        CLUSTER_NOISE_PADDING,
        FEATURE_NOISE_AMPLITUDE,
        rng,
    );
}

/// An ellipse cluster: concentric jittered ellipses. The noise pass covers
/// the running union of all layer bounding boxes.
pub fn ellipse_cluster(canvas: &mut Canvas, layers: &[ClusterLayer], rng: &mut ChaCha8Rng) {
    let center = random_center(canvas, rng);
    let multiplier: f64 = rng.gen();
    let mut x_min = canvas.width as i32;
    let mut y_min = canvas.height as i32;
    let mut x_max = 0;
    let mut y_max = 0;
    for layer in layers {
        let size = (layer.radius as f64 * multiplier).ceil() as i32;
        let x1 = center.x - size + rng.gen_range(-5..=5);
        let y1 = center.y - size + rng.gen_range(-5..=5);
        let x2 = center.x + size + rng.gen_range(-5..=5);
        let y2 = center.y + size + rng.gen_range(-5..=5);
        x_min = x_min.min(x1.min(x2));
        y_min = y_min.min(y1.min(y2));
        x_max = x_max.max(x1.max(x2));
        y_max = y_max.max(y1.max(y2));
        canvas.fill_ellipse(x1, y1, x2, y2, layer.color);
        canvas.stroke_ellipse(x1, y1, x2, y2, 2, Rgba::BLACK);
    }
    apply_noise(
        canvas,
        x_min,
        y_min,
        x_max,
        y_max,
        CLUSTER_NOISE_PADDING,
        FEATURE_NOISE_AMPLITUDE,
        rng,
    );
}

/// Scatter small randomly colored outlined dots across the whole canvas.
/// Decorative only; no clustering, no layering, no noise pass.
pub fn scatter_flowers(canvas: &mut Canvas, count: u32, rng: &mut ChaCha8Rng) {
    for _ in 0..count {
        let center = random_center(canvas, rng);
        let radius = rng.gen_range(FLOWER_RADIUS.0..=FLOWER_RADIUS.1);
        let hue = rng.gen_range(0.0..360.0f32);
        let (r, g, b) = hsv_to_rgb(hue, 0.6, 1.0);
        canvas.fill_disc(center, radius, Rgba::opaque(r, g, b));
        canvas.stroke_ellipse(
            center.x - radius,
            center.y - radius,
            center.x + radius,
            center.y + radius,
            1,
            Rgba::BLACK,
        );
    }
}

/// Place the fixed count of rock clusters.
pub fn place_rocks(canvas: &mut Canvas, rng: &mut ChaCha8Rng) {
    for _ in 0..ROCK_CLUSTER_COUNT {
        let vertex_count = *ROCK_VERTEX_CHOICES
            .choose(rng)
            .unwrap_or(&ROCK_VERTEX_CHOICES[0]);
        polygon_cluster(canvas, &ROCK_LAYERS, vertex_count, rng);
    }
}

/// Place `count` tree clusters (reference range 30-100).
pub fn place_trees(canvas: &mut Canvas, count: u32, rng: &mut ChaCha8Rng) {
    for _ in 0..count {
        star_cluster(canvas, &TREE_LAYERS, rng);
    }
}
