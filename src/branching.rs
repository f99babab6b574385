//! Branching stochastic path generation for rivers and roads.
//!
//! A branch is one recursive call: it walks from a start point along a
//! wandering bearing, appending a polyline point per step, and on each step
//! draws a single integer to pick terminate / spawn child / widen into a
//! pool / keep going. All branches are buffered before any drawing so the
//! layered render style can underlay and shade the whole tree.

use crate::canvas::Canvas;
use crate::color::{hsv_to_rgb, rgb_to_hsv, Rgba};
use crate::geometry::{Path, Point};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderStyle {
    /// Stroke each branch directly with its own width and color.
    Flat,
    /// Black underlay at width+2, then decreasing-width overlays with the
    /// color value attenuated by `v / i^0.3` for stroke width i.
    Layered,
}

/// Tunable constants of the generator. The probability and jitter values
/// vary between map styles; these defaults are the river/road tuning.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct BranchParams {
    /// One decision integer is drawn from `0..=terminate_odds` per step:
    /// 0 terminates the branch, 1 spawns a child, 2 records a pool.
    pub terminate_odds: u32,
    /// Bearing jitter applied every continuing step, in +/- degrees.
    pub continue_jitter_deg: i32,
    /// Extra bearing jitter given to a spawned child, in +/- degrees.
    pub branch_jitter_deg: i32,
    /// Segment length range for steps after the first.
    pub segment_len: (i32, i32),
    /// Segment length range for the first step of a branch.
    pub initial_len: (i32, i32),
    /// Start bearing jitter around the direction to canvas center.
    pub start_jitter_deg: i32,
    /// Branches narrower than this are not spawned.
    pub min_width: u32,
    /// Maximum recursion depth.
    pub max_depth: u32,
    /// Hard cap on steps per branch; guarantees termination.
    pub max_steps: u32,
    /// Walk margin outside the canvas, in pixels.
    pub margin: i32,
    pub style: RenderStyle,
}

impl Default for BranchParams {
    fn default() -> Self {
        Self {
            terminate_odds: 50,
            continue_jitter_deg: 10,
            branch_jitter_deg: 20,
            segment_len: (20, 200),
            initial_len: (100, 150),
            start_jitter_deg: 45,
            min_width: 5,
            max_depth: 3,
            max_steps: 10_000,
            margin: 10,
            style: RenderStyle::Layered,
        }
    }
}

/// All branches of one generation, in commit order (children before their
/// parent), plus the pools recorded along the way.
#[derive(Clone, Debug, Default)]
pub struct GeneratedPaths {
    pub branches: Vec<Path>,
    pub pools: Vec<(Point, u32)>,
}

/// Pick a start point just outside a random canvas edge and a bearing toward
/// the canvas center perturbed by the start jitter.
pub fn start_point(
    width: u32,
    height: u32,
    params: &BranchParams,
    rng: &mut ChaCha8Rng,
) -> (Point, f64) {
    let w = width as i32;
    let h = height as i32;
    let point = match rng.gen_range(0..4) {
        0 => Point::new(rng.gen_range(0..=w), -params.margin),
        1 => Point::new(rng.gen_range(0..=w), h + params.margin),
        2 => Point::new(-params.margin, rng.gen_range(0..=h)),
        _ => Point::new(w + params.margin, rng.gen_range(0..=h)),
    };
    let center = Point::new(w / 2, h / 2);
    let bearing = point.angle_between(center)
        + rng.gen_range(-params.start_jitter_deg..=params.start_jitter_deg) as f64;
    (point, bearing)
}

/// Generate the full branch tree starting at `start` with `start_angle`.
pub fn generate(
    width: u32,
    height: u32,
    start: Point,
    start_angle: f64,
    stroke_width: u32,
    params: &BranchParams,
    rng: &mut ChaCha8Rng,
) -> GeneratedPaths {
    let mut out = GeneratedPaths::default();
    grow(width, height, start, start_angle, stroke_width, 0, params, rng, &mut out);
    out
}

#[allow(clippy::too_many_arguments)]
fn grow(
    width: u32,
    height: u32,
    start: Point,
    start_angle: f64,
    stroke_width: u32,
    depth: u32,
    params: &BranchParams,
    rng: &mut ChaCha8Rng,
    out: &mut GeneratedPaths,
) {
    if depth > params.max_depth || stroke_width < params.min_width {
        return;
    }
    let mut point = start;
    let mut angle = start_angle;
    let mut length = rng.gen_range(params.initial_len.0..=params.initial_len.1);
    let mut path = Path::new(stroke_width);
    path.add_point(point);

    for _ in 0..params.max_steps {
        let next = point.add_polar(length as f64, angle);
        let clamped = clamp_to_margin(next, width, height, params.margin);
        path.add_point(clamped);
        if clamped != next {
            // Left the expanded bounds; commit up to the crossing.
            break;
        }
        point = next;

        match rng.gen_range(0..=params.terminate_odds) {
            0 => break,
            1 => {
                let child_angle = angle
                    + rng.gen_range(-params.branch_jitter_deg..=params.branch_jitter_deg) as f64;
                let child_width = (stroke_width * 2 / 3).max(params.min_width);
                grow(
                    width,
                    height,
                    point,
                    child_angle,
                    child_width,
                    depth + 1,
                    params,
                    rng,
                    out,
                );
            }
            2 => out.pools.push((point, stroke_width)),
            _ => {}
        }
        angle += rng.gen_range(-params.continue_jitter_deg..=params.continue_jitter_deg) as f64;
        length = rng.gen_range(params.segment_len.0..=params.segment_len.1);
    }
    out.branches.push(path);
}

fn clamp_to_margin(point: Point, width: u32, height: u32, margin: i32) -> Point {
    Point::new(
        point.x.clamp(-margin, width as i32 + margin),
        point.y.clamp(-margin, height as i32 + margin),
    )
}

/// Render a buffered generation onto the canvas.
pub fn render(canvas: &mut Canvas, generated: &GeneratedPaths, color: Rgba, style: RenderStyle) {
    match style {
        RenderStyle::Flat => {
            for branch in &generated.branches {
                canvas.draw_polyline(&branch.points, branch.width, color);
            }
            for &(point, width) in &generated.pools {
                canvas.fill_disc(point, width as i32, color);
            }
        }
        RenderStyle::Layered => {
            for branch in &generated.branches {
                canvas.draw_polyline(&branch.points, branch.width + 2, Rgba::BLACK);
            }
            let (h, s, v) = rgb_to_hsv(color);
            for branch in &generated.branches {
                for i in (1..=branch.width).rev() {
                    let (r, g, b) = hsv_to_rgb(h, s, v / (i as f32).powf(0.3));
                    let shade = Rgba::new(r, g, b, color.a);
                    canvas.draw_polyline(&branch.points, i, shade);
                }
            }
            for &(point, width) in &generated.pools {
                canvas.fill_disc(point, width as i32 + 2, Rgba::BLACK);
                canvas.fill_disc(point, width as i32, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn params() -> BranchParams {
        BranchParams::default()
    }

    #[test]
    fn test_start_point_sits_on_expanded_border() {
        let p = params();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..50 {
            let (point, _) = start_point(300, 200, &p, &mut rng);
            let on_x_edge = point.x == -10 || point.x == 310;
            let on_y_edge = point.y == -10 || point.y == 210;
            assert!(on_x_edge || on_y_edge, "start {point:?} not on a border");
        }
    }

    #[test]
    fn test_start_bearing_points_inward() {
        let p = params();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        for _ in 0..50 {
            let (point, bearing) = start_point(300, 200, &p, &mut rng);
            let center = Point::new(150, 100);
            let direct = point.angle_between(center);
            let mut delta = (bearing - direct) % 360.0;
            if delta > 180.0 {
                delta -= 360.0;
            }
            if delta < -180.0 {
                delta += 360.0;
            }
            assert!(delta.abs() <= 45.0, "bearing off by {delta}");
        }
    }

    #[test]
    fn test_all_points_within_margin_bounds() {
        let p = params();
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let (start, angle) = start_point(320, 320, &p, &mut rng);
            let generated = generate(320, 320, start, angle, 20, &p, &mut rng);
            for branch in &generated.branches {
                for point in &branch.points {
                    assert!(point.x >= -10 && point.x <= 330, "x out of bounds: {point:?}");
                    assert!(point.y >= -10 && point.y <= 330, "y out of bounds: {point:?}");
                }
            }
        }
    }

    #[test]
    fn test_branch_lengths_are_bounded() {
        let mut p = params();
        p.max_steps = 500;
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let generated = generate(2048, 2048, Point::new(-10, 1024), 0.0, 40, &p, &mut rng);
        for branch in &generated.branches {
            assert!(branch.points.len() as u32 <= p.max_steps + 1);
        }
    }

    #[test]
    fn test_depth_and_width_floors_respected() {
        let p = params();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        // A width below the floor produces no branches at all
        let none = generate(320, 320, Point::new(-10, 160), 0.0, 4, &p, &mut rng);
        assert!(none.branches.is_empty());

        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let generated = generate(320, 320, Point::new(-10, 160), 0.0, 20, &p, &mut rng);
        assert!(!generated.branches.is_empty());
        for branch in &generated.branches {
            assert!(branch.width >= p.min_width);
            assert!(branch.width <= 20);
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let p = params();
        let run = |seed: u64| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let (start, angle) = start_point(320, 320, &p, &mut rng);
            generate(320, 320, start, angle, 20, &p, &mut rng)
        };
        let a = run(42);
        let b = run(42);
        assert_eq!(a.branches.len(), b.branches.len());
        assert_eq!(a.pools, b.pools);
        for (ba, bb) in a.branches.iter().zip(&b.branches) {
            assert_eq!(ba.points, bb.points);
            assert_eq!(ba.width, bb.width);
        }
    }

    #[test]
    fn test_layered_render_marks_canvas() {
        let p = params();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let (start, angle) = start_point(200, 200, &p, &mut rng);
        let generated = generate(200, 200, start, angle, 20, &p, &mut rng);
        let mut canvas = Canvas::new(200, 200, Rgba::WHITE);
        render(&mut canvas, &generated, Rgba::opaque(0, 0, 255), RenderStyle::Layered);
        let touched = (0..200)
            .flat_map(|y| (0..200).map(move |x| (x, y)))
            .filter(|&(x, y)| canvas.pixel(x, y) != Some(Rgba::WHITE))
            .count();
        assert!(touched > 0, "river left no pixels on the canvas");
    }
}
