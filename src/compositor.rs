//! Map generation orchestration.
//!
//! One request in, one finished canvas plus prompt pair out. Everything
//! stochastic draws from a single ChaCha stream seeded exactly once at the
//! start of the call, in a fixed order: background, flowers, rivers, roads,
//! rocks, trees. Reproducibility depends on that order, so feature gating
//! skips a feature's draws entirely rather than discarding them.

use crate::branching::{self, BranchParams};
use crate::canvas::Canvas;
use crate::clusters;
use crate::color::{parse_color, Rgba};
use crate::compass::{self, CompassSpec};
use crate::error::ConfigError;
use crate::grid::{self, GridSpec};
use crate::texture::{apply_noise, BACKGROUND_NOISE_AMPLITUDE};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

const RIVER_COLOR: Rgba = Rgba::opaque(0, 0, 255);
const ROAD_COLOR: Rgba = Rgba::opaque(139, 69, 19);
const PATH_STROKE_WIDTH: u32 = 20;

/// Spacing of the mottled background dots, in pixels.
const BACKGROUND_DOT_STEP: i32 = 10;
const BACKGROUND_DOT_RADIUS: i32 = 4;
const BACKGROUND_DOT_JITTER: i32 = 100;

/// One map generation request.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MapRequest {
    /// Caller seed; `None` reseeds once from system entropy.
    pub seed: Option<u64>,
    /// Map width in grid cells (10-128).
    pub grid_width: u32,
    /// Map height in grid cells (10-128).
    pub grid_height: u32,
    /// Pixels per grid cell (10-2048).
    pub grid_side: u32,
    /// `#RRGGBB` or a named color.
    pub background_color: String,
    pub flowers: bool,
    pub river: bool,
    pub road: bool,
    pub rocks: bool,
    pub trees: bool,
    /// Number of tree clusters when `trees` is set (reference 30-100).
    pub tree_count: u32,
    /// Number of flower dots when `flowers` is set.
    pub flower_count: u32,
    pub branch: BranchParams,
    /// Coordinate grid overlay, drawn after all features when present.
    pub grid: Option<GridSpec>,
    /// Compass rose overlay, drawn last when present.
    pub compass: Option<CompassSpec>,
}

impl Default for MapRequest {
    fn default() -> Self {
        Self {
            seed: None,
            grid_width: 24,
            grid_height: 32,
            grid_side: 32,
            background_color: "lightgreen".to_string(),
            flowers: false,
            river: true,
            road: true,
            rocks: true,
            trees: true,
            tree_count: 30,
            flower_count: 300,
            branch: BranchParams::default(),
            grid: None,
            compass: None,
        }
    }
}

impl MapRequest {
    /// Check the documented input ranges. Violations abort the call before
    /// any canvas is allocated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        range_check("grid_width", self.grid_width as i64, 10, 128)?;
        range_check("grid_height", self.grid_height as i64, 10, 128)?;
        range_check("grid_side", self.grid_side as i64, 10, 2048)?;
        if let Some(grid) = &self.grid {
            range_check("grid_line_width", grid.line_width as i64, 1, 20)?;
        }
        Ok(())
    }
}

fn range_check(field: &'static str, value: i64, min: i64, max: i64) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Finished generation: the raster, its dimensions, and the prompt pair.
pub struct MapOutput {
    pub canvas: Canvas,
    pub seed: u64,
    pub image_width: u32,
    pub image_height: u32,
    pub grid_width: u32,
    pub grid_height: u32,
    pub grid_side: u32,
    pub positive_prompt: String,
    pub negative_prompt: String,
}

/// The numeric/text half of [`MapOutput`], serializable for tooling.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MapMetadata {
    pub seed: u64,
    pub image_width: u32,
    pub image_height: u32,
    pub grid_width: u32,
    pub grid_height: u32,
    pub grid_side: u32,
    pub positive_prompt: String,
    pub negative_prompt: String,
}

impl MapOutput {
    pub fn metadata(&self) -> MapMetadata {
        MapMetadata {
            seed: self.seed,
            image_width: self.image_width,
            image_height: self.image_height,
            grid_width: self.grid_width,
            grid_height: self.grid_height,
            grid_side: self.grid_side,
            positive_prompt: self.positive_prompt.clone(),
            negative_prompt: self.negative_prompt.clone(),
        }
    }
}

/// Run one full generation. Pure computation: the only failure mode is an
/// invalid configuration, checked up front so no partial image is produced.
pub fn generate_map(request: &MapRequest) -> Result<MapOutput, ConfigError> {
    request.validate()?;
    let background = parse_color(&request.background_color)?;
    let width = request.grid_width * request.grid_side;
    let height = request.grid_height * request.grid_side;
    if let Some(spec) = &request.compass {
        // Resolve the keyword now so a bad position aborts before drawing
        compass::parse_position(&spec.position, width, height, spec.size * 2)?;
    }

    let seed = request.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut canvas = Canvas::new(width, height, background);
    generate_background(&mut canvas, background, &mut rng);

    let mut positive = vec![
        "Battlemap, outdoor, old medieval".to_string(),
        "grass background".to_string(),
    ];
    let mut negative = Vec::new();

    if request.flowers {
        clusters::scatter_flowers(&mut canvas, request.flower_count, &mut rng);
        positive.push("small colorful flowers".to_string());
    } else {
        negative.push("flowers".to_string());
    }
    if request.river {
        generate_trace(&mut canvas, RIVER_COLOR, &request.branch, &mut rng);
        positive.push("blue river, water".to_string());
    } else {
        negative.push("river".to_string());
    }
    if request.road {
        generate_trace(&mut canvas, ROAD_COLOR, &request.branch, &mut rng);
        positive.push("saddlebrown road".to_string());
    } else {
        negative.push("road".to_string());
    }
    if request.rocks {
        clusters::place_rocks(&mut canvas, &mut rng);
        positive.push("gray rocks".to_string());
    } else {
        negative.push("rocks".to_string());
    }
    if request.trees {
        clusters::place_trees(&mut canvas, request.tree_count, &mut rng);
        positive.push("green trees".to_string());
    } else {
        negative.push("trees".to_string());
    }

    if let Some(spec) = &request.grid {
        grid::overlay_grid(&mut canvas, spec);
    }
    if let Some(spec) = &request.compass {
        compass::overlay_compass(&mut canvas, spec)?;
    }

    Ok(MapOutput {
        canvas,
        seed,
        image_width: width,
        image_height: height,
        grid_width: request.grid_width,
        grid_height: request.grid_height,
        grid_side: request.grid_side,
        positive_prompt: positive.join(".\n"),
        negative_prompt: negative.join(".\n"),
    })
}

/// Mottled terrain: a coarse lattice of jittered-color dots followed by a
/// full-canvas noise pass.
fn generate_background(canvas: &mut Canvas, background: Rgba, rng: &mut ChaCha8Rng) {
    let width = canvas.width as i32;
    let height = canvas.height as i32;
    let mut x = 0;
    while x < width + BACKGROUND_DOT_STEP {
        let mut y = 0;
        while y < height + BACKGROUND_DOT_STEP {
            let r = dot_channel(background.r, rng);
            let g = dot_channel(background.g, rng);
            let b = dot_channel(background.b, rng);
            canvas.fill_ellipse(
                x - BACKGROUND_DOT_RADIUS,
                y - BACKGROUND_DOT_RADIUS,
                x + BACKGROUND_DOT_RADIUS,
                y + BACKGROUND_DOT_RADIUS,
                Rgba::opaque(r, g, b),
            );
            y += BACKGROUND_DOT_STEP;
        }
        x += BACKGROUND_DOT_STEP;
    }
    apply_noise(
        canvas,
        0,
        0,
        width,
        height,
        0,
        BACKGROUND_NOISE_AMPLITUDE,
        rng,
    );
}

fn dot_channel(value: u8, rng: &mut ChaCha8Rng) -> u8 {
    (value as i32 + rng.gen_range(-BACKGROUND_DOT_JITTER..=BACKGROUND_DOT_JITTER))
        .abs()
        .min(255) as u8
}

/// One river or road: pick a border start, generate the branch tree, render.
fn generate_trace(canvas: &mut Canvas, color: Rgba, params: &BranchParams, rng: &mut ChaCha8Rng) {
    let (start, angle) = branching::start_point(canvas.width, canvas.height, params, rng);
    let generated = branching::generate(
        canvas.width,
        canvas.height,
        start,
        angle,
        PATH_STROKE_WIDTH,
        params,
        rng,
    );
    branching::render(canvas, &generated, color, params.style);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request() -> MapRequest {
        MapRequest {
            seed: Some(42),
            grid_width: 10,
            grid_height: 10,
            grid_side: 10,
            background_color: "#00FF00".to_string(),
            flowers: false,
            river: false,
            road: false,
            rocks: false,
            trees: false,
            tree_count: 5,
            flower_count: 40,
            ..MapRequest::default()
        }
    }

    #[test]
    fn test_generation_is_byte_identical_for_fixed_seed() {
        let mut request = base_request();
        request.river = true;
        request.trees = true;
        let a = generate_map(&request).unwrap();
        let b = generate_map(&request).unwrap();
        assert_eq!(a.canvas.data(), b.canvas.data());
        assert_eq!(a.positive_prompt, b.positive_prompt);
        assert_eq!(a.negative_prompt, b.negative_prompt);
        assert_eq!(a.seed, 42);
    }

    #[test]
    fn test_end_to_end_river_scenario() {
        let request = MapRequest {
            seed: Some(42),
            grid_width: 10,
            grid_height: 10,
            grid_side: 32,
            background_color: "#00FF00".to_string(),
            flowers: false,
            river: true,
            road: false,
            rocks: false,
            trees: false,
            ..MapRequest::default()
        };
        let output = generate_map(&request).unwrap();
        assert_eq!(output.image_width, 320);
        assert_eq!(output.image_height, 320);
        assert_eq!(output.canvas.data().len(), 320 * 320 * 4);

        // Background dots and noise keep green well above zero everywhere,
        // so a strongly blue, green-free pixel must come from the river.
        let mut river_pixels = 0;
        for y in 0..320 {
            for x in 0..320 {
                let p = output.canvas.pixel(x, y).unwrap();
                if p.b > 200 && p.g < 20 && p.r < 20 {
                    river_pixels += 1;
                }
            }
        }
        assert!(river_pixels > 0, "no pixel attributable to the river");

        assert!(output.positive_prompt.contains("river"));
        assert!(!output.positive_prompt.contains("road"));
        assert!(output.negative_prompt.contains("road"));
        assert!(!output.negative_prompt.contains("river"));
    }

    #[test]
    fn test_prompt_feature_consistency() {
        for (river, road, rocks, trees, flowers) in [
            (true, false, true, false, true),
            (false, true, false, true, false),
            (true, true, true, true, true),
            (false, false, false, false, false),
        ] {
            let mut request = base_request();
            request.river = river;
            request.road = road;
            request.rocks = rocks;
            request.trees = trees;
            request.flowers = flowers;
            let output = generate_map(&request).unwrap();
            for (flag, phrase, word) in [
                (flowers, "small colorful flowers", "flowers"),
                (river, "blue river, water", "river"),
                (road, "saddlebrown road", "road"),
                (rocks, "gray rocks", "rocks"),
                (trees, "green trees", "trees"),
            ] {
                if flag {
                    assert!(output.positive_prompt.contains(phrase));
                    assert!(!output.negative_prompt.contains(word));
                } else {
                    assert!(output.negative_prompt.contains(word));
                    assert!(!output.positive_prompt.contains(phrase));
                }
            }
        }
    }

    #[test]
    fn test_prompt_order_matches_feature_order() {
        let mut request = base_request();
        request.flowers = true;
        request.river = true;
        request.road = true;
        request.rocks = true;
        request.trees = true;
        let output = generate_map(&request).unwrap();
        let find = |needle: &str| output.positive_prompt.find(needle).unwrap();
        assert!(find("flowers") < find("river"));
        assert!(find("river") < find("road"));
        assert!(find("road") < find("rocks"));
        assert!(find("rocks") < find("trees"));
    }

    #[test]
    fn test_out_of_range_dimensions_rejected() {
        let mut request = base_request();
        request.grid_width = 5;
        assert!(matches!(
            generate_map(&request),
            Err(ConfigError::OutOfRange { field: "grid_width", .. })
        ));

        let mut request = base_request();
        request.grid_side = 4096;
        assert!(matches!(
            generate_map(&request),
            Err(ConfigError::OutOfRange { field: "grid_side", .. })
        ));
    }

    #[test]
    fn test_bad_background_color_aborts() {
        let mut request = base_request();
        request.background_color = "chartreuse-ish".to_string();
        assert!(matches!(
            generate_map(&request),
            Err(ConfigError::UnknownColor(_))
        ));
    }

    #[test]
    fn test_bad_compass_position_aborts_before_drawing() {
        let mut request = base_request();
        request.compass = Some(CompassSpec::new("everywhere", 20, 0));
        assert!(matches!(
            generate_map(&request),
            Err(ConfigError::UnknownPosition(_))
        ));
    }

    #[test]
    fn test_grid_overlay_draws_on_top() {
        use crate::grid::{GridSpec, GridType};
        let mut request = base_request();
        request.grid = Some(GridSpec::new(
            GridType::Square,
            10,
            1,
            Rgba::opaque(255, 0, 255),
        ));
        let output = generate_map(&request).unwrap();
        // Center vertical line must survive on top of the background
        let p = output.canvas.pixel(50, 3).unwrap();
        assert_eq!(p, Rgba::opaque(255, 0, 255));
    }

    #[test]
    fn test_metadata_serializes() {
        let output = generate_map(&base_request()).unwrap();
        let json = serde_json::to_string(&output.metadata()).unwrap();
        let back: MapMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back.seed, 42);
        assert_eq!(back.image_width, 100);
        assert_eq!(back.positive_prompt, output.positive_prompt);
    }

    #[test]
    fn test_unseeded_request_still_generates() {
        let mut request = base_request();
        request.seed = None;
        let output = generate_map(&request).unwrap();
        assert_eq!(output.image_width, 100);
    }
}
