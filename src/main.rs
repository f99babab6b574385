use battlemap_generator::color::{parse_color, parse_rgba_tuple};
use battlemap_generator::compass::CompassSpec;
use battlemap_generator::compositor::{self, MapRequest};
use battlemap_generator::grid::{GridSpec, GridType};
use clap::Parser;
use std::error::Error;
use std::fs;

#[derive(Parser, Debug)]
#[command(name = "battlemap_generator")]
#[command(about = "Generate procedural top-down tabletop battlemaps")]
struct Args {
    /// Random seed (-1 or unset picks a random seed)
    #[arg(short, long)]
    seed: Option<i64>,

    /// Map width in grid cells
    #[arg(short = 'W', long, default_value = "24")]
    grid_width: u32,

    /// Map height in grid cells
    #[arg(short = 'H', long, default_value = "32")]
    grid_height: u32,

    /// Pixels per grid cell
    #[arg(long, default_value = "32")]
    grid_side: u32,

    /// Background color (#RRGGBB or a named color)
    #[arg(long, default_value = "lightgreen")]
    bg_color: String,

    /// Skip the river
    #[arg(long)]
    no_river: bool,

    /// Skip the road
    #[arg(long)]
    no_road: bool,

    /// Skip the rock clusters
    #[arg(long)]
    no_rocks: bool,

    /// Skip the tree clusters
    #[arg(long)]
    no_trees: bool,

    /// Scatter decorative flowers
    #[arg(long)]
    flowers: bool,

    /// Number of tree clusters (reference range 30-100)
    #[arg(long, default_value = "30")]
    tree_count: u32,

    /// Overlay a coordinate grid (square, hex-vertical, hex-horizontal)
    #[arg(short = 'g', long)]
    grid: Option<String>,

    /// Grid line width in pixels
    #[arg(long, default_value = "1")]
    grid_line_width: u32,

    /// Grid line color as R,G,B,A
    #[arg(long, default_value = "255,255,255,255")]
    grid_color: String,

    /// Reference grid cells (WxH) to calibrate the overlay against
    #[arg(long)]
    reference_grid: Option<String>,

    /// Place a compass rose (center, north, northwest, top-left, ...)
    #[arg(long)]
    compass: Option<String>,

    /// Compass arrow length in pixels
    #[arg(long, default_value = "64")]
    compass_size: i32,

    /// Compass rotation in degrees
    #[arg(long, default_value = "0")]
    compass_rotation: i32,

    /// Load the whole request from a JSON file instead of flags
    #[arg(long)]
    request: Option<String>,

    /// Output PNG path
    #[arg(short, long, default_value = "battlemap.png")]
    output: String,

    /// Write generation metadata (dimensions, prompts) as JSON
    #[arg(long)]
    metadata: Option<String>,
}

fn request_from_args(args: &Args) -> Result<MapRequest, Box<dyn Error>> {
    let mut request = MapRequest {
        seed: match args.seed {
            None | Some(-1) => None,
            Some(s) => Some(s as u64),
        },
        grid_width: args.grid_width,
        grid_height: args.grid_height,
        grid_side: args.grid_side,
        background_color: args.bg_color.clone(),
        flowers: args.flowers,
        river: !args.no_river,
        road: !args.no_road,
        rocks: !args.no_rocks,
        trees: !args.no_trees,
        tree_count: args.tree_count,
        ..MapRequest::default()
    };
    if let Some(grid_type) = &args.grid {
        let mut spec = GridSpec::new(
            grid_type.parse::<GridType>()?,
            args.grid_side,
            args.grid_line_width,
            parse_rgba_tuple(&args.grid_color)?,
        );
        if let Some(reference) = &args.reference_grid {
            spec.reference_grid = Some(parse_cell_pair(reference)?);
        }
        request.grid = Some(spec);
    }
    if let Some(position) = &args.compass {
        request.compass = Some(CompassSpec::new(
            position,
            args.compass_size,
            args.compass_rotation,
        ));
    }
    // Fail early on an unresolvable color, before any generation work
    parse_color(&request.background_color)?;
    Ok(request)
}

fn parse_cell_pair(s: &str) -> Result<(u32, u32), Box<dyn Error>> {
    let (w, h) = s
        .split_once('x')
        .ok_or_else(|| format!("expected WxH, got {s:?}"))?;
    Ok((w.trim().parse()?, h.trim().parse()?))
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let request = match &args.request {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => request_from_args(&args)?,
    };

    println!(
        "Generating {}x{} cell battlemap ({} px/cell)...",
        request.grid_width, request.grid_height, request.grid_side
    );
    let output = compositor::generate_map(&request)?;
    println!("Seed: {}", output.seed);
    println!("Image: {}x{} px", output.image_width, output.image_height);

    output.canvas.to_image().save(&args.output)?;
    println!("Saved {}", args.output);

    if let Some(path) = &args.metadata {
        let json = serde_json::to_string_pretty(&output.metadata())?;
        fs::write(path, json)?;
        println!("Wrote metadata to {path}");
    }

    println!("Positive prompt:\n{}", output.positive_prompt);
    println!("Negative prompt:\n{}", output.negative_prompt);
    Ok(())
}
