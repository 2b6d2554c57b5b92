use std::collections::HashSet;
use std::error::Error;

use clap::Parser;
use rayon::prelude::*;

use polyterra::config::WorldConfig;
use polyterra::export;
use polyterra::mesh::Rect;
use polyterra::pipeline::WorldGenerator;

#[derive(Parser, Debug)]
#[command(name = "polyterra")]
#[command(about = "Generate polygon-mesh terrain with cached per-sector elevation models")]
struct Args {
    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// World width in regions
    #[arg(short = 'W', long, default_value = "4")]
    width: i32,

    /// World height in regions
    #[arg(short = 'H', long, default_value = "4")]
    height: i32,

    /// Region size in sectors per axis
    #[arg(short = 'r', long, default_value = "2")]
    region_sectors: u32,

    /// JSON config file overriding generation parameters
    #[arg(short, long)]
    config: Option<String>,

    /// Output PNG path
    #[arg(short, long, default_value = "elevation.png")]
    out: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let seed = args.seed.unwrap_or_else(rand::random);
    let config = match &args.config {
        Some(path) => WorldConfig::from_json_file(path)?,
        None => WorldConfig::default(),
    };

    let region_size = config.sector_size * args.region_sectors;
    println!("Generating world with seed: {}", seed);
    println!(
        "World size: {}x{} regions of {}x{} world units",
        args.width, args.height, region_size, region_size
    );

    let generator = WorldGenerator::new(seed, config);

    let mut region_bounds = Vec::new();
    for ry in 0..args.height {
        for rx in 0..args.width {
            region_bounds.push(Rect::new(
                rx * region_size as i32,
                ry * region_size as i32,
                region_size,
                region_size,
            ));
        }
    }

    // Region passes are independent; the generator's caches are shared.
    let regions = region_bounds
        .par_iter()
        .map(|&bounds| generator.generate(bounds))
        .collect::<Result<Vec<_>, _>>()?;

    let mut distinct = HashSet::new();
    let mut lookups = 0usize;
    let mut missing = 0usize;
    for region in &regions {
        let graphs = region.graphs()?;
        let elevation = region.elevation()?;
        for graph in graphs.graphs() {
            lookups += 1;
            distinct.insert(graph.id());
            if elevation.get(graph.id()).is_none() {
                missing += 1;
            }
        }
    }
    println!(
        "Processed {} regions: {} graph lookups across {} distinct sectors",
        regions.len(),
        lookups,
        distinct.len()
    );
    if missing > 0 {
        println!("Warning: {} graphs are missing an elevation model", missing);
    }

    export::export_elevation(&regions, &args.out)?;
    println!("Elevation map written to {}", args.out);

    Ok(())
}
