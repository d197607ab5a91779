//! Terrain generator binary: builds one island mesh and scatters objects on it.
//!
//! Usage: cargo run --release --bin generate_terrain -- [OPTIONS]
//!
//! Options:
//!   --config <PATH>        Load a JSON generation config (default: built-in)
//!   --width <CELLS>        Override terrain width in cells
//!   --depth <CELLS>        Override terrain depth in cells
//!   --seed <SEED>          Override the noise and river seed
//!   --scatter-seed <SEED>  Seed for the scatter random source (default: 12345)
//!   --write-config <PATH>  Save the effective config as JSON
//!   --out <PATH>           Write a JSON manifest of the mesh and placements

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::json;

use islegen::core::Result;
use islegen::generation::{GenerationConfig, RecordingHost, Terrain};

fn main() -> ExitCode {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .format_timestamp_millis()
    .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Generation failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let mut config = match parse_str_arg(&args, "--config") {
        Some(path) => GenerationConfig::load(&PathBuf::from(path))?,
        None => GenerationConfig::default(),
    };
    if let Some(width) = parse_u32_arg(&args, "--width") {
        config.terrain.width = width;
    }
    if let Some(depth) = parse_u32_arg(&args, "--depth") {
        config.terrain.depth = depth;
    }
    if let Some(seed) = parse_u32_arg(&args, "--seed") {
        config.terrain.seed = seed;
    }
    let scatter_seed = parse_u64_arg(&args, "--scatter-seed").unwrap_or(12345);

    if let Some(path) = parse_str_arg(&args, "--write-config") {
        config.save(&PathBuf::from(&path))?;
        println!("Config written to {}", path);
    }

    println!("=== Island Terrain Generator ===");
    println!("Grid:    {} x {} cells", config.terrain.width, config.terrain.depth);
    println!("Seed:    {} (scatter {})", config.terrain.seed, scatter_seed);
    println!("Scale:   {}, Height: {}", config.terrain.scale, config.terrain.height_multiplier);
    println!("Rivers:  {}", config.rivers.count);
    println!("Biomes:  {}", config.biomes.len());
    println!();

    let mut terrain = Terrain::new();
    let mut host = RecordingHost::new();
    let mut rng = ChaCha8Rng::seed_from_u64(scatter_seed);

    let summary = terrain.regenerate(&config, &mut host, &mut rng)?;

    let mut per_prefab: BTreeMap<&str, usize> = BTreeMap::new();
    for instance in terrain.spawned() {
        *per_prefab.entry(instance.placement.prefab.as_str()).or_insert(0) += 1;
    }

    println!("Mesh:    {} vertices, {} triangles, {} river vertices",
        summary.vertex_count, summary.triangle_count, summary.river_vertex_count);
    println!("Bounds:  {:?} .. {:?}", summary.bounds.min, summary.bounds.max);
    println!("Scatter: {} samples, {} placed", summary.scatter.samples, summary.scatter.placed);
    println!("  skipped: {} low blend, {} low height, {} failed chance, {} without prefabs, {} out of range",
        summary.scatter.low_blend,
        summary.scatter.low_height,
        summary.scatter.failed_chance,
        summary.scatter.no_prefabs,
        summary.scatter.out_of_range);
    for (prefab, count) in &per_prefab {
        println!("  {:<16} {}", prefab, count);
    }

    if let Some(path) = parse_str_arg(&args, "--out") {
        let path = PathBuf::from(path);
        let manifest = json!({
            "width": config.terrain.width,
            "depth": config.terrain.depth,
            "seed": config.terrain.seed,
            "scatter_seed": scatter_seed,
            "vertex_count": summary.vertex_count,
            "triangle_count": summary.triangle_count,
            "river_vertex_count": summary.river_vertex_count,
            "bounds": {
                "min": summary.bounds.min.to_array(),
                "max": summary.bounds.max.to_array(),
            },
            "prefab_counts": per_prefab,
            "placements": terrain.spawned().iter().map(|s| {
                json!({
                    "prefab": s.placement.prefab.as_str(),
                    "biome": s.placement.biome_index,
                    "position": s.placement.position.to_array(),
                    "rotation": s.placement.rotation.to_array(),
                })
            }).collect::<Vec<_>>(),
        });

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, serde_json::to_string_pretty(&manifest)?)?;
        println!();
        println!("Manifest: {}", path.display());
    }

    Ok(())
}

fn parse_u32_arg(args: &[String], flag: &str) -> Option<u32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_u64_arg(args: &[String], flag: &str) -> Option<u64> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
