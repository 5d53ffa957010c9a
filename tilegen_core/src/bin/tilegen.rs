use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use tilegen_core::{
    generate_map, load_map_presets_from_env, render_ascii, GenerationError, LayerKind, MapPresets,
    TileCensus, TilePalette, DEFAULT_PRESET_ID,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate a tile map from a preset and print it", long_about = None)]
struct Cli {
    /// Preset id to generate.
    #[arg(long, default_value = DEFAULT_PRESET_ID)]
    preset: String,
    /// Seed override; defaults to the preset's seed, or a random one.
    #[arg(long)]
    seed: Option<u64>,
    /// Presets file to load instead of `MAP_PRESETS_PATH` or the builtin set.
    #[arg(long)]
    presets_path: Option<PathBuf>,
    /// List the available preset ids and exit.
    #[arg(long)]
    list: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let presets = match &cli.presets_path {
        Some(path) => Arc::new(
            MapPresets::from_file(path)
                .with_context(|| format!("loading presets from {}", path.display()))?,
        ),
        None => load_map_presets_from_env().0,
    };

    if cli.list {
        for id in presets.ids() {
            if let Some(preset) = presets.get(id) {
                let dims = preset.dimensions;
                println!("{id}\t{}x{}\t{}", dims.width, dims.height, preset.name);
            }
        }
        return Ok(());
    }

    let preset = presets
        .get(&cli.preset)
        .ok_or_else(|| GenerationError::UnknownPreset(cli.preset.clone()))
        .with_context(|| format!("available presets: {}", presets.ids().join(", ")))?;

    let map = generate_map(preset, cli.seed)?;
    info!(
        target: "tilegen::pipeline",
        preset = %preset.id,
        seed = map.seed,
        "tilegen.map_ready"
    );

    let palette = if preset.palette.is_empty() {
        TilePalette::standard()
    } else {
        TilePalette::from_entries(&preset.palette)?
    };

    println!("{} (seed {})", preset.name, map.seed);
    print!("{}", render_ascii(&map, &palette));
    for kind in [LayerKind::Ground, LayerKind::Object] {
        if let Some(grid) = map.layer(kind) {
            println!("\n[{kind}]");
            println!("{}", TileCensus::from_grid(grid).summary());
        }
    }
    Ok(())
}
