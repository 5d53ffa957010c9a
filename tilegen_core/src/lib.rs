//! Procedural tile-map generation for the headless prototype.
//!
//! A [`MapPreset`] describes the map size and, per layer, an ordered list of
//! generation stages. [`generate_map`] runs those stages on one seeded random
//! stream and returns a [`GeneratedMap`]; [`TerrainGenerationPlugin`] does the
//! same at Bevy startup.

pub mod cellular;
pub mod grid;
pub mod heightfield;
pub mod hydrology;
pub mod map_preset;
pub mod pipeline;
pub mod render;
mod session;
pub mod threshold_paint;
pub mod tiles;

use bevy::prelude::*;

pub use cellular::{NeighborSmooth, Replacement};
pub use grid::TileGrid;
pub use heightfield::{NoiseField, NoiseSettings};
pub use hydrology::{DownstreamRiver, RiverCarver, TraceOutcome};
pub use map_preset::{
    load_map_presets_from_env, MapPreset, MapPresets, MapPresetsError, DEFAULT_PRESET_ID,
};
pub use pipeline::{session_rng, Algorithm, GenerationError, Pipeline, SessionRng};
pub use render::{render_ascii, TileCensus, TilePalette};
pub use session::{random_seed, GeneratedMap, MapSession, RANDOM_SEED_RANGE};
pub use threshold_paint::ThresholdPaint;
pub use tiles::{GroundTileType, LayerKind, ObjectTileType, TileCode, TileRef, EMPTY_TILE};

/// Generates every layer of `preset`.
///
/// `seed` overrides the preset's own seed; with neither, a random seed is used.
pub fn generate_map(
    preset: &MapPreset,
    seed: Option<u64>,
) -> Result<GeneratedMap, GenerationError> {
    MapSession::from_preset(preset, seed)?.generate()
}

/// Preset and seed consumed by [`TerrainGenerationPlugin`] at startup.
#[derive(Resource, Debug, Clone)]
pub struct TerrainSettings {
    pub preset: MapPreset,
    pub seed: Option<u64>,
}

/// Inserts a [`GeneratedMap`] resource built from [`TerrainSettings`] during
/// `Startup`.
pub struct TerrainGenerationPlugin;

impl Plugin for TerrainGenerationPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, generate_terrain);
    }
}

fn generate_terrain(mut commands: Commands, settings: Option<Res<TerrainSettings>>) {
    let Some(settings) = settings else {
        tracing::warn!(target: "tilegen::pipeline", "terrain.settings_missing");
        return;
    };
    match generate_map(&settings.preset, settings.seed) {
        Ok(map) => {
            tracing::info!(
                target: "tilegen::pipeline",
                preset = %settings.preset.id,
                seed = map.seed,
                width = map.width,
                height = map.height,
                "terrain.generated"
            );
            commands.insert_resource(map);
        }
        Err(err) => {
            tracing::error!(
                target: "tilegen::pipeline",
                preset = %settings.preset.id,
                error = %err,
                "terrain.generation_failed"
            );
        }
    }
}

/// Construct a Bevy [`App`] that generates a map from `settings` on its first
/// update.
#[cfg(feature = "headless")]
pub fn build_headless_app(settings: TerrainSettings) -> App {
    let mut app = App::new();
    app.insert_resource(settings)
        .add_plugins(MinimalPlugins)
        .add_plugins(TerrainGenerationPlugin);
    app
}
