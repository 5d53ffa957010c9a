use std::{
    collections::HashMap,
    env, fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use bevy::math::UVec2;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    cellular::{NeighborSmooth, Replacement},
    heightfield::NoiseSettings,
    hydrology::RiverCarver,
    pipeline::{Algorithm, Pipeline},
    threshold_paint::ThresholdPaint,
    tiles::{GroundTileType, LayerKind, TileRef},
};

pub const BUILTIN_MAP_PRESETS: &str = include_str!("data/map_presets.json");

pub const DEFAULT_PRESET_ID: &str = "island";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MapPresetDimensions {
    pub width: u32,
    pub height: u32,
}

impl MapPresetDimensions {
    pub fn as_uvec2(self) -> UVec2 {
        UVec2::new(self.width, self.height)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MapPreset {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub dimensions: MapPresetDimensions,
    /// Fixed seed; `None` asks for a random one per session.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub layers: Vec<LayerConfig>,
    #[serde(default)]
    pub palette: Vec<PaletteEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LayerConfig {
    pub kind: LayerKind,
    #[serde(default)]
    pub stages: Vec<StageConfig>,
}

impl LayerConfig {
    pub fn build_pipeline(&self, dimensions: UVec2) -> Pipeline {
        let mut pipeline = Pipeline::new().with_dimensions(dimensions);
        for stage in &self.stages {
            pipeline.push_boxed(stage.build());
        }
        pipeline
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaletteEntry {
    pub tile: TileRef,
    pub glyph: char,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum StageConfig {
    ThresholdPaint(ThresholdPaintConfig),
    NeighborSmooth(NeighborSmoothConfig),
    RiverCarver(RiverCarverConfig),
}

impl StageConfig {
    pub fn build(&self) -> Box<dyn Algorithm> {
        match self {
            StageConfig::ThresholdPaint(cfg) => Box::new(ThresholdPaint::new(
                cfg.bands.iter().map(|b| (b.ceiling, b.tile.code())),
                cfg.noise,
            )),
            StageConfig::NeighborSmooth(cfg) => Box::new(NeighborSmooth {
                min_alive: cfg.min_alive,
                repetitions: cfg.repetitions,
                target: cfg.target.code(),
                replacement: match cfg.replacement {
                    ReplacementConfig::DominantNeighbor => Replacement::DominantNeighbor,
                    ReplacementConfig::Fixed(tile) => Replacement::Fixed(tile.code()),
                },
            }),
            StageConfig::RiverCarver(cfg) => Box::new(RiverCarver {
                min_count: cfg.min_count,
                max_count: cfg.max_count,
                min_start_separation: cfg.min_start_separation,
                start_tiles: cfg.starting_tiles.iter().map(|t| t.code()).collect(),
                river_tile: cfg.river_tile.code(),
                terminal_tile: cfg.terminal_tile.code(),
                noise: cfg.noise,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct HeightBand {
    pub ceiling: f32,
    pub tile: TileRef,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThresholdPaintConfig {
    #[serde(default)]
    pub noise: NoiseSettings,
    #[serde(default)]
    pub bands: Vec<HeightBand>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplacementConfig {
    #[default]
    DominantNeighbor,
    Fixed(TileRef),
}

#[derive(Debug, Clone, Deserialize)]
pub struct NeighborSmoothConfig {
    #[serde(default = "default_min_alive")]
    pub min_alive: u32,
    #[serde(default = "default_repetitions")]
    pub repetitions: u32,
    pub target: TileRef,
    #[serde(default)]
    pub replacement: ReplacementConfig,
}

const fn default_min_alive() -> u32 {
    4
}

const fn default_repetitions() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct RiverCarverConfig {
    #[serde(default = "default_river_min_count")]
    pub min_count: u32,
    #[serde(default = "default_river_max_count")]
    pub max_count: u32,
    #[serde(default = "default_river_min_start_separation")]
    pub min_start_separation: f32,
    pub starting_tiles: Vec<TileRef>,
    #[serde(default = "default_river_tile")]
    pub river_tile: TileRef,
    #[serde(default = "default_terminal_tile")]
    pub terminal_tile: TileRef,
    #[serde(default)]
    pub noise: NoiseSettings,
}

const fn default_river_min_count() -> u32 {
    1
}

const fn default_river_max_count() -> u32 {
    3
}

const fn default_river_min_start_separation() -> f32 {
    10.0
}

const fn default_river_tile() -> TileRef {
    TileRef(GroundTileType::River.code())
}

const fn default_terminal_tile() -> TileRef {
    TileRef(GroundTileType::DeepWater.code())
}

#[derive(Debug, Clone, Deserialize)]
pub struct MapPresetsFile {
    pub presets: Vec<MapPreset>,
}

#[derive(Debug, Clone)]
pub struct MapPresets {
    by_id: HashMap<String, MapPreset>,
}

impl MapPresets {
    pub fn builtin() -> Arc<Self> {
        Arc::new(
            Self::from_json_str(BUILTIN_MAP_PRESETS).expect("builtin map presets should parse"),
        )
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let parsed: MapPresetsFile = serde_json::from_str(json)?;
        let mut by_id = HashMap::new();
        for p in parsed.presets.into_iter() {
            by_id.insert(p.id.clone(), p);
        }
        Ok(Self { by_id })
    }

    pub fn from_file(path: &Path) -> Result<Self, MapPresetsError> {
        let contents = fs::read_to_string(path).map_err(|source| MapPresetsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let presets = MapPresets::from_json_str(&contents)?;
        Ok(presets)
    }

    pub fn get(&self, id: &str) -> Option<&MapPreset> {
        self.by_id.get(id)
    }

    /// Preset ids in lexical order.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.by_id.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum MapPresetsError {
    #[error("failed to parse map presets: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read map presets from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Loads presets from `MAP_PRESETS_PATH` when set, otherwise the builtin set.
///
/// Returns the path that was used, if any.
pub fn load_map_presets_from_env() -> (Arc<MapPresets>, Option<PathBuf>) {
    if let Some(path) = env::var_os("MAP_PRESETS_PATH").map(PathBuf::from) {
        match MapPresets::from_file(&path) {
            Ok(presets) => {
                tracing::info!(
                    target: "tilegen::config",
                    path = %path.display(),
                    presets = presets.len(),
                    "map_presets.loaded=file"
                );
                return (Arc::new(presets), Some(path));
            }
            Err(err) => {
                tracing::warn!(
                    target: "tilegen::config",
                    path = %path.display(),
                    error = %err,
                    "map_presets.load_failed"
                );
            }
        }
    }

    let presets = MapPresets::builtin();
    tracing::info!(
        target: "tilegen::config",
        presets = presets.len(),
        "map_presets.loaded=builtin"
    );
    (presets, None)
}
