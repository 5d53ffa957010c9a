use std::collections::BTreeMap;

use bevy::{math::UVec2, prelude::Resource};
use rand::Rng;

use crate::{
    grid::TileGrid,
    map_preset::MapPreset,
    pipeline::{session_rng, GenerationError, Pipeline},
    tiles::{LayerKind, TileCode, EMPTY_TILE},
};

/// Upper bound (exclusive) for seeds picked when a preset does not fix one.
pub const RANDOM_SEED_RANGE: u64 = 100_000;

pub fn random_seed() -> u64 {
    rand::thread_rng().gen_range(0..RANDOM_SEED_RANGE)
}

/// Every layer of a generated map, keyed by kind.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMap {
    pub seed: u64,
    pub width: u32,
    pub height: u32,
    layers: BTreeMap<LayerKind, TileGrid>,
}

impl GeneratedMap {
    pub fn layer(&self, kind: LayerKind) -> Option<&TileGrid> {
        self.layers.get(&kind)
    }

    pub fn layers(&self) -> impl Iterator<Item = (LayerKind, &TileGrid)> {
        self.layers.iter().map(|(k, g)| (*k, g))
    }

    /// Object code when one is present, otherwise the ground code.
    pub fn composite_code(&self, x: i32, y: i32) -> TileCode {
        let object = self
            .layer(LayerKind::Object)
            .map_or(EMPTY_TILE, |g| g.get(x, y));
        if object != EMPTY_TILE {
            return object;
        }
        self.layer(LayerKind::Ground)
            .map_or(EMPTY_TILE, |g| g.get(x, y))
    }
}

/// One map generation run: a seed, fixed dimensions and a pipeline per layer.
#[derive(Debug)]
pub struct MapSession {
    seed: u64,
    dimensions: UVec2,
    layers: Vec<(LayerKind, Pipeline)>,
}

impl MapSession {
    /// Seed precedence: `seed_override`, then the preset's seed, then a random one.
    pub fn from_preset(
        preset: &MapPreset,
        seed_override: Option<u64>,
    ) -> Result<Self, GenerationError> {
        let dimensions = preset.dimensions.as_uvec2();
        if dimensions.x == 0 || dimensions.y == 0 {
            return Err(GenerationError::EmptyDimensions {
                width: dimensions.x,
                height: dimensions.y,
            });
        }

        let mut layers: Vec<(LayerKind, Pipeline)> = Vec::with_capacity(preset.layers.len());
        for layer in &preset.layers {
            if layers.iter().any(|(kind, _)| *kind == layer.kind) {
                return Err(GenerationError::DuplicateLayer(layer.kind));
            }
            layers.push((layer.kind, layer.build_pipeline(dimensions)));
        }

        let seed = seed_override.or(preset.seed).unwrap_or_else(random_seed);
        Ok(Self {
            seed,
            dimensions,
            layers,
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn dimensions(&self) -> UVec2 {
        self.dimensions
    }

    /// Runs each layer's pipeline in declared order on one shared stream.
    pub fn generate(&self) -> Result<GeneratedMap, GenerationError> {
        let mut rng = session_rng(self.seed);
        let mut layers = BTreeMap::new();
        for (kind, pipeline) in &self.layers {
            let mut grid = TileGrid::new(self.dimensions.x, self.dimensions.y, self.seed);
            pipeline.run_with(&mut grid, &mut rng)?;
            tracing::info!(
                target: "tilegen::pipeline",
                layer = %kind,
                stages = pipeline.len(),
                filled = grid.cells().iter().filter(|&&c| c != EMPTY_TILE).count(),
                "map.layer_generated"
            );
            layers.insert(*kind, grid);
        }
        Ok(GeneratedMap {
            seed: self.seed,
            width: self.dimensions.x,
            height: self.dimensions.y,
            layers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map_preset::MapPresets;
    use crate::tiles::{GroundTileType, ObjectTileType};

    fn preset(json_layers: &str, width: u32) -> MapPreset {
        let json = format!(
            r#"{{ "presets": [{{ "id": "p", "name": "P", "seed": 5,
                "dimensions": {{ "width": {width}, "height": 6 }},
                "layers": {json_layers} }}] }}"#
        );
        MapPresets::from_json_str(&json)
            .unwrap()
            .get("p")
            .unwrap()
            .clone()
    }

    const TWO_LAYERS: &str = r#"[
        { "kind": "ground", "stages": [
            { "algorithm": "threshold_paint", "noise": { "scale": 2.5 },
              "bands": [ { "ceiling": 0.5, "tile": "deep_water" }, { "ceiling": 1.0, "tile": "grass" } ] } ] },
        { "kind": "object", "stages": [
            { "algorithm": "threshold_paint", "noise": { "scale": 2.5, "offset": [40.0, 40.0] },
              "bands": [ { "ceiling": 0.6, "tile": "none" }, { "ceiling": 1.0, "tile": "tree" } ] } ] }
    ]"#;

    #[test]
    fn seed_precedence() {
        let p = preset(TWO_LAYERS, 8);
        assert_eq!(MapSession::from_preset(&p, Some(9)).unwrap().seed(), 9);
        assert_eq!(MapSession::from_preset(&p, None).unwrap().seed(), 5);

        let mut unseeded = p.clone();
        unseeded.seed = None;
        let seed = MapSession::from_preset(&unseeded, None).unwrap().seed();
        assert!(seed < RANDOM_SEED_RANGE);
    }

    #[test]
    fn duplicate_layers_are_rejected() {
        let layers = r#"[ { "kind": "ground", "stages": [] }, { "kind": "ground", "stages": [] } ]"#;
        let err = MapSession::from_preset(&preset(layers, 8), None).unwrap_err();
        assert_eq!(err, GenerationError::DuplicateLayer(LayerKind::Ground));
    }

    #[test]
    fn zero_sized_maps_are_rejected() {
        let err = MapSession::from_preset(&preset(TWO_LAYERS, 0), None).unwrap_err();
        assert!(matches!(err, GenerationError::EmptyDimensions { width: 0, .. }));
    }

    #[test]
    fn composite_prefers_objects() {
        let map = MapSession::from_preset(&preset(TWO_LAYERS, 8), None)
            .unwrap()
            .generate()
            .unwrap();
        let ground = map.layer(LayerKind::Ground).unwrap();
        let objects = map.layer(LayerKind::Object).unwrap();
        assert_eq!(map.layers().count(), 2);

        for x in 0..8 {
            for y in 0..6 {
                let g = ground.get(x, y);
                assert!(g == GroundTileType::DeepWater.code() || g == GroundTileType::Grass.code());
                let o = objects.get(x, y);
                assert!(o == EMPTY_TILE || o == ObjectTileType::Tree.code());
                let expected = if o == EMPTY_TILE { g } else { o };
                assert_eq!(map.composite_code(x, y), expected);
            }
        }
        assert_eq!(map.composite_code(-1, 0), EMPTY_TILE);
    }

    #[test]
    fn sessions_with_the_same_seed_match() {
        let p = preset(TWO_LAYERS, 8);
        let a = MapSession::from_preset(&p, None).unwrap().generate().unwrap();
        let b = MapSession::from_preset(&p, None).unwrap().generate().unwrap();
        assert_eq!(a, b);
    }
}
