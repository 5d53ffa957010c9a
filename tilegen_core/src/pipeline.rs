use std::{fmt, time::Instant};

use bevy::math::UVec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::{
    grid::TileGrid,
    tiles::{LayerKind, TileCode},
};

/// Random stream threaded through every stage of a generation run.
pub type SessionRng = ChaCha8Rng;

pub fn session_rng(seed: u64) -> SessionRng {
    ChaCha8Rng::seed_from_u64(seed)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("grid is {actual} but the pipeline is configured for {expected}")]
    DimensionMismatch { expected: UVec2, actual: UVec2 },
    #[error("map dimensions must be positive, got {width}x{height}")]
    EmptyDimensions { width: u32, height: u32 },
    #[error("duplicate layer kind `{0}`")]
    DuplicateLayer(LayerKind),
    #[error("duplicate palette entry for tile code {0}")]
    DuplicatePaletteCode(TileCode),
    #[error("unknown map preset `{0}`")]
    UnknownPreset(String),
}

/// One unit of work that reads and mutates a grid in place.
pub trait Algorithm: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, grid: &mut TileGrid, rng: &mut SessionRng) -> Result<(), GenerationError>;
}

/// Ordered list of stages applied to one grid.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Algorithm>>,
    dimensions: Option<UVec2>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .field("dimensions", &self.dimensions)
            .finish()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject grids whose size differs from `dimensions` when run.
    pub fn with_dimensions(mut self, dimensions: UVec2) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    pub fn with_stage(mut self, stage: impl Algorithm + 'static) -> Self {
        self.push(stage);
        self
    }

    pub fn push(&mut self, stage: impl Algorithm + 'static) {
        self.stages.push(Box::new(stage));
    }

    pub fn push_boxed(&mut self, stage: Box<dyn Algorithm>) {
        self.stages.push(stage);
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Applies every stage with a fresh stream seeded from the grid's seed.
    pub fn run(&self, grid: &mut TileGrid) -> Result<(), GenerationError> {
        let mut rng = session_rng(grid.seed());
        self.run_with(grid, &mut rng)
    }

    /// Applies every stage in declared order, drawing from `rng`.
    pub fn run_with(
        &self,
        grid: &mut TileGrid,
        rng: &mut SessionRng,
    ) -> Result<(), GenerationError> {
        if let Some(expected) = self.dimensions {
            if expected != grid.dimensions() {
                return Err(GenerationError::DimensionMismatch {
                    expected,
                    actual: grid.dimensions(),
                });
            }
        }

        for (index, stage) in self.stages.iter().enumerate() {
            let started = Instant::now();
            stage.apply(grid, rng)?;
            tracing::debug!(
                target: "tilegen::pipeline",
                index,
                stage = stage.name(),
                elapsed_us = started.elapsed().as_micros() as u64,
                "pipeline.stage_applied"
            );
        }
        Ok(())
    }
}
