use std::collections::HashSet;

use bevy::math::{IVec2, UVec2};
use rand::Rng;

use crate::{
    grid::TileGrid,
    heightfield::{NoiseField, NoiseSettings},
    pipeline::{Algorithm, GenerationError, SessionRng},
    tiles::{GroundTileType, TileCode},
};

/// Redraws allowed while looking for a start that respects the separation.
pub const MAX_START_ATTEMPTS: usize = 500;
/// Steps a single river may take before it is abandoned.
pub const MAX_TRACE_STEPS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceOutcome {
    ReachedWater,
    DeadEnd,
    StepLimit,
}

/// One river under construction: the ordered descent plus its visited set.
#[derive(Debug, Clone)]
pub struct DownstreamRiver {
    start: IVec2,
    path: Vec<IVec2>,
    visited: HashSet<IVec2>,
}

impl DownstreamRiver {
    pub fn new(start: IVec2) -> Self {
        Self {
            start,
            path: vec![start],
            visited: HashSet::from([start]),
        }
    }

    pub fn start(&self) -> IVec2 {
        self.start
    }

    /// Visited cells in the order they were stepped on, start first.
    pub fn path(&self) -> &[IVec2] {
        &self.path
    }

    pub fn visited(&self) -> &HashSet<IVec2> {
        &self.visited
    }

    /// True when `candidate` lies strictly farther than `min_separation` from
    /// this river's start.
    pub fn is_clear_of(&self, candidate: IVec2, min_separation: f32) -> bool {
        let d = (candidate - self.start).as_vec2();
        d.length_squared() > min_separation * min_separation
    }

    /// Greedy descent: always step onto the lowest unvisited orthogonal
    /// neighbour, stopping on `terminal` water.
    pub fn trace(
        &mut self,
        grid: &TileGrid,
        elevation: &NoiseField,
        terminal: TileCode,
    ) -> TraceOutcome {
        let mut current = self.start;
        for _ in 0..MAX_TRACE_STEPS {
            let mut candidates: Vec<(IVec2, f32)> = grid
                .neighbors4(current.x, current.y)
                .into_iter()
                .map(|(p, _)| (p, elevation.sample(p.x as u32, p.y as u32)))
                .collect();
            // Stable: equal heights keep neighbour order.
            candidates.sort_by(|a, b| a.1.total_cmp(&b.1));

            let Some(&(next, _)) = candidates.iter().find(|(p, _)| !self.visited.contains(p)) else {
                return TraceOutcome::DeadEnd;
            };
            current = next;
            self.visited.insert(next);
            self.path.push(next);

            if grid.get_at(next) == terminal {
                return TraceOutcome::ReachedWater;
            }
        }
        TraceOutcome::StepLimit
    }
}

/// Carves downstream rivers from eligible start tiles into terminal water.
#[derive(Debug, Clone, PartialEq)]
pub struct RiverCarver {
    pub min_count: u32,
    pub max_count: u32,
    pub min_start_separation: f32,
    pub start_tiles: Vec<TileCode>,
    pub river_tile: TileCode,
    pub terminal_tile: TileCode,
    pub noise: NoiseSettings,
}

impl Default for RiverCarver {
    fn default() -> Self {
        Self {
            min_count: 1,
            max_count: 3,
            min_start_separation: 10.0,
            start_tiles: vec![GroundTileType::Stone.code()],
            river_tile: GroundTileType::River.code(),
            terminal_tile: GroundTileType::DeepWater.code(),
            noise: NoiseSettings::default(),
        }
    }
}

impl RiverCarver {
    /// Places rivers over `elevation` and paints them into `grid`.
    ///
    /// Returns the accepted rivers. Falling short of the drawn quota is not an
    /// error.
    pub fn carve(
        &self,
        grid: &mut TileGrid,
        elevation: &NoiseField,
        rng: &mut SessionRng,
    ) -> Result<Vec<DownstreamRiver>, GenerationError> {
        if elevation.width != grid.width() || elevation.height != grid.height() {
            return Err(GenerationError::DimensionMismatch {
                expected: grid.dimensions(),
                actual: UVec2::new(elevation.width, elevation.height),
            });
        }

        let mut pool = grid.positions_of_types(&self.start_tiles);
        let candidates = pool.len();
        let max_count = self.max_count.max(self.min_count);
        let quota = rng.gen_range(self.min_count..=max_count);
        let separation = self.min_start_separation.max(0.0);

        let mut rivers: Vec<DownstreamRiver> = Vec::new();
        let mut dead_ends = 0usize;
        let mut step_limited = 0usize;
        let mut search_exhausted = false;

        for _ in 0..quota {
            let Some(start) = pick_start(&mut pool, &rivers, separation, rng) else {
                search_exhausted = true;
                break;
            };
            let mut river = DownstreamRiver::new(start);
            match river.trace(grid, elevation, self.terminal_tile) {
                TraceOutcome::ReachedWater => rivers.push(river),
                TraceOutcome::DeadEnd => dead_ends += 1,
                TraceOutcome::StepLimit => step_limited += 1,
            }
        }

        for river in &rivers {
            for &pos in river.visited() {
                grid.set_at(pos, self.river_tile);
            }
        }

        tracing::info!(
            target: "tilegen::rivers",
            candidates,
            quota,
            accepted = rivers.len(),
            dead_ends,
            step_limited,
            search_exhausted,
            "rivers.generated"
        );
        Ok(rivers)
    }
}

/// Draws a start from `pool` that is clear of every accepted river start.
///
/// Every draw removes the candidate from the pool, accepted or not.
fn pick_start(
    pool: &mut Vec<IVec2>,
    rivers: &[DownstreamRiver],
    separation: f32,
    rng: &mut SessionRng,
) -> Option<IVec2> {
    if pool.is_empty() {
        return None;
    }
    let mut candidate = pool.remove(rng.gen_range(0..pool.len()));
    let mut attempts = 0;
    while rivers.iter().any(|r| !r.is_clear_of(candidate, separation)) {
        if attempts >= MAX_START_ATTEMPTS || pool.is_empty() {
            return None;
        }
        attempts += 1;
        candidate = pool.remove(rng.gen_range(0..pool.len()));
    }
    Some(candidate)
}

impl Algorithm for RiverCarver {
    fn name(&self) -> &'static str {
        "river_carver"
    }

    fn apply(&self, grid: &mut TileGrid, rng: &mut SessionRng) -> Result<(), GenerationError> {
        let elevation = NoiseField::generate(grid.width(), grid.height(), grid.seed(), &self.noise);
        self.carve(grid, &elevation, rng).map(|_| ())
    }
}
