use bevy::math::IVec2;

use crate::{
    grid::TileGrid,
    pipeline::{Algorithm, GenerationError, SessionRng},
    tiles::TileCode,
};

/// What an under-populated target cell turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replacement {
    Fixed(TileCode),
    DominantNeighbor,
}

/// Cellular-automata pass that removes isolated cells of one tile type.
///
/// Passes mutate the grid in place, so later cells of a pass see the
/// replacements made earlier in the same pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborSmooth {
    pub min_alive: u32,
    pub repetitions: u32,
    pub target: TileCode,
    pub replacement: Replacement,
}

impl NeighborSmooth {
    /// Runs every repetition and returns how many cells changed.
    pub fn smooth(&self, grid: &mut TileGrid) -> usize {
        let mut changed = 0;
        for _ in 0..self.repetitions {
            let mut changed_this_pass = 0;
            for x in 0..grid.width() as i32 {
                for y in 0..grid.height() as i32 {
                    if grid.get(x, y) != self.target {
                        continue;
                    }
                    let neighbors = grid.neighbors8(x, y);
                    let alive = neighbors.iter().filter(|(_, c)| *c == self.target).count();
                    if alive as u32 >= self.min_alive {
                        continue;
                    }
                    let replacement = match self.replacement {
                        Replacement::Fixed(code) => Some(code),
                        Replacement::DominantNeighbor => dominant_code(&neighbors),
                    };
                    if let Some(code) = replacement {
                        if code != self.target {
                            changed_this_pass += 1;
                        }
                        grid.set(x, y, code);
                    }
                }
            }
            changed += changed_this_pass;
            if changed_this_pass == 0 {
                // Nothing moved; further passes would see the same grid.
                break;
            }
        }
        changed
    }
}

/// Most frequent code among `neighbors`; ties go to the code seen first.
pub fn dominant_code(neighbors: &[(IVec2, TileCode)]) -> Option<TileCode> {
    let mut groups: Vec<(TileCode, usize)> = Vec::with_capacity(neighbors.len());
    for &(_, code) in neighbors {
        match groups.iter_mut().find(|(c, _)| *c == code) {
            Some((_, count)) => *count += 1,
            None => groups.push((code, 1)),
        }
    }
    let mut best: Option<(TileCode, usize)> = None;
    for (code, count) in groups {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((code, count));
        }
    }
    best.map(|(code, _)| code)
}

impl Algorithm for NeighborSmooth {
    fn name(&self) -> &'static str {
        "neighbor_smooth"
    }

    fn apply(&self, grid: &mut TileGrid, _rng: &mut SessionRng) -> Result<(), GenerationError> {
        let changed = self.smooth(grid);
        tracing::debug!(
            target: "tilegen::pipeline",
            target_tile = self.target,
            min_alive = self.min_alive,
            repetitions = self.repetitions,
            changed,
            "neighbor_smooth.applied"
        );
        Ok(())
    }
}
