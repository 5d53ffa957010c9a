use bevy::{
    math::{IVec2, UVec2},
    prelude::Resource,
};

use crate::tiles::{TileCode, EMPTY_TILE};

/// Fixed-size, row-major buffer of tile codes shared by every stage of a pipeline.
///
/// Coordinates are signed so callers can probe past the edges: reads outside the
/// grid return [`EMPTY_TILE`] and writes outside the grid are ignored.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    width: u32,
    height: u32,
    seed: u64,
    cells: Vec<TileCode>,
}

impl TileGrid {
    pub fn new(width: u32, height: u32, seed: u64) -> Self {
        Self {
            width,
            height,
            seed,
            cells: vec![EMPTY_TILE; (width as usize) * (height as usize)],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn dimensions(&self) -> UVec2 {
        UVec2::new(self.width, self.height)
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn cells(&self) -> &[TileCode] {
        &self.cells
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.in_bounds(x, y)
            .then(|| y as usize * self.width as usize + x as usize)
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> TileCode {
        self.index(x, y).map_or(EMPTY_TILE, |i| self.cells[i])
    }

    #[inline]
    pub fn set(&mut self, x: i32, y: i32, code: TileCode) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = code;
        }
    }

    #[inline]
    pub fn get_at(&self, pos: IVec2) -> TileCode {
        self.get(pos.x, pos.y)
    }

    #[inline]
    pub fn set_at(&mut self, pos: IVec2, code: TileCode) {
        self.set(pos.x, pos.y, code);
    }

    pub fn fill(&mut self, code: TileCode) {
        self.cells.fill(code);
    }

    /// In-bounds 8-neighbourhood of `(x, y)`.
    ///
    /// Order is x outer, y inner, both ascending:
    /// `(x-1,y-1) (x-1,y) (x-1,y+1) (x,y-1) (x,y+1) (x+1,y-1) (x+1,y) (x+1,y+1)`.
    /// Smoothing tie-breaks depend on it.
    pub fn neighbors8(&self, x: i32, y: i32) -> Vec<(IVec2, TileCode)> {
        let mut out = Vec::with_capacity(8);
        for dx in -1..=1 {
            for dy in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let (Some(nx), Some(ny)) = (x.checked_add(dx), y.checked_add(dy)) else {
                    continue;
                };
                if let Some(i) = self.index(nx, ny) {
                    out.push((IVec2::new(nx, ny), self.cells[i]));
                }
            }
        }
        out
    }

    /// In-bounds orthogonal neighbours in the order west, east, south, north
    /// (`(x-1,y) (x+1,y) (x,y-1) (x,y+1)`).
    pub fn neighbors4(&self, x: i32, y: i32) -> Vec<(IVec2, TileCode)> {
        [
            (x.checked_sub(1), Some(y)),
            (x.checked_add(1), Some(y)),
            (Some(x), y.checked_sub(1)),
            (Some(x), y.checked_add(1)),
        ]
        .into_iter()
        .filter_map(|p| match p {
            (Some(nx), Some(ny)) => Some(IVec2::new(nx, ny)),
            _ => None,
        })
        .filter_map(|p| self.index(p.x, p.y).map(|i| (p, self.cells[i])))
        .collect()
    }

    /// Every position whose code is in `codes`, scanned x outer, y inner.
    pub fn positions_of_types(&self, codes: &[TileCode]) -> Vec<IVec2> {
        let mut out = Vec::new();
        for x in 0..self.width as i32 {
            for y in 0..self.height as i32 {
                if codes.contains(&self.get(x, y)) {
                    out.push(IVec2::new(x, y));
                }
            }
        }
        out
    }

    /// Nearest cell holding `code`; the first one scanned wins ties.
    pub fn closest_of_type(&self, from: IVec2, code: TileCode) -> Option<IVec2> {
        let mut best: Option<(i128, IVec2)> = None;
        for x in 0..self.width as i32 {
            for y in 0..self.height as i32 {
                if self.get(x, y) != code {
                    continue;
                }
                let dx = x as i128 - from.x as i128;
                let dy = y as i128 - from.y as i128;
                let dist_sq = dx * dx + dy * dy;
                if best.map_or(true, |(d, _)| dist_sq < d) {
                    best = Some((dist_sq, IVec2::new(x, y)));
                }
            }
        }
        best.map(|(_, p)| p)
    }

    pub fn count_of(&self, code: TileCode) -> usize {
        self.cells.iter().filter(|&&c| c == code).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_reads_are_empty_and_writes_are_ignored() {
        let mut grid = TileGrid::new(4, 3, 7);
        grid.fill(5);
        let before = grid.clone();

        for (x, y) in [(-1, 0), (0, -1), (4, 0), (0, 3), (i32::MIN, i32::MAX)] {
            assert_eq!(grid.get(x, y), EMPTY_TILE);
            grid.set(x, y, 9);
        }
        assert_eq!(grid, before);

        grid.set(3, 2, 9);
        assert_eq!(grid.get(3, 2), 9);
        assert_eq!(grid.cells()[2 * 4 + 3], 9);
    }

    #[test]
    fn neighbour_counts_depend_on_position() {
        let grid = TileGrid::new(5, 5, 0);
        assert_eq!(grid.neighbors8(0, 0).len(), 3);
        assert_eq!(grid.neighbors8(2, 0).len(), 5);
        assert_eq!(grid.neighbors8(2, 2).len(), 8);
        assert_eq!(grid.neighbors4(0, 0).len(), 2);
        assert_eq!(grid.neighbors4(0, 2).len(), 3);
        assert_eq!(grid.neighbors4(2, 2).len(), 4);
    }

    #[test]
    fn queries_at_coordinate_extremes_do_not_overflow() {
        let mut grid = TileGrid::new(4, 4, 0);
        grid.fill(2);

        assert!(grid.neighbors8(i32::MAX, 0).is_empty());
        assert!(grid.neighbors8(i32::MIN, i32::MAX).is_empty());
        assert!(grid.neighbors4(i32::MIN, 0).is_empty());
        assert!(grid.neighbors4(0, i32::MAX).is_empty());

        // (-1, 0) is still a valid origin: its eastern neighbours are in bounds.
        assert_eq!(grid.neighbors8(-1, 0).len(), 2);
        assert_eq!(grid.neighbors4(-1, 0).len(), 1);

        assert_eq!(
            grid.closest_of_type(IVec2::new(i32::MIN, i32::MAX), 2),
            Some(IVec2::new(0, 3))
        );
        assert_eq!(
            grid.closest_of_type(IVec2::new(i32::MAX, i32::MIN), 2),
            Some(IVec2::new(3, 0))
        );
    }

    #[test]
    fn neighbour_order_is_stable() {
        let grid = TileGrid::new(3, 3, 0);
        let eight: Vec<IVec2> = grid.neighbors8(1, 1).into_iter().map(|(p, _)| p).collect();
        assert_eq!(
            eight,
            vec![
                IVec2::new(0, 0),
                IVec2::new(0, 1),
                IVec2::new(0, 2),
                IVec2::new(1, 0),
                IVec2::new(1, 2),
                IVec2::new(2, 0),
                IVec2::new(2, 1),
                IVec2::new(2, 2),
            ]
        );
        let four: Vec<IVec2> = grid.neighbors4(1, 1).into_iter().map(|(p, _)| p).collect();
        assert_eq!(
            four,
            vec![
                IVec2::new(0, 1),
                IVec2::new(2, 1),
                IVec2::new(1, 0),
                IVec2::new(1, 2),
            ]
        );
    }

    #[test]
    fn type_queries_scan_column_major() {
        let mut grid = TileGrid::new(3, 3, 0);
        grid.set(2, 0, 4);
        grid.set(0, 2, 4);
        grid.set(1, 1, 6);

        assert_eq!(
            grid.positions_of_types(&[4, 6]),
            vec![IVec2::new(0, 2), IVec2::new(1, 1), IVec2::new(2, 0)]
        );
        assert_eq!(grid.count_of(4), 2);
        assert_eq!(grid.closest_of_type(IVec2::new(2, 1), 4), Some(IVec2::new(2, 0)));
        assert_eq!(grid.closest_of_type(IVec2::new(0, 0), 9), None);
    }
}
