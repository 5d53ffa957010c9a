use bevy::math::UVec2;

use crate::{
    grid::TileGrid,
    heightfield::{NoiseField, NoiseSettings},
    pipeline::{Algorithm, GenerationError, SessionRng},
    tiles::{TileCode, EMPTY_TILE},
};

/// Paints tiles from a height field through ascending height bands.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdPaint {
    bands: Vec<(f32, TileCode)>,
    noise: NoiseSettings,
}

impl ThresholdPaint {
    /// Bands are sorted ascending by ceiling; equal ceilings keep their order.
    ///
    /// A band whose tile is [`EMPTY_TILE`] still claims its height range but
    /// leaves the cells untouched.
    pub fn new(bands: impl IntoIterator<Item = (f32, TileCode)>, noise: NoiseSettings) -> Self {
        let mut bands: Vec<(f32, TileCode)> = bands.into_iter().collect();
        bands.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { bands, noise }
    }

    pub fn bands(&self) -> &[(f32, TileCode)] {
        &self.bands
    }

    pub fn noise(&self) -> &NoiseSettings {
        &self.noise
    }

    /// First band whose ceiling is at or above `height`.
    pub fn band_for_height(&self, height: f32) -> Option<TileCode> {
        self.bands
            .iter()
            .find(|(ceiling, _)| height <= *ceiling)
            .map(|&(_, code)| code)
    }

    /// Paints `grid` from an already generated field. Returns the number of
    /// cells written.
    pub fn paint_field(
        &self,
        grid: &mut TileGrid,
        field: &NoiseField,
    ) -> Result<usize, GenerationError> {
        if field.width != grid.width() || field.height != grid.height() {
            return Err(GenerationError::DimensionMismatch {
                expected: grid.dimensions(),
                actual: UVec2::new(field.width, field.height),
            });
        }

        let mut painted = 0;
        for x in 0..grid.width() {
            for y in 0..grid.height() {
                match self.band_for_height(field.sample(x, y)) {
                    Some(code) if code != EMPTY_TILE => {
                        grid.set(x as i32, y as i32, code);
                        painted += 1;
                    }
                    _ => {}
                }
            }
        }
        Ok(painted)
    }
}

impl Algorithm for ThresholdPaint {
    fn name(&self) -> &'static str {
        "threshold_paint"
    }

    fn apply(&self, grid: &mut TileGrid, _rng: &mut SessionRng) -> Result<(), GenerationError> {
        if self.bands.is_empty() {
            tracing::debug!(target: "tilegen::pipeline", "threshold_paint.skipped=no_bands");
            return Ok(());
        }
        let field = NoiseField::generate(grid.width(), grid.height(), grid.seed(), &self.noise);
        let painted = self.paint_field(grid, &field)?;
        tracing::debug!(
            target: "tilegen::pipeline",
            painted,
            bands = self.bands.len(),
            "threshold_paint.applied"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::session_rng;

    #[test]
    fn bands_are_sorted_and_first_match_wins() {
        let paint = ThresholdPaint::new([(1.0, 3), (0.2, 1), (0.5, 2)], NoiseSettings::default());
        assert_eq!(paint.bands(), &[(0.2, 1), (0.5, 2), (1.0, 3)]);
        assert_eq!(paint.band_for_height(0.0), Some(1));
        assert_eq!(paint.band_for_height(0.2), Some(1));
        assert_eq!(paint.band_for_height(0.21), Some(2));
        assert_eq!(paint.band_for_height(1.0), Some(3));
    }

    #[test]
    fn heights_above_every_band_are_left_alone() {
        let paint = ThresholdPaint::new([(0.5, 2)], NoiseSettings::default());
        let field = NoiseField::new(2, 1, vec![0.4, 0.9]);
        let mut grid = TileGrid::new(2, 1, 0);
        grid.fill(7);

        let painted = paint.paint_field(&mut grid, &field).unwrap();
        assert_eq!(painted, 1);
        assert_eq!(grid.cells(), &[2, 7]);
    }

    #[test]
    fn empty_bands_claim_their_range_without_painting() {
        let paint = ThresholdPaint::new([(0.3, EMPTY_TILE), (1.0, 5)], NoiseSettings::default());
        let field = NoiseField::new(3, 1, vec![0.1, 0.3, 0.6]);
        let mut grid = TileGrid::new(3, 1, 0);
        grid.fill(9);

        paint.paint_field(&mut grid, &field).unwrap();
        assert_eq!(grid.cells(), &[9, 9, 5]);
    }

    #[test]
    fn field_of_another_size_is_rejected() {
        let paint = ThresholdPaint::new([(1.0, 2)], NoiseSettings::default());
        let field = NoiseField::new(2, 2, vec![0.0; 4]);
        let mut grid = TileGrid::new(3, 2, 0);
        assert!(matches!(
            paint.paint_field(&mut grid, &field),
            Err(GenerationError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn apply_matches_the_documented_field() {
        let noise = NoiseSettings {
            scale: 3.7,
            octaves: 2,
            ..NoiseSettings::default()
        };
        let paint = ThresholdPaint::new([(0.5, 1), (1.0, 2)], noise);
        let mut grid = TileGrid::new(10, 10, 42);
        paint.apply(&mut grid, &mut session_rng(42)).unwrap();

        let field = NoiseField::generate(10, 10, 42, &noise);
        for x in 0..10u32 {
            for y in 0..10u32 {
                let expected = if field.sample(x, y) <= 0.5 { 1 } else { 2 };
                assert_eq!(grid.get(x as i32, y as i32), expected);
            }
        }
    }
}
