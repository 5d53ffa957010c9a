use bevy::math::Vec2;
use fastnoise_lite::{FastNoiseLite, NoiseType};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Smallest usable noise scale; anything at or below zero is clamped up to it.
pub const MIN_NOISE_SCALE: f32 = 0.0001;

/// Octave offsets are drawn from `[-OCTAVE_OFFSET_RANGE, OCTAVE_OFFSET_RANGE)`.
const OCTAVE_OFFSET_RANGE: i32 = 100_000;

const ISLAND_FALLOFF_EXPONENT: f32 = 3.0;
const ISLAND_FALLOFF_SHIFT: f32 = 2.2;

/// Parameters of a multi-octave height field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseSettings {
    pub scale: f32,
    pub octaves: u32,
    pub persistence: f32,
    pub lacunarity: f32,
    pub offset: [f32; 2],
    pub island_gradient: bool,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            scale: 20.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            offset: [0.0, 0.0],
            island_gradient: false,
        }
    }
}

/// Normalised `[0, 1]` height surface matching a grid's dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseField {
    pub width: u32,
    pub height: u32,
    values: Vec<f32>,
}

impl NoiseField {
    pub fn new(width: u32, height: u32, values: Vec<f32>) -> Self {
        debug_assert_eq!(values.len(), (width as usize) * (height as usize));
        Self {
            width,
            height,
            values,
        }
    }

    /// Builds the field for `seed`, normalises it and applies the island mask
    /// when `settings.island_gradient` is set.
    pub fn generate(width: u32, height: u32, seed: u64, settings: &NoiseSettings) -> Self {
        let mut values = octave_noise(width, height, seed, settings);
        normalise(&mut values);
        let mut field = Self::new(width, height, values);
        if settings.island_gradient {
            field.apply_island_gradient();
        }
        tracing::trace!(
            target: "tilegen::noise",
            width,
            height,
            seed,
            octaves = settings.octaves,
            scale = settings.scale,
            island = settings.island_gradient,
            "noise.field_generated"
        );
        field
    }

    #[inline]
    pub fn sample(&self, x: u32, y: u32) -> f32 {
        debug_assert!(x < self.width && y < self.height);
        self.values[(y as usize) * (self.width as usize) + x as usize]
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn min_max(&self) -> Option<(f32, f32)> {
        if self.values.is_empty() {
            return None;
        }
        Some(
            self.values
                .iter()
                .fold((f32::MAX, f32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v))),
        )
    }

    /// Subtracts the radial falloff mask and clamps back into `[0, 1]`.
    pub fn apply_island_gradient(&mut self) {
        let mask = island_gradient(self.width, self.height);
        for (value, falloff) in self.values.iter_mut().zip(mask) {
            *value = (*value - falloff).clamp(0.0, 1.0);
        }
    }
}

/// Square radial falloff: 0 at the centre, approaching 1 towards the border.
pub fn island_gradient(width: u32, height: u32) -> Vec<f32> {
    let mut mask = Vec::with_capacity((width as usize) * (height as usize));
    for y in 0..height {
        for x in 0..width {
            let i = x as f32 / width as f32 * 2.0 - 1.0;
            let j = y as f32 / height as f32 * 2.0 - 1.0;
            let value = i.abs().max(j.abs());
            let rise = value.powf(ISLAND_FALLOFF_EXPONENT);
            let fall = (ISLAND_FALLOFF_SHIFT - ISLAND_FALLOFF_SHIFT * value)
                .powf(ISLAND_FALLOFF_EXPONENT);
            mask.push(rise / (rise + fall));
        }
    }
    mask
}

/// Per-octave sample offsets derived from `seed`.
///
/// The first draw of the stream is discarded before any offset is taken.
pub fn octave_offsets(seed: u64, octaves: u32, offset: Vec2) -> Vec<Vec2> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let _ = rng.next_u32();
    (0..octaves.max(1))
        .map(|_| {
            let ox = rng.gen_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE) as f32 + offset.x;
            let oy = rng.gen_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE) as f32 + offset.y;
            Vec2::new(ox, oy)
        })
        .collect()
}

fn octave_noise(width: u32, height: u32, seed: u64, settings: &NoiseSettings) -> Vec<f32> {
    let offsets = octave_offsets(
        seed,
        settings.octaves,
        Vec2::new(settings.offset[0], settings.offset[1]),
    );
    let scale = if settings.scale > 0.0 {
        settings.scale
    } else {
        MIN_NOISE_SCALE
    };

    let mut perlin = FastNoiseLite::new();
    perlin.set_noise_type(Some(NoiseType::Perlin));
    perlin.set_frequency(Some(1.0));

    let half_width = width as f32 / 2.0;
    let half_height = height as f32 / 2.0;
    let w = width as usize;
    let total = w * height as usize;

    // Cells are independent; only the normalisation pass needs the whole field.
    (0..total)
        .into_par_iter()
        .map(|idx| {
            let x = (idx % w) as f32;
            let y = (idx / w) as f32;
            let mut amplitude = 1.0;
            let mut frequency = 1.0;
            let mut height_value = 0.0;
            for octave in &offsets {
                let sample_x = (x - half_width) / scale * frequency + octave.x;
                let sample_y = (y - half_height) / scale * frequency + octave.y;
                // Perlin output is already signed in [-1, 1].
                height_value += perlin.get_noise_2d(sample_x, sample_y) * amplitude;
                amplitude *= settings.persistence;
                frequency *= settings.lacunarity;
            }
            height_value
        })
        .collect()
}

/// Inverse-lerps every value between the field's minimum and maximum.
///
/// A flat field has no range to spread over and becomes all zeros.
pub fn normalise(values: &mut [f32]) {
    if values.is_empty() {
        return;
    }
    let (min_v, max_v) = values
        .iter()
        .fold((f32::MAX, f32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = max_v - min_v;
    if !(range > 0.0) {
        values.fill(0.0);
        return;
    }
    for v in values.iter_mut() {
        *v = (*v - min_v) / range;
    }
}
