use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::{
    grid::TileGrid,
    map_preset::PaletteEntry,
    pipeline::GenerationError,
    session::GeneratedMap,
    tiles::{tile_name, GroundTileType, ObjectTileType, TileCode, EMPTY_TILE},
};

/// Glyph lookup used by the text renderer.
#[derive(Debug, Clone, Default)]
pub struct TilePalette {
    glyphs: HashMap<TileCode, char>,
}

impl TilePalette {
    /// Glyphs for both builtin vocabularies.
    pub fn standard() -> Self {
        let glyphs = GroundTileType::ALL
            .into_iter()
            .map(|t| (t.code(), t.glyph()))
            .chain(ObjectTileType::ALL.into_iter().map(|t| (t.code(), t.glyph())))
            .collect();
        Self { glyphs }
    }

    /// Entries for the empty code are skipped; a code listed twice is an error.
    pub fn from_entries(entries: &[PaletteEntry]) -> Result<Self, GenerationError> {
        let mut glyphs = HashMap::with_capacity(entries.len());
        for entry in entries {
            let code = entry.tile.code();
            if code == EMPTY_TILE {
                continue;
            }
            if glyphs.insert(code, entry.glyph).is_some() {
                return Err(GenerationError::DuplicatePaletteCode(code));
            }
        }
        Ok(Self { glyphs })
    }

    pub fn glyph(&self, code: TileCode) -> Option<char> {
        self.glyphs.get(&code).copied()
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// Renders the composite of every layer, top row (`y = height - 1`) first.
///
/// Empty cells and codes without a glyph become spaces; each unregistered
/// code is reported once.
pub fn render_ascii(map: &GeneratedMap, palette: &TilePalette) -> String {
    let mut out = String::with_capacity(((map.width + 1) * map.height) as usize);
    let mut missing = BTreeSet::new();
    for y in (0..map.height as i32).rev() {
        for x in 0..map.width as i32 {
            let code = map.composite_code(x, y);
            let glyph = match palette.glyph(code) {
                Some(glyph) => glyph,
                None => {
                    if code != EMPTY_TILE {
                        missing.insert(code);
                    }
                    ' '
                }
            };
            out.push(glyph);
        }
        out.push('\n');
    }
    for code in missing {
        tracing::warn!(target: "tilegen::render", code, "render.tile_not_defined");
    }
    out
}

/// Per-code cell counts of one grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileCensus {
    counts: BTreeMap<TileCode, usize>,
}

impl TileCensus {
    pub fn from_grid(grid: &TileGrid) -> Self {
        let mut counts = BTreeMap::new();
        for &code in grid.cells() {
            *counts.entry(code).or_insert(0) += 1;
        }
        Self { counts }
    }

    pub fn count(&self, code: TileCode) -> usize {
        self.counts.get(&code).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TileCode, usize)> + '_ {
        self.counts.iter().map(|(c, n)| (*c, *n))
    }

    /// One `name: count` line per code, in code order.
    pub fn summary(&self) -> String {
        self.iter()
            .map(|(code, n)| match tile_name(code) {
                Some(name) => format!("{name}: {n}"),
                None => format!("#{code}: {n}"),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
