use std::fmt;

use serde::{Deserialize, Serialize};

/// Integer identifier stored in every grid cell.
pub type TileCode = u16;

/// Reserved "nothing here" code, shared by every layer.
pub const EMPTY_TILE: TileCode = 0;

/// Ground layer vocabulary. Codes are disjoint from [`ObjectTileType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum GroundTileType {
    DeepWater = 1,
    ShallowWater = 2,
    Sand = 3,
    Grass = 4,
    Dirt = 5,
    Stone = 6,
    Snow = 7,
    River = 8,
}

impl GroundTileType {
    pub const ALL: [GroundTileType; 8] = [
        GroundTileType::DeepWater,
        GroundTileType::ShallowWater,
        GroundTileType::Sand,
        GroundTileType::Grass,
        GroundTileType::Dirt,
        GroundTileType::Stone,
        GroundTileType::Snow,
        GroundTileType::River,
    ];

    #[inline]
    pub const fn code(self) -> TileCode {
        self as TileCode
    }

    pub fn from_code(code: TileCode) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    pub const fn name(self) -> &'static str {
        match self {
            GroundTileType::DeepWater => "deep_water",
            GroundTileType::ShallowWater => "shallow_water",
            GroundTileType::Sand => "sand",
            GroundTileType::Grass => "grass",
            GroundTileType::Dirt => "dirt",
            GroundTileType::Stone => "stone",
            GroundTileType::Snow => "snow",
            GroundTileType::River => "river",
        }
    }

    pub const fn glyph(self) -> char {
        match self {
            GroundTileType::DeepWater => '~',
            GroundTileType::ShallowWater => '-',
            GroundTileType::Sand => '.',
            GroundTileType::Grass => ',',
            GroundTileType::Dirt => ':',
            GroundTileType::Stone => '^',
            GroundTileType::Snow => '*',
            GroundTileType::River => '=',
        }
    }
}

/// Object layer vocabulary (vegetation, boulders).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum ObjectTileType {
    Tree = 1001,
    Bush = 1002,
    Rock = 1003,
    Flower = 1004,
}

impl ObjectTileType {
    pub const ALL: [ObjectTileType; 4] = [
        ObjectTileType::Tree,
        ObjectTileType::Bush,
        ObjectTileType::Rock,
        ObjectTileType::Flower,
    ];

    #[inline]
    pub const fn code(self) -> TileCode {
        self as TileCode
    }

    pub fn from_code(code: TileCode) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    pub const fn name(self) -> &'static str {
        match self {
            ObjectTileType::Tree => "tree",
            ObjectTileType::Bush => "bush",
            ObjectTileType::Rock => "rock",
            ObjectTileType::Flower => "flower",
        }
    }

    pub const fn glyph(self) -> char {
        match self {
            ObjectTileType::Tree => 'T',
            ObjectTileType::Bush => 'b',
            ObjectTileType::Rock => 'o',
            ObjectTileType::Flower => '%',
        }
    }
}

/// Resolve a vocabulary name (`"grass"`, `"tree"`, `"none"`) to its code.
pub fn tile_code_by_name(name: &str) -> Option<TileCode> {
    if name == "none" {
        return Some(EMPTY_TILE);
    }
    GroundTileType::ALL
        .into_iter()
        .find(|t| t.name() == name)
        .map(GroundTileType::code)
        .or_else(|| {
            ObjectTileType::ALL
                .into_iter()
                .find(|t| t.name() == name)
                .map(ObjectTileType::code)
        })
}

/// Human readable name for a code, if it belongs to either vocabulary.
pub fn tile_name(code: TileCode) -> Option<&'static str> {
    if code == EMPTY_TILE {
        return Some("none");
    }
    GroundTileType::from_code(code)
        .map(GroundTileType::name)
        .or_else(|| ObjectTileType::from_code(code).map(ObjectTileType::name))
}

/// Grid layers a map can carry. Each layer owns one grid and one pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Ground,
    Object,
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerKind::Ground => f.write_str("ground"),
            LayerKind::Object => f.write_str("object"),
        }
    }
}

/// Tile reference as written in presets: either a raw code or a vocabulary name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "TileRefRepr")]
pub struct TileRef(pub TileCode);

impl TileRef {
    #[inline]
    pub const fn code(self) -> TileCode {
        self.0
    }
}

impl From<GroundTileType> for TileRef {
    fn from(value: GroundTileType) -> Self {
        Self(value.code())
    }
}

impl From<ObjectTileType> for TileRef {
    fn from(value: ObjectTileType) -> Self {
        Self(value.code())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TileRefRepr {
    Code(TileCode),
    Name(String),
}

impl TryFrom<TileRefRepr> for TileRef {
    type Error = String;

    fn try_from(value: TileRefRepr) -> Result<Self, Self::Error> {
        match value {
            TileRefRepr::Code(code) => Ok(TileRef(code)),
            TileRefRepr::Name(name) => tile_code_by_name(&name)
                .map(TileRef)
                .ok_or_else(|| format!("unknown tile type `{name}`")),
        }
    }
}
