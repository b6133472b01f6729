//! Tile types and per-tile environmental data.

use serde::{Deserialize, Serialize};

/// Identifier of a biome as stored on a tile.
///
/// The numeric values of the associated constants are the ids used by the
/// default biome catalog; custom catalogs may use any other values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BiomeId(pub u16);

impl BiomeId {
    pub const TEMPERATE_PLAINS: Self = Self(0);
    pub const FOREST: Self = Self(1);
    pub const DESERT: Self = Self(2);
    pub const TUNDRA: Self = Self(3);
    pub const GLACIER: Self = Self(4);
    pub const SWAMP: Self = Self(5);
    pub const HIGHLANDS: Self = Self(6);
    pub const VOLCANIC_WASTES: Self = Self(7);
    pub const CRYSTAL_FIELDS: Self = Self(8);
    pub const ALIEN_JUNGLE: Self = Self(9);
}

/// 8-bit RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Opaque color from red, green and blue channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Scales the color channels by `factor` (clamped to `[0, 1]`), keeping alpha.
    pub fn darken(self, factor: f32) -> Self {
        let f = factor.clamp(0.0, 1.0);
        let scale = |c: u8| (c as f32 * f).round() as u8;
        Self {
            r: scale(self.r),
            g: scale(self.g),
            b: scale(self.b),
            a: self.a,
        }
    }

    /// Linear blend towards `other`; `t = 0` returns `self`, `t = 1` returns `other`.
    pub fn blend(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }
}

/// Tile type tag.
///
/// The declaration order is the persisted integer tag (see [`TileType::tag`]);
/// new variants must only ever be appended.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum TileType {
    #[default]
    Empty,
    Floor,
    Wall,
    Door,
    Water,
    ShallowWater,
    Grass,
    Sand,
    Snow,
    Ice,
    Stone,
    Lava,
    Mountain,
    Hill,
    RockFormation,
    Ruins,
    Crater,
    MineralDeposit,
    AlienGrowth,
    Forest,
    Mud,
    Dirt,
    Crystal,
}

impl TileType {
    /// Every tile type, in tag order.
    pub const ALL: [TileType; 23] = [
        TileType::Empty,
        TileType::Floor,
        TileType::Wall,
        TileType::Door,
        TileType::Water,
        TileType::ShallowWater,
        TileType::Grass,
        TileType::Sand,
        TileType::Snow,
        TileType::Ice,
        TileType::Stone,
        TileType::Lava,
        TileType::Mountain,
        TileType::Hill,
        TileType::RockFormation,
        TileType::Ruins,
        TileType::Crater,
        TileType::MineralDeposit,
        TileType::AlienGrowth,
        TileType::Forest,
        TileType::Mud,
        TileType::Dirt,
        TileType::Crystal,
    ];

    /// Integer tag used by the persisted tile-map format.
    pub fn tag(self) -> i32 {
        self as i32
    }

    /// Inverse of [`TileType::tag`]. Returns `None` for unknown tags.
    pub fn from_tag(tag: i32) -> Option<Self> {
        usize::try_from(tag)
            .ok()
            .and_then(|i| Self::ALL.get(i))
            .copied()
    }

    /// Whether entities can walk onto a fresh tile of this type.
    pub fn walkable(self) -> bool {
        !matches!(
            self,
            TileType::Empty
                | TileType::Wall
                | TileType::Water
                | TileType::Lava
                | TileType::Mountain
                | TileType::RockFormation
                | TileType::Crystal
        )
    }

    /// Whether a fresh tile of this type lets line of sight through.
    pub fn transparent(self) -> bool {
        !matches!(
            self,
            TileType::Wall
                | TileType::Door
                | TileType::RockFormation
                | TileType::AlienGrowth
                | TileType::Forest
        )
    }

    /// Liquid tiles: never replaced by biome tile selection.
    pub fn is_fluid(self) -> bool {
        matches!(
            self,
            TileType::Water | TileType::ShallowWater | TileType::Lava
        )
    }

    /// Open or shallow water.
    pub fn is_water(self) -> bool {
        matches!(self, TileType::Water | TileType::ShallowWater)
    }

    /// Default render height.
    pub fn default_height(self) -> f32 {
        match self {
            TileType::Empty | TileType::Floor | TileType::Door => 0.0,
            TileType::Wall => 1.0,
            TileType::Water => 0.1,
            TileType::ShallowWater | TileType::Lava => 0.05,
            TileType::Grass => 0.2,
            TileType::Sand | TileType::Dirt => 0.15,
            TileType::Snow | TileType::Stone | TileType::Ruins => 0.3,
            TileType::Ice => 0.2,
            TileType::Mountain => 0.8,
            TileType::Hill => 0.45,
            TileType::RockFormation => 0.7,
            TileType::Crater => -0.2,
            TileType::MineralDeposit => 0.25,
            TileType::AlienGrowth => 0.4,
            TileType::Forest => 0.5,
            TileType::Mud => 0.1,
            TileType::Crystal => 0.6,
        }
    }

    /// Default base color.
    pub fn default_color(self) -> Color {
        match self {
            TileType::Empty => Color::BLACK,
            TileType::Floor => Color::rgb(120, 120, 120),
            TileType::Wall => Color::rgb(80, 80, 90),
            TileType::Door => Color::rgb(139, 90, 43),
            TileType::Water => Color::rgb(40, 90, 200),
            TileType::ShallowWater => Color::rgb(80, 150, 220),
            TileType::Grass => Color::rgb(70, 160, 60),
            TileType::Sand => Color::rgb(220, 200, 130),
            TileType::Snow => Color::rgb(240, 245, 250),
            TileType::Ice => Color::rgb(180, 220, 240),
            TileType::Stone => Color::rgb(130, 130, 130),
            TileType::Lava => Color::rgb(230, 80, 20),
            TileType::Mountain => Color::rgb(110, 100, 90),
            TileType::Hill => Color::rgb(110, 140, 70),
            TileType::RockFormation => Color::rgb(100, 90, 85),
            TileType::Ruins => Color::rgb(150, 140, 110),
            TileType::Crater => Color::rgb(90, 80, 70),
            TileType::MineralDeposit => Color::rgb(170, 120, 200),
            TileType::AlienGrowth => Color::rgb(150, 60, 180),
            TileType::Forest => Color::rgb(30, 100, 40),
            TileType::Mud => Color::rgb(100, 80, 50),
            TileType::Dirt => Color::rgb(120, 90, 60),
            TileType::Crystal => Color::rgb(140, 220, 230),
        }
    }
}

/// A decoration placed on a tile (plant, debris, marker, ...).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Decoration {
    pub id: u32,
    pub name: String,
    pub scale: f32,
    pub animated: bool,
}

/// A single grid cell.
///
/// Created with type-derived defaults; generators then overwrite fields one by one.
/// The unit-interval fields (elevation, humidity, radiation, resource density) are
/// private so that every write goes through a clamping setter.
#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    kind: TileType,
    pub walkable: bool,
    pub transparent: bool,
    /// Render height.
    pub height: f32,
    pub color: Color,
    pub biome: Option<BiomeId>,
    /// Degrees Celsius.
    pub temperature: f32,
    humidity: f32,
    elevation: f32,
    radiation: f32,
    resource_density: f32,
    pub decorations: Vec<Decoration>,
}

impl Tile {
    pub fn new(kind: TileType) -> Self {
        Self {
            kind,
            walkable: kind.walkable(),
            transparent: kind.transparent(),
            height: kind.default_height(),
            color: kind.default_color(),
            biome: None,
            temperature: 0.0,
            humidity: 0.0,
            elevation: 0.0,
            radiation: 0.0,
            resource_density: 0.0,
            decorations: Vec::new(),
        }
    }

    pub fn kind(&self) -> TileType {
        self.kind
    }

    /// Changes the tile type and resets walkable, transparent and color to the
    /// new type's defaults. Height and environmental data are kept.
    pub fn set_kind(&mut self, kind: TileType) {
        self.kind = kind;
        self.walkable = kind.walkable();
        self.transparent = kind.transparent();
        self.color = kind.default_color();
    }

    pub fn elevation(&self) -> f32 {
        self.elevation
    }

    pub fn set_elevation(&mut self, value: f32) {
        self.elevation = clamp_unit(value);
    }

    pub fn humidity(&self) -> f32 {
        self.humidity
    }

    pub fn set_humidity(&mut self, value: f32) {
        self.humidity = clamp_unit(value);
    }

    pub fn radiation(&self) -> f32 {
        self.radiation
    }

    pub fn set_radiation(&mut self, value: f32) {
        self.radiation = clamp_unit(value);
    }

    pub fn resource_density(&self) -> f32 {
        self.resource_density
    }

    pub fn set_resource_density(&mut self, value: f32) {
        self.resource_density = clamp_unit(value);
    }
}

impl Default for Tile {
    fn default() -> Self {
        Self::new(TileType::Empty)
    }
}

/// Clamps to `[0, 1]`, mapping NaN to 0.
fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
