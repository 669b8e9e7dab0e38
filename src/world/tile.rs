use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::world::ISLAND_NUM;

// === Enums ===

/// Terrain class of a tile. Classification only ever moves a tile down
/// this list (Water -> Shallow -> Sand -> Ground*) within one generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    Water,
    Shallow,
    Sand,
    Ground,
    GroundHot,
    GroundCold,
}

impl Terrain {
    pub const ALL: [Terrain; 6] = [
        Terrain::Water,
        Terrain::Shallow,
        Terrain::Sand,
        Terrain::Ground,
        Terrain::GroundHot,
        Terrain::GroundCold,
    ];

    /// Water and shallows. Everything else counts as land.
    pub fn is_water(self) -> bool {
        matches!(self, Terrain::Water | Terrain::Shallow)
    }

    pub fn is_ground(self) -> bool {
        matches!(
            self,
            Terrain::Ground | Terrain::GroundHot | Terrain::GroundCold
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Terrain::Water => "Water",
            Terrain::Shallow => "Shallow",
            Terrain::Sand => "Sand",
            Terrain::Ground => "Ground",
            Terrain::GroundHot => "Ground (hot)",
            Terrain::GroundCold => "Ground (cold)",
        }
    }
}

// === Ids ===

/// Index into the island table. Always below [`ISLAND_NUM`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IslandId(u8);

impl IslandId {
    pub fn new(index: usize) -> Option<Self> {
        if index < ISLAND_NUM {
            Some(IslandId(index as u8))
        } else {
            None
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// === Tile ===

/// Generated state of one globe tile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub terrain: Terrain,
    pub height: f32,
    pub island: Option<IslandId>,
    /// Centroid of the tile's three corners.
    pub origin: Vec3,
    /// Unit vector from the centroid towards the first corner.
    pub forward: Vec3,
    pub normal: Vec3,
}

impl Tile {
    /// Unowned open water at the base surface. Every generation starts here.
    pub fn water() -> Self {
        Self {
            terrain: Terrain::Water,
            height: 0.0,
            island: None,
            origin: Vec3::ZERO,
            forward: Vec3::ZERO,
            normal: Vec3::ZERO,
        }
    }

    pub fn is_land(&self) -> bool {
        !self.terrain.is_water()
    }

    pub fn protocol(&self) -> ProtocolTile {
        ProtocolTile {
            terrain: self.terrain,
            height: self.height,
            island: self.island,
        }
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::water()
    }
}

/// The part of a tile that peers must agree on bit-for-bit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProtocolTile {
    pub terrain: Terrain,
    pub height: f32,
    pub island: Option<IslandId>,
}
