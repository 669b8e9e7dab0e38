pub mod display;
pub mod generation;
pub mod islands;
pub mod picking;
pub mod rng;
pub mod terrain;
pub mod tile;
pub mod topology;

#[cfg(test)]
pub(crate) mod testing;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::GlobeError;
pub use display::{TileDisplay, TileModel};
pub use picking::Selection;
pub use tile::{IslandId, ProtocolTile, Terrain, Tile};
pub use topology::{Globe, TileGraph};

// Changing any of these invalidates the protocol.

/// Capacity of the island table.
pub const ISLAND_NUM: usize = 128;

/// Largest number of tiles a single island may claim.
pub const ISLAND_SIZE_MAX: usize = 384;

/// Island size limits vary up to this proportion around the target size.
pub const ISLAND_VARIANCE: f32 = 0.3;

/// Maximum height of a tile off the globe surface.
pub const HEIGHT_MAX: f32 = 4.0;

/// Minimum number of land tiles for an island to survive classification.
pub const LAND_MINIMUM: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Island {
    /// Tile the island grew from.
    pub root: usize,
    /// Tiles claimed during growth.
    pub tiles: usize,
    /// Tiles that became land during classification.
    pub land: usize,
}

impl Island {
    pub fn failed(&self) -> bool {
        self.land < LAND_MINIMUM
    }
}

/// All generated globe state plus per-tile display state.
///
/// `M` is the decorative model type handed out by a
/// [`crate::assets::ModelLoader`]; models are released by dropping them.
pub struct WorldState<M = ()> {
    pub(crate) tiles: Vec<Tile>,
    pub(crate) islands: Vec<Island>,
    pub(crate) display: Vec<TileDisplay<M>>,
    pub(crate) selection: Selection,
    pub(crate) ray_tests: u64,
    pub(crate) camera_forward: Vec3,
    pub(crate) visible_range: f32,
}

impl<M> WorldState<M> {
    pub fn new() -> Self {
        Self {
            tiles: Vec::new(),
            islands: Vec::with_capacity(ISLAND_NUM),
            display: Vec::new(),
            selection: Selection::Unselected,
            ray_tests: 0,
            camera_forward: Vec3::ZERO,
            visible_range: 0.0,
        }
    }

    /// Drop every model and return all tiles to unowned water.
    pub fn reset(&mut self, tile_count: usize) {
        self.display.clear();
        self.display.resize_with(tile_count, TileDisplay::default);
        self.tiles.clear();
        self.tiles.resize(tile_count, Tile::water());
        self.islands.clear();
        self.selection = Selection::Unselected;
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, tile: usize) -> Option<&Tile> {
        self.tiles.get(tile)
    }

    pub fn islands(&self) -> &[Island] {
        &self.islands
    }

    pub fn island(&self, id: IslandId) -> Option<&Island> {
        self.islands.get(id.index())
    }

    pub fn land_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_land()).count()
    }

    /// Terrain, height and ownership of every tile in index order.
    pub fn protocol_state(&self) -> Vec<ProtocolTile> {
        self.tiles.iter().map(Tile::protocol).collect()
    }

    pub(crate) fn check_tile(&self, tile: usize) -> Result<(), GlobeError> {
        if tile < self.tiles.len() {
            Ok(())
        } else {
            Err(GlobeError::TileOutOfRange {
                tile,
                tile_count: self.tiles.len(),
            })
        }
    }

    /// Derive centroid, forward and normal vectors from the graph's current
    /// corner positions. Call after the globe has been raised.
    pub(crate) fn compute_geometry<G: TileGraph>(&mut self, graph: &G) {
        for (i, tile) in self.tiles.iter_mut().enumerate() {
            let [a, b, c] = graph.coords(i);
            tile.origin = (a + b + c) / 3.0;
            tile.forward = (a - tile.origin).normalize_or_zero();
            tile.normal = graph.normal(i);
        }
    }
}

impl<M> Default for WorldState<M> {
    fn default() -> Self {
        Self::new()
    }
}
