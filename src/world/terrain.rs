use std::f32::consts::PI;

use tracing::{debug, trace};

use crate::world::rng::GlobeRng;
use crate::world::tile::{IslandId, Terrain, Tile};
use crate::world::topology::TileGraph;
use crate::world::{WorldState, HEIGHT_MAX};

/// Counts gathered while classifying terrain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TerrainStats {
    /// Shallow tiles promoted to land, including those later pruned.
    pub land: usize,
    pub sand: usize,
    pub temperate: usize,
    pub hot: usize,
    pub cold: usize,
    pub failed_islands: usize,
}

/// Pick a ground variant from the tile's latitude.
///
/// `p` runs from -1 at the equator to 1 at the poles. The draw keeps plain
/// ground with probability `1 - |p|`, otherwise hot ground towards the
/// equator and cold ground towards the poles.
/// FIXME: climate bias is known to be off (too much hot ground); the formula
/// is part of the protocol and must not change on its own.
pub fn choose_terrain(latitude: f32, rng: &mut GlobeRng) -> Terrain {
    let prop = 4.0 * latitude.abs() / PI - 1.0;
    if prop >= 0.0 {
        if rng.next_real() > prop {
            return Terrain::Ground;
        }
        return Terrain::GroundCold;
    }
    if rng.next_real() > -prop {
        return Terrain::Ground;
    }
    Terrain::GroundHot
}

/// Shallows settle into sand when every region tile is owned by the same
/// island and none of them is open water.
fn shallows_settle(tiles: &[Tile], region: &[usize], island: Option<IslandId>) -> bool {
    region.iter().all(|&r| {
        let other = &tiles[r];
        other.terrain != Terrain::Water && other.island == island
    })
}

/// Sand becomes ground when its whole region is dry and on the same island.
fn sand_settles(tiles: &[Tile], region: &[usize], island: Option<IslandId>) -> bool {
    region.iter().all(|&r| {
        let other = &tiles[r];
        !other.terrain.is_water() && other.island == island
    })
}

/// Classify terrain after island growth in three passes over the tiles:
///
/// 1. shallows surrounded by their own island become sand (and count as land),
/// 2. sand surrounded by dry land of its own island becomes ground with a
///    climate variant and a raw height,
/// 3. tiles of failed islands are reverted to water, all others have their
///    height averaged with their region.
///
/// Each pass visits tiles in index order and updates in place.
pub fn classify_terrain<G: TileGraph, M>(
    state: &mut WorldState<M>,
    graph: &G,
    rng: &mut GlobeRng,
) -> TerrainStats {
    let mut stats = TerrainStats::default();
    let tile_count = state.tiles.len();

    for i in 0..tile_count {
        let tile = state.tiles[i];
        if tile.terrain != Terrain::Shallow {
            continue;
        }
        if !shallows_settle(&state.tiles, graph.region(i), tile.island) {
            continue;
        }
        state.tiles[i].terrain = Terrain::Sand;
        if let Some(island) = tile.island.and_then(|id| state.islands.get_mut(id.index())) {
            island.land += 1;
        }
        stats.land += 1;
    }

    for i in 0..tile_count {
        let tile = state.tiles[i];
        if tile.terrain != Terrain::Sand {
            continue;
        }
        if !sand_settles(&state.tiles, graph.region(i), tile.island) {
            continue;
        }
        let terrain = choose_terrain(graph.latitude(i), rng);
        state.tiles[i].terrain = terrain;
        state.tiles[i].height = rng.next_real() * HEIGHT_MAX;
        match terrain {
            Terrain::GroundHot => stats.hot += 1,
            Terrain::GroundCold => stats.cold += 1,
            _ => stats.temperate += 1,
        }
    }

    for i in 0..tile_count {
        let failed = match state.tiles[i].island {
            Some(id) => state.islands.get(id.index()).is_none_or(|island| island.failed()),
            None => true,
        };
        if failed {
            let tile = &mut state.tiles[i];
            tile.terrain = Terrain::Water;
            tile.height = 0.0;
            tile.island = None;
            continue;
        }

        let region = graph.region(i);
        if region.is_empty() {
            continue;
        }
        let sum: f32 = region.iter().map(|&r| state.tiles[r].height).sum();
        let tile = &mut state.tiles[i];
        tile.height = (tile.height + sum / region.len() as f32) / 2.0;
    }

    stats.sand = stats.land - stats.hot - stats.temperate - stats.cold;
    stats.failed_islands = state.islands.iter().filter(|i| i.failed()).count();
    log_stats(&stats, state);
    stats
}

fn log_stats<M>(stats: &TerrainStats, state: &WorldState<M>) {
    let water = state.tiles.len().saturating_sub(stats.land).max(1);
    debug!(
        land = stats.land,
        "{} land tiles ({}%)",
        stats.land,
        100 * stats.land / water
    );
    if stats.land > 0 {
        let pct = |n: usize| 100 * n / stats.land;
        debug!(
            "{} sand ({}%), {} temp ({}%), {} hot ({}%), {} cold ({}%)",
            stats.sand,
            pct(stats.sand),
            stats.temperate,
            pct(stats.temperate),
            stats.hot,
            pct(stats.hot),
            stats.cold,
            pct(stats.cold)
        );
    }
    for (i, island) in state.islands.iter().enumerate() {
        trace!(
            island = i,
            land = island.land,
            tiles = island.tiles,
            failed = island.failed(),
            "Island {}, {} of {} land tiles",
            i,
            island.land,
            island.tiles
        );
    }
}
