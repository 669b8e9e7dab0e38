use tracing::{debug, warn};

use crate::world::rng::GlobeRng;
use crate::world::tile::{IslandId, Terrain};
use crate::world::topology::TileGraph;
use crate::world::{Island, WorldState, ISLAND_NUM, ISLAND_SIZE_MAX, ISLAND_VARIANCE, LAND_MINIMUM};

/// Per-island frontier lists packed into one bounded arena of
/// `ISLAND_SIZE_MAX` slots per island.
struct FrontierArena {
    slots: Vec<usize>,
    lens: Vec<usize>,
}

impl FrontierArena {
    fn new(islands: usize) -> Self {
        Self {
            slots: vec![0; islands * ISLAND_SIZE_MAX],
            lens: vec![0; islands],
        }
    }

    fn len(&self, island: usize) -> usize {
        self.lens[island]
    }

    fn get(&self, island: usize, slot: usize) -> Option<usize> {
        if slot < self.lens[island] {
            Some(self.slots[island * ISLAND_SIZE_MAX + slot])
        } else {
            None
        }
    }

    /// Returns false if the island's frontier is full.
    fn push(&mut self, island: usize, tile: usize) -> bool {
        let len = self.lens[island];
        if len == ISLAND_SIZE_MAX {
            return false;
        }
        self.slots[island * ISLAND_SIZE_MAX + len] = tile;
        self.lens[island] += 1;
        true
    }

    /// Order-preserving removal.
    fn remove(&mut self, island: usize, slot: usize) {
        let len = self.lens[island];
        if slot >= len {
            return;
        }
        let start = island * ISLAND_SIZE_MAX;
        self.slots
            .copy_within(start + slot + 1..start + len, start + slot);
        self.lens[island] -= 1;
    }
}

/// Size limit for one island: `target` scaled by a random factor in
/// `[1 - ISLAND_VARIANCE, 1 + ISLAND_VARIANCE)`, truncated and clamped.
fn island_limit(rng: &mut GlobeRng, target: usize) -> usize {
    let scale = 2.0 * ISLAND_VARIANCE * (rng.next_real() - 0.5) + 1.0;
    ((scale * target as f32) as usize).clamp(LAND_MINIMUM * 3, ISLAND_SIZE_MAX)
}

/// Seed up to `island_count` islands evenly across the tile indices and grow
/// them until every island has reached its limit or run out of frontier.
///
/// Each step picks a random frontier tile and claims its first unowned
/// neighbor. A frontier tile with no free neighbor becomes shallows and
/// leaves the frontier for good, which bounds the loop.
///
/// `state` must hold freshly reset tiles for `graph`.
pub fn grow_islands<G: TileGraph, M>(
    state: &mut WorldState<M>,
    graph: &G,
    rng: &mut GlobeRng,
    island_count: usize,
    island_size: usize,
) {
    let tile_count = graph.tile_count();
    debug_assert_eq!(state.tiles.len(), tile_count);
    let count = island_count.min(ISLAND_NUM).min(tile_count);
    let size = island_size.min(ISLAND_SIZE_MAX);
    debug!(islands = count, size, "Growing islands");

    state.islands.clear();
    let mut frontier = FrontierArena::new(count);
    let mut limits = Vec::with_capacity(count);
    for i in 0..count {
        let root = i * tile_count / count;
        frontier.push(i, root);
        limits.push(island_limit(rng, size));
        state.tiles[root].island = IslandId::new(i);
        state.islands.push(Island {
            root,
            tiles: 1,
            land: 0,
        });
    }

    let mut expanded = true;
    while expanded {
        expanded = false;
        for i in 0..count {
            let len = frontier.len(i);
            if len == 0 || state.islands[i].tiles >= limits[i] {
                continue;
            }
            expanded = true;

            let slot = next_index(rng, len);
            let Some(edge) = frontier.get(i, slot) else {
                continue;
            };
            let free = graph
                .neighbors(edge)
                .into_iter()
                .find(|&n| state.tiles[n].island.is_none());

            match free {
                Some(next) => {
                    if !frontier.push(i, next) {
                        warn!(island = i, "Frontier full, island stops growing");
                        limits[i] = state.islands[i].tiles;
                        continue;
                    }
                    state.tiles[next].island = IslandId::new(i);
                    state.islands[i].tiles += 1;
                }
                None => {
                    state.tiles[edge].terrain = Terrain::Shallow;
                    frontier.remove(i, slot);
                }
            }
        }
    }
}

fn next_index(rng: &mut GlobeRng, len: usize) -> usize {
    rng.next_uint() as usize % len
}
