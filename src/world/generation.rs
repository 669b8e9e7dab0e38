use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::config::generation::GenerationParams;
use crate::world::islands::grow_islands;
use crate::world::rng::GlobeRng;
use crate::world::terrain::{classify_terrain, TerrainStats};
use crate::world::topology::{Globe, TileGraph, MAX_SUBDIVISION_LEVEL, MIN_SUBDIVISION_LEVEL};
use crate::world::WorldState;

/// Island count and target size for a subdivision level, or None when the
/// level has no island table.
pub fn island_defaults(level: u32) -> Option<(usize, usize)> {
    match level {
        2 => Some((3, 160)),
        3 => Some((10, 160)),
        4 => Some((40, 160)),
        5 => Some((125, 220)),
        _ => None,
    }
}

/// What a generation run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    /// Parameters the globe was actually built with.
    pub params: GenerationParams,
    pub tile_count: usize,
    /// Island count and size requested from the grower, before clamping.
    pub islands_requested: usize,
    pub island_size: usize,
    pub stats: TerrainStats,
    /// Islands that kept at least the minimum number of land tiles.
    pub surviving_islands: usize,
    /// Land tiles left after pruning.
    pub land: usize,
}

/// Rebuild `globe` and `state` from scratch.
///
/// Every model in `state` is released, tiles return to unowned water and
/// the RNG is reseeded from `params.seed`, so equal parameters always give
/// equal protocol state. Levels without an island table produce an empty
/// ocean. Afterwards the globe is raised to the final tile heights, tile
/// geometry is recomputed and nothing is selected.
pub fn generate_globe<M>(
    state: &mut WorldState<M>,
    globe: &mut Globe,
    params: &GenerationParams,
) -> GenerationReport {
    let level = params
        .subdivision_level
        .clamp(MIN_SUBDIVISION_LEVEL, MAX_SUBDIVISION_LEVEL);
    if level != params.subdivision_level {
        warn!(
            requested = params.subdivision_level,
            level, "Subdivision level out of range, clamping"
        );
    }
    let params = GenerationParams {
        subdivision_level: level,
        ..params.clone()
    };
    info!(seed = params.seed, level, "Generating globe");

    if globe.level() == level {
        globe.flatten();
    } else {
        *globe = Globe::new(level);
    }
    state.reset(globe.tile_count());
    let mut rng = GlobeRng::new(params.seed);

    let (islands, island_size) = match island_defaults(level) {
        Some((islands, size)) => (
            params.island_override().unwrap_or(islands),
            params.island_size_override().unwrap_or(size),
        ),
        None => {
            debug!(level, "No island table for level, leaving an empty ocean");
            (0, 0)
        }
    };

    let stats = if islands > 0 {
        grow_islands(state, globe, &mut rng, islands, island_size);
        classify_terrain(state, globe, &mut rng)
    } else {
        TerrainStats::default()
    };

    let heights: Vec<f32> = state.tiles.iter().map(|t| t.height).collect();
    globe.raise(&heights);
    state.compute_geometry(globe);
    state.clear_selection();

    let report = GenerationReport {
        tile_count: state.tile_count(),
        islands_requested: islands,
        island_size,
        stats,
        surviving_islands: state.islands.iter().filter(|i| !i.failed()).count(),
        land: state.land_count(),
        params,
    };
    info!(
        tiles = report.tile_count,
        islands = report.surviving_islands,
        land = report.land,
        "Globe generated"
    );
    report
}

/// Print a summary of the generated globe.
pub fn print_globe_summary<M>(state: &WorldState<M>, report: &GenerationReport) {
    println!("=== Globe Summary ===");
    println!("Seed: {}", report.params.seed);
    println!("Subdivision level: {}", report.params.subdivision_level);
    println!("Tiles: {}", report.tile_count);
    println!(
        "Islands: {} requested ({} tiles each), {} survived",
        report.islands_requested, report.island_size, report.surviving_islands
    );

    let mut terrain_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for tile in state.tiles() {
        *terrain_counts.entry(tile.terrain.name()).or_insert(0) += 1;
    }
    let total = report.tile_count.max(1);
    println!("\nTerrain:");
    for (name, count) in &terrain_counts {
        let pct = *count as f32 / total as f32 * 100.0;
        println!("  {:<12} {:>6} ({:.1}%)", name, count, pct);
    }

    if state.islands().is_empty() {
        return;
    }
    println!("\nIslands:");
    println!("  {:>4} {:>7} {:>6} {:>6}", "#", "Root", "Tiles", "Land");
    for (i, island) in state.islands().iter().enumerate() {
        let mark = if island.failed() { " (pruned)" } else { "" };
        println!(
            "  {:>4} {:>7} {:>6} {:>6}{}",
            i, island.root, island.tiles, island.land, mark
        );
    }
}
