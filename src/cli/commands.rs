use std::path::Path;

use glam::Vec3;
use serde::Serialize;

use crate::assets::{FsModelLoader, ModelFile};
use crate::config::generation::GenerationParams;
use crate::config::runtime::RuntimeConfig;
use crate::persistence::{self, GlobeSnapshot};
use crate::world::generation::{generate_globe, print_globe_summary, GenerationReport};
use crate::world::topology::{MAX_SUBDIVISION_LEVEL, MIN_SUBDIVISION_LEVEL};
use crate::world::{Globe, IslandId, Terrain, TileGraph, WorldState};

/// Parse `x,y,z` into a vector.
pub fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [x, y, z] = parts.as_slice() else {
        return Err(format!("expected x,y,z, got '{}'", s));
    };
    let component = |v: &str| {
        v.parse::<f32>()
            .map_err(|e| format!("invalid component '{}': {}", v, e))
    };
    Ok(Vec3::new(component(x)?, component(y)?, component(z)?))
}

/// A generated globe held in memory by a command.
pub struct Session {
    pub state: WorldState<ModelFile>,
    pub globe: Globe,
    pub report: GenerationReport,
}

impl Session {
    pub fn generate(params: &GenerationParams) -> Self {
        let mut state = WorldState::new();
        let level = params
            .subdivision_level
            .clamp(MIN_SUBDIVISION_LEVEL, MAX_SUBDIVISION_LEVEL);
        let mut globe = Globe::new(level);
        let report = generate_globe(&mut state, &mut globe, params);
        Session {
            state,
            globe,
            report,
        }
    }

    /// Regenerate the globe a snapshot was taken from. Fails if the result
    /// does not reproduce the saved protocol state.
    pub fn restore(snapshot: &GlobeSnapshot) -> Result<Self, String> {
        let session = Self::generate(&snapshot.params);
        match snapshot.first_mismatch(&session.state) {
            None if snapshot.matches(&session.state) => Ok(session),
            None => Err("Island table differs from snapshot".to_string()),
            Some(tile) => Err(format!("Tile {} differs from snapshot", tile)),
        }
    }
}

fn load_snapshot_or_latest(config: &RuntimeConfig, path: Option<&str>) -> Result<GlobeSnapshot, String> {
    match path {
        Some(path) => persistence::load_snapshot(Path::new(path)),
        None => persistence::load_latest_valid_snapshot(Path::new(&config.snapshot_directory)),
    }
    .map_err(|e| format!("Failed to load snapshot: {}", e))
}

/// Generate a globe, print its summary and save it as a snapshot.
pub fn generate(
    config: &RuntimeConfig,
    params: &GenerationParams,
    output: Option<&str>,
    test_model: Option<&str>,
) -> Result<(), String> {
    params.validate()?;
    let mut session = Session::generate(params);
    print_globe_summary(&session.state, &session.report);

    if let Some(model) = test_model {
        let mut loader = FsModelLoader::new(&config.asset_directory);
        let placed = session.state.apply_test_model(model, &mut loader);
        println!("\nTest model '{}' placed on {} land tiles", model, placed);
    }

    let snapshot_dir = Path::new(output.unwrap_or(&config.snapshot_directory));
    let snapshot = GlobeSnapshot::from_state(&session.state, &session.report.params);
    let path = persistence::save_snapshot(&snapshot, snapshot_dir)
        .map_err(|e| format!("Cannot save snapshot: {}", e))?;
    println!("\nGlobe saved to {}", path.display());

    if let Err(e) = persistence::prune_snapshots(snapshot_dir, config.max_snapshots as usize) {
        tracing::warn!(error = %e, "Snapshot pruning failed");
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct TileReport {
    pub tile: usize,
    pub terrain: Terrain,
    pub height: f32,
    pub island: Option<IslandId>,
    pub latitude: f32,
    pub neighbors: [usize; 3],
    pub region: Vec<usize>,
    pub origin: Vec3,
    pub normal: Vec3,
    pub forward: Vec3,
}

impl TileReport {
    pub fn new(session: &Session, tile: usize) -> Result<Self, String> {
        let data = session.state.tile(tile).ok_or_else(|| {
            format!(
                "Tile {} not found (globe has {} tiles)",
                tile,
                session.state.tile_count()
            )
        })?;
        Ok(TileReport {
            tile,
            terrain: data.terrain,
            height: data.height,
            island: data.island,
            latitude: session.globe.latitude(tile),
            neighbors: session.globe.neighbors(tile),
            region: session.globe.region(tile).to_vec(),
            origin: data.origin,
            normal: data.normal,
            forward: data.forward,
        })
    }

    fn print(&self) {
        println!("=== Tile {} ===", self.tile);
        println!("Terrain: {}", self.terrain.name());
        println!("Height: {:.3}", self.height);
        match self.island {
            Some(id) => println!("Island: {}", id.index()),
            None => println!("Island: (none)"),
        }
        println!("Latitude: {:.1}°", self.latitude.to_degrees());
        println!("Neighbors: {:?}", self.neighbors);
        println!("Region: {:?}", self.region);
        println!(
            "Origin: ({:.3}, {:.3}, {:.3})",
            self.origin.x, self.origin.y, self.origin.z
        );
        println!(
            "Normal: ({:.3}, {:.3}, {:.3})",
            self.normal.x, self.normal.y, self.normal.z
        );
    }
}

/// Show one tile of a saved globe.
pub fn inspect(config: &RuntimeConfig, snapshot: Option<&str>, tile: usize, json: bool) -> Result<(), String> {
    let snapshot = load_snapshot_or_latest(config, snapshot)?;
    let session = Session::restore(&snapshot)?;
    let report = TileReport::new(&session, tile)?;
    if json {
        let text = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
        println!("{}", text);
    } else {
        report.print();
    }
    Ok(())
}

/// Cast a pointer ray at a saved globe and report the tile it selects.
///
/// The ray direction doubles as the camera axis for visibility.
pub fn pick(
    config: &RuntimeConfig,
    snapshot: Option<&str>,
    origin: Vec3,
    direction: Vec3,
) -> Result<Option<usize>, String> {
    let direction = direction.try_normalize().ok_or("Ray direction must be non-zero")?;
    let snapshot = load_snapshot_or_latest(config, snapshot)?;
    let mut session = Session::restore(&snapshot)?;

    let radius = session.globe.radius();
    session
        .state
        .update_visibility(direction, config.draw_distance, radius);
    let picked = session.state.pick(&session.globe, origin, direction);
    match picked {
        Some(tile) => TileReport::new(&session, tile)?.print(),
        None => println!("No tile under the ray"),
    }
    println!("({} ray tests)", session.state.ray_tests());
    Ok(picked)
}

/// Regenerate a snapshot from its parameters and compare protocol state.
pub fn verify(path: &str) -> Result<(), String> {
    let snapshot = persistence::load_snapshot(Path::new(path))
        .map_err(|e| format!("Failed to load snapshot: {}", e))?;
    Session::restore(&snapshot)?;
    println!(
        "{}: {} tiles, {} islands match seed {}",
        path,
        snapshot.tile_count,
        snapshot.islands.len(),
        snapshot.params.seed
    );
    Ok(())
}

pub fn list_snapshots(dir: &Path) -> Result<(), String> {
    let snapshots =
        persistence::list_snapshots(dir).map_err(|e| format!("Error listing snapshots: {}", e))?;
    if snapshots.is_empty() {
        println!("No snapshots found in {}", dir.display());
        return Ok(());
    }
    println!("{:<40} {:>20} {:>12}", "File", "Seed", "Size");
    println!("{}", "-".repeat(74));
    for s in &snapshots {
        let name = s.path.file_name().and_then(|n| n.to_str()).unwrap_or("?");
        println!("{:<40} {:>20} {:>9} KB", name, s.seed, s.file_size / 1024);
    }
    println!("\n{} snapshot(s) in {}", snapshots.len(), dir.display());
    Ok(())
}
