use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::generation::GenerationParams;
use crate::world::{Island, ProtocolTile, WorldState};

/// The protocol-relevant result of a generation run, together with the
/// parameters that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobeSnapshot {
    pub params: GenerationParams,
    pub tile_count: usize,
    pub islands: Vec<Island>,
    pub tiles: Vec<ProtocolTile>,
}

impl GlobeSnapshot {
    pub fn from_state<M>(state: &WorldState<M>, params: &GenerationParams) -> Self {
        GlobeSnapshot {
            params: params.clone(),
            tile_count: state.tile_count(),
            islands: state.islands().to_vec(),
            tiles: state.protocol_state(),
        }
    }

    /// Index of the first tile whose protocol state differs from `state`.
    /// A tile count mismatch is reported at the end of the shorter list.
    pub fn first_mismatch<M>(&self, state: &WorldState<M>) -> Option<usize> {
        let current = state.protocol_state();
        let differing = self
            .tiles
            .iter()
            .zip(&current)
            .position(|(saved, now)| saved != now);
        match differing {
            Some(i) => Some(i),
            None if self.tiles.len() != current.len() => Some(self.tiles.len().min(current.len())),
            None => None,
        }
    }

    /// True if `state` holds exactly the tiles and islands of this snapshot.
    pub fn matches<M>(&self, state: &WorldState<M>) -> bool {
        self.islands.as_slice() == state.islands() && self.first_mismatch(state).is_none()
    }
}

/// Metadata about a snapshot file on disk.
#[derive(Debug, Clone)]
pub struct SnapshotMetadata {
    pub path: PathBuf,
    pub seed: u64,
    pub timestamp: u64,
    pub file_size: u64,
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("deserialization error: {0}")]
    Deserialize(String),

    #[error("corrupt snapshot: {}", .0.display())]
    Corrupt(PathBuf),

    #[error("no valid snapshots found; generate a globe with: archipelago generate")]
    NoValidSnapshots,
}

fn snapshot_filename(seed: u64, timestamp: u64) -> String {
    format!("globe-seed{}-{}.bin", seed, timestamp)
}

/// Parse seed and timestamp from `globe-seed{N}-{timestamp}.bin`.
fn parse_snapshot_filename(filename: &str) -> Option<(u64, u64)> {
    let stem = filename.strip_suffix(".bin")?;
    let rest = stem.strip_prefix("globe-seed")?;
    let (seed_str, ts_str) = rest.split_once('-')?;
    let seed = seed_str.parse::<u64>().ok()?;
    let ts = ts_str.parse::<u64>().ok()?;
    Some((seed, ts))
}

fn unix_timestamp_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Save a snapshot into `snapshot_dir`.
///
/// The data goes to a hidden temporary file that is then renamed into
/// place, so an interrupted save never leaves a partial snapshot behind.
pub fn save_snapshot(snapshot: &GlobeSnapshot, snapshot_dir: &Path) -> Result<PathBuf, SnapshotError> {
    fs::create_dir_all(snapshot_dir)?;

    let filename = snapshot_filename(snapshot.params.seed, unix_timestamp_now());
    let target = snapshot_dir.join(&filename);
    let tmp = snapshot_dir.join(format!(".{}.tmp", filename));

    let encoded =
        bincode::serialize(snapshot).map_err(|e| SnapshotError::Serialize(e.to_string()))?;

    if let Err(e) = fs::write(&tmp, &encoded) {
        let _ = fs::remove_file(&tmp);
        return Err(SnapshotError::Io(e));
    }
    if let Err(e) = fs::rename(&tmp, &target) {
        let _ = fs::remove_file(&tmp);
        return Err(SnapshotError::Io(e));
    }

    debug!(path = %target.display(), bytes = encoded.len(), "Snapshot saved");
    Ok(target)
}

/// Load a snapshot, rejecting files whose tile list disagrees with their
/// recorded tile count.
pub fn load_snapshot(path: &Path) -> Result<GlobeSnapshot, SnapshotError> {
    let data = fs::read(path)?;
    let snapshot: GlobeSnapshot =
        bincode::deserialize(&data).map_err(|e| SnapshotError::Deserialize(e.to_string()))?;

    if snapshot.tiles.len() != snapshot.tile_count {
        return Err(SnapshotError::Corrupt(path.to_path_buf()));
    }
    Ok(snapshot)
}

/// List snapshot files in a directory, newest first.
pub fn list_snapshots(snapshot_dir: &Path) -> Result<Vec<SnapshotMetadata>, SnapshotError> {
    if !snapshot_dir.exists() {
        return Ok(Vec::new());
    }

    let mut snapshots = Vec::new();
    for entry in fs::read_dir(snapshot_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if filename.starts_with('.') {
            continue;
        }
        if let Some((seed, timestamp)) = parse_snapshot_filename(filename) {
            let file_size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            snapshots.push(SnapshotMetadata {
                path: path.clone(),
                seed,
                timestamp,
                file_size,
            });
        }
    }

    snapshots.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.seed.cmp(&a.seed)));
    Ok(snapshots)
}

/// Delete all but the `max_snapshots` newest snapshots. Returns the deleted
/// paths.
pub fn prune_snapshots(snapshot_dir: &Path, max_snapshots: usize) -> Result<Vec<PathBuf>, SnapshotError> {
    let snapshots = list_snapshots(snapshot_dir)?;
    let mut deleted = Vec::new();
    for snapshot in snapshots.iter().skip(max_snapshots) {
        fs::remove_file(&snapshot.path)?;
        deleted.push(snapshot.path.clone());
    }
    Ok(deleted)
}

/// Load the newest snapshot that decodes, skipping corrupt ones.
pub fn load_latest_valid_snapshot(snapshot_dir: &Path) -> Result<GlobeSnapshot, SnapshotError> {
    for snapshot in list_snapshots(snapshot_dir)? {
        match load_snapshot(&snapshot.path) {
            Ok(loaded) => return Ok(loaded),
            Err(e) => {
                warn!(
                    path = %snapshot.path.display(),
                    error = %e,
                    "Corrupt snapshot, trying next"
                );
            }
        }
    }
    Err(SnapshotError::NoValidSnapshots)
}
