use std::path::PathBuf;

use thiserror::Error;

/// Failures reported by world-state operations.
///
/// None of these are fatal: generation itself never fails, and a failed
/// model load leaves the tile exactly as it was.
#[derive(Debug, Error)]
pub enum GlobeError {
    #[error("tile {tile} out of range (globe has {tile_count} tiles)")]
    TileOutOfRange { tile: usize, tile_count: usize },

    #[error("cannot load model for tile {tile}: {source}")]
    AssetLoad {
        tile: usize,
        #[source]
        source: AssetError,
    },
}

/// Errors raised by a [`crate::assets::ModelLoader`].
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("model not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("cannot read model {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model {} is empty", .0.display())]
    Empty(PathBuf),
}
