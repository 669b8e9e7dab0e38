use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AssetError;

/// Loads decorative tile models. Dropping a model releases it.
pub trait ModelLoader {
    type Model;

    fn load(&mut self, path: &str) -> Result<Self::Model, AssetError>;
}

/// Raw model data read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFile {
    pub path: PathBuf,
    pub data: Vec<u8>,
}

/// Reads model files relative to an asset root directory.
#[derive(Debug, Clone)]
pub struct FsModelLoader {
    root: PathBuf,
}

impl FsModelLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ModelLoader for FsModelLoader {
    type Model = ModelFile;

    fn load(&mut self, path: &str) -> Result<ModelFile, AssetError> {
        let full = self.root.join(path);
        if !full.is_file() {
            return Err(AssetError::NotFound(full));
        }
        let data = fs::read(&full).map_err(|source| AssetError::Io {
            path: full.clone(),
            source,
        })?;
        if data.is_empty() {
            return Err(AssetError::Empty(full));
        }
        Ok(ModelFile { path: full, data })
    }
}
