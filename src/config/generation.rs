use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::world::topology::{MAX_SUBDIVISION_LEVEL, MIN_SUBDIVISION_LEVEL};

fn default_subdivision_level() -> u32 {
    4
}

/// Parameters a globe is generated from. Two runs with equal parameters
/// produce identical protocol state, so these are stored with every
/// snapshot.
///
/// `islands` and `island_size` override the per-level defaults when
/// positive; zero or negative means "use the default".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_subdivision_level")]
    pub subdivision_level: u32,
    #[serde(default)]
    pub islands: i32,
    #[serde(default)]
    pub island_size: i32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        GenerationParams {
            seed: 0,
            subdivision_level: default_subdivision_level(),
            islands: 0,
            island_size: 0,
        }
    }
}

impl GenerationParams {
    /// Load generation parameters from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
        Self::from_toml_str(&content, path)
    }

    pub fn from_toml_str(content: &str, source_path: &Path) -> Result<Self, String> {
        let params: Self = toml::from_str(content)
            .map_err(|e| format!("Invalid TOML in {}: {}", source_path.display(), e))?;
        params.validate()?;
        Ok(params)
    }

    /// Validate parameter ranges. Island overrides are never an error; out
    /// of range values are clamped during generation.
    pub fn validate(&self) -> Result<(), String> {
        let levels = MIN_SUBDIVISION_LEVEL..=MAX_SUBDIVISION_LEVEL;
        if !levels.contains(&self.subdivision_level) {
            return Err(format!(
                "subdivision_level must be {}-{}, got {}. Example: subdivision_level = 4",
                MIN_SUBDIVISION_LEVEL, MAX_SUBDIVISION_LEVEL, self.subdivision_level
            ));
        }
        Ok(())
    }

    /// Island count override, if one was given.
    pub fn island_override(&self) -> Option<usize> {
        positive(self.islands)
    }

    /// Island size override, if one was given.
    pub fn island_size_override(&self) -> Option<usize> {
        positive(self.island_size)
    }
}

fn positive(value: i32) -> Option<usize> {
    usize::try_from(value).ok().filter(|&v| v > 0)
}
