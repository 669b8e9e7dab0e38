use serde::Deserialize;
use std::path::Path;

/// Settings for the command line front end. Nothing here affects generated
/// state.
#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_json: bool,
    #[serde(default = "default_snapshot_directory")]
    pub snapshot_directory: String,
    #[serde(default = "default_max_snapshots")]
    pub max_snapshots: u32,
    #[serde(default = "default_asset_directory")]
    pub asset_directory: String,
    /// Camera draw distance used for visibility, in world units.
    #[serde(default = "default_draw_distance")]
    pub draw_distance: f32,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_snapshot_directory() -> String {
    "./snapshots".to_string()
}
fn default_max_snapshots() -> u32 {
    10
}
fn default_asset_directory() -> String {
    "./models".to_string()
}
fn default_draw_distance() -> f32 {
    256.0
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            log_level: default_log_level(),
            log_json: false,
            snapshot_directory: default_snapshot_directory(),
            max_snapshots: default_max_snapshots(),
            asset_directory: default_asset_directory(),
            draw_distance: default_draw_distance(),
        }
    }
}

impl RuntimeConfig {
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
        Self::from_toml_str(&content, path)
    }

    /// Like [`RuntimeConfig::from_file`], but a missing file yields the
    /// defaults.
    pub fn from_file_or_default(path: &Path) -> Result<Self, String> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(content: &str, source_path: &Path) -> Result<Self, String> {
        let config: RuntimeConfig =
            toml::from_str(content).map_err(|e| format!("{}: {}", source_path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        let mut errors = Vec::new();

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            errors.push(format!(
                "log_level must be one of {:?}, got '{}'. Example: log_level = \"info\"",
                valid_levels, self.log_level
            ));
        }

        if self.max_snapshots == 0 {
            errors.push(format!(
                "max_snapshots must be > 0, got {}. Example: max_snapshots = 10",
                self.max_snapshots
            ));
        }

        if !(self.draw_distance > 0.0) {
            errors.push(format!(
                "draw_distance must be > 0.0, got {}. Example: draw_distance = 256.0",
                self.draw_distance
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.join("\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    fn test_path() -> PathBuf {
        PathBuf::from("test-config.toml")
    }

    #[test]
    fn valid_config_loads_all_fields() {
        let toml = r#"
            log_level = "debug"
            log_json = true
            snapshot_directory = "./data/globes"
            max_snapshots = 3
            asset_directory = "./assets"
            draw_distance = 64.0
        "#;
        let config = RuntimeConfig::from_toml_str(toml, &test_path()).unwrap();
        assert_eq!(config.log_level, "debug");
        assert!(config.log_json);
        assert_eq!(config.snapshot_directory, "./data/globes");
        assert_eq!(config.max_snapshots, 3);
        assert_eq!(config.asset_directory, "./assets");
        assert_eq!(config.draw_distance, 64.0);
    }

    #[test]
    fn defaults_applied_for_empty_config() {
        let config = RuntimeConfig::from_toml_str("", &test_path()).unwrap();
        assert_eq!(config.log_level, "info");
        assert!(!config.log_json);
        assert_eq!(config.snapshot_directory, "./snapshots");
        assert_eq!(config.max_snapshots, 10);
        assert_eq!(config.draw_distance, 256.0);
    }

    #[test]
    fn invalid_log_level_rejected() {
        let err =
            RuntimeConfig::from_toml_str(r#"log_level = "verbose""#, &test_path()).unwrap_err();
        assert!(err.contains("log_level"));
    }

    #[test]
    fn multiple_errors_reported_together() {
        let toml = "max_snapshots = 0\ndraw_distance = -1.0";
        let err = RuntimeConfig::from_toml_str(toml, &test_path()).unwrap_err();
        assert!(err.contains("max_snapshots"));
        assert!(err.contains("draw_distance"));
    }

    #[test]
    fn malformed_toml_includes_source_path() {
        let err = RuntimeConfig::from_toml_str("log_level = [", &test_path()).unwrap_err();
        assert!(err.contains("test-config.toml"));
    }

    #[test]
    fn from_file_loads_valid_config() {
        let mut tmp = NamedTempFile::new().unwrap();
        use std::io::Write;
        writeln!(tmp, "draw_distance = 32.0").unwrap();
        let config = RuntimeConfig::from_file(tmp.path()).unwrap();
        assert_eq!(config.draw_distance, 32.0);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = Path::new("/nonexistent/archipelago.toml");
        assert!(RuntimeConfig::from_file(path).unwrap_err().contains("Cannot read"));
        let config = RuntimeConfig::from_file_or_default(path).unwrap();
        assert_eq!(config.log_level, "info");
    }
}
