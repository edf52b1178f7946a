//! Configuration loading and discovery for `spritelayer.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::SpriteLayerConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name searched for during discovery
pub const CONFIG_FILE_NAME: &str = "spritelayer.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse spritelayer.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", bullet_list(.0))]
    Validation(Vec<String>),
}

fn bullet_list(lines: &[String]) -> String {
    lines.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n")
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Force band-parallel rendering
    pub parallel: Option<bool>,
    /// Override rows per band
    pub band_height: Option<u32>,
}

/// User config directory: `$XDG_CONFIG_HOME`, else `~/.config`.
pub fn config_home() -> Option<PathBuf> {
    env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()
}

/// Find `spritelayer/spritelayer.toml` under a user config directory.
pub fn find_config_in_home(home: &Path) -> Option<PathBuf> {
    let config_path = home.join("spritelayer").join(CONFIG_FILE_NAME);
    config_path.is_file().then_some(config_path)
}

/// Find spritelayer.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Read and validate a spritelayer.toml file.
pub fn load_config(path: &Path) -> Result<SpriteLayerConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config = parse_config(&contents)?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Parse and validate configuration text.
pub fn parse_config(contents: &str) -> Result<SpriteLayerConfig, ConfigError> {
    let config: SpriteLayerConfig = toml::from_str(contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    Ok(config)
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut SpriteLayerConfig, overrides: &CliOverrides) {
    if let Some(parallel) = overrides.parallel {
        config.render.parallel = parallel;
    }
    if let Some(band_height) = overrides.band_height {
        config.render.band_height = band_height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(dir: &Path, contents: &str) -> PathBuf {
        let config_path = dir.join(CONFIG_FILE_NAME);
        File::create(&config_path)
            .expect("should create config file")
            .write_all(contents.as_bytes())
            .expect("should write config content");
        config_path
    }

    #[test]
    fn test_find_config_in_current_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), "[raster]\nwidth = 320");

        let found = find_config_from(temp.path().to_path_buf());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), "");

        let subdir = temp.path().join("levels").join("intro");
        fs::create_dir_all(&subdir).expect("should create subdirectories");

        let found = find_config_from(subdir);
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_not_found() {
        let temp = TempDir::new().expect("should create temp dir");
        let found = find_config_from(temp.path().to_path_buf());
        assert_eq!(found, None);
    }

    #[test]
    fn test_load_config_from_file() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), "[raster]\nwidth = 320\nheight = 240\n");

        let config = load_config(&config_path).expect("config should load");
        assert_eq!(config.raster.width, 320);
        assert_eq!(config.raster.height, 240);
    }

    #[test]
    fn test_load_config_missing_file() {
        let temp = TempDir::new().expect("should create temp dir");
        let result = load_config(&temp.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), "[raster\nwidth = ");

        let result = load_config(&config_path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_validation_error() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), "[render]\nband_height = 0\n");

        match load_config(&config_path) {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].contains("render.band_height"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_find_config_in_home() {
        let temp = TempDir::new().expect("should create temp dir");
        assert_eq!(find_config_in_home(temp.path()), None);

        let dir = temp.path().join("spritelayer");
        fs::create_dir_all(&dir).expect("should create config dir");
        let config_path = write_config(&dir, "[raster]\nwidth = 64\n");
        assert_eq!(find_config_in_home(temp.path()), Some(config_path));
    }

    #[test]
    fn test_merge_cli_overrides() {
        let mut config = SpriteLayerConfig::default();
        let overrides = CliOverrides { parallel: Some(true), band_height: Some(8) };
        merge_cli_overrides(&mut config, &overrides);
        assert!(config.render.parallel);
        assert_eq!(config.render.band_height, 8);
        assert_eq!(config.raster.width, 640);

        merge_cli_overrides(&mut config, &CliOverrides::default());
        assert_eq!(config.render.band_height, 8);
    }
}
