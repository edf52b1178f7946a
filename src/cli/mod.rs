//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod info;
mod render;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::{
    config_home, find_config_from, find_config_in_home, load_config, CliOverrides, ConfigError,
    SpriteLayerConfig,
};

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Spritelayer - composite sprite scenes into PNG frames
#[derive(Parser)]
#[command(name = "sprl")]
#[command(about = "Spritelayer - composite layered sprite scenes (.json) into PNG frames")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render one frame of a scene to PNG
    Render {
        /// Scene file (.json)
        scene: PathBuf,

        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,

        /// Config file; defaults to the nearest spritelayer.toml above the scene
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Scale output by integer factor (1-16, default: 1)
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(u8).range(1..=16))]
        scale: u8,

        /// Composite horizontal bands in parallel
        #[arg(long)]
        parallel: bool,

        /// Rows per parallel band (overrides render.band_height)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        band_height: Option<u32>,
    },

    /// Print every sprite's geometry and visibility
    Info {
        /// Scene file (.json)
        scene: PathBuf,

        /// Config file; defaults to the nearest spritelayer.toml above the scene
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Render { scene, output, config, scale, parallel, band_height } => {
            let overrides = CliOverrides { parallel: parallel.then_some(true), band_height };
            render::run_render(&scene, &output, config.as_deref(), scale, &overrides)
        }
        Commands::Info { scene, config } => info::run_info(&scene, config.as_deref()),
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let subscriber =
        FmtSubscriber::builder().with_env_filter(filter).with_writer(std::io::stderr).finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Warning: logging was already initialized");
    }
}

/// Load the explicit config, or the nearest one above the scene, or the
/// user's `spritelayer/spritelayer.toml`, or defaults.
pub(crate) fn resolve_config(
    explicit: Option<&Path>,
    scene: &Path,
) -> Result<SpriteLayerConfig, ConfigError> {
    resolve_config_in(explicit, scene, config_home().as_deref())
}

fn resolve_config_in(
    explicit: Option<&Path>,
    scene: &Path,
    home: Option<&Path>,
) -> Result<SpriteLayerConfig, ConfigError> {
    if let Some(path) = explicit {
        return load_config(path);
    }

    let start = match scene.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let found = find_config_from(start).or_else(|| home.and_then(find_config_in_home));
    match found {
        Some(path) => load_config(&path),
        None => {
            tracing::debug!("no spritelayer.toml found, using defaults");
            Ok(SpriteLayerConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_render_args() {
        let cli = Cli::try_parse_from([
            "sprl", "render", "scene.json", "-o", "out.png", "--scale", "4", "--parallel", "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Render { scene, output, scale, parallel, config, band_height } => {
                assert_eq!(scene, PathBuf::from("scene.json"));
                assert_eq!(output, PathBuf::from("out.png"));
                assert_eq!(scale, 4);
                assert!(parallel);
                assert!(config.is_none());
                assert!(band_height.is_none());
            }
            Commands::Info { .. } => panic!("expected render"),
        }
    }

    #[test]
    fn test_scale_out_of_range_rejected() {
        let args = ["sprl", "render", "s.json", "-o", "o.png", "--scale", "17"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_zero_band_height_rejected() {
        let args = ["sprl", "render", "s.json", "-o", "o.png", "--band-height", "0"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_resolve_config_next_to_scene() {
        let temp = TempDir::new().expect("should create temp dir");
        std::fs::write(temp.path().join("spritelayer.toml"), "[raster]\nwidth = 99\n")
            .expect("should write config");
        let scene = temp.path().join("scene.json");

        let config = resolve_config(None, &scene).expect("config should resolve");
        assert_eq!(config.raster.width, 99);
    }

    #[test]
    fn test_resolve_config_falls_back_to_home() {
        let project = TempDir::new().expect("should create temp dir");
        let home = TempDir::new().expect("should create temp dir");
        let user_dir = home.path().join("spritelayer");
        std::fs::create_dir_all(&user_dir).expect("should create config dir");
        std::fs::write(user_dir.join("spritelayer.toml"), "[raster]\nwidth = 77\n")
            .expect("should write config");
        let scene = project.path().join("scene.json");

        let config = resolve_config_in(None, &scene, Some(home.path())).expect("should resolve");
        assert_eq!(config.raster.width, 77);

        // A project config wins over the user one
        std::fs::write(project.path().join("spritelayer.toml"), "[raster]\nwidth = 12\n")
            .expect("should write config");
        let config = resolve_config_in(None, &scene, Some(home.path())).expect("should resolve");
        assert_eq!(config.raster.width, 12);
    }

    #[test]
    fn test_resolve_config_defaults_without_files() {
        let project = TempDir::new().expect("should create temp dir");
        let home = TempDir::new().expect("should create temp dir");
        let scene = project.path().join("scene.json");

        let config = resolve_config_in(None, &scene, Some(home.path())).expect("should resolve");
        assert_eq!(config, SpriteLayerConfig::default());
    }
}
