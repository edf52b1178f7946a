//! Configuration for the sprite layer
//!
//! Provides types and parsing for `spritelayer.toml`.

pub mod loader;
pub mod schema;

pub use loader::{
    config_home, find_config_from, find_config_in_home, load_config, merge_cli_overrides,
    parse_config, CliOverrides, ConfigError, CONFIG_FILE_NAME,
};
pub use schema::*;
