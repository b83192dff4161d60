// src/config/mod.rs

//! Configuration loading for `fallbuild`.
//!
//! - [`model`] maps the TOML file to structs with defaults.
//! - [`loader`] reads and validates a config file from disk.
//! - [`validate`] turns a raw file into a validated [`ConfigFile`].

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{ConfigFile, ProjectSection, RawConfigFile, StrategySection};
