//! Configuration loading
//!
//! Loads configuration from the settings store or the embedded
//! `machine.toml`, parsed by the core crate's no_std TOML subset parser.

pub mod loader;

pub use loader::{load_config, ConfigPersistence};
