//! Configuration loading
//!
//! Loads engine tuning from a TOML file or a stored blob, or falls back to
//! the built-in defaults.

pub mod loader;

pub use loader::{
    load_stored, load_toml, parse_config, save_stored, ConfigLoader, ConfigSource, LoadError,
};
