//! Configuration system for the map tool.
//!
//! Settings persist to disk as a RON file, every section falls back to its
//! defaults when missing, and CLI flags override the loaded values.

pub mod cli;
pub mod config;
pub mod error;

pub use cli::CliArgs;
pub use config::{
    CONFIG_FILE, CameraConfig, Config, DebugConfig, InputConfig, RenderConfig, TerrainConfig,
    WindowConfig,
};
pub use error::ConfigError;
