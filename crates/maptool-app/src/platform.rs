//! OS-specific directories for configuration and logs.

use std::path::{Path, PathBuf};

use thiserror::Error;

const APP_NAME: &str = "maptool";

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("could not determine OS configuration directory")]
    NoConfigDir,

    #[error("platform I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where the map tool keeps its files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppDirs {
    /// `config.ron`.
    pub config_dir: PathBuf,
    /// `maptool.log` in debug builds.
    pub log_dir: PathBuf,
}

impl AppDirs {
    /// Resolve the directories without creating them.
    pub fn resolve() -> Result<Self, PlatformError> {
        let base = dirs::config_dir().ok_or(PlatformError::NoConfigDir)?;
        Ok(Self::resolve_with_root(&base))
    }

    /// Directories under a custom base path.
    pub fn resolve_with_root(root: &Path) -> Self {
        let app_dir = root.join(APP_NAME);
        Self {
            config_dir: app_dir.clone(),
            log_dir: app_dir.join("logs"),
        }
    }

    /// Use `config_dir` for configuration, keeping logs beside it.
    pub fn with_config_dir(config_dir: PathBuf) -> Self {
        let log_dir = config_dir.join("logs");
        Self { config_dir, log_dir }
    }

    pub fn create(&self) -> Result<(), PlatformError> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }
}
