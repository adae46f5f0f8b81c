//! Configuration structs with sensible defaults and RON persistence.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level tool configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Rendering settings.
    pub render: RenderConfig,
    /// Camera movement settings.
    pub camera: CameraConfig,
    /// Defaults for newly created terrain.
    pub terrain: TerrainConfig,
    /// Input settings.
    pub input: InputConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Viewport width in pixels.
    pub width: u32,
    /// Viewport height in pixels.
    pub height: u32,
    /// Window title.
    pub title: String,
}

/// Rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Far plane depth used for the projection and the view frustum.
    pub screen_depth: f32,
    /// Near plane depth.
    pub screen_near: f32,
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
}

/// Camera movement configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Maximum translation speed in world units per second.
    pub move_speed: f32,
    /// Maximum turn speed in degrees per second.
    pub turn_speed: f32,
}

/// Defaults applied to the new-map request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// Radio index of the cell size (0..=4 maps to 4, 8, 16, 32, 64).
    pub cell_size_choice: u32,
    /// Radio index of the tile size (0..=4 maps to 4, 8, 16, 32, 64).
    pub tile_size_choice: u32,
    /// Directory scanned for terrain textures.
    pub texture_dir: PathBuf,
    /// File name of the preselected texture, if any.
    pub texture: Option<String>,
    /// Vertical scale applied to the generated heightmap (0 gives flat terrain).
    pub height_scale: f32,
    /// Heightmap noise seed.
    pub seed: u32,
    /// Brush radius in world units.
    pub brush_radius: f32,
}

/// Input configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    /// Keybinding overrides (action name -> key name).
    pub keybindings: HashMap<String, String>,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Number of frames the headless runner drives before exiting.
    pub headless_frames: u64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            title: "Map Tool".to_string(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            screen_depth: 1000.0,
            screen_near: 0.1,
            fov_y_degrees: 45.0,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            move_speed: 10.0,
            turn_speed: 90.0,
        }
    }
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            cell_size_choice: 1,
            tile_size_choice: 0,
            texture_dir: PathBuf::from("Data/Textures"),
            texture: None,
            height_scale: 4.0,
            seed: 0,
            brush_radius: 3.0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            headless_frames: 300,
        }
    }
}

/// File name of the persisted configuration inside the config directory.
pub const CONFIG_FILE: &str = "config.ron";

impl Config {
    /// Location of the config file within `config_dir`.
    pub fn path_in(config_dir: &Path) -> PathBuf {
        config_dir.join(CONFIG_FILE)
    }

    /// Reads `config.ron` from `config_dir`, writing the defaults there first
    /// when no file exists yet.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = Self::path_in(config_dir);
        if !path.exists() {
            let config = Self::default();
            config.save(config_dir)?;
            log::info!("Wrote default map tool config to {}", path.display());
            return Ok(config);
        }

        let config = Self::read(&path)?;
        log::info!("Map tool config loaded from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let path = Self::path_in(config_dir);
        let write_err = |source| ConfigError::Write {
            path: path.clone(),
            source,
        };
        std::fs::create_dir_all(config_dir).map_err(write_err)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let text = ron::ser::to_string_pretty(self, pretty)?;
        std::fs::write(&path, text).map_err(write_err)
    }

    /// Re-reads the file on disk. Yields the new value only when it differs
    /// from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let fresh = Self::read(&Self::path_in(config_dir))?;
        if fresh == *self {
            return Ok(None);
        }
        log::info!("Map tool config changed on disk");
        Ok(Some(fresh))
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
