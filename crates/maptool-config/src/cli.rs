//! Command-line argument parsing for the map tool.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Map tool command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "maptool", about = "Terrain map tool")]
pub struct CliArgs {
    /// Viewport width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Viewport height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Cell size radio index (0..=4 for 4, 8, 16, 32, 64 quads).
    #[arg(long)]
    pub cell_size: Option<u32>,

    /// Tile size radio index (0..=4 for 4, 8, 16, 32, 64 cells).
    #[arg(long)]
    pub tile_size: Option<u32>,

    /// Texture file name to use for the new terrain.
    #[arg(long)]
    pub texture: Option<String>,

    /// Heightmap seed.
    #[arg(long)]
    pub seed: Option<u32>,

    /// Number of frames to run headless.
    #[arg(long)]
    pub frames: Option<u64>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(choice) = args.cell_size {
            self.terrain.cell_size_choice = choice;
        }
        if let Some(choice) = args.tile_size {
            self.terrain.tile_size_choice = choice;
        }
        if let Some(ref texture) = args.texture {
            self.terrain.texture = Some(texture.clone());
        }
        if let Some(seed) = args.seed {
            self.terrain.seed = seed;
        }
        if let Some(frames) = args.frames {
            self.debug.headless_frames = frames;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            width: Some(1920),
            cell_size: Some(3),
            texture: Some("dirt.png".to_string()),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.window.width, 1920);
        assert_eq!(config.terrain.cell_size_choice, 3);
        assert_eq!(config.terrain.texture.as_deref(), Some("dirt.png"));
        // Non-overridden fields retain defaults
        assert_eq!(config.window.height, 768);
        assert_eq!(config.terrain.tile_size_choice, 0);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::parse_from(["maptool", "--tile-size", "2", "--frames", "10"]);
        assert_eq!(args.tile_size, Some(2));
        assert_eq!(args.frames, Some(10));
        assert!(args.config.is_none());
    }
}
