//! The map tool binary: loads configuration, sets up logging and runs the
//! scene headless against scripted input.

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use maptool_app::app::{load_textures, run_headless};
use maptool_app::platform::AppDirs;
use maptool_app::script::InputScript;
use maptool_config::{CliArgs, Config};
use maptool_log::init_logging;

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let dirs = match &args.config {
        Some(dir) => AppDirs::with_config_dir(dir.clone()),
        None => match AppDirs::resolve() {
            Ok(dirs) => dirs,
            Err(e) => {
                eprintln!("Failed to resolve platform directories: {e}");
                return ExitCode::FAILURE;
            }
        },
    };
    if let Err(e) = dirs.create() {
        eprintln!("Failed to create {}: {e}", dirs.config_dir.display());
        return ExitCode::FAILURE;
    }

    let mut config = match Config::load_or_create(&dirs.config_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config, using defaults: {e}");
            Config::default()
        }
    };
    config.apply_cli_overrides(&args);

    init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));
    info!(config = %dirs.config_dir.display(), "{} starting", config.window.title);

    let catalog = load_textures(&config.terrain.texture_dir);
    let script = InputScript::tour(config.window.width, config.window.height);
    match run_headless(&config, catalog, &script) {
        Ok(summary) => {
            info!(
                frames = summary.frames,
                picks = summary.picks,
                last_pick = ?summary.last_pick,
                drawn = summary.stats.cells_drawn,
                culled = summary.stats.cells_culled,
                "run finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
