//! Wiring from configuration to a running scene.

use std::path::Path;

use glam::Vec3;
use thiserror::Error;
use tracing::{debug, info, warn};

use maptool_config::{Config, TerrainConfig};
use maptool_input::{InputState, KeyBindings};
use maptool_render::{
    CameraSpeeds, HeadlessDevice, RecordingShaders, TextureCatalog, TextureManager,
};
use maptool_scene::{FrameContext, SceneError, SceneOptions, SceneOrchestrator, SceneState};
use maptool_terrain::{DescriptorError, NewMapRequest, RenderStats, TerrainDescriptor};

use crate::frame_clock::FrameClock;
use crate::script::InputScript;

/// Simulated frame time of a headless run.
pub const HEADLESS_FRAME_TIME: f64 = 1.0 / 60.0;

/// Frames between progress log lines.
const STATS_LOG_INTERVAL: u64 = 60;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid new-map settings: {0}")]
    Descriptor(#[from] DescriptorError),

    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Outcome of a headless run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub picks: usize,
    pub last_pick: Option<Vec3>,
    pub stats: RenderStats,
    pub state: SceneState,
    pub camera_position: Vec3,
}

/// List the textures in `dir`, or none if it cannot be read.
pub fn load_textures(dir: &Path) -> TextureCatalog {
    match TextureCatalog::scan(dir) {
        Ok(catalog) => catalog,
        Err(e) => {
            warn!("{e}; terrain will be untextured");
            TextureCatalog::from_names(dir, Vec::new())
        }
    }
}

/// Fill in the new-map dialog from configuration and confirm it.
///
/// A configured texture must exist in `catalog`. Without one the first
/// texture is used, or index 0 of an empty catalog, which draws untextured.
pub fn new_map_descriptor(
    terrain: &TerrainConfig,
    catalog: &TextureCatalog,
) -> Result<TerrainDescriptor, DescriptorError> {
    let mut request = NewMapRequest {
        cell_size_choice: terrain.cell_size_choice,
        tile_size_choice: terrain.tile_size_choice,
        texture: None,
        height_scale: terrain.height_scale,
        seed: terrain.seed,
    };
    match &terrain.texture {
        Some(name) => request.select_texture(catalog, name)?,
        None => {
            if catalog.is_empty() {
                warn!("no textures found, drawing terrain untextured");
            }
            request.texture = Some(0);
        }
    }
    request.confirm()
}

/// Run `config.debug.headless_frames` frames against the in-memory device,
/// replaying `script` as user input.
pub fn run_headless(
    config: &Config,
    catalog: TextureCatalog,
    script: &InputScript,
) -> Result<RunSummary, AppError> {
    let descriptor = new_map_descriptor(&config.terrain, &catalog)?;
    info!(
        cell_size = descriptor.cell_size,
        tile_size = descriptor.tile_size,
        texture = ?catalog.names().get(descriptor.texture_index),
        "new map"
    );

    let (width, height) = (config.window.width, config.window.height);
    let (near, depth) = (config.render.screen_near, config.render.screen_depth);
    let mut device = HeadlessDevice::new(width, height, near, depth)
        .with_fov_y_degrees(config.render.fov_y_degrees);
    let mut shaders = RecordingShaders::new();
    let textures = TextureManager::new(catalog);
    let mut input = InputState::new(KeyBindings::with_overrides(&config.input.keybindings));

    let options = SceneOptions {
        camera_speeds: CameraSpeeds {
            move_speed: config.camera.move_speed,
            turn_speed: config.camera.turn_speed,
        },
        brush_radius: config.terrain.brush_radius,
        ..Default::default()
    };
    let mut scene = SceneOrchestrator::initialize(
        &mut device,
        width,
        height,
        config.render.screen_depth,
        &descriptor,
        options,
    )?;
    debug!(
        meshes = device.live_meshes(),
        vertex_bytes = device.vertex_bytes(),
        "scene uploaded"
    );

    let mut clock = FrameClock::new();
    let mut picks = 0;
    let mut last = None;
    for frame in 0..config.debug.headless_frames {
        script.apply(frame, &mut input);
        let timing = clock.advance(HEADLESS_FRAME_TIME);
        let mut ctx = FrameContext {
            device: &mut device,
            shaders: &mut shaders,
            input: &input,
            textures: &textures,
            frame_time: timing.frame_time,
            fps: timing.fps,
            descriptor: &descriptor,
        };
        let report = match scene.frame(&mut ctx) {
            Ok(report) => report,
            Err(e) => {
                scene.shutdown(&mut device);
                return Err(e.into());
            }
        };
        input.end_frame();
        if report.pick.is_some() {
            picks += 1;
        }
        if frame % STATS_LOG_INTERVAL == 0 {
            info!(
                frame,
                drawn = report.stats.cells_drawn,
                culled = report.stats.cells_culled,
                draws = shaders.calls().len(),
                "frame stats"
            );
        }
        shaders.clear();
        last = Some(report);
    }

    let camera_position = scene.camera().map_or(Vec3::ZERO, |c| c.position());
    let last_pick = scene.last_pick();
    scene.shutdown(&mut device);
    if device.live_meshes() > 0 {
        warn!(leaked = ?device.live_labels(), "meshes still alive after shutdown");
    }
    debug!(
        uniform_bytes = shaders.uniform_bytes(),
        presented = device.frames_presented(),
        "headless run done"
    );

    Ok(RunSummary {
        frames: clock.frame_count(),
        picks,
        last_pick,
        stats: last.map(|r| r.stats).unwrap_or_default(),
        state: last.map(|r| r.state).unwrap_or_default(),
        camera_position,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use maptool_input::Toggle;

    fn small_config(frames: u64) -> Config {
        let mut config = Config::default();
        config.window.width = 320;
        config.window.height = 240;
        config.terrain.cell_size_choice = 0;
        config.terrain.tile_size_choice = 0;
        config.debug.headless_frames = frames;
        config
    }

    fn run(config: &Config, script: &InputScript) -> RunSummary {
        run_headless(config, TextureCatalog::from_names("t", Vec::new()), script).unwrap()
    }

    #[test]
    fn test_descriptor_from_config() {
        let catalog = TextureCatalog::from_names("t", vec!["dirt.dds".into(), "grass.dds".into()]);
        let mut terrain = TerrainConfig::default();
        terrain.texture = Some("grass.dds".into());
        let desc = new_map_descriptor(&terrain, &catalog).unwrap();
        assert_eq!(desc.cell_size, 8);
        assert_eq!(desc.tile_size, 4);
        assert_eq!(desc.texture_index, 1);
        assert_eq!(desc.height_scale, 4.0);
    }

    #[test]
    fn test_unknown_texture_is_rejected() {
        let catalog = TextureCatalog::from_names("t", vec!["dirt.dds".into()]);
        let mut terrain = TerrainConfig::default();
        terrain.texture = Some("sand.dds".into());
        assert_eq!(
            new_map_descriptor(&terrain, &catalog),
            Err(DescriptorError::UnknownTexture("sand.dds".into()))
        );
    }

    #[test]
    fn test_invalid_size_choice_is_rejected() {
        let catalog = TextureCatalog::from_names("t", Vec::new());
        let mut terrain = TerrainConfig::default();
        terrain.tile_size_choice = 9;
        assert_eq!(
            new_map_descriptor(&terrain, &catalog),
            Err(DescriptorError::InvalidSizeChoice(9))
        );
    }

    #[test]
    fn test_missing_texture_dir_gives_empty_catalog() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(load_textures(&tmp.path().join("missing")).is_empty());
    }

    #[test]
    fn test_headless_tour() {
        let config = small_config(300);
        let script = InputScript::tour(320, 240);
        let summary = run(&config, &script);

        assert_eq!(summary.frames, 300);
        assert_eq!(summary.stats.render_count, 16);
        assert!(summary.state.auto_play);
        assert!(summary.state.height_locked);
        assert!(!summary.state.show_cell_lines);
        assert!(summary.state.wireframe);
    }

    #[test]
    fn test_headless_idle_run_keeps_start_pose() {
        let config = small_config(10);
        let summary = run(&config, &InputScript::new());
        assert_eq!(summary.frames, 10);
        assert_eq!(summary.picks, 0);
        assert_eq!(summary.last_pick, None);
        assert_eq!(summary.state, SceneState::default());
        assert_eq!(summary.camera_position, Vec3::new(0.0, 5.0, 0.0));
    }

    #[test]
    fn test_headless_height_lock_follows_terrain() {
        let config = small_config(5);
        let script = InputScript::new().tap(0, Toggle::HeightLock);
        let summary = run(&config, &script);
        assert!(summary.state.height_locked);
        assert!(summary.camera_position.y < 5.0);
    }

    #[test]
    fn test_headless_first_click_hits_terrain() {
        let config = small_config(3);
        let script = InputScript::new().click(0, 160.0, 120.0);
        let summary = run(&config, &script);
        assert_eq!(summary.picks, 1);
        let pick = summary.last_pick.unwrap();
        assert!(pick.x > 0.0 && pick.x < 16.0, "{pick}");
        assert!(pick.z < 0.0 && pick.z > -16.0, "{pick}");
    }
}
