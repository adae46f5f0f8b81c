//! Owns every scene object and runs the per-frame pipeline.
//!
//! A frame is a fixed sequence of [`FrameStage`]s, the last of which runs the
//! [`RenderStage`]s. The first failing stage aborts the frame and is named in
//! the returned [`SceneError`].

use std::fmt;

use glam::{Mat4, Vec3, Vec4};
use thiserror::Error;
use tracing::{debug, info, warn};

use maptool_input::{InputSnapshot, Movement};
use maptool_render::{
    Camera, CameraMotion, CameraSpeeds, DeviceError, DirectionalLight, Frustum, RenderDevice,
    SceneMatrices, ShaderDispatcher, ShaderError, TextureLookup,
};
use maptool_terrain::{RenderStats, Terrain, TerrainDescriptor, TerrainError};

use crate::brush::{BRUSH_COLOR, Brush, DEFAULT_SEGMENTS};
use crate::picking::PickingTool;
use crate::sky_dome::SkyDome;
use crate::state::{SceneState, ToggleSet};
use crate::ui::{OverlayFrame, UiError, UiOverlay};

/// Camera position used while the base view is captured.
const BASE_VIEW_POSITION: Vec3 = Vec3::new(0.0, 0.0, -10.0);
/// Camera pose once the scene is ready: above the terrain's origin corner,
/// looking down across it.
const START_POSITION: Vec3 = Vec3::new(0.0, 5.0, 0.0);
const START_ROTATION: Vec3 = Vec3::new(36.0, 44.0, 0.0);
/// Camera height above the terrain while height-locked.
const HEIGHT_LOCK_OFFSET: f32 = 1.0;

const CLEAR_COLOR: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);

/// Scene objects, in initialization order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Component {
    UserInterface,
    Camera,
    Light,
    Frustum,
    SkyDome,
    Terrain,
    PickingTool,
    Brush,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Component::UserInterface => "user interface",
            Component::Camera => "camera",
            Component::Light => "light",
            Component::Frustum => "frustum",
            Component::SkyDome => "sky dome",
            Component::Terrain => "terrain",
            Component::PickingTool => "picking tool",
            Component::Brush => "brush",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStage {
    HandleInput,
    UpdateCamera,
    AdvanceLight,
    UpdateUi,
    UpdateTerrain,
    Render,
}

pub const FRAME_STAGES: [FrameStage; 6] = [
    FrameStage::HandleInput,
    FrameStage::UpdateCamera,
    FrameStage::AdvanceLight,
    FrameStage::UpdateUi,
    FrameStage::UpdateTerrain,
    FrameStage::Render,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderStage {
    BeginScene,
    SkyDome,
    Terrain,
    Brush,
    Stats,
    Ui,
    EndScene,
}

pub const RENDER_STAGES: [RenderStage; 7] = [
    RenderStage::BeginScene,
    RenderStage::SkyDome,
    RenderStage::Terrain,
    RenderStage::Brush,
    RenderStage::Stats,
    RenderStage::Ui,
    RenderStage::EndScene,
];

/// Where in the frame a failure happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Frame(FrameStage),
    Render(RenderStage),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Frame(stage) => write!(f, "{stage:?}"),
            Stage::Render(stage) => write!(f, "Render/{stage:?}"),
        }
    }
}

/// Failure reported by one of the scene's collaborators.
#[derive(Debug, Error)]
pub enum SubsystemError {
    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error(transparent)]
    Terrain(#[from] TerrainError),

    #[error(transparent)]
    Ui(#[from] UiError),
}

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("could not initialize the {component}: {source}")]
    Init {
        component: Component,
        #[source]
        source: SubsystemError,
    },

    #[error("frame stage {stage} failed: {source}")]
    Frame {
        stage: Stage,
        #[source]
        source: SubsystemError,
    },

    #[error("scene is not initialized")]
    NotInitialized,
}

/// Tunables that come from configuration rather than the map itself.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneOptions {
    pub camera_speeds: CameraSpeeds,
    pub brush_radius: f32,
    pub brush_segments: u32,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            camera_speeds: CameraSpeeds::default(),
            brush_radius: 3.0,
            brush_segments: DEFAULT_SEGMENTS,
        }
    }
}

/// Collaborators and timing for one frame.
pub struct FrameContext<'a> {
    pub device: &'a mut dyn RenderDevice,
    pub shaders: &'a mut dyn ShaderDispatcher,
    pub input: &'a dyn InputSnapshot,
    pub textures: &'a dyn TextureLookup,
    /// Seconds since the previous frame.
    pub frame_time: f32,
    pub fps: u32,
    pub descriptor: &'a TerrainDescriptor,
}

/// What a completed frame produced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameReport {
    /// Terrain point picked by a left click this frame.
    pub pick: Option<Vec3>,
    pub stats: RenderStats,
    pub state: SceneState,
}

/// Matrices shared by the render stages of one frame.
#[derive(Clone, Copy, Debug)]
struct RenderPass {
    world: Mat4,
    view: Mat4,
    projection: Mat4,
    base_view: Mat4,
    ortho: Mat4,
}

impl Default for RenderPass {
    fn default() -> Self {
        Self {
            world: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            base_view: Mat4::IDENTITY,
            ortho: Mat4::IDENTITY,
        }
    }
}

/// Borrowed view of a fully initialized scene.
struct Parts<'s> {
    ui: &'s mut UiOverlay,
    camera: &'s mut Camera,
    light: &'s mut DirectionalLight,
    frustum: &'s mut Frustum,
    sky_dome: &'s SkyDome,
    terrain: &'s mut Terrain,
    picking: &'s mut PickingTool,
    brush: &'s mut Brush,
    state: &'s mut SceneState,
    viewport: (u32, u32),
}

/// The scene: one camera, light, frustum, sky dome, terrain, picking tool,
/// brush and overlay.
#[derive(Debug)]
pub struct SceneOrchestrator {
    ui: Option<UiOverlay>,
    camera: Option<Camera>,
    light: Option<DirectionalLight>,
    frustum: Option<Frustum>,
    sky_dome: Option<SkyDome>,
    terrain: Option<Terrain>,
    picking: Option<PickingTool>,
    brush: Option<Brush>,
    state: SceneState,
    viewport: (u32, u32),
}

impl SceneOrchestrator {
    /// Build every scene object for a `width` x `height` viewport.
    ///
    /// On failure everything built so far is released through `device`.
    pub fn initialize(
        device: &mut dyn RenderDevice,
        width: u32,
        height: u32,
        screen_depth: f32,
        descriptor: &TerrainDescriptor,
        options: SceneOptions,
    ) -> Result<Self, SceneError> {
        let mut scene = Self {
            ui: None,
            camera: None,
            light: None,
            frustum: None,
            sky_dome: None,
            terrain: None,
            picking: None,
            brush: None,
            state: SceneState::default(),
            viewport: (width, height),
        };
        if let Err(e) = scene.build(device, screen_depth, descriptor, options) {
            warn!("scene initialization failed: {e}");
            scene.shutdown(device);
            return Err(e);
        }

        if let Some(camera) = scene.camera.as_mut() {
            camera.set_position(START_POSITION.x, START_POSITION.y, START_POSITION.z);
            camera.set_rotation(START_ROTATION.x, START_ROTATION.y, START_ROTATION.z);
            camera.render();
        }
        info!(width, height, cells = descriptor.cell_count(), "scene initialized");
        Ok(scene)
    }

    fn build(
        &mut self,
        device: &mut dyn RenderDevice,
        screen_depth: f32,
        descriptor: &TerrainDescriptor,
        options: SceneOptions,
    ) -> Result<(), SceneError> {
        let (width, height) = self.viewport;
        let ui = UiOverlay::new(device, width, height).map_err(init(Component::UserInterface))?;
        self.ui = Some(ui);

        let mut camera = Camera::new(options.camera_speeds);
        camera.set_position(BASE_VIEW_POSITION.x, BASE_VIEW_POSITION.y, BASE_VIEW_POSITION.z);
        camera.render();
        camera.render_base_view();
        self.camera = Some(camera);

        let mut light = DirectionalLight::default();
        light.set_diffuse_color(1.0, 1.0, 1.0, 1.0);
        light.set_direction(0.5, -1.0, -0.5);
        self.light = Some(light);

        self.frustum = Some(Frustum::new(screen_depth));
        self.sky_dome = Some(SkyDome::new(device).map_err(init(Component::SkyDome))?);
        self.terrain = Some(Terrain::new(device, descriptor).map_err(init(Component::Terrain))?);
        self.picking = Some(PickingTool::new());
        self.brush = Some(
            Brush::new(device, BRUSH_COLOR, options.brush_radius, options.brush_segments)
                .map_err(init(Component::Brush))?,
        );
        Ok(())
    }

    /// Release everything still held. Safe to call more than once.
    pub fn shutdown(&mut self, device: &mut dyn RenderDevice) {
        let was_live = self.is_initialized();
        if let Some(terrain) = self.terrain.take() {
            terrain.release(device);
        }
        if let Some(sky_dome) = self.sky_dome.take() {
            sky_dome.release(device);
        }
        self.frustum = None;
        self.light = None;
        self.camera = None;
        if let Some(ui) = self.ui.take() {
            ui.release(device);
        }
        self.picking = None;
        if let Some(brush) = self.brush.take() {
            brush.release(device);
        }
        if was_live {
            info!("scene shut down");
        }
    }

    /// Whether every scene object is present.
    pub fn is_initialized(&self) -> bool {
        self.ui.is_some()
            && self.camera.is_some()
            && self.light.is_some()
            && self.frustum.is_some()
            && self.sky_dome.is_some()
            && self.terrain.is_some()
            && self.picking.is_some()
            && self.brush.is_some()
    }

    pub fn state(&self) -> SceneState {
        self.state
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    pub fn camera_mut(&mut self) -> Option<&mut Camera> {
        self.camera.as_mut()
    }

    pub fn light(&self) -> Option<&DirectionalLight> {
        self.light.as_ref()
    }

    pub fn terrain(&self) -> Option<&Terrain> {
        self.terrain.as_ref()
    }

    pub fn ui(&self) -> Option<&UiOverlay> {
        self.ui.as_ref()
    }

    /// The most recent pick, kept across frames.
    pub fn last_pick(&self) -> Option<Vec3> {
        self.picking.as_ref().and_then(PickingTool::last_pick)
    }

    /// Run one frame.
    pub fn frame(&mut self, ctx: &mut FrameContext<'_>) -> Result<FrameReport, SceneError> {
        let mut parts = self.parts()?;
        let mut pick = None;
        for stage in FRAME_STAGES {
            let result = match stage {
                FrameStage::HandleInput => handle_input(&mut parts, ctx).map(|p| pick = p),
                FrameStage::UpdateCamera => {
                    update_camera(&mut parts, ctx);
                    Ok(())
                }
                FrameStage::AdvanceLight => {
                    if parts.state.auto_play {
                        parts.light.advance_auto_play(ctx.frame_time);
                    }
                    Ok(())
                }
                FrameStage::UpdateUi => update_ui(&mut parts, ctx),
                FrameStage::UpdateTerrain => {
                    update_terrain(&mut parts);
                    Ok(())
                }
                FrameStage::Render => {
                    render(&mut parts, ctx)?;
                    Ok(())
                }
            };
            result.map_err(|source| SceneError::Frame {
                stage: Stage::Frame(stage),
                source,
            })?;
        }

        Ok(FrameReport {
            pick,
            stats: parts.terrain.stats(),
            state: *parts.state,
        })
    }

    fn parts(&mut self) -> Result<Parts<'_>, SceneError> {
        match (
            self.ui.as_mut(),
            self.camera.as_mut(),
            self.light.as_mut(),
            self.frustum.as_mut(),
            self.sky_dome.as_ref(),
            self.terrain.as_mut(),
            self.picking.as_mut(),
            self.brush.as_mut(),
        ) {
            (
                Some(ui),
                Some(camera),
                Some(light),
                Some(frustum),
                Some(sky_dome),
                Some(terrain),
                Some(picking),
                Some(brush),
            ) => Ok(Parts {
                ui,
                camera,
                light,
                frustum,
                sky_dome,
                terrain,
                picking,
                brush,
                state: &mut self.state,
                viewport: self.viewport,
            }),
            _ => Err(SceneError::NotInitialized),
        }
    }
}

fn init<E: Into<SubsystemError>>(component: Component) -> impl FnOnce(E) -> SceneError {
    move |e| SceneError::Init {
        component,
        source: e.into(),
    }
}

fn handle_input(
    parts: &mut Parts<'_>,
    ctx: &mut FrameContext<'_>,
) -> Result<Option<Vec3>, SubsystemError> {
    let mut pick = None;
    if let Some(mouse) = ctx.input.mouse_window_position()
        && ctx.input.is_left_click()
    {
        let projection = ctx.device.projection_matrix();
        pick = parts
            .picking
            .pick(parts.camera, &projection, parts.viewport, mouse, parts.terrain);
        match pick {
            Some(point) => {
                info!(x = point.x, y = point.y, z = point.z, "picked terrain");
                parts.brush.set_position(ctx.device, parts.terrain, point)?;
            }
            None => debug!(?mouse, "pick missed the terrain"),
        }
    }

    let fired = ToggleSet::from_input(ctx.input);
    if !fired.is_empty() {
        parts.state.apply(&fired);
        debug!(state = ?parts.state, "scene toggles changed");
    }
    Ok(pick)
}

fn update_camera(parts: &mut Parts<'_>, ctx: &FrameContext<'_>) {
    let held = |m| ctx.input.is_held(m);
    let motion = CameraMotion {
        forward: held(Movement::Forward),
        backward: held(Movement::Backward),
        turn_left: held(Movement::TurnLeft),
        turn_right: held(Movement::TurnRight),
        up: held(Movement::Up),
        down: held(Movement::Down),
        look_up: held(Movement::LookUp),
        look_down: held(Movement::LookDown),
    };
    parts.camera.frame(ctx.frame_time, &motion);
}

fn update_ui(parts: &mut Parts<'_>, ctx: &mut FrameContext<'_>) -> Result<(), SubsystemError> {
    let values = OverlayFrame {
        fps: ctx.fps,
        pose: parts.camera.pose(),
        apex_color: parts.sky_dome.apex_color(),
        center_color: parts.sky_dome.center_color(),
        mouse: ctx.input.mouse_window_position(),
    };
    parts.ui.frame(ctx.device, &values)?;
    Ok(())
}

fn update_terrain(parts: &mut Parts<'_>) {
    parts.terrain.frame();
    if parts.state.height_locked {
        let p = parts.camera.position();
        if let Some(height) = parts.terrain.height_at_position(p.x, p.z) {
            parts.camera.set_position(p.x, height + HEIGHT_LOCK_OFFSET, p.z);
        }
    }
}

fn render(parts: &mut Parts<'_>, ctx: &mut FrameContext<'_>) -> Result<(), SceneError> {
    let mut pass = RenderPass::default();
    for stage in RENDER_STAGES {
        render_stage(stage, parts, ctx, &mut pass).map_err(|source| SceneError::Frame {
            stage: Stage::Render(stage),
            source,
        })?;
    }
    Ok(())
}

fn render_stage(
    stage: RenderStage,
    parts: &mut Parts<'_>,
    ctx: &mut FrameContext<'_>,
    pass: &mut RenderPass,
) -> Result<(), SubsystemError> {
    let device = &mut *ctx.device;
    let shaders = &mut *ctx.shaders;
    match stage {
        RenderStage::BeginScene => {
            parts.camera.render();
            *pass = RenderPass {
                world: device.world_matrix(),
                view: parts.camera.view_matrix(),
                projection: device.projection_matrix(),
                base_view: parts.camera.base_view_matrix(),
                ortho: device.ortho_matrix(),
            };
            parts.frustum.construct(&pass.projection, &pass.view);
            device.begin_scene(CLEAR_COLOR);
        }
        RenderStage::SkyDome => {
            device.set_culling(false);
            device.set_depth_test(false);
            let world = Mat4::from_translation(parts.camera.position());
            parts.sky_dome.render(device)?;
            shaders.render_sky_dome(
                parts.sky_dome.index_count(),
                &SceneMatrices::new(world, pass.view, pass.projection),
                parts.sky_dome.apex_color(),
                parts.sky_dome.center_color(),
            )?;
        }
        RenderStage::Terrain => {
            device.set_depth_test(true);
            device.set_culling(true);
            if parts.state.wireframe {
                device.set_wireframe(true);
            }
            let matrices = SceneMatrices::new(pass.world, pass.view, pass.projection);
            let texture = ctx.textures.texture(ctx.descriptor.texture_index);
            for index in 0..parts.terrain.cell_count() {
                let visible = parts.terrain.render_cell(device, index, parts.frustum)?;
                let Some(index_count) = visible else {
                    continue;
                };
                shaders.render_light(
                    index_count,
                    &matrices,
                    texture,
                    parts.light.direction,
                    parts.light.diffuse,
                )?;
                if parts.state.show_cell_lines {
                    let line_count = parts.terrain.render_cell_lines(device, index)?;
                    shaders.render_color(line_count, &matrices)?;
                }
            }
        }
        RenderStage::Brush => {
            parts.brush.render(device)?;
            shaders.render_color(
                parts.brush.index_count(),
                &SceneMatrices::new(pass.world, pass.view, pass.projection),
            )?;
        }
        RenderStage::Stats => {
            if parts.state.wireframe {
                device.set_wireframe(false);
            }
            parts.ui.update_render_counts(device, parts.terrain.stats())?;
        }
        RenderStage::Ui => {
            if parts.state.display_ui {
                device.set_depth_test(false);
                parts.ui.render(
                    device,
                    shaders,
                    &SceneMatrices::new(pass.world, pass.base_view, pass.ortho),
                )?;
                device.set_depth_test(true);
            }
        }
        RenderStage::EndScene => device.end_scene()?,
    }
    Ok(())
}
