//! A device and shader dispatcher that keep everything in memory.
//!
//! [`HeadlessDevice`] validates meshes the way a GPU backend would (index
//! bounds, buffer capacity, liveness) and can be told to fail an allocation,
//! which makes it usable both for the windowless runner and for tests of the
//! scene's error paths. [`RecordingShaders`] logs every draw in order.

use std::collections::HashMap;

use glam::{Mat4, Vec3, Vec4};
use tracing::trace;

use crate::device::{DeviceError, MeshHandle, RasterState, RenderDevice};
use crate::light::LightUniform;
use crate::mesh::{MeshDesc, Topology};
use crate::shader::{MatrixUniform, SceneMatrices, ShaderDispatcher, ShaderError, SkyUniform};
use crate::texture::TextureId;

#[derive(Clone, Debug)]
struct MeshRecord {
    label: String,
    topology: Topology,
    capacity: usize,
    index_count: usize,
    bytes: usize,
}

/// In-memory [`RenderDevice`].
#[derive(Debug)]
pub struct HeadlessDevice {
    width: u32,
    height: u32,
    screen_near: f32,
    screen_depth: f32,
    fov_y: f32,
    next_handle: u32,
    meshes: HashMap<MeshHandle, MeshRecord>,
    bound: Option<MeshHandle>,
    raster: RasterState,
    in_scene: bool,
    frames_presented: u64,
    allocations: usize,
    fail_allocation_at: Option<usize>,
    bad_releases: usize,
}

impl HeadlessDevice {
    /// A device for a `width` x `height` viewport with a 45 degree vertical field of view.
    pub fn new(width: u32, height: u32, screen_near: f32, screen_depth: f32) -> Self {
        Self {
            width,
            height,
            screen_near,
            screen_depth,
            fov_y: std::f32::consts::FRAC_PI_4,
            next_handle: 0,
            meshes: HashMap::new(),
            bound: None,
            raster: RasterState::default(),
            in_scene: false,
            frames_presented: 0,
            allocations: 0,
            fail_allocation_at: None,
            bad_releases: 0,
        }
    }

    pub fn with_fov_y_degrees(mut self, degrees: f32) -> Self {
        self.fov_y = degrees.to_radians();
        self
    }

    /// Make the `n`th `create_mesh` call from now (0-based) fail.
    pub fn fail_allocation_at(&mut self, n: usize) {
        self.fail_allocation_at = Some(self.allocations + n);
    }

    /// Meshes currently alive.
    pub fn live_meshes(&self) -> usize {
        self.meshes.len()
    }

    /// Labels of live meshes, sorted.
    pub fn live_labels(&self) -> Vec<String> {
        let mut labels: Vec<_> = self.meshes.values().map(|m| m.label.clone()).collect();
        labels.sort();
        labels
    }

    /// Total bytes of vertex data held by live meshes.
    pub fn vertex_bytes(&self) -> usize {
        self.meshes.values().map(|m| m.bytes).sum()
    }

    /// Releases of handles that were not alive.
    pub fn bad_releases(&self) -> usize {
        self.bad_releases
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn bound_mesh(&self) -> Option<MeshHandle> {
        self.bound
    }

    /// Index count of a live mesh.
    pub fn index_count(&self, handle: MeshHandle) -> Option<usize> {
        self.meshes.get(&handle).map(|m| m.index_count)
    }

    /// Topology of a live mesh.
    pub fn topology(&self, handle: MeshHandle) -> Option<Topology> {
        self.meshes.get(&handle).map(|m| m.topology)
    }

    fn validate(desc: &MeshDesc<'_>) -> Result<(), DeviceError> {
        let vertex_count = desc.vertices.len();
        if let Some(&index) = desc.indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(DeviceError::IndexOutOfRange {
                label: desc.label.to_string(),
                index,
                vertex_count,
            });
        }
        Ok(())
    }
}

impl RenderDevice for HeadlessDevice {
    fn create_mesh(&mut self, desc: &MeshDesc<'_>) -> Result<MeshHandle, DeviceError> {
        let attempt = self.allocations;
        self.allocations += 1;
        if self.fail_allocation_at == Some(attempt) {
            return Err(DeviceError::AllocationFailed {
                label: desc.label.to_string(),
                reason: "injected failure".to_string(),
            });
        }
        Self::validate(desc)?;

        let handle = MeshHandle(self.next_handle);
        self.next_handle += 1;
        self.meshes.insert(
            handle,
            MeshRecord {
                label: desc.label.to_string(),
                topology: desc.topology,
                capacity: desc.vertices.len(),
                index_count: desc.indices.len(),
                bytes: desc.vertices.as_bytes().len(),
            },
        );
        trace!(?handle, label = desc.label, "created mesh");
        Ok(handle)
    }

    fn write_mesh(&mut self, handle: MeshHandle, desc: &MeshDesc<'_>) -> Result<(), DeviceError> {
        Self::validate(desc)?;
        let record = self
            .meshes
            .get_mut(&handle)
            .ok_or(DeviceError::UnknownMesh(handle))?;
        if desc.vertices.len() > record.capacity {
            return Err(DeviceError::CapacityExceeded {
                handle,
                capacity: record.capacity,
                requested: desc.vertices.len(),
            });
        }
        record.index_count = desc.indices.len();
        Ok(())
    }

    fn bind_mesh(&mut self, handle: MeshHandle) -> Result<(), DeviceError> {
        if !self.meshes.contains_key(&handle) {
            return Err(DeviceError::UnknownMesh(handle));
        }
        self.bound = Some(handle);
        Ok(())
    }

    fn release_mesh(&mut self, handle: MeshHandle) -> Result<(), DeviceError> {
        if self.meshes.remove(&handle).is_none() {
            self.bad_releases += 1;
            return Err(DeviceError::UnknownMesh(handle));
        }
        if self.bound == Some(handle) {
            self.bound = None;
        }
        Ok(())
    }

    fn begin_scene(&mut self, clear_color: Vec4) {
        trace!(?clear_color, "begin scene");
        self.in_scene = true;
        self.bound = None;
    }

    fn end_scene(&mut self) -> Result<(), DeviceError> {
        if !self.in_scene {
            return Err(DeviceError::NotInScene);
        }
        self.in_scene = false;
        self.frames_presented += 1;
        Ok(())
    }

    fn set_culling(&mut self, enabled: bool) {
        self.raster.culling = enabled;
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.raster.depth_test = enabled;
    }

    fn set_wireframe(&mut self, enabled: bool) {
        self.raster.wireframe = enabled;
    }

    fn raster_state(&self) -> RasterState {
        self.raster
    }

    fn world_matrix(&self) -> Mat4 {
        Mat4::IDENTITY
    }

    fn projection_matrix(&self) -> Mat4 {
        let aspect = self.width as f32 / self.height.max(1) as f32;
        Mat4::perspective_rh(self.fov_y, aspect, self.screen_near, self.screen_depth)
    }

    fn ortho_matrix(&self) -> Mat4 {
        let (w, h) = (self.width as f32, self.height as f32);
        Mat4::orthographic_rh(
            -w / 2.0,
            w / 2.0,
            -h / 2.0,
            h / 2.0,
            self.screen_near,
            self.screen_depth,
        )
    }

    fn viewport(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Which entry point a draw went through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawKind {
    SkyDome,
    Light,
    Color,
    Font,
}

/// One recorded draw.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawCall {
    pub kind: DrawKind,
    pub index_count: u32,
    pub texture: Option<TextureId>,
    pub matrices: SceneMatrices,
}

/// [`ShaderDispatcher`] that records draws and packs their uniforms.
#[derive(Debug, Default)]
pub struct RecordingShaders {
    calls: Vec<DrawCall>,
    uniform_bytes: usize,
    fail_on: Option<(DrawKind, usize)>,
}

impl RecordingShaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the `nth` (0-based) draw of `kind` fail.
    pub fn fail_on(&mut self, kind: DrawKind, nth: usize) {
        self.fail_on = Some((kind, nth));
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Number of draws of one kind.
    pub fn count(&self, kind: DrawKind) -> usize {
        self.calls.iter().filter(|c| c.kind == kind).count()
    }

    /// Draw kinds in order, with consecutive repeats collapsed.
    pub fn kind_sequence(&self) -> Vec<DrawKind> {
        let mut kinds: Vec<DrawKind> = self.calls.iter().map(|c| c.kind).collect();
        kinds.dedup();
        kinds
    }

    /// Bytes of uniform data uploaded so far.
    pub fn uniform_bytes(&self) -> usize {
        self.uniform_bytes
    }

    /// Forget recorded draws, keeping any pending failure.
    pub fn clear(&mut self) {
        self.calls.clear();
    }

    fn record(
        &mut self,
        kind: DrawKind,
        index_count: u32,
        matrices: &SceneMatrices,
        texture: Option<TextureId>,
        extra: &[u8],
    ) -> Result<(), ShaderError> {
        if let Some((fail_kind, nth)) = self.fail_on
            && fail_kind == kind
            && self.count(kind) == nth
        {
            self.fail_on = None;
            return Err(ShaderError::Draw {
                shader: shader_name(kind),
                index_count,
                message: "injected failure".to_string(),
            });
        }
        let matrix = MatrixUniform::from(matrices);
        self.uniform_bytes += bytemuck::bytes_of(&matrix).len() + extra.len();
        trace!(?kind, index_count, "draw");
        self.calls.push(DrawCall {
            kind,
            index_count,
            texture,
            matrices: *matrices,
        });
        Ok(())
    }
}

fn shader_name(kind: DrawKind) -> &'static str {
    match kind {
        DrawKind::SkyDome => "sky dome",
        DrawKind::Light => "light",
        DrawKind::Color => "color",
        DrawKind::Font => "font",
    }
}

impl ShaderDispatcher for RecordingShaders {
    fn render_sky_dome(
        &mut self,
        index_count: u32,
        matrices: &SceneMatrices,
        apex_color: Vec4,
        center_color: Vec4,
    ) -> Result<(), ShaderError> {
        let sky = SkyUniform {
            apex_color: apex_color.to_array(),
            center_color: center_color.to_array(),
        };
        self.record(DrawKind::SkyDome, index_count, matrices, None, bytemuck::bytes_of(&sky))
    }

    fn render_light(
        &mut self,
        index_count: u32,
        matrices: &SceneMatrices,
        texture: Option<TextureId>,
        light_direction: Vec3,
        diffuse_color: Vec4,
    ) -> Result<(), ShaderError> {
        let light = LightUniform::new(light_direction, diffuse_color);
        self.record(DrawKind::Light, index_count, matrices, texture, bytemuck::bytes_of(&light))
    }

    fn render_color(
        &mut self,
        index_count: u32,
        matrices: &SceneMatrices,
    ) -> Result<(), ShaderError> {
        self.record(DrawKind::Color, index_count, matrices, None, &[])
    }

    fn render_font(
        &mut self,
        index_count: u32,
        matrices: &SceneMatrices,
        color: Vec4,
    ) -> Result<(), ShaderError> {
        let color = color.to_array();
        self.record(DrawKind::Font, index_count, matrices, None, bytemuck::bytes_of(&color))
    }
}
