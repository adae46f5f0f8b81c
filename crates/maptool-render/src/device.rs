//! The rendering device the scene drives.
//!
//! A device owns GPU meshes behind opaque [`MeshHandle`]s, the fixed-function
//! raster state the scene toggles between draw groups, and the projection
//! matrices for the current viewport.

use glam::{Mat4, Vec4};
use thiserror::Error;

use crate::mesh::MeshDesc;

/// Opaque handle to a mesh owned by the device.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct MeshHandle(pub u32);

/// Errors reported by a [`RenderDevice`].
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("failed to allocate mesh '{label}': {reason}")]
    AllocationFailed { label: String, reason: String },

    #[error("mesh '{label}' has an index {index} past its {vertex_count} vertices")]
    IndexOutOfRange {
        label: String,
        index: u32,
        vertex_count: usize,
    },

    #[error("mesh {0:?} is not alive on this device")]
    UnknownMesh(MeshHandle),

    #[error("mesh {handle:?} holds {capacity} vertices, {requested} were written")]
    CapacityExceeded {
        handle: MeshHandle,
        capacity: usize,
        requested: usize,
    },

    #[error("end_scene called without a matching begin_scene")]
    NotInScene,
}

/// Fixed-function raster state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RasterState {
    pub culling: bool,
    pub depth_test: bool,
    pub wireframe: bool,
}

impl Default for RasterState {
    fn default() -> Self {
        Self {
            culling: true,
            depth_test: true,
            wireframe: false,
        }
    }
}

/// Device abstraction the scene renders through.
pub trait RenderDevice {
    /// Upload a new mesh.
    fn create_mesh(&mut self, desc: &MeshDesc<'_>) -> Result<MeshHandle, DeviceError>;

    /// Rewrite an existing mesh in place; the new data must fit its original vertex capacity.
    fn write_mesh(&mut self, handle: MeshHandle, desc: &MeshDesc<'_>) -> Result<(), DeviceError>;

    /// Bind a mesh's buffers for the next draw.
    fn bind_mesh(&mut self, handle: MeshHandle) -> Result<(), DeviceError>;

    /// Free a mesh. Releasing a handle that is not alive is an error.
    fn release_mesh(&mut self, handle: MeshHandle) -> Result<(), DeviceError>;

    /// Start a frame, clearing color and depth.
    fn begin_scene(&mut self, clear_color: Vec4);

    /// Present the frame.
    fn end_scene(&mut self) -> Result<(), DeviceError>;

    fn set_culling(&mut self, enabled: bool);

    fn set_depth_test(&mut self, enabled: bool);

    fn set_wireframe(&mut self, enabled: bool);

    fn raster_state(&self) -> RasterState;

    fn world_matrix(&self) -> Mat4;

    fn projection_matrix(&self) -> Mat4;

    fn ortho_matrix(&self) -> Mat4;

    /// Viewport size in pixels.
    fn viewport(&self) -> (u32, u32);
}
