//! Shader dispatch: the four draw entry points the scene uses, and the
//! uniform layouts they upload.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};
use thiserror::Error;

use crate::texture::TextureId;

/// Errors from a shader draw.
#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("{shader} shader failed to set parameters: {message}")]
    Parameters {
        shader: &'static str,
        message: String,
    },

    #[error("{shader} shader draw of {index_count} indices failed: {message}")]
    Draw {
        shader: &'static str,
        index_count: u32,
        message: String,
    },
}

/// World, view and projection for one draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneMatrices {
    pub world: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
}

impl SceneMatrices {
    pub fn new(world: Mat4, view: Mat4, projection: Mat4) -> Self {
        Self {
            world,
            view,
            projection,
        }
    }

    /// Clip-space transform `projection * view * world`.
    pub fn world_view_projection(&self) -> Mat4 {
        self.projection * self.view * self.world
    }
}

/// Matrix buffer shared by every shader, column-major.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct MatrixUniform {
    pub world: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

impl From<&SceneMatrices> for MatrixUniform {
    fn from(m: &SceneMatrices) -> Self {
        Self {
            world: m.world.to_cols_array_2d(),
            view: m.view.to_cols_array_2d(),
            projection: m.projection.to_cols_array_2d(),
        }
    }
}

/// Sky gradient colors.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct SkyUniform {
    pub apex_color: [f32; 4],
    pub center_color: [f32; 4],
}

/// Draw entry points.
///
/// Each call draws `index_count` indices of the mesh currently bound on the
/// device.
pub trait ShaderDispatcher {
    /// Gradient sky shader.
    fn render_sky_dome(
        &mut self,
        index_count: u32,
        matrices: &SceneMatrices,
        apex_color: Vec4,
        center_color: Vec4,
    ) -> Result<(), ShaderError>;

    /// Textured, directionally lit shader for terrain cells.
    fn render_light(
        &mut self,
        index_count: u32,
        matrices: &SceneMatrices,
        texture: Option<TextureId>,
        light_direction: Vec3,
        diffuse_color: Vec4,
    ) -> Result<(), ShaderError>;

    /// Flat vertex-color shader for cell lines and the brush.
    fn render_color(&mut self, index_count: u32, matrices: &SceneMatrices)
    -> Result<(), ShaderError>;

    /// Glyph shader for overlay text.
    fn render_font(
        &mut self,
        index_count: u32,
        matrices: &SceneMatrices,
        color: Vec4,
    ) -> Result<(), ShaderError>;
}
