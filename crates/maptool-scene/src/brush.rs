//! Circle marking the last picked point on the terrain.

use std::f32::consts::TAU;

use glam::{Vec3, Vec4};
use tracing::{trace, warn};

use maptool_render::{
    DeviceError, MeshDesc, MeshHandle, RenderDevice, VertexData, VertexPositionColor,
};
use maptool_terrain::Terrain;

/// Highlight color of the brush outline.
pub const BRUSH_COLOR: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);

pub const DEFAULT_SEGMENTS: u32 = 32;

/// Lift above the surface so the outline is not hidden by the terrain.
const SURFACE_OFFSET: f32 = 0.05;

/// A closed line loop of `segments` edges draped over the terrain.
#[derive(Debug)]
pub struct Brush {
    mesh: MeshHandle,
    color: Vec4,
    radius: f32,
    segments: u32,
    center: Vec3,
    indices: Vec<u32>,
}

impl Brush {
    pub fn new(
        device: &mut dyn RenderDevice,
        color: Vec4,
        radius: f32,
        segments: u32,
    ) -> Result<Self, DeviceError> {
        let segments = segments.max(3);
        let indices = (0..segments).flat_map(|i| [i, (i + 1) % segments]).collect();
        let mut brush = Self {
            mesh: MeshHandle(0),
            color,
            radius,
            segments,
            center: Vec3::ZERO,
            indices,
        };
        let vertices = brush.outline(|_, _| None);
        brush.mesh = device.create_mesh(&MeshDesc::lines(
            "brush",
            VertexData::PositionColor(&vertices),
            &brush.indices,
        ))?;
        Ok(brush)
    }

    pub fn release(self, device: &mut dyn RenderDevice) {
        if let Err(e) = device.release_mesh(self.mesh) {
            warn!("failed to release brush: {e}");
        }
    }

    /// Center the brush on `center`, following the terrain surface.
    pub fn set_position(
        &mut self,
        device: &mut dyn RenderDevice,
        terrain: &Terrain,
        center: Vec3,
    ) -> Result<(), DeviceError> {
        self.center = center;
        let vertices = self.outline(|x, z| terrain.height_at_position(x, z));
        device.write_mesh(
            self.mesh,
            &MeshDesc::lines("brush", VertexData::PositionColor(&vertices), &self.indices),
        )?;
        trace!(?center, "brush moved");
        Ok(())
    }

    /// Bind the outline for the color shader.
    pub fn render(&self, device: &mut dyn RenderDevice) -> Result<(), DeviceError> {
        device.bind_mesh(self.mesh)
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn position(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn color(&self) -> Vec4 {
        self.color
    }

    /// Outline vertices; points off the terrain keep the center's height.
    fn outline(&self, height: impl Fn(f32, f32) -> Option<f32>) -> Vec<VertexPositionColor> {
        (0..self.segments)
            .map(|i| {
                let (sin, cos) = (i as f32 / self.segments as f32 * TAU).sin_cos();
                let x = self.center.x + self.radius * cos;
                let z = self.center.z + self.radius * sin;
                let y = height(x, z).unwrap_or(self.center.y) + SURFACE_OFFSET;
                VertexPositionColor {
                    position: [x, y, z],
                    color: self.color.to_array(),
                }
            })
            .collect()
    }
}
