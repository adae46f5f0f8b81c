//! Gradient sky drawn around the camera.

use std::f32::consts::{PI, TAU};

use glam::Vec4;
use tracing::{debug, warn};

use maptool_render::{DeviceError, MeshDesc, MeshHandle, RenderDevice, VertexData, VertexPositionUv};

/// Color at the top of the dome.
pub const SKY_APEX_COLOR: Vec4 = Vec4::new(0.0, 0.05, 0.6, 1.0);
/// Color at the horizon.
pub const SKY_CENTER_COLOR: Vec4 = Vec4::new(0.0, 0.5, 0.8, 1.0);

const RINGS: u32 = 16;
const SEGMENTS: u32 = 32;

/// Unit UV sphere centered on the camera.
#[derive(Debug)]
pub struct SkyDome {
    mesh: MeshHandle,
    index_count: u32,
    apex_color: Vec4,
    center_color: Vec4,
}

impl SkyDome {
    pub fn new(device: &mut dyn RenderDevice) -> Result<Self, DeviceError> {
        let (vertices, indices) = sphere(RINGS, SEGMENTS);
        let mesh = device.create_mesh(&MeshDesc::triangles(
            "sky dome",
            VertexData::PositionUv(&vertices),
            &indices,
        ))?;
        debug!(vertices = vertices.len(), indices = indices.len(), "sky dome built");
        Ok(Self {
            mesh,
            index_count: indices.len() as u32,
            apex_color: SKY_APEX_COLOR,
            center_color: SKY_CENTER_COLOR,
        })
    }

    pub fn release(self, device: &mut dyn RenderDevice) {
        if let Err(e) = device.release_mesh(self.mesh) {
            warn!("failed to release sky dome: {e}");
        }
    }

    /// Bind the dome's mesh for the sky shader.
    pub fn render(&self, device: &mut dyn RenderDevice) -> Result<(), DeviceError> {
        device.bind_mesh(self.mesh)
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn apex_color(&self) -> Vec4 {
        self.apex_color
    }

    pub fn center_color(&self) -> Vec4 {
        self.center_color
    }
}

/// Rings run from the top pole (`y = 1`) down; the seam column is duplicated
/// so texture coordinates stay continuous.
fn sphere(rings: u32, segments: u32) -> (Vec<VertexPositionUv>, Vec<u32>) {
    let mut vertices = Vec::with_capacity(((rings + 1) * (segments + 1)) as usize);
    for ring in 0..=rings {
        let v = ring as f32 / rings as f32;
        let (sin_phi, cos_phi) = (v * PI).sin_cos();
        for segment in 0..=segments {
            let u = segment as f32 / segments as f32;
            let (sin_theta, cos_theta) = (u * TAU).sin_cos();
            vertices.push(VertexPositionUv {
                position: [sin_phi * cos_theta, cos_phi, sin_phi * sin_theta],
                uv: [u, v],
            });
        }
    }

    let stride = segments + 1;
    let mut indices = Vec::with_capacity((rings * segments * 6) as usize);
    for ring in 0..rings {
        for segment in 0..segments {
            let a = ring * stride + segment;
            let b = a + stride;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use maptool_render::HeadlessDevice;

    #[test]
    fn test_sphere_is_unit_radius() {
        let (vertices, indices) = sphere(4, 8);
        assert_eq!(vertices.len(), 5 * 9);
        assert_eq!(indices.len(), 4 * 8 * 6);
        for v in &vertices {
            let r = glam::Vec3::from_array(v.position).length();
            assert!((r - 1.0).abs() < 1e-5);
        }
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn test_colors_and_lifecycle() {
        let mut device = HeadlessDevice::new(800, 600, 0.1, 1000.0);
        let dome = SkyDome::new(&mut device).unwrap();
        assert_eq!(dome.apex_color(), Vec4::new(0.0, 0.05, 0.6, 1.0));
        assert_eq!(dome.center_color(), Vec4::new(0.0, 0.5, 0.8, 1.0));
        assert_eq!(dome.index_count(), RINGS * SEGMENTS * 6);
        dome.render(&mut device).unwrap();
        assert!(device.bound_mesh().is_some());
        dome.release(&mut device);
        assert_eq!(device.live_meshes(), 0);
    }
}
