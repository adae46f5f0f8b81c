//! Mouse picking against the terrain.

use glam::{Mat4, Vec3};

use maptool_render::Camera;
use maptool_terrain::Terrain;

/// A world-space ray through a screen pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickRay {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl PickRay {
    /// Ray from the eye of `view` through pixel `mouse` of a
    /// `viewport`-sized window.
    ///
    /// `None` when the viewport is empty or a matrix is singular.
    pub fn through_pixel(
        view: &Mat4,
        projection: &Mat4,
        viewport: (u32, u32),
        mouse: (i32, i32),
    ) -> Option<Self> {
        let (width, height) = viewport;
        if width == 0 || height == 0 {
            return None;
        }
        let ndc_x = 2.0 * mouse.0 as f32 / width as f32 - 1.0;
        let ndc_y = 1.0 - 2.0 * mouse.1 as f32 / height as f32;

        let view_projection = *projection * *view;
        if view.determinant() == 0.0 || view_projection.determinant() == 0.0 {
            return None;
        }
        let eye = view.inverse().w_axis.truncate();
        let target = view_projection
            .inverse()
            .project_point3(Vec3::new(ndc_x, ndc_y, 0.5));
        let direction = (target - eye).try_normalize()?;
        Some(Self { origin: eye, direction })
    }
}

/// Casts rays from the camera and remembers the last result.
#[derive(Debug, Default)]
pub struct PickingTool {
    last: Option<Vec3>,
}

impl PickingTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick the terrain point under `mouse`, replacing the previous pick.
    pub fn pick(
        &mut self,
        camera: &Camera,
        projection: &Mat4,
        viewport: (u32, u32),
        mouse: (i32, i32),
        terrain: &Terrain,
    ) -> Option<Vec3> {
        self.last = PickRay::through_pixel(&camera.view_matrix(), projection, viewport, mouse)
            .and_then(|ray| terrain.raycast(ray.origin, ray.direction));
        self.last
    }

    pub fn last_pick(&self) -> Option<Vec3> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maptool_render::{HeadlessDevice, RenderDevice};
    use maptool_terrain::TerrainDescriptor;

    fn looking_down(x: f32, y: f32, z: f32) -> Camera {
        let mut camera = Camera::default();
        camera.set_position(x, y, z);
        camera.set_rotation(90.0, 0.0, 0.0);
        camera.render();
        camera
    }

    #[test]
    fn test_center_pixel_ray_is_forward() {
        let camera = looking_down(0.0, 10.0, 0.0);
        let device = HeadlessDevice::new(800, 600, 0.1, 1000.0);
        let ray = PickRay::through_pixel(
            &camera.view_matrix(),
            &device.projection_matrix(),
            (800, 600),
            (400, 300),
        )
        .unwrap();
        assert!((ray.direction - Vec3::NEG_Y).length() < 1e-4);
        assert!((ray.origin - camera.position()).length() < 1e-4);
    }

    #[test]
    fn test_ray_starts_at_rendered_eye() {
        let mut camera = looking_down(2.0, 10.0, -2.0);
        // Moved but not yet rendered: the ray still matches the drawn view.
        camera.set_position(30.0, 40.0, 50.0);
        let device = HeadlessDevice::new(800, 600, 0.1, 1000.0);
        let ray = PickRay::through_pixel(
            &camera.view_matrix(),
            &device.projection_matrix(),
            (800, 600),
            (400, 300),
        )
        .unwrap();
        assert!((ray.origin - Vec3::new(2.0, 10.0, -2.0)).length() < 1e-4);
        assert!((ray.direction - Vec3::NEG_Y).length() < 1e-4);
    }

    #[test]
    fn test_empty_viewport_has_no_ray() {
        let camera = looking_down(0.0, 10.0, 0.0);
        assert!(PickRay::through_pixel(
            &camera.view_matrix(),
            &Mat4::IDENTITY,
            (0, 600),
            (0, 0),
        )
        .is_none());
    }

    #[test]
    fn test_pick_hits_terrain_below() {
        let mut device = HeadlessDevice::new(800, 600, 0.1, 1000.0);
        let terrain = Terrain::new(
            &mut device,
            &TerrainDescriptor {
                cell_size: 4,
                tile_size: 2,
                ..Default::default()
            },
        )
        .unwrap();
        let camera = looking_down(4.0, 10.0, -4.0);
        let mut tool = PickingTool::new();
        let hit = tool
            .pick(&camera, &device.projection_matrix(), (800, 600), (400, 300), &terrain)
            .unwrap();
        assert!((hit - Vec3::new(4.0, 0.0, -4.0)).length() < 1e-3);
        assert_eq!(tool.last_pick(), Some(hit));

        // Off the grid the previous pick is replaced.
        let away = looking_down(-50.0, 10.0, -50.0);
        assert!(tool
            .pick(&away, &device.projection_matrix(), (800, 600), (400, 300), &terrain)
            .is_none());
        assert_eq!(tool.last_pick(), None);
    }
}
