//! View frustum culling for terrain cells.
//!
//! Planes are extracted from the view-projection matrix (Griggs-Hartmann,
//! `[0, 1]` depth range) after the projection's far plane has been replaced
//! with the frustum's own screen depth.

use glam::{Mat4, Vec3, Vec4};

const LEFT: usize = 0;
const RIGHT: usize = 1;
const BOTTOM: usize = 2;
const TOP: usize = 3;
const NEAR: usize = 4;
const FAR: usize = 5;

/// An axis-aligned bounding box in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Vec3,
    /// Maximum corner of the bounding box.
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max corners.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box holding every point; `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::new(first, first), |b, p| {
            Self::new(b.min.min(p), b.max.max(p))
        }))
    }

    /// Returns the center point of the AABB.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Returns the half-extents (half-size along each axis).
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// The eight corners, bottom face first.
    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(b.x, b.y, b.z),
            Vec3::new(a.x, b.y, b.z),
        ]
    }

    /// Slab test: distance along the ray to the box entry point, 0 when the
    /// origin is inside, `None` on a miss. `direction` need not be normalized.
    pub fn ray_entry(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        let inv = direction.recip();
        let t0 = (self.min - origin) * inv;
        let t1 = (self.max - origin) * inv;
        // NaN from 0 * inf (origin on a slab face) is dropped by min/max.
        let near = t0.min(t1).max_element().max(0.0);
        let far = t0.max(t1).min_element();
        (near <= far).then_some(near)
    }
}

/// Six inward-pointing planes of the camera's visible volume.
#[derive(Clone, Debug)]
pub struct Frustum {
    screen_depth: f32,
    /// Left, right, bottom, top, near, far. `Vec4(a, b, c, d)` with a unit
    /// normal `(a, b, c)`.
    planes: [Vec4; 6],
}

impl Frustum {
    /// A frustum whose far plane sits at `screen_depth`. Planes are empty
    /// (everything visible) until [`construct`](Self::construct) runs.
    pub fn new(screen_depth: f32) -> Self {
        Self {
            screen_depth,
            planes: [Vec4::ZERO; 6],
        }
    }

    pub fn screen_depth(&self) -> f32 {
        self.screen_depth
    }

    /// Rebuild the planes for this frame's camera.
    pub fn construct(&mut self, projection: &Mat4, view: &Mat4) {
        let mut projection = *projection;
        // Right-handed perspective: row 2 is (0, 0, r, r * near) with
        // r = far / (near - far). Swap in our own far plane.
        let r = projection.z_axis.z;
        if r != 0.0 && projection.z_axis.w != 0.0 {
            let near = projection.w_axis.z / r;
            let far = self.screen_depth;
            if far > near {
                let r = far / (near - far);
                projection.z_axis.z = r;
                projection.w_axis.z = r * near;
            }
        }
        self.planes = Self::extract_planes(&(projection * *view));
    }

    fn extract_planes(vp: &Mat4) -> [Vec4; 6] {
        let rows = [vp.row(0), vp.row(1), vp.row(2), vp.row(3)];

        let mut planes = [Vec4::ZERO; 6];
        planes[LEFT] = rows[3] + rows[0];
        planes[RIGHT] = rows[3] - rows[0];
        planes[BOTTOM] = rows[3] + rows[1];
        planes[TOP] = rows[3] - rows[1];
        planes[NEAR] = rows[2];
        planes[FAR] = rows[3] - rows[2];

        for plane in &mut planes {
            let len = plane.truncate().length();
            if len > 0.0 {
                *plane /= len;
            }
        }
        planes
    }

    /// Whether `point` is inside all six planes.
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.truncate().dot(point) + plane.w >= 0.0)
    }

    /// Test whether an AABB is at least partially inside the frustum.
    ///
    /// For each plane the corner furthest along the normal (the p-vertex) is
    /// tested. May accept boxes just outside a frustum corner; never rejects
    /// a visible one.
    pub fn is_visible(&self, aabb: &Aabb) -> bool {
        self.planes.iter().all(|plane| {
            let normal = plane.truncate();
            let p = Vec3::select(normal.cmpge(Vec3::ZERO), aabb.max, aabb.min);
            normal.dot(p) + plane.w >= 0.0
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn looking_down_neg_z(screen_depth: f32) -> Frustum {
        let view = Mat4::look_to_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y);
        let proj = Mat4::perspective_rh(std::f32::consts::FRAC_PI_4, 4.0 / 3.0, 0.1, 1000.0);
        let mut frustum = Frustum::new(screen_depth);
        frustum.construct(&proj, &view);
        frustum
    }

    #[test]
    fn test_box_in_front_visible() {
        let f = looking_down_neg_z(100.0);
        let aabb = Aabb::new(Vec3::new(-1.0, -1.0, -5.0), Vec3::new(1.0, 1.0, -3.0));
        assert!(f.is_visible(&aabb));
    }

    #[test]
    fn test_box_behind_camera_culled() {
        let f = looking_down_neg_z(100.0);
        let aabb = Aabb::new(Vec3::new(-1.0, -1.0, 5.0), Vec3::new(1.0, 1.0, 10.0));
        assert!(!f.is_visible(&aabb));
    }

    #[test]
    fn test_far_plane_comes_from_screen_depth() {
        let f = looking_down_neg_z(100.0);
        let inside = Aabb::new(Vec3::new(-1.0, -1.0, -60.0), Vec3::new(1.0, 1.0, -50.0));
        let beyond = Aabb::new(Vec3::new(-1.0, -1.0, -200.0), Vec3::new(1.0, 1.0, -150.0));
        assert!(f.is_visible(&inside));
        assert!(!f.is_visible(&beyond));
        assert_eq!(f.screen_depth(), 100.0);
    }

    #[test]
    fn test_side_planes_cull() {
        let f = looking_down_neg_z(1000.0);
        let sides = [
            Aabb::new(Vec3::new(-1000.0, 0.0, -5.0), Vec3::new(-999.0, 1.0, -4.0)),
            Aabb::new(Vec3::new(999.0, 0.0, -5.0), Vec3::new(1000.0, 1.0, -4.0)),
            Aabb::new(Vec3::new(0.0, 999.0, -5.0), Vec3::new(1.0, 1000.0, -4.0)),
            Aabb::new(Vec3::new(0.0, -1000.0, -5.0), Vec3::new(1.0, -999.0, -4.0)),
        ];
        for aabb in &sides {
            assert!(!f.is_visible(aabb), "{aabb:?} should be culled");
        }
    }

    #[test]
    fn test_straddling_box_visible() {
        let f = looking_down_neg_z(1000.0);
        let aabb = Aabb::new(Vec3::new(-100.0, -1.0, -10.0), Vec3::new(1.0, 1.0, -5.0));
        assert!(f.is_visible(&aabb));
    }

    #[test]
    fn test_contains_point() {
        let f = looking_down_neg_z(100.0);
        assert!(f.contains_point(Vec3::new(0.0, 0.0, -10.0)));
        assert!(!f.contains_point(Vec3::new(0.0, 0.0, 10.0)));
    }

    #[test]
    fn test_unconstructed_frustum_accepts_everything() {
        let f = Frustum::new(10.0);
        assert!(f.is_visible(&Aabb::new(Vec3::splat(1e6), Vec3::splat(1e6 + 1.0))));
    }

    #[test]
    fn test_planes_normalized() {
        let f = looking_down_neg_z(100.0);
        for plane in &f.planes {
            assert!((plane.truncate().length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_aabb_from_points_and_center() {
        let aabb = Aabb::from_points([
            Vec3::new(-2.0, 3.0, 0.0),
            Vec3::new(2.0, -3.0, 4.0),
            Vec3::new(0.0, 0.0, -4.0),
        ])
        .unwrap();
        assert_eq!(aabb.min, Vec3::new(-2.0, -3.0, -4.0));
        assert_eq!(aabb.max, Vec3::new(2.0, 3.0, 4.0));
        assert_eq!(aabb.center(), Vec3::ZERO);
        assert_eq!(aabb.extents(), Vec3::new(2.0, 3.0, 4.0));
        assert!(Aabb::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn test_ray_entry() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let hit = aabb.ray_entry(Vec3::new(0.5, 5.0, 0.5), Vec3::NEG_Y);
        assert!((hit.unwrap() - 4.0).abs() < 1e-6);
        assert!(aabb.ray_entry(Vec3::new(0.5, 5.0, 0.5), Vec3::Y).is_none());
        assert_eq!(aabb.ray_entry(Vec3::splat(0.5), Vec3::X), Some(0.0));
    }
}
