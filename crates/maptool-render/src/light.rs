//! Directional light for terrain shading.
//!
//! The direction is kept as three angle-like components, each wrapped into
//! `[0, 360)` while auto-play animates it. [`LightUniform`] is the GPU-side
//! layout written for the lit shader.

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

/// Auto-play lowers the horizontal direction component by
/// `frame_time / AUTO_PLAY_DIVISOR` each frame.
pub const AUTO_PLAY_DIVISOR: f32 = 5.0;

/// Wrap `value` into `[0, 360)`.
pub fn wrap_degrees(value: f32) -> f32 {
    let wrapped = value.rem_euclid(360.0);
    // rem_euclid rounds tiny negatives up to exactly 360.0 in f32.
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// CPU-side directional light description.
#[derive(Clone, Debug, PartialEq)]
pub struct DirectionalLight {
    /// Direction components as handed to the lit shader.
    pub direction: Vec3,
    /// Diffuse RGBA color.
    pub diffuse: Vec4,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: Vec3::new(0.5, -1.0, -0.5),
            diffuse: Vec4::ONE,
        }
    }
}

impl DirectionalLight {
    pub fn set_direction(&mut self, x: f32, y: f32, z: f32) {
        self.direction = Vec3::new(x, y, z);
    }

    pub fn set_diffuse_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.diffuse = Vec4::new(r, g, b, a);
    }

    /// One auto-play tick: the z component drops by `frame_time / 5`, then
    /// every component is wrapped into `[0, 360)`.
    pub fn advance_auto_play(&mut self, frame_time: f32) {
        let mut dir = self.direction;
        dir.z -= frame_time / AUTO_PLAY_DIVISOR;
        self.direction = Vec3::new(wrap_degrees(dir.x), wrap_degrees(dir.y), wrap_degrees(dir.z));
    }
}

/// GPU-side light buffer, 32 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct LightUniform {
    pub diffuse: [f32; 4],
    pub direction: [f32; 3],
    pub padding: f32,
}

impl LightUniform {
    pub fn new(direction: Vec3, diffuse: Vec4) -> Self {
        Self {
            diffuse: diffuse.to_array(),
            direction: direction.to_array(),
            padding: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_subtracts_exactly_360() {
        assert_eq!(wrap_degrees(360.0), 0.0);
        assert_eq!(wrap_degrees(370.5), 10.5);
        assert_eq!(wrap_degrees(10.0), 10.0);
    }

    #[test]
    fn test_wrap_handles_negatives() {
        assert_eq!(wrap_degrees(-1.0), 359.0);
        let tiny = wrap_degrees(-1e-7);
        assert!((0.0..360.0).contains(&tiny), "got {tiny}");
    }

    #[test]
    fn test_default_light_matches_scene_setup() {
        let light = DirectionalLight::default();
        assert_eq!(light.direction, Vec3::new(0.5, -1.0, -0.5));
        assert_eq!(light.diffuse, Vec4::ONE);
    }

    #[test]
    fn test_auto_play_tick_lowers_z() {
        let mut light = DirectionalLight::default();
        light.set_direction(10.0, 20.0, 30.0);
        light.advance_auto_play(1.0);
        assert_eq!(light.direction.x, 10.0);
        assert_eq!(light.direction.y, 20.0);
        assert!((light.direction.z - 29.8).abs() < 1e-5);
    }

    #[test]
    fn test_auto_play_never_leaves_range() {
        let mut light = DirectionalLight::default();
        for step in 0..10_000 {
            light.advance_auto_play(0.016 * (step % 7) as f32 + 0.5);
            for c in light.direction.to_array() {
                assert!((0.0..360.0).contains(&c), "component {c} out of range");
            }
        }
    }

    #[test]
    fn test_uniform_layout() {
        assert_eq!(std::mem::size_of::<LightUniform>(), 32);
        assert_eq!(std::mem::offset_of!(LightUniform, direction), 16);
        let light = DirectionalLight::default();
        let u = LightUniform::new(light.direction, light.diffuse);
        assert_eq!(u.direction, [0.5, -1.0, -0.5]);
        assert_eq!(u.padding, 0.0);
    }
}
