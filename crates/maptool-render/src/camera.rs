//! Editor camera: a position plus pitch/yaw/roll in degrees, moved by held
//! keys with ramped speeds.
//!
//! Rotation `(0, 0, 0)` looks down -Z with +Y up. Positive pitch tilts the
//! view downward and positive yaw turns right.

use glam::{EulerRot, Mat4, Quat, Vec3};

/// Seconds to reach full speed from rest.
const RAMP_UP_SECONDS: f32 = 0.25;

/// Speed lost per second once a key is released, as a multiple of the ramp-up rate.
const RAMP_DOWN_FACTOR: f32 = 2.0;

/// Position and orientation of the camera.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CameraPose {
    /// World-space position.
    pub position: Vec3,
    /// `(pitch, yaw, roll)` in degrees.
    pub rotation: Vec3,
}

/// Held movement inputs for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CameraMotion {
    pub forward: bool,
    pub backward: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    pub up: bool,
    pub down: bool,
    pub look_up: bool,
    pub look_down: bool,
}

/// Top speeds for translation (units/s) and rotation (degrees/s).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraSpeeds {
    pub move_speed: f32,
    pub turn_speed: f32,
}

impl Default for CameraSpeeds {
    fn default() -> Self {
        Self {
            move_speed: 10.0,
            turn_speed: 90.0,
        }
    }
}

/// Current ramped speed of each motion channel.
#[derive(Clone, Copy, Debug, Default)]
struct MotionRamp {
    forward: f32,
    backward: f32,
    turn_left: f32,
    turn_right: f32,
    up: f32,
    down: f32,
    look_up: f32,
    look_down: f32,
}

fn ramp(speed: &mut f32, held: bool, max: f32, frame_time: f32) {
    let step = max / RAMP_UP_SECONDS * frame_time;
    if held {
        *speed = (*speed + step).min(max);
    } else {
        *speed = (*speed - step * RAMP_DOWN_FACTOR).max(0.0);
    }
}

/// The scene camera. Call [`render`](Self::render) after changing the pose to
/// refresh the view matrix.
#[derive(Clone, Debug)]
pub struct Camera {
    pose: CameraPose,
    view: Mat4,
    base_view: Mat4,
    speeds: CameraSpeeds,
    ramp: MotionRamp,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(CameraSpeeds::default())
    }
}

impl Camera {
    pub fn new(speeds: CameraSpeeds) -> Self {
        Self {
            pose: CameraPose::default(),
            view: Mat4::IDENTITY,
            base_view: Mat4::IDENTITY,
            speeds,
            ramp: MotionRamp::default(),
        }
    }

    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.pose.position = Vec3::new(x, y, z);
    }

    /// Set `(pitch, yaw, roll)` in degrees.
    pub fn set_rotation(&mut self, pitch: f32, yaw: f32, roll: f32) {
        self.pose.rotation = Vec3::new(pitch, yaw, roll);
    }

    pub fn position(&self) -> Vec3 {
        self.pose.position
    }

    pub fn rotation(&self) -> Vec3 {
        self.pose.rotation
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    /// Orientation quaternion for the current pitch/yaw/roll.
    pub fn orientation(&self) -> Quat {
        let r = self.pose.rotation;
        Quat::from_euler(
            EulerRot::YXZ,
            -r.y.to_radians(),
            -r.x.to_radians(),
            r.z.to_radians(),
        )
    }

    /// The forward direction vector.
    pub fn forward(&self) -> Vec3 {
        self.orientation() * Vec3::NEG_Z
    }

    /// The up direction vector.
    pub fn up(&self) -> Vec3 {
        self.orientation() * Vec3::Y
    }

    /// Recompute the view matrix from the current pose.
    pub fn render(&mut self) {
        self.view = Mat4::look_to_rh(self.pose.position, self.forward(), self.up());
    }

    /// Capture the current view matrix as the base view used for screen-space drawing.
    pub fn render_base_view(&mut self) {
        self.base_view = self.view;
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    pub fn base_view_matrix(&self) -> Mat4 {
        self.base_view
    }

    /// Advance the pose by `frame_time` seconds of held movement.
    ///
    /// Yaw wraps into `[0, 360)`, pitch is clamped to `[-90, 90]`, and
    /// forward/backward motion follows the heading on the XZ plane.
    pub fn frame(&mut self, frame_time: f32, motion: &CameraMotion) {
        let CameraSpeeds {
            move_speed,
            turn_speed,
        } = self.speeds;
        let r = &mut self.ramp;
        ramp(&mut r.forward, motion.forward, move_speed, frame_time);
        ramp(&mut r.backward, motion.backward, move_speed, frame_time);
        ramp(&mut r.up, motion.up, move_speed, frame_time);
        ramp(&mut r.down, motion.down, move_speed, frame_time);
        ramp(&mut r.turn_left, motion.turn_left, turn_speed, frame_time);
        ramp(&mut r.turn_right, motion.turn_right, turn_speed, frame_time);
        ramp(&mut r.look_up, motion.look_up, turn_speed, frame_time);
        ramp(&mut r.look_down, motion.look_down, turn_speed, frame_time);

        let rotation = &mut self.pose.rotation;
        rotation.y = (rotation.y + (r.turn_right - r.turn_left) * frame_time).rem_euclid(360.0);
        rotation.x = (rotation.x + (r.look_down - r.look_up) * frame_time).clamp(-90.0, 90.0);

        let yaw = rotation.y.to_radians();
        let heading = Vec3::new(yaw.sin(), 0.0, -yaw.cos());
        self.pose.position += heading * (r.forward - r.backward) * frame_time;
        self.pose.position.y += (r.up - r.down) * frame_time;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_identity_camera_looks_down_neg_z() {
        let camera = Camera::default();
        assert!(approx(camera.forward(), Vec3::NEG_Z));
        assert!(approx(camera.up(), Vec3::Y));
    }

    #[test]
    fn test_positive_pitch_looks_down() {
        let mut camera = Camera::default();
        camera.set_rotation(36.0, 0.0, 0.0);
        assert!(camera.forward().y < 0.0);
    }

    #[test]
    fn test_positive_yaw_turns_right() {
        let mut camera = Camera::default();
        camera.set_rotation(0.0, 90.0, 0.0);
        assert!(approx(camera.forward(), Vec3::X));
    }

    #[test]
    fn test_point_ahead_has_negative_view_z() {
        let mut camera = Camera::default();
        camera.set_position(0.0, 0.0, 10.0);
        camera.render();
        let p = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert!(approx(p, Vec3::new(0.0, 0.0, -10.0)));
    }

    #[test]
    fn test_base_view_is_captured_once() {
        let mut camera = Camera::default();
        camera.set_position(0.0, 0.0, -10.0);
        camera.render();
        camera.render_base_view();
        let base = camera.base_view_matrix();

        camera.set_position(5.0, 5.0, 5.0);
        camera.render();
        assert_eq!(camera.base_view_matrix(), base);
        assert_ne!(camera.view_matrix(), base);
    }

    #[test]
    fn test_forward_motion_ramps_up() {
        let mut camera = Camera::default();
        let motion = CameraMotion {
            forward: true,
            ..Default::default()
        };
        camera.frame(0.1, &motion);
        let first = camera.position().z;
        camera.frame(0.1, &motion);
        let second = camera.position().z - first;
        assert!(first < 0.0);
        assert!(second < first, "second step should be longer");
    }

    #[test]
    fn test_motion_decays_after_release() {
        let mut camera = Camera::default();
        let held = CameraMotion {
            up: true,
            ..Default::default()
        };
        for _ in 0..10 {
            camera.frame(0.1, &held);
        }
        for _ in 0..10 {
            camera.frame(0.1, &CameraMotion::default());
        }
        let y = camera.position().y;
        camera.frame(0.1, &CameraMotion::default());
        assert_eq!(camera.position().y, y);
    }

    #[test]
    fn test_pitch_clamped_and_yaw_wrapped() {
        let mut camera = Camera::default();
        let motion = CameraMotion {
            look_down: true,
            turn_left: true,
            ..Default::default()
        };
        for _ in 0..100 {
            camera.frame(0.1, &motion);
        }
        let r = camera.rotation();
        assert_eq!(r.x, 90.0);
        assert!((0.0..360.0).contains(&r.y));
    }

    #[test]
    fn test_idle_frame_keeps_pose() {
        let mut camera = Camera::default();
        camera.set_position(1.0, 2.0, 3.0);
        camera.set_rotation(10.0, 20.0, 0.0);
        camera.frame(0.016, &CameraMotion::default());
        assert_eq!(camera.position(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(camera.rotation(), Vec3::new(10.0, 20.0, 0.0));
    }
}
