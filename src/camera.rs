//! Orbit camera and the startup fly-out rig.
//!
//! The camera itself is the usual yaw/pitch/distance orbit around a target.
//! `CameraRig` drives it for the first two seconds of the scene: it lerps
//! the camera pose from a close-up to the final framing, letting user drag
//! input apply on top each frame, then hands control over to the user for
//! good.

use glam::{Mat4, Vec3};

/// Duration of the fly-out animation in seconds.
pub const RIG_DURATION: f32 = 2.0;

/// Camera pose at scene start.
pub const INITIAL_POSE: Pose = Pose {
    position: Vec3::new(4.5, 4.0, 11.0),
    target: Vec3::ZERO,
};

/// Camera pose once the fly-out has finished.
pub const FINAL_POSE: Pose = Pose {
    position: Vec3::new(8.0, 6.0, 18.0),
    target: Vec3::ZERO,
};

/// A camera position plus the point it orbits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub target: Vec3,
}

impl Pose {
    fn lerp(&self, other: &Pose, t: f32) -> Pose {
        Pose {
            position: self.position.lerp(other.position, t),
            target: self.target.lerp(other.target, t),
        }
    }
}

/// Orbit camera for viewing the particle field.
pub struct OrbitCamera {
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Vertical rotation angle in radians.
    pub pitch: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
    /// Projection aspect ratio, updated on resize.
    pub aspect: f32,
}

impl OrbitCamera {
    /// 35 degree vertical field of view.
    const FOV_Y: f32 = 35.0 * std::f32::consts::PI / 180.0;
    const NEAR: f32 = 0.1;
    const FAR: f32 = 100.0;

    /// Create a camera at the rig's initial pose.
    pub fn new(aspect: f32) -> Self {
        let mut camera = Self {
            yaw: 0.0,
            pitch: 0.0,
            distance: 1.0,
            target: Vec3::ZERO,
            aspect,
        };
        camera.set_pose(INITIAL_POSE);
        camera
    }

    /// Place the camera at an explicit pose, rewriting the orbit angles.
    pub fn set_pose(&mut self, pose: Pose) {
        let offset = pose.position - pose.target;
        self.distance = offset.length().max(1e-4);
        self.pitch = (offset.y / self.distance).clamp(-1.0, 1.0).asin();
        self.yaw = offset.x.atan2(offset.z);
        self.target = pose.target;
    }

    /// Calculate the camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// Apply user drag input.
    pub fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw -= delta_yaw;
        self.pitch = (self.pitch + delta_pitch).clamp(-1.5, 1.5);
    }

    /// Apply user scroll input.
    pub fn zoom(&mut self, amount: f32) {
        self.distance = (self.distance - amount).clamp(1.0, 50.0);
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    /// Combined view-projection matrix.
    pub fn view_proj(&self) -> Mat4 {
        Mat4::perspective_rh(Self::FOV_Y, self.aspect, Self::NEAR, Self::FAR)
            * self.view_matrix()
    }
}

/// Fly-out state. There is no way back to `Animating`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RigState {
    Animating,
    Settled,
}

/// Drives the camera from `INITIAL_POSE` to `FINAL_POSE` over
/// [`RIG_DURATION`] seconds of scene time, then stops interfering.
pub struct CameraRig {
    start: Pose,
    end: Pose,
    duration: f32,
    state: RigState,
}

impl CameraRig {
    pub fn new() -> Self {
        Self {
            start: INITIAL_POSE,
            end: FINAL_POSE,
            duration: RIG_DURATION,
            state: RigState::Animating,
        }
    }

    /// Interpolation progress for a given elapsed scene time.
    pub fn progress(&self, elapsed: f32) -> f32 {
        (elapsed / self.duration).clamp(0.0, 1.0)
    }

    /// Whether the rig has handed control over to the user.
    pub fn is_settled(&self) -> bool {
        self.state == RigState::Settled
    }

    /// Advance the rig. While animating this overwrites the camera pose
    /// with the interpolated one; callers apply pending user input after
    /// this so a drag still lands within the same frame.
    pub fn update(&mut self, camera: &mut OrbitCamera, elapsed: f32) {
        if self.state == RigState::Settled {
            return;
        }
        let progress = self.progress(elapsed);
        camera.set_pose(self.start.lerp(&self.end, progress));
        if progress >= 1.0 {
            self.state = RigState::Settled;
        }
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-3, "{:?} != {:?}", a, b);
    }

    #[test]
    fn starts_at_initial_pose() {
        let mut camera = OrbitCamera::new(16.0 / 9.0);
        let mut rig = CameraRig::new();
        rig.update(&mut camera, 0.0);
        assert_close(camera.position(), INITIAL_POSE.position);
        assert_close(camera.target, INITIAL_POSE.target);
        assert!(!rig.is_settled());
    }

    #[test]
    fn reaches_final_pose_at_duration() {
        let mut camera = OrbitCamera::new(16.0 / 9.0);
        let mut rig = CameraRig::new();
        rig.update(&mut camera, RIG_DURATION);
        assert_close(camera.position(), FINAL_POSE.position);
        assert!(rig.is_settled());

        // Past the duration the pose stays clamped at the end.
        let mut late_camera = OrbitCamera::new(16.0 / 9.0);
        let mut late_rig = CameraRig::new();
        late_rig.update(&mut late_camera, 10.0);
        assert_close(late_camera.position(), FINAL_POSE.position);
    }

    #[test]
    fn progress_is_monotonic() {
        let rig = CameraRig::new();
        let mut last = -1.0f32;
        for step in 0..50 {
            let t = step as f32 * 0.05;
            let p = rig.progress(t);
            assert!(p >= last);
            assert!((0.0..=1.0).contains(&p));
            last = p;
        }
    }

    #[test]
    fn no_reentry_after_settling() {
        let mut camera = OrbitCamera::new(1.0);
        let mut rig = CameraRig::new();
        rig.update(&mut camera, 3.0);
        assert!(rig.is_settled());

        // User moves the camera; an earlier elapsed time must not restart
        // the animation or touch the pose.
        camera.orbit(0.4, 0.2);
        let user_position = camera.position();
        rig.update(&mut camera, 0.5);
        assert_close(camera.position(), user_position);
    }

    #[test]
    fn pose_round_trips_through_orbit_angles() {
        let mut camera = OrbitCamera::new(1.0);
        for pose in [
            INITIAL_POSE,
            FINAL_POSE,
            Pose {
                position: Vec3::new(-3.0, 2.0, -7.0),
                target: Vec3::new(1.0, 0.5, -1.0),
            },
        ] {
            camera.set_pose(pose);
            assert_close(camera.position(), pose.position);
        }
    }

    #[test]
    fn zoom_and_pitch_are_clamped() {
        let mut camera = OrbitCamera::new(1.0);
        camera.zoom(1000.0);
        assert_eq!(camera.distance, 1.0);
        camera.zoom(-1000.0);
        assert_eq!(camera.distance, 50.0);
        camera.orbit(0.0, 100.0);
        assert_eq!(camera.pitch, 1.5);
    }
}
