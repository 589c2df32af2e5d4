use glam::{Mat4, Vec3};

use crate::config::{CameraConfig, FollowConfig};

/// Upper bound for the follow camera's vertical angle, in degrees.
pub const MAX_VERTICAL_ANGLE: f32 = 89.0;

pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
    projection: Mat4,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_config(&CameraConfig::default(), width, height)
    }

    pub fn from_config(config: &CameraConfig, width: u32, height: u32) -> Self {
        let mut camera = Self {
            eye: Vec3::from_array(config.eye),
            target: Vec3::from_array(config.target),
            up: Vec3::Y,
            fov_y: config.fov_deg.to_radians(),
            aspect: aspect_of(width, height),
            z_near: config.z_near,
            z_far: config.z_far,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.eye).normalize_or_zero()
    }

    /// Sets the aspect ratio only; call `update_projection_matrix` afterwards.
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = aspect_of(width, height);
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection = Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far);
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection * self.view()
    }
}

fn aspect_of(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

/// Runtime camera options edited from the debug panel.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraSettings {
    pub follow_cube: bool,
    vertical_angle: f32,
    pub follow_distance: f32,
    pub deadzone: f32,
}

impl CameraSettings {
    pub fn from_config(config: &FollowConfig) -> Self {
        let mut settings = Self {
            follow_cube: config.enabled,
            vertical_angle: 0.0,
            follow_distance: config.distance,
            deadzone: config.deadzone,
        };
        settings.set_vertical_angle(config.vertical_angle_deg);
        settings
    }

    /// Degrees, always within `[0, MAX_VERTICAL_ANGLE]`.
    pub fn vertical_angle(&self) -> f32 {
        self.vertical_angle
    }

    pub fn set_vertical_angle(&mut self, degrees: f32) {
        if degrees.is_nan() {
            return;
        }
        self.vertical_angle = degrees.clamp(0.0, MAX_VERTICAL_ANGLE);
    }
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self::from_config(&FollowConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_angle_is_clamped() {
        let mut settings = CameraSettings::default();
        assert_eq!(settings.vertical_angle(), 30.0);

        settings.set_vertical_angle(95.0);
        assert_eq!(settings.vertical_angle(), 89.0);

        settings.set_vertical_angle(-10.0);
        assert_eq!(settings.vertical_angle(), 0.0);

        settings.set_vertical_angle(f32::NAN);
        assert_eq!(settings.vertical_angle(), 0.0);
    }

    #[test]
    fn projection_follows_aspect_only_after_update() {
        let mut cam = Camera::new(800, 600);
        let before = cam.projection();
        cam.set_aspect(1600, 600);
        assert_eq!(cam.projection(), before);
        cam.update_projection_matrix();
        assert_ne!(cam.projection(), before);
        assert!((cam.aspect - 1600.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn default_pose_looks_at_slope() {
        let cam = Camera::new(800, 600);
        assert_eq!(cam.eye, Vec3::new(8.0, 6.0, 8.0));
        assert_eq!(cam.target, Vec3::new(0.0, 2.0, 0.0));
        assert!(!cam.view_proj().col(0).x.is_nan());
    }
}
