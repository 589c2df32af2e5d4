use std::f32::consts::PI;

use glam::{Vec2, Vec3};

use crate::config::CameraConfig;
use crate::model::{Camera, CameraSettings};

const EPS: f32 = 1e-6;

/// Orbits the camera around `target` on a sphere. Pointer drag rotates,
/// the wheel dollies, and damping carries momentum across frames.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub auto_rotate: bool,
    /// 2.0 is one full turn per 30 seconds at 60 fps.
    pub auto_rotate_speed: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    // pending (theta, phi) in radians
    spherical_delta: Vec2,
    scale: f32,
}

impl OrbitControls {
    pub fn new(target: Vec3) -> Self {
        Self {
            target,
            enable_damping: false,
            damping_factor: 0.05,
            auto_rotate: false,
            auto_rotate_speed: 2.0,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            spherical_delta: Vec2::ZERO,
            scale: 1.0,
        }
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        let mut controls = Self::new(Vec3::from_array(config.target));
        controls.enable_damping = config.damping;
        controls
    }

    /// Queue a drag of `dx`, `dy` pixels on a viewport `viewport_height` pixels tall.
    pub fn rotate(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let h = viewport_height.max(1.0);
        self.spherical_delta.x -= 2.0 * PI * dx / h * self.rotate_speed;
        self.spherical_delta.y -= 2.0 * PI * dy / h * self.rotate_speed;
    }

    /// Negative `delta_y` (wheel up) moves closer.
    pub fn zoom(&mut self, delta_y: f32) {
        let zoom_scale = 0.95f32.powf(self.zoom_speed);
        if delta_y < 0.0 {
            self.scale *= zoom_scale;
        } else if delta_y > 0.0 {
            self.scale /= zoom_scale;
        }
    }

    /// Drop queued rotation, zoom and damping momentum.
    pub fn cancel_motion(&mut self) {
        self.spherical_delta = Vec2::ZERO;
        self.scale = 1.0;
    }

    pub fn is_idle(&self) -> bool {
        self.spherical_delta.abs().max_element() < EPS && (self.scale - 1.0).abs() < EPS && !self.auto_rotate
    }

    /// Apply queued motion to `camera`. Returns false, leaving the eye untouched,
    /// when there was nothing to apply.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        camera.target = self.target;
        if self.is_idle() {
            self.cancel_motion();
            return false;
        }

        let offset = camera.eye - self.target;
        let radius = offset.length();
        if radius < EPS {
            self.cancel_motion();
            return false;
        }

        if self.auto_rotate {
            self.spherical_delta.x -= 2.0 * PI / 60.0 / 60.0 * self.auto_rotate_speed;
        }

        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        let factor = if self.enable_damping { self.damping_factor } else { 1.0 };
        theta += self.spherical_delta.x * factor;
        phi = (phi + self.spherical_delta.y * factor).clamp(EPS, PI - EPS);
        let radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);

        let sin_phi_radius = phi.sin() * radius;
        camera.eye = self.target
            + Vec3::new(
                sin_phi_radius * theta.sin(),
                phi.cos() * radius,
                sin_phi_radius * theta.cos(),
            );

        if self.enable_damping {
            self.spherical_delta *= 1.0 - self.damping_factor;
        } else {
            self.spherical_delta = Vec2::ZERO;
        }
        self.scale = 1.0;
        true
    }
}

/// Third-person camera eye behind a moving body.
///
/// Returns `None` when the body is inside the deadzone and the camera sits
/// directly above or below it, in which case the camera stays where it is.
pub fn follow_camera_eye(
    body_position: Vec3,
    body_linvel: Vec3,
    current_eye: Vec3,
    settings: &CameraSettings,
) -> Option<Vec3> {
    let angle = settings.vertical_angle().to_radians();
    let horizontal = settings.follow_distance * angle.cos();
    let height = settings.follow_distance * angle.sin() + body_position.y;

    let moving = body_linvel.x.abs() > settings.deadzone || body_linvel.z.abs() > settings.deadzone;
    let direction = if moving {
        // behind the body, against its direction of travel
        -Vec2::new(body_linvel.x, body_linvel.z).normalize()
    } else {
        // keep the current bearing so the camera does not snap when the body stops
        let offset = Vec2::new(current_eye.x - body_position.x, current_eye.z - body_position.z);
        if offset.length() == 0.0 {
            return None;
        }
        offset.normalize()
    };

    Some(Vec3::new(
        body_position.x + direction.x * horizontal,
        height,
        body_position.z + direction.y * horizontal,
    ))
}

/// Put the camera into follow pose for this frame and re-target the orbit controls.
pub fn apply_follow(
    controls: &mut OrbitControls,
    camera: &mut Camera,
    body_position: Vec3,
    body_linvel: Vec3,
    settings: &CameraSettings,
) {
    if let Some(eye) = follow_camera_eye(body_position, body_linvel, camera.eye, settings) {
        camera.eye = eye;
    }
    controls.target = body_position;
    controls.cancel_motion();
    controls.update(camera);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec_eq(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-4, "{a:?} != {b:?}");
    }

    #[test]
    fn moving_body_puts_camera_behind_it() {
        let settings = CameraSettings::default();
        let body = Vec3::new(1.0, 2.0, -1.0);
        let eye = follow_camera_eye(body, Vec3::new(2.0, 0.0, 3.0), Vec3::new(8.0, 6.0, 8.0), &settings).unwrap();

        let dir = Vec2::new(2.0, 3.0).normalize();
        let horizontal = 5.0 * 30f32.to_radians().cos();
        assert!((horizontal - 4.330).abs() < 1e-3);
        assert_vec_eq(eye, Vec3::new(body.x - dir.x * horizontal, 2.5 + body.y, body.z - dir.y * horizontal));
    }

    #[test]
    fn vertical_velocity_alone_is_inside_deadzone() {
        let settings = CameraSettings::default();
        let body = Vec3::ZERO;
        let current = Vec3::new(0.0, 1.0, 3.0);
        let eye = follow_camera_eye(body, Vec3::new(0.05, -20.0, 0.0), current, &settings).unwrap();
        // bearing kept: still on +Z
        assert!(eye.x.abs() < 1e-5);
        assert!(eye.z > 0.0);
    }

    #[test]
    fn speed_must_exceed_deadzone_to_turn_camera() {
        let settings = CameraSettings::default();
        assert_eq!(settings.deadzone, 0.1);
        let current = Vec3::new(3.0, 1.0, 0.0);
        let horizontal = 5.0 * 30f32.to_radians().cos();

        // exactly at the deadzone: bearing kept, camera stays on +X
        let eye = follow_camera_eye(Vec3::ZERO, Vec3::new(0.1, 0.0, 0.0), current, &settings).unwrap();
        assert_vec_eq(eye, Vec3::new(horizontal, 2.5, 0.0));

        // just past it: camera jumps behind the velocity, onto -X
        let eye = follow_camera_eye(Vec3::ZERO, Vec3::new(0.1001, 0.0, 0.0), current, &settings).unwrap();
        assert_vec_eq(eye, Vec3::new(-horizontal, 2.5, 0.0));
    }

    #[test]
    fn stationary_body_keeps_bearing_at_new_distance() {
        let mut settings = CameraSettings::default();
        settings.set_vertical_angle(60.0);
        let body = Vec3::new(0.0, 1.0, 0.0);
        let current = Vec3::new(3.0, 9.0, 4.0);

        let eye = follow_camera_eye(body, Vec3::ZERO, current, &settings).unwrap();

        let horizontal = 5.0 * 60f32.to_radians().cos();
        let bearing = Vec2::new(3.0, 4.0).normalize();
        assert_vec_eq(
            eye,
            Vec3::new(bearing.x * horizontal, 5.0 * 60f32.to_radians().sin() + 1.0, bearing.y * horizontal),
        );
    }

    #[test]
    fn camera_directly_above_stationary_body_does_not_move() {
        let settings = CameraSettings::default();
        let body = Vec3::new(2.0, 1.0, -3.0);
        let current = Vec3::new(2.0, 7.0, -3.0);
        assert_eq!(follow_camera_eye(body, Vec3::ZERO, current, &settings), None);

        let mut camera = Camera::new(800, 600);
        camera.eye = current;
        let mut controls = OrbitControls::new(Vec3::ZERO);
        apply_follow(&mut controls, &mut camera, body, Vec3::ZERO, &settings);
        assert_eq!(camera.eye, current);
        assert_eq!(camera.target, body);
    }

    #[test]
    fn apply_follow_is_exact_even_with_pending_drag() {
        let settings = CameraSettings::default();
        let mut camera = Camera::new(800, 600);
        let mut controls = OrbitControls::new(Vec3::ZERO);
        controls.enable_damping = true;
        controls.rotate(120.0, 40.0, 600.0);

        let body = Vec3::new(0.0, 0.5, 0.0);
        apply_follow(&mut controls, &mut camera, body, Vec3::new(0.0, 0.0, 4.0), &settings);

        assert_vec_eq(camera.eye, Vec3::new(0.0, 3.0, -5.0 * 30f32.to_radians().cos()));
        assert_eq!(controls.target, body);
        assert!(controls.is_idle());
    }

    #[test]
    fn idle_update_leaves_eye_alone() {
        let mut camera = Camera::new(800, 600);
        let eye = camera.eye;
        let mut controls = OrbitControls::new(camera.target);
        assert!(!controls.update(&mut camera));
        assert_eq!(camera.eye, eye);
    }

    #[test]
    fn rotation_keeps_radius_and_damping_decays() {
        let mut camera = Camera::new(800, 600);
        let mut controls = OrbitControls::new(camera.target);
        controls.enable_damping = true;
        let radius = (camera.eye - controls.target).length();

        controls.rotate(100.0, 0.0, 600.0);
        let mut last_step = f32::INFINITY;
        let mut previous = camera.eye;
        for _ in 0..50 {
            assert!(controls.update(&mut camera));
            let step = (camera.eye - previous).length();
            assert!(step <= last_step + 1e-5);
            last_step = step;
            previous = camera.eye;
            assert!(((camera.eye - controls.target).length() - radius).abs() < 1e-3);
        }
    }

    #[test]
    fn polar_angle_never_flips_over_the_pole() {
        let mut camera = Camera::new(800, 600);
        let mut controls = OrbitControls::new(camera.target);
        controls.rotate(0.0, 10_000.0, 600.0);
        controls.update(&mut camera);
        let offset = camera.eye - controls.target;
        assert!(offset.y <= offset.length());
        assert!(Vec2::new(offset.x, offset.z).length() > 0.0);
    }

    #[test]
    fn wheel_up_moves_closer() {
        let mut camera = Camera::new(800, 600);
        let mut controls = OrbitControls::new(camera.target);
        let before = (camera.eye - controls.target).length();
        controls.zoom(-100.0);
        controls.update(&mut camera);
        let after = (camera.eye - controls.target).length();
        assert!((after - before * 0.95).abs() < 1e-3);
    }
}
