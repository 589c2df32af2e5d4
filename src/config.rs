use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Startup configuration. Every field has a default, so a partial JSON file is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DemoConfig {
    pub physics: PhysicsConfig,
    pub camera: CameraConfig,
    pub follow: FollowConfig,
    pub renderer: RendererConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity_y: f32,
    pub cube_spawn: [f32; 3],
    pub restitution: f32,
    pub friction: f32,
    /// Radians about +Z.
    pub slope_angle: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity_y: -9.81,
            cube_spawn: [0.0, 8.0, 0.0],
            restitution: 0.3,
            friction: 0.4,
            slope_angle: std::f32::consts::FRAC_PI_6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_deg: f32,
    pub eye: [f32; 3],
    pub target: [f32; 3],
    pub z_near: f32,
    pub z_far: f32,
    pub damping: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_deg: 75.0,
            eye: [8.0, 6.0, 8.0],
            target: [0.0, 2.0, 0.0],
            z_near: 0.1,
            z_far: 1000.0,
            damping: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowConfig {
    pub enabled: bool,
    pub vertical_angle_deg: f32,
    pub distance: f32,
    pub deadzone: f32,
}

impl Default for FollowConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            vertical_angle_deg: 30.0,
            distance: 5.0,
            deadzone: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub max_pixel_ratio: f64,
    pub clear_color: [f64; 4],
    pub canvas_id: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            max_pixel_ratio: 2.0,
            clear_color: [0.05, 0.07, 0.1, 1.0],
            canvas_id: "scene".to_string(),
        }
    }
}

impl DemoConfig {
    pub fn from_json(src: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(src)?)
    }

    /// Native only: read `SLOPEBOX_CONFIG` if set, defaults otherwise.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var("SLOPEBOX_CONFIG") {
            Ok(path) => {
                let src = std::fs::read_to_string(&path)?;
                let config = Self::from_json(&src)?;
                tracing::info!(%path, "loaded config");
                Ok(config)
            }
            Err(_) => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = DemoConfig::from_json(r#"{ "follow": { "distance": 7.5 } }"#).unwrap();
        assert_eq!(config.follow.distance, 7.5);
        assert_eq!(config.follow.vertical_angle_deg, 30.0);
        assert_eq!(config.physics, PhysicsConfig::default());
        assert_eq!(config.renderer.canvas_id, "scene");
    }

    #[test]
    fn bad_json_is_an_error() {
        assert!(matches!(DemoConfig::from_json("{"), Err(ConfigError::Json(_))));
    }
}
