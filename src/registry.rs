use rapier3d::prelude::{ColliderHandle, RigidBodyHandle};

use crate::controller::OrbitControls;
use crate::model::{Camera, CameraSettings, HelperId, LightId, MeshId, SceneGraph};

/// Render-side objects the frame loop and the debug panel touch.
pub struct SceneObjects {
    pub scene: SceneGraph,
    pub camera: Camera,
    pub controls: OrbitControls,
    pub physics_cube: MeshId,
    pub slope: MeshId,
    pub ground: MeshId,
    pub ambient_light: LightId,
    pub point_light: LightId,
    pub sun_light: LightId,
    pub axes_helper: HelperId,
    pub point_light_helper: HelperId,
    pub sun_light_helper: HelperId,
    pub grid_helper: HelperId,
}

/// Handles into the physics world.
#[derive(Debug, Clone)]
pub struct PhysicsObjects {
    pub physics_cube_body: RigidBodyHandle,
    pub slope_body: RigidBodyHandle,
    /// Replaced when the slope is resized.
    pub slope_collider: Option<ColliderHandle>,
    pub ground_body: RigidBodyHandle,
}

/// Everything the per-frame code reads or writes. No behaviour of its own.
pub struct ObjectRegistry {
    pub scene: SceneObjects,
    pub physics: PhysicsObjects,
    pub camera_settings: CameraSettings,
}
