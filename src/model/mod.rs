// MODEL: Scene data and camera
pub mod camera;
pub mod scene;

pub use camera::{Camera, CameraSettings};
pub use scene::{Geometry, Helper, HelperId, HelperKind, Light, LightId, LightKind, Material, MeshId, RenderMesh, SceneGraph};
