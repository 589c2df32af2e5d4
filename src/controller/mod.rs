// CONTROLLER: Input, camera placement, physics and the frame loop
pub mod input;
pub mod physics;
pub mod camera_controller;
pub mod frame_loop;

pub use input::{InputEvent, InputState, MouseButton};
pub use physics::{BodyState, PhysicsWorld, Simulation};
pub use camera_controller::{apply_follow, follow_camera_eye, OrbitControls};
pub use frame_loop::{resize_to_display, FrameLoop, FrameStats, RenderTarget};
