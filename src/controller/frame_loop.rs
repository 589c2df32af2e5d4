use crate::controller::camera_controller::apply_follow;
use crate::controller::physics::Simulation;
use crate::model::{Camera, SceneGraph};
use crate::registry::ObjectRegistry;

/// Where frames end up: a canvas, a window surface, or a test double.
pub trait RenderTarget {
    /// Size the surface is displayed at, in physical pixels.
    fn display_size(&self) -> (u32, u32);
    /// Size of the drawing buffer, in physical pixels.
    fn buffer_size(&self) -> (u32, u32);
    fn resize_buffer(&mut self, width: u32, height: u32);
    fn render(&mut self, scene: &SceneGraph, camera: &Camera);
}

/// Resize the drawing buffer when the displayed size changed. Returns true if it did.
pub fn resize_to_display<T: RenderTarget + ?Sized>(target: &mut T) -> bool {
    let (width, height) = target.display_size();
    if width == 0 || height == 0 {
        return false;
    }
    if target.buffer_size() == (width, height) {
        return false;
    }
    target.resize_buffer(width, height);
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub frame: u64,
    pub resized: bool,
}

/// Owns all per-frame state; `tick` runs once per display refresh.
pub struct FrameLoop<S, T> {
    registry: ObjectRegistry,
    simulation: S,
    target: T,
    frame: u64,
    /// Set once the missing cube body has been reported.
    cube_missing_logged: bool,
}

impl<S: Simulation, T: RenderTarget> FrameLoop<S, T> {
    pub fn new(registry: ObjectRegistry, simulation: S, target: T) -> Self {
        Self { registry, simulation, target, frame: 0, cube_missing_logged: false }
    }

    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ObjectRegistry {
        &mut self.registry
    }

    pub fn simulation(&self) -> &S {
        &self.simulation
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    /// Split borrow for the debug panel, which edits both at once.
    pub fn parts_mut(&mut self) -> (&mut ObjectRegistry, &mut S) {
        (&mut self.registry, &mut self.simulation)
    }

    /// Step physics, mirror the cube, place the camera, render.
    pub fn tick(&mut self) -> FrameStats {
        self.simulation.step();

        let cube_body = self.registry.physics.physics_cube_body;
        let cube_state = self.simulation.body_state(cube_body);
        let scene = &mut self.registry.scene;

        match cube_state {
            Some(state) => {
                let mesh = scene.scene.mesh_mut(scene.physics_cube);
                mesh.position = state.translation;
                mesh.orientation = state.rotation;
                self.cube_missing_logged = false;
            }
            None if !self.cube_missing_logged => {
                tracing::warn!(?cube_body, "physics cube body missing, skipping sync");
                self.cube_missing_logged = true;
            }
            None => tracing::trace!(?cube_body, "physics cube body still missing"),
        }

        match (self.registry.camera_settings.follow_cube, cube_state) {
            (true, Some(state)) => apply_follow(
                &mut scene.controls,
                &mut scene.camera,
                state.translation,
                state.linvel,
                &self.registry.camera_settings,
            ),
            _ => {
                scene.controls.update(&mut scene.camera);
            }
        }

        let resized = resize_to_display(&mut self.target);
        if resized {
            let (width, height) = self.target.buffer_size();
            scene.camera.set_aspect(width, height);
            scene.camera.update_projection_matrix();
            tracing::debug!(width, height, "render buffer resized");
        }

        self.target.render(&scene.scene, &scene.camera);

        self.frame += 1;
        FrameStats { frame: self.frame, resized }
    }
}
