//! Per-frame glue shared by the browser and desktop hosts.

use crate::config::DemoConfig;
use crate::controller::{FrameLoop, FrameStats, InputState, PhysicsWorld, RenderTarget};
use crate::setup::build_demo;
use crate::store::KeyValueStore;
use crate::ui::DebugPanel;

/// Whether pointer events belong to the panel rather than the orbit controls.
pub fn ui_wants_pointer(ctx: &egui::Context) -> bool {
    ctx.is_pointer_over_area() || ctx.wants_pointer_input()
}

/// Something that can draw an egui overlay on its next frame.
pub trait EguiOverlay {
    fn set_egui_output(&mut self, ctx: &egui::Context, output: egui::FullOutput);
}

pub struct App<T> {
    frame_loop: FrameLoop<PhysicsWorld, T>,
    panel: DebugPanel,
    egui_ctx: egui::Context,
}

impl<T: RenderTarget + EguiOverlay> App<T> {
    pub fn new(config: &DemoConfig, target: T, store: Box<dyn KeyValueStore>) -> Self {
        let (frame_loop, panel) = build_demo(config, target, store);
        Self { frame_loop, panel, egui_ctx: egui::Context::default() }
    }

    pub fn egui_ctx(&self) -> &egui::Context {
        &self.egui_ctx
    }

    pub fn frame_loop(&self) -> &FrameLoop<PhysicsWorld, T> {
        &self.frame_loop
    }

    pub fn panel(&self) -> &DebugPanel {
        &self.panel
    }

    pub fn ui_wants_pointer(&self) -> bool {
        ui_wants_pointer(&self.egui_ctx)
    }

    /// Apply pending input, run the panel, then tick the frame loop.
    pub fn frame(
        &mut self,
        input: &mut InputState,
        mut raw_input: egui::RawInput,
        now_seconds: f64,
    ) -> (FrameStats, egui::PlatformOutput) {
        let ((dx, dy), wheel) = input.consume();
        // drag distances are in the same units as the egui screen rect
        let viewport_height = raw_input
            .screen_rect
            .map(|r| r.height())
            .unwrap_or_else(|| self.frame_loop.target().buffer_size().1 as f32);
        {
            let controls = &mut self.frame_loop.registry_mut().scene.controls;
            if dx != 0.0 || dy != 0.0 {
                controls.rotate(dx, dy, viewport_height);
            }
            if wheel != 0.0 {
                controls.zoom(wheel);
            }
        }

        raw_input.time = Some(now_seconds);
        let mut output = {
            let (registry, world) = self.frame_loop.parts_mut();
            self.panel.run(&self.egui_ctx, raw_input, registry, world, now_seconds)
        };
        let platform_output = std::mem::take(&mut output.platform_output);
        self.frame_loop.target_mut().set_egui_output(&self.egui_ctx, output);

        (self.frame_loop.tick(), platform_output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::InputEvent;
    use crate::controller::{MouseButton, Simulation};
    use crate::model::{Camera, SceneGraph};
    use crate::store::MemoryStore;

    #[derive(Default)]
    struct HeadlessTarget {
        renders: usize,
        overlays: usize,
    }

    impl RenderTarget for HeadlessTarget {
        fn display_size(&self) -> (u32, u32) {
            (800, 600)
        }

        fn buffer_size(&self) -> (u32, u32) {
            (800, 600)
        }

        fn resize_buffer(&mut self, _width: u32, _height: u32) {}

        fn render(&mut self, _scene: &SceneGraph, _camera: &Camera) {
            self.renders += 1;
        }
    }

    impl EguiOverlay for HeadlessTarget {
        fn set_egui_output(&mut self, _ctx: &egui::Context, _output: egui::FullOutput) {
            self.overlays += 1;
        }
    }

    fn app() -> App<HeadlessTarget> {
        App::new(&DemoConfig::default(), HeadlessTarget::default(), Box::new(MemoryStore::new()))
    }

    #[test]
    fn each_frame_renders_once_with_overlay() {
        let mut app = app();
        let mut input = InputState::new();
        for i in 1..=3 {
            let (stats, _) = app.frame(&mut input, egui::RawInput::default(), i as f64 / 60.0);
            assert_eq!(stats.frame, i);
        }
        assert_eq!(app.frame_loop().target().renders, 3);
        assert_eq!(app.frame_loop().target().overlays, 3);
    }

    #[test]
    fn drag_orbits_the_camera() {
        let mut app = app();
        let eye = app.frame_loop().registry().scene.camera.eye;

        let mut input = InputState::new();
        input.process_event(&InputEvent::PointerDown { button: MouseButton::Left, x: 100.0, y: 100.0 }, false);
        input.process_event(&InputEvent::PointerMove { x: 160.0, y: 100.0 }, false);
        app.frame(&mut input, egui::RawInput::default(), 0.0);

        let moved = app.frame_loop().registry().scene.camera.eye;
        assert!((moved - eye).length() > 1e-3);
        // orbiting keeps the distance to the target
        let target = app.frame_loop().registry().scene.controls.target;
        assert!(((moved - target).length() - (eye - target).length()).abs() < 1e-3);
    }

    #[test]
    fn cube_falls_through_the_real_world() {
        let mut app = app();
        let mut input = InputState::new();
        for i in 0..30 {
            app.frame(&mut input, egui::RawInput::default(), i as f64 / 60.0);
        }
        let registry = app.frame_loop().registry();
        let cube = registry.scene.scene.mesh(registry.scene.physics_cube);
        assert!(cube.position.y < 8.0);
        assert_eq!(app.frame_loop().simulation().body_state(registry.physics.physics_cube_body).unwrap().translation, cube.position);
    }
}
