use egui::Context;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::DemoConfig;
use crate::controller::physics::{self, ColliderMaterial, PhysicsWorld};
use crate::model::camera::MAX_VERTICAL_ANGLE;
use crate::model::CameraSettings;
use crate::registry::ObjectRegistry;
use crate::setup::{collider_material, SLOPE_SIZE};
use crate::store::KeyValueStore;

/// Storage key for the serialized [`PanelState`].
pub const STATE_KEY: &str = "guiState";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightSlot {
    Point,
    Ambient,
    Sun,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HelperSlot {
    Axes,
    PointLight,
    SunLight,
    Grid,
}

/// One edit coming out of the panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelAction {
    SetGravity(f32),
    ResetCube,
    SetCubeWireframe(bool),
    SetCubeColor([f32; 3]),
    SetCubeMetalness(f32),
    SetCubeRoughness(f32),
    SetSlopeAngle(f32),
    SetSlopeSize { width: f32, length: f32 },
    ResetSlope,
    SetLightVisible(LightSlot, bool),
    SetHelperVisible(HelperSlot, bool),
    SetAutoRotate(bool),
    SetFollowCube(bool),
    SetVerticalAngle(f32),
    ResetAll,
}

impl PanelAction {
    /// Buttons act once and change no stored value.
    fn is_value_change(&self) -> bool {
        !matches!(self, PanelAction::ResetCube | PanelAction::ResetAll)
    }
}

/// Every value the panel shows, as persisted under [`STATE_KEY`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelState {
    pub gravity: f32,
    pub cube_wireframe: bool,
    pub cube_color: [f32; 3],
    pub cube_metalness: f32,
    pub cube_roughness: f32,
    pub slope_angle: f32,
    pub slope_width: f32,
    pub slope_length: f32,
    pub point_light: bool,
    pub ambient_light: bool,
    pub sun_light: bool,
    pub axes_helper: bool,
    pub point_light_helper: bool,
    pub sun_light_helper: bool,
    pub grid_helper: bool,
    pub auto_rotate: bool,
    pub follow_cube: bool,
    pub vertical_angle: f32,
}

impl Default for PanelState {
    fn default() -> Self {
        Self::from_config(&DemoConfig::default())
    }
}

impl PanelState {
    pub fn from_config(config: &DemoConfig) -> Self {
        Self {
            gravity: config.physics.gravity_y,
            cube_wireframe: false,
            cube_color: crate::model::scene::hex_color(0xff3030),
            cube_metalness: 0.5,
            cube_roughness: 0.7,
            slope_angle: config.physics.slope_angle,
            slope_width: SLOPE_SIZE.x,
            slope_length: SLOPE_SIZE.z,
            point_light: true,
            ambient_light: true,
            sun_light: true,
            axes_helper: false,
            point_light_helper: false,
            sun_light_helper: false,
            grid_helper: true,
            auto_rotate: false,
            follow_cube: config.follow.enabled,
            vertical_angle: CameraSettings::from_config(&config.follow).vertical_angle(),
        }
    }

    /// Actions that bring a freshly built scene to this state.
    pub fn to_actions(&self) -> Vec<PanelAction> {
        use PanelAction::*;
        vec![
            SetGravity(self.gravity),
            SetCubeWireframe(self.cube_wireframe),
            SetCubeColor(self.cube_color),
            SetCubeMetalness(self.cube_metalness),
            SetCubeRoughness(self.cube_roughness),
            SetSlopeAngle(self.slope_angle),
            SetSlopeSize { width: self.slope_width, length: self.slope_length },
            SetLightVisible(LightSlot::Point, self.point_light),
            SetLightVisible(LightSlot::Ambient, self.ambient_light),
            SetLightVisible(LightSlot::Sun, self.sun_light),
            SetHelperVisible(HelperSlot::Axes, self.axes_helper),
            SetHelperVisible(HelperSlot::PointLight, self.point_light_helper),
            SetHelperVisible(HelperSlot::SunLight, self.sun_light_helper),
            SetHelperVisible(HelperSlot::Grid, self.grid_helper),
            SetAutoRotate(self.auto_rotate),
            SetFollowCube(self.follow_cube),
            SetVerticalAngle(self.vertical_angle),
        ]
    }
}

/// Frame rate averaged over half-second windows.
#[derive(Debug, Default)]
pub struct FpsCounter {
    last: Option<f64>,
    frames: u32,
    elapsed: f64,
    fps: f32,
}

impl FpsCounter {
    pub fn tick(&mut self, now_seconds: f64) {
        if let Some(last) = self.last {
            self.elapsed += (now_seconds - last).max(0.0);
            self.frames += 1;
            if self.elapsed >= 0.5 {
                self.fps = (self.frames as f64 / self.elapsed) as f32;
                self.frames = 0;
                self.elapsed = 0.0;
            }
        }
        self.last = Some(now_seconds);
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

/// The "Debug GUI" window and its persisted state.
pub struct DebugPanel {
    state: PanelState,
    defaults: PanelState,
    store: Box<dyn KeyValueStore>,
    cube_spawn: Vec3,
    material: ColliderMaterial,
    dirty: bool,
    fps: FpsCounter,
}

impl DebugPanel {
    /// Load any stored state and push it into the scene and the world.
    pub fn attach(
        config: &DemoConfig,
        store: Box<dyn KeyValueStore>,
        registry: &mut ObjectRegistry,
        world: &mut PhysicsWorld,
    ) -> Self {
        let defaults = PanelState::from_config(config);
        let mut panel = Self {
            state: defaults.clone(),
            defaults,
            store,
            cube_spawn: Vec3::from_array(config.physics.cube_spawn),
            material: collider_material(config),
            dirty: false,
            fps: FpsCounter::default(),
        };

        let stored = match panel.store.get(STATE_KEY) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(error = %e, "could not read panel state");
                None
            }
        };
        let restored = stored.and_then(|json| match serde_json::from_str::<PanelState>(&json) {
            Ok(state) => Some(state),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring corrupt panel state");
                None
            }
        });
        if let Some(state) = restored {
            tracing::info!("restoring panel state");
            for action in state.to_actions() {
                panel.apply(action, registry, world);
            }
            panel.dirty = false;
        }
        panel
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn fps(&self) -> f32 {
        self.fps.fps()
    }

    /// Apply one action and persist the result right away.
    pub fn dispatch(&mut self, action: PanelAction, registry: &mut ObjectRegistry, world: &mut PhysicsWorld) {
        self.apply(action, registry, world);
        self.flush();
    }

    /// Apply one action; value changes are saved on the next [`flush`](Self::flush).
    pub fn apply(&mut self, action: PanelAction, registry: &mut ObjectRegistry, world: &mut PhysicsWorld) {
        tracing::debug!(?action, "panel action");
        let objects = &mut registry.scene;
        let state = &mut self.state;

        match action {
            PanelAction::SetGravity(g) => {
                world.set_gravity(Vec3::new(0.0, g, 0.0));
                state.gravity = g;
            }
            PanelAction::ResetCube => {
                let body = registry.physics.physics_cube_body;
                world.set_translation(body, self.cube_spawn, true);
                world.set_linvel(body, Vec3::ZERO, true);
                world.set_angvel(body, Vec3::ZERO, true);
            }
            PanelAction::SetCubeWireframe(on) => {
                objects.scene.mesh_mut(objects.physics_cube).material.wireframe = on;
                state.cube_wireframe = on;
            }
            PanelAction::SetCubeColor(color) => {
                objects.scene.mesh_mut(objects.physics_cube).material.color = color;
                state.cube_color = color;
            }
            PanelAction::SetCubeMetalness(m) => {
                let m = m.clamp(0.0, 1.0);
                objects.scene.mesh_mut(objects.physics_cube).material.metalness = m;
                state.cube_metalness = m;
            }
            PanelAction::SetCubeRoughness(r) => {
                let r = r.clamp(0.0, 1.0);
                objects.scene.mesh_mut(objects.physics_cube).material.roughness = r;
                state.cube_roughness = r;
            }
            PanelAction::SetSlopeAngle(angle) => {
                let rotation = Quat::from_axis_angle(Vec3::Z, angle);
                objects.scene.mesh_mut(objects.slope).orientation = rotation;
                world.set_rotation(registry.physics.slope_body, rotation, true);
                state.slope_angle = angle;
            }
            PanelAction::SetSlopeSize { width, length } => {
                let width = width.clamp(1.0, 10.0);
                let length = length.clamp(1.0, 12.0);
                objects.scene.mesh_mut(objects.slope).scale =
                    Vec3::new(width / SLOPE_SIZE.x, 1.0, length / SLOPE_SIZE.z);
                let collider = physics::replace_cuboid_collider(
                    world,
                    registry.physics.slope_body,
                    registry.physics.slope_collider,
                    Vec3::new(width, SLOPE_SIZE.y, length) * 0.5,
                    self.material,
                );
                registry.physics.slope_collider = Some(collider);
                state.slope_width = width;
                state.slope_length = length;
            }
            PanelAction::ResetSlope => {
                let angle = self.defaults.slope_angle;
                let (width, length) = (self.defaults.slope_width, self.defaults.slope_length);
                self.apply(PanelAction::SetSlopeAngle(angle), registry, world);
                self.apply(PanelAction::SetSlopeSize { width, length }, registry, world);
                return;
            }
            PanelAction::SetLightVisible(slot, visible) => {
                let (id, field) = match slot {
                    LightSlot::Point => (objects.point_light, &mut state.point_light),
                    LightSlot::Ambient => (objects.ambient_light, &mut state.ambient_light),
                    LightSlot::Sun => (objects.sun_light, &mut state.sun_light),
                };
                objects.scene.light_mut(id).visible = visible;
                *field = visible;
            }
            PanelAction::SetHelperVisible(slot, visible) => {
                let (id, field) = match slot {
                    HelperSlot::Axes => (objects.axes_helper, &mut state.axes_helper),
                    HelperSlot::PointLight => (objects.point_light_helper, &mut state.point_light_helper),
                    HelperSlot::SunLight => (objects.sun_light_helper, &mut state.sun_light_helper),
                    HelperSlot::Grid => (objects.grid_helper, &mut state.grid_helper),
                };
                objects.scene.helper_mut(id).visible = visible;
                *field = visible;
            }
            PanelAction::SetAutoRotate(on) => {
                objects.controls.auto_rotate = on;
                state.auto_rotate = on;
            }
            PanelAction::SetFollowCube(on) => {
                registry.camera_settings.follow_cube = on;
                state.follow_cube = on;
            }
            PanelAction::SetVerticalAngle(degrees) => {
                registry.camera_settings.set_vertical_angle(degrees);
                state.vertical_angle = registry.camera_settings.vertical_angle();
            }
            PanelAction::ResetAll => {
                if let Err(e) = self.store.remove(STATE_KEY) {
                    tracing::warn!(error = %e, "could not clear panel state");
                }
                for action in self.defaults.to_actions() {
                    self.apply(action, registry, world);
                }
                self.dirty = false;
                tracing::info!("panel reset to defaults");
                return;
            }
        }

        if action.is_value_change() {
            self.dirty = true;
        }
    }

    /// Save the state if anything changed since the last save.
    pub fn flush(&mut self) {
        if !self.dirty {
            return;
        }
        match serde_json::to_string(&self.state) {
            Ok(json) => match self.store.set(STATE_KEY, &json) {
                Ok(()) => self.dirty = false,
                Err(e) => tracing::warn!(error = %e, "could not save panel state"),
            },
            Err(e) => tracing::warn!(error = %e, "could not serialize panel state"),
        }
    }

    /// Run one egui pass: draw the window, apply what the user changed.
    pub fn run(
        &mut self,
        egui_ctx: &Context,
        raw_input: egui::RawInput,
        registry: &mut ObjectRegistry,
        world: &mut PhysicsWorld,
        now_seconds: f64,
    ) -> egui::FullOutput {
        self.fps.tick(now_seconds);

        let mut actions = Vec::new();
        let output = egui_ctx.run(raw_input, |ctx| {
            draw_debug_window(ctx, &self.state, self.fps.fps(), &mut actions);
        });

        for action in actions {
            self.apply(action, registry, world);
        }
        // sliders save once the drag ends
        if !egui_ctx.is_using_pointer() {
            self.flush();
        }
        output
    }
}

fn slider(ui: &mut egui::Ui, value: f32, range: std::ops::RangeInclusive<f32>, step: f64, text: &str) -> Option<f32> {
    let mut v = value;
    let changed = ui.add(egui::Slider::new(&mut v, range).step_by(step).text(text)).changed();
    changed.then_some(v)
}

fn checkbox(ui: &mut egui::Ui, value: bool, text: &str) -> Option<bool> {
    let mut v = value;
    ui.checkbox(&mut v, text).changed().then_some(v)
}

fn draw_debug_window(ctx: &Context, state: &PanelState, fps: f32, actions: &mut Vec<PanelAction>) {
    use PanelAction::*;

    egui::Window::new("Debug GUI")
        .default_pos([8.0, 8.0])
        .default_width(260.0)
        .default_open(false)
        .show(ctx, |ui| {
            ui.collapsing("Physics", |ui| {
                if let Some(g) = slider(ui, state.gravity, -20.0..=0.0, 0.1, "gravity") {
                    actions.push(SetGravity(g));
                }
                if ui.button("Reset Physics Cube").clicked() {
                    actions.push(ResetCube);
                }
            });

            ui.collapsing("Physics Cube", |ui| {
                if let Some(on) = checkbox(ui, state.cube_wireframe, "wireframe") {
                    actions.push(SetCubeWireframe(on));
                }
                ui.horizontal(|ui| {
                    let mut color = state.cube_color;
                    if ui.color_edit_button_rgb(&mut color).changed() {
                        actions.push(SetCubeColor(color));
                    }
                    ui.label("color");
                });
                if let Some(m) = slider(ui, state.cube_metalness, 0.0..=1.0, 0.1, "metalness") {
                    actions.push(SetCubeMetalness(m));
                }
                if let Some(r) = slider(ui, state.cube_roughness, 0.0..=1.0, 0.1, "roughness") {
                    actions.push(SetCubeRoughness(r));
                }
            });

            ui.collapsing("Slope", |ui| {
                let half_pi = std::f32::consts::FRAC_PI_2;
                if let Some(a) = slider(ui, state.slope_angle, -half_pi..=half_pi, 0.1, "angle") {
                    actions.push(SetSlopeAngle(a));
                }
                if let Some(w) = slider(ui, state.slope_width, 1.0..=10.0, 0.1, "width") {
                    actions.push(SetSlopeSize { width: w, length: state.slope_length });
                }
                if let Some(l) = slider(ui, state.slope_length, 1.0..=12.0, 0.1, "length") {
                    actions.push(SetSlopeSize { width: state.slope_width, length: l });
                }
                if ui.button("Reset Slope").clicked() {
                    actions.push(ResetSlope);
                }
            });

            ui.collapsing("Lights", |ui| {
                for (slot, value, text) in [
                    (LightSlot::Point, state.point_light, "point light"),
                    (LightSlot::Ambient, state.ambient_light, "ambient light"),
                    (LightSlot::Sun, state.sun_light, "sun light"),
                ] {
                    if let Some(on) = checkbox(ui, value, text) {
                        actions.push(SetLightVisible(slot, on));
                    }
                }
            });

            ui.collapsing("Helpers", |ui| {
                for (slot, value, text) in [
                    (HelperSlot::Axes, state.axes_helper, "axes"),
                    (HelperSlot::PointLight, state.point_light_helper, "point light"),
                    (HelperSlot::SunLight, state.sun_light_helper, "sun light"),
                    (HelperSlot::Grid, state.grid_helper, "grid"),
                ] {
                    if let Some(on) = checkbox(ui, value, text) {
                        actions.push(SetHelperVisible(slot, on));
                    }
                }
            });

            ui.collapsing("Camera", |ui| {
                if let Some(on) = checkbox(ui, state.auto_rotate, "auto rotate") {
                    actions.push(SetAutoRotate(on));
                }
                if let Some(on) = checkbox(ui, state.follow_cube, "follow cube") {
                    actions.push(SetFollowCube(on));
                }
                if let Some(v) = slider(ui, state.vertical_angle, 0.0..=MAX_VERTICAL_ANGLE, 1.0, "vertical angle") {
                    actions.push(SetVerticalAngle(v));
                }
            });

            ui.collapsing("Stats", |ui| {
                ui.label(egui::RichText::new(format!("FPS: {fps:.0}")).small());
            });

            ui.separator();
            if ui.button("RESET").clicked() {
                actions.push(ResetAll);
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Simulation;
    use crate::model::CameraSettings;
    use crate::setup::{build_physics_objects, build_scene_objects};
    use crate::store::MemoryStore;
    use rapier3d::prelude::ColliderHandle;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Shares entries with the test so they survive the panel.
    #[derive(Clone, Default)]
    struct SharedStore(Rc<RefCell<MemoryStore>>);

    impl KeyValueStore for SharedStore {
        fn get(&self, key: &str) -> Result<Option<String>, crate::error::StoreError> {
            self.0.borrow().get(key)
        }
        fn set(&mut self, key: &str, value: &str) -> Result<(), crate::error::StoreError> {
            self.0.borrow_mut().set(key, value)
        }
        fn remove(&mut self, key: &str) -> Result<(), crate::error::StoreError> {
            self.0.borrow_mut().remove(key)
        }
    }

    fn demo(store: SharedStore) -> (ObjectRegistry, PhysicsWorld, DebugPanel) {
        let config = DemoConfig::default();
        let mut world = PhysicsWorld::new(config.physics.gravity_y);
        let physics = build_physics_objects(&mut world, &config);
        let mut registry = ObjectRegistry {
            scene: build_scene_objects(&config, 800, 600),
            physics,
            camera_settings: CameraSettings::from_config(&config.follow),
        };
        let panel = DebugPanel::attach(&config, Box::new(store), &mut registry, &mut world);
        (registry, world, panel)
    }

    fn slope_half_extents(registry: &ObjectRegistry, world: &PhysicsWorld) -> Vec3 {
        let handle: ColliderHandle = registry.physics.slope_collider.unwrap();
        let cuboid = world.collider(handle).unwrap().shape().as_cuboid().unwrap();
        Vec3::new(cuboid.half_extents.x, cuboid.half_extents.y, cuboid.half_extents.z)
    }

    #[test]
    fn gravity_slider_sets_world_gravity() {
        let (mut registry, mut world, mut panel) = demo(SharedStore::default());
        panel.dispatch(PanelAction::SetGravity(-3.5), &mut registry, &mut world);
        assert_eq!(world.gravity(), Vec3::new(0.0, -3.5, 0.0));
        assert_eq!(panel.state().gravity, -3.5);
    }

    #[test]
    fn reset_cube_teleports_and_stops_it() {
        let (mut registry, mut world, mut panel) = demo(SharedStore::default());
        for _ in 0..40 {
            world.step();
        }
        let cube = registry.physics.physics_cube_body;
        assert!(world.body_state(cube).unwrap().translation.y < 8.0);

        panel.dispatch(PanelAction::ResetCube, &mut registry, &mut world);
        let state = world.body_state(cube).unwrap();
        assert_eq!(state.translation, Vec3::new(0.0, 8.0, 0.0));
        assert_eq!(state.linvel, Vec3::ZERO);
        assert!(world.body(cube).unwrap().angvel().norm() == 0.0);
    }

    #[test]
    fn slope_angle_moves_mesh_and_body_together() {
        let (mut registry, mut world, mut panel) = demo(SharedStore::default());
        panel.dispatch(PanelAction::SetSlopeAngle(-0.4), &mut registry, &mut world);

        let expected = Quat::from_rotation_z(-0.4);
        let mesh = registry.scene.scene.mesh(registry.scene.slope);
        assert!(mesh.orientation.abs_diff_eq(expected, 1e-6));
        let body = world.body_state(registry.physics.slope_body).unwrap();
        assert!(body.rotation.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn slope_resize_replaces_the_collider() {
        let (mut registry, mut world, mut panel) = demo(SharedStore::default());
        let colliders = world.collider_count();
        let old = registry.physics.slope_collider;

        panel.dispatch(PanelAction::SetSlopeSize { width: 8.0, length: 3.0 }, &mut registry, &mut world);

        assert_eq!(world.collider_count(), colliders);
        assert_ne!(registry.physics.slope_collider, old);
        assert!(world.collider(old.unwrap()).is_none());
        assert!(slope_half_extents(&registry, &world).abs_diff_eq(Vec3::new(4.0, 0.25, 1.5), 1e-6));
        assert_eq!(registry.scene.scene.mesh(registry.scene.slope).scale, Vec3::new(2.0, 1.0, 0.5));
    }

    #[test]
    fn visibility_toggles_reach_the_scene() {
        let (mut registry, mut world, mut panel) = demo(SharedStore::default());
        panel.dispatch(PanelAction::SetLightVisible(LightSlot::Sun, false), &mut registry, &mut world);
        panel.dispatch(PanelAction::SetHelperVisible(HelperSlot::Axes, true), &mut registry, &mut world);

        let objects = &registry.scene;
        assert!(!objects.scene.light(objects.sun_light).visible);
        assert!(objects.scene.light(objects.point_light).visible);
        assert!(objects.scene.helper(objects.axes_helper).visible);
    }

    #[test]
    fn vertical_angle_is_clamped_in_state() {
        let (mut registry, mut world, mut panel) = demo(SharedStore::default());
        panel.dispatch(PanelAction::SetVerticalAngle(120.0), &mut registry, &mut world);
        assert_eq!(registry.camera_settings.vertical_angle(), MAX_VERTICAL_ANGLE);
        assert_eq!(panel.state().vertical_angle, MAX_VERTICAL_ANGLE);
    }

    #[test]
    fn out_of_range_configured_angle_matches_live_setting() {
        let mut config = DemoConfig::default();
        config.follow.vertical_angle_deg = 120.0;
        assert_eq!(PanelState::from_config(&config).vertical_angle, MAX_VERTICAL_ANGLE);

        let mut world = PhysicsWorld::new(config.physics.gravity_y);
        let physics = build_physics_objects(&mut world, &config);
        let mut registry = ObjectRegistry {
            scene: build_scene_objects(&config, 800, 600),
            physics,
            camera_settings: CameraSettings::from_config(&config.follow),
        };
        let mut panel = DebugPanel::attach(&config, Box::new(SharedStore::default()), &mut registry, &mut world);
        panel.dispatch(PanelAction::SetVerticalAngle(20.0), &mut registry, &mut world);
        panel.dispatch(PanelAction::ResetAll, &mut registry, &mut world);

        assert_eq!(panel.state(), &PanelState::from_config(&config));
        assert_eq!(panel.state().vertical_angle, registry.camera_settings.vertical_angle());
    }

    #[test]
    fn state_survives_a_new_panel() {
        let store = SharedStore::default();
        {
            let (mut registry, mut world, mut panel) = demo(store.clone());
            panel.dispatch(PanelAction::SetGravity(-12.0), &mut registry, &mut world);
            panel.dispatch(PanelAction::SetFollowCube(true), &mut registry, &mut world);
            panel.dispatch(PanelAction::SetSlopeSize { width: 6.0, length: 10.0 }, &mut registry, &mut world);
        }
        assert!(store.get(STATE_KEY).unwrap().is_some());

        let (registry, world, panel) = demo(store);
        assert_eq!(panel.state().gravity, -12.0);
        assert_eq!(world.gravity().y, -12.0);
        assert!(registry.camera_settings.follow_cube);
        assert!(slope_half_extents(&registry, &world).abs_diff_eq(Vec3::new(3.0, 0.25, 5.0), 1e-6));
    }

    #[test]
    fn reset_cube_alone_writes_nothing() {
        let store = SharedStore::default();
        let (mut registry, mut world, mut panel) = demo(store.clone());
        panel.dispatch(PanelAction::ResetCube, &mut registry, &mut world);
        assert_eq!(store.get(STATE_KEY).unwrap(), None);
    }

    #[test]
    fn reset_all_clears_storage_and_restores_defaults() {
        let store = SharedStore::default();
        let (mut registry, mut world, mut panel) = demo(store.clone());
        panel.dispatch(PanelAction::SetGravity(-1.0), &mut registry, &mut world);
        panel.dispatch(PanelAction::SetAutoRotate(true), &mut registry, &mut world);
        assert!(store.get(STATE_KEY).unwrap().is_some());

        panel.dispatch(PanelAction::ResetAll, &mut registry, &mut world);
        assert_eq!(store.get(STATE_KEY).unwrap(), None);
        assert_eq!(panel.state(), &PanelState::default());
        assert!(!registry.scene.controls.auto_rotate);
        assert!((world.gravity().y - -9.81).abs() < 1e-6);
    }

    #[test]
    fn corrupt_state_is_ignored() {
        let mut store = SharedStore::default();
        store.set(STATE_KEY, "{ not json").unwrap();
        let (_registry, world, panel) = demo(store);
        assert_eq!(panel.state(), &PanelState::default());
        assert!((world.gravity().y - -9.81).abs() < 1e-6);
    }

    #[test]
    fn partial_state_keeps_defaults() {
        let mut store = SharedStore::default();
        store.set(STATE_KEY, r#"{"gravity": -5.0}"#).unwrap();
        let (_registry, _world, panel) = demo(store);
        assert_eq!(panel.state().gravity, -5.0);
        assert_eq!(panel.state().slope_width, SLOPE_SIZE.x);
    }

    #[test]
    fn fps_counter_averages_over_half_a_second() {
        let mut fps = FpsCounter::default();
        assert_eq!(fps.fps(), 0.0);
        for i in 0..=40 {
            fps.tick(i as f64 / 60.0);
        }
        assert!((fps.fps() - 60.0).abs() < 0.1, "fps = {}", fps.fps());
    }
}
