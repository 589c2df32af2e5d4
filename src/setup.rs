//! One-time construction of the scene, the physics bodies and the registry.

use glam::{Quat, Vec3};

use crate::config::DemoConfig;
use crate::controller::physics::{self, ColliderMaterial, PhysicsWorld};
use crate::controller::{FrameLoop, OrbitControls, RenderTarget};
use crate::model::scene::hex_color;
use crate::model::{
    Camera, CameraSettings, Geometry, Helper, HelperKind, Light, LightKind, Material, RenderMesh, SceneGraph,
};
use crate::registry::{ObjectRegistry, PhysicsObjects, SceneObjects};
use crate::store::KeyValueStore;
use crate::ui::DebugPanel;

pub const CUBE_SIZE: f32 = 1.0;
/// Width (X), thickness (Y) and length (Z) of the slope at scale 1.
pub const SLOPE_SIZE: Vec3 = Vec3::new(4.0, 0.5, 6.0);
pub const SLOPE_POSITION: Vec3 = Vec3::new(0.0, 2.0, 0.0);
pub const GROUND_SIZE: f32 = 10.0;

pub fn build_scene_objects(config: &DemoConfig, width: u32, height: u32) -> SceneObjects {
    let mut scene = SceneGraph::new();

    // meshes
    let mut cube = RenderMesh::new(
        "physics_cube",
        Geometry::Box { width: CUBE_SIZE, height: CUBE_SIZE, depth: CUBE_SIZE },
        Material::standard(hex_color(0xff3030), 0.5, 0.7),
    );
    cube.cast_shadow = true;
    cube.position = Vec3::from_array(config.physics.cube_spawn);
    let physics_cube = scene.add_mesh(cube);

    let mut slope = RenderMesh::new(
        "slope",
        Geometry::Box { width: SLOPE_SIZE.x, height: SLOPE_SIZE.y, depth: SLOPE_SIZE.z },
        Material::standard(hex_color(0x606060), 0.2, 0.8),
    );
    slope.position = SLOPE_POSITION;
    slope.orientation = Quat::from_rotation_z(config.physics.slope_angle);
    slope.cast_shadow = true;
    slope.receive_shadow = true;
    let slope = scene.add_mesh(slope);

    let mut ground_material = Material::standard(hex_color(0x808080), 0.0, 1.0);
    ground_material.emissive = hex_color(0x008080);
    ground_material.emissive_intensity = 0.2;
    ground_material.double_sided = true;
    ground_material.opacity = 0.4;
    let mut ground = RenderMesh::new("ground", Geometry::Plane { width: GROUND_SIZE, depth: GROUND_SIZE }, ground_material);
    ground.receive_shadow = true;
    let ground = scene.add_mesh(ground);

    // lights
    let ambient_light = scene.add_light(Light {
        kind: LightKind::Ambient,
        color: [1.0; 3],
        intensity: 0.4,
        visible: true,
    });
    let point_light = scene.add_light(Light {
        kind: LightKind::Point { position: Vec3::new(-2.0, 2.0, 2.0), range: 100.0 },
        color: [1.0; 3],
        intensity: 20.0,
        visible: true,
    });
    let sun_light = scene.add_light(Light {
        kind: LightKind::Directional { position: Vec3::new(10.0, 15.0, 8.0), target: Vec3::ZERO },
        color: hex_color(0xfff8e0),
        intensity: 1.5,
        visible: true,
    });

    // helpers
    let axes_helper = scene.add_helper(Helper { kind: HelperKind::Axes { size: 4.0 }, color: [1.0; 3], visible: false });
    let point_light_helper = scene.add_helper(Helper {
        kind: HelperKind::PointLight { light: point_light, size: 0.25 },
        color: hex_color(0xffa500),
        visible: false,
    });
    let sun_light_helper = scene.add_helper(Helper {
        kind: HelperKind::DirectionalLight { light: sun_light, size: 2.0 },
        color: hex_color(0xffd700),
        visible: false,
    });
    let grid_helper = scene.add_helper(Helper {
        kind: HelperKind::Grid {
            size: 20.0,
            divisions: 20,
            center_color: hex_color(0x008080),
            grid_color: hex_color(0xa9a9a9),
            y: -0.01,
        },
        color: [1.0; 3],
        visible: true,
    });

    let camera = Camera::from_config(&config.camera, width, height);
    let controls = OrbitControls::from_config(&config.camera);

    SceneObjects {
        scene,
        camera,
        controls,
        physics_cube,
        slope,
        ground,
        ambient_light,
        point_light,
        sun_light,
        axes_helper,
        point_light_helper,
        sun_light_helper,
        grid_helper,
    }
}

pub fn collider_material(config: &DemoConfig) -> ColliderMaterial {
    ColliderMaterial { restitution: config.physics.restitution, friction: config.physics.friction }
}

pub fn build_physics_objects(world: &mut PhysicsWorld, config: &DemoConfig) -> PhysicsObjects {
    let material = collider_material(config);
    let physics_cube_body =
        physics::create_physics_cube(world, Vec3::from_array(config.physics.cube_spawn), material);
    let (slope_body, slope_collider) = physics::create_slope_body(
        world,
        SLOPE_POSITION,
        config.physics.slope_angle,
        SLOPE_SIZE * 0.5,
        material,
    );
    let ground_body = physics::create_ground_body(world, material);

    PhysicsObjects { physics_cube_body, slope_body, slope_collider: Some(slope_collider), ground_body }
}

/// Bodies go into `world`; everything else lands in the returned registry.
pub fn build_registry(config: &DemoConfig, world: &mut PhysicsWorld, width: u32, height: u32) -> ObjectRegistry {
    let physics = build_physics_objects(world, config);
    let scene = build_scene_objects(config, width, height);
    ObjectRegistry { scene, physics, camera_settings: CameraSettings::from_config(&config.follow) }
}

/// Build the whole demo. The panel comes back separately so the registry never
/// exists without one of its fields.
pub fn build_demo<T: RenderTarget>(
    config: &DemoConfig,
    target: T,
    store: Box<dyn KeyValueStore>,
) -> (FrameLoop<PhysicsWorld, T>, DebugPanel) {
    let (width, height) = target.buffer_size();
    let mut world = PhysicsWorld::new(config.physics.gravity_y);
    let registry = build_registry(config, &mut world, width, height);

    let mut frame_loop = FrameLoop::new(registry, world, target);
    let panel = {
        let (registry, world) = frame_loop.parts_mut();
        DebugPanel::attach(config, store, registry, world)
    };
    tracing::info!(
        meshes = frame_loop.registry().scene.scene.meshes().len(),
        colliders = frame_loop.simulation().collider_count(),
        "demo built"
    );
    (frame_loop, panel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Simulation;

    #[test]
    fn scene_matches_physics_at_startup() {
        let config = DemoConfig::default();
        let mut world = PhysicsWorld::new(config.physics.gravity_y);
        let physics = build_physics_objects(&mut world, &config);
        let objects = build_scene_objects(&config, 800, 600);

        let cube = world.body_state(physics.physics_cube_body).unwrap();
        assert_eq!(objects.scene.mesh(objects.physics_cube).position, cube.translation);

        let slope = world.body_state(physics.slope_body).unwrap();
        let mesh = objects.scene.mesh(objects.slope);
        assert_eq!(mesh.position, slope.translation);
        assert!(mesh.orientation.abs_diff_eq(slope.rotation, 1e-5));
        assert_eq!(world.collider_count(), 3);
    }

    #[test]
    fn helpers_start_hidden_except_grid() {
        let objects = build_scene_objects(&DemoConfig::default(), 800, 600);
        assert!(!objects.scene.helper(objects.axes_helper).visible);
        assert!(!objects.scene.helper(objects.point_light_helper).visible);
        assert!(!objects.scene.helper(objects.sun_light_helper).visible);
        assert!(objects.scene.helper(objects.grid_helper).visible);
    }

    #[test]
    fn cube_mesh_is_first() {
        let objects = build_scene_objects(&DemoConfig::default(), 800, 600);
        assert_eq!(objects.physics_cube.0, 0);
        assert!(objects.scene.mesh(objects.ground).material.is_transparent());
    }
}
