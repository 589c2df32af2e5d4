use glam::{Quat, Vec3};
use rapier3d::na::UnitQuaternion;
use rapier3d::prelude::*;

/// Pose and velocity of one rigid body, in render-side math types.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub translation: Vec3,
    pub rotation: Quat,
    pub linvel: Vec3,
}

/// What the frame loop needs from a physics world.
pub trait Simulation {
    /// Advance by one fixed internal timestep.
    fn step(&mut self);

    fn body_state(&self, handle: RigidBodyHandle) -> Option<BodyState>;
}

/// Rapier world: every set and pipeline needed to step a scene.
pub struct PhysicsWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    bodies: RigidBodySet,
    colliders: ColliderSet,
}

impl PhysicsWorld {
    pub fn new(gravity_y: f32) -> Self {
        Self {
            gravity: vector![0.0, gravity_y, 0.0],
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
        }
    }

    /// Fixed timestep used by [`Simulation::step`], in seconds.
    pub fn timestep(&self) -> f32 {
        self.integration_parameters.dt
    }

    pub fn gravity(&self) -> Vec3 {
        Vec3::new(self.gravity.x, self.gravity.y, self.gravity.z)
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = vector![gravity.x, gravity.y, gravity.z];
    }

    pub fn create_rigid_body(&mut self, body: impl Into<RigidBody>) -> RigidBodyHandle {
        self.bodies.insert(body)
    }

    pub fn create_collider(&mut self, collider: impl Into<Collider>, parent: RigidBodyHandle) -> ColliderHandle {
        self.colliders.insert_with_parent(collider, parent, &mut self.bodies)
    }

    /// Returns false when the collider does not exist; that is not an error.
    pub fn remove_collider(&mut self, handle: ColliderHandle) -> bool {
        self.colliders
            .remove(handle, &mut self.island_manager, &mut self.bodies, true)
            .is_some()
    }

    pub fn body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    pub fn collider(&self, handle: ColliderHandle) -> Option<&Collider> {
        self.colliders.get(handle)
    }

    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    pub fn set_translation(&mut self, handle: RigidBodyHandle, translation: Vec3, wake: bool) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_translation(vector![translation.x, translation.y, translation.z], wake);
        }
    }

    pub fn set_linvel(&mut self, handle: RigidBodyHandle, linvel: Vec3, wake: bool) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_linvel(vector![linvel.x, linvel.y, linvel.z], wake);
        }
    }

    pub fn set_angvel(&mut self, handle: RigidBodyHandle, angvel: Vec3, wake: bool) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_angvel(vector![angvel.x, angvel.y, angvel.z], wake);
        }
    }

    pub fn set_rotation(&mut self, handle: RigidBodyHandle, rotation: Quat, wake: bool) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_rotation(to_unit_quaternion(rotation), wake);
        }
    }
}

impl Simulation for PhysicsWorld {
    fn step(&mut self) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            &(),
            &(),
        );
    }

    fn body_state(&self, handle: RigidBodyHandle) -> Option<BodyState> {
        let body = self.bodies.get(handle)?;
        let t = body.translation();
        let r = body.rotation();
        let v = body.linvel();
        Some(BodyState {
            translation: Vec3::new(t.x, t.y, t.z),
            rotation: Quat::from_xyzw(r.i, r.j, r.k, r.w),
            linvel: Vec3::new(v.x, v.y, v.z),
        })
    }
}

pub fn to_unit_quaternion(q: Quat) -> UnitQuaternion<Real> {
    UnitQuaternion::from_quaternion(rapier3d::na::Quaternion::new(q.w, q.x, q.y, q.z))
}

/// Material shared by every collider in the scene.
#[derive(Debug, Clone, Copy)]
pub struct ColliderMaterial {
    pub restitution: f32,
    pub friction: f32,
}

/// Cuboid collider with the scene's restitution and friction.
pub fn cuboid(half_extents: Vec3, material: ColliderMaterial) -> Collider {
    ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
        .restitution(material.restitution)
        .friction(material.friction)
        .build()
}

/// Dynamic unit cube, dropped from `spawn`.
pub fn create_physics_cube(world: &mut PhysicsWorld, spawn: Vec3, material: ColliderMaterial) -> RigidBodyHandle {
    let body = RigidBodyBuilder::dynamic()
        .translation(vector![spawn.x, spawn.y, spawn.z])
        .build();
    let handle = world.create_rigid_body(body);
    world.create_collider(cuboid(Vec3::splat(0.5), material), handle);
    handle
}

/// Fixed slope body tilted `angle` radians about +Z.
pub fn create_slope_body(
    world: &mut PhysicsWorld,
    position: Vec3,
    angle: f32,
    half_extents: Vec3,
    material: ColliderMaterial,
) -> (RigidBodyHandle, ColliderHandle) {
    let body = RigidBodyBuilder::fixed()
        .translation(vector![position.x, position.y, position.z])
        .rotation(vector![0.0, 0.0, angle])
        .build();
    let handle = world.create_rigid_body(body);
    let collider = world.create_collider(cuboid(half_extents, material), handle);
    (handle, collider)
}

/// Fixed ground slab, much wider than the rendered plane.
pub fn create_ground_body(world: &mut PhysicsWorld, material: ColliderMaterial) -> RigidBodyHandle {
    let body = RigidBodyBuilder::fixed().translation(vector![0.0, 0.0, 0.0]).build();
    let handle = world.create_rigid_body(body);
    world.create_collider(cuboid(Vec3::new(50.0, 0.1, 50.0), material), handle);
    handle
}

/// Swap a body's cuboid collider for one with new half extents.
/// A stale or missing `old` handle is skipped.
pub fn replace_cuboid_collider(
    world: &mut PhysicsWorld,
    body: RigidBodyHandle,
    old: Option<ColliderHandle>,
    half_extents: Vec3,
    material: ColliderMaterial,
) -> ColliderHandle {
    if let Some(old) = old {
        if !world.remove_collider(old) {
            tracing::debug!(?old, "collider already gone, skipping removal");
        }
    }
    world.create_collider(cuboid(half_extents, material), body)
}
