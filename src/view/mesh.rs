use bytemuck::NoUninit;
use glam::Vec3;
use wgpu::util::DeviceExt;

use crate::model::{Geometry, HelperKind, LightKind, SceneGraph};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, NoUninit)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, NoUninit)]
pub struct LineVertex {
    pub pos: [f32; 3],
    pub color: [f32; 3],
}

pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn for_geometry(geometry: &Geometry) -> Self {
        match *geometry {
            Geometry::Box { width, height, depth } => box_mesh(width, height, depth),
            Geometry::Plane { width, depth } => plane_mesh(width, depth),
        }
    }

    /// Append one quad; corners go counter-clockwise seen from `normal`.
    fn push_quad(&mut self, corners: [Vec3; 4], normal: Vec3) {
        let base = self.vertices.len() as u32;
        for c in corners {
            self.vertices.push(Vertex { pos: c.to_array(), normal: normal.to_array() });
        }
        self.indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    pub fn upload(&self, device: &wgpu::Device) -> MeshBuffer {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        MeshBuffer { vertex_buffer, index_buffer, index_count: self.indices.len() as u32 }
    }
}

/// Box centred on the origin, 24 vertices so every face has flat normals.
pub fn box_mesh(width: f32, height: f32, depth: f32) -> Mesh {
    let h = Vec3::new(width, height, depth) * 0.5;
    let mut mesh = Mesh::default();

    // for each axis, the face along +axis then -axis
    for (n, u, v) in [(Vec3::X, Vec3::NEG_Z, Vec3::Y), (Vec3::Y, Vec3::X, Vec3::NEG_Z), (Vec3::Z, Vec3::X, Vec3::Y)] {
        for sign in [1.0f32, -1.0] {
            let normal = n * sign;
            let (u, v) = (u * sign, v);
            let center = normal * h;
            let du = u * h;
            let dv = v * h;
            mesh.push_quad([center - du - dv, center + du - dv, center + du + dv, center - du + dv], normal);
        }
    }
    mesh
}

/// Flat plane in XZ facing +Y.
pub fn plane_mesh(width: f32, depth: f32) -> Mesh {
    let (hw, hd) = (width * 0.5, depth * 0.5);
    let mut mesh = Mesh::default();
    mesh.push_quad(
        [
            Vec3::new(-hw, 0.0, hd),
            Vec3::new(hw, 0.0, hd),
            Vec3::new(hw, 0.0, -hd),
            Vec3::new(-hw, 0.0, -hd),
        ],
        Vec3::Y,
    );
    mesh
}

const CIRCLE_SEGMENTS: usize = 16;

fn push_line(out: &mut Vec<LineVertex>, a: Vec3, b: Vec3, color: [f32; 3]) {
    out.push(LineVertex { pos: a.to_array(), color });
    out.push(LineVertex { pos: b.to_array(), color });
}

fn push_circle(out: &mut Vec<LineVertex>, center: Vec3, u: Vec3, v: Vec3, radius: f32, color: [f32; 3]) {
    let point = |i: usize| {
        let a = i as f32 / CIRCLE_SEGMENTS as f32 * std::f32::consts::TAU;
        center + (u * a.cos() + v * a.sin()) * radius
    };
    for i in 0..CIRCLE_SEGMENTS {
        push_line(out, point(i), point(i + 1), color);
    }
}

/// Line-list vertices for every visible helper.
pub fn helper_lines(scene: &SceneGraph) -> Vec<LineVertex> {
    let mut out = Vec::new();
    for helper in scene.helpers().iter().filter(|h| h.visible) {
        match &helper.kind {
            HelperKind::Axes { size } => {
                push_line(&mut out, Vec3::ZERO, Vec3::X * *size, [1.0, 0.0, 0.0]);
                push_line(&mut out, Vec3::ZERO, Vec3::Y * *size, [0.0, 1.0, 0.0]);
                push_line(&mut out, Vec3::ZERO, Vec3::Z * *size, [0.0, 0.0, 1.0]);
            }
            HelperKind::PointLight { light, size } => {
                if let LightKind::Point { position, .. } = scene.light(*light).kind {
                    push_circle(&mut out, position, Vec3::X, Vec3::Y, *size, helper.color);
                    push_circle(&mut out, position, Vec3::Y, Vec3::Z, *size, helper.color);
                    push_circle(&mut out, position, Vec3::Z, Vec3::X, *size, helper.color);
                }
            }
            HelperKind::DirectionalLight { light, size } => {
                if let LightKind::Directional { position, target } = scene.light(*light).kind {
                    let dir = (target - position).normalize_or_zero();
                    let (u, v) = dir.any_orthonormal_pair();
                    let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)]
                        .map(|(a, b)| position + (u * a + v * b) * *size);
                    for i in 0..4 {
                        push_line(&mut out, corners[i], corners[(i + 1) % 4], helper.color);
                    }
                    push_line(&mut out, position, target, helper.color);
                }
            }
            HelperKind::Grid { size, divisions, center_color, grid_color, y } => {
                let half = size * 0.5;
                let step = size / (*divisions).max(1) as f32;
                for i in 0..=*divisions {
                    let k = -half + i as f32 * step;
                    let color = if 2 * i == *divisions { *center_color } else { *grid_color };
                    push_line(&mut out, Vec3::new(-half, *y, k), Vec3::new(half, *y, k), color);
                    push_line(&mut out, Vec3::new(k, *y, -half), Vec3::new(k, *y, half), color);
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DemoConfig;
    use crate::setup::build_scene_objects;

    #[test]
    fn box_faces_wind_outward() {
        let mesh = box_mesh(4.0, 0.5, 6.0);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);

        for tri in mesh.indices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|i| Vec3::from_array(mesh.vertices[tri[i] as usize].pos));
            let n = Vec3::from_array(mesh.vertices[tri[0] as usize].normal);
            assert!((b - a).cross(c - a).dot(n) > 0.0);
            // every vertex lies on the face its normal points out of
            assert!((a.dot(n).abs() - (n.abs() * Vec3::new(2.0, 0.25, 3.0)).element_sum()).abs() < 1e-6);
        }
    }

    #[test]
    fn plane_faces_up() {
        let mesh = plane_mesh(10.0, 10.0);
        let [a, b, c] = [0, 1, 2].map(|i| Vec3::from_array(mesh.vertices[mesh.indices[i] as usize].pos));
        assert!((b - a).cross(c - a).y > 0.0);
    }

    #[test]
    fn only_visible_helpers_produce_lines() {
        let mut objects = build_scene_objects(&DemoConfig::default(), 800, 600);
        // grid only: 21 lines each way
        assert_eq!(helper_lines(&objects.scene).len(), 21 * 2 * 2);

        objects.scene.helper_mut(objects.grid_helper).visible = false;
        assert!(helper_lines(&objects.scene).is_empty());

        objects.scene.helper_mut(objects.axes_helper).visible = true;
        objects.scene.helper_mut(objects.sun_light_helper).visible = true;
        assert_eq!(helper_lines(&objects.scene).len(), 3 * 2 + 5 * 2);
    }

    #[test]
    fn point_light_helper_surrounds_the_light() {
        let mut objects = build_scene_objects(&DemoConfig::default(), 800, 600);
        objects.scene.helper_mut(objects.grid_helper).visible = false;
        objects.scene.helper_mut(objects.point_light_helper).visible = true;

        let lines = helper_lines(&objects.scene);
        assert_eq!(lines.len(), 3 * CIRCLE_SEGMENTS * 2);
        let center = Vec3::new(-2.0, 2.0, 2.0);
        assert!(lines.iter().all(|v| (Vec3::from_array(v.pos).distance(center) - 0.25).abs() < 1e-5));
    }
}
