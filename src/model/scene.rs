use glam::{Quat, Vec3};

/// Index of a mesh inside a [`SceneGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LightId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HelperId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    /// Axis-aligned box centred on the origin.
    Box { width: f32, height: f32, depth: f32 },
    /// XZ plane centred on the origin, normal +Y.
    Plane { width: f32, depth: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub color: [f32; 3],
    pub metalness: f32,
    pub roughness: f32,
    pub wireframe: bool,
    pub opacity: f32,
    pub emissive: [f32; 3],
    pub emissive_intensity: f32,
    pub double_sided: bool,
}

impl Material {
    pub fn standard(color: [f32; 3], metalness: f32, roughness: f32) -> Self {
        Self {
            color,
            metalness,
            roughness,
            wireframe: false,
            opacity: 1.0,
            emissive: [0.0; 3],
            emissive_intensity: 0.0,
            double_sided: false,
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderMesh {
    pub name: &'static str,
    pub geometry: Geometry,
    pub material: Material,
    pub position: Vec3,
    pub orientation: Quat,
    pub scale: Vec3,
    pub visible: bool,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl RenderMesh {
    pub fn new(name: &'static str, geometry: Geometry, material: Material) -> Self {
        Self {
            name,
            geometry,
            material,
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            scale: Vec3::ONE,
            visible: true,
            cast_shadow: false,
            receive_shadow: false,
        }
    }

    pub fn model_matrix(&self) -> glam::Mat4 {
        glam::Mat4::from_scale_rotation_translation(self.scale, self.orientation, self.position)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LightKind {
    Ambient,
    Point { position: Vec3, range: f32 },
    Directional { position: Vec3, target: Vec3 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub color: [f32; 3],
    pub intensity: f32,
    pub visible: bool,
}

impl Light {
    /// Color premultiplied by intensity, zero when hidden.
    pub fn radiance(&self) -> [f32; 3] {
        if !self.visible {
            return [0.0; 3];
        }
        self.color.map(|c| c * self.intensity)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HelperKind {
    Axes { size: f32 },
    /// Marks a point light; follows the light's position.
    PointLight { light: LightId, size: f32 },
    /// Marks a directional light; draws a square at its position and a line to its target.
    DirectionalLight { light: LightId, size: f32 },
    Grid { size: f32, divisions: u32, center_color: [f32; 3], grid_color: [f32; 3], y: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Helper {
    pub kind: HelperKind,
    pub color: [f32; 3],
    pub visible: bool,
}

/// Everything the renderer draws, apart from the camera.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    meshes: Vec<RenderMesh>,
    lights: Vec<Light>,
    helpers: Vec<Helper>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_mesh(&mut self, mesh: RenderMesh) -> MeshId {
        self.meshes.push(mesh);
        MeshId(self.meshes.len() - 1)
    }

    pub fn add_light(&mut self, light: Light) -> LightId {
        self.lights.push(light);
        LightId(self.lights.len() - 1)
    }

    pub fn add_helper(&mut self, helper: Helper) -> HelperId {
        self.helpers.push(helper);
        HelperId(self.helpers.len() - 1)
    }

    pub fn mesh(&self, id: MeshId) -> &RenderMesh {
        &self.meshes[id.0]
    }

    pub fn mesh_mut(&mut self, id: MeshId) -> &mut RenderMesh {
        &mut self.meshes[id.0]
    }

    pub fn light(&self, id: LightId) -> &Light {
        &self.lights[id.0]
    }

    pub fn light_mut(&mut self, id: LightId) -> &mut Light {
        &mut self.lights[id.0]
    }

    pub fn helper(&self, id: HelperId) -> &Helper {
        &self.helpers[id.0]
    }

    pub fn helper_mut(&mut self, id: HelperId) -> &mut Helper {
        &mut self.helpers[id.0]
    }

    pub fn meshes(&self) -> &[RenderMesh] {
        &self.meshes
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn helpers(&self) -> &[Helper] {
        &self.helpers
    }
}

/// `#rrggbb` to linear-ish floats in 0..1.
pub fn hex_color(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_index_in_insertion_order() {
        let mut scene = SceneGraph::new();
        let a = scene.add_mesh(RenderMesh::new(
            "a",
            Geometry::Box { width: 1.0, height: 1.0, depth: 1.0 },
            Material::standard([1.0; 3], 0.0, 1.0),
        ));
        let b = scene.add_mesh(RenderMesh::new(
            "b",
            Geometry::Plane { width: 2.0, depth: 2.0 },
            Material::standard([0.5; 3], 0.0, 1.0),
        ));
        assert_eq!(scene.mesh(a).name, "a");
        assert_eq!(scene.mesh(b).name, "b");

        scene.mesh_mut(b).position = Vec3::Y;
        assert_eq!(scene.meshes()[1].position, Vec3::Y);
    }

    #[test]
    fn hidden_light_has_no_radiance() {
        let mut light = Light { kind: LightKind::Ambient, color: [1.0, 0.5, 0.0], intensity: 0.4, visible: true };
        assert_eq!(light.radiance(), [0.4, 0.2, 0.0]);
        light.visible = false;
        assert_eq!(light.radiance(), [0.0; 3]);
    }

    #[test]
    fn hex_color_splits_channels() {
        assert_eq!(hex_color(0xff0000), [1.0, 0.0, 0.0]);
        assert_eq!(hex_color(0x000000), [0.0, 0.0, 0.0]);
    }
}
