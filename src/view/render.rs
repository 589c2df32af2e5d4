use std::num::NonZeroU64;
use std::sync::Arc;

use bytemuck::NoUninit;
use wgpu::util::DeviceExt;

use crate::app::EguiOverlay;
use crate::config::RendererConfig;
use crate::controller::RenderTarget;
use crate::model::{Camera, Geometry, LightKind, RenderMesh, SceneGraph};
use crate::view::gpu_init::GpuContext;
use crate::view::mesh::{helper_lines, LineVertex, Mesh, MeshBuffer, Vertex};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Drawing-buffer size for a displayed (CSS) size, device pixel ratio capped at `max_pixel_ratio`.
pub fn physical_size(css_width: f64, css_height: f64, device_pixel_ratio: f64, max_pixel_ratio: f64) -> (u32, u32) {
    let ratio = device_pixel_ratio.min(max_pixel_ratio).max(0.0);
    ((css_width * ratio).floor() as u32, (css_height * ratio).floor() as u32)
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, NoUninit)]
pub struct FrameUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    pub ambient: [f32; 4],
    /// xyz position, w range
    pub point_pos: [f32; 4],
    pub point_color: [f32; 4],
    /// xyz direction towards the sun
    pub sun_dir: [f32; 4],
    pub sun_color: [f32; 4],
}

impl FrameUniform {
    pub fn new(scene: &SceneGraph, camera: &Camera) -> Self {
        let mut uniform = Self {
            view_proj: camera.view_proj().to_cols_array_2d(),
            camera_pos: camera.eye.extend(1.0).to_array(),
            ambient: [0.0; 4],
            point_pos: [0.0, 0.0, 0.0, 1.0],
            point_color: [0.0; 4],
            sun_dir: [0.0, 1.0, 0.0, 0.0],
            sun_color: [0.0; 4],
        };

        let (mut have_point, mut have_sun) = (false, false);
        for light in scene.lights() {
            let [r, g, b] = light.radiance();
            match light.kind {
                LightKind::Ambient => {
                    for (acc, c) in uniform.ambient.iter_mut().zip([r, g, b]) {
                        *acc += c;
                    }
                }
                // one of each is all the shader handles
                LightKind::Point { position, range } if !have_point => {
                    have_point = true;
                    uniform.point_pos = position.extend(range.max(f32::EPSILON)).to_array();
                    uniform.point_color = [r, g, b, 0.0];
                }
                LightKind::Directional { position, target } if !have_sun => {
                    have_sun = true;
                    uniform.sun_dir = (position - target).normalize_or_zero().extend(0.0).to_array();
                    uniform.sun_color = [r, g, b, 0.0];
                }
                _ => tracing::trace!(?light.kind, "extra light ignored"),
            }
        }
        uniform
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, NoUninit)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    /// rgb, opacity
    pub color: [f32; 4],
    pub emissive: [f32; 4],
    /// metalness, roughness
    pub params: [f32; 4],
}

impl ObjectUniform {
    pub fn new(mesh: &RenderMesh) -> Self {
        let model = mesh.model_matrix();
        let m = &mesh.material;
        let [r, g, b] = m.color;
        let emissive = m.emissive.map(|c| c * m.emissive_intensity);
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: model.inverse().transpose().to_cols_array_2d(),
            color: [r, g, b, m.opacity],
            emissive: [emissive[0], emissive[1], emissive[2], 0.0],
            params: [m.metalness, m.roughness, 0.0, 0.0],
        }
    }
}

const OBJECT_UNIFORM_SIZE: u64 = std::mem::size_of::<ObjectUniform>() as u64;

pub fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    depth_texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn uniform_layout_entry(visibility: wgpu::ShaderStages, dynamic: Option<u64>) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: dynamic.is_some(),
            min_binding_size: dynamic.and_then(NonZeroU64::new),
        },
        count: None,
    }
}

struct MeshPipelineDesc<'a> {
    label: &'a str,
    polygon_mode: wgpu::PolygonMode,
    cull_mode: Option<wgpu::Face>,
    blend: wgpu::BlendState,
    depth_write: bool,
}

fn create_mesh_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    desc: MeshPipelineDesc,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[
                    wgpu::VertexAttribute { offset: 0, shader_location: 0, format: wgpu::VertexFormat::Float32x3 },
                    wgpu::VertexAttribute { offset: 12, shader_location: 1, format: wgpu::VertexFormat::Float32x3 },
                ],
            }],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState { format, blend: Some(desc.blend), write_mask: wgpu::ColorWrites::ALL })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: desc.cull_mode,
            polygon_mode: desc.polygon_mode,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: desc.depth_write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
        multiview: None,
        cache: None,
    })
}

fn create_line_pipeline(
    device: &wgpu::Device,
    frame_layout: &wgpu::BindGroupLayout,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("line_shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/line.wgsl").into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("line_pipeline_layout"),
        bind_group_layouts: &[frame_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("line_pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<LineVertex>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[
                    wgpu::VertexAttribute { offset: 0, shader_location: 0, format: wgpu::VertexFormat::Float32x3 },
                    wgpu::VertexAttribute { offset: 12, shader_location: 1, format: wgpu::VertexFormat::Float32x3 },
                ],
            }],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::LineList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
        multiview: None,
        cache: None,
    })
}

/// Per-mesh uniforms in one buffer, addressed with dynamic offsets.
struct ObjectUniforms {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    stride: u64,
    capacity: usize,
}

impl ObjectUniforms {
    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, capacity: usize) -> Self {
        let align = device.limits().min_uniform_buffer_offset_alignment as u64;
        let stride = OBJECT_UNIFORM_SIZE.div_ceil(align) * align;
        let capacity = capacity.max(1);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("object_uniforms"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("object_bind_group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(OBJECT_UNIFORM_SIZE),
                }),
            }],
        });
        Self { buffer, bind_group, stride, capacity }
    }

    fn offset(&self, index: usize) -> u32 {
        (self.stride * index as u64) as u32
    }
}

/// Tessellated egui output waiting for the next rendered frame.
struct EguiFrame {
    primitives: Vec<egui::ClippedPrimitive>,
    textures_delta: egui::TexturesDelta,
    pixels_per_point: f32,
}

/// wgpu implementation of [`RenderTarget`]: lit meshes, helper lines, egui on top.
pub struct GpuRenderer {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    display_size: Box<dyn Fn() -> (u32, u32)>,
    clear_color: wgpu::Color,

    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    objects: ObjectUniforms,

    opaque_pipeline: wgpu::RenderPipeline,
    wireframe_pipeline: Option<wgpu::RenderPipeline>,
    transparent_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,

    /// GPU buffers by mesh index, rebuilt when the geometry changes.
    mesh_buffers: Vec<Option<(Geometry, MeshBuffer)>>,

    egui_renderer: egui_wgpu::Renderer,
    egui_frame: Option<EguiFrame>,
}

impl GpuRenderer {
    /// `display_size` reports the size the surface is shown at, in physical pixels.
    pub fn new(gpu: GpuContext, config: &RendererConfig, display_size: impl Fn() -> (u32, u32) + 'static) -> Self {
        let GpuContext { device, queue, surface, format, config: surface_config } = gpu;

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame_uniform"),
            size: std::mem::size_of::<FrameUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_bind_group_layout"),
            entries: &[uniform_layout_entry(wgpu::ShaderStages::VERTEX_FRAGMENT, None)],
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bind_group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry { binding: 0, resource: frame_buffer.as_entire_binding() }],
        });
        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object_bind_group_layout"),
            entries: &[uniform_layout_entry(wgpu::ShaderStages::VERTEX_FRAGMENT, Some(OBJECT_UNIFORM_SIZE))],
        });
        let objects = ObjectUniforms::new(&device, &object_layout, 8);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mesh_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mesh_pipeline_layout"),
            bind_group_layouts: &[&frame_layout, &object_layout],
            push_constant_ranges: &[],
        });

        let opaque_pipeline = create_mesh_pipeline(&device, &layout, &shader, format, MeshPipelineDesc {
            label: "opaque_pipeline",
            polygon_mode: wgpu::PolygonMode::Fill,
            cull_mode: Some(wgpu::Face::Back),
            blend: wgpu::BlendState::REPLACE,
            depth_write: true,
        });
        let wireframe_pipeline = if device.features().contains(wgpu::Features::POLYGON_MODE_LINE) {
            Some(create_mesh_pipeline(&device, &layout, &shader, format, MeshPipelineDesc {
                label: "wireframe_pipeline",
                polygon_mode: wgpu::PolygonMode::Line,
                cull_mode: None,
                blend: wgpu::BlendState::REPLACE,
                depth_write: true,
            }))
        } else {
            tracing::info!("wireframe not supported here, wireframe materials draw filled");
            None
        };
        let transparent_pipeline = create_mesh_pipeline(&device, &layout, &shader, format, MeshPipelineDesc {
            label: "transparent_pipeline",
            polygon_mode: wgpu::PolygonMode::Fill,
            cull_mode: None,
            blend: wgpu::BlendState::ALPHA_BLENDING,
            depth_write: false,
        });
        let line_pipeline = create_line_pipeline(&device, &frame_layout, format);

        let depth_view = create_depth_texture(&device, surface_config.width, surface_config.height);
        let egui_renderer = egui_wgpu::Renderer::new(&device, format, egui_wgpu::RendererOptions::default());
        let [r, g, b, a] = config.clear_color;

        Self {
            device,
            queue,
            surface,
            config: surface_config,
            depth_view,
            display_size: Box::new(display_size),
            clear_color: wgpu::Color { r, g, b, a },
            frame_buffer,
            frame_bind_group,
            object_layout,
            objects,
            opaque_pipeline,
            wireframe_pipeline,
            transparent_pipeline,
            line_pipeline,
            mesh_buffers: Vec::new(),
            egui_renderer,
            egui_frame: None,
        }
    }

    pub fn wireframe_supported(&self) -> bool {
        self.wireframe_pipeline.is_some()
    }

    /// Upload per-mesh uniforms and any vertex buffers that are missing or stale.
    fn prepare_meshes(&mut self, scene: &SceneGraph) {
        let meshes = scene.meshes();
        if meshes.len() > self.objects.capacity {
            self.objects = ObjectUniforms::new(&self.device, &self.object_layout, meshes.len().next_power_of_two());
        }
        self.mesh_buffers.resize_with(meshes.len(), || None);

        for (i, mesh) in meshes.iter().enumerate() {
            let uniform = ObjectUniform::new(mesh);
            self.queue.write_buffer(&self.objects.buffer, self.objects.offset(i) as u64, bytemuck::bytes_of(&uniform));

            let stale = !matches!(&self.mesh_buffers[i], Some((g, _)) if *g == mesh.geometry);
            if stale {
                let buffer = Mesh::for_geometry(&mesh.geometry).upload(&self.device);
                self.mesh_buffers[i] = Some((mesh.geometry, buffer));
            }
        }
    }

    fn draw_mesh(&self, rp: &mut wgpu::RenderPass<'_>, pipeline: &wgpu::RenderPipeline, index: usize) {
        let Some((_, buffer)) = &self.mesh_buffers[index] else {
            return;
        };
        rp.set_pipeline(pipeline);
        rp.set_bind_group(1, &self.objects.bind_group, &[self.objects.offset(index)]);
        rp.set_vertex_buffer(0, buffer.vertex_buffer.slice(..));
        rp.set_index_buffer(buffer.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        rp.draw_indexed(0..buffer.index_count, 0, 0..1);
    }

    fn draw_egui(&mut self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let Some(frame) = self.egui_frame.take() else {
            return;
        };
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: frame.pixels_per_point,
        };

        for (id, image_delta) in &frame.textures_delta.set {
            self.egui_renderer.update_texture(&self.device, &self.queue, *id, image_delta);
        }
        self.egui_renderer
            .update_buffers(&self.device, &self.queue, encoder, &frame.primitives, &screen_descriptor);

        {
            let egui_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations { load: wgpu::LoadOp::Load, store: wgpu::StoreOp::Store },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.egui_renderer
                .render(&mut egui_pass.forget_lifetime(), &frame.primitives, &screen_descriptor);
        }

        for id in &frame.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

impl EguiOverlay for GpuRenderer {
    /// Queue egui output for the next `render`. Texture updates from a skipped frame are kept.
    fn set_egui_output(&mut self, ctx: &egui::Context, output: egui::FullOutput) {
        let primitives = ctx.tessellate(output.shapes, output.pixels_per_point);
        let mut textures_delta = output.textures_delta;
        if let Some(pending) = self.egui_frame.take() {
            let mut merged = pending.textures_delta;
            merged.append(textures_delta);
            textures_delta = merged;
        }
        self.egui_frame = Some(EguiFrame { primitives, textures_delta, pixels_per_point: output.pixels_per_point });
    }
}

impl RenderTarget for GpuRenderer {
    fn display_size(&self) -> (u32, u32) {
        (self.display_size)()
    }

    fn buffer_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    fn resize_buffer(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_texture(&self.device, self.config.width, self.config.height);
    }

    fn render(&mut self, scene: &SceneGraph, camera: &Camera) {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::debug!("surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(e) => {
                tracing::warn!(error = ?e, "could not acquire frame, skipping");
                return;
            }
        };

        self.queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&FrameUniform::new(scene, camera)));
        self.prepare_meshes(scene);

        let lines = helper_lines(scene);
        let line_buffer = (!lines.is_empty()).then(|| {
            self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("helper_lines"),
                contents: bytemuck::cast_slice(&lines),
                usage: wgpu::BufferUsages::VERTEX,
            })
        });

        // transparent meshes last, far to near
        let meshes = scene.meshes();
        let (mut transparent, opaque): (Vec<usize>, Vec<usize>) =
            (0..meshes.len()).filter(|&i| meshes[i].visible).partition(|&i| meshes[i].material.is_transparent());
        transparent.sort_by(|&a, &b| {
            let da = meshes[a].position.distance_squared(camera.eye);
            let db = meshes[b].position.distance_squared(camera.eye);
            db.total_cmp(&da)
        });

        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("encoder") });

        {
            let mut rp = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations { load: wgpu::LoadOp::Clear(self.clear_color), store: wgpu::StoreOp::Store },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations { load: wgpu::LoadOp::Clear(1.0), store: wgpu::StoreOp::Store }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rp.set_bind_group(0, &self.frame_bind_group, &[]);

            for i in opaque {
                let pipeline = match (&self.wireframe_pipeline, meshes[i].material.wireframe) {
                    (Some(wireframe), true) => wireframe,
                    _ => &self.opaque_pipeline,
                };
                self.draw_mesh(&mut rp, pipeline, i);
            }

            if let Some(buffer) = &line_buffer {
                rp.set_pipeline(&self.line_pipeline);
                rp.set_vertex_buffer(0, buffer.slice(..));
                rp.draw(0..lines.len() as u32, 0..1);
            }

            for i in transparent {
                self.draw_mesh(&mut rp, &self.transparent_pipeline, i);
            }
        }

        self.draw_egui(&mut encoder, &view);

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DemoConfig;
    use crate::setup::build_scene_objects;
    use glam::Vec3;

    #[test]
    fn pixel_ratio_is_capped() {
        assert_eq!(physical_size(800.0, 600.0, 3.0, 2.0), (1600, 1200));
        assert_eq!(physical_size(800.0, 600.0, 1.5, 2.0), (1200, 900));
        assert_eq!(physical_size(333.0, 100.0, 1.5, 2.0), (499, 150));
    }

    #[test]
    fn frame_uniform_collects_lights() {
        let mut objects = build_scene_objects(&DemoConfig::default(), 800, 600);
        let uniform = FrameUniform::new(&objects.scene, &objects.camera);
        assert!((uniform.ambient[0] - 0.4).abs() < 1e-6);
        assert_eq!(&uniform.point_pos[..3], &[-2.0, 2.0, 2.0]);
        assert_eq!(uniform.point_color[0], 20.0);
        let sun = Vec3::from_slice(&uniform.sun_dir[..3]);
        assert!((sun - Vec3::new(10.0, 15.0, 8.0).normalize()).length() < 1e-6);

        objects.scene.light_mut(objects.point_light).visible = false;
        let uniform = FrameUniform::new(&objects.scene, &objects.camera);
        assert_eq!(&uniform.point_color[..3], &[0.0; 3]);
    }

    #[test]
    fn object_uniform_carries_material() {
        let objects = build_scene_objects(&DemoConfig::default(), 800, 600);
        let ground = ObjectUniform::new(objects.scene.mesh(objects.ground));
        assert_eq!(ground.color[3], 0.4);
        assert!((ground.emissive[1] - 0.5019608 * 0.2).abs() < 1e-5);

        let cube = ObjectUniform::new(objects.scene.mesh(objects.physics_cube));
        assert_eq!(cube.params[..2], [0.5, 0.7]);
        assert_eq!(cube.model[3][1], 8.0);
    }

    #[test]
    fn uniform_sizes_are_16_byte_multiples() {
        assert_eq!(std::mem::size_of::<FrameUniform>() % 16, 0);
        assert_eq!(OBJECT_UNIFORM_SIZE % 16, 0);
    }
}
