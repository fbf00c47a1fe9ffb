// ABOUTME: Composer passes: the multisampled scene pass and fullscreen effect passes.
// ABOUTME: Effects are WGSL bodies appended to a shared frame shader, driven by Uniform handles.

use std::time::Duration;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::camera::{multiply, OrthographicCamera};
use crate::scene::{PlaneGeometry, Scene, Vertex};
use crate::uniforms::{Uniform, TIME};
use crate::RenderError;

const EFFECT_FRAME_SHADER: &str = include_str!("../../../shaders/effect_pass.wgsl");
const SCENE_SHADER: &str = include_str!("../../../shaders/scene.wgsl");

/// Effect parameters that fit in the frame shader's `params` vec4
pub const MAX_EFFECT_UNIFORMS: usize = 4;

pub const MSAA_SAMPLES: u32 = 4;

/// Per-frame GPU handles a pass records into
pub struct FrameContext<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub encoder: &'a mut wgpu::CommandEncoder,
    /// Output size in device pixels
    pub resolution: (u32, u32),
    /// Clock time since the previous rendered frame
    pub delta: Duration,
}

pub trait Pass {
    fn name(&self) -> &str;

    /// Named parameter handles this pass exposes to the registry
    fn uniforms(&self) -> Vec<(String, Uniform)> {
        Vec::new()
    }

    /// `input` is the previous pass output, `None` for the first pass
    fn render(
        &mut self,
        ctx: &mut FrameContext<'_>,
        input: Option<&wgpu::TextureView>,
        output: &wgpu::TextureView,
    );
}

/// How an effect's color combines with the pass input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendFunction {
    Skip,
    #[default]
    Normal,
    Add,
}

impl BlendFunction {
    fn shader_mode(self) -> u32 {
        match self {
            BlendFunction::Skip => 0,
            BlendFunction::Normal => 1,
            BlendFunction::Add => 2,
        }
    }
}

/// A fragment effect: a WGSL body defining `main_image` plus its float uniforms
#[derive(Debug, Clone)]
pub struct Effect {
    pub name: String,
    pub body: String,
    pub blend: BlendFunction,
    uniforms: Vec<(String, Uniform)>,
}

impl Effect {
    pub fn new(name: impl Into<String>, body: impl Into<String>, blend: BlendFunction) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
            blend,
            uniforms: Vec::new(),
        }
    }

    /// Uniforms are packed into `params` in the order they are added
    pub fn with_uniform(mut self, name: impl Into<String>, uniform: Uniform) -> Self {
        self.uniforms.push((name.into(), uniform));
        self
    }

    pub fn uniforms(&self) -> &[(String, Uniform)] {
        &self.uniforms
    }
}

/// `scaleFactor` of effect 0 is exposed as `e0ScaleFactor`
pub fn prefixed_uniform_name(effect_index: usize, name: &str) -> String {
    let mut chars = name.chars();
    let capitalized: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    format!("e{effect_index}{capitalized}")
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct EffectUniforms {
    pub resolution: [f32; 2],
    pub time: f32,
    pub blend_mode: u32,
    pub params: [f32; 4],
    /// Seconds since the previous frame
    pub delta: f32,
    pub _pad: [f32; 3],
}

/// CPU side of an effect pass's uniforms
#[derive(Debug, Clone)]
pub struct EffectUniformSet {
    time: Uniform,
    blend: BlendFunction,
    params: Vec<(String, Uniform)>,
}

impl EffectUniformSet {
    pub fn new(effect: &Effect, effect_index: usize) -> Result<Self, RenderError> {
        if effect.uniforms.len() > MAX_EFFECT_UNIFORMS {
            return Err(RenderError::TooManyUniforms {
                effect: effect.name.clone(),
                count: effect.uniforms.len(),
            });
        }
        let params = effect
            .uniforms
            .iter()
            .map(|(name, uniform)| (prefixed_uniform_name(effect_index, name), uniform.clone()))
            .collect();
        Ok(Self {
            time: Uniform::new(0.0),
            blend: effect.blend,
            params,
        })
    }

    pub fn time(&self) -> &Uniform {
        &self.time
    }

    /// `time` first, then the prefixed effect uniforms
    pub fn exposed(&self) -> Vec<(String, Uniform)> {
        std::iter::once((TIME.to_string(), self.time.clone()))
            .chain(self.params.iter().cloned())
            .collect()
    }

    pub fn pack(&self, resolution: (u32, u32), delta: Duration) -> EffectUniforms {
        let mut params = [0.0; 4];
        for (slot, (_, uniform)) in params.iter_mut().zip(&self.params) {
            *slot = uniform.get();
        }
        EffectUniforms {
            resolution: [resolution.0 as f32, resolution.1 as f32],
            time: self.time.get(),
            blend_mode: self.blend.shader_mode(),
            params,
            delta: delta.as_secs_f32(),
            _pad: [0.0; 3],
        }
    }
}

fn linear_sampler(device: &wgpu::Device, label: &str) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}

fn texture_bind_group_layout(device: &wgpu::Device, label: &str, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

fn texture_bind_group(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

#[allow(clippy::too_many_arguments)]
fn create_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    shader: &wgpu::ShaderModule,
    buffers: &[wgpu::VertexBufferLayout<'_>],
    format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
    sample_count: u32,
) -> wgpu::RenderPipeline {
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState {
            count: sample_count,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    })
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct MeshUniforms {
    mvp: [[f32; 4]; 4],
    params: [f32; 4],
}

/// The texture each mesh samples, indexed like `scene.meshes()`
fn mesh_textures<'v, V>(scene: &Scene, layer_views: &'v [V]) -> Vec<Option<&'v V>> {
    scene
        .meshes()
        .iter()
        .map(|mesh| {
            let view = layer_views.get(mesh.material.map);
            if view.is_none() {
                tracing::warn!(
                    "No texture {} for the {} mesh, skipping it",
                    mesh.material.map,
                    mesh.role.label()
                );
            }
            view
        })
        .collect()
}

struct MeshDraw {
    vertex_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    transparent: bool,
}

/// Draws the scene through the camera into a 4x multisampled target, resolved into the output
pub struct RenderPass {
    scene: Scene,
    camera: OrthographicCamera,
    opaque_pipeline: wgpu::RenderPipeline,
    transparent_pipeline: wgpu::RenderPipeline,
    index_buffer: wgpu::Buffer,
    /// One slot per scene mesh, `None` where the mesh has no texture
    draws: Vec<Option<MeshDraw>>,
    msaa_view: wgpu::TextureView,
}

impl RenderPass {
    /// `layer_views[i]` is the texture of every mesh whose material maps `i`
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: (u32, u32),
        scene: Scene,
        camera: OrthographicCamera,
        layer_views: &[&wgpu::TextureView],
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(SCENE_SHADER.into()),
        });
        let layout = texture_bind_group_layout(
            device,
            "Scene Bind Group Layout",
            wgpu::ShaderStages::VERTEX_FRAGMENT,
        );
        let opaque_pipeline = create_pipeline(
            device,
            "Scene Opaque Pipeline",
            &layout,
            &shader,
            &[Vertex::layout()],
            format,
            Some(wgpu::BlendState::REPLACE),
            MSAA_SAMPLES,
        );
        let transparent_pipeline = create_pipeline(
            device,
            "Scene Transparent Pipeline",
            &layout,
            &shader,
            &[Vertex::layout()],
            format,
            Some(wgpu::BlendState::ALPHA_BLENDING),
            MSAA_SAMPLES,
        );

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Plane Index Buffer"),
            contents: bytemuck::cast_slice(&PlaneGeometry::INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        let sampler = linear_sampler(device, "Layer Sampler");
        let view_projection = camera.view_projection();

        let mut draws = Vec::with_capacity(scene.meshes().len());
        for (mesh, view) in scene.meshes().iter().zip(mesh_textures(&scene, layer_views)) {
            let Some(view) = view else {
                draws.push(None);
                continue;
            };
            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Plane Vertex Buffer"),
                contents: bytemuck::cast_slice(&mesh.geometry.vertices()),
                usage: wgpu::BufferUsages::VERTEX,
            });
            // The camera never moves, so the matrices are baked once
            let uniforms = MeshUniforms {
                mvp: multiply(&view_projection, &mesh.model_matrix()),
                params: [mesh.material.opacity, 0.0, 0.0, 0.0],
            };
            let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Uniform Buffer"),
                contents: bytemuck::cast_slice(&[uniforms]),
                usage: wgpu::BufferUsages::UNIFORM,
            });
            let bind_group = texture_bind_group(
                device,
                "Mesh Bind Group",
                &layout,
                &uniform_buffer,
                view,
                &sampler,
            );
            draws.push(Some(MeshDraw {
                vertex_buffer,
                bind_group,
                transparent: mesh.material.transparent,
            }));
        }

        let msaa_view = create_msaa_view(device, format, size);

        Self {
            scene,
            camera,
            opaque_pipeline,
            transparent_pipeline,
            index_buffer,
            draws,
            msaa_view,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &OrthographicCamera {
        &self.camera
    }
}

fn create_msaa_view(device: &wgpu::Device, format: wgpu::TextureFormat, size: (u32, u32)) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Scene MSAA Texture"),
        size: wgpu::Extent3d {
            width: size.0.max(1),
            height: size.1.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: MSAA_SAMPLES,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

impl Pass for RenderPass {
    fn name(&self) -> &str {
        "RenderPass"
    }

    fn render(
        &mut self,
        ctx: &mut FrameContext<'_>,
        _input: Option<&wgpu::TextureView>,
        output: &wgpu::TextureView,
    ) {
        let mut pass = ctx.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.msaa_view,
                resolve_target: Some(output),
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Discard,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        for index in self.scene.draw_order() {
            let Some(Some(draw)) = self.draws.get(index) else {
                continue;
            };
            let pipeline = if draw.transparent {
                &self.transparent_pipeline
            } else {
                &self.opaque_pipeline
            };
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &draw.bind_group, &[]);
            pass.set_vertex_buffer(0, draw.vertex_buffer.slice(..));
            pass.draw_indexed(0..PlaneGeometry::INDICES.len() as u32, 0, 0..1);
        }
    }
}

/// Runs one effect over the previous pass output as a fullscreen triangle
pub struct EffectPass {
    name: String,
    uniforms: EffectUniformSet,
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    sampler: wgpu::Sampler,
}

impl EffectPass {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, effect: Effect) -> Result<Self, RenderError> {
        let uniforms = EffectUniformSet::new(&effect, 0)?;
        let source = format!("{EFFECT_FRAME_SHADER}\n{}", effect.body);
        let label = format!("{} Effect", effect.name);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        let layout = texture_bind_group_layout(device, "Effect Bind Group Layout", wgpu::ShaderStages::FRAGMENT);
        let pipeline = create_pipeline(device, &label, &layout, &shader, &[], format, None, 1);

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Effect Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniforms.pack((1, 1), Duration::ZERO)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        tracing::debug!("Built effect pass for {}", effect.name);
        Ok(Self {
            name: effect.name,
            uniforms,
            pipeline,
            layout,
            uniform_buffer,
            sampler: linear_sampler(device, "Effect Sampler"),
        })
    }
}

impl Pass for EffectPass {
    fn name(&self) -> &str {
        &self.name
    }

    fn uniforms(&self) -> Vec<(String, Uniform)> {
        self.uniforms.exposed()
    }

    fn render(
        &mut self,
        ctx: &mut FrameContext<'_>,
        input: Option<&wgpu::TextureView>,
        output: &wgpu::TextureView,
    ) {
        let Some(input) = input else {
            tracing::warn!("Effect pass {} has no input, skipping", self.name);
            return;
        };

        ctx.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::cast_slice(&[self.uniforms.pack(ctx.resolution, ctx.delta)]),
        );
        // The input alternates between the ping-pong targets
        let bind_group = texture_bind_group(
            ctx.device,
            "Effect Bind Group",
            &self.layout,
            &self.uniform_buffer,
            input,
            &self.sampler,
        );

        let mut pass = ctx.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Effect Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: output,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.draw(0..3, 0..1); // Fullscreen triangle
    }
}
