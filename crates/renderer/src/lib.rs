//! Renderer: one wgpu context that draws a single non-indexed mesh.
//! Geometry and textures are uploaded once and live until exit.
//! wgpu = 26.x, winit = 0.30.x

use std::num::NonZeroU64;
use std::sync::Arc;

use anyhow::{Context, Result, ensure};
use asset::mesh::{MeshBuffer, VertexLayout};
use bytemuck::{Pod, Zeroable};
use corelib::{FrameParams, ViewMode};
use wgpu::{
    Backends, BindGroup, BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingResource,
    BindingType, BlendState, Buffer, BufferBindingType, BufferUsages, ColorTargetState,
    ColorWrites, CommandEncoderDescriptor, CompositeAlphaMode, DepthBiasState, DepthStencilState,
    Device, DeviceDescriptor, Extent3d, Features, FragmentState, Instance, InstanceDescriptor,
    Limits, LoadOp, Operations, PipelineLayout, PipelineLayoutDescriptor, PowerPreference,
    PresentMode, PrimitiveTopology, Queue, RenderPassColorAttachment, RenderPassDescriptor,
    RenderPipeline, RenderPipelineDescriptor, ShaderModule, ShaderModuleDescriptor, ShaderSource,
    ShaderStages, StoreOp, Surface, SurfaceConfiguration, SurfaceError, TextureDescriptor,
    TextureDimension, TextureFormat, TextureUsages, TextureView, TextureViewDescriptor,
    VertexAttribute, VertexBufferLayout, VertexState, VertexStepMode, util::DeviceExt,
};
use winit::{dpi::PhysicalSize, window::Window};

pub mod material;

pub use material::Material;

/// Uniform block shared by every shader (16-byte aligned).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct SceneUniform {
    model: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    normal_matrix: [[f32; 4]; 4],
    object_color: [f32; 4],
    light_color: [f32; 4],
    light_position: [f32; 4],
    camera_position: [f32; 4],
    /// x = shading mode
    params: [u32; 4],
}

impl SceneUniform {
    fn from_frame(frame: &FrameParams) -> Self {
        Self {
            model: frame.model.to_cols_array_2d(),
            view: frame.view.to_cols_array_2d(),
            projection: frame.projection.to_cols_array_2d(),
            normal_matrix: frame.normal_matrix.to_cols_array_2d(),
            object_color: frame.object_color.extend(1.0).to_array(),
            light_color: frame.light_color.extend(1.0).to_array(),
            light_position: frame.light_position.extend(1.0).to_array(),
            camera_position: frame.camera_position.extend(1.0).to_array(),
            params: [frame.shading.index(), 0, 0, 0],
        }
    }
}

const POS_COLOR_ATTRS: [VertexAttribute; 2] = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
const POS_NORMAL_UV_ATTRS: [VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

/// GPU vertex layout matching an interleaved [`VertexLayout`].
pub fn vertex_buffer_layout(layout: VertexLayout) -> VertexBufferLayout<'static> {
    let attributes: &'static [VertexAttribute] = match layout {
        // Both are two vec3 fields; the shader decides what the second means.
        VertexLayout::PositionNormal | VertexLayout::PositionColor => &POS_COLOR_ATTRS,
        VertexLayout::PositionNormalTexcoord => &POS_NORMAL_UV_ATTRS,
    };
    VertexBufferLayout {
        array_stride: (layout.stride() * std::mem::size_of::<f32>()) as u64,
        step_mode: VertexStepMode::Vertex,
        attributes,
    }
}

const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.2,
    g: 0.3,
    b: 0.3,
    a: 1.0,
};

/// Vertex buffer plus the number of vertices it holds.
struct GpuMesh {
    buffer: Buffer,
    vertex_count: u32,
}

impl GpuMesh {
    fn upload(device: &Device, label: &str, mesh: &MeshBuffer) -> Result<Self> {
        let vertex_count = u32::try_from(mesh.vertex_count())
            .with_context(|| format!("{label} has too many vertices"))?;
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(mesh.data()),
            usage: BufferUsages::VERTEX,
        });
        Ok(Self {
            buffer,
            vertex_count,
        })
    }
}

pub struct GpuState {
    // Surface
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,

    // Device/queue
    device: Device,
    queue: Queue,

    // Pipelines & geometry
    fill_pipeline: RenderPipeline,
    line_pipeline: RenderPipeline,
    triangles: GpuMesh,
    edges: GpuMesh,

    // Uniforms + material bindings
    scene_buf: Buffer,
    scene_bg: BindGroup,

    // Depth
    depth_view: TextureView,

    // Size cache
    width: u32,
    height: u32,
}

impl GpuState {
    /// Create GPU state bound to an Arc<Window> and upload `mesh`.
    pub async fn new(
        window: Arc<Window>,
        backends: Backends,
        mesh: &MeshBuffer,
        material: &Material,
    ) -> Result<Self> {
        ensure!(!mesh.is_empty(), "Refusing to upload an empty mesh");
        material.check_layout(mesh.layout())?;

        let PhysicalSize { width, height } = window.inner_size();
        let width = width.max(1);
        let height = height.max(1);

        // Instance & surface
        let instance = Instance::new(&InstanceDescriptor {
            backends,
            ..Default::default()
        });
        let surface: Surface<'static> = instance
            .create_surface(window.clone())
            .context("create_surface failed")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No suitable GPU adapter")?;
        log::info!("Using adapter: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(&DeviceDescriptor {
                label: Some("objview Device"),
                required_features: Features::empty(),
                required_limits: Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                ..Default::default()
            })
            .await
            .context("request_device failed")?;

        // Surface format (prefer sRGB)
        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .context("Surface reports no formats")?;

        let surface_config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: PresentMode::AutoVsync,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let depth_view = create_depth_view(&device, &surface_config);

        // ==== Shader ====
        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some(material.name()),
            source: ShaderSource::Wgsl(material.shader_source().into()),
        });

        // ==== Bindings: scene uniform + optional texture/sampler ====
        let uniform_size = NonZeroU64::new(std::mem::size_of::<SceneUniform>() as u64)
            .context("Scene uniform has zero size")?;
        let mut entries = vec![BindGroupLayoutEntry {
            binding: 0,
            visibility: ShaderStages::VERTEX_FRAGMENT,
            ty: BindingType::Buffer {
                ty: BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: Some(uniform_size),
            },
            count: None,
        }];
        entries.extend(material.layout_entries());
        let scene_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Scene BGL"),
            entries: &entries,
        });

        let scene_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Scene UBO"),
            contents: bytemuck::bytes_of(&SceneUniform::zeroed()),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });

        let texture = material.upload(&device, &queue);
        let mut bindings = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: scene_buf.as_entire_binding(),
        }];
        if let Some((view, sampler)) = &texture {
            bindings.push(wgpu::BindGroupEntry {
                binding: 1,
                resource: BindingResource::TextureView(view),
            });
            bindings.push(wgpu::BindGroupEntry {
                binding: 2,
                resource: BindingResource::Sampler(sampler),
            });
        }
        let scene_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene BG"),
            layout: &scene_bgl,
            entries: &bindings,
        });

        // ==== Pipelines ====
        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("Scene PipelineLayout"),
            bind_group_layouts: &[&scene_bgl],
            push_constant_ranges: &[],
        });
        let vertex_layout = vertex_buffer_layout(mesh.layout());
        let fill_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            vertex_layout.clone(),
            surface_format,
            PrimitiveTopology::TriangleList,
        );
        let line_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            vertex_layout,
            surface_format,
            PrimitiveTopology::LineList,
        );

        // ==== Geometry ====
        let triangles = GpuMesh::upload(&device, "Mesh VB", mesh)?;
        let edges = GpuMesh::upload(&device, "Wireframe VB", &mesh.wireframe())?;
        log::info!(
            "Uploaded {} vertices ({} wireframe) with material {}",
            triangles.vertex_count,
            edges.vertex_count,
            material.name()
        );

        Ok(Self {
            surface,
            surface_config,
            device,
            queue,
            fill_pipeline,
            line_pipeline,
            triangles,
            edges,
            scene_buf,
            scene_bg,
            depth_view,
            width,
            height,
        })
    }

    /// Resize: reconfigure surface & recreate depth view.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.surface_config.width = self.width;
        self.surface_config.height = self.height;
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_view = create_depth_view(&self.device, &self.surface_config);
    }

    /// Render one frame: upload uniforms, clear, draw faces or edges.
    pub fn render(&mut self, frame: &FrameParams) -> Result<(), SurfaceError> {
        let uniform = SceneUniform::from_frame(frame);
        self.queue
            .write_buffer(&self.scene_buf, 0, bytemuck::bytes_of(&uniform));

        let output = self.surface.get_current_texture()?;
        let view = output.texture.create_view(&Default::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("MainEncoder"),
            });

        let (pipeline, mesh) = match frame.view_mode {
            ViewMode::Faces => (&self.fill_pipeline, &self.triangles),
            ViewMode::Wireframe => (&self.line_pipeline, &self.edges),
        };

        {
            let mut rpass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("MainPass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(CLEAR_COLOR),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            rpass.set_pipeline(pipeline);
            rpass.set_bind_group(0, &self.scene_bg, &[]);
            rpass.set_vertex_buffer(0, mesh.buffer.slice(..));
            rpass.draw(0..mesh.vertex_count, 0..1);
        }

        self.queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }

    pub fn is_surface_lost(err: &SurfaceError) -> bool {
        matches!(err, SurfaceError::Lost | SurfaceError::Outdated)
    }

    pub fn recreate_surface(&mut self) {
        self.resize(self.width, self.height);
    }
}

fn create_pipeline(
    device: &Device,
    layout: &PipelineLayout,
    shader: &ShaderModule,
    vertex_layout: VertexBufferLayout<'static>,
    format: TextureFormat,
    topology: PrimitiveTopology,
) -> RenderPipeline {
    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some(match topology {
            PrimitiveTopology::LineList => "Wireframe Pipeline",
            _ => "Mesh Pipeline",
        }),
        layout: Some(layout),
        vertex: VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[vertex_layout],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(ColorTargetState {
                format,
                blend: Some(BlendState::REPLACE),
                write_mask: ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        // OBJ winding is not reliable, so nothing is culled.
        primitive: wgpu::PrimitiveState {
            topology,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

/// Create a depth texture view matching the surface config.
fn create_depth_view(device: &Device, sc: &SurfaceConfiguration) -> TextureView {
    let tex = device.create_texture(&TextureDescriptor {
        label: Some("DepthTex"),
        size: Extent3d {
            width: sc.width.max(1),
            height: sc.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    tex.create_view(&TextureViewDescriptor::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use corelib::SceneState;

    #[test]
    fn uniform_block_is_std140_friendly() {
        assert_eq!(std::mem::size_of::<SceneUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<SceneUniform>(), 4 * 64 + 5 * 16);
    }

    #[test]
    fn vertex_layout_strides_match_buffers() {
        assert_eq!(vertex_buffer_layout(VertexLayout::PositionColor).array_stride, 24);
        assert_eq!(vertex_buffer_layout(VertexLayout::PositionNormal).array_stride, 24);
        let textured = vertex_buffer_layout(VertexLayout::PositionNormalTexcoord);
        assert_eq!(textured.array_stride, 32);
        assert_eq!(textured.attributes.len(), 3);
        assert_eq!(textured.attributes[2].offset, 24);
    }

    #[test]
    fn uniform_carries_shading_index() {
        let frame = SceneState::new(800, 600)
            .with_shading(corelib::Shading::Lit)
            .frame();
        let u = SceneUniform::from_frame(&frame);
        assert_eq!(u.params[0], 1);
        assert_eq!(u.camera_position, [0.0, 0.0, 5.0, 1.0]);
    }
}
