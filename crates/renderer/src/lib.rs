//! Renderer: wgpu init + depth + the 3x3 board of X/O meshes.
//! wgpu = 26.x, winit = 0.30.x

use std::num::NonZeroU64;
use std::sync::Arc;

use anyhow::{Context, Result};
use asset::MeshData;
use corelib::camera::Camera;
use wgpu::{
    BindGroup, BindGroupLayout, BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingType,
    BlendState, Buffer, BufferBindingType, BufferUsages, ColorTargetState, ColorWrites,
    CommandEncoderDescriptor, DepthBiasState, DepthStencilState, Device, DeviceDescriptor,
    ErrorFilter, Extent3d, Features, FragmentState, Instance, InstanceDescriptor, Limits, LoadOp,
    Operations, PipelineLayoutDescriptor, PowerPreference, PresentMode, Queue,
    RenderPassColorAttachment, RenderPassDescriptor, RenderPipeline, RenderPipelineDescriptor,
    ShaderModuleDescriptor, ShaderSource, ShaderStages, StoreOp, Surface, SurfaceConfiguration,
    SurfaceError, TextureDescriptor, TextureDimension, TextureFormat, TextureUsages, TextureView,
    TextureViewDescriptor, VertexState, util::DeviceExt,
};
use winit::{dpi::PhysicalSize, window::Window};

pub mod draw;
pub mod mesh;
pub mod uniforms;

use draw::{DrawCommand, MAX_DRAWS, pack_cell_uniforms, plan_board_draws};
use mesh::{GpuMesh, MeshTable, POSITION_LAYOUT};
use uniforms::{CellUniform, FrameUniform, align_to};

const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

/// Background gray.
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.5,
    g: 0.5,
    b: 0.5,
    a: 1.0,
};

/// What the renderer needs besides a window.
pub struct RendererConfig {
    pub backends: wgpu::Backends,
    pub x_mesh: MeshData,
    pub o_mesh: MeshData,
    pub show_tiles: bool,
}

pub struct GpuState {
    // Surface
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,

    // Device/queue
    device: Device,
    queue: Queue,

    // Pipeline & geometry
    pipeline: RenderPipeline,
    meshes: MeshTable<GpuMesh>,
    commands: Vec<DrawCommand>,

    // Uniforms
    frame_bg: BindGroup,
    frame_buf: Buffer,
    cell_bg: BindGroup,
    cell_buf: Buffer,
    cell_stride: u64,

    // Depth
    depth_view: TextureView,

    // Size cache
    width: u32,
    height: u32,
}

impl GpuState {
    /// Create GPU state bound to an Arc<Window> and upload the board meshes.
    pub async fn new(window: Arc<Window>, config: RendererConfig) -> Result<Self> {
        let PhysicalSize { width, height } = window.inner_size();
        let width = width.max(1);
        let height = height.max(1);

        // Instance & surface
        let instance = Instance::new(&InstanceDescriptor {
            backends: config.backends,
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
        let info = adapter.get_info();
        log::info!("Adapter: {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&DeviceDescriptor {
                label: Some("Board Device"),
                required_features: Features::empty(),
                required_limits: Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: Default::default(),
                trace: Default::default(),
            })
            .await
            .context("request_device failed")?;

        device.on_uncaptured_error(Box::new(|err: wgpu::Error| {
            log::error!("Uncaptured wgpu error: {err}");
        }));

        // Surface format: clear color is authored in display space, so avoid sRGB.
        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .context("Surface reports no supported formats")?;

        let surface_config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: PresentMode::AutoVsync,
            alpha_mode: choose_alpha_mode(&caps.alpha_modes),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);
        log::info!("Surface configured: {:?} {}x{}", surface_format, width, height);

        let depth_view = create_depth_view(&device, &surface_config);

        // ==== Shaders ====
        // Compile errors are reported, not recovered from.
        device.push_error_scope(ErrorFilter::Validation);
        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("Board WGSL"),
            source: ShaderSource::Wgsl(include_str!("shaders/board.wgsl").into()),
        });
        if let Some(err) = device.pop_error_scope().await {
            log::error!("Shader compilation failed: {err}");
        }

        // ==== Frame uniforms (proj/view) ====
        let frame_bgl = uniform_layout(
            &device,
            "Frame BGL",
            ShaderStages::VERTEX,
            false,
            std::mem::size_of::<FrameUniform>() as u64,
        );
        let frame_init = FrameUniform::new(corelib::Mat4::IDENTITY, corelib::Mat4::IDENTITY);
        let frame_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame UBO"),
            contents: bytemuck::bytes_of(&frame_init),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });
        let frame_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame BG"),
            layout: &frame_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buf.as_entire_binding(),
            }],
        });

        // ==== Per-draw uniforms (model/color), one aligned slot per draw ====
        let cell_size = std::mem::size_of::<CellUniform>() as u64;
        let cell_stride = align_to(
            cell_size,
            u64::from(device.limits().min_uniform_buffer_offset_alignment),
        );
        let cell_bgl = uniform_layout(
            &device,
            "Cell BGL",
            ShaderStages::VERTEX | ShaderStages::FRAGMENT,
            true,
            cell_size,
        );
        let cell_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Cell UBO"),
            size: cell_stride * MAX_DRAWS as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let cell_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Cell BG"),
            layout: &cell_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &cell_buf,
                    offset: 0,
                    size: NonZeroU64::new(cell_size),
                }),
            }],
        });

        // ==== Pipeline ====
        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("Board PipelineLayout"),
            bind_group_layouts: &[&frame_bgl, &cell_bgl],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("Board Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[POSITION_LAYOUT],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(ColorTargetState {
                    format: surface_format,
                    blend: Some(BlendState::REPLACE),
                    write_mask: ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            // OBJ winding is not normalised, so draw both faces.
            primitive: wgpu::PrimitiveState {
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
        });

        // ==== Geometry ====
        let cpu_meshes = MeshTable {
            tile: MeshData::unit_quad(),
            x: config.x_mesh,
            o: config.o_mesh,
        };
        let meshes = cpu_meshes.map(|slot, mesh| {
            GpuMesh::upload(&device, &format!("{slot:?}"), mesh)
        });
        let commands = plan_board_draws(config.show_tiles);
        log::info!(
            "Board ready: {} draws per frame (tiles: {})",
            commands.len(),
            config.show_tiles
        );

        Ok(Self {
            surface,
            surface_config,
            device,
            queue,
            pipeline,
            meshes,
            commands,
            frame_bg,
            frame_buf,
            cell_bg,
            cell_buf,
            cell_stride,
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

    /// Render one frame: upload camera + cell transforms, clear, draw the board.
    pub fn render(&mut self) -> Result<(), SurfaceError> {
        // --- uniforms
        let aspect = self.width as f32 / self.height as f32;
        let camera = Camera::board(aspect);
        let frame_uniform = FrameUniform::new(camera.proj(), camera.view());
        self.queue
            .write_buffer(&self.frame_buf, 0, bytemuck::bytes_of(&frame_uniform));
        let cells = pack_cell_uniforms(&self.commands, self.cell_stride);
        self.queue.write_buffer(&self.cell_buf, 0, &cells);

        // --- frame & pass
        let frame = self.surface.get_current_texture()?;
        let view = frame.texture.create_view(&Default::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("MainEncoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("BoardPass"),
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

            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(0, &self.frame_bg, &[]);
            for (i, cmd) in self.commands.iter().enumerate() {
                let mesh = self.meshes.get(cmd.slot);
                let offset = (i as u64 * self.cell_stride) as u32;
                rpass.set_bind_group(1, &self.cell_bg, &[offset]);
                rpass.set_vertex_buffer(0, mesh.vertex_buf.slice(..));
                rpass.set_index_buffer(mesh.index_buf.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    pub fn is_surface_lost(err: &SurfaceError) -> bool {
        matches!(err, SurfaceError::Lost | SurfaceError::Outdated)
    }

    pub fn recreate_surface(&mut self) {
        self.resize(self.width, self.height);
    }
}

impl Drop for GpuState {
    fn drop(&mut self) {
        log::info!("Releasing GPU resources");
    }
}

/// First mode the surface reports, or `Auto` when it reports none.
fn choose_alpha_mode(modes: &[wgpu::CompositeAlphaMode]) -> wgpu::CompositeAlphaMode {
    modes
        .first()
        .copied()
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Single uniform-buffer binding at slot 0.
fn uniform_layout(
    device: &Device,
    label: &str,
    visibility: ShaderStages,
    dynamic: bool,
    size: u64,
) -> BindGroupLayout {
    device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: BindingType::Buffer {
                ty: BufferBindingType::Uniform,
                has_dynamic_offset: dynamic,
                min_binding_size: NonZeroU64::new(size),
            },
            count: None,
        }],
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
    use wgpu::CompositeAlphaMode;

    #[test]
    fn alpha_mode_prefers_first_reported() {
        let modes = [CompositeAlphaMode::Opaque, CompositeAlphaMode::PreMultiplied];
        assert_eq!(choose_alpha_mode(&modes), CompositeAlphaMode::Opaque);
    }

    #[test]
    fn alpha_mode_falls_back_to_auto() {
        assert_eq!(choose_alpha_mode(&[]), CompositeAlphaMode::Auto);
    }
}
