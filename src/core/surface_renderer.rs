use std::sync::Arc;

use glam::UVec2;
use wgpu::util::DeviceExt;
use wgpu::{BindGroup, BindGroupLayout, Buffer, Device, RenderPipeline, Surface, SurfaceConfiguration, Texture};
use winit::window::Window;

use super::backend::RenderBackend;
use super::errors::{RenderError, Result};
use super::gpu_context::GpuContext;
use super::shader::{self, ShaderProvider, SCREEN_SHADER};
use crate::gui::Gui;
use crate::math::{Quad, QuadVertex};

/// Background behind the byte window
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.1,
    g: 0.1,
    b: 0.1,
    a: 1.0,
};

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];

/// Size uniform read by the fragment shader
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct ScreenUniform {
    tex_size: [f32; 2],
    _pad: [f32; 2],
}

impl ScreenUniform {
    fn new(size: UVec2) -> Self {
        Self {
            tex_size: size.as_vec2().to_array(),
            _pad: [0.0; 2],
        }
    }
}

/// Pixel texture plus the bind group that exposes it to the pipeline
struct WindowTexture {
    texture: Texture,
    size: UVec2,
    bind_group: BindGroup,
}

/// Draws the byte window quad and the egui overlay to a window surface
///
/// Implements `RenderBackend`: the visualizer's texture and quad calls only
/// touch GPU buffers; `render_frame` records and presents the actual pass.
pub struct SurfaceRenderer {
    gpu: GpuContext,
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,
    pipeline: RenderPipeline,
    bind_group_layout: BindGroupLayout,
    vertex_buffer: Buffer,
    uniform_buffer: Buffer,
    texture: Option<WindowTexture>,
    draw_requested: bool,
}

impl SurfaceRenderer {
    pub async fn new(window: Arc<Window>, shaders: &dyn ShaderProvider) -> Result<Self> {
        let size = window.inner_size();
        let (gpu, surface) = GpuContext::new_with_surface(window).await?;

        let surface_caps = surface.get_capabilities(gpu.adapter());
        // Texels are raw byte values; an sRGB target would brighten them
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(RenderError::NoSurfaceFormat)?;

        let surface_config = SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(gpu.device(), &surface_config);
        log::info!(
            "Surface {}x{} {:?}, max texture {}",
            surface_config.width,
            surface_config.height,
            surface_format,
            gpu.max_texture_dimension()
        );

        let shader = shader::compile(gpu.device(), shaders, SCREEN_SHADER)?;
        let bind_group_layout = Self::create_bind_group_layout(gpu.device());
        let pipeline = Self::create_render_pipeline(gpu.device(), &shader, &bind_group_layout, surface_format);

        let vertex_buffer = gpu.device().create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Quad Vertex Buffer"),
            contents: Quad::default().as_bytes(),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_buffer = gpu.device().create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Screen Uniform Buffer"),
            contents: bytemuck::bytes_of(&ScreenUniform::new(UVec2::ONE)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        Ok(Self {
            gpu,
            surface,
            surface_config,
            pipeline,
            bind_group_layout,
            vertex_buffer,
            uniform_buffer,
            texture: None,
            draw_requested: false,
        })
    }

    pub fn gpu(&self) -> &GpuContext {
        &self.gpu
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.surface_config.format
    }

    pub fn surface_size(&self) -> UVec2 {
        UVec2::new(self.surface_config.width, self.surface_config.height)
    }

    /// Resize the surface; zero-sized (minimized) windows are ignored
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(self.gpu.device(), &self.surface_config);
    }

    /// Clear, draw the quad if the visualizer asked for it, then the UI
    pub fn render_frame(&mut self, window: &Window, gui: Option<&mut Gui>) -> Result<()> {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost, reconfiguring");
                self.surface.configure(self.gpu.device(), &self.surface_config);
                self.draw_requested = false;
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Window Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let (true, Some(texture)) = (self.draw_requested, &self.texture) {
                render_pass.set_pipeline(&self.pipeline);
                render_pass.set_bind_group(0, &texture.bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                render_pass.draw(0..4, 0..1);
            }
        }
        self.draw_requested = false;

        if let Some(gui) = gui {
            gui.paint(
                self.gpu.device(),
                self.gpu.queue(),
                &mut encoder,
                &view,
                [self.surface_config.width, self.surface_config.height],
            );
        }

        self.gpu.queue().submit(Some(encoder.finish()));
        window.pre_present_notify();
        surface_texture.present();

        Ok(())
    }

    fn create_bind_group_layout(device: &Device) -> BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Window Texture Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        })
    }

    fn create_render_pipeline(
        device: &Device,
        shader: &wgpu::ShaderModule,
        bind_group_layout: &BindGroupLayout,
        surface_format: wgpu::TextureFormat,
    ) -> RenderPipeline {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Window Pipeline Layout"),
            bind_group_layouts: &[bind_group_layout],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Window Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &VERTEX_ATTRIBUTES,
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    fn extent(size: UVec2) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: size.x,
            height: size.y,
            depth_or_array_layers: 1,
        }
    }
}

impl RenderBackend for SurfaceRenderer {
    fn allocate_texture(&mut self, size: UVec2) {
        let device = self.gpu.device();
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Window Texture"),
            size: Self::extent(size),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Window Texture Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
            ],
        });

        self.texture = Some(WindowTexture {
            texture,
            size,
            bind_group,
        });
    }

    fn upload_texture(&mut self, size: UVec2, texels: &[u32]) {
        let Some(target) = self.texture.as_ref().filter(|t| t.size == size) else {
            log::error!("Upload of {}x{} pixels without a matching texture", size.x, size.y);
            return;
        };

        self.gpu.queue().write_texture(
            target.texture.as_image_copy(),
            bytemuck::cast_slice(texels),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * size.x),
                rows_per_image: Some(size.y),
            },
            Self::extent(size),
        );
    }

    fn draw(&mut self, quad: &Quad, texture_size: UVec2) {
        let queue = self.gpu.queue();
        queue.write_buffer(&self.vertex_buffer, 0, quad.as_bytes());
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&ScreenUniform::new(texture_size)));
        self.draw_requested = true;
    }

    fn max_texture_dimension(&self) -> u32 {
        self.gpu.max_texture_dimension()
    }
}
