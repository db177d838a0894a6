use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::compile::{compile_fragment_shader, compile_vertex_shader};
use crate::geometry::{self, QUAD_VERTICES};
use crate::timeline::TimeSample;
use crate::uniforms::ViewerUniforms;

/// Owns every GPU resource needed to present a frame.
///
/// Field order is the reverse of creation order, so teardown unwinds
/// pipeline and buffers before device and queue, then surface, then the
/// instance.
pub(crate) struct GpuState {
    /// CPU copy of the uniform data mirrored into the buffer each frame.
    uniforms: ViewerUniforms,
    /// Fullscreen pipeline driving the fragment shader.
    pipeline: wgpu::RenderPipeline,
    /// Bind group that exposes the uniform buffer to the shader.
    uniform_bind_group: wgpu::BindGroup,
    /// GPU buffer containing the viewer uniform block.
    uniform_buffer: wgpu::Buffer,
    /// Quad geometry, uploaded once and never rewritten.
    vertex_buffer: wgpu::Buffer,
    /// Swapchain configuration (format, present mode, dimensions).
    config: wgpu::SurfaceConfiguration,
    /// Current swapchain size in physical pixels.
    size: PhysicalSize<u32>,
    /// Limits advertised by the adapter; used to validate resize requests.
    limits: wgpu::Limits,
    /// Submission queue accepting command buffers.
    queue: wgpu::Queue,
    /// Logical device used for resource creation.
    device: wgpu::Device,
    /// Swapchain surface we render into each frame.
    surface: wgpu::Surface<'static>,
    /// `wgpu` instance that produced the surface; kept alive for its lifetime.
    _instance: wgpu::Instance,
    /// Used to throttle the per-second frame log.
    last_log_time: Instant,
}

impl GpuState {
    /// Creates a GPU pipeline targeting the supplied surface and size.
    pub(crate) fn new<T>(
        target: &T,
        initial_size: PhysicalSize<u32>,
        fragment_source: &str,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            flags: wgpu::InstanceFlags::default(),
            memory_budget_thresholds: wgpu::MemoryBudgetThresholds::default(),
            backend_options: wgpu::BackendOptions::default(),
        });

        let window_handle = target
            .window_handle()
            .map_err(|err| anyhow!("failed to acquire window handle: {err}"))?;
        let display_handle = target
            .display_handle()
            .map_err(|err| anyhow!("failed to acquire display handle: {err}"))?;
        let surface = unsafe {
            instance.create_surface_unsafe(wgpu::SurfaceTargetUnsafe::RawHandle {
                raw_display_handle: display_handle.as_raw(),
                raw_window_handle: window_handle.as_raw(),
            })
        }
        .context("failed to create rendering surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("failed to find a suitable GPU adapter")?;

        let limits = adapter.limits();
        let max_dimension = limits.max_texture_dimension_2d;
        let requested_width = initial_size.width.max(1);
        let requested_height = initial_size.height.max(1);
        if requested_width > max_dimension || requested_height > max_dimension {
            anyhow::bail!(
                "GPU max texture dimension is {max_dimension}, requested surface is {requested_width}x{requested_height}"
            );
        }

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("fragview device"),
            required_features: wgpu::Features::empty(),
            required_limits: limits.clone(),
            memory_hints: wgpu::MemoryHints::default(),
            trace: wgpu::Trace::default(),
        }))
        .context("failed to create GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        // Non-sRGB keeps shader output gamma-encoded, like a plain GL context.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|format| !format.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        // Fifo blocks presentation on vertical sync and is always available.
        let present_mode = surface_caps
            .present_modes
            .iter()
            .copied()
            .find(|mode| *mode == wgpu::PresentMode::Fifo)
            .unwrap_or(surface_caps.present_modes[0]);

        let size = PhysicalSize::new(requested_width, requested_height);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 1,
        };
        surface.configure(&device, &config);
        tracing::info!(
            width = size.width,
            height = size.height,
            ?surface_format,
            ?present_mode,
            "configured rendering surface"
        );

        let vertex_module = compile_vertex_shader(&device)?;
        let fragment_module = compile_fragment_shader(&device, fragment_source);

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("viewer pipeline layout"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("viewer pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some("main"),
                buffers: &[geometry::vertex_layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some("main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview: None,
            cache: None,
        });

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad vertex buffer"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let uniforms = ViewerUniforms::new(size.width, size.height);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform buffer"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform bind group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Ok(Self {
            uniforms,
            pipeline,
            uniform_bind_group,
            uniform_buffer,
            vertex_buffer,
            config,
            size,
            limits,
            queue,
            device,
            surface,
            _instance: instance,
            last_log_time: Instant::now(),
        })
    }

    /// Returns the current surface size.
    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// Reconfigures the swapchain to match the new size.
    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        let max_dimension = self.limits.max_texture_dimension_2d;
        if new_size.width > max_dimension || new_size.height > max_dimension {
            tracing::warn!(
                requested_width = new_size.width,
                requested_height = new_size.height,
                max_dimension,
                "resize exceeds GPU max texture dimension; keeping previous size"
            );
            return;
        }

        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.uniforms
            .set_resolution(new_size.width as f32, new_size.height as f32);
    }

    /// Records and submits one frame to the GPU, blocking on vsync at present.
    pub(crate) fn render_frame(
        &mut self,
        sample: TimeSample,
        mouse: [f32; 2],
    ) -> Result<(), wgpu::SurfaceError> {
        self.update_uniforms(sample, mouse);

        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.draw(0..QUAD_VERTICES.len() as u32, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        tracing::trace!(
            width = self.size.width,
            height = self.size.height,
            "presented frame"
        );
        Ok(())
    }

    /// Advances the uniform block and uploads it to the GPU.
    fn update_uniforms(&mut self, sample: TimeSample, mouse: [f32; 2]) {
        self.uniforms.update(sample, mouse);
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms));

        let now = Instant::now();
        if now.duration_since(self.last_log_time) >= Duration::from_secs(1) {
            tracing::debug!(
                i_time = self.uniforms.i_time,
                frame = sample.frame_index,
                mouse_x = mouse[0],
                mouse_y = mouse[1],
                width = self.size.width,
                height = self.size.height,
                "frame state"
            );
            self.last_log_time = now;
        }
    }
}
