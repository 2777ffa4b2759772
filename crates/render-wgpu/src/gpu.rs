use crate::shaders;
use crate::shadow::{SHADOW_FORMAT, ShadowMap};
use bytemuck::{Pod, Zeroable};
use clothwave_common::{Rgb, SurfaceConfig, Viewport};
use clothwave_render::{PerspectiveCamera, Renderer, Scene, Side, SurfaceState};
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const SHADOW_DEPTH_BIAS: f32 = 0.0005;

/// Errors from GPU setup and frame submission.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible GPU adapter found")]
    NoAdapter,
    #[error("failed to create device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("surface does not support any texture format")]
    NoSurfaceFormat,
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct FrameUniforms {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    light_view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    base_color: [f32; 4],
    emissive: [f32; 4],
    spot_pos: [f32; 4],
    spot_dir: [f32; 4],
    spot_color: [f32; 4],
    ambient: [f32; 4],
    shadow: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct GpuVertex {
    position: [f32; 3],
    normal: [f32; 3],
}

fn pack_vertices(scene: &Scene) -> Vec<GpuVertex> {
    let mesh = &scene.cloth.mesh;
    mesh.positions()
        .iter()
        .zip(mesh.normals())
        .map(|(p, n)| GpuVertex {
            position: p.to_array(),
            normal: n.to_array(),
        })
        .collect()
}

fn rgb_scaled(c: Rgb, scale: f32, w: f32) -> [f32; 4] {
    let [r, g, b] = c.to_linear();
    [r * scale, g * scale, b * scale, w]
}

fn frame_uniforms(
    scene: &Scene,
    camera: &PerspectiveCamera,
    shadow_texel: f32,
    shadows_enabled: bool,
) -> FrameUniforms {
    let cloth = &scene.cloth;
    let material = &cloth.material;
    let spot = &scene.spot_light;
    let ambient = &scene.ambient_light;
    let (cos_outer, cos_inner) = spot.cone_cos();
    let dir = spot.direction();
    // Without a shadow pass the map holds stale or zero depth.
    let receive = shadows_enabled && cloth.cast_shadow && cloth.receive_shadow;

    FrameUniforms {
        view_proj: camera.view_projection().to_cols_array_2d(),
        model: cloth.model_matrix().to_cols_array_2d(),
        light_view_proj: spot.shadow_view_projection().to_cols_array_2d(),
        camera_pos: camera.position.extend(1.0).to_array(),
        base_color: rgb_scaled(material.color, 1.0, material.metalness),
        emissive: rgb_scaled(material.emissive, 1.0, material.roughness),
        spot_pos: spot.position.extend(spot.range).to_array(),
        spot_dir: dir.extend(cos_outer).to_array(),
        spot_color: rgb_scaled(spot.color, spot.intensity, cos_inner),
        ambient: rgb_scaled(ambient.color, ambient.intensity, 0.0),
        shadow: [
            shadow_texel,
            SHADOW_DEPTH_BIAS,
            if receive { 1.0 } else { 0.0 },
            if material.side == Side::Double { 1.0 } else { 0.0 },
        ],
    }
}

/// wgpu-based cloth renderer. Owns the surface, device and all GPU resources.
pub struct WgpuRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    state: SurfaceState,
    sample_count: u32,
    cloth_pipeline: wgpu::RenderPipeline,
    shadow_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    main_bind_group: wgpu::BindGroup,
    shadow_bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    triangle_buffer: wgpu::Buffer,
    triangle_count: u32,
    edge_buffer: wgpu::Buffer,
    edge_count: u32,
    shadow_map: ShadowMap,
    depth_view: wgpu::TextureView,
    msaa_view: Option<wgpu::TextureView>,
}

impl WgpuRenderer {
    /// Create the surface on `target`, pick an adapter and build every pipeline.
    ///
    /// The scene's topology is uploaded once here; later frames only rewrite
    /// the vertex buffer.
    pub async fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        viewport: Viewport,
        surface_config: SurfaceConfig,
        scene: &Scene,
    ) -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(target)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("clothwave_device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .ok_or(RenderError::NoSurfaceFormat)?;
        let alpha_mode = pick_alpha_mode(&caps.alpha_modes, surface_config.transparent);

        let state = SurfaceState::new(viewport, surface_config);
        let sample_count = {
            let wanted = state.sample_count();
            let flags = adapter.get_texture_format_features(format).flags;
            if wanted > 1 && !flags.sample_count_supported(wanted) {
                tracing::warn!(wanted, "MSAA sample count unsupported, antialiasing disabled");
                1
            } else {
                wanted
            }
        };

        let (width, height) = viewport.clamped();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shadow_resolution = if state.config().shadows {
            state.config().shadow_map_size
        } else {
            1
        };
        let shadow_map = ShadowMap::new(&device, shadow_resolution);

        // Uniform buffer
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame_uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_entry = |visibility| wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let main_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("cloth_bind_group_layout"),
            entries: &[
                uniform_entry(wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        });

        // The shadow pass writes the map, so it cannot also bind it.
        let shadow_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("shadow_bind_group_layout"),
            entries: &[uniform_entry(wgpu::ShaderStages::VERTEX)],
        });

        let main_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("cloth_bind_group"),
            layout: &main_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&shadow_map.depth_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&shadow_map.sampler),
                },
            ],
        });

        let shadow_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shadow_bind_group"),
            layout: &shadow_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GpuVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![
                0 => Float32x3,
                1 => Float32x3,
            ],
        };

        // Cloth pipeline
        let cloth_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("cloth_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::CLOTH_SHADER.into()),
        });
        let cloth_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("cloth_pipeline_layout"),
            bind_group_layouts: &[&main_layout],
            push_constant_ranges: &[],
        });
        let cloth_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("cloth_pipeline"),
            layout: Some(&cloth_layout),
            vertex: wgpu::VertexState {
                module: &cloth_shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[vertex_layout.clone()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &cloth_shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: sample_count,
                ..Default::default()
            },
            multiview: None,
            cache: None,
        });

        // Shadow pipeline: depth only, both faces
        let shadow_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shadow_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SHADOW_SHADER.into()),
        });
        let shadow_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("shadow_pipeline_layout"),
                bind_group_layouts: &[&shadow_layout],
                push_constant_ranges: &[],
            });
        let shadow_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("shadow_pipeline"),
            layout: Some(&shadow_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shadow_shader,
                entry_point: Some("vs_shadow"),
                compilation_options: Default::default(),
                buffers: &[vertex_layout],
            },
            fragment: None,
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: SHADOW_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: Default::default(),
                bias: wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 2.0,
                    clamp: 0.0,
                },
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        // Cloth mesh
        let mesh = &scene.cloth.mesh;
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cloth_vertex_buffer"),
            contents: bytemuck::cast_slice(&pack_vertices(scene)),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let triangle_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cloth_triangle_buffer"),
            contents: bytemuck::cast_slice(mesh.triangle_indices()),
            usage: wgpu::BufferUsages::INDEX,
        });
        let edge_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cloth_edge_buffer"),
            contents: bytemuck::cast_slice(mesh.edge_indices()),
            usage: wgpu::BufferUsages::INDEX,
        });

        let depth_view = create_depth_texture(&device, width, height, sample_count);
        let msaa_view = create_msaa_texture(&device, &config, sample_count);

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            ?format,
            ?alpha_mode,
            sample_count,
            shadow_map = shadow_map.resolution(),
            shadow_bytes = shadow_map.memory_bytes(),
            "GPU initialized"
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            state,
            sample_count,
            cloth_pipeline,
            shadow_pipeline,
            uniform_buffer,
            main_bind_group,
            shadow_bind_group,
            vertex_buffer,
            triangle_buffer,
            triangle_count: mesh.triangle_indices().len() as u32,
            edge_buffer,
            edge_count: mesh.edge_indices().len() as u32,
            shadow_map,
            depth_view,
            msaa_view,
        })
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    fn shadows_enabled(&self, scene: &Scene) -> bool {
        self.state.config().shadows && scene.spot_light.cast_shadow
    }

    fn clear_color(&self) -> wgpu::Color {
        let [r, g, b] = self.state.config().clear_color.to_linear();
        wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        }
    }
}

impl Renderer for WgpuRenderer {
    type Output = Result<(), RenderError>;

    /// Upload dirty vertices, draw the shadow map, then the wireframe cloth.
    fn render(&mut self, scene: &mut Scene, camera: &PerspectiveCamera) -> Self::Output {
        if scene.cloth.mesh.take_dirty() {
            self.queue.write_buffer(
                &self.vertex_buffer,
                0,
                bytemuck::cast_slice(&pack_vertices(scene)),
            );
        }

        let shadows = self.shadows_enabled(scene);
        let uniforms = frame_uniforms(scene, camera, self.shadow_map.texel_size(), shadows);
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::debug!("surface lost or outdated, reconfiguring");
                self.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::warn!("surface timeout, frame skipped");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("cloth_encoder"),
            });

        if shadows && scene.cloth.cast_shadow {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("shadow_pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_map.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            pass.set_pipeline(&self.shadow_pipeline);
            pass.set_bind_group(0, &self.shadow_bind_group, &[]);
            pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            pass.set_index_buffer(self.triangle_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..self.triangle_count, 0, 0..1);
        }

        {
            let (target, resolve_target) = match &self.msaa_view {
                Some(msaa) => (msaa, Some(&view)),
                None => (&view, None),
            };
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("cloth_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            pass.set_pipeline(&self.cloth_pipeline);
            pass.set_bind_group(0, &self.main_bind_group, &[]);
            pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            pass.set_index_buffer(self.edge_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..self.edge_count, 0, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn resize(&mut self, viewport: Viewport) {
        if !self.state.resize(viewport) {
            return;
        }
        let (width, height) = viewport.clamped();
        self.config.width = width;
        self.config.height = height;
        self.reconfigure();
        self.depth_view = create_depth_texture(&self.device, width, height, self.sample_count);
        self.msaa_view = create_msaa_texture(&self.device, &self.config, self.sample_count);
        tracing::debug!(width, height, "surface resized");
    }

    fn surface(&self) -> &SurfaceState {
        &self.state
    }
}

/// Prefer a compositing alpha mode when the surface should be transparent.
fn pick_alpha_mode(
    modes: &[wgpu::CompositeAlphaMode],
    transparent: bool,
) -> wgpu::CompositeAlphaMode {
    if transparent {
        for wanted in [
            wgpu::CompositeAlphaMode::PreMultiplied,
            wgpu::CompositeAlphaMode::PostMultiplied,
        ] {
            if modes.contains(&wanted) {
                return wanted;
            }
        }
    }
    modes
        .first()
        .copied()
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

fn create_depth_texture(
    device: &wgpu::Device,
    width: u32,
    height: u32,
    sample_count: u32,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}

fn create_msaa_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    sample_count: u32,
) -> Option<wgpu::TextureView> {
    if sample_count <= 1 {
        return None;
    }
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("msaa_color_texture"),
        size: wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format: config.format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    Some(texture.create_view(&Default::default()))
}
