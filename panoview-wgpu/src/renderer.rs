use wgpu::util::DeviceExt;

use panoview_core::{shaders, EyePass, ProjectionMode, RayUniforms};

use crate::video_texture::VideoTexture;

// Two-triangle fullscreen quad; the shader reconstructs a view ray per
// pixel, so this is the only geometry in the whole player.
const QUAD_POSITIONS: [f32; 8] = [-1.0, -1.0, 1.0, -1.0, 1.0, 1.0, -1.0, 1.0];
const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

/// Draws the two per-eye views of the video sphere.
///
/// Owns the pipeline, the quad buffers, one uniform buffer per eye (both
/// eyes draw inside a single submit, so they cannot share one), and the
/// video frame texture. Shader or pipeline validation failures abort at
/// construction; the engine never draws without a valid program.
pub struct RayCastRenderer {
    pipeline: wgpu::RenderPipeline,
    quad_vertices: wgpu::Buffer,
    quad_indices: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    eye_uniforms: [wgpu::Buffer; 2],
    bind_groups: Option<[wgpu::BindGroup; 2]>,
    video: Option<VideoTexture>,
}

impl RayCastRenderer {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Raycast Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::RAYCAST.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Raycast Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
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
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Raycast Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Raycast Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: 8,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x2],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let quad_vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Quad Vertex Buffer"),
            contents: bytemuck::cast_slice(&QUAD_POSITIONS),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let quad_indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Quad Index Buffer"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        let eye_uniforms = [
            Self::uniform_buffer(device, "Left Eye Uniforms"),
            Self::uniform_buffer(device, "Right Eye Uniforms"),
        ];

        Self {
            pipeline,
            quad_vertices,
            quad_indices,
            bind_group_layout,
            eye_uniforms,
            bind_groups: None,
            video: None,
        }
    }

    fn uniform_buffer(device: &wgpu::Device, label: &str) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: std::mem::size_of::<RayUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Make sure the video texture slot matches the source dimensions,
    /// recreating it (and the bind groups referencing it) on change.
    pub fn ensure_video_texture(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        let needs_new = match &self.video {
            Some(v) => v.width != width || v.height != height,
            None => true,
        };
        if needs_new && width > 0 && height > 0 {
            log::info!("Video texture slot: {width}x{height}");
            self.video = Some(VideoTexture::new(device, width, height));
            self.bind_groups = None;
        }
    }

    /// Forget the memoized frame timestamp (video source changed).
    pub fn invalidate_video(&mut self) {
        if let Some(video) = &mut self.video {
            video.invalidate();
        }
    }

    pub fn video_texture_mut(&mut self) -> Option<&mut VideoTexture> {
        self.video.as_mut()
    }

    /// Draw both eye passes into `target`, left then right, inside one
    /// render pass. Clears and returns without drawing when no video frame
    /// has been uploaded yet.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        passes: &[EyePass; 2],
        mode: ProjectionMode,
    ) {
        if self.video.is_some() && self.bind_groups.is_none() {
            self.create_bind_groups(device);
        }

        for (pass, buffer) in passes.iter().zip(&self.eye_uniforms) {
            let uniforms = RayUniforms::new(
                pass.ray_matrix.to_cols_array(),
                pass.eye.selector(),
                mode.as_uniform(),
            );
            queue.write_buffer(buffer, 0, bytemuck::bytes_of(&uniforms));
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Raycast Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Raycast Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            if let Some(bind_groups) = &self.bind_groups {
                render_pass.set_pipeline(&self.pipeline);
                render_pass.set_vertex_buffer(0, self.quad_vertices.slice(..));
                render_pass
                    .set_index_buffer(self.quad_indices.slice(..), wgpu::IndexFormat::Uint16);

                for (pass, bind_group) in passes.iter().zip(bind_groups) {
                    let vp = pass.viewport;
                    render_pass.set_viewport(
                        vp.x as f32,
                        vp.y as f32,
                        vp.width as f32,
                        vp.height as f32,
                        0.0,
                        1.0,
                    );
                    render_pass.set_bind_group(0, bind_group, &[]);
                    render_pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..1);
                }
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_bind_groups(&mut self, device: &wgpu::Device) {
        let video = match &self.video {
            Some(v) => v,
            None => return,
        };
        let mut groups = Vec::with_capacity(2);
        for (buffer, label) in self
            .eye_uniforms
            .iter()
            .zip(["Left Eye Bind Group", "Right Eye Bind Group"])
        {
            groups.push(device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &self.bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(&video.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(&video.sampler),
                    },
                ],
            }));
        }
        let groups: [wgpu::BindGroup; 2] = groups.try_into().ok().unwrap();
        self.bind_groups = Some(groups);
    }
}
