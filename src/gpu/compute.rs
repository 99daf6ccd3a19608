//! Simulation stage: advances the particle state texture once per frame.
//!
//! Two SxS `Rgba32Float` textures ping-pong as input/output of a compute
//! pass, with a third immutable texture holding the encoded base positions
//! for respawning. Both ping-pong textures start seeded with the base data,
//! so frame 0 reads the encoded mesh surface directly.

use bytemuck::Zeroable;

use crate::error::GpuError;
use crate::grid::ParticleGrid;
use crate::mesh::SurfacePoints;
use crate::params::SimUniforms;

use super::STATE_FORMAT;

const SIMULATE_SOURCE: &str = include_str!("simulate.wgsl");
const WORKGROUP_SIZE: u32 = 8;

pub struct SimulationStage {
    size: u32,
    pipeline: wgpu::ComputePipeline,
    uniform_buffer: wgpu::Buffer,
    /// One bind group per ping-pong direction: [0] reads A writes B,
    /// [1] reads B writes A.
    bind_groups: [wgpu::BindGroup; 2],
    state_views: [wgpu::TextureView; 2],
    /// Which state view currently holds the latest output.
    current: usize,
}

impl SimulationStage {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        grid: &ParticleGrid,
        points: &SurfacePoints,
    ) -> Result<Self, GpuError> {
        use wgpu::util::DeviceExt;

        let size = grid.size();
        let max = device.limits().max_texture_dimension_2d;
        if size > max {
            return Err(GpuError::TextureTooLarge { size, max });
        }

        let extent = wgpu::Extent3d {
            width: size,
            height: size,
            depth_or_array_layers: 1,
        };
        let descriptor = |label, usage| wgpu::TextureDescriptor {
            label: Some(label),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: STATE_FORMAT,
            usage,
            view_formats: &[],
        };

        let state_usage = wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::STORAGE_BINDING
            | wgpu::TextureUsages::COPY_DST;
        let state_textures = [
            device.create_texture(&descriptor("State Texture A", state_usage)),
            device.create_texture(&descriptor("State Texture B", state_usage)),
        ];
        let base_texture = device.create_texture(&descriptor(
            "Base Texture",
            wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        ));

        // Seed all three textures with the encoded surface.
        let base_data = grid.encode_base_texture(points);
        for texture in state_textures.iter().chain(std::iter::once(&base_texture)) {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                bytemuck::cast_slice(&base_data),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(size * 16),
                    rows_per_image: Some(size),
                },
                extent,
            );
        }

        let state_views = [
            state_textures[0].create_view(&wgpu::TextureViewDescriptor::default()),
            state_textures[1].create_view(&wgpu::TextureViewDescriptor::default()),
        ];
        let base_view = base_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Simulation Uniform Buffer"),
            contents: bytemuck::bytes_of(&SimUniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Simulation Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: false },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: false },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::StorageTexture {
                            access: wgpu::StorageTextureAccess::WriteOnly,
                            format: STATE_FORMAT,
                            view_dimension: wgpu::TextureViewDimension::D2,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 3,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                ],
            });

        let make_bind_group = |label, input: &wgpu::TextureView, output: &wgpu::TextureView| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(input),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(&base_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::TextureView(output),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: uniform_buffer.as_entire_binding(),
                    },
                ],
            })
        };
        let bind_groups = [
            make_bind_group("Simulation Bind Group A->B", &state_views[0], &state_views[1]),
            make_bind_group("Simulation Bind Group B->A", &state_views[1], &state_views[0]),
        ];

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Simulation Shader"),
            source: wgpu::ShaderSource::Wgsl(SIMULATE_SOURCE.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Simulation Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Simulation Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        Ok(Self {
            size,
            pipeline,
            uniform_buffer,
            bind_groups,
            state_views,
            current: 0,
        })
    }

    /// Run one simulation step, advancing `current` to the freshly written
    /// texture.
    pub fn step(
        &mut self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        uniforms: SimUniforms,
    ) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Simulation Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.bind_groups[self.current], &[]);
            let groups = self.size.div_ceil(WORKGROUP_SIZE);
            pass.dispatch_workgroups(groups, groups, 1);
        }

        self.current ^= 1;
    }

    /// Views of both ping-pong textures, for the renderer's bind groups.
    pub fn state_views(&self) -> &[wgpu::TextureView; 2] {
        &self.state_views
    }

    /// Index of the view holding the latest simulation output.
    #[inline]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Side length of the state texture.
    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }
}
