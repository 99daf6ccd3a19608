//! Startup loading overlay.
//!
//! A full-screen cover with a horizontal bar that fills over a fixed two
//! seconds, then fades out over 0.7 seconds to reveal the scene. The timing
//! runs on its own clock and is deliberately not tied to the real asset
//! load; initialization here is blocking, so in practice the bar starts
//! after the model is already in memory and simply plays out its fixed
//! schedule. See DESIGN.md for the rationale behind keeping this behavior.

use bytemuck::{Pod, Zeroable};

use crate::gpu::DEPTH_FORMAT;

/// Seconds the bar takes to reach full width.
pub const FILL_DURATION: f32 = 2.0;
/// Seconds the fade-out takes after the bar is full.
pub const FADE_DURATION: f32 = 0.7;
/// Horizontal margin of the bar, in logical pixels per side.
pub const BAR_MARGIN: f32 = 20.0;

const OVERLAY_SOURCE: &str = include_str!("gpu/overlay.wgsl");

/// Lifecycle of the overlay, derived purely from elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayPhase {
    /// Bar is filling; the scene is fully covered.
    Filling,
    /// Bar is full; the cover is fading out.
    Fading,
    /// Overlay is gone; nothing is drawn anymore.
    Done,
}

/// Phase for a given elapsed time since scene start.
pub fn phase(elapsed: f32) -> OverlayPhase {
    if elapsed < FILL_DURATION {
        OverlayPhase::Filling
    } else if elapsed < FILL_DURATION + FADE_DURATION {
        OverlayPhase::Fading
    } else {
        OverlayPhase::Done
    }
}

/// Bar fill progress in [0, 1].
pub fn fill_progress(elapsed: f32) -> f32 {
    (elapsed / FILL_DURATION).clamp(0.0, 1.0)
}

/// Bar width in logical pixels for a given screen width.
pub fn bar_width(elapsed: f32, screen_width: f32) -> f32 {
    fill_progress(elapsed) * (screen_width - 2.0 * BAR_MARGIN).max(0.0)
}

/// Cover opacity: solid while filling, linear fade afterwards.
pub fn opacity(elapsed: f32) -> f32 {
    if elapsed <= FILL_DURATION {
        1.0
    } else {
        (1.0 - (elapsed - FILL_DURATION) / FADE_DURATION).clamp(0.0, 1.0)
    }
}

/// The overlay draws inside the scene pass, which carries the depth
/// attachment, so the pipeline must declare a matching depth state even
/// though the cover neither tests nor writes depth.
fn depth_state() -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: false,
        depth_compare: wgpu::CompareFunction::Always,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct OverlayUniforms {
    resolution: [f32; 2],
    progress: f32,
    opacity: f32,
}

/// Full-screen overlay pass, alpha-blended over the scene.
pub struct OverlayPass {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl OverlayPass {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        use wgpu::util::DeviceExt;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Overlay Shader"),
            source: wgpu::ShaderSource::Wgsl(OVERLAY_SOURCE.into()),
        });

        let uniforms = OverlayUniforms {
            resolution: [1.0, 1.0],
            progress: 0.0,
            opacity: 1.0,
        };
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Overlay Uniform Buffer"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Overlay Bind Group Layout"),
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

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Overlay Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Overlay Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Overlay Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: Some(depth_state()),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            uniform_buffer,
            bind_group,
        }
    }

    /// Draw the overlay for the given elapsed time. No-op once done.
    pub fn draw(
        &self,
        queue: &wgpu::Queue,
        pass: &mut wgpu::RenderPass<'_>,
        elapsed: f32,
        resolution: [f32; 2],
    ) {
        if phase(elapsed) == OverlayPhase::Done {
            return;
        }
        let uniforms = OverlayUniforms {
            resolution,
            progress: fill_progress(elapsed),
            opacity: opacity(elapsed),
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_reaches_full_width_at_fill_mark() {
        let screen = 1280.0;
        assert_eq!(bar_width(FILL_DURATION, screen), screen - 40.0);
        // Staying full afterwards, independent of anything else.
        assert_eq!(bar_width(10.0, screen), screen - 40.0);
    }

    #[test]
    fn bar_width_is_monotonic_while_filling() {
        let screen = 800.0;
        let mut last = -1.0f32;
        for step in 0..=20 {
            let w = bar_width(step as f32 * 0.1, screen);
            assert!(w >= last);
            last = w;
        }
    }

    #[test]
    fn narrow_screen_never_yields_negative_width() {
        assert_eq!(bar_width(1.0, 10.0), 0.0);
    }

    #[test]
    fn opacity_fades_over_fade_duration() {
        assert_eq!(opacity(0.0), 1.0);
        assert_eq!(opacity(FILL_DURATION), 1.0);
        let mid = opacity(FILL_DURATION + FADE_DURATION / 2.0);
        assert!(mid > 0.0 && mid < 1.0);
        assert_eq!(opacity(FILL_DURATION + FADE_DURATION), 0.0);
        assert_eq!(opacity(100.0), 0.0);
    }

    #[test]
    fn depth_state_matches_scene_pass_attachment() {
        // Drawn inside the pass that attaches the Depth32Float buffer; the
        // formats must agree or pipeline/pass validation rejects the draw.
        let state = depth_state();
        assert_eq!(state.format, DEPTH_FORMAT);
        assert!(!state.depth_write_enabled);
        assert_eq!(state.depth_compare, wgpu::CompareFunction::Always);
    }

    #[test]
    fn phases_cover_the_timeline() {
        assert_eq!(phase(0.0), OverlayPhase::Filling);
        assert_eq!(phase(1.999), OverlayPhase::Filling);
        assert_eq!(phase(2.0), OverlayPhase::Fading);
        assert_eq!(phase(2.699), OverlayPhase::Fading);
        assert_eq!(phase(2.7), OverlayPhase::Done);
    }
}
