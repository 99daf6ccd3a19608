//! Tunable parameters shared between the panel, the resize handler and the
//! GPU stages.
//!
//! `SimParams` is the single parameter store: the panel and the resize
//! handler write into it, and once per frame the GPU stages read a POD
//! snapshot built from it. Everything runs on one thread in a fixed order,
//! so no locking is involved and a stage can never observe a half-updated
//! set of fields.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2};

/// Parameter set for one simulation/render frame.
#[derive(Debug, Clone)]
pub struct SimParams {
    /// Background color, sRGB, as shown in the panel's picker.
    pub clear_color: [f32; 3],
    /// Base point size factor, panel range 0..=1.
    pub point_size: f32,
    /// Flow-field influence, panel range 0..=1.
    pub flow_influence: f32,
    /// Flow-field strength, panel range 0..=10.
    pub flow_strength: f32,
    /// Flow-field frequency, panel range 0..=1.
    pub flow_frequency: f32,
    /// Elapsed seconds since scene start. Written by the frame driver.
    pub time: f32,
    /// Seconds since the previous frame; 0.0 on the first frame.
    pub delta_time: f32,
    /// Backing resolution in pixels (logical size x capped pixel ratio).
    pub resolution: Vec2,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            clear_color: [0.106, 0.094, 0.145], // #1b1825
            point_size: 0.07,
            flow_influence: 0.5,
            flow_strength: 2.0,
            flow_frequency: 0.5,
            time: 0.0,
            delta_time: 0.0,
            resolution: Vec2::new(1280.0, 720.0),
        }
    }
}

impl SimParams {
    /// Snapshot for the simulation compute pass.
    pub fn sim_uniforms(&self) -> SimUniforms {
        SimUniforms {
            time: self.time,
            delta_time: self.delta_time,
            influence: self.flow_influence,
            strength: self.flow_strength,
            frequency: self.flow_frequency,
            _padding: [0.0; 3],
        }
    }

    /// Snapshot for the particle draw pass.
    pub fn render_uniforms(&self, view_proj: Mat4) -> RenderUniforms {
        RenderUniforms {
            view_proj: view_proj.to_cols_array_2d(),
            resolution: self.resolution.to_array(),
            point_size: self.point_size,
            _padding: 0.0,
        }
    }

    /// Clear color converted to linear, as the surface expects.
    pub fn clear_color_linear(&self) -> wgpu::Color {
        wgpu::Color {
            r: srgb_to_linear(self.clear_color[0]),
            g: srgb_to_linear(self.clear_color[1]),
            b: srgb_to_linear(self.clear_color[2]),
            a: 1.0,
        }
    }
}

fn srgb_to_linear(c: f32) -> f64 {
    let c = c as f64;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Uniforms read by the simulation compute shader.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct SimUniforms {
    pub time: f32,
    pub delta_time: f32,
    pub influence: f32,
    pub strength: f32,
    pub frequency: f32,
    pub _padding: [f32; 3],
}

/// Uniforms read by the particle render shader.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct RenderUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub resolution: [f32; 2],
    pub point_size: f32,
    pub _padding: f32,
}

/// Window geometry tracked by the resize handler.
///
/// The backing resolution follows the original behavior: logical size times
/// the device pixel ratio, with the ratio capped at 2.0 so high-DPI screens
/// don't quadruple the fill cost.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub scale_factor: f32,
}

impl Viewport {
    pub const MAX_PIXEL_RATIO: f32 = 2.0;

    pub fn new(width: f32, height: f32, scale_factor: f32) -> Self {
        Self {
            width,
            height,
            scale_factor,
        }
    }

    /// Device pixel ratio, capped at 2.
    #[inline]
    pub fn pixel_ratio(&self) -> f32 {
        self.scale_factor.min(Self::MAX_PIXEL_RATIO)
    }

    /// Backing resolution in pixels.
    #[inline]
    pub fn resolution(&self) -> Vec2 {
        Vec2::new(self.width, self.height) * self.pixel_ratio()
    }

    /// Backing store size in whole pixels, for surface configuration. The
    /// surface and the resolution uniform must come from the same capped
    /// ratio or the overlay draws against the wrong pixel grid.
    #[inline]
    pub fn backing_size(&self) -> (u32, u32) {
        let r = self.resolution();
        (r.x.round() as u32, r.y.round() as u32)
    }

    /// Projection aspect ratio. A zero-height window yields 1.0 so the
    /// projection stays finite until the next valid resize.
    #[inline]
    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_panel_ranges() {
        let params = SimParams::default();
        assert!((0.0..=1.0).contains(&params.point_size));
        assert!((0.0..=1.0).contains(&params.flow_influence));
        assert!((0.0..=10.0).contains(&params.flow_strength));
        assert!((0.0..=1.0).contains(&params.flow_frequency));
    }

    #[test]
    fn sim_uniforms_snapshot_all_fields() {
        let mut params = SimParams::default();
        params.time = 3.5;
        params.delta_time = 0.016;
        params.flow_strength = 7.25;
        let u = params.sim_uniforms();
        assert_eq!(u.time, 3.5);
        assert_eq!(u.delta_time, 0.016);
        assert_eq!(u.strength, 7.25);
        assert_eq!(u.influence, params.flow_influence);
        assert_eq!(u.frequency, params.flow_frequency);
        assert_eq!(std::mem::size_of::<SimUniforms>(), 32);
    }

    #[test]
    fn render_uniforms_layout() {
        let params = SimParams::default();
        let u = params.render_uniforms(Mat4::IDENTITY);
        assert_eq!(u.resolution, [1280.0, 720.0]);
        assert_eq!(u.point_size, 0.07);
        assert_eq!(std::mem::size_of::<RenderUniforms>(), 80);
    }

    #[test]
    fn pixel_ratio_is_capped_at_two() {
        let vp = Viewport::new(800.0, 600.0, 3.0);
        assert_eq!(vp.pixel_ratio(), 2.0);
        assert_eq!(vp.resolution(), Vec2::new(1600.0, 1200.0));

        let vp = Viewport::new(800.0, 600.0, 1.5);
        assert_eq!(vp.pixel_ratio(), 1.5);
        assert_eq!(vp.resolution(), Vec2::new(1200.0, 900.0));
    }

    #[test]
    fn backing_size_follows_capped_resolution() {
        // Scale 3 physical size would be 2400x1800; the backing store stays
        // at the capped ratio so it matches the resolution uniform.
        let vp = Viewport::new(800.0, 600.0, 3.0);
        assert_eq!(vp.backing_size(), (1600, 1200));
        assert_eq!(
            vp.resolution(),
            Vec2::new(vp.backing_size().0 as f32, vp.backing_size().1 as f32)
        );

        let vp = Viewport::new(1280.0, 720.0, 1.0);
        assert_eq!(vp.backing_size(), (1280, 720));
    }

    #[test]
    fn aspect_follows_logical_size() {
        let vp = Viewport::new(1920.0, 1080.0, 2.0);
        assert!((vp.aspect() - 1920.0 / 1080.0).abs() < 1e-6);
        // Zero-area resize must not produce a NaN projection.
        let degenerate = Viewport::new(1920.0, 0.0, 2.0);
        assert_eq!(degenerate.aspect(), 1.0);
    }

    #[test]
    fn clear_color_converts_to_linear() {
        let params = SimParams::default();
        let c = params.clear_color_linear();
        // Linear values are darker than their sRGB encoding.
        assert!(c.r < params.clear_color[0] as f64);
        assert!(c.r > 0.0 && c.a == 1.0);
    }
}
