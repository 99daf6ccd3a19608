//! Tweak panel drawn with egui on top of the particle scene.

use std::sync::Arc;

use winit::window::Window;

use crate::params::SimParams;

/// Fixed width of the tweak panel window.
pub const PANEL_WIDTH: f32 = 340.0;

/// Egui plumbing: context, winit event bridge, wgpu renderer.
pub struct EguiLayer {
    pub ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

/// One tessellated egui pass, ready to paint.
pub struct EguiFrameOutput {
    pub paint_jobs: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub pixels_per_point: f32,
}

impl EguiLayer {
    pub fn new(
        device: &wgpu::Device,
        output_format: wgpu::TextureFormat,
        window: &Arc<Window>,
    ) -> Self {
        let ctx = egui::Context::default();

        // Shadows bleed badly over the dark particle field.
        let mut style = egui::Style::default();
        style.visuals = egui::Visuals::dark();
        style.visuals.window_shadow = egui::Shadow::NONE;
        style.visuals.popup_shadow = egui::Shadow::NONE;
        ctx.set_style(style);

        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window.as_ref(),
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        // No depth, no msaa, no dithering; the panel paints in its own pass.
        let renderer = egui_wgpu::Renderer::new(device, output_format, None, 1, false);

        Self {
            ctx,
            state,
            renderer,
        }
    }

    /// Returns true if egui consumed the event; camera controls must then
    /// ignore it.
    pub fn on_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    pub fn begin_pass(&mut self, window: &Window) {
        let raw_input = self.state.take_egui_input(window);
        self.ctx.begin_pass(raw_input);
    }

    pub fn end_pass(&mut self, window: &Window) -> EguiFrameOutput {
        let full_output = self.ctx.end_pass();
        self.state
            .handle_platform_output(window, full_output.platform_output);

        EguiFrameOutput {
            paint_jobs: self
                .ctx
                .tessellate(full_output.shapes, full_output.pixels_per_point),
            textures_delta: full_output.textures_delta,
            pixels_per_point: full_output.pixels_per_point,
        }
    }

    /// Texture and buffer uploads; must run before the pass opens.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        output: &EguiFrameOutput,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        for (id, image_delta) in &output.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }
        self.renderer
            .update_buffers(device, queue, encoder, &output.paint_jobs, screen_descriptor);
    }

    pub fn renderer(&self) -> &egui_wgpu::Renderer {
        &self.renderer
    }

    /// Texture frees; must run after submit.
    pub fn cleanup(&mut self, output: &EguiFrameOutput) {
        for id in &output.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }
}

/// The tweak panel itself. Every control writes straight into `params`;
/// changes take effect on the same frame.
pub fn show(ctx: &egui::Context, params: &mut SimParams) {
    egui::Window::new("Particles")
        .resizable(false)
        .default_width(PANEL_WIDTH)
        .show(ctx, |ui| {
            ui.set_width(PANEL_WIDTH);

            ui.horizontal(|ui| {
                ui.label("clear color");
                ui.color_edit_button_rgb(&mut params.clear_color);
            });

            ui.add(
                egui::Slider::new(&mut params.point_size, 0.0..=1.0)
                    .step_by(0.001)
                    .text("size"),
            );
            ui.add(
                egui::Slider::new(&mut params.flow_influence, 0.0..=1.0)
                    .step_by(0.001)
                    .text("influence"),
            );
            ui.add(
                egui::Slider::new(&mut params.flow_strength, 0.0..=10.0)
                    .step_by(0.001)
                    .text("strength"),
            );
            ui.add(
                egui::Slider::new(&mut params.flow_frequency, 0.0..=1.0)
                    .step_by(0.001)
                    .text("frequency"),
            );
        });
}
