//! Window and frame loop.
//!
//! Startup is strictly ordered: the mesh loads and the grid is sized before
//! the event loop exists, then the GPU stack comes up in `resumed`. Any
//! failure there is stashed and re-raised from [`run`] after the loop exits.
//!
//! Each frame runs in a fixed order on one thread: clock, panel, camera rig
//! plus pending user input, simulation step, particle draw, overlay, panel
//! paint, present. The panel therefore always edits the parameters the same
//! frame's passes consume.

use std::sync::Arc;

use glam::Vec2;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::camera::{CameraRig, OrbitCamera};
use crate::error::{GpuError, StartupError};
use crate::gpu::compute::SimulationStage;
use crate::gpu::renderer::ParticleRenderer;
use crate::gpu::GpuContext;
use crate::grid::ParticleGrid;
use crate::mesh::{self, SurfacePoints};
use crate::overlay::OverlayPass;
use crate::panel::{self, EguiLayer};
use crate::params::{SimParams, Viewport};
use crate::time::Time;

const WINDOW_TITLE: &str = "driftfield";
const WINDOW_WIDTH: f64 = 1280.0;
const WINDOW_HEIGHT: f64 = 720.0;

const DRAG_SENSITIVITY: f32 = 0.005;
const SCROLL_SENSITIVITY: f32 = 0.3;

/// Load the model, then hand control to the event loop.
pub fn run() -> Result<(), StartupError> {
    let points = SurfacePoints::load(mesh::MODEL_PATH)?;
    let grid = ParticleGrid::new(points.len());

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(points, grid);
    event_loop.run_app(&mut app)?;

    match app.startup_error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct App {
    points: SurfacePoints,
    grid: ParticleGrid,
    scene: Option<Scene>,
    /// Setup failure captured in `resumed`, re-raised after loop exit.
    startup_error: Option<StartupError>,
}

impl App {
    fn new(points: SurfacePoints, grid: ParticleGrid) -> Self {
        Self {
            points,
            grid,
            scene: None,
            startup_error: None,
        }
    }
}

/// Everything that exists only while a window does.
struct Scene {
    window: Arc<Window>,
    gpu: GpuContext,
    sim: SimulationStage,
    renderer: ParticleRenderer,
    overlay: OverlayPass,
    egui: EguiLayer,

    viewport: Viewport,
    params: SimParams,
    time: Time,
    camera: OrbitCamera,
    rig: CameraRig,

    // Input accumulated between frames, applied after the rig update.
    dragging: bool,
    orbit_delta: Vec2,
    zoom_delta: f32,
    last_cursor: Option<Vec2>,
}

impl Scene {
    fn new(
        window: Arc<Window>,
        points: &SurfacePoints,
        grid: &ParticleGrid,
    ) -> Result<Self, GpuError> {
        let gpu = pollster::block_on(GpuContext::new(window.clone()))?;

        let sim = SimulationStage::new(&gpu.device, &gpu.queue, grid, points)?;
        let renderer = ParticleRenderer::new(
            &gpu.device,
            gpu.config.format,
            grid,
            points,
            sim.state_views(),
        );
        let overlay = OverlayPass::new(&gpu.device, gpu.config.format);
        let egui = EguiLayer::new(&gpu.device, gpu.config.format, &window);

        let scale = window.scale_factor();
        let logical = window.inner_size().to_logical::<f32>(scale);
        let viewport = Viewport::new(logical.width, logical.height, scale as f32);

        let mut params = SimParams::default();
        params.resolution = viewport.resolution();
        let camera = OrbitCamera::new(viewport.aspect());

        Ok(Self {
            window,
            gpu,
            sim,
            renderer,
            overlay,
            egui,
            viewport,
            params,
            time: Time::new(),
            camera,
            rig: CameraRig::new(),
            dragging: false,
            orbit_delta: Vec2::ZERO,
            zoom_delta: 0.0,
            last_cursor: None,
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        let scale = self.window.scale_factor();
        let logical = new_size.to_logical::<f32>(scale);
        self.viewport = Viewport::new(logical.width, logical.height, scale as f32);

        // Surface and resolution uniform share the capped backing size.
        let (width, height) = self.viewport.backing_size();
        self.gpu.resize(winit::dpi::PhysicalSize::new(width, height));

        self.params.resolution = self.viewport.resolution();
        self.camera.aspect = self.viewport.aspect();
    }

    fn frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        let (elapsed, delta) = self.time.update();
        self.params.time = elapsed;
        self.params.delta_time = delta;

        // Panel first, so edits land in this frame's uniforms.
        self.egui.begin_pass(&self.window);
        let ctx = self.egui.ctx.clone();
        panel::show(&ctx, &mut self.params);
        let egui_output = self.egui.end_pass(&self.window);

        // Rig pose first, pending user input on top.
        self.rig.update(&mut self.camera, elapsed);
        if self.orbit_delta != Vec2::ZERO {
            self.camera.orbit(self.orbit_delta.x, self.orbit_delta.y);
            self.orbit_delta = Vec2::ZERO;
        }
        if self.zoom_delta != 0.0 {
            self.camera.zoom(self.zoom_delta);
            self.zoom_delta = 0.0;
        }

        let frame = self.gpu.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        self.sim
            .step(&self.gpu.queue, &mut encoder, self.params.sim_uniforms());

        self.renderer.update_uniforms(
            &self.gpu.queue,
            self.params.render_uniforms(self.camera.view_proj()),
        );

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.params.clear_color_linear()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.gpu.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.renderer.draw(&mut pass, self.sim.current_index());
            self.overlay.draw(
                &self.gpu.queue,
                &mut pass,
                elapsed,
                self.viewport.resolution().to_array(),
            );
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gpu.config.width, self.gpu.config.height],
            // The framebuffer runs at the capped ratio, so the panel must
            // paint against the same one.
            pixels_per_point: egui_output
                .pixels_per_point
                .min(Viewport::MAX_PIXEL_RATIO),
        };
        self.egui.prepare(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &egui_output,
            &screen_descriptor,
        );

        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Panel Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                })
                .forget_lifetime();

            self.egui.renderer().render(
                &mut pass,
                &egui_output.paint_jobs,
                &screen_descriptor,
            );
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        frame.present();

        self.egui.cleanup(&egui_output);

        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.scene.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(LogicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                self.startup_error = Some(err.into());
                event_loop.exit();
                return;
            }
        };

        match Scene::new(window, &self.points, &self.grid) {
            Ok(scene) => {
                scene.window.request_redraw();
                self.scene = Some(scene);
            }
            Err(err) => {
                self.startup_error = Some(err.into());
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(scene) = self.scene.as_mut() else {
            return;
        };

        let consumed = scene.egui.on_window_event(&scene.window, &event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(new_size) => scene.resize(new_size),
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                scene.dragging = state == ElementState::Pressed && !consumed;
                if !scene.dragging {
                    scene.last_cursor = None;
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let cursor = Vec2::new(position.x as f32, position.y as f32);
                if scene.dragging && !consumed {
                    if let Some(last) = scene.last_cursor {
                        let delta = cursor - last;
                        // Screen y grows downward; dragging up pitches up.
                        scene.orbit_delta += Vec2::new(delta.x, -delta.y) * DRAG_SENSITIVITY;
                    }
                    scene.last_cursor = Some(cursor);
                } else {
                    scene.last_cursor = None;
                }
            }
            WindowEvent::MouseWheel { delta, .. } if !consumed => {
                let amount = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 50.0,
                };
                scene.zoom_delta += amount * SCROLL_SENSITIVITY;
            }
            WindowEvent::RedrawRequested => {
                match scene.frame() {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                        let size = scene.window.inner_size();
                        scene.resize(size);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        eprintln!("Out of GPU memory, exiting");
                        event_loop.exit();
                    }
                    Err(err) => eprintln!("Surface error: {err:?}"),
                }
                scene.window.request_redraw();
            }
            _ => {}
        }
    }
}
