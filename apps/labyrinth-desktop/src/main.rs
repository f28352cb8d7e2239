use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use labyrinth_input::{Action, Button, InputState};
use labyrinth_kernel::{FrameSimulator, HudSnapshot, Screen, Tuning};
use labyrinth_maze::{MazeCompiler, default_maze};
use labyrinth_render::{MeshHandle, SceneGeometry, prepare_scene, submit_frame};
use labyrinth_render_wgpu::{FirstPersonCamera, WgpuRenderer};
use labyrinth_tools::SceneInspector;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "labyrinth-desktop", about = "Labyrinth maze game")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML tuning file overriding the built-in constants
    #[arg(long)]
    tuning: Option<PathBuf>,
}

/// Application state.
struct AppState {
    sim: FrameSimulator,
    input: InputState,
    camera: FirstPersonCamera,
    geometry: SceneGeometry,
    mesh: Option<MeshHandle>,
    show_inspector: bool,
    mouse_captured: bool,
    last_frame: Instant,
}

impl AppState {
    fn new(tuning: Tuning) -> Self {
        let geometry = SceneGeometry::new();
        let maze = MazeCompiler::new(tuning.maze)
            .with_mesh_layout(geometry.layout)
            .compile(&default_maze());
        let sim = FrameSimulator::new(maze, tuning.game);
        let mut camera = FirstPersonCamera::default();
        camera.follow(sim.player());

        Self {
            sim,
            input: InputState::new(),
            camera,
            geometry,
            mesh: None,
            show_inspector: false,
            mouse_captured: false,
            last_frame: Instant::now(),
        }
    }

    fn update(&mut self, dt: f32) {
        let frame = self.input.take_frame();
        if self.sim.tick(&frame, dt) {
            for event in self.sim.drain_events() {
                tracing::debug!(tick = self.sim.tick_count(), ?event, "scene event");
            }
        }
        self.camera.follow(self.sim.player());
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        let button = match key {
            KeyCode::KeyW | KeyCode::ArrowUp => Some(Button::Forward),
            KeyCode::KeyS | KeyCode::ArrowDown => Some(Button::Backward),
            KeyCode::KeyA | KeyCode::ArrowLeft => Some(Button::Left),
            KeyCode::KeyD | KeyCode::ArrowRight => Some(Button::Right),
            KeyCode::ShiftLeft | KeyCode::ShiftRight => Some(Button::Sprint),
            _ => None,
        };
        if let Some(button) = button {
            if pressed {
                self.input.press(button);
            } else {
                self.input.release(button);
            }
            return;
        }

        if !pressed {
            return;
        }

        match key {
            KeyCode::KeyF => self.sim.apply(Action::ToggleFlashlight),
            KeyCode::KeyR => self.sim.apply(Action::ResetGame),
            KeyCode::Enter | KeyCode::Space => match self.sim.screen() {
                Screen::Start => self.sim.apply(Action::DismissStartScreen),
                Screen::Controls => self.sim.apply(Action::DismissControlsScreen),
                Screen::Playing => {}
            },
            KeyCode::Escape if self.sim.screen() == Screen::Controls => {
                self.sim.apply(Action::BackToStart);
            }
            KeyCode::KeyO => {
                tracing::info!("opening all doors");
                self.sim.request_open_all();
            }
            KeyCode::F1 => {
                self.show_inspector = !self.show_inspector;
            }
            _ => {}
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        let hud = self.sim.hud();
        let mut actions = Vec::new();

        match hud.screen {
            Screen::Start => draw_start_screen(ctx, &mut actions),
            Screen::Controls => draw_controls_screen(ctx, &mut actions),
            Screen::Playing => draw_hud(ctx, &hud, &mut actions),
        }

        if self.show_inspector {
            let summary = SceneInspector::summary(&self.sim);
            let keys = SceneInspector::keys(&self.sim);
            egui::SidePanel::left("inspector")
                .default_width(280.0)
                .show(ctx, |ui| {
                    ui.heading("Labyrinth");
                    ui.separator();
                    ui.label(format!("Tick: {}  Screen: {:?}", summary.tick, summary.screen));
                    ui.label(format!(
                        "Instances: {} ({} hidden)",
                        summary.instances, summary.hidden_instances
                    ));
                    ui.label(format!("Active walls: {}", summary.active_walls));
                    ui.label(format!(
                        "Doors: {} rising, {} risen of {}",
                        summary.doors_rising, summary.doors_risen, summary.doors_total
                    ));
                    ui.label(format!(
                        "Camera: ({:.1}, {:.1}, {:.1})",
                        self.camera.position.x, self.camera.position.y, self.camera.position.z
                    ));
                    ui.label(format!(
                        "Hostile distance: {:.1}",
                        SceneInspector::hostile_distance(&self.sim)
                    ));
                    ui.separator();
                    ui.heading("Keys");
                    for key in &keys {
                        ui.label(key.to_string());
                    }
                    ui.separator();
                    ui.small("F1: Toggle Inspector | O: Open all doors");
                });
        }

        for action in actions {
            self.sim.apply(action);
        }
    }
}

fn draw_start_screen(ctx: &EguiContext, actions: &mut Vec<Action>) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() * 0.3);
            ui.heading("LABYRINTH");
            ui.label("Find the keys. Open the doors. Keep away from the thing that follows you.");
            ui.add_space(24.0);
            if ui.button("Play").clicked() {
                actions.push(Action::DismissStartScreen);
            }
            if ui.button("Controls").clicked() {
                actions.push(Action::ShowControls);
            }
        });
    });
}

fn draw_controls_screen(ctx: &EguiContext, actions: &mut Vec<Action>) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() * 0.25);
            ui.heading("Controls");
            ui.add_space(12.0);
            for line in [
                "WASD / arrows: move",
                "Shift: sprint",
                "Right mouse + drag: look",
                "F: flashlight",
                "R: restart after game over",
                "F1: inspector",
            ] {
                ui.label(line);
            }
            ui.add_space(24.0);
            ui.horizontal(|ui| {
                if ui.button("Back").clicked() {
                    actions.push(Action::BackToStart);
                }
                if ui.button("Play").clicked() {
                    actions.push(Action::DismissControlsScreen);
                }
            });
        });
    });
}

fn draw_hud(ctx: &EguiContext, hud: &HudSnapshot, actions: &mut Vec<Action>) {
    let screen = ctx.screen_rect();
    let tint = if hud.damage_flash > 0.0 {
        Some(120)
    } else if hud.overlay_alpha > 0.0 {
        Some((hud.overlay_alpha * 80.0) as u8)
    } else {
        None
    };
    if let Some(alpha) = tint {
        ctx.layer_painter(egui::LayerId::new(
            egui::Order::Background,
            egui::Id::new("damage_overlay"),
        ))
        .rect_filled(screen, 0.0, egui::Color32::from_rgba_unmultiplied(200, 0, 0, alpha));
    }

    egui::Area::new(egui::Id::new("health"))
        .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(16.0, -16.0))
        .show(ctx, |ui| {
            let fraction = hud.health.max(0) as f32 / hud.max_health.max(1) as f32;
            ui.add(
                egui::ProgressBar::new(fraction)
                    .desired_width(220.0)
                    .fill(egui::Color32::from_rgb(180, 30, 30))
                    .text(format!("Health {}", hud.health)),
            );
            ui.label(format!(
                "Keys {}/{}   Flashlight {}",
                hud.keys_collected,
                hud.keys_total,
                if hud.flashlight { "on" } else { "off" }
            ));
        });

    if hud.unlock_message_active && !hud.game_over {
        egui::Area::new(egui::Id::new("unlock_message"))
            .anchor(egui::Align2::CENTER_TOP, egui::vec2(0.0, 48.0))
            .show(ctx, |ui| {
                ui.heading("A door has been unlocked");
            });
    }

    if hud.game_over {
        egui::Window::new("Game Over")
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("You were caught.");
                if ui.button("Restart (R)").clicked() {
                    actions.push(Action::ResetGame);
                }
            });
    }
}

struct GpuApp {
    state: AppState,
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    device: Option<wgpu::Device>,
    queue: Option<wgpu::Queue>,
    config: Option<wgpu::SurfaceConfiguration>,
    renderer: Option<WgpuRenderer>,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
}

impl GpuApp {
    fn new(tuning: Tuning) -> Self {
        Self {
            state: AppState::new(tuning),
            window: None,
            surface: None,
            device: None,
            queue: None,
            config: None,
            renderer: None,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
        }
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("Labyrinth")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no suitable GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("labyrinth_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        self.state.camera.set_viewport(config.width, config.height);
        let mut renderer = WgpuRenderer::new(&device, surface_format, config.width, config.height);
        self.state.mesh = Some(prepare_scene(
            &mut renderer.backend(&device, &queue),
            &self.state.geometry,
        ));

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        self.window = Some(window);
        self.surface = Some(surface);
        self.device = Some(device);
        self.queue = Some(queue);
        self.config = Some(config);
        self.renderer = Some(renderer);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);
        Ok(())
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        let dt = (now - self.state.last_frame).as_secs_f32().min(0.1);
        self.state.last_frame = now;
        self.state.update(dt);

        let (
            Some(window),
            Some(surface),
            Some(device),
            Some(queue),
            Some(config),
            Some(renderer),
            Some(egui_winit),
            Some(egui_renderer),
        ) = (
            &self.window,
            &self.surface,
            &self.device,
            &self.queue,
            &self.config,
            &mut self.renderer,
            &mut self.egui_winit,
            &mut self.egui_renderer,
        )
        else {
            return;
        };

        let output = match surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                surface.configure(device, config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        if let Some(mesh) = self.state.mesh {
            submit_frame(
                &mut renderer.backend(device, queue),
                mesh,
                &self.state.geometry.layout,
                self.state.sim.instances(),
                self.state.sim.scene().groups(),
            );
        }
        renderer.render(
            device,
            queue,
            &view,
            &self.state.camera,
            self.state.sim.player().flashlight,
        );

        let raw_input = egui_winit.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.state.draw_ui(ctx);
        });
        egui_winit.handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [config.width, config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            egui_renderer.update_texture(device, queue, *id, image_delta);
        }
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("egui_encoder"),
        });
        egui_renderer.update_buffers(device, queue, &mut encoder, &paint_jobs, &screen_descriptor);
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            egui_renderer.free_texture(id);
        }

        output.present();
        window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init_gpu(event_loop) {
            tracing::error!("failed to initialise graphics: {e:#}");
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(egui_winit), Some(window)) = (&mut self.egui_winit, &self.window) {
            let response = egui_winit.on_window_event(window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let (Some(surface), Some(device), Some(config)) =
                    (&self.surface, &self.device, &mut self.config)
                {
                    config.width = new_size.width.max(1);
                    config.height = new_size.height.max(1);
                    surface.configure(device, config);
                    self.state.camera.set_viewport(config.width, config.height);
                    if let Some(renderer) = &mut self.renderer {
                        renderer.resize(device, config.width, config.height);
                    }
                }
            }
            WindowEvent::Focused(false) => {
                self.state.input.clear();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.state
                    .handle_key(key, key_state == ElementState::Pressed);
            }
            WindowEvent::MouseInput {
                button: MouseButton::Right,
                state: btn_state,
                ..
            } => {
                self.state.mouse_captured = btn_state == ElementState::Pressed;
                self.state.input.set_look_enabled(self.state.mouse_captured);
                if let Some(window) = &self.window {
                    window.set_cursor_visible(!self.state.mouse_captured);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.state.input.add_look(delta.0 as f32, delta.1 as f32);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn load_tuning(path: Option<PathBuf>) -> Result<Tuning> {
    let Some(path) = path else {
        return Ok(Tuning::default());
    };
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("reading tuning file {}", path.display()))?;
    let tuning = Tuning::from_yaml_str(&text)
        .with_context(|| format!("parsing tuning file {}", path.display()))?;
    tracing::info!(path = %path.display(), "tuning loaded");
    Ok(tuning)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("labyrinth-desktop starting");
    let tuning = load_tuning(cli.tuning)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(tuning);
    event_loop.run_app(&mut app)?;

    Ok(())
}
