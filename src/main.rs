use std::sync::Arc;
use std::time::Instant;

use winit::{
    event::*,
    event_loop::EventLoop,
    window::Window,
};

// Import from the library crate
use slopebox::{
    app::{self, App},
    config::DemoConfig,
    controller::{InputEvent, InputState, MouseButton},
    error::SetupError,
    logging,
    store::FileStore,
    view::{gpu_init, GpuContext, GpuRenderer},
};

/// Pixels per wheel "line", matching what browsers report in `deltaY`.
const LINE_HEIGHT: f32 = 100.0;

struct NativeHost {
    window: Arc<Window>,
    app: App<GpuRenderer>,
    egui_state: egui_winit::State,
    input: InputState,
    /// Last cursor position in logical pixels.
    cursor: (f32, f32),
    started: Instant,
}

impl NativeHost {
    fn new(window: Arc<Window>, config: &DemoConfig) -> Result<Self, SetupError> {
        let size = window.inner_size();
        let instance = gpu_init::create_instance();
        let surface = instance.create_surface(window.clone())?;
        let gpu = pollster::block_on(GpuContext::from_surface(&instance, surface, size.width, size.height))?;

        let renderer = GpuRenderer::new(gpu, &config.renderer, {
            let window = window.clone();
            move || {
                let size = window.inner_size();
                (size.width, size.height)
            }
        });
        let app = App::new(config, renderer, Box::new(FileStore::from_env()));
        let egui_state = egui_winit::State::new(
            app.egui_ctx().clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        Ok(Self {
            window,
            app,
            egui_state,
            input: InputState::new(),
            cursor: (0.0, 0.0),
            started: Instant::now(),
        })
    }

    /// Returns false when egui consumed the event.
    fn input(&mut self, event: &WindowEvent) -> bool {
        let consumed = self.egui_state.on_window_event(self.window.as_ref(), event).consumed;
        let ui_captured = consumed || app::ui_wants_pointer(self.app.egui_ctx());

        let scale = self.window.scale_factor();
        let input_event = match event {
            WindowEvent::CursorMoved { position, .. } => {
                let logical = position.to_logical::<f32>(scale);
                self.cursor = (logical.x, logical.y);
                // moves are never captured, so a drag that crosses the panel keeps going
                Some((InputEvent::PointerMove { x: logical.x, y: logical.y }, false))
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    winit::event::MouseButton::Right => MouseButton::Right,
                    winit::event::MouseButton::Middle => MouseButton::Middle,
                    _ => MouseButton::Left,
                };
                let (x, y) = self.cursor;
                match state {
                    ElementState::Pressed => Some((InputEvent::PointerDown { button, x, y }, ui_captured)),
                    ElementState::Released => Some((InputEvent::PointerUp { button }, false)),
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                // winit reports scroll-up as positive, browsers the other way round
                let delta_y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y * LINE_HEIGHT,
                    MouseScrollDelta::PixelDelta(p) => -p.to_logical::<f32>(scale).y,
                };
                Some((InputEvent::Wheel { delta_y }, ui_captured))
            }
            WindowEvent::Focused(false) | WindowEvent::CursorLeft { .. } => Some((InputEvent::FocusLost, false)),
            _ => None,
        };

        if let Some((input_event, captured)) = input_event {
            self.input.process_event(&input_event, captured);
        }
        !consumed
    }

    fn redraw(&mut self) {
        let raw_input = self.egui_state.take_egui_input(&self.window);
        let now_seconds = self.started.elapsed().as_secs_f64();
        let (stats, platform_output) = self.app.frame(&mut self.input, raw_input, now_seconds);
        self.egui_state.handle_platform_output(&self.window, platform_output);
        if stats.resized {
            tracing::debug!(frame = stats.frame, "window resized");
        }
    }
}

#[allow(deprecated)]
fn run() -> Result<(), SetupError> {
    let config = DemoConfig::from_env()?;

    let event_loop = EventLoop::new().map_err(|e| SetupError::Window(e.to_string()))?;
    let window_attributes = Window::default_attributes()
        .with_title("slopebox")
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
    let window = event_loop
        .create_window(window_attributes)
        .map_err(|e| SetupError::Window(e.to_string()))?;
    let window = Arc::new(window);

    let mut host = NativeHost::new(window, &config)?;
    tracing::info!("slopebox running");

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { ref event, window_id } if window_id == host.window.id() => {
                // resize is picked up by the frame loop through the display size
                if host.input(event) || matches!(event, WindowEvent::RedrawRequested | WindowEvent::CloseRequested) {
                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::RedrawRequested => host.redraw(),
                        _ => {}
                    }
                }
            }
            Event::AboutToWait => {
                host.window.request_redraw();
            }
            _ => {}
        })
        .map_err(|e| SetupError::Window(e.to_string()))
}

fn main() {
    logging::init();

    if let Err(e) = run() {
        tracing::error!(error = %e, "slopebox failed");
        std::process::exit(1);
    }
}
