// Re-export all public modules so they can be used from main.rs
pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod registry;
pub mod setup;
pub mod store;
pub mod ui;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

#[cfg(target_arch = "wasm32")]
pub use web::start;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue};
    use web_sys::{Event, HtmlCanvasElement, KeyboardEvent, MouseEvent, Window};

    use crate::app::{ui_wants_pointer, App};
    use crate::config::DemoConfig;
    use crate::controller::input::wasm::{
        keyboard_to_egui, mouse_wheel_to_input, pointer_down_to_input, pointer_move_to_input, pointer_up_to_input,
    };
    use crate::controller::{InputEvent, InputState};
    use crate::error::SetupError;
    use crate::logging;
    use crate::store::{KeyValueStore, LocalStorageStore, MemoryStore};
    use crate::view::render::physical_size;
    use crate::view::{GpuContext, GpuRenderer};

    #[wasm_bindgen(start)]
    pub async fn start() -> Result<(), JsValue> {
        logging::init();
        setup_app().await.map_err(|e| {
            tracing::error!(error = %e, "startup failed");
            JsValue::from_str(&e.to_string())
        })
    }

    /// Displayed canvas size in device pixels, ratio capped.
    fn canvas_display_size(window: &Window, canvas: &HtmlCanvasElement, max_pixel_ratio: f64) -> (u32, u32) {
        physical_size(
            canvas.client_width() as f64,
            canvas.client_height() as f64,
            window.device_pixel_ratio(),
            max_pixel_ratio,
        )
    }

    fn open_store(window: &Window) -> Box<dyn KeyValueStore> {
        match LocalStorageStore::new(window) {
            Ok(store) => Box::new(store),
            Err(e) => {
                tracing::warn!(error = %e, "localStorage unavailable, panel state will not persist");
                Box::new(MemoryStore::new())
            }
        }
    }

    /// Main application setup for WASM
    async fn setup_app() -> Result<(), SetupError> {
        let config = DemoConfig::default();
        let window = web_sys::window().ok_or(SetupError::NoWindow)?;
        let document = window.document().ok_or(SetupError::NoDocument)?;
        let canvas_id = config.renderer.canvas_id.clone();
        let canvas = document
            .get_element_by_id(&canvas_id)
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
            .ok_or(SetupError::MissingCanvas(canvas_id))?;

        let max_ratio = config.renderer.max_pixel_ratio;
        let (width, height) = canvas_display_size(&window, &canvas, max_ratio);
        canvas.set_width(width.max(1));
        canvas.set_height(height.max(1));

        let gpu = GpuContext::new(&canvas, width, height).await?;
        let renderer = GpuRenderer::new(gpu, &config.renderer, {
            let window = window.clone();
            let canvas = canvas.clone();
            move || canvas_display_size(&window, &canvas, max_ratio)
        });
        let mut app = App::new(&config, renderer, open_store(&window));

        let input_state = Rc::new(RefCell::new(InputState::new()));
        let egui_events: Rc<RefCell<Vec<egui::Event>>> = Rc::new(RefCell::new(Vec::new()));
        if let Err(e) = setup_input_listeners(&window, &canvas, app.egui_ctx(), input_state.clone(), egui_events.clone()) {
            tracing::warn!(error = ?e, "could not register input listeners");
        }

        // Continuous redraw using requestAnimationFrame
        let f = RcCellCallback::new(window.clone(), {
            let window = window.clone();
            move || {
                let now_seconds = window.performance().map(|p| p.now()).unwrap_or(0.0) / 1000.0;
                let ratio = window.device_pixel_ratio().min(max_ratio) as f32;

                let mut raw_input = egui::RawInput::default();
                raw_input.screen_rect = Some(egui::Rect::from_min_size(
                    egui::Pos2::ZERO,
                    egui::vec2(canvas.client_width() as f32, canvas.client_height() as f32),
                ));
                if let Some(viewport) = raw_input.viewports.get_mut(&raw_input.viewport_id) {
                    viewport.native_pixels_per_point = Some(ratio);
                }
                raw_input.events = std::mem::take(&mut *egui_events.borrow_mut());

                let (stats, _) = app.frame(&mut input_state.borrow_mut(), raw_input, now_seconds);
                if stats.resized {
                    tracing::debug!(frame = stats.frame, "canvas resized");
                }
            }
        });
        f.start();

        tracing::info!("slopebox running");
        Ok(())
    }

    /// Canvas-relative position in CSS pixels.
    fn canvas_pos(canvas: &HtmlCanvasElement, e: &MouseEvent) -> egui::Pos2 {
        let rect = canvas.get_bounding_client_rect();
        egui::pos2(e.client_x() as f32 - rect.left() as f32, e.client_y() as f32 - rect.top() as f32)
    }

    fn egui_button(e: &MouseEvent) -> egui::PointerButton {
        match e.button() {
            1 => egui::PointerButton::Middle,
            2 => egui::PointerButton::Secondary,
            _ => egui::PointerButton::Primary,
        }
    }

    /// Pointer and wheel listeners feeding both the orbit controls and egui; keys go to egui only
    fn setup_input_listeners(
        window: &Window,
        canvas: &HtmlCanvasElement,
        egui_ctx: &egui::Context,
        input_state: Rc<RefCell<InputState>>,
        egui_events: Rc<RefCell<Vec<egui::Event>>>,
    ) -> Result<(), JsValue> {
        // Mouse down on the canvas starts a drag unless the panel is under the pointer
        {
            let input_state = input_state.clone();
            let egui_events = egui_events.clone();
            let egui_ctx = egui_ctx.clone();
            let canvas_for_pos = canvas.clone();
            let mousedown = Closure::wrap(Box::new(move |e: MouseEvent| {
                let pos = canvas_pos(&canvas_for_pos, &e);
                egui_events.borrow_mut().push(egui::Event::PointerButton {
                    pos,
                    button: egui_button(&e),
                    pressed: true,
                    modifiers: egui::Modifiers::default(),
                });
                let captured = ui_wants_pointer(&egui_ctx);
                input_state.borrow_mut().process_event(&pointer_down_to_input(&e), captured);
                e.prevent_default();
            }) as Box<dyn FnMut(MouseEvent)>);
            canvas.add_event_listener_with_callback("mousedown", mousedown.as_ref().unchecked_ref())?;
            mousedown.forget();
        }

        // Mouse up anywhere ends the drag
        {
            let input_state = input_state.clone();
            let egui_events = egui_events.clone();
            let canvas_for_pos = canvas.clone();
            let mouseup = Closure::wrap(Box::new(move |e: MouseEvent| {
                egui_events.borrow_mut().push(egui::Event::PointerButton {
                    pos: canvas_pos(&canvas_for_pos, &e),
                    button: egui_button(&e),
                    pressed: false,
                    modifiers: egui::Modifiers::default(),
                });
                input_state.borrow_mut().process_event(&pointer_up_to_input(&e), false);
            }) as Box<dyn FnMut(MouseEvent)>);
            window.add_event_listener_with_callback("mouseup", mouseup.as_ref().unchecked_ref())?;
            mouseup.forget();
        }

        // Mouse move anywhere, so drags continue past the canvas edge
        {
            let input_state = input_state.clone();
            let egui_events = egui_events.clone();
            let canvas_for_pos = canvas.clone();
            let mousemove = Closure::wrap(Box::new(move |e: MouseEvent| {
                egui_events.borrow_mut().push(egui::Event::PointerMoved(canvas_pos(&canvas_for_pos, &e)));
                input_state.borrow_mut().process_event(&pointer_move_to_input(&e), false);
            }) as Box<dyn FnMut(MouseEvent)>);
            window.add_event_listener_with_callback("mousemove", mousemove.as_ref().unchecked_ref())?;
            mousemove.forget();
        }

        // Wheel zoom
        {
            let input_state = input_state.clone();
            let egui_ctx = egui_ctx.clone();
            let wheel = Closure::wrap(Box::new(move |e: Event| {
                if let Some(event) = mouse_wheel_to_input(&e) {
                    let captured = ui_wants_pointer(&egui_ctx);
                    input_state.borrow_mut().process_event(&event, captured);
                    if !captured {
                        e.prevent_default();
                    }
                }
            }) as Box<dyn FnMut(Event)>);
            canvas.add_event_listener_with_callback("wheel", wheel.as_ref().unchecked_ref())?;
            wheel.forget();
        }

        // Focus loss - drop any drag in progress
        {
            let input_state = input_state.clone();
            let blur = Closure::wrap(Box::new(move |_e: Event| {
                input_state.borrow_mut().process_event(&InputEvent::FocusLost, false);
            }) as Box<dyn FnMut(Event)>);
            window.add_event_listener_with_callback("blur", blur.as_ref().unchecked_ref())?;
            blur.forget();
        }

        // Keyboard, so the panel's value fields can be typed into
        for (name, pressed) in [("keydown", true), ("keyup", false)] {
            let egui_events = egui_events.clone();
            let egui_ctx = egui_ctx.clone();
            let listener = Closure::wrap(Box::new(move |e: KeyboardEvent| {
                let events = keyboard_to_egui(&e, pressed);
                if events.is_empty() {
                    return;
                }
                egui_events.borrow_mut().extend(events);
                if egui_ctx.wants_keyboard_input() {
                    e.prevent_default();
                }
            }) as Box<dyn FnMut(KeyboardEvent)>);
            window.add_event_listener_with_callback(name, listener.as_ref().unchecked_ref())?;
            listener.forget();
        }

        // Context menu prevention
        {
            let contextmenu = Closure::wrap(Box::new(move |e: MouseEvent| {
                e.prevent_default();
            }) as Box<dyn FnMut(MouseEvent)>);
            canvas.add_event_listener_with_callback("contextmenu", contextmenu.as_ref().unchecked_ref())?;
            contextmenu.forget();
        }

        Ok(())
    }

    /// Re-schedules itself with `requestAnimationFrame` after every call.
    struct RcCellCallback {
        inner: Rc<RefCell<Box<dyn FnMut()>>>,
        window: Window,
    }

    impl RcCellCallback {
        fn new(window: Window, f: impl FnMut() + 'static) -> Self {
            Self { inner: Rc::new(RefCell::new(Box::new(f))), window }
        }

        fn start(self) {
            let inner = self.inner.clone();
            let window = self.window.clone();

            let callback = Rc::new(RefCell::new(None::<Closure<dyn FnMut()>>));
            let callback_clone = callback.clone();

            *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
                inner.borrow_mut().as_mut()();

                // Recursively schedule next frame
                if let Some(cb) = callback_clone.borrow().as_ref() {
                    if let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                        tracing::error!(error = ?e, "requestAnimationFrame failed, loop stopped");
                    }
                }
            }) as Box<dyn FnMut()>));

            if let Some(cb) = callback.borrow().as_ref() {
                if let Err(e) = self.window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    tracing::error!(error = ?e, "requestAnimationFrame failed, loop not started");
                }
            }

            // Leak the closure to keep it alive
            std::mem::forget(callback);
        }
    }
}
