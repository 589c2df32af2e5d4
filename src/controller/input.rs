/// Platform-agnostic pointer input for the orbit controls
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { button: MouseButton, x: f32, y: f32 },
    PointerUp { button: MouseButton },
    PointerMove { x: f32, y: f32 },
    Wheel { delta_y: f32 },
    FocusLost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub fn from_web_button(button: i16) -> Self {
        match button {
            0 => MouseButton::Left,
            1 => MouseButton::Middle,
            2 => MouseButton::Right,
            _ => MouseButton::Left,
        }
    }
}

/// Accumulated drag and wheel input between two frames
#[derive(Debug, Default)]
pub struct InputState {
    pub dragging: bool,
    pub last_pointer: Option<(f32, f32)>,
    pub rotate_delta: (f32, f32),
    pub wheel_delta: f32,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one event. `ui_captured` is true when the debug panel owns the pointer.
    pub fn process_event(&mut self, event: &InputEvent, ui_captured: bool) {
        match event {
            InputEvent::PointerDown { button: MouseButton::Left, x, y } => {
                if !ui_captured {
                    self.dragging = true;
                    self.last_pointer = Some((*x, *y));
                }
            }
            InputEvent::PointerDown { .. } => {}
            InputEvent::PointerUp { button: MouseButton::Left } | InputEvent::FocusLost => {
                self.dragging = false;
                self.last_pointer = None;
            }
            InputEvent::PointerUp { .. } => {}
            InputEvent::PointerMove { x, y } => {
                if self.dragging {
                    if let Some((lx, ly)) = self.last_pointer {
                        self.rotate_delta.0 += x - lx;
                        self.rotate_delta.1 += y - ly;
                    }
                    self.last_pointer = Some((*x, *y));
                }
            }
            InputEvent::Wheel { delta_y } => {
                if !ui_captured {
                    self.wheel_delta += delta_y;
                }
            }
        }
    }

    /// Take the accumulated rotation (pixels) and wheel delta.
    pub fn consume(&mut self) -> ((f32, f32), f32) {
        let rotate = std::mem::take(&mut self.rotate_delta);
        let wheel = std::mem::take(&mut self.wheel_delta);
        (rotate, wheel)
    }
}

/// egui events for one browser key event. `key` is the DOM `KeyboardEvent.key` value.
///
/// Printable keys also produce `Text` on press, unless a command modifier is held.
pub fn egui_key_events(key: &str, pressed: bool, repeat: bool, modifiers: egui::Modifiers) -> Vec<egui::Event> {
    let mut events = Vec::new();
    if let Some(key) = egui::Key::from_name(key) {
        events.push(egui::Event::Key { key, physical_key: None, pressed, repeat, modifiers });
    }
    if pressed && !modifiers.ctrl && !modifiers.mac_cmd && key.chars().count() == 1 {
        events.push(egui::Event::Text(key.to_string()));
    }
    events
}

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use super::*;
    use web_sys::{Event, KeyboardEvent, MouseEvent};

    pub fn keyboard_to_egui(e: &KeyboardEvent, pressed: bool) -> Vec<egui::Event> {
        let modifiers = egui::Modifiers {
            alt: e.alt_key(),
            ctrl: e.ctrl_key(),
            shift: e.shift_key(),
            mac_cmd: e.meta_key(),
            command: e.ctrl_key() || e.meta_key(),
        };
        egui_key_events(&e.key(), pressed, e.repeat(), modifiers)
    }

    pub fn pointer_down_to_input(e: &MouseEvent) -> InputEvent {
        InputEvent::PointerDown {
            button: MouseButton::from_web_button(e.button()),
            x: e.client_x() as f32,
            y: e.client_y() as f32,
        }
    }

    pub fn pointer_up_to_input(e: &MouseEvent) -> InputEvent {
        InputEvent::PointerUp { button: MouseButton::from_web_button(e.button()) }
    }

    pub fn pointer_move_to_input(e: &MouseEvent) -> InputEvent {
        InputEvent::PointerMove { x: e.client_x() as f32, y: e.client_y() as f32 }
    }

    pub fn mouse_wheel_to_input(e: &Event) -> Option<InputEvent> {
        let js_val = wasm_bindgen::JsValue::from(e.clone());
        if let Ok(delta_y) = js_sys::Reflect::get(&js_val, &wasm_bindgen::JsValue::from_str("deltaY")) {
            if let Some(dy) = delta_y.as_f64() {
                return Some(InputEvent::Wheel { delta_y: dy as f32 });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_accumulates_until_consumed() {
        let mut input = InputState::new();
        input.process_event(&InputEvent::PointerDown { button: MouseButton::Left, x: 10.0, y: 10.0 }, false);
        input.process_event(&InputEvent::PointerMove { x: 15.0, y: 8.0 }, false);
        input.process_event(&InputEvent::PointerMove { x: 20.0, y: 8.0 }, false);

        assert_eq!(input.consume(), ((10.0, -2.0), 0.0));
        assert_eq!(input.consume(), ((0.0, 0.0), 0.0));
    }

    #[test]
    fn moves_without_drag_are_ignored() {
        let mut input = InputState::new();
        input.process_event(&InputEvent::PointerMove { x: 15.0, y: 8.0 }, false);
        input.process_event(&InputEvent::PointerDown { button: MouseButton::Right, x: 0.0, y: 0.0 }, false);
        input.process_event(&InputEvent::PointerMove { x: 25.0, y: 8.0 }, false);
        assert_eq!(input.consume().0, (0.0, 0.0));
    }

    #[test]
    fn panel_owned_pointer_does_not_start_drag() {
        let mut input = InputState::new();
        input.process_event(&InputEvent::PointerDown { button: MouseButton::Left, x: 0.0, y: 0.0 }, true);
        input.process_event(&InputEvent::PointerMove { x: 5.0, y: 5.0 }, true);
        input.process_event(&InputEvent::Wheel { delta_y: 100.0 }, true);
        assert_eq!(input.consume(), ((0.0, 0.0), 0.0));
    }

    #[test]
    fn printable_key_press_yields_key_and_text() {
        let events = egui_key_events("5", true, false, egui::Modifiers::default());
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], egui::Event::Key { key: egui::Key::Num5, pressed: true, .. }));
        assert_eq!(events[1], egui::Event::Text("5".to_string()));

        // "." has no text on release
        let events = egui_key_events(".", false, false, egui::Modifiers::default());
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], egui::Event::Key { key: egui::Key::Period, pressed: false, .. }));
    }

    #[test]
    fn editing_keys_carry_no_text() {
        for name in ["Backspace", "Enter", "ArrowLeft"] {
            let events = egui_key_events(name, true, false, egui::Modifiers::default());
            assert_eq!(events.len(), 1, "{name}");
            assert!(matches!(events[0], egui::Event::Key { pressed: true, .. }));
        }
    }

    #[test]
    fn command_shortcuts_are_not_typed() {
        let modifiers = egui::Modifiers { ctrl: true, command: true, ..Default::default() };
        let events = egui_key_events("a", true, false, modifiers);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], egui::Event::Key { key: egui::Key::A, .. }));
    }

    #[test]
    fn focus_loss_ends_drag() {
        let mut input = InputState::new();
        input.process_event(&InputEvent::PointerDown { button: MouseButton::Left, x: 0.0, y: 0.0 }, false);
        input.process_event(&InputEvent::FocusLost, false);
        input.process_event(&InputEvent::PointerMove { x: 5.0, y: 5.0 }, false);
        assert!(!input.dragging);
        assert_eq!(input.consume().0, (0.0, 0.0));
    }
}
