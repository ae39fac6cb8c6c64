use std::collections::HashSet;

use super::frame::InputFrame;
use super::types::{
    InputEvent,
    Key,
    KeyState,
    Modifiers,
    MouseButton,
    MouseButtonState,
    PointerButtonEvent,
    PointerMoveEvent,
};

/// Current input state for the window.
///
/// Holds "is down" information and the pointer position. Per-frame
/// transitions are recorded into an `InputFrame`.
#[derive(Debug, Default)]
pub struct InputState {
    pub modifiers: Modifiers,

    pub focused: bool,

    /// Pointer position in logical pixels.
    pub pointer_pos: Option<(f32, f32)>,

    pub keys_down: HashSet<Key>,

    pub buttons_down: HashSet<MouseButton>,
}

impl InputState {
    /// Applies an event to the current state and writes deltas to `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match &ev {
            InputEvent::ModifiersChanged(m) => {
                self.modifiers = *m;
            }

            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // Releases are not delivered to unfocused windows.
                    self.keys_down.clear();
                    self.buttons_down.clear();
                }
            }

            InputEvent::PointerMoved(PointerMoveEvent { x, y }) => {
                if let Some((px, py)) = self.pointer_pos {
                    frame.pointer_delta.0 += x - px;
                    frame.pointer_delta.1 += y - py;
                }
                self.pointer_pos = Some((*x, *y));
            }

            InputEvent::PointerLeft => {
                self.pointer_pos = None;
            }

            InputEvent::Key { key, state, modifiers, .. } => {
                self.modifiers = *modifiers;

                match state {
                    KeyState::Pressed => {
                        if self.keys_down.insert(*key) {
                            frame.keys_pressed.insert(*key);
                        }
                    }
                    KeyState::Released => {
                        if self.keys_down.remove(key) {
                            frame.keys_released.insert(*key);
                        }
                    }
                }
            }

            InputEvent::PointerButton(PointerButtonEvent { button, state, x, y, modifiers }) => {
                self.pointer_pos = Some((*x, *y));
                self.modifiers = *modifiers;

                match state {
                    MouseButtonState::Pressed => {
                        if self.buttons_down.insert(*button) {
                            frame.buttons_pressed.insert(*button);
                        }
                    }
                    MouseButtonState::Released => {
                        if self.buttons_down.remove(button) {
                            frame.buttons_released.insert(*button);
                        }
                    }
                }
            }

            InputEvent::MouseWheel { delta, modifiers } => {
                self.modifiers = *modifiers;
                frame.wheel_lines += delta.lines_y();
            }
        }

        frame.push_event(ev);
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn button_down(&self, btn: MouseButton) -> bool {
        self.buttons_down.contains(&btn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MouseWheelDelta;

    fn key(key: Key, state: KeyState) -> InputEvent {
        InputEvent::Key { key, state, modifiers: Modifiers::default(), repeat: false }
    }

    #[test]
    fn press_and_release_are_recorded_once() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, key(Key::W, KeyState::Pressed));
        state.apply_event(&mut frame, key(Key::W, KeyState::Pressed));
        assert!(state.key_down(Key::W));
        assert!(frame.pressed(Key::W));
        assert_eq!(frame.keys_pressed.len(), 1);

        frame.clear();
        state.apply_event(&mut frame, key(Key::W, KeyState::Released));
        assert!(!state.key_down(Key::W));
        assert!(frame.keys_released.contains(&Key::W));
        assert!(!frame.pressed(Key::W));
    }

    #[test]
    fn focus_loss_clears_held_keys() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, key(Key::D, KeyState::Pressed));
        state.apply_event(&mut frame, InputEvent::Focused(false));
        assert!(state.keys_down.is_empty());
    }

    #[test]
    fn pointer_motion_accumulates() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, InputEvent::PointerMoved(PointerMoveEvent { x: 10.0, y: 10.0 }));
        assert_eq!(frame.pointer_delta, (0.0, 0.0));
        state.apply_event(&mut frame, InputEvent::PointerMoved(PointerMoveEvent { x: 15.0, y: 8.0 }));
        state.apply_event(&mut frame, InputEvent::PointerMoved(PointerMoveEvent { x: 20.0, y: 8.0 }));
        assert_eq!(frame.pointer_delta, (10.0, -2.0));
    }

    #[test]
    fn wheel_pixels_convert_to_lines() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        let modifiers = Modifiers::default();
        state.apply_event(
            &mut frame,
            InputEvent::MouseWheel { delta: MouseWheelDelta::Line { x: 0.0, y: 1.0 }, modifiers },
        );
        state.apply_event(
            &mut frame,
            InputEvent::MouseWheel { delta: MouseWheelDelta::Pixel { x: 0.0, y: 80.0 }, modifiers },
        );
        assert_eq!(frame.wheel_lines, 3.0);
        assert_eq!(frame.events.len(), 2);
    }
}
