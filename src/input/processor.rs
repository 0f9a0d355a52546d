//! Converts raw platform events into orbit-camera commands.

use glam::Vec2;

use super::event::{InputEvent, MouseButton};

/// What the orbit camera should do in response to input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraCommand {
    /// Orbit around the focus by a cursor delta in pixels.
    Rotate(Vec2),
    /// Slide the focus in the view plane by a cursor delta in pixels.
    Pan(Vec2),
    /// Scale the orbit distance (positive = closer).
    Zoom(f32),
}

/// Tracks cursor position, drag state and the shift modifier.
///
/// Dragging with the left button rotates, shift-dragging pans, and the
/// wheel zooms.
#[derive(Debug, Default)]
pub struct InputProcessor {
    /// Last cursor position; `None` until the first move event.
    cursor: Option<Vec2>,
    mouse_pressed: bool,
    shift_pressed: bool,
}

impl InputProcessor {
    /// Processor with no buttons held.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the primary mouse button is pressed.
    #[must_use]
    pub fn mouse_pressed(&self) -> bool {
        self.mouse_pressed
    }

    /// Whether the shift modifier is held.
    #[must_use]
    pub fn shift_pressed(&self) -> bool {
        self.shift_pressed
    }

    /// Process a raw input event and return zero or one commands.
    pub fn handle_event(&mut self, event: InputEvent) -> Option<CameraCommand> {
        match event {
            InputEvent::CursorMoved { x, y } => {
                let position = Vec2::new(x, y);
                let delta = self.cursor.map(|last| position - last);
                self.cursor = Some(position);
                let delta = delta.filter(|_| self.mouse_pressed)?;
                if delta == Vec2::ZERO {
                    return None;
                }
                Some(if self.shift_pressed {
                    CameraCommand::Pan(delta)
                } else {
                    CameraCommand::Rotate(delta)
                })
            }
            InputEvent::MouseButton { button, pressed } => {
                if button == MouseButton::Left {
                    self.mouse_pressed = pressed;
                }
                None
            }
            InputEvent::Scroll { delta } => Some(CameraCommand::Zoom(delta)),
            InputEvent::ModifiersChanged { shift } => {
                self.shift_pressed = shift;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moved(x: f32, y: f32) -> InputEvent {
        InputEvent::CursorMoved { x, y }
    }

    fn left(pressed: bool) -> InputEvent {
        InputEvent::MouseButton {
            button: MouseButton::Left,
            pressed,
        }
    }

    #[test]
    fn hover_without_button_does_nothing() {
        let mut input = InputProcessor::new();
        assert_eq!(input.handle_event(moved(10.0, 10.0)), None);
        assert_eq!(input.handle_event(moved(20.0, 15.0)), None);
    }

    #[test]
    fn drag_rotates_by_cursor_delta() {
        let mut input = InputProcessor::new();
        let _ = input.handle_event(moved(10.0, 10.0));
        let _ = input.handle_event(left(true));
        assert_eq!(
            input.handle_event(moved(14.0, 7.0)),
            Some(CameraCommand::Rotate(Vec2::new(4.0, -3.0)))
        );
        let _ = input.handle_event(left(false));
        assert_eq!(input.handle_event(moved(30.0, 30.0)), None);
    }

    #[test]
    fn shift_drag_pans() {
        let mut input = InputProcessor::new();
        let _ = input.handle_event(moved(0.0, 0.0));
        let _ = input.handle_event(InputEvent::ModifiersChanged { shift: true });
        let _ = input.handle_event(left(true));
        assert_eq!(
            input.handle_event(moved(5.0, 0.0)),
            Some(CameraCommand::Pan(Vec2::new(5.0, 0.0)))
        );
    }

    #[test]
    fn first_move_after_press_has_no_delta() {
        let mut input = InputProcessor::new();
        let _ = input.handle_event(left(true));
        assert_eq!(input.handle_event(moved(100.0, 100.0)), None);
    }

    #[test]
    fn right_button_is_ignored() {
        let mut input = InputProcessor::new();
        let _ = input.handle_event(moved(0.0, 0.0));
        let _ = input.handle_event(InputEvent::MouseButton {
            button: MouseButton::Right,
            pressed: true,
        });
        assert!(!input.mouse_pressed());
        assert_eq!(input.handle_event(moved(3.0, 3.0)), None);
    }

    #[test]
    fn scroll_zooms() {
        let mut input = InputProcessor::new();
        assert_eq!(
            input.handle_event(InputEvent::Scroll { delta: 1.5 }),
            Some(CameraCommand::Zoom(1.5))
        );
    }
}
