//! Input methods for GlowGridEngine

use super::GlowGridEngine;
use crate::camera::controller::OrbitController;
use crate::input::{CameraCommand, InputEvent};

/// Apply one camera command to the orbit controller.
fn apply(camera: &mut OrbitController, command: CameraCommand) {
    match command {
        CameraCommand::Rotate(delta) => camera.rotate(delta),
        CameraCommand::Pan(delta) => camera.pan(delta),
        CameraCommand::Zoom(delta) => camera.zoom(delta),
    }
}

impl GlowGridEngine {
    /// Process a platform-agnostic input event.
    ///
    /// Consumers forward raw window events as [`InputEvent`] variants;
    /// left-drag rotates, shift-drag pans and the wheel zooms.
    ///
    /// Returns `true` if the camera moved.
    ///
    /// # Example
    ///
    /// ```ignore
    /// engine.handle_input(InputEvent::CursorMoved { x, y });
    /// engine.handle_input(InputEvent::Scroll { delta: 1.0 });
    /// ```
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        let Some(command) = self.input.handle_event(event) else {
            return false;
        };
        apply(&mut self.camera, command);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{InputProcessor, MouseButton};
    use crate::options::CameraOptions;

    fn drive(
        camera: &mut OrbitController,
        input: &mut InputProcessor,
        events: impl IntoIterator<Item = InputEvent>,
    ) -> usize {
        events
            .into_iter()
            .filter_map(|e| input.handle_event(e))
            .map(|command| apply(camera, command))
            .count()
    }

    #[test]
    fn drag_orbits_without_changing_distance() {
        let mut camera = OrbitController::new(&CameraOptions::default(), 1.0);
        let mut input = InputProcessor::new();
        let before = camera.camera().eye;
        let applied = drive(
            &mut camera,
            &mut input,
            [
                InputEvent::CursorMoved { x: 10.0, y: 10.0 },
                InputEvent::MouseButton {
                    button: MouseButton::Left,
                    pressed: true,
                },
                InputEvent::CursorMoved { x: 60.0, y: 10.0 },
            ],
        );
        assert_eq!(applied, 1);
        assert!((camera.camera().eye - before).length() > 1.0);
        assert!((camera.distance() - 120.0).abs() < 1e-3);
    }

    #[test]
    fn shift_drag_moves_focus() {
        let mut camera = OrbitController::new(&CameraOptions::default(), 1.0);
        let mut input = InputProcessor::new();
        let _ = drive(
            &mut camera,
            &mut input,
            [
                InputEvent::ModifiersChanged { shift: true },
                InputEvent::CursorMoved { x: 0.0, y: 0.0 },
                InputEvent::MouseButton {
                    button: MouseButton::Left,
                    pressed: true,
                },
                InputEvent::CursorMoved { x: 20.0, y: 0.0 },
            ],
        );
        assert!(camera.focus_point().length() > 0.0);
        assert_eq!(
            camera.camera().target,
            camera.focus_point(),
            "camera keeps looking at the focus"
        );
    }

    #[test]
    fn scroll_zooms_in() {
        let mut camera = OrbitController::new(&CameraOptions::default(), 1.0);
        let mut input = InputProcessor::new();
        let applied = drive(
            &mut camera,
            &mut input,
            [InputEvent::Scroll { delta: 1.0 }],
        );
        assert_eq!(applied, 1);
        assert!(camera.distance() < 120.0);
    }

    #[test]
    fn hover_without_button_is_ignored() {
        let mut camera = OrbitController::new(&CameraOptions::default(), 1.0);
        let mut input = InputProcessor::new();
        let applied = drive(
            &mut camera,
            &mut input,
            [
                InputEvent::CursorMoved { x: 0.0, y: 0.0 },
                InputEvent::CursorMoved { x: 40.0, y: 40.0 },
            ],
        );
        assert_eq!(applied, 0);
    }
}
