use std::collections::VecDeque;

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use super::controller::{InputEvent, InputSource, ViewInput};

/// Scale factor applied per scroll tick
pub const ZOOM_STEP: f32 = 1.1;

/// Pixel-delta scrolling (touchpads) reported per line tick
const PIXELS_PER_LINE: f32 = 40.0;

/// Turns winit window events into queued pan/zoom events
///
/// Left-button drags pan by the cursor delta; the wheel zooms in by
/// `1 / ZOOM_STEP` per tick up and out by `ZOOM_STEP` per tick down.
#[derive(Debug, Clone, Default)]
pub struct WinitController {
    queue: VecDeque<InputEvent>,
    dragging: bool,
    cursor: Option<Vec2>,
}

impl WinitController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one window event; `ui_captured` is whether the UI wants the pointer
    pub fn process_event(&mut self, event: &WindowEvent, ui_captured: bool) {
        match event {
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => self.set_dragging(*state == ElementState::Pressed && !ui_captured),
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(Vec2::new(position.x as f32, position.y as f32), ui_captured)
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.dragging = false;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_LINE,
                };
                self.scroll(lines, ui_captured);
            }
            _ => {}
        }
    }

    pub fn set_dragging(&mut self, dragging: bool) {
        self.dragging = dragging;
    }

    /// Track the cursor; queues a pan while dragging
    pub fn cursor_moved(&mut self, position: Vec2, ui_captured: bool) {
        if let (Some(previous), true) = (self.cursor, self.dragging) {
            let delta = position - previous;
            if delta != Vec2::ZERO {
                self.push(ViewInput::Pan(delta), ui_captured);
            }
        }
        self.cursor = Some(position);
    }

    /// Queue a zoom for `lines` wheel ticks, positive meaning up
    pub fn scroll(&mut self, lines: f32, ui_captured: bool) {
        if lines == 0.0 || !lines.is_finite() {
            return;
        }
        self.push(ViewInput::Zoom(ZOOM_STEP.powf(-lines)), ui_captured);
    }

    fn push(&mut self, input: ViewInput, ui_captured: bool) {
        self.queue.push_back(InputEvent { input, ui_captured });
    }

    pub fn cursor(&self) -> Option<Vec2> {
        self.cursor
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl InputSource for WinitController {
    fn next_event(&mut self) -> Option<InputEvent> {
        self.queue.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // winit events need device ids that can't be built safely here, so these
    // drive the same entry points process_event uses

    #[test]
    fn test_move_without_drag_only_tracks_cursor() {
        let mut controller = WinitController::new();
        controller.cursor_moved(Vec2::new(10.0, 10.0), false);
        controller.cursor_moved(Vec2::new(20.0, 15.0), false);
        assert_eq!(controller.pending(), 0);
        assert_eq!(controller.cursor(), Some(Vec2::new(20.0, 15.0)));
    }

    #[test]
    fn test_drag_queues_pan_delta() {
        let mut controller = WinitController::new();
        controller.cursor_moved(Vec2::new(10.0, 10.0), false);
        controller.set_dragging(true);
        controller.cursor_moved(Vec2::new(14.0, 7.0), false);

        let event = controller.next_event().expect("pan event");
        assert_eq!(event.input, ViewInput::Pan(Vec2::new(4.0, -3.0)));
        assert!(!event.ui_captured);
        assert_eq!(controller.next_event(), None);
    }

    #[test]
    fn test_scroll_direction() {
        let mut controller = WinitController::new();
        controller.scroll(1.0, false);
        controller.scroll(-1.0, true);
        controller.scroll(0.0, false);

        let zoom = |event: Option<InputEvent>| match event.map(|e| e.input) {
            Some(ViewInput::Zoom(m)) => m,
            other => panic!("expected zoom, got {:?}", other),
        };

        assert!((zoom(controller.next_event()) - 1.0 / ZOOM_STEP).abs() < 1e-6);

        let down = controller.queue.front().copied();
        assert!((zoom(controller.next_event()) - ZOOM_STEP).abs() < 1e-6);
        assert!(down.is_some_and(|e| e.ui_captured));

        assert_eq!(controller.next_event(), None);
    }
}
