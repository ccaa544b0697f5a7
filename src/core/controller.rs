use glam::Vec2;

/// Camera input the visualizer understands
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewInput {
    /// Drag delta in screen pixels
    Pan(Vec2),
    /// Multiplicative zoom factor
    Zoom(f32),
}

/// One input event plus whether the UI layer claimed it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputEvent {
    pub input: ViewInput,
    pub ui_captured: bool,
}

impl InputEvent {
    pub fn new(input: ViewInput) -> Self {
        Self {
            input,
            ui_captured: false,
        }
    }

    pub fn captured(input: ViewInput) -> Self {
        Self {
            input,
            ui_captured: true,
        }
    }
}

/// Source of queued pan/zoom events, drained once per frame
pub trait InputSource {
    fn next_event(&mut self) -> Option<InputEvent>;
}

/// Fixed list of events, mostly for tests and scripted runs
impl InputSource for std::collections::VecDeque<InputEvent> {
    fn next_event(&mut self) -> Option<InputEvent> {
        self.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    #[test]
    fn test_queue_drains_in_order() {
        let mut queue: VecDeque<InputEvent> = VecDeque::from([
            InputEvent::new(ViewInput::Pan(Vec2::new(1.0, 2.0))),
            InputEvent::captured(ViewInput::Zoom(1.1)),
        ]);

        let first = queue.next_event().expect("first event");
        assert_eq!(first.input, ViewInput::Pan(Vec2::new(1.0, 2.0)));
        assert!(!first.ui_captured);

        let second = queue.next_event().expect("second event");
        assert!(second.ui_captured);
        assert_eq!(queue.next_event(), None);
    }
}
