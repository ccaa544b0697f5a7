use glam::Vec2;

use crate::core::Change;

/// Smallest allowed scale; keeps the quad math away from division by zero
pub const MIN_SCALE: f32 = 1e-3;

/// 2D pan/zoom state for the display quad
///
/// `position` is in source pixels, `scale` divides the quad size, so larger
/// values zoom out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    position: Vec2,
    scale: f32,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: 1.0,
        }
    }

    pub fn with_scale(scale: f32) -> Self {
        let mut camera = Self::new();
        camera.set_scale(scale);
        camera
    }

    /// Move by a drag delta, scaled so the image follows the cursor at any zoom
    pub fn pan(&mut self, delta: Vec2) -> Change {
        if delta == Vec2::ZERO || !delta.is_finite() {
            return Change::Unchanged;
        }
        self.position += delta * self.scale;
        Change::CameraMoved
    }

    pub fn zoom(&mut self, multiplier: f32) -> Change {
        if !(multiplier.is_finite() && multiplier > 0.0) {
            log::debug!("Ignoring zoom multiplier {}", multiplier);
            return Change::Unchanged;
        }
        self.set_scale(self.scale * multiplier)
    }

    pub fn set_position(&mut self, position: Vec2) -> Change {
        if position == self.position || !position.is_finite() {
            return Change::Unchanged;
        }
        self.position = position;
        Change::CameraMoved
    }

    pub fn set_scale(&mut self, scale: f32) -> Change {
        if !scale.is_finite() {
            return Change::Unchanged;
        }
        let scale = scale.max(MIN_SCALE);
        if scale == self.scale {
            return Change::Unchanged;
        }
        self.scale = scale;
        Change::CameraMoved
    }

    pub fn reset_position(&mut self) -> Change {
        self.set_position(Vec2::ZERO)
    }

    pub fn reset_scale(&mut self) -> Change {
        self.set_scale(1.0)
    }

    pub fn reset(&mut self) -> Change {
        match (self.reset_position(), self.reset_scale()) {
            (Change::Unchanged, Change::Unchanged) => Change::Unchanged,
            _ => Change::CameraMoved,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
