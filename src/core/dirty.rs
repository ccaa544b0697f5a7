use std::ops::{BitOr, BitOrAssign};

/// Derived artifacts a mutation can make stale
///
/// GPU upload staleness is never set directly: it follows from a pixel
/// buffer recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Invalidation {
    /// Pixel buffer must be recomputed
    pub texture: bool,
    /// Quad geometry must be recomputed
    pub quad: bool,
}

impl Invalidation {
    pub const NONE: Invalidation = Invalidation { texture: false, quad: false };
    pub const TEXTURE: Invalidation = Invalidation { texture: true, quad: false };
    pub const QUAD: Invalidation = Invalidation { texture: false, quad: true };
    pub const ALL: Invalidation = Invalidation { texture: true, quad: true };

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

impl BitOr for Invalidation {
    type Output = Invalidation;

    fn bitor(self, rhs: Self) -> Self {
        Invalidation {
            texture: self.texture || rhs.texture,
            quad: self.quad || rhs.quad,
        }
    }
}

impl BitOrAssign for Invalidation {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

/// Every kind of input change the visualizer knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// Request that left the effective state as it was
    Unchanged,
    WindowResized,
    OffsetMoved,
    BufferReplaced,
    ColorModeChanged,
    ThresholdRangesChanged,
    /// Palette contents changed; only visible while a paletted mode is active
    PaletteChanged { visible: bool },
    CameraMoved,
    ViewportResized,
}

impl Change {
    /// The single invalidation table for the whole pipeline
    pub const fn invalidation(self) -> Invalidation {
        match self {
            Change::Unchanged => Invalidation::NONE,
            Change::WindowResized => Invalidation::ALL,
            Change::OffsetMoved
            | Change::BufferReplaced
            | Change::ColorModeChanged
            | Change::ThresholdRangesChanged => Invalidation::TEXTURE,
            Change::PaletteChanged { visible: true } => Invalidation::TEXTURE,
            Change::PaletteChanged { visible: false } => Invalidation::NONE,
            Change::CameraMoved | Change::ViewportResized => Invalidation::QUAD,
        }
    }
}

/// Staleness of the three derived artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyState {
    texture_stale: bool,
    upload_stale: bool,
    quad_stale: bool,
}

impl DirtyState {
    /// Nothing has been computed yet
    pub fn new() -> Self {
        Self {
            texture_stale: true,
            upload_stale: true,
            quad_stale: true,
        }
    }

    pub fn apply(&mut self, invalidation: Invalidation) {
        self.texture_stale |= invalidation.texture;
        self.quad_stale |= invalidation.quad;
    }

    pub fn texture_recomputed(&mut self) {
        self.texture_stale = false;
        self.upload_stale = true;
    }

    pub fn uploaded(&mut self) {
        self.upload_stale = false;
    }

    pub fn quad_recomputed(&mut self) {
        self.quad_stale = false;
    }

    pub fn texture_stale(&self) -> bool {
        self.texture_stale
    }

    pub fn upload_stale(&self) -> bool {
        self.upload_stale
    }

    pub fn quad_stale(&self) -> bool {
        self.quad_stale
    }

    pub fn is_clean(&self) -> bool {
        !(self.texture_stale || self.upload_stale || self.quad_stale)
    }
}

impl Default for DirtyState {
    fn default() -> Self {
        Self::new()
    }
}
