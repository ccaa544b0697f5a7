use glam::UVec2;

use crate::math::Quad;

/// GPU-facing collaborator of the visualizer
///
/// The visualizer decides *when* each call happens; implementations only
/// move data to the device. None of these may fail at frame time.
pub trait RenderBackend {
    /// (Re)create the pixel texture, discarding previous contents
    fn allocate_texture(&mut self, size: UVec2);

    /// Replace the whole texture with `texels` (row-major, `size.x * size.y` entries)
    fn upload_texture(&mut self, size: UVec2, texels: &[u32]);

    /// Draw the texture on `quad`; `texture_size` feeds the size uniform
    fn draw(&mut self, quad: &Quad, texture_size: UVec2);

    /// Largest texture edge the device accepts
    fn max_texture_dimension(&self) -> u32 {
        u32::MAX
    }
}

/// Every call a backend received, in order
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Allocate(UVec2),
    Upload { size: UVec2, texels: Vec<u32> },
    Draw { quad: Quad, texture_size: UVec2 },
}

/// Backend that only records calls, for headless runs and tests
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    pub calls: Vec<BackendCall>,
    pub max_dimension: Option<u32>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self {
            calls: Vec::new(),
            max_dimension: Some(max_dimension),
        }
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn allocations(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, BackendCall::Allocate(_))).count()
    }

    pub fn uploads(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, BackendCall::Upload { .. })).count()
    }

    pub fn draws(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, BackendCall::Draw { .. })).count()
    }

    pub fn last_upload(&self) -> Option<&[u32]> {
        self.calls.iter().rev().find_map(|c| match c {
            BackendCall::Upload { texels, .. } => Some(texels.as_slice()),
            _ => None,
        })
    }
}

impl RenderBackend for RecordingBackend {
    fn allocate_texture(&mut self, size: UVec2) {
        self.calls.push(BackendCall::Allocate(size));
    }

    fn upload_texture(&mut self, size: UVec2, texels: &[u32]) {
        self.calls.push(BackendCall::Upload {
            size,
            texels: texels.to_vec(),
        });
    }

    fn draw(&mut self, quad: &Quad, texture_size: UVec2) {
        self.calls.push(BackendCall::Draw {
            quad: *quad,
            texture_size,
        });
    }

    fn max_texture_dimension(&self) -> u32 {
        self.max_dimension.unwrap_or(u32::MAX)
    }
}
