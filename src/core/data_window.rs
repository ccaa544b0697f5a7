use glam::UVec2;

use super::dirty::Change;

/// Window edge cap until a device reports its own, matching wgpu's default
/// `max_texture_dimension_2d`
pub const DEFAULT_SIZE_LIMIT: u32 = 8192;

/// Raw bytes of the inspected file
///
/// Replaced wholesale on load, never edited in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteBuffer {
    bytes: Vec<u8>,
}

impl ByteBuffer {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl From<Vec<u8>> for ByteBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

/// Position and size of the visible part of the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowView {
    /// First byte shown
    pub offset: u64,
    /// Output pixels per row / rows
    pub size: UVec2,
}

impl WindowView {
    pub fn new(offset: u64, width: u32, height: u32) -> Self {
        Self {
            offset,
            size: UVec2::new(width, height),
        }
    }

    /// Number of output pixels
    pub fn pixel_count(&self) -> usize {
        self.size.x as usize * self.size.y as usize
    }
}

/// Byte buffer plus the window that selects which part of it gets drawn
#[derive(Debug, Clone)]
pub struct DataWindow {
    buffer: ByteBuffer,
    offset: u64,
    size: UVec2,
    size_limit: u32,
}

impl DataWindow {
    pub fn new(buffer: ByteBuffer, width: u32, height: u32) -> Self {
        let mut window = Self {
            buffer,
            offset: 0,
            size: UVec2::ONE,
            size_limit: DEFAULT_SIZE_LIMIT,
        };
        window.size = window.clamp_size(UVec2::new(width, height));
        window
    }

    fn clamp_size(&self, size: UVec2) -> UVec2 {
        size.clamp(UVec2::ONE, UVec2::splat(self.size_limit))
    }

    /// Resize the window; re-setting the current effective size is a no-op
    pub fn set_size(&mut self, width: u32, height: u32) -> Change {
        let size = self.clamp_size(UVec2::new(width, height));
        if size == self.size {
            return Change::Unchanged;
        }

        log::debug!("Window resized {}x{} -> {}x{}", self.size.x, self.size.y, size.x, size.y);
        self.size = size;
        Change::WindowResized
    }

    /// Cap both window dimensions, typically at the GPU's max texture size
    pub fn set_size_limit(&mut self, limit: u32) -> Change {
        self.size_limit = limit.max(1);
        let size = self.clamp_size(self.size);
        if size == self.size {
            return Change::Unchanged;
        }

        log::info!("Window clamped to {}x{} (limit {})", size.x, size.y, limit);
        self.size = size;
        Change::WindowResized
    }

    /// Move the first visible byte, clamped to `[0, len]`
    pub fn set_offset(&mut self, offset: u64) -> Change {
        self.offset = offset.min(self.buffer.len());
        Change::OffsetMoved
    }

    /// Replace the buffer and go back to its start
    pub fn set_buffer(&mut self, buffer: ByteBuffer) -> Change {
        log::debug!("Buffer replaced: {} -> {} bytes", self.buffer.len(), buffer.len());
        self.buffer = buffer;
        self.offset = 0;
        Change::BufferReplaced
    }

    /// Move by whole windows of `stride`-byte elements; negative pages go back
    pub fn page(&mut self, delta_pages: i64, stride: u32) -> Change {
        let page_bytes = self.window_bytes(stride).min(i64::MAX as u64) as i64;
        let target = (self.offset as i64).saturating_add(delta_pages.saturating_mul(page_bytes));
        self.set_offset(target.max(0) as u64)
    }

    /// Bytes a full window consumes at the given element stride
    pub fn window_bytes(&self, stride: u32) -> u64 {
        self.size.x as u64 * self.size.y as u64 * stride as u64
    }

    /// Bytes between the offset and the end of the buffer
    pub fn available_bytes(&self) -> u64 {
        self.buffer.len() - self.offset
    }

    pub fn view(&self) -> WindowView {
        WindowView {
            offset: self.offset,
            size: self.size,
        }
    }

    pub fn buffer(&self) -> &ByteBuffer {
        &self.buffer
    }

    pub fn bytes(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    pub fn size_limit(&self) -> u32 {
        self.size_limit
    }
}
