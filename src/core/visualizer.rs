use glam::{UVec2, Vec2};
use rand::Rng;

use super::backend::RenderBackend;
use super::color_mapper::{ColorMapper, ColorMode, PixelBuffer, ThresholdRange};
use super::controller::{InputSource, ViewInput};
use super::data_window::{ByteBuffer, DataWindow};
use super::dirty::{Change, DirtyState, Invalidation};
use super::frame::FrameStats;
use super::palette::{Palette, PaletteAlgorithm, PaletteMode};
use crate::camera::Camera;
use crate::math::{compute_quad, Quad, Rgb};

/// The whole rendering pipeline as one explicit context
///
/// Mutators only record what they invalidated. `draw` brings the quad, the
/// pixel buffer and the GPU texture up to date, in that order, and only for
/// the artifacts that are actually stale.
#[derive(Debug, Clone)]
pub struct Visualizer {
    data: DataWindow,
    mapper: ColorMapper,
    camera: Camera,
    viewport: UVec2,
    quad: Quad,
    pixels: PixelBuffer,
    dirty: DirtyState,
    /// Texture size the backend currently holds
    allocated: Option<UVec2>,
    frame: FrameStats,
    frame_count: u64,
}

impl Visualizer {
    pub fn new(buffer: ByteBuffer, window_size: UVec2, viewport: UVec2) -> Self {
        Self::with_parts(
            DataWindow::new(buffer, window_size.x, window_size.y),
            ColorMapper::default(),
            Camera::default(),
            viewport,
        )
    }

    pub fn with_parts(data: DataWindow, mapper: ColorMapper, camera: Camera, viewport: UVec2) -> Self {
        Self {
            data,
            mapper,
            camera,
            viewport: viewport.max(UVec2::ONE),
            quad: Quad::default(),
            pixels: PixelBuffer::empty(),
            dirty: DirtyState::new(),
            allocated: None,
            frame: FrameStats::default(),
            frame_count: 0,
        }
    }

    fn apply(&mut self, change: Change) -> Invalidation {
        let invalidation = change.invalidation();
        self.dirty.apply(invalidation);
        invalidation
    }

    // Data window

    pub fn set_window_size(&mut self, width: u32, height: u32) -> Invalidation {
        let change = self.data.set_size(width, height);
        self.apply(change)
    }

    pub fn set_offset(&mut self, offset: u64) -> Invalidation {
        let change = self.data.set_offset(offset);
        self.apply(change)
    }

    /// Move by whole windows at the current mode's stride
    pub fn page(&mut self, delta_pages: i64) -> Invalidation {
        let stride = self.mapper.mode().stride_bytes();
        let change = self.data.page(delta_pages, stride);
        self.apply(change)
    }

    pub fn set_buffer(&mut self, buffer: impl Into<ByteBuffer>) -> Invalidation {
        let change = self.data.set_buffer(buffer.into());
        self.apply(change)
    }

    /// Cap the window size, normally at the device's max texture dimension
    pub fn set_size_limit(&mut self, limit: u32) -> Invalidation {
        let change = self.data.set_size_limit(limit);
        self.apply(change)
    }

    // Color mapper

    pub fn set_color_mode(&mut self, mode: ColorMode) -> Invalidation {
        let change = self.mapper.set_color_mode(mode);
        self.apply(change)
    }

    pub fn set_four_byte_stride(&mut self, enabled: bool) -> Invalidation {
        let change = self.mapper.set_four_byte_stride(enabled);
        self.apply(change)
    }

    pub fn set_threshold_range(&mut self, index: usize, start: f32, end: f32, color: Rgb, enabled: bool) -> Invalidation {
        let change = self.mapper.set_threshold_range(index, start, end, color, enabled);
        self.apply(change)
    }

    pub fn remove_threshold_range(&mut self, index: usize) -> Invalidation {
        let change = self.mapper.remove_threshold_range(index);
        self.apply(change)
    }

    pub fn set_palette_mode(&mut self, mode: PaletteMode) -> Invalidation {
        let change = self.mapper.set_palette_mode(mode);
        self.apply(change)
    }

    pub fn regenerate_palette(&mut self, algorithm: PaletteAlgorithm) -> Invalidation {
        let change = self.mapper.regenerate_palette(algorithm);
        self.apply(change)
    }

    pub fn shuffle_palette(&mut self) -> Invalidation {
        let change = self.mapper.shuffle_palette();
        self.apply(change)
    }

    pub fn shuffle_palette_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Invalidation {
        let change = self.mapper.shuffle_palette_with(rng);
        self.apply(change)
    }

    // Camera

    pub fn pan(&mut self, delta: Vec2) -> Invalidation {
        let change = self.camera.pan(delta);
        self.apply(change)
    }

    pub fn zoom(&mut self, multiplier: f32) -> Invalidation {
        let change = self.camera.zoom(multiplier);
        self.apply(change)
    }

    pub fn set_position(&mut self, position: Vec2) -> Invalidation {
        let change = self.camera.set_position(position);
        self.apply(change)
    }

    pub fn set_scale(&mut self, scale: f32) -> Invalidation {
        let change = self.camera.set_scale(scale);
        self.apply(change)
    }

    pub fn reset_position(&mut self) -> Invalidation {
        let change = self.camera.reset_position();
        self.apply(change)
    }

    pub fn reset_scale(&mut self) -> Invalidation {
        let change = self.camera.reset_scale();
        self.apply(change)
    }

    pub fn reset_camera(&mut self) -> Invalidation {
        let change = self.camera.reset();
        self.apply(change)
    }

    /// Surface size in pixels, clamped to at least 1x1
    pub fn set_viewport(&mut self, size: UVec2) -> Invalidation {
        let size = size.max(UVec2::ONE);
        if size == self.viewport {
            return Invalidation::NONE;
        }
        self.viewport = size;
        self.apply(Change::ViewportResized)
    }

    /// Apply queued pan/zoom events, skipping the ones the UI claimed
    pub fn consume_input<S: InputSource + ?Sized>(&mut self, source: &mut S) -> Invalidation {
        let mut invalidation = Invalidation::NONE;
        while let Some(event) = source.next_event() {
            if event.ui_captured {
                continue;
            }
            invalidation |= match event.input {
                ViewInput::Pan(delta) => self.pan(delta),
                ViewInput::Zoom(multiplier) => self.zoom(multiplier),
            };
        }
        invalidation
    }

    // Derived artifacts

    pub fn recompute_quad(&mut self) {
        self.quad = compute_quad(
            self.camera.position(),
            self.camera.scale(),
            self.data.size(),
            self.viewport,
        );
        self.dirty.quad_recomputed();
        self.frame.quad_recomputes += 1;
    }

    pub fn recompute_texture(&mut self) {
        self.pixels = self.mapper.recompute(self.data.bytes(), self.data.view());
        self.dirty.texture_recomputed();
        self.frame.texture_recomputes += 1;
    }

    /// Push the pixel buffer to the backend, reallocating the texture first if
    /// its size no longer matches
    pub fn upload_to_gpu<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) {
        if !self.pixels.is_empty() {
            let size = self.pixels.size();
            if self.allocated != Some(size) {
                log::debug!("Allocating {}x{} window texture", size.x, size.y);
                backend.allocate_texture(size);
                self.allocated = Some(size);
            }
            backend.upload_texture(size, self.pixels.texels());
            self.frame.uploads += 1;
        }
        self.dirty.uploaded();
    }

    /// Run the per-frame sequence and issue the draw call
    pub fn draw<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) {
        let device_limit = backend.max_texture_dimension();
        if device_limit < self.data.size_limit() {
            self.set_size_limit(device_limit);
        }

        if self.dirty.quad_stale() {
            self.recompute_quad();
        }
        if self.dirty.texture_stale() {
            self.recompute_texture();
        }
        if self.dirty.upload_stale() {
            self.upload_to_gpu(backend);
        }

        if self.pixels.is_empty() {
            self.frame.skipped = true;
            return;
        }
        backend.draw(&self.quad, self.pixels.size());
        self.frame.draws += 1;
    }

    pub fn begin_frame(&mut self) {
        self.frame = FrameStats::new(self.frame_count);
        self.frame_count += 1;
    }

    pub fn end_frame(&mut self) -> FrameStats {
        self.frame
    }

    // Queries

    pub fn window_size(&self) -> UVec2 {
        self.data.size()
    }

    pub fn offset(&self) -> u64 {
        self.data.offset()
    }

    pub fn buffer_len(&self) -> u64 {
        self.data.buffer().len()
    }

    pub fn available_bytes(&self) -> u64 {
        self.data.available_bytes()
    }

    pub fn size_limit(&self) -> u32 {
        self.data.size_limit()
    }

    pub fn position(&self) -> Vec2 {
        self.camera.position()
    }

    pub fn scale(&self) -> f32 {
        self.camera.scale()
    }

    pub fn viewport(&self) -> UVec2 {
        self.viewport
    }

    pub fn color_mode(&self) -> ColorMode {
        self.mapper.mode()
    }

    pub fn palette(&self) -> &Palette {
        self.mapper.palette()
    }

    pub fn threshold_ranges(&self) -> &[ThresholdRange] {
        self.mapper.threshold_ranges()
    }

    pub fn quad(&self) -> &Quad {
        &self.quad
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    pub fn dirty(&self) -> DirtyState {
        self.dirty
    }
}
