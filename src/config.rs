use glam::UVec2;
use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::cli::Cli;
use crate::core::{
    default_threshold_ranges, ByteBuffer, ColorMapper, ColorMode, DataWindow, Palette, PaletteAlgorithm, PaletteMode,
    ThresholdRange, Visualizer,
};

/// Start-up settings, read from an optional JSON file and overridden by CLI flags
///
/// Missing fields keep their defaults, so `{}` is a valid file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Window width in pixels; the surface width when unset
    pub width: Option<u32>,
    /// Window height in pixels; the surface height when unset
    pub height: Option<u32>,
    pub offset: u64,
    pub color_mode: ColorMode,
    pub palette: PaletteAlgorithm,
    pub palette_mode: PaletteMode,
    pub threshold_ranges: Vec<ThresholdRange>,
    pub scale: f32,
    pub show_ui: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            offset: 0,
            color_mode: ColorMode::default(),
            palette: PaletteAlgorithm::default(),
            palette_mode: PaletteMode::default(),
            threshold_ranges: default_threshold_ranges(),
            scale: 1.0,
            show_ui: true,
        }
    }
}

impl ViewerConfig {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Let explicit command-line flags win over the file
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(width) = cli.width {
            self.width = Some(width);
        }
        if let Some(height) = cli.height {
            self.height = Some(height);
        }
        if let Some(offset) = cli.offset {
            self.offset = offset;
        }
        if let Some(mode) = cli.mode {
            self.color_mode = mode.into();
        }
        if cli.no_ui {
            self.show_ui = false;
        }
    }

    /// Window size for a surface of `surface_size` pixels
    pub fn window_size(&self, surface_size: UVec2) -> UVec2 {
        UVec2::new(
            self.width.unwrap_or(surface_size.x),
            self.height.unwrap_or(surface_size.y),
        )
    }

    /// Assemble the visualizer for `buffer` shown on a `surface_size` surface
    pub fn build(&self, buffer: ByteBuffer, surface_size: UVec2) -> Visualizer {
        let size = self.window_size(surface_size);
        let mut data = DataWindow::new(buffer, size.x, size.y);
        data.set_offset(self.offset);

        let mapper = ColorMapper::new(
            self.color_mode,
            Palette::new(self.palette, self.palette_mode),
            self.threshold_ranges.clone(),
        );

        Visualizer::with_parts(data, mapper, Camera::with_scale(self.scale), surface_size)
    }
}
