use glam::UVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::data_window::WindowView;
use super::dirty::Change;
use super::palette::{Palette, PaletteAlgorithm, PaletteMode};
use crate::math::Rgb;

/// Floats at or below this magnitude are treated as noise and never classified
pub const THRESHOLD_EPSILON: f32 = 0.0001;

/// Upper bound on the threshold range list
pub const MAX_THRESHOLD_RANGES: usize = 8;

/// Where thresholding reads its floats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Addressing {
    /// 4-byte boundaries relative to the buffer start
    #[default]
    Aligned,
    /// Every byte position, overlapping reads
    Unaligned,
}

/// Source bytes consumed per output pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementStride {
    #[default]
    Byte,
    /// One pixel per float, compacted
    Float,
}

impl ElementStride {
    pub const fn bytes(self) -> u32 {
        match self {
            ElementStride::Byte => 1,
            ElementStride::Float => 4,
        }
    }
}

/// How the unaligned byte-stride scan advances after a classified float
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnalignedScan {
    /// Test every byte position
    #[default]
    EveryByte,
    /// Jump past the four bytes of a matched float
    SkipMatched,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub addressing: Addressing,
    pub stride: ElementStride,
    /// Pre-fill with the grayscale of raw bytes
    pub grayscale_underlay: bool,
    pub scan: UnalignedScan,
}

impl ThresholdConfig {
    pub const fn new() -> Self {
        Self {
            addressing: Addressing::Aligned,
            stride: ElementStride::Byte,
            grayscale_underlay: true,
            scan: UnalignedScan::EveryByte,
        }
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// How bytes become pixels
///
/// Stride and alignment only exist inside `Thresholding`, so there is no way
/// to ask for a four-byte stride in a mode that ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColorMode {
    Grayscale,
    Thresholding(ThresholdConfig),
    Paletted,
}

impl ColorMode {
    pub fn name(&self) -> &'static str {
        match self {
            ColorMode::Grayscale => "Grayscale",
            ColorMode::Thresholding(_) => "Thresholding",
            ColorMode::Paletted => "Paletted",
        }
    }

    /// Source bytes per pixel, used for paging
    pub fn stride_bytes(&self) -> u32 {
        match self {
            ColorMode::Thresholding(config) => config.stride.bytes(),
            ColorMode::Grayscale | ColorMode::Paletted => 1,
        }
    }

    pub fn is_paletted(&self) -> bool {
        matches!(self, ColorMode::Paletted)
    }
}

impl Default for ColorMode {
    fn default() -> Self {
        ColorMode::Thresholding(ThresholdConfig::new())
    }
}

/// Inclusive float interval with a display color
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRange {
    pub start: f32,
    pub end: f32,
    pub color: Rgb,
    #[serde(default = "enabled_default")]
    pub enabled: bool,
}

fn enabled_default() -> bool {
    true
}

impl ThresholdRange {
    pub const fn new(start: f32, end: f32, color: Rgb) -> Self {
        Self {
            start,
            end,
            color,
            enabled: true,
        }
    }

    pub fn matches(&self, value: f32) -> bool {
        self.enabled && self.start <= value && value <= self.end
    }
}

/// Small values in green, large positives in red, large negatives in blue
pub fn default_threshold_ranges() -> Vec<ThresholdRange> {
    vec![
        ThresholdRange::new(-1.0, 1.0, Rgb::GREEN),
        ThresholdRange::new(0.0, 10000.0, Rgb::RED),
        ThresholdRange::new(-10000.0, 0.0, Rgb::BLUE),
    ]
}

/// Packed RGBA texels, one per window pixel, row-major
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PixelBuffer {
    size: UVec2,
    texels: Vec<u32>,
}

impl PixelBuffer {
    /// Fully transparent buffer of `size`
    pub fn new(size: UVec2) -> Self {
        Self {
            size,
            texels: vec![0; size.x as usize * size.y as usize],
        }
    }

    /// Buffer with nothing to show
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    pub fn texels(&self) -> &[u32] {
        &self.texels
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.texels)
    }

    pub fn len(&self) -> usize {
        self.texels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texels.is_empty()
    }

    pub fn get(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.size.x || y >= self.size.y {
            return None;
        }
        self.texels.get(y as usize * self.size.x as usize + x as usize).copied()
    }
}

/// Convert the bytes selected by `view` into a pixel buffer
///
/// Pure function of its inputs. An empty byte buffer gives an empty pixel
/// buffer; otherwise the result always has `view.size` texels and pixels with
/// no source data stay transparent.
pub fn recompute(
    bytes: &[u8],
    view: WindowView,
    mode: &ColorMode,
    palette: &Palette,
    ranges: &[ThresholdRange],
) -> PixelBuffer {
    if bytes.is_empty() {
        return PixelBuffer::empty();
    }

    let mut pixels = PixelBuffer::new(view.size);
    let offset = view.offset.min(bytes.len() as u64) as usize;
    let out = pixels.texels.as_mut_slice();

    match mode {
        ColorMode::Grayscale => shade_grayscale(bytes, offset, 1, out),
        ColorMode::Thresholding(config) => {
            if config.grayscale_underlay {
                shade_grayscale(bytes, offset, config.stride.bytes() as usize, out);
            }
            threshold(bytes, offset, config, ranges, out);
        }
        ColorMode::Paletted => shade_paletted(bytes, offset, palette, out),
    }

    pixels
}

fn shade_grayscale(bytes: &[u8], offset: usize, stride: usize, out: &mut [u32]) {
    let source = bytes[offset..].iter().step_by(stride);
    for (texel, &v) in out.iter_mut().zip(source) {
        *texel = Rgb::gray(v).to_packed();
    }
}

fn shade_paletted(bytes: &[u8], offset: usize, palette: &Palette, out: &mut [u32]) {
    let lut = palette.packed();
    for (texel, &v) in out.iter_mut().zip(&bytes[offset..]) {
        *texel = lut[v as usize];
    }
}

/// Little-endian f32 at `at`, if all four bytes exist
#[inline]
fn read_f32(bytes: &[u8], at: usize) -> Option<f32> {
    let end = at.checked_add(4)?;
    let raw: [u8; 4] = bytes.get(at..end)?.try_into().ok()?;
    Some(f32::from_le_bytes(raw))
}

/// Color of the first enabled range holding `value`
#[inline]
pub fn classify(value: f32, ranges: &[ThresholdRange]) -> Option<Rgb> {
    if value == 0.0 || value.abs() <= THRESHOLD_EPSILON {
        return None;
    }
    ranges.iter().find(|r| r.matches(value)).map(|r| r.color)
}

#[inline]
fn align_down(at: usize) -> usize {
    at & !3
}

fn threshold(bytes: &[u8], offset: usize, config: &ThresholdConfig, ranges: &[ThresholdRange], out: &mut [u32]) {
    match (config.stride, config.addressing) {
        (ElementStride::Float, addressing) => {
            for (k, texel) in out.iter_mut().enumerate() {
                let unaligned = offset + k * 4;
                let at = match addressing {
                    Addressing::Aligned => align_down(unaligned),
                    Addressing::Unaligned => unaligned,
                };
                let Some(value) = read_f32(bytes, at) else { break };
                if let Some(color) = classify(value, ranges) {
                    *texel = color.to_packed();
                }
            }
        }
        (ElementStride::Byte, Addressing::Aligned) => {
            // The first float may begin before the offset; only its visible slots are written
            let mut at = align_down(offset);
            while at < offset + out.len() {
                let Some(value) = read_f32(bytes, at) else { break };
                if let Some(color) = classify(value, ranges) {
                    let first = at.saturating_sub(offset);
                    let last = (at + 4 - offset).min(out.len());
                    out[first..last].fill(color.to_packed());
                }
                at += 4;
            }
        }
        (ElementStride::Byte, Addressing::Unaligned) => {
            let mut i = 0;
            while i < out.len() {
                let Some(value) = read_f32(bytes, offset + i) else { break };
                match classify(value, ranges) {
                    Some(color) => {
                        let last = (i + 4).min(out.len());
                        out[i..last].fill(color.to_packed());
                        i += match config.scan {
                            UnalignedScan::EveryByte => 1,
                            UnalignedScan::SkipMatched => 4,
                        };
                    }
                    None => i += 1,
                }
            }
        }
    }
}

/// Color mode, palette and threshold ranges, plus the rules for which of
/// their changes are visible
#[derive(Debug, Clone)]
pub struct ColorMapper {
    mode: ColorMode,
    palette: Palette,
    ranges: Vec<ThresholdRange>,
}

impl ColorMapper {
    pub fn new(mode: ColorMode, palette: Palette, ranges: Vec<ThresholdRange>) -> Self {
        let mut ranges = ranges;
        ranges.truncate(MAX_THRESHOLD_RANGES);
        Self { mode, palette, ranges }
    }

    pub fn set_color_mode(&mut self, mode: ColorMode) -> Change {
        if self.mode == mode {
            return Change::Unchanged;
        }
        log::debug!("Color mode {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
        Change::ColorModeChanged
    }

    /// Toggle float stride; only meaningful while thresholding
    pub fn set_four_byte_stride(&mut self, enabled: bool) -> Change {
        let ColorMode::Thresholding(config) = &mut self.mode else {
            log::debug!("Ignoring four-byte stride request in {} mode", self.mode.name());
            return Change::Unchanged;
        };

        let stride = if enabled {
            ElementStride::Float
        } else {
            ElementStride::Byte
        };
        if config.stride == stride {
            return Change::Unchanged;
        }
        config.stride = stride;
        Change::ColorModeChanged
    }

    /// Update range `index`, or append one when `index` is the list length
    ///
    /// Any other index is ignored.
    pub fn set_threshold_range(&mut self, index: usize, start: f32, end: f32, color: Rgb, enabled: bool) -> Change {
        let range = ThresholdRange {
            start,
            end,
            color,
            enabled,
        };

        if let Some(slot) = self.ranges.get_mut(index) {
            if *slot == range {
                return Change::Unchanged;
            }
            *slot = range;
        } else if index == self.ranges.len() && index < MAX_THRESHOLD_RANGES {
            log::debug!("Adding threshold range {} [{}, {}]", index, start, end);
            self.ranges.push(range);
        } else {
            log::debug!("Ignoring threshold range index {} ({} defined)", index, self.ranges.len());
            return Change::Unchanged;
        }

        Change::ThresholdRangesChanged
    }

    pub fn remove_threshold_range(&mut self, index: usize) -> Change {
        if index >= self.ranges.len() {
            return Change::Unchanged;
        }
        self.ranges.remove(index);
        Change::ThresholdRangesChanged
    }

    fn palette_change(&self) -> Change {
        Change::PaletteChanged {
            visible: self.mode.is_paletted(),
        }
    }

    pub fn set_palette_mode(&mut self, mode: PaletteMode) -> Change {
        if !self.palette.set_mode(mode) {
            return Change::Unchanged;
        }
        self.palette_change()
    }

    pub fn regenerate_palette(&mut self, algorithm: PaletteAlgorithm) -> Change {
        self.palette.regenerate(algorithm);
        self.palette_change()
    }

    pub fn shuffle_palette(&mut self) -> Change {
        self.palette.shuffle();
        self.palette_change()
    }

    pub fn shuffle_palette_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Change {
        self.palette.shuffle_with(rng);
        self.palette_change()
    }

    pub fn recompute(&self, bytes: &[u8], view: WindowView) -> PixelBuffer {
        recompute(bytes, view, &self.mode, &self.palette, &self.ranges)
    }

    pub fn mode(&self) -> ColorMode {
        self.mode
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn threshold_ranges(&self) -> &[ThresholdRange] {
        &self.ranges
    }
}

impl Default for ColorMapper {
    fn default() -> Self {
        Self::new(ColorMode::default(), Palette::default(), default_threshold_ranges())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREEN: u32 = Rgb::GREEN.to_packed();
    const RED: u32 = Rgb::RED.to_packed();

    fn floats(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    fn thresholding(addressing: Addressing, stride: ElementStride, underlay: bool) -> ColorMode {
        ColorMode::Thresholding(ThresholdConfig {
            addressing,
            stride,
            grayscale_underlay: underlay,
            scan: UnalignedScan::EveryByte,
        })
    }

    fn run(bytes: &[u8], offset: u64, w: u32, h: u32, mode: ColorMode) -> PixelBuffer {
        recompute(
            bytes,
            WindowView::new(offset, w, h),
            &mode,
            &Palette::default(),
            &default_threshold_ranges(),
        )
    }

    #[test]
    fn test_grayscale_ramp() {
        let bytes: Vec<u8> = (0..16).map(|i| i * 16).collect();
        let pixels = run(&bytes, 0, 4, 4, ColorMode::Grayscale);

        assert_eq!(pixels.len(), 16);
        for (i, &texel) in pixels.texels().iter().enumerate() {
            let v = (16 * i) as u8;
            assert_eq!(texel, crate::math::pack_rgba(v, v, v, 0xFF));
        }
    }

    #[test]
    fn test_grayscale_short_tail_stays_transparent() {
        let pixels = run(&[10, 20, 30], 1, 2, 2, ColorMode::Grayscale);
        assert_eq!(pixels.texels()[0], Rgb::gray(20).to_packed());
        assert_eq!(pixels.texels()[1], Rgb::gray(30).to_packed());
        assert_eq!(&pixels.texels()[2..], &[0, 0]);
    }

    #[test]
    fn test_offset_at_end_is_empty_effect() {
        let bytes = floats(&[0.5, 2.0]);
        for mode in [
            ColorMode::Grayscale,
            ColorMode::Paletted,
            thresholding(Addressing::Aligned, ElementStride::Byte, true),
            thresholding(Addressing::Unaligned, ElementStride::Byte, true),
            thresholding(Addressing::Aligned, ElementStride::Float, true),
        ] {
            let pixels = run(&bytes, bytes.len() as u64, 4, 4, mode);
            assert_eq!(pixels.len(), 16);
            assert!(pixels.texels().iter().all(|&t| t == 0), "{:?}", mode);
        }
    }

    #[test]
    fn test_empty_buffer_gives_empty_pixels() {
        let pixels = run(&[], 0, 8, 8, ColorMode::Grayscale);
        assert!(pixels.is_empty());
    }

    #[test]
    fn test_first_match_wins() {
        let ranges = [
            ThresholdRange::new(-1.0, 1.0, Rgb::GREEN),
            ThresholdRange::new(0.0, 5.0, Rgb::RED),
        ];
        assert_eq!(classify(0.5, &ranges), Some(Rgb::GREEN));
        assert_eq!(classify(3.0, &ranges), Some(Rgb::RED));
        assert_eq!(classify(7.0, &ranges), None);
    }

    #[test]
    fn test_disabled_range_is_skipped() {
        let mut ranges = [
            ThresholdRange::new(-1.0, 1.0, Rgb::GREEN),
            ThresholdRange::new(0.0, 5.0, Rgb::RED),
        ];
        ranges[0].enabled = false;
        assert_eq!(classify(0.5, &ranges), Some(Rgb::RED));
    }

    #[test]
    fn test_near_zero_is_never_classified() {
        let ranges = [ThresholdRange::new(-1.0, 1.0, Rgb::GREEN)];
        assert_eq!(classify(0.0, &ranges), None);
        assert_eq!(classify(-0.0, &ranges), None);
        assert_eq!(classify(0.0001, &ranges), None);
        assert_eq!(classify(-0.00005, &ranges), None);
        assert_eq!(classify(0.001, &ranges), Some(Rgb::GREEN));
        assert_eq!(classify(f32::NAN, &ranges), None);
    }

    #[test]
    fn test_aligned_byte_stride_broadcasts_to_four_slots() {
        let bytes = floats(&[0.5, 0.0, 500.0]);
        let pixels = run(&bytes, 0, 12, 1, thresholding(Addressing::Aligned, ElementStride::Byte, false));

        assert_eq!(&pixels.texels()[0..4], &[GREEN; 4]);
        assert_eq!(&pixels.texels()[4..8], &[0; 4]);
        assert_eq!(&pixels.texels()[8..12], &[RED; 4]);
    }

    #[test]
    fn test_aligned_reads_relative_to_buffer_start() {
        // Offset 2 sits inside the first float; its last two bytes land in slots 0..2
        let bytes = floats(&[0.5, 500.0]);
        let pixels = run(&bytes, 2, 6, 1, thresholding(Addressing::Aligned, ElementStride::Byte, false));

        assert_eq!(&pixels.texels()[0..2], &[GREEN; 2]);
        assert_eq!(&pixels.texels()[2..6], &[RED; 4]);
    }

    #[test]
    fn test_underlay_survives_unclassified_floats() {
        let bytes = floats(&[0.0, 0.5]);
        let pixels = run(&bytes, 0, 8, 1, thresholding(Addressing::Aligned, ElementStride::Byte, true));

        assert_eq!(&pixels.texels()[0..4], &[Rgb::gray(0).to_packed(); 4]);
        assert_eq!(&pixels.texels()[4..8], &[GREEN; 4]);
    }

    #[test]
    fn test_float_stride_compacts() {
        let bytes = floats(&[0.5, 0.0, 500.0, -500.0]);
        let pixels = run(&bytes, 0, 4, 1, thresholding(Addressing::Aligned, ElementStride::Float, false));

        assert_eq!(pixels.texels(), &[GREEN, 0, RED, Rgb::BLUE.to_packed()]);
    }

    #[test]
    fn test_float_stride_underlay_samples_every_fourth_byte() {
        let bytes = vec![9, 1, 1, 1, 7, 1, 1, 1];
        let pixels = run(&bytes, 0, 2, 1, thresholding(Addressing::Aligned, ElementStride::Float, true));
        // Neither word is a classified float, so the underlay shows through
        assert_eq!(pixels.texels(), &[Rgb::gray(9).to_packed(), Rgb::gray(7).to_packed()]);
    }

    #[test]
    fn test_unaligned_finds_shifted_float() {
        let mut bytes = vec![0u8];
        bytes.extend(floats(&[500.0]));
        bytes.extend([0, 0, 0]);

        let aligned = run(&bytes, 0, 8, 1, thresholding(Addressing::Aligned, ElementStride::Byte, false));
        assert!(aligned.texels().iter().all(|&t| t != RED));

        let unaligned = run(&bytes, 0, 8, 1, thresholding(Addressing::Unaligned, ElementStride::Byte, false));
        assert_eq!(&unaligned.texels()[1..5], &[RED; 4]);
    }

    #[test]
    fn test_unaligned_skip_policy() {
        // 8.0 at byte 0, and a float near 0.5 at byte 3 overlapping its last byte
        let bytes = [0x00, 0x00, 0x00, 0x41, 0x00, 0x00, 0x3F];
        let mut config = ThresholdConfig {
            addressing: Addressing::Unaligned,
            stride: ElementStride::Byte,
            grayscale_underlay: false,
            scan: UnalignedScan::EveryByte,
        };

        let every = run(&bytes, 0, 7, 1, ColorMode::Thresholding(config));
        assert_eq!(every.texels(), &[RED, RED, RED, GREEN, GREEN, GREEN, GREEN]);

        config.scan = UnalignedScan::SkipMatched;
        let skipped = run(&bytes, 0, 7, 1, ColorMode::Thresholding(config));
        assert_eq!(skipped.texels(), &[RED, RED, RED, RED, 0, 0, 0]);
    }

    #[test]
    fn test_paletted_lookup() {
        let palette = Palette::new(PaletteAlgorithm::GoldenAngle, PaletteMode::BlackZero);
        let bytes = [0u8, 1, 255, 7];
        let pixels = recompute(&bytes, WindowView::new(0, 2, 2), &ColorMode::Paletted, &palette, &[]);

        assert_eq!(pixels.texels()[0], Rgb::BLACK.to_packed());
        assert_eq!(pixels.texels()[1], palette.color(1).to_packed());
        assert_eq!(pixels.texels()[2], palette.color(255).to_packed());
        assert_eq!(pixels.get(1, 1), Some(palette.color(7).to_packed()));
        assert_eq!(pixels.get(2, 0), None);
    }

    #[test]
    fn test_four_byte_stride_only_under_thresholding() {
        let mut mapper = ColorMapper::default();
        assert_eq!(mapper.set_four_byte_stride(true), Change::ColorModeChanged);
        assert_eq!(mapper.mode().stride_bytes(), 4);
        assert_eq!(mapper.set_four_byte_stride(true), Change::Unchanged);

        mapper.set_color_mode(ColorMode::Paletted);
        assert_eq!(mapper.set_four_byte_stride(false), Change::Unchanged);
        assert_eq!(mapper.mode(), ColorMode::Paletted);
    }

    #[test]
    fn test_palette_changes_visible_only_when_paletted() {
        let mut mapper = ColorMapper::default();
        assert_eq!(
            mapper.regenerate_palette(PaletteAlgorithm::GoldenAngle),
            Change::PaletteChanged { visible: false }
        );

        mapper.set_color_mode(ColorMode::Paletted);
        assert_eq!(mapper.shuffle_palette(), Change::PaletteChanged { visible: true });
        assert_eq!(
            mapper.set_palette_mode(PaletteMode::BlackZero),
            Change::PaletteChanged { visible: true }
        );
        assert_eq!(mapper.set_palette_mode(PaletteMode::BlackZero), Change::Unchanged);
    }

    #[test]
    fn test_threshold_range_update_append_ignore() {
        let mut mapper = ColorMapper::default();
        assert_eq!(mapper.threshold_ranges().len(), 3);

        assert_eq!(
            mapper.set_threshold_range(0, -2.0, 2.0, Rgb::GREEN, true),
            Change::ThresholdRangesChanged
        );
        assert_eq!(
            mapper.set_threshold_range(0, -2.0, 2.0, Rgb::GREEN, true),
            Change::Unchanged
        );
        assert_eq!(
            mapper.set_threshold_range(3, 1.0, 2.0, Rgb::gray(128), false),
            Change::ThresholdRangesChanged
        );
        assert_eq!(mapper.threshold_ranges().len(), 4);
        assert_eq!(
            mapper.set_threshold_range(10, 1.0, 2.0, Rgb::gray(128), false),
            Change::Unchanged
        );
        assert_eq!(mapper.remove_threshold_range(3), Change::ThresholdRangesChanged);
        assert_eq!(mapper.remove_threshold_range(3), Change::Unchanged);
    }

    #[test]
    fn test_color_mode_serde_shape() {
        let json = r#"{"kind":"thresholding","stride":"float"}"#;
        let mode: ColorMode = serde_json::from_str(json).expect("parse");
        let ColorMode::Thresholding(config) = mode else {
            panic!("wrong variant");
        };
        assert_eq!(config.stride, ElementStride::Float);
        assert_eq!(config.addressing, Addressing::Aligned);

        let mode: ColorMode = serde_json::from_str(r#"{"kind":"paletted"}"#).expect("parse");
        assert_eq!(mode, ColorMode::Paletted);
    }
}
