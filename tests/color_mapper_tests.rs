use binviz::core::{
    classify, default_threshold_ranges, recompute, Addressing, ColorMode, ElementStride, Palette, ThresholdConfig,
    ThresholdRange, UnalignedScan, WindowView,
};
use binviz::math::Rgb;

fn floats(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn thresholding(addressing: Addressing, stride: ElementStride) -> ColorMode {
    ColorMode::Thresholding(ThresholdConfig {
        addressing,
        stride,
        grayscale_underlay: false,
        scan: UnalignedScan::EveryByte,
    })
}

fn all_modes() -> Vec<ColorMode> {
    let mut modes = vec![ColorMode::Grayscale, ColorMode::Paletted];
    for addressing in [Addressing::Aligned, Addressing::Unaligned] {
        for stride in [ElementStride::Byte, ElementStride::Float] {
            for underlay in [false, true] {
                for scan in [UnalignedScan::EveryByte, UnalignedScan::SkipMatched] {
                    modes.push(ColorMode::Thresholding(ThresholdConfig {
                        addressing,
                        stride,
                        grayscale_underlay: underlay,
                        scan,
                    }));
                }
            }
        }
    }
    modes
}

// ============================================================================
// Bounds
// ============================================================================

#[test]
fn test_every_mode_every_offset_stays_in_bounds() {
    let bytes = floats(&[0.5, 2.0, -3.0, 1e6, 0.25]);
    let palette = Palette::default();
    let ranges = default_threshold_ranges();

    for mode in all_modes() {
        for offset in 0..=bytes.len() as u64 + 2 {
            for (w, h) in [(1, 1), (3, 2), (8, 8)] {
                let pixels = recompute(&bytes, WindowView::new(offset, w, h), &mode, &palette, &ranges);
                assert_eq!(pixels.len(), (w * h) as usize, "{:?} at {}", mode, offset);
            }
        }
    }
}

#[test]
fn test_offset_at_end_is_untouched_in_every_mode() {
    let bytes = floats(&[0.5, 2.0, -3.0]);
    let palette = Palette::default();
    let ranges = default_threshold_ranges();

    for mode in all_modes() {
        let pixels = recompute(&bytes, WindowView::new(bytes.len() as u64, 4, 4), &mode, &palette, &ranges);
        assert!(pixels.texels().iter().all(|&t| t == 0), "{:?}", mode);
    }
}

// ============================================================================
// Classification
// ============================================================================

#[test]
fn test_overlapping_ranges_first_match_wins() {
    let ranges = [
        ThresholdRange::new(-1.0, 1.0, Rgb::GREEN),
        ThresholdRange::new(0.0, 5.0, Rgb::RED),
    ];
    let bytes = floats(&[0.5]);
    let pixels = recompute(
        &bytes,
        WindowView::new(0, 1, 1),
        &thresholding(Addressing::Aligned, ElementStride::Float),
        &Palette::default(),
        &ranges,
    );
    assert_eq!(pixels.texels(), &[Rgb::GREEN.to_packed()]);
}

#[test]
fn test_default_ranges() {
    let ranges = default_threshold_ranges();
    assert_eq!(classify(0.5, &ranges), Some(Rgb::GREEN));
    assert_eq!(classify(-0.5, &ranges), Some(Rgb::GREEN));
    assert_eq!(classify(1234.0, &ranges), Some(Rgb::RED));
    assert_eq!(classify(-1234.0, &ranges), Some(Rgb::BLUE));
    assert_eq!(classify(10001.0, &ranges), None);
    assert_eq!(classify(f32::INFINITY, &ranges), None);
}

#[test]
fn test_inclusive_bounds() {
    let ranges = [ThresholdRange::new(2.0, 4.0, Rgb::RED)];
    assert_eq!(classify(2.0, &ranges), Some(Rgb::RED));
    assert_eq!(classify(4.0, &ranges), Some(Rgb::RED));
    assert_eq!(classify(4.0001, &ranges), None);
}

// ============================================================================
// Addressing
// ============================================================================

#[test]
fn test_float_stride_unaligned_reads_from_offset() {
    // Shifted by one byte: aligned reads only see denormal fragments
    let mut bytes = vec![0xEEu8];
    bytes.extend(floats(&[0.5, 0.5]));

    let ranges = default_threshold_ranges();
    let palette = Palette::default();
    let view = WindowView::new(1, 2, 1);

    let unaligned = recompute(&bytes, view, &thresholding(Addressing::Unaligned, ElementStride::Float), &palette, &ranges);
    assert_eq!(unaligned.texels(), &[Rgb::GREEN.to_packed(); 2]);

    let aligned = recompute(&bytes, view, &thresholding(Addressing::Aligned, ElementStride::Float), &palette, &ranges);
    assert!(aligned.texels().iter().all(|&t| t == 0));
}

#[test]
fn test_grayscale_underlay_then_overlay() {
    let mut bytes = floats(&[2.0]);
    bytes.extend([7, 7, 7, 7]);
    let mode = ColorMode::Thresholding(ThresholdConfig {
        grayscale_underlay: true,
        ..ThresholdConfig::new()
    });

    let pixels = recompute(&bytes, WindowView::new(0, 8, 1), &mode, &Palette::default(), &default_threshold_ranges());
    assert_eq!(&pixels.texels()[..4], &[Rgb::RED.to_packed(); 4]);
    assert_eq!(&pixels.texels()[4..], &[Rgb::gray(7).to_packed(); 4]);
}
