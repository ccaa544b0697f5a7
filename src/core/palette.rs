use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::math::{hsv_to_rgb, Rgb};

pub const PALETTE_SIZE: usize = 256;

const GOLDEN_ANGLE_DEGREES: f32 = 137.508;

/// Deterministic palette generators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteAlgorithm {
    /// Hue sweeps once over the byte range, value cycles every 16 entries
    #[default]
    Rainbow,
    /// Hue advances by the golden angle per entry
    GoldenAngle,
}

impl PaletteAlgorithm {
    pub const ALL: [PaletteAlgorithm; 2] = [PaletteAlgorithm::Rainbow, PaletteAlgorithm::GoldenAngle];

    pub fn name(&self) -> &'static str {
        match self {
            PaletteAlgorithm::Rainbow => "Rainbow",
            PaletteAlgorithm::GoldenAngle => "Golden angle",
        }
    }

    /// Color for a single byte value
    pub fn color(&self, index: u8) -> Rgb {
        let i = index as f32;
        let (h, s, v) = match self {
            PaletteAlgorithm::Rainbow => {
                let hue = i / 255.0 * 360.0;
                let value = 0.4 + (index % 16) as f32 / 15.0 * 0.6;
                (hue, 1.0, value)
            }
            PaletteAlgorithm::GoldenAngle => {
                let hue = (GOLDEN_ANGLE_DEGREES * i) % 360.0;
                let t = hue / 360.0;
                (hue, 0.6 + t * 0.4, 0.4 + t * 0.5)
            }
        };
        Rgb::from_unit(hsv_to_rgb(h, s, v))
    }
}

/// What happens to entry 0 (usually padding / zeroed memory)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteMode {
    /// Entry 0 is whatever the generator produced
    #[default]
    Generated,
    /// Entry 0 is always black and never shuffled
    BlackZero,
}

/// 256-entry lookup table from byte value to color
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: [Rgb; PALETTE_SIZE],
    mode: PaletteMode,
    algorithm: PaletteAlgorithm,
}

impl Palette {
    pub fn new(algorithm: PaletteAlgorithm, mode: PaletteMode) -> Self {
        let mut palette = Self {
            colors: [Rgb::BLACK; PALETTE_SIZE],
            mode,
            algorithm,
        };
        palette.regenerate(algorithm);
        palette
    }

    /// Refill every entry from `algorithm`
    pub fn regenerate(&mut self, algorithm: PaletteAlgorithm) {
        self.algorithm = algorithm;
        for (index, color) in self.colors.iter_mut().enumerate() {
            *color = algorithm.color(index as u8);
        }
        self.enforce_mode();
    }

    /// Switch the entry-0 rule; turning it off restores the generated color
    pub fn set_mode(&mut self, mode: PaletteMode) -> bool {
        if self.mode == mode {
            return false;
        }
        self.mode = mode;
        match mode {
            PaletteMode::BlackZero => self.enforce_mode(),
            PaletteMode::Generated => self.regenerate(self.algorithm),
        }
        true
    }

    pub fn shuffle(&mut self) {
        self.shuffle_with(&mut rand::rng());
    }

    /// Randomly permute the entries, keeping entry 0 fixed in black-zero mode
    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        match self.mode {
            PaletteMode::Generated => self.colors.shuffle(rng),
            PaletteMode::BlackZero => {
                self.colors[1..].shuffle(rng);
                self.enforce_mode();
            }
        }
    }

    fn enforce_mode(&mut self) {
        if self.mode == PaletteMode::BlackZero {
            self.colors[0] = Rgb::BLACK;
        }
    }

    pub fn color(&self, index: u8) -> Rgb {
        self.colors[index as usize]
    }

    pub fn colors(&self) -> &[Rgb; PALETTE_SIZE] {
        &self.colors
    }

    /// Entries packed as RGBA texels, for the mapper's lookup table
    pub fn packed(&self) -> [u32; PALETTE_SIZE] {
        self.colors.map(Rgb::to_packed)
    }

    pub fn mode(&self) -> PaletteMode {
        self.mode
    }

    /// Generator last used to fill the palette
    pub fn algorithm(&self) -> PaletteAlgorithm {
        self.algorithm
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(PaletteAlgorithm::default(), PaletteMode::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sorted(colors: &[Rgb]) -> Vec<[u8; 3]> {
        let mut out: Vec<[u8; 3]> = colors.iter().map(|c| c.to_array()).collect();
        out.sort();
        out
    }

    #[test]
    fn test_rainbow_first_entries() {
        // hue 0, value 0.4
        assert_eq!(PaletteAlgorithm::Rainbow.color(0), Rgb::new(102, 0, 0));
        // value wraps every 16 entries: index 15 is full brightness
        let c = PaletteAlgorithm::Rainbow.color(15);
        assert_eq!(c.r, 255);
    }

    #[test]
    fn test_golden_angle_first_entry() {
        // hue 0 -> saturation 0.6, value 0.4
        assert_eq!(PaletteAlgorithm::GoldenAngle.color(0), Rgb::new(102, 40, 40));
    }

    #[test]
    fn test_golden_angle_saturation_and_value_follow_hue() {
        // hue 137.508 -> saturation ~0.7528, value ~0.591
        let c = PaletteAlgorithm::GoldenAngle.color(1);
        assert_eq!(c, Rgb::new(37, 150, 70));

        let (max, min) = (c.r.max(c.g).max(c.b) as f32, c.r.min(c.g).min(c.b) as f32);
        assert!((max / 255.0 - 0.591).abs() < 0.005);
        assert!(((max - min) / max - 0.7528).abs() < 0.01);
    }

    #[test]
    fn test_generators_are_deterministic() {
        for algorithm in PaletteAlgorithm::ALL {
            let a = Palette::new(algorithm, PaletteMode::Generated);
            let b = Palette::new(algorithm, PaletteMode::Generated);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_black_zero_after_generation() {
        for algorithm in PaletteAlgorithm::ALL {
            let palette = Palette::new(algorithm, PaletteMode::BlackZero);
            assert_eq!(palette.color(0), Rgb::BLACK);
            assert_eq!(palette.colors().len(), PALETTE_SIZE);
        }
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut palette = Palette::new(PaletteAlgorithm::GoldenAngle, PaletteMode::Generated);
        let before = palette.colors().to_vec();
        palette.shuffle_with(&mut StdRng::seed_from_u64(7));
        assert_eq!(sorted(&before), sorted(palette.colors()));
        assert_ne!(before, palette.colors().to_vec());
    }

    #[test]
    fn test_shuffle_keeps_black_zero() {
        let mut palette = Palette::new(PaletteAlgorithm::Rainbow, PaletteMode::BlackZero);
        let before = palette.colors().to_vec();
        for seed in 0..8 {
            palette.shuffle_with(&mut StdRng::seed_from_u64(seed));
            assert_eq!(palette.color(0), Rgb::BLACK);
        }
        assert_eq!(sorted(&before), sorted(palette.colors()));
    }

    #[test]
    fn test_mode_toggle_restores_generated_zero() {
        let mut palette = Palette::new(PaletteAlgorithm::Rainbow, PaletteMode::Generated);
        let generated_zero = palette.color(0);

        assert!(palette.set_mode(PaletteMode::BlackZero));
        assert_eq!(palette.color(0), Rgb::BLACK);
        assert!(!palette.set_mode(PaletteMode::BlackZero));

        assert!(palette.set_mode(PaletteMode::Generated));
        assert_eq!(palette.color(0), generated_zero);
    }

    #[test]
    fn test_packed_matches_colors() {
        let palette = Palette::default();
        let packed = palette.packed();
        assert_eq!(packed[200], palette.color(200).to_packed());
        assert_eq!(packed[0] >> 24, 0xFF);
    }
}
