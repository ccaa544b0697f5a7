use serde::{Deserialize, Serialize};

/// 8-bit RGB color as shown in the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0x00, 0x00, 0x00);
    pub const RED: Rgb = Rgb::new(0xFF, 0x00, 0x00);
    pub const GREEN: Rgb = Rgb::new(0x00, 0xFF, 0x00);
    pub const BLUE: Rgb = Rgb::new(0x00, 0x00, 0xFF);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Gray level with all channels set to `v`
    pub const fn gray(v: u8) -> Self {
        Self::new(v, v, v)
    }

    /// Build from floating point channels in `[0, 1]`
    pub fn from_unit(rgb: [f32; 3]) -> Self {
        let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0) as u8;
        Self::new(to_byte(rgb[0]), to_byte(rgb[1]), to_byte(rgb[2]))
    }

    /// Pack as an opaque RGBA texel (red in the low byte)
    pub const fn to_packed(self) -> u32 {
        pack_rgba(self.r, self.g, self.b, 0xFF)
    }

    /// Unpack an RGBA texel, dropping alpha
    pub const fn from_packed(texel: u32) -> Self {
        Self::new(
            (texel & 0xFF) as u8,
            ((texel >> 8) & 0xFF) as u8,
            ((texel >> 16) & 0xFF) as u8,
        )
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(c: [u8; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }
}

/// Pack channels into the little-endian layout of an `Rgba8Unorm` texel
#[inline]
pub const fn pack_rgba(r: u8, g: u8, b: u8, a: u8) -> u32 {
    ((a as u32) << 24) | ((b as u32) << 16) | ((g as u32) << 8) | (r as u32)
}

/// Convert HSV to RGB
///
/// * `h` - hue in degrees, wrapped into `[0, 360)`
/// * `s`, `v` - saturation and value in `[0, 1]`
///
/// Returns channels in `[0, 1]`.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [f32; 3] {
    let c = v * s;
    let h_prime = h.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - ((h_prime % 2.0) - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match h_prime as i32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    [r + m, g + m, b + m]
}
