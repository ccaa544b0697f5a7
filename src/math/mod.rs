mod color;
mod quad;

pub use color::{hsv_to_rgb, pack_rgba, Rgb};
pub use quad::{compute_quad, Quad, QuadVertex};
