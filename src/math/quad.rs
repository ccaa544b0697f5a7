use glam::{UVec2, Vec2};

/// Vertex of the display quad as laid out in the GPU vertex buffer
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
    pub tex_coords: [f32; 2],
}

impl QuadVertex {
    pub const fn new(position: [f32; 2], tex_coords: [f32; 2]) -> Self {
        Self { position, tex_coords }
    }
}

/// Screen quad in clip space, triangle-strip order:
/// top-left, bottom-left, top-right, bottom-right
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Quad {
    pub vertices: [QuadVertex; 4],
}

impl Quad {
    pub fn top_left(&self) -> QuadVertex {
        self.vertices[0]
    }

    pub fn bottom_left(&self) -> QuadVertex {
        self.vertices[1]
    }

    pub fn top_right(&self) -> QuadVertex {
        self.vertices[2]
    }

    pub fn bottom_right(&self) -> QuadVertex {
        self.vertices[3]
    }

    /// Raw bytes for a vertex buffer upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

impl Default for Quad {
    fn default() -> Self {
        compute_quad(Vec2::ZERO, 1.0, UVec2::ONE, UVec2::ONE)
    }
}

/// [0, 1] to [-1, 1]
#[inline]
fn to_clip_space(coord: f32) -> f32 {
    coord * 2.0 - 1.0
}

/// Compute the clip-space quad that shows a `window_size` texture at `position`
/// (source pixels, Y down) with zoom `scale` inside a `viewport_size` surface.
///
/// The window/viewport ratio keeps one texel mapped to one surface pixel at
/// scale 1 no matter how the two sizes differ.
pub fn compute_quad(position: Vec2, scale: f32, window_size: UVec2, viewport_size: UVec2) -> Quad {
    let window = window_size.max(UVec2::ONE).as_vec2();
    let viewport = viewport_size.max(UVec2::ONE).as_vec2();

    let left_px = position.x;
    let right_px = left_px + window.x;
    let bottom_px = window.y - position.y;
    let top_px = bottom_px - window.y;

    let ratio = window / viewport;

    let left = to_clip_space(left_px / window.x * ratio.x) / scale;
    let right = to_clip_space(right_px / window.x * ratio.x) / scale;
    let top = to_clip_space(top_px / window.y * ratio.y) / scale;
    let bottom = to_clip_space(bottom_px / window.y * ratio.y) / scale;

    Quad {
        vertices: [
            QuadVertex::new([left, top], [0.0, 1.0]),
            QuadVertex::new([left, bottom], [0.0, 0.0]),
            QuadVertex::new([right, top], [1.0, 1.0]),
            QuadVertex::new([right, bottom], [1.0, 0.0]),
        ],
    }
}
