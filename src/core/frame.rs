/// What the pipeline did during one displayed frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub number: u64,
    pub quad_recomputes: u32,
    pub texture_recomputes: u32,
    pub uploads: u32,
    pub draws: u32,
    /// Draw call dropped because there was nothing to show
    pub skipped: bool,
}

impl FrameStats {
    pub fn new(number: u64) -> Self {
        Self {
            number,
            ..Default::default()
        }
    }

    /// True when nothing had to be recomputed or uploaded
    pub fn is_idle(&self) -> bool {
        self.quad_recomputes == 0 && self.texture_recomputes == 0 && self.uploads == 0
    }
}
