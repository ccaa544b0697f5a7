pub mod backend;
pub mod color_mapper;
pub mod controller;
pub mod data_window;
pub mod dirty;
pub mod errors;
pub mod frame;
pub mod gpu_context;
pub mod input_adapter;
pub mod palette;
pub mod shader;
pub mod surface_renderer;
pub mod visualizer;

pub use backend::{BackendCall, RecordingBackend, RenderBackend};
pub use color_mapper::{
    classify, default_threshold_ranges, recompute, Addressing, ColorMapper, ColorMode, ElementStride,
    PixelBuffer, ThresholdConfig, ThresholdRange, UnalignedScan, MAX_THRESHOLD_RANGES,
};
pub use controller::{InputEvent, InputSource, ViewInput};
pub use data_window::{ByteBuffer, DataWindow, WindowView, DEFAULT_SIZE_LIMIT};
pub use dirty::{Change, DirtyState, Invalidation};
pub use errors::RenderError;
pub use frame::FrameStats;
pub use gpu_context::GpuContext;
pub use input_adapter::{WinitController, ZOOM_STEP};
pub use palette::{Palette, PaletteAlgorithm, PaletteMode, PALETTE_SIZE};
pub use shader::{BuiltinShaders, ShaderProvider, SCREEN_SHADER};
pub use surface_renderer::SurfaceRenderer;
pub use visualizer::Visualizer;
