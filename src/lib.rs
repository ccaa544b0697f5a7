pub mod camera;
pub mod cli;
pub mod config;
pub mod core;
pub mod gui;
pub mod loaders;
pub mod math;

pub use camera::Camera;
pub use config::ViewerConfig;
pub use crate::core::{ColorMode, RenderBackend, Visualizer};
