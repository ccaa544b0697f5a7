pub mod binary;

pub use binary::{load_binary, load_config};
