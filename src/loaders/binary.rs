use anyhow::{Context, Result};
use std::path::Path;

use crate::config::ViewerConfig;
use crate::core::ByteBuffer;

/// Read a whole file as an opaque byte buffer
pub fn load_binary(path: impl AsRef<Path>) -> Result<ByteBuffer> {
    let path = path.as_ref();
    log::info!("Loading binary file: {:?}", path);

    let bytes = std::fs::read(path).context(format!("Failed to read binary file: {:?}", path))?;
    if bytes.is_empty() {
        log::warn!("{:?} is empty, nothing will be drawn", path);
    }

    log::info!("Loaded {} bytes", bytes.len());
    Ok(ByteBuffer::new(bytes))
}

/// Read start-up settings from a JSON file
pub fn load_config(path: impl AsRef<Path>) -> Result<ViewerConfig> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).context(format!("Failed to read config file: {:?}", path))?;
    let config = ViewerConfig::from_json(&text).context(format!("Invalid config file: {:?}", path))?;

    log::debug!("Config from {:?}: {:?}", path, config);
    Ok(config)
}
