use super::errors::{RenderError, Result};

/// Name of the program that draws the byte window
pub const SCREEN_SHADER: &str = "screen";

/// Resolves a logical shader name to WGSL source
pub trait ShaderProvider {
    fn source(&self, name: &str) -> Result<&str>;
}

/// Shaders compiled into the binary
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinShaders;

impl ShaderProvider for BuiltinShaders {
    fn source(&self, name: &str) -> Result<&str> {
        match name {
            SCREEN_SHADER => Ok(include_str!("../shaders/screen.wgsl")),
            other => Err(RenderError::UnknownShader(other.to_string())),
        }
    }
}

/// Compile `name` from `provider`, failing on validation errors instead of
/// letting wgpu panic later at pipeline creation
pub fn compile(device: &wgpu::Device, provider: &dyn ShaderProvider, name: &str) -> Result<wgpu::ShaderModule> {
    let source = provider.source(name)?;

    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(name),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    if let Some(error) = pollster::block_on(device.pop_error_scope()) {
        return Err(RenderError::ShaderValidation {
            name: name.to_string(),
            message: error.to_string(),
        });
    }

    log::debug!("Compiled shader '{}'", name);
    Ok(module)
}
