/// Failures while setting up or driving the GPU side of the viewer
///
/// All of these are start-up failures except `Surface`, which the render
/// loop recovers from by reconfiguring.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Shader '{0}' not found")]
    UnknownShader(String),

    #[error("Shader '{name}' failed validation: {message}")]
    ShaderValidation { name: String, message: String },

    #[error("Failed to find appropriate adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("Failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("Failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("Failed to acquire surface texture: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("Surface reports no supported formats")]
    NoSurfaceFormat,
}

pub type Result<T> = std::result::Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = RenderError::UnknownShader("blit".into());
        assert_eq!(err.to_string(), "Shader 'blit' not found");

        let err = RenderError::ShaderValidation {
            name: "screen".into(),
            message: "bad token".into(),
        };
        assert_eq!(err.to_string(), "Shader 'screen' failed validation: bad token");
    }

    #[test]
    fn test_surface_error_conversion() {
        let err: RenderError = wgpu::SurfaceError::Lost.into();
        assert!(matches!(err, RenderError::Surface(wgpu::SurfaceError::Lost)));
    }
}
