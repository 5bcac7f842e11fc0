use crate::gl::ShaderStage;

/// Failures raised while bringing up or driving the renderer.
///
/// Compile and link failures are recoverable: the caller keeps drawing with
/// whatever program was current before the failed build.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("{stage} shader compile error: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    #[error("program link error: {0}")]
    ProgramLink(String),

    #[error("no WebGL2 context available: {0}")]
    MissingContext(String),

    #[error("backend object creation failed: {0}")]
    ResourceCreation(String),

    #[error("renderer has not been initialized")]
    NotInitialized,
}

/// Rejections raised while assembling the shader catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("shader catalog is empty")]
    Empty,

    #[error("shader '{0}' does not define `void mainImage(out vec4, in vec2)`")]
    MissingEntryPoint(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PixelBufferError {
    #[error("pixel buffer holds {actual} bytes, expected {expected} for {width}x{height} RGBA")]
    LengthMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("{width}x{height} RGBA does not fit in memory")]
    TooLarge { width: u32, height: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for data-{key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}
