//! Error types for the Hunyuan core.

/// Core error type for configuration and infrastructure failures.
#[derive(Debug, thiserror::Error)]
pub enum HunyuanError {
    /// A required environment variable is not set.
    #[error("missing required environment variable: {0}")]
    MissingEnv(&'static str),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience result type for core operations.
pub type HunyuanResult<T> = Result<T, HunyuanError>;
