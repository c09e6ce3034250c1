//! Configuration errors raised while building or preparing a render.
//!
//! Nothing in the shading hot path returns these; degenerate geometry is
//! reported as "no intersection" instead.

use ember_math::TransformError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("invalid transform: {0}")]
    Transform(#[from] TransformError),

    #[error("invalid {name}: {reason}")]
    InvalidShape { name: &'static str, reason: String },

    #[error("invalid camera: {0}")]
    InvalidCamera(String),

    #[error("sample count must be positive, got {0}")]
    InvalidSampleCount(u32),
}

/// Result type for render setup operations.
pub type RenderResult<T> = Result<T, RenderError>;
