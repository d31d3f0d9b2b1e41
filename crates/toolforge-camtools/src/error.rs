//! Error types for the toolpath kernel.
//!
//! Degenerate geometry never surfaces here: builders degrade to comment-only
//! output. The only failure is the generation boundary itself.

use thiserror::Error;

/// Errors that can occur while generating a program.
#[derive(Error, Debug)]
pub enum CamToolError {
    /// G-code generation failed.
    #[error("G-code generation failed: {0}")]
    GenerationFailed(String),
}

/// Result type alias for kernel operations.
pub type CamToolResult<T> = Result<T, CamToolError>;
