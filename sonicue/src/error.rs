//! Error types for Sonicue

use crate::content::DecodeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SonicueError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Content decoder failure: {0}")]
    Underlying(#[from] DecodeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Lifecycle violation: {0}")]
    LifecycleViolation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl SonicueError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub(crate) fn lifecycle(message: impl Into<String>) -> Self {
        Self::LifecycleViolation(message.into())
    }
}

pub type Result<T> = std::result::Result<T, SonicueError>;
