//! Core error types used across the system

use thiserror::Error;

use crate::codes::InvalidCodeError;
use crate::locale::InvalidLocaleError;

/// Core error type for the kernel
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    InvalidCode(#[from] InvalidCodeError),

    #[error(transparent)]
    InvalidLocale(#[from] InvalidLocaleError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        CoreError::NotFound(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        CoreError::Configuration(message.into())
    }
}
