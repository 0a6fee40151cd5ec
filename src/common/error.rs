//! Unified error type for the mirrordeck library.
//!
//! Each stage of the pipeline has its own error enum; this module gathers them
//! so that callers which do not care about the stage can use `?` throughout.
use thiserror::Error;

use crate::config::ConfigError;
use crate::ooxml::error::{FormatError, ValidationError};
use crate::ooxml::pptx::selection::SelectionError;
use crate::translate::TranslationError;

/// Main error type for mirrordeck operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The input was rejected as a package
    #[error(transparent)]
    Format(#[from] FormatError),

    /// The rebuilt package failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Translation backend failed
    #[error(transparent)]
    Translation(#[from] TranslationError),

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Slide selection expression is invalid
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// Record interchange (de)serialization failed
    #[error("Interchange error: {0}")]
    Interchange(#[from] serde_json::Error),
}

/// Result type for mirrordeck operations.
pub type Result<T> = std::result::Result<T, Error>;
