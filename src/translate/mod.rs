//! Translation backends.
//!
//! The engine sees translation as one opaque batch transform per part:
//! a list of `{id, role, text}` elements goes in, exactly one `{id, text}`
//! per element comes out. [`retry::translate_with_retry`] wraps a
//! [`Translator`] with timeouts, cancellation and exponential backoff and
//! checks the one-output-per-id contract.

pub mod backends;
#[cfg(feature = "http")]
pub mod http;
pub mod retry;

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ooxml::pptx::Role;

pub use backends::{BuiltinTranslator, IdentityTranslator, MockTranslator};
#[cfg(feature = "http")]
pub use http::HttpTranslator;
pub use retry::translate_with_retry;

/// A text slot sent for translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationElement {
    pub id: String,
    pub role: Role,
    pub text: String,
}

/// A translated text slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedElement {
    pub id: String,
    pub text: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    #[error("Translation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Translation was cancelled")]
    Cancelled,

    #[error("Translation backend failed: {0}")]
    Backend(String),

    #[error("Translation backend returned nothing for {id}")]
    MissingOutput { id: String },

    #[error("Translation backend returned unknown or repeated id {id}")]
    UnexpectedOutput { id: String },
}

/// A batch text transform.
///
/// Implementations receive only non-empty texts. They may return outputs
/// in any order but must return exactly one per input id.
pub trait Translator: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    fn translate_batch(
        &self,
        context: &str,
        elements: &[TranslationElement],
    ) -> impl Future<Output = Result<Vec<TranslatedElement>, TranslationError>> + Send;
}

impl<T: Translator> Translator for std::sync::Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn translate_batch(
        &self,
        context: &str,
        elements: &[TranslationElement],
    ) -> impl Future<Output = Result<Vec<TranslatedElement>, TranslationError>> + Send {
        (**self).translate_batch(context, elements)
    }
}
