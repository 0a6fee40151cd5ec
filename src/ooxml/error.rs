/// Error types for package transformation.
///
/// Each enum corresponds to one severity tier: a [`FormatError`] rejects the
/// whole document, an [`InjectionError`] or [`ElementError`] only affects a
/// single element, and a [`ValidationError`] is raised while rebuilding.
use thiserror::Error;

/// Result type for package and tree operations.
pub type Result<T> = std::result::Result<T, FormatError>;

/// The input is not a usable presentation package.
#[derive(Error, Debug)]
pub enum FormatError {
    /// Bytes are not a readable zip archive
    #[error("Not a package: {0}")]
    NotAPackage(String),

    /// `[Content_Types].xml` is absent
    #[error("Package manifest [Content_Types].xml is missing")]
    MissingManifest,

    /// A part could not be parsed as XML
    #[error("Malformed XML in {part}: {message}")]
    MalformedXml { part: String, message: String },

    /// A part required by the presentation is absent
    #[error("Part not found: {0}")]
    PartNotFound(String),

    /// A part name or relationship target is not a valid pack URI
    #[error("Invalid pack URI: {0}")]
    InvalidPackUri(String),

    /// ZIP archive error while writing
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FormatError {
    /// Build a [`FormatError::MalformedXml`] for a named part.
    pub fn malformed(part: impl Into<String>, message: impl std::fmt::Display) -> Self {
        FormatError::MalformedXml {
            part: part.into(),
            message: message.to_string(),
        }
    }
}

/// Re-injection of translated text into a single container failed.
///
/// The container keeps its original text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InjectionError {
    #[error("No text container matches record {id}")]
    UnmatchedRecord { id: String },

    #[error("Record {id} paragraph {paragraph} received an empty translation")]
    EmptyTranslation { id: String, paragraph: usize },
}

impl InjectionError {
    /// The record id the failure belongs to.
    pub fn id(&self) -> &str {
        match self {
            InjectionError::UnmatchedRecord { id } | InjectionError::EmptyTranslation { id, .. } => {
                id
            },
        }
    }
}

/// A single element could not be transformed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ElementError {
    #[error("Coordinate overflow mirroring {element}")]
    Overflow { element: String },

    #[error("Attribute {attr} rejects value {value:?}")]
    Domain { attr: String, value: String },
}

/// Raised by the rebuild step.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A relationship id or target does not resolve. Fatal for the document.
    #[error("Part {part} references {reference} which does not resolve")]
    DanglingRelationship { part: String, reference: String },

    /// A required text slot did not receive a translation.
    #[error("Record {id} in {part} was not translated")]
    IncompleteInjection { part: String, id: String },

    /// A serialized part failed to re-parse and was reverted.
    #[error("Part {part} failed to re-parse after serialization: {message}")]
    SerializationRoundtripFailed { part: String, message: String },
}

impl ValidationError {
    /// Whether the error blocks delivery of the document.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        matches!(self, ValidationError::DanglingRelationship { .. })
    }
}
