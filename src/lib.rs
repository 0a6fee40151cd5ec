//! Mirrordeck - right-to-left mirroring and translation injection for
//! PowerPoint (.pptx) presentations
//!
//! This library converts a left-to-right presentation into a mirrored,
//! right-to-left one and substitutes translated text, without corrupting the
//! package's relationship graph.
//!
//! # Features
//!
//! - **Geometry mirroring**: every placement mirrored through nested group
//!   frames, with background, logo and directional-shape heuristics
//! - **Text direction**: alignment, paragraph and run direction, including
//!   the master and list-style inheritance chain
//! - **Tables**: merge-aware column reversal
//! - **Charts**: title, axis, series and category text, horizontal bar axes
//! - **Translation**: role-aware extraction records, a pluggable batch
//!   [`Translator`](translate::Translator), isolated per-element failures
//! - **Lossless XML**: unknown markup, comments and entity references are
//!   carried through untouched
//!
//! # Example - Mirroring a deck
//!
//! ```no_run
//! use mirrordeck::config::EngineConfig;
//! use mirrordeck::pipeline::Engine;
//! use mirrordeck::translate::IdentityTranslator;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = Engine::new(EngineConfig::default(), IdentityTranslator);
//! let processed = engine
//!     .transform_file("deck.pptx".as_ref(), "deck-rtl.pptx".as_ref())
//!     .await?;
//! println!("{:?} (exit code {})", processed.report.outcome, processed.report.exit_code());
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Selected slides with mock translations
//!
//! ```no_run
//! use mirrordeck::config::EngineConfig;
//! use mirrordeck::pipeline::Engine;
//! use mirrordeck::translate::MockTranslator;
//!
//! # async fn run(bytes: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let engine = Engine::new(EngineConfig::default(), MockTranslator)
//!     .with_selection("1,3-5".parse()?);
//! let processed = engine.transform("deck.pptx", bytes).await;
//! for warning in &processed.report.warnings {
//!     println!("{}: {}", warning.part, warning.message);
//! }
//! # Ok(())
//! # }
//! ```

/// Shared types: the unified error, EMU units and XML escaping
pub mod common;

/// Engine configuration loaded from YAML
pub mod config;

/// OOXML presentation model
///
/// This module provides the package layer, the lossless XML tree, and the
/// slide and chart transformations.
pub mod ooxml;

/// Orchestration of a document through extraction, translation and rebuild
pub mod pipeline;

/// Translation backends
pub mod translate;

// Re-export commonly used types for convenience
pub use common::{Error, Result};
pub use config::EngineConfig;
pub use ooxml::pptx::{ExtractionRecord, Role, SlideSelection};
pub use pipeline::{DocumentOutcome, DocumentReport, Engine, Processed};
pub use translate::{BuiltinTranslator, TranslationError, Translator};
