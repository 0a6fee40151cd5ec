//! Office Open XML (OOXML) presentation handling.
//!
//! The module is organized into layers:
//!
//! 1. **OPC Layer** (`opc`): zip container, part names, relationships
//! 2. **XML Layer** (`xml`): lossless element trees over part bytes
//! 3. **Format Modules**:
//!    - `pptx`: slides, shape trees, text, tables
//!    - `charts`: chart parts referenced from slides
//!
//! # Example: Mirroring a Slide
//!
//! ```rust,no_run
//! use mirrordeck::config::GeometryConfig;
//! use mirrordeck::ooxml::opc::Package;
//! use mirrordeck::ooxml::pptx::{Presentation, mirror_part};
//! use mirrordeck::ooxml::xml::Tree;
//!
//! let pkg = Package::open_path("deck.pptx")?;
//! let presentation = Presentation::load(&pkg)?;
//! let slide = &presentation.slides[0].part;
//! let mut tree = Tree::parse_part(slide.as_str(), pkg.part(slide).unwrap_or_default())?;
//! let report = mirror_part(&mut tree, presentation.frame(), &GeometryConfig::default());
//! println!("{} shapes mirrored", report.mirrored);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod charts;
pub mod error;
pub mod opc;
pub mod pptx;
pub mod xml;

// Re-export commonly used types from OPC layer
pub use opc::{Package, PackURI};

// Re-export error types
pub use error::{ElementError, FormatError, InjectionError, Result, ValidationError};
