//! PresentationML transformation.
//!
//! - [`presentation`]: slide, master and layout discovery
//! - [`shape`]: shape-tree element kinds and accessors
//! - [`frame`]: coordinate frames and the mirror transform
//! - [`geometry`]: recursive mirroring of shape trees
//! - [`text`]: text direction, alignment and run rewriting
//! - [`table`]: merge-aware column reversal
//! - [`role`] and [`content`]: text extraction and re-injection
//! - [`selection`]: `1,3-5` slide selection expressions

pub mod content;
pub mod frame;
pub mod geometry;
pub mod presentation;
pub mod role;
pub mod selection;
pub mod shape;
pub mod table;
pub mod text;

pub use content::{ExtractionRecord, InjectionReport, ParagraphSnapshot, extract, inject};
pub use frame::{Frame, Placement};
pub use geometry::{GeometryReport, mirror_part, mirror_presentation};
pub use presentation::{Presentation, SlideRef};
pub use role::Role;
pub use selection::{SelectionError, SlideSelection};
