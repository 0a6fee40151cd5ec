/// Open Packaging Conventions (OPC) layer.
///
/// Loads and saves the zip container, names parts with [`PackURI`] and
/// exposes the relationship graph. Nothing here knows about slides.
///
/// - `phys_pkg`: zip entries in, zip entries out, order and compression kept
/// - `package`: part table, relationship lookup, integrity checks
/// - `rel`: `.rels` parsing and target resolution

pub mod constants;
pub mod package;
pub mod packuri;
pub mod phys_pkg;
pub mod rel;

// Re-export commonly used types
pub use package::{DanglingRelationship, Package};
pub use packuri::PackURI;
pub use rel::{Relationship, Relationships};
