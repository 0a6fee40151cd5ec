//! XML text helpers shared by the tree model and the writers.
pub mod escape;

pub use escape::{escape_text, escape_xml, unescape_xml};
