//! Document tree model for XML parts.
//!
//! A [`Tree`] is built from a part's bytes, mutated in place by the
//! transformation passes, and serialized back. Unknown markup is carried
//! through untouched.
pub mod namespace;
pub mod query;
pub mod tree;

pub use namespace as ns;
pub use query::Descendants;
pub use tree::{Attribute, Element, Node, TransformState, Tree};
