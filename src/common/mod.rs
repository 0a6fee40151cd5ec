//! Common types and utilities shared across modules.

pub mod error;
pub mod unit;
pub mod xml;

pub use error::{Error, Result};
pub use unit::{EMUS_PER_INCH, Emu};
