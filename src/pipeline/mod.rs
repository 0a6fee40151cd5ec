//! End-to-end document processing.
//!
//! - [`engine`]: prepare, translate and finish one document
//! - [`rebuild`]: write parts back and validate references
//! - [`report`]: outcomes, warnings and exit codes
//! - [`interchange`]: record sets as JSON
//! - [`batch`]: many documents at once

pub mod batch;
pub mod engine;
pub mod interchange;
pub mod rebuild;
pub mod report;

pub use batch::{BatchItem, BatchReport, run_files, run_in_memory};
pub use engine::{Engine, Processed};
pub use interchange::{Interchange, Stage, write_audit};
pub use rebuild::{MutatedPart, Rebuilt, rebuild};
pub use report::{DocumentOutcome, DocumentReport, Rejection, Statistics, Warning};
