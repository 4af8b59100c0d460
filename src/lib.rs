//! Library interface for debdoctor (debdoc)
//!
//! This library exposes the snapshot loader, the closure analyzer and the
//! report renderers for testing and potential future use.

pub mod analyze;
pub mod commands;
pub mod error;
pub mod report;
pub mod status;

// Re-export the types most callers need
pub use analyze::{Analyzer, Diagnosis, UnmetDependency};
pub use status::{PackageId, PackageIndex};
