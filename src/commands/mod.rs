//! Command implementations for the debdoc CLI
//!
//! - **list**: state-based package listings (residual, installed, uncommon)
//! - **large**: large manually-installed packages
//! - **diagnosis**: unmet dependencies and unneeded packages

pub mod diagnosis;
pub mod large;
pub mod list;

pub use diagnosis::diagnosis;
pub use large::large;
pub use list::{config, installed, uncommon};
