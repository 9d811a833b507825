//! Sowline Core - Domain types for construction scope-of-work budgets.

mod error;
mod registry;
mod types;

pub use error::{Error, Result};
pub use registry::*;
pub use types::*;
