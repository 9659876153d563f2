//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// General utility commands
pub mod general;

/// Habit management commands
pub mod habit;

/// Profile commands
pub mod profile;

// Export commands
pub use general::*;
pub use habit::*;
pub use profile::*;
