//! Unified error types for `HabitBuddy`.
//!
//! Every fallible operation in the crate returns [`Result`]. Validation and
//! authorization failures are kept as distinct variants so the bot layer can
//! answer them directly, while delivery failures never leave the dispatch job.

use crate::core::validation::RuleViolation;
use thiserror::Error;

/// Application error type
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// One or more habit invariants were violated
    #[error("Habit rejected: {}", format_violations(.violations))]
    Validation {
        /// Every rule that failed for the candidate habit
        violations: Vec<RuleViolation>,
    },

    /// Habit id does not exist
    #[error("Habit #{id} not found")]
    HabitNotFound {
        /// Requested habit id
        id: i64,
    },

    /// User has no profile yet
    #[error("Profile for user {user_id} not found")]
    ProfileNotFound {
        /// Discord user id
        user_id: String,
    },

    /// Requester does not own the habit
    #[error("Habit #{id} belongs to another user")]
    NotOwner {
        /// Requested habit id
        id: i64,
    },

    /// User input could not be parsed
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// What was wrong with the input
        message: String,
    },

    /// Messaging API rejected or failed to receive a message
    #[error("Delivery error: {message}")]
    Delivery {
        /// Failure description
        message: String,
    },

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// String formatting failed
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Serenity/Poise framework error
    #[error("Serenity/Poise framework error: {0}")]
    #[allow(clippy::enum_variant_names)]
    FrameworkError(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::FrameworkError(Box::new(value))
    }
}

impl From<Vec<RuleViolation>> for Error {
    fn from(violations: Vec<RuleViolation>) -> Self {
        Self::Validation { violations }
    }
}

fn format_violations(violations: &[RuleViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
