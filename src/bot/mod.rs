//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for HabitBuddy: slash commands for
//! habits and profiles, the shared bot context, and the framework setup. The
//! requester's Discord identity is the owner for every habit operation.

/// Discord command implementations (habit, profile, general)
pub mod commands;

use crate::errors::{Error, Result};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use std::fmt::Write;
use tracing::{error, info};

/// Shared data available to all bot commands.
/// This structure holds the database connection and any other global state
/// that commands need to access.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
}

impl BotData {
    /// Creates a new `BotData` instance with the given database connection.
    #[must_use]
    pub const fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }
}

/// Builds the reply for errors a user can act on.
///
/// Returns `None` for internal errors, which are left to the framework error hook.
pub fn user_facing_message(error: &Error) -> Result<Option<String>> {
    let message = match error {
        Error::Validation { violations } => {
            let mut message = String::from("❌ Habit rejected:\n");
            for violation in violations {
                writeln!(&mut message, "• {violation}")?;
            }
            message
        }
        Error::HabitNotFound { id } => format!("❌ Habit #{id} not found."),
        Error::NotOwner { id } => format!("❌ Habit #{id} belongs to another user."),
        Error::ProfileNotFound { .. } => {
            "❌ You don't have a profile yet. Use `/register` to create one.".to_string()
        }
        Error::InvalidInput { message } => format!("❌ {message}"),
        _ => return Ok(None),
    };
    Ok(Some(message))
}

/// Answers `error` in the channel if it is user-facing, otherwise hands it back.
pub async fn reply_with_error(ctx: poise::Context<'_, BotData, Error>, error: Error) -> Result<()> {
    match user_facing_message(&error)? {
        Some(message) => {
            ctx.say(message).await?;
            Ok(())
        }
        None => Err(error),
    }
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {:?}", ctx.command().name, error);
            if let Err(e) = ctx.say(format!("An error occurred: {error}")).await {
                error!("Failed to send error message: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Starts the Discord client and blocks until it stops.
///
/// # Errors
/// Returns an error if the client cannot be created or the gateway connection fails.
pub async fn run_bot(token: String, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::habits(),
                commands::habit_info(),
                commands::create_habit(),
                commands::update_habit(),
                commands::delete_habit(),
                commands::register(),
                commands::profile(),
                commands::profiles(),
                commands::delete_profile(),
                commands::ping(),
                commands::help(),
            ],
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {:?}", e))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {:?}", e))?;
    Ok(())
}
