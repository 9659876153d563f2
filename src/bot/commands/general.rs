//! General Discord commands - ping, help, and other utility commands.
//! This module contains simple commands that don't require database operations
//! and provide basic bot functionality and user assistance.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    ///
    /// This is a simple health check command that doesn't require any database operations.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**HabitBuddy Help**\n\
        Build good habits with daily reminders sent to your messaging app.\n\n\
        **Habit Commands**\n\
        • `/habits [page]` - Lists your habits and everyone's public habits.\n\
        • `/habit_info <id>` - Shows all details of one of your habits.\n\
        • `/create_habit <time> [name] [action] [place] ...` - Creates a habit.\n\
        • `/update_habit <id> [fields...]` - Changes some fields of a habit.\n\
        • `/delete_habit <id>` - Deletes a habit.\n\n\
        **Profile Commands**\n\
        • `/register [chat_id] [nickname] [city]` - Creates or updates your profile.\n\
        • `/profile [user]` - Shows a profile.\n\
        • `/profiles` - Lists all profiles.\n\
        • `/delete_profile <confirm>` - Deletes your profile and habits.\n\n\
        **Utility Commands**\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.\n\n\
        A habit is rewarded either by an award or by a related pleasant habit, never both. \
        Reminders need a chat id in your profile!";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
