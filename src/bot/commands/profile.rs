//! Profile Discord commands - register, view and delete user profiles.
//!
//! A profile holds the chat id reminders are delivered to. Without one, the dispatch
//! job has nowhere to send a user's reminders.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, reply_with_error},
        core::profile::{self, ProfileUpdate},
        entities::profile as profile_entity,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    fn or_dash(value: Option<&str>) -> &str {
        value.unwrap_or("—")
    }

    fn public_line(p: &profile_entity::Model) -> String {
        format!(
            "👤 {} ({})",
            or_dash(p.nickname.as_deref()),
            or_dash(p.city.as_deref())
        )
    }

    /// Creates or updates your profile.
    ///
    /// Only the given fields change; pass an empty text to clear one. The chat id is
    /// where your habit reminders are sent.
    #[poise::command(slash_command, prefix_command)]
    pub async fn register(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Messaging chat id for reminders"] chat_id: Option<String>,
        #[description = "Nickname, starts with @ (e.g. @early_bird)"] nickname: Option<String>,
        #[description = "Your city"] city: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let user_id = ctx.author().id.to_string();

        let update = ProfileUpdate {
            nickname,
            chat_id,
            city,
        };
        let is_new = profile::get_profile(db, &user_id).await?.is_none();
        if update.is_empty() && !is_new {
            ctx.say("❌ Please specify at least one field to update.")
                .await?;
            return Ok(());
        }

        match profile::upsert_profile(db, &user_id, update).await {
            Ok(saved) => {
                let mut response = if is_new {
                    String::from("✅ Profile created.\n")
                } else {
                    String::from("✅ Profile updated.\n")
                };
                if saved.chat_id.is_none() {
                    writeln!(
                        &mut response,
                        "⚠️ No chat id set, you won't receive reminders until you add one."
                    )?;
                }
                ctx.say(response).await?;
                Ok(())
            }
            Err(e) => reply_with_error(ctx, e).await,
        }
    }

    /// Shows a profile.
    ///
    /// Without a user, shows your own profile in full. Other users' profiles only show
    /// their nickname and city.
    #[poise::command(slash_command, prefix_command)]
    pub async fn profile(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "User to look up (default: you)"] user: Option<serenity::User>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let author_id = ctx.author().id;
        let target_id = user.as_ref().map_or(author_id, |u| u.id);
        let is_self = target_id == author_id;

        let Some(found) = profile::get_profile(db, &target_id.to_string()).await? else {
            if is_self {
                ctx.say("❌ You don't have a profile yet. Use `/register` to create one.")
                    .await?;
            } else {
                ctx.say("❌ That user has no profile.").await?;
            }
            return Ok(());
        };

        let mut response = String::from("📇 **Profile**\n\n");
        writeln!(
            &mut response,
            "Nickname: {}",
            or_dash(found.nickname.as_deref())
        )?;
        writeln!(&mut response, "City: {}", or_dash(found.city.as_deref()))?;
        if is_self {
            writeln!(
                &mut response,
                "Chat id: {}",
                or_dash(found.chat_id.as_deref())
            )?;
            writeln!(
                &mut response,
                "Registered: {}",
                found.created_at.format("%Y-%m-%d")
            )?;
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Lists all registered profiles (nickname and city only).
    #[poise::command(slash_command, prefix_command)]
    pub async fn profiles(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let db = &ctx.data().database;
        let all = profile::get_all_profiles(db).await?;

        if all.is_empty() {
            ctx.say("No profiles registered yet.").await?;
            return Ok(());
        }

        let mut response = format!("📇 **Profiles** ({})\n\n", all.len());
        for p in &all {
            writeln!(&mut response, "{}", public_line(p))?;
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Deletes your profile and all of your habits.
    #[poise::command(slash_command, prefix_command)]
    pub async fn delete_profile(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Type true to confirm, this also deletes your habits"] confirm: bool,
    ) -> Result<()> {
        if !confirm {
            ctx.say("❌ Nothing deleted. Pass `confirm: true` to delete your profile.")
                .await?;
            return Ok(());
        }

        let db = &ctx.data().database;
        let user_id = ctx.author().id.to_string();

        match profile::delete_profile(db, &user_id).await {
            Ok(removed) => {
                ctx.say(format!(
                    "✅ Profile deleted along with {removed} habit(s)."
                ))
                .await?;
                Ok(())
            }
            Err(e) => reply_with_error(ctx, e).await,
        }
    }
}

// Re-export all commands
pub use inner::*;
