//! Habit Discord commands - list, inspect, create, update and delete habits.
//!
//! The command author is always the owner: new habits are created under their id and
//! only their own habits can be inspected, edited or deleted. Listing shows their
//! habits plus everyone's public ones.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, reply_with_error},
        core::{
            habit::{self, HABITS_PAGE_SIZE},
            notification,
            validation::{HabitDraft, HabitPatch, text_change},
        },
        entities::habit as habit_entity,
        errors::{Error, Result},
    };
    use std::fmt::Write;

    fn describe(habit: &habit_entity::Model) -> String {
        let name = habit.name.as_deref().unwrap_or("Unnamed habit");
        let kind = if habit.is_pleasant { "🌸" } else { "🎯" };
        let visibility = if habit.is_public { "public" } else { "private" };
        format!(
            "{kind} **#{}** {name} at {} (every {} day(s), {visibility})",
            habit.id,
            habit.scheduled_time.format("%H:%M"),
            habit.periodicity,
        )
    }

    fn parse_execution_time(input: Option<String>) -> Result<Option<i32>> {
        input
            .as_deref()
            .map(notification::parse_execution_time)
            .transpose()
    }

    /// Lists your habits and all public habits.
    ///
    /// Results are paged, five habits per page.
    #[poise::command(slash_command, prefix_command)]
    pub async fn habits(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Page number (starts at 1)"] page: Option<u64>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let owner_id = ctx.author().id.to_string();
        let page = page.unwrap_or(1).max(1);

        let (habits, total_pages) =
            habit::get_habits_page_for_owner_or_public(db, &owner_id, page - 1).await?;

        if habits.is_empty() {
            if total_pages == 0 {
                ctx.say("📂 No habits yet. Create one with `/create_habit` to get started!")
                    .await?;
            } else {
                ctx.say(format!("❌ Page {page} is empty, there are {total_pages} page(s)."))
                    .await?;
            }
            return Ok(());
        }

        let mut response = format!("📂 **Habits** (page {page}/{total_pages})\n\n");
        for h in &habits {
            let marker = if h.owner_id == owner_id { "" } else { " 👥" };
            writeln!(&mut response, "{}{marker}", describe(h))?;
        }
        if page < total_pages {
            writeln!(
                &mut response,
                "\nShowing {HABITS_PAGE_SIZE} per page. Use `/habits {}` for more.",
                page + 1
            )?;
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Shows every detail of one of your habits.
    #[poise::command(slash_command, prefix_command)]
    pub async fn habit_info(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Habit ID"] id: i64,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let owner_id = ctx.author().id.to_string();

        let habit = match habit::get_habit_for_owner(db, &owner_id, id).await {
            Ok(habit) => habit,
            Err(e) => return reply_with_error(ctx, e).await,
        };

        let related_name = match habit.related_habit_id {
            Some(related_id) => habit::get_habit_by_id(db, related_id)
                .await?
                .and_then(|related| related.name),
            None => None,
        };

        let mut response = format!("📋 **Habit #{}**\n\n", habit.id);
        let or_dash = |value: &Option<String>| value.clone().unwrap_or_else(|| "—".to_string());
        writeln!(&mut response, "📝 Name: {}", or_dash(&habit.name))?;
        writeln!(&mut response, "🏃 Action: {}", or_dash(&habit.action))?;
        writeln!(&mut response, "📍 Place: {}", or_dash(&habit.place))?;
        writeln!(
            &mut response,
            "⏰ Time: {}",
            habit.scheduled_time.format("%H:%M:%S")
        )?;
        writeln!(&mut response, "🔁 Every {} day(s)", habit.periodicity)?;
        writeln!(
            &mut response,
            "⏱️ Execution time: {}",
            notification::format_execution_time(habit.execution_time_secs)
        )?;
        writeln!(
            &mut response,
            "🎁 Reward: {}",
            notification::reward_description(habit.award.as_deref(), related_name.as_deref())
        )?;
        if let Some(related_id) = habit.related_habit_id {
            writeln!(&mut response, "🔗 Related habit: #{related_id}")?;
        }
        writeln!(
            &mut response,
            "🌸 Pleasant: {}",
            if habit.is_pleasant { "Yes" } else { "No" }
        )?;
        writeln!(
            &mut response,
            "👥 Visibility: {}",
            if habit.is_public { "Public" } else { "Private" }
        )?;

        ctx.say(response).await?;
        Ok(())
    }

    /// Creates a new habit.
    ///
    /// A habit can be rewarded either by a free-text award or by a related pleasant
    /// habit, not both. Pleasant habits carry neither.
    #[allow(clippy::too_many_arguments)]
    #[poise::command(slash_command, prefix_command)]
    pub async fn create_habit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Reminder time (HH:MM or HH:MM:SS)"] time: String,
        #[description = "Name of the habit"] name: Option<String>,
        #[description = "What to do"] action: Option<String>,
        #[description = "Where to do it"] place: Option<String>,
        #[description = "Repeat every N days, 1-7 (default: 7)"] periodicity: Option<i32>,
        #[description = "Reward after completing it"] award: Option<String>,
        #[description = "How long it takes: seconds, MM:SS or HH:MM:SS (max 2 minutes)"]
        execution_time: Option<String>,
        #[description = "Is this a pleasant habit? (default: false)"] is_pleasant: Option<bool>,
        #[description = "ID of a pleasant habit used as the reward"] related_habit: Option<i64>,
        #[description = "Visible to everyone? (default: false)"] is_public: Option<bool>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let owner_id = ctx.author().id.to_string();

        let parsed = habit::parse_scheduled_time(&time).and_then(|scheduled_time| {
            Ok((scheduled_time, parse_execution_time(execution_time)?))
        });
        let (scheduled_time, execution_time_secs) = match parsed {
            Ok(values) => values,
            Err(e) => return reply_with_error(ctx, e).await,
        };

        let defaults = HabitDraft::new(scheduled_time);
        let draft = HabitDraft {
            name,
            action,
            place,
            periodicity: periodicity.unwrap_or(defaults.periodicity),
            award,
            execution_time_secs: execution_time_secs.unwrap_or(defaults.execution_time_secs),
            is_pleasant: is_pleasant.unwrap_or(false),
            related_habit_id: related_habit,
            is_public: is_public.unwrap_or(false),
            ..defaults
        };

        match habit::create_habit(db, &owner_id, draft).await {
            Ok(created) => {
                ctx.say(format!("✅ Created {}", describe(&created))).await?;
                Ok(())
            }
            Err(e) => reply_with_error(ctx, e).await,
        }
    }

    /// Updates one of your habits.
    ///
    /// Only the given fields change. The `clear_*` flags remove a text field or the
    /// related habit. The whole habit is re-checked.
    #[allow(clippy::too_many_arguments)]
    #[poise::command(slash_command, prefix_command)]
    pub async fn update_habit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Habit ID"] id: i64,
        #[description = "New reminder time (HH:MM or HH:MM:SS)"] time: Option<String>,
        #[description = "New name"] name: Option<String>,
        #[description = "New action"] action: Option<String>,
        #[description = "New place"] place: Option<String>,
        #[description = "Repeat every N days, 1-7"] periodicity: Option<i32>,
        #[description = "New reward"] award: Option<String>,
        #[description = "How long it takes: seconds, MM:SS or HH:MM:SS"] execution_time: Option<
            String,
        >,
        #[description = "Is this a pleasant habit?"] is_pleasant: Option<bool>,
        #[description = "ID of a pleasant habit used as the reward"] related_habit: Option<i64>,
        #[description = "Remove the related habit"] clear_related: Option<bool>,
        #[description = "Visible to everyone?"] is_public: Option<bool>,
        #[description = "Remove the name"] clear_name: Option<bool>,
        #[description = "Remove the action"] clear_action: Option<bool>,
        #[description = "Remove the place"] clear_place: Option<bool>,
        #[description = "Remove the reward"] clear_award: Option<bool>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let owner_id = ctx.author().id.to_string();

        let parsed = time
            .as_deref()
            .map(habit::parse_scheduled_time)
            .transpose()
            .and_then(|scheduled_time| {
                Ok((scheduled_time, parse_execution_time(execution_time)?))
            });
        let (scheduled_time, execution_time_secs) = match parsed {
            Ok(values) => values,
            Err(e) => return reply_with_error(ctx, e).await,
        };

        let related_habit_id = if clear_related.unwrap_or(false) {
            Some(None)
        } else {
            related_habit.map(Some)
        };

        let patch = HabitPatch {
            name: text_change(name, clear_name.unwrap_or(false)),
            place: text_change(place, clear_place.unwrap_or(false)),
            action: text_change(action, clear_action.unwrap_or(false)),
            scheduled_time,
            periodicity,
            award: text_change(award, clear_award.unwrap_or(false)),
            execution_time_secs,
            is_pleasant,
            related_habit_id,
            is_public,
        };

        if patch.is_empty() {
            ctx.say("❌ Please specify at least one field to update.")
                .await?;
            return Ok(());
        }

        match habit::update_habit(db, &owner_id, id, patch).await {
            Ok(updated) => {
                ctx.say(format!("✅ Updated {}", describe(&updated))).await?;
                Ok(())
            }
            Err(e) => reply_with_error(ctx, e).await,
        }
    }

    /// Deletes one of your habits.
    ///
    /// Habits that used it as their related habit are kept, the link is removed.
    #[poise::command(slash_command, prefix_command)]
    pub async fn delete_habit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Habit ID"] id: i64,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let owner_id = ctx.author().id.to_string();

        match habit::delete_habit(db, &owner_id, id).await {
            Ok(()) => {
                ctx.say(format!("✅ Deleted habit #{id}.")).await?;
                Ok(())
            }
            Err(e) => reply_with_error(ctx, e).await,
        }
    }
}

// Re-export all commands
pub use inner::*;
