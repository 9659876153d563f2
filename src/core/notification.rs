//! Reminder message formatting.
//!
//! Builds the human-readable text sent to a habit's owner when the habit is due,
//! plus the `HH:MM:SS` / `MM:SS` duration helpers shared with the bot layer.

use crate::{
    entities::habit,
    errors::{Error, Result},
};
use std::fmt::Write;

/// Used when a habit has neither an award nor a related habit.
pub const NO_REWARD_TEXT: &str = "No reward or related pleasant habit";

const UNSET_TEXT: &str = "not set";

/// Picks the reward shown in a reminder: the award if it is non-empty, otherwise
/// the related habit's name, otherwise [`NO_REWARD_TEXT`].
#[must_use]
pub fn reward_description(award: Option<&str>, related_name: Option<&str>) -> String {
    award
        .filter(|a| !a.trim().is_empty())
        .or_else(|| related_name.filter(|n| !n.trim().is_empty()))
        .unwrap_or(NO_REWARD_TEXT)
        .to_string()
}

/// Formats the reminder for `habit`. `related_name` is the name of the linked
/// pleasant habit, if there is one.
pub fn format_reminder(habit: &habit::Model, related_name: Option<&str>) -> Result<String> {
    let reward = reward_description(habit.award.as_deref(), related_name);
    let or_unset = |value: &Option<String>| value.clone().unwrap_or_else(|| UNSET_TEXT.to_string());

    let mut message = String::from("Friendly reminder.\n");
    writeln!(&mut message, "    Your habit {}:", or_unset(&habit.name))?;
    writeln!(&mut message, "    Action: {},", or_unset(&habit.action))?;
    writeln!(&mut message, "    Place: {},", or_unset(&habit.place))?;
    writeln!(
        &mut message,
        "    Time: {}",
        habit.scheduled_time.format("%H:%M:%S")
    )?;
    writeln!(&mut message, "    Reward or pleasant habit: {reward}")?;
    writeln!(
        &mut message,
        "    Execution time: {}",
        format_execution_time(habit.execution_time_secs)
    )?;
    message.push_str("Good luck!");

    Ok(message)
}

/// Renders a duration in seconds as `HH:MM:SS`.
#[must_use]
pub fn format_execution_time(secs: i32) -> String {
    let secs = secs.max(0);
    let (hours, remainder) = (secs / 3600, secs % 3600);
    let (minutes, seconds) = (remainder / 60, remainder % 60);
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Parses an execution time given as plain seconds (`90`), `MM:SS` or `HH:MM:SS`.
///
/// The range is not checked here; that is the validator's job.
pub fn parse_execution_time(input: &str) -> Result<i32> {
    let invalid = || Error::InvalidInput {
        message: format!(
            "Invalid execution time '{input}'. Use seconds, \"MM:SS\" or \"HH:MM:SS\"."
        ),
    };

    let parts = input
        .trim()
        .split(':')
        .map(|part| part.trim().parse::<i32>().map_err(|_| invalid()))
        .collect::<Result<Vec<i32>>>()?;

    if parts.iter().any(|p| *p < 0) {
        return Err(invalid());
    }

    let total = match parts.as_slice() {
        [seconds] => Some(*seconds),
        [minutes, seconds] => minutes
            .checked_mul(60)
            .and_then(|m| m.checked_add(*seconds)),
        [hours, minutes, seconds] => hours
            .checked_mul(3600)
            .and_then(|h| h.checked_add(minutes.checked_mul(60)?))
            .and_then(|hm| hm.checked_add(*seconds)),
        _ => None,
    };

    total.ok_or_else(invalid)
}
