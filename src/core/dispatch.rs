//! Reminder dispatch job.
//!
//! Once per tick the job scans every habit, keeps those whose scheduled hour and
//! minute equal the current wall-clock hour and minute, and sends each owner a
//! reminder. The job keeps no state between ticks: a skipped tick means the habits
//! due in that minute get no reminder, there is no catch-up. Periodicity is not
//! consulted, every matching minute of every day fires.

use crate::{
    config::settings::DispatchSettings,
    core::{
        delivery::{self, DeliveryOutcome, MessageChannel},
        habit, notification, profile,
    },
    entities::habit as habit_entity,
    errors::Result,
};
use chrono::{NaiveTime, Timelike};
use sea_orm::DatabaseConnection;
use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
    time::Duration,
};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

/// Counters for one dispatch tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Habits due in this minute
    pub matched: usize,
    /// Reminders accepted by the messaging API
    pub delivered: usize,
    /// Reminders that failed or timed out
    pub failed: usize,
    /// Due habits whose owner has no messaging address
    pub skipped: usize,
}

/// Returns true when a habit scheduled at `scheduled` is due at `now`.
///
/// Only hour and minute are compared.
#[must_use]
pub fn is_due(scheduled: NaiveTime, now: NaiveTime) -> bool {
    scheduled.hour() == now.hour() && scheduled.minute() == now.minute()
}

/// Time left until the start of the next wall-clock minute.
#[must_use]
pub fn until_next_minute(now: NaiveTime) -> Duration {
    let elapsed_ms = u64::from(now.second()) * 1000 + u64::from(now.nanosecond() / 1_000_000);
    Duration::from_millis(60_000_u64.saturating_sub(elapsed_ms.min(60_000)))
}

/// Returns true when the minute containing `now` has not been dispatched yet and
/// records it in `last`.
///
/// Only the latest minute is remembered, so the same hour and minute on the next
/// day fires again.
pub fn should_dispatch(last: &mut Option<(u32, u32)>, now: NaiveTime) -> bool {
    let minute = (now.hour(), now.minute());
    if *last == Some(minute) {
        return false;
    }
    *last = Some(minute);
    true
}

/// Runs one scan-and-notify pass for the minute containing `now`.
///
/// Each due habit is handled on its own: a missing address, a formatting problem or
/// a failed delivery is logged and counted, and the pass moves on to the next habit.
///
/// # Errors
/// Only fails if the habit or profile snapshot cannot be loaded.
#[instrument(skip(db, channel, delivery_timeout))]
pub async fn run_dispatch_tick(
    db: &DatabaseConnection,
    channel: &dyn MessageChannel,
    now: NaiveTime,
    delivery_timeout: Duration,
) -> Result<DispatchSummary> {
    let habits = habit::get_all_habits(db).await?;
    let due: Vec<&habit_entity::Model> = habits
        .iter()
        .filter(|h| is_due(h.scheduled_time, now))
        .collect();

    let mut summary = DispatchSummary {
        matched: due.len(),
        ..DispatchSummary::default()
    };
    if due.is_empty() {
        debug!("No habits due at {}", now.format("%H:%M"));
        return Ok(summary);
    }

    let names: HashMap<i64, Option<&str>> = habits
        .iter()
        .map(|h| (h.id, h.name.as_deref()))
        .collect();
    let owners: Vec<String> = due
        .iter()
        .map(|h| h.owner_id.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let profiles = profile::get_profiles_for_users(db, &owners).await?;

    for habit in due {
        let owner_profile = profiles.get(&habit.owner_id);
        let Some(chat_id) = owner_profile.and_then(|p| p.chat_id.as_deref()) else {
            warn!(
                "Habit #{} is due but user {} has no chat id, skipping",
                habit.id, habit.owner_id
            );
            summary.skipped += 1;
            continue;
        };

        let related_name = habit
            .related_habit_id
            .and_then(|id| names.get(&id).copied().flatten());
        let message = match notification::format_reminder(habit, related_name) {
            Ok(message) => message,
            Err(e) => {
                error!("Failed to format reminder for habit #{}: {}", habit.id, e);
                summary.failed += 1;
                continue;
            }
        };

        match delivery::deliver(channel, &message, chat_id, delivery_timeout).await {
            DeliveryOutcome::Delivered => {
                summary.delivered += 1;
                info!(
                    "Reminder for habit #{} ({}) sent to user {} ({})",
                    habit.id,
                    habit.action.as_deref().unwrap_or("-"),
                    habit.owner_id,
                    owner_profile
                        .and_then(|p| p.nickname.as_deref())
                        .unwrap_or("no nickname"),
                );
            }
            DeliveryOutcome::Failed | DeliveryOutcome::TimedOut => summary.failed += 1,
        }
    }

    info!(
        "Dispatch at {}: {} due, {} delivered, {} failed, {} skipped",
        now.format("%H:%M"),
        summary.matched,
        summary.delivered,
        summary.failed,
        summary.skipped
    );
    Ok(summary)
}

/// Runs [`run_dispatch_tick`] forever on a fixed interval, starting at the next
/// minute boundary. Each wall-clock minute is dispatched at most once. Tick errors
/// are logged; the loop never exits.
pub async fn run_dispatch_loop(
    db: DatabaseConnection,
    channel: Arc<dyn MessageChannel>,
    settings: DispatchSettings,
) {
    let start = Instant::now() + until_next_minute(chrono::Local::now().time());
    let mut interval = tokio::time::interval_at(start, settings.interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        "Reminder dispatch started (interval: {:?}, delivery timeout: {:?})",
        settings.interval(),
        settings.delivery_timeout()
    );

    let mut last_minute: Option<(u32, u32)> = None;
    loop {
        interval.tick().await;
        let now = chrono::Local::now().time();
        if !should_dispatch(&mut last_minute, now) {
            debug!("Minute {} already dispatched", now.format("%H:%M"));
            continue;
        }

        if let Err(e) =
            run_dispatch_tick(&db, channel.as_ref(), now, settings.delivery_timeout()).await
        {
            error!("Dispatch tick at {} failed: {}", now.format("%H:%M"), e);
        }
    }
}
