//! Shared test utilities for `HabitBuddy`.
//!
//! This module provides common helper functions for setting up test databases,
//! creating test entities with sensible defaults, and a fake messaging channel.

use crate::{
    core::{
        delivery::MessageChannel,
        habit,
        profile::{self, ProfileUpdate},
        validation::HabitDraft,
    },
    entities,
    errors::{Error, Result},
};
use async_trait::async_trait;
use chrono::NaiveTime;
use sea_orm::DatabaseConnection;
use std::{
    collections::HashSet,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// A time of day with zero seconds.
///
/// # Panics
/// Panics on an out-of-range hour or minute.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn test_time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

/// Creates an ordinary habit with sensible defaults.
///
/// # Defaults
/// * `place`: `"Home"`
/// * `scheduled_time`: 08:00
/// * `periodicity`: 1
/// * `execution_time_secs`: 60
/// * no award, no related habit, private
pub async fn create_test_habit(
    db: &DatabaseConnection,
    owner_id: &str,
    name: &str,
) -> Result<entities::habit::Model> {
    create_habit_at(db, owner_id, name, test_time(8, 0)).await
}

/// Creates an ordinary habit scheduled at `scheduled_time`.
pub async fn create_habit_at(
    db: &DatabaseConnection,
    owner_id: &str,
    name: &str,
    scheduled_time: NaiveTime,
) -> Result<entities::habit::Model> {
    let draft = HabitDraft {
        name: Some(name.to_string()),
        place: Some("Home".to_string()),
        action: Some(format!("Do {name}")),
        periodicity: 1,
        execution_time_secs: 60,
        ..HabitDraft::new(scheduled_time)
    };
    habit::create_habit(db, owner_id, draft).await
}

/// Creates a pleasant habit, usable as another habit's related habit.
pub async fn create_pleasant_habit(
    db: &DatabaseConnection,
    owner_id: &str,
    name: &str,
    is_public: bool,
) -> Result<entities::habit::Model> {
    let draft = HabitDraft {
        name: Some(name.to_string()),
        is_pleasant: true,
        is_public,
        ..HabitDraft::new(test_time(21, 0))
    };
    habit::create_habit(db, owner_id, draft).await
}

/// Registers a profile with the given chat id.
pub async fn create_test_profile(
    db: &DatabaseConnection,
    user_id: &str,
    chat_id: &str,
) -> Result<entities::profile::Model> {
    profile::upsert_profile(
        db,
        user_id,
        ProfileUpdate {
            chat_id: Some(chat_id.to_string()),
            ..ProfileUpdate::default()
        },
    )
    .await
}

/// Fake [`MessageChannel`] that records successful sends.
///
/// Sends to chats listed in `failing` return an error; sends to chats listed in
/// `hanging` never complete within any reasonable timeout.
#[derive(Debug, Default)]
pub struct RecordingChannel {
    sent: Mutex<Vec<(String, String)>>,
    attempts: AtomicUsize,
    failing: HashSet<String>,
    hanging: HashSet<String>,
}

impl RecordingChannel {
    /// Channel that fails for the given chat ids.
    pub fn failing_for<const N: usize>(chat_ids: [&str; N]) -> Self {
        Self {
            failing: chat_ids.iter().map(ToString::to_string).collect(),
            ..Self::default()
        }
    }

    /// Channel that hangs for the given chat ids.
    pub fn hanging_for<const N: usize>(chat_ids: [&str; N]) -> Self {
        Self {
            hanging: chat_ids.iter().map(ToString::to_string).collect(),
            ..Self::default()
        }
    }

    /// Successfully sent `(text, chat_id)` pairs, in order.
    ///
    /// # Panics
    /// Panics if the lock is poisoned.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// Number of send attempts, successful or not.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageChannel for RecordingChannel {
    async fn send_message(&self, text: &str, chat_id: &str) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if self.hanging.contains(chat_id) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.failing.contains(chat_id) {
            return Err(Error::Delivery {
                message: format!("simulated transport error for {chat_id}"),
            });
        }

        #[allow(clippy::unwrap_used)]
        self.sent
            .lock()
            .unwrap()
            .push((text.to_string(), chat_id.to_string()));
        Ok(())
    }
}
