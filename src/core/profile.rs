//! Profile business logic - The user directory.
//!
//! Profiles hold the messaging address (`chat_id`) reminders are delivered to, plus
//! an optional messaging nickname and city. Habits reference their owner by Discord
//! user id, so a user can create habits before registering a profile; they simply
//! receive no reminders until a `chat_id` is set.

use crate::{
    core::habit,
    entities::{Profile, profile},
    errors::{Error, Result},
};
use regex::Regex;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::HashMap;
use tracing::info;

/// Messaging nicknames start with `@`, then 4 to 31 letters, digits or underscores.
const NICKNAME_PATTERN: &str = r"^@[A-Za-z0-9_]{4,31}$";

/// Changes to a profile. `None` leaves a field untouched, `Some("")` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New messaging nickname
    pub nickname: Option<String>,
    /// New messaging chat id
    pub chat_id: Option<String>,
    /// New city
    pub city: Option<String>,
}

impl ProfileUpdate {
    /// Returns true when the update would not change anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Checks a messaging nickname against [`NICKNAME_PATTERN`].
///
/// # Errors
/// Returns [`Error::InvalidInput`] when the nickname does not match.
pub fn validate_nickname(nickname: &str) -> Result<()> {
    let pattern = Regex::new(NICKNAME_PATTERN).map_err(|e| Error::Config {
        message: format!("Invalid nickname pattern: {e}"),
    })?;

    if pattern.is_match(nickname) {
        Ok(())
    } else {
        Err(Error::InvalidInput {
            message: format!(
                "Nickname '{nickname}' must start with @ and contain 4-31 letters, numbers or underscores."
            ),
        })
    }
}

/// Finds the profile of a Discord user.
pub async fn get_profile(db: &DatabaseConnection, user_id: &str) -> Result<Option<profile::Model>> {
    Profile::find()
        .filter(profile::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all profiles, ordered by creation.
pub async fn get_all_profiles(db: &DatabaseConnection) -> Result<Vec<profile::Model>> {
    Profile::find()
        .order_by_asc(profile::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Loads the profiles of the given users, keyed by user id.
///
/// Users without a profile are absent from the map.
pub async fn get_profiles_for_users(
    db: &DatabaseConnection,
    user_ids: &[String],
) -> Result<HashMap<String, profile::Model>> {
    if user_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let profiles = Profile::find()
        .filter(profile::Column::UserId.is_in(user_ids.iter().cloned()))
        .all(db)
        .await?;

    Ok(profiles
        .into_iter()
        .map(|p| (p.user_id.clone(), p))
        .collect())
}

/// Creates the profile of `user_id` or applies `update` to the existing one.
///
/// # Errors
/// - [`Error::InvalidInput`] if the nickname is malformed or taken by another user
/// - Database errors
pub async fn upsert_profile(
    db: &DatabaseConnection,
    user_id: &str,
    update: ProfileUpdate,
) -> Result<profile::Model> {
    let nickname = update.nickname.map(clean);
    if let Some(Some(ref nick)) = nickname {
        validate_nickname(nick)?;

        let taken = Profile::find()
            .filter(profile::Column::Nickname.eq(nick.as_str()))
            .filter(profile::Column::UserId.ne(user_id))
            .one(db)
            .await?;
        if taken.is_some() {
            return Err(Error::InvalidInput {
                message: format!("Nickname '{nick}' is already taken."),
            });
        }
    }
    let chat_id = update.chat_id.map(clean);
    let city = update.city.map(clean);
    let now = chrono::Utc::now().naive_utc();

    if let Some(existing) = get_profile(db, user_id).await? {
        let mut active: profile::ActiveModel = existing.into();
        if let Some(nickname) = nickname {
            active.nickname = Set(nickname);
        }
        if let Some(chat_id) = chat_id {
            active.chat_id = Set(chat_id);
        }
        if let Some(city) = city {
            active.city = Set(city);
        }
        active.updated_at = Set(now);
        return active.update(db).await.map_err(Into::into);
    }

    let active = profile::ActiveModel {
        user_id: Set(user_id.to_string()),
        nickname: Set(nickname.flatten()),
        chat_id: Set(chat_id.flatten()),
        city: Set(city.flatten()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let created = active.insert(db).await?;
    info!("Registered profile for user {}", user_id);
    Ok(created)
}

/// Deletes the profile of `user_id` together with all of their habits.
///
/// Returns the number of habits removed.
///
/// # Errors
/// Returns [`Error::ProfileNotFound`] if the user has no profile.
pub async fn delete_profile(db: &DatabaseConnection, user_id: &str) -> Result<u64> {
    let existing = get_profile(db, user_id)
        .await?
        .ok_or_else(|| Error::ProfileNotFound {
            user_id: user_id.to_string(),
        })?;

    let txn = db.begin().await?;
    let removed_habits = habit::delete_habits_for_owner(&txn, user_id).await?;
    Profile::delete_by_id(existing.id).exec(&txn).await?;
    txn.commit().await?;

    info!(
        "Deleted profile of user {} and {} habit(s)",
        user_id, removed_habits
    );
    Ok(removed_habits)
}

fn clean(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_validate_nickname() {
        assert!(validate_nickname("@habit_fan").is_ok());
        assert!(validate_nickname("@abcd").is_ok());

        for bad in ["habit_fan", "@abc", "@with space", "@dash-name", ""] {
            assert!(
                matches!(validate_nickname(bad), Err(Error::InvalidInput { .. })),
                "{bad} should be rejected"
            );
        }
        assert!(validate_nickname(&format!("@{}", "a".repeat(32))).is_err());
    }

    #[tokio::test]
    async fn test_upsert_creates_then_updates() -> Result<()> {
        let db = setup_test_db().await?;

        let created = upsert_profile(
            &db,
            "alice",
            ProfileUpdate {
                chat_id: Some("1001".to_string()),
                nickname: Some("@alice_walks".to_string()),
                city: None,
            },
        )
        .await?;
        assert_eq!(created.chat_id.as_deref(), Some("1001"));
        assert_eq!(created.city, None);

        let updated = upsert_profile(
            &db,
            "alice",
            ProfileUpdate {
                city: Some("Lisbon".to_string()),
                ..ProfileUpdate::default()
            },
        )
        .await?;
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.chat_id.as_deref(), Some("1001"));
        assert_eq!(updated.city.as_deref(), Some("Lisbon"));

        let cleared = upsert_profile(
            &db,
            "alice",
            ProfileUpdate {
                chat_id: Some(String::new()),
                ..ProfileUpdate::default()
            },
        )
        .await?;
        assert_eq!(cleared.chat_id, None);
        assert_eq!(get_all_profiles(&db).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_upsert_rejects_taken_nickname() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_profile(&db, "alice", "1001").await?;
        upsert_profile(
            &db,
            "alice",
            ProfileUpdate {
                nickname: Some("@shared_name".to_string()),
                ..ProfileUpdate::default()
            },
        )
        .await?;

        let result = upsert_profile(
            &db,
            "bob",
            ProfileUpdate {
                nickname: Some("@shared_name".to_string()),
                ..ProfileUpdate::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::InvalidInput { .. })));
        assert!(get_profile(&db, "bob").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_nickname_unique_at_database_level() -> Result<()> {
        let db = setup_test_db().await?;
        let now = chrono::Utc::now().naive_utc();
        let row = |user_id: &str| profile::ActiveModel {
            user_id: Set(user_id.to_string()),
            nickname: Set(Some("@same_name".to_string())),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        row("alice").insert(&db).await?;
        assert!(row("bob").insert(&db).await.is_err());

        // Profiles without a nickname do not collide.
        create_test_profile(&db, "carol", "1003").await?;
        create_test_profile(&db, "dave", "1004").await?;
        assert_eq!(get_all_profiles(&db).await?.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_get_profiles_for_users() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_profile(&db, "alice", "1001").await?;
        create_test_profile(&db, "bob", "1002").await?;

        let profiles =
            get_profiles_for_users(&db, &["alice".to_string(), "carol".to_string()]).await?;
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles["alice"].chat_id.as_deref(), Some("1001"));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_profile_removes_habits() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_profile(&db, "alice", "1001").await?;
        create_test_habit(&db, "alice", "Run").await?;
        create_pleasant_habit(&db, "alice", "Bath", false).await?;
        let bobs = create_test_habit(&db, "bob", "Read").await?;

        let removed = delete_profile(&db, "alice").await?;
        assert_eq!(removed, 2);
        assert!(get_profile(&db, "alice").await?.is_none());
        assert_eq!(habit::get_all_habits(&db).await?, vec![bobs]);

        let result = delete_profile(&db, "alice").await;
        assert!(matches!(result, Err(Error::ProfileNotFound { .. })));
        Ok(())
    }
}
