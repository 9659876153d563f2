//! Habit business logic - The habit record store.
//!
//! Provides lookups, creation, partial updates and deletion of habits. Every write
//! goes through [`crate::core::validation::validate`] first; the store itself never
//! re-checks. Ownership is enforced here so the bot layer only passes the requester.

use crate::{
    core::validation::{self, HabitDraft, HabitPatch, RelatedSnapshot},
    entities::{Habit, habit},
    errors::{Error, Result},
};
use chrono::NaiveTime;
use sea_orm::{
    Condition, PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr,
};
use tracing::info;

/// Number of habits per page in listings.
pub const HABITS_PAGE_SIZE: u64 = 5;

/// Parses a reminder time given as `HH:MM` or `HH:MM:SS`.
pub fn parse_scheduled_time(input: &str) -> Result<NaiveTime> {
    let input = input.trim();
    NaiveTime::parse_from_str(input, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M"))
        .map_err(|_| Error::InvalidInput {
            message: format!("Invalid time '{input}'. Use \"HH:MM\" or \"HH:MM:SS\"."),
        })
}

/// Retrieves every habit, ordered by id.
pub async fn get_all_habits(db: &DatabaseConnection) -> Result<Vec<habit::Model>> {
    Habit::find()
        .order_by_asc(habit::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a habit by its id, without any ownership check.
pub async fn get_habit_by_id(db: &DatabaseConnection, id: i64) -> Result<Option<habit::Model>> {
    Habit::find_by_id(id).one(db).await.map_err(Into::into)
}

fn owner_or_public(owner_id: &str) -> Condition {
    Condition::any()
        .add(habit::Column::OwnerId.eq(owner_id))
        .add(habit::Column::IsPublic.eq(true))
}

/// Retrieves the habits `owner_id` may see: their own plus every public habit.
pub async fn get_habits_for_owner_or_public(
    db: &DatabaseConnection,
    owner_id: &str,
) -> Result<Vec<habit::Model>> {
    Habit::find()
        .filter(owner_or_public(owner_id))
        .order_by_asc(habit::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// One page of [`get_habits_for_owner_or_public`], zero-based.
///
/// Returns the habits on the page together with the total number of pages.
pub async fn get_habits_page_for_owner_or_public(
    db: &DatabaseConnection,
    owner_id: &str,
    page: u64,
) -> Result<(Vec<habit::Model>, u64)> {
    let paginator = Habit::find()
        .filter(owner_or_public(owner_id))
        .order_by_asc(habit::Column::Id)
        .paginate(db, HABITS_PAGE_SIZE);

    let total_pages = paginator.num_pages().await?;
    let habits = paginator.fetch_page(page).await?;
    Ok((habits, total_pages))
}

/// Retrieves a habit on behalf of `requester_id`, who must own it.
///
/// # Errors
/// - [`Error::HabitNotFound`] if no habit has this id
/// - [`Error::NotOwner`] if it belongs to someone else
pub async fn get_habit_for_owner(
    db: &DatabaseConnection,
    requester_id: &str,
    id: i64,
) -> Result<habit::Model> {
    let habit = get_habit_by_id(db, id)
        .await?
        .ok_or(Error::HabitNotFound { id })?;

    if habit.owner_id != requester_id {
        return Err(Error::NotOwner { id });
    }
    Ok(habit)
}

async fn resolve_related<C>(db: &C, related_id: Option<i64>) -> Result<Option<RelatedSnapshot>>
where
    C: ConnectionTrait,
{
    let Some(id) = related_id else {
        return Ok(None);
    };

    let related = Habit::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::HabitNotFound { id })?;
    Ok(Some(RelatedSnapshot::from(&related)))
}

/// Creates a habit owned by `owner_id` after validating it.
///
/// The owner is always the requester; blank text fields are stored as `None`.
///
/// # Errors
/// - [`Error::Validation`] listing every violated rule
/// - [`Error::HabitNotFound`] if the related habit does not exist
pub async fn create_habit(
    db: &DatabaseConnection,
    owner_id: &str,
    draft: HabitDraft,
) -> Result<habit::Model> {
    let draft = draft.normalized();
    let related = resolve_related(db, draft.related_habit_id).await?;
    validation::validate(owner_id, &draft, related.as_ref())?;

    let now = chrono::Utc::now().naive_utc();
    let habit = habit::ActiveModel {
        owner_id: Set(owner_id.to_string()),
        name: Set(draft.name),
        place: Set(draft.place),
        action: Set(draft.action),
        scheduled_time: Set(draft.scheduled_time),
        periodicity: Set(draft.periodicity),
        award: Set(draft.award),
        execution_time_secs: Set(draft.execution_time_secs),
        is_pleasant: Set(draft.is_pleasant),
        related_habit_id: Set(draft.related_habit_id),
        is_public: Set(draft.is_public),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = habit.insert(db).await?;
    info!("User {} created habit #{}", owner_id, created.id);
    Ok(created)
}

/// Applies `patch` to a habit owned by `requester_id`.
///
/// The rules run against the stored habit with the patch merged in, so fields the
/// patch leaves alone are still checked. A habit other habits use as their reward
/// cannot stop being pleasant, nor become private while a public habit links to it.
///
/// # Errors
/// - [`Error::HabitNotFound`] if the habit or the new related habit does not exist
/// - [`Error::NotOwner`] if the habit belongs to someone else
/// - [`Error::Validation`] listing every violated rule, including broken inbound links
pub async fn update_habit(
    db: &DatabaseConnection,
    requester_id: &str,
    id: i64,
    patch: HabitPatch,
) -> Result<habit::Model> {
    let existing = get_habit_for_owner(db, requester_id, id).await?;

    let mut draft = HabitDraft::from(&existing);
    patch.apply_to(&mut draft);

    let related = resolve_related(db, draft.related_habit_id).await?;
    validation::validate(&existing.owner_id, &draft, related.as_ref())?;
    if (existing.is_pleasant && !draft.is_pleasant) || (existing.is_public && !draft.is_public) {
        let inbound_public: Vec<bool> = Habit::find()
            .filter(habit::Column::RelatedHabitId.eq(id))
            .all(db)
            .await?
            .iter()
            .map(|h| h.is_public)
            .collect();
        validation::validate_inbound(&draft, &inbound_public)?;
    }

    let mut habit: habit::ActiveModel = existing.into();
    habit.name = Set(draft.name);
    habit.place = Set(draft.place);
    habit.action = Set(draft.action);
    habit.scheduled_time = Set(draft.scheduled_time);
    habit.periodicity = Set(draft.periodicity);
    habit.award = Set(draft.award);
    habit.execution_time_secs = Set(draft.execution_time_secs);
    habit.is_pleasant = Set(draft.is_pleasant);
    habit.related_habit_id = Set(draft.related_habit_id);
    habit.is_public = Set(draft.is_public);
    habit.updated_at = Set(chrono::Utc::now().naive_utc());

    let updated = habit.update(db).await?;
    info!("User {} updated habit #{}", requester_id, updated.id);
    Ok(updated)
}

/// Deletes a habit owned by `requester_id`.
///
/// Habits that used it as their related habit keep existing with the link cleared.
///
/// # Errors
/// - [`Error::HabitNotFound`] if the habit does not exist
/// - [`Error::NotOwner`] if it belongs to someone else
pub async fn delete_habit(db: &DatabaseConnection, requester_id: &str, id: i64) -> Result<()> {
    get_habit_for_owner(db, requester_id, id).await?;

    let txn = db.begin().await?;
    let unlinked = clear_links_to(&txn, vec![id]).await?;
    Habit::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    info!(
        "User {} deleted habit #{} ({} inbound link(s) cleared)",
        requester_id, id, unlinked
    );
    Ok(())
}

/// Deletes every habit of `owner_id`, clearing links that point at them.
///
/// Returns the number of deleted habits. Meant to run inside the caller's
/// transaction.
pub async fn delete_habits_for_owner<C>(db: &C, owner_id: &str) -> Result<u64>
where
    C: ConnectionTrait,
{
    let ids: Vec<i64> = Habit::find()
        .filter(habit::Column::OwnerId.eq(owner_id))
        .all(db)
        .await?
        .into_iter()
        .map(|h| h.id)
        .collect();

    if ids.is_empty() {
        return Ok(0);
    }

    clear_links_to(db, ids).await?;
    let result = Habit::delete_many()
        .filter(habit::Column::OwnerId.eq(owner_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

async fn clear_links_to<C>(db: &C, target_ids: Vec<i64>) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = Habit::update_many()
        .col_expr(
            habit::Column::RelatedHabitId,
            Expr::value(Option::<i64>::None),
        )
        .filter(habit::Column::RelatedHabitId.is_in(target_ids))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}
