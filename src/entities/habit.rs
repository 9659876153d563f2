//! Habit entity - A recurring action a user wants to build.
//!
//! A habit carries its scheduling metadata (time of day, periodicity, execution time)
//! and its reward, which is either a free-text `award` or a link to another
//! "pleasant" habit owned by the same user. The link is weak: removing the
//! target clears `related_habit_id` instead of cascading.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Habit database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "habits")]
pub struct Model {
    /// Unique identifier for the habit
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Discord user ID of the habit's owner
    #[sea_orm(indexed)]
    pub owner_id: String,
    /// Short name of the habit
    pub name: Option<String>,
    /// Where the habit is performed
    pub place: Option<String>,
    /// What has to be done
    pub action: Option<String>,
    /// Time of day the reminder fires
    pub scheduled_time: Time,
    /// Days between repetitions (1-7)
    pub periodicity: i32,
    /// Free-text reward for completing the habit
    pub award: Option<String>,
    /// How long the habit takes, in seconds (at most 120)
    pub execution_time_secs: i32,
    /// Whether this habit can serve as the reward of another habit
    pub is_pleasant: bool,
    /// Pleasant habit used as the reward, if any
    pub related_habit_id: Option<i64>,
    /// Whether every user can see this habit
    pub is_public: bool,
    /// When the habit was created
    pub created_at: DateTime,
    /// When the habit was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between Habit and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each habit may point at one pleasant habit
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::RelatedHabitId",
        to = "Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    RelatedHabit,
}

impl ActiveModelBehavior for ActiveModel {}
