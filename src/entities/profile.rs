//! Profile entity - The user directory.
//!
//! A profile maps a Discord user to the messaging account reminders are sent to.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Profile database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Discord user ID this profile belongs to
    #[sea_orm(unique)]
    pub user_id: String,
    /// Messaging nickname (e.g. `@habit_fan`), unique when set
    #[sea_orm(unique)]
    pub nickname: Option<String>,
    /// Messaging chat id reminders are delivered to
    pub chat_id: Option<String>,
    /// City, shown on the public profile
    pub city: Option<String>,
    /// When the profile was created
    pub created_at: DateTime,
    /// When the profile was last modified
    pub updated_at: DateTime,
}

/// `Profile` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
