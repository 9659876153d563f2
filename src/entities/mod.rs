//! Entity module - Contains all SeaORM entity definitions for the database.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod habit;
pub mod profile;

pub use habit::{Column as HabitColumn, Entity as Habit, Model as HabitModel};
pub use profile::{Column as ProfileColumn, Entity as Profile, Model as ProfileModel};
