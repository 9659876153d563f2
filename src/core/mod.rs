//! Core business logic - framework-agnostic habit, profile and reminder operations.

/// Reminder delivery channel
pub mod delivery;
/// Periodic reminder dispatch job
pub mod dispatch;
/// Habit record store
pub mod habit;
/// Reminder message formatting
pub mod notification;
/// User directory
pub mod profile;
/// Habit rule validation
pub mod validation;
