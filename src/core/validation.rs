//! Habit rule validation.
//!
//! Every create and update runs the full rule set against the *merged* candidate:
//! the stored habit with the incoming patch applied. Rules are independent of each
//! other, so [`validate`] runs all of them and reports every failure at once.

use crate::entities::habit;
use chrono::NaiveTime;
use thiserror::Error;

/// Longest time a habit may take to perform, in seconds.
pub const MAX_EXECUTION_TIME_SECS: i32 = 120;
/// Shortest allowed repeat interval, in days.
pub const MIN_PERIODICITY: i32 = 1;
/// Longest allowed repeat interval, in days.
pub const MAX_PERIODICITY: i32 = 7;
/// Periodicity used when none is given.
pub const DEFAULT_PERIODICITY: i32 = 7;

/// A single broken habit invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleViolation {
    /// `award` and `related_habit` were both set
    #[error("A habit cannot have both a reward and a related habit.")]
    RewardOrRelated,

    /// A pleasant habit carries a reward or a link
    #[error("A pleasant habit cannot have a reward or a related habit.")]
    PleasantWithReward,

    /// The linked habit is not pleasant
    #[error("The related habit must be a pleasant habit.")]
    RelatedNotPleasant,

    /// The linked habit belongs to someone else
    #[error("The related habit must be one of your own habits.")]
    RelatedNotOwned,

    /// A public habit links to a private one
    #[error("The related habit of a public habit must also be public.")]
    RelatedNotPublic,

    /// `execution_time` is above the limit (or negative)
    #[error("Execution time must be between 0 and 120 seconds, got {secs}.")]
    ExecutionTimeTooLong {
        /// Offending value in seconds
        secs: i32,
    },

    /// `periodicity` is outside 1..=7
    #[error("Periodicity must be between 1 and 7 days, got {periodicity}.")]
    PeriodicityOutOfRange {
        /// Offending value in days
        periodicity: i32,
    },

    /// A habit used as a reward by other habits stops being pleasant
    #[error("{count} habit(s) use this habit as their reward, so it must stay pleasant.")]
    StillRelatedFrom {
        /// Habits linking to it
        count: usize,
    },

    /// A habit used as a reward by public habits becomes private
    #[error("{count} public habit(s) use this habit as their reward, so it must stay public.")]
    StillRelatedFromPublic {
        /// Public habits linking to it
        count: usize,
    },
}

/// Full field set of a habit that is about to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitDraft {
    /// Short name of the habit
    pub name: Option<String>,
    /// Where the habit is performed
    pub place: Option<String>,
    /// What has to be done
    pub action: Option<String>,
    /// Time of day the reminder fires
    pub scheduled_time: NaiveTime,
    /// Days between repetitions
    pub periodicity: i32,
    /// Free-text reward
    pub award: Option<String>,
    /// Execution time in seconds
    pub execution_time_secs: i32,
    /// Whether the habit is a pleasant (reward-type) habit
    pub is_pleasant: bool,
    /// Linked pleasant habit
    pub related_habit_id: Option<i64>,
    /// Whether every user can see the habit
    pub is_public: bool,
}

impl HabitDraft {
    /// Creates a draft with the given reminder time and default settings
    /// (weekly, 120 seconds, private, no reward).
    #[must_use]
    pub const fn new(scheduled_time: NaiveTime) -> Self {
        Self {
            name: None,
            place: None,
            action: None,
            scheduled_time,
            periodicity: DEFAULT_PERIODICITY,
            award: None,
            execution_time_secs: MAX_EXECUTION_TIME_SECS,
            is_pleasant: false,
            related_habit_id: None,
            is_public: false,
        }
    }

    /// Replaces empty or whitespace-only text fields with `None`.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.name = non_empty(self.name);
        self.place = non_empty(self.place);
        self.action = non_empty(self.action);
        self.award = non_empty(self.award);
        self
    }
}

impl From<&habit::Model> for HabitDraft {
    fn from(model: &habit::Model) -> Self {
        Self {
            name: model.name.clone(),
            place: model.place.clone(),
            action: model.action.clone(),
            scheduled_time: model.scheduled_time,
            periodicity: model.periodicity,
            award: model.award.clone(),
            execution_time_secs: model.execution_time_secs,
            is_pleasant: model.is_pleasant,
            related_habit_id: model.related_habit_id,
            is_public: model.is_public,
        }
    }
}

/// Turns an optional text option plus a "clear" flag into a patch field.
///
/// A set flag wins over any given value and clears the field.
#[must_use]
pub fn text_change(value: Option<String>, clear: bool) -> Option<String> {
    if clear { Some(String::new()) } else { value }
}

/// A partial update. `None` leaves a field untouched.
///
/// For text fields `Some("")` clears the value; `related_habit_id: Some(None)` removes
/// the link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitPatch {
    /// New name
    pub name: Option<String>,
    /// New place
    pub place: Option<String>,
    /// New action
    pub action: Option<String>,
    /// New reminder time
    pub scheduled_time: Option<NaiveTime>,
    /// New periodicity
    pub periodicity: Option<i32>,
    /// New reward
    pub award: Option<String>,
    /// New execution time in seconds
    pub execution_time_secs: Option<i32>,
    /// New pleasant flag
    pub is_pleasant: Option<bool>,
    /// New link, or `Some(None)` to clear it
    pub related_habit_id: Option<Option<i64>>,
    /// New visibility
    pub is_public: Option<bool>,
}

impl HabitPatch {
    /// Returns true when the patch would not change anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies the patch on top of `draft`, producing the post-update state.
    pub fn apply_to(self, draft: &mut HabitDraft) {
        if let Some(name) = self.name {
            draft.name = non_empty(Some(name));
        }
        if let Some(place) = self.place {
            draft.place = non_empty(Some(place));
        }
        if let Some(action) = self.action {
            draft.action = non_empty(Some(action));
        }
        if let Some(time) = self.scheduled_time {
            draft.scheduled_time = time;
        }
        if let Some(periodicity) = self.periodicity {
            draft.periodicity = periodicity;
        }
        if let Some(award) = self.award {
            draft.award = non_empty(Some(award));
        }
        if let Some(secs) = self.execution_time_secs {
            draft.execution_time_secs = secs;
        }
        if let Some(is_pleasant) = self.is_pleasant {
            draft.is_pleasant = is_pleasant;
        }
        if let Some(related) = self.related_habit_id {
            draft.related_habit_id = related;
        }
        if let Some(is_public) = self.is_public {
            draft.is_public = is_public;
        }
    }
}

/// The fields of the linked habit that the rules look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedSnapshot {
    /// Linked habit id
    pub id: i64,
    /// Owner of the linked habit
    pub owner_id: String,
    /// Whether the linked habit is pleasant
    pub is_pleasant: bool,
    /// Whether the linked habit is public
    pub is_public: bool,
}

impl From<&habit::Model> for RelatedSnapshot {
    fn from(model: &habit::Model) -> Self {
        Self {
            id: model.id,
            owner_id: model.owner_id.clone(),
            is_pleasant: model.is_pleasant,
            is_public: model.is_public,
        }
    }
}

/// Everything a rule needs: the owner, the merged draft and the resolved link.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// Owner the habit will be stored under
    pub owner_id: &'a str,
    /// Merged field set
    pub draft: &'a HabitDraft,
    /// Linked habit, resolved from `draft.related_habit_id`
    pub related: Option<&'a RelatedSnapshot>,
}

impl Candidate<'_> {
    fn has_award(&self) -> bool {
        self.draft
            .award
            .as_deref()
            .is_some_and(|award| !award.trim().is_empty())
    }

    fn has_related(&self) -> bool {
        self.related.is_some() || self.draft.related_habit_id.is_some()
    }
}

/// A single habit rule.
pub type Rule = fn(&Candidate<'_>) -> Result<(), RuleViolation>;

/// The rule set, in reporting order.
pub const RULES: [Rule; 7] = [
    reward_or_related,
    pleasant_without_reward,
    related_is_pleasant,
    related_same_owner,
    related_public_when_public,
    execution_time_limit,
    periodicity_range,
];

fn reward_or_related(candidate: &Candidate<'_>) -> Result<(), RuleViolation> {
    if candidate.has_award() && candidate.has_related() {
        return Err(RuleViolation::RewardOrRelated);
    }
    Ok(())
}

fn pleasant_without_reward(candidate: &Candidate<'_>) -> Result<(), RuleViolation> {
    if candidate.draft.is_pleasant && (candidate.has_award() || candidate.has_related()) {
        return Err(RuleViolation::PleasantWithReward);
    }
    Ok(())
}

fn related_is_pleasant(candidate: &Candidate<'_>) -> Result<(), RuleViolation> {
    match candidate.related {
        Some(related) if !related.is_pleasant => Err(RuleViolation::RelatedNotPleasant),
        _ => Ok(()),
    }
}

fn related_same_owner(candidate: &Candidate<'_>) -> Result<(), RuleViolation> {
    match candidate.related {
        Some(related) if related.owner_id != candidate.owner_id => {
            Err(RuleViolation::RelatedNotOwned)
        }
        _ => Ok(()),
    }
}

fn related_public_when_public(candidate: &Candidate<'_>) -> Result<(), RuleViolation> {
    match candidate.related {
        Some(related) if candidate.draft.is_public && !related.is_public => {
            Err(RuleViolation::RelatedNotPublic)
        }
        _ => Ok(()),
    }
}

fn execution_time_limit(candidate: &Candidate<'_>) -> Result<(), RuleViolation> {
    let secs = candidate.draft.execution_time_secs;
    if !(0..=MAX_EXECUTION_TIME_SECS).contains(&secs) {
        return Err(RuleViolation::ExecutionTimeTooLong { secs });
    }
    Ok(())
}

fn periodicity_range(candidate: &Candidate<'_>) -> Result<(), RuleViolation> {
    let periodicity = candidate.draft.periodicity;
    if !(MIN_PERIODICITY..=MAX_PERIODICITY).contains(&periodicity) {
        return Err(RuleViolation::PeriodicityOutOfRange { periodicity });
    }
    Ok(())
}

/// Runs every rule against the candidate and collects all violations.
///
/// `related` must be the habit referenced by `draft.related_habit_id` (or `None`
/// when there is no link). Rules that inspect the linked habit pass trivially
/// without one.
///
/// # Errors
/// Returns the non-empty list of violated rules.
pub fn validate(
    owner_id: &str,
    draft: &HabitDraft,
    related: Option<&RelatedSnapshot>,
) -> Result<(), Vec<RuleViolation>> {
    let candidate = Candidate {
        owner_id,
        draft,
        related,
    };

    let violations: Vec<RuleViolation> = RULES
        .iter()
        .filter_map(|rule| rule(&candidate).err())
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// Checks the habits that link to the habit being updated.
///
/// `inbound_public` holds the `is_public` flag of every habit whose related habit is
/// the one being written. A linked habit must stay pleasant, and stay public while a
/// public habit links to it.
///
/// # Errors
/// Returns the violated inbound rules.
pub fn validate_inbound(
    draft: &HabitDraft,
    inbound_public: &[bool],
) -> Result<(), Vec<RuleViolation>> {
    let mut violations = Vec::new();
    if !draft.is_pleasant && !inbound_public.is_empty() {
        violations.push(RuleViolation::StillRelatedFrom {
            count: inbound_public.len(),
        });
    }
    let public_count = inbound_public.iter().filter(|is_public| **is_public).count();
    if !draft.is_public && public_count > 0 {
        violations.push(RuleViolation::StillRelatedFromPublic {
            count: public_count,
        });
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    const OWNER: &str = "owner-1";

    fn time(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn valid_draft() -> HabitDraft {
        HabitDraft {
            name: Some("Morning walk".to_string()),
            place: Some("Park".to_string()),
            action: Some("Walk 2 km".to_string()),
            periodicity: 1,
            execution_time_secs: 90,
            ..HabitDraft::new(time(7, 30))
        }
    }

    fn pleasant_target(owner: &str, is_public: bool) -> RelatedSnapshot {
        RelatedSnapshot {
            id: 42,
            owner_id: owner.to_string(),
            is_pleasant: true,
            is_public,
        }
    }

    fn with_link(draft: HabitDraft) -> HabitDraft {
        HabitDraft {
            related_habit_id: Some(42),
            ..draft
        }
    }

    #[test]
    fn test_valid_habit_passes() {
        assert!(validate(OWNER, &valid_draft(), None).is_ok());

        let linked = with_link(valid_draft());
        assert!(validate(OWNER, &linked, Some(&pleasant_target(OWNER, false))).is_ok());
    }

    #[test]
    fn test_reward_and_related_rejected() {
        let draft = HabitDraft {
            award: Some("rest".to_string()),
            ..with_link(valid_draft())
        };
        let violations = validate(OWNER, &draft, Some(&pleasant_target(OWNER, false))).unwrap_err();
        assert_eq!(violations, vec![RuleViolation::RewardOrRelated]);
    }

    #[test]
    fn test_pleasant_habit_with_award_rejected() {
        let pleasant = HabitDraft {
            is_pleasant: true,
            award: Some(String::new()),
            ..valid_draft()
        };
        assert!(validate(OWNER, &pleasant, None).is_ok());

        let rewarded = HabitDraft {
            award: Some("x".to_string()),
            ..pleasant
        };
        let violations = validate(OWNER, &rewarded, None).unwrap_err();
        assert_eq!(violations, vec![RuleViolation::PleasantWithReward]);
    }

    #[test]
    fn test_pleasant_habit_with_related_rejected() {
        let draft = HabitDraft {
            is_pleasant: true,
            ..with_link(valid_draft())
        };
        let violations = validate(OWNER, &draft, Some(&pleasant_target(OWNER, false))).unwrap_err();
        assert_eq!(violations, vec![RuleViolation::PleasantWithReward]);
    }

    #[test]
    fn test_related_must_be_pleasant() {
        let target = RelatedSnapshot {
            is_pleasant: false,
            ..pleasant_target(OWNER, false)
        };
        let violations = validate(OWNER, &with_link(valid_draft()), Some(&target)).unwrap_err();
        assert_eq!(violations, vec![RuleViolation::RelatedNotPleasant]);
    }

    #[test]
    fn test_related_must_share_owner() {
        let target = pleasant_target("someone-else", false);
        let violations = validate(OWNER, &with_link(valid_draft()), Some(&target)).unwrap_err();
        assert_eq!(violations, vec![RuleViolation::RelatedNotOwned]);
    }

    #[test]
    fn test_public_habit_needs_public_related() {
        let draft = HabitDraft {
            is_public: true,
            ..with_link(valid_draft())
        };
        let violations = validate(OWNER, &draft, Some(&pleasant_target(OWNER, false))).unwrap_err();
        assert_eq!(violations, vec![RuleViolation::RelatedNotPublic]);

        assert!(validate(OWNER, &draft, Some(&pleasant_target(OWNER, true))).is_ok());
    }

    #[test]
    fn test_private_habit_may_link_private_related() {
        let draft = with_link(valid_draft());
        assert!(validate(OWNER, &draft, Some(&pleasant_target(OWNER, false))).is_ok());
    }

    #[test]
    fn test_execution_time_boundary() {
        let at_limit = HabitDraft {
            execution_time_secs: 120,
            ..valid_draft()
        };
        assert!(validate(OWNER, &at_limit, None).is_ok());

        let over_limit = HabitDraft {
            execution_time_secs: 121,
            ..valid_draft()
        };
        let violations = validate(OWNER, &over_limit, None).unwrap_err();
        assert_eq!(
            violations,
            vec![RuleViolation::ExecutionTimeTooLong { secs: 121 }]
        );

        let negative = HabitDraft {
            execution_time_secs: -1,
            ..valid_draft()
        };
        assert!(validate(OWNER, &negative, None).is_err());
    }

    #[test]
    fn test_periodicity_boundaries() {
        for periodicity in [1, 7] {
            let draft = HabitDraft {
                periodicity,
                ..valid_draft()
            };
            assert!(validate(OWNER, &draft, None).is_ok(), "{periodicity} should pass");
        }

        for periodicity in [0, 8] {
            let draft = HabitDraft {
                periodicity,
                ..valid_draft()
            };
            let violations = validate(OWNER, &draft, None).unwrap_err();
            assert_eq!(
                violations,
                vec![RuleViolation::PeriodicityOutOfRange { periodicity }]
            );
        }
    }

    #[test]
    fn test_every_violation_is_reported() {
        let target = RelatedSnapshot {
            id: 42,
            owner_id: "someone-else".to_string(),
            is_pleasant: false,
            is_public: false,
        };
        let draft = HabitDraft {
            award: Some("cake".to_string()),
            is_pleasant: true,
            is_public: true,
            execution_time_secs: 600,
            periodicity: 14,
            ..with_link(valid_draft())
        };

        let violations = validate(OWNER, &draft, Some(&target)).unwrap_err();
        assert_eq!(violations.len(), RULES.len());
        assert_eq!(violations[0], RuleViolation::RewardOrRelated);
        assert_eq!(violations[6], RuleViolation::PeriodicityOutOfRange { periodicity: 14 });
    }

    #[test]
    fn test_messages_are_distinct() {
        let messages: std::collections::HashSet<String> = [
            RuleViolation::RewardOrRelated,
            RuleViolation::PleasantWithReward,
            RuleViolation::RelatedNotPleasant,
            RuleViolation::RelatedNotOwned,
            RuleViolation::RelatedNotPublic,
            RuleViolation::ExecutionTimeTooLong { secs: 121 },
            RuleViolation::PeriodicityOutOfRange { periodicity: 0 },
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        assert_eq!(messages.len(), 7);
    }

    #[test]
    fn test_patch_merges_onto_existing_state() {
        let mut draft = with_link(valid_draft());
        let patch = HabitPatch {
            is_public: Some(true),
            award: Some(String::new()),
            ..HabitPatch::default()
        };
        patch.apply_to(&mut draft);

        assert!(draft.is_public);
        assert_eq!(draft.related_habit_id, Some(42));
        assert_eq!(draft.award, None);
        assert_eq!(draft.name.as_deref(), Some("Morning walk"));

        HabitPatch {
            related_habit_id: Some(None),
            ..HabitPatch::default()
        }
        .apply_to(&mut draft);
        assert_eq!(draft.related_habit_id, None);
    }

    #[test]
    fn test_normalized_clears_blank_text() {
        let draft = HabitDraft {
            name: Some("  ".to_string()),
            award: Some(String::new()),
            place: Some(" Gym ".to_string()),
            ..HabitDraft::new(time(6, 0))
        }
        .normalized();

        assert_eq!(draft.name, None);
        assert_eq!(draft.award, None);
        assert_eq!(draft.place.as_deref(), Some("Gym"));
    }

    #[test]
    fn test_text_change_clear_flag() {
        assert_eq!(text_change(None, false), None);
        assert_eq!(text_change(Some("Tea".to_string()), false).as_deref(), Some("Tea"));
        assert_eq!(text_change(None, true), Some(String::new()));
        assert_eq!(text_change(Some("Tea".to_string()), true), Some(String::new()));
    }

    #[test]
    fn test_inbound_links_keep_target_pleasant_and_public() {
        let target = HabitDraft {
            is_pleasant: true,
            is_public: true,
            ..HabitDraft::new(time(21, 0))
        };
        assert!(validate_inbound(&target, &[true, false]).is_ok());

        let unpleasant = HabitDraft {
            is_pleasant: false,
            ..target.clone()
        };
        assert_eq!(
            validate_inbound(&unpleasant, &[false, false]).unwrap_err(),
            vec![RuleViolation::StillRelatedFrom { count: 2 }]
        );

        let private = HabitDraft {
            is_public: false,
            ..target.clone()
        };
        assert_eq!(
            validate_inbound(&private, &[true, false]).unwrap_err(),
            vec![RuleViolation::StillRelatedFromPublic { count: 1 }]
        );
        assert!(validate_inbound(&private, &[false]).is_ok());
        assert!(validate_inbound(&HabitDraft::new(time(8, 0)), &[]).is_ok());
    }

    #[test]
    fn test_empty_patch() {
        assert!(HabitPatch::default().is_empty());
        assert!(
            !HabitPatch {
                periodicity: Some(3),
                ..HabitPatch::default()
            }
            .is_empty()
        );
    }
}
