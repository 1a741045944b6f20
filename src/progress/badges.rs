//! Badge catalogue and award rules.
//!
//! The table is the single source of truth for ids and display metadata.
//! Every entry has a rule below that can award it; `award` is the only way
//! a badge enters `UserState::badges`, and it is also what raises the
//! "newly earned" notification.

use chrono::{Datelike, Duration, NaiveDateTime, Timelike};
use serde::Serialize;

use crate::config::HookyConfig;
use crate::progress::state::{SavedScript, UserState};

// ── Ids ────────────────────────────────────────────────────────────

pub const FIRST_QUIZ: &str = "first_quiz";
pub const FIRST_SCRIPT: &str = "first_script";
pub const SCRIPTS_10: &str = "scripts_10";
pub const SCRIPTS_50: &str = "scripts_50";
pub const SCRIPTS_100: &str = "scripts_100";
pub const STREAK_7: &str = "streak_7";
pub const STREAK_30: &str = "streak_30";
pub const STREAK_100: &str = "streak_100";
pub const FIRST_SHARE: &str = "first_share";
pub const SHARES_10: &str = "shares_10";
pub const SECRET_OWL: &str = "secret_owl";
pub const SECRET_SEER: &str = "secret_seer";
pub const SECRET_LIGHTNING: &str = "secret_lightning";
pub const NICHE_SPECIALIST: &str = "niche_specialist";
pub const WEEKLY_GOAL: &str = "weekly_goal";
pub const GOAL_STREAK_4: &str = "goal_streak_4";
pub const CHALLENGE_FIRST: &str = "challenge_first";
pub const CHALLENGE_MASTER: &str = "challenge_master";

/// Scripts in a single niche that earn the niche badge.
pub const NICHE_THRESHOLD: u32 = 10;
/// Consecutive goal weeks that earn the goal-streak badge.
pub const GOAL_STREAK_THRESHOLD: u32 = 4;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BadgeCategory {
    Milestone,
    Streak,
    Social,
    Secret,
    Niche,
    Weekly,
    Challenge,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct BadgeDefinition {
    pub id: &'static str,
    pub icon: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    /// Tailwind color token used for the badge chip.
    pub color: &'static str,
    pub category: BadgeCategory,
}

impl BadgeDefinition {
    /// Secret badges hide their description until earned.
    pub fn is_secret(&self) -> bool {
        self.category == BadgeCategory::Secret
    }
}

const fn badge(
    id: &'static str,
    icon: &'static str,
    title: &'static str,
    description: &'static str,
    color: &'static str,
    category: BadgeCategory,
) -> BadgeDefinition {
    BadgeDefinition {
        id,
        icon,
        title,
        description,
        color,
        category,
    }
}

pub const BADGES: &[BadgeDefinition] = &[
    badge(FIRST_QUIZ, "🎯", "Know Thyself", "Completed the creator quiz", "violet", BadgeCategory::Milestone),
    badge(FIRST_SCRIPT, "✍️", "First Script", "Created your first script", "emerald", BadgeCategory::Milestone),
    badge(SCRIPTS_10, "📚", "Getting Serious", "Created 10 scripts", "sky", BadgeCategory::Milestone),
    badge(SCRIPTS_50, "🏭", "Content Machine", "Created 50 scripts", "indigo", BadgeCategory::Milestone),
    badge(SCRIPTS_100, "👑", "Hook Royalty", "Created 100 scripts", "amber", BadgeCategory::Milestone),
    badge(STREAK_7, "🔥", "On Fire", "Kept a 7-day streak", "orange", BadgeCategory::Streak),
    badge(STREAK_30, "⚡", "Unstoppable", "Kept a 30-day streak", "yellow", BadgeCategory::Streak),
    badge(STREAK_100, "💎", "Diamond Habit", "Kept a 100-day streak", "cyan", BadgeCategory::Streak),
    badge(FIRST_SHARE, "📣", "Spread the Word", "Shared Hooky for the first time", "pink", BadgeCategory::Social),
    badge(SHARES_10, "🌐", "Influencer", "Shared Hooky 10 times", "rose", BadgeCategory::Social),
    badge(SECRET_OWL, "🦉", "Night Owl", "Created a script between midnight and 5am", "slate", BadgeCategory::Secret),
    badge(SECRET_SEER, "🔮", "Seer", "Created a script on the first day of a month", "purple", BadgeCategory::Secret),
    badge(SECRET_LIGHTNING, "🌩️", "Lightning", "Created 3 scripts within one hour", "yellow", BadgeCategory::Secret),
    badge(NICHE_SPECIALIST, "🧭", "Niche Specialist", "Created 10 scripts in the same niche", "teal", BadgeCategory::Niche),
    badge(WEEKLY_GOAL, "🏁", "Goal Getter", "Hit your weekly goal", "lime", BadgeCategory::Weekly),
    badge(GOAL_STREAK_4, "📅", "Month of Momentum", "Hit your weekly goal 4 weeks in a row", "green", BadgeCategory::Weekly),
    badge(CHALLENGE_FIRST, "🎲", "Challenger", "Completed your first daily challenge", "fuchsia", BadgeCategory::Challenge),
    badge(CHALLENGE_MASTER, "🏆", "Challenge Master", "Completed 10 daily challenges", "red", BadgeCategory::Challenge),
];

pub fn definition(id: &str) -> Option<&'static BadgeDefinition> {
    BADGES.iter().find(|b| b.id == id)
}

/// Definitions for the earned ids, in earned order. Unknown ids are skipped.
pub fn earned_definitions(badges: &[String]) -> Vec<&'static BadgeDefinition> {
    badges.iter().filter_map(|id| definition(id)).collect()
}

// ── Award path ─────────────────────────────────────────────────────

/// Grant `id` once. Returns true when the badge is new, in which case it
/// also becomes the pending notification.
pub fn award(state: &mut UserState, id: &str) -> bool {
    if state.has_badge(id) {
        return false;
    }
    state.badges.push(id.to_string());
    state.newly_earned_badge = Some(id.to_string());
    log::info!(target: "hooky::badges", "earned badge {}", id);
    true
}

// ── Rules ──────────────────────────────────────────────────────────
//
// Threshold rules fire on the exact count, not on "at least": counters only
// ever move by one, so each threshold is crossed exactly once.

pub fn volume_badge(total_scripts: u32) -> Option<&'static str> {
    match total_scripts {
        1 => Some(FIRST_SCRIPT),
        10 => Some(SCRIPTS_10),
        50 => Some(SCRIPTS_50),
        100 => Some(SCRIPTS_100),
        _ => None,
    }
}

pub fn streak_badge(streak: u32) -> Option<&'static str> {
    match streak {
        7 => Some(STREAK_7),
        30 => Some(STREAK_30),
        100 => Some(STREAK_100),
        _ => None,
    }
}

pub fn share_badge(shares: u32) -> Option<&'static str> {
    match shares {
        1 => Some(FIRST_SHARE),
        10 => Some(SHARES_10),
        _ => None,
    }
}

pub fn challenge_badge(completed: u32) -> Option<&'static str> {
    match completed {
        1 => Some(CHALLENGE_FIRST),
        10 => Some(CHALLENGE_MASTER),
        _ => None,
    }
}

pub fn niche_badge(niche_count: u32) -> Option<&'static str> {
    (niche_count == NICHE_THRESHOLD).then_some(NICHE_SPECIALIST)
}

pub fn goal_streak_badge(goal_weeks: u32) -> Option<&'static str> {
    (goal_weeks == GOAL_STREAK_THRESHOLD).then_some(GOAL_STREAK_4)
}

/// Secret badges earned by a save at `now`. `scripts` already includes the
/// script being saved.
pub fn secret_badges(
    now: NaiveDateTime,
    scripts: &[SavedScript],
    config: &HookyConfig,
) -> Vec<&'static str> {
    let mut earned = Vec::new();
    if now.hour() < config.night_owl_end_hour {
        earned.push(SECRET_OWL);
    }
    if now.day() == 1 {
        earned.push(SECRET_SEER);
    }

    let window = Duration::minutes(config.lightning_window_minutes);
    let recent = scripts
        .iter()
        .filter(|s| {
            let age = now.signed_duration_since(s.created_at);
            age >= Duration::zero() && age < window
        })
        .count();
    if recent >= config.lightning_script_count {
        earned.push(SECRET_LIGHTNING);
    }
    earned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::script::sample_script;
    use chrono::NaiveDate;
    use std::collections::HashSet;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn saved(created_at: NaiveDateTime) -> SavedScript {
        SavedScript {
            id: created_at.to_string(),
            script: sample_script(),
            created_at,
            niche: None,
            is_favorite: false,
        }
    }

    #[test]
    fn table_ids_are_unique() {
        let ids: HashSet<_> = BADGES.iter().map(|b| b.id).collect();
        assert_eq!(ids.len(), BADGES.len());
    }

    #[test]
    fn every_table_entry_has_a_rule() {
        let config = HookyConfig::default();
        let mut reachable: HashSet<&str> = HashSet::from([FIRST_QUIZ, WEEKLY_GOAL]);
        for n in 0..=200 {
            reachable.extend(volume_badge(n));
            reachable.extend(streak_badge(n));
            reachable.extend(share_badge(n));
            reachable.extend(challenge_badge(n));
            reachable.extend(niche_badge(n));
            reachable.extend(goal_streak_badge(n));
        }
        let burst: Vec<_> = (0..3).map(|i| saved(at(1, 2, i))).collect();
        reachable.extend(secret_badges(at(1, 2, 5), &burst, &config));

        for def in BADGES {
            assert!(reachable.contains(def.id), "{} has no award rule", def.id);
        }
    }

    #[test]
    fn award_is_idempotent_and_notifies_once() {
        let mut state = UserState::default();
        assert!(award(&mut state, FIRST_SCRIPT));
        assert_eq!(state.newly_earned_badge.as_deref(), Some(FIRST_SCRIPT));

        state.newly_earned_badge = None;
        assert!(!award(&mut state, FIRST_SCRIPT));
        assert!(state.newly_earned_badge.is_none());
        assert_eq!(state.badges, vec![FIRST_SCRIPT.to_string()]);
    }

    #[test]
    fn thresholds_are_exact() {
        assert_eq!(volume_badge(1), Some(FIRST_SCRIPT));
        assert_eq!(volume_badge(2), None);
        assert_eq!(volume_badge(11), None);
        assert_eq!(streak_badge(7), Some(STREAK_7));
        assert_eq!(streak_badge(8), None);
        assert_eq!(share_badge(10), Some(SHARES_10));
        assert_eq!(niche_badge(9), None);
        assert_eq!(goal_streak_badge(4), Some(GOAL_STREAK_4));
    }

    #[test]
    fn night_owl_window_ends_at_five() {
        let config = HookyConfig::default();
        let late = secret_badges(at(16, 4, 59), &[saved(at(16, 4, 59))], &config);
        assert!(late.contains(&SECRET_OWL));
        let dawn = secret_badges(at(16, 5, 0), &[saved(at(16, 5, 0))], &config);
        assert!(!dawn.contains(&SECRET_OWL));
    }

    #[test]
    fn seer_only_on_first_of_month() {
        let config = HookyConfig::default();
        assert!(secret_badges(at(1, 12, 0), &[], &config).contains(&SECRET_SEER));
        assert!(!secret_badges(at(2, 12, 0), &[], &config).contains(&SECRET_SEER));
    }

    #[test]
    fn lightning_needs_three_inside_the_hour() {
        let config = HookyConfig::default();
        let now = at(16, 14, 0);
        let inside = vec![saved(now), saved(at(16, 13, 30)), saved(at(16, 13, 1))];
        assert!(secret_badges(now, &inside, &config).contains(&SECRET_LIGHTNING));

        let one_too_old = vec![saved(now), saved(at(16, 13, 30)), saved(at(16, 13, 0))];
        assert!(!secret_badges(now, &one_too_old, &config).contains(&SECRET_LIGHTNING));
    }

    #[test]
    fn earned_definitions_skip_unknown_ids() {
        let earned = vec![
            FIRST_SCRIPT.to_string(),
            "retired_badge".to_string(),
            SECRET_OWL.to_string(),
        ];
        let defs = earned_definitions(&earned);
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].title, "First Script");
        assert!(defs[1].is_secret());
    }
}
