//! User progress store: the only writer of `UserState`.
//!
//! A `ProgressStore` owns the state, its storage handle and the active
//! configuration. Every action mutates the in-memory state and then writes
//! the whole state back through the persistence adapter. Actions take the
//! device-local time explicitly so rule evaluation (streaks, secret badges,
//! weekly goals) is deterministic.
//!
//! If a write fails the action returns `HookyError::Storage`, but the
//! in-memory state keeps the change; the next successful write catches
//! storage up.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::HashSet;

use crate::config::HookyConfig;
use crate::error::{HookyError, Result};
use crate::pipeline::script::GeneratedScript;
use crate::progress::badges::{self, BadgeDefinition};
use crate::progress::calendar::{is_day_before, week_end, week_start};
use crate::progress::challenges::Challenge;
use crate::progress::persistence::{self, Storage};
use crate::progress::state::{CreatorProfile, SavedScript, UserState};

/// What `check_streak` did.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StreakOutcome {
    /// Already active today.
    Unchanged,
    /// First ever activity.
    Started,
    /// Active yesterday, streak grew by one.
    Extended,
    /// A gap of two or more days.
    Reset,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ScriptAllowance {
    Unlimited,
    Remaining { count: u32 },
}

/// Handed to the host, which starts the external checkout flow.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutIntent {
    pub plan: String,
    pub already_premium: bool,
    pub scripts_created: u32,
}

/// Read model for the dashboard: the raw state plus derived values.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub state: UserState,
    pub weekly_progress_percent: u32,
    pub script_allowance: ScriptAllowance,
    pub earned_badges: Vec<&'static BadgeDefinition>,
}

pub struct ProgressStore<S: Storage> {
    storage: S,
    config: HookyConfig,
    state: UserState,
}

impl<S: Storage> ProgressStore<S> {
    /// Load the persisted state (or defaults) and run the weekly rollover
    /// for `today`.
    pub fn open(storage: S, config: HookyConfig, today: NaiveDate) -> Self {
        let state = persistence::load(&storage, &config.storage_keys.user_state)
            .unwrap_or_else(|| UserState::with_config(&config));
        let mut store = Self {
            storage,
            config,
            state,
        };
        if normalize(&mut store.state, &store.config) {
            log::warn!(target: "hooky::store", "stored state repaired on load");
            if let Err(e) = store.persist() {
                log::warn!(target: "hooky::store", "repaired state not persisted: {}", e);
            }
        }
        if let Err(e) = store.refresh(today) {
            log::warn!(target: "hooky::store", "weekly rollover not persisted: {}", e);
        }
        store
    }

    pub fn state(&self) -> &UserState {
        &self.state
    }

    pub fn config(&self) -> &HookyConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            state: self.state.clone(),
            weekly_progress_percent: weekly_progress_percent(&self.state),
            script_allowance: self.allowance(),
            earned_badges: badges::earned_definitions(&self.state.badges),
        }
    }

    pub fn allowance(&self) -> ScriptAllowance {
        if self.state.is_premium {
            ScriptAllowance::Unlimited
        } else {
            ScriptAllowance::Remaining {
                count: self.state.free_scripts_remaining,
            }
        }
    }

    fn persist(&mut self) -> Result<()> {
        persistence::save(
            &mut self.storage,
            &self.config.storage_keys.user_state,
            &self.state,
        )
    }

    // ── Weekly counter ─────────────────────────────────────────────

    /// Move the weekly window to the week containing `today` and re-derive
    /// `scripts_this_week` from the activity log. Returns whether anything
    /// changed.
    fn roll_week(&mut self, today: NaiveDate) -> bool {
        let start = week_start(today);
        let count = self.scripts_in_week(start);
        let changed =
            self.state.week_start_date != Some(start) || self.state.scripts_this_week != count;
        if changed {
            if self.state.week_start_date != Some(start) {
                log::debug!(target: "hooky::store", "new week starting {}", start);
            }
            self.state.week_start_date = Some(start);
            self.state.scripts_this_week = count;
        }
        changed
    }

    fn scripts_in_week(&self, start: NaiveDate) -> u32 {
        self.state
            .activity_log
            .range(start..=week_end(start))
            .map(|(_, count)| *count)
            .sum()
    }

    /// Weekly rollover, persisted only when it changed something.
    pub fn refresh(&mut self, today: NaiveDate) -> Result<()> {
        if self.roll_week(today) {
            self.persist()?;
        }
        Ok(())
    }

    // ── Onboarding ─────────────────────────────────────────────────

    /// Record the quiz answers. Repeat calls overwrite the profile.
    pub fn complete_quiz(&mut self, profile: CreatorProfile) -> Result<()> {
        self.state.has_completed_quiz = true;
        self.state.creator_profile = Some(profile);
        badges::award(&mut self.state, badges::FIRST_QUIZ);
        self.persist()
    }

    // ── Scripts ────────────────────────────────────────────────────

    /// Spend one free script. Premium users always pass without spending;
    /// an exhausted free allowance returns `false` and changes nothing.
    pub fn use_script(&mut self) -> Result<bool> {
        if self.state.is_premium {
            return Ok(true);
        }
        if self.state.free_scripts_remaining == 0 {
            return Ok(false);
        }
        self.state.free_scripts_remaining -= 1;
        self.persist()?;
        Ok(true)
    }

    pub fn save_script(
        &mut self,
        script: GeneratedScript,
        niche: Option<String>,
        now: NaiveDateTime,
    ) -> Result<SavedScript> {
        let today = now.date();
        let niche = niche
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let saved = SavedScript {
            id: self.next_script_id(now),
            script,
            created_at: now,
            niche: niche.clone(),
            is_favorite: false,
        };
        self.state.scripts.insert(0, saved.clone());
        self.state.total_scripts_created = self.state.total_scripts_created.saturating_add(1);
        let bucket = self.state.activity_log.entry(today).or_insert(0);
        *bucket = bucket.saturating_add(1);
        self.roll_week(today);

        if let Some(id) = badges::volume_badge(self.state.total_scripts_created) {
            badges::award(&mut self.state, id);
        }
        if let Some(niche) = niche {
            let count = self.state.niche_counts.entry(niche.to_lowercase()).or_insert(0);
            *count = count.saturating_add(1);
            if let Some(id) = badges::niche_badge(*count) {
                badges::award(&mut self.state, id);
            }
        }
        for id in badges::secret_badges(now, &self.state.scripts, &self.config) {
            badges::award(&mut self.state, id);
        }
        self.evaluate_weekly_goal(today);

        log::info!(
            target: "hooky::store",
            "saved script {} (total {})",
            saved.id,
            self.state.total_scripts_created
        );
        self.persist()?;
        Ok(saved)
    }

    /// Millisecond timestamp, suffixed when two saves share a millisecond.
    fn next_script_id(&self, now: NaiveDateTime) -> String {
        let base = now.and_utc().timestamp_millis().to_string();
        if self.state.find_script(&base).is_none() {
            return base;
        }
        (1..)
            .map(|n| format!("{}-{}", base, n))
            .find(|candidate| self.state.find_script(candidate).is_none())
            .unwrap_or(base)
    }

    /// Hitting the goal exactly awards the weekly badge and advances the
    /// consecutive-weeks counter once per week.
    fn evaluate_weekly_goal(&mut self, today: NaiveDate) {
        if self.state.scripts_this_week != self.state.weekly_goal {
            return;
        }
        badges::award(&mut self.state, badges::WEEKLY_GOAL);

        let week = week_start(today);
        match self.state.last_goal_week {
            Some(prev) if prev == week => return,
            Some(prev) if prev + Duration::days(7) == week => {
                self.state.weekly_goal_streak = self.state.weekly_goal_streak.saturating_add(1);
            }
            _ => self.state.weekly_goal_streak = 1,
        }
        self.state.last_goal_week = Some(week);
        if let Some(id) = badges::goal_streak_badge(self.state.weekly_goal_streak) {
            badges::award(&mut self.state, id);
        }
    }

    /// Remove a script from the library. Historical counters are untouched.
    pub fn delete_script(&mut self, id: &str) -> Result<()> {
        let index = self
            .state
            .scripts
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| HookyError::not_found(format!("script {}", id)))?;
        self.state.scripts.remove(index);
        self.persist()
    }

    /// Returns the new favorite flag.
    pub fn toggle_favorite(&mut self, id: &str) -> Result<bool> {
        let script = self
            .state
            .scripts
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| HookyError::not_found(format!("script {}", id)))?;
        script.is_favorite = !script.is_favorite;
        let favorite = script.is_favorite;
        self.persist()?;
        Ok(favorite)
    }

    // ── Streaks ────────────────────────────────────────────────────

    /// Mark `today` as active.
    ///
    /// After a gap the streak restarts at 1 and `longest_streak` is left as
    /// it was, whereas the very first activity also lifts `longest_streak`
    /// to at least 1.
    pub fn check_streak(&mut self, today: NaiveDate) -> Result<StreakOutcome> {
        let outcome = match self.state.last_active_date {
            Some(last) if last == today => return Ok(StreakOutcome::Unchanged),
            Some(last) if is_day_before(last, today) => {
                self.state.current_streak = self.state.current_streak.saturating_add(1);
                self.state.longest_streak =
                    self.state.longest_streak.max(self.state.current_streak);
                if let Some(id) = badges::streak_badge(self.state.current_streak) {
                    badges::award(&mut self.state, id);
                }
                StreakOutcome::Extended
            }
            None => {
                self.state.current_streak = 1;
                self.state.longest_streak = self.state.longest_streak.max(1);
                StreakOutcome::Started
            }
            Some(_) => {
                self.state.current_streak = 1;
                StreakOutcome::Reset
            }
        };
        self.state.last_active_date = Some(today);
        log::debug!(
            target: "hooky::store",
            "streak {:?}: current {}",
            outcome,
            self.state.current_streak
        );
        self.persist()?;
        Ok(outcome)
    }

    // ── Badges ─────────────────────────────────────────────────────

    /// Grant a badge by id. Returns whether it was new.
    pub fn add_badge(&mut self, id: &str) -> Result<bool> {
        let definition = badges::definition(id)
            .ok_or_else(|| HookyError::invalid(format!("unknown badge: {}", id)))?;
        if !badges::award(&mut self.state, definition.id) {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    pub fn clear_new_badge(&mut self) -> Result<()> {
        if self.state.newly_earned_badge.take().is_some() {
            self.persist()?;
        }
        Ok(())
    }

    // ── Premium ────────────────────────────────────────────────────

    /// Describe the checkout the host should start. Premium is granted
    /// later by `confirm_premium`, once payment is confirmed.
    pub fn upgrade_to_premium(&self) -> CheckoutIntent {
        log::info!(target: "hooky::store", "checkout requested for {}", self.config.checkout_plan);
        CheckoutIntent {
            plan: self.config.checkout_plan.clone(),
            already_premium: self.state.is_premium,
            scripts_created: self.state.total_scripts_created,
        }
    }

    pub fn confirm_premium(&mut self) -> Result<()> {
        if self.state.is_premium {
            return Ok(());
        }
        self.state.is_premium = true;
        log::info!(target: "hooky::store", "premium activated");
        self.persist()
    }

    // ── Goals, sharing, challenges ─────────────────────────────────

    pub fn set_weekly_goal(&mut self, goal: u32) -> Result<()> {
        if goal == 0 || goal > self.config.max_weekly_goal {
            return Err(HookyError::invalid(format!(
                "weekly goal must be between 1 and {}",
                self.config.max_weekly_goal
            )));
        }
        self.state.weekly_goal = goal;
        self.persist()
    }

    /// Returns the new share count.
    pub fn increment_shares(&mut self) -> Result<u32> {
        self.state.shares_count = self.state.shares_count.saturating_add(1);
        if let Some(id) = badges::share_badge(self.state.shares_count) {
            badges::award(&mut self.state, id);
        }
        self.persist()?;
        Ok(self.state.shares_count)
    }

    /// Make `challenge` the active one, replacing any unfinished challenge.
    pub fn start_challenge(&mut self, challenge: Challenge) -> Result<()> {
        if challenge.id.trim().is_empty() {
            return Err(HookyError::invalid("challenge id is required"));
        }
        self.state.active_challenge = Some(challenge);
        self.persist()
    }

    pub fn complete_challenge(&mut self) -> Result<Challenge> {
        let challenge = self
            .state
            .active_challenge
            .take()
            .ok_or_else(|| HookyError::invalid("no challenge in progress"))?;
        self.state.challenges_completed = self.state.challenges_completed.saturating_add(1);
        if let Some(id) = badges::challenge_badge(self.state.challenges_completed) {
            badges::award(&mut self.state, id);
        }
        self.persist()?;
        Ok(challenge)
    }

    // ── Reset / import ─────────────────────────────────────────────

    /// Wipe the stored blob and start over with defaults.
    pub fn reset_user(&mut self, today: NaiveDate) -> Result<()> {
        self.state = UserState::with_config(&self.config);
        self.roll_week(today);
        log::info!(target: "hooky::store", "user state reset");
        persistence::clear(&mut self.storage, &self.config.storage_keys.user_state)
    }

    /// Replace the whole state, e.g. from an exported backup. The imported
    /// state is normalized first, and premium never switches off.
    pub fn import_state(&mut self, mut state: UserState, today: NaiveDate) -> Result<()> {
        state.is_premium |= self.state.is_premium;
        if normalize(&mut state, &self.config) {
            log::warn!(target: "hooky::store", "imported state repaired");
        }
        self.state = state;
        self.roll_week(today);
        self.persist()
    }
}

/// Restore the `UserState` invariants on a state that did not come from
/// this store's own actions. Returns whether anything changed.
///
/// - each badge id appears once, first occurrence kept;
/// - `longest_streak >= current_streak`;
/// - `1 <= weekly_goal <= max_weekly_goal`;
/// - the pending notification names an earned badge.
pub fn normalize(state: &mut UserState, config: &HookyConfig) -> bool {
    let mut changed = false;

    let mut seen = HashSet::new();
    let before = state.badges.len();
    state.badges.retain(|id| seen.insert(id.clone()));
    changed |= state.badges.len() != before;

    if state.longest_streak < state.current_streak {
        state.longest_streak = state.current_streak;
        changed = true;
    }

    let goal = state.weekly_goal.clamp(1, config.max_weekly_goal.max(1));
    if goal != state.weekly_goal {
        state.weekly_goal = goal;
        changed = true;
    }

    if let Some(pending) = &state.newly_earned_badge {
        if !state.has_badge(pending) {
            state.newly_earned_badge = None;
            changed = true;
        }
    }
    changed
}

/// Share of the weekly goal reached, capped at 100.
pub fn weekly_progress_percent(state: &UserState) -> u32 {
    if state.weekly_goal == 0 {
        return 0;
    }
    let percent = u64::from(state.scripts_this_week) * 100 / u64::from(state.weekly_goal);
    percent.min(100) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::script::sample_script;
    use crate::progress::badges::*;
    use crate::progress::persistence::{FailingStorage, MemoryStorage};

    const KEY: &str = "hooky_user_state";

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn at(d: u32, hour: u32, minute: u32) -> NaiveDateTime {
        day(d).and_hms_opt(hour, minute, 0).unwrap()
    }

    fn fresh(today: NaiveDate) -> ProgressStore<MemoryStorage> {
        ProgressStore::open(MemoryStorage::default(), HookyConfig::default(), today)
    }

    fn with_state(state: UserState, today: NaiveDate) -> ProgressStore<MemoryStorage> {
        let mut storage = MemoryStorage::default();
        persistence::save(&mut storage, KEY, &state).unwrap();
        ProgressStore::open(storage, HookyConfig::default(), today)
    }

    fn save_at(store: &mut ProgressStore<MemoryStorage>, now: NaiveDateTime) -> SavedScript {
        store
            .save_script(sample_script(), None, now)
            .expect("save should succeed")
    }

    fn reload(store: ProgressStore<MemoryStorage>, today: NaiveDate) -> ProgressStore<MemoryStorage> {
        let config = store.config().clone();
        ProgressStore::open(store.storage, config, today)
    }

    // ── Quiz ───────────────────────────────────────────────────────

    #[test]
    fn complete_quiz_sets_profile_and_badge() {
        let mut store = fresh(day(16));
        let profile = CreatorProfile {
            niche: "fitness".to_string(),
            ..CreatorProfile::default()
        };
        store.complete_quiz(profile).unwrap();

        assert!(store.state().has_completed_quiz);
        assert_eq!(store.state().creator_profile.as_ref().unwrap().niche, "fitness");
        assert!(store.state().has_badge(FIRST_QUIZ));
        assert_eq!(store.state().newly_earned_badge.as_deref(), Some(FIRST_QUIZ));
    }

    #[test]
    fn repeat_quiz_overwrites_profile_without_duplicate_badge() {
        let mut store = fresh(day(16));
        store
            .complete_quiz(CreatorProfile {
                niche: "fitness".to_string(),
                ..CreatorProfile::default()
            })
            .unwrap();
        store.clear_new_badge().unwrap();
        store
            .complete_quiz(CreatorProfile {
                niche: "cooking".to_string(),
                ..CreatorProfile::default()
            })
            .unwrap();

        assert_eq!(store.state().creator_profile.as_ref().unwrap().niche, "cooking");
        assert_eq!(store.state().badges, vec![FIRST_QUIZ.to_string()]);
        assert!(store.state().newly_earned_badge.is_none());
    }

    // ── Free allowance ─────────────────────────────────────────────

    #[test]
    fn use_script_never_goes_negative() {
        let mut store = fresh(day(16));
        assert!(store.use_script().unwrap());
        assert!(store.use_script().unwrap());
        assert!(store.use_script().unwrap());
        assert_eq!(store.state().free_scripts_remaining, 0);

        let before = store.state().clone();
        assert!(!store.use_script().unwrap());
        assert_eq!(store.state(), &before);
        assert_eq!(store.allowance(), ScriptAllowance::Remaining { count: 0 });
    }

    #[test]
    fn premium_scripts_are_free() {
        let mut store = fresh(day(16));
        store.confirm_premium().unwrap();
        for _ in 0..10 {
            assert!(store.use_script().unwrap());
        }
        assert_eq!(store.state().free_scripts_remaining, 3);
        assert_eq!(store.allowance(), ScriptAllowance::Unlimited);
    }

    #[test]
    fn upgrade_request_does_not_grant_premium() {
        let store = fresh(day(16));
        let intent = store.upgrade_to_premium();
        assert_eq!(intent.plan, "hooky_premium_monthly");
        assert!(!intent.already_premium);
        assert!(!store.state().is_premium);
    }

    // ── Saving scripts ─────────────────────────────────────────────

    #[test]
    fn total_counts_every_save_and_ignores_deletes() {
        let mut store = fresh(day(16));
        let first = save_at(&mut store, at(16, 9, 0));
        save_at(&mut store, at(16, 12, 0));
        save_at(&mut store, at(16, 18, 0));
        store.delete_script(&first.id).unwrap();

        assert_eq!(store.state().total_scripts_created, 3);
        assert_eq!(store.state().scripts.len(), 2);
        assert_eq!(store.state().activity_log.get(&day(16)), Some(&3));
    }

    #[test]
    fn newest_script_comes_first() {
        let mut store = fresh(day(16));
        let older = save_at(&mut store, at(16, 9, 0));
        let newer = save_at(&mut store, at(16, 10, 0));
        assert_eq!(store.state().scripts[0].id, newer.id);
        assert_eq!(store.state().scripts[1].id, older.id);
    }

    #[test]
    fn ids_stay_unique_within_one_millisecond() {
        let mut store = fresh(day(16));
        let a = save_at(&mut store, at(16, 9, 0));
        let b = save_at(&mut store, at(16, 9, 0));
        let c = save_at(&mut store, at(16, 9, 0));
        assert_ne!(a.id, b.id);
        assert_ne!(b.id, c.id);
        assert_eq!(b.id, format!("{}-1", a.id));
    }

    #[test]
    fn night_burst_earns_owl_and_lightning() {
        let mut store = fresh(day(16));
        save_at(&mut store, at(16, 1, 0));
        save_at(&mut store, at(16, 1, 20));
        save_at(&mut store, at(16, 1, 40));

        let state = store.state();
        assert_eq!(state.total_scripts_created, 3);
        assert!(state.has_badge(FIRST_SCRIPT));
        assert!(state.has_badge(SECRET_OWL));
        assert!(state.has_badge(SECRET_LIGHTNING));
        assert!(!state.has_badge(SECRET_SEER));
    }

    #[test]
    fn first_of_month_earns_seer() {
        let mut store = fresh(day(1));
        save_at(&mut store, at(1, 12, 0));
        assert!(store.state().has_badge(SECRET_SEER));
        assert!(!store.state().has_badge(SECRET_OWL));
    }

    #[test]
    fn badges_never_duplicate() {
        let mut store = fresh(day(16));
        for minute in 0..12 {
            save_at(&mut store, at(16, 2, minute));
        }
        let mut ids = store.state().badges.clone();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
        assert!(store.state().has_badge(SCRIPTS_10));
    }

    #[test]
    fn niche_badge_at_ten_in_one_niche() {
        let mut store = fresh(day(16));
        for hour in 8..17 {
            store
                .save_script(sample_script(), Some("Fitness".to_string()), at(16, hour, 0))
                .unwrap();
        }
        assert!(!store.state().has_badge(NICHE_SPECIALIST));
        store
            .save_script(sample_script(), Some(" fitness ".to_string()), at(16, 17, 0))
            .unwrap();
        assert!(store.state().has_badge(NICHE_SPECIALIST));
        assert_eq!(store.state().niche_counts.get("fitness"), Some(&10));
    }

    #[test]
    fn blank_niche_is_dropped() {
        let mut store = fresh(day(16));
        let saved = store
            .save_script(sample_script(), Some("   ".to_string()), at(16, 9, 0))
            .unwrap();
        assert!(saved.niche.is_none());
        assert!(store.state().niche_counts.is_empty());
    }

    #[test]
    fn favorite_toggles_and_unknown_id_is_not_found() {
        let mut store = fresh(day(16));
        let saved = save_at(&mut store, at(16, 9, 0));
        assert!(store.toggle_favorite(&saved.id).unwrap());
        assert!(store.state().scripts[0].is_favorite);
        assert!(!store.toggle_favorite(&saved.id).unwrap());

        assert_eq!(store.toggle_favorite("missing").unwrap_err().status(), 404);
        assert_eq!(store.delete_script("missing").unwrap_err().status(), 404);
        assert_eq!(store.state().total_scripts_created, 1);
    }

    // ── Weekly goal ────────────────────────────────────────────────

    #[test]
    fn five_of_five_is_full_progress() {
        let mut store = fresh(day(12));
        store.set_weekly_goal(5).unwrap();
        for d in 12..17 {
            save_at(&mut store, at(d, 10, 0));
        }
        assert_eq!(store.state().scripts_this_week, 5);
        assert_eq!(store.snapshot().weekly_progress_percent, 100);
        assert!(store.state().has_badge(WEEKLY_GOAL));
    }

    #[test]
    fn progress_is_capped_and_partial() {
        let mut store = fresh(day(12));
        store.set_weekly_goal(4).unwrap();
        save_at(&mut store, at(12, 10, 0));
        assert_eq!(store.snapshot().weekly_progress_percent, 25);
        for hour in 11..17 {
            save_at(&mut store, at(12, hour, 0));
        }
        assert_eq!(store.snapshot().weekly_progress_percent, 100);
    }

    #[test]
    fn weekly_counter_matches_activity_log() {
        let mut store = fresh(day(10));
        save_at(&mut store, at(10, 10, 0)); // Saturday, previous week
        save_at(&mut store, at(11, 10, 0)); // Sunday
        save_at(&mut store, at(16, 10, 0));
        assert_eq!(store.state().week_start_date, Some(day(11)));
        assert_eq!(store.state().scripts_this_week, 2);
    }

    #[test]
    fn week_rollover_on_load_zeroes_counter() {
        let mut store = fresh(day(16));
        save_at(&mut store, at(16, 10, 0));
        save_at(&mut store, at(17, 10, 0));
        assert_eq!(store.state().scripts_this_week, 2);

        let store = reload(store, day(18));
        assert_eq!(store.state().week_start_date, Some(day(18)));
        assert_eq!(store.state().scripts_this_week, 0);
        assert_eq!(store.state().total_scripts_created, 2);
    }

    #[test]
    fn goal_streak_counts_consecutive_weeks() {
        let mut store = fresh(day(4));
        store.set_weekly_goal(1).unwrap();
        for week_day in [4, 11, 18] {
            save_at(&mut store, at(week_day, 10, 0));
        }
        assert_eq!(store.state().weekly_goal_streak, 3);
        assert!(!store.state().has_badge(GOAL_STREAK_4));

        save_at(&mut store, at(25, 10, 0));
        assert_eq!(store.state().weekly_goal_streak, 4);
        assert!(store.state().has_badge(GOAL_STREAK_4));
    }

    #[test]
    fn skipped_week_restarts_goal_streak() {
        let mut store = fresh(day(4));
        store.set_weekly_goal(1).unwrap();
        save_at(&mut store, at(4, 10, 0));
        save_at(&mut store, at(11, 10, 0));
        save_at(&mut store, at(25, 10, 0));
        assert_eq!(store.state().weekly_goal_streak, 1);
        assert_eq!(store.state().last_goal_week, Some(day(25)));
    }

    #[test]
    fn weekly_goal_bounds() {
        let mut store = fresh(day(16));
        assert_eq!(store.set_weekly_goal(0).unwrap_err().status(), 400);
        assert!(store.set_weekly_goal(51).is_err());
        store.set_weekly_goal(50).unwrap();
        assert_eq!(store.state().weekly_goal, 50);
    }

    // ── Streaks ────────────────────────────────────────────────────

    #[test]
    fn first_check_starts_streak() {
        let mut store = fresh(day(16));
        assert_eq!(store.check_streak(day(16)).unwrap(), StreakOutcome::Started);
        assert_eq!(store.state().current_streak, 1);
        assert_eq!(store.state().longest_streak, 1);
        assert_eq!(store.state().last_active_date, Some(day(16)));
    }

    #[test]
    fn same_day_check_is_idempotent() {
        let mut store = fresh(day(16));
        store.check_streak(day(16)).unwrap();
        let after_first = store.state().clone();
        assert_eq!(store.check_streak(day(16)).unwrap(), StreakOutcome::Unchanged);
        assert_eq!(store.state(), &after_first);
    }

    #[test]
    fn next_day_extends_by_one() {
        let state = UserState {
            current_streak: 3,
            longest_streak: 10,
            last_active_date: Some(day(15)),
            ..UserState::default()
        };
        let mut store = with_state(state, day(16));
        assert_eq!(store.check_streak(day(16)).unwrap(), StreakOutcome::Extended);
        assert_eq!(store.state().current_streak, 4);
        assert_eq!(store.state().longest_streak, 10);
    }

    #[test]
    fn extending_past_longest_raises_it() {
        let state = UserState {
            current_streak: 6,
            longest_streak: 6,
            last_active_date: Some(day(15)),
            ..UserState::default()
        };
        let mut store = with_state(state, day(16));
        store.check_streak(day(16)).unwrap();
        assert_eq!(store.state().current_streak, 7);
        assert_eq!(store.state().longest_streak, 7);
        assert!(store.state().has_badge(STREAK_7));
        assert_eq!(store.state().newly_earned_badge.as_deref(), Some(STREAK_7));
    }

    #[test]
    fn gap_resets_current_and_leaves_longest() {
        let state = UserState {
            current_streak: 5,
            longest_streak: 5,
            last_active_date: Some(day(13)),
            ..UserState::default()
        };
        let mut store = with_state(state, day(16));
        assert_eq!(store.check_streak(day(16)).unwrap(), StreakOutcome::Reset);
        assert_eq!(store.state().current_streak, 1);
        assert_eq!(store.state().longest_streak, 5);
        assert_eq!(store.state().last_active_date, Some(day(16)));
    }

    #[test]
    fn streak_survives_month_boundary() {
        let state = UserState {
            current_streak: 2,
            longest_streak: 2,
            last_active_date: Some(NaiveDate::from_ymd_opt(2026, 9, 30).unwrap()),
            ..UserState::default()
        };
        let mut store = with_state(state, day(1));
        assert_eq!(store.check_streak(day(1)).unwrap(), StreakOutcome::Extended);
        assert_eq!(store.state().current_streak, 3);
    }

    // ── Badges, shares, challenges ─────────────────────────────────

    #[test]
    fn add_badge_rejects_unknown_and_notifies_new() {
        let mut store = fresh(day(16));
        assert_eq!(store.add_badge("made_up").unwrap_err().status(), 400);
        assert!(store.add_badge(SECRET_SEER).unwrap());
        assert_eq!(store.state().newly_earned_badge.as_deref(), Some(SECRET_SEER));
        store.clear_new_badge().unwrap();
        assert!(!store.add_badge(SECRET_SEER).unwrap());
        assert!(store.state().newly_earned_badge.is_none());
    }

    #[test]
    fn shares_award_at_one_and_ten() {
        let mut store = fresh(day(16));
        assert_eq!(store.increment_shares().unwrap(), 1);
        assert!(store.state().has_badge(FIRST_SHARE));
        for _ in 0..9 {
            store.increment_shares().unwrap();
        }
        assert_eq!(store.state().shares_count, 10);
        assert!(store.state().has_badge(SHARES_10));
    }

    #[test]
    fn challenge_lifecycle() {
        let mut store = fresh(day(16));
        assert_eq!(store.complete_challenge().unwrap_err().status(), 400);

        let challenge = crate::progress::challenges::challenge_for(day(16));
        store.start_challenge(challenge.clone()).unwrap();
        assert_eq!(store.state().active_challenge.as_ref(), Some(&challenge));

        let done = store.complete_challenge().unwrap();
        assert_eq!(done, challenge);
        assert!(store.state().active_challenge.is_none());
        assert_eq!(store.state().challenges_completed, 1);
        assert!(store.state().has_badge(CHALLENGE_FIRST));
    }

    // ── Persistence ────────────────────────────────────────────────

    #[test]
    fn every_action_is_persisted() {
        let mut store = fresh(day(16));
        save_at(&mut store, at(16, 9, 0));
        store.increment_shares().unwrap();
        let stored: UserState = persistence::load(store.storage(), KEY).unwrap();
        assert_eq!(&stored, store.state());
    }

    #[test]
    fn reload_without_writes_is_identical() {
        let mut store = fresh(day(16));
        save_at(&mut store, at(16, 9, 0));
        store.check_streak(day(16)).unwrap();
        let id = store.state().scripts[0].id.clone();
        store.toggle_favorite(&id).unwrap();
        let before = store.state().clone();

        let store = reload(store, day(17));
        assert_eq!(store.state(), &before);
    }

    #[test]
    fn malformed_blob_loads_defaults() {
        let mut storage = MemoryStorage::default();
        storage.set_item(KEY, "]]]").unwrap();
        let store = ProgressStore::open(storage, HookyConfig::default(), day(16));
        assert_eq!(store.state().total_scripts_created, 0);
        assert_eq!(store.state().free_scripts_remaining, 3);
    }

    #[test]
    fn reset_restores_defaults_and_clears_key() {
        let mut store = fresh(day(16));
        store.complete_quiz(CreatorProfile::default()).unwrap();
        save_at(&mut store, at(16, 9, 0));
        store.check_streak(day(16)).unwrap();
        store.confirm_premium().unwrap();

        store.reset_user(day(16)).unwrap();
        let mut expected = UserState::default();
        expected.week_start_date = Some(day(11));
        assert_eq!(store.state(), &expected);
        assert!(!store.storage().contains(KEY));
    }

    #[test]
    fn storage_failure_is_reported_but_state_updates() {
        let mut store = ProgressStore::open(FailingStorage, HookyConfig::default(), day(16));
        let err = store.increment_shares().unwrap_err();
        assert!(matches!(err, HookyError::Storage(_)));
        assert_eq!(store.state().shares_count, 1);
    }

    #[test]
    fn import_rederives_week() {
        let mut store = fresh(day(16));
        let mut imported = UserState::default();
        imported.activity_log.insert(day(12), 2);
        imported.activity_log.insert(day(3), 9);
        imported.scripts_this_week = 40;
        store.import_state(imported, day(16)).unwrap();
        assert_eq!(store.state().scripts_this_week, 2);
    }

    fn broken_state() -> UserState {
        serde_json::from_str(
            r#"{"badges":["first_script","first_quiz","first_script"],
                "currentStreak":9,"longestStreak":2,"weeklyGoal":0,
                "isPremium":false,"newlyEarnedBadge":"streak_100"}"#,
        )
        .unwrap()
    }

    fn assert_repaired(state: &UserState) {
        assert_eq!(state.badges, vec![FIRST_SCRIPT.to_string(), FIRST_QUIZ.to_string()]);
        assert_eq!(state.current_streak, 9);
        assert_eq!(state.longest_streak, 9);
        assert_eq!(state.weekly_goal, 1);
        assert!(state.newly_earned_badge.is_none());
    }

    #[test]
    fn import_repairs_broken_state_and_keeps_premium() {
        let mut store = fresh(day(16));
        store.confirm_premium().unwrap();
        store.import_state(broken_state(), day(16)).unwrap();

        assert_repaired(store.state());
        assert!(store.state().is_premium);
        let reloaded = reload(store, day(16));
        assert_repaired(reloaded.state());
    }

    #[test]
    fn import_caps_weekly_goal() {
        let mut store = fresh(day(16));
        let imported = UserState {
            weekly_goal: 500,
            ..UserState::default()
        };
        store.import_state(imported, day(16)).unwrap();
        assert_eq!(store.state().weekly_goal, HookyConfig::default().max_weekly_goal);
    }

    #[test]
    fn open_repairs_stored_blob() {
        let store = with_state(broken_state(), day(16));
        assert_repaired(store.state());
        assert!(!store.state().is_premium);

        let stored: UserState = persistence::load(store.storage(), KEY).unwrap();
        assert_repaired(&stored);
    }

    #[test]
    fn normalize_leaves_valid_state_alone() {
        let mut state = UserState::default();
        state.badges.push(FIRST_QUIZ.to_string());
        state.newly_earned_badge = Some(FIRST_QUIZ.to_string());
        state.current_streak = 3;
        state.longest_streak = 5;
        let before = state.clone();
        assert!(!normalize(&mut state, &HookyConfig::default()));
        assert_eq!(state, before);
    }

    #[test]
    fn configured_allowance_applies_to_fresh_state() {
        let config = HookyConfig {
            free_scripts: 1,
            default_weekly_goal: 7,
            ..HookyConfig::default()
        };
        let mut store = ProgressStore::open(MemoryStorage::default(), config, day(16));
        assert_eq!(store.state().weekly_goal, 7);
        assert!(store.use_script().unwrap());
        assert!(!store.use_script().unwrap());
    }
}
