//! User progress data model.
//!
//! `UserState` is the one aggregate persisted under the user-state key. It
//! is (de)serialized with camelCase names and a struct-level
//! `#[serde(default)]`, so a blob written by an older build that lacks newer
//! fields still loads, with those fields at their defaults.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::HookyConfig;
use crate::pipeline::script::GeneratedScript;
use crate::progress::challenges::Challenge;

/// Answers collected by the onboarding quiz.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CreatorProfile {
    pub niche: String,
    pub platforms: Vec<String>,
    pub experience: String,
    pub goal: String,
    pub content_style: String,
    /// Quiz answers this build does not model explicitly.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedScript {
    pub id: String,
    pub script: GeneratedScript,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub niche: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct UserState {
    pub has_completed_quiz: bool,
    pub creator_profile: Option<CreatorProfile>,

    pub free_scripts_remaining: u32,
    pub total_scripts_created: u32,
    /// Newest first.
    pub scripts: Vec<SavedScript>,

    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_active_date: Option<NaiveDate>,

    /// Scripts created per local calendar day.
    pub activity_log: BTreeMap<NaiveDate, u32>,

    pub weekly_goal: u32,
    /// Cached sum of `activity_log` over the week starting `week_start_date`.
    pub scripts_this_week: u32,
    pub week_start_date: Option<NaiveDate>,
    pub weekly_goal_streak: u32,
    pub last_goal_week: Option<NaiveDate>,

    /// Earned badge ids in the order they were earned.
    pub badges: Vec<String>,
    pub newly_earned_badge: Option<String>,
    pub niche_counts: BTreeMap<String, u32>,

    pub is_premium: bool,
    pub shares_count: u32,

    pub active_challenge: Option<Challenge>,
    pub challenges_completed: u32,
}

impl Default for UserState {
    fn default() -> Self {
        Self::with_config(&HookyConfig::default())
    }
}

impl UserState {
    /// Fresh state using the configured allowance and weekly goal.
    pub fn with_config(config: &HookyConfig) -> Self {
        Self {
            has_completed_quiz: false,
            creator_profile: None,
            free_scripts_remaining: config.free_scripts,
            total_scripts_created: 0,
            scripts: Vec::new(),
            current_streak: 0,
            longest_streak: 0,
            last_active_date: None,
            activity_log: BTreeMap::new(),
            weekly_goal: config.default_weekly_goal.max(1),
            scripts_this_week: 0,
            week_start_date: None,
            weekly_goal_streak: 0,
            last_goal_week: None,
            badges: Vec::new(),
            newly_earned_badge: None,
            niche_counts: BTreeMap::new(),
            is_premium: false,
            shares_count: 0,
            active_challenge: None,
            challenges_completed: 0,
        }
    }

    pub fn has_badge(&self, id: &str) -> bool {
        self.badges.iter().any(|b| b == id)
    }

    pub fn find_script(&self, id: &str) -> Option<&SavedScript> {
        self.scripts.iter().find(|s| s.id == id)
    }
}
