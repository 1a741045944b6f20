//! Runtime configuration.
//!
//! The host may call `configure(json)` once at startup with any subset of
//! these fields; everything missing falls back to the defaults below, so an
//! empty object `{}` is a valid configuration.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;

/// localStorage keys, one JSON blob per key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct StorageKeys {
    pub user_state: String,
    pub screenshots: String,
    pub daily_challenge: String,
    pub referral_code: String,
    pub knowledge_base: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            user_state: "hooky_user_state".to_string(),
            screenshots: "hooky_progress_screenshots".to_string(),
            daily_challenge: "hooky_daily_challenge".to_string(),
            referral_code: "hooky_referral_code".to_string(),
            knowledge_base: "hooky_knowledge_base".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct HookyConfig {
    pub storage_keys: StorageKeys,
    pub free_scripts: u32,
    pub default_weekly_goal: u32,
    pub max_weekly_goal: u32,
    /// Trailing window, in minutes, for the lightning badge.
    pub lightning_window_minutes: i64,
    pub lightning_script_count: usize,
    /// Scripts saved before this hour (local time) earn the night-owl badge.
    pub night_owl_end_hour: u32,
    pub max_audio_bytes: u64,
    pub max_references: usize,
    pub max_screenshot_bytes: usize,
    pub checkout_plan: String,
    pub referral_base_url: String,
    pub generation_model: String,
    pub transcription_model: String,
    /// Reference transcripts are cut to this many characters in the prompt.
    pub reference_excerpt_chars: usize,
}

impl Default for HookyConfig {
    fn default() -> Self {
        Self {
            storage_keys: StorageKeys::default(),
            free_scripts: 3,
            default_weekly_goal: 3,
            max_weekly_goal: 50,
            lightning_window_minutes: 60,
            lightning_script_count: 3,
            night_owl_end_hour: 5,
            max_audio_bytes: 25 * 1024 * 1024,
            max_references: 3,
            max_screenshot_bytes: 5 * 1024 * 1024,
            checkout_plan: "hooky_premium_monthly".to_string(),
            referral_base_url: "https://hooky.app/r/".to_string(),
            generation_model: "gpt-4o-mini".to_string(),
            transcription_model: "whisper-1".to_string(),
            reference_excerpt_chars: 1500,
        }
    }
}

impl HookyConfig {
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        let trimmed = json.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(trimmed)?)
    }
}

thread_local! {
    static CONFIG: RefCell<HookyConfig> = RefCell::new(HookyConfig::default());
}

/// Snapshot of the active configuration.
pub fn current() -> HookyConfig {
    CONFIG.with(|c| c.borrow().clone())
}

pub fn replace(config: HookyConfig) {
    CONFIG.with(|c| *c.borrow_mut() = config);
}
