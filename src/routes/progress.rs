//! `/api/progress/*` routes: the user progress store.
//!
//! Every mutation answers `{"result": <action result>, "progress": <snapshot>}`
//! so the UI can re-render from one response. A storage write failure is
//! logged and the response still reflects the in-memory state (with a
//! `null` result); validation errors leave the state untouched.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{HookyError, Result};
use crate::pipeline::script::GeneratedScript;
use crate::progress::challenges::Challenge;
use crate::progress::state::{CreatorProfile, UserState};
use crate::progress::{self, HostedStore};
use crate::routes::util::{parse_json, request_now, required_param, respond};

/// Storage write failures are logged; the in-memory state already holds the
/// change.
fn soften<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(HookyError::Storage(message)) => {
            log::warn!(target: "hooky::routes", "progress not persisted: {}", message);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Run a store action for this request and answer with its result and the
/// refreshed snapshot.
fn act<T, F>(query: &str, body: &str, action: F) -> String
where
    T: Serialize,
    F: FnOnce(&mut HostedStore, NaiveDateTime) -> Result<T>,
{
    let response = request_now(query, body).and_then(|now| {
        progress::with_store_mut(now.date(), |store| {
            soften(store.refresh(now.date()))?;
            let result = soften(action(store, now))?;
            Ok(json!({ "result": result, "progress": store.snapshot() }))
        })
    });
    respond(response)
}

// ── Reads ──────────────────────────────────────────────────────────

/// GET /api/progress/state
pub fn handle_state(query: &str) -> String {
    let response: Result<Value> = request_now(query, "").and_then(|now| {
        progress::with_store_mut(now.date(), |store| {
            soften(store.refresh(now.date()))?;
            Ok(serde_json::to_value(store.snapshot())?)
        })
    });
    respond(response)
}

/// GET /api/progress/export: the raw persisted state, for backups.
pub fn handle_export(query: &str) -> String {
    let response: Result<UserState> = request_now(query, "")
        .map(|now| progress::with_store_mut(now.date(), |store| store.state().clone()));
    respond(response)
}

// ── Onboarding & scripts ───────────────────────────────────────────

/// POST /api/progress/quiz: body: JSON `CreatorProfile`.
pub fn handle_quiz(query: &str, body: &str) -> String {
    act(query, body, |store, _| {
        let profile: CreatorProfile = parse_json(body)?;
        store.complete_quiz(profile)
    })
}

/// POST /api/progress/use-script: `result` is whether generation may proceed.
pub fn handle_use_script(query: &str, body: &str) -> String {
    act(query, body, |store, _| store.use_script())
}

#[derive(Deserialize)]
struct SaveScriptBody {
    script: GeneratedScript,
    #[serde(default)]
    niche: Option<String>,
}

/// POST /api/progress/scripts: body: `{"script": {...}, "niche": "..."}`.
/// Falls back to the quiz niche when the body has none.
pub fn handle_save_script(query: &str, body: &str) -> String {
    act(query, body, |store, now| {
        let SaveScriptBody { script, niche } = parse_json(body)?;
        script
            .validate()
            .map_err(|e| HookyError::invalid(e.to_string()))?;
        let niche = niche.or_else(|| {
            store
                .state()
                .creator_profile
                .as_ref()
                .map(|p| p.niche.clone())
        });
        store.save_script(script, niche, now)
    })
}

/// DELETE /api/progress/scripts/{id}
pub fn handle_delete_script(id: &str, query: &str) -> String {
    act(query, "", |store, _| store.delete_script(id))
}

/// POST /api/progress/scripts/{id}/favorite: `result` is the new flag.
pub fn handle_toggle_favorite(id: &str, query: &str, body: &str) -> String {
    act(query, body, |store, _| store.toggle_favorite(id))
}

// ── Streaks, badges, goals ─────────────────────────────────────────

/// POST /api/progress/streak
pub fn handle_streak(query: &str, body: &str) -> String {
    act(query, body, |store, now| store.check_streak(now.date()))
}

/// POST /api/progress/badges: body: `badge={id}`. `result` is whether it
/// was new.
pub fn handle_add_badge(query: &str, body: &str) -> String {
    act(query, body, |store, _| {
        let badge = required_param(query, body, "badge")?;
        store.add_badge(&badge)
    })
}

/// POST /api/progress/badges/clear
pub fn handle_clear_badge(query: &str, body: &str) -> String {
    act(query, body, |store, _| store.clear_new_badge())
}

/// POST /api/progress/weekly-goal: body: `goal={n}`.
pub fn handle_weekly_goal(query: &str, body: &str) -> String {
    act(query, body, |store, _| {
        let raw = required_param(query, body, "goal")?;
        let goal = raw
            .trim()
            .parse::<u32>()
            .map_err(|_| HookyError::invalid(format!("invalid goal: {}", raw)))?;
        store.set_weekly_goal(goal)
    })
}

/// POST /api/progress/shares: `result` is the new count.
pub fn handle_shares(query: &str, body: &str) -> String {
    act(query, body, |store, _| store.increment_shares())
}

// ── Premium ────────────────────────────────────────────────────────

/// POST /api/progress/premium/upgrade: `result` is the checkout intent.
pub fn handle_upgrade(query: &str, body: &str) -> String {
    act(query, body, |store, _| Ok(store.upgrade_to_premium()))
}

/// POST /api/progress/premium/confirm: called once payment succeeded.
pub fn handle_confirm_premium(query: &str, body: &str) -> String {
    act(query, body, |store, _| store.confirm_premium())
}

// ── Challenges ─────────────────────────────────────────────────────

/// POST /api/progress/challenge/start: body: JSON `Challenge`.
pub fn handle_start_challenge(query: &str, body: &str) -> String {
    act(query, body, |store, _| {
        let challenge: Challenge = parse_json(body)?;
        store.start_challenge(challenge)
    })
}

/// POST /api/progress/challenge/complete: `result` is the finished challenge.
pub fn handle_complete_challenge(query: &str, body: &str) -> String {
    act(query, body, |store, _| store.complete_challenge())
}

// ── Reset / import ─────────────────────────────────────────────────

/// POST /api/progress/reset
pub fn handle_reset(query: &str, body: &str) -> String {
    act(query, body, |store, now| store.reset_user(now.date()))
}

/// POST /api/progress/import: body: a previously exported `UserState`.
pub fn handle_import(query: &str, body: &str) -> String {
    act(query, body, |store, now| {
        let state: UserState = parse_json(body)?;
        store.import_state(state, now.date())
    })
}
