//! `/api/badges` and `/api/challenge/daily`.
//!
//! The badge table is rendered with earned flags. Secret badges stay masked
//! until earned.

use serde::Serialize;

use crate::error::Result;
use crate::progress::badges::{BADGES, BadgeCategory, BadgeDefinition};
use crate::progress::challenges::{self, Challenge};
use crate::progress::state::UserState;
use crate::progress;
use crate::routes::util::{request_now, respond};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BadgeView {
    id: &'static str,
    icon: &'static str,
    title: &'static str,
    description: &'static str,
    color: &'static str,
    category: BadgeCategory,
    earned: bool,
}

impl BadgeView {
    fn new(definition: &'static BadgeDefinition, state: &UserState) -> Self {
        let earned = state.has_badge(definition.id);
        let masked = definition.is_secret() && !earned;
        Self {
            id: definition.id,
            icon: if masked { "❓" } else { definition.icon },
            title: if masked { "???" } else { definition.title },
            description: if masked {
                "Keep creating to discover this one"
            } else {
                definition.description
            },
            color: definition.color,
            category: definition.category,
            earned,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BadgeBoard {
    earned_count: usize,
    total: usize,
    badges: Vec<BadgeView>,
}

// ── GET /api/badges ────────────────────────────────────────────────

pub fn handle_table(query: &str) -> String {
    let board: Result<BadgeBoard> = request_now(query, "").map(|now| {
        progress::with_store_mut(now.date(), |store| {
            let badges: Vec<BadgeView> = BADGES
                .iter()
                .map(|definition| BadgeView::new(definition, store.state()))
                .collect();
            BadgeBoard {
                earned_count: badges.iter().filter(|b| b.earned).count(),
                total: badges.len(),
                badges,
            }
        })
    });
    respond(board)
}

// ── GET /api/challenge/daily ───────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DailyChallenge {
    challenge: Challenge,
    /// Whether this is the challenge the user has started.
    active: bool,
}

pub fn handle_daily_challenge(query: &str) -> String {
    let daily: Result<DailyChallenge> = request_now(query, "").map(|now| {
        let today = now.date();
        progress::with_store_mut(today, |store| {
            let key = store.config().storage_keys.daily_challenge.clone();
            let challenge = challenges::daily_challenge(store.storage_mut(), &key, today);
            let active = store
                .state()
                .active_challenge
                .as_ref()
                .is_some_and(|c| c.id == challenge.id);
            DailyChallenge { challenge, active }
        })
    });
    respond(daily)
}
