//! Daily creative challenges.
//!
//! One challenge per local day, picked deterministically from a fixed list
//! and cached under its own storage key so the dashboard shows the same
//! prompt all day even if the list is reordered by a later build.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::progress::persistence::{self, Storage};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Day the challenge was issued for, if it came from the daily rotation.
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

struct ChallengeTemplate {
    id: &'static str,
    title: &'static str,
    description: &'static str,
}

const DAILY_CHALLENGES: &[ChallengeTemplate] = &[
    ChallengeTemplate {
        id: "myth_buster",
        title: "Myth Buster",
        description: "Record an idea that debunks a common myth in your niche.",
    },
    ChallengeTemplate {
        id: "behind_the_scenes",
        title: "Behind the Scenes",
        description: "Show a part of your process nobody usually sees.",
    },
    ChallengeTemplate {
        id: "three_mistakes",
        title: "Three Mistakes",
        description: "Share three mistakes beginners make and how to avoid them.",
    },
    ChallengeTemplate {
        id: "hot_take",
        title: "Hot Take",
        description: "Defend an unpopular opinion about your field in under a minute.",
    },
    ChallengeTemplate {
        id: "before_after",
        title: "Before & After",
        description: "Tell the story of a transformation, yours or a client's.",
    },
    ChallengeTemplate {
        id: "quick_tutorial",
        title: "60-Second Tutorial",
        description: "Teach one thing your audience can apply today.",
    },
    ChallengeTemplate {
        id: "story_time",
        title: "Story Time",
        description: "Turn a personal story into a lesson for your followers.",
    },
];

/// Challenge scheduled for `date`.
pub fn challenge_for(date: NaiveDate) -> Challenge {
    let index = date.num_days_from_ce().rem_euclid(DAILY_CHALLENGES.len() as i32) as usize;
    let template = &DAILY_CHALLENGES[index];
    Challenge {
        id: template.id.to_string(),
        title: template.title.to_string(),
        description: template.description.to_string(),
        date: Some(date),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
struct DailyChallengeCache {
    date: NaiveDate,
    challenge: Challenge,
}

/// Today's challenge, served from the cache when it was issued today.
pub fn daily_challenge<S: Storage + ?Sized>(storage: &mut S, key: &str, today: NaiveDate) -> Challenge {
    if let Some(cached) = persistence::load::<DailyChallengeCache, _>(storage, key) {
        if cached.date == today {
            return cached.challenge;
        }
    }

    let challenge = challenge_for(today);
    let cache = DailyChallengeCache {
        date: today,
        challenge: challenge.clone(),
    };
    if let Err(e) = persistence::save(storage, key, &cache) {
        log::warn!(target: "hooky::challenges", "could not cache daily challenge: {}", e);
    }
    challenge
}
