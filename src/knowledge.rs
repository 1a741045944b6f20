//! Creator knowledge base.
//!
//! Notes the creator wants the generator to keep in mind (audience facts,
//! catch-phrases, recurring offers). Each entry carries an embedding computed
//! by the host; search ranks entries by cosine similarity to a query
//! embedding. All entries must share one embedding dimension.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{HookyError, Result};
use crate::progress::persistence::{self, Storage};

pub const DEFAULT_TOP_K: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeEntry {
    pub id: String,
    pub title: String,
    pub content: String,
    pub embedding: Vec<f32>,
    pub created_at: NaiveDateTime,
}

/// An entry without its embedding, for listings and search results.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeSummary {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: NaiveDateTime,
}

impl From<&KnowledgeEntry> for KnowledgeSummary {
    fn from(entry: &KnowledgeEntry) -> Self {
        Self {
            id: entry.id.clone(),
            title: entry.title.clone(),
            content: entry.content.clone(),
            created_at: entry.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEntry {
    pub title: String,
    pub content: String,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub embedding: Vec<f32>,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub min_score: f32,
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    #[serde(flatten)]
    pub entry: KnowledgeSummary,
    pub score: f32,
}

fn entries<S: Storage + ?Sized>(storage: &S, key: &str) -> Vec<KnowledgeEntry> {
    persistence::load(storage, key).unwrap_or_default()
}

fn check_embedding(embedding: &[f32], existing: &[KnowledgeEntry]) -> Result<()> {
    if embedding.is_empty() {
        return Err(HookyError::invalid("embedding is empty"));
    }
    if embedding.iter().any(|v| !v.is_finite()) {
        return Err(HookyError::invalid("embedding contains non-finite values"));
    }
    if let Some(first) = existing.first() {
        if first.embedding.len() != embedding.len() {
            return Err(HookyError::invalid(format!(
                "embedding has {} dimensions, knowledge base uses {}",
                embedding.len(),
                first.embedding.len()
            )));
        }
    }
    Ok(())
}

pub fn list<S: Storage + ?Sized>(storage: &S, key: &str) -> Vec<KnowledgeSummary> {
    entries(storage, key).iter().map(KnowledgeSummary::from).collect()
}

pub fn add<S: Storage + ?Sized>(
    storage: &mut S,
    key: &str,
    new: NewEntry,
    now: NaiveDateTime,
) -> Result<KnowledgeSummary> {
    let title = new.title.trim();
    let content = new.content.trim();
    if title.is_empty() || content.is_empty() {
        return Err(HookyError::invalid("title and content are required"));
    }
    let mut all = entries(storage, key);
    check_embedding(&new.embedding, &all)?;

    let base = format!("kb-{}", now.and_utc().timestamp_millis());
    let id = (0..)
        .map(|n| if n == 0 { base.clone() } else { format!("{}-{}", base, n) })
        .find(|candidate| all.iter().all(|e| &e.id != candidate))
        .unwrap_or(base);

    let entry = KnowledgeEntry {
        id,
        title: title.to_string(),
        content: content.to_string(),
        embedding: new.embedding,
        created_at: now,
    };
    let summary = KnowledgeSummary::from(&entry);
    all.push(entry);
    persistence::save(storage, key, &all)?;
    log::info!(target: "hooky::knowledge", "added entry {} ({} total)", summary.id, all.len());
    Ok(summary)
}

pub fn delete<S: Storage + ?Sized>(storage: &mut S, key: &str, id: &str) -> Result<()> {
    let mut all = entries(storage, key);
    let before = all.len();
    all.retain(|e| e.id != id);
    if all.len() == before {
        return Err(HookyError::not_found(format!("knowledge entry {}", id)));
    }
    persistence::save(storage, key, &all)
}

/// Cosine similarity; zero vectors score 0. Accumulates in `f64` so large
/// finite components cannot overflow the norms.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())) as f32
}

/// Best `top_k` entries scoring at least `min_score`, highest first.
pub fn search<S: Storage + ?Sized>(storage: &S, key: &str, query: &SearchQuery) -> Result<Vec<SearchHit>> {
    let all = entries(storage, key);
    check_embedding(&query.embedding, &all)?;

    let mut hits: Vec<SearchHit> = all
        .iter()
        .map(|entry| SearchHit {
            score: cosine_similarity(&query.embedding, &entry.embedding),
            entry: KnowledgeSummary::from(entry),
        })
        .filter(|hit| hit.score >= query.min_score)
        .collect();
    hits.sort_by(|a, b| b.score.total_cmp(&a.score));
    hits.truncate(query.top_k);
    Ok(hits)
}
