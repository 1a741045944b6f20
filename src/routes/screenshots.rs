//! `/api/screenshots/*` routes: progress screenshots and OCR extraction.

use serde::Deserialize;

use crate::error::Result;
use crate::progress::ocr::{self, Extraction};
use crate::progress::screenshots::{self, NewScreenshot, Screenshot};
use crate::progress;
use crate::routes::util::{param, parse_json, request_now, respond};

/// GET /api/screenshots: newest first.
pub fn handle_list(query: &str) -> String {
    let list: Result<Vec<Screenshot>> = request_now(query, "").map(|now| {
        progress::with_store_mut(now.date(), |store| {
            let key = store.config().storage_keys.screenshots.clone();
            screenshots::list(store.storage(), &key)
        })
    });
    respond(list)
}

/// POST /api/screenshots: body: `{"kind": "profile", "image": "data:image/png;base64,..."}`.
pub fn handle_add(query: &str, body: &str) -> String {
    let added = request_now(query, "").and_then(|now| {
        let new: NewScreenshot = parse_json(body)?;
        progress::with_store_mut(now.date(), |store| {
            let key = store.config().storage_keys.screenshots.clone();
            let max_bytes = store.config().max_screenshot_bytes;
            screenshots::add(store.storage_mut(), &key, new, now, max_bytes)
        })
    });
    respond(added)
}

/// DELETE /api/screenshots/{id}
pub fn handle_delete(id: &str, query: &str) -> String {
    let deleted = request_now(query, "").and_then(|now| {
        progress::with_store_mut(now.date(), |store| {
            let key = store.config().storage_keys.screenshots.clone();
            screenshots::delete(store.storage_mut(), &key, id)
        })
    });
    respond(deleted)
}

#[derive(Deserialize)]
struct ExtractBody {
    text: String,
}

/// POST /api/screenshots/extract: body: `{"text": "<OCR output>"}` or
/// form `text=`.
pub fn handle_extract(query: &str, body: &str) -> String {
    let text = if body.trim_start().starts_with('{') {
        parse_json::<ExtractBody>(body).map(|b| b.text)
    } else {
        Ok(param(query, body, "text").unwrap_or_default())
    };
    let extraction: Result<Extraction> = text.and_then(|text| ocr::extract_metrics(&text));
    respond(extraction)
}
