//! Hooky in-browser WASM server.
//!
//! Exports `handle_request(method, path, query, body)` for the Web Worker
//! bridge to call. Uses `matchit` for URL routing (the same router engine
//! that powers Axum). Every response is a JSON envelope:
//! `{"status":200,"data":...}` or `{"status":<code>,"error":"..."}`.
//!
//! User progress lives in a worker-hosted `ProgressStore` backed by
//! `localStorage`; the pipeline routes validate and shape the calls the
//! host makes to OpenAI and YouTube.

use std::str::FromStr;
use std::sync::Once;

use log::LevelFilter;
use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod flow;
pub mod knowledge;
pub mod logging;
pub mod pipeline;
pub mod progress;
pub mod routes;

use config::HookyConfig;
use routes::util::{respond, status_response};

static LOGGING: Once = Once::new();

fn ensure_logging() {
    LOGGING.call_once(|| logging::init(LevelFilter::Info));
}

/// Process an HTTP-like request and return a JSON envelope.
///
/// Called from JavaScript (Web Worker) via wasm-bindgen.
///
/// # Arguments
/// * `method`: HTTP method ("GET", "POST", "DELETE")
/// * `path`: URL path (e.g., "/api/progress/state")
/// * `query`: Query string (e.g., "?now=2026-10-16T09:30:00")
/// * `body`: Request body: JSON or form data. Empty string for GET requests.
#[wasm_bindgen]
pub fn handle_request(method: &str, path: &str, query: &str, body: &str) -> String {
    ensure_logging();

    // Build the router. matchit compiles route patterns into a radix tree.
    let mut router = matchit::Router::new();

    router.insert("/api/health", "health").ok();

    // Progress store
    router.insert("/api/progress/state", "progress_state").ok();
    router.insert("/api/progress/export", "progress_export").ok();
    router.insert("/api/progress/import", "progress_import").ok();
    router.insert("/api/progress/quiz", "progress_quiz").ok();
    router.insert("/api/progress/use-script", "progress_use_script").ok();
    router.insert("/api/progress/scripts", "progress_scripts").ok();
    router.insert("/api/progress/scripts/{id}", "progress_script").ok();
    router.insert("/api/progress/scripts/{id}/favorite", "progress_favorite").ok();
    router.insert("/api/progress/streak", "progress_streak").ok();
    router.insert("/api/progress/badges", "progress_badges").ok();
    router.insert("/api/progress/badges/clear", "progress_badges_clear").ok();
    router.insert("/api/progress/weekly-goal", "progress_weekly_goal").ok();
    router.insert("/api/progress/shares", "progress_shares").ok();
    router.insert("/api/progress/premium/upgrade", "progress_upgrade").ok();
    router.insert("/api/progress/premium/confirm", "progress_confirm").ok();
    router.insert("/api/progress/challenge/start", "progress_challenge_start").ok();
    router.insert("/api/progress/challenge/complete", "progress_challenge_complete").ok();
    router.insert("/api/progress/reset", "progress_reset").ok();

    router.insert("/api/badges", "badges").ok();
    router.insert("/api/challenge/daily", "challenge_daily").ok();

    // Screenshots & referral
    router.insert("/api/screenshots", "screenshots").ok();
    router.insert("/api/screenshots/extract", "screenshots_extract").ok();
    router.insert("/api/screenshots/{id}", "screenshot").ok();
    router.insert("/api/referral", "referral").ok();

    // Pipeline boundary
    router.insert("/api/audio/validate", "audio_validate").ok();
    router.insert("/api/audio/transcription-request", "audio_transcription").ok();
    router.insert("/api/youtube/info", "youtube_info").ok();
    router.insert("/api/script/prompt", "script_prompt").ok();
    router.insert("/api/script/parse", "script_parse").ok();

    // Knowledge base
    router.insert("/api/knowledge", "knowledge").ok();
    router.insert("/api/knowledge/search", "knowledge_search").ok();
    router.insert("/api/knowledge/{id}", "knowledge_entry").ok();

    // UI flow
    router.insert("/api/flow", "flow").ok();
    router.insert("/api/flow/event", "flow_event").ok();

    let matched = match router.at(path) {
        Ok(matched) => matched,
        Err(_) => return not_found(),
    };
    let id = matched.params.get("id").unwrap_or("");

    match (*matched.value, method) {
        ("health", "GET") => routes::health::handle(),

        ("progress_state", "GET") => routes::progress::handle_state(query),
        ("progress_export", "GET") => routes::progress::handle_export(query),
        ("progress_import", "POST") => routes::progress::handle_import(query, body),
        ("progress_quiz", "POST") => routes::progress::handle_quiz(query, body),
        ("progress_use_script", "POST") => routes::progress::handle_use_script(query, body),
        ("progress_scripts", "POST") => routes::progress::handle_save_script(query, body),
        ("progress_script", "DELETE") => routes::progress::handle_delete_script(id, query),
        ("progress_favorite", "POST") => routes::progress::handle_toggle_favorite(id, query, body),
        ("progress_streak", "POST") => routes::progress::handle_streak(query, body),
        ("progress_badges", "POST") => routes::progress::handle_add_badge(query, body),
        ("progress_badges_clear", "POST") => routes::progress::handle_clear_badge(query, body),
        ("progress_weekly_goal", "POST") => routes::progress::handle_weekly_goal(query, body),
        ("progress_shares", "POST") => routes::progress::handle_shares(query, body),
        ("progress_upgrade", "POST") => routes::progress::handle_upgrade(query, body),
        ("progress_confirm", "POST") => routes::progress::handle_confirm_premium(query, body),
        ("progress_challenge_start", "POST") => {
            routes::progress::handle_start_challenge(query, body)
        }
        ("progress_challenge_complete", "POST") => {
            routes::progress::handle_complete_challenge(query, body)
        }
        ("progress_reset", "POST") => routes::progress::handle_reset(query, body),

        ("badges", "GET") => routes::badges::handle_table(query),
        ("challenge_daily", "GET") => routes::badges::handle_daily_challenge(query),

        ("screenshots", "GET") => routes::screenshots::handle_list(query),
        ("screenshots", "POST") => routes::screenshots::handle_add(query, body),
        ("screenshots_extract", "POST") => routes::screenshots::handle_extract(query, body),
        ("screenshot", "DELETE") => routes::screenshots::handle_delete(id, query),
        ("referral", "GET") => routes::referral::handle(query),

        ("audio_validate", "POST") => routes::pipeline::handle_validate_audio(body),
        ("audio_transcription", "GET") => routes::pipeline::handle_transcription_request(query),
        ("youtube_info", "GET") => routes::pipeline::handle_youtube_info(query),
        ("script_prompt", "POST") => routes::pipeline::handle_prompt(query, body),
        ("script_parse", "POST") => routes::pipeline::handle_parse(body),

        ("knowledge", "GET") => routes::knowledge::handle_list(query),
        ("knowledge", "POST") => routes::knowledge::handle_add(query, body),
        ("knowledge_search", "POST") => routes::knowledge::handle_search(query, body),
        ("knowledge_entry", "DELETE") => routes::knowledge::handle_delete(id, query),

        ("flow", "GET") => routes::flow::handle_get(),
        ("flow_event", "POST") => routes::flow::handle_event(query, body),

        _ => method_not_allowed(),
    }
}

/// Replace the active configuration with `json` (camelCase `HookyConfig`;
/// missing fields keep their defaults). The progress store is reopened from
/// storage on the next request so the new keys and limits apply.
#[wasm_bindgen]
pub fn configure(json: &str) -> String {
    ensure_logging();
    let result = HookyConfig::from_json(json).map(|config| {
        config::replace(config.clone());
        progress::close_store();
        log::info!(target: "hooky::config", "configuration replaced");
        config
    });
    respond(result)
}

/// Adjust log verbosity ("error", "warn", "info", "debug", "trace", "off").
#[wasm_bindgen]
pub fn set_log_level(level: &str) -> String {
    ensure_logging();
    let result = LevelFilter::from_str(level.trim())
        .map_err(|_| error::HookyError::invalid(format!("unknown log level: {}", level)))
        .map(|filter| {
            logging::init(filter);
            filter.to_string()
        });
    respond(result)
}

fn not_found() -> String {
    status_response(404, "route not found")
}

fn method_not_allowed() -> String {
    status_response(405, "method not allowed")
}
