//! Pipeline boundary routes: validation and request shaping around the
//! host's transcription, generation and YouTube calls.

use crate::config;
use crate::error::Result;
use crate::pipeline::audio::{self, AudioUpload};
use crate::pipeline::prompt::{self, GenerationInput};
use crate::pipeline::script;
use crate::pipeline::youtube;
use crate::progress;
use crate::routes::util::{param, parse_json, request_now, required_param, respond};

/// POST /api/audio/validate: body: JSON `AudioUpload`.
pub fn handle_validate_audio(body: &str) -> String {
    let result = parse_json::<AudioUpload>(body)
        .and_then(|upload| audio::validate_upload(&upload, &config::current()));
    respond(result)
}

/// GET /api/audio/transcription-request?language={code}
pub fn handle_transcription_request(query: &str) -> String {
    let language = param(query, "", "language");
    respond(Ok(prompt::build_transcription_request(
        &config::current(),
        language.as_deref(),
    )))
}

/// GET /api/youtube/info?url={url}
pub fn handle_youtube_info(query: &str) -> String {
    let result = required_param(query, "", "url").and_then(|url| youtube::video_info(&url));
    respond(result)
}

/// POST /api/script/prompt: body: JSON `GenerationInput`. Missing niche
/// and platform are filled from the quiz profile.
pub fn handle_prompt(query: &str, body: &str) -> String {
    let result = request_now(query, "").and_then(|now| {
        let mut input: GenerationInput = parse_json(body)?;
        progress::with_store_mut(now.date(), |store| {
            if let Some(profile) = &store.state().creator_profile {
                if input.niche.is_none() && !profile.niche.is_empty() {
                    input.niche = Some(profile.niche.clone());
                }
                if input.platform.is_none() {
                    input.platform = profile.platforms.first().cloned();
                }
            }
            prompt::build_generation_request(&input, store.config())
        })
    });
    respond(result)
}

/// POST /api/script/parse: body: the raw completion, either the full chat
/// completion response or just the message content.
pub fn handle_parse(body: &str) -> String {
    let content = prompt::completion_content(body);
    let result: Result<script::GeneratedScript> = script::parse_generated_script(&content);
    if let Err(e) = &result {
        log::warn!(target: "hooky::pipeline", "generation output rejected: {}", e);
    }
    respond(result)
}
