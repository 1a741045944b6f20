//! Request shaping for the transcription and generation calls.
//!
//! The host owns the HTTP clients and the API key; it asks this module for
//! the request body, sends it, and posts the completion back to
//! `/api/script/parse`.

use serde::{Deserialize, Serialize};

use crate::config::HookyConfig;
use crate::error::{HookyError, Result};
use crate::pipeline::script::HOOK_COUNT;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: String,
}

/// Body for `POST /v1/chat/completions`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub response_format: ResponseFormat,
}

/// Multipart fields for `POST /v1/audio/transcriptions`; the host appends
/// the audio blob under `file_field`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionRequest {
    pub model: String,
    pub file_field: String,
    pub response_format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReferenceTranscript {
    pub title: Option<String>,
    pub transcript: String,
}

/// Body of `POST /api/script/prompt`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerationInput {
    pub transcription: String,
    pub niche: Option<String>,
    pub platform: Option<String>,
    pub tone: Option<String>,
    pub references: Vec<ReferenceTranscript>,
    /// Knowledge-base snippets chosen by a prior search.
    pub knowledge: Vec<String>,
}

const SYSTEM_PROMPT: &str = "You are a short-form video scriptwriter. \
Turn the creator's spoken idea into a script for vertical video. \
Answer with a single JSON object and nothing else, shaped as: \
{\"hooks\": [{\"category\": string, \"text\": string, \"emoji\": string}], \
\"sections\": {\"conflict\": string, \"climax\": string, \"solution\": string, \"cta\": string}, \
\"metadata\": {\"duration\": string, \"tone\": string, \"platform\": string}}.";

pub fn build_transcription_request(
    config: &HookyConfig,
    language: Option<&str>,
) -> TranscriptionRequest {
    TranscriptionRequest {
        model: config.transcription_model.clone(),
        file_field: "file".to_string(),
        response_format: "text".to_string(),
        language: language
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string),
    }
}

pub fn build_generation_request(input: &GenerationInput, config: &HookyConfig) -> Result<ChatRequest> {
    let transcription = input.transcription.trim();
    if transcription.is_empty() {
        return Err(HookyError::invalid("the transcription is empty"));
    }
    if input.references.len() > config.max_references {
        return Err(HookyError::invalid(format!(
            "at most {} reference videos are allowed",
            config.max_references
        )));
    }

    let system = format!(
        "{} Write exactly {} hooks, each in a different style.",
        SYSTEM_PROMPT, HOOK_COUNT
    );

    let mut user = String::with_capacity(transcription.len() + 512);
    user.push_str("Idea (transcribed):\n");
    user.push_str(transcription);
    user.push('\n');
    for (label, value) in [
        ("Niche", &input.niche),
        ("Platform", &input.platform),
        ("Tone", &input.tone),
    ] {
        if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            user.push_str(&format!("{}: {}\n", label, value));
        }
    }

    let references: Vec<&ReferenceTranscript> = input
        .references
        .iter()
        .filter(|r| !r.transcript.trim().is_empty())
        .collect();
    if !references.is_empty() {
        user.push_str("\nReference videos to draw style from:\n");
        for (i, reference) in references.iter().enumerate() {
            let title = reference.title.as_deref().unwrap_or("untitled");
            user.push_str(&format!(
                "[{}] {}: {}\n",
                i + 1,
                title,
                excerpt(reference.transcript.trim(), config.reference_excerpt_chars)
            ));
        }
    }

    if !input.knowledge.is_empty() {
        user.push_str("\nCreator notes:\n");
        for note in &input.knowledge {
            user.push_str("- ");
            user.push_str(note.trim());
            user.push('\n');
        }
    }

    Ok(ChatRequest {
        model: config.generation_model.clone(),
        messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
        temperature: 0.8,
        response_format: ResponseFormat {
            kind: "json_object".to_string(),
        },
    })
}

/// First `max_chars` characters, marked when cut.
fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}

#[derive(Deserialize)]
struct Completion {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

/// Message text of a chat completion response. Anything that is not a
/// completion envelope is returned unchanged, so hosts may post either the
/// full response or just the content.
pub fn completion_content(raw: &str) -> String {
    match serde_json::from_str::<Completion>(raw) {
        Ok(completion) => completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default(),
        Err(_) => raw.to_string(),
    }
}
