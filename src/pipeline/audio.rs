//! Upload validation for the recording step.
//!
//! The host describes the blob it is about to send for transcription; the
//! checks here run before any network call so a bad upload fails fast
//! without spending a free script.

use serde::{Deserialize, Serialize};

use crate::config::HookyConfig;
use crate::error::{HookyError, Result};
use crate::pipeline::youtube::{self, VideoRef};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AudioUpload {
    /// MIME type as reported by the recorder or file picker, parameters
    /// included (`audio/webm;codecs=opus`).
    pub mime_type: String,
    pub size: u64,
    pub file_name: Option<String>,
    /// YouTube reference URLs.
    pub references: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedUpload {
    /// Essence MIME type, parameters stripped and lowercased.
    pub mime_type: String,
    pub size: u64,
    pub references: Vec<VideoRef>,
}

pub fn validate_upload(upload: &AudioUpload, config: &HookyConfig) -> Result<ValidatedUpload> {
    if upload.size == 0 {
        return Err(HookyError::invalid("the recording is empty"));
    }
    if upload.size > config.max_audio_bytes {
        return Err(HookyError::invalid(format!(
            "the recording is larger than {} MB",
            config.max_audio_bytes / (1024 * 1024)
        )));
    }

    let mime = upload
        .mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if !mime.starts_with("audio/") || mime.len() == "audio/".len() {
        return Err(HookyError::invalid(format!(
            "unsupported file type: {}",
            if upload.mime_type.is_empty() { "unknown" } else { upload.mime_type.as_str() }
        )));
    }

    if upload.references.len() > config.max_references {
        return Err(HookyError::invalid(format!(
            "at most {} reference videos are allowed",
            config.max_references
        )));
    }
    let references = upload
        .references
        .iter()
        .map(|url| youtube::parse_video_url(url))
        .collect::<Result<Vec<_>>>()?;

    Ok(ValidatedUpload {
        mime_type: mime,
        size: upload.size,
        references,
    })
}
