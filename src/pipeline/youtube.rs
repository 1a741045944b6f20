//! YouTube reference URLs.
//!
//! References are optional inspiration videos attached to a recording. The
//! host fetches their oEmbed metadata and transcripts; this module only
//! recognises the URL forms and derives the canonical, oEmbed and thumbnail
//! URLs from the video id.

use serde::Serialize;

use crate::error::{HookyError, Result};

pub const VIDEO_ID_LEN: usize = 11;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VideoRef {
    pub video_id: String,
    pub is_short: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VideoInfo {
    pub video_id: String,
    pub is_short: bool,
    pub url: String,
    pub embed_url: String,
    pub oembed_url: String,
    pub thumbnail_url: String,
}

fn is_video_id(candidate: &str) -> bool {
    candidate.len() == VIDEO_ID_LEN
        && candidate
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Recognise watch, short-link, shorts, live and embed URLs.
pub fn parse_video_url(url: &str) -> Result<VideoRef> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(HookyError::invalid("a YouTube URL is required"));
    }
    let unrecognised = || HookyError::invalid(format!("not a YouTube video URL: {}", trimmed));

    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    let (host, rest) = without_scheme.split_once('/').ok_or_else(unrecognised)?;
    let host = host.to_ascii_lowercase();
    let host = host
        .strip_prefix("www.")
        .or_else(|| host.strip_prefix("m."))
        .unwrap_or(&host);

    let (path, query) = match rest.split_once('?') {
        Some((path, query)) => (path, query),
        None => (rest, ""),
    };
    let path = path.split('#').next().unwrap_or(path).trim_end_matches('/');

    let (id, is_short) = match host {
        "youtu.be" => (path, false),
        "youtube.com" => {
            if path == "watch" {
                let id = query
                    .split('&')
                    .filter_map(|pair| pair.split_once('='))
                    .find(|(key, _)| *key == "v")
                    .map(|(_, value)| value)
                    .ok_or_else(unrecognised)?;
                (id, false)
            } else if let Some(id) = path.strip_prefix("shorts/") {
                (id, true)
            } else if let Some(id) = path
                .strip_prefix("embed/")
                .or_else(|| path.strip_prefix("live/"))
            {
                (id, false)
            } else {
                return Err(unrecognised());
            }
        }
        _ => return Err(unrecognised()),
    };

    if !is_video_id(id) {
        return Err(unrecognised());
    }
    Ok(VideoRef {
        video_id: id.to_string(),
        is_short,
    })
}

/// Derived URLs for a recognised video.
pub fn video_info(url: &str) -> Result<VideoInfo> {
    let video = parse_video_url(url)?;
    let id = &video.video_id;
    let canonical = format!("https://www.youtube.com/watch?v={}", id);
    Ok(VideoInfo {
        oembed_url: format!(
            "https://www.youtube.com/oembed?url={}&format=json",
            encode_component(&canonical)
        ),
        embed_url: format!("https://www.youtube.com/embed/{}", id),
        thumbnail_url: format!("https://img.youtube.com/vi/{}/hqdefault.jpg", id),
        url: canonical,
        video_id: video.video_id,
        is_short: video.is_short,
    })
}

fn encode_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len() * 3);
    for b in input.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}
