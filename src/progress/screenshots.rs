//! Progress screenshots: profile/analytics captures the user keeps to track
//! growth over time.
//!
//! Images arrive as `data:` URLs (the host does the file picking and camera
//! capture). They are validated here before being stored as a list under
//! their own storage key, newest first.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{HookyError, Result};
use crate::progress::ocr::SocialMetrics;
use crate::progress::persistence::{self, Storage};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScreenshotKind {
    Profile,
    Analytics,
    Post,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Webp,
}

impl ImageFormat {
    fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }

    fn matches(self, bytes: &[u8]) -> bool {
        match self {
            Self::Png => bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]),
            Self::Jpeg => bytes.starts_with(&[0xFF, 0xD8, 0xFF]),
            Self::Webp => bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Screenshot {
    pub id: String,
    pub kind: ScreenshotKind,
    /// The validated `data:` URL.
    pub image: String,
    pub date: NaiveDateTime,
    #[serde(default)]
    pub metrics: Option<SocialMetrics>,
}

/// Body of `POST /api/screenshots`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewScreenshot {
    pub kind: ScreenshotKind,
    pub image: String,
    #[serde(default)]
    pub metrics: Option<SocialMetrics>,
}

/// Check a `data:image/...;base64,` URL: supported MIME type, decodable
/// payload, magic number matching the declared type, size within `max_bytes`.
pub fn validate_image(data_url: &str, max_bytes: usize) -> Result<ImageFormat> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| HookyError::invalid("image must be a data: URL"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| HookyError::invalid("image data URL has no payload"))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| HookyError::invalid("image data URL must be base64 encoded"))?;
    let format = ImageFormat::from_mime(&mime.to_ascii_lowercase())
        .ok_or_else(|| HookyError::invalid(format!("unsupported image type: {}", mime)))?;

    // Reject oversized payloads before decoding them.
    if payload.len() / 4 * 3 > max_bytes + 3 {
        return Err(too_large(max_bytes));
    }
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| HookyError::invalid(format!("image is not valid base64: {}", e)))?;
    if bytes.is_empty() {
        return Err(HookyError::invalid("image is empty"));
    }
    if bytes.len() > max_bytes {
        return Err(too_large(max_bytes));
    }
    if !format.matches(&bytes) {
        return Err(HookyError::invalid(format!(
            "image content does not look like {}",
            mime
        )));
    }
    Ok(format)
}

fn too_large(max_bytes: usize) -> HookyError {
    HookyError::invalid(format!("image exceeds {} KiB", max_bytes / 1024))
}

pub fn list<S: Storage + ?Sized>(storage: &S, key: &str) -> Vec<Screenshot> {
    persistence::load(storage, key).unwrap_or_default()
}

pub fn add<S: Storage + ?Sized>(
    storage: &mut S,
    key: &str,
    new: NewScreenshot,
    now: NaiveDateTime,
    max_bytes: usize,
) -> Result<Screenshot> {
    validate_image(&new.image, max_bytes)?;

    let mut screenshots = list(storage, key);
    let base = now.and_utc().timestamp_millis().to_string();
    let id = (0..)
        .map(|n| if n == 0 { base.clone() } else { format!("{}-{}", base, n) })
        .find(|candidate| screenshots.iter().all(|s| &s.id != candidate))
        .unwrap_or(base);

    let screenshot = Screenshot {
        id,
        kind: new.kind,
        image: new.image,
        date: now,
        metrics: new.metrics,
    };
    screenshots.insert(0, screenshot.clone());
    persistence::save(storage, key, &screenshots)?;
    log::info!(target: "hooky::screenshots", "stored screenshot {}", screenshot.id);
    Ok(screenshot)
}

pub fn delete<S: Storage + ?Sized>(storage: &mut S, key: &str, id: &str) -> Result<()> {
    let mut screenshots = list(storage, key);
    let before = screenshots.len();
    screenshots.retain(|s| s.id != id);
    if screenshots.len() == before {
        return Err(HookyError::not_found(format!("screenshot {}", id)));
    }
    persistence::save(storage, key, &screenshots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::persistence::MemoryStorage;
    use chrono::NaiveDate;

    const KEY: &str = "hooky_progress_screenshots";
    const MAX: usize = 1024;

    fn png_url() -> String {
        let bytes = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];
        format!("data:image/png;base64,{}", STANDARD.encode(bytes))
    }

    fn now(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(10, minute, 0)
            .unwrap()
    }

    fn new_profile() -> NewScreenshot {
        NewScreenshot {
            kind: ScreenshotKind::Profile,
            image: png_url(),
            metrics: None,
        }
    }

    #[test]
    fn accepts_each_supported_format() {
        assert_eq!(validate_image(&png_url(), MAX).unwrap(), ImageFormat::Png);

        let jpeg = format!("data:image/jpeg;base64,{}", STANDARD.encode([0xFF, 0xD8, 0xFF, 0xE0]));
        assert_eq!(validate_image(&jpeg, MAX).unwrap(), ImageFormat::Jpeg);

        let webp = format!(
            "data:image/webp;base64,{}",
            STANDARD.encode(b"RIFF\x24\x00\x00\x00WEBPVP8 ")
        );
        assert_eq!(validate_image(&webp, MAX).unwrap(), ImageFormat::Webp);
    }

    #[test]
    fn rejects_mismatched_magic() {
        let fake = format!("data:image/png;base64,{}", STANDARD.encode(b"GIF89a...."));
        let err = validate_image(&fake, MAX).unwrap_err();
        assert_eq!(err.status(), 400);
        assert!(err.to_string().contains("image/png"));
    }

    #[test]
    fn rejects_unsupported_or_malformed_urls() {
        assert!(validate_image("https://example.com/a.png", MAX).is_err());
        assert!(validate_image("data:image/gif;base64,R0lGODlh", MAX).is_err());
        assert!(validate_image("data:image/png,rawbytes", MAX).is_err());
        assert!(validate_image("data:image/png;base64,!!!", MAX).is_err());
        assert!(validate_image("data:image/png;base64,", MAX).is_err());
    }

    #[test]
    fn rejects_oversized_image() {
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.resize(MAX + 1, 0);
        let url = format!("data:image/png;base64,{}", STANDARD.encode(&bytes));
        assert!(validate_image(&url, MAX).unwrap_err().to_string().contains("exceeds"));
    }

    #[test]
    fn add_list_delete() {
        let mut storage = MemoryStorage::default();
        let first = add(&mut storage, KEY, new_profile(), now(0), MAX).unwrap();
        let second = add(&mut storage, KEY, new_profile(), now(1), MAX).unwrap();

        let all = list(&storage, KEY);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, second.id);

        delete(&mut storage, KEY, &first.id).unwrap();
        assert_eq!(list(&storage, KEY), vec![second]);
        assert_eq!(delete(&mut storage, KEY, &first.id).unwrap_err().status(), 404);
    }

    #[test]
    fn invalid_image_is_not_stored() {
        let mut storage = MemoryStorage::default();
        let bad = NewScreenshot {
            kind: ScreenshotKind::Analytics,
            image: "data:image/png;base64,AAAA".to_string(),
            metrics: None,
        };
        assert!(add(&mut storage, KEY, bad, now(0), MAX).is_err());
        assert!(!storage.contains(KEY));
    }

    #[test]
    fn same_millisecond_gets_distinct_ids() {
        let mut storage = MemoryStorage::default();
        let a = add(&mut storage, KEY, new_profile(), now(0), MAX).unwrap();
        let b = add(&mut storage, KEY, new_profile(), now(0), MAX).unwrap();
        assert_ne!(a.id, b.id);
    }
}
