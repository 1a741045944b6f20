//! Metric extraction from OCR'd profile screenshots.
//!
//! The host runs the OCR engine and posts the recognised text; this module
//! pulls follower/view/like/comment counts out of it with regex heuristics.
//! Labels are matched in English and Portuguese, and counts may use `K`/`M`
//! or `mil`/`mi` suffixes with either `.` or `,` as separators. Failing to
//! find anything is not an error: the result carries a warning and the
//! fields stay `None`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::error::{HookyError, Result};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct SocialMetrics {
    pub followers: Option<u64>,
    pub views: Option<u64>,
    pub likes: Option<u64>,
    pub comments: Option<u64>,
}

impl SocialMetrics {
    pub fn is_empty(&self) -> bool {
        self.followers.is_none()
            && self.views.is_none()
            && self.likes.is_none()
            && self.comments.is_none()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Extraction {
    pub metrics: SocialMetrics,
    pub warning: Option<String>,
}

#[derive(Clone, Copy)]
enum Metric {
    Followers,
    Views,
    Likes,
    Comments,
}

impl Metric {
    const ALL: [Metric; 4] = [Self::Followers, Self::Views, Self::Likes, Self::Comments];

    fn labels(self) -> &'static str {
        match self {
            Self::Followers => r"followers|seguidores",
            Self::Views => r"views|plays|visualizações|visualizacoes|reproduções|reproducoes",
            Self::Likes => r"likes|curtidas",
            Self::Comments => r"comments|comentários|comentarios",
        }
    }

    fn slot(self, metrics: &mut SocialMetrics) -> &mut Option<u64> {
        match self {
            Self::Followers => &mut metrics.followers,
            Self::Views => &mut metrics.views,
            Self::Likes => &mut metrics.likes,
            Self::Comments => &mut metrics.comments,
        }
    }
}

const NUMBER: &str = r"(\d[\d.,]*\d|\d)";
const SUFFIX: &str = r"(?:(mil|mi|k|m)\b)?";

/// Per-metric patterns, tried in order:
/// `Label: 12K`, then `12K label`, then `Label 12K`.
struct MetricPatterns {
    metric: Metric,
    patterns: [Regex; 3],
}

fn build_patterns() -> std::result::Result<Vec<MetricPatterns>, regex::Error> {
    Metric::ALL
        .iter()
        .map(|&metric| {
            let labels = metric.labels();
            Ok(MetricPatterns {
                metric,
                patterns: [
                    Regex::new(&format!(r"(?i)\b(?:{labels})\s*:\s*{NUMBER}\s*{SUFFIX}"))?,
                    Regex::new(&format!(r"(?i){NUMBER}\s*{SUFFIX}\s*\b(?:{labels})\b"))?,
                    Regex::new(&format!(r"(?i)\b(?:{labels})\s+{NUMBER}\s*{SUFFIX}"))?,
                ],
            })
        })
        .collect()
}

static PATTERNS: LazyLock<std::result::Result<Vec<MetricPatterns>, regex::Error>> =
    LazyLock::new(build_patterns);

/// Extract whatever counts the text contains.
pub fn extract_metrics(text: &str) -> Result<Extraction> {
    let patterns = PATTERNS
        .as_ref()
        .map_err(|e| HookyError::pipeline(format!("metric patterns failed to compile: {}", e)))?;

    let mut metrics = SocialMetrics::default();
    if text.trim().is_empty() {
        return Ok(Extraction {
            metrics,
            warning: Some("no text was recognised in the image".to_string()),
        });
    }

    for entry in patterns {
        let value = entry.patterns.iter().find_map(|re| {
            let caps = re.captures(text)?;
            parse_count(caps.get(1)?.as_str(), caps.get(2).map(|m| m.as_str()))
        });
        *entry.metric.slot(&mut metrics) = value;
    }

    let warning = if metrics.is_empty() {
        log::warn!(target: "hooky::ocr", "no metrics recognised in {} chars of text", text.len());
        Some("could not find follower, view, like or comment counts".to_string())
    } else {
        None
    };
    Ok(Extraction { metrics, warning })
}

/// Parse `digits` with an optional magnitude suffix.
///
/// With a suffix the last separator is the decimal mark (`1,2 mil`,
/// `3.4K`). Without one, separators followed by groups of exactly three
/// digits are thousands separators (`12.500`, `1,234,567`).
pub fn parse_count(digits: &str, suffix: Option<&str>) -> Option<u64> {
    let multiplier = match suffix.map(str::to_ascii_lowercase).as_deref() {
        Some("k" | "mil") => 1_000.0,
        Some("m" | "mi") => 1_000_000.0,
        _ => 1.0,
    };
    let value = if multiplier > 1.0 {
        parse_decimal(digits)?
    } else {
        parse_grouped(digits)?
    };
    Some((value * multiplier).round() as u64)
}

fn parse_decimal(digits: &str) -> Option<f64> {
    match digits.rfind(['.', ',']) {
        Some(i) => {
            let whole: String = digits[..i].chars().filter(char::is_ascii_digit).collect();
            let whole = if whole.is_empty() { "0".to_string() } else { whole };
            format!("{}.{}", whole, &digits[i + 1..]).parse().ok()
        }
        None => digits.parse().ok(),
    }
}

fn parse_grouped(digits: &str) -> Option<f64> {
    let groups: Vec<&str> = digits.split(['.', ',']).collect();
    if groups.len() > 1 && groups[1..].iter().all(|g| g.len() == 3) {
        groups.concat().parse().ok()
    } else {
        parse_decimal(digits)
    }
}
