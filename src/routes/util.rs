//! Shared request parsing and response envelopes for route handlers.

use chrono::NaiveDateTime;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::{HookyError, Result};
use crate::progress::calendar;

/// Parse URL-encoded form body into key-value pairs.
/// Handles `key=value&key2=value2` format.
pub fn parse_form_body(body: &str) -> Vec<(String, String)> {
    if body.is_empty() {
        return Vec::new();
    }
    body.split('&')
        .filter_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            let key = parts.next()?;
            let val = parts.next().unwrap_or("");
            Some((percent_decode(key), percent_decode(val)))
        })
        .collect()
}

/// Percent-decode a URL-encoded value. Multi-byte UTF-8 sequences are
/// reassembled; invalid sequences are replaced.
pub fn percent_decode(input: &str) -> String {
    let mut bytes = Vec::with_capacity(input.len());
    let mut iter = input.bytes();
    while let Some(b) = iter.next() {
        match b {
            b'%' => {
                let hi = iter.next();
                let lo = iter.next();
                let decoded = match (hi, lo) {
                    (Some(hi), Some(lo)) => core::str::from_utf8(&[hi, lo])
                        .ok()
                        .and_then(|s| u8::from_str_radix(s, 16).ok()),
                    _ => None,
                };
                match decoded {
                    Some(val) => bytes.push(val),
                    None => {
                        bytes.push(b'%');
                        bytes.extend(hi);
                        bytes.extend(lo);
                    }
                }
            }
            b'+' => bytes.push(b' '),
            _ => bytes.push(b),
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Parse a query string into key-value pairs.
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    let q = query.strip_prefix('?').unwrap_or(query);
    parse_form_body(q)
}

/// Helper to get a value by key from a list of key-value pairs.
pub fn get_param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn looks_like_json(body: &str) -> bool {
    matches!(body.trim_start().as_bytes().first(), Some(b'{' | b'['))
}

/// A parameter from the query string, or from a form-encoded body.
pub fn param(query: &str, body: &str, key: &str) -> Option<String> {
    let from_query = parse_query(query);
    if let Some(value) = get_param(&from_query, key) {
        return Some(value.to_string());
    }
    if looks_like_json(body) {
        return None;
    }
    let from_body = parse_form_body(body);
    get_param(&from_body, key).map(str::to_string)
}

pub fn required_param(query: &str, body: &str, key: &str) -> Result<String> {
    param(query, body, key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| HookyError::invalid(format!("missing {} parameter", key)))
}

/// Device-local time for this request: the `now` parameter when present,
/// the system clock otherwise.
pub fn request_now(query: &str, body: &str) -> Result<NaiveDateTime> {
    calendar::resolve_now(param(query, body, "now").as_deref())
}

/// Deserialize a JSON request body. Malformed bodies are the caller's
/// mistake, so they map to `InvalidInput`.
pub fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T> {
    if body.trim().is_empty() {
        return Err(HookyError::invalid("request body is required"));
    }
    serde_json::from_str(body)
        .map_err(|e| HookyError::invalid(format!("invalid request body: {}", e)))
}

// ── Envelopes ──────────────────────────────────────────────────────

/// `{"status":200,"data":...}`
pub fn ok<T: Serialize>(data: &T) -> String {
    match serde_json::to_value(data) {
        Ok(value) => json!({ "status": 200, "data": value }).to_string(),
        Err(e) => error_response(&HookyError::from(e)),
    }
}

/// `{"status":<code>,"error":"..."}`
pub fn error_response(err: &HookyError) -> String {
    let status = err.status();
    if status >= 500 {
        log::error!(target: "hooky::routes", "{}", err);
    } else {
        log::debug!(target: "hooky::routes", "rejected: {}", err);
    }
    json!({ "status": status, "error": err.to_string() }).to_string()
}

pub fn status_response(status: u16, message: &str) -> String {
    json!({ "status": status, "error": message }).to_string()
}

pub fn respond<T: Serialize>(result: Result<T>) -> String {
    match result {
        Ok(data) => ok(&data),
        Err(e) => error_response(&e),
    }
}

#[cfg(test)]
pub(crate) fn envelope(response: &str) -> serde_json::Value {
    serde_json::from_str(response).expect("handlers always answer with JSON")
}
