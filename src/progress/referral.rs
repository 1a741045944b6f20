//! Referral codes.
//!
//! A code is derived once from a seed the host supplies (a user id or a
//! random token) and then cached, so it stays stable across sessions.

use serde::Serialize;

use crate::error::{HookyError, Result};
use crate::progress::persistence::{self, Storage};

pub const CODE_PREFIX: &str = "HOOKY-";
pub const CODE_LEN: usize = 6;

// No 0/O or 1/I, which are easy to misread when shared verbally.
const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Referral {
    pub code: String,
    pub link: String,
}

/// SHA-256 of the seed, one digest byte per code character. The alphabet
/// has 32 symbols, so every byte maps without bias.
pub fn code_from_seed(seed: &str) -> String {
    let digest = hmac_sha256::Hash::hash(seed.as_bytes());
    let mut code = String::with_capacity(CODE_PREFIX.len() + CODE_LEN);
    code.push_str(CODE_PREFIX);
    for byte in digest.iter().take(CODE_LEN) {
        code.push(ALPHABET[usize::from(*byte) % ALPHABET.len()] as char);
    }
    code
}

pub fn is_valid_code(code: &str) -> bool {
    code.strip_prefix(CODE_PREFIX).is_some_and(|rest| {
        rest.len() == CODE_LEN && rest.bytes().all(|b| ALPHABET.contains(&b))
    })
}

/// The cached referral, creating it from `seed` on first use.
pub fn referral<S: Storage + ?Sized>(
    storage: &mut S,
    key: &str,
    seed: Option<&str>,
    base_url: &str,
) -> Result<Referral> {
    let cached = persistence::load::<String, _>(storage, key).filter(|c| is_valid_code(c));
    let code = match cached {
        Some(code) => code,
        None => {
            let seed = seed
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| HookyError::invalid("seed is required to create a referral code"))?;
            let code = code_from_seed(seed);
            persistence::save(storage, key, &code)?;
            log::info!(target: "hooky::referral", "created referral code {}", code);
            code
        }
    };
    Ok(Referral {
        link: format!("{}{}", base_url, code),
        code,
    })
}
