//! `/api/referral`: the user's referral code and share link.

use crate::progress;
use crate::progress::referral;
use crate::routes::util::{param, request_now, respond};

/// GET /api/referral?seed={token}
///
/// The seed is only needed the first time; afterwards the cached code is
/// returned regardless of the seed.
pub fn handle(query: &str) -> String {
    let seed = param(query, "", "seed");
    let result = request_now(query, "").and_then(|now| {
        progress::with_store_mut(now.date(), |store| {
            let key = store.config().storage_keys.referral_code.clone();
            let base_url = store.config().referral_base_url.clone();
            referral::referral(store.storage_mut(), &key, seed.as_deref(), &base_url)
        })
    });
    respond(result)
}
