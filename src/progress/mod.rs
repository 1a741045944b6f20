//! User progress and gamification.
//!
//! The store itself is an ordinary value (`ProgressStore<S>`), usable and
//! testable without any globals. The WASM bridge hosts exactly one store per
//! worker in a `thread_local!`, opened lazily on first use against the
//! platform storage and the active configuration.

pub mod badges;
pub mod calendar;
pub mod challenges;
pub mod ocr;
pub mod persistence;
pub mod referral;
pub mod screenshots;
pub mod state;
pub mod store;

use chrono::NaiveDate;
use std::cell::RefCell;

use crate::config;
use persistence::PlatformStorage;
use store::ProgressStore;

pub type HostedStore = ProgressStore<PlatformStorage>;

thread_local! {
    static STORE: RefCell<Option<HostedStore>> = const { RefCell::new(None) };
}

/// Execute a closure with the hosted store, opening it for `today` if this
/// is the first request since startup (or since the last `close_store`).
pub fn with_store_mut<F, R>(today: NaiveDate, f: F) -> R
where
    F: FnOnce(&mut HostedStore) -> R,
{
    STORE.with(|cell| {
        let mut slot = cell.borrow_mut();
        let store = slot.get_or_insert_with(|| {
            log::debug!(target: "hooky::store", "opening progress store");
            ProgressStore::open(PlatformStorage::default(), config::current(), today)
        });
        f(store)
    })
}

/// Drop the hosted store; the next request reopens it from storage. Used
/// after a configuration change.
pub fn close_store() {
    STORE.with(|cell| {
        cell.borrow_mut().take();
    });
}

/// Replace the hosted store outright (tests seed it this way).
pub fn replace_store(store: HostedStore) {
    STORE.with(|cell| {
        *cell.borrow_mut() = Some(store);
    });
}
