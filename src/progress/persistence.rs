//! Local persistence adapter: one JSON blob per storage key.
//!
//! ## Contract
//!
//! - **load:** missing key → `None`; a blob that fails to parse is logged and
//!   treated as missing, so callers fall back to defaults instead of failing.
//! - **save:** the whole value is serialized on every call. No partial
//!   writes, no versioning.
//! - **clear:** removes the key.
//!
//! In the browser the backing store is `window.localStorage`; native builds
//! (tests, tooling) use [`MemoryStorage`].

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

use crate::error::Result;
#[cfg(test)]
use crate::error::HookyError;

/// Minimal string key-value store, shaped like the Web Storage API.
pub trait Storage {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&mut self, key: &str) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn contains(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        self.items.remove(key);
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
mod browser {
    use wasm_bindgen::prelude::*;

    use super::Storage;
    use crate::error::{HookyError, Result};

    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(catch, js_namespace = localStorage, js_name = getItem)]
        fn local_get(key: &str) -> std::result::Result<Option<String>, JsValue>;
        #[wasm_bindgen(catch, js_namespace = localStorage, js_name = setItem)]
        fn local_set(key: &str, value: &str) -> std::result::Result<(), JsValue>;
        #[wasm_bindgen(catch, js_namespace = localStorage, js_name = removeItem)]
        fn local_remove(key: &str) -> std::result::Result<(), JsValue>;
    }

    fn js_error(context: &str, err: JsValue) -> HookyError {
        HookyError::Storage(format!("{}: {:?}", context, err))
    }

    /// `window.localStorage`. Quota and availability errors surface as
    /// `HookyError::Storage`.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct BrowserStorage;

    impl Storage for BrowserStorage {
        fn get_item(&self, key: &str) -> Result<Option<String>> {
            local_get(key).map_err(|e| js_error("localStorage.getItem", e))
        }

        fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
            local_set(key, value).map_err(|e| js_error("localStorage.setItem", e))
        }

        fn remove_item(&mut self, key: &str) -> Result<()> {
            local_remove(key).map_err(|e| js_error("localStorage.removeItem", e))
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserStorage;

/// Storage used by the worker-hosted store on this target.
#[cfg(target_arch = "wasm32")]
pub type PlatformStorage = BrowserStorage;
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformStorage = MemoryStorage;

/// Read and parse the blob under `key`.
pub fn load<T, S>(storage: &S, key: &str) -> Option<T>
where
    T: DeserializeOwned,
    S: Storage + ?Sized,
{
    let raw = match storage.get_item(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            log::warn!(target: "hooky::persistence", "could not read {}: {}", key, e);
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!(
                target: "hooky::persistence",
                "discarding malformed blob under {}: {}",
                key,
                e
            );
            None
        }
    }
}

pub fn save<T, S>(storage: &mut S, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    S: Storage + ?Sized,
{
    let json = serde_json::to_string(value)?;
    storage.set_item(key, &json)
}

pub fn clear<S: Storage + ?Sized>(storage: &mut S, key: &str) -> Result<()> {
    storage.remove_item(key)
}

/// Storage that fails every call, for exercising error paths.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct FailingStorage;

#[cfg(test)]
impl Storage for FailingStorage {
    fn get_item(&self, _key: &str) -> Result<Option<String>> {
        Err(HookyError::Storage("unavailable".to_string()))
    }

    fn set_item(&mut self, _key: &str, _value: &str) -> Result<()> {
        Err(HookyError::Storage("quota exceeded".to_string()))
    }

    fn remove_item(&mut self, _key: &str) -> Result<()> {
        Err(HookyError::Storage("unavailable".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::state::UserState;

    #[test]
    fn missing_key_loads_nothing() {
        let storage = MemoryStorage::default();
        assert!(load::<UserState, _>(&storage, "hooky_user_state").is_none());
    }

    #[test]
    fn save_then_load_roundtrip() {
        let mut storage = MemoryStorage::default();
        let mut state = UserState::default();
        state.total_scripts_created = 4;
        state.badges.push("first_script".to_string());

        save(&mut storage, "k", &state).expect("save should succeed");
        let loaded: UserState = load(&storage, "k").expect("saved blob should load");
        assert_eq!(loaded, state);
    }

    #[test]
    fn malformed_blob_is_discarded() {
        let mut storage = MemoryStorage::default();
        storage.set_item("k", "{not json").unwrap();
        assert!(load::<UserState, _>(&storage, "k").is_none());
    }

    #[test]
    fn wrong_shape_is_discarded() {
        let mut storage = MemoryStorage::default();
        storage.set_item("k", r#"{"totalScriptsCreated": "many"}"#).unwrap();
        assert!(load::<UserState, _>(&storage, "k").is_none());
    }

    #[test]
    fn clear_removes_key() {
        let mut storage = MemoryStorage::default();
        save(&mut storage, "k", &UserState::default()).unwrap();
        assert!(storage.contains("k"));
        clear(&mut storage, "k").unwrap();
        assert!(!storage.contains("k"));
    }

    #[test]
    fn read_failure_loads_nothing() {
        let storage = FailingStorage;
        assert!(load::<UserState, _>(&storage, "k").is_none());
    }

    #[test]
    fn write_failure_is_reported() {
        let mut storage = FailingStorage;
        let err = save(&mut storage, "k", &UserState::default()).unwrap_err();
        assert!(matches!(err, HookyError::Storage(_)));
    }
}
