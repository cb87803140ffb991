/// Persistence gateway over chrome.storage.local
use std::cell::{Cell, RefCell};

use serde::Serialize;
use serde_json::{Map, Value};
use wasm_bindgen::prelude::*;

use crate::error::StorageError;

/// A set of top-level storage entries
pub type StorageBlob = Map<String, Value>;

/// Keys of the current storage layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    SiteData,
    Categories,
    CategoryOrder,
    CurrentCategory,
    Settings,
}

impl StorageKey {
    pub const ALL: [StorageKey; 5] = [
        StorageKey::SiteData,
        StorageKey::Categories,
        StorageKey::CategoryOrder,
        StorageKey::CurrentCategory,
        StorageKey::Settings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::SiteData => "siteData",
            StorageKey::Categories => "categories",
            StorageKey::CategoryOrder => "categoryOrder",
            StorageKey::CurrentCategory => "currentCategory",
            StorageKey::Settings => "settings",
        }
    }
}

/// Keys written by the original extension, read once during migration
pub const LEGACY_KEYS: [&str; 3] = ["dashTabData", "dashTabSettings", "groups"];

/// Every key the loader asks for
pub fn load_keys() -> Vec<&'static str> {
    StorageKey::ALL
        .iter()
        .map(StorageKey::as_str)
        .chain(LEGACY_KEYS)
        .collect()
}

/// Asynchronous key-value store; each call is atomic
#[allow(async_fn_in_trait)]
pub trait StorageBackend {
    /// Entries for the requested keys; absent keys are left out
    async fn get(&self, keys: &[&str]) -> Result<StorageBlob, StorageError>;

    /// Write every entry of `blob`, leaving other keys alone
    async fn set(&self, blob: StorageBlob) -> Result<(), StorageError>;

    async fn clear(&self) -> Result<(), StorageError>;
}

// Import JS bridge functions
#[wasm_bindgen(module = "/js/storage.js")]
extern "C" {
    #[wasm_bindgen(catch, js_name = storageGet)]
    async fn storage_get(keys: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_name = storageSet)]
    async fn storage_set(items: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_name = storageClear)]
    async fn storage_clear() -> Result<(), JsValue>;
}

/// chrome.storage.local, reached through `js/storage.js`
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeStorage;

impl StorageBackend for ChromeStorage {
    async fn get(&self, keys: &[&str]) -> Result<StorageBlob, StorageError> {
        let keys_js = serde_wasm_bindgen::to_value(keys)
            .map_err(|e| StorageError::Encode(format!("{:?}", e)))?;

        let items = storage_get(keys_js)
            .await
            .map_err(|e| StorageError::Read(format!("{:?}", e)))?;

        if items.is_null() || items.is_undefined() {
            return Ok(StorageBlob::new());
        }
        serde_wasm_bindgen::from_value(items).map_err(|e| StorageError::Read(format!("{:?}", e)))
    }

    async fn set(&self, blob: StorageBlob) -> Result<(), StorageError> {
        // Plain objects, not JS Maps, so chrome.storage can store them
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        let items = blob
            .serialize(&serializer)
            .map_err(|e| StorageError::Encode(format!("{:?}", e)))?;

        storage_set(items)
            .await
            .map_err(|e| StorageError::Write(format!("{:?}", e)))
    }

    async fn clear(&self) -> Result<(), StorageError> {
        storage_clear()
            .await
            .map_err(|e| StorageError::Clear(format!("{:?}", e)))
    }
}

/// In-process store for running outside the extension and for tests
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<StorageBlob>,
    fail_writes: Cell<bool>,
    writes: Cell<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: StorageBlob) -> Self {
        MemoryStorage {
            items: RefCell::new(items),
            ..Self::default()
        }
    }

    /// Make every following `set` and `clear` fail until turned off
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Number of successful `set` calls so far
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    pub fn snapshot(&self) -> StorageBlob {
        self.items.borrow().clone()
    }

    pub fn item(&self, key: &str) -> Option<Value> {
        self.items.borrow().get(key).cloned()
    }
}

impl StorageBackend for MemoryStorage {
    async fn get(&self, keys: &[&str]) -> Result<StorageBlob, StorageError> {
        let items = self.items.borrow();
        Ok(keys
            .iter()
            .filter_map(|key| items.get(*key).map(|value| (key.to_string(), value.clone())))
            .collect())
    }

    async fn set(&self, blob: StorageBlob) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(StorageError::Write("write rejected".to_string()));
        }
        self.items.borrow_mut().extend(blob);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(StorageError::Clear("clear rejected".to_string()));
        }
        self.items.borrow_mut().clear();
        Ok(())
    }
}
