/// DashTab - new-tab page with categorized site shortcuts
/// Built with Rust + WASM

mod app;
mod bridge;
mod category_store;
mod domain;
mod error;
mod icon;
mod migration;
mod operations;
mod settings;
mod site_data;
mod site_registry;
mod storage;
mod view;
mod workspace;

pub use app::{DashTab, ReorderOutcome};
pub use bridge::DashTabHandle;
pub use error::{DashTabError, Field, Reason, StorageError, ValidationError};
pub use migration::{Migrated, SchemaVersion, migrate};
pub use settings::{OpenMode, SearchEngine, Settings, Theme};
pub use site_data::{
    ALL_CATEGORIES, Category, DEFAULT_CATEGORY, Site, SiteDraft, SitePatch, VisitStat,
};
pub use storage::{ChromeStorage, MemoryStorage, StorageBackend, StorageBlob, StorageKey};

use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Re-export helpers the add-site form previews with
#[wasm_bindgen(js_name = generateIcon)]
pub fn generate_icon(name: &str) -> String {
    icon::generate_icon(name)
}

#[wasm_bindgen(js_name = normalizeUrl)]
pub fn normalize_url(url: &str) -> String {
    domain::normalize_url(url)
}

#[wasm_bindgen(js_name = extractHostname)]
pub fn extract_hostname(url: &str) -> String {
    domain::extract_hostname(url).unwrap_or_default()
}
