//! Forward-only migration of stored data into the current layout
//!
//! Three layouts have been written over time:
//!
//! 1. Legacy groups: `dashTabData: { sites, groups: { key: { name, sites } },
//!    visitStats }` next to `dashTabSettings`. Sites point at a group key
//!    through a `group` field. Some builds wrote `groups` at the top level.
//! 2. Flat categories: `categories: ["Work", ...]` with the display order
//!    kept inside `settings.categoryOrder`.
//! 3. Current: `categories: [{ name, removable }]`, `categoryOrder`,
//!    `siteData: { sites, visitStats }`, `currentCategory`, `settings`.
//!
//! Detection runs newest first, so feeding the output back in is a no-op.
use std::collections::{HashMap, HashSet};

use serde_json::{Value, json};

use crate::site_data::{ALL_CATEGORIES, DEFAULT_CATEGORY};
use crate::storage::{StorageBlob, StorageKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVersion {
    /// Nothing stored yet
    Empty,
    LegacyGroups,
    FlatCategories,
    Current,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Migrated {
    pub from: SchemaVersion,
    /// Every current key, filled with defaults where nothing was stored
    pub blob: StorageBlob,
}

impl Migrated {
    /// Whether the converted layout has to be written back
    pub fn needs_write(&self) -> bool {
        self.from != SchemaVersion::Current
    }
}

pub fn detect(raw: &StorageBlob) -> SchemaVersion {
    match raw.get(StorageKey::Categories.as_str()) {
        Some(Value::Array(items)) if items.iter().any(Value::is_string) => {
            SchemaVersion::FlatCategories
        }
        Some(Value::Array(_)) => SchemaVersion::Current,
        _ if legacy_container(raw).is_some() => SchemaVersion::LegacyGroups,
        _ => SchemaVersion::Empty,
    }
}

pub fn migrate(raw: &StorageBlob) -> Migrated {
    let from = detect(raw);
    let blob = match from {
        SchemaVersion::Current => from_current(raw),
        SchemaVersion::FlatCategories => from_flat_categories(raw),
        SchemaVersion::LegacyGroups => match legacy_container(raw) {
            Some(container) => from_legacy_groups(raw, container),
            None => from_empty(raw),
        },
        SchemaVersion::Empty => from_empty(raw),
    };
    Migrated { from, blob }
}

/// The object holding `groups`, if the data is in the oldest layout
fn legacy_container(raw: &StorageBlob) -> Option<&StorageBlob> {
    if let Some(Value::Object(data)) = raw.get("dashTabData") {
        if matches!(data.get("groups"), Some(Value::Object(_))) {
            return Some(data);
        }
    }
    if matches!(raw.get("groups"), Some(Value::Object(_))) {
        return Some(raw);
    }
    None
}

fn default_site_data() -> Value {
    json!({ "sites": [], "visitStats": {} })
}

fn default_categories() -> Value {
    json!([{ "name": DEFAULT_CATEGORY, "removable": false }])
}

fn default_order() -> Value {
    json!([DEFAULT_CATEGORY])
}

fn stored(raw: &StorageBlob, key: StorageKey) -> Option<Value> {
    raw.get(key.as_str()).cloned()
}

fn canonical(
    site_data: Value,
    categories: Value,
    order: Value,
    current: Value,
    settings: Value,
) -> StorageBlob {
    let mut blob = StorageBlob::new();
    blob.insert(StorageKey::SiteData.as_str().to_string(), site_data);
    blob.insert(StorageKey::Categories.as_str().to_string(), categories);
    blob.insert(StorageKey::CategoryOrder.as_str().to_string(), order);
    blob.insert(StorageKey::CurrentCategory.as_str().to_string(), current);
    blob.insert(StorageKey::Settings.as_str().to_string(), settings);
    blob
}

fn from_current(raw: &StorageBlob) -> StorageBlob {
    canonical(
        stored(raw, StorageKey::SiteData).unwrap_or_else(default_site_data),
        stored(raw, StorageKey::Categories).unwrap_or_else(|| json!([])),
        stored(raw, StorageKey::CategoryOrder).unwrap_or_else(|| json!([])),
        stored(raw, StorageKey::CurrentCategory).unwrap_or_else(|| json!(ALL_CATEGORIES)),
        stored(raw, StorageKey::Settings).unwrap_or_else(|| json!({})),
    )
}

fn from_empty(raw: &StorageBlob) -> StorageBlob {
    canonical(
        stored(raw, StorageKey::SiteData).unwrap_or_else(default_site_data),
        default_categories(),
        default_order(),
        json!(ALL_CATEGORIES),
        stored(raw, StorageKey::Settings).unwrap_or_else(|| json!({})),
    )
}

fn from_flat_categories(raw: &StorageBlob) -> StorageBlob {
    let categories: Vec<Value> = match raw.get(StorageKey::Categories.as_str()) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(name) => json!({ "name": name, "removable": true }),
                other => other.clone(),
            })
            .collect(),
        _ => Vec::new(),
    };

    let mut settings = match raw.get(StorageKey::Settings.as_str()) {
        Some(Value::Object(settings)) => settings.clone(),
        _ => StorageBlob::new(),
    };
    let order = settings
        .remove("categoryOrder")
        .filter(Value::is_array)
        .or_else(|| stored(raw, StorageKey::CategoryOrder))
        .unwrap_or_else(|| json!([]));

    let site_data = stored(raw, StorageKey::SiteData)
        .map(|data| rewrite_site_groups(&data, &HashMap::new()))
        .unwrap_or_else(default_site_data);

    canonical(
        site_data,
        Value::Array(categories),
        order,
        stored(raw, StorageKey::CurrentCategory).unwrap_or_else(|| json!(ALL_CATEGORIES)),
        Value::Object(settings),
    )
}

fn from_legacy_groups(raw: &StorageBlob, container: &StorageBlob) -> StorageBlob {
    let mut names_by_key = HashMap::new();
    let mut seen = HashSet::from([DEFAULT_CATEGORY.to_string()]);
    let mut categories = vec![json!({ "name": DEFAULT_CATEGORY, "removable": false })];
    let mut order = vec![json!(DEFAULT_CATEGORY)];

    if let Some(Value::Object(groups)) = container.get("groups") {
        for (key, group) in groups {
            // Embedded `sites` lists are dropped; membership lives on each site
            let name = group
                .get("name")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .unwrap_or(key.as_str())
                .to_string();

            names_by_key.insert(key.clone(), name.clone());
            if seen.insert(name.clone()) {
                categories.push(json!({ "name": name, "removable": true }));
                order.push(json!(name));
            }
        }
    }

    let legacy_site_data = json!({
        "sites": container.get("sites").cloned().unwrap_or_else(|| json!([])),
        "visitStats": container.get("visitStats").cloned().unwrap_or_else(|| json!({})),
    });
    let site_data = stored(raw, StorageKey::SiteData)
        .filter(|data| data.get("sites").is_some())
        .unwrap_or(legacy_site_data);

    let settings = raw
        .get("dashTabSettings")
        .cloned()
        .or_else(|| stored(raw, StorageKey::Settings))
        .filter(Value::is_object)
        .unwrap_or_else(|| json!({}));

    canonical(
        rewrite_site_groups(&site_data, &names_by_key),
        Value::Array(categories),
        Value::Array(order),
        stored(raw, StorageKey::CurrentCategory).unwrap_or_else(|| json!(ALL_CATEGORIES)),
        settings,
    )
}

/// Replace each site's old `group` key with a `category` name
fn rewrite_site_groups(site_data: &Value, names_by_key: &HashMap<String, String>) -> Value {
    let mut site_data = site_data.clone();
    if let Some(Value::Array(sites)) = site_data.get_mut("sites") {
        for site in sites.iter_mut() {
            let Value::Object(fields) = site else {
                continue;
            };
            let Some(group) = fields.remove("group") else {
                continue;
            };
            if fields.contains_key("category") {
                continue;
            }
            let key = group.as_str().unwrap_or(ALL_CATEGORIES);
            let name = names_by_key.get(key).map(String::as_str).unwrap_or(key);
            fields.insert("category".to_string(), json!(name));
        }
    }
    site_data
}
