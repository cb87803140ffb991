/// Data structures for DashTab
use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Reserved filter value meaning "no category restriction"
pub const ALL_CATEGORIES: &str = "all";

/// Name of the built-in category every fresh install starts with
pub const DEFAULT_CATEGORY: &str = "Default";

/// A named bucket that sites are grouped into
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    #[serde(default = "removable_by_default", deserialize_with = "removable_or_true")]
    pub removable: bool,
}

fn removable_by_default() -> bool {
    true
}

fn removable_or_true<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let removable: Option<bool> = or_default(deserializer)?;
    Ok(removable.unwrap_or(true))
}

impl Category {
    pub fn new(name: impl Into<String>) -> Category {
        Category {
            name: name.into(),
            removable: true,
        }
    }

    pub fn builtin(name: impl Into<String>) -> Category {
        Category {
            name: name.into(),
            removable: false,
        }
    }
}

/// A bookmarked site
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default, deserialize_with = "or_default")]
    pub color: String,
    #[serde(default = "all_categories", deserialize_with = "category_or_all")]
    pub category: String,
    #[serde(default, deserialize_with = "or_default")]
    pub icon: String,
    /// Only comparable between sites of the same category
    #[serde(default, deserialize_with = "or_default")]
    pub order: i64,
    #[serde(default, deserialize_with = "or_default")]
    pub created_at: f64,
}

fn all_categories() -> String {
    ALL_CATEGORIES.to_string()
}

fn category_or_all<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let category: Option<String> = or_default(deserializer)?;
    Ok(category.unwrap_or_else(all_categories))
}

/// Read a field written by any past version: `null` or a value of the
/// wrong type (a fractional `order`, say) becomes the default
fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Keep the entries that parse, logging and dropping the rest
pub fn readable_entries<T: DeserializeOwned>(entries: Vec<Value>, what: &str) -> Vec<T> {
    entries
        .into_iter()
        .filter_map(|entry| match T::deserialize(&entry) {
            Ok(item) => Some(item),
            Err(e) => {
                log::warn!("Skipping unreadable {} {}: {}", what, entry, e);
                None
            }
        })
        .collect()
}

/// How often and when a site was opened
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VisitStat {
    #[serde(default, deserialize_with = "or_default")]
    pub count: u32,
    #[serde(default, deserialize_with = "or_default")]
    pub last_visit: Option<f64>,
}

/// Persisted under the `siteData` key
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SiteData {
    #[serde(default, deserialize_with = "readable_sites")]
    pub sites: Vec<Site>,
    #[serde(default, deserialize_with = "readable_stats")]
    pub visit_stats: HashMap<String, VisitStat>,
}

fn readable_sites<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Site>, D::Error> {
    let entries: Vec<Value> = or_default(deserializer)?;
    Ok(readable_entries(entries, "site"))
}

fn readable_stats<'de, D>(deserializer: D) -> Result<HashMap<String, VisitStat>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries: HashMap<String, Value> = or_default(deserializer)?;
    Ok(entries
        .into_iter()
        .filter_map(|(id, entry)| match VisitStat::deserialize(&entry) {
            Ok(stat) => Some((id, stat)),
            Err(e) => {
                log::warn!("Skipping unreadable visit stat for {}: {}", id, e);
                None
            }
        })
        .collect())
}

/// User input from the add-site form
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SiteDraft {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub color: String,
    pub category: String,
}

/// Fields changed by the edit-site form; `None` leaves a field as is
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SitePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_millis() -> f64 {
    js_sys::Date::now()
}

/// Milliseconds since the Unix epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn now_millis() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as f64)
        .unwrap_or(0.0)
}

/// `site_<ms>_<suffix>`; unique in practice, not guaranteed
pub fn generate_site_id(now: f64) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("site_{}_{}", now as u64, &suffix[..9])
}
