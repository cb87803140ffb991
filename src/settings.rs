/// User preferences persisted under the `settings` key
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Field, Reason, ValidationError};

pub const MIN_SITES_PER_ROW: u8 = 1;
pub const MAX_SITES_PER_ROW: u8 = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Auto,
    Light,
    Dark,
}

/// Where a clicked site opens
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OpenMode {
    CurrentTab,
    #[default]
    NewTab,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEngine {
    pub name: String,
    /// Query URL with `%s` where the search terms go
    pub url: String,
}

impl SearchEngine {
    fn new(name: &str, url: &str) -> SearchEngine {
        SearchEngine {
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}

/// Missing fields in stored settings fall back to the defaults one by one,
/// so settings written by an older version merge over the current defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub theme: Theme,
    pub sites_per_row: u8,
    pub search_engines: BTreeMap<String, SearchEngine>,
    pub default_search_engine: String,
    pub open_mode: OpenMode,
}

impl Default for Settings {
    fn default() -> Self {
        let search_engines = BTreeMap::from([
            (
                "google".to_string(),
                SearchEngine::new("Google", "https://www.google.com/search?q=%s"),
            ),
            ("baidu".to_string(), SearchEngine::new("百度", "https://www.baidu.com/s?wd=%s")),
            ("bing".to_string(), SearchEngine::new("必应", "https://www.bing.com/search?q=%s")),
            (
                "zhihu".to_string(),
                SearchEngine::new("知乎", "https://www.zhihu.com/search?type=content&q=%s"),
            ),
            ("github".to_string(), SearchEngine::new("GitHub", "https://github.com/search?q=%s")),
        ]);

        Settings {
            theme: Theme::Auto,
            sites_per_row: 5,
            search_engines,
            default_search_engine: "google".to_string(),
            open_mode: OpenMode::NewTab,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(MIN_SITES_PER_ROW..=MAX_SITES_PER_ROW).contains(&self.sites_per_row) {
            return Err(ValidationError::new(
                Field::SitesPerRow,
                Reason::OutOfRange {
                    min: MIN_SITES_PER_ROW as usize,
                    max: MAX_SITES_PER_ROW as usize,
                },
            ));
        }

        if !self.search_engines.contains_key(&self.default_search_engine) {
            return Err(ValidationError::new(Field::DefaultSearchEngine, Reason::Unknown));
        }

        Ok(())
    }

    /// Build the results URL for a query, using the default engine when
    /// `engine` is `None`
    pub fn search_url(&self, engine: Option<&str>, query: &str) -> Option<String> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        let key = engine.unwrap_or(&self.default_search_engine);
        let engine = self.search_engines.get(key)?;
        let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();

        Some(engine.url.replacen("%s", &encoded, 1))
    }
}
