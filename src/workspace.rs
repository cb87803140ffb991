/// In-memory state of the new-tab page
///
/// Every mutation here is synchronous and leaves the state consistent;
/// writing it back is the caller's job (see `app::DashTab`).
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::category_store::CategoryStore;
use crate::error::{DashTabError, Result};
use crate::migration::migrate;
use crate::operations;
use crate::settings::Settings;
use crate::site_data::{
    ALL_CATEGORIES, Category, Site, SiteData, SiteDraft, SitePatch, VisitStat, readable_entries,
};
use crate::site_registry::SiteRegistry;
use crate::storage::{StorageBlob, StorageKey};
use crate::view::{filtered_sites, frequent_sites, page_slice, total_pages};

/// A key that is missing or cannot be read at all falls back to its default
fn read_key<T: DeserializeOwned + Default>(blob: &StorageBlob, key: StorageKey) -> T {
    match blob.get(key.as_str()) {
        Some(Value::Null) | None => T::default(),
        Some(value) => T::deserialize(value).unwrap_or_else(|e| {
            log::warn!("Stored {} is unreadable, using defaults: {}", key.as_str(), e);
            T::default()
        }),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Workspace {
    categories: CategoryStore,
    registry: SiteRegistry,
    settings: Settings,
    current_category: String,
}

impl Default for Workspace {
    fn default() -> Self {
        Workspace {
            categories: CategoryStore::with_defaults(),
            registry: SiteRegistry::default(),
            settings: Settings::default(),
            current_category: ALL_CATEGORIES.to_string(),
        }
    }
}

impl Workspace {
    /// Build from a blob already in the current layout (see `migration`).
    /// Unreadable entries are dropped rather than failing the load.
    pub fn from_blob(blob: &StorageBlob) -> Self {
        let site_data: SiteData = read_key(blob, StorageKey::SiteData);
        let categories: Vec<Value> = read_key(blob, StorageKey::Categories);
        let order: Vec<Value> = read_key(blob, StorageKey::CategoryOrder);
        let settings: Settings = read_key(blob, StorageKey::Settings);
        let current: Option<String> = read_key(blob, StorageKey::CurrentCategory);

        let categories: Vec<Category> = readable_entries(categories, "category");
        let order: Vec<String> = readable_entries(order, "category order entry");

        let mut workspace = Workspace {
            categories: CategoryStore::new(categories, order),
            registry: SiteRegistry::new(site_data),
            settings,
            current_category: ALL_CATEGORIES.to_string(),
        };
        workspace.current_category = workspace.restore_selection(current.as_deref());
        workspace
    }

    /// Fresh-install state, as produced by migrating nothing
    pub fn seeded() -> Self {
        Self::from_blob(&migrate(&StorageBlob::new()).blob)
    }

    /// Serialize the requested keys
    pub fn to_blob(&self, keys: &[StorageKey]) -> Result<StorageBlob, serde_json::Error> {
        let mut blob = StorageBlob::new();
        for key in keys {
            let value = match key {
                StorageKey::SiteData => serde_json::to_value(self.registry.to_site_data())?,
                StorageKey::Categories => serde_json::to_value(self.categories.categories())?,
                StorageKey::CategoryOrder => serde_json::to_value(self.categories.order())?,
                StorageKey::CurrentCategory => Value::String(self.current_category.clone()),
                StorageKey::Settings => serde_json::to_value(&self.settings)?,
            };
            blob.insert(key.as_str().to_string(), value);
        }
        Ok(blob)
    }

    /// A stored selection naming a removed category falls back to the
    /// first category in display order, or "all" when there is none
    fn restore_selection(&self, stored: Option<&str>) -> String {
        match stored {
            Some(name) if name == ALL_CATEGORIES || self.categories.contains(name) => {
                name.to_string()
            }
            Some(name) => {
                let fallback = self
                    .categories
                    .ordered()
                    .into_iter()
                    .next()
                    .map(|c| c.name)
                    .unwrap_or_else(|| ALL_CATEGORIES.to_string());
                log::warn!("Selected category {} no longer exists, showing {}", name, fallback);
                fallback
            }
            None => ALL_CATEGORIES.to_string(),
        }
    }

    pub fn category_store(&self) -> &CategoryStore {
        &self.categories
    }

    pub fn registry(&self) -> &SiteRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn current_category(&self) -> &str {
        &self.current_category
    }

    /// Append missing categories to the order list; true when it changed
    pub fn reconcile_categories(&mut self) -> bool {
        self.categories.reconcile()
    }

    pub fn ordered_categories(&self) -> Vec<Category> {
        self.categories.ordered()
    }

    pub fn visible_sites(&self, filter: &str, page: usize) -> Vec<Site> {
        let filtered = filtered_sites(self.registry.sites(), filter);
        page_slice(&filtered, page).iter().map(|s| (*s).clone()).collect()
    }

    pub fn total_pages(&self, filter: &str) -> usize {
        total_pages(filtered_sites(self.registry.sites(), filter).len())
    }

    pub fn frequent_sites(&self, limit: usize) -> Vec<Site> {
        frequent_sites(self.registry.sites(), self.registry.visit_stats(), limit)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn add_category(&mut self, name: &str) -> Result<Category> {
        let category = self.categories.add(name, true)?;
        log::debug!("Added category {}", category.name);
        Ok(category)
    }

    /// Rename a category, its sites, and the selection if it pointed there
    pub fn rename_category(&mut self, old_name: &str, new_name: &str) -> Result<String> {
        let new_name = operations::rename_category(
            &mut self.categories,
            &mut self.registry,
            old_name,
            new_name,
        )?;
        if self.current_category == old_name {
            self.current_category = new_name.clone();
        }
        Ok(new_name)
    }

    /// Remove a category; a selection pointing at it switches to "all"
    pub fn remove_category(&mut self, name: &str) -> Result<usize> {
        let moved = operations::remove_category(&mut self.categories, &mut self.registry, name)?;
        if self.current_category == name {
            self.current_category = ALL_CATEGORIES.to_string();
        }
        Ok(moved)
    }

    pub fn reorder_categories(&mut self, names: &[String]) {
        self.categories.reorder(names);
    }

    pub fn select_category(&mut self, name: &str) -> Result<()> {
        if name != ALL_CATEGORIES && !self.categories.contains(name) {
            return Err(DashTabError::NotFound(format!("category \"{}\"", name)));
        }
        self.current_category = name.to_string();
        Ok(())
    }

    pub fn add_site(&mut self, draft: &SiteDraft, now: f64) -> Result<Site> {
        let site = self.registry.add(draft, &self.categories, now)?;
        log::debug!("Added site {} ({})", site.name, site.id);
        Ok(site)
    }

    pub fn update_site(&mut self, id: &str, patch: &SitePatch) -> Result<Site> {
        self.registry.update(id, patch, &self.categories)
    }

    pub fn remove_site(&mut self, id: &str) -> Option<Site> {
        self.registry.remove(id)
    }

    pub fn record_visit(&mut self, id: &str, now: f64) -> Result<VisitStat> {
        self.registry.record_visit(id, now)
    }

    pub fn record_visit_by_url(&mut self, url: &str, now: f64) -> Option<String> {
        self.registry.record_visit_by_url(url, now)
    }

    pub fn reorder_sites(&mut self, filter: &str, from: usize, to: usize) -> bool {
        self.registry.reorder_within(filter, from, to)
    }

    pub fn update_settings(&mut self, settings: Settings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }
}
