/// Application root: owns the workspace and writes it through storage
use std::cell::{Cell, RefCell};
use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use crate::error::{DashTabError, Result};
use crate::migration::migrate;
use crate::settings::Settings;
use crate::site_data::{Category, Site, SiteDraft, SitePatch, VisitStat, now_millis};
use crate::storage::{StorageBackend, StorageBlob, StorageKey, load_keys};
use crate::workspace::Workspace;

/// What happened to a drag-and-drop reorder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ReorderOutcome {
    Moved,
    Unchanged,
    /// Arrived while the previous drag was still being saved
    Ignored,
}

const CATEGORY_KEYS: [StorageKey; 4] = [
    StorageKey::SiteData,
    StorageKey::Categories,
    StorageKey::CategoryOrder,
    StorageKey::CurrentCategory,
];

/// Turn an exported document into something the migration chain reads.
/// Exports from the original extension wrap everything in `data`.
fn backup_to_raw(mut backup: StorageBlob) -> StorageBlob {
    match backup.remove("data") {
        Some(Value::Object(data)) => {
            let mut raw = StorageBlob::new();
            raw.insert("dashTabData".to_string(), Value::Object(data));
            if let Some(settings) = backup.remove("settings") {
                raw.insert("dashTabSettings".to_string(), settings);
            }
            raw
        }
        _ => backup,
    }
}

/// State is updated in memory first, then written; a failed write is
/// reported but never rolled back. Keys whose write failed stay pending
/// and go out with the next write that succeeds.
pub struct DashTab<S: StorageBackend> {
    storage: S,
    workspace: RefCell<Workspace>,
    pending: RefCell<HashSet<StorageKey>>,
    category_drag: Cell<bool>,
    site_drag: Cell<bool>,
}

impl<S: StorageBackend> DashTab<S> {
    /// Read storage, migrate older layouts, and write the result back.
    /// Nothing else should touch the state before this resolves.
    pub async fn load(storage: S) -> Result<Self> {
        let raw = storage.get(&load_keys()).await?;
        let migrated = migrate(&raw);
        let mut workspace = Workspace::from_blob(&migrated.blob);
        let reconciled = workspace.reconcile_categories();

        let app = DashTab {
            storage,
            workspace: RefCell::new(workspace),
            pending: RefCell::new(HashSet::new()),
            category_drag: Cell::new(false),
            site_drag: Cell::new(false),
        };

        if migrated.needs_write() {
            log::info!("Migrating stored data from {:?} layout", migrated.from);
            if let Err(e) = app.persist(&StorageKey::ALL).await {
                log::warn!("Migrated data not saved, will retry on next change: {}", e);
            }
        } else if reconciled {
            if let Err(e) = app.persist(&[StorageKey::CategoryOrder]).await {
                log::warn!("Reconciled category order not saved: {}", e);
            }
        }

        log::info!(
            "DashTab loaded: {} categories, {} sites",
            app.workspace.borrow().category_store().categories().len(),
            app.workspace.borrow().registry().sites().len()
        );
        Ok(app)
    }

    /// Write `keys` along with whatever an earlier failed write left pending
    async fn persist(&self, keys: &[StorageKey]) -> Result<()> {
        let attempted: Vec<StorageKey> = {
            let pending = self.pending.borrow();
            StorageKey::ALL
                .into_iter()
                .filter(|key| keys.contains(key) || pending.contains(key))
                .collect()
        };
        let blob = self.workspace.borrow().to_blob(&attempted)?;

        match self.storage.set(blob).await {
            Ok(()) => {
                self.pending.borrow_mut().retain(|key| !attempted.contains(key));
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to save {:?}: {}", attempted, e);
                self.pending.borrow_mut().extend(attempted);
                Err(DashTabError::from(e))
            }
        }
    }

    /// Replace the stored data wholesale with the in-memory state
    async fn rewrite_all(&self) -> Result<()> {
        self.pending.borrow_mut().extend(StorageKey::ALL);
        self.storage.clear().await.inspect_err(|e| {
            log::error!("Failed to clear storage: {}", e);
        })?;
        self.persist(&StorageKey::ALL).await
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn settings(&self) -> Settings {
        self.workspace.borrow().settings().clone()
    }

    pub fn current_category(&self) -> String {
        self.workspace.borrow().current_category().to_string()
    }

    /// Categories in display order. Reconciles the order list first and
    /// saves it when it changed; a failed save is only logged.
    pub async fn get_categories(&self) -> Vec<Category> {
        let changed = self.workspace.borrow_mut().reconcile_categories();
        if changed {
            if let Err(e) = self.persist(&[StorageKey::CategoryOrder]).await {
                log::warn!("Category order not saved: {}", e);
            }
        }
        self.workspace.borrow().ordered_categories()
    }

    pub fn get_visible_sites(&self, filter: &str, page: usize) -> Vec<Site> {
        self.workspace.borrow().visible_sites(filter, page)
    }

    pub fn total_pages(&self, filter: &str) -> usize {
        self.workspace.borrow().total_pages(filter)
    }

    pub fn get_frequent_sites(&self, limit: usize) -> Vec<Site> {
        self.workspace.borrow().frequent_sites(limit)
    }

    pub fn search_url(&self, engine: Option<&str>, query: &str) -> Option<String> {
        self.workspace.borrow().settings().search_url(engine, query)
    }

    pub async fn add_category(&self, name: &str) -> Result<Category> {
        let category = self.workspace.borrow_mut().add_category(name)?;
        self.persist(&[StorageKey::Categories, StorageKey::CategoryOrder]).await?;
        Ok(category)
    }

    pub async fn rename_category(&self, old_name: &str, new_name: &str) -> Result<String> {
        let new_name = self.workspace.borrow_mut().rename_category(old_name, new_name)?;
        self.persist(&CATEGORY_KEYS).await?;
        Ok(new_name)
    }

    /// Returns how many sites were moved to "all"
    pub async fn remove_category(&self, name: &str) -> Result<usize> {
        let moved = self.workspace.borrow_mut().remove_category(name)?;
        self.persist(&CATEGORY_KEYS).await?;
        Ok(moved)
    }

    pub async fn reorder_categories(&self, names: &[String]) -> Result<ReorderOutcome> {
        if self.category_drag.get() {
            log::warn!("Ignoring category drag while the previous one is saving");
            return Ok(ReorderOutcome::Ignored);
        }

        self.workspace.borrow_mut().reorder_categories(names);
        self.save_drag(&self.category_drag, &[StorageKey::CategoryOrder]).await
    }

    pub async fn select_category(&self, name: &str) -> Result<()> {
        self.workspace.borrow_mut().select_category(name)?;
        self.persist(&[StorageKey::CurrentCategory]).await
    }

    pub async fn add_site(&self, draft: &SiteDraft) -> Result<Site> {
        let site = self.workspace.borrow_mut().add_site(draft, now_millis())?;
        self.persist(&[StorageKey::SiteData]).await?;
        Ok(site)
    }

    pub async fn update_site(&self, id: &str, patch: &SitePatch) -> Result<Site> {
        let site = self.workspace.borrow_mut().update_site(id, patch)?;
        self.persist(&[StorageKey::SiteData]).await?;
        Ok(site)
    }

    /// No-op (and no write) when the site does not exist
    pub async fn remove_site(&self, id: &str) -> Result<()> {
        let removed = self.workspace.borrow_mut().remove_site(id);
        match removed {
            Some(site) => {
                log::debug!("Removed site {} ({})", site.name, site.id);
                self.persist(&[StorageKey::SiteData]).await
            }
            None => Ok(()),
        }
    }

    pub async fn record_visit(&self, id: &str) -> Result<VisitStat> {
        let stat = self.workspace.borrow_mut().record_visit(id, now_millis())?;
        self.persist(&[StorageKey::SiteData]).await?;
        Ok(stat)
    }

    /// Count a page load against the bookmarked site on the same host.
    /// Returns the matched site id.
    pub async fn record_visit_by_url(&self, url: &str) -> Result<Option<String>> {
        let matched = self.workspace.borrow_mut().record_visit_by_url(url, now_millis());
        if let Some(id) = &matched {
            log::debug!("Visit recorded for {} via {}", id, url);
            self.persist(&[StorageKey::SiteData]).await?;
        }
        Ok(matched)
    }

    /// Drag-end inside the site grid. Indices refer to the filtered,
    /// ordered list for `filter`.
    pub async fn reorder_sites(
        &self,
        filter: &str,
        from: usize,
        to: usize,
    ) -> Result<ReorderOutcome> {
        if self.site_drag.get() {
            log::warn!("Ignoring site drag while the previous one is saving");
            return Ok(ReorderOutcome::Ignored);
        }

        let changed = self.workspace.borrow_mut().reorder_sites(filter, from, to);
        if !changed {
            return Ok(ReorderOutcome::Unchanged);
        }
        self.save_drag(&self.site_drag, &[StorageKey::SiteData]).await
    }

    /// Persist a drag result with `in_flight` raised until the write settles
    async fn save_drag(
        &self,
        in_flight: &Cell<bool>,
        keys: &[StorageKey],
    ) -> Result<ReorderOutcome> {
        in_flight.set(true);
        let saved = self.persist(keys).await;
        in_flight.set(false);
        saved.map(|_| ReorderOutcome::Moved)
    }

    pub async fn update_settings(&self, settings: Settings) -> Result<()> {
        self.workspace.borrow_mut().update_settings(settings)?;
        self.persist(&[StorageKey::Settings]).await
    }

    /// Pretty-printed JSON of everything stored, plus export metadata
    pub fn export_backup(&self) -> Result<String> {
        let mut backup = self.workspace.borrow().to_blob(&StorageKey::ALL)?;
        backup.insert("exportTime".to_string(), Value::from(now_millis()));
        backup.insert("version".to_string(), Value::from(env!("CARGO_PKG_VERSION")));
        Ok(serde_json::to_string_pretty(&backup)?)
    }

    /// Replace everything with an exported document, from this version
    /// or from the original extension
    pub async fn import_backup(&self, json: &str) -> Result<()> {
        let backup: StorageBlob = serde_json::from_str(json)?;
        let migrated = migrate(&backup_to_raw(backup));
        let mut workspace = Workspace::from_blob(&migrated.blob);
        workspace.reconcile_categories();

        log::info!("Importing backup ({:?} layout)", migrated.from);
        *self.workspace.borrow_mut() = workspace;

        self.rewrite_all().await
    }

    /// Wipe storage and start over with the fresh-install state
    pub async fn reset(&self) -> Result<()> {
        *self.workspace.borrow_mut() = Workspace::seeded();
        log::info!("Resetting all data");

        self.rewrite_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Field, StorageError};
    use crate::site_data::{ALL_CATEGORIES, DEFAULT_CATEGORY};
    use crate::storage::MemoryStorage;
    use serde_json::json;
    use tokio::sync::Notify;

    fn blob(value: Value) -> StorageBlob {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    fn create_test_draft(name: &str, category: &str) -> SiteDraft {
        SiteDraft {
            name: name.to_string(),
            url: format!("{}.example.com", name.to_lowercase()),
            color: "#5B4FE8".to_string(),
            category: category.to_string(),
        }
    }

    async fn create_test_app() -> DashTab<MemoryStorage> {
        let app = DashTab::load(MemoryStorage::new()).await.unwrap();
        app.add_category("work").await.unwrap();
        app.add_category("fun").await.unwrap();
        let sites = [("Mail", "work"), ("Docs", "work"), ("Jira", "work"), ("Games", "fun")];
        for (name, category) in sites {
            app.add_site(&create_test_draft(name, category)).await.unwrap();
        }
        app
    }

    fn names(categories: &[Category]) -> Vec<&str> {
        categories.iter().map(|c| c.name.as_str()).collect()
    }

    /// Storage whose writes wait for a signal, to hold a save in flight
    struct GatedStorage {
        inner: MemoryStorage,
        gate: Notify,
    }

    impl StorageBackend for GatedStorage {
        async fn get(&self, keys: &[&str]) -> std::result::Result<StorageBlob, StorageError> {
            self.inner.get(keys).await
        }

        async fn set(&self, blob: StorageBlob) -> std::result::Result<(), StorageError> {
            self.gate.notified().await;
            self.inner.set(blob).await
        }

        async fn clear(&self) -> std::result::Result<(), StorageError> {
            self.inner.clear().await
        }
    }

    #[tokio::test]
    async fn test_fresh_install_seeds_and_saves() {
        let app = DashTab::load(MemoryStorage::new()).await.unwrap();

        assert_eq!(names(&app.get_categories().await), vec![DEFAULT_CATEGORY]);
        assert_eq!(app.current_category(), ALL_CATEGORIES);
        assert_eq!(app.storage().item("categoryOrder"), Some(json!([DEFAULT_CATEGORY])));
        assert_eq!(app.storage().item("currentCategory"), Some(json!("all")));
    }

    #[tokio::test]
    async fn test_legacy_load_writes_through_once() {
        let storage = MemoryStorage::with_items(blob(json!({
            "dashTabData": {
                "sites": [{"id": "site_1", "name": "GitHub", "url": "https://github.com", "group": "dev"}],
                "groups": {"dev": {"name": "开发", "sites": ["site_1"]}},
                "visitStats": {}
            }
        })));

        let app = DashTab::load(storage).await.unwrap();
        let first = app.storage().snapshot();
        assert_eq!(app.storage().write_count(), 1);
        assert_eq!(app.get_visible_sites("开发", 1).len(), 1);

        let reloaded = DashTab::load(MemoryStorage::with_items(first.clone())).await.unwrap();

        assert_eq!(reloaded.storage().write_count(), 0);
        assert_eq!(reloaded.storage().snapshot(), first);
        assert_eq!(names(&reloaded.get_categories().await), vec![DEFAULT_CATEGORY, "开发"]);
    }

    #[tokio::test]
    async fn test_load_reconciles_order() {
        let storage = MemoryStorage::with_items(blob(json!({
            "categories": [{"name": "Default", "removable": false}, {"name": "Work", "removable": true}],
            "categoryOrder": ["Work"]
        })));

        let app = DashTab::load(storage).await.unwrap();

        assert_eq!(app.storage().item("categoryOrder"), Some(json!(["Work", "Default"])));
    }

    #[tokio::test]
    async fn test_rename_category_cascades() {
        let app = create_test_app().await;
        let before = app.get_categories().await;
        let position = before.iter().position(|c| c.name == "work");

        app.rename_category("work", "job").await.unwrap();

        assert!(app.get_visible_sites("work", 1).is_empty());
        assert_eq!(app.get_visible_sites("job", 1).len(), 3);
        let after = app.get_categories().await;
        assert_eq!(after.iter().position(|c| c.name == "job"), position);

        let stored_data = app.storage().item("siteData").unwrap();
        let stored: Vec<Value> = serde_json::from_value(stored_data["sites"].clone()).unwrap();
        assert_eq!(stored.iter().filter(|s| s["category"] == "job").count(), 3);
    }

    #[tokio::test]
    async fn test_remove_category_reassigns_sites() {
        let app = create_test_app().await;
        app.select_category("work").await.unwrap();

        let moved = app.remove_category("work").await.unwrap();

        assert_eq!(moved, 3);
        assert_eq!(app.current_category(), ALL_CATEGORIES);
        assert!(app.get_categories().await.iter().all(|c| c.name != "work"));
        let all = app.get_visible_sites(ALL_CATEGORIES, 1);
        assert_eq!(all.iter().filter(|s| s.category == ALL_CATEGORIES).count(), 3);
    }

    #[tokio::test]
    async fn test_remove_builtin_category_fails() {
        let app = create_test_app().await;
        let stored_before = app.storage().snapshot();

        let err = app.remove_category(DEFAULT_CATEGORY).await.unwrap_err();

        assert!(matches!(err, DashTabError::NotRemovable(_)));
        assert_eq!(app.storage().snapshot(), stored_before);
    }

    #[tokio::test]
    async fn test_storage_failure_keeps_memory() {
        let app = create_test_app().await;
        app.storage().fail_writes(true);

        let err = app.add_category("later").await.unwrap_err();

        assert!(matches!(err, DashTabError::Storage(StorageError::Write(_))));
        assert!(app.get_categories().await.iter().any(|c| c.name == "later"));
        assert!(!app.storage().item("categories").unwrap().to_string().contains("later"));

        app.storage().fail_writes(false);
        app.add_category("again").await.unwrap();
        assert!(app.storage().item("categories").unwrap().to_string().contains("later"));
    }

    #[tokio::test]
    async fn test_failed_migration_write_goes_out_with_next_change() {
        let storage = MemoryStorage::with_items(blob(json!({
            "dashTabData": {
                "sites": [{"id": "site_1", "name": "GitHub", "url": "https://github.com", "group": "dev"}],
                "groups": {"dev": {"name": "Dev", "sites": ["site_1"]}},
                "visitStats": {}
            }
        })));
        storage.fail_writes(true);
        let app = DashTab::load(storage).await.unwrap();
        assert!(app.storage().item("siteData").is_none());

        app.storage().fail_writes(false);
        app.add_category("X").await.unwrap();

        let reloaded = DashTab::load(MemoryStorage::with_items(app.storage().snapshot()))
            .await
            .unwrap();
        assert_eq!(reloaded.get_visible_sites("Dev", 1).len(), 1);
        assert_eq!(
            names(&reloaded.get_categories().await),
            vec![DEFAULT_CATEGORY, "Dev", "X"]
        );
    }

    #[tokio::test]
    async fn test_failed_site_write_goes_out_with_next_change() {
        let app = DashTab::load(MemoryStorage::new()).await.unwrap();
        app.storage().fail_writes(true);
        app.add_site(&create_test_draft("Mail", DEFAULT_CATEGORY)).await.unwrap_err();

        app.storage().fail_writes(false);
        app.add_category("Work").await.unwrap();

        let stored = app.storage().item("siteData").unwrap();
        assert_eq!(stored["sites"].as_array().map(Vec::len), Some(1));
        assert_eq!(stored["sites"][0]["name"], "Mail");

        let writes = app.storage().write_count();
        app.select_category("Work").await.unwrap();
        assert_eq!(app.storage().write_count(), writes + 1);
        assert_eq!(app.storage().item("currentCategory"), Some(json!("Work")));
    }

    #[tokio::test]
    async fn test_failed_reset_rewrites_everything_later() {
        let app = create_test_app().await;
        app.storage().fail_writes(true);
        app.reset().await.unwrap_err();

        app.storage().fail_writes(false);
        app.select_category(ALL_CATEGORIES).await.unwrap();

        let reloaded = DashTab::load(MemoryStorage::with_items(app.storage().snapshot()))
            .await
            .unwrap();
        assert!(reloaded.get_visible_sites(ALL_CATEGORIES, 1).is_empty());
        assert_eq!(names(&reloaded.get_categories().await), vec![DEFAULT_CATEGORY]);
    }

    #[tokio::test]
    async fn test_load_survives_bad_records() {
        let storage = MemoryStorage::with_items(blob(json!({
            "siteData": {
                "sites": [
                    {"id": "site_1", "name": "Mail", "url": "https://mail.example.com", "order": null},
                    {"name": "No id"}
                ],
                "visitStats": {"site_1": {"count": null}}
            },
            "categories": [{"name": "Default", "removable": false}],
            "categoryOrder": ["Default"],
            "currentCategory": "all"
        })));

        let app = DashTab::load(storage).await.unwrap();

        let sites = app.get_visible_sites(ALL_CATEGORIES, 1);
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].order, 0);
        assert!(app.get_frequent_sites(5).is_empty());
    }

    #[tokio::test]
    async fn test_validation_errors_do_not_write() {
        let app = create_test_app().await;
        let writes = app.storage().write_count();

        let err = app.add_site(&create_test_draft("ABCDEFGHIJKLMNOPQ", "work")).await.unwrap_err();

        assert!(matches!(err, DashTabError::Validation(ref v) if v.field == Field::Name));
        assert_eq!(app.storage().write_count(), writes);
    }

    #[tokio::test]
    async fn test_visits_and_frequent_sites() {
        let app = create_test_app().await;
        let docs = app.get_visible_sites("work", 1)[1].clone();

        app.record_visit(&docs.id).await.unwrap();
        app.record_visit(&docs.id).await.unwrap();
        let matched = app.record_visit_by_url("https://mail.example.com/inbox").await.unwrap();

        assert!(matched.is_some());
        let frequent: Vec<String> = app.get_frequent_sites(5).into_iter().map(|s| s.name).collect();
        assert_eq!(frequent, vec!["Docs", "Mail"]);
    }

    #[tokio::test]
    async fn test_remove_site_drops_stats() {
        let app = create_test_app().await;
        let games = app.get_visible_sites("fun", 1)[0].clone();

        app.remove_site(&games.id).await.unwrap();
        app.remove_site(&games.id).await.unwrap();

        let stored = app.storage().item("siteData").unwrap();
        assert!(stored["visitStats"].get(&games.id).is_none());
        assert_eq!(stored["sites"].as_array().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn test_reorder_sites() {
        let app = create_test_app().await;

        let outcome = app.reorder_sites("work", 2, 0).await.unwrap();

        assert_eq!(outcome, ReorderOutcome::Moved);
        let order: Vec<String> =
            app.get_visible_sites("work", 1).into_iter().map(|s| s.name).collect();
        assert_eq!(order, vec!["Jira", "Mail", "Docs"]);
        assert_eq!(app.reorder_sites("work", 1, 1).await.unwrap(), ReorderOutcome::Unchanged);
    }

    #[tokio::test]
    async fn test_drag_while_saving_is_ignored() {
        let app = DashTab::load(MemoryStorage::new()).await.unwrap();
        app.add_category("a").await.unwrap();
        app.add_category("b").await.unwrap();
        let snapshot = app.storage().snapshot();

        let gated = DashTab::load(GatedStorage {
            inner: MemoryStorage::with_items(snapshot),
            gate: Notify::new(),
        })
        .await
        .unwrap();
        let first_order = vec!["b".to_string(), "a".to_string()];
        let second_order = vec!["a".to_string()];

        let (first, second) = tokio::join!(gated.reorder_categories(&first_order), async {
            let outcome = gated.reorder_categories(&second_order).await;
            gated.storage().gate.notify_one();
            outcome
        });

        assert_eq!(first.unwrap(), ReorderOutcome::Moved);
        assert_eq!(second.unwrap(), ReorderOutcome::Ignored);
        assert_eq!(names(&gated.get_categories().await), vec!["b", "a", DEFAULT_CATEGORY]);
    }

    #[tokio::test]
    async fn test_category_drag_does_not_block_site_drag() {
        let app = create_test_app().await;
        app.category_drag.set(true);

        assert_eq!(app.reorder_sites("work", 0, 2).await.unwrap(), ReorderOutcome::Moved);
        let order = vec!["fun".to_string()];
        assert_eq!(app.reorder_categories(&order).await.unwrap(), ReorderOutcome::Ignored);

        app.category_drag.set(false);
        app.site_drag.set(true);
        assert_eq!(app.reorder_categories(&order).await.unwrap(), ReorderOutcome::Moved);
        assert_eq!(app.reorder_sites("work", 0, 2).await.unwrap(), ReorderOutcome::Ignored);
    }

    #[tokio::test]
    async fn test_failed_drag_save_releases_guard() {
        let app = create_test_app().await;
        app.storage().fail_writes(true);

        assert!(app.reorder_sites("work", 0, 1).await.is_err());

        app.storage().fail_writes(false);
        assert_eq!(app.reorder_sites("work", 0, 1).await.unwrap(), ReorderOutcome::Moved);
    }

    #[tokio::test]
    async fn test_settings_and_search() {
        let app = create_test_app().await;
        let mut settings = app.settings();
        settings.default_search_engine = "bing".to_string();

        app.update_settings(settings).await.unwrap();

        assert_eq!(
            app.search_url(None, "rust"),
            Some("https://www.bing.com/search?q=rust".to_string())
        );
        assert_eq!(app.storage().item("settings").unwrap()["defaultSearchEngine"], "bing");
    }

    #[tokio::test]
    async fn test_export_import_round_trip() {
        let app = create_test_app().await;
        let exported = app.export_backup().unwrap();

        let other = DashTab::load(MemoryStorage::new()).await.unwrap();
        other.import_backup(&exported).await.unwrap();

        assert_eq!(names(&other.get_categories().await), vec![DEFAULT_CATEGORY, "work", "fun"]);
        assert_eq!(other.get_visible_sites("work", 1).len(), 3);
        assert!(other.storage().item("exportTime").is_none());
    }

    #[tokio::test]
    async fn test_import_original_export() {
        let exported = json!({
            "data": {
                "sites": [{"id": "site_1", "name": "Bilibili", "url": "https://www.bilibili.com", "group": "fun"}],
                "groups": {"fun": {"name": "娱乐", "sites": []}},
                "visitStats": {"site_1": {"count": 2, "lastVisit": null}}
            },
            "settings": {"theme": "light"},
            "exportTime": 1698508200000u64,
            "version": "1.0.0"
        });
        let app = DashTab::load(MemoryStorage::new()).await.unwrap();

        app.import_backup(&exported.to_string()).await.unwrap();

        assert_eq!(app.get_visible_sites("娱乐", 1).len(), 1);
        assert_eq!(app.get_frequent_sites(5).len(), 1);
        assert_eq!(app.storage().item("settings").unwrap()["theme"], "light");
        assert!(app.storage().item("dashTabData").is_none());
    }

    #[tokio::test]
    async fn test_reset() {
        let app = create_test_app().await;

        app.reset().await.unwrap();

        assert_eq!(names(&app.get_categories().await), vec![DEFAULT_CATEGORY]);
        assert!(app.get_visible_sites(ALL_CATEGORIES, 1).is_empty());
        assert_eq!(app.storage().item("siteData"), Some(json!({"sites": [], "visitStats": {}})));
    }
}
