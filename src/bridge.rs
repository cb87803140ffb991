/// JavaScript surface of the new-tab page
///
/// Every method that touches storage returns a Promise. Failures reject
/// with `{ kind, field?, message }` where `kind` comes from
/// `DashTabError::kind`.
use std::future::Future;
use std::rc::Rc;

use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::app::DashTab;
use crate::error::{DashTabError, Field, Reason, Result};
use crate::settings::Settings;
use crate::site_data::{SiteDraft, SitePatch};
use crate::storage::ChromeStorage;
use crate::view::FREQUENT_LIMIT;

#[derive(Serialize)]
struct ErrorPayload {
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<Field>,
    message: String,
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> std::result::Result<JsValue, JsValue> {
    // Plain objects and arrays, not JS Maps
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value.serialize(&serializer).map_err(JsValue::from)
}

fn error_to_js(err: DashTabError) -> JsValue {
    let field = match &err {
        DashTabError::Validation(v) => Some(v.field),
        _ => None,
    };
    let payload = ErrorPayload {
        kind: err.kind(),
        field,
        message: err.to_string(),
    };
    to_js(&payload).unwrap_or_else(|_| JsValue::from_str(&payload.message))
}

fn from_js<T>(value: JsValue, field: Field) -> std::result::Result<T, JsValue>
where
    T: serde::de::DeserializeOwned,
{
    serde_wasm_bindgen::from_value(value).map_err(|e| {
        log::warn!("Rejected {} from JavaScript: {}", field, e);
        error_to_js(DashTabError::validation(field, Reason::Malformed))
    })
}

/// Run an app call and resolve the promise with its serialized result
fn spawn<T, F>(future: F) -> js_sys::Promise
where
    T: Serialize + 'static,
    F: Future<Output = Result<T>> + 'static,
{
    future_to_promise(async move {
        match future.await {
            Ok(value) => to_js(&value),
            Err(e) => Err(error_to_js(e)),
        }
    })
}

#[wasm_bindgen(js_name = DashTab)]
pub struct DashTabHandle {
    inner: Rc<DashTab<ChromeStorage>>,
}

#[wasm_bindgen(js_class = DashTab)]
impl DashTabHandle {
    /// Load and migrate stored data. Await this before anything else.
    pub async fn load() -> std::result::Result<DashTabHandle, JsValue> {
        let app = DashTab::load(ChromeStorage).await.map_err(error_to_js)?;
        Ok(DashTabHandle { inner: Rc::new(app) })
    }

    #[wasm_bindgen(js_name = getCategories)]
    pub fn get_categories(&self) -> js_sys::Promise {
        let app = Rc::clone(&self.inner);
        spawn(async move { Ok(app.get_categories().await) })
    }

    #[wasm_bindgen(js_name = getVisibleSites)]
    pub fn get_visible_sites(
        &self,
        filter: &str,
        page: usize,
    ) -> std::result::Result<JsValue, JsValue> {
        to_js(&self.inner.get_visible_sites(filter, page))
    }

    #[wasm_bindgen(js_name = totalPages)]
    pub fn total_pages(&self, filter: &str) -> usize {
        self.inner.total_pages(filter)
    }

    #[wasm_bindgen(js_name = getFrequentSites)]
    pub fn get_frequent_sites(
        &self,
        limit: Option<usize>,
    ) -> std::result::Result<JsValue, JsValue> {
        to_js(&self.inner.get_frequent_sites(limit.unwrap_or(FREQUENT_LIMIT)))
    }

    #[wasm_bindgen(js_name = currentCategory)]
    pub fn current_category(&self) -> String {
        self.inner.current_category()
    }

    #[wasm_bindgen(js_name = getSettings)]
    pub fn get_settings(&self) -> std::result::Result<JsValue, JsValue> {
        to_js(&self.inner.settings())
    }

    /// Search URL for `query`, or undefined when the engine is unknown
    #[wasm_bindgen(js_name = searchUrl)]
    pub fn search_url(&self, engine: Option<String>, query: &str) -> Option<String> {
        self.inner.search_url(engine.as_deref(), query)
    }

    #[wasm_bindgen(js_name = addCategory)]
    pub fn add_category(&self, name: String) -> js_sys::Promise {
        let app = Rc::clone(&self.inner);
        spawn(async move { app.add_category(&name).await })
    }

    #[wasm_bindgen(js_name = renameCategory)]
    pub fn rename_category(&self, old_name: String, new_name: String) -> js_sys::Promise {
        let app = Rc::clone(&self.inner);
        spawn(async move { app.rename_category(&old_name, &new_name).await })
    }

    #[wasm_bindgen(js_name = removeCategory)]
    pub fn remove_category(&self, name: String) -> js_sys::Promise {
        let app = Rc::clone(&self.inner);
        spawn(async move { app.remove_category(&name).await })
    }

    #[wasm_bindgen(js_name = reorderCategories)]
    pub fn reorder_categories(&self, names: Vec<String>) -> js_sys::Promise {
        let app = Rc::clone(&self.inner);
        spawn(async move { app.reorder_categories(&names).await })
    }

    #[wasm_bindgen(js_name = selectCategory)]
    pub fn select_category(&self, name: String) -> js_sys::Promise {
        let app = Rc::clone(&self.inner);
        spawn(async move { app.select_category(&name).await })
    }

    #[wasm_bindgen(js_name = addSite)]
    pub fn add_site(&self, draft: JsValue) -> std::result::Result<js_sys::Promise, JsValue> {
        let draft: SiteDraft = from_js(draft, Field::Name)?;
        let app = Rc::clone(&self.inner);
        Ok(spawn(async move { app.add_site(&draft).await }))
    }

    #[wasm_bindgen(js_name = updateSite)]
    pub fn update_site(
        &self,
        id: String,
        patch: JsValue,
    ) -> std::result::Result<js_sys::Promise, JsValue> {
        let patch: SitePatch = from_js(patch, Field::Name)?;
        let app = Rc::clone(&self.inner);
        Ok(spawn(async move { app.update_site(&id, &patch).await }))
    }

    #[wasm_bindgen(js_name = removeSite)]
    pub fn remove_site(&self, id: String) -> js_sys::Promise {
        let app = Rc::clone(&self.inner);
        spawn(async move { app.remove_site(&id).await })
    }

    #[wasm_bindgen(js_name = recordVisit)]
    pub fn record_visit(&self, id: String) -> js_sys::Promise {
        let app = Rc::clone(&self.inner);
        spawn(async move { app.record_visit(&id).await })
    }

    #[wasm_bindgen(js_name = recordVisitByUrl)]
    pub fn record_visit_by_url(&self, url: String) -> js_sys::Promise {
        let app = Rc::clone(&self.inner);
        spawn(async move { app.record_visit_by_url(&url).await })
    }

    /// Resolves to "moved", "unchanged" or "ignored"
    #[wasm_bindgen(js_name = reorderSites)]
    pub fn reorder_sites(&self, filter: String, from: usize, to: usize) -> js_sys::Promise {
        let app = Rc::clone(&self.inner);
        spawn(async move { app.reorder_sites(&filter, from, to).await })
    }

    #[wasm_bindgen(js_name = updateSettings)]
    pub fn update_settings(
        &self,
        settings: JsValue,
    ) -> std::result::Result<js_sys::Promise, JsValue> {
        let settings: Settings = from_js(settings, Field::DefaultSearchEngine)?;
        let app = Rc::clone(&self.inner);
        Ok(spawn(async move { app.update_settings(settings).await }))
    }

    #[wasm_bindgen(js_name = exportBackup)]
    pub fn export_backup(&self) -> std::result::Result<String, JsValue> {
        self.inner.export_backup().map_err(error_to_js)
    }

    #[wasm_bindgen(js_name = importBackup)]
    pub fn import_backup(&self, json: String) -> js_sys::Promise {
        let app = Rc::clone(&self.inner);
        spawn(async move { app.import_backup(&json).await })
    }

    pub fn reset(&self) -> js_sys::Promise {
        let app = Rc::clone(&self.inner);
        spawn(async move { app.reset().await })
    }
}
