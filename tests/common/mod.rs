//! Shared test scaffolding: an in-memory taxonomy repository that records
//! calls, injects failures, and can hold a write in flight so tests can
//! interleave manager actions deterministically.

#![allow(dead_code)] // each test binary uses a different subset of helpers

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Notify;

use vitrine::repository::{RepositoryError, TaxonomyRepository};
use vitrine::taxonomy::{
    AssetInput, Category, CategoryAssets, CategoryFields, StagedSubcategory, Subcategory,
    SubcategoryFields,
};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Handles for a gated write: `started` fires once the repository has
/// entered the call, `release` lets it proceed.
pub struct WriteGate {
    pub started: Arc<Notify>,
    pub release: Arc<Notify>,
}

#[derive(Default)]
struct Store {
    categories: Vec<Category>,
    next_category_id: i64,
    next_subcategory_id: i64,
    calls: Vec<&'static str>,
    fail_next: Option<RepositoryError>,
    last_assets: Option<CategoryAssets>,
    last_staged: Option<Vec<StagedSubcategory>>,
}

/// In-memory stand-in for the admin backend.
///
/// The atomic create either persists the category with all staged
/// subcategories or, when a failure is injected, nothing at all. Deleting
/// a category drops its subcategories with it (they are owned).
pub struct InMemoryRepository {
    store: Mutex<Store>,
    gate: Mutex<Option<(Arc<Notify>, Arc<Notify>)>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(Store {
                next_category_id: 1,
                next_subcategory_id: 1,
                ..Store::default()
            }),
            gate: Mutex::new(None),
        }
    }

    /// Every repository call made so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.store.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.store
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| **c == name)
            .count()
    }

    /// Makes the next repository call fail with `err`.
    pub fn fail_next(&self, err: RepositoryError) {
        self.store.lock().unwrap().fail_next = Some(err);
    }

    /// The staged set the last atomic create received.
    pub fn last_staged(&self) -> Option<Vec<StagedSubcategory>> {
        self.store.lock().unwrap().last_staged.clone()
    }

    /// The asset inputs the last create/update received.
    pub fn last_assets(&self) -> Option<CategoryAssets> {
        self.store.lock().unwrap().last_assets.clone()
    }

    /// Holds the next write call until `release` is notified.
    pub fn gate_next_write(&self) -> WriteGate {
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some((Arc::clone(&started), Arc::clone(&release)));
        WriteGate { started, release }
    }

    async fn wait_gate(&self) {
        let gate = self.gate.lock().unwrap().take();
        if let Some((started, release)) = gate {
            started.notify_one();
            release.notified().await;
        }
    }

    fn not_found(what: &str) -> RepositoryError {
        RepositoryError::Rejected {
            message: format!("{what} not found"),
            field_errors: Vec::new(),
        }
    }
}

/// Simulates the backend's file storage: uploads land under `uploads/`,
/// kept URLs pass through, empty slots stay empty.
fn stored_asset_url(input: &AssetInput) -> Option<String> {
    match input {
        AssetInput::Unset => None,
        AssetInput::Keep(url) => Some(url.clone()),
        AssetInput::Replace(upload) => Some(format!("uploads/{}", upload.file_name)),
    }
}

#[async_trait]
impl TaxonomyRepository for InMemoryRepository {
    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let mut store = self.store.lock().unwrap();
        store.calls.push("list_categories");
        if let Some(err) = store.fail_next.take() {
            return Err(err);
        }
        Ok(store.categories.clone())
    }

    async fn create_category_with_subcategories(
        &self,
        fields: &CategoryFields,
        staged: &[StagedSubcategory],
        assets: &CategoryAssets,
    ) -> Result<Category, RepositoryError> {
        self.wait_gate().await;
        let mut store = self.store.lock().unwrap();
        store.calls.push("create_category");
        if let Some(err) = store.fail_next.take() {
            return Err(err);
        }
        store.last_assets = Some(assets.clone());
        store.last_staged = Some(staged.to_vec());

        let id = store.next_category_id;
        store.next_category_id += 1;

        let mut subcategories = Vec::with_capacity(staged.len());
        for entry in staged {
            let sub_id = store.next_subcategory_id;
            store.next_subcategory_id += 1;
            subcategories.push(Subcategory {
                id: sub_id,
                category_id: id,
                name: entry.name.clone(),
                is_active: entry.is_active,
                sort_order: entry.sort_order,
            });
        }

        let category = Category {
            id,
            title: fields.title.clone(),
            link: fields.link.clone(),
            icon_url: stored_asset_url(&assets.icon),
            image_url: stored_asset_url(&assets.image),
            desktop_breadcrumb_url: stored_asset_url(&assets.desktop_breadcrumb),
            mobile_breadcrumb_url: stored_asset_url(&assets.mobile_breadcrumb),
            is_active: fields.is_active,
            sort_order: fields.sort_order,
            subcategories,
            created_at: Utc::now(),
        };
        store.categories.push(category.clone());
        Ok(category)
    }

    async fn update_category(
        &self,
        id: i64,
        fields: &CategoryFields,
        assets: &CategoryAssets,
    ) -> Result<Category, RepositoryError> {
        self.wait_gate().await;
        let mut store = self.store.lock().unwrap();
        store.calls.push("update_category");
        if let Some(err) = store.fail_next.take() {
            return Err(err);
        }
        store.last_assets = Some(assets.clone());

        let Some(category) = store.categories.iter_mut().find(|c| c.id == id) else {
            return Err(Self::not_found("category"));
        };
        category.title = fields.title.clone();
        category.link = fields.link.clone();
        category.is_active = fields.is_active;
        category.sort_order = fields.sort_order;
        category.icon_url = stored_asset_url(&assets.icon);
        category.image_url = stored_asset_url(&assets.image);
        category.desktop_breadcrumb_url = stored_asset_url(&assets.desktop_breadcrumb);
        category.mobile_breadcrumb_url = stored_asset_url(&assets.mobile_breadcrumb);
        Ok(category.clone())
    }

    async fn delete_category(&self, id: i64) -> Result<(), RepositoryError> {
        let mut store = self.store.lock().unwrap();
        store.calls.push("delete_category");
        if let Some(err) = store.fail_next.take() {
            return Err(err);
        }
        if !store.categories.iter().any(|c| c.id == id) {
            return Err(Self::not_found("category"));
        }
        store.categories.retain(|c| c.id != id);
        Ok(())
    }

    async fn toggle_category_active(&self, id: i64) -> Result<Category, RepositoryError> {
        let mut store = self.store.lock().unwrap();
        store.calls.push("toggle_category");
        if let Some(err) = store.fail_next.take() {
            return Err(err);
        }
        let Some(category) = store.categories.iter_mut().find(|c| c.id == id) else {
            return Err(Self::not_found("category"));
        };
        category.is_active = !category.is_active;
        Ok(category.clone())
    }

    async fn create_subcategory(
        &self,
        category_id: i64,
        fields: &SubcategoryFields,
    ) -> Result<Subcategory, RepositoryError> {
        self.wait_gate().await;
        let mut store = self.store.lock().unwrap();
        store.calls.push("create_subcategory");
        if let Some(err) = store.fail_next.take() {
            return Err(err);
        }
        if !store.categories.iter().any(|c| c.id == category_id) {
            return Err(Self::not_found("category"));
        }
        let id = store.next_subcategory_id;
        store.next_subcategory_id += 1;
        let subcategory = Subcategory {
            id,
            category_id,
            name: fields.name.clone(),
            is_active: fields.is_active,
            sort_order: fields.sort_order,
        };
        let Some(category) = store.categories.iter_mut().find(|c| c.id == category_id) else {
            return Err(Self::not_found("category"));
        };
        category.subcategories.push(subcategory.clone());
        Ok(subcategory)
    }

    async fn update_subcategory(
        &self,
        id: i64,
        fields: &SubcategoryFields,
    ) -> Result<Subcategory, RepositoryError> {
        self.wait_gate().await;
        let mut store = self.store.lock().unwrap();
        store.calls.push("update_subcategory");
        if let Some(err) = store.fail_next.take() {
            return Err(err);
        }
        for category in &mut store.categories {
            if let Some(sub) = category.subcategories.iter_mut().find(|s| s.id == id) {
                sub.name = fields.name.clone();
                sub.is_active = fields.is_active;
                sub.sort_order = fields.sort_order;
                return Ok(sub.clone());
            }
        }
        Err(Self::not_found("subcategory"))
    }

    async fn delete_subcategory(&self, id: i64) -> Result<(), RepositoryError> {
        let mut store = self.store.lock().unwrap();
        store.calls.push("delete_subcategory");
        if let Some(err) = store.fail_next.take() {
            return Err(err);
        }
        for category in &mut store.categories {
            let before = category.subcategories.len();
            category.subcategories.retain(|s| s.id != id);
            if category.subcategories.len() != before {
                return Ok(());
            }
        }
        Err(Self::not_found("subcategory"))
    }

    async fn toggle_subcategory_active(&self, id: i64) -> Result<Subcategory, RepositoryError> {
        let mut store = self.store.lock().unwrap();
        store.calls.push("toggle_subcategory");
        if let Some(err) = store.fail_next.take() {
            return Err(err);
        }
        for category in &mut store.categories {
            if let Some(sub) = category.subcategories.iter_mut().find(|s| s.id == id) {
                sub.is_active = !sub.is_active;
                return Ok(sub.clone());
            }
        }
        Err(Self::not_found("subcategory"))
    }
}
