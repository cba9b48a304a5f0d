//! The taxonomy manager: single source of truth for the admin console's
//! working set of categories.
//!
//! All user actions flow through here. The manager validates input, runs
//! the staged-subcategory creation workflow, calls the repository, and
//! refreshes its view from the authoritative response. Nothing is mutated
//! optimistically: every successful write is followed by a full reload so
//! the view always reflects server-assigned ids and ordering.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use crate::repository::{RepositoryError, TaxonomyRepository};
use crate::taxonomy::{
    validate, AssetInput, Category, CategoryAssets, CategoryForm, Subcategory, SubcategoryDraft,
    ValidationError,
};

/// Errors surfaced by manager operations. All are recoverable: the user
/// corrects input (or retries) and resubmits.
#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    /// A submission from this form is already in flight.
    #[error("a submission is already in progress")]
    SubmitInProgress,
}

/// Which form is currently open. Expanded list rows and other host UI
/// states are independent of this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    CategoryCreate,
    CategoryEdit(i64),
    SubcategoryCreate(i64),
    SubcategoryEdit(i64),
}

/// Outcome of a submission that reached the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Persisted; the list was reloaded and the form closed.
    Saved,
    /// The form was closed while the request was in flight, so the
    /// response was dropped instead of reopening a dead form with stale
    /// state.
    Discarded,
}

struct ManagerState {
    categories: Arc<Vec<Category>>,
    form: Option<FormKind>,
    submitting: bool,
    /// Bumped whenever a form opens or closes. A submission captures the
    /// epoch when it starts and only applies its result if the epoch
    /// still matches.
    epoch: u64,
}

/// Orchestrates the category/subcategory taxonomy against a repository.
///
/// Methods take `&self`; state lives behind a mutex that is never held
/// across an await, so a host can share the manager as
/// `Arc<TaxonomyManager<R>>` across its event handlers.
pub struct TaxonomyManager<R> {
    repo: R,
    state: Mutex<ManagerState>,
}

impl<R: TaxonomyRepository> TaxonomyManager<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            state: Mutex::new(ManagerState {
                categories: Arc::new(Vec::new()),
                form: None,
                submitting: false,
                epoch: 0,
            }),
        }
    }

    /// The underlying repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// The lock is only held between awaits, so a poisoned mutex can
    /// simply be recovered.
    fn state(&self) -> MutexGuard<'_, ManagerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ========================================================================
    // Working Set
    // ========================================================================

    /// Replaces the in-memory list wholesale from the repository. On
    /// failure the previous list is left intact and the error is returned
    /// for the host to surface.
    pub async fn load_all(&self) -> Result<(), TaxonomyError> {
        self.refresh().await
    }

    /// Cheap snapshot of the current working set.
    pub fn categories(&self) -> Arc<Vec<Category>> {
        Arc::clone(&self.state().categories)
    }

    /// Case-insensitive substring filter over category titles. Pure: the
    /// stored list is untouched and the filter is recomputed per query.
    pub fn search(&self, term: &str) -> Vec<Category> {
        let needle = term.to_lowercase();
        self.state()
            .categories
            .iter()
            .filter(|c| c.title.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    async fn refresh(&self) -> Result<(), TaxonomyError> {
        let categories = self.repo.list_categories().await?;
        self.state().categories = Arc::new(categories);
        Ok(())
    }

    // ========================================================================
    // Form State Machine
    // ========================================================================

    /// Opens the creation form: defaults, an empty staged set, and a
    /// single blank entry row (`next_subcategory`).
    pub fn begin_create_category(&self) -> CategoryForm {
        self.open_form(FormKind::CategoryCreate);
        CategoryForm::default()
    }

    /// Opens the edit form seeded from `category`. Persisted asset URLs
    /// become `Keep` inputs so an untouched slot is re-sent unchanged.
    /// Existing subcategories are not staged; they are edited through the
    /// independent subcategory path.
    pub fn begin_edit_category(&self, category: &Category) -> CategoryForm {
        self.open_form(FormKind::CategoryEdit(category.id));
        CategoryForm {
            id: Some(category.id),
            title: category.title.clone(),
            link: category.link.clone().unwrap_or_default(),
            is_active: category.is_active,
            sort_order: category.sort_order,
            assets: CategoryAssets {
                icon: keep_or_unset(&category.icon_url),
                image: keep_or_unset(&category.image_url),
                desktop_breadcrumb: keep_or_unset(&category.desktop_breadcrumb_url),
                mobile_breadcrumb: keep_or_unset(&category.mobile_breadcrumb_url),
            },
            ..CategoryForm::default()
        }
    }

    pub fn begin_create_subcategory(&self, category_id: i64) -> SubcategoryDraft {
        self.open_form(FormKind::SubcategoryCreate(category_id));
        SubcategoryDraft::default()
    }

    pub fn begin_edit_subcategory(&self, subcategory: &Subcategory) -> SubcategoryDraft {
        self.open_form(FormKind::SubcategoryEdit(subcategory.id));
        SubcategoryDraft {
            name: subcategory.name.clone(),
            is_active: subcategory.is_active,
            sort_order: subcategory.sort_order,
        }
    }

    /// Closes whichever form is open. A submission already in flight for
    /// it will have its response discarded rather than applied.
    pub fn close_form(&self) {
        let mut st = self.state();
        st.form = None;
        st.epoch += 1;
    }

    /// The currently open form, if any.
    pub fn form(&self) -> Option<FormKind> {
        self.state().form
    }

    fn open_form(&self, kind: FormKind) {
        let mut st = self.state();
        // only one form is open at a time; opening replaces any other
        st.form = Some(kind);
        st.epoch += 1;
    }

    // ========================================================================
    // Submission
    // ========================================================================

    /// Validates the form and persists it: create (atomically with the
    /// staged subcategories) when `form.id` is absent, update otherwise.
    /// On success the list is reloaded and the form closes; on failure the
    /// form stays open with its contents untouched so nothing is lost.
    pub async fn submit_category(
        &self,
        form: &CategoryForm,
    ) -> Result<SubmitOutcome, TaxonomyError> {
        let fields = validate::category_fields(form)?;
        let staged = match form.id {
            None => validate::staged_for_submit(&form.staged)?,
            Some(_) => Vec::new(),
        };

        let epoch = self.begin_submit()?;
        let written = match form.id {
            None => self
                .repo
                .create_category_with_subcategories(&fields, &staged, &form.assets)
                .await
                .map(drop),
            Some(id) => self
                .repo
                .update_category(id, &fields, &form.assets)
                .await
                .map(drop),
        };
        self.complete_submit(epoch, written).await
    }

    /// Creates a subcategory under an existing category. `category_id` is
    /// required: without one there is nothing to attach the record to.
    pub async fn create_subcategory(
        &self,
        category_id: Option<i64>,
        draft: &SubcategoryDraft,
    ) -> Result<SubmitOutcome, TaxonomyError> {
        let category_id = category_id.ok_or(ValidationError::CategoryRequired)?;
        let fields = validate::subcategory_fields(draft)?;

        let epoch = self.begin_submit()?;
        let written = self
            .repo
            .create_subcategory(category_id, &fields)
            .await
            .map(drop);
        self.complete_submit(epoch, written).await
    }

    pub async fn edit_subcategory(
        &self,
        id: i64,
        draft: &SubcategoryDraft,
    ) -> Result<SubmitOutcome, TaxonomyError> {
        let fields = validate::subcategory_fields(draft)?;

        let epoch = self.begin_submit()?;
        let written = self.repo.update_subcategory(id, &fields).await.map(drop);
        self.complete_submit(epoch, written).await
    }

    fn begin_submit(&self) -> Result<u64, TaxonomyError> {
        let mut st = self.state();
        if st.submitting {
            return Err(TaxonomyError::SubmitInProgress);
        }
        st.submitting = true;
        Ok(st.epoch)
    }

    fn end_submit(&self) {
        self.state().submitting = false;
    }

    /// Routes a finished write: reload and close the form on success, keep
    /// the form open on failure. The submitting flag is cleared on every
    /// path, whatever the outcome.
    async fn complete_submit(
        &self,
        epoch: u64,
        written: Result<(), RepositoryError>,
    ) -> Result<SubmitOutcome, TaxonomyError> {
        match written {
            Ok(()) => self.finish_submit(epoch).await,
            Err(err) => {
                self.end_submit();
                log_rejection(&err);
                Err(err.into())
            }
        }
    }

    /// Reloads the authoritative list after a successful write, then
    /// applies it and closes the form. If the form was closed while either
    /// request was in flight, the result is dropped instead.
    async fn finish_submit(&self, epoch: u64) -> Result<SubmitOutcome, TaxonomyError> {
        if self.state().epoch != epoch {
            self.end_submit();
            tracing::debug!("form closed while the write was in flight, dropping result");
            return Ok(SubmitOutcome::Discarded);
        }

        let reloaded = self.repo.list_categories().await;

        let mut st = self.state();
        st.submitting = false;
        if st.epoch != epoch {
            tracing::debug!("form closed while the reload was in flight, dropping result");
            return Ok(SubmitOutcome::Discarded);
        }
        st.categories = Arc::new(reloaded?);
        st.form = None;
        st.epoch += 1;
        Ok(SubmitOutcome::Saved)
    }

    // ========================================================================
    // Row Actions
    // ========================================================================

    /// Deletes a category; the repository cascades to its subcategories.
    pub async fn delete_category(&self, id: i64) -> Result<(), TaxonomyError> {
        self.repo.delete_category(id).await?;
        self.refresh().await
    }

    pub async fn toggle_category_active(&self, id: i64) -> Result<(), TaxonomyError> {
        self.repo.toggle_category_active(id).await?;
        self.refresh().await
    }

    pub async fn delete_subcategory(&self, id: i64) -> Result<(), TaxonomyError> {
        self.repo.delete_subcategory(id).await?;
        self.refresh().await
    }

    pub async fn toggle_subcategory_active(&self, id: i64) -> Result<(), TaxonomyError> {
        self.repo.toggle_subcategory_active(id).await?;
        self.refresh().await
    }
}

fn keep_or_unset(url: &Option<String>) -> AssetInput {
    match url {
        Some(url) => AssetInput::Keep(url.clone()),
        None => AssetInput::Unset,
    }
}

/// Field-level server errors are diagnostics; the summary message is what
/// the user sees.
fn log_rejection(err: &RepositoryError) {
    if let RepositoryError::Rejected {
        message,
        field_errors,
    } = err
    {
        if !field_errors.is_empty() {
            tracing::warn!(
                message = %message,
                errors = ?field_errors,
                "backend rejected the payload"
            );
        }
    }
}
