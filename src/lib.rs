//! Core of a storefront administration console's catalog taxonomy: a
//! two-level category/subcategory hierarchy managed through CRUD calls
//! against the admin REST backend.
//!
//! The [`TaxonomyManager`] owns the in-memory view of all categories,
//! validates input, runs the staged-subcategory creation workflow (child
//! drafts composed before their parent exists, persisted atomically with
//! it), and talks to the backend through the [`TaxonomyRepository`]
//! boundary. [`HttpRepository`] is the production implementation of that
//! boundary; tests substitute an in-memory double.

pub mod config;
pub mod manager;
pub mod repository;
pub mod taxonomy;
pub mod util;

pub use config::Config;
pub use manager::{FormKind, SubmitOutcome, TaxonomyError, TaxonomyManager};
pub use repository::{FieldError, HttpRepository, RepositoryError, TaxonomyRepository};
pub use taxonomy::{
    AssetInput, AssetUpload, Category, CategoryAssets, CategoryForm, StagedSubcategory,
    Subcategory, SubcategoryDraft, ValidationError,
};
