//! Persistence boundary for the taxonomy.
//!
//! The manager only ever talks to [`TaxonomyRepository`]. The production
//! implementation is [`HttpRepository`]; tests swap in an in-memory double.

mod http;
mod wire;

pub use http::HttpRepository;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::taxonomy::{
    Category, CategoryAssets, CategoryFields, StagedSubcategory, Subcategory, SubcategoryFields,
};

/// A single field-level validation error returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Failures crossing the repository boundary.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Network-level failure (DNS, connection, TLS, body read).
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,
    /// Non-success HTTP status with no parseable response envelope.
    #[error("http error: status {0}")]
    HttpStatus(u16),
    /// The response body could not be interpreted.
    #[error("invalid response body: {0}")]
    InvalidBody(String),
    /// The base URL the repository was constructed with is unusable.
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
    /// The backend rejected the operation. `message` is what the user
    /// sees; `field_errors` carry per-field detail for diagnostics.
    #[error("{message}")]
    Rejected {
        message: String,
        field_errors: Vec<FieldError>,
    },
}

/// Durable CRUD for categories and subcategories.
///
/// `create_category_with_subcategories` is atomic: the category and all
/// supplied staged subcategories are persisted together or not at all.
/// `delete_category` cascades to the category's subcategories.
#[async_trait]
pub trait TaxonomyRepository: Send + Sync {
    /// Fetches all categories with their nested subcategories.
    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError>;

    /// Atomically persists a new category together with its staged
    /// subcategories and any selected asset files.
    async fn create_category_with_subcategories(
        &self,
        fields: &CategoryFields,
        staged: &[StagedSubcategory],
        assets: &CategoryAssets,
    ) -> Result<Category, RepositoryError>;

    async fn update_category(
        &self,
        id: i64,
        fields: &CategoryFields,
        assets: &CategoryAssets,
    ) -> Result<Category, RepositoryError>;

    async fn delete_category(&self, id: i64) -> Result<(), RepositoryError>;

    async fn toggle_category_active(&self, id: i64) -> Result<Category, RepositoryError>;

    async fn create_subcategory(
        &self,
        category_id: i64,
        fields: &SubcategoryFields,
    ) -> Result<Subcategory, RepositoryError>;

    async fn update_subcategory(
        &self,
        id: i64,
        fields: &SubcategoryFields,
    ) -> Result<Subcategory, RepositoryError>;

    async fn delete_subcategory(&self, id: i64) -> Result<(), RepositoryError>;

    async fn toggle_subcategory_active(&self, id: i64) -> Result<Subcategory, RepositoryError>;
}
