//! HTTP implementation of the taxonomy repository.
//!
//! Create and update requests are multipart: scalar fields and the staged
//! subcategory JSON travel as text parts, selected asset files as file
//! parts. All other operations are plain JSON.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::Config;
use crate::taxonomy::{
    AssetInput, AssetUpload, Category, CategoryAssets, CategoryFields, StagedSubcategory,
    Subcategory, SubcategoryFields,
};

use super::wire::parse_envelope;
use super::{RepositoryError, TaxonomyRepository};

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Taxonomy repository backed by the storefront admin REST API.
pub struct HttpRepository {
    client: reqwest::Client,
    /// Normalized base URL, no trailing slash.
    base_url: String,
    timeout: Duration,
    token: Option<SecretString>,
}

impl HttpRepository {
    /// Creates a repository against `base_url`. The scheme must be http
    /// or https.
    pub fn new(base_url: &str) -> Result<Self, RepositoryError> {
        let parsed =
            Url::parse(base_url).map_err(|e| RepositoryError::InvalidBaseUrl(e.to_string()))?;
        match parsed.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(RepositoryError::InvalidBaseUrl(format!(
                    "unsupported scheme: {scheme}"
                )))
            }
        }
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            timeout: DEFAULT_TIMEOUT,
            token: None,
        })
    }

    /// Builds a repository from loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self, RepositoryError> {
        let mut repo = Self::new(&config.api_base_url)?;
        repo.timeout = Duration::from_secs(config.request_timeout_secs);
        repo.token = config.admin_token.clone().map(SecretString::from);
        Ok(repo)
    }

    /// Replaces the HTTP client (custom redirect policy, proxy, etc.).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the bearer token attached to every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretString::from(token.into()));
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Sends a request, enforcing the timeout and parsing the response
    /// envelope. Operations that return a payload go through [`Self::fetch`].
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Option<T>, RepositoryError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        };
        let response = tokio::time::timeout(self.timeout, request.send())
            .await
            .map_err(|_| RepositoryError::Timeout)?
            .map_err(RepositoryError::Network)?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "non-success response from admin api");
        }
        let body = response.bytes().await.map_err(RepositoryError::Network)?;
        parse_envelope::<T>(status, &body)?.into_result()
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, RepositoryError> {
        self.send::<T>(request)
            .await?
            .ok_or_else(|| RepositoryError::InvalidBody("missing data payload".to_owned()))
    }

    async fn expect_ok(&self, request: reqwest::RequestBuilder) -> Result<(), RepositoryError> {
        self.send::<serde_json::Value>(request).await.map(drop)
    }
}

// ============================================================================
// Multipart Assembly
// ============================================================================

fn scalar_parts(fields: &CategoryFields) -> Form {
    let mut form = Form::new()
        .text("title", fields.title.clone())
        .text("isActive", fields.is_active.to_string())
        .text("sortOrder", fields.sort_order.to_string());
    if let Some(link) = &fields.link {
        form = form.text("link", link.clone());
    }
    form
}

fn file_part(upload: &AssetUpload) -> Result<Part, RepositoryError> {
    let part = Part::bytes(upload.bytes.clone())
        .file_name(upload.file_name.clone())
        .mime_str(&upload.content_type)?;
    Ok(part)
}

/// Attaches one asset slot to the form: a file part for a new upload, the
/// existing URL as a text field when the slot is untouched (so the backend
/// never reads omission as a clear), nothing when the slot is empty.
fn asset_part(
    mut form: Form,
    field: &'static str,
    input: &AssetInput,
) -> Result<Form, RepositoryError> {
    match input {
        AssetInput::Unset => {}
        AssetInput::Keep(url) => form = form.text(field, url.clone()),
        AssetInput::Replace(upload) => form = form.part(field, file_part(upload)?),
    }
    Ok(form)
}

fn asset_parts(mut form: Form, assets: &CategoryAssets) -> Result<Form, RepositoryError> {
    form = asset_part(form, "icon", &assets.icon)?;
    form = asset_part(form, "image", &assets.image)?;
    form = asset_part(form, "desktopBreadcrumb", &assets.desktop_breadcrumb)?;
    form = asset_part(form, "mobileBreadcrumb", &assets.mobile_breadcrumb)?;
    Ok(form)
}

#[async_trait]
impl TaxonomyRepository for HttpRepository {
    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        self.fetch(self.client.get(self.endpoint("/api/categories")))
            .await
    }

    async fn create_category_with_subcategories(
        &self,
        fields: &CategoryFields,
        staged: &[StagedSubcategory],
        assets: &CategoryAssets,
    ) -> Result<Category, RepositoryError> {
        let staged_json = serde_json::to_string(staged)
            .map_err(|e| RepositoryError::InvalidBody(e.to_string()))?;
        let mut form = scalar_parts(fields).text("subCategories", staged_json);
        form = asset_parts(form, assets)?;
        self.fetch(
            self.client
                .post(self.endpoint("/api/categories"))
                .multipart(form),
        )
        .await
    }

    async fn update_category(
        &self,
        id: i64,
        fields: &CategoryFields,
        assets: &CategoryAssets,
    ) -> Result<Category, RepositoryError> {
        let form = asset_parts(scalar_parts(fields), assets)?;
        self.fetch(
            self.client
                .put(self.endpoint(&format!("/api/categories/{id}")))
                .multipart(form),
        )
        .await
    }

    async fn delete_category(&self, id: i64) -> Result<(), RepositoryError> {
        self.expect_ok(
            self.client
                .delete(self.endpoint(&format!("/api/categories/{id}"))),
        )
        .await
    }

    async fn toggle_category_active(&self, id: i64) -> Result<Category, RepositoryError> {
        self.fetch(
            self.client
                .patch(self.endpoint(&format!("/api/categories/{id}/toggle"))),
        )
        .await
    }

    async fn create_subcategory(
        &self,
        category_id: i64,
        fields: &SubcategoryFields,
    ) -> Result<Subcategory, RepositoryError> {
        self.fetch(
            self.client
                .post(self.endpoint(&format!("/api/categories/{category_id}/subcategories")))
                .json(fields),
        )
        .await
    }

    async fn update_subcategory(
        &self,
        id: i64,
        fields: &SubcategoryFields,
    ) -> Result<Subcategory, RepositoryError> {
        self.fetch(
            self.client
                .put(self.endpoint(&format!("/api/subcategories/{id}")))
                .json(fields),
        )
        .await
    }

    async fn delete_subcategory(&self, id: i64) -> Result<(), RepositoryError> {
        self.expect_ok(
            self.client
                .delete(self.endpoint(&format!("/api/subcategories/{id}"))),
        )
        .await
    }

    async fn toggle_subcategory_active(&self, id: i64) -> Result<Subcategory, RepositoryError> {
        self.fetch(
            self.client
                .patch(self.endpoint(&format!("/api/subcategories/{id}/toggle"))),
        )
        .await
    }
}
