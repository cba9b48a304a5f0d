use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Persisted Entities
// ============================================================================

/// Top-level taxonomy node in the catalog hierarchy.
///
/// Categories own their subcategories (deleting a category cascades to
/// them, per the repository contract) and carry up to four asset
/// references resolved against the asset base URL for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub title: String,
    /// Relative storefront path. Always `/`-prefixed when present.
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub desktop_breadcrumb_url: Option<String>,
    #[serde(default)]
    pub mobile_breadcrumb_url: Option<String>,
    pub is_active: bool,
    pub sort_order: u32,
    /// Owned children, in the backend's order.
    #[serde(default)]
    pub subcategories: Vec<Subcategory>,
    pub created_at: DateTime<Utc>,
}

/// Child taxonomy node owned by exactly one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subcategory {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub is_active: bool,
    pub sort_order: u32,
}

/// An unpersisted subcategory draft composed while its parent category is
/// being created. Promoted to a real [`Subcategory`] by the repository's
/// atomic create call.
///
/// Deliberately has no `id` or `category_id` field: a staged entry cannot
/// be mistaken for a persisted record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagedSubcategory {
    pub name: String,
    pub is_active: bool,
    pub sort_order: u32,
}

// ============================================================================
// Asset Inputs
// ============================================================================

/// One file selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Per-slot intent for a category asset.
///
/// `Keep` re-sends the persisted URL unchanged, so the backend never reads
/// an untouched slot as a request to clear it. There is no clear variant:
/// the contract has no way to remove an asset once set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AssetInput {
    /// The slot is empty and stays empty.
    #[default]
    Unset,
    /// Pass the existing persisted URL through unchanged.
    Keep(String),
    /// Upload a newly selected file into the slot.
    Replace(AssetUpload),
}

/// The four asset slots a category carries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CategoryAssets {
    pub icon: AssetInput,
    pub image: AssetInput,
    pub desktop_breadcrumb: AssetInput,
    pub mobile_breadcrumb: AssetInput,
}

// ============================================================================
// Form Buffers
// ============================================================================

/// Host-editable buffer backing the category create/edit form.
///
/// `id` selects the submit branch: absent creates the category (atomically
/// with the staged subcategories), present updates an existing one.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryForm {
    pub id: Option<i64>,
    pub title: String,
    /// Raw link input. Validated (must start with `/`) at submit.
    pub link: String,
    pub is_active: bool,
    pub sort_order: u32,
    pub assets: CategoryAssets,
    /// Subcategories staged for an in-progress creation. Ignored on edit:
    /// existing subcategories go through the independent subcategory path.
    pub staged: Vec<StagedSubcategory>,
    /// Input buffer for the trailing blank subcategory row in the editor.
    pub next_subcategory: String,
}

impl Default for CategoryForm {
    fn default() -> Self {
        Self {
            id: None,
            title: String::new(),
            link: String::new(),
            is_active: true,
            sort_order: 0,
            assets: CategoryAssets::default(),
            staged: Vec::new(),
            next_subcategory: String::new(),
        }
    }
}

impl CategoryForm {
    /// Appends a staged subcategory. Empty-after-trim names are a no-op.
    /// Sort orders are assigned sequentially from 1 in insertion order.
    pub fn add_staged_subcategory(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        let sort_order = self.staged.len() as u32 + 1;
        self.staged.push(StagedSubcategory {
            name: name.to_owned(),
            is_active: true,
            sort_order,
        });
    }

    /// Removes the staged entry at `index`; out-of-range indices are
    /// ignored. Remaining entries keep their sort orders unchanged.
    pub fn remove_staged_subcategory(&mut self, index: usize) {
        if index < self.staged.len() {
            self.staged.remove(index);
        }
    }
}

/// Host-editable buffer backing the subcategory create/edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubcategoryDraft {
    pub name: String,
    pub is_active: bool,
    pub sort_order: u32,
}

impl Default for SubcategoryDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            is_active: true,
            sort_order: 0,
        }
    }
}

// ============================================================================
// Validated Fields
// ============================================================================

/// Category scalar fields after validation: trimmed title, normalized
/// link. Produced by [`validate::category_fields`](super::validate::category_fields)
/// and consumed by the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryFields {
    pub title: String,
    pub link: Option<String>,
    pub is_active: bool,
    pub sort_order: u32,
}

/// Subcategory scalar fields after validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubcategoryFields {
    pub name: String,
    pub is_active: bool,
    pub sort_order: u32,
}
