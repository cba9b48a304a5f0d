//! Pre-submission validation.
//!
//! Every failure here blocks the repository call entirely. The caller
//! surfaces the error and leaves the form open, so nothing the user typed
//! is lost.

use thiserror::Error;

use super::types::{
    CategoryFields, CategoryForm, StagedSubcategory, SubcategoryDraft, SubcategoryFields,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Title is missing or whitespace-only.
    #[error("title required")]
    TitleRequired,
    /// A link was supplied but does not start with `/`.
    #[error("invalid link: must start with '/'")]
    InvalidLink,
    /// A filled-in subcategory row trims down to nothing.
    #[error("subcategory name required")]
    SubcategoryNameRequired,
    /// Subcategory creation with no owning category to attach to.
    #[error("category required")]
    CategoryRequired,
}

/// Validates and normalizes the scalar category fields.
///
/// The title must survive trimming; an empty link means "no link" while a
/// present one must be a `/`-prefixed relative path.
pub fn category_fields(form: &CategoryForm) -> Result<CategoryFields, ValidationError> {
    let title = form.title.trim();
    if title.is_empty() {
        return Err(ValidationError::TitleRequired);
    }

    let link = form.link.trim();
    let link = if link.is_empty() {
        None
    } else if link.starts_with('/') {
        Some(link.to_owned())
    } else {
        return Err(ValidationError::InvalidLink);
    };

    Ok(CategoryFields {
        title: title.to_owned(),
        link,
        is_active: form.is_active,
        sort_order: form.sort_order,
    })
}

/// Filters staged rows down to the entries that should be persisted.
///
/// Untouched placeholder rows (raw empty name) are dropped silently. A row
/// that looks filled in but trims down to nothing is an error: whitespace
/// must not slip through as a real subcategory name.
pub fn staged_for_submit(
    rows: &[StagedSubcategory],
) -> Result<Vec<StagedSubcategory>, ValidationError> {
    let mut kept = Vec::with_capacity(rows.len());
    for row in rows {
        if row.name.is_empty() {
            continue;
        }
        let name = row.name.trim();
        if name.is_empty() {
            return Err(ValidationError::SubcategoryNameRequired);
        }
        kept.push(StagedSubcategory {
            name: name.to_owned(),
            is_active: row.is_active,
            sort_order: row.sort_order,
        });
    }
    Ok(kept)
}

/// Validates and normalizes subcategory fields for create and edit.
pub fn subcategory_fields(draft: &SubcategoryDraft) -> Result<SubcategoryFields, ValidationError> {
    let name = draft.name.trim();
    if name.is_empty() {
        return Err(ValidationError::SubcategoryNameRequired);
    }
    Ok(SubcategoryFields {
        name: name.to_owned(),
        is_active: draft.is_active,
        sort_order: draft.sort_order,
    })
}
