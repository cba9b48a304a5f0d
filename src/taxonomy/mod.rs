//! Two-level taxonomy model and its pre-submission validation rules.

pub mod types;
pub mod validate;

pub use types::{
    AssetInput, AssetUpload, Category, CategoryAssets, CategoryFields, CategoryForm,
    StagedSubcategory, Subcategory, SubcategoryDraft, SubcategoryFields,
};
pub use validate::ValidationError;
