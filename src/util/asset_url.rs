//! Resolution of stored asset references to displayable URLs.

/// References passed through untouched: already-absolute URLs and
/// browser-local object/data URLs.
const PASSTHROUGH_PREFIXES: &[&str] = &["http://", "https://", "blob:", "data:"];

/// Resolves an asset reference to an absolute URL.
///
/// Absolute (`http…`), `blob:` and `data:` references are returned
/// unchanged; anything else is treated as a path relative to `base`.
///
/// # Examples
///
/// ```
/// use vitrine::util::resolve_asset_url;
///
/// assert_eq!(
///     resolve_asset_url("https://cdn.example.com", "icons/rings.png"),
///     "https://cdn.example.com/icons/rings.png"
/// );
/// assert_eq!(
///     resolve_asset_url("https://cdn.example.com", "https://other.example.com/a.png"),
///     "https://other.example.com/a.png"
/// );
/// ```
pub fn resolve_asset_url(base: &str, reference: &str) -> String {
    if PASSTHROUGH_PREFIXES
        .iter()
        .any(|prefix| reference.starts_with(prefix))
    {
        return reference.to_owned();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        reference.trim_start_matches('/')
    )
}
