use crate::CoreError;

/// Strip a leading `@` and surrounding whitespace from an Instagram handle,
/// then lowercase it. Instagram handles are case-insensitive.
#[must_use]
pub fn normalize_handle(raw: &str) -> String {
    raw.trim().trim_start_matches('@').trim().to_lowercase()
}

/// Normalize a handle and reject it if nothing is left.
///
/// # Errors
///
/// Returns [`CoreError::EmptyHandle`] if the handle is blank after normalization.
pub fn validate_handle(raw: &str) -> Result<String, CoreError> {
    let handle = normalize_handle(raw);
    if handle.is_empty() {
        return Err(CoreError::EmptyHandle);
    }
    Ok(handle)
}
