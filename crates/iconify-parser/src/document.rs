//! Icon set JSON documents.

use iconify_core::{IconSet, IconSetError};

/// Deserialize an icon set document.
///
/// Only the document shape is checked here; see [`validate_icon_set`].
pub fn parse_icon_set_json(source: &str) -> Result<IconSet, IconSetError> {
    serde_json::from_str(source).map_err(|e| IconSetError::Json(e.to_string()))
}

/// Check the parts of a document that make it unusable as a whole.
///
/// Problems with individual icons are not errors here; they are reported
/// per entry by [`crate::parse_icon_set`].
pub fn validate_icon_set(set: &IconSet) -> Result<(), IconSetError> {
    if set.prefix.is_empty() {
        return Err(IconSetError::MissingPrefix);
    }
    Ok(())
}
