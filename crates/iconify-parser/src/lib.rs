//! Parser for Iconify icon set documents.
//!
//! This crate reads icon set JSON into [`IconSet`] and expands a document
//! into individual normalized icons, resolving aliases along the way.

mod document;
mod expand;

pub use document::{parse_icon_set_json, validate_icon_set};
pub use expand::{parse_icon_set, ParseReport};

use iconify_core::{IconSet, IconSetError};

/// Parse and validate an icon set document from JSON text.
///
/// # Example
///
/// ```ignore
/// use iconify_parser::parse_document;
///
/// let set = parse_document(r#"{
///     "prefix": "mdi",
///     "icons": { "home": { "body": "<path d=\"M10 20v-6h4v6\"/>" } },
///     "width": 24,
///     "height": 24
/// }"#)?;
/// ```
pub fn parse_document(source: &str) -> Result<IconSet, IconSetError> {
    let set = parse_icon_set_json(source)?;
    validate_icon_set(&set)?;
    Ok(set)
}
