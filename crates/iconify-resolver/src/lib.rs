//! Alias resolution for Iconify icon sets.
//!
//! This crate resolves:
//! - Alias chains (alias -> alias -> icon) into complete icon records
//! - Transformation composition along a chain
//! - Circular and over-deep chains

mod aliases;

pub use aliases::{AliasResolver, Resolution, MAX_ALIAS_DEPTH};

use iconify_core::{IconData, IconSet};

/// Resolve a single icon or alias from an icon set.
///
/// Returns `None` when the name is unknown, broken or part of a cycle.
pub fn get_icon_data(set: &IconSet, name: &str) -> Option<IconData> {
    let mut resolver = AliasResolver::new(set);
    match resolver.resolve(name, &mut |_, _| {}) {
        Ok(Resolution::Resolved(icon)) => Some(icon),
        _ => None,
    }
}
