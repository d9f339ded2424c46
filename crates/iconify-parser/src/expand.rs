//! Expansion of an icon set into individual icons.

use std::collections::HashSet;

use iconify_core::{match_icon_name, normalize_with_defaults, IconData, IconSet, IconSetError};
use iconify_resolver::{AliasResolver, Resolution};

/// Result of [`parse_icon_set`].
#[derive(Debug, Default)]
pub struct ParseReport {
    /// Every name passed to the callback, in callback order.
    pub names: Vec<String>,
    /// Problems found while expanding the set.
    pub errors: Vec<IconSetError>,
}

impl ParseReport {
    /// Whether every icon and alias was expanded without error.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    fn emit(
        &mut self,
        on_icon: &mut dyn FnMut(&str, Option<&IconData>),
        name: &str,
        icon: Option<&IconData>,
    ) {
        on_icon(name, icon);
        self.names.push(name.to_string());
    }
}

/// Expand `set`, calling `on_icon` for each entry.
///
/// Names listed in `not_found` are reported first with `None`. Icons
/// follow in document order, then aliases; an alias is always reported
/// after the alias it is built on. Entries that cannot be resolved are
/// reported with `None` and recorded in the report.
///
/// A circular or over-deep alias chain stops the expansion. Icons already
/// passed to `on_icon` stay valid.
pub fn parse_icon_set(
    set: &IconSet,
    on_icon: &mut dyn FnMut(&str, Option<&IconData>),
) -> ParseReport {
    let mut report = ParseReport::default();

    for name in &set.not_found {
        report.emit(on_icon, name, None);
    }

    for (name, partial) in &set.icons {
        if !match_icon_name(name) {
            report.errors.push(IconSetError::InvalidName { name: name.clone() });
            report.emit(on_icon, name, None);
            continue;
        }
        match normalize_with_defaults(partial, &set.defaults) {
            Some(icon) => report.emit(on_icon, name, Some(&icon)),
            None => {
                report.errors.push(IconSetError::MissingBody { name: name.clone() });
                report.emit(on_icon, name, None);
            }
        }
    }

    let mut resolver = AliasResolver::new(set);
    let mut emitted: HashSet<String> = HashSet::new();

    for (name, alias) in &set.aliases {
        // Icons win over aliases with the same name.
        if set.icons.contains_key(name) {
            continue;
        }
        if !match_icon_name(name) {
            report.errors.push(IconSetError::InvalidName { name: name.clone() });
            report.emit(on_icon, name, None);
            continue;
        }

        let mut resolved = Vec::new();
        let result = resolver.resolve(name, &mut |alias_name, icon| {
            resolved.push((alias_name.to_string(), icon.clone()));
        });

        // Parents resolved on demand are reported before the alias itself.
        for (alias_name, icon) in resolved {
            if match_icon_name(&alias_name) && emitted.insert(alias_name.clone()) {
                report.emit(on_icon, &alias_name, Some(&icon));
            }
        }

        match result {
            Ok(Resolution::Resolved(_)) => {}
            Ok(Resolution::Unresolved) => {
                report.errors.push(IconSetError::MissingParent {
                    name: name.clone(),
                    parent: alias.parent.clone(),
                });
                report.emit(on_icon, name, None);
            }
            Err(err) => {
                tracing::warn!(
                    target: "iconify_parser::expand",
                    "Stopped expanding {}: {}",
                    set.prefix,
                    err
                );
                report.errors.push(err);
                return report;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_icon_set_json;

    fn collect(set: &IconSet) -> (ParseReport, Vec<(String, Option<IconData>)>) {
        let mut seen = Vec::new();
        let report = parse_icon_set(set, &mut |name, icon| {
            seen.push((name.to_string(), icon.cloned()));
        });
        (report, seen)
    }

    #[test]
    fn test_icons_then_aliases() {
        let set = parse_icon_set_json(
            r#"{
                "prefix": "test",
                "icons": {
                    "icon1": { "body": "<path d=\"M0 0\"/>", "width": 20, "height": 20 },
                    "icon2": { "body": "<g/>" }
                },
                "aliases": {
                    "alias1": { "parent": "icon1" }
                }
            }"#,
        )
        .unwrap();

        let (report, seen) = collect(&set);
        assert!(report.is_success());
        assert_eq!(report.names, vec!["icon1", "icon2", "alias1"]);

        let alias = seen[2].1.as_ref().unwrap();
        assert_eq!(alias.width, 20.0);
        assert_eq!(alias.height, 20.0);
        assert_eq!(alias.rotate, 0);
        assert!(!alias.h_flip);
        assert_eq!(Some(alias), seen[0].1.as_ref());
    }

    #[test]
    fn test_alias_declared_before_parent_alias() {
        let set = parse_icon_set_json(
            r#"{
                "prefix": "test",
                "icons": { "base": { "body": "<g/>" } },
                "aliases": {
                    "outer": { "parent": "inner", "hFlip": true },
                    "inner": { "parent": "base", "rotate": 1 }
                }
            }"#,
        )
        .unwrap();

        let (report, seen) = collect(&set);
        assert!(report.is_success());
        assert_eq!(report.names, vec!["base", "inner", "outer"]);
        let outer = seen[2].1.as_ref().unwrap();
        assert_eq!(outer.rotate, 1);
        assert!(outer.h_flip);
    }

    #[test]
    fn test_root_defaults_apply() {
        let set = parse_icon_set_json(
            r#"{
                "prefix": "test",
                "width": 24,
                "height": 24,
                "icons": {
                    "a": { "body": "<g/>" },
                    "b": { "body": "<g/>", "width": 48 }
                }
            }"#,
        )
        .unwrap();

        let (_, seen) = collect(&set);
        let a = seen[0].1.as_ref().unwrap();
        let b = seen[1].1.as_ref().unwrap();
        assert_eq!((a.width, a.height), (24.0, 24.0));
        assert_eq!((b.width, b.height), (48.0, 24.0));
    }

    #[test]
    fn test_bad_entries_do_not_stop_parsing() {
        let set = parse_icon_set_json(
            r#"{
                "prefix": "test",
                "icons": {
                    "Bad_Name": { "body": "<g/>" },
                    "no-body": { "width": 10 },
                    "good": { "body": "<g/>" }
                },
                "aliases": {
                    "orphan": { "parent": "nothing" },
                    "fine": { "parent": "good" }
                }
            }"#,
        )
        .unwrap();

        let (report, seen) = collect(&set);
        assert!(!report.is_success());
        assert_eq!(report.errors.len(), 3);
        assert_eq!(report.names, vec!["Bad_Name", "no-body", "good", "orphan", "fine"]);
        assert!(seen[0].1.is_none());
        assert!(seen[1].1.is_none());
        assert!(seen[2].1.is_some());
        assert!(seen[3].1.is_none());
        assert!(seen[4].1.is_some());
    }

    #[test]
    fn test_not_found_reported_first() {
        let set = parse_icon_set_json(
            r#"{"prefix":"test","icons":{"a":{"body":"<g/>"}},"not_found":["gone"]}"#,
        )
        .unwrap();

        let (report, seen) = collect(&set);
        assert!(report.is_success());
        assert_eq!(seen[0], ("gone".to_string(), None));
        assert_eq!(seen[1].0, "a");
    }

    #[test]
    fn test_cycle_aborts_but_keeps_emitted() {
        let set = parse_icon_set_json(
            r#"{
                "prefix": "test",
                "icons": { "a": { "body": "<g/>" } },
                "aliases": {
                    "ok": { "parent": "a" },
                    "x": { "parent": "y" },
                    "y": { "parent": "x" },
                    "after": { "parent": "a" }
                }
            }"#,
        )
        .unwrap();

        let (report, _) = collect(&set);
        assert!(!report.is_success());
        assert_eq!(report.names, vec!["a", "ok"]);
        assert!(matches!(
            report.errors.last(),
            Some(IconSetError::CircularAlias { .. })
        ));
    }

    #[test]
    fn test_icon_shadows_alias() {
        let set = parse_icon_set_json(
            r#"{
                "prefix": "test",
                "icons": { "a": { "body": "<g/>" } },
                "aliases": { "a": { "parent": "missing" } }
            }"#,
        )
        .unwrap();

        let (report, _) = collect(&set);
        assert!(report.is_success());
        assert_eq!(report.names, vec!["a"]);
    }
}
