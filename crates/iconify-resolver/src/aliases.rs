//! Alias chain resolution.
//!
//! Aliases are resolved on demand with memoization, so an alias may
//! reference another alias declared later in the same document. Each alias
//! is reported to the caller the first time it resolves, which guarantees
//! that a parent alias is always reported before the aliases built on it.

use std::collections::HashMap;

use iconify_core::{normalize_with_defaults, IconData, IconSet, IconSetError};

/// Maximum alias chain length before resolution gives up.
pub const MAX_ALIAS_DEPTH: usize = 100;

/// Outcome of resolving one name.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The name resolved to a complete icon.
    Resolved(IconData),
    /// The name is unknown, has no body, or its chain is broken.
    Unresolved,
}

/// Memoized state of one name.
#[derive(Debug, Clone)]
enum State {
    /// Currently on the resolution stack.
    InProgress,
    Resolved(IconData),
    Unresolved,
}

/// Resolves icons and alias chains of one icon set.
pub struct AliasResolver<'a> {
    set: &'a IconSet,
    states: HashMap<&'a str, State>,
    /// Names currently being resolved, outermost first.
    stack: Vec<&'a str>,
    max_depth: usize,
}

impl<'a> AliasResolver<'a> {
    pub fn new(set: &'a IconSet) -> Self {
        Self {
            set,
            states: HashMap::new(),
            stack: Vec::new(),
            max_depth: MAX_ALIAS_DEPTH,
        }
    }

    /// Override the maximum chain length.
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Resolve `name`, reporting every alias resolved along the way.
    ///
    /// `on_alias` is called once per alias, parents first. Cycles and chains
    /// deeper than the limit are returned as errors; a missing parent or
    /// body only makes the affected names [`Resolution::Unresolved`].
    pub fn resolve(
        &mut self,
        name: &str,
        on_alias: &mut dyn FnMut(&str, &IconData),
    ) -> Result<Resolution, IconSetError> {
        match self.key_of(name) {
            Some(key) => self.resolve_key(key, on_alias),
            None => Ok(Resolution::Unresolved),
        }
    }

    /// The set's own copy of `name`, so memoized keys borrow from the set.
    fn key_of(&self, name: &str) -> Option<&'a str> {
        let set = self.set;
        set.icons
            .get_key_value(name)
            .map(|(k, _)| k.as_str())
            .or_else(|| set.aliases.get_key_value(name).map(|(k, _)| k.as_str()))
    }

    fn resolve_key(
        &mut self,
        name: &'a str,
        on_alias: &mut dyn FnMut(&str, &IconData),
    ) -> Result<Resolution, IconSetError> {
        match self.states.get(name) {
            Some(State::Resolved(icon)) => return Ok(Resolution::Resolved(icon.clone())),
            Some(State::Unresolved) => return Ok(Resolution::Unresolved),
            Some(State::InProgress) => {
                let start = self.stack.iter().position(|n| *n == name).unwrap_or(0);
                let mut chain: Vec<String> =
                    self.stack[start..].iter().map(|n| n.to_string()).collect();
                chain.push(name.to_string());
                return Err(IconSetError::CircularAlias { chain });
            }
            None => {}
        }

        let set = self.set;

        // Icons win over aliases with the same name.
        if let Some(icon) = set.icons.get(name) {
            let state = match normalize_with_defaults(icon, &set.defaults) {
                Some(data) => State::Resolved(data),
                None => State::Unresolved,
            };
            return Ok(self.finish(name, state));
        }

        let Some(alias) = set.aliases.get(name) else {
            return Ok(Resolution::Unresolved);
        };

        if self.stack.len() >= self.max_depth {
            return Err(IconSetError::MaxDepthExceeded {
                name: name.to_string(),
                depth: self.max_depth,
            });
        }

        let Some(parent) = self.key_of(&alias.parent) else {
            tracing::debug!(
                target: "iconify_resolver::aliases",
                "Alias {} references unknown icon {}",
                name,
                alias.parent
            );
            return Ok(self.finish(name, State::Unresolved));
        };

        self.states.insert(name, State::InProgress);
        self.stack.push(name);
        let parent_result = self.resolve_key(parent, on_alias);
        self.stack.pop();

        let state = match parent_result {
            Ok(Resolution::Resolved(base)) => {
                let transform = base.transform().merge(alias.props.transform());
                let icon = IconData {
                    body: base.body,
                    left: alias.props.left.unwrap_or(base.left),
                    top: alias.props.top.unwrap_or(base.top),
                    width: alias.props.width.unwrap_or(base.width),
                    height: alias.props.height.unwrap_or(base.height),
                    rotate: transform.rotate,
                    h_flip: transform.h_flip,
                    v_flip: transform.v_flip,
                };
                on_alias(name, &icon);
                State::Resolved(icon)
            }
            Ok(Resolution::Unresolved) => State::Unresolved,
            Err(err) => {
                self.states.remove(name);
                return Err(err);
            }
        };

        Ok(self.finish(name, state))
    }

    fn finish(&mut self, name: &'a str, state: State) -> Resolution {
        let result = match &state {
            State::Resolved(icon) => Resolution::Resolved(icon.clone()),
            _ => Resolution::Unresolved,
        };
        self.states.insert(name, state);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iconify_core::{AliasDefinition, IconProps, PartialIcon};

    fn sample_set() -> IconSet {
        IconSet::new("test")
            .with_icon("icon1", PartialIcon::new("<path d=\"M0 0\"/>").with_size(20.0, 20.0))
            .with_icon("icon2", PartialIcon::new("<g/>"))
    }

    fn resolve_all(set: &IconSet, name: &str) -> (Result<Resolution, IconSetError>, Vec<String>) {
        let mut order = Vec::new();
        let mut resolver = AliasResolver::new(set);
        let result = resolver.resolve(name, &mut |n, _| order.push(n.to_string()));
        (result, order)
    }

    #[test]
    fn test_simple_alias() {
        let set = sample_set().with_alias("alias1", AliasDefinition::new("icon1"));
        let (result, _) = resolve_all(&set, "alias1");
        let Ok(Resolution::Resolved(icon)) = result else {
            panic!("Expected resolved alias");
        };
        assert_eq!(icon.width, 20.0);
        assert_eq!(icon.height, 20.0);
        assert_eq!(icon.rotate, 0);
        assert!(!icon.h_flip);
    }

    #[test]
    fn test_transform_composition() {
        let set = sample_set()
            .with_alias(
                "a",
                AliasDefinition::new("icon1").with_props(IconProps {
                    rotate: Some(3),
                    h_flip: Some(true),
                    ..Default::default()
                }),
            )
            .with_alias(
                "b",
                AliasDefinition::new("a").with_props(IconProps {
                    rotate: Some(2),
                    h_flip: Some(true),
                    v_flip: Some(true),
                    ..Default::default()
                }),
            );
        let (result, order) = resolve_all(&set, "b");
        let Ok(Resolution::Resolved(icon)) = result else {
            panic!("Expected resolved alias");
        };
        assert_eq!(icon.rotate, 1);
        assert!(!icon.h_flip);
        assert!(icon.v_flip);
        assert_eq!(order, vec!["a", "b"]);
    }

    #[test]
    fn test_nearest_dimension_wins() {
        let set = sample_set()
            .with_alias(
                "wide",
                AliasDefinition::new("icon1").with_props(IconProps {
                    width: Some(30.0),
                    ..Default::default()
                }),
            )
            .with_alias(
                "wider",
                AliasDefinition::new("wide").with_props(IconProps {
                    height: Some(10.0),
                    ..Default::default()
                }),
            );
        let (result, _) = resolve_all(&set, "wider");
        let Ok(Resolution::Resolved(icon)) = result else {
            panic!("Expected resolved alias");
        };
        assert_eq!(icon.width, 30.0);
        assert_eq!(icon.height, 10.0);
    }

    #[test]
    fn test_forward_reference() {
        let set = sample_set()
            .with_alias("first", AliasDefinition::new("second"))
            .with_alias("second", AliasDefinition::new("icon2"));
        let (result, order) = resolve_all(&set, "first");
        assert!(matches!(result, Ok(Resolution::Resolved(_))));
        assert_eq!(order, vec!["second", "first"]);
    }

    #[test]
    fn test_missing_parent() {
        let set = sample_set().with_alias("broken", AliasDefinition::new("nope"));
        let (result, order) = resolve_all(&set, "broken");
        assert!(matches!(result, Ok(Resolution::Unresolved)));
        assert!(order.is_empty());
    }

    #[test]
    fn test_cycle_detected() {
        let set = sample_set()
            .with_alias("x", AliasDefinition::new("y"))
            .with_alias("y", AliasDefinition::new("z"))
            .with_alias("z", AliasDefinition::new("x"));
        let (result, _) = resolve_all(&set, "x");
        match result {
            Err(IconSetError::CircularAlias { chain }) => {
                assert_eq!(chain, vec!["x", "y", "z", "x"]);
            }
            other => panic!("Expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_self_reference() {
        let set = sample_set().with_alias("me", AliasDefinition::new("me"));
        let (result, _) = resolve_all(&set, "me");
        assert!(matches!(result, Err(IconSetError::CircularAlias { .. })));
    }

    #[test]
    fn test_max_depth() {
        let mut set = sample_set();
        for i in 0..10 {
            let parent = if i == 0 { "icon1".to_string() } else { format!("a{}", i - 1) };
            set.aliases.insert(format!("a{i}"), AliasDefinition::new(parent));
        }
        let mut resolver = AliasResolver::new(&set).with_max_depth(5);
        let result = resolver.resolve("a9", &mut |_, _| {});
        assert!(matches!(result, Err(IconSetError::MaxDepthExceeded { .. })));
    }

    #[test]
    fn test_root_defaults() {
        let set = IconSet::new("test")
            .with_defaults(IconProps {
                width: Some(24.0),
                height: Some(24.0),
                ..Default::default()
            })
            .with_icon("a", PartialIcon::new("<g/>"))
            .with_icon("b", PartialIcon::new("<g/>").with_size(32.0, 16.0));
        assert_eq!(crate::get_icon_data(&set, "a").unwrap().width, 24.0);
        assert_eq!(crate::get_icon_data(&set, "b").unwrap().height, 16.0);
        assert!(crate::get_icon_data(&set, "c").is_none());
    }
}
