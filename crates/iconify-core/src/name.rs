//! Icon name parsing.
//!
//! Names have the form `[@provider:]prefix:name`. Without a colon, a name
//! may either be a dash-joined `prefix-name` or, when simple names are
//! allowed, a bare `name` with an empty prefix.

use std::fmt;

use crate::errors::NameError;

/// A parsed icon identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IconName {
    pub provider: String,
    pub prefix: String,
    pub name: String,
}

impl IconName {
    pub fn new(
        provider: impl Into<String>,
        prefix: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            prefix: prefix.into(),
            name: name.into(),
        }
    }

    /// Parse and validate a name string.
    pub fn parse(value: &str, allow_simple_names: bool) -> Result<IconName, NameError> {
        let icon = split_icon_name(value, allow_simple_names)?;
        validate_icon_name(&icon, allow_simple_names)?;
        Ok(icon)
    }
}

impl fmt::Display for IconName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.provider.is_empty() {
            write!(f, "@{}:", self.provider)?;
        }
        if !self.prefix.is_empty() {
            write!(f, "{}:", self.prefix)?;
        }
        f.write_str(&self.name)
    }
}

/// Check a name segment against `^[a-z0-9]+(-[a-z0-9]+)*$`.
pub fn match_icon_name(value: &str) -> bool {
    !value.is_empty()
        && value
            .split('-')
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()))
}

/// Parse `raw` into an [`IconName`].
///
/// Returns `None` for malformed input, or for segments that fail
/// [`match_icon_name`] when `validate` is set.
pub fn string_to_icon(raw: &str, allow_simple_names: bool, validate: bool) -> Option<IconName> {
    let icon = split_icon_name(raw, allow_simple_names).ok()?;
    if validate && validate_icon_name(&icon, allow_simple_names).is_err() {
        return None;
    }
    Some(icon)
}

fn split_icon_name(value: &str, allow_simple_names: bool) -> Result<IconName, NameError> {
    if value.is_empty() {
        return Err(NameError::Empty);
    }

    let mut segments: Vec<&str> = value.split(':').collect();
    let mut provider = "";
    if let Some(first) = segments.first().copied().and_then(|s| s.strip_prefix('@')) {
        if segments.len() < 2 || segments.len() > 3 {
            return Err(NameError::TooManySegments {
                value: value.to_string(),
            });
        }
        provider = first;
        segments.remove(0);
    }

    match segments.as_slice() {
        [prefix, name] => Ok(IconName::new(provider, *prefix, *name)),
        [provider, prefix, name] => Ok(IconName::new(*provider, *prefix, *name)),
        [name] => {
            if allow_simple_names && provider.is_empty() {
                return Ok(IconName::new("", "", *name));
            }
            match name.split_once('-') {
                Some((prefix, rest)) => Ok(IconName::new(provider, prefix, rest)),
                None => Err(NameError::MissingPrefix {
                    value: value.to_string(),
                }),
            }
        }
        _ => Err(NameError::TooManySegments {
            value: value.to_string(),
        }),
    }
}

fn validate_icon_name(icon: &IconName, allow_simple_names: bool) -> Result<(), NameError> {
    if !icon.provider.is_empty() && !match_icon_name(&icon.provider) {
        return Err(NameError::InvalidCharacters {
            segment: "provider",
            value: icon.provider.clone(),
        });
    }
    let simple_prefix = allow_simple_names && icon.prefix.is_empty();
    if !simple_prefix && !match_icon_name(&icon.prefix) {
        return Err(NameError::InvalidCharacters {
            segment: "prefix",
            value: icon.prefix.clone(),
        });
    }
    if !match_icon_name(&icon.name) {
        return Err(NameError::InvalidCharacters {
            segment: "name",
            value: icon.name.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_icon_name() {
        assert!(match_icon_name("home"));
        assert!(match_icon_name("mdi-light"));
        assert!(match_icon_name("a1-b2-c3"));
        assert!(!match_icon_name(""));
        assert!(!match_icon_name("Home"));
        assert!(!match_icon_name("home-"));
        assert!(!match_icon_name("-home"));
        assert!(!match_icon_name("home--alt"));
        assert!(!match_icon_name("home_alt"));
    }

    #[test]
    fn test_parse_prefix_name() {
        let icon = string_to_icon("mdi-light:home", false, true).unwrap();
        assert_eq!(icon, IconName::new("", "mdi-light", "home"));
        assert_eq!(icon.to_string(), "mdi-light:home");
    }

    #[test]
    fn test_parse_provider() {
        let icon = string_to_icon("@my-api:mdi:home-outline", false, true).unwrap();
        assert_eq!(icon.provider, "my-api");
        assert_eq!(icon.prefix, "mdi");
        assert_eq!(icon.name, "home-outline");
        assert_eq!(icon.to_string(), "@my-api:mdi:home-outline");

        let dashed = string_to_icon("@my-api:mdi-home", false, true).unwrap();
        assert_eq!(dashed, IconName::new("my-api", "mdi", "home"));
        assert!(string_to_icon("@my-api:home", false, true).is_none());
        assert!(string_to_icon("@my-api", false, true).is_none());
        assert!(string_to_icon("@a:b:c:d", false, true).is_none());
    }

    #[test]
    fn test_parse_dash_form() {
        let icon = string_to_icon("mdi-home-outline", false, true).unwrap();
        assert_eq!(icon.prefix, "mdi");
        assert_eq!(icon.name, "home-outline");
        assert!(string_to_icon("home", false, true).is_none());
    }

    #[test]
    fn test_parse_simple_names() {
        let icon = string_to_icon("home-outline", true, true).unwrap();
        assert_eq!(icon, IconName::new("", "", "home-outline"));
        assert_eq!(icon.to_string(), "home-outline");
    }

    #[test]
    fn test_validation() {
        assert!(string_to_icon("mdi:Home", false, true).is_none());
        assert!(string_to_icon("mdi:Home", false, false).is_some());
        assert!(matches!(
            IconName::parse("MDI:home", false),
            Err(NameError::InvalidCharacters { segment: "prefix", .. })
        ));
        assert!(matches!(IconName::parse("", false), Err(NameError::Empty)));
    }
}
