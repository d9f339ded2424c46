//! API provider configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use iconify_core::{ApiError, IconifyError};

/// Hosts of the public Iconify API.
pub const DEFAULT_API_HOSTS: &[&str] = &[
    "https://api.iconify.design",
    "https://api.simplesvg.com",
    "https://api.unisvg.com",
];

/// Configuration of one API provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiConfig {
    /// Hosts, tried in rotation.
    pub resources: Vec<String>,
    /// Path prepended to `{prefix}.json`.
    pub path: String,
    /// Longest URL a query may produce. `0` disables splitting.
    #[serde(rename = "maxURL")]
    pub max_url: usize,
    /// Milliseconds before the next host is tried.
    pub rotate: u64,
    /// Milliseconds to wait after the last host before giving up.
    pub timeout: u64,
    /// Host tried first. Updated when another host answers.
    pub index: usize,
    /// Start from a random host instead of `index`.
    pub random: bool,
    /// Accept data that arrives after the query failed.
    pub data_after_timeout: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            resources: DEFAULT_API_HOSTS.iter().map(|h| h.to_string()).collect(),
            path: "/".to_string(),
            max_url: 500,
            rotate: 750,
            timeout: 5000,
            index: 0,
            random: false,
            data_after_timeout: false,
        }
    }
}

impl ApiConfig {
    /// Default settings with custom hosts.
    pub fn with_resources<I, S>(resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            resources: resources.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Parse a configuration from JSON, filling unset fields with defaults.
    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    #[must_use]
    pub fn with_max_url(mut self, max_url: usize) -> Self {
        self.max_url = max_url;
        self
    }

    #[must_use]
    pub fn with_rotate(mut self, rotate: Duration) -> Self {
        self.rotate = rotate.as_millis() as u64;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout.as_millis() as u64;
        self
    }

    #[must_use]
    pub fn with_random(mut self, random: bool) -> Self {
        self.random = random;
        self
    }

    #[must_use]
    pub fn with_data_after_timeout(mut self, enabled: bool) -> Self {
        self.data_after_timeout = enabled;
        self
    }

    pub fn rotate_interval(&self) -> Duration {
        Duration::from_millis(self.rotate)
    }

    pub fn timeout_interval(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }

    /// Check that the configuration can be used by `provider`.
    pub fn validate(&self, provider: &str) -> Result<(), IconifyError> {
        if self.resources.is_empty() {
            return Err(ApiError::NoResources {
                provider: provider.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.resources.len(), 3);
        assert_eq!(config.resources[0], "https://api.iconify.design");
        assert_eq!(config.path, "/");
        assert_eq!(config.max_url, 500);
        assert_eq!(config.rotate_interval(), Duration::from_millis(750));
        assert_eq!(config.timeout_interval(), Duration::from_secs(5));
        assert!(!config.data_after_timeout);
    }

    #[test]
    fn test_from_json() {
        let config = ApiConfig::from_json(
            r#"{"resources":["https://icons.example.com"],"maxURL":800,"dataAfterTimeout":true}"#,
        )
        .unwrap();
        assert_eq!(config.resources, vec!["https://icons.example.com"]);
        assert_eq!(config.max_url, 800);
        assert!(config.data_after_timeout);
        assert_eq!(config.rotate, 750);
    }

    #[test]
    fn test_validate() {
        assert!(ApiConfig::default().validate("").is_ok());
        let empty = ApiConfig::with_resources(Vec::<String>::new());
        assert!(matches!(
            empty.validate("custom"),
            Err(IconifyError::Api(ApiError::NoResources { .. }))
        ));
    }
}
