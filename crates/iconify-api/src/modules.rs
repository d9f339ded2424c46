//! Transport modules and provider registration.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use iconify_core::{match_icon_name, IconSet, IconifyError, NameError};

use crate::config::ApiConfig;

/// Icons of one provider and prefix requested in one wire query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiQuery {
    pub provider: String,
    pub prefix: String,
    pub icons: Vec<String>,
}

impl ApiQuery {
    pub fn new(provider: impl Into<String>, prefix: impl Into<String>, icons: Vec<String>) -> Self {
        Self {
            provider: provider.into(),
            prefix: prefix.into(),
            icons,
        }
    }

    /// Path and query string of this request, relative to a host.
    pub fn path(&self, config: &ApiConfig) -> String {
        format!("{}{}.json?icons={}", config.path, self.prefix, self.icons.join(","))
    }

    /// Full URL of this request on `host`.
    pub fn url(&self, host: &str, config: &ApiConfig) -> String {
        format!("{host}{}", self.path(config))
    }
}

/// What a host answered.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResponse {
    /// Icon set data.
    Success(IconSet),
    /// This host failed, try the next one.
    Next,
    /// Stop trying. Every requested icon is missing.
    Abort,
}

/// Receives exactly one response for one send.
pub type Responder = Box<dyn FnOnce(QueryResponse)>;

/// The transport seam.
///
/// Hosts inject an implementation that talks to the network (fetch, JSONP,
/// a local bundle). The loader only needs [`send`](Self::send).
pub trait ApiModule {
    /// Split a batch of icons into wire queries.
    ///
    /// The default packs names so that each URL stays within
    /// `config.max_url`.
    fn prepare(&self, provider: &str, prefix: &str, icons: &[String], config: &ApiConfig) -> Vec<ApiQuery> {
        split_query(provider, prefix, icons, config)
    }

    /// Send `query` to `host`. `respond` may be called later, or never.
    fn send(&self, host: &str, query: &ApiQuery, respond: Responder);
}

/// Room left for icon names in a URL, or `None` when splitting is off.
fn max_names_length(prefix: &str, config: &ApiConfig) -> Option<usize> {
    if config.max_url == 0 {
        return None;
    }
    let longest_host = config.resources.iter().map(String::len).max().unwrap_or(0);
    let fixed = longest_host + config.path.len() + prefix.len() + ".json?icons=".len();
    Some(config.max_url.saturating_sub(fixed))
}

/// Pack icon names into queries whose URLs fit `config.max_url`.
///
/// Every query holds at least one name, so a single long name still goes
/// out on its own.
pub(crate) fn split_query(provider: &str, prefix: &str, icons: &[String], config: &ApiConfig) -> Vec<ApiQuery> {
    let Some(limit) = max_names_length(prefix, config) else {
        return vec![ApiQuery::new(provider, prefix, icons.to_vec())];
    };

    let mut queries = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut length = 0;
    for (index, name) in icons.iter().enumerate() {
        length += name.len() + 1;
        if length >= limit && index > 0 {
            queries.push(ApiQuery::new(provider, prefix, std::mem::take(&mut current)));
            length = name.len();
        }
        current.push(name.clone());
    }
    if !current.is_empty() {
        queries.push(ApiQuery::new(provider, prefix, current));
    }
    queries
}

/// API configurations and transport modules, keyed by provider.
///
/// The empty provider is the public Iconify API and is always configured.
#[derive(Clone)]
pub struct ApiProviders {
    configs: HashMap<String, Rc<RefCell<ApiConfig>>>,
    modules: HashMap<String, Rc<dyn ApiModule>>,
    default_module: Option<Rc<dyn ApiModule>>,
}

impl Default for ApiProviders {
    fn default() -> Self {
        let mut configs = HashMap::new();
        configs.insert(String::new(), Rc::new(RefCell::new(ApiConfig::default())));
        Self {
            configs,
            modules: HashMap::new(),
            default_module: None,
        }
    }
}

impl ApiProviders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the configuration of `provider`.
    pub fn add_provider(&mut self, provider: &str, config: ApiConfig) -> Result<(), IconifyError> {
        if !provider.is_empty() && !match_icon_name(provider) {
            return Err(NameError::InvalidCharacters {
                segment: "provider",
                value: provider.to_string(),
            }
            .into());
        }
        config.validate(provider)?;
        tracing::debug!(
            target: "iconify_api::modules",
            "Configured API provider '{}' with {} hosts",
            provider,
            config.resources.len()
        );
        self.configs
            .insert(provider.to_string(), Rc::new(RefCell::new(config)));
        Ok(())
    }

    pub fn config(&self, provider: &str) -> Option<Rc<RefCell<ApiConfig>>> {
        self.configs.get(provider).cloned()
    }

    /// Transport used by providers without their own module.
    pub fn set_default_module(&mut self, module: Rc<dyn ApiModule>) {
        self.default_module = Some(module);
    }

    pub fn set_module(&mut self, provider: &str, module: Rc<dyn ApiModule>) {
        self.modules.insert(provider.to_string(), module);
    }

    /// Transport for `provider`.
    pub fn module(&self, provider: &str) -> Option<Rc<dyn ApiModule>> {
        self.modules
            .get(provider)
            .or(self.default_module.as_ref())
            .cloned()
    }

    /// Configured provider names, sorted.
    pub fn providers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.configs.keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for ApiProviders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiProviders")
            .field("providers", &self.providers())
            .field("modules", &self.modules.len())
            .field("default_module", &self.default_module.is_some())
            .finish()
    }
}
