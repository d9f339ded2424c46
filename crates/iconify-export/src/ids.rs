//! Unique element IDs.
//!
//! An icon body may define elements with `id="..."` and reference them from
//! `href="#..."`, `url(#...)` or animation timing such as `begin="a.end"`.
//! Rendering the same icon twice on one page would produce duplicate IDs,
//! so every ID is rewritten to a fresh one before the body is used.

use std::collections::{HashMap, HashSet};
use std::sync::{LazyLock, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use regex::Regex;

/// `id="..."` attributes.
static ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"\sid="([^"\s]+)""#).unwrap());

/// Registry shared by [`replace_ids`] calls in this process.
static REGISTRY: OnceLock<Mutex<IdRegistry>> = OnceLock::new();

fn get_registry() -> &'static Mutex<IdRegistry> {
    REGISTRY.get_or_init(|| Mutex::new(IdRegistry::new()))
}

/// How replacement IDs are generated.
pub enum IdGenerator<'a> {
    /// The registry's own prefix followed by a counter.
    Default,
    /// `prefix` followed by a counter.
    Prefix(&'a str),
    /// Called with the index of each distinct ID in the body.
    Function(&'a mut dyn FnMut(usize) -> String),
}

/// Tracks every ID handed out so far.
#[derive(Debug)]
pub struct IdRegistry {
    prefix: String,
    counter: u64,
    issued: HashSet<String>,
}

impl Default for IdRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl IdRegistry {
    /// Registry with a time-based default prefix.
    pub fn new() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        Self::with_prefix(format!("IconifyId{millis:x}"))
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: 0,
            issued: HashSet::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Forget every issued ID and restart the counter.
    pub fn clear(&mut self) {
        self.counter = 0;
        self.issued.clear();
    }

    /// Next unused `prefix` + counter.
    fn next_prefixed(&mut self, prefix: &str) -> String {
        loop {
            let candidate = format!("{prefix}{}", self.counter);
            self.counter += 1;
            if self.issued.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    /// Claim `candidate`, or the first free `base`, `base1`, `base2`, ...
    /// where `base` is `candidate` without its numeric suffix.
    fn claim(&mut self, candidate: String) -> String {
        if self.issued.insert(candidate.clone()) {
            return candidate;
        }
        let trimmed = candidate.trim_end_matches(|c: char| c.is_ascii_digit());
        let base = if trimmed.is_empty() { candidate.as_str() } else { trimmed };

        if base != candidate && self.issued.insert(base.to_string()) {
            return base.to_string();
        }
        let mut index = 1u64;
        loop {
            let next = format!("{base}{index}");
            if self.issued.insert(next.clone()) {
                return next;
            }
            index += 1;
        }
    }
}

/// Replace every element ID in `body` using the process-wide registry.
pub fn replace_ids(body: &str, generator: IdGenerator<'_>) -> String {
    let mut registry = get_registry().lock();
    replace_ids_with(&mut registry, body, generator)
}

/// Reset the process-wide registry.
pub fn reset_ids() {
    get_registry().lock().clear();
}

/// Replace every element ID in `body`, tracking issued IDs in `registry`.
///
/// Each distinct ID gets one replacement that is used for every reference
/// to it. Only reference positions are rewritten: after `#`, `"` or `;`,
/// and followed by `"`, `)` or `.event`. Attribute names and text that
/// happen to equal an ID stay as they are.
pub fn replace_ids_with(registry: &mut IdRegistry, body: &str, generator: IdGenerator<'_>) -> String {
    let mut ids: Vec<&str> = Vec::new();
    for captures in ID_RE.captures_iter(body) {
        if let Some(id) = captures.get(1) {
            if !ids.contains(&id.as_str()) {
                ids.push(id.as_str());
            }
        }
    }
    if ids.is_empty() {
        return body.to_string();
    }

    let mut generator = generator;
    let mut replacements: HashMap<&str, String> = HashMap::with_capacity(ids.len());
    for (index, id) in ids.iter().enumerate() {
        let new_id = match &mut generator {
            IdGenerator::Default => {
                let prefix = registry.prefix.clone();
                registry.next_prefixed(&prefix)
            }
            IdGenerator::Prefix(prefix) => registry.next_prefixed(prefix),
            IdGenerator::Function(generate) => {
                let candidate = (*generate)(index);
                registry.claim(candidate)
            }
        };
        replacements.insert(*id, new_id);
    }

    tracing::trace!(
        target: "iconify_export::ids",
        "Replacing {} element IDs",
        replacements.len()
    );

    // Longest first, so "a1" is tried before "a".
    let mut by_length = ids;
    by_length.sort_by_key(|id| std::cmp::Reverse(id.len()));
    replace_tokens(body, &by_length, &replacements)
}

/// Characters that open an ID reference: `#id`, `"id"` and `;id` in
/// timing lists.
fn opens_reference(c: char) -> bool {
    matches!(c, '#' | '"' | ';')
}

/// Whether `tail` can follow an ID reference: `"`, `)` or `.` and a letter
/// as in `id.end`.
fn closes_reference(tail: &str) -> bool {
    let mut chars = tail.chars();
    match chars.next() {
        Some('"' | ')') => true,
        Some('.') => chars.next().is_some_and(|c| c.is_ascii_alphabetic()),
        _ => false,
    }
}

fn replace_tokens(body: &str, ids: &[&str], replacements: &HashMap<&str, String>) -> String {
    let mut result = String::with_capacity(body.len() + ids.len() * 8);
    let mut previous: Option<char> = None;
    let mut rest = body;

    while let Some(c) = rest.chars().next() {
        if previous.is_some_and(opens_reference) {
            let matched = ids
                .iter()
                .find(|id| rest.starts_with(**id) && closes_reference(&rest[id.len()..]));
            if let Some(id) = matched {
                if let Some(new_id) = replacements.get(id) {
                    result.push_str(new_id);
                    previous = id.chars().last();
                    rest = &rest[id.len()..];
                    continue;
                }
            }
        }
        result.push(c);
        previous = Some(c);
        rest = &rest[c.len_utf8()..];
    }
    result
}
