//! CSS rules for icon utility classes.
//!
//! Each icon becomes a rule set embedding the icon as an SVG data URL,
//! either as a mask painted with `currentColor` or as a background image
//! keeping the icon's own colors.

use indexmap::IndexMap;

use iconify_core::{Customisations, IconData, IconSet, IconSize};
use iconify_resolver::get_icon_data;

use crate::size::{calculate_size, SizeOptions};
use crate::svg::{build_icon, icon_to_html};
use crate::url::svg_to_url;

/// How icons are painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CssMode {
    /// `mask-image` over `background-color: currentColor`. For monotone icons.
    Mask,
    /// `background-image`. For icons with their own palette.
    Background,
}

/// Output format of [`get_icons_css`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CssFormat {
    #[default]
    Expanded,
    Compact,
    Compressed,
}

/// Options for CSS generation.
///
/// Selectors may contain `{prefix}` and `{name}` placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct CssOptions {
    /// Painting mode. Detected from the icon set when unset.
    pub mode: Option<CssMode>,
    /// Replaces `currentColor` in icon bodies.
    pub color: Option<String>,
    /// Skip the `width` rule for non-square icons.
    pub force_square: bool,
    /// CSS variable holding the data URL. Defaults to `svg` in mask mode.
    pub var_name: Option<String>,
    pub icon_selector: String,
    pub common_selector: String,
    /// Used instead of `icon_selector` when an icon overrides a common rule.
    pub override_selector: Option<String>,
    pub format: CssFormat,
}

impl Default for CssOptions {
    fn default() -> Self {
        Self {
            mode: None,
            color: None,
            force_square: false,
            var_name: None,
            icon_selector: ".icon--{prefix}--{name}".to_string(),
            common_selector: ".icon--{prefix}".to_string(),
            override_selector: None,
            format: CssFormat::Expanded,
        }
    }
}

impl CssOptions {
    #[must_use]
    pub fn with_mode(mut self, mode: CssMode) -> Self {
        self.mode = Some(mode);
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    #[must_use]
    pub fn with_force_square(mut self, force_square: bool) -> Self {
        self.force_square = force_square;
        self
    }

    #[must_use]
    pub fn with_var_name(mut self, var_name: impl Into<String>) -> Self {
        self.var_name = Some(var_name.into());
        self
    }

    #[must_use]
    pub fn with_selectors(
        mut self,
        common_selector: impl Into<String>,
        icon_selector: impl Into<String>,
    ) -> Self {
        self.common_selector = common_selector.into();
        self.icon_selector = icon_selector.into();
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: CssFormat) -> Self {
        self.format = format;
        self
    }

    fn override_selector(&self) -> String {
        self.override_selector
            .clone()
            .unwrap_or_else(|| format!("{}{}", self.common_selector, self.icon_selector))
    }
}

/// One selector with its declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct CssRuleSet {
    pub selector: String,
    pub rules: IndexMap<String, String>,
}

/// Result of [`get_icons_css_data`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IconsCssData {
    /// Rules shared by every icon.
    pub common: Option<CssRuleSet>,
    /// One entry per icon found.
    pub css: Vec<CssRuleSet>,
    /// CSS comments for icons that could not be found.
    pub errors: Vec<String>,
}

fn resolve_mode(set: &IconSet, options: &CssOptions) -> CssMode {
    if let Some(mode) = options.mode {
        return mode;
    }
    // A custom color only shows up in background mode.
    let palette = if options.color.is_some() {
        Some(true)
    } else {
        set.info.as_ref().and_then(|info| info.palette)
    };
    match palette {
        Some(true) => CssMode::Background,
        _ => CssMode::Mask,
    }
}

fn resolve_var_name(mode: CssMode, options: &CssOptions) -> Option<String> {
    match (&options.var_name, mode) {
        (Some(name), _) if name.is_empty() => None,
        (Some(name), _) => Some(name.clone()),
        (None, CssMode::Mask) => Some("svg".to_string()),
        (None, CssMode::Background) => None,
    }
}

fn insert(rules: &mut IndexMap<String, String>, key: &str, value: impl Into<String>) {
    rules.insert(key.to_string(), value.into());
}

fn common_rules(mode: CssMode, var_name: Option<&str>) -> IndexMap<String, String> {
    let mut rules = IndexMap::new();
    insert(&mut rules, "display", "inline-block");
    insert(&mut rules, "width", "1em");
    insert(&mut rules, "height", "1em");
    let var = var_name.map(|name| format!("var(--{name})"));
    match mode {
        CssMode::Background => {
            if let Some(var) = var {
                insert(&mut rules, "background-image", var);
            }
            insert(&mut rules, "background-repeat", "no-repeat");
            insert(&mut rules, "background-size", "100% 100%");
            insert(&mut rules, "background-color", "transparent");
        }
        CssMode::Mask => {
            insert(&mut rules, "background-color", "currentColor");
            if let Some(var) = var {
                insert(&mut rules, "-webkit-mask-image", var.clone());
                insert(&mut rules, "mask-image", var);
            }
            insert(&mut rules, "-webkit-mask-repeat", "no-repeat");
            insert(&mut rules, "mask-repeat", "no-repeat");
            insert(&mut rules, "-webkit-mask-size", "100% 100%");
            insert(&mut rules, "mask-size", "100% 100%");
        }
    }
    rules
}

fn icon_rules(
    icon: &IconData,
    mode: CssMode,
    var_name: Option<&str>,
    options: &CssOptions,
) -> IndexMap<String, String> {
    let built = build_icon(icon, &Customisations::new().with_size("auto", "auto"));
    let mut attributes = built.attributes;
    attributes.shift_remove("preserveAspectRatio");

    let body = match &options.color {
        Some(color) => built.body.replace("currentColor", color),
        None => built.body,
    };
    let url = svg_to_url(&icon_to_html(&body, &attributes));

    let mut rules = IndexMap::new();
    match (var_name, mode) {
        (Some(name), _) => insert(&mut rules, &format!("--{name}"), url),
        (None, CssMode::Background) => insert(&mut rules, "background-image", url),
        (None, CssMode::Mask) => {
            insert(&mut rules, "-webkit-mask-image", url.clone());
            insert(&mut rules, "mask-image", url);
        }
    }

    if !options.force_square && icon.width != icon.height {
        let width = calculate_size(
            &IconSize::Text("1em".to_string()),
            icon.width / icon.height,
            SizeOptions::default(),
        );
        if let IconSize::Text(width) = width {
            insert(&mut rules, "width", width);
        }
    }
    rules
}

fn fill_selector(template: &str, prefix: &str, name: &str) -> String {
    template.replace("{prefix}", prefix).replace("{name}", name)
}

/// Generate CSS rule sets for `names` from `set`.
///
/// Names that do not resolve are collected in `errors` and skipped.
pub fn get_icons_css_data(set: &IconSet, names: &[&str], options: &CssOptions) -> IconsCssData {
    let mode = resolve_mode(set, options);
    let var_name = resolve_var_name(mode, options);
    let common = common_rules(mode, var_name.as_deref());
    let override_selector = options.override_selector();
    let has_common = !options.common_selector.contains("{name}");

    let mut data = IconsCssData::default();
    for name in names {
        let Some(icon) = get_icon_data(set, name) else {
            data.errors.push(format!("/* Could not find icon: {name} */"));
            continue;
        };
        let rules = icon_rules(&icon, mode, var_name.as_deref(), options);

        let overrides_common = has_common && rules.keys().any(|key| common.contains_key(key));
        let template = if overrides_common && override_selector.contains("{name}") {
            override_selector.as_str()
        } else {
            options.icon_selector.as_str()
        };
        data.css.push(CssRuleSet {
            selector: fill_selector(template, &set.prefix, name),
            rules,
        });
    }

    if has_common && !data.css.is_empty() {
        data.common = Some(CssRuleSet {
            selector: fill_selector(&options.common_selector, &set.prefix, ""),
            rules: common,
        });
    }

    tracing::debug!(
        target: "iconify_export::css",
        "Generated CSS for {} of {} icons from {}",
        data.css.len(),
        names.len(),
        set.prefix
    );
    data
}

/// Generate a stylesheet for `names` from `set`.
///
/// Errors are emitted as comments ahead of the rules.
pub fn get_icons_css(set: &IconSet, names: &[&str], options: &CssOptions) -> String {
    let data = get_icons_css_data(set, names, options);
    let mut items: Vec<&CssRuleSet> = Vec::with_capacity(data.css.len() + 1);
    if let Some(common) = &data.common {
        items.push(common);
    }
    items.extend(&data.css);

    let css = format_css(&items, options.format);
    if data.errors.is_empty() {
        css
    } else {
        format!("{}\n{}", data.errors.join("\n"), css)
    }
}

fn format_css(items: &[&CssRuleSet], format: CssFormat) -> String {
    let (selector_start, rule_prefix, separator, selector_end) = match format {
        CssFormat::Expanded => (" {", "\n  ", ": ", ";\n}\n"),
        CssFormat::Compact => (" {", " ", ": ", "; }\n"),
        CssFormat::Compressed => ("{", "", ":", "}"),
    };

    let blocks: Vec<String> = items
        .iter()
        .map(|item| {
            let mut block = format!("{}{}", item.selector, selector_start);
            for (index, (key, value)) in item.rules.iter().enumerate() {
                if index > 0 {
                    block.push(';');
                }
                block.push_str(rule_prefix);
                block.push_str(key);
                block.push_str(separator);
                block.push_str(value);
            }
            block.push_str(selector_end);
            block
        })
        .collect();

    blocks.join(if format == CssFormat::Compressed { "" } else { "\n" })
}
