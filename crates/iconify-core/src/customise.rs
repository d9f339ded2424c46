//! Render-time customisations.
//!
//! Customisations are supplied by the caller for a single render and never
//! stored. Framework glue usually hands them over as loose key/value
//! properties; [`Customisations::from_props`] maps recognized spellings onto
//! the typed fields through a fixed alias table and keeps everything else in
//! an explicit passthrough bag.

use indexmap::IndexMap;

use crate::transform::{flip_from_string, rotate_from_string, Transform};

/// Requested width or height of a rendered icon.
#[derive(Debug, Clone, PartialEq)]
pub enum IconSize {
    /// A unitless number.
    Number(f64),
    /// Any CSS-like string, passed through verbatim (`"1.5em"`, `"48"`).
    Text(String),
    /// Use the icon's own box dimension.
    Auto,
    /// Explicitly omit the attribute.
    Unset,
}

impl IconSize {
    /// Parse a size value as a consumer would supply it.
    pub fn parse(value: &str) -> IconSize {
        match value.trim() {
            "auto" => IconSize::Auto,
            "unset" | "undefined" | "none" => IconSize::Unset,
            other => IconSize::Text(other.to_string()),
        }
    }
}

impl From<f64> for IconSize {
    fn from(value: f64) -> Self {
        IconSize::Number(value)
    }
}

impl From<&str> for IconSize {
    fn from(value: &str) -> Self {
        IconSize::parse(value)
    }
}

/// Horizontal alignment inside the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Vertical alignment inside the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VAlign {
    Top,
    #[default]
    Middle,
    Bottom,
}

/// A loosely typed property value as received from framework glue.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl PropValue {
    /// Boolean interpretation: `true` and the string `"true"` are true,
    /// everything else is false.
    pub fn as_bool(&self) -> bool {
        match self {
            PropValue::Bool(value) => *value,
            PropValue::Text(value) => value == "true",
            PropValue::Number(_) => false,
        }
    }

    fn as_text(&self) -> String {
        match self {
            PropValue::Bool(value) => value.to_string(),
            PropValue::Number(value) => value.to_string(),
            PropValue::Text(value) => value.clone(),
        }
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Number(value)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Text(value.to_string())
    }
}

/// Customisations applied to one render of an icon.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Customisations {
    pub transform: Transform,
    pub width: Option<IconSize>,
    pub height: Option<IconSize>,
    pub h_align: HAlign,
    pub v_align: VAlign,
    pub slice: bool,
    /// Render with `vertical-align: -0.125em`.
    pub inline: bool,
    /// Replaces `currentColor` in the rendered output.
    pub color: Option<String>,
    /// Unrecognized properties, passed to the output element as attributes.
    pub extra_attributes: IndexMap<String, String>,
}

/// Canonical customisation fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Width,
    Height,
    Rotate,
    Flip,
    HFlip,
    VFlip,
    Align,
    HAlign,
    VAlign,
    Slice,
    Inline,
    Color,
}

/// Every spelling recognized as a customisation. Matching is case-sensitive.
const FIELD_ALIASES: &[(&str, Field)] = &[
    ("width", Field::Width),
    ("height", Field::Height),
    ("rotate", Field::Rotate),
    ("flip", Field::Flip),
    ("hFlip", Field::HFlip),
    ("horizontalFlip", Field::HFlip),
    ("vFlip", Field::VFlip),
    ("verticalFlip", Field::VFlip),
    ("align", Field::Align),
    ("hAlign", Field::HAlign),
    ("horizontalAlign", Field::HAlign),
    ("vAlign", Field::VAlign),
    ("verticalAlign", Field::VAlign),
    ("slice", Field::Slice),
    ("inline", Field::Inline),
    ("color", Field::Color),
];

fn lookup_field(key: &str) -> Option<Field> {
    FIELD_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, field)| *field)
}

impl Customisations {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_size(mut self, width: impl Into<IconSize>, height: impl Into<IconSize>) -> Self {
        self.width = Some(width.into());
        self.height = Some(height.into());
        self
    }

    #[must_use]
    pub fn with_width(mut self, width: impl Into<IconSize>) -> Self {
        self.width = Some(width.into());
        self
    }

    #[must_use]
    pub fn with_height(mut self, height: impl Into<IconSize>) -> Self {
        self.height = Some(height.into());
        self
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    #[must_use]
    pub fn with_rotate(mut self, quarter_turns: i64) -> Self {
        self.transform = Transform::new(quarter_turns, self.transform.h_flip, self.transform.v_flip);
        self
    }

    #[must_use]
    pub fn with_flip(mut self, h_flip: bool, v_flip: bool) -> Self {
        self.transform.h_flip = h_flip;
        self.transform.v_flip = v_flip;
        self
    }

    #[must_use]
    pub fn with_align(mut self, h_align: HAlign, v_align: VAlign, slice: bool) -> Self {
        self.h_align = h_align;
        self.v_align = v_align;
        self.slice = slice;
        self
    }

    /// Build customisations from loosely typed properties.
    ///
    /// Keys are matched case-sensitively against the alias table. Anything
    /// unrecognized, including a known key in the wrong case, lands in
    /// [`Customisations::extra_attributes`].
    pub fn from_props<'a, I>(props: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, PropValue)>,
    {
        let mut result = Self::default();
        for (key, value) in props {
            match lookup_field(key) {
                Some(field) => result.apply(field, &value),
                None => {
                    if cfg!(debug_assertions) {
                        if let Some((alias, _)) =
                            FIELD_ALIASES.iter().find(|(alias, _)| alias.eq_ignore_ascii_case(key))
                        {
                            tracing::debug!(
                                target: "iconify_core::customise",
                                "Property '{}' looks like '{}' but keys are case-sensitive; passing it through",
                                key,
                                alias
                            );
                        }
                    }
                    result.extra_attributes.insert(key.to_string(), value.as_text());
                }
            }
        }
        result
    }

    fn apply(&mut self, field: Field, value: &PropValue) {
        match field {
            Field::Width => self.width = Some(prop_to_size(value)),
            Field::Height => self.height = Some(prop_to_size(value)),
            Field::Rotate => {
                let rotate = match value {
                    PropValue::Number(n) if n.fract() == 0.0 => *n as i64,
                    PropValue::Text(text) => rotate_from_string(text) as i64,
                    _ => 0,
                };
                self.transform = Transform::new(rotate, self.transform.h_flip, self.transform.v_flip);
            }
            Field::Flip => {
                if let PropValue::Text(text) = value {
                    flip_from_string(text, &mut self.transform);
                }
            }
            Field::HFlip => self.transform.h_flip = value.as_bool(),
            Field::VFlip => self.transform.v_flip = value.as_bool(),
            Field::Align => {
                if let PropValue::Text(text) = value {
                    alignment_from_string(text, self);
                }
            }
            Field::HAlign => {
                if let Some(align) = h_align_from_str(&value.as_text()) {
                    self.h_align = align;
                }
            }
            Field::VAlign => {
                if let Some(align) = v_align_from_str(&value.as_text()) {
                    self.v_align = align;
                }
            }
            Field::Slice => self.slice = value.as_bool(),
            Field::Inline => self.inline = value.as_bool(),
            Field::Color => self.color = Some(value.as_text()),
        }
    }
}

fn prop_to_size(value: &PropValue) -> IconSize {
    match value {
        PropValue::Number(n) => IconSize::Number(*n),
        PropValue::Text(text) => IconSize::parse(text),
        PropValue::Bool(_) => IconSize::Unset,
    }
}

fn h_align_from_str(value: &str) -> Option<HAlign> {
    match value {
        "left" => Some(HAlign::Left),
        "center" => Some(HAlign::Center),
        "right" => Some(HAlign::Right),
        _ => None,
    }
}

fn v_align_from_str(value: &str) -> Option<VAlign> {
    match value {
        "top" => Some(VAlign::Top),
        "middle" => Some(VAlign::Middle),
        "bottom" => Some(VAlign::Bottom),
        _ => None,
    }
}

/// Apply an alignment shorthand such as `"left top slice"`.
///
/// Tokens may appear in any order; unknown tokens are ignored.
pub fn alignment_from_string(value: &str, customisations: &mut Customisations) {
    for token in value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        if let Some(align) = h_align_from_str(token) {
            customisations.h_align = align;
        } else if let Some(align) = v_align_from_str(token) {
            customisations.v_align = align;
        } else {
            match token {
                "slice" => customisations.slice = true,
                "meet" => customisations.slice = false,
                _ => {}
            }
        }
    }
}

/// `preserveAspectRatio` value for the given alignment.
pub fn preserve_aspect_ratio(h_align: HAlign, v_align: VAlign, slice: bool) -> String {
    let x = match h_align {
        HAlign::Left => "xMin",
        HAlign::Center => "xMid",
        HAlign::Right => "xMax",
    };
    let y = match v_align {
        VAlign::Top => "YMin",
        VAlign::Middle => "YMid",
        VAlign::Bottom => "YMax",
    };
    format!("{x}{y} {}", if slice { "slice" } else { "meet" })
}
