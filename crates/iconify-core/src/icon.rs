//! Icon records.
//!
//! A [`PartialIcon`] is what an icon set document contains: only the body is
//! required. [`IconData`] is the fully populated record produced by
//! [`normalize`], with every dimension and transformation present.

use crate::transform::{normalize_rotation, Transform};

/// Default left/top offset.
pub const DEFAULT_OFFSET: f64 = 0.0;

/// Default width/height of an icon's view box.
pub const DEFAULT_SIZE: f64 = 16.0;

/// Icon data as found in an icon set: everything but the body is optional.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PartialIcon {
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub body: Option<String>,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub props: IconProps,
}

impl PartialIcon {
    /// Icon with a body and no other properties.
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            props: IconProps::default(),
        }
    }

    #[must_use]
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.props.width = Some(width);
        self.props.height = Some(height);
        self
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.props.rotate = Some(transform.rotate as i64);
        self.props.h_flip = Some(transform.h_flip);
        self.props.v_flip = Some(transform.v_flip);
        self
    }
}

/// Optional dimensions and transformations.
///
/// Used for icon fields, icon set root defaults and alias overrides.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IconProps {
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub left: Option<f64>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub top: Option<f64>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub width: Option<f64>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub height: Option<f64>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub rotate: Option<i64>,
    #[cfg_attr(
        feature = "serde",
        serde(rename = "hFlip", skip_serializing_if = "Option::is_none")
    )]
    pub h_flip: Option<bool>,
    #[cfg_attr(
        feature = "serde",
        serde(rename = "vFlip", skip_serializing_if = "Option::is_none")
    )]
    pub v_flip: Option<bool>,
}

impl IconProps {
    /// Fill every field missing here from `fallback`.
    #[must_use]
    pub fn or(self, fallback: &IconProps) -> IconProps {
        IconProps {
            left: self.left.or(fallback.left),
            top: self.top.or(fallback.top),
            width: self.width.or(fallback.width),
            height: self.height.or(fallback.height),
            rotate: self.rotate.or(fallback.rotate),
            h_flip: self.h_flip.or(fallback.h_flip),
            v_flip: self.v_flip.or(fallback.v_flip),
        }
    }

    /// Dimensions only, transformations cleared.
    #[must_use]
    pub fn dimensions(self) -> IconProps {
        IconProps {
            rotate: None,
            h_flip: None,
            v_flip: None,
            ..self
        }
    }

    /// Transformation described by these props, missing values as identity.
    pub fn transform(&self) -> Transform {
        Transform::new(
            self.rotate.unwrap_or(0),
            self.h_flip.unwrap_or(false),
            self.v_flip.unwrap_or(false),
        )
    }

    /// Whether any field is set.
    pub fn is_empty(&self) -> bool {
        *self == IconProps::default()
    }
}

/// A fully normalized icon.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct IconData {
    pub body: String,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub rotate: u8,
    pub h_flip: bool,
    pub v_flip: bool,
}

impl IconData {
    /// Icon with default 16x16 box and no transformation.
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            left: DEFAULT_OFFSET,
            top: DEFAULT_OFFSET,
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            rotate: 0,
            h_flip: false,
            v_flip: false,
        }
    }

    pub fn transform(&self) -> Transform {
        Transform {
            rotate: self.rotate,
            h_flip: self.h_flip,
            v_flip: self.v_flip,
        }
    }

    /// Convert back to a partial icon with every field explicit.
    pub fn to_partial(&self) -> PartialIcon {
        PartialIcon {
            body: Some(self.body.clone()),
            props: IconProps {
                left: Some(self.left),
                top: Some(self.top),
                width: Some(self.width),
                height: Some(self.height),
                rotate: Some(self.rotate as i64),
                h_flip: Some(self.h_flip),
                v_flip: Some(self.v_flip),
            },
        }
    }
}

/// Fill a partial icon with the global defaults.
///
/// Returns `None` when the icon has no body.
pub fn normalize(partial: &PartialIcon) -> Option<IconData> {
    normalize_with_defaults(partial, &IconProps::default())
}

/// Fill a partial icon, preferring `defaults` over the global fallback.
///
/// Fields set on the icon itself always win.
pub fn normalize_with_defaults(partial: &PartialIcon, defaults: &IconProps) -> Option<IconData> {
    let body = partial.body.as_ref()?;
    let props = partial.props.or(defaults);

    Some(IconData {
        body: body.clone(),
        left: props.left.unwrap_or(DEFAULT_OFFSET),
        top: props.top.unwrap_or(DEFAULT_OFFSET),
        width: props.width.unwrap_or(DEFAULT_SIZE),
        height: props.height.unwrap_or(DEFAULT_SIZE),
        rotate: normalize_rotation(props.rotate.unwrap_or(0)),
        h_flip: props.h_flip.unwrap_or(false),
        v_flip: props.v_flip.unwrap_or(false),
    })
}
