//! SVG building for a single icon.

use indexmap::IndexMap;
use smallvec::SmallVec;

use iconify_core::{preserve_aspect_ratio, Customisations, IconData, IconSize};

use crate::format_number;
use crate::ids::{replace_ids, IdGenerator};
use crate::size::{calculate_size, SizeOptions};

/// Attributes and body of a rendered icon.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgBuildResult {
    /// `width`, `height`, `viewBox` and `preserveAspectRatio`, in that order.
    pub attributes: IndexMap<String, String>,
    /// Icon body, wrapped in a transform group when needed.
    pub body: String,
    /// `[left, top, width, height]`.
    pub view_box: [f64; 4],
}

/// Build SVG attributes and body for `icon` with `customisations` applied.
pub fn build_icon(icon: &IconData, customisations: &Customisations) -> SvgBuildResult {
    build_icon_with(icon, customisations, SizeOptions::default())
}

/// [`build_icon`] with explicit size rounding options.
pub fn build_icon_with(
    icon: &IconData,
    customisations: &Customisations,
    size_options: SizeOptions,
) -> SvgBuildResult {
    let (left, top, width, height) = (icon.left, icon.top, icon.width, icon.height);
    let transform = icon.transform().merge(customisations.transform).canonical();

    // Transformations, outermost first.
    let mut transformations: SmallVec<[String; 3]> = SmallVec::new();
    if transform.rotate != 0 {
        transformations.push(format!(
            "rotate({} {} {})",
            90 * u32::from(transform.rotate),
            format_number(left + width / 2.0),
            format_number(top + height / 2.0)
        ));
    }
    if transform.h_flip {
        transformations.push(format!("translate({} 0)", format_number(2.0 * left + width)));
        transformations.push("scale(-1 1)".to_string());
    } else if transform.v_flip {
        transformations.push(format!("translate(0 {})", format_number(2.0 * top + height)));
        transformations.push("scale(1 -1)".to_string());
    }

    let body = if transformations.is_empty() {
        icon.body.clone()
    } else {
        format!(
            "<g transform=\"{}\">{}</g>",
            transformations.join(" "),
            icon.body
        )
    };

    // A quarter turn swaps the visual aspect ratio, not the view box.
    let (box_width, box_height) = if transform.rotate % 2 == 1 {
        (height, width)
    } else {
        (width, height)
    };

    let (out_width, out_height) = match (&customisations.width, &customisations.height) {
        (None, requested) => {
            let out_height = match requested {
                None => IconSize::Text("1em".to_string()),
                Some(IconSize::Auto) => IconSize::Number(box_height),
                Some(other) => other.clone(),
            };
            let out_width = calculate_size(&out_height, box_width / box_height, size_options);
            (out_width, out_height)
        }
        (Some(requested_width), requested_height) => {
            let out_width = match requested_width {
                IconSize::Auto => IconSize::Number(box_width),
                other => other.clone(),
            };
            let out_height = match requested_height {
                None => calculate_size(&out_width, box_height / box_width, size_options),
                Some(IconSize::Auto) => IconSize::Number(box_height),
                Some(other) => other.clone(),
            };
            (out_width, out_height)
        }
    };

    let view_box = [left, top, width, height];
    let mut attributes = IndexMap::new();
    if let Some(value) = size_attribute(&out_width) {
        attributes.insert("width".to_string(), value);
    }
    if let Some(value) = size_attribute(&out_height) {
        attributes.insert("height".to_string(), value);
    }
    attributes.insert(
        "viewBox".to_string(),
        view_box.iter().map(|v| format_number(*v)).collect::<Vec<_>>().join(" "),
    );
    attributes.insert(
        "preserveAspectRatio".to_string(),
        preserve_aspect_ratio(customisations.h_align, customisations.v_align, customisations.slice),
    );

    SvgBuildResult {
        attributes,
        body,
        view_box,
    }
}

fn size_attribute(size: &IconSize) -> Option<String> {
    match size {
        IconSize::Number(value) => Some(format_number(*value)),
        IconSize::Text(text) => Some(text.clone()),
        IconSize::Auto | IconSize::Unset => None,
    }
}

/// Wrap `body` in an `<svg>` element with `attributes`.
///
/// `xmlns:xlink` is added when the body uses `xlink:` attributes and the
/// caller did not supply it.
pub fn icon_to_html(body: &str, attributes: &IndexMap<String, String>) -> String {
    let mut html = String::from("<svg xmlns=\"http://www.w3.org/2000/svg\"");
    if body.contains("xlink:") && !attributes.contains_key("xmlns:xlink") {
        html.push_str(" xmlns:xlink=\"http://www.w3.org/1999/xlink\"");
    }
    for (name, value) in attributes {
        html.push(' ');
        html.push_str(name);
        html.push_str("=\"");
        html.push_str(value);
        html.push('"');
    }
    html.push('>');
    html.push_str(body);
    html.push_str("</svg>");
    html
}

/// Render `icon` to complete `<svg>` markup.
///
/// Element IDs in the body are made unique, `currentColor` is kept so the
/// icon follows the surrounding text color unless `color` is customised,
/// and unrecognized customisation properties are passed through as
/// attributes.
pub fn render_svg(icon: &IconData, customisations: &Customisations) -> String {
    let built = build_icon(icon, customisations);
    let body = replace_ids(&built.body, IdGenerator::Default);

    let mut attributes: IndexMap<String, String> = IndexMap::new();
    attributes.insert("xmlns:xlink".to_string(), "http://www.w3.org/1999/xlink".to_string());
    attributes.insert("aria-hidden".to_string(), "true".to_string());
    attributes.insert("role".to_string(), "img".to_string());
    attributes.extend(built.attributes);

    let mut style = Vec::new();
    if let Some(color) = &customisations.color {
        style.push(format!("color: {color}"));
    }
    if customisations.inline {
        style.push("vertical-align: -0.125em".to_string());
    }
    if !style.is_empty() {
        attributes.insert("style".to_string(), style.join("; "));
    }

    for (name, value) in &customisations.extra_attributes {
        attributes.insert(name.clone(), value.clone());
    }

    icon_to_html(&body, &attributes)
}
