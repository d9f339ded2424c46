//! Output stages of the Iconify engine.
//!
//! Supported outputs:
//! - SVG attributes and transformed body ([`build_icon`])
//! - Complete `<svg>` markup ([`icon_to_html`], [`render_svg`])
//! - Collision-free element IDs ([`replace_ids`])
//! - CSS rules for utility classes ([`get_icons_css_data`], [`get_icons_css`])

pub mod css;
pub mod ids;
pub mod size;
pub mod svg;
pub mod url;

pub use css::{get_icons_css, get_icons_css_data, CssFormat, CssMode, CssOptions, CssRuleSet, IconsCssData};
pub use ids::{replace_ids, replace_ids_with, reset_ids, IdGenerator, IdRegistry};
pub use size::{calculate_size, SizeOptions};
pub use svg::{build_icon, icon_to_html, render_svg, SvgBuildResult};
pub use url::{svg_to_data, svg_to_url};

/// Format a number the way SVG attributes expect it.
pub(crate) fn format_number(value: f64) -> String {
    // Avoid "-0".
    if value == 0.0 {
        return "0".to_string();
    }
    value.to_string()
}
