//! SVG data URLs.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters that break a quoted `url("...")` value.
const SVG_URL: &AsciiSet = &CONTROLS.add(b'"').add(b'%').add(b'#').add(b'<').add(b'>');

/// Encode SVG markup as a `data:` URI.
///
/// Whitespace runs collapse to one space before encoding.
pub fn svg_to_data(svg: &str) -> String {
    let collapsed = svg.split_whitespace().collect::<Vec<_>>().join(" ");
    format!(
        "data:image/svg+xml,{}",
        utf8_percent_encode(&collapsed, SVG_URL)
    )
}

/// Encode SVG markup as a CSS `url("...")` value.
pub fn svg_to_url(svg: &str) -> String {
    format!("url(\"{}\")", svg_to_data(svg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_svg_to_data() {
        assert_eq!(
            svg_to_data("<svg fill=\"#000\">\n  <path d=\"M0 0\"/>\n</svg>"),
            "data:image/svg+xml,%3Csvg fill=%22%23000%22%3E %3Cpath d=%22M0 0%22/%3E %3C/svg%3E"
        );
    }

    #[test]
    fn test_percent_sign() {
        assert_eq!(svg_to_url("50%"), "url(\"data:image/svg+xml,50%25\")");
    }
}
