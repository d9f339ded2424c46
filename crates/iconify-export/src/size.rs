//! Aspect-ratio size calculation.

use std::sync::LazyLock;

use iconify_core::IconSize;
use regex::Regex;

use crate::format_number;

/// Options for [`calculate_size`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeOptions {
    /// Results are rounded up to `1 / precision`.
    pub precision: f64,
}

impl Default for SizeOptions {
    fn default() -> Self {
        Self { precision: 100.0 }
    }
}

impl SizeOptions {
    #[must_use]
    pub fn with_precision(mut self, precision: f64) -> Self {
        self.precision = precision;
        self
    }
}

/// Numbers embedded in a size string.
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-?[0-9.]*[0-9]+[0-9.]*").unwrap());

fn scale(value: f64, ratio: f64, precision: f64) -> f64 {
    (value * ratio * precision).ceil() / precision
}

/// Multiply `size` by `ratio`.
///
/// Numbers inside text sizes are scaled in place, keeping their units, so
/// `"1em"` with ratio 1.5 becomes `"1.5em"`. Results are rounded up to the
/// configured precision. A ratio of exactly 1 returns the size unchanged.
pub fn calculate_size(size: &IconSize, ratio: f64, options: SizeOptions) -> IconSize {
    if ratio == 1.0 {
        return size.clone();
    }
    let precision = if options.precision > 0.0 { options.precision } else { 100.0 };

    match size {
        IconSize::Number(value) => IconSize::Number(scale(*value, ratio, precision)),
        IconSize::Text(text) => {
            let mut result = String::with_capacity(text.len() + 4);
            let mut last = 0;
            for found in NUMBER_RE.find_iter(text) {
                result.push_str(&text[last..found.start()]);
                match found.as_str().parse::<f64>() {
                    Ok(value) => result.push_str(&format_number(scale(value, ratio, precision))),
                    Err(_) => result.push_str(found.as_str()),
                }
                last = found.end();
            }
            result.push_str(&text[last..]);
            IconSize::Text(result)
        }
        IconSize::Auto | IconSize::Unset => size.clone(),
    }
}
