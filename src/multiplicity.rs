//! Multiplicity strings.
//!
//! The model keeps a multiplicity as one string (`"0..1"`, `"*"`, `""` for the
//! default); the wire carries two value specifications. [`join`] builds the
//! string from the two bounds, [`split`] goes the other way.

/// Bound that means "unbounded".
pub const UNLIMITED: &str = "*";

/// Join two optional bounds into a normalized multiplicity.
///
/// `None` when neither bound is present.
pub fn join(lower: Option<&str>, upper: Option<&str>) -> Option<String> {
    let text = match (lower, upper) {
        (Some(lower), Some(upper)) => format!("{lower}..{upper}"),
        (Some(bound), None) | (None, Some(bound)) => bound.to_string(),
        (None, None) => return None,
    };
    Some(normalize(&text))
}

/// Collapse degenerate ranges.
///
/// `1..1` and `0..0` are the implicit default and become empty, and `*..*`
/// becomes `*`. Every other range is kept as written, `2..2` included.
pub fn normalize(text: &str) -> String {
    let text = text.trim();
    match text.split_once("..") {
        Some((lower, upper)) => match (lower.trim(), upper.trim()) {
            ("1", "1") | ("0", "0") => String::new(),
            (UNLIMITED, UNLIMITED) => UNLIMITED.to_string(),
            (lower, upper) => format!("{lower}..{upper}"),
        },
        None => text.to_string(),
    }
}

/// Bounds of a multiplicity string, `None` for the empty default.
///
/// A single value `x` is the range `x..x`.
pub fn split(text: &str) -> Option<(String, String)> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    match text.split_once("..") {
        Some((lower, upper)) => Some((lower.trim().to_string(), upper.trim().to_string())),
        None => Some((text.to_string(), text.to_string())),
    }
}
