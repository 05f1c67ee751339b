//! Label canonicalization shared by every encoder.

use std::borrow::Cow;
use std::collections::HashMap;

/// Label name carrying a histogram bucket's upper bound.
pub const BUCKET_LABEL: &str = "le";
/// Label name carrying a summary quantile.
pub const QUANTILE_LABEL: &str = "quantile";

/// Render `labels` for the text format: pairs sorted by name in byte order,
/// values escaped with [`escape_string`] including double quotes.
pub fn render_labels(labels: &HashMap<String, String>) -> Vec<(&str, Cow<'_, str>)> {
    sorted_labels(labels, &[])
        .into_iter()
        .map(|(name, value)| (name, escape_string(value, true)))
        .collect()
}

/// Sorted `(name, value)` pairs with raw values, leaving out any name listed
/// in `exclude`. The protobuf encoders carry values as plain strings.
pub fn sorted_labels<'a>(
    labels: &'a HashMap<String, String>,
    exclude: &[&str],
) -> Vec<(&'a str, &'a str)> {
    let mut pairs: Vec<(&str, &str)> = labels
        .iter()
        .filter(|(name, _)| !exclude.contains(&name.as_str()))
        .map(|(name, value)| (name.as_str(), value.as_str()))
        .collect();
    // Names are unique map keys, so an unstable sort is still deterministic.
    pairs.sort_unstable_by(|a, b| a.0.cmp(b.0));
    pairs
}

fn find_first_occurence(v: &str, include_double_quote: bool) -> Option<usize> {
    if include_double_quote {
        memchr::memchr3(b'\\', b'\n', b'\"', v.as_bytes())
    } else {
        memchr::memchr2(b'\\', b'\n', v.as_bytes())
    }
}

/// `escape_string` replaces `\` by `\\`, new line character by `\n`, and `"` by `\"` if
/// `include_double_quote` is true.
///
/// Every character is visited once, so a backslash introduced by one escape is
/// never escaped again.
pub fn escape_string(v: &str, include_double_quote: bool) -> Cow<'_, str> {
    let first = match find_first_occurence(v, include_double_quote) {
        Some(first) => first,
        None => return v.into(),
    };

    let mut escaped = String::with_capacity(v.len() * 2);
    escaped.push_str(&v[0..first]);
    for c in v[first..].chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '"' if include_double_quote => escaped.push_str("\\\""),
            _ => escaped.push(c),
        }
    }
    escaped.into()
}
