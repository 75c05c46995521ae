//! String sets carried as delimiter-joined strings.
//!
//! Several endpoints store a set of strings in one field: notification
//! tags are comma-joined, project inbound filters are newline-joined.
//! Members are trimmed, blanks dropped and duplicates removed while
//! keeping first-seen order.

use crate::attr::Value;

fn normalize<'a, I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out: Vec<String> = Vec::new();
    for item in items {
        let item = item.trim();
        if !item.is_empty() && !out.iter().any(|seen| seen == item) {
            out.push(item.to_string());
        }
    }
    out
}

/// Join a set with `separator`.
#[must_use]
pub fn join_set(items: &[String], separator: &str) -> String {
    normalize(items.iter().map(String::as_str)).join(separator)
}

/// Split a joined string. An empty result is a null set.
#[must_use]
pub fn split_set(joined: &str, separator: char) -> Value<Vec<String>> {
    let items = normalize(joined.split(separator));
    if items.is_empty() {
        Value::Null
    } else {
        Value::Known(items)
    }
}

/// Comma-joined form.
#[must_use]
pub fn to_comma_string(items: &[String]) -> String {
    join_set(items, ",")
}

/// Parse a comma-joined string.
#[must_use]
pub fn from_comma_string(joined: &str) -> Value<Vec<String>> {
    split_set(joined, ',')
}
