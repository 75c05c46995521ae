//! Composite identifiers.
//!
//! Resources without a single natural key are addressed by slash-joined
//! parts, e.g. `my-org/my-project/12345`. The same format is used for
//! import identifiers.

use crate::error::{Result, SentryError};

/// Join parts with `/`.
#[must_use]
pub fn build_id(parts: &[&str]) -> String {
    parts.join("/")
}

fn split_id<const N: usize>(id: &str, names: [&str; N]) -> Result<[String; N]> {
    let invalid = || SentryError::InvalidId {
        id: id.to_string(),
        expected: names.join("/"),
    };

    let parts: Vec<&str> = id.split('/').collect();
    if parts.len() != N || parts.iter().any(|part| part.is_empty()) {
        return Err(invalid());
    }

    let mut out: [String; N] = std::array::from_fn(|_| String::new());
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part.to_string();
    }
    Ok(out)
}

/// Split `a/b`; `a` and `b` name the parts in the error message.
///
/// # Errors
///
/// Returns [`SentryError::InvalidId`] unless `id` has exactly two
/// non-empty parts.
pub fn split_two_part_id(id: &str, a: &str, b: &str) -> Result<(String, String)> {
    let [a, b] = split_id(id, [a, b])?;
    Ok((a, b))
}

/// Split `a/b/c`.
///
/// # Errors
///
/// Returns [`SentryError::InvalidId`] unless `id` has exactly three
/// non-empty parts.
pub fn split_three_part_id(id: &str, a: &str, b: &str, c: &str) -> Result<(String, String, String)> {
    let [a, b, c] = split_id(id, [a, b, c])?;
    Ok((a, b, c))
}

/// Split `a/b/c/d`.
///
/// # Errors
///
/// Returns [`SentryError::InvalidId`] unless `id` has exactly four
/// non-empty parts.
pub fn split_four_part_id(
    id: &str,
    a: &str,
    b: &str,
    c: &str,
    d: &str,
) -> Result<(String, String, String, String)> {
    let [a, b, c, d] = split_id(id, [a, b, c, d])?;
    Ok((a, b, c, d))
}
