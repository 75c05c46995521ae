//! Attribute validators.
//!
//! Handlers run these against the plan before any network call. Every
//! failure is reported as an attribute-scoped diagnostic; unknown and null
//! values are never rejected (the host validates again once they resolve).

use crate::attr::Value;
use crate::diagnostics::{attribute_error, Diagnostics};

const INVALID_VALUE: &str = "Invalid Attribute Value";
const INVALID_COMBINATION: &str = "Invalid Attribute Combination";

/// String length (in characters) within `min..=max`.
pub fn length_between(diags: &mut Diagnostics, path: &str, value: &Value<String>, min: usize, max: usize) {
    if let Some(v) = value.as_known() {
        let len = v.chars().count();
        if len < min || len > max {
            diags.push(attribute_error(
                path,
                INVALID_VALUE,
                format!("Attribute {path} string length must be between {min} and {max}, got: {len}"),
            ));
        }
    }
}

/// Non-empty string.
pub fn not_empty(diags: &mut Diagnostics, path: &str, value: &Value<String>) {
    if value.as_deref().is_some_and(str::is_empty) {
        diags.push(attribute_error(
            path,
            INVALID_VALUE,
            format!("Attribute {path} string length must be at least 1, got: 0"),
        ));
    }
}

/// Integer within `min..=max`.
pub fn int_between(diags: &mut Diagnostics, path: &str, value: &Value<i64>, min: i64, max: i64) {
    if let Some(v) = value.as_known() {
        if *v < min || *v > max {
            diags.push(attribute_error(
                path,
                INVALID_VALUE,
                format!("Attribute {path} value must be between {min} and {max}, got: {v}"),
            ));
        }
    }
}

/// Integer at least `min`.
pub fn int_at_least(diags: &mut Diagnostics, path: &str, value: &Value<i64>, min: i64) {
    if let Some(v) = value.as_known() {
        if *v < min {
            diags.push(attribute_error(
                path,
                INVALID_VALUE,
                format!("Attribute {path} value must be at least {min}, got: {v}"),
            ));
        }
    }
}

/// String from a closed set.
pub fn one_of(diags: &mut Diagnostics, path: &str, value: &Value<String>, allowed: &[&str]) {
    if let Some(v) = value.as_known() {
        if !allowed.contains(&v.as_str()) {
            let allowed = allowed
                .iter()
                .map(|a| format!("\"{a}\""))
                .collect::<Vec<_>>()
                .join(" ");
            diags.push(attribute_error(
                path,
                INVALID_VALUE,
                format!("Attribute {path} value must be one of: [{allowed}], got: \"{v}\""),
            ));
        }
    }
}

/// Set-valued attribute with at least `min` members.
pub fn size_at_least<T>(diags: &mut Diagnostics, path: &str, value: &Value<Vec<T>>, min: usize) {
    if let Some(v) = value.as_known() {
        if v.len() < min {
            diags.push(attribute_error(
                path,
                INVALID_VALUE,
                format!("Attribute {path} set must contain at least {min} elements, got: {}", v.len()),
            ));
        }
    }
}

/// Attributes that must be set together or not at all. `set` tells whether
/// each one is non-null.
pub fn required_together(diags: &mut Diagnostics, attrs: &[(&str, bool)]) {
    let any_set = attrs.iter().any(|(_, set)| *set);
    let all_set = attrs.iter().all(|(_, set)| *set);
    if any_set && !all_set {
        let names = quoted(attrs);
        for (path, _) in attrs.iter().filter(|(_, set)| !*set) {
            diags.push(attribute_error(
                *path,
                INVALID_COMBINATION,
                format!("Attributes {names} must be specified together"),
            ));
        }
    }
}

/// Attributes that cannot be set at the same time.
pub fn conflicting(diags: &mut Diagnostics, attrs: &[(&str, bool)]) {
    let set: Vec<&str> = attrs
        .iter()
        .filter(|(_, set)| *set)
        .map(|(p, _)| *p)
        .collect();
    if set.len() > 1 {
        diags.push(attribute_error(
            set[0],
            INVALID_COMBINATION,
            format!("Attributes {} cannot be specified together", quoted(attrs)),
        ));
    }
}

fn quoted(attrs: &[(&str, bool)]) -> String {
    attrs
        .iter()
        .map(|(p, _)| format!("[{p}]"))
        .collect::<Vec<_>>()
        .join(",")
}
