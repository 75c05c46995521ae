//! JSON text compared by structure rather than by bytes.
//!
//! Users hand over JSON documents (issue alert conditions, for instance)
//! that the Service echoes back reformatted and enriched with computed
//! fields. Two documents are considered the same when:
//!
//! - whitespace, key order and escape forms differ (both sides are parsed);
//! - numbers have the same literal text; a string equals a number with the
//!   same text, but `12423434` and `1.2423434e+07` differ;
//! - every key of the given object exists in the current object with an
//!   equal value (extra keys on the current side are ignored);
//! - arrays have the same length and pairwise equal elements, in order;
//! - `null` equals `null`, `""`, `[]` and `{}`.

use serde_json::{Map, Value as Json};

use crate::attr::Value;
use crate::error::{Result, SentryError};

/// Keys to drop from both sides before comparing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LossyJsonOptions {
    pub ignore_keys: Vec<String>,
}

impl LossyJsonOptions {
    #[must_use]
    pub fn ignoring<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ignore_keys: keys.into_iter().map(Into::into).collect(),
        }
    }
}

/// Validated JSON text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LossyJson(String);

impl LossyJson {
    /// Wrap JSON text, rejecting anything that does not parse.
    ///
    /// # Errors
    ///
    /// Returns a parse error for invalid JSON.
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        serde_json::from_str::<Json>(&text)?;
        Ok(Self(text))
    }

    /// Serialize a parsed document.
    #[must_use]
    pub fn from_json(value: &Json) -> Self {
        Self(value.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the text.
    ///
    /// # Errors
    ///
    /// Returns a parse error for invalid JSON.
    pub fn to_json(&self) -> Result<Json> {
        Ok(serde_json::from_str(&self.0)?)
    }

    /// Whether `self` (the given document) is satisfied by `current`.
    ///
    /// # Errors
    ///
    /// Returns an error if either side is not valid JSON.
    pub fn semantic_eq(&self, current: &LossyJson) -> Result<bool> {
        self.semantic_eq_with(current, &LossyJsonOptions::default())
    }

    /// [`LossyJson::semantic_eq`] with options.
    ///
    /// # Errors
    ///
    /// Returns an error if either side is not valid JSON.
    pub fn semantic_eq_with(&self, current: &LossyJson, options: &LossyJsonOptions) -> Result<bool> {
        let mut given = self.to_json()?;
        let mut current = current.to_json()?;
        if !options.ignore_keys.is_empty() {
            strip_keys(&mut given, &options.ignore_keys);
            strip_keys(&mut current, &options.ignore_keys);
        }
        Ok(lossy_equal(&given, &current))
    }
}

impl std::fmt::Display for LossyJson {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for LossyJson {
    type Err = SentryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

fn is_empty(value: &Json) -> bool {
    match value {
        Json::Null => true,
        Json::String(s) => s.is_empty(),
        Json::Array(a) => a.is_empty(),
        Json::Object(o) => o.is_empty(),
        _ => false,
    }
}

fn objects_equal(given: &Map<String, Json>, current: &Map<String, Json>) -> bool {
    given.iter().all(|(key, value)| {
        current
            .get(key)
            .is_some_and(|other| lossy_equal(value, other))
    })
}

/// Structural comparison of two parsed documents.
#[must_use]
pub fn lossy_equal(given: &Json, current: &Json) -> bool {
    match (given, current) {
        (Json::Null, other) | (other, Json::Null) => is_empty(other),
        (Json::Bool(a), Json::Bool(b)) => a == b,
        (Json::Number(a), Json::Number(b)) => a.to_string() == b.to_string(),
        (Json::Number(n), Json::String(s)) | (Json::String(s), Json::Number(n)) => {
            n.to_string() == *s
        }
        (Json::String(a), Json::String(b)) => a == b,
        (Json::Array(a), Json::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| lossy_equal(x, y))
        }
        (Json::Object(a), Json::Object(b)) => objects_equal(a, b),
        _ => false,
    }
}

fn strip_keys(value: &mut Json, keys: &[String]) {
    match value {
        Json::Object(map) => {
            map.retain(|key, _| !keys.iter().any(|k| k == key));
            map.values_mut().for_each(|v| strip_keys(v, keys));
        }
        Json::Array(items) => items.iter_mut().for_each(|v| strip_keys(v, keys)),
        _ => {}
    }
}

/// Keep the prior text when the fresh value means the same thing.
///
/// Used when filling state from a response so a reformatted echo does not
/// show up as drift.
#[must_use]
pub fn preserve(prior: &Value<LossyJson>, fresh: LossyJson) -> LossyJson {
    match prior.as_known() {
        Some(prior) if prior.semantic_eq(&fresh).unwrap_or(false) => prior.clone(),
        _ => fresh,
    }
}
