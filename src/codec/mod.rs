//! Wire codecs for polymorphic payloads.
//!
//! - [`conditions`], [`filters`], [`actions`]: issue alert rule elements,
//!   tagged on the wire by their `id` field.
//! - [`schedule`]: monitor schedules, either a crontab string or an
//!   `[n, "unit"]` interval.
//! - [`integration_table`]: rows of an integration's service or team table.
//!
//! Rule elements are read from and written to [`serde_json::Value`] maps
//! directly rather than through derived deserializers, because several
//! fields arrive as either a string or a number depending on the element.

pub mod actions;
pub mod catalog;
pub mod conditions;
pub mod filters;
pub mod integration_table;
pub mod schedule;

use serde_json::{Map, Number, Value as Json};

use crate::attr::Value;
use crate::error::{Result, SentryError};

pub use actions::Action;
pub use conditions::Condition;
pub use filters::Filter;
pub use integration_table::{ServiceTableRow, TeamTableRow};
pub use schedule::{IntervalUnit, Schedule};

/// A rule element that only carries its Service-computed display name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Named {
    pub name: Value<String>,
}

impl Named {
    pub(crate) fn from_api(element: &Element<'_>) -> Self {
        Self {
            name: element.opt_str("name"),
        }
    }

    pub(crate) fn to_api(&self, id: &str) -> Json {
        ElementBuilder::new(id).str("name", &self.name).build()
    }
}

/// Read access to one wire element.
pub(crate) struct Element<'a> {
    id: &'a str,
    fields: &'a Map<String, Json>,
}

impl<'a> Element<'a> {
    /// Borrow an element, which must be an object with a string `id`.
    pub(crate) fn parse(value: &'a Json, kind: &str) -> Result<Self> {
        let fields = value
            .as_object()
            .ok_or_else(|| SentryError::codec(format!("Invalid {kind}: expected an object")))?;
        let id = fields
            .get("id")
            .and_then(Json::as_str)
            .ok_or_else(|| SentryError::codec(format!("Invalid {kind}: missing \"id\"")))?;
        Ok(Self { id, fields })
    }

    pub(crate) fn id(&self) -> &'a str {
        self.id
    }

    fn missing(&self, key: &str) -> SentryError {
        SentryError::codec(format!("{}: missing field \"{key}\"", self.id))
    }

    fn invalid(&self, key: &str, expected: &str) -> SentryError {
        SentryError::codec(format!("{}: field \"{key}\" is not {expected}", self.id))
    }

    /// Strings as-is, numbers by their literal text, null or absent as null.
    pub(crate) fn opt_str(&self, key: &str) -> Value<String> {
        match self.fields.get(key) {
            Some(Json::String(s)) => Value::Known(s.clone()),
            Some(Json::Number(n)) => Value::Known(n.to_string()),
            Some(Json::Bool(b)) => Value::Known(b.to_string()),
            _ => Value::Null,
        }
    }

    /// Like [`Element::opt_str`], with the empty string read as null.
    pub(crate) fn opt_non_empty_str(&self, key: &str) -> Value<String> {
        match self.opt_str(key) {
            Value::Known(s) if s.is_empty() => Value::Null,
            other => other,
        }
    }

    pub(crate) fn req_str(&self, key: &str) -> Result<Value<String>> {
        match self.opt_str(key) {
            Value::Null => Err(self.missing(key)),
            other => Ok(other),
        }
    }

    /// Integers, also accepted as numeric strings.
    pub(crate) fn opt_i64(&self, key: &str) -> Result<Value<i64>> {
        match self.fields.get(key) {
            None | Some(Json::Null) => Ok(Value::Null),
            Some(Json::Number(n)) => n
                .as_i64()
                .map(Value::Known)
                .ok_or_else(|| self.invalid(key, "an integer")),
            Some(Json::String(s)) => s
                .trim()
                .parse()
                .map(Value::Known)
                .map_err(|_| self.invalid(key, "an integer")),
            Some(_) => Err(self.invalid(key, "an integer")),
        }
    }

    pub(crate) fn req_i64(&self, key: &str) -> Result<Value<i64>> {
        match self.opt_i64(key)? {
            Value::Null => Err(self.missing(key)),
            other => Ok(other),
        }
    }

    /// Floats, also accepted as numeric strings.
    pub(crate) fn req_f64(&self, key: &str) -> Result<Value<f64>> {
        match self.fields.get(key) {
            None | Some(Json::Null) => Err(self.missing(key)),
            Some(Json::Number(n)) => n
                .as_f64()
                .map(Value::Known)
                .ok_or_else(|| self.invalid(key, "a number")),
            Some(Json::String(s)) => s
                .trim()
                .parse()
                .map(Value::Known)
                .map_err(|_| self.invalid(key, "a number")),
            Some(_) => Err(self.invalid(key, "a number")),
        }
    }

    /// A raw JSON field, null when absent.
    pub(crate) fn opt_json(&self, key: &str) -> Value<Json> {
        match self.fields.get(key) {
            None | Some(Json::Null) => Value::Null,
            Some(v) => Value::Known(v.clone()),
        }
    }

    /// A name looked up from a wire id through a catalog table.
    pub(crate) fn mapped(
        &self,
        key: &str,
        table: &[(&'static str, &'static str)],
        what: &str,
    ) -> Result<Value<String>> {
        let Value::Known(raw) = self.req_str(key)? else {
            return Err(self.missing(key));
        };
        catalog::name_for(table, &raw)
            .map(Value::known)
            .ok_or_else(|| SentryError::codec(format!("Invalid {what} \"{raw}\"")))
    }
}

/// Builds one wire element. Only known values are written.
pub(crate) struct ElementBuilder {
    fields: Map<String, Json>,
}

impl ElementBuilder {
    pub(crate) fn new(id: &str) -> Self {
        let mut fields = Map::new();
        fields.insert("id".to_string(), Json::String(id.to_string()));
        Self { fields }
    }

    pub(crate) fn str(mut self, key: &str, value: &Value<String>) -> Self {
        if let Some(v) = value.as_known() {
            self.fields.insert(key.to_string(), Json::String(v.clone()));
        }
        self
    }

    pub(crate) fn i64(mut self, key: &str, value: &Value<i64>) -> Self {
        if let Some(v) = value.as_known() {
            self.fields.insert(key.to_string(), Json::from(*v));
        }
        self
    }

    pub(crate) fn f64(mut self, key: &str, value: &Value<f64>) -> Self {
        if let Some(n) = value.as_known().and_then(|v| Number::from_f64(*v)) {
            self.fields.insert(key.to_string(), Json::Number(n));
        }
        self
    }

    pub(crate) fn json(mut self, key: &str, value: &Value<Json>) -> Self {
        if let Some(v) = value.as_known() {
            self.fields.insert(key.to_string(), v.clone());
        }
        self
    }

    /// Write the wire id of a catalog name.
    pub(crate) fn mapped(
        mut self,
        key: &str,
        value: &Value<String>,
        table: &[(&'static str, &'static str)],
        what: &str,
    ) -> Result<Self> {
        if let Some(name) = value.as_known() {
            let id = catalog::id_for(table, name)
                .ok_or_else(|| SentryError::codec(format!("Invalid {what} \"{name}\"")))?;
            self.fields
                .insert(key.to_string(), Json::String(id.to_string()));
        }
        Ok(self)
    }

    pub(crate) fn build(self) -> Json {
        Json::Object(self.fields)
    }
}

/// Keep the one encoded variant of a container, or fail when zero or
/// several were set.
pub(crate) fn exactly_one(encoded: Vec<Result<Json>>, kind: &str) -> Result<Json> {
    let mut encoded = encoded.into_iter();
    match (encoded.next(), encoded.next()) {
        (Some(only), None) => only,
        _ => Err(SentryError::codec(format!("Exactly one {kind} must be set"))),
    }
}

/// Encode a list of containers as a JSON array.
///
/// # Errors
///
/// Fails on the first element that cannot be encoded.
pub fn encode_list<T>(items: &[T], encode: impl Fn(&T) -> Result<Json>) -> Result<Json> {
    items
        .iter()
        .map(encode)
        .collect::<Result<Vec<_>>>()
        .map(Json::Array)
}

/// Decode a JSON array into containers.
///
/// # Errors
///
/// Fails on the first element that cannot be decoded.
pub fn decode_list<T>(items: &[Json], decode: impl Fn(&Json) -> Result<T>) -> Result<Vec<T>> {
    items.iter().map(decode).collect()
}

/// Check a raw rule element list supplied by the user: every element must
/// be an object carrying `id`, and none may carry the Service-computed
/// `name`.
///
/// Returns one message per offending element.
#[must_use]
pub fn check_raw_elements(raw: &Json, kind: &str) -> Vec<String> {
    let Some(items) = raw.as_array() else {
        return vec![format!("{kind}s must be a JSON array")];
    };
    let mut problems = Vec::new();
    for (index, item) in items.iter().enumerate() {
        let Some(fields) = item.as_object() else {
            problems.push(format!("{kind} {index} must be a JSON object"));
            continue;
        };
        if !fields.get("id").is_some_and(Json::is_string) {
            problems.push(format!("{kind} {index} is missing \"id\""));
        }
        if fields.contains_key("name") {
            problems.push(format!(
                "{kind} {index} must not set \"name\", it is computed by Sentry"
            ));
        }
    }
    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_element_readers() {
        let raw = json!({
            "id": "x",
            "text": "a",
            "number": 42,
            "numeric_text": "7",
            "empty": "",
            "nothing": null
        });
        let element = Element::parse(&raw, "condition").unwrap();
        assert_eq!(element.id(), "x");
        assert_eq!(element.opt_str("text"), Value::from("a"));
        assert_eq!(element.opt_str("number"), Value::from("42"));
        assert_eq!(element.opt_str("nothing"), Value::Null);
        assert_eq!(element.opt_non_empty_str("empty"), Value::Null);
        assert_eq!(element.req_i64("numeric_text").unwrap(), Value::Known(7));
        assert_eq!(element.req_i64("number").unwrap(), Value::Known(42));
        assert!(element.req_i64("text").is_err());

        let err = element.req_str("absent").unwrap_err();
        assert_eq!(err.to_string(), "x: missing field \"absent\"");
    }

    #[test]
    fn test_element_requires_id() {
        assert!(Element::parse(&json!({"name": "n"}), "filter").is_err());
        assert!(Element::parse(&json!("x"), "filter").is_err());
    }

    #[test]
    fn test_builder_skips_unset() {
        let built = ElementBuilder::new("x")
            .str("a", &Value::from("1"))
            .str("b", &Value::Null)
            .str("c", &Value::Unknown)
            .i64("d", &Value::Known(3))
            .build();
        assert_eq!(built, json!({"id": "x", "a": "1", "d": 3}));
    }

    #[test]
    fn test_exactly_one() {
        assert!(exactly_one(vec![Ok(json!(1))], "condition").is_ok());
        let err = exactly_one(vec![], "condition").unwrap_err();
        assert_eq!(err.to_string(), "Exactly one condition must be set");
        let err = exactly_one(vec![Ok(json!(1)), Ok(json!(2))], "action").unwrap_err();
        assert_eq!(err.to_string(), "Exactly one action must be set");
    }

    #[test]
    fn test_check_raw_elements() {
        assert!(check_raw_elements(&json!([{"id": "a"}]), "condition").is_empty());
        let problems = check_raw_elements(
            &json!([{"id": "a", "name": "computed"}, {"interval": "1h"}, 3]),
            "condition",
        );
        assert_eq!(problems.len(), 3);
        assert_eq!(check_raw_elements(&json!({}), "filter").len(), 1);
    }
}
