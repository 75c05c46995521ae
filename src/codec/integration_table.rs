//! Rows of an organization integration's embedded tables.
//!
//! PagerDuty keeps its services in `configData.service_table` and Opsgenie
//! its teams in `configData.team_table`. Row ids are assigned by the Service
//! and arrive as numbers or strings; they are normalized to strings here.
//! Rows are added by sending the whole table back with a placeholder id of
//! `0` and then locating the row whose id was not seen before.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value as Json};

use crate::error::{Result, SentryError};

/// Id sent for rows that do not exist yet.
pub const NEW_ROW_ID: &str = "0";

fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Json::deserialize(deserializer)? {
        Json::String(s) => Ok(s),
        Json::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number id, got {other}"
        ))),
    }
}

fn serialize_id<S>(id: &str, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match id.parse::<i64>() {
        Ok(n) => serializer.serialize_i64(n),
        Err(_) => serializer.serialize_str(id),
    }
}

/// A table row keyed by a Service-assigned id.
pub trait TableRow: Clone + Serialize + for<'de> Deserialize<'de> {
    /// Key of the table inside `configData`.
    const TABLE: &'static str;

    fn id(&self) -> &str;

    /// Whether the user-supplied fields are equal.
    fn same_fields(&self, other: &Self) -> bool;

    /// Copy of `self` with another id.
    #[must_use]
    fn with_id(&self, id: &str) -> Self;
}

/// A PagerDuty service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceTableRow {
    #[serde(deserialize_with = "deserialize_id", serialize_with = "serialize_id")]
    pub id: String,
    pub service: String,
    pub integration_key: String,
}

impl TableRow for ServiceTableRow {
    const TABLE: &'static str = "service_table";

    fn id(&self) -> &str {
        &self.id
    }

    fn same_fields(&self, other: &Self) -> bool {
        self.service == other.service && self.integration_key == other.integration_key
    }

    fn with_id(&self, id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..self.clone()
        }
    }
}

/// An Opsgenie team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamTableRow {
    #[serde(deserialize_with = "deserialize_id", serialize_with = "serialize_id")]
    pub id: String,
    pub team: String,
    pub integration_key: String,
}

impl TableRow for TeamTableRow {
    const TABLE: &'static str = "team_table";

    fn id(&self) -> &str {
        &self.id
    }

    fn same_fields(&self, other: &Self) -> bool {
        self.team == other.team && self.integration_key == other.integration_key
    }

    fn with_id(&self, id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..self.clone()
        }
    }
}

/// Decode the table out of an integration's `configData`. A missing or
/// null table is empty.
///
/// # Errors
///
/// Fails when the table is not an array of rows.
pub fn read_table<R: TableRow>(config_data: &Json) -> Result<Vec<R>> {
    match config_data.get(R::TABLE) {
        None | Some(Json::Null) => Ok(Vec::new()),
        Some(table) => Ok(Vec::<R>::deserialize(table)?),
    }
}

/// Put `rows` back into `config_data`, keeping every other key.
///
/// # Errors
///
/// Fails when a row cannot be serialized.
pub fn write_table<R: TableRow>(config_data: &Json, rows: &[R]) -> Result<Json> {
    let mut data = match config_data {
        Json::Object(map) => map.clone(),
        Json::Null => Map::new(),
        _ => return Err(SentryError::codec("configData is not an object")),
    };
    data.insert(R::TABLE.to_string(), serde_json::to_value(rows)?);
    Ok(Json::Object(data))
}

/// Ids currently in the table.
#[must_use]
pub fn seen_ids<R: TableRow>(rows: &[R]) -> HashSet<String> {
    rows.iter().map(|row| row.id().to_string()).collect()
}

/// The row that was not in `seen` and carries the wanted fields.
#[must_use]
pub fn find_new_row<'a, R: TableRow>(
    rows: &'a [R],
    seen: &HashSet<String>,
    wanted: &R,
) -> Option<&'a R> {
    rows.iter()
        .find(|row| !seen.contains(row.id()) && row.same_fields(wanted))
}

#[must_use]
pub fn find_row<'a, R: TableRow>(rows: &'a [R], id: &str) -> Option<&'a R> {
    rows.iter().find(|row| row.id() == id)
}

/// Remove the row with `id`. Returns whether one was removed.
pub fn remove_row<R: TableRow>(rows: &mut Vec<R>, id: &str) -> bool {
    let before = rows.len();
    rows.retain(|row| row.id() != id);
    rows.len() != before
}

/// Replace the fields of the row with `id`, keeping its id. Returns whether
/// the row was found.
pub fn replace_row<R: TableRow>(rows: &mut [R], id: &str, fields: &R) -> bool {
    match rows.iter_mut().find(|row| row.id() == id) {
        Some(row) => {
            *row = fields.with_id(id);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(id: &str, service: &str, key: &str) -> ServiceTableRow {
        ServiceTableRow {
            id: id.to_string(),
            service: service.to_string(),
            integration_key: key.to_string(),
        }
    }

    #[test]
    fn test_read_table_normalizes_ids() {
        let data = json!({
            "service_table": [
                {"id": 7, "service": "A", "integration_key": "a"},
                {"id": "9", "service": "B", "integration_key": "b"}
            ]
        });
        let rows: Vec<ServiceTableRow> = read_table(&data).unwrap();
        assert_eq!(rows, vec![row("7", "A", "a"), row("9", "B", "b")]);

        let empty: Vec<TeamTableRow> = read_table(&json!({})).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_write_table_keeps_other_keys() {
        let data = json!({"service_table": [], "other": true});
        let rows = vec![row("7", "A", "a"), row(NEW_ROW_ID, "S", "K")];
        let written = write_table(&data, &rows).unwrap();
        assert_eq!(
            written,
            json!({
                "other": true,
                "service_table": [
                    {"id": 7, "service": "A", "integration_key": "a"},
                    {"id": 0, "service": "S", "integration_key": "K"}
                ]
            })
        );
    }

    #[test]
    fn test_find_new_row() {
        let before = vec![row("7", "A", "a"), row("9", "S", "K")];
        let seen = seen_ids(&before);
        let after = vec![row("7", "A", "a"), row("9", "S", "K"), row("42", "S", "K")];

        let wanted = row(NEW_ROW_ID, "S", "K");
        assert_eq!(find_new_row(&after, &seen, &wanted).unwrap().id, "42");

        let missing = row(NEW_ROW_ID, "X", "K");
        assert!(find_new_row(&after, &seen, &missing).is_none());
    }

    #[test]
    fn test_remove_and_replace() {
        let mut rows = vec![row("7", "A", "a"), row("9", "B", "b")];
        assert!(replace_row(&mut rows, "9", &row("", "C", "c")));
        assert_eq!(find_row(&rows, "9"), Some(&row("9", "C", "c")));
        assert!(!replace_row(&mut rows, "10", &row("", "C", "c")));

        assert!(remove_row(&mut rows, "7"));
        assert!(!remove_row(&mut rows, "7"));
        assert_eq!(rows.len(), 1);
    }
}
