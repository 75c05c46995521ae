//! Issue alert filters.

use serde_json::Value as Json;

use super::catalog::{self, filters as ids};
use super::{exactly_one, Element, ElementBuilder, Named};
use crate::attr::Value;
use crate::error::{Result, SentryError};

const MATCH_TYPE: &str = "match type";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgeComparison {
    pub name: Value<String>,
    pub comparison_type: Value<String>,
    pub value: Value<i64>,
    pub time: Value<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueOccurrences {
    pub name: Value<String>,
    pub value: Value<i64>,
}

/// The issue is assigned to a team, a member, or nobody. The identifier
/// arrives as a number or a string; an empty string means unassigned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignedTo {
    pub name: Value<String>,
    pub target_type: Value<String>,
    pub target_identifier: Value<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LatestAdoptedRelease {
    pub name: Value<String>,
    pub oldest_or_newest: Value<String>,
    pub older_or_newer: Value<String>,
    pub environment: Value<String>,
}

/// `value` holds the category name, e.g. `Performance`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueCategory {
    pub name: Value<String>,
    pub value: Value<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventAttribute {
    pub name: Value<String>,
    pub attribute: Value<String>,
    pub r#match: Value<String>,
    pub value: Value<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaggedEvent {
    pub name: Value<String>,
    pub key: Value<String>,
    pub r#match: Value<String>,
    pub value: Value<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Level {
    pub name: Value<String>,
    pub r#match: Value<String>,
    pub level: Value<String>,
}

/// One filter; exactly one field must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub age_comparison: Option<AgeComparison>,
    pub issue_occurrences: Option<IssueOccurrences>,
    pub assigned_to: Option<AssignedTo>,
    pub latest_adopted_release: Option<LatestAdoptedRelease>,
    pub latest_release: Option<Named>,
    pub issue_category: Option<IssueCategory>,
    pub event_attribute: Option<EventAttribute>,
    pub tagged_event: Option<TaggedEvent>,
    pub level: Option<Level>,
}

impl Filter {
    /// Encode to the wire element.
    ///
    /// # Errors
    ///
    /// Returns `Exactly one filter must be set` unless exactly one variant is
    /// populated, or an error for names missing from the catalogs.
    pub fn to_api(&self) -> Result<Json> {
        let mut encoded: Vec<Result<Json>> = Vec::new();

        if let Some(f) = &self.age_comparison {
            encoded.push(Ok(ElementBuilder::new(ids::AGE_COMPARISON)
                .str("name", &f.name)
                .str("comparison_type", &f.comparison_type)
                .i64("value", &f.value)
                .str("time", &f.time)
                .build()));
        }
        if let Some(f) = &self.issue_occurrences {
            encoded.push(Ok(ElementBuilder::new(ids::ISSUE_OCCURRENCES)
                .str("name", &f.name)
                .i64("value", &f.value)
                .build()));
        }
        if let Some(f) = &self.assigned_to {
            encoded.push(Ok(ElementBuilder::new(ids::ASSIGNED_TO)
                .str("name", &f.name)
                .str("targetType", &f.target_type)
                .str("targetIdentifier", &f.target_identifier)
                .build()));
        }
        if let Some(f) = &self.latest_adopted_release {
            encoded.push(Ok(ElementBuilder::new(ids::LATEST_ADOPTED_RELEASE)
                .str("name", &f.name)
                .str("oldest_or_newest", &f.oldest_or_newest)
                .str("older_or_newer", &f.older_or_newer)
                .str("environment", &f.environment)
                .build()));
        }
        if let Some(f) = &self.latest_release {
            encoded.push(Ok(f.to_api(ids::LATEST_RELEASE)));
        }
        if let Some(f) = &self.issue_category {
            encoded.push(
                ElementBuilder::new(ids::ISSUE_CATEGORY)
                    .str("name", &f.name)
                    .mapped(
                        "value",
                        &f.value,
                        catalog::ISSUE_GROUP_CATEGORIES,
                        "issue category",
                    )
                    .map(ElementBuilder::build),
            );
        }
        if let Some(f) = &self.event_attribute {
            encoded.push(
                ElementBuilder::new(ids::EVENT_ATTRIBUTE)
                    .str("name", &f.name)
                    .str("attribute", &f.attribute)
                    .mapped("match", &f.r#match, catalog::MATCH_TYPES, MATCH_TYPE)
                    .map(|b| b.str("value", &f.value).build()),
            );
        }
        if let Some(f) = &self.tagged_event {
            encoded.push(
                ElementBuilder::new(ids::TAGGED_EVENT)
                    .str("name", &f.name)
                    .str("key", &f.key)
                    .mapped("match", &f.r#match, catalog::MATCH_TYPES, MATCH_TYPE)
                    .map(|b| b.str("value", &f.value).build()),
            );
        }
        if let Some(f) = &self.level {
            encoded.push(
                ElementBuilder::new(ids::LEVEL)
                    .str("name", &f.name)
                    .mapped("match", &f.r#match, catalog::MATCH_TYPES, MATCH_TYPE)
                    .and_then(|b| b.mapped("level", &f.level, catalog::LOG_LEVELS, "level"))
                    .map(ElementBuilder::build),
            );
        }

        exactly_one(encoded, "filter")
    }

    /// Decode a wire element, dispatching on its `id`.
    ///
    /// # Errors
    ///
    /// Fails on unknown ids, missing required fields and values that are not
    /// in the catalogs (`Invalid match type "xx"`).
    pub fn from_api(value: &Json) -> Result<Self> {
        let e = Element::parse(value, "filter")?;
        let mut filter = Self::default();
        match e.id() {
            ids::AGE_COMPARISON => {
                filter.age_comparison = Some(AgeComparison {
                    name: e.opt_str("name"),
                    comparison_type: e.req_str("comparison_type")?,
                    value: e.req_i64("value")?,
                    time: e.req_str("time")?,
                });
            }
            ids::ISSUE_OCCURRENCES => {
                filter.issue_occurrences = Some(IssueOccurrences {
                    name: e.opt_str("name"),
                    value: e.req_i64("value")?,
                });
            }
            ids::ASSIGNED_TO => {
                filter.assigned_to = Some(AssignedTo {
                    name: e.opt_str("name"),
                    target_type: e.req_str("targetType")?,
                    target_identifier: e.opt_non_empty_str("targetIdentifier"),
                });
            }
            ids::LATEST_ADOPTED_RELEASE => {
                filter.latest_adopted_release = Some(LatestAdoptedRelease {
                    name: e.opt_str("name"),
                    oldest_or_newest: e.req_str("oldest_or_newest")?,
                    older_or_newer: e.req_str("older_or_newer")?,
                    environment: e.req_str("environment")?,
                });
            }
            ids::LATEST_RELEASE => filter.latest_release = Some(Named::from_api(&e)),
            ids::ISSUE_CATEGORY => {
                filter.issue_category = Some(IssueCategory {
                    name: e.opt_str("name"),
                    value: e.mapped("value", catalog::ISSUE_GROUP_CATEGORIES, "issue category")?,
                });
            }
            ids::EVENT_ATTRIBUTE => {
                filter.event_attribute = Some(EventAttribute {
                    name: e.opt_str("name"),
                    attribute: e.req_str("attribute")?,
                    r#match: e.mapped("match", catalog::MATCH_TYPES, MATCH_TYPE)?,
                    value: e.opt_non_empty_str("value"),
                });
            }
            ids::TAGGED_EVENT => {
                filter.tagged_event = Some(TaggedEvent {
                    name: e.opt_str("name"),
                    key: e.req_str("key")?,
                    r#match: e.mapped("match", catalog::MATCH_TYPES, MATCH_TYPE)?,
                    value: e.opt_non_empty_str("value"),
                });
            }
            ids::LEVEL => {
                filter.level = Some(Level {
                    name: e.opt_str("name"),
                    r#match: e.mapped("match", catalog::MATCH_TYPES, MATCH_TYPE)?,
                    level: e.mapped("level", catalog::LOG_LEVELS, "level")?,
                });
            }
            other => {
                return Err(SentryError::codec(format!(
                    "Unsupported filter type \"{other}\""
                )))
            }
        }
        Ok(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_level_maps_names_to_ids() {
        let filter = Filter {
            level: Some(Level {
                name: Value::Null,
                r#match: Value::from("GREATER_OR_EQUAL"),
                level: Value::from("error"),
            }),
            ..Default::default()
        };
        let wire = filter.to_api().unwrap();
        assert_eq!(
            wire,
            json!({"id": "sentry.rules.filters.level.LevelFilter", "match": "gte", "level": "40"})
        );
        assert_eq!(Filter::from_api(&wire).unwrap(), filter);
    }

    #[test]
    fn test_issue_category_round_trip() {
        let wire = json!({
            "id": "sentry.rules.filters.issue_category.IssueCategoryFilter",
            "name": "The issue's category is equal to Performance",
            "value": "2"
        });
        let filter = Filter::from_api(&wire).unwrap();
        let category = filter.issue_category.as_ref().unwrap();
        assert_eq!(category.value.as_deref(), Some("Performance"));
        assert_eq!(filter.to_api().unwrap(), wire);
    }

    #[test]
    fn test_assigned_to_accepts_numeric_identifier() {
        let wire = json!({
            "id": "sentry.rules.filters.assigned_to.AssignedToFilter",
            "targetType": "Team",
            "targetIdentifier": 4524986
        });
        let filter = Filter::from_api(&wire).unwrap();
        assert_eq!(
            filter.assigned_to.unwrap().target_identifier.as_deref(),
            Some("4524986")
        );

        let unassigned = json!({
            "id": "sentry.rules.filters.assigned_to.AssignedToFilter",
            "targetType": "Unassigned",
            "targetIdentifier": ""
        });
        let filter = Filter::from_api(&unassigned).unwrap();
        assert!(filter.assigned_to.unwrap().target_identifier.is_null());
    }

    #[test]
    fn test_tagged_event_empty_value_is_null() {
        let wire = json!({
            "id": "sentry.rules.filters.tagged_event.TaggedEventFilter",
            "key": "environment",
            "match": "is",
            "value": ""
        });
        let filter = Filter::from_api(&wire).unwrap();
        let tagged = filter.tagged_event.as_ref().unwrap();
        assert_eq!(tagged.r#match.as_deref(), Some("IS_SET"));
        assert!(tagged.value.is_null());
        assert_eq!(
            filter.to_api().unwrap(),
            json!({
                "id": "sentry.rules.filters.tagged_event.TaggedEventFilter",
                "key": "environment",
                "match": "is"
            })
        );
    }

    #[test]
    fn test_invalid_catalog_values() {
        let wire = json!({
            "id": "sentry.rules.filters.event_attribute.EventAttributeFilter",
            "attribute": "message",
            "match": "zz",
            "value": "x"
        });
        assert_eq!(
            Filter::from_api(&wire).unwrap_err().to_string(),
            "Invalid match type \"zz\""
        );

        let wire = json!({
            "id": "sentry.rules.filters.level.LevelFilter",
            "match": "eq",
            "level": "99"
        });
        assert_eq!(
            Filter::from_api(&wire).unwrap_err().to_string(),
            "Invalid level \"99\""
        );

        let wire = json!({
            "id": "sentry.rules.filters.issue_category.IssueCategoryFilter",
            "value": "42"
        });
        assert_eq!(
            Filter::from_api(&wire).unwrap_err().to_string(),
            "Invalid issue category \"42\""
        );
    }

    #[test]
    fn test_exactly_one_filter() {
        assert_eq!(
            Filter::default().to_api().unwrap_err().to_string(),
            "Exactly one filter must be set"
        );
        let both = Filter {
            latest_release: Some(Named::default()),
            issue_occurrences: Some(IssueOccurrences {
                name: Value::Null,
                value: Value::Known(5),
            }),
            ..Default::default()
        };
        assert_eq!(
            both.to_api().unwrap_err().to_string(),
            "Exactly one filter must be set"
        );
    }

    #[test]
    fn test_every_filter_round_trips() {
        let name = || Value::from("computed by Sentry");
        let cases = [
            Filter {
                age_comparison: Some(AgeComparison {
                    name: name(),
                    comparison_type: Value::from("older"),
                    value: Value::Known(3),
                    time: Value::from("week"),
                }),
                ..Default::default()
            },
            Filter {
                issue_occurrences: Some(IssueOccurrences {
                    name: name(),
                    value: Value::Known(25),
                }),
                ..Default::default()
            },
            Filter {
                assigned_to: Some(AssignedTo {
                    name: name(),
                    target_type: Value::from("Team"),
                    target_identifier: Value::from("4524986"),
                }),
                ..Default::default()
            },
            Filter {
                latest_adopted_release: Some(LatestAdoptedRelease {
                    name: name(),
                    oldest_or_newest: Value::from("oldest"),
                    older_or_newer: Value::from("older"),
                    environment: Value::from("production"),
                }),
                ..Default::default()
            },
            Filter {
                latest_release: Some(Named { name: name() }),
                ..Default::default()
            },
            Filter {
                issue_category: Some(IssueCategory {
                    name: name(),
                    value: Value::from("Cron"),
                }),
                ..Default::default()
            },
            Filter {
                event_attribute: Some(EventAttribute {
                    name: name(),
                    attribute: Value::from("message"),
                    r#match: Value::from("CONTAINS"),
                    value: Value::from("timeout"),
                }),
                ..Default::default()
            },
            Filter {
                tagged_event: Some(TaggedEvent {
                    name: name(),
                    key: Value::from("environment"),
                    r#match: Value::from("NOT_EQUAL"),
                    value: Value::from("staging"),
                }),
                ..Default::default()
            },
            Filter {
                level: Some(Level {
                    name: name(),
                    r#match: Value::from("EQUAL"),
                    level: Value::from("fatal"),
                }),
                ..Default::default()
            },
        ];

        for filter in cases {
            let wire = filter.to_api().unwrap();
            assert_eq!(Filter::from_api(&wire).unwrap(), filter, "{wire}");
        }
    }
}
