//! Issue alert conditions.

use serde_json::Value as Json;

use super::catalog::conditions as ids;
use super::{exactly_one, Element, ElementBuilder, Named};
use crate::attr::Value;
use crate::error::{Result, SentryError};

/// Event count (or unique user count) over an interval.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFrequency {
    pub name: Value<String>,
    pub comparison_type: Value<String>,
    pub comparison_interval: Value<String>,
    pub value: Value<i64>,
    pub interval: Value<String>,
}

impl EventFrequency {
    fn from_api(element: &Element<'_>) -> Result<Self> {
        Ok(Self {
            name: element.opt_str("name"),
            comparison_type: element.req_str("comparisonType")?,
            comparison_interval: element.opt_str("comparisonInterval"),
            value: element.req_i64("value")?,
            interval: element.req_str("interval")?,
        })
    }

    fn to_api(&self, id: &str) -> Json {
        ElementBuilder::new(id)
            .str("name", &self.name)
            .str("comparisonType", &self.comparison_type)
            .str("comparisonInterval", &self.comparison_interval)
            .i64("value", &self.value)
            .str("interval", &self.interval)
            .build()
    }
}

/// Percentage of sessions affected over an interval.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFrequencyPercent {
    pub name: Value<String>,
    pub comparison_type: Value<String>,
    pub comparison_interval: Value<String>,
    pub value: Value<f64>,
    pub interval: Value<String>,
}

impl EventFrequencyPercent {
    fn from_api(element: &Element<'_>) -> Result<Self> {
        Ok(Self {
            name: element.opt_str("name"),
            comparison_type: element.req_str("comparisonType")?,
            comparison_interval: element.opt_str("comparisonInterval"),
            value: element.req_f64("value")?,
            interval: element.req_str("interval")?,
        })
    }

    fn to_api(&self) -> Json {
        ElementBuilder::new(ids::EVENT_FREQUENCY_PERCENT)
            .str("name", &self.name)
            .str("comparisonType", &self.comparison_type)
            .str("comparisonInterval", &self.comparison_interval)
            .f64("value", &self.value)
            .str("interval", &self.interval)
            .build()
    }
}

/// One condition; exactly one field must be set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Condition {
    pub first_seen_event: Option<Named>,
    pub regression_event: Option<Named>,
    pub reappeared_event: Option<Named>,
    pub new_high_priority_issue: Option<Named>,
    pub existing_high_priority_issue: Option<Named>,
    pub event_frequency: Option<EventFrequency>,
    pub event_unique_user_frequency: Option<EventFrequency>,
    pub event_frequency_percent: Option<EventFrequencyPercent>,
}

impl Condition {
    /// Encode to the wire element.
    ///
    /// # Errors
    ///
    /// Returns `Exactly one condition must be set` unless exactly one
    /// variant is populated.
    pub fn to_api(&self) -> Result<Json> {
        let named = [
            (self.first_seen_event.as_ref(), ids::FIRST_SEEN_EVENT),
            (self.regression_event.as_ref(), ids::REGRESSION_EVENT),
            (self.reappeared_event.as_ref(), ids::REAPPEARED_EVENT),
            (self.new_high_priority_issue.as_ref(), ids::NEW_HIGH_PRIORITY_ISSUE),
            (
                self.existing_high_priority_issue.as_ref(),
                ids::EXISTING_HIGH_PRIORITY_ISSUE,
            ),
        ];
        let mut encoded: Vec<Result<Json>> = named
            .into_iter()
            .filter_map(|(variant, id)| variant.map(|v| Ok(v.to_api(id))))
            .collect();
        if let Some(v) = &self.event_frequency {
            encoded.push(Ok(v.to_api(ids::EVENT_FREQUENCY)));
        }
        if let Some(v) = &self.event_unique_user_frequency {
            encoded.push(Ok(v.to_api(ids::EVENT_UNIQUE_USER_FREQUENCY)));
        }
        if let Some(v) = &self.event_frequency_percent {
            encoded.push(Ok(v.to_api()));
        }
        exactly_one(encoded, "condition")
    }

    /// Decode a wire element, dispatching on its `id`.
    ///
    /// # Errors
    ///
    /// Fails on unknown ids and on elements missing required fields.
    pub fn from_api(value: &Json) -> Result<Self> {
        let element = Element::parse(value, "condition")?;
        let mut condition = Self::default();
        match element.id() {
            ids::FIRST_SEEN_EVENT => condition.first_seen_event = Some(Named::from_api(&element)),
            ids::REGRESSION_EVENT => condition.regression_event = Some(Named::from_api(&element)),
            ids::REAPPEARED_EVENT => condition.reappeared_event = Some(Named::from_api(&element)),
            ids::NEW_HIGH_PRIORITY_ISSUE => {
                condition.new_high_priority_issue = Some(Named::from_api(&element));
            }
            ids::EXISTING_HIGH_PRIORITY_ISSUE => {
                condition.existing_high_priority_issue = Some(Named::from_api(&element));
            }
            ids::EVENT_FREQUENCY => {
                condition.event_frequency = Some(EventFrequency::from_api(&element)?);
            }
            ids::EVENT_UNIQUE_USER_FREQUENCY => {
                condition.event_unique_user_frequency = Some(EventFrequency::from_api(&element)?);
            }
            ids::EVENT_FREQUENCY_PERCENT => {
                condition.event_frequency_percent =
                    Some(EventFrequencyPercent::from_api(&element)?);
            }
            other => {
                return Err(SentryError::codec(format!(
                    "Unsupported condition type \"{other}\""
                )))
            }
        }
        Ok(condition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn frequency() -> EventFrequency {
        EventFrequency {
            name: Value::Null,
            comparison_type: Value::from("count"),
            comparison_interval: Value::Null,
            value: Value::Known(100),
            interval: Value::from("1h"),
        }
    }

    #[test]
    fn test_first_seen_event_wire_form() {
        let condition = Condition {
            first_seen_event: Some(Named::default()),
            ..Default::default()
        };
        assert_eq!(
            condition.to_api().unwrap(),
            json!({"id": "sentry.rules.conditions.first_seen_event.FirstSeenEventCondition"})
        );
    }

    #[test]
    fn test_event_frequency_round_trip() {
        let condition = Condition {
            event_frequency: Some(frequency()),
            ..Default::default()
        };
        let wire = condition.to_api().unwrap();
        assert_eq!(
            wire,
            json!({
                "id": "sentry.rules.conditions.event_frequency.EventFrequencyCondition",
                "comparisonType": "count",
                "value": 100,
                "interval": "1h"
            })
        );
        assert_eq!(Condition::from_api(&wire).unwrap(), condition);
    }

    #[test]
    fn test_from_api_fills_computed_name() {
        let wire = json!({
            "id": "sentry.rules.conditions.event_frequency.EventUniqueUserFrequencyCondition",
            "name": "The issue is seen by more than 10 users in 1h",
            "comparisonType": "percent",
            "comparisonInterval": "1w",
            "value": "10",
            "interval": "1h"
        });
        let condition = Condition::from_api(&wire).unwrap();
        let variant = condition.event_unique_user_frequency.unwrap();
        assert_eq!(
            variant.name.as_deref(),
            Some("The issue is seen by more than 10 users in 1h")
        );
        assert_eq!(variant.value, Value::Known(10));
        assert_eq!(variant.comparison_interval.as_deref(), Some("1w"));
    }

    #[test]
    fn test_percent_value_is_float() {
        let wire = json!({
            "id": "sentry.rules.conditions.event_frequency.EventFrequencyPercentCondition",
            "comparisonType": "count",
            "value": 12.5,
            "interval": "5m"
        });
        let condition = Condition::from_api(&wire).unwrap();
        assert_eq!(
            condition.event_frequency_percent.as_ref().unwrap().value,
            Value::Known(12.5)
        );
        assert_eq!(Condition::from_api(&condition.to_api().unwrap()).unwrap(), condition);
    }

    #[test]
    fn test_exactly_one_condition() {
        let err = Condition::default().to_api().unwrap_err();
        assert_eq!(err.to_string(), "Exactly one condition must be set");

        let both = Condition {
            first_seen_event: Some(Named::default()),
            event_frequency: Some(frequency()),
            ..Default::default()
        };
        assert_eq!(
            both.to_api().unwrap_err().to_string(),
            "Exactly one condition must be set"
        );
    }

    #[test]
    fn test_unknown_condition_rejected() {
        let err = Condition::from_api(&json!({"id": "sentry.rules.conditions.nope"})).unwrap_err();
        assert!(err.to_string().contains("sentry.rules.conditions.nope"));
    }

    #[test]
    fn test_every_condition_round_trips() {
        let named = || {
            Some(Named {
                name: Value::from("A new issue is created"),
            })
        };
        let frequency = || {
            Some(EventFrequency {
                name: Value::from("The issue is seen more than 100 times in 1h"),
                comparison_type: Value::from("percent"),
                comparison_interval: Value::from("1w"),
                value: Value::Known(100),
                interval: Value::from("1h"),
            })
        };
        let cases = [
            Condition {
                first_seen_event: named(),
                ..Default::default()
            },
            Condition {
                regression_event: named(),
                ..Default::default()
            },
            Condition {
                reappeared_event: named(),
                ..Default::default()
            },
            Condition {
                new_high_priority_issue: named(),
                ..Default::default()
            },
            Condition {
                existing_high_priority_issue: named(),
                ..Default::default()
            },
            Condition {
                event_frequency: frequency(),
                ..Default::default()
            },
            Condition {
                event_unique_user_frequency: frequency(),
                ..Default::default()
            },
            Condition {
                event_frequency_percent: Some(EventFrequencyPercent {
                    name: Value::from("Percent of sessions affected by an issue is more than 12.5% in 5m"),
                    comparison_type: Value::from("count"),
                    comparison_interval: Value::Null,
                    value: Value::Known(12.5),
                    interval: Value::from("5m"),
                }),
                ..Default::default()
            },
        ];

        for condition in cases {
            let wire = condition.to_api().unwrap();
            assert_eq!(Condition::from_api(&wire).unwrap(), condition, "{wire}");
        }
    }
}
