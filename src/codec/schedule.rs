//! Monitor schedules.
//!
//! On the wire a monitor config carries `schedule_type` next to `schedule`,
//! which is either a crontab string or a two-element `[n, "unit"]` array.
//! The model exposes `schedule_crontab` and a `schedule_interval` object with
//! one nullable field per unit; exactly one of all of these is set.

use std::fmt;
use std::str::FromStr;

use serde_json::Value as Json;

use crate::attr::Value;
use crate::error::{Result, SentryError};

pub const SCHEDULE_TYPE_CRONTAB: &str = "crontab";
pub const SCHEDULE_TYPE_INTERVAL: &str = "interval";

/// Interval units, largest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntervalUnit {
    Year,
    Month,
    Week,
    Day,
    Hour,
    Minute,
}

impl IntervalUnit {
    pub const ALL: [IntervalUnit; 6] = [
        Self::Year,
        Self::Month,
        Self::Week,
        Self::Day,
        Self::Hour,
        Self::Minute,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Month => "month",
            Self::Week => "week",
            Self::Day => "day",
            Self::Hour => "hour",
            Self::Minute => "minute",
        }
    }
}

impl fmt::Display for IntervalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntervalUnit {
    type Err = SentryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|unit| unit.as_str() == s)
            .ok_or_else(|| SentryError::codec(format!("Invalid schedule unit \"{s}\"")))
    }
}

/// A monitor schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schedule {
    Crontab(String),
    Interval(i64, IntervalUnit),
}

impl Schedule {
    /// Value of the wire `schedule_type` field.
    #[must_use]
    pub fn schedule_type(&self) -> &'static str {
        match self {
            Self::Crontab(_) => SCHEDULE_TYPE_CRONTAB,
            Self::Interval(..) => SCHEDULE_TYPE_INTERVAL,
        }
    }

    /// Value of the wire `schedule` field.
    #[must_use]
    pub fn to_wire(&self) -> Json {
        match self {
            Self::Crontab(crontab) => Json::String(crontab.clone()),
            Self::Interval(n, unit) => Json::Array(vec![
                Json::from(*n),
                Json::String(unit.as_str().to_string()),
            ]),
        }
    }

    /// Parse the wire pair. When `schedule_type` is missing the shape of
    /// `schedule` decides.
    ///
    /// # Errors
    ///
    /// Fails on unknown schedule types and malformed schedules.
    pub fn from_wire(schedule_type: Option<&str>, schedule: &Json) -> Result<Self> {
        match (schedule_type, schedule) {
            (Some(SCHEDULE_TYPE_CRONTAB) | None, Json::String(crontab)) => {
                Ok(Self::Crontab(crontab.clone()))
            }
            (Some(SCHEDULE_TYPE_INTERVAL) | None, Json::Array(parts)) => parse_interval(parts),
            (Some(other), _) if other != SCHEDULE_TYPE_CRONTAB && other != SCHEDULE_TYPE_INTERVAL => {
                Err(SentryError::codec(format!("Invalid schedule type \"{other}\"")))
            }
            _ => Err(invalid_schedule()),
        }
    }
}

fn invalid_schedule() -> SentryError {
    SentryError::codec("Invalid schedule")
}

fn parse_interval(parts: &[Json]) -> Result<Schedule> {
    let [number, unit] = parts else {
        return Err(invalid_schedule());
    };
    let number = match number {
        Json::Number(n) => n.as_i64(),
        Json::String(s) => s.parse().ok(),
        _ => None,
    }
    .ok_or_else(invalid_schedule)?;
    let unit = unit.as_str().ok_or_else(invalid_schedule)?.parse()?;
    Ok(Schedule::Interval(number, unit))
}

/// The `schedule_interval` model object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleInterval {
    pub year: Value<i64>,
    pub month: Value<i64>,
    pub week: Value<i64>,
    pub day: Value<i64>,
    pub hour: Value<i64>,
    pub minute: Value<i64>,
}

impl ScheduleInterval {
    fn field(&self, unit: IntervalUnit) -> &Value<i64> {
        match unit {
            IntervalUnit::Year => &self.year,
            IntervalUnit::Month => &self.month,
            IntervalUnit::Week => &self.week,
            IntervalUnit::Day => &self.day,
            IntervalUnit::Hour => &self.hour,
            IntervalUnit::Minute => &self.minute,
        }
    }

    fn field_mut(&mut self, unit: IntervalUnit) -> &mut Value<i64> {
        match unit {
            IntervalUnit::Year => &mut self.year,
            IntervalUnit::Month => &mut self.month,
            IntervalUnit::Week => &mut self.week,
            IntervalUnit::Day => &mut self.day,
            IntervalUnit::Hour => &mut self.hour,
            IntervalUnit::Minute => &mut self.minute,
        }
    }

    /// Model object for `n` units.
    #[must_use]
    pub fn of(n: i64, unit: IntervalUnit) -> Self {
        let mut interval = Self::default();
        *interval.field_mut(unit) = Value::Known(n);
        interval
    }

    /// Units whose field is not null.
    #[must_use]
    pub fn set_units(&self) -> Vec<IntervalUnit> {
        IntervalUnit::ALL
            .into_iter()
            .filter(|unit| !self.field(*unit).is_null())
            .collect()
    }

    /// The single `(n, unit)` pair, `None` while the value is unknown.
    ///
    /// # Errors
    ///
    /// Fails unless exactly one unit is set.
    pub fn to_interval(&self) -> Result<Option<(i64, IntervalUnit)>> {
        match self.set_units().as_slice() {
            [unit] => Ok(self.field(*unit).as_known().map(|n| (*n, *unit))),
            _ => Err(SentryError::codec(
                "Exactly one schedule interval unit must be set",
            )),
        }
    }
}

/// Build the schedule from the model pair.
///
/// Returns `None` when the chosen side is still unknown.
///
/// # Errors
///
/// Fails when neither or both sides are set.
pub fn from_model(
    crontab: &Value<String>,
    interval: &Value<ScheduleInterval>,
) -> Result<Option<Schedule>> {
    match (crontab, interval) {
        (Value::Known(c), Value::Null) => Ok(Some(Schedule::Crontab(c.clone()))),
        (Value::Null, Value::Known(i)) => {
            Ok(i.to_interval()?.map(|(n, unit)| Schedule::Interval(n, unit)))
        }
        (Value::Unknown, Value::Null) | (Value::Null, Value::Unknown) => Ok(None),
        _ => Err(SentryError::codec(
            "Exactly one of schedule_crontab or schedule_interval must be set",
        )),
    }
}

/// Split a schedule into the model pair.
#[must_use]
pub fn to_model(schedule: &Schedule) -> (Value<String>, Value<ScheduleInterval>) {
    match schedule {
        Schedule::Crontab(c) => (Value::Known(c.clone()), Value::Null),
        Schedule::Interval(n, unit) => (Value::Null, Value::Known(ScheduleInterval::of(*n, *unit))),
    }
}
