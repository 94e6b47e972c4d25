use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::Person;

/// The three read-only backend resources polled every cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Metrics,
    Users,
    Ready,
}

impl Resource {
    pub const ALL: [Resource; 3] = [Resource::Metrics, Resource::Users, Resource::Ready];

    pub fn path(self) -> &'static str {
        match self {
            Resource::Metrics => "/metrics",
            Resource::Users => "/users",
            Resource::Ready => "/ready",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Decodes a `/users` body. Entries that are not complete seat assignments
/// (the backend publishes `[{}]` when a session is cleared) are dropped.
pub fn people_from_value(value: Value) -> Result<Vec<Person>, serde_json::Error> {
    let entries: Vec<Value> = serde_json::from_value(value)?;
    let total = entries.len();
    let people: Vec<Person> = entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<Person>(entry).ok())
        .filter(|person| person.table_index >= 1)
        .collect();
    if people.len() != total {
        tracing::debug!(
            skipped = total - people.len(),
            kept = people.len(),
            "dropped incomplete /users entries"
        );
    }
    Ok(people)
}

/// Accepts numbers, numeric strings and `null`. Anything that is not a
/// number becomes NaN so the consumer's sanitizer decides what it means.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(number) => number.as_f64().unwrap_or(f64::NAN),
        Value::String(text) => text.trim().parse::<f64>().unwrap_or(f64::NAN),
        _ => f64::NAN,
    })
}

pub fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|v| v.is_finite()).map(|v| v as i64))
            .unwrap_or_default(),
        Value::String(text) => text.trim().parse::<i64>().unwrap_or_default(),
        _ => 0,
    })
}
