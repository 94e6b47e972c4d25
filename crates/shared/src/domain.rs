use serde::{Deserialize, Serialize};

use crate::protocol::{lenient_f64, lenient_i64};

/// A participant seated at a table. Table membership is derived from
/// `table_index`; it is never stored on the table side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub initials: String,
    pub table_index: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Metrics {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub strangers_num: f64,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub current_round: i64,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub total_rounds: i64,
    /// May be fractional or NaN; consumers must sanitize before use.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub round_time_minutes: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub break_time_minutes: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub session_started: bool,
}

/// Occupants of `table_index`, in the order they appear in `people`.
pub fn occupants_of(people: &[Person], table_index: u32) -> Vec<Person> {
    people
        .iter()
        .filter(|person| person.table_index == table_index)
        .cloned()
        .collect()
}

/// Highest table index across `people`, or 0 when nobody is seated.
pub fn max_table_index(people: &[Person]) -> u32 {
    people
        .iter()
        .map(|person| person.table_index)
        .max()
        .unwrap_or(0)
}
