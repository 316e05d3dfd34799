//! Observations and their extraction from raw tabular rows.
//!
//! Rows arrive as JSON objects from the upload/parsing layer. Each row is
//! reduced to an [`Observation`] by selecting the configured time, event, and
//! group fields. Rows whose time or event cannot be coerced are dropped
//! rather than failing the whole extraction.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::FieldMapping;
use crate::error::SurvivalError;

/// Text values that mark an event as having occurred.
const EVENT_TOKENS: [&str; 9] = [
    "1", "true", "yes", "dead", "death", "event", "deceased", "occurred", "positive",
];

/// Text values that mark a subject as censored.
const CENSORED_TOKENS: [&str; 8] = [
    "0", "false", "no", "alive", "living", "censored", "no event", "negative",
];

/// How the event column is coded, decided once over all rows.
#[derive(Debug, Clone, Copy, PartialEq)]
enum EventCoding {
    /// `0`/`1`, booleans, and text tokens.
    Standard,
    /// A purely numeric column with exactly two values other than `{0, 1}`
    /// (e.g. `1`/`2`): the smaller value is censored, the larger an event.
    Binary { censored: f64, event: f64 },
}

/// One subject's follow-up record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Group label.
    pub group: String,
    /// Follow-up time (non-negative, finite).
    pub time: f64,
    /// `true` if the event occurred, `false` if censored.
    pub event: bool,
}

impl Observation {
    /// Creates an observation.
    ///
    /// # Returns
    /// `None` if `time` is negative or non-finite.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_survival::survival::Observation;
    ///
    /// assert!(Observation::new("A", 5.0, true).is_some());
    /// assert!(Observation::new("A", -1.0, true).is_none());
    /// assert!(Observation::new("A", f64::NAN, false).is_none());
    /// ```
    pub fn new(group: impl Into<String>, time: f64, event: bool) -> Option<Self> {
        if !time.is_finite() || time < 0.0 {
            return None;
        }
        Some(Self {
            group: group.into(),
            time,
            event,
        })
    }
}

/// Extracts observations from a JSON array of row objects.
///
/// Time accepts numbers and numeric strings. Event accepts `0`/`1`,
/// booleans, the text tokens `yes`/`no`, `dead`/`alive`/`living`,
/// `death`, `event`/`no event`, `deceased`, `occurred`, `positive`/`negative`,
/// `censored` (case-insensitive), and status strings such as `"1:DECEASED"`
/// or `"0:LIVING"`. A numeric event column holding exactly two values other
/// than `0`/`1` is read as binary, smaller value censored. Rows with a
/// missing or unparseable time or event are skipped. A missing group field
/// falls back to [`FieldMapping::default_group`].
///
/// # Errors
/// [`SurvivalError::RowsNotArray`] if `rows` is not an array, and
/// [`SurvivalError::RowNotObject`] if any element is not an object.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use u_survival::config::FieldMapping;
/// use u_survival::survival::extract_observations;
///
/// let rows = json!([
///     {"arm": "A", "months": 5, "status": "dead"},
///     {"arm": "A", "months": "10", "status": 0},
///     {"arm": "B", "months": null, "status": 1},
/// ]);
/// let mapping = FieldMapping::new("months", "status", "arm");
/// let obs = extract_observations(&rows, &mapping).unwrap();
/// assert_eq!(obs.len(), 2);
/// assert!(obs[0].event);
/// assert!(!obs[1].event);
/// ```
pub fn extract_observations(
    rows: &Value,
    mapping: &FieldMapping,
) -> Result<Vec<Observation>, SurvivalError> {
    let rows = rows.as_array().ok_or(SurvivalError::RowsNotArray {
        found: json_kind(rows),
    })?;

    let coding = detect_event_coding(rows, &mapping.event_field);
    let mut out = Vec::with_capacity(rows.len());
    let mut dropped = 0usize;
    for (index, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .ok_or(SurvivalError::RowNotObject { index })?;

        let time = obj.get(&mapping.time_field).and_then(coerce_number);
        let event = obj.get(&mapping.event_field).and_then(|v| coerce_event(v, coding));
        let (Some(time), Some(event)) = (time, event) else {
            debug!(index, "dropping row with missing or invalid time/event");
            dropped += 1;
            continue;
        };

        let group = obj
            .get(&mapping.group_field)
            .and_then(coerce_group)
            .unwrap_or_else(|| mapping.default_group.clone());

        match Observation::new(group, time, event) {
            Some(o) => out.push(o),
            None => {
                debug!(index, time, "dropping row with negative time");
                dropped += 1;
            }
        }
    }

    if dropped > 0 {
        debug!(kept = out.len(), dropped, "extracted observations");
    }
    Ok(out)
}

fn coerce_number(v: &Value) -> Option<f64> {
    let t = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    t.is_finite().then_some(t)
}

fn detect_event_coding(rows: &[Value], field: &str) -> EventCoding {
    let mut values = Vec::new();
    for v in rows
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|obj| obj.get(field))
        .filter(|v| !v.is_null())
    {
        match coerce_number(v) {
            Some(x) => values.push(x),
            None => return EventCoding::Standard,
        }
    }
    values.sort_by(f64::total_cmp);
    values.dedup();

    match values[..] {
        [censored, event] if !(censored == 0.0 && event == 1.0) => {
            debug!(censored, event, "event column read as two-valued numeric coding");
            EventCoding::Binary { censored, event }
        }
        _ => EventCoding::Standard,
    }
}

fn coerce_event(v: &Value, coding: EventCoding) -> Option<bool> {
    if let EventCoding::Binary { censored, event } = coding {
        let x = coerce_number(v)?;
        return if x == event {
            Some(true)
        } else if x == censored {
            Some(false)
        } else {
            None
        };
    }

    match v {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => {
            let x = n.as_f64()?;
            if x == 1.0 {
                Some(true)
            } else if x == 0.0 {
                Some(false)
            } else {
                None
            }
        }
        Value::String(s) => coerce_event_text(s),
        _ => None,
    }
}

fn coerce_event_text(s: &str) -> Option<bool> {
    let token = s.trim().to_lowercase();
    if EVENT_TOKENS.contains(&token.as_str()) {
        return Some(true);
    }
    if CENSORED_TOKENS.contains(&token.as_str()) {
        return Some(false);
    }
    if !token.contains(':') {
        return None;
    }
    // Status strings: "1:DECEASED", "0:LIVING".
    if token.starts_with("1:") || token.contains("deceased") || token.contains("dead") {
        Some(true)
    } else if token.starts_with("0:") || token.contains("living") || token.contains("alive") {
        Some(false)
    } else {
        None
    }
}

fn coerce_group(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
