//! Per-group survival summaries.

use std::collections::BTreeMap;

use serde::{de, Deserialize, Deserializer, Serialize};

use super::kaplan_meier::{estimate_survival, partition_by_group};
use super::observation::Observation;

/// Sample size, event count, and median survival for one group.
///
/// This is the same shape the statistical engine reports under
/// `survival_data.group_stats`, so summaries computed here can be fed
/// straight into narrative synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurvivalGroupStats {
    /// Number of subjects.
    #[serde(alias = "sample_size", deserialize_with = "deserialize_count")]
    pub n: usize,
    /// Number of events observed.
    #[serde(deserialize_with = "deserialize_count")]
    pub events: usize,
    /// Kaplan–Meier median survival time; `None` if not reached.
    #[serde(default)]
    pub median_survival: Option<f64>,
}

impl SurvivalGroupStats {
    /// Event rate as a percentage of `n`. Returns 0 for an empty group.
    pub fn event_rate_percent(&self) -> f64 {
        if self.n == 0 {
            return 0.0;
        }
        self.events as f64 / self.n as f64 * 100.0
    }
}

/// Summarizes each group's sample size, events, and median survival.
///
/// # Examples
///
/// ```
/// use u_survival::survival::{summarize_groups, Observation};
///
/// let obs = vec![
///     Observation::new("A", 5.0, true).unwrap(),
///     Observation::new("A", 10.0, false).unwrap(),
/// ];
/// let stats = summarize_groups(&obs);
/// assert_eq!(stats["A"].n, 2);
/// assert_eq!(stats["A"].events, 1);
/// assert_eq!(stats["A"].median_survival, Some(5.0));
/// ```
pub fn summarize_groups(observations: &[Observation]) -> BTreeMap<String, SurvivalGroupStats> {
    partition_by_group(observations)
        .into_iter()
        .map(|(group, members)| {
            let stats = SurvivalGroupStats {
                n: members.len(),
                events: members.iter().filter(|o| o.event).count(),
                median_survival: estimate_survival(&members).median_survival(),
            };
            (group, stats)
        })
        .collect()
}

/// Reads a count written either as an integer or as an integral float
/// (`6.0`), as dataframe-backed engines often emit.
pub(crate) fn deserialize_count<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u64),
        Float(f64),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(n) => usize::try_from(n).map_err(de::Error::custom),
        Raw::Float(x) if x.is_finite() && x >= 0.0 && x.fract() == 0.0 && x <= usize::MAX as f64 => {
            Ok(x as usize)
        }
        Raw::Float(x) => Err(de::Error::custom(format!("expected a count, found {x}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_groups() {
        let obs = vec![
            Observation::new("A", 5.0, true).expect("valid"),
            Observation::new("A", 10.0, false).expect("valid"),
            Observation::new("B", 3.0, false).expect("valid"),
        ];
        let stats = summarize_groups(&obs);
        assert_eq!(stats.len(), 2);
        assert!((stats["A"].event_rate_percent() - 50.0).abs() < 1e-12);
        assert_eq!(stats["B"].events, 0);
        assert_eq!(stats["B"].median_survival, None);
    }

    #[test]
    fn accepts_engine_field_names() {
        let s: SurvivalGroupStats =
            serde_json::from_str(r#"{"sample_size": 12, "events": 3, "median_survival": null}"#)
                .expect("valid");
        assert_eq!(s.n, 12);
        assert_eq!(s.median_survival, None);
        let s: SurvivalGroupStats =
            serde_json::from_str(r#"{"n": 4, "events": 1}"#).expect("valid");
        assert_eq!(s.median_survival, None);
    }

    #[test]
    fn counts_accept_integral_floats() {
        let s: SurvivalGroupStats =
            serde_json::from_str(r#"{"n": 6.0, "events": 2.0, "median_survival": 9.5}"#)
                .expect("integral floats");
        assert_eq!((s.n, s.events), (6, 2));
        assert!(serde_json::from_str::<SurvivalGroupStats>(r#"{"n": 6.5, "events": 2}"#).is_err());
        assert!(serde_json::from_str::<SurvivalGroupStats>(r#"{"n": -1, "events": 0}"#).is_err());
    }

    #[test]
    fn empty_group_rate() {
        let s = SurvivalGroupStats {
            n: 0,
            events: 0,
            median_survival: None,
        };
        assert_eq!(s.event_rate_percent(), 0.0);
    }
}
