//! Statistical result record supplied by the external statistical engine.
//!
//! Parsing is lenient: every optional field may be absent or `null`, the
//! test statistic may arrive as a bare number or as a map, and the effect
//! size may use either `{name, value}` or the engine's keyed form
//! (`{"cohens_d": 0.8, "interpretation": "large"}`). A malformed `groups`
//! or `survival_data` block is treated as absent, so only the sentences
//! built from it are lost.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;
use u_numflow::stats;

use super::family::TestFamily;
use crate::error::NarrativeError;
use crate::survival::{deserialize_count, SurvivalGroupStats};

/// Display names for the engine's keyed effect-size fields.
const EFFECT_SIZE_NAMES: [(&str, &str); 8] = [
    ("cohens_d", "Cohen's d"),
    ("hedges_g", "Hedges' g"),
    ("glass_delta", "Glass's delta"),
    ("eta_squared", "η²"),
    ("partial_eta_squared", "partial η²"),
    ("omega_squared", "ω²"),
    ("cramers_v", "Cramér's V"),
    ("phi", "φ"),
];

/// Descriptive statistics for one comparison group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupDescriptives {
    /// Sample size.
    #[serde(alias = "sample_size", deserialize_with = "deserialize_count")]
    pub n: usize,
    /// Sample mean.
    pub mean: f64,
    /// Sample standard deviation.
    #[serde(alias = "std", alias = "sd")]
    pub std_dev: f64,
    /// Standard error of the mean, if the engine reported one.
    #[serde(default)]
    pub sem: Option<f64>,
}

impl GroupDescriptives {
    /// Computes descriptives from raw values.
    ///
    /// # Returns
    /// `None` if fewer than 2 values or any value is non-finite.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_survival::narrative::GroupDescriptives;
    ///
    /// let g = GroupDescriptives::from_values(&[2.0, 4.0, 6.0]).unwrap();
    /// assert_eq!(g.n, 3);
    /// assert!((g.mean - 4.0).abs() < 1e-12);
    /// assert!((g.std_dev - 2.0).abs() < 1e-12);
    /// ```
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.len() < 2 || values.iter().any(|v| !v.is_finite()) {
            return None;
        }
        let mean = stats::mean(values)?;
        let std_dev = stats::std_dev(values)?;
        Some(Self {
            n: values.len(),
            mean,
            std_dev,
            sem: Some(std_dev / (values.len() as f64).sqrt()),
        })
    }

    /// Standard error of the mean: the reported value, or `sd / √n`.
    pub fn standard_error(&self) -> f64 {
        match self.sem {
            Some(sem) => sem,
            None if self.n > 0 => self.std_dev / (self.n as f64).sqrt(),
            None => 0.0,
        }
    }
}

/// A named effect-size statistic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectSize {
    /// Display name, e.g. `"Cohen's d"` or `"Cramér's V"`.
    pub name: String,
    /// Value; may be missing when the engine has nothing to report.
    #[serde(default)]
    pub value: Option<f64>,
}

/// Survival block of a statistical result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurvivalData {
    /// Per-group n, events, and median survival.
    #[serde(default)]
    pub group_stats: Option<BTreeMap<String, SurvivalGroupStats>>,
}

/// Output of one statistical test, as reported by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticalResult {
    /// Test name as reported, e.g. `"Welch's t-test"`.
    pub test_name: String,
    /// Explicit family discriminant; classified from `test_name` when absent.
    #[serde(default)]
    pub test_family: Option<TestFamily>,
    /// Test statistic(s) keyed by symbol, e.g. `{"t": 2.1, "df": 28}`.
    #[serde(deserialize_with = "statistic_map")]
    pub statistic: BTreeMap<String, f64>,
    /// Two-sided p-value.
    pub p_value: f64,
    /// Per-group descriptives.
    #[serde(default, deserialize_with = "lenient_block")]
    pub groups: Option<BTreeMap<String, GroupDescriptives>>,
    /// Effect size accompanying the test.
    #[serde(default, deserialize_with = "effect_size")]
    pub effect_size: Option<EffectSize>,
    /// Survival summaries, for time-to-event analyses.
    #[serde(default, deserialize_with = "lenient_block")]
    pub survival_data: Option<SurvivalData>,
    /// Observed counts for categorical tests.
    #[serde(default)]
    pub contingency_table: Option<Vec<Vec<f64>>>,
}

impl StatisticalResult {
    /// A result with only the required fields set.
    pub fn new(test_name: impl Into<String>, p_value: f64) -> Self {
        Self {
            test_name: test_name.into(),
            test_family: None,
            statistic: BTreeMap::new(),
            p_value,
            groups: None,
            effect_size: None,
            survival_data: None,
            contingency_table: None,
        }
    }

    /// Parses a result from the engine's JSON.
    ///
    /// # Errors
    /// [`NarrativeError::Parse`] if the JSON is malformed or a required
    /// field (`test_name`, `statistic`, `p_value`) is missing.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_survival::narrative::{StatisticalResult, TestFamily};
    ///
    /// let r = StatisticalResult::from_json(
    ///     r#"{"test_name": "Student's t-test", "statistic": {"t": 4.23, "df": 14}, "p_value": 0.001}"#,
    /// ).unwrap();
    /// assert_eq!(r.family(), TestFamily::TTest);
    /// assert_eq!(r.statistic["df"], 14.0);
    /// ```
    pub fn from_json(json: &str) -> Result<Self, NarrativeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The test family: the explicit discriminant if set, otherwise
    /// classified from the test name.
    pub fn family(&self) -> TestFamily {
        self.test_family
            .unwrap_or_else(|| TestFamily::from_test_name(&self.test_name))
    }

    /// Looks up the first statistic present under any of `keys`.
    pub fn stat(&self, keys: &[&str]) -> Option<f64> {
        keys.iter()
            .find_map(|k| self.statistic.get(*k).copied())
            .filter(|v| v.is_finite())
    }

    /// Total sample size across groups, if any groups were reported.
    pub fn total_n(&self) -> Option<usize> {
        self.groups
            .as_ref()
            .filter(|g| !g.is_empty())
            .map(|g| g.values().map(|d| d.n).sum())
    }

    /// Survival group statistics, if reported.
    pub fn survival_group_stats(&self) -> Option<&BTreeMap<String, SurvivalGroupStats>> {
        self.survival_data.as_ref()?.group_stats.as_ref()
    }
}

/// Names of the analysed variables, used in generated prose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableNames {
    /// Outcome (dependent) variable.
    pub outcome: String,
    /// Grouping (independent) variable.
    pub group: String,
}

impl VariableNames {
    /// Creates variable names.
    pub fn new(outcome: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            outcome: outcome.into(),
            group: group.into(),
        }
    }
}

fn statistic_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Scalar(f64),
        Map(BTreeMap<String, Option<f64>>),
        Missing(()),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Scalar(v) => BTreeMap::from([("statistic".to_string(), v)]),
        Raw::Map(m) => m
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k, v)))
            .collect(),
        Raw::Missing(()) => BTreeMap::new(),
    })
}

/// An optional block that is dropped, not fatal, when it does not match
/// its schema.
fn lenient_block<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Some(raw) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    match serde_json::from_value(raw) {
        Ok(block) => Ok(Some(block)),
        Err(err) => {
            debug!(error = %err, "ignoring malformed result block");
            Ok(None)
        }
    }
}

/// Publication name for an effect-size key; unknown keys are kept as-is.
fn effect_size_display_name(key: &str) -> String {
    EFFECT_SIZE_NAMES
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map_or_else(|| key.to_string(), |(_, name)| name.to_string())
}

fn effect_size<'de, D>(deserializer: D) -> Result<Option<EffectSize>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(Value::Object(map)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(None);
    };

    if let Some(name) = map.get("name").and_then(Value::as_str) {
        return Ok(Some(EffectSize {
            name: name.to_string(),
            value: map.get("value").and_then(Value::as_f64),
        }));
    }

    // Keyed form: the first numeric entry is the effect size.
    Ok(map
        .iter()
        .find_map(|(k, v)| v.as_f64().map(|x| (k, x)))
        .map(|(k, x)| EffectSize {
            name: effect_size_display_name(k),
            value: Some(x),
        }))
}
