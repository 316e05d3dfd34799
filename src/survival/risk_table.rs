//! Number-at-risk table printed beneath survival curves.

use serde::{Deserialize, Serialize};

use super::kaplan_meier::partition_by_group;
use super::observation::Observation;

/// Number of evenly spaced query times in a risk table.
pub const RISK_TABLE_POINTS: usize = 5;

/// One cell of the risk table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskTableEntry {
    /// Group label.
    pub group: String,
    /// Query time.
    pub time: f64,
    /// Observations in the group with `time >= query time`.
    pub at_risk: usize,
}

/// At-risk counts for every group at the shared query times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskTable {
    /// Name of the grouping variable, for labelling rows.
    pub group_variable: String,
    /// Name of the time variable, for labelling columns.
    pub time_variable: String,
    /// Query times: 0%, 25%, 50%, 75% and 100% of the global maximum time.
    pub times: [f64; RISK_TABLE_POINTS],
    /// `(group, counts)` in order of first appearance; `counts[k]` is the
    /// number at risk at `times[k]`.
    pub rows: Vec<(String, [usize; RISK_TABLE_POINTS])>,
}

impl RiskTable {
    /// Flattens the table into one entry per group and query time.
    pub fn entries(&self) -> Vec<RiskTableEntry> {
        self.rows
            .iter()
            .flat_map(|(group, counts)| {
                self.times
                    .iter()
                    .zip(counts)
                    .map(move |(&time, &at_risk)| RiskTableEntry {
                        group: group.clone(),
                        time,
                        at_risk,
                    })
            })
            .collect()
    }
}

/// The five query times spanning `[0, max_time]`.
///
/// # Examples
///
/// ```
/// use u_survival::survival::risk_query_times;
///
/// assert_eq!(risk_query_times(20.0), [0.0, 5.0, 10.0, 15.0, 20.0]);
/// ```
pub fn risk_query_times(max_time: f64) -> [f64; RISK_TABLE_POINTS] {
    let step = max_time / (RISK_TABLE_POINTS - 1) as f64;
    let mut times = [0.0; RISK_TABLE_POINTS];
    for (k, t) in times.iter_mut().enumerate() {
        *t = step * k as f64;
    }
    times[RISK_TABLE_POINTS - 1] = max_time;
    times
}

/// Builds the risk table for all groups.
///
/// Query times are derived from the maximum time across every group, so all
/// rows share the same columns. Counts are exact; a group with nobody left
/// at a query time gets 0. Observations with a negative or non-finite time
/// are ignored.
///
/// # Examples
///
/// ```
/// use u_survival::survival::{build_risk_table, Observation};
///
/// let obs = vec![
///     Observation::new("A", 5.0, true).unwrap(),
///     Observation::new("A", 10.0, false).unwrap(),
///     Observation::new("B", 3.0, true).unwrap(),
///     Observation::new("B", 8.0, true).unwrap(),
/// ];
/// let table = build_risk_table(&obs, "arm", "months");
/// assert_eq!(table.times, [0.0, 2.5, 5.0, 7.5, 10.0]);
/// assert_eq!(table.rows[0], ("A".to_string(), [2, 2, 2, 1, 1]));
/// assert_eq!(table.rows[1], ("B".to_string(), [2, 2, 1, 1, 0]));
/// ```
pub fn build_risk_table(
    observations: &[Observation],
    group_variable: &str,
    time_variable: &str,
) -> RiskTable {
    let valid: Vec<Observation> = observations
        .iter()
        .filter(|o| o.time.is_finite() && o.time >= 0.0)
        .cloned()
        .collect();

    let max_time = valid.iter().map(|o| o.time).fold(0.0, f64::max);
    let times = risk_query_times(max_time);

    let rows = partition_by_group(&valid)
        .into_iter()
        .map(|(group, members)| {
            let mut counts = [0usize; RISK_TABLE_POINTS];
            for (count, &q) in counts.iter_mut().zip(&times) {
                *count = members.iter().filter(|o| o.time >= q).count();
            }
            (group, counts)
        })
        .collect();

    RiskTable {
        group_variable: group_variable.to_string(),
        time_variable: time_variable.to_string(),
        times,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(group: &str, time: f64) -> Observation {
        Observation::new(group, time, false).expect("valid observation")
    }

    #[test]
    fn query_times_span_window() {
        let t = risk_query_times(8.0);
        assert_eq!(t, [0.0, 2.0, 4.0, 6.0, 8.0]);
        assert_eq!(risk_query_times(0.0), [0.0; 5]);
    }

    #[test]
    fn shared_columns_across_groups() {
        let data = vec![obs("A", 1.0), obs("A", 2.0), obs("B", 40.0)];
        let table = build_risk_table(&data, "arm", "days");
        assert_eq!(table.times, [0.0, 10.0, 20.0, 30.0, 40.0]);
        assert_eq!(table.rows[0].1, [2, 0, 0, 0, 0]);
        assert_eq!(table.rows[1].1, [1, 1, 1, 1, 1]);
        assert_eq!(table.group_variable, "arm");
        assert_eq!(table.time_variable, "days");
    }

    #[test]
    fn boundary_is_inclusive() {
        let data = vec![obs("A", 4.0), obs("A", 8.0)];
        let table = build_risk_table(&data, "g", "t");
        // times = [0, 2, 4, 6, 8]; subject at 4 is still at risk at 4.
        assert_eq!(table.rows[0].1, [2, 2, 2, 1, 1]);
    }

    #[test]
    fn entries_flatten_row_major() {
        let data = vec![obs("A", 4.0), obs("B", 8.0)];
        let entries = build_risk_table(&data, "g", "t").entries();
        assert_eq!(entries.len(), 10);
        assert_eq!(entries[0].group, "A");
        assert_eq!(entries[5].group, "B");
        assert!((entries[4].time - 8.0).abs() < 1e-12);
        assert_eq!(entries[4].at_risk, 0);
        assert_eq!(entries[9].at_risk, 1);
    }

    #[test]
    fn empty_input() {
        let table = build_risk_table(&[], "g", "t");
        assert!(table.rows.is_empty());
        assert!(table.entries().is_empty());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn counts_non_increasing(
            rows in proptest::collection::vec((0u8..3, 0.0_f64..100.0), 1..=60)
        ) {
            let data: Vec<Observation> = rows
                .iter()
                .map(|&(g, t)| Observation {
                    group: format!("G{g}"),
                    time: t,
                    event: true,
                })
                .collect();
            let table = build_risk_table(&data, "g", "t");
            for (_, counts) in &table.rows {
                for w in counts.windows(2) {
                    prop_assert!(w[1] <= w[0], "{counts:?}");
                }
            }
            let total: usize = table.rows.iter().map(|(_, c)| c[0]).sum();
            prop_assert_eq!(total, data.len());
        }
    }
}
