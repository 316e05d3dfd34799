//! Kaplan–Meier product-limit estimator.
//!
//! Produces the survival step function for one group as a sequence of
//! plot-ready points. Each distinct event time contributes two points at the
//! same `x`: the probability just before the drop and just after it.
//!
//! # Reference
//! Kaplan, E.L. & Meier, P. (1958). "Nonparametric estimation from incomplete
//! observations". *JASA* 53(282), pp. 457-481.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::observation::Observation;

/// A single vertex of a survival step function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Time.
    pub x: f64,
    /// Estimated survival probability at `x`.
    pub y: f64,
}

impl CurvePoint {
    fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Survival step function for one group.
///
/// Always starts at `(0, 1)`. The `y` values never increase along the
/// sequence, and points with equal `x` appear pre-drop first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurvivalCurve {
    points: Vec<CurvePoint>,
}

impl SurvivalCurve {
    /// The curve with no observations behind it: `[(0, 1)]`.
    pub fn degenerate() -> Self {
        Self {
            points: vec![CurvePoint::new(0.0, 1.0)],
        }
    }

    /// Points in plotting order.
    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    /// Consumes the curve, returning its points.
    pub fn into_points(self) -> Vec<CurvePoint> {
        self.points
    }

    /// `true` for a single-point curve: an empty group, or one whose
    /// subjects were all censored at time 0. Renderers usually suppress
    /// such a series.
    pub fn is_degenerate(&self) -> bool {
        self.points.len() == 1
    }

    /// Largest `x` on the curve (the group's follow-up window).
    pub fn max_time(&self) -> f64 {
        self.points.last().map_or(0.0, |p| p.x)
    }

    /// Survival probability at time `t`, read off the right-continuous step
    /// function. Returns 1.0 for `t < 0`; past the end of follow-up the last
    /// estimate is carried forward.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_survival::survival::{estimate_survival, Observation};
    ///
    /// let obs = vec![
    ///     Observation::new("A", 5.0, true).unwrap(),
    ///     Observation::new("A", 10.0, false).unwrap(),
    /// ];
    /// let curve = estimate_survival(&obs);
    /// assert!((curve.survival_at(4.9) - 1.0).abs() < 1e-12);
    /// assert!((curve.survival_at(5.0) - 0.5).abs() < 1e-12);
    /// ```
    pub fn survival_at(&self, t: f64) -> f64 {
        if t < 0.0 {
            return 1.0;
        }
        self.points
            .iter()
            .take_while(|p| p.x <= t)
            .last()
            .map_or(1.0, |p| p.y)
    }

    /// Median survival time: the earliest time at which the estimated
    /// survival probability falls to 0.5 or below.
    ///
    /// # Returns
    /// `None` if the curve never reaches 0.5 (median not reached).
    ///
    /// # Examples
    ///
    /// ```
    /// use u_survival::survival::{estimate_survival, Observation};
    ///
    /// let obs: Vec<Observation> = [2.0, 4.0, 6.0, 8.0]
    ///     .iter()
    ///     .map(|&t| Observation::new("A", t, true).unwrap())
    ///     .collect();
    /// assert_eq!(estimate_survival(&obs).median_survival(), Some(4.0));
    /// ```
    pub fn median_survival(&self) -> Option<f64> {
        self.points.iter().find(|p| p.y <= 0.5).map(|p| p.x)
    }
}

/// A group label paired with its estimated curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupCurve {
    /// Group label.
    pub group: String,
    /// Estimated curve for the group.
    pub curve: SurvivalCurve,
}

/// Estimates the Kaplan–Meier survival curve for one group.
///
/// Observations with a negative or non-finite time are ignored. When none
/// remain, the degenerate curve `[(0, 1)]` is returned.
///
/// # Algorithm
///
/// ```text
/// S(t) = Π_{t_i ≤ t} (n_i - d_i) / n_i
/// ```
///
/// where `n_i` is the number at risk just before `t_i` and `d_i` the number
/// of events at `t_i`. Tied events form one simultaneous drop. Subjects
/// with time equal to `t_i`, censored or not, leave the risk set after `t_i`.
///
/// # Examples
///
/// ```
/// use u_survival::survival::{estimate_survival, Observation};
///
/// let obs = vec![
///     Observation::new("B", 3.0, true).unwrap(),
///     Observation::new("B", 8.0, true).unwrap(),
/// ];
/// let ys: Vec<f64> = estimate_survival(&obs).points().iter().map(|p| p.y).collect();
/// assert_eq!(ys, vec![1.0, 1.0, 0.5, 0.5, 0.0]);
/// ```
pub fn estimate_survival(observations: &[Observation]) -> SurvivalCurve {
    let mut sorted: Vec<(f64, bool)> = observations
        .iter()
        .filter(|o| o.time.is_finite() && o.time >= 0.0)
        .map(|o| (o.time, o.event))
        .collect();

    if sorted.is_empty() {
        trace!("no valid observations, returning degenerate curve");
        return SurvivalCurve::degenerate();
    }

    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
    let max_time = sorted[sorted.len() - 1].0;

    let mut points = vec![CurvePoint::new(0.0, 1.0)];
    let mut survival = 1.0;
    let mut at_risk = sorted.len();

    let mut i = 0;
    while i < sorted.len() {
        let t = sorted[i].0;
        let mut j = i;
        let mut deaths = 0usize;
        while j < sorted.len() && sorted[j].0 == t {
            if sorted[j].1 {
                deaths += 1;
            }
            j += 1;
        }

        if deaths > 0 && at_risk > 0 {
            points.push(CurvePoint::new(t, survival));
            survival *= (at_risk - deaths) as f64 / at_risk as f64;
            points.push(CurvePoint::new(t, survival));
        }

        // Everyone observed at t leaves the risk set afterwards.
        at_risk -= j - i;
        i = j;
    }

    let last_x = points[points.len() - 1].x;
    if last_x < max_time {
        points.push(CurvePoint::new(max_time, survival));
    }

    SurvivalCurve { points }
}

/// Partitions observations by group and estimates each curve independently.
///
/// Groups are returned in order of first appearance.
pub fn estimate_survival_by_group(observations: &[Observation]) -> Vec<GroupCurve> {
    partition_by_group(observations)
        .into_iter()
        .map(|(group, members)| GroupCurve {
            curve: estimate_survival(&members),
            group,
        })
        .collect()
}

/// Splits observations into per-group vectors, preserving first-appearance order.
pub(crate) fn partition_by_group(observations: &[Observation]) -> Vec<(String, Vec<Observation>)> {
    let mut groups: Vec<(String, Vec<Observation>)> = Vec::new();
    for o in observations {
        match groups.iter_mut().find(|(g, _)| *g == o.group) {
            Some((_, members)) => members.push(o.clone()),
            None => groups.push((o.group.clone(), vec![o.clone()])),
        }
    }
    groups
}
