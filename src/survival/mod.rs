//! Kaplan–Meier survival estimation and at-risk tables.
//!
//! Turns per-subject rows (group, time, event) into one survival step
//! function per group, plus the number-at-risk table shown under the plot.
//!
//! # Modules
//!
//! - [`extract_observations`] — coerce raw JSON rows into [`Observation`]s
//! - [`estimate_survival`] — product-limit estimate for one group
//! - [`build_risk_table`] — at-risk counts at five shared query times
//! - [`summarize_groups`] — n, events, and median survival per group
//!
//! # References
//!
//! - Kaplan, E.L. & Meier, P. (1958). *JASA* 53(282), pp. 457-481.
//! - Klein, J.P. & Moeschberger, M.L. (2003). *Survival Analysis*, 2nd ed.

mod kaplan_meier;
mod observation;
mod risk_table;
mod summary;

pub use kaplan_meier::{
    estimate_survival, estimate_survival_by_group, CurvePoint, GroupCurve, SurvivalCurve,
};
pub use observation::{extract_observations, Observation};
pub use risk_table::{
    build_risk_table, risk_query_times, RiskTable, RiskTableEntry, RISK_TABLE_POINTS,
};
pub use summary::{summarize_groups, SurvivalGroupStats};

pub(crate) use summary::deserialize_count;
