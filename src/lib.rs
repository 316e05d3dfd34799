//! # u-survival
//!
//! Kaplan–Meier survival curves, number-at-risk tables, and
//! publication-formatted narrative text for statistical results.
//!
//! Everything here is a pure function of its inputs: no I/O, no global
//! state, no clock or locale dependence. Functions may be called
//! concurrently for different analyses without coordination.
//!
//! ## Modules
//!
//! - [`survival`] — Observation extraction, product-limit estimation,
//!   risk tables, per-group summaries
//! - [`narrative`] — Methods and figure-legend paragraphs keyed on test family
//! - [`config`] — Field mapping and narrative settings
//! - [`error`] — Contract-violation errors
//!
//! ## Design Philosophy
//!
//! - **Best effort**: malformed rows are dropped, empty groups give a
//!   degenerate curve, missing optional fields omit their sentence
//! - **Deterministic**: fixed-precision formatting, ordered maps
//! - **Property-tested**: curve and table invariants verified via proptest
//!
//! ## Example
//!
//! ```
//! use serde_json::json;
//! use u_survival::config::FieldMapping;
//! use u_survival::survival::{build_risk_table, estimate_survival_by_group, extract_observations};
//!
//! let rows = json!([
//!     {"group": "A", "time": 5, "event": 1},
//!     {"group": "A", "time": 10, "event": 0},
//!     {"group": "B", "time": 3, "event": 1},
//!     {"group": "B", "time": 8, "event": 1},
//! ]);
//! let obs = extract_observations(&rows, &FieldMapping::default()).unwrap();
//! let curves = estimate_survival_by_group(&obs);
//! let a: Vec<(f64, f64)> = curves[0].curve.points().iter().map(|p| (p.x, p.y)).collect();
//! assert_eq!(a, vec![(0.0, 1.0), (5.0, 1.0), (5.0, 0.5), (10.0, 0.5)]);
//!
//! let table = build_risk_table(&obs, "group", "time");
//! assert_eq!(table.entries().len(), 10);
//! ```

pub mod config;
pub mod error;
pub mod narrative;
pub mod survival;

pub use error::{NarrativeError, SurvivalError};
pub use narrative::{synthesize_narrative, NarrativeOutput, StatisticalResult, VariableNames};
pub use survival::{build_risk_table, estimate_survival, Observation, SurvivalCurve};
