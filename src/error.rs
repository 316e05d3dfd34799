//! Error types.
//!
//! Data-shape problems (malformed rows, empty groups, unknown test families,
//! missing optional fields) are never errors: they are dropped or fall back
//! to a defined result. The variants here cover caller contract violations
//! only.

/// Errors raised while turning raw rows into observations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SurvivalError {
    #[error("Row {index} is not a JSON object")]
    RowNotObject { index: usize },

    #[error("Expected a JSON array of rows, found {found}")]
    RowsNotArray { found: &'static str },
}

/// Errors raised while reading a statistical result.
#[derive(Debug, thiserror::Error)]
pub enum NarrativeError {
    #[error("Malformed statistical result: {0}")]
    Parse(#[from] serde_json::Error),
}
