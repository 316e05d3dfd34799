//! Number formatting and significance/effect-size labelling.
//!
//! All formatting is fixed-precision and locale-independent, so identical
//! inputs always render to identical text.

use std::fmt;

/// Thresholds for significance stars and sub-levels, strictest first.
const SIGNIFICANCE_LEVELS: [(f64, &str, &str); 3] = [
    (0.001, "***", "p<0.001"),
    (0.01, "**", "p<0.01"),
    (0.05, "*", "p<0.05"),
];

/// Formats `value` with exactly `decimals` digits after the point.
pub fn fmt_fixed(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}")
}

/// Formats degrees of freedom: integers plainly, fractional (Welch) df to
/// two decimals.
pub fn fmt_df(df: f64) -> String {
    if df.fract() == 0.0 && df.abs() < 1e15 {
        format!("{df:.0}")
    } else {
        fmt_fixed(df, 2)
    }
}

/// Formats a p-value for reporting.
///
/// `p < 0.001` below 0.001, otherwise `p = x.xxx`. A p-value just below
/// 0.01 or 0.05 that would round up onto the threshold is reported as
/// `p < 0.010` / `p < 0.050` so the text never contradicts the
/// significance call.
///
/// # Examples
///
/// ```
/// use u_survival::narrative::format_p_value;
///
/// assert_eq!(format_p_value(0.0009), "p < 0.001");
/// assert_eq!(format_p_value(0.001), "p = 0.001");
/// assert_eq!(format_p_value(0.0234), "p = 0.023");
/// assert_eq!(format_p_value(0.04999), "p < 0.050");
/// assert_eq!(format_p_value(0.05), "p = 0.050");
/// ```
pub fn format_p_value(p: f64) -> String {
    if p < 0.001 {
        return "p < 0.001".to_string();
    }
    let rounded = fmt_fixed(p, 3);
    for threshold in [0.01, 0.05] {
        let bound = fmt_fixed(threshold, 3);
        if p < threshold && rounded == bound {
            return format!("p < {bound}");
        }
    }
    format!("p = {rounded}")
}

/// Significance stars for a figure legend: `***`, `**`, `*`, or empty.
///
/// # Examples
///
/// ```
/// use u_survival::narrative::significance_stars;
///
/// assert_eq!(significance_stars(0.0005), "***");
/// assert_eq!(significance_stars(0.001), "**");
/// assert_eq!(significance_stars(0.01), "*");
/// assert_eq!(significance_stars(0.05), "");
/// ```
pub fn significance_stars(p: f64) -> &'static str {
    SIGNIFICANCE_LEVELS
        .iter()
        .find(|(level, _, _)| p < *level)
        .map_or("", |(_, stars, _)| *stars)
}

/// The strictest conventional level `p` falls under, e.g. `"p<0.01"`.
///
/// # Returns
/// `None` when `p >= 0.05`.
pub fn significance_level(p: f64) -> Option<&'static str> {
    SIGNIFICANCE_LEVELS
        .iter()
        .find(|(level, _, _)| p < *level)
        .map(|(_, _, label)| *label)
}

/// Which convention an effect-size statistic follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectFamily {
    /// Cohen's d, Hedges' g, Glass's delta.
    Cohen,
    /// Eta squared, partial eta squared, omega squared (η², ω²).
    Eta,
    /// Cramér's V, phi (φ).
    Cramer,
}

impl EffectFamily {
    /// Recognizes an effect-size name.
    ///
    /// `eta`, `omega` and `phi` must stand as whole words, so `beta`,
    /// `theta` or `graphical` are not mistaken for them.
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        let has_word = |w: &str| {
            lower
                .split(|c: char| !c.is_alphanumeric())
                .any(|word| word == w)
        };
        if ["cohen", "hedges", "glass"].iter().any(|w| lower.contains(w)) {
            Some(EffectFamily::Cohen)
        } else if has_word("eta") || has_word("omega") || lower.contains('η') || lower.contains('ω') {
            Some(EffectFamily::Eta)
        } else if ["cramer", "cramér"].iter().any(|w| lower.contains(w))
            || has_word("phi")
            || lower.contains('φ')
        {
            Some(EffectFamily::Cramer)
        } else {
            None
        }
    }

    /// Upper bounds of the small and medium bands.
    fn thresholds(self) -> (f64, f64) {
        match self {
            EffectFamily::Cohen => (0.2, 0.5),
            EffectFamily::Eta => (0.01, 0.06),
            EffectFamily::Cramer => (0.1, 0.3),
        }
    }
}

/// Qualitative effect-size magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectMagnitude {
    Small,
    Medium,
    Large,
    Unknown,
}

impl fmt::Display for EffectMagnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EffectMagnitude::Small => "small",
            EffectMagnitude::Medium => "medium",
            EffectMagnitude::Large => "large",
            EffectMagnitude::Unknown => "unknown",
        })
    }
}

/// Labels an effect size by its family's thresholds, using `|value|`.
///
/// # Examples
///
/// ```
/// use u_survival::narrative::{effect_magnitude, EffectMagnitude};
///
/// assert_eq!(effect_magnitude("Cohen's d", -0.8), EffectMagnitude::Large);
/// assert_eq!(effect_magnitude("eta_squared", 0.03), EffectMagnitude::Medium);
/// assert_eq!(effect_magnitude("Cramér's V", 0.05), EffectMagnitude::Small);
/// assert_eq!(effect_magnitude("r", 0.5), EffectMagnitude::Unknown);
/// ```
pub fn effect_magnitude(name: &str, value: f64) -> EffectMagnitude {
    let Some(family) = EffectFamily::from_name(name) else {
        return EffectMagnitude::Unknown;
    };
    let (small, medium) = family.thresholds();
    let v = value.abs();
    if v < small {
        EffectMagnitude::Small
    } else if v < medium {
        EffectMagnitude::Medium
    } else {
        EffectMagnitude::Large
    }
}

/// `name = value (magnitude effect)`, or `(magnitude unknown)`.
pub(crate) fn effect_clause(name: &str, value: f64) -> String {
    let magnitude = effect_magnitude(name, value);
    let label = match magnitude {
        EffectMagnitude::Unknown => "magnitude unknown".to_string(),
        m => format!("{m} effect"),
    };
    format!("{name} = {} ({label})", fmt_fixed(value, 3))
}

/// Median survival to one decimal, or `"not reached"`.
pub(crate) fn fmt_median(median: Option<f64>) -> String {
    match median {
        Some(m) if m.is_finite() => fmt_fixed(m, 1),
        _ => "not reached".to_string(),
    }
}
