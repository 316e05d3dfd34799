//! Methods-section paragraph.
//!
//! Sentences are appended in a fixed order; each optional block contributes
//! only when its field is present in the result.

use super::family::TestFamily;
use super::format::{effect_clause, fmt_fixed, fmt_median, format_p_value, significance_level};
use super::result::{StatisticalResult, VariableNames};
use crate::config::NarrativeConfig;

/// Generates the methods paragraph for a statistical result.
///
/// # Examples
///
/// ```
/// use u_survival::config::NarrativeConfig;
/// use u_survival::narrative::{generate_methods, StatisticalResult, VariableNames};
///
/// let result = StatisticalResult::new("Pearson correlation", 0.2);
/// let names = VariableNames::new("score", "cohort");
/// let text = generate_methods(&result, &names, &NarrativeConfig::default());
/// assert!(text.contains("p = 0.200"));
/// assert!(text.contains("no statistically significant difference detected"));
/// assert!(text.ends_with("α = 0.05."));
/// ```
pub fn generate_methods(
    result: &StatisticalResult,
    names: &VariableNames,
    config: &NarrativeConfig,
) -> String {
    let family = result.family();
    let mut sentences: Vec<String> = Vec::new();

    if let Some(total) = result.total_n() {
        let noun = if total == 1 { "participant was" } else { "participants were" };
        sentences.push(format!("A total of {total} {noun} included in the analysis."));
    }

    sentences.push(rationale(family, result, names));

    if let Some(groups) = result.groups.as_ref().filter(|g| !g.is_empty()) {
        let parts: Vec<String> = groups
            .iter()
            .map(|(name, g)| {
                format!(
                    "{name} (n={}, M={}, SD={})",
                    g.n,
                    fmt_fixed(g.mean, 2),
                    fmt_fixed(g.std_dev, 2)
                )
            })
            .collect();
        sentences.push(format!("Descriptive statistics by group: {}.", parts.join("; ")));
    }

    if let Some(stats) = result.survival_group_stats().filter(|s| !s.is_empty()) {
        let parts: Vec<String> = stats
            .iter()
            .map(|(name, s)| {
                format!(
                    "{name}, {} of {} events ({}%), median survival {}",
                    s.events,
                    s.n,
                    fmt_fixed(s.event_rate_percent(), 1),
                    fmt_median(s.median_survival)
                )
            })
            .collect();
        sentences.push(format!("Events by group: {}.", parts.join("; ")));
    }

    let p_text = format_p_value(result.p_value);
    sentences.push(match family.statistic_notation(result) {
        Some(stat) => format!("The analysis yielded {stat}, {p_text}."),
        None => format!("The analysis yielded {p_text}."),
    });

    if let Some(es) = &result.effect_size {
        if let Some(value) = es.value.filter(|v| v.is_finite()) {
            sentences.push(format!("Effect size: {}.", effect_clause(&es.name, value)));
        }
    }

    sentences.push(significance_sentence(result.p_value, config.alpha));
    sentences.push(format!(
        "Statistical significance was set at α = {}.",
        config.alpha
    ));

    sentences.join(" ")
}

fn rationale(family: TestFamily, result: &StatisticalResult, names: &VariableNames) -> String {
    let VariableNames { outcome, group } = names;
    match family {
        TestFamily::TTest => format!(
            "An independent samples t-test was performed to compare mean {outcome} between {group} groups."
        ),
        TestFamily::MannWhitney => format!(
            "The Mann-Whitney U test was used to compare {outcome} between {group} groups; \
             this non-parametric test was selected due to assumption violations of the t-test."
        ),
        TestFamily::Anova => format!(
            "A one-way analysis of variance (ANOVA) was performed to compare mean {outcome} across {group} groups."
        ),
        TestFamily::KruskalWallis => format!(
            "The Kruskal-Wallis H test was used to compare {outcome} across {group} groups; \
             this non-parametric test was selected due to assumption violations of one-way ANOVA."
        ),
        TestFamily::ChiSquare => format!(
            "A chi-square test of independence was performed to examine the association between {group} and {outcome}{}.",
            table_phrase(result)
        ),
        TestFamily::Fisher => format!(
            "Fisher's exact test was performed to examine the association between {group} and {outcome}{}.",
            table_phrase(result)
        ),
        TestFamily::Survival => format!(
            "Survival over {outcome} was estimated using the Kaplan-Meier product-limit method \
             and compared between {group} groups using the log-rank test."
        ),
        TestFamily::Generic => {
            let test = result.test_name.trim();
            if test.is_empty() {
                format!("Statistical analysis of {outcome} by {group} was performed.")
            } else {
                format!("{test} was performed to analyze {outcome} by {group}.")
            }
        }
    }
}

/// `" using a 2×3 contingency table"`, or empty when no table was reported.
pub(crate) fn table_phrase(result: &StatisticalResult) -> String {
    match result.contingency_table.as_deref() {
        Some(rows) if !rows.is_empty() => {
            let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
            format!(" using a {}×{cols} contingency table", rows.len())
        }
        _ => String::new(),
    }
}

fn significance_sentence(p: f64, alpha: f64) -> String {
    if p < alpha {
        let level = significance_level(p)
            .map(str::to_string)
            .unwrap_or_else(|| format!("p<{alpha}"));
        format!("The result was statistically significant ({level}).")
    } else {
        "There was no statistically significant difference detected.".to_string()
    }
}
