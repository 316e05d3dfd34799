//! Figure-legend paragraph.

use super::family::TestFamily;
use super::format::{
    effect_clause, fmt_fixed, fmt_median, format_p_value, significance_stars,
};
use super::methods::table_phrase;
use super::result::{StatisticalResult, VariableNames};

/// Generates the figure legend for a statistical result.
///
/// The last sentence carries the test statistic, the p-value with
/// significance stars (`*` p<0.05, `**` p<0.01, `***` p<0.001) when
/// significant, and the effect size if one was reported.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use u_survival::narrative::{generate_figure_legend, StatisticalResult, VariableNames};
///
/// let mut result = StatisticalResult::new("One-Way ANOVA", 0.004);
/// result.statistic = BTreeMap::from([
///     ("F".to_string(), 6.2),
///     ("df_between".to_string(), 2.0),
///     ("df_within".to_string(), 27.0),
/// ]);
/// let text = generate_figure_legend(&result, &VariableNames::new("yield", "fertilizer"));
/// assert!(text.starts_with("Bar graph showing mean ± SEM of yield across fertilizer groups."));
/// assert!(text.ends_with("F(2,27) = 6.200, p = 0.004**."));
/// ```
pub fn generate_figure_legend(result: &StatisticalResult, names: &VariableNames) -> String {
    let family = result.family();
    let mut sentences: Vec<String> = vec![lead(family, result, names)];

    if let Some(groups) = result.groups.as_ref().filter(|g| !g.is_empty()) {
        if shows_means(family) {
            let parts: Vec<String> = groups
                .iter()
                .map(|(name, g)| {
                    format!(
                        "{name}, {} ± {} (n={})",
                        fmt_fixed(g.mean, 2),
                        fmt_fixed(g.standard_error(), 2),
                        g.n
                    )
                })
                .collect();
            sentences.push(format!("Values are mean ± SEM: {}.", parts.join("; ")));
        } else {
            let parts: Vec<String> = groups
                .iter()
                .map(|(name, g)| format!("{name} (n={})", g.n))
                .collect();
            sentences.push(format!("Group sizes: {}.", parts.join("; ")));
        }
    }

    if let Some(stats) = result.survival_group_stats().filter(|s| !s.is_empty()) {
        let parts: Vec<String> = stats
            .iter()
            .map(|(name, s)| {
                format!(
                    "{name}, {} (n={}, {} events)",
                    fmt_median(s.median_survival),
                    s.n,
                    s.events
                )
            })
            .collect();
        sentences.push(format!("Median survival: {}.", parts.join("; ")));
    }

    sentences.push(statistics_sentence(family, result));
    sentences.join(" ")
}

fn shows_means(family: TestFamily) -> bool {
    matches!(family, TestFamily::TTest | TestFamily::Anova)
}

fn lead(family: TestFamily, result: &StatisticalResult, names: &VariableNames) -> String {
    let VariableNames { outcome, group } = names;
    match family {
        TestFamily::TTest => format!("Bar graph showing mean ± SEM of {outcome} by {group}."),
        TestFamily::Anova => {
            format!("Bar graph showing mean ± SEM of {outcome} across {group} groups.")
        }
        TestFamily::MannWhitney | TestFamily::KruskalWallis => format!(
            "Box plots showing distribution of {outcome} by {group}. \
             Boxes indicate the median and interquartile range; whiskers extend to 1.5 × IQR."
        ),
        TestFamily::ChiSquare | TestFamily::Fisher => {
            let table = table_phrase(result);
            if table.is_empty() {
                format!("Contingency table heatmap showing the distribution of {outcome} across {group} categories.")
            } else {
                format!(
                    "Contingency table heatmap showing the distribution of {outcome} across {group} categories, \
                     with observed counts shown{table}."
                )
            }
        }
        TestFamily::Survival => format!(
            "Kaplan-Meier survival curves showing survival probability over {outcome} by {group}."
        ),
        TestFamily::Generic => format!("Figure showing {outcome} by {group}."),
    }
}

fn statistics_sentence(family: TestFamily, result: &StatisticalResult) -> String {
    let label = match family {
        TestFamily::Generic => {
            let test = result.test_name.trim();
            if test.is_empty() {
                "Statistical test".to_string()
            } else {
                test.to_string()
            }
        }
        f => capitalize(&f.to_string()),
    };

    let mut clause = match family.statistic_notation(result) {
        Some(stat) => format!("{stat}, "),
        None => String::new(),
    };
    clause.push_str(&format_p_value(result.p_value));
    clause.push_str(significance_stars(result.p_value));

    if let Some(es) = &result.effect_size {
        if let Some(value) = es.value.filter(|v| v.is_finite()) {
            clause.push_str("; ");
            clause.push_str(&effect_clause(&es.name, value));
        }
    }

    format!("{label}: {clause}.")
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narrative::{EffectSize, GroupDescriptives, SurvivalData};
    use crate::survival::SurvivalGroupStats;
    use std::collections::BTreeMap;

    fn names() -> VariableNames {
        VariableNames::new("tumor volume", "treatment")
    }

    #[test]
    fn t_test_legend() {
        let mut r = StatisticalResult::new("Welch's t-test", 0.0004);
        r.statistic = BTreeMap::from([("t".to_string(), -4.5), ("df".to_string(), 17.25)]);
        r.groups = Some(BTreeMap::from([
            (
                "Control".to_string(),
                GroupDescriptives {
                    n: 9,
                    mean: 10.0,
                    std_dev: 3.0,
                    sem: None,
                },
            ),
            (
                "Drug".to_string(),
                GroupDescriptives {
                    n: 10,
                    mean: 5.5,
                    std_dev: 1.0,
                    sem: Some(0.25),
                },
            ),
        ]));
        r.effect_size = Some(EffectSize {
            name: "Cohen's d".to_string(),
            value: Some(-1.9),
        });
        let text = generate_figure_legend(&r, &names());
        assert_eq!(
            text,
            "Bar graph showing mean ± SEM of tumor volume by treatment. \
             Values are mean ± SEM: Control, 10.00 ± 1.00 (n=9); Drug, 5.50 ± 0.25 (n=10). \
             Independent samples t-test: t(17.25) = -4.500, p < 0.001***; \
             Cohen's d = -1.900 (large effect)."
        );
    }

    #[test]
    fn box_plot_families() {
        let mut r = StatisticalResult::new("Kruskal-Wallis H Test", 0.2);
        r.statistic = BTreeMap::from([("H".to_string(), 3.2), ("df".to_string(), 2.0)]);
        r.groups = Some(BTreeMap::from([(
            "Low".to_string(),
            GroupDescriptives {
                n: 5,
                mean: 1.0,
                std_dev: 0.5,
                sem: None,
            },
        )]));
        let text = generate_figure_legend(&r, &names());
        assert!(text.starts_with("Box plots showing distribution of tumor volume by treatment."));
        assert!(text.contains("Group sizes: Low (n=5)."));
        assert!(text.ends_with("Kruskal-Wallis H test: H(2) = 3.200, p = 0.200."));
        assert!(!text.contains('*'));
    }

    #[test]
    fn heatmap_with_table() {
        let mut r = StatisticalResult::new("Fisher's Exact Test", 0.02);
        r.statistic = BTreeMap::from([("odds_ratio".to_string(), 4.0)]);
        r.contingency_table = Some(vec![vec![8.0, 2.0], vec![1.0, 9.0]]);
        let text = generate_figure_legend(&r, &names());
        assert!(text.starts_with("Contingency table heatmap"));
        assert!(text.contains("using a 2×2 contingency table."));
        assert!(text.ends_with("Fisher's exact test: OR = 4.000, p = 0.020*."));
    }

    #[test]
    fn survival_legend() {
        let mut r = StatisticalResult::new("Kaplan-Meier Survival Analysis", 0.008);
        r.statistic = BTreeMap::from([("chi2".to_string(), 7.0), ("df".to_string(), 1.0)]);
        r.survival_data = Some(SurvivalData {
            group_stats: Some(BTreeMap::from([
                (
                    "A".to_string(),
                    SurvivalGroupStats {
                        n: 30,
                        events: 10,
                        median_survival: None,
                    },
                ),
                (
                    "B".to_string(),
                    SurvivalGroupStats {
                        n: 28,
                        events: 20,
                        median_survival: Some(14.0),
                    },
                ),
            ])),
        });
        let text = generate_figure_legend(&r, &VariableNames::new("months", "arm"));
        assert_eq!(
            text,
            "Kaplan-Meier survival curves showing survival probability over months by arm. \
             Median survival: A, not reached (n=30, 10 events); B, 14.0 (n=28, 20 events). \
             Log-rank test: χ²(1) = 7.000, p = 0.008**."
        );
    }

    #[test]
    fn generic_legend() {
        let r = StatisticalResult::new("Spearman correlation", 0.6);
        let text = generate_figure_legend(&r, &names());
        assert_eq!(
            text,
            "Figure showing tumor volume by treatment. Spearman correlation: p = 0.600."
        );
    }

    #[test]
    fn capitalize_first_char() {
        assert_eq!(capitalize("log-rank test"), "Log-rank test");
        assert_eq!(capitalize(""), "");
    }
}
