//! Test families and their notation.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::format::{fmt_df, fmt_fixed};
use super::result::StatisticalResult;

/// The family a statistical test belongs to. Selects the prose templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestFamily {
    /// Student's or Welch's independent samples t-test.
    TTest,
    /// Mann-Whitney U (Wilcoxon rank-sum) test.
    MannWhitney,
    /// One-way analysis of variance.
    Anova,
    /// Kruskal-Wallis H test.
    KruskalWallis,
    /// Chi-square test of independence.
    ChiSquare,
    /// Fisher's exact test.
    Fisher,
    /// Kaplan-Meier estimation with log-rank comparison.
    Survival,
    /// Anything else; only the p-value is reported.
    Generic,
}

/// Keyword table, checked in order against the lowercased test name with a
/// leading space (so `" t test"` only matches a standalone `t`).
const KEYWORDS: [(TestFamily, &[&str]); 7] = [
    (TestFamily::MannWhitney, &["mann-whitney", "mann whitney", "wilcoxon rank"]),
    (TestFamily::KruskalWallis, &["kruskal"]),
    (TestFamily::Survival, &["survival", "kaplan", "log-rank", "logrank"]),
    (TestFamily::Anova, &["anova", "analysis of variance"]),
    (TestFamily::Fisher, &["fisher"]),
    (TestFamily::ChiSquare, &["chi-square", "chi square", "chi-squared", "chi2", "χ²"]),
    (TestFamily::TTest, &["t-test", " t test", "ttest"]),
];

impl TestFamily {
    /// Classifies a reported test name by keyword.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_survival::narrative::TestFamily;
    ///
    /// assert_eq!(TestFamily::from_test_name("Welch's t-test"), TestFamily::TTest);
    /// assert_eq!(TestFamily::from_test_name("Kaplan-Meier Survival Analysis"), TestFamily::Survival);
    /// assert_eq!(TestFamily::from_test_name("Pearson correlation"), TestFamily::Generic);
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        let lower = format!(" {}", name.to_lowercase());
        let family = KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
            .map_or(TestFamily::Generic, |(family, _)| *family);
        trace!(test_name = name, ?family, "classified test family");
        family
    }

    /// `true` for rank-based tests.
    pub fn is_nonparametric(self) -> bool {
        matches!(self, TestFamily::MannWhitney | TestFamily::KruskalWallis)
    }

    /// Formats the primary test statistic in this family's notation, e.g.
    /// `t(28) = 2.345` or `F(2,27) = 5.120`.
    ///
    /// # Returns
    /// `None` for [`TestFamily::Generic`] or when the statistic is missing.
    pub fn statistic_notation(self, result: &StatisticalResult) -> Option<String> {
        let df = result.stat(&["df", "dof"]);
        let with_df = |symbol: &str, value: f64, df: Option<f64>| match df {
            Some(df) => format!("{symbol}({}) = {}", fmt_df(df), fmt_fixed(value, 3)),
            None => format!("{symbol} = {}", fmt_fixed(value, 3)),
        };

        match self {
            TestFamily::TTest => {
                let t = result.stat(&["t", "t_statistic", "statistic"])?;
                Some(with_df("t", t, df))
            }
            TestFamily::MannWhitney => {
                let u = result.stat(&["U", "u", "u_statistic", "statistic"])?;
                Some(with_df("U", u, None))
            }
            TestFamily::Anova => {
                let f = result.stat(&["F", "f", "f_statistic", "statistic"])?;
                let df1 = result.stat(&["df_between", "df1"]);
                let df2 = result.stat(&["df_within", "df2"]);
                Some(match (df1, df2) {
                    (Some(a), Some(b)) => {
                        format!("F({},{}) = {}", fmt_df(a), fmt_df(b), fmt_fixed(f, 3))
                    }
                    _ => with_df("F", f, None),
                })
            }
            TestFamily::KruskalWallis => {
                let h = result.stat(&["H", "h", "h_statistic", "statistic"])?;
                Some(with_df("H", h, df))
            }
            TestFamily::ChiSquare => {
                let chi2 = result.stat(&["chi2", "chi_square", "chi-square", "statistic"])?;
                Some(with_df("χ²", chi2, df))
            }
            TestFamily::Fisher => {
                let or = result.stat(&["odds_ratio", "OR", "statistic"])?;
                Some(format!("OR = {}", fmt_fixed(or, 3)))
            }
            TestFamily::Survival => {
                let chi2 = result.stat(&["chi2", "log_rank", "logrank", "statistic"])?;
                let df = df.or_else(|| {
                    result
                        .survival_group_stats()
                        .filter(|g| g.len() >= 2)
                        .map(|g| (g.len() - 1) as f64)
                });
                Some(with_df("χ²", chi2, df))
            }
            TestFamily::Generic => None,
        }
    }
}

impl fmt::Display for TestFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TestFamily::TTest => "independent samples t-test",
            TestFamily::MannWhitney => "Mann-Whitney U test",
            TestFamily::Anova => "one-way analysis of variance (ANOVA)",
            TestFamily::KruskalWallis => "Kruskal-Wallis H test",
            TestFamily::ChiSquare => "chi-square test of independence",
            TestFamily::Fisher => "Fisher's exact test",
            TestFamily::Survival => "log-rank test",
            TestFamily::Generic => "statistical test",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn result(name: &str, stats: &[(&str, f64)]) -> StatisticalResult {
        let mut r = StatisticalResult::new(name, 0.01);
        r.statistic = stats.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        r
    }

    #[test]
    fn classify_engine_names() {
        let cases = [
            ("Independent Samples T-Test", TestFamily::TTest),
            ("Student's t-test", TestFamily::TTest),
            ("Mann-Whitney U Test", TestFamily::MannWhitney),
            ("One-Way ANOVA", TestFamily::Anova),
            ("Kruskal-Wallis H Test", TestFamily::KruskalWallis),
            ("Chi-Square Test of Independence", TestFamily::ChiSquare),
            ("Chi-square test of independence", TestFamily::ChiSquare),
            ("Fisher's Exact Test", TestFamily::Fisher),
            ("Welch t test", TestFamily::TTest),
            ("T test", TestFamily::TTest),
            ("Agreement test", TestFamily::Generic),
            ("Kaplan-Meier Survival Analysis", TestFamily::Survival),
            ("Log-rank test", TestFamily::Survival),
            ("Linear Regression", TestFamily::Generic),
            ("", TestFamily::Generic),
        ];
        for (name, expected) in cases {
            assert_eq!(TestFamily::from_test_name(name), expected, "{name}");
        }
    }

    #[test]
    fn nonparametric_flag() {
        assert!(TestFamily::MannWhitney.is_nonparametric());
        assert!(TestFamily::KruskalWallis.is_nonparametric());
        assert!(!TestFamily::TTest.is_nonparametric());
    }

    #[test]
    fn notation_per_family() {
        let t = result("t-test", &[("t", 2.34567), ("df", 28.0)]);
        assert_eq!(TestFamily::TTest.statistic_notation(&t).as_deref(), Some("t(28) = 2.346"));

        let welch = result("t-test", &[("t", -1.5), ("df", 17.432)]);
        assert_eq!(
            TestFamily::TTest.statistic_notation(&welch).as_deref(),
            Some("t(17.43) = -1.500")
        );

        let f = result("anova", &[("F", 5.12), ("df_between", 2.0), ("df_within", 27.0)]);
        assert_eq!(TestFamily::Anova.statistic_notation(&f).as_deref(), Some("F(2,27) = 5.120"));

        let u = result("mw", &[("U", 41.5)]);
        assert_eq!(TestFamily::MannWhitney.statistic_notation(&u).as_deref(), Some("U = 41.500"));

        let h = result("kw", &[("H", 7.0), ("df", 2.0)]);
        assert_eq!(TestFamily::KruskalWallis.statistic_notation(&h).as_deref(), Some("H(2) = 7.000"));

        let chi = result("chi", &[("chi2", 4.2), ("df", 1.0)]);
        assert_eq!(TestFamily::ChiSquare.statistic_notation(&chi).as_deref(), Some("χ²(1) = 4.200"));

        let fisher = result("fisher", &[("odds_ratio", 3.25)]);
        assert_eq!(TestFamily::Fisher.statistic_notation(&fisher).as_deref(), Some("OR = 3.250"));

        assert_eq!(TestFamily::Generic.statistic_notation(&t), None);
    }

    #[test]
    fn missing_statistic() {
        let empty = result("t-test", &[]);
        assert_eq!(TestFamily::TTest.statistic_notation(&empty), None);
        let no_df = result("anova", &[("F", 1.0)]);
        assert_eq!(TestFamily::Anova.statistic_notation(&no_df).as_deref(), Some("F = 1.000"));
    }

    #[test]
    fn survival_df_from_group_count() {
        use crate::narrative::SurvivalData;
        use crate::survival::SurvivalGroupStats;

        let mut r = result("Kaplan-Meier", &[("statistic", 3.9)]);
        let stats = SurvivalGroupStats {
            n: 10,
            events: 4,
            median_survival: None,
        };
        r.survival_data = Some(SurvivalData {
            group_stats: Some(BTreeMap::from([
                ("A".to_string(), stats.clone()),
                ("B".to_string(), stats),
            ])),
        });
        assert_eq!(TestFamily::Survival.statistic_notation(&r).as_deref(), Some("χ²(1) = 3.900"));
    }
}
