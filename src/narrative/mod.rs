//! Publication-style narrative text from statistical results.
//!
//! Maps a [`StatisticalResult`] produced by an external statistical engine
//! to a methods paragraph and a figure legend. Templates are selected by
//! [`TestFamily`]; an unrecognized family falls back to a generic template
//! that reports only the p-value.
//!
//! Output depends on nothing but the inputs: no locale, clock, or global
//! state is consulted, so the same result always yields the same bytes.
//!
//! # Examples
//!
//! ```
//! use u_survival::narrative::{synthesize_narrative, StatisticalResult, VariableNames};
//!
//! let result = StatisticalResult::from_json(r#"{
//!     "test_name": "Chi-square test of independence",
//!     "statistic": {"chi2": 6.1, "df": 2},
//!     "p_value": 0.047,
//!     "effect_size": {"name": "Cramér's V", "value": 0.18}
//! }"#).unwrap();
//! let out = synthesize_narrative(&result, &VariableNames::new("response", "dose"));
//! assert!(out.methods_text.contains("χ²(2) = 6.100, p = 0.047"));
//! assert!(out.figure_legend_text.contains("p = 0.047*"));
//! ```

mod family;
mod format;
mod legend;
mod methods;
mod result;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::NarrativeConfig;

pub use family::TestFamily;
pub use format::{
    effect_magnitude, format_p_value, significance_level, significance_stars, EffectFamily,
    EffectMagnitude,
};
pub use legend::generate_figure_legend;
pub use methods::generate_methods;
pub use result::{
    EffectSize, GroupDescriptives, StatisticalResult, SurvivalData, VariableNames,
};

/// The two generated paragraphs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeOutput {
    /// Methods-section paragraph.
    pub methods_text: String,
    /// Figure-legend paragraph.
    pub figure_legend_text: String,
}

/// Generates methods and figure-legend text with the default α = 0.05.
pub fn synthesize_narrative(result: &StatisticalResult, names: &VariableNames) -> NarrativeOutput {
    synthesize_narrative_with(result, names, &NarrativeConfig::default())
}

/// Generates methods and figure-legend text with explicit settings.
pub fn synthesize_narrative_with(
    result: &StatisticalResult,
    names: &VariableNames,
    config: &NarrativeConfig,
) -> NarrativeOutput {
    debug!(
        test_name = %result.test_name,
        family = ?result.family(),
        p_value = result.p_value,
        "synthesizing narrative"
    );
    NarrativeOutput {
        methods_text: generate_methods(result, names, config),
        figure_legend_text: generate_figure_legend(result, names),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_paragraphs_end_with_period() {
        for name in [
            "Student's t-test",
            "Mann-Whitney U Test",
            "One-Way ANOVA",
            "Kruskal-Wallis H Test",
            "Chi-Square Test of Independence",
            "Fisher's Exact Test",
            "Kaplan-Meier Survival Analysis",
            "Unrecognized procedure",
        ] {
            let result = StatisticalResult::new(name, 0.03);
            let out = synthesize_narrative(&result, &VariableNames::new("y", "x"));
            assert!(out.methods_text.ends_with('.'), "{name}: {}", out.methods_text);
            assert!(out.figure_legend_text.ends_with('.'), "{name}: {}", out.figure_legend_text);
        }
    }

    #[test]
    fn explicit_family_overrides_name() {
        let mut result = StatisticalResult::new("Procedure 7", 0.2);
        result.test_family = Some(TestFamily::MannWhitney);
        let out = synthesize_narrative(&result, &VariableNames::new("y", "x"));
        assert!(out.methods_text.contains("Mann-Whitney U test"));
        assert!(out.figure_legend_text.starts_with("Box plots"));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn family() -> impl Strategy<Value = TestFamily> {
        prop_oneof![
            Just(TestFamily::TTest),
            Just(TestFamily::MannWhitney),
            Just(TestFamily::Anova),
            Just(TestFamily::KruskalWallis),
            Just(TestFamily::ChiSquare),
            Just(TestFamily::Fisher),
            Just(TestFamily::Survival),
            Just(TestFamily::Generic),
        ]
    }

    proptest! {
        #[test]
        fn deterministic(
            family in family(),
            p in 0.0_f64..1.0,
            stat in -50.0_f64..50.0,
            df in 1u32..100,
            effect in proptest::option::of(-2.0_f64..2.0),
            groups in proptest::collection::btree_map("[A-D]", (1usize..50, 0.0_f64..100.0, 0.0_f64..10.0), 0..4),
        ) {
            let mut result = StatisticalResult::new("Analysis", p);
            result.test_family = Some(family);
            result.statistic = ["t", "U", "F", "H", "chi2", "odds_ratio", "statistic"]
                .iter()
                .map(|k| (k.to_string(), stat))
                .chain([("df".to_string(), f64::from(df))])
                .collect::<BTreeMap<_, _>>();
            result.effect_size = effect.map(|v| EffectSize {
                name: "Cohen's d".to_string(),
                value: Some(v),
            });
            if !groups.is_empty() {
                result.groups = Some(
                    groups
                        .into_iter()
                        .map(|(k, (n, mean, sd))| {
                            (k, GroupDescriptives { n, mean, std_dev: sd, sem: None })
                        })
                        .collect(),
                );
            }
            let names = VariableNames::new("outcome", "group");
            let a = synthesize_narrative(&result, &names);
            let b = synthesize_narrative(&result.clone(), &names);
            prop_assert_eq!(&a, &b);
            prop_assert!(a.methods_text.ends_with('.'));
            prop_assert!(a.figure_legend_text.ends_with('.'));
            prop_assert_eq!(
                a.methods_text.contains("statistically significant ("),
                p < 0.05
            );
            prop_assert_eq!(a.figure_legend_text.contains('*'), p < 0.05);
        }
    }
}
