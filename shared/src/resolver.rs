//! Label to disease resolution.
//!
//! A classifier label is normalised and matched against an ordered keyword
//! table; the first rule with a matching needle wins. Labels that match no
//! rule resolve to the configured [`FallbackPolicy`].

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumString};

use crate::catalog::DiseaseKey;
use crate::classification::Classification;

/// Catalog key returned when no keyword rule matches.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FallbackPolicy {
    #[default]
    Unknown,
    Healthy,
    CommonRust,
}

impl FallbackPolicy {
    pub fn key(self) -> DiseaseKey {
        match self {
            Self::Unknown => DiseaseKey::Unknown,
            Self::Healthy => DiseaseKey::Healthy,
            Self::CommonRust => DiseaseKey::CommonRust,
        }
    }
}

struct KeywordRule {
    needles: &'static [&'static str],
    key: DiseaseKey,
}

// Order matters: rust variants first, healthy last.
const RULES: &[KeywordRule] = &[
    KeywordRule {
        needles: &["southern rust", "polysora"],
        key: DiseaseKey::SouthernRust,
    },
    KeywordRule {
        needles: &["rust", "puccinia"],
        key: DiseaseKey::CommonRust,
    },
    KeywordRule {
        needles: &["blight", "turcicum", "exserohilum"],
        key: DiseaseKey::NorthernLeafBlight,
    },
    KeywordRule {
        needles: &["spot", "cercospora"],
        key: DiseaseKey::GrayLeafSpot,
    },
    KeywordRule {
        needles: &["wilt", "clavibacter", "goss"],
        key: DiseaseKey::GossWilt,
    },
    KeywordRule {
        needles: &["mosaic", "virus", "mdmv", "dwarf"],
        key: DiseaseKey::MaizeDwarfMosaic,
    },
    KeywordRule {
        needles: &["phosphorus"],
        key: DiseaseKey::PhosphorusDeficiency,
    },
    KeywordRule {
        needles: &["potassium"],
        key: DiseaseKey::PotassiumDeficiency,
    },
    KeywordRule {
        needles: &["nitrogen", "deficiency", "chlorosis"],
        key: DiseaseKey::NitrogenDeficiency,
    },
    KeywordRule {
        needles: &["healthy"],
        key: DiseaseKey::Healthy,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Resolver {
    fallback: FallbackPolicy,
}

impl Resolver {
    pub fn new(fallback: FallbackPolicy) -> Self {
        Self { fallback }
    }

    pub fn fallback(&self) -> FallbackPolicy {
        self.fallback
    }

    pub fn resolve(&self, label: &str) -> DiseaseKey {
        let normalized = normalize_label(label);
        RULES
            .iter()
            .find(|rule| rule.needles.iter().any(|needle| normalized.contains(needle)))
            .map(|rule| rule.key)
            .unwrap_or_else(|| self.fallback.key())
    }

    pub fn resolve_classification(&self, classification: &Classification) -> DiseaseKey {
        self.resolve(&classification.top().label)
    }
}

/// Lower-cases, turns `_`, `-`, `.` and `/` into spaces and collapses runs of
/// whitespace.
pub fn normalize_label(label: &str) -> String {
    let replaced: String = label
        .chars()
        .map(|c| match c {
            '_' | '-' | '.' | '/' => ' ',
            other => other,
        })
        .collect::<String>()
        .to_lowercase();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Severity;
    use crate::classification::Prediction;
    use proptest::prelude::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_keyword_table() {
        let resolver = Resolver::default();
        let cases = [
            ("Common_Rust", DiseaseKey::CommonRust),
            ("corn (maize) common rust", DiseaseKey::CommonRust),
            ("Puccinia sorghi", DiseaseKey::CommonRust),
            ("Southern_Rust", DiseaseKey::SouthernRust),
            ("southern-rust", DiseaseKey::SouthernRust),
            ("P. polysora", DiseaseKey::SouthernRust),
            ("Northern_Corn_Leaf_Blight", DiseaseKey::NorthernLeafBlight),
            ("northern_leaf_blight", DiseaseKey::NorthernLeafBlight),
            ("Exserohilum", DiseaseKey::NorthernLeafBlight),
            ("Cercospora_leaf_spot Gray_leaf_spot", DiseaseKey::GrayLeafSpot),
            ("gray leaf spot", DiseaseKey::GrayLeafSpot),
            ("Goss's Wilt", DiseaseKey::GossWilt),
            ("Clavibacter", DiseaseKey::GossWilt),
            ("Maize Dwarf Mosaic Virus", DiseaseKey::MaizeDwarfMosaic),
            ("MDMV", DiseaseKey::MaizeDwarfMosaic),
            ("phosphorus_deficiency", DiseaseKey::PhosphorusDeficiency),
            ("Potassium deficiency", DiseaseKey::PotassiumDeficiency),
            ("Nitrogen_Deficiency", DiseaseKey::NitrogenDeficiency),
            ("nutrient deficiency", DiseaseKey::NitrogenDeficiency),
            ("interveinal chlorosis", DiseaseKey::NitrogenDeficiency),
            ("Healthy", DiseaseKey::Healthy),
            ("Corn_(maize)___healthy", DiseaseKey::Healthy),
        ];

        for (label, expected) in cases {
            assert_eq!(resolver.resolve(label), expected, "label {:?}", label);
        }
    }

    #[test]
    fn test_rust_wins_over_later_rules() {
        let resolver = Resolver::default();
        assert_eq!(resolver.resolve("rust with leaf blight"), DiseaseKey::CommonRust);
        assert_eq!(resolver.resolve("healthy? no, rust"), DiseaseKey::CommonRust);
    }

    #[test]
    fn test_fallback_policies() {
        for (policy, expected) in [
            (FallbackPolicy::Unknown, DiseaseKey::Unknown),
            (FallbackPolicy::Healthy, DiseaseKey::Healthy),
            (FallbackPolicy::CommonRust, DiseaseKey::CommonRust),
        ] {
            let resolver = Resolver::new(policy);
            assert_eq!(resolver.resolve(""), expected);
            assert_eq!(resolver.resolve("tassel"), expected);
            assert_eq!(resolver.resolve("\u{0}\u{ffff}"), expected);
        }
    }

    #[test]
    fn test_fallback_policy_parses_from_config_strings() {
        assert_eq!("common_rust".parse::<FallbackPolicy>().ok(), Some(FallbackPolicy::CommonRust));
        assert_eq!("healthy".parse::<FallbackPolicy>().ok(), Some(FallbackPolicy::Healthy));
        assert!("sometimes".parse::<FallbackPolicy>().is_err());
    }

    #[test]
    fn test_healthy_label_resolves_to_clean_record() {
        let key = Resolver::default().resolve("HEALTHY leaf");
        let record = key.record();
        assert_eq!(key, DiseaseKey::Healthy);
        assert_eq!(record.affected_area_percent, 0);
        assert!(record.causes.is_empty());
        assert_eq!(record.severity, Severity::Normal);
    }

    #[test]
    fn test_resolve_classification_uses_top_prediction() {
        let classification = Classification::from_predictions(vec![
            Prediction::new("healthy", 0.05),
            Prediction::new("Goss_Wilt", 0.95),
        ])
        .expect("non-empty");
        assert_eq!(
            Resolver::default().resolve_classification(&classification),
            DiseaseKey::GossWilt
        );
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("  Corn_(maize)___Common-Rust "), "corn (maize) common rust");
        assert_eq!(normalize_label(""), "");
    }

    proptest! {
        #[test]
        fn prop_resolver_is_total(label in any::<String>()) {
            let key = Resolver::default().resolve(&label);
            prop_assert!(DiseaseKey::iter().any(|k| k == key));
        }

        #[test]
        fn prop_resolver_is_idempotent(label in any::<String>()) {
            let resolver = Resolver::new(FallbackPolicy::Healthy);
            let first = resolver.resolve(&label);
            prop_assert_eq!(first, resolver.resolve(&label));
            prop_assert_eq!(first.record(), resolver.resolve(&label).record());
        }

        #[test]
        fn prop_rust_labels_never_fall_back(
            prefix in "[a-zA-Z _-]{0,12}",
            rust in "[rR][uU][sS][tT]",
            suffix in "[a-zA-Z _-]{0,12}",
        ) {
            let label = format!("{prefix}{rust}{suffix}");
            for policy in [FallbackPolicy::Unknown, FallbackPolicy::Healthy] {
                let key = Resolver::new(policy).resolve(&label);
                prop_assert!(key.is_rust(), "{:?} resolved to {:?}", label, key);
            }
        }
    }
}
