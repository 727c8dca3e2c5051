//! Static maize disease catalog.
//!
//! Every [`DiseaseKey`] maps to exactly one `'static` [`DiseaseRecord`], so a
//! lookup can never miss. Severity and affected area are fixed per record and
//! are not measured from the image.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DiseaseKey {
    CommonRust,
    SouthernRust,
    NorthernLeafBlight,
    GrayLeafSpot,
    GossWilt,
    MaizeDwarfMosaic,
    NitrogenDeficiency,
    PhosphorusDeficiency,
    PotassiumDeficiency,
    Healthy,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[display(fmt = "critical")]
    Critical,
    #[display(fmt = "moderate")]
    Moderate,
    #[display(fmt = "normal")]
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DiseaseCategory {
    #[display(fmt = "Fungal")]
    Fungal,
    #[display(fmt = "Bacterial")]
    Bacterial,
    #[display(fmt = "Viral")]
    Viral,
    #[display(fmt = "Nutritional")]
    Nutritional,
    #[display(fmt = "None")]
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Treatment {
    pub medicine: &'static str,
    pub dosage: &'static str,
    pub frequency: &'static str,
    pub instructions: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiseaseRecord {
    pub key: DiseaseKey,
    pub name: &'static str,
    pub category: DiseaseCategory,
    pub severity: Severity,
    pub affected_area_percent: u8,
    pub causes: &'static [&'static str],
    pub prevention: &'static [&'static str],
    pub treatment: Treatment,
}

impl DiseaseKey {
    pub fn record(self) -> &'static DiseaseRecord {
        match self {
            Self::CommonRust => &COMMON_RUST,
            Self::SouthernRust => &SOUTHERN_RUST,
            Self::NorthernLeafBlight => &NORTHERN_LEAF_BLIGHT,
            Self::GrayLeafSpot => &GRAY_LEAF_SPOT,
            Self::GossWilt => &GOSS_WILT,
            Self::MaizeDwarfMosaic => &MAIZE_DWARF_MOSAIC,
            Self::NitrogenDeficiency => &NITROGEN_DEFICIENCY,
            Self::PhosphorusDeficiency => &PHOSPHORUS_DEFICIENCY,
            Self::PotassiumDeficiency => &POTASSIUM_DEFICIENCY,
            Self::Healthy => &HEALTHY,
            Self::Unknown => &UNKNOWN,
        }
    }

    pub fn is_rust(self) -> bool {
        matches!(self, Self::CommonRust | Self::SouthernRust)
    }
}

static COMMON_RUST: DiseaseRecord = DiseaseRecord {
    key: DiseaseKey::CommonRust,
    name: "Common Rust (Puccinia sorghi)",
    category: DiseaseCategory::Fungal,
    severity: Severity::Critical,
    affected_area_percent: 75,
    causes: &[
        "Fungal pathogen (Puccinia sorghi)",
        "Cool temperatures (60-70°F)",
        "High humidity (>95%)",
        "Extended leaf wetness periods",
    ],
    prevention: &[
        "Plant rust-resistant hybrids",
        "Early planting",
        "Improve field drainage",
        "Maintain proper plant spacing",
    ],
    treatment: Treatment {
        medicine: "Azoxystrobin + Propiconazole",
        dosage: "400-600 ml/ha",
        frequency: "14-21 days interval",
        instructions: "Apply before disease reaches 5% leaf area",
    },
};

static SOUTHERN_RUST: DiseaseRecord = DiseaseRecord {
    key: DiseaseKey::SouthernRust,
    name: "Southern Rust (Puccinia polysora)",
    category: DiseaseCategory::Fungal,
    severity: Severity::Critical,
    affected_area_percent: 70,
    causes: &[
        "Fungal pathogen (Puccinia polysora)",
        "Warm temperatures (80-90°F)",
        "High humidity",
    ],
    prevention: &["Resistant varieties", "Early planting", "Field monitoring"],
    treatment: Treatment {
        medicine: "Pyraclostrobin + Metconazole",
        dosage: "500-750 ml/ha",
        frequency: "14 days interval",
        instructions: "Apply at first sign of disease",
    },
};

static NORTHERN_LEAF_BLIGHT: DiseaseRecord = DiseaseRecord {
    key: DiseaseKey::NorthernLeafBlight,
    name: "Northern Leaf Blight (Exserohilum turcicum)",
    category: DiseaseCategory::Fungal,
    severity: Severity::Critical,
    affected_area_percent: 60,
    causes: &[
        "Fungal pathogen (Exserohilum turcicum)",
        "Humid conditions",
        "Temperatures between 18-27°C",
        "Infected crop residue left on the surface",
    ],
    prevention: &[
        "Use resistant maize varieties",
        "Crop rotation",
        "Remove infected plant debris",
        "Maintain proper plant spacing",
    ],
    treatment: Treatment {
        medicine: "Propiconazole",
        dosage: "500 ml/ha",
        frequency: "14 days interval",
        instructions: "Apply at early stages, before lesions reach the ear leaf",
    },
};

static GRAY_LEAF_SPOT: DiseaseRecord = DiseaseRecord {
    key: DiseaseKey::GrayLeafSpot,
    name: "Gray Leaf Spot (Cercospora zeae-maydis)",
    category: DiseaseCategory::Fungal,
    severity: Severity::Moderate,
    affected_area_percent: 50,
    causes: &[
        "Fungal pathogen (Cercospora zeae-maydis)",
        "Warm, humid weather",
        "Prolonged leaf wetness",
        "Continuous maize under reduced tillage",
    ],
    prevention: &[
        "Plant resistant hybrids",
        "Rotate away from maize for at least one season",
        "Bury or manage infected residue",
    ],
    treatment: Treatment {
        medicine: "Pyraclostrobin",
        dosage: "400-600 ml/ha",
        frequency: "14 days interval",
        instructions: "Apply between tasseling and early silking",
    },
};

static GOSS_WILT: DiseaseRecord = DiseaseRecord {
    key: DiseaseKey::GossWilt,
    name: "Goss's Wilt",
    category: DiseaseCategory::Bacterial,
    severity: Severity::Critical,
    affected_area_percent: 65,
    causes: &[
        "Bacteria (Clavibacter michiganensis)",
        "Plant injury",
        "Warm, humid conditions",
    ],
    prevention: &["Resistant hybrids", "Crop rotation", "Clean equipment"],
    treatment: Treatment {
        medicine: "Copper-based bactericide",
        dosage: "2.5-3.0 kg/ha",
        frequency: "7-10 days interval",
        instructions: "Apply preventively during high-risk periods",
    },
};

static MAIZE_DWARF_MOSAIC: DiseaseRecord = DiseaseRecord {
    key: DiseaseKey::MaizeDwarfMosaic,
    name: "Maize Dwarf Mosaic Virus",
    category: DiseaseCategory::Viral,
    severity: Severity::Critical,
    affected_area_percent: 60,
    causes: &["MDMV virus", "Aphid vectors", "Presence of grass hosts"],
    prevention: &["Resistant varieties", "Weed control", "Aphid management"],
    treatment: Treatment {
        medicine: "Insecticide for vector control",
        dosage: "As per label",
        frequency: "Monitor aphid population",
        instructions: "Focus on vector control and prevention",
    },
};

static NITROGEN_DEFICIENCY: DiseaseRecord = DiseaseRecord {
    key: DiseaseKey::NitrogenDeficiency,
    name: "Nitrogen Deficiency",
    category: DiseaseCategory::Nutritional,
    severity: Severity::Moderate,
    affected_area_percent: 45,
    causes: &[
        "Poor soil fertility",
        "Leaching",
        "Insufficient fertilization",
    ],
    prevention: &["Soil testing", "Proper fertilization", "Cover crops"],
    treatment: Treatment {
        medicine: "Urea or Ammonium Nitrate",
        dosage: "150-200 kg N/ha",
        frequency: "Split application",
        instructions: "Apply based on growth stage and soil tests",
    },
};

static PHOSPHORUS_DEFICIENCY: DiseaseRecord = DiseaseRecord {
    key: DiseaseKey::PhosphorusDeficiency,
    name: "Phosphorus Deficiency",
    category: DiseaseCategory::Nutritional,
    severity: Severity::Moderate,
    affected_area_percent: 35,
    causes: &[
        "Cold, wet soils early in the season",
        "Low soil phosphorus",
        "High soil pH",
    ],
    prevention: &[
        "Soil testing",
        "Band phosphorus at planting",
        "Keep soil pH between 6.0 and 7.0",
    ],
    treatment: Treatment {
        medicine: "Diammonium Phosphate (DAP)",
        dosage: "100-150 kg/ha",
        frequency: "Single application",
        instructions: "Place near the root zone early in the season",
    },
};

static POTASSIUM_DEFICIENCY: DiseaseRecord = DiseaseRecord {
    key: DiseaseKey::PotassiumDeficiency,
    name: "Potassium Deficiency",
    category: DiseaseCategory::Nutritional,
    severity: Severity::Moderate,
    affected_area_percent: 30,
    causes: &[
        "Sandy or heavily leached soils",
        "Low soil potassium",
        "Soil compaction",
    ],
    prevention: &[
        "Soil testing",
        "Balanced fertilization",
        "Reduce compaction",
    ],
    treatment: Treatment {
        medicine: "Muriate of Potash (KCl)",
        dosage: "60-100 kg K2O/ha",
        frequency: "Single or split application",
        instructions: "Incorporate before planting or side-dress early",
    },
};

static HEALTHY: DiseaseRecord = DiseaseRecord {
    key: DiseaseKey::Healthy,
    name: "Healthy Corn Plant",
    category: DiseaseCategory::None,
    severity: Severity::Normal,
    affected_area_percent: 0,
    causes: &[],
    prevention: &[
        "Regular monitoring",
        "Balanced fertilization",
        "Proper irrigation",
    ],
    treatment: Treatment {
        medicine: "No treatment needed",
        dosage: "N/A",
        frequency: "Continue monitoring",
        instructions: "Maintain current practices",
    },
};

static UNKNOWN: DiseaseRecord = DiseaseRecord {
    key: DiseaseKey::Unknown,
    name: "Unidentified Condition",
    category: DiseaseCategory::None,
    severity: Severity::Moderate,
    affected_area_percent: 0,
    causes: &["The image did not match a known maize condition"],
    prevention: &[
        "Retake the photo in daylight with a single leaf in frame",
        "Consult a local agronomist",
    ],
    treatment: Treatment {
        medicine: "Pending expert review",
        dosage: "N/A",
        frequency: "N/A",
        instructions: "Submit a clearer image or request a field inspection",
    },
};
