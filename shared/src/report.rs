use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::catalog::{DiseaseKey, DiseaseRecord, Severity};

/// Model confidence as an integer percentage in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[serde(try_from = "u8", into = "u8")]
#[display(fmt = "{}%", _0)]
pub struct Confidence(u8);

impl Confidence {
    /// `round(score * 100)`, with the score clamped to `[0, 1]` and
    /// non-finite scores treated as zero.
    pub fn from_score(score: f32) -> Self {
        let clamped = if score.is_finite() {
            score.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self((clamped * 100.0).round() as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Confidence {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value > 100 {
            return Err(format!("confidence {} is outside 0..=100", value));
        }
        Ok(Self(value))
    }
}

impl From<Confidence> for u8 {
    fn from(confidence: Confidence) -> Self {
        confidence.0
    }
}

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 6;

/// Report identifier of the form `XR-<timestamp base36>-<6 base36 chars>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(try_from = "String", into = "String")]
pub struct ReportId(String);

impl ReportId {
    pub fn new(timestamp_ms: u64, entropy: u64) -> Self {
        let mut suffix = to_base36(entropy % 36u64.pow(SUFFIX_LEN as u32));
        while suffix.len() < SUFFIX_LEN {
            suffix.insert(0, '0');
        }
        Self(format!("XR-{}-{}", to_base36(timestamp_ms), suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn file_name(&self) -> String {
        format!("XpeditionR-Report-{}.pdf", self.0)
    }

    fn is_well_formed(candidate: &str) -> bool {
        let is_base36 = |s: &str| !s.is_empty() && s.bytes().all(|b| BASE36.contains(&b));
        match candidate.strip_prefix("XR-").and_then(|rest| rest.split_once('-')) {
            Some((timestamp, suffix)) => {
                is_base36(timestamp) && suffix.len() == SUFFIX_LEN && is_base36(suffix)
            }
            None => false,
        }
    }
}

impl TryFrom<String> for ReportId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if Self::is_well_formed(&value) {
            Ok(Self(value))
        } else {
            Err(format!("malformed report id: {:?}", value))
        }
    }
}

impl From<ReportId> for String {
    fn from(id: ReportId) -> Self {
        id.0
    }
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub name: String,
    pub location: String,
    pub phone: String,
    pub email: Option<String>,
}

impl ContactDetails {
    /// Trims every field and drops a blank email.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            location: self.location.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email: self
                .email
                .map(|email| email.trim().to_string())
                .filter(|email| !email.is_empty()),
        }
    }
}

/// One diagnosis: the resolved catalog key plus everything needed to render
/// and export it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub id: ReportId,
    pub disease: DiseaseKey,
    pub confidence: Confidence,
    pub top_label: String,
    pub contact: ContactDetails,
    pub generated_at_ms: u64,
    pub image_digest: String,
}

impl AnalysisReport {
    pub fn record(&self) -> &'static DiseaseRecord {
        self.disease.record()
    }

    pub fn severity(&self) -> Severity {
        self.record().severity
    }

    pub fn affected_area_percent(&self) -> u8 {
        self.record().affected_area_percent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_confidence_rounding_and_clamping() {
        assert_eq!(Confidence::from_score(0.82).value(), 82);
        assert_eq!(Confidence::from_score(0.826).value(), 83);
        assert_eq!(Confidence::from_score(0.0).value(), 0);
        assert_eq!(Confidence::from_score(1.0).value(), 100);
        assert_eq!(Confidence::from_score(1.7).value(), 100);
        assert_eq!(Confidence::from_score(-0.2).value(), 0);
        assert_eq!(Confidence::from_score(f32::NAN).value(), 0);
        assert_eq!(Confidence::from_score(0.5).to_string(), "50%");
    }

    #[test]
    fn test_confidence_rejects_out_of_range_on_the_wire() {
        assert!(serde_json::from_str::<Confidence>("100").is_ok());
        assert!(serde_json::from_str::<Confidence>("101").is_err());
    }

    #[test]
    fn test_report_id_format() {
        let id = ReportId::new(1_700_000_000_000, 0);
        assert_eq!(id.as_str(), "XR-loyw3v28-000000");
        assert_eq!(id.file_name(), "XpeditionR-Report-XR-loyw3v28-000000.pdf");

        let id = ReportId::new(35, u64::MAX);
        let suffix = id.as_str().rsplit('-').next().unwrap_or_default();
        assert!(id.as_str().starts_with("XR-z-"));
        assert_eq!(suffix.len(), 6);
    }

    #[test]
    fn test_report_id_validation() {
        assert!(serde_json::from_str::<ReportId>("\"XR-loyw3v28-a1b2c3\"").is_ok());
        assert!(serde_json::from_str::<ReportId>("\"XR-loyw3v28-a1b2\"").is_err());
        assert!(serde_json::from_str::<ReportId>("\"AB-loyw3v28-a1b2c3\"").is_err());
        assert!(serde_json::from_str::<ReportId>("\"XR-LOYW-a1b2c3\"").is_err());
    }

    #[test]
    fn test_contact_normalization() {
        let contact = ContactDetails {
            name: "  Amina ".into(),
            location: "Kisumu".into(),
            phone: " +254 700 000000".into(),
            email: Some("   ".into()),
        }
        .normalized();

        assert_eq!(contact.name, "Amina");
        assert_eq!(contact.phone, "+254 700 000000");
        assert_eq!(contact.email, None);
    }

    #[test]
    fn test_blight_scenario_report_fields() {
        use crate::resolver::Resolver;

        let disease = Resolver::default().resolve("Northern_Corn_Leaf_Blight");
        let report = AnalysisReport {
            id: ReportId::new(1, 2),
            disease,
            confidence: Confidence::from_score(0.82),
            top_label: "Northern_Corn_Leaf_Blight".into(),
            contact: ContactDetails::default(),
            generated_at_ms: 1,
            image_digest: String::new(),
        };

        assert_eq!(report.disease, DiseaseKey::NorthernLeafBlight);
        assert_eq!(report.confidence.value(), 82);
        assert_eq!(report.severity(), Severity::Critical);
        assert_eq!(report.severity().to_string(), "critical");
    }

    proptest! {
        #[test]
        fn prop_confidence_matches_rounded_score(score in 0.0f32..=1.0f32) {
            let confidence = Confidence::from_score(score).value();
            prop_assert!(confidence <= 100);
            prop_assert_eq!(confidence, (score * 100.0).round() as u8);
        }

        #[test]
        fn prop_generated_ids_round_trip_validation(ts in any::<u64>(), entropy in any::<u64>()) {
            let id = ReportId::new(ts, entropy);
            prop_assert!(ReportId::try_from(id.as_str().to_string()).is_ok());
        }
    }
}
