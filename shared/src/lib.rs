pub mod catalog;
pub mod classification;
pub mod report;
pub mod resolver;
pub mod validation;

pub use catalog::{DiseaseCategory, DiseaseKey, DiseaseRecord, Severity, Treatment};
pub use classification::{Classification, Prediction};
pub use report::{AnalysisReport, Confidence, ContactDetails, ReportId};
pub use resolver::{FallbackPolicy, Resolver};
pub use validation::{ContactField, UploadLimits, ValidationError};

use serde::{Deserialize, Serialize};

/// Multipart field names used by `POST /api/analyze`.
pub mod form_fields {
    pub const IMAGE: &str = "image";
    pub const NAME: &str = "name";
    pub const LOCATION: &str = "location";
    pub const PHONE: &str = "phone";
    pub const EMAIL: &str = "email";
}

#[derive(Serialize, Deserialize, Clone)]
pub struct InferenceRequest {
    /// Either a `data:image/...;base64,` URL or bare base64.
    pub image_data: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ClassifyResponse {
    pub predictions: Vec<Prediction>,
    pub disease: DiseaseKey,
    pub confidence: Confidence,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AnalysisResponse {
    pub report: AnalysisReport,
    pub predictions: Vec<Prediction>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

/// `GET /api/health`. The browser reads its upload limit from here.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub model_initialized: bool,
    pub max_upload_bytes: usize,
}
