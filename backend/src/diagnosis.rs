use shared::{
    AnalysisReport, Classification, Confidence, ContactDetails, DiseaseKey, ReportId, Resolver,
    UploadLimits,
};
use uuid::Uuid;

use crate::classifier::payload::image_digest;
use crate::classifier::{ClassifierAdapter, ClassifierError};

/// Result of one successful diagnosis request.
#[derive(Debug, Clone)]
pub struct Diagnosis {
    pub report: AnalysisReport,
    pub classification: Classification,
}

/// Classifier, resolver and upload limits shared by every request.
pub struct DiagnosisService {
    classifier: ClassifierAdapter,
    resolver: Resolver,
    limits: UploadLimits,
}

impl DiagnosisService {
    pub fn new(classifier: ClassifierAdapter, resolver: Resolver, limits: UploadLimits) -> Self {
        Self {
            classifier,
            resolver,
            limits,
        }
    }

    pub fn limits(&self) -> UploadLimits {
        self.limits
    }

    pub fn classifier(&self) -> &ClassifierAdapter {
        &self.classifier
    }

    pub fn dispose(&mut self) {
        self.classifier.dispose();
    }

    /// Classifies the image and assembles the report. Input validation is
    /// the caller's job.
    pub async fn diagnose(
        &self,
        image: &[u8],
        contact: ContactDetails,
    ) -> Result<Diagnosis, ClassifierError> {
        let request_id = Uuid::new_v4();
        let digest = image_digest(image);
        log::info!(
            "[{}] Diagnosing image sha256={} ({} bytes)",
            request_id,
            &digest[..12],
            image.len()
        );

        let classification = self.classifier.classify(image).await.map_err(|e| {
            log::error!("[{}] Classification failed: {}", request_id, e);
            e
        })?;
        let (disease, confidence) = self.resolve_top(&classification);
        log::info!(
            "[{}] Top label '{}' resolved to {} at {}",
            request_id,
            classification.top().label,
            disease.as_ref(),
            confidence
        );

        let now_ms = chrono::Utc::now().timestamp_millis().max(0) as u64;
        let report = AnalysisReport {
            id: ReportId::new(now_ms, rand::random::<u64>()),
            disease,
            confidence,
            top_label: classification.top().label.clone(),
            contact: contact.normalized(),
            generated_at_ms: now_ms,
            image_digest: digest,
        };

        Ok(Diagnosis {
            report,
            classification,
        })
    }

    pub fn resolve_top(&self, classification: &Classification) -> (DiseaseKey, Confidence) {
        let top = classification.top();
        (
            self.resolver.resolve(&top.label),
            Confidence::from_score(top.score),
        )
    }
}
