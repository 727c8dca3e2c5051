use actix_files::Files;
use actix_multipart::{Field, Multipart};
use actix_web::http::StatusCode;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, ResponseError, web};
use futures::TryStreamExt;
use shared::{
    AnalysisReport, AnalysisResponse, ClassifyResponse, ContactDetails, ContactField,
    ErrorResponse, HealthResponse, InferenceRequest, UploadLimits, ValidationError, form_fields,
};

use crate::classifier::ClassifierError;
use crate::classifier::payload::{PayloadError, decode_data_url, sniff_image_format};
use crate::diagnosis::DiagnosisService;
use crate::report::{self, ReportError};

const MAX_TEXT_FIELD_BYTES: usize = 1024;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Payload(#[from] PayloadError),
    #[error("Invalid form data: {0}")]
    Multipart(String),
    #[error("Failed to analyze image. Please try again.")]
    Classifier(#[from] ClassifierError),
    #[error("Failed to generate PDF report")]
    Report(#[from] ReportError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(ValidationError::FileTooLarge { .. }) => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            ApiError::Validation(_) | ApiError::Payload(_) | ApiError::Multipart(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Classifier(_) => StatusCode::BAD_GATEWAY,
            ApiError::Report(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            // Already logged with the request id by the diagnosis service.
            ApiError::Classifier(e) => log::debug!("Classifier error: {}", e),
            ApiError::Report(e) => log::error!("Report error: {}", e),
            other => log::warn!("Rejected request: {}", other),
        }
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}

pub fn configure_routes(
    cfg: &mut web::ServiceConfig,
    limits: UploadLimits,
    frontend_dir: Option<String>,
) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(json_body_limit(limits))
            .error_handler(|err, _req| {
                let response = HttpResponse::BadRequest().json(ErrorResponse {
                    error: err.to_string(),
                });
                actix_web::error::InternalError::from_response(err, response).into()
            }),
    )
    .service(web::resource("/api/analyze").route(web::post().to(analyze)))
    .service(web::resource("/api/classify").route(web::post().to(classify)))
    .service(web::resource("/api/report").route(web::post().to(download_report)))
    .service(web::resource("/api/health").route(web::get().to(health)));

    if let Some(dir) = frontend_dir {
        cfg.service(Files::new("/", dir).index_file("index.html"));
    }
}

/// Base64 inflates by 4/3; leave headroom for the JSON envelope.
fn json_body_limit(limits: UploadLimits) -> usize {
    (limits.max_bytes / 3)
        .saturating_add(1)
        .saturating_mul(4)
        .saturating_add(4096)
}

async fn analyze(
    service: web::Data<DiagnosisService>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let limits = service.limits();
    let mut image: Option<(String, Vec<u8>)> = None;
    let mut contact = ContactDetails::default();

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| ApiError::Multipart(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == form_fields::IMAGE {
            let mime = field
                .content_type()
                .map(|mime| mime.to_string())
                .unwrap_or_default();
            limits.check_type(&mime)?;
            let bytes = read_field(&mut field, limits.max_bytes, |size| {
                ApiError::Validation(ValidationError::FileTooLarge {
                    size,
                    max: limits.max_bytes,
                })
            })
            .await?;
            if !bytes.is_empty() {
                image = Some((mime, bytes));
            }
        } else if let Some(contact_field) = ContactField::from_form_name(&name) {
            let bytes = read_field(&mut field, MAX_TEXT_FIELD_BYTES, |_| {
                ApiError::Multipart(format!("field '{}' is too long", name))
            })
            .await?;
            let value = String::from_utf8(bytes)
                .map_err(|_| ApiError::Multipart(format!("field '{}' is not UTF-8", name)))?;
            contact.set_field(contact_field, value);
        } else {
            log::debug!("Ignoring unknown form field '{}'", name);
            read_field(&mut field, MAX_TEXT_FIELD_BYTES, |_| {
                ApiError::Multipart(format!("field '{}' is too long", name))
            })
            .await?;
        }
    }

    let (mime, image) = image.ok_or(ValidationError::MissingImage)?;
    contact.validate()?;
    if sniff_image_format(&image).is_none() {
        return Err(ValidationError::UnsupportedType(mime).into());
    }

    let diagnosis = service.diagnose(&image, contact).await?;
    Ok(HttpResponse::Ok().json(AnalysisResponse {
        report: diagnosis.report,
        predictions: diagnosis.classification.into_predictions(),
    }))
}

/// Collects a field, failing as soon as it grows past `max` bytes.
async fn read_field<F>(field: &mut Field, max: usize, on_overflow: F) -> Result<Vec<u8>, ApiError>
where
    F: Fn(usize) -> ApiError,
{
    let mut data = Vec::new();
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|e| ApiError::Multipart(e.to_string()))?
    {
        if data.len() + chunk.len() > max {
            return Err(on_overflow(data.len() + chunk.len()));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

async fn classify(
    service: web::Data<DiagnosisService>,
    body: web::Json<InferenceRequest>,
) -> Result<HttpResponse, ApiError> {
    let limits = service.limits();
    let decoded = decode_data_url(&body.image_data)?;
    if let Some(mime) = &decoded.mime_type {
        limits.check_type(mime)?;
    }
    limits.check_size(decoded.bytes.len())?;
    if sniff_image_format(&decoded.bytes).is_none() {
        return Err(ValidationError::UnsupportedType(decoded.mime_type.unwrap_or_default()).into());
    }

    let classification = service.classifier().classify(&decoded.bytes).await?;
    let (disease, confidence) = service.resolve_top(&classification);
    Ok(HttpResponse::Ok().json(ClassifyResponse {
        predictions: classification.into_predictions(),
        disease,
        confidence,
    }))
}

async fn download_report(body: web::Json<AnalysisReport>) -> Result<HttpResponse, ApiError> {
    let report = body.into_inner();
    let pdf = report::assemble(&report)?;

    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(report.id.file_name())],
        })
        .body(pdf))
}

async fn health(service: web::Data<DiagnosisService>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        model_initialized: service.classifier().is_initialized(),
        max_upload_bytes: service.limits().max_bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassifierAdapter;
    use crate::classifier::testing::{Counters, Script, ScriptedLoader};
    use actix_web::http::header;
    use actix_web::{App, test};
    use shared::{DiseaseKey, Prediction, Resolver, Severity};

    const BOUNDARY: &str = "----xpeditionr-boundary";
    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01";

    fn service(script: Script) -> (web::Data<DiagnosisService>, Counters) {
        let (loader, counters) = ScriptedLoader::new(script);
        let service = DiagnosisService::new(
            ClassifierAdapter::new(loader),
            Resolver::default(),
            UploadLimits::default(),
        );
        (web::Data::new(service), counters)
    }

    fn blight() -> Script {
        Script::Predict(vec![
            Prediction::new("Healthy", 0.1),
            Prediction::new("Northern_Corn_Leaf_Blight", 0.82),
        ])
    }

    fn multipart_body(image: Option<(&str, &[u8])>, fields: &[(&str, &str)]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                    BOUNDARY, name, value
                )
                .as_bytes(),
            );
        }
        if let Some((mime, bytes)) = image {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"leaf\"\r\nContent-Type: {}\r\n\r\n",
                    BOUNDARY, mime
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn contact_fields() -> Vec<(&'static str, &'static str)> {
        vec![
            ("name", "Amina"),
            ("location", "Kisumu"),
            ("phone", "0700000000"),
            ("email", ""),
        ]
    }

    fn analyze_request(body: Vec<u8>) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/api/analyze")
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            ))
            .set_payload(body)
    }

    macro_rules! app {
        ($service:expr) => {
            test::init_service(
                App::new()
                    .app_data($service.clone())
                    .configure(|cfg| configure_routes(cfg, UploadLimits::default(), None)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_analyze_blight_at_82_percent() {
        let (service, counters) = service(blight());
        let app = app!(service);

        let body = multipart_body(Some(("image/png", PNG)), &contact_fields());
        let resp = test::call_service(&app, analyze_request(body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let analysis: AnalysisResponse = test::read_body_json(resp).await;
        assert_eq!(analysis.report.disease, DiseaseKey::NorthernLeafBlight);
        assert_eq!(analysis.report.confidence.value(), 82);
        assert_eq!(analysis.report.severity(), Severity::Critical);
        assert_eq!(analysis.report.contact.email, None);
        assert_eq!(analysis.predictions[0].label, "Northern_Corn_Leaf_Blight");
        assert_eq!(counters.predictions(), 1);
    }

    #[actix_web::test]
    async fn test_oversized_upload_never_reaches_classifier() {
        let (service, counters) = service(blight());
        let app = app!(service);

        let mut image = PNG.to_vec();
        image.resize(15 * 1024 * 1024, 0);
        let body = multipart_body(Some(("image/jpeg", image.as_slice())), &contact_fields());
        let resp = test::call_service(&app, analyze_request(body).to_request()).await;

        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let error: ErrorResponse = test::read_body_json(resp).await;
        assert!(error.error.starts_with("Image is too large"));
        assert_eq!(counters.loads(), 0);
        assert_eq!(counters.predictions(), 0);
    }

    #[actix_web::test]
    async fn test_invalid_input_is_rejected_before_classification() {
        let (service, counters) = service(blight());
        let app = app!(service);

        let missing_phone: Vec<_> = contact_fields()
            .into_iter()
            .filter(|(name, _)| *name != "phone")
            .collect();
        let resp = test::call_service(
            &app,
            analyze_request(multipart_body(Some(("image/png", PNG)), &missing_phone)).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let error: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(error.error, "Phone number is required.");

        let resp = test::call_service(
            &app,
            analyze_request(multipart_body(Some(("text/plain", &b"hello"[..])), &contact_fields())).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = test::call_service(
            &app,
            analyze_request(multipart_body(Some(("image/png", &b"not a png"[..])), &contact_fields())).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = test::call_service(
            &app,
            analyze_request(multipart_body(None, &contact_fields())).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let error: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(error.error, "Please upload an image of your crop.");

        assert_eq!(counters.loads(), 0);
    }

    #[actix_web::test]
    async fn test_classifier_failure_then_resubmit() {
        let (service, counters) = service(Script::FailLoadOnce(vec![Prediction::new(
            "Common_Rust",
            0.91,
        )]));
        let app = app!(service);

        let body = multipart_body(Some(("image/png", PNG)), &contact_fields());
        let resp = test::call_service(&app, analyze_request(body.clone()).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let error: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(error.error, "Failed to analyze image. Please try again.");

        let resp = test::call_service(&app, analyze_request(body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let analysis: AnalysisResponse = test::read_body_json(resp).await;
        assert_eq!(analysis.report.disease, DiseaseKey::CommonRust);
        assert_eq!(counters.loads(), 2);
    }

    #[actix_web::test]
    async fn test_prediction_failure_returns_no_report() {
        let (service, _) = service(Script::FailPredict);
        let app = app!(service);

        let body = multipart_body(Some(("image/png", PNG)), &contact_fields());
        let resp = test::call_service(&app, analyze_request(body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let error: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(error.error, "Failed to analyze image. Please try again.");
    }

    #[actix_web::test]
    async fn test_classify_data_url() {
        use base64::Engine;

        let (service, _) = service(Script::Predict(vec![Prediction::new("Common_Rust", 0.9)]));
        let app = app!(service);

        let image_data = format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(PNG)
        );
        let req = test::TestRequest::post()
            .uri("/api/classify")
            .set_json(InferenceRequest { image_data })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let classified: ClassifyResponse = test::read_body_json(resp).await;
        assert_eq!(classified.disease, DiseaseKey::CommonRust);
        assert_eq!(classified.confidence.value(), 90);
    }

    #[actix_web::test]
    async fn test_report_download() {
        let (service, _) = service(blight());
        let app = app!(service);

        let body = multipart_body(Some(("image/png", PNG)), &contact_fields());
        let resp = test::call_service(&app, analyze_request(body).to_request()).await;
        let analysis: AnalysisResponse = test::read_body_json(resp).await;

        let req = test::TestRequest::post()
            .uri("/api/report")
            .set_json(&analysis.report)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let disposition = resp
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(disposition.starts_with("attachment"));
        assert!(disposition.contains(&analysis.report.id.file_name()));

        let pdf = test::read_body(resp).await;
        assert!(pdf.starts_with(b"%PDF"));
    }

    #[actix_web::test]
    async fn test_health_reports_model_state() {
        let (service, _) = service(blight());
        let app = app!(service);

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: HealthResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.status, "ok");
        assert!(!body.model_initialized);
        assert_eq!(body.max_upload_bytes, UploadLimits::default().max_bytes);
    }

    #[actix_web::test]
    async fn test_report_rejects_malformed_id() {
        let (service, _) = service(blight());
        let app = app!(service);

        let body = multipart_body(Some(("image/png", PNG)), &contact_fields());
        let resp = test::call_service(&app, analyze_request(body).to_request()).await;
        let analysis: AnalysisResponse = test::read_body_json(resp).await;

        let mut report = serde_json::to_value(&analysis.report).expect("serializes");
        report["id"] = serde_json::Value::from("XR-not-an-id");
        let req = test::TestRequest::post()
            .uri("/api/report")
            .set_json(&report)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let error: ErrorResponse = test::read_body_json(resp).await;
        assert!(!error.error.is_empty());
    }

    #[actix_web::test]
    async fn test_report_failure_is_a_generic_500() {
        let err = ApiError::from(ReportError::GenerationFailed("font table missing".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = actix_web::body::to_bytes(resp.into_body())
            .await
            .expect("body");
        let error: ErrorResponse = serde_json::from_slice(&body).expect("json");
        assert_eq!(error.error, "Failed to generate PDF report");
    }

    #[::core::prelude::v1::test]
    fn test_json_body_limit_saturates() {
        let default = json_body_limit(UploadLimits::default());
        assert!(default > UploadLimits::default().max_bytes / 3 * 4);
        assert_eq!(json_body_limit(UploadLimits::new(usize::MAX)), usize::MAX);
    }
}
