use gloo_console::error;
use gloo_file::File as GlooFile;
use gloo_net::http::{Request, Response};
use shared::{
    AnalysisReport, AnalysisResponse, ContactDetails, ErrorResponse, HealthResponse, UploadLimits,
    form_fields,
};

pub const ANALYSIS_FAILED: &str = "Failed to analyze image. Please try again.";
pub const REPORT_FAILED: &str = "Failed to generate PDF report";

/// Posts the image and contact details as multipart form data.
pub async fn analyze(
    file: &GlooFile,
    contact: &ContactDetails,
) -> Result<AnalysisResponse, String> {
    let form_data = web_sys::FormData::new().map_err(|e| {
        error!(format!("FormData unavailable: {:?}", e));
        ANALYSIS_FAILED.to_string()
    })?;
    let append_failed = |e| {
        error!(format!("Failed to build form data: {:?}", e));
        ANALYSIS_FAILED.to_string()
    };

    form_data
        .append_with_blob_and_filename(form_fields::IMAGE, file.as_ref(), &file.name())
        .map_err(append_failed)?;
    form_data
        .append_with_str(form_fields::NAME, &contact.name)
        .map_err(append_failed)?;
    form_data
        .append_with_str(form_fields::LOCATION, &contact.location)
        .map_err(append_failed)?;
    form_data
        .append_with_str(form_fields::PHONE, &contact.phone)
        .map_err(append_failed)?;
    form_data
        .append_with_str(form_fields::EMAIL, contact.email.as_deref().unwrap_or_default())
        .map_err(append_failed)?;

    let response = Request::post("/api/analyze")
        .body(form_data)
        .map_err(|e| e.to_string())?
        .send()
        .await
        .map_err(|e| {
            error!(format!("Network error: {}", e));
            ANALYSIS_FAILED.to_string()
        })?;

    if !response.ok() {
        return Err(server_error(response, ANALYSIS_FAILED).await);
    }
    response.json::<AnalysisResponse>().await.map_err(|e| {
        error!(format!("Failed to parse response: {}", e));
        ANALYSIS_FAILED.to_string()
    })
}

/// Requests the PDF for a finished analysis and returns its bytes.
pub async fn download_report(report: &AnalysisReport) -> Result<Vec<u8>, String> {
    let response = Request::post("/api/report")
        .json(report)
        .map_err(|e| e.to_string())?
        .send()
        .await
        .map_err(|e| {
            error!(format!("Network error: {}", e));
            REPORT_FAILED.to_string()
        })?;

    if !response.ok() {
        return Err(server_error(response, REPORT_FAILED).await);
    }
    response.binary().await.map_err(|e| {
        error!(format!("Failed to read report: {}", e));
        REPORT_FAILED.to_string()
    })
}

/// Reads the server's upload limit so the client checks against the same value.
pub async fn fetch_limits() -> Result<UploadLimits, String> {
    let response = Request::get("/api/health")
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if !response.ok() {
        return Err(format!("health check returned {}", response.status()));
    }
    let health = response
        .json::<HealthResponse>()
        .await
        .map_err(|e| e.to_string())?;
    Ok(UploadLimits::new(health.max_upload_bytes))
}

async fn server_error(response: Response, fallback: &str) -> String {
    let status = response.status();
    match response.json::<ErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => {
            error!(format!("Server error: {}", status));
            fallback.to_string()
        }
    }
}
