use super::super::{Model, Msg, SelectedImage};
use super::utils::{pick_image_file, trigger_download};
use crate::api;
use gloo_file::{File as GlooFile, ObjectUrl};
use wasm_bindgen_futures::spawn_local;
use web_sys::{ClipboardEvent, DragEvent};
use shared::{AnalysisResponse, ValidationError};
use yew::prelude::*;

pub fn handle_image_selected(model: &mut Model, file: GlooFile) -> bool {
    if let Err(e) = model
        .limits
        .check(&file.raw_mime_type(), file.size() as usize)
    {
        log::warn!("Rejected {}: {}", file.name(), e);
        model.error = Some(e.to_string());
        return true;
    }

    let preview_url = ObjectUrl::from(file.clone());
    model.image = Some(SelectedImage { file, preview_url });
    model.analysis = None;
    model.error = None;
    true
}

pub fn handle_clear_image(model: &mut Model) -> bool {
    model.image = None;
    model.analysis = None;
    model.error = None;
    true
}

pub fn handle_drop(model: &mut Model, ctx: &Context<Model>, event: DragEvent) -> bool {
    event.prevent_default();
    model.is_dragging = false;

    if let Some(file_list) = event.data_transfer().and_then(|dt| dt.files()) {
        match pick_image_file(&model.limits, &file_list) {
            Ok(file) => ctx.link().send_message(Msg::ImageSelected(file)),
            Err(ValidationError::MissingImage) => {}
            Err(e) => model.error = Some(e.to_string()),
        }
    }

    true
}

/// Plain-text pastes carry no files and fall through to the focused input.
pub fn handle_paste(model: &Model, ctx: &Context<Model>, event: ClipboardEvent) -> bool {
    if let Some(file_list) = event.clipboard_data().and_then(|dt| dt.files()) {
        match pick_image_file(&model.limits, &file_list) {
            Ok(file) => {
                event.prevent_default();
                ctx.link().send_message(Msg::ImageSelected(file));
            }
            Err(ValidationError::MissingImage) => {}
            Err(e) => ctx.link().send_message(Msg::SetError(Some(e.to_string()))),
        }
    }
    false
}

pub fn handle_submit(model: &mut Model, ctx: &Context<Model>) -> bool {
    if model.loading {
        return false;
    }

    let Some(image) = model.image.as_ref() else {
        model.error = Some(ValidationError::MissingImage.to_string());
        return true;
    };
    if let Err(e) = model.contact.validate() {
        model.error = Some(e.to_string());
        return true;
    }

    model.loading = true;
    model.error = None;
    model.analysis = None;

    let file = image.file.clone();
    let contact = model.contact.clone();
    let link = ctx.link().clone();
    spawn_local(async move {
        match api::analyze(&file, &contact).await {
            Ok(response) => link.send_message(Msg::AnalysisReady(response)),
            Err(e) => link.send_message(Msg::AnalysisFailed(e)),
        }
    });

    true
}

pub fn handle_analysis_ready(model: &mut Model, response: AnalysisResponse) -> bool {
    log::info!(
        "Report {}: {} at {}",
        response.report.id,
        response.report.record().name,
        response.report.confidence
    );
    model.loading = false;
    model.analysis = Some(response);
    true
}

/// Keeps the selected image so the user can resubmit.
pub fn handle_analysis_failed(model: &mut Model, error: String) -> bool {
    model.loading = false;
    model.analysis = None;
    model.error = Some(error);
    true
}

pub fn handle_download_report(model: &mut Model, ctx: &Context<Model>) -> bool {
    let Some(analysis) = model.analysis.as_ref() else {
        return false;
    };
    if model.generating_report {
        return false;
    }

    model.generating_report = true;
    model.error = None;

    let report = analysis.report.clone();
    let link = ctx.link().clone();
    spawn_local(async move {
        match api::download_report(&report).await {
            Ok(bytes) => link.send_message(Msg::ReportReady(report.id.file_name(), bytes)),
            Err(e) => link.send_message(Msg::ReportFailed(e)),
        }
    });

    true
}

pub fn handle_report_ready(model: &mut Model, file_name: &str, bytes: Vec<u8>) -> bool {
    model.generating_report = false;
    match trigger_download(file_name, &bytes) {
        Ok(url) => model.report_url = Some(url),
        Err(e) => {
            log::error!("Download failed: {}", e);
            model.error = Some(api::REPORT_FAILED.to_string());
        }
    }
    true
}
