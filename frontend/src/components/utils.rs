use super::super::Model;
use gloo_file::{Blob, File as GlooFile, ObjectUrl};
use gloo_timers::callback::Timeout;
use shared::{Confidence, Severity, UploadLimits, ValidationError};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys::{FileList, HtmlAnchorElement};
use yew::prelude::*;

// Debounce function to limit button events
pub fn debounce<F>(duration: i32, callback: F) -> Callback<MouseEvent>
where
    F: Fn() + Clone + 'static,
{
    let timeout = Rc::new(RefCell::new(None::<Timeout>));
    let timeout_clone = Rc::clone(&timeout);

    Callback::from(move |_| {
        let mut timeout_ref = timeout_clone.borrow_mut();

        if let Some(old_timeout) = timeout_ref.take() {
            old_timeout.cancel();
        }

        let inner_callback = callback.clone();
        let new_timeout = Timeout::new(duration as u32, move || {
            inner_callback();
        });

        *timeout_ref = Some(new_timeout);
    })
}

/// First image in the list, or the reason none of the files can be used.
pub fn pick_image_file(
    limits: &UploadLimits,
    file_list: &FileList,
) -> Result<GlooFile, ValidationError> {
    let mut files: Vec<web_sys::File> = (0..file_list.length())
        .filter_map(|i| file_list.item(i))
        .collect();
    let types: Vec<String> = files.iter().map(|file| file.type_()).collect();
    let index = limits.select_image(types.iter().map(String::as_str))?;
    Ok(GlooFile::from(files.swap_remove(index)))
}

pub fn render_error_message(model: &Model) -> Html {
    if let Some(error_msg) = &model.error {
        html! {
            <div class="error-message">
                <i class="fa-solid fa-circle-exclamation"></i>
                <p>{ error_msg }</p>
            </div>
        }
    } else {
        html! {}
    }
}

pub fn status_class(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "status-critical",
        Severity::Moderate => "status-moderate",
        Severity::Normal => "status-normal",
    }
}

pub fn status_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "Critical",
        Severity::Moderate => "Needs attention",
        Severity::Normal => "Healthy",
    }
}

pub fn meter_style(confidence: Confidence) -> String {
    format!("width: {}%", confidence.value())
}

/// Saves `bytes` as a PDF through a temporary anchor. The returned URL must
/// outlive the click.
pub fn trigger_download(file_name: &str, bytes: &[u8]) -> Result<ObjectUrl, String> {
    let blob = Blob::new_with_options(bytes, Some("application/pdf"));
    let url = ObjectUrl::from(blob);

    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or("document unavailable")?;
    let anchor = document
        .create_element("a")
        .map_err(|e| format!("{:?}", e))?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(|_| "not an anchor element".to_string())?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.click();

    Ok(url)
}
