mod api;
mod components;

use components::contact_form::render_contact_form;
use components::handlers;
use components::header::render_header;
use components::results::render_results;
use components::upload_section::render_upload_section;
use components::utils::render_error_message;
use gloo_events::EventListener;
use gloo_file::{File as GlooFile, ObjectUrl};
use shared::{AnalysisResponse, ContactDetails, ContactField, UploadLimits};
use wasm_bindgen::JsCast;
use web_sys::{ClipboardEvent, DragEvent};
use yew::prelude::*;

#[derive(Clone)]
pub struct SelectedImage {
    pub file: GlooFile,
    pub preview_url: ObjectUrl,
}

pub enum Msg {
    // Image selection
    ImageSelected(GlooFile),
    ClearImage,
    HandleDrop(DragEvent),
    HandlePaste(ClipboardEvent),
    SetDragging(bool),

    // Contact form
    UpdateContact(ContactField, String),

    // Analysis
    Submit,
    AnalysisReady(AnalysisResponse),
    AnalysisFailed(String),

    // Report export
    DownloadReport,
    ReportReady(String, Vec<u8>),
    ReportFailed(String),

    LimitsLoaded(UploadLimits),
    SetError(Option<String>),
}

pub struct Model {
    pub image: Option<SelectedImage>,
    pub contact: ContactDetails,
    pub analysis: Option<AnalysisResponse>,
    pub loading: bool,
    pub generating_report: bool,
    pub error: Option<String>,
    pub is_dragging: bool,
    pub limits: UploadLimits,
    pub report_url: Option<ObjectUrl>,
    paste_listener: Option<EventListener>,
}

impl Component for Model {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let mut model = Self {
            image: None,
            contact: ContactDetails::default(),
            analysis: None,
            loading: false,
            generating_report: false,
            error: None,
            is_dragging: false,
            limits: UploadLimits::default(),
            report_url: None,
            paste_listener: None,
        };

        let link = ctx.link().clone();
        if let Some(window) = web_sys::window() {
            let listener = EventListener::new(&window, "paste", move |event| {
                if let Some(clipboard_event) = event.dyn_ref::<ClipboardEvent>() {
                    link.send_message(Msg::HandlePaste(clipboard_event.clone()));
                }
            });
            model.paste_listener = Some(listener);
        }

        // Defaults stay in force if the server cannot be reached.
        let link = ctx.link().clone();
        wasm_bindgen_futures::spawn_local(async move {
            match api::fetch_limits().await {
                Ok(limits) => link.send_message(Msg::LimitsLoaded(limits)),
                Err(e) => log::warn!("Using default upload limits: {}", e),
            }
        });

        model
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::ImageSelected(file) => handlers::handle_image_selected(self, file),
            Msg::ClearImage => handlers::handle_clear_image(self),
            Msg::HandleDrop(event) => handlers::handle_drop(self, ctx, event),
            Msg::HandlePaste(event) => handlers::handle_paste(self, ctx, event),
            Msg::SetDragging(is_dragging) => {
                self.is_dragging = is_dragging;
                true
            }

            Msg::UpdateContact(field, value) => {
                self.contact.set_field(field, value);
                true
            }

            Msg::Submit => handlers::handle_submit(self, ctx),
            Msg::AnalysisReady(response) => handlers::handle_analysis_ready(self, response),
            Msg::AnalysisFailed(error) => handlers::handle_analysis_failed(self, error),

            Msg::DownloadReport => handlers::handle_download_report(self, ctx),
            Msg::ReportReady(file_name, bytes) => {
                handlers::handle_report_ready(self, &file_name, bytes)
            }
            Msg::ReportFailed(error) => {
                self.generating_report = false;
                self.error = Some(error);
                true
            }

            Msg::LimitsLoaded(limits) => {
                log::info!("Upload limit {} bytes", limits.max_bytes);
                self.limits = limits;
                true
            }
            Msg::SetError(error) => {
                self.error = error;
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="container">
                { render_header() }

                <main class="main-content">
                    { render_upload_section(self, ctx) }
                    { render_contact_form(self, ctx) }
                    { render_error_message(self) }
                    { render_results(self, ctx) }
                </main>

                <footer class="app-footer">
                    <p>{"XpeditionR | Maize leaf disease diagnosis"}</p>
                </footer>
            </div>
        }
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("App starting...");
    yew::Renderer::<Model>::new().render();
}
