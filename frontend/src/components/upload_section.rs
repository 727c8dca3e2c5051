use super::super::Model;
use super::super::Msg;
use super::utils::{debounce, pick_image_file};
use shared::ValidationError;
use shared::validation::format_megabytes;
use wasm_bindgen::JsCast;
use web_sys::{DragEvent, HtmlInputElement};
use yew::prelude::*;

pub fn render_upload_section(model: &Model, ctx: &Context<Model>) -> Html {
    html! {
        <div class="upload-section">
            { render_file_input_area(model, ctx) }
            { render_preview(model, ctx) }
        </div>
    }
}

fn render_file_input_area(model: &Model, ctx: &Context<Model>) -> Html {
    let link = ctx.link();
    let limits = model.limits;
    let handle_change = link.batch_callback(move |e: Event| {
        let input: HtmlInputElement = e.target_unchecked_into();
        let picked = input.files().map(|files| pick_image_file(&limits, &files));
        input.set_value("");
        match picked? {
            Ok(file) => Some(Msg::ImageSelected(file)),
            Err(ValidationError::MissingImage) => None,
            Err(e) => Some(Msg::SetError(Some(e.to_string()))),
        }
    });

    let handle_drag_over = link.callback(|e: DragEvent| {
        e.prevent_default();
        Msg::SetDragging(true)
    });

    let handle_drag_leave = link.callback(|e: DragEvent| {
        e.prevent_default();
        Msg::SetDragging(false)
    });

    let handle_drop = link.callback(Msg::HandleDrop);
    let trigger_file_input = Callback::from(|_| {
        if let Some(input) = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id("file-input"))
        {
            if let Ok(html_input) = input.dyn_into::<web_sys::HtmlElement>() {
                html_input.click();
            }
        }
    });

    html! {
        <>
            <input
                type="file"
                id="file-input"
                accept="image/*"
                style="display: none;"
                onchange={handle_change}
            />

            <div
                id="drop-zone"
                class={classes!("upload-area", model.is_dragging.then_some("drag-over"))}
                ondragover={handle_drag_over}
                ondragleave={handle_drag_leave}
                ondrop={handle_drop}
                onclick={debounce(300, {
                    let trigger_file_input = trigger_file_input.clone();
                    move || trigger_file_input.emit(())
                })}
            >
                <div class="upload-placeholder">
                    <i class="fa-solid fa-cloud-arrow-up"></i>
                    <p>{"Drag & drop a leaf photo here, paste, or click to browse"}</p>
                    <p class="file-types">
                        { format!("JPG, PNG or WEBP up to {}", format_megabytes(model.limits.max_bytes)) }
                    </p>
                </div>
            </div>
        </>
    }
}

fn render_preview(model: &Model, ctx: &Context<Model>) -> Html {
    let Some(image) = &model.image else {
        return html! {};
    };

    html! {
        <div id="preview-container">
            <img
                id="actual-image-preview"
                src={image.preview_url.to_string()}
                alt={image.file.name()}
            />
            <div class="preview-meta">
                <span>{ image.file.name() }</span>
                <span>{ format_megabytes(image.file.size() as usize) }</span>
                <button
                    class="remove-btn"
                    title="Remove this image"
                    disabled={model.loading}
                    onclick={ctx.link().callback(|_| Msg::ClearImage)}
                >
                    <i class="fa-solid fa-times"></i>
                </button>
            </div>
        </div>
    }
}
