use super::super::{Model, Msg};
use super::utils::debounce;
use shared::ContactField;
use web_sys::HtmlInputElement;
use yew::prelude::*;

const FIELDS: [(ContactField, &str, &str); 4] = [
    (ContactField::Name, "text", "Jane Wanjiru"),
    (ContactField::Location, "text", "Village, county"),
    (ContactField::Phone, "tel", "0712 345 678"),
    (ContactField::Email, "email", "you@example.com"),
];

pub fn render_contact_form(model: &Model, ctx: &Context<Model>) -> Html {
    let link = ctx.link().clone();
    let onsubmit = ctx.link().callback(|e: SubmitEvent| {
        e.prevent_default();
        Msg::Submit
    });

    html! {
        <form class="contact-form" {onsubmit}>
            <h2>{"Your details"}</h2>
            { for FIELDS.into_iter().map(|(field, kind, placeholder)| render_field(model, ctx, field, kind, placeholder)) }
            <button
                type="button"
                class="analyze-btn"
                disabled={model.loading || model.image.is_none()}
                onclick={debounce(300, move || link.send_message(Msg::Submit))}
            >
                { render_submit_content(model) }
            </button>
        </form>
    }
}

fn render_field(
    model: &Model,
    ctx: &Context<Model>,
    field: ContactField,
    kind: &'static str,
    placeholder: &'static str,
) -> Html {
    let oninput = ctx.link().callback(move |e: InputEvent| {
        let input: HtmlInputElement = e.target_unchecked_into();
        Msg::UpdateContact(field, input.value())
    });
    let id = format!("contact-{}", field.form_name());

    html! {
        <div class="form-field">
            <label for={id.clone()}>
                { field.to_string() }
                { if field.is_required() { html! { <span class="required">{" *"}</span> } } else { html! {} } }
            </label>
            <input
                {id}
                type={kind}
                name={field.form_name()}
                {placeholder}
                required={field.is_required()}
                disabled={model.loading}
                value={model.contact.field(field).to_string()}
                {oninput}
            />
        </div>
    }
}

fn render_submit_content(model: &Model) -> Html {
    if model.loading {
        html! { <><i class="fa-solid fa-spinner fa-spin"></i>{" Analyzing..."}</> }
    } else {
        html! { <><i class="fa-solid fa-magnifying-glass"></i>{" Analyze Leaf"}</> }
    }
}
