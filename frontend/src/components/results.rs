use super::super::{Model, Msg};
use super::utils::{debounce, meter_style, status_class, status_label};
use yew::prelude::*;

fn render_list(items: &[&str]) -> Html {
    if items.is_empty() {
        return html! { <p class="empty-list">{"None identified"}</p> };
    }
    html! {
        <ul>
            { for items.iter().map(|item| html! { <li>{ *item }</li> }) }
        </ul>
    }
}

pub fn render_results(model: &Model, ctx: &Context<Model>) -> Html {
    let Some(analysis) = &model.analysis else {
        return html! {};
    };

    let report = &analysis.report;
    let record = report.record();
    let severity = record.severity;
    let treatment = &record.treatment;
    let link = ctx.link().clone();

    html! {
        <div class={classes!("results-container", status_class(severity))}>
            <div class="result-header">
                <h2>{ record.name }</h2>
                <span class={classes!("status-badge", status_class(severity))}>
                    { status_label(severity) }
                </span>
                <div class="confidence-meter">
                    <div class="meter-label">{"Confidence:"}</div>
                    <div class="meter">
                        <div class="meter-fill" style={meter_style(report.confidence)}></div>
                    </div>
                    <div class="meter-value">{ report.confidence.to_string() }</div>
                </div>
                <p class="affected-area">
                    { format!("Affected area: {}%", report.affected_area_percent()) }
                </p>
                <p class="report-id">{ format!("Report {}", report.id) }</p>
            </div>

            <div class="detailed-results">
                <h3>{"Possible causes"}</h3>
                { render_list(record.causes) }

                <h3>{"Prevention"}</h3>
                { render_list(record.prevention) }

                <h3>{"Recommended treatment"}</h3>
                <dl class="treatment">
                    <dt>{"Medicine"}</dt><dd>{ treatment.medicine }</dd>
                    <dt>{"Dosage"}</dt><dd>{ treatment.dosage }</dd>
                    <dt>{"Frequency"}</dt><dd>{ treatment.frequency }</dd>
                    <dt>{"Instructions"}</dt><dd>{ treatment.instructions }</dd>
                </dl>
            </div>

            <div class="button-container">
                <button
                    class="analyze-btn"
                    disabled={model.generating_report}
                    onclick={debounce(300, move || link.send_message(Msg::DownloadReport))}
                >
                    {
                        if model.generating_report {
                            html! { <><i class="fa-solid fa-spinner fa-spin"></i>{" Generating..."}</> }
                        } else {
                            html! { <><i class="fa-solid fa-file-pdf"></i>{" Download PDF Report"}</> }
                        }
                    }
                </button>
            </div>
        </div>
    }
}
