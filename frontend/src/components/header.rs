use yew::prelude::*;

/// Renders the application header
pub fn render_header() -> Html {
    html! {
        <header class="app-header">
            <h1><i class="fa-solid fa-seedling"></i> {" XpeditionR Maize Health Check"}</h1>
            <p class="subtitle">{"Photograph a maize leaf, add your details and get a diagnosis"}</p>
        </header>
    }
}
