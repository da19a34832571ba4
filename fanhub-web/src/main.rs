mod api;
mod storage;
mod ui;

fn main() {
    tracing_wasm::set_as_global_default();
    match api::ApiHandle::connect() {
        Ok(api) => {
            tracing::info!(host = %api.host(), "starting fanhub");
            yew::Renderer::<ui::App>::with_props(ui::AppProps { api }).render();
        }
        Err(err) => tracing::error!(?err, "failed setting up the api client"),
    }
}
