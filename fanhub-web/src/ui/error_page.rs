use yew::prelude::*;

#[derive(Clone, PartialEq, Properties)]
pub struct ErrorPageProps {
    pub message: String,
    pub on_home: Callback<()>,
}

#[function_component(ErrorPage)]
pub fn error_page(p: &ErrorPageProps) -> Html {
    html! {
        <div class="text-center my-5">
            <h1>{ "Something went wrong" }</h1>
            <p class="lead">{ &p.message }</p>
            <button class="btn btn-primary" onclick={ p.on_home.reform(|_| ()) }>
                { "Back to the home page" }
            </button>
        </div>
    }
}
