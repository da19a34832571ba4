use fanhub_client::{api::NewUser, forms, Outcome};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::{api::ApiHandle, ui};

#[derive(Clone, PartialEq, Properties)]
pub struct SignupProps {
    pub api: ApiHandle,
    pub on_outcome: Callback<Outcome>,
}

#[function_component(Signup)]
pub fn signup(p: &SignupProps) -> Html {
    let username = use_state(String::new);
    let email = use_state(String::new);
    let password = use_state(String::new);
    let confirmation = use_state(String::new);
    let error = use_state(|| None::<String>);

    macro_rules! field {
        ($state:ident, $label:expr, $type:expr) => {{
            let state = $state.clone();
            html! {
                <div class="input-group mb-3">
                    <label class="input-group-text col-xl-2" for={ stringify!($state) }>
                        { $label }
                    </label>
                    <input
                        type={ $type }
                        class="form-control form-control-lg"
                        id={ stringify!($state) }
                        value={ (*$state).clone() }
                        onchange={ Callback::from(move |e| state.set(ui::input_value(e))) }
                    />
                </div>
            }
        }};
    }

    let onsubmit = {
        let api = p.api.clone();
        let on_outcome = p.on_outcome.clone();
        let (username, email, password, confirmation, error) = (
            username.clone(),
            email.clone(),
            password.clone(),
            confirmation.clone(),
            error.clone(),
        );
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let user = NewUser {
                username: (*username).clone(),
                email: (*email).clone(),
                password: (*password).clone(),
            };
            let confirmation = (*confirmation).clone();
            let (api, on_outcome, error) = (api.clone(), on_outcome.clone(), error.clone());
            spawn_local(async move {
                let outcome = forms::signup(&*api, &user, &confirmation).await;
                error.set(outcome.inline_error.clone());
                on_outcome.emit(outcome);
            });
        })
    };

    html! {<>
        <div class="text-center my-4">
            <h1>{ "Join FanHub" }</h1>
        </div>
        <form class="signup-form" { onsubmit }>
            { field!(username, "Username", "text") }
            { field!(email, "Email", "email") }
            { field!(password, "Password", "password") }
            { field!(confirmation, "Confirm password", "password") }
            <button type="submit" class="btn btn-primary">{ "Sign up" }</button>
        </form>
        { ui::feedback((*error).as_deref(), None) }
    </>}
}
