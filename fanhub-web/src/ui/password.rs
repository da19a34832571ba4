use fanhub_client::{api::PasswordReset, forms, Outcome};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::{api::ApiHandle, ui};

#[derive(Clone, PartialEq, Properties)]
pub struct ForgotPasswordProps {
    pub api: ApiHandle,
    pub on_outcome: Callback<Outcome>,
}

#[function_component(ForgotPassword)]
pub fn forgot_password(p: &ForgotPasswordProps) -> Html {
    let email = use_state(String::new);
    let result = use_state(Outcome::default);

    let onsubmit = {
        let (api, on_outcome) = (p.api.clone(), p.on_outcome.clone());
        let (email, result) = (email.clone(), result.clone());
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let (api, on_outcome, result) = (api.clone(), on_outcome.clone(), result.clone());
            let email = (*email).clone();
            spawn_local(async move {
                let outcome = forms::forgot_password(&*api, &email).await;
                result.set(outcome.clone());
                on_outcome.emit(outcome);
            });
        })
    };
    let on_email = {
        let email = email.clone();
        Callback::from(move |e| email.set(ui::input_value(e)))
    };

    html! {<>
        <div class="text-center my-4">
            <h1>{ "Reset your password" }</h1>
        </div>
        <form { onsubmit }>
            <div class="input-group mb-3">
                <label class="input-group-text" for="email">{ "Email" }</label>
                <input
                    type="email"
                    class="form-control form-control-lg"
                    id="email"
                    value={ (*email).clone() }
                    onchange={ on_email }
                />
            </div>
            <button type="submit" class="btn btn-primary">{ "Send reset link" }</button>
        </form>
        { ui::feedback(result.inline_error.as_deref(), result.notice.as_deref()) }
    </>}
}

#[derive(Clone, PartialEq, Properties)]
pub struct ResetPasswordProps {
    pub api: ApiHandle,
    pub token: String,
    pub on_outcome: Callback<Outcome>,
}

#[function_component(ResetPassword)]
pub fn reset_password(p: &ResetPasswordProps) -> Html {
    let password = use_state(String::new);
    let confirmation = use_state(String::new);
    let error = use_state(|| None::<String>);

    let onsubmit = {
        let (api, on_outcome, token) = (p.api.clone(), p.on_outcome.clone(), p.token.clone());
        let (password, confirmation, error) =
            (password.clone(), confirmation.clone(), error.clone());
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let reset = PasswordReset {
                token: token.clone(),
                password: (*password).clone(),
            };
            let confirmation = (*confirmation).clone();
            let (api, on_outcome, error) = (api.clone(), on_outcome.clone(), error.clone());
            spawn_local(async move {
                let outcome = forms::reset_password(&*api, &reset, &confirmation).await;
                error.set(outcome.inline_error.clone());
                on_outcome.emit(outcome);
            });
        })
    };
    let on_password = {
        let password = password.clone();
        Callback::from(move |e| password.set(ui::input_value(e)))
    };
    let on_confirmation = {
        let confirmation = confirmation.clone();
        Callback::from(move |e| confirmation.set(ui::input_value(e)))
    };

    html! {<>
        <div class="text-center my-4">
            <h1>{ "Choose a new password" }</h1>
        </div>
        <form { onsubmit }>
            <input
                type="password"
                class="form-control form-control-lg mb-3"
                placeholder="New password"
                value={ (*password).clone() }
                onchange={ on_password }
            />
            <input
                type="password"
                class="form-control form-control-lg mb-3"
                placeholder="Confirm new password"
                value={ (*confirmation).clone() }
                onchange={ on_confirmation }
            />
            <button type="submit" class="btn btn-primary">{ "Update password" }</button>
        </form>
        { ui::feedback((*error).as_deref(), None) }
    </>}
}
