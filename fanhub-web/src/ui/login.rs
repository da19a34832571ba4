use fanhub_client::{api::Credentials, forms, Outcome, Route, Session};
use yew::prelude::*;

use crate::{api::ApiHandle, storage::LocalStore, ui};

#[derive(Clone, PartialEq, Properties)]
pub struct LoginProps {
    pub api: ApiHandle,
    pub session: Session,
    pub on_session: Callback<Session>,
    pub on_outcome: Callback<Outcome>,
    pub on_navigate: Callback<Route>,
}

pub struct Login {
    email: String,
    pass: String,
    submitting: bool,
    error: Option<String>,
}

pub enum LoginMsg {
    EmailChanged(String),
    PassChanged(String),
    SubmitClicked,
    Done(Session, Outcome),
}

impl Component for Login {
    type Message = LoginMsg;
    type Properties = LoginProps;

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            email: String::new(),
            pass: String::new(),
            submitting: false,
            error: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            LoginMsg::EmailChanged(e) => self.email = e,
            LoginMsg::PassChanged(p) => self.pass = p,
            LoginMsg::SubmitClicked => {
                if self.submitting {
                    return false;
                }
                self.submitting = true;
                let api = ctx.props().api.clone();
                let mut session = ctx.props().session.clone();
                let credentials = Credentials {
                    email: self.email.clone(),
                    password: self.pass.clone(),
                };
                ctx.link().send_future(async move {
                    let mut store = LocalStore;
                    let outcome = forms::login(&*api, &mut session, &mut store, &credentials).await;
                    LoginMsg::Done(session, outcome)
                });
            }
            LoginMsg::Done(session, outcome) => {
                self.submitting = false;
                self.pass = String::new();
                self.error = outcome.inline_error.clone();
                ctx.props().on_session.emit(session);
                ctx.props().on_outcome.emit(outcome);
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        macro_rules! callback_for {
            ($msg:ident) => {
                ctx.link()
                    .callback(|e: web_sys::Event| LoginMsg::$msg(ui::input_value(e)))
            };
        }
        let forgot = ctx
            .props()
            .on_navigate
            .reform(|_: MouseEvent| Route::ForgotPassword);
        html! {<>
            <div class="text-center my-4">
                <h1>{ "Login" }</h1>
            </div>
            <form class="login-form" onsubmit={ ctx.link().callback(|e: SubmitEvent| {
                e.prevent_default();
                LoginMsg::SubmitClicked
            }) }>
                <div class="input-group mb-3">
                    <label class="input-group-text col-xl-1" for="email">{ "Email" }</label>
                    <input
                        type="email"
                        class="form-control form-control-lg"
                        id="email"
                        placeholder="you@example.org"
                        value={ self.email.clone() }
                        onchange={ callback_for!(EmailChanged) }
                    />
                </div>
                <div class="input-group mb-3">
                    <label class="input-group-text col-xl-1" for="pass">{ "Password" }</label>
                    <input
                        type="password"
                        class="form-control form-control-lg"
                        id="pass"
                        value={ self.pass.clone() }
                        onchange={ callback_for!(PassChanged) }
                    />
                </div>
                <button type="submit" class="btn btn-primary" disabled={ self.submitting }>
                    { "Connect" }
                </button>
                <button type="button" class="btn btn-link" onclick={ forgot }>
                    { "Forgot your password?" }
                </button>
            </form>
            { ui::feedback(self.error.as_deref(), None) }
        </>}
    }
}
