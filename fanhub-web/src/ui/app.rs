use fanhub_client::{api::UserId, forms, Outcome, Parent, Route, Session};
use yew::prelude::*;

use crate::{api::ApiHandle, storage::LocalStore, ui};

#[derive(Clone, PartialEq, Properties)]
pub struct AppProps {
    pub api: ApiHandle,
}

pub enum AppMsg {
    Navigate(Route),
    Outcome(Outcome),
    SessionChanged(Session),
    Logout,
    ToggleTheme,
}

pub struct App {
    session: Session,
    store: LocalStore,
    route: Route,
}

impl Component for App {
    type Message = AppMsg;
    type Properties = AppProps;

    fn create(_ctx: &Context<Self>) -> Self {
        let store = LocalStore;
        let session = Session::hydrate(&store);
        let route = match session.user_id() {
            Some(me) => Route::Profile(me.clone()),
            None => Route::Home,
        };
        Self {
            session,
            store,
            route,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            AppMsg::Navigate(route) => {
                tracing::debug!(?route, "navigating");
                self.route = route;
            }
            AppMsg::Outcome(outcome) => match outcome.navigate {
                Some(route) => self.route = route,
                None => return false,
            },
            AppMsg::SessionChanged(session) => self.session = session,
            AppMsg::Logout => {
                let api = ctx.props().api.clone();
                let mut session = self.session.clone();
                let mut store = self.store;
                ctx.link().send_future(async move {
                    let outcome = forms::logout(&*api, &mut session, &mut store).await;
                    AppMsg::Outcome(outcome)
                });
                self.session.logout(&mut self.store);
            }
            AppMsg::ToggleTheme => {
                let theme = self.session.theme().toggled();
                self.session.set_theme(&mut self.store, theme);
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="container" data-bs-theme={ self.session.theme().as_str() }>
                { self.navbar(ctx) }
                { self.page(ctx) }
            </div>
        }
    }
}

impl App {
    fn navbar(&self, ctx: &Context<Self>) -> Html {
        let go = |route: Route| {
            ctx.link()
                .callback(move |_: MouseEvent| AppMsg::Navigate(route.clone()))
        };
        let account = match self.session.user() {
            Some(me) => html! {<>
                <button class="btn btn-link" onclick={ go(Route::Profile(me.id.clone())) }>
                    { format!("@{}", me.username) }
                </button>
                <button class="btn btn-link" onclick={ go(Route::NewStory) }>{ "Write" }</button>
                <button class="btn btn-link" onclick={ ctx.link().callback(|_| AppMsg::Logout) }>
                    { "Logout" }
                </button>
            </>},
            None => html! {<>
                <button class="btn btn-link" onclick={ go(Route::Login) }>{ "Login" }</button>
                <button class="btn btn-link" onclick={ go(Route::Signup) }>{ "Sign up" }</button>
            </>},
        };
        html! {
            <nav class="navbar mb-4">
                <button class="navbar-brand btn btn-link" onclick={ go(Route::Home) }>
                    { "FanHub" }
                </button>
                <div class="d-flex">
                    { account }
                    <button
                        class="btn bi-btn bi-circle-half"
                        aria-label="Toggle theme"
                        onclick={ ctx.link().callback(|_| AppMsg::ToggleTheme) }
                    >
                    </button>
                </div>
            </nav>
        }
    }

    fn page(&self, ctx: &Context<Self>) -> Html {
        let api = ctx.props().api.clone();
        let on_outcome = ctx.link().callback(AppMsg::Outcome);
        let on_navigate = ctx.link().callback(AppMsg::Navigate);
        let viewer: Option<UserId> = self.session.user_id().cloned();
        match &self.route {
            Route::Home => html! {
                <div class="text-center my-4">
                    <h1>{ "Welcome to FanHub" }</h1>
                    <p>{ "Stories, recommendations and the people who write them." }</p>
                </div>
            },
            Route::Login => html! {
                <ui::Login
                    { api }
                    session={ self.session.clone() }
                    on_session={ ctx.link().callback(AppMsg::SessionChanged) }
                    { on_outcome }
                    { on_navigate }
                />
            },
            Route::Signup => html! { <ui::Signup { api } { on_outcome } /> },
            Route::ForgotPassword => html! { <ui::ForgotPassword { api } { on_outcome } /> },
            Route::ResetPassword { token } => html! {
                <ui::ResetPassword { api } token={ token.clone() } { on_outcome } />
            },
            Route::Profile(user) => html! {
                <ui::Profile
                    { api }
                    user={ user.clone() }
                    viewer={ self.session.user().map(|u| u.to_ref()) }
                    { on_navigate }
                />
            },
            Route::NewStory => html! { <ui::NewStoryForm { api } { on_outcome } /> },
            Route::Story(story) => html! {
                <ui::StoryPage { api } story={ story.clone() } { viewer } { on_outcome } />
            },
            Route::Thread {
                kind,
                comment,
                owner,
            } => html! {
                <ui::ReplyListView
                    { api }
                    parent={ Parent::from(comment.clone()) }
                    kind={ *kind }
                    owner={ owner.clone() }
                    { viewer }
                    depth={ 0 }
                    { on_navigate }
                />
            },
            Route::Error { message } => html! {
                <ui::ErrorPage
                    message={ message.clone() }
                    on_home={ ctx.link().callback(|_| AppMsg::Navigate(Route::Home)) }
                />
            },
        }
    }
}
