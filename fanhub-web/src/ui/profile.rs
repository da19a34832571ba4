use fanhub_client::{
    api::{UserId, UserRef},
    Collections, MutationResult, Outcome, Recommendations, Route, UserDirectory,
};
use yew::prelude::*;

use crate::{api::ApiHandle, ui};

#[derive(Clone, PartialEq, Properties)]
pub struct ProfileProps {
    pub api: ApiHandle,
    pub user: UserId,
    pub viewer: Option<UserRef>,
    pub on_navigate: Callback<Route>,
}

pub struct Loaded {
    dir: UserDirectory,
    lists: Recommendations,
    collections: Collections,
}

pub enum ProfileMsg {
    Loaded(UserId, Loaded),
    ToggleFollow,
    Followed(UserDirectory, MutationResult),
}

pub struct Profile {
    state: Option<Loaded>,
    following_busy: bool,
    last: Option<MutationResult>,
}

impl Profile {
    fn load(ctx: &Context<Self>) {
        let api = ctx.props().api.clone();
        let user = ctx.props().user.clone();
        let viewer = ctx.props().viewer.clone();
        ctx.link().send_future(async move {
            let mut dir = UserDirectory::new(viewer.clone());
            if let Some(me) = viewer.as_ref().filter(|me| me.id != user) {
                dir.fetch(&*api, &me.id).await;
            }
            dir.fetch(&*api, &user).await;
            let mut lists = Recommendations::new();
            lists.fetch_all(&*api, &user).await;
            let mut collections = Collections::new();
            collections.fetch(&*api, &user).await;
            ProfileMsg::Loaded(
                user,
                Loaded {
                    dir,
                    lists,
                    collections,
                },
            )
        });
    }
}

impl Component for Profile {
    type Message = ProfileMsg;
    type Properties = ProfileProps;

    fn create(ctx: &Context<Self>) -> Self {
        Self::load(ctx);
        Self {
            state: None,
            following_busy: false,
            last: None,
        }
    }

    fn changed(&mut self, ctx: &Context<Self>, old_props: &Self::Properties) -> bool {
        if ctx.props().user != old_props.user || ctx.props().viewer != old_props.viewer {
            self.state = None;
            self.last = None;
            Self::load(ctx);
        }
        true
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            ProfileMsg::Loaded(user, loaded) => {
                if user != ctx.props().user {
                    tracing::debug!(%user, "dropping profile of a previous page");
                    return false;
                }
                let err = loaded
                    .dir
                    .error()
                    .or_else(|| loaded.lists.error())
                    .or_else(|| loaded.collections.error());
                if let Some(route) = err.and_then(|e| Outcome::from_error(e).navigate) {
                    ctx.props().on_navigate.emit(route);
                }
                self.state = Some(loaded);
            }
            ProfileMsg::ToggleFollow => {
                let (mut dir, subject) = match &self.state {
                    Some(s) if !self.following_busy => match s.dir.profile(&ctx.props().user) {
                        Some(u) => (s.dir.clone(), u.to_ref()),
                        None => return false,
                    },
                    _ => return false,
                };
                self.following_busy = true;
                let api = ctx.props().api.clone();
                ctx.link().send_future(async move {
                    let res = match dir.is_following(&subject.id) {
                        true => dir.unfollow(&*api, &subject.id).await,
                        false => dir.follow(&*api, &subject).await,
                    };
                    ProfileMsg::Followed(dir, res)
                });
            }
            ProfileMsg::Followed(dir, res) => {
                self.following_busy = false;
                if let Some(state) = self.state.as_mut() {
                    state.dir = dir;
                }
                self.last = Some(res);
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let p = ctx.props();
        let state = match &self.state {
            Some(s) => s,
            None => return html! { <div class="spinner-border m-4" role="status"></div> },
        };
        let user = match state.dir.profile(&p.user) {
            Some(u) => u,
            None => return ui::feedback(Some("This profile could not be loaded"), None),
        };
        let follow = match &p.viewer {
            Some(me) if me.id != p.user => {
                let label = match state.dir.is_following(&p.user) {
                    true => "Unfollow",
                    false => "Follow",
                };
                html! {
                    <button
                        class="btn btn-outline-primary"
                        disabled={ self.following_busy }
                        onclick={ ctx.link().callback(|_| ProfileMsg::ToggleFollow) }
                    >
                        { label }
                    </button>
                }
            }
            _ => html! {},
        };
        let lists = state
            .lists
            .lists()
            .iter()
            .filter(|l| l.published || p.viewer.as_ref().map(|v| &v.id) == Some(&p.user))
            .map(|l| {
                html! {
                    <li class="list-group-item" key={ l.id.0.clone() }>
                        <strong>{ &l.name }</strong>
                        { format!(" - {} stories, {} likes", l.stories.len(), l.likes) }
                    </li>
                }
            })
            .collect::<Html>();
        let collections = state
            .collections
            .collections()
            .iter()
            .map(|c| {
                html! {
                    <li class="list-group-item" key={ c.id.0.clone() }>
                        <strong>{ &c.title }</strong>
                        { format!(" - {} stories, {} likes", c.stories.len(), c.likes) }
                    </li>
                }
            })
            .collect::<Html>();
        let feedback = match &self.last {
            Some(r) if !r.success => ui::feedback(Some(&r.message), None),
            _ => html! {},
        };

        html! {
            <div class="profile">
                <div class="d-flex align-items-center justify-content-between my-4">
                    <h1>{ format!("@{}", user.username) }</h1>
                    { follow }
                </div>
                { feedback }
                <p>{ &user.bio }</p>
                <ul class="list-inline">
                    <li class="list-inline-item">{ format!("{} stories", user.counts.stories) }</li>
                    <li class="list-inline-item">{ format!("{} followers", user.counts.followers) }</li>
                    <li class="list-inline-item">{ format!("{} following", user.counts.following) }</li>
                    <li class="list-inline-item">
                        { format!("{} social points", user.social_points.total()) }
                    </li>
                    <li class="list-inline-item">
                        { format!("{} day streak", user.streak.current) }
                    </li>
                </ul>
                <h4>{ "Recommendation lists" }</h4>
                <ul class="list-group">{ lists }</ul>
                <h4 class="mt-4">{ "Collections" }</h4>
                <ul class="list-group">{ collections }</ul>
            </div>
        }
    }
}
