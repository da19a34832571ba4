use fanhub_client::{
    api::{CollectionId, StoryId, UserId},
    Collections, MutationResult, Outcome, Route,
};
use yew::prelude::*;

use crate::{api::ApiHandle, ui};

#[derive(Clone, PartialEq, Properties)]
pub struct CollectionPickerProps {
    pub api: ApiHandle,
    pub viewer: UserId,
    pub story: StoryId,
    pub on_navigate: Callback<Route>,
}

pub enum CollectionMsg {
    Fetched(Collections),
    Toggle(CollectionId),
    Done(Collections, MutationResult),
}

/// Files the story into, or out of, the viewer's collections
pub struct CollectionPicker {
    /// `None` while a call owns the collections
    collections: Option<Collections>,
    last: Option<MutationResult>,
}

impl Component for CollectionPicker {
    type Message = CollectionMsg;
    type Properties = CollectionPickerProps;

    fn create(ctx: &Context<Self>) -> Self {
        let api = ctx.props().api.clone();
        let viewer = ctx.props().viewer.clone();
        ctx.link().send_future(async move {
            let mut collections = Collections::new();
            collections.fetch(&*api, &viewer).await;
            CollectionMsg::Fetched(collections)
        });
        Self {
            collections: None,
            last: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        let api = ctx.props().api.clone();
        let story = ctx.props().story.clone();
        match msg {
            CollectionMsg::Fetched(collections) => {
                let route = collections
                    .error()
                    .and_then(|e| Outcome::from_error(e).navigate);
                if let Some(route) = route {
                    ctx.props().on_navigate.emit(route);
                }
                self.collections = Some(collections);
            }
            CollectionMsg::Toggle(id) => {
                let mut collections = match self.collections.take() {
                    Some(collections) => collections,
                    None => return false,
                };
                ctx.link().send_future(async move {
                    let res = match collections.contains(&id, &story) {
                        true => collections.remove_story(&*api, &id, &story).await,
                        false => collections.add_story(&*api, &id, &story).await,
                    };
                    CollectionMsg::Done(collections, res)
                });
            }
            CollectionMsg::Done(collections, res) => {
                self.collections = Some(collections);
                self.last = Some(res);
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let story = &ctx.props().story;
        let items = match &self.collections {
            None => html! { <div class="spinner-border spinner-border-sm" role="status"></div> },
            Some(cs) if cs.collections().is_empty() => html! {
                <li class="list-group-item text-muted">{ "You have no collections yet." }</li>
            },
            Some(cs) => cs
                .collections()
                .iter()
                .map(|c| {
                    let id = c.id.clone();
                    html! {
                        <li class="list-group-item" key={ c.id.0.clone() }>
                            <input
                                type="checkbox"
                                class="form-check-input me-2"
                                checked={ cs.contains(&c.id, story) }
                                onchange={ ctx.link().callback(move |_| CollectionMsg::Toggle(id.clone())) }
                            />
                            { &c.title }
                        </li>
                    }
                })
                .collect::<Html>(),
        };
        let feedback = match &self.last {
            Some(r) if !r.success => ui::feedback(Some(&r.message), None),
            _ => html! {},
        };
        html! {
            <div class="collection-picker my-3">
                <h5>{ "Add to a collection" }</h5>
                <ul class="list-group mb-2">{ items }</ul>
                { feedback }
            </div>
        }
    }
}
