use fanhub_client::{
    api::{ListId, NewList, StoryId, UserId},
    MutationResult, Outcome, Recommendations, Route,
};
use yew::prelude::*;

use crate::{api::ApiHandle, ui};

#[derive(Clone, PartialEq, Properties)]
pub struct RecommendationPickerProps {
    pub api: ApiHandle,
    pub viewer: UserId,
    pub story: StoryId,
    pub on_navigate: Callback<Route>,
}

pub enum PickerMsg {
    Fetched(Recommendations),
    Toggle(ListId),
    NameChanged(String),
    Create,
    Done(Recommendations, MutationResult),
}

/// Adds the story to, or removes it from, the viewer's recommendation lists
pub struct RecommendationPicker {
    /// `None` while a call owns the lists
    recs: Option<Recommendations>,
    new_name: String,
    last: Option<MutationResult>,
}

impl Component for RecommendationPicker {
    type Message = PickerMsg;
    type Properties = RecommendationPickerProps;

    fn create(ctx: &Context<Self>) -> Self {
        let api = ctx.props().api.clone();
        let viewer = ctx.props().viewer.clone();
        ctx.link().send_future(async move {
            let mut recs = Recommendations::new();
            recs.fetch_all(&*api, &viewer).await;
            PickerMsg::Fetched(recs)
        });
        Self {
            recs: None,
            new_name: String::new(),
            last: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        let api = ctx.props().api.clone();
        let story = ctx.props().story.clone();
        match msg {
            PickerMsg::Fetched(recs) => {
                if let Some(route) = recs.error().and_then(|e| Outcome::from_error(e).navigate) {
                    ctx.props().on_navigate.emit(route);
                }
                self.recs = Some(recs);
            }
            PickerMsg::Toggle(list) => {
                let mut recs = match self.recs.take() {
                    Some(recs) => recs,
                    None => return false,
                };
                ctx.link().send_future(async move {
                    let res = match recs.contains(&list, &story) {
                        true => recs.remove_story(&*api, &list, &story).await,
                        false => recs.add_story(&*api, &list, &story).await,
                    };
                    PickerMsg::Done(recs, res)
                });
            }
            PickerMsg::NameChanged(name) => self.new_name = name,
            PickerMsg::Create => {
                let mut recs = match self.recs.take() {
                    Some(recs) => recs,
                    None => return false,
                };
                let new = NewList {
                    name: std::mem::take(&mut self.new_name),
                    description: String::new(),
                };
                ctx.link().send_future(async move {
                    let res = recs.create(&*api, &new).await;
                    PickerMsg::Done(recs, res)
                });
            }
            PickerMsg::Done(recs, res) => {
                self.recs = Some(recs);
                self.last = Some(res);
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let story = &ctx.props().story;
        let lists = match &self.recs {
            None => html! { <div class="spinner-border spinner-border-sm" role="status"></div> },
            Some(recs) => recs
                .lists()
                .iter()
                .map(|l| {
                    let id = l.id.clone();
                    html! {
                        <li class="list-group-item" key={ l.id.0.clone() }>
                            <input
                                type="checkbox"
                                class="form-check-input me-2"
                                checked={ recs.contains(&l.id, story) }
                                onchange={ ctx.link().callback(move |_| PickerMsg::Toggle(id.clone())) }
                            />
                            { &l.name }
                            { for l.published.then(|| html! {
                                <span class="badge bg-secondary ms-2">{ "published" }</span>
                            }) }
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
            <div class="recommendation-picker my-3">
                <h5>{ "Recommend in a list" }</h5>
                <ul class="list-group mb-2">{ lists }</ul>
                <form class="d-flex" onsubmit={ ctx.link().callback(|e: SubmitEvent| {
                    e.prevent_default();
                    PickerMsg::Create
                }) }>
                    <input
                        type="text"
                        class="form-control me-2"
                        placeholder="New list name"
                        value={ self.new_name.clone() }
                        onchange={ ctx.link().callback(|e| PickerMsg::NameChanged(ui::input_value(e))) }
                    />
                    <button type="submit" class="btn btn-outline-primary">{ "Create" }</button>
                </form>
                { feedback }
            </div>
        }
    }
}
