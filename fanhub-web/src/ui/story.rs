use fanhub_client::{
    api::{Api, ContentKind, NewReview, Story, StoryId, UserId},
    forms, Outcome, Parent, Route,
};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::{api::ApiHandle, ui};

#[derive(Clone, PartialEq, Properties)]
pub struct StoryPageProps {
    pub api: ApiHandle,
    pub story: StoryId,
    pub viewer: Option<UserId>,
    pub on_outcome: Callback<Outcome>,
}

#[function_component(StoryPage)]
pub fn story_page(p: &StoryPageProps) -> Html {
    let story = use_state(|| None::<Story>);
    {
        let (api, on_outcome, story) = (p.api.clone(), p.on_outcome.clone(), story.clone());
        use_effect_with_deps(
            move |id: &StoryId| {
                let id = id.clone();
                story.set(None);
                spawn_local(async move {
                    match api.fetch_story(&id).await {
                        Ok(s) => story.set(Some(s)),
                        Err(e) => {
                            tracing::warn!(story = %id, error = %e, "story failed to load");
                            on_outcome.emit(Outcome::from_error(&e));
                        }
                    }
                });
                || ()
            },
            p.story.clone(),
        )
    };

    let story = match &*story {
        // a response for a previous id may still be in flight
        Some(s) if s.id == p.story => s,
        _ => return html! { <div class="spinner-border my-4" role="status"></div> },
    };
    let on_navigate = p.on_outcome.reform(Outcome::navigate);
    let author = {
        let id = story.author.id.clone();
        on_navigate.reform(move |_: MouseEvent| Route::Profile(id.clone()))
    };
    let actions = match &p.viewer {
        Some(viewer) => html! {<>
            <ReviewForm
                api={ p.api.clone() }
                story={ p.story.clone() }
                on_outcome={ p.on_outcome.clone() }
            />
            <ui::RecommendationPicker
                api={ p.api.clone() }
                viewer={ viewer.clone() }
                story={ p.story.clone() }
                on_navigate={ on_navigate.clone() }
            />
            <ui::CollectionPicker
                api={ p.api.clone() }
                viewer={ viewer.clone() }
                story={ p.story.clone() }
                on_navigate={ on_navigate.clone() }
            />
        </>},
        None => html! {
            <p class="my-4">{ "Log in to review or comment on this story." }</p>
        },
    };

    html! {<>
        <h2 class="mt-4">{ &story.title }</h2>
        <p class="text-muted">
            { "by " }
            <button type="button" class="btn btn-link p-0 align-baseline" onclick={ author }>
                { &story.author.username }
            </button>
            { format!(" · {} likes", story.likes) }
        </p>
        <p>{ &story.summary }</p>
        { actions }
        <h4 class="mt-4">{ format!("Comments ({})", story.comments) }</h4>
        <ui::ReplyListView
            api={ p.api.clone() }
            parent={ Parent::Story(story.id.clone()) }
            kind={ ContentKind::Story }
            owner={ story.author.id.clone() }
            viewer={ p.viewer.clone() }
            depth={ 0 }
            { on_navigate }
        />
    </>}
}

#[derive(Clone, PartialEq, Properties)]
struct ReviewFormProps {
    api: ApiHandle,
    story: StoryId,
    on_outcome: Callback<Outcome>,
}

#[function_component(ReviewForm)]
fn review_form(p: &ReviewFormProps) -> Html {
    let rating = use_state(|| 5u8);
    let content = use_state(String::new);
    let error = use_state(|| None::<String>);

    let onsubmit = {
        let (api, story, on_outcome) = (p.api.clone(), p.story.clone(), p.on_outcome.clone());
        let (rating, content, error) = (rating.clone(), content.clone(), error.clone());
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let review = NewReview {
                rating: *rating,
                content: (*content).clone(),
            };
            let (api, story, on_outcome, error, content) = (
                api.clone(),
                story.clone(),
                on_outcome.clone(),
                error.clone(),
                content.clone(),
            );
            spawn_local(async move {
                let outcome = forms::review(&*api, &story, &review).await;
                if outcome.navigate.is_some() {
                    content.set(String::new());
                }
                error.set(outcome.inline_error.clone());
                on_outcome.emit(outcome);
            });
        })
    };
    let on_rating = {
        let rating = rating.clone();
        Callback::from(move |e: Event| {
            let select: web_sys::HtmlSelectElement = e.target_unchecked_into();
            match select.value().parse() {
                Ok(r) => rating.set(r),
                Err(err) => tracing::warn!(?err, "unparseable rating"),
            }
        })
    };
    let on_content = {
        let content = content.clone();
        Callback::from(move |e: InputEvent| {
            let area: web_sys::HtmlTextAreaElement = e.target_unchecked_into();
            content.set(area.value());
        })
    };

    html! {
        <form class="review-form my-4" { onsubmit }>
            <h5>{ "Write a review" }</h5>
            <select class="form-select mb-2" onchange={ on_rating }>
                { for (1..=5u8).rev().map(|r| html! {
                    <option value={ r.to_string() } selected={ *rating == r }>
                        { format!("{r} / 5") }
                    </option>
                }) }
            </select>
            <textarea
                class="form-control mb-2"
                rows="4"
                value={ (*content).clone() }
                oninput={ on_content }
            />
            <button type="submit" class="btn btn-primary">{ "Post review" }</button>
            { ui::feedback((*error).as_deref(), None) }
        </form>
    }
}
