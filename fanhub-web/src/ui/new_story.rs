use fanhub_client::{
    api::{NewStory, Upload},
    forms, Outcome,
};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use yew::prelude::*;

use crate::{api::ApiHandle, ui};

#[derive(Clone, PartialEq, Properties)]
pub struct NewStoryFormProps {
    pub api: ApiHandle,
    pub on_outcome: Callback<Outcome>,
}

async fn read_file(file: web_sys::File) -> anyhow::Result<Upload> {
    let buf = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| anyhow::anyhow!("reading {}: {:?}", file.name(), e))?;
    Ok(Upload {
        file_name: file.name(),
        mime: file.type_(),
        bytes: js_sys::Uint8Array::new(&buf).to_vec(),
    })
}

#[function_component(NewStoryForm)]
pub fn new_story_form(p: &NewStoryFormProps) -> Html {
    let title = use_state(String::new);
    let summary = use_state(String::new);
    let cover = use_state(|| None::<web_sys::File>);
    let error = use_state(|| None::<String>);
    let submitting = use_state(|| false);

    let onsubmit = {
        let (api, on_outcome) = (p.api.clone(), p.on_outcome.clone());
        let (title, summary, cover, error, submitting) = (
            title.clone(),
            summary.clone(),
            cover.clone(),
            error.clone(),
            submitting.clone(),
        );
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if *submitting {
                return;
            }
            submitting.set(true);
            let (title, summary, file) = ((*title).clone(), (*summary).clone(), (*cover).clone());
            let (api, on_outcome, error, submitting) = (
                api.clone(),
                on_outcome.clone(),
                error.clone(),
                submitting.clone(),
            );
            spawn_local(async move {
                let cover = match file {
                    None => None,
                    Some(f) => match read_file(f).await {
                        Ok(upload) => Some(upload),
                        Err(err) => {
                            tracing::error!(?err, "failed reading the cover");
                            error.set(Some(String::from("The cover file could not be read")));
                            submitting.set(false);
                            return;
                        }
                    },
                };
                let story = NewStory {
                    title,
                    summary,
                    cover,
                };
                let outcome = forms::create_story(&*api, &story).await;
                submitting.set(false);
                error.set(outcome.inline_error.clone());
                on_outcome.emit(outcome);
            });
        })
    };
    let on_title = {
        let title = title.clone();
        Callback::from(move |e| title.set(ui::input_value(e)))
    };
    let on_summary = {
        let summary = summary.clone();
        Callback::from(move |e: InputEvent| {
            let area: web_sys::HtmlTextAreaElement = e.target_unchecked_into();
            summary.set(area.value());
        })
    };
    let on_cover = {
        let cover = cover.clone();
        Callback::from(move |e: Event| {
            let input: web_sys::HtmlInputElement = e.target_unchecked_into();
            cover.set(input.files().and_then(|f| f.get(0)));
        })
    };

    html! {<>
        <div class="text-center my-4">
            <h1>{ "New story" }</h1>
        </div>
        <form { onsubmit }>
            <input
                type="text"
                class="form-control form-control-lg mb-3"
                placeholder="Title"
                value={ (*title).clone() }
                onchange={ on_title }
            />
            <textarea
                class="form-control mb-3"
                rows="5"
                placeholder="Summary"
                value={ (*summary).clone() }
                oninput={ on_summary }
            />
            <label class="form-label" for="cover">{ "Cover image" }</label>
            <input type="file" accept="image/*" class="form-control mb-3" id="cover" onchange={ on_cover } />
            <button type="submit" class="btn btn-primary" disabled={ *submitting }>
                { "Publish" }
            </button>
        </form>
        { ui::feedback((*error).as_deref(), None) }
    </>}
}
