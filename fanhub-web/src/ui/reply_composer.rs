use yew::prelude::*;

#[derive(Clone, PartialEq, Properties)]
pub struct ReplyComposerProps {
    pub on_submit: Callback<String>,
    pub disabled: bool,
}

#[function_component(ReplyComposer)]
pub fn reply_composer(p: &ReplyComposerProps) -> Html {
    let content = use_state(String::new);

    let oninput = {
        let content = content.clone();
        Callback::from(move |e: InputEvent| {
            let area: web_sys::HtmlTextAreaElement = e.target_unchecked_into();
            content.set(area.value());
        })
    };
    let onsubmit = {
        let content = content.clone();
        let on_submit = p.on_submit.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            on_submit.emit((*content).clone());
            content.set(String::new());
        })
    };

    html! {
        <form class="reply-composer d-flex align-items-start my-2" { onsubmit }>
            <textarea
                class="form-control me-2"
                rows="2"
                placeholder="Write a reply, @mention someone"
                value={ (*content).clone() }
                { oninput }
            />
            <button type="submit" class="btn btn-sm btn-primary" disabled={ p.disabled }>
                { "Reply" }
            </button>
        </form>
    }
}
