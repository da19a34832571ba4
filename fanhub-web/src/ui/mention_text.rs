use fanhub_client::{
    api::{Mention, UserId},
    mention::{self, Segment},
};
use yew::prelude::*;

#[derive(Clone, PartialEq, Properties)]
pub struct MentionTextProps {
    pub content: String,
    pub mentions: Vec<Mention>,
    pub on_profile: Callback<UserId>,
}

/// Comment text with its `@username` mentions; content is never parsed as markup
#[function_component(MentionText)]
pub fn mention_text(p: &MentionTextProps) -> Html {
    mention::render(&p.content, &p.mentions)
        .into_iter()
        .map(|seg| match seg {
            Segment::Text(t) => html! { { t } },
            Segment::Link { user, text } => {
                let id = user.id.clone();
                html! {
                    <a
                        class="mention"
                        href="#"
                        onclick={ p.on_profile.reform(move |e: MouseEvent| {
                            e.prevent_default();
                            id.clone()
                        }) }
                    >
                        { text }
                    </a>
                }
            }
            Segment::Inert(t) => html! { <span class="mention">{ t }</span> },
        })
        .collect()
}
