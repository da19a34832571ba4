use fanhub_client::{
    api::{CommentId, ContentKind, Reply, UserId},
    thread::child_depth,
    Parent, Route, MAX_REPLY_DEPTH,
};
use yew::prelude::*;

use crate::{api::ApiHandle, ui};

#[derive(Clone, PartialEq, Properties)]
pub struct ReplyItemProps {
    pub api: ApiHandle,
    pub reply: Reply,
    pub kind: ContentKind,
    pub owner: UserId,
    pub viewer: Option<UserId>,
    pub depth: usize,

    /// A like call for this reply is in flight
    pub liking: bool,
    pub can_delete: bool,
    pub on_like: Callback<CommentId>,
    pub on_delete: Callback<CommentId>,
    pub on_navigate: Callback<Route>,

    /// Set at the cutoff depth, where replying happens in the enclosing flat list
    #[prop_or_default]
    pub on_reply: Option<Callback<CommentId>>,
}

#[function_component(ReplyItem)]
pub fn reply_item(p: &ReplyItemProps) -> Html {
    let expanded = use_state(|| false);
    let r = &p.reply;

    let author = {
        let id = r.author.id.clone();
        p.on_navigate
            .reform(move |_: MouseEvent| Route::Profile(id.clone()))
    };
    let on_profile = p.on_navigate.reform(Route::Profile);
    let like_icon = match r.liked_by_current_user {
        true => "bi-heart-fill",
        false => "bi-heart",
    };
    let like = {
        let id = r.id.clone();
        p.on_like.reform(move |_: MouseEvent| id.clone())
    };
    let delete = p.can_delete.then(|| {
        let id = r.id.clone();
        html! {
            <button
                type="button"
                class="btn btn-sm btn-link text-danger"
                onclick={ p.on_delete.reform(move |_: MouseEvent| id.clone()) }
            >
                { "Delete" }
            </button>
        }
    });
    let toggle_label = match (*expanded, r.reply_count) {
        (true, _) => String::from("Hide replies"),
        (false, 0) => String::from("Reply"),
        (false, 1) => String::from("View 1 reply"),
        (false, n) => format!("View {n} replies"),
    };
    let toggle = if p.depth < MAX_REPLY_DEPTH {
        let expanded = expanded.clone();
        html! {
            <button
                type="button"
                class="btn btn-sm btn-link"
                onclick={ Callback::from(move |_: MouseEvent| expanded.set(!*expanded)) }
            >
                { toggle_label }
            </button>
        }
    } else if let Some(on_reply) = &p.on_reply {
        let id = r.id.clone();
        html! {
            <button
                type="button"
                class="btn btn-sm btn-link"
                onclick={ on_reply.reform(move |_: MouseEvent| id.clone()) }
            >
                { "Reply" }
            </button>
        }
    } else {
        html! {}
    };

    // children of the last nesting level are shown flat, as one list
    let below = child_depth(p.depth, MAX_REPLY_DEPTH);
    let children = (*expanded && p.depth < MAX_REPLY_DEPTH).then(|| {
        let nested = match below < MAX_REPLY_DEPTH {
            true => html! {
                <ui::ReplyListView
                    api={ p.api.clone() }
                    parent={ Parent::from(r.id.clone()) }
                    kind={ p.kind }
                    owner={ p.owner.clone() }
                    viewer={ p.viewer.clone() }
                    depth={ below }
                    on_navigate={ p.on_navigate.clone() }
                />
            },
            false => html! {
                <ui::FlatThread
                    api={ p.api.clone() }
                    root={ r.id.clone() }
                    kind={ p.kind }
                    owner={ p.owner.clone() }
                    viewer={ p.viewer.clone() }
                    on_navigate={ p.on_navigate.clone() }
                />
            },
        };
        html! { <div class="ms-4">{ nested }</div> }
    });

    html! {
        <li class="list-group-item reply">
            <div class="d-flex align-items-center">
                <button type="button" class="btn btn-link p-0 fw-bold" onclick={ author }>
                    { &r.author.username }
                </button>
                <small class="text-muted ms-2">
                    { r.created_at.format("%Y-%m-%d %H:%M").to_string() }
                </small>
            </div>
            <p class="mb-1">
                <ui::MentionText
                    content={ r.content.clone() }
                    mentions={ r.mentions.clone() }
                    { on_profile }
                />
            </p>
            <div class="d-flex align-items-center">
                <button
                    type="button"
                    class={ classes!("btn", "btn-sm", "bi-btn", like_icon) }
                    aria-label="Like"
                    disabled={ p.liking || p.viewer.is_none() }
                    onclick={ like }
                >
                    { format!(" {}", r.likes) }
                </button>
                { toggle }
                { for delete }
            </div>
            { for children }
        </li>
    }
}
