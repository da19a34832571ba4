use fanhub_client::{
    api::{Api, CommentId, ContentKind, Error, Message, RepliesPage, Reply, UserId},
    can_delete, PageRequest, Parent, ReplyList, Route,
};
use yew::prelude::*;

use crate::{api::ApiHandle, ui};

#[derive(Clone, PartialEq, Properties)]
pub struct ReplyListProps {
    pub api: ApiHandle,
    pub parent: Parent,
    pub kind: ContentKind,

    /// Owner of the content the thread hangs off, who may delete any reply
    pub owner: UserId,
    pub viewer: Option<UserId>,
    pub depth: usize,
    pub on_navigate: Callback<Route>,
}

pub enum ReplyListMsg {
    Loaded(PageRequest, Result<RepliesPage, Error>),
    LoadMore,
    Like(CommentId),
    Liked(CommentId, Result<Message, Error>),
    Delete(CommentId),
    Deleted(CommentId, Result<Message, Error>),
    Post(String),
    Posted(Result<Reply, Error>),
}

pub struct ReplyListView {
    list: ReplyList,
    posting: bool,
}

impl ReplyListView {
    fn fetch(ctx: &Context<Self>, req: PageRequest) {
        let api = ctx.props().api.clone();
        ctx.link().send_future(async move {
            let res = req.send(&*api).await;
            ReplyListMsg::Loaded(req, res)
        });
    }

    fn route(ctx: &Context<Self>, route: Option<Route>) {
        if let Some(route) = route {
            ctx.props().on_navigate.emit(route);
        }
    }
}

impl Component for ReplyListView {
    type Message = ReplyListMsg;
    type Properties = ReplyListProps;

    fn create(ctx: &Context<Self>) -> Self {
        let mut list = ReplyList::new(ctx.props().parent.clone());
        Self::fetch(ctx, list.begin_fetch());
        Self {
            list,
            posting: false,
        }
    }

    fn changed(&mut self, ctx: &Context<Self>, _old_props: &Self::Properties) -> bool {
        if let Some(req) = self.list.set_parent(ctx.props().parent.clone()) {
            Self::fetch(ctx, req);
        }
        true
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        let api = ctx.props().api.clone();
        let kind = ctx.props().kind;
        match msg {
            ReplyListMsg::Loaded(req, res) => Self::route(ctx, self.list.apply(&req, res)),
            ReplyListMsg::LoadMore => match self.list.load_more() {
                Some(req) => Self::fetch(ctx, req),
                None => return false,
            },
            ReplyListMsg::Like(id) => {
                if !self.list.begin_like(&id) {
                    return false;
                }
                ctx.link().send_future(async move {
                    let res = api.like_comment(kind, &id).await;
                    ReplyListMsg::Liked(id, res)
                });
            }
            ReplyListMsg::Liked(id, res) => Self::route(ctx, self.list.finish_like(&id, res)),
            ReplyListMsg::Delete(id) => {
                ctx.link().send_future(async move {
                    let res = api.delete_comment(kind, &id).await;
                    ReplyListMsg::Deleted(id, res)
                });
                return false;
            }
            ReplyListMsg::Deleted(id, res) => Self::route(ctx, self.list.finish_delete(&id, res)),
            ReplyListMsg::Post(content) => match ReplyList::compose(&content) {
                Ok(new) => {
                    self.posting = true;
                    let parent = self.list.parent().clone();
                    ctx.link().send_future(async move {
                        ReplyListMsg::Posted(parent.post(&*api, &new).await)
                    });
                }
                Err(err) => Self::route(ctx, self.list.report(err)),
            },
            ReplyListMsg::Posted(res) => {
                self.posting = false;
                Self::route(ctx, self.list.finish_post(res));
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let p = ctx.props();
        let composer = p.viewer.is_some().then(|| {
            html! {
                <ui::ReplyComposer
                    on_submit={ ctx.link().callback(ReplyListMsg::Post) }
                    disabled={ self.posting }
                />
            }
        });
        let error = self
            .list
            .error()
            .map(|e| html! { <div class="alert alert-warning my-2">{ e }</div> });
        let items = self.list.replies().map(|r| {
            html! {
                <ui::ReplyItem
                    key={ r.id.0.clone() }
                    api={ p.api.clone() }
                    reply={ r.clone() }
                    kind={ p.kind }
                    owner={ p.owner.clone() }
                    viewer={ p.viewer.clone() }
                    depth={ p.depth }
                    liking={ self.list.is_liking(&r.id) }
                    can_delete={ can_delete(r, p.viewer.as_ref(), &p.owner) }
                    on_like={ ctx.link().callback(ReplyListMsg::Like) }
                    on_delete={ ctx.link().callback(ReplyListMsg::Delete) }
                    on_navigate={ p.on_navigate.clone() }
                />
            }
        });
        let loading = self.list.is_loading().then(|| {
            html! { <div class="spinner-border spinner-border-sm m-2" role="status"></div> }
        });
        let more = (self.list.has_more() && !self.list.is_loading()).then(|| {
            html! {
                <button
                    type="button"
                    class="btn btn-sm btn-outline-secondary my-2"
                    onclick={ ctx.link().callback(|_| ReplyListMsg::LoadMore) }
                >
                    { "Load more replies" }
                </button>
            }
        });

        html! {
            <div class="reply-list">
                { for composer }
                { for error }
                <ul class="list-group list-group-flush">
                    { for items }
                </ul>
                { for loading }
                { for more }
            </div>
        }
    }
}
