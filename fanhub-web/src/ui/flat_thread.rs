use fanhub_client::{
    api::{Api, CommentId, ContentKind, Error, Message, Reply, UserId},
    can_delete, Parent, ReplyList, Route, ThreadTree, MAX_REPLY_DEPTH,
};
use yew::prelude::*;

use crate::{api::ApiHandle, ui};

#[derive(Clone, PartialEq, Properties)]
pub struct FlatThreadProps {
    pub api: ApiHandle,
    pub root: CommentId,
    pub kind: ContentKind,
    pub owner: UserId,
    pub viewer: Option<UserId>,
    pub on_navigate: Callback<Route>,
}

pub enum FlatThreadMsg {
    Loaded(ReplyList, Option<Route>),
    Like(CommentId),
    Liked(CommentId, Result<Message, Error>),
    Delete(CommentId),
    Deleted(CommentId, Result<Message, Error>),
    ReplyTo(Option<CommentId>),
    Post(String),
    Posted(Result<Reply, Error>),
}

/// Every reply below `root`, shown side by side at the deepest indentation
pub struct FlatThread {
    /// `None` until the whole subtree is loaded
    list: Option<ReplyList>,
    reply_to: Option<CommentId>,
    posting: bool,
}

impl FlatThread {
    fn load(ctx: &Context<Self>) {
        let api = ctx.props().api.clone();
        let mut list = ReplyList::new(ctx.props().root.clone());
        ctx.link().send_future(async move {
            let route = list.load_subtree(&*api).await;
            FlatThreadMsg::Loaded(list, route)
        });
    }

    fn route(ctx: &Context<Self>, route: Option<Route>) {
        if let Some(route) = route {
            ctx.props().on_navigate.emit(route);
        }
    }
}

impl Component for FlatThread {
    type Message = FlatThreadMsg;
    type Properties = FlatThreadProps;

    fn create(ctx: &Context<Self>) -> Self {
        Self::load(ctx);
        Self {
            list: None,
            reply_to: None,
            posting: false,
        }
    }

    fn changed(&mut self, ctx: &Context<Self>, old_props: &Self::Properties) -> bool {
        if ctx.props().root != old_props.root {
            self.list = None;
            self.reply_to = None;
            Self::load(ctx);
        }
        true
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        let api = ctx.props().api.clone();
        let kind = ctx.props().kind;
        if let FlatThreadMsg::Loaded(list, route) = msg {
            if *list.parent() != Parent::from(ctx.props().root.clone()) {
                tracing::debug!(parent = %list.parent(), "dropping thread of a previous root");
                return false;
            }
            Self::route(ctx, route);
            self.list = Some(list);
            return true;
        }
        let list = match self.list.as_mut() {
            Some(list) => list,
            None => return false,
        };
        match msg {
            FlatThreadMsg::Loaded(..) => return false,
            FlatThreadMsg::Like(id) => {
                if !list.begin_like(&id) {
                    return false;
                }
                ctx.link().send_future(async move {
                    let res = api.like_comment(kind, &id).await;
                    FlatThreadMsg::Liked(id, res)
                });
            }
            FlatThreadMsg::Liked(id, res) => Self::route(ctx, list.finish_like(&id, res)),
            FlatThreadMsg::Delete(id) => {
                ctx.link().send_future(async move {
                    let res = api.delete_comment(kind, &id).await;
                    FlatThreadMsg::Deleted(id, res)
                });
                return false;
            }
            FlatThreadMsg::Deleted(id, res) => Self::route(ctx, list.finish_delete(&id, res)),
            FlatThreadMsg::ReplyTo(target) => self.reply_to = target,
            FlatThreadMsg::Post(content) => match ReplyList::compose(&content) {
                Ok(new) => {
                    self.posting = true;
                    let target = self
                        .reply_to
                        .clone()
                        .unwrap_or_else(|| ctx.props().root.clone());
                    ctx.link().send_future(async move {
                        FlatThreadMsg::Posted(api.post_reply(&target, &new).await)
                    });
                }
                Err(err) => Self::route(ctx, list.report(err)),
            },
            FlatThreadMsg::Posted(res) => {
                self.posting = false;
                if res.is_ok() {
                    self.reply_to = None;
                }
                Self::route(ctx, list.finish_post(res));
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let p = ctx.props();
        let list = match &self.list {
            Some(list) => list,
            None => {
                return html! {
                    <div class="spinner-border spinner-border-sm m-2" role="status"></div>
                }
            }
        };

        let tree = ThreadTree::build(&p.root, list.replies().cloned());
        let item = |r: &Reply| {
            let on_reply = p
                .viewer
                .is_some()
                .then(|| ctx.link().callback(|id| FlatThreadMsg::ReplyTo(Some(id))));
            html! {
                <ui::ReplyItem
                    key={ r.id.0.clone() }
                    api={ p.api.clone() }
                    reply={ r.clone() }
                    kind={ p.kind }
                    owner={ p.owner.clone() }
                    viewer={ p.viewer.clone() }
                    depth={ MAX_REPLY_DEPTH }
                    liking={ list.is_liking(&r.id) }
                    can_delete={ can_delete(r, p.viewer.as_ref(), &p.owner) }
                    on_like={ ctx.link().callback(FlatThreadMsg::Like) }
                    on_delete={ ctx.link().callback(FlatThreadMsg::Delete) }
                    on_navigate={ p.on_navigate.clone() }
                    { on_reply }
                />
            }
        };
        let items = tree
            .rows(0)
            .into_iter()
            .map(|row| item(row.reply))
            .chain(tree.orphans.iter().map(&item))
            .collect::<Html>();

        let composer = p.viewer.is_some().then(|| {
            let target = self
                .reply_to
                .as_ref()
                .and_then(|id| list.get(id))
                .map(|r| {
                    html! {
                        <div class="small text-muted">
                            { format!("Replying to @{} ", r.author.username) }
                            <button
                                type="button"
                                class="btn btn-sm btn-link p-0"
                                onclick={ ctx.link().callback(|_| FlatThreadMsg::ReplyTo(None)) }
                            >
                                { "cancel" }
                            </button>
                        </div>
                    }
                });
            html! {<>
                { for target }
                <ui::ReplyComposer
                    on_submit={ ctx.link().callback(FlatThreadMsg::Post) }
                    disabled={ self.posting }
                />
            </>}
        });
        let error = list
            .error()
            .map(|e| html! { <div class="alert alert-warning my-2">{ e }</div> });
        let open = {
            let route = Route::Thread {
                kind: p.kind,
                comment: p.root.clone(),
                owner: p.owner.clone(),
            };
            p.on_navigate.reform(move |_: MouseEvent| route.clone())
        };

        html! {
            <div class="reply-list flat-thread">
                { for composer }
                { for error }
                <ul class="list-group list-group-flush">{ items }</ul>
                <button type="button" class="btn btn-sm btn-link" onclick={ open }>
                    { "Open this thread on its own" }
                </button>
            </div>
        }
    }
}
