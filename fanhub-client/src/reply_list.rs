use std::{
    collections::{HashSet, VecDeque},
    fmt,
};

use crate::{
    api::{
        Api, CommentId, ContentKind, Error, Message, NewReply, Reaction, RepliesPage, Reply,
        StoryId,
    },
    mention, KeyedList, Route,
};

pub const REPLIES_PER_PAGE: u32 = 5;

/// What a reply list hangs off
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Parent {
    /// Top-level comments of a story
    Story(StoryId),
    Comment(CommentId),
}

impl Parent {
    pub async fn fetch<A: Api + ?Sized>(
        &self,
        api: &A,
        page: u32,
        limit: u32,
    ) -> Result<RepliesPage, Error> {
        match self {
            Parent::Story(story) => api.fetch_story_comments(story, page, limit).await,
            Parent::Comment(comment) => api.fetch_replies(comment, page, limit).await,
        }
    }

    pub async fn post<A: Api + ?Sized>(&self, api: &A, new: &NewReply) -> Result<Reply, Error> {
        match self {
            Parent::Story(story) => api.post_comment(story, new).await,
            Parent::Comment(comment) => api.post_reply(comment, new).await,
        }
    }
}

impl From<CommentId> for Parent {
    fn from(c: CommentId) -> Parent {
        Parent::Comment(c)
    }
}

impl From<StoryId> for Parent {
    fn from(s: StoryId) -> Parent {
        Parent::Story(s)
    }
}

impl fmt::Display for Parent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parent::Story(s) => write!(f, "story {s}"),
            Parent::Comment(c) => write!(f, "comment {c}"),
        }
    }
}

/// Token for one page fetch; responses are only applied if it is still current
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PageRequest {
    pub parent: Parent,
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub async fn send<A: Api + ?Sized>(&self, api: &A) -> Result<RepliesPage, Error> {
        self.parent.fetch(api, self.page, self.limit).await
    }
}

/// Paginated replies of one parent comment
///
/// Mutating methods that can fail return `Some(route)` when the failure is
/// fatal and the UI must switch to the error page. Other failures are kept in
/// `error()` for inline display.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReplyList {
    parent: Parent,
    page: u32,
    total_pages: u32,
    items: KeyedList<Reply>,
    loading: bool,
    error: Option<String>,
    liking: HashSet<CommentId>,
}

impl ReplyList {
    pub fn new(parent: impl Into<Parent>) -> ReplyList {
        ReplyList {
            parent: parent.into(),
            page: 1,
            total_pages: 0,
            items: KeyedList::new(),
            loading: false,
            error: None,
            liking: HashSet::new(),
        }
    }

    pub fn parent(&self) -> &Parent {
        &self.parent
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn has_more(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn replies(&self) -> impl Iterator<Item = &Reply> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &CommentId) -> Option<&Reply> {
        self.items.get(id)
    }

    /// Switches to another parent, resetting the cursor; returns the fetch to run
    pub fn set_parent(&mut self, parent: impl Into<Parent>) -> Option<PageRequest> {
        let parent = parent.into();
        if parent == self.parent {
            return None;
        }
        tracing::debug!(from = %self.parent, to = %parent, "reply list parent changed");
        *self = ReplyList::new(parent);
        Some(self.begin_fetch())
    }

    pub fn begin_fetch(&mut self) -> PageRequest {
        self.loading = true;
        self.error = None;
        PageRequest {
            parent: self.parent.clone(),
            page: self.page,
            limit: REPLIES_PER_PAGE,
        }
    }

    /// Moves to the next page if there is one and nothing is loading
    pub fn load_more(&mut self) -> Option<PageRequest> {
        if self.loading || !self.has_more() {
            return None;
        }
        self.page += 1;
        Some(self.begin_fetch())
    }

    pub fn apply(
        &mut self,
        req: &PageRequest,
        res: Result<RepliesPage, Error>,
    ) -> Option<Route> {
        if req.parent != self.parent || req.page != self.page {
            tracing::warn!(
                ?req,
                parent = %self.parent,
                page = self.page,
                "discarding stale reply page"
            );
            return None;
        }
        self.loading = false;
        match res {
            Ok(page) => {
                if req.page == 1 {
                    self.items = page.replies.into_iter().collect();
                } else {
                    let added = self.items.extend(page.replies);
                    tracing::debug!(page = req.page, added, "appended reply page");
                }
                self.total_pages = page.pagination.total_pages;
                None
            }
            Err(err) => {
                // let the next load_more retry the same page
                if req.page > 1 {
                    self.page = req.page - 1;
                }
                self.report(err)
            }
        }
    }

    /// Adds a reply created elsewhere at the front, unless already listed
    pub fn inject(&mut self, reply: Reply) -> bool {
        self.items.push_front(reply)
    }

    pub fn remove(&mut self, id: &CommentId) -> Option<Reply> {
        self.items.remove(id)
    }

    pub fn is_liking(&self, id: &CommentId) -> bool {
        self.liking.contains(id)
    }

    /// Marks `id` as having a like call in flight; false if one already is
    pub fn begin_like(&mut self, id: &CommentId) -> bool {
        self.liking.insert(id.clone())
    }

    pub fn finish_like(&mut self, id: &CommentId, res: Result<Message, Error>) -> Option<Route> {
        self.liking.remove(id);
        match res {
            Ok(m) => {
                match self.items.get_mut(id) {
                    Some(r) => r.apply_like_response(&m.message),
                    None => tracing::warn!(%id, "like answered for a reply no longer listed"),
                }
                None
            }
            Err(err) => self.report(err),
        }
    }

    pub fn finish_delete(&mut self, id: &CommentId, res: Result<Message, Error>) -> Option<Route> {
        match res {
            Ok(_) => {
                self.remove(id);
                None
            }
            Err(err) => self.report(err),
        }
    }

    /// Builds the request for a new reply under this list's parent
    pub fn compose(content: &str) -> Result<NewReply, Error> {
        let content = content.trim();
        if content.is_empty() {
            return Err(Error::rejected(400, "Reply cannot be empty"));
        }
        Ok(NewReply {
            content: content.to_string(),
            mentions: mention::mentioned_usernames(content),
        })
    }

    pub fn finish_post(&mut self, res: Result<Reply, Error>) -> Option<Route> {
        match res {
            Ok(reply) => {
                self.inject(reply);
                None
            }
            Err(err) => self.report(err),
        }
    }

    /// Records a failure for inline display, or returns the error page to show
    pub fn report(&mut self, err: Error) -> Option<Route> {
        match err.reaction() {
            Reaction::Inline(message) => {
                tracing::debug!(?err, "reply list error");
                self.error = Some(message);
                None
            }
            Reaction::ErrorPage(message) => {
                tracing::error!(?err, "fatal error in reply list");
                Some(Route::error(message))
            }
        }
    }
}

/// Request/response helpers for callers that can hold the list across awaits
impl ReplyList {
    pub async fn load<A: Api + ?Sized>(&mut self, api: &A) -> Option<Route> {
        let req = self.begin_fetch();
        let res = req.send(api).await;
        self.apply(&req, res)
    }

    pub async fn load_next<A: Api + ?Sized>(&mut self, api: &A) -> Option<Route> {
        let req = self.load_more()?;
        let res = req.send(api).await;
        self.apply(&req, res)
    }

    /// Loads every page, stopping at the first failure
    pub async fn load_all<A: Api + ?Sized>(&mut self, api: &A) -> Option<Route> {
        if let Some(route) = self.load(api).await {
            return Some(route);
        }
        while self.has_more() && self.error.is_none() {
            if let Some(route) = self.load_next(api).await {
                return Some(route);
            }
        }
        None
    }

    /// Loads the parent's replies and, breadth-first, all their descendants
    ///
    /// Every reply of the subtree ends up in this list; `ThreadTree` puts them
    /// back in shape.
    pub async fn load_subtree<A: Api + ?Sized>(&mut self, api: &A) -> Option<Route> {
        if let Some(route) = self.load_all(api).await {
            return Some(route);
        }
        let mut todo = self
            .items
            .iter()
            .filter(|r| r.reply_count > 0)
            .map(|r| r.id.clone())
            .collect::<VecDeque<_>>();
        while self.error.is_none() {
            let parent = match todo.pop_front() {
                Some(p) => p,
                None => break,
            };
            let mut below = ReplyList::new(parent.clone());
            if let Some(route) = below.load_all(api).await {
                return Some(route);
            }
            if let Some(err) = below.error.take() {
                tracing::warn!(%parent, %err, "could not load part of the thread");
                self.error = Some(err);
                break;
            }
            todo.extend(
                below
                    .replies()
                    .filter(|r| r.reply_count > 0)
                    .map(|r| r.id.clone()),
            );
            let added = self.items.extend(below.items.to_vec());
            tracing::debug!(%parent, added, "loaded nested replies");
        }
        None
    }

    pub async fn like<A: Api + ?Sized>(
        &mut self,
        api: &A,
        kind: ContentKind,
        id: &CommentId,
    ) -> Option<Route> {
        if !self.begin_like(id) {
            return None;
        }
        let res = api.like_comment(kind, id).await;
        self.finish_like(id, res)
    }

    pub async fn delete<A: Api + ?Sized>(
        &mut self,
        api: &A,
        kind: ContentKind,
        id: &CommentId,
    ) -> Option<Route> {
        let res = api.delete_comment(kind, id).await;
        self.finish_delete(id, res)
    }

    pub async fn post<A: Api + ?Sized>(&mut self, api: &A, content: &str) -> Option<Route> {
        let new = match ReplyList::compose(content) {
            Ok(new) => new,
            Err(err) => return self.report(err),
        };
        let res = self.parent.post(api, &new).await;
        self.finish_post(res)
    }

    /// Posts under `target`, a reply already in this list, and lists the answer
    pub async fn post_under<A: Api + ?Sized>(
        &mut self,
        api: &A,
        target: &CommentId,
        content: &str,
    ) -> Option<Route> {
        let new = match ReplyList::compose(content) {
            Ok(new) => new,
            Err(err) => return self.report(err),
        };
        let res = api.post_reply(target, &new).await;
        self.finish_post(res)
    }
}

/// Whether `user` may delete `reply` on content owned by `content_owner`
pub fn can_delete(
    reply: &Reply,
    user: Option<&crate::api::UserId>,
    content_owner: &crate::api::UserId,
) -> bool {
    match user {
        Some(u) => *u == reply.author.id || u == content_owner,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::{Pagination, UserId, CONNECTIVITY_MESSAGE},
        ThreadTree, MAX_REPLY_DEPTH,
    };
    use fanhub_mock_server::MockServer;
    use futures::executor::block_on;

    struct Fixture {
        server: MockServer,
        alice: UserId,
        root: CommentId,
    }

    fn fixture(num_replies: usize) -> Fixture {
        let server = MockServer::new();
        let alice = server.test_create_user("alice", "alice@example.org", "password1");
        let root = server.test_create_comment(&alice, "root comment", None);
        for i in 0..num_replies {
            server.test_create_comment(&alice, &format!("reply {i}"), Some(&root));
        }
        server.test_login_as(&alice);
        Fixture {
            server,
            alice,
            root,
        }
    }

    fn contents(l: &ReplyList) -> Vec<String> {
        l.replies().map(|r| r.content.clone()).collect()
    }

    #[test]
    fn first_page_then_more() {
        let f = fixture(7);
        let mut l = ReplyList::new(f.root.clone());
        assert_eq!(block_on(l.load(&f.server)), None);
        assert_eq!(l.len(), 5);
        assert_eq!(l.total_pages(), 2);
        assert!(l.has_more());

        assert_eq!(block_on(l.load_next(&f.server)), None);
        assert_eq!(l.len(), 7);
        assert!(!l.has_more());
        assert!(!l.is_loading());

        // nothing left to load: no request is issued
        assert_eq!(block_on(l.load_next(&f.server)), None);
        assert_eq!(f.server.count_calls("fetch_replies"), 2);
    }

    #[test]
    fn overlapping_page_is_deduplicated() {
        let f = fixture(10);
        let mut l = ReplyList::new(f.root.clone());
        block_on(l.load(&f.server));
        let last_of_first_page = contents(&l)[4].clone();

        // a new reply shifts every page by one: page 2 now starts with page 1's last item
        f.server.test_create_comment(&f.alice, "brand new", Some(&f.root));
        block_on(l.load_next(&f.server));

        let all = contents(&l);
        assert_eq!(all.len(), 9);
        assert_eq!(
            all.iter().filter(|c| **c == last_of_first_page).count(),
            1
        );
    }

    #[test]
    fn parent_change_resets_before_fetch_resolves() {
        let f = fixture(7);
        let other = f.server.test_create_comment(&f.alice, "other root", None);
        f.server.test_create_comment(&f.alice, "other reply", Some(&other));

        let mut l = ReplyList::new(f.root.clone());
        block_on(l.load(&f.server));
        block_on(l.load_next(&f.server));
        assert_eq!(l.page(), 2);

        let req = l.set_parent(other.clone()).expect("parent changed");
        assert_eq!(l.page(), 1);
        assert!(l.is_empty());
        assert!(l.is_loading());
        assert_eq!(req.page, 1);

        let res = block_on(req.send(&f.server));
        l.apply(&req, res);
        assert_eq!(contents(&l), vec![String::from("other reply")]);

        assert_eq!(l.set_parent(other), None);
    }

    #[test]
    fn stale_response_is_discarded() {
        let f = fixture(3);
        let other = f.server.test_create_comment(&f.alice, "other root", None);
        let mut l = ReplyList::new(f.root.clone());
        let stale = l.begin_fetch();
        let new_req = l.set_parent(other).unwrap();
        let res = block_on(stale.send(&f.server));
        assert_eq!(l.apply(&stale, res), None);
        assert!(l.is_empty());
        assert!(l.is_loading());
        let res = block_on(new_req.send(&f.server));
        l.apply(&new_req, res);
        assert!(!l.is_loading());
    }

    #[test]
    fn rejected_fetch_is_inline() {
        let f = fixture(3);
        let mut l = ReplyList::new(f.root.clone());
        f.server.fail_next_call_to("fetch_replies", Error::rejected(403, "Comments are private"));
        assert_eq!(block_on(l.load(&f.server)), None);
        assert_eq!(l.error(), Some("Comments are private"));
        assert!(!l.is_loading());

        // the error is cleared by the next attempt
        block_on(l.load(&f.server));
        assert_eq!(l.error(), None);
        assert_eq!(l.len(), 3);
    }

    #[test]
    fn fatal_fetch_routes_to_error_page() {
        let f = fixture(3);
        let mut l = ReplyList::new(f.root.clone());
        f.server.fail_next(Error::Server(String::from("database unavailable")));
        assert_eq!(
            block_on(l.load(&f.server)),
            Some(Route::error("database unavailable"))
        );
        assert_eq!(l.error(), None);

        f.server.fail_next(Error::Network(String::from("offline")));
        assert_eq!(
            block_on(l.load(&f.server)),
            Some(Route::error(CONNECTIVITY_MESSAGE))
        );
    }

    #[test]
    fn failed_next_page_can_be_retried() {
        let f = fixture(7);
        let mut l = ReplyList::new(f.root.clone());
        block_on(l.load(&f.server));
        f.server.fail_next(Error::rejected(429, "Slow down"));
        block_on(l.load_next(&f.server));
        assert_eq!(l.page(), 1);
        assert_eq!(l.error(), Some("Slow down"));
        block_on(l.load_next(&f.server));
        assert_eq!(l.page(), 2);
        assert_eq!(l.len(), 7);
    }

    #[test]
    fn injected_reply_goes_first_once() {
        let f = fixture(2);
        let mut l = ReplyList::new(f.root.clone());
        block_on(l.load(&f.server));
        let first = l.replies().next().unwrap().clone();
        assert!(!l.inject(first));

        assert_eq!(block_on(l.post(&f.server, "hello @alice")), None);
        let posted = l.replies().next().unwrap();
        assert_eq!(posted.content, "hello @alice");
        assert_eq!(posted.mentions[0].user.id, f.alice);
        assert_eq!(l.len(), 3);
    }

    #[test]
    fn empty_reply_is_refused_locally() {
        let f = fixture(0);
        let mut l = ReplyList::new(f.root.clone());
        assert_eq!(block_on(l.post(&f.server, "   ")), None);
        assert_eq!(l.error(), Some("Reply cannot be empty"));
        assert_eq!(f.server.count_calls("post_reply"), 0);
    }

    #[test]
    fn like_toggles_after_server_answer() {
        let f = fixture(2);
        let mut l = ReplyList::new(f.root.clone());
        block_on(l.load(&f.server));
        let id = l.replies().next().unwrap().id.clone();

        block_on(l.like(&f.server, ContentKind::Story, &id));
        let r = l.get(&id).unwrap();
        assert_eq!((r.likes, r.liked_by_current_user), (1, true));

        block_on(l.like(&f.server, ContentKind::Story, &id));
        let r = l.get(&id).unwrap();
        assert_eq!((r.likes, r.liked_by_current_user), (0, false));
    }

    #[test]
    fn like_in_flight_is_per_reply() {
        let f = fixture(2);
        let mut l = ReplyList::new(f.root.clone());
        block_on(l.load(&f.server));
        let ids = l.replies().map(|r| r.id.clone()).collect::<Vec<_>>();

        assert!(l.begin_like(&ids[0]));
        assert!(!l.begin_like(&ids[0]));
        assert!(l.begin_like(&ids[1]));
        assert!(l.is_liking(&ids[0]) && l.is_liking(&ids[1]));

        let msg = Message {
            message: String::from("Liked!"),
        };
        l.finish_like(&ids[1], Ok(msg));
        assert!(!l.is_liking(&ids[1]));
        assert!(l.is_liking(&ids[0]));
        assert_eq!(l.get(&ids[1]).unwrap().likes, 1);
        assert_eq!(l.get(&ids[0]).unwrap().likes, 0);
    }

    #[test]
    fn delete_evicts_only_on_success() {
        let f = fixture(2);
        let bob = f.server.test_create_user("bob", "bob@example.org", "password2");
        let mut l = ReplyList::new(f.root.clone());
        block_on(l.load(&f.server));
        let id = l.replies().next().unwrap().id.clone();

        f.server.test_login_as(&bob);
        block_on(l.delete(&f.server, ContentKind::Post, &id));
        assert!(l.get(&id).is_some());
        assert_eq!(l.error(), Some("You can only delete your own comments"));

        f.server.test_login_as(&f.alice);
        block_on(l.delete(&f.server, ContentKind::Post, &id));
        assert!(l.get(&id).is_none());
        assert_eq!(l.len(), 1);
    }

    #[test]
    fn delete_permission() {
        let f = fixture(1);
        let mut l = ReplyList::new(f.root.clone());
        block_on(l.load(&f.server));
        let reply = l.replies().next().unwrap();
        let owner = UserId::from("content-owner");
        let stranger = UserId::from("stranger");
        assert!(can_delete(reply, Some(&f.alice), &owner));
        assert!(can_delete(reply, Some(&owner), &owner));
        assert!(!can_delete(reply, Some(&stranger), &owner));
        assert!(!can_delete(reply, None, &owner));
    }

    #[test]
    fn story_parent_lists_top_level_comments() {
        let f = fixture(2);
        let story = f.server.test_create_story(&f.alice, "Tides");
        f.server.test_create_story_comment(&f.alice, &story, "loved it");
        let mut l = ReplyList::new(story.clone());
        assert_eq!(block_on(l.load(&f.server)), None);
        assert_eq!(contents(&l), vec![String::from("loved it")]);
        assert_eq!(f.server.count_calls("fetch_story_comments"), 1);

        assert_eq!(block_on(l.post(&f.server, "me too")), None);
        let posted = l.replies().next().unwrap();
        assert_eq!(posted.parent_id, None);
        assert_eq!(l.len(), 2);

        // switching from a story to a comment is a parent change like any other
        assert!(l.set_parent(f.root.clone()).is_some());
        assert!(l.is_empty());
    }

    #[test]
    fn subtree_gathers_every_level_and_page() {
        let f = fixture(6);
        // root <- "reply 0" <- a <- b <- c, deeper than any display cutoff
        let first = f.server.test_comment_by_content("reply 0");
        let a = f.server.test_create_comment(&f.alice, "a", Some(&first));
        let b = f.server.test_create_comment(&f.alice, "b", Some(&a));
        f.server.test_create_comment(&f.alice, "c", Some(&b));

        let mut l = ReplyList::new(f.root.clone());
        assert_eq!(block_on(l.load_subtree(&f.server)), None);
        assert_eq!(l.error(), None);
        assert_eq!(l.len(), 9);
        assert!(!l.has_more());

        let tree = ThreadTree::build(&f.root, l.replies().cloned());
        assert!(tree.orphans.is_empty());
        let depths = tree
            .rows(MAX_REPLY_DEPTH)
            .iter()
            .filter(|r| ["a", "b", "c"].contains(&r.reply.content.as_str()))
            .map(|r| r.depth)
            .collect::<Vec<_>>();
        assert_eq!(depths, vec![1, 2, 3]);
    }

    #[test]
    fn subtree_stops_at_first_failure() {
        let f = fixture(2);
        let first = f.server.test_comment_by_content("reply 0");
        f.server.test_create_comment(&f.alice, "nested", Some(&first));
        let mut l = ReplyList::new(f.root.clone());
        f.server.fail_next_call_to("fetch_replies", Error::rejected(403, "Hidden"));
        assert_eq!(block_on(l.load_subtree(&f.server)), None);
        assert_eq!(l.error(), Some("Hidden"));
        assert_eq!(f.server.count_calls("fetch_replies"), 1);

        let mut l = ReplyList::new(f.root.clone());
        block_on(l.load(&f.server));
        f.server.fail_next(Error::Server(String::from("down")));
        assert_eq!(
            block_on(l.load_subtree(&f.server)),
            Some(Route::error("down"))
        );
    }

    #[test]
    fn post_under_a_listed_reply() {
        let f = fixture(1);
        let mut l = ReplyList::new(f.root.clone());
        block_on(l.load_subtree(&f.server));
        let target = l.replies().next().unwrap().id.clone();
        assert_eq!(block_on(l.post_under(&f.server, &target, "deeper")), None);
        let posted = l.replies().next().unwrap();
        assert_eq!(posted.parent_id, Some(target.clone()));
        assert_eq!(f.server.test_comment(&target).unwrap().reply_count, 1);
    }

    #[test]
    fn apply_takes_total_pages_from_response() {
        let mut l = ReplyList::new(CommentId::from("c"));
        let req = l.begin_fetch();
        l.apply(
            &req,
            Ok(RepliesPage {
                replies: Vec::new(),
                pagination: Pagination { total_pages: 4 },
            }),
        );
        assert_eq!(l.total_pages(), 4);
        assert!(l.has_more());
    }
}
