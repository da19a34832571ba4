use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap, HashSet},
};

use async_trait::async_trait;
use chrono::Duration;
use fanhub_api::{
    Api, Collection, CollectionId, CommentId, ContentKind, Credentials, Error, ListId, Message,
    NewList, NewReply, NewReview, NewStory, NewUser, Pagination, PasswordReset, PointAction,
    RecommendationList, RepliesPage, Reply, SavedItem, Story, StoryId, Time, User, UserId,
    UserRef, LIKED_MESSAGE,
};

/// In-memory stand-in for the FanHub API
///
/// Every endpoint call is recorded, and failures can be injected per endpoint.
pub struct MockServer(RefCell<State>);

#[derive(Default)]
struct State {
    session: Option<UserId>,
    accounts: BTreeMap<UserId, Account>,
    comments: Vec<Reply>,

    /// Story each top-level comment was posted on
    story_of: HashMap<CommentId, StoryId>,
    comment_likes: HashSet<(UserId, CommentId)>,
    list_likes: HashSet<(UserId, ListId)>,
    collection_likes: HashSet<(UserId, CollectionId)>,
    lists: Vec<RecommendationList>,
    collections: Vec<Collection>,
    stories: Vec<Story>,
    reviews: HashMap<StoryId, Vec<(UserId, NewReview)>>,
    reset_tokens: HashMap<String, UserId>,
    calls: Vec<&'static str>,
    failures: Vec<(&'static str, Error)>,
    clock: i64,
}

struct Account {
    user: User,
    email: String,
    password: String,
}

const ANY_ENDPOINT: &str = "*";

impl State {
    fn record(&mut self, endpoint: &'static str) -> Result<(), Error> {
        self.calls.push(endpoint);
        let injected = self
            .failures
            .iter()
            .position(|(e, _)| *e == endpoint || *e == ANY_ENDPOINT);
        match injected {
            Some(i) => {
                let (_, err) = self.failures.remove(i);
                tracing::debug!(endpoint, ?err, "returning injected failure");
                Err(err)
            }
            None => Ok(()),
        }
    }

    fn tick(&mut self) -> Time {
        self.clock += 1;
        epoch() + Duration::seconds(self.clock)
    }

    fn current_user(&self) -> Result<UserId, Error> {
        self.session
            .clone()
            .ok_or_else(|| Error::rejected(401, "Please log in first"))
    }

    fn account_mut(&mut self, id: &UserId) -> Result<&mut Account, Error> {
        self.accounts
            .get_mut(id)
            .ok_or_else(|| Error::rejected(404, "User not found"))
    }

    fn user_ref(&self, id: &UserId) -> Result<UserRef, Error> {
        self.accounts
            .get(id)
            .map(|a| a.user.to_ref())
            .ok_or_else(|| Error::rejected(404, "User not found"))
    }

    fn list_mut(&mut self, id: &ListId) -> Result<&mut RecommendationList, Error> {
        self.lists
            .iter_mut()
            .find(|l| l.id == *id)
            .ok_or_else(|| Error::rejected(404, "List not found"))
    }

    fn owned_list_mut(&mut self, id: &ListId) -> Result<&mut RecommendationList, Error> {
        let me = self.current_user()?;
        let list = self.list_mut(id)?;
        if list.owner != me {
            return Err(Error::rejected(403, "This list is not yours"));
        }
        Ok(list)
    }

    fn collection_mut(&mut self, id: &CollectionId) -> Result<&mut Collection, Error> {
        self.collections
            .iter_mut()
            .find(|c| c.id == *id)
            .ok_or_else(|| Error::rejected(404, "Collection not found"))
    }

    fn owned_collection_mut(&mut self, id: &CollectionId) -> Result<&mut Collection, Error> {
        let me = self.current_user()?;
        let collection = self.collection_mut(id)?;
        if collection.owner != me {
            return Err(Error::rejected(403, "This collection is not yours"));
        }
        Ok(collection)
    }

    /// One page of `comments`, newest first, flagged for the current viewer
    fn page_of(
        &self,
        mut comments: Vec<Reply>,
        page: u32,
        limit: u32,
    ) -> Result<RepliesPage, Error> {
        if limit == 0 || page == 0 {
            return Err(Error::rejected(400, "page and limit must be positive"));
        }
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = comments.len() as u32;
        let total_pages = std::cmp::max(1, (total + limit - 1) / limit);
        let replies = comments
            .into_iter()
            .skip(((page - 1) * limit) as usize)
            .take(limit as usize)
            .map(|mut r| {
                r.liked_by_current_user = self
                    .session
                    .as_ref()
                    .map(|me| self.comment_likes.contains(&(me.clone(), r.id.clone())))
                    .unwrap_or(false);
                r
            })
            .collect();
        Ok(RepliesPage {
            replies,
            pagination: Pagination { total_pages },
        })
    }

    /// Stores a comment by the logged-in user, resolving its mentions
    fn insert_comment(
        &mut self,
        parent: Option<&CommentId>,
        new: &NewReply,
    ) -> Result<Reply, Error> {
        let me = self.current_user()?;
        if new.content.trim().is_empty() {
            return Err(Error::rejected(400, "Reply cannot be empty"));
        }
        let mentions = new
            .mentions
            .iter()
            .filter_map(|name| {
                self.accounts
                    .values()
                    .find(|a| a.user.username == *name)
                    .map(|a| fanhub_api::Mention {
                        user: a.user.to_ref(),
                    })
            })
            .collect();
        let reply = Reply {
            id: CommentId::fresh(),
            author: self.user_ref(&me)?,
            content: new.content.clone(),
            created_at: self.tick(),
            likes: 0,
            liked_by_current_user: false,
            parent_id: parent.cloned(),
            reply_count: 0,
            mentions,
        };
        self.comments.push(reply.clone());
        Ok(reply)
    }

    fn story_mut(&mut self, id: &StoryId) -> Result<&mut Story, Error> {
        self.stories
            .iter_mut()
            .find(|st| st.id == *id)
            .ok_or_else(|| Error::rejected(404, "Story not found"))
    }
}

fn epoch() -> Time {
    chrono::DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
        .expect("parsing mock epoch")
        .with_timezone(&chrono::Utc)
}

fn message(m: &str) -> Message {
    Message {
        message: String::from(m),
    }
}

fn toggle<T: Eq + std::hash::Hash>(set: &mut HashSet<T>, item: T) -> bool {
    if set.remove(&item) {
        false
    } else {
        set.insert(item);
        true
    }
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer(RefCell::new(State::default()))
    }

    /// Endpoints called so far, in order
    pub fn calls(&self) -> Vec<&'static str> {
        self.0.borrow().calls.clone()
    }

    pub fn count_calls(&self, endpoint: &str) -> usize {
        self.0.borrow().calls.iter().filter(|c| **c == endpoint).count()
    }

    /// The next call to `endpoint` (a method name of `Api`) fails with `err`
    pub fn fail_next_call_to(&self, endpoint: &'static str, err: Error) {
        self.0.borrow_mut().failures.push((endpoint, err));
    }

    /// The next call to any endpoint fails with `err`
    pub fn fail_next(&self, err: Error) {
        self.fail_next_call_to(ANY_ENDPOINT, err);
    }

    pub fn test_create_user(&self, username: &str, email: &str, password: &str) -> UserId {
        let id = UserId::fresh();
        let user = User {
            id: id.clone(),
            username: String::from(username),
            bio: String::new(),
            profile_picture: None,
            counts: Default::default(),
            social_points: Default::default(),
            streak: Default::default(),
            followers: Vec::new(),
            following: Vec::new(),
            reading_list: Vec::new(),
        };
        self.0.borrow_mut().accounts.insert(
            id.clone(),
            Account {
                user,
                email: String::from(email),
                password: String::from(password),
            },
        );
        id
    }

    pub fn test_login_as(&self, user: &UserId) {
        self.0.borrow_mut().session = Some(user.clone());
    }

    pub fn test_user(&self, user: &UserId) -> User {
        self.0
            .borrow()
            .accounts
            .get(user)
            .map(|a| a.user.clone())
            .unwrap_or_else(|| panic!("no user {user} in mock server"))
    }

    /// Creates a comment authored by `author`, one second after the previous one
    pub fn test_create_comment(
        &self,
        author: &UserId,
        content: &str,
        parent: Option<&CommentId>,
    ) -> CommentId {
        let mut s = self.0.borrow_mut();
        let id = CommentId::fresh();
        let reply = Reply {
            id: id.clone(),
            author: s.user_ref(author).expect("comment author must exist"),
            content: String::from(content),
            created_at: s.tick(),
            likes: 0,
            liked_by_current_user: false,
            parent_id: parent.cloned(),
            reply_count: 0,
            mentions: Vec::new(),
        };
        if let Some(p) = parent {
            if let Some(parent) = s.comments.iter_mut().find(|c| c.id == *p) {
                parent.reply_count += 1;
            }
        }
        s.comments.push(reply);
        id
    }

    pub fn test_comment_by_content(&self, content: &str) -> CommentId {
        self.0
            .borrow()
            .comments
            .iter()
            .find(|c| c.content == content)
            .map(|c| c.id.clone())
            .unwrap_or_else(|| panic!("no comment {content:?} in mock server"))
    }

    /// Creates a top-level comment on `story`
    pub fn test_create_story_comment(
        &self,
        author: &UserId,
        story: &StoryId,
        content: &str,
    ) -> CommentId {
        let id = self.test_create_comment(author, content, None);
        let mut s = self.0.borrow_mut();
        s.story_of.insert(id.clone(), story.clone());
        if let Ok(st) = s.story_mut(story) {
            st.comments += 1;
        }
        id
    }

    pub fn test_comment(&self, id: &CommentId) -> Option<Reply> {
        self.0.borrow().comments.iter().find(|c| c.id == *id).cloned()
    }

    pub fn test_create_story(&self, author: &UserId, title: &str) -> StoryId {
        let mut s = self.0.borrow_mut();
        let id = StoryId::fresh();
        let story = Story {
            id: id.clone(),
            title: String::from(title),
            summary: String::new(),
            author: s.user_ref(author).expect("story author must exist"),
            likes: 0,
            comments: 0,
        };
        s.stories.push(story);
        id
    }

    pub fn test_create_list(&self, owner: &UserId, name: &str, stories: &[StoryId]) -> ListId {
        let id = ListId::fresh();
        self.0.borrow_mut().lists.push(RecommendationList {
            id: id.clone(),
            owner: owner.clone(),
            name: String::from(name),
            description: String::new(),
            published: false,
            stories: stories.to_vec(),
            likes: 0,
            comments: 0,
        });
        id
    }

    pub fn test_list(&self, id: &ListId) -> Option<RecommendationList> {
        self.0.borrow().lists.iter().find(|l| l.id == *id).cloned()
    }

    pub fn test_create_collection(
        &self,
        owner: &UserId,
        title: &str,
        stories: &[StoryId],
    ) -> CollectionId {
        let id = CollectionId::fresh();
        self.0.borrow_mut().collections.push(Collection {
            id: id.clone(),
            owner: owner.clone(),
            title: String::from(title),
            stories: stories.to_vec(),
            likes: 0,
            comments: 0,
        });
        id
    }

    pub fn test_issue_reset_token(&self, user: &UserId) -> String {
        let token = fanhub_api::Uuid::new_v4().to_string();
        self.0
            .borrow_mut()
            .reset_tokens
            .insert(token.clone(), user.clone());
        token
    }

    pub fn test_reviews(&self, story: &StoryId) -> usize {
        self.0
            .borrow()
            .reviews
            .get(story)
            .map(|r| r.len())
            .unwrap_or(0)
    }
}

impl Default for MockServer {
    fn default() -> MockServer {
        MockServer::new()
    }
}

#[async_trait(?Send)]
impl Api for MockServer {
    async fn fetch_replies(
        &self,
        comment: &CommentId,
        page: u32,
        limit: u32,
    ) -> Result<RepliesPage, Error> {
        let mut s = self.0.borrow_mut();
        s.record("fetch_replies")?;
        let children = s
            .comments
            .iter()
            .filter(|c| c.parent_id.as_ref() == Some(comment))
            .cloned()
            .collect::<Vec<_>>();
        s.page_of(children, page, limit)
    }

    async fn post_reply(&self, comment: &CommentId, reply: &NewReply) -> Result<Reply, Error> {
        let mut s = self.0.borrow_mut();
        s.record("post_reply")?;
        s.current_user()?;
        if !s.comments.iter().any(|c| c.id == *comment) {
            return Err(Error::rejected(404, "Comment not found"));
        }
        let new = s.insert_comment(Some(comment), reply)?;
        if let Some(parent) = s.comments.iter_mut().find(|c| c.id == *comment) {
            parent.reply_count += 1;
        }
        Ok(new)
    }

    async fn like_comment(&self, _kind: ContentKind, comment: &CommentId) -> Result<Message, Error> {
        let mut s = self.0.borrow_mut();
        s.record("like_comment")?;
        let me = s.current_user()?;
        let now_liked = toggle(&mut s.comment_likes, (me, comment.clone()));
        let c = s
            .comments
            .iter_mut()
            .find(|c| c.id == *comment)
            .ok_or_else(|| Error::rejected(404, "Comment not found"))?;
        if now_liked {
            c.likes += 1;
            Ok(message(LIKED_MESSAGE))
        } else {
            c.likes = c.likes.saturating_sub(1);
            Ok(message("Unliked!"))
        }
    }

    async fn delete_comment(
        &self,
        _kind: ContentKind,
        comment: &CommentId,
    ) -> Result<Message, Error> {
        let mut s = self.0.borrow_mut();
        s.record("delete_comment")?;
        let me = s.current_user()?;
        let idx = s
            .comments
            .iter()
            .position(|c| c.id == *comment)
            .ok_or_else(|| Error::rejected(404, "Comment not found"))?;
        if s.comments[idx].author.id != me {
            return Err(Error::rejected(403, "You can only delete your own comments"));
        }
        s.comments.remove(idx);
        Ok(message("Comment deleted"))
    }

    async fn fetch_user(&self, user: &UserId) -> Result<User, Error> {
        let mut s = self.0.borrow_mut();
        s.record("fetch_user")?;
        Ok(s.account_mut(user)?.user.clone())
    }

    async fn follow(&self, user: &UserId) -> Result<Message, Error> {
        let mut s = self.0.borrow_mut();
        s.record("follow")?;
        let me = s.current_user()?;
        if me == *user {
            return Err(Error::rejected(400, "You cannot follow yourself"));
        }
        let me_ref = s.user_ref(&me)?;
        let them_ref = s.user_ref(user)?;
        let them = s.account_mut(user)?;
        if them.user.followers.iter().any(|f| f.id == me) {
            return Err(Error::rejected(400, "Already following"));
        }
        them.user.followers.push(me_ref);
        them.user.counts.followers += 1;
        let mine = s.account_mut(&me)?;
        mine.user.following.push(them_ref);
        mine.user.counts.following += 1;
        Ok(message("Followed"))
    }

    async fn unfollow(&self, user: &UserId) -> Result<Message, Error> {
        let mut s = self.0.borrow_mut();
        s.record("unfollow")?;
        let me = s.current_user()?;
        let them = s.account_mut(user)?;
        let before = them.user.followers.len();
        them.user.followers.retain(|f| f.id != me);
        if them.user.followers.len() == before {
            return Err(Error::rejected(400, "Not following"));
        }
        them.user.counts.followers = them.user.counts.followers.saturating_sub(1);
        let mine = s.account_mut(&me)?;
        mine.user.following.retain(|f| f.id != *user);
        mine.user.counts.following = mine.user.counts.following.saturating_sub(1);
        Ok(message("Unfollowed"))
    }

    async fn save_to_reading_list(&self, item: &SavedItem) -> Result<Message, Error> {
        let mut s = self.0.borrow_mut();
        s.record("save_to_reading_list")?;
        let me = s.current_user()?;
        s.account_mut(&me)?.user.reading_list.push(item.clone());
        Ok(message("Saved to reading list"))
    }

    async fn remove_from_reading_list(&self, item: &SavedItem) -> Result<Message, Error> {
        let mut s = self.0.borrow_mut();
        s.record("remove_from_reading_list")?;
        let me = s.current_user()?;
        s.account_mut(&me)?.user.reading_list.retain(|i| i != item);
        Ok(message("Removed from reading list"))
    }

    async fn award_points(&self, action: PointAction) -> Result<Message, Error> {
        let mut s = self.0.borrow_mut();
        s.record("award_points")?;
        let me = s.current_user()?;
        let points = &mut s.account_mut(&me)?.user.social_points;
        match action {
            PointAction::Comment => points.comment += 1,
            PointAction::Review => points.review += 1,
            PointAction::Like => points.like += 1,
            PointAction::Read => points.read += 1,
            PointAction::Write => points.write += 1,
        }
        Ok(message("Points awarded"))
    }

    async fn fetch_lists(&self, owner: &UserId) -> Result<Vec<RecommendationList>, Error> {
        let mut s = self.0.borrow_mut();
        s.record("fetch_lists")?;
        Ok(s.lists.iter().filter(|l| l.owner == *owner).cloned().collect())
    }

    async fn create_list(&self, list: &NewList) -> Result<RecommendationList, Error> {
        let mut s = self.0.borrow_mut();
        s.record("create_list")?;
        let me = s.current_user()?;
        list.validate()?;
        let new = RecommendationList {
            id: ListId::fresh(),
            owner: me,
            name: list.name.clone(),
            description: list.description.clone(),
            published: false,
            stories: Vec::new(),
            likes: 0,
            comments: 0,
        };
        s.lists.push(new.clone());
        Ok(new)
    }

    async fn delete_list(&self, list: &ListId) -> Result<Message, Error> {
        let mut s = self.0.borrow_mut();
        s.record("delete_list")?;
        s.owned_list_mut(list)?;
        s.lists.retain(|l| l.id != *list);
        Ok(message("List deleted"))
    }

    async fn add_story_to_list(&self, list: &ListId, story: &StoryId) -> Result<Message, Error> {
        let mut s = self.0.borrow_mut();
        s.record("add_story_to_list")?;
        s.owned_list_mut(list)?.stories.push(story.clone());
        Ok(message("Story added to list"))
    }

    async fn remove_story_from_list(
        &self,
        list: &ListId,
        story: &StoryId,
    ) -> Result<Message, Error> {
        let mut s = self.0.borrow_mut();
        s.record("remove_story_from_list")?;
        s.owned_list_mut(list)?.stories.retain(|st| st != story);
        Ok(message("Story removed from list"))
    }

    async fn set_list_published(
        &self,
        list: &ListId,
        published: bool,
    ) -> Result<Message, Error> {
        let mut s = self.0.borrow_mut();
        s.record("set_list_published")?;
        s.owned_list_mut(list)?.published = published;
        Ok(message(match published {
            true => "List published",
            false => "List unpublished",
        }))
    }

    async fn like_list(&self, list: &ListId) -> Result<Message, Error> {
        let mut s = self.0.borrow_mut();
        s.record("like_list")?;
        let me = s.current_user()?;
        s.list_mut(list)?;
        let now_liked = toggle(&mut s.list_likes, (me, list.clone()));
        let l = s.list_mut(list)?;
        if now_liked {
            l.likes += 1;
            Ok(message(LIKED_MESSAGE))
        } else {
            l.likes = l.likes.saturating_sub(1);
            Ok(message("Unliked!"))
        }
    }

    async fn fetch_collections(&self, owner: &UserId) -> Result<Vec<Collection>, Error> {
        let mut s = self.0.borrow_mut();
        s.record("fetch_collections")?;
        Ok(s.collections
            .iter()
            .filter(|c| c.owner == *owner)
            .cloned()
            .collect())
    }

    async fn add_story_to_collection(
        &self,
        collection: &CollectionId,
        story: &StoryId,
    ) -> Result<Message, Error> {
        let mut s = self.0.borrow_mut();
        s.record("add_story_to_collection")?;
        s.owned_collection_mut(collection)?.stories.push(story.clone());
        Ok(message("Story added to collection"))
    }

    async fn remove_story_from_collection(
        &self,
        collection: &CollectionId,
        story: &StoryId,
    ) -> Result<Message, Error> {
        let mut s = self.0.borrow_mut();
        s.record("remove_story_from_collection")?;
        s.owned_collection_mut(collection)?
            .stories
            .retain(|st| st != story);
        Ok(message("Story removed from collection"))
    }

    async fn like_collection(&self, collection: &CollectionId) -> Result<Message, Error> {
        let mut s = self.0.borrow_mut();
        s.record("like_collection")?;
        let me = s.current_user()?;
        s.collection_mut(collection)?;
        let now_liked = toggle(&mut s.collection_likes, (me, collection.clone()));
        let c = s.collection_mut(collection)?;
        if now_liked {
            c.likes += 1;
            Ok(message(LIKED_MESSAGE))
        } else {
            c.likes = c.likes.saturating_sub(1);
            Ok(message("Unliked!"))
        }
    }

    async fn signup(&self, user: &NewUser) -> Result<User, Error> {
        {
            let mut s = self.0.borrow_mut();
            s.record("signup")?;
            if s.accounts.values().any(|a| a.user.username == user.username) {
                return Err(Error::rejected(400, "Username taken"));
            }
            if s.accounts.values().any(|a| a.email == user.email) {
                return Err(Error::rejected(400, "Email already registered"));
            }
        }
        let id = self.test_create_user(&user.username, &user.email, &user.password);
        Ok(self.test_user(&id))
    }

    async fn login(&self, credentials: &Credentials) -> Result<User, Error> {
        let mut s = self.0.borrow_mut();
        s.record("login")?;
        let user = s
            .accounts
            .values()
            .find(|a| a.email == credentials.email && a.password == credentials.password)
            .map(|a| a.user.clone())
            .ok_or_else(|| Error::rejected(401, "Invalid email or password"))?;
        s.session = Some(user.id.clone());
        Ok(user)
    }

    async fn logout(&self) -> Result<Message, Error> {
        let mut s = self.0.borrow_mut();
        s.record("logout")?;
        s.session = None;
        Ok(message("Logged out"))
    }

    async fn forgot_password(&self, _email: &str) -> Result<Message, Error> {
        let mut s = self.0.borrow_mut();
        s.record("forgot_password")?;
        Ok(message(
            "If an account exists for this email, a reset link has been sent",
        ))
    }

    async fn reset_password(&self, reset: &PasswordReset) -> Result<Message, Error> {
        let mut s = self.0.borrow_mut();
        s.record("reset_password")?;
        let user = s
            .reset_tokens
            .remove(&reset.token)
            .ok_or_else(|| Error::rejected(400, "Reset link is invalid or has expired"))?;
        s.account_mut(&user)?.password = reset.password.clone();
        Ok(message("Password updated"))
    }

    async fn fetch_story(&self, story: &StoryId) -> Result<Story, Error> {
        let mut s = self.0.borrow_mut();
        s.record("fetch_story")?;
        Ok(s.story_mut(story)?.clone())
    }

    async fn fetch_story_comments(
        &self,
        story: &StoryId,
        page: u32,
        limit: u32,
    ) -> Result<RepliesPage, Error> {
        let mut s = self.0.borrow_mut();
        s.record("fetch_story_comments")?;
        s.story_mut(story)?;
        let top = s
            .comments
            .iter()
            .filter(|c| c.parent_id.is_none() && s.story_of.get(&c.id) == Some(story))
            .cloned()
            .collect::<Vec<_>>();
        s.page_of(top, page, limit)
    }

    async fn post_comment(&self, story: &StoryId, comment: &NewReply) -> Result<Reply, Error> {
        let mut s = self.0.borrow_mut();
        s.record("post_comment")?;
        s.current_user()?;
        s.story_mut(story)?;
        let new = s.insert_comment(None, comment)?;
        s.story_of.insert(new.id.clone(), story.clone());
        s.story_mut(story)?.comments += 1;
        Ok(new)
    }

    async fn create_story(&self, story: &NewStory) -> Result<Story, Error> {
        let mut s = self.0.borrow_mut();
        s.record("create_story")?;
        let me = s.current_user()?;
        story.validate()?;
        let new = Story {
            id: StoryId::fresh(),
            title: story.title.clone(),
            summary: story.summary.clone(),
            author: s.user_ref(&me)?,
            likes: 0,
            comments: 0,
        };
        s.stories.push(new.clone());
        s.account_mut(&me)?.user.counts.stories += 1;
        Ok(new)
    }

    async fn create_review(&self, story: &StoryId, review: &NewReview) -> Result<Message, Error> {
        let mut s = self.0.borrow_mut();
        s.record("create_review")?;
        let me = s.current_user()?;
        review.validate()?;
        if !s.stories.iter().any(|st| st.id == *story) {
            return Err(Error::rejected(404, "Story not found"));
        }
        s.reviews
            .entry(story.clone())
            .or_insert_with(Vec::new)
            .push((me, review.clone()));
        Ok(message("Review posted"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn replies_are_paginated_newest_first() {
        let server = MockServer::new();
        let alice = server.test_create_user("alice", "alice@example.org", "password1");
        let root = server.test_create_comment(&alice, "root", None);
        let ids = (0..5)
            .map(|i| server.test_create_comment(&alice, &format!("reply {i}"), Some(&root)))
            .collect::<Vec<_>>();

        let p1 = block_on(server.fetch_replies(&root, 1, 2)).unwrap();
        assert_eq!(p1.pagination.total_pages, 3);
        assert_eq!(
            p1.replies.iter().map(|r| r.id.clone()).collect::<Vec<_>>(),
            vec![ids[4].clone(), ids[3].clone()],
        );
        let p3 = block_on(server.fetch_replies(&root, 3, 2)).unwrap();
        assert_eq!(p3.replies.len(), 1);
        assert_eq!(server.count_calls("fetch_replies"), 2);
    }

    #[test]
    fn injected_failure_is_one_shot() {
        let server = MockServer::new();
        let alice = server.test_create_user("alice", "alice@example.org", "password1");
        server.fail_next_call_to("fetch_user", Error::Server(String::from("boom")));
        assert_eq!(
            block_on(server.fetch_user(&alice)),
            Err(Error::Server(String::from("boom")))
        );
        assert!(block_on(server.fetch_user(&alice)).is_ok());
    }

    #[test]
    fn reply_mentions_are_resolved() {
        let server = MockServer::new();
        let alice = server.test_create_user("alice", "alice@example.org", "password1");
        server.test_create_user("bob", "bob@example.org", "password2");
        let root = server.test_create_comment(&alice, "root", None);
        server.test_login_as(&alice);
        let reply = block_on(server.post_reply(
            &root,
            &NewReply {
                content: String::from("hey @bob and @nobody"),
                mentions: vec![String::from("bob"), String::from("nobody")],
            },
        ))
        .unwrap();
        assert_eq!(reply.mentions.len(), 1);
        assert_eq!(reply.mentions[0].user.username, "bob");
        assert_eq!(server.test_comment(&root).unwrap().reply_count, 1);
    }

    #[test]
    fn story_comments_are_top_level_only() {
        let server = MockServer::new();
        let alice = server.test_create_user("alice", "alice@example.org", "password1");
        let story = server.test_create_story(&alice, "Tides");
        let other = server.test_create_story(&alice, "Ebb");
        let first = server.test_create_story_comment(&alice, &story, "first");
        server.test_create_comment(&alice, "a reply", Some(&first));
        server.test_create_story_comment(&alice, &other, "elsewhere");
        server.test_login_as(&alice);
        let posted = block_on(server.post_comment(
            &story,
            &NewReply {
                content: String::from("second"),
                mentions: Vec::new(),
            },
        ))
        .unwrap();
        assert_eq!(posted.parent_id, None);

        let page = block_on(server.fetch_story_comments(&story, 1, 10)).unwrap();
        assert_eq!(
            page.replies.iter().map(|r| r.content.as_str()).collect::<Vec<_>>(),
            vec!["second", "first"],
        );
        assert_eq!(block_on(server.fetch_story(&story)).unwrap().comments, 2);
        assert_eq!(
            block_on(server.fetch_story_comments(&StoryId::from("nope"), 1, 10)),
            Err(Error::rejected(404, "Story not found")),
        );
    }
}
