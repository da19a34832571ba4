use async_trait::async_trait;
use chrono::Utc;
use std::fmt;

pub use uuid::Uuid;
pub type Time = chrono::DateTime<Utc>;

mod auth;
pub use auth::{Credentials, NewUser, PasswordReset, PointAction};

mod comment;
pub use comment::{ContentKind, Mention, NewReply, Pagination, RepliesPage, Reply, LIKED_MESSAGE};

mod error;
pub use error::{Error, Reaction, CONNECTIVITY_MESSAGE, DEFAULT_SERVER_MESSAGE};

mod story;
pub use story::{
    Collection, NewList, NewReview, NewStory, RecommendationList, Story, Upload,
};

mod user;
pub use user::{SavedItem, SavedKind, SocialPoints, Streak, User, UserCounts, UserRef};

macro_rules! id_type {
    ($name:ident) => {
        #[derive(
            Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// A never-before-seen identifier, for servers and tests
            pub fn fresh() -> $name {
                $name(Uuid::new_v4().to_string())
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> $name {
                $name(String::from(s))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_type!(UserId);
id_type!(CommentId);
id_type!(StoryId);
id_type!(CollectionId);
id_type!(ListId);

/// Server answer carrying only a human-readable status
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Message {
    pub message: String,
}

/// Every endpoint of the external API this client consumes
///
/// Futures are not `Send`: in the browser they wrap `fetch` promises.
#[async_trait(?Send)]
pub trait Api {
    // Comments and replies
    async fn fetch_replies(
        &self,
        comment: &CommentId,
        page: u32,
        limit: u32,
    ) -> Result<RepliesPage, Error>;
    async fn post_reply(&self, comment: &CommentId, reply: &NewReply) -> Result<Reply, Error>;
    async fn like_comment(&self, kind: ContentKind, comment: &CommentId) -> Result<Message, Error>;
    async fn delete_comment(
        &self,
        kind: ContentKind,
        comment: &CommentId,
    ) -> Result<Message, Error>;

    // Users
    async fn fetch_user(&self, user: &UserId) -> Result<User, Error>;
    async fn follow(&self, user: &UserId) -> Result<Message, Error>;
    async fn unfollow(&self, user: &UserId) -> Result<Message, Error>;
    async fn save_to_reading_list(&self, item: &SavedItem) -> Result<Message, Error>;
    async fn remove_from_reading_list(&self, item: &SavedItem) -> Result<Message, Error>;
    async fn award_points(&self, action: PointAction) -> Result<Message, Error>;

    // Recommendation lists
    async fn fetch_lists(&self, owner: &UserId) -> Result<Vec<RecommendationList>, Error>;
    async fn create_list(&self, list: &NewList) -> Result<RecommendationList, Error>;
    async fn delete_list(&self, list: &ListId) -> Result<Message, Error>;
    async fn add_story_to_list(&self, list: &ListId, story: &StoryId) -> Result<Message, Error>;
    async fn remove_story_from_list(
        &self,
        list: &ListId,
        story: &StoryId,
    ) -> Result<Message, Error>;
    async fn set_list_published(&self, list: &ListId, published: bool)
        -> Result<Message, Error>;
    async fn like_list(&self, list: &ListId) -> Result<Message, Error>;

    // Collections
    async fn fetch_collections(&self, owner: &UserId) -> Result<Vec<Collection>, Error>;
    async fn add_story_to_collection(
        &self,
        collection: &CollectionId,
        story: &StoryId,
    ) -> Result<Message, Error>;
    async fn remove_story_from_collection(
        &self,
        collection: &CollectionId,
        story: &StoryId,
    ) -> Result<Message, Error>;
    async fn like_collection(&self, collection: &CollectionId) -> Result<Message, Error>;

    // Accounts
    async fn signup(&self, user: &NewUser) -> Result<User, Error>;
    async fn login(&self, credentials: &Credentials) -> Result<User, Error>;
    async fn logout(&self) -> Result<Message, Error>;
    async fn forgot_password(&self, email: &str) -> Result<Message, Error>;
    async fn reset_password(&self, reset: &PasswordReset) -> Result<Message, Error>;

    // Stories
    async fn fetch_story(&self, story: &StoryId) -> Result<Story, Error>;

    /// Top-level comments of a story, newest first
    async fn fetch_story_comments(
        &self,
        story: &StoryId,
        page: u32,
        limit: u32,
    ) -> Result<RepliesPage, Error>;
    async fn post_comment(&self, story: &StoryId, comment: &NewReply) -> Result<Reply, Error>;
    async fn create_story(&self, story: &NewStory) -> Result<Story, Error>;
    async fn create_review(&self, story: &StoryId, review: &NewReview) -> Result<Message, Error>;
}
