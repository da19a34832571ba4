use crate::{CommentId, Time, UserRef};

/// The message the like endpoint answers with when the like was recorded
///
/// Any other message means the like was removed.
pub const LIKED_MESSAGE: &str = "Liked!";

/// One resolved `@username` occurrence in a comment
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Mention {
    pub user: UserRef,
}

/// Comments and replies share this shape; top-level comments have no parent
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub id: CommentId,
    pub author: UserRef,
    pub content: String,
    pub created_at: Time,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub liked_by_current_user: bool,
    #[serde(default)]
    pub parent_id: Option<CommentId>,
    #[serde(default)]
    pub reply_count: u32,
    #[serde(default)]
    pub mentions: Vec<Mention>,
}

impl Reply {
    /// Applies the like endpoint's answer: no local change happens before it
    pub fn apply_like_response(&mut self, message: &str) {
        if message == LIKED_MESSAGE {
            self.likes += 1;
            self.liked_by_current_user = true;
        } else {
            self.likes = self.likes.saturating_sub(1);
            self.liked_by_current_user = false;
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total_pages: u32,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct RepliesPage {
    pub replies: Vec<Reply>,
    pub pagination: Pagination,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewReply {
    pub content: String,

    /// Usernames mentioned in `content`, for the server to resolve
    pub mentions: Vec<String>,
}

/// What a comment hangs off; selects the endpoint family for likes and deletes
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Story,
    Collection,
    Post,
    Tweet,
    Recommendation,
}

impl ContentKind {
    pub fn path_segment(&self) -> &'static str {
        match self {
            ContentKind::Story => "stories",
            ContentKind::Collection => "collections",
            ContentKind::Post => "posts",
            ContentKind::Tweet => "tweets",
            ContentKind::Recommendation => "recommendations",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UserId;

    fn reply(likes: u32, liked: bool) -> Reply {
        Reply {
            id: CommentId::from("r1"),
            author: UserRef {
                id: UserId::from("u1"),
                username: String::from("alice"),
                profile_picture: None,
            },
            content: String::from("hello"),
            created_at: chrono::Utc::now(),
            likes,
            liked_by_current_user: liked,
            parent_id: None,
            reply_count: 0,
            mentions: Vec::new(),
        }
    }

    #[test]
    fn liked_message_increments() {
        let mut r = reply(3, false);
        r.apply_like_response("Liked!");
        assert_eq!((r.likes, r.liked_by_current_user), (4, true));
    }

    #[test]
    fn other_message_decrements() {
        let mut r = reply(3, false);
        r.apply_like_response("Unliked!");
        assert_eq!((r.likes, r.liked_by_current_user), (2, false));

        let mut r = reply(0, true);
        r.apply_like_response("Like removed");
        assert_eq!((r.likes, r.liked_by_current_user), (0, false));
    }

    #[test]
    fn parses_server_page() {
        let page: RepliesPage = serde_json::from_str(
            r#"{
                "replies": [{
                    "id": "c2",
                    "author": {"id": "u1", "username": "alice"},
                    "content": "hi @bob",
                    "createdAt": "2024-03-01T10:00:00Z",
                    "likes": 2,
                    "likedByCurrentUser": true,
                    "parentId": "c1",
                    "mentions": [{"user": {"id": "u2", "username": "bob"}}]
                }],
                "pagination": {"totalPages": 3}
            }"#,
        )
        .unwrap();
        assert_eq!(page.pagination.total_pages, 3);
        assert_eq!(page.replies[0].parent_id, Some(CommentId::from("c1")));
        assert_eq!(page.replies[0].mentions[0].user.username, "bob");
        assert_eq!(page.replies[0].reply_count, 0);
    }
}
