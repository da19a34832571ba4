use anyhow::Context;
use async_trait::async_trait;
use reqwest::{multipart, Method, RequestBuilder};
use serde_json::json;

use crate::api::{
    Api, Collection, CollectionId, CommentId, ContentKind, Credentials, Error, ListId, Message,
    NewList, NewReply, NewReview, NewStory, NewUser, Pagination, PasswordReset, PointAction,
    RecommendationList, RepliesPage, Reply, SavedItem, Story, StoryId, User, UserId,
};

/// `Api` over HTTP against a FanHub server
///
/// The session lives in a cookie: the browser's when running as wasm, a cookie
/// jar owned by the client otherwise.
#[derive(Clone, Debug)]
pub struct HttpApi {
    host: String,
    client: reqwest::Client,
}

#[derive(serde::Deserialize)]
struct ReplyBody {
    reply: Reply,
}

#[derive(serde::Deserialize)]
struct CommentBody {
    comment: Reply,
}

#[derive(serde::Deserialize)]
struct CommentsBody {
    comments: Vec<Reply>,
    pagination: Pagination,
}

#[derive(serde::Deserialize)]
struct UserBody {
    user: User,
}

#[derive(serde::Deserialize)]
struct ListBody {
    list: RecommendationList,
}

#[derive(serde::Deserialize)]
struct ListsBody {
    lists: Vec<RecommendationList>,
}

#[derive(serde::Deserialize)]
struct CollectionsBody {
    collections: Vec<Collection>,
}

#[derive(serde::Deserialize)]
struct StoryBody {
    story: Story,
}

impl HttpApi {
    pub fn new(host: &str) -> anyhow::Result<HttpApi> {
        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.cookie_store(true);
        Ok(HttpApi {
            host: host.trim_end_matches('/').to_string(),
            client: builder.build().context("building http client")?,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let req = self
            .client
            .request(method, format!("{}/api/{}", self.host, path));
        #[cfg(target_arch = "wasm32")]
        let req = req.fetch_credentials_include();
        req
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.request(Method::GET, path)
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.request(Method::POST, path)
    }

    fn delete(&self, path: &str) -> RequestBuilder {
        self.request(Method::DELETE, path)
    }

    /// Sends `req`, classifying every way it can fail into an `Error`
    async fn send<R>(&self, req: RequestBuilder) -> Result<R, Error>
    where
        R: for<'de> serde::Deserialize<'de>,
    {
        let resp = req.send().await.map_err(|e| {
            tracing::warn!(err = ?e, "request got no response");
            Error::Network(e.to_string())
        })?;
        let status = resp.status();
        let url = resp.url().clone();
        let body = resp
            .bytes()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        if !status.is_success() {
            let err = Error::from_response(status, &body);
            tracing::debug!(%url, %status, ?err, "request refused");
            return Err(err);
        }
        serde_json::from_slice(&body).map_err(|e| {
            tracing::error!(%url, err = ?e, "undecodable response body");
            Error::Malformed(e.to_string())
        })
    }
}

#[async_trait(?Send)]
impl Api for HttpApi {
    async fn fetch_replies(
        &self,
        comment: &CommentId,
        page: u32,
        limit: u32,
    ) -> Result<RepliesPage, Error> {
        let req = self
            .get(&format!("comments/{comment}/replies"))
            .query(&[("page", page), ("limit", limit)]);
        self.send(req).await
    }

    async fn post_reply(&self, comment: &CommentId, reply: &NewReply) -> Result<Reply, Error> {
        let req = self.post(&format!("comments/{comment}/replies")).json(reply);
        Ok(self.send::<ReplyBody>(req).await?.reply)
    }

    async fn like_comment(&self, kind: ContentKind, comment: &CommentId) -> Result<Message, Error> {
        let path = format!("{}/comments/{comment}/like", kind.path_segment());
        self.send(self.post(&path)).await
    }

    async fn delete_comment(
        &self,
        kind: ContentKind,
        comment: &CommentId,
    ) -> Result<Message, Error> {
        let path = format!("{}/comments/{comment}", kind.path_segment());
        self.send(self.delete(&path)).await
    }

    async fn fetch_user(&self, user: &UserId) -> Result<User, Error> {
        let req = self.get(&format!("users/{user}"));
        Ok(self.send::<UserBody>(req).await?.user)
    }

    async fn follow(&self, user: &UserId) -> Result<Message, Error> {
        self.send(self.post(&format!("users/{user}/follow"))).await
    }

    async fn unfollow(&self, user: &UserId) -> Result<Message, Error> {
        self.send(self.delete(&format!("users/{user}/follow"))).await
    }

    async fn save_to_reading_list(&self, item: &SavedItem) -> Result<Message, Error> {
        self.send(self.post("users/reading-list").json(item)).await
    }

    async fn remove_from_reading_list(&self, item: &SavedItem) -> Result<Message, Error> {
        let path = format!("users/reading-list/{}/{}", item.kind.as_str(), item.id);
        self.send(self.delete(&path)).await
    }

    async fn award_points(&self, action: PointAction) -> Result<Message, Error> {
        let req = self
            .post("users/social-points")
            .json(&json!({ "action": action }));
        self.send(req).await
    }

    async fn fetch_lists(&self, owner: &UserId) -> Result<Vec<RecommendationList>, Error> {
        let req = self.get(&format!("recommendations/user/{owner}"));
        Ok(self.send::<ListsBody>(req).await?.lists)
    }

    async fn create_list(&self, list: &NewList) -> Result<RecommendationList, Error> {
        let req = self.post("recommendations").json(list);
        Ok(self.send::<ListBody>(req).await?.list)
    }

    async fn delete_list(&self, list: &ListId) -> Result<Message, Error> {
        self.send(self.delete(&format!("recommendations/{list}")))
            .await
    }

    async fn add_story_to_list(&self, list: &ListId, story: &StoryId) -> Result<Message, Error> {
        let req = self
            .post(&format!("recommendations/{list}/stories"))
            .json(&json!({ "storyId": story }));
        self.send(req).await
    }

    async fn remove_story_from_list(
        &self,
        list: &ListId,
        story: &StoryId,
    ) -> Result<Message, Error> {
        let path = format!("recommendations/{list}/stories/{story}");
        self.send(self.delete(&path)).await
    }

    async fn set_list_published(
        &self,
        list: &ListId,
        published: bool,
    ) -> Result<Message, Error> {
        let req = self
            .request(Method::PATCH, &format!("recommendations/{list}"))
            .json(&json!({ "published": published }));
        self.send(req).await
    }

    async fn like_list(&self, list: &ListId) -> Result<Message, Error> {
        self.send(self.post(&format!("recommendations/{list}/like")))
            .await
    }

    async fn fetch_collections(&self, owner: &UserId) -> Result<Vec<Collection>, Error> {
        let req = self.get(&format!("collections/user/{owner}"));
        Ok(self.send::<CollectionsBody>(req).await?.collections)
    }

    async fn add_story_to_collection(
        &self,
        collection: &CollectionId,
        story: &StoryId,
    ) -> Result<Message, Error> {
        let req = self
            .post(&format!("collections/{collection}/stories"))
            .json(&json!({ "storyId": story }));
        self.send(req).await
    }

    async fn remove_story_from_collection(
        &self,
        collection: &CollectionId,
        story: &StoryId,
    ) -> Result<Message, Error> {
        let path = format!("collections/{collection}/stories/{story}");
        self.send(self.delete(&path)).await
    }

    async fn like_collection(&self, collection: &CollectionId) -> Result<Message, Error> {
        self.send(self.post(&format!("collections/{collection}/like")))
            .await
    }

    async fn signup(&self, user: &NewUser) -> Result<User, Error> {
        let req = self.post("auth/signup").json(user);
        Ok(self.send::<UserBody>(req).await?.user)
    }

    async fn login(&self, credentials: &Credentials) -> Result<User, Error> {
        let req = self.post("auth/login").json(credentials);
        Ok(self.send::<UserBody>(req).await?.user)
    }

    async fn logout(&self) -> Result<Message, Error> {
        self.send(self.post("auth/logout")).await
    }

    async fn forgot_password(&self, email: &str) -> Result<Message, Error> {
        let req = self
            .post("auth/forgot-password")
            .json(&json!({ "email": email }));
        self.send(req).await
    }

    async fn reset_password(&self, reset: &PasswordReset) -> Result<Message, Error> {
        let req = self
            .post(&format!("auth/reset-password/{}", reset.token))
            .json(reset);
        self.send(req).await
    }

    async fn fetch_story(&self, story: &StoryId) -> Result<Story, Error> {
        let req = self.get(&format!("stories/{story}"));
        Ok(self.send::<StoryBody>(req).await?.story)
    }

    async fn fetch_story_comments(
        &self,
        story: &StoryId,
        page: u32,
        limit: u32,
    ) -> Result<RepliesPage, Error> {
        let req = self
            .get(&format!("stories/{story}/comments"))
            .query(&[("page", page), ("limit", limit)]);
        let body = self.send::<CommentsBody>(req).await?;
        Ok(RepliesPage {
            replies: body.comments,
            pagination: body.pagination,
        })
    }

    async fn post_comment(&self, story: &StoryId, comment: &NewReply) -> Result<Reply, Error> {
        let req = self.post(&format!("stories/{story}/comments")).json(comment);
        Ok(self.send::<CommentBody>(req).await?.comment)
    }

    async fn create_story(&self, story: &NewStory) -> Result<Story, Error> {
        let mut form = multipart::Form::new()
            .text("title", story.title.clone())
            .text("summary", story.summary.clone());
        if let Some(cover) = &story.cover {
            let part = multipart::Part::bytes(cover.bytes.clone())
                .file_name(cover.file_name.clone())
                .mime_str(&cover.mime)
                .map_err(|e| {
                    tracing::warn!(err = ?e, mime = %cover.mime, "unusable cover type");
                    Error::rejected(400, "The cover must be an image")
                })?;
            form = form.part("cover", part);
        }
        let req = self.post("stories").multipart(form);
        Ok(self.send::<StoryBody>(req).await?.story)
    }

    async fn create_review(&self, story: &StoryId, review: &NewReview) -> Result<Message, Error> {
        let req = self.post(&format!("stories/{story}/reviews")).json(review);
        self.send(req).await
    }
}
