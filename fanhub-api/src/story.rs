use crate::{CollectionId, Error, ListId, StoryId, UserId, UserRef};

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Story {
    pub id: StoryId,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    pub author: UserRef,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub comments: u32,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Collection {
    pub id: CollectionId,
    pub owner: UserId,
    pub title: String,
    #[serde(default)]
    pub stories: Vec<StoryId>,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub comments: u32,
}

/// A user-curated, optionally published list of stories
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct RecommendationList {
    pub id: ListId,
    pub owner: UserId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub stories: Vec<StoryId>,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub comments: u32,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewList {
    pub name: String,
    pub description: String,
}

impl NewList {
    pub fn validate(&self) -> Result<(), Error> {
        if self.name.trim().is_empty() {
            return Err(Error::rejected(400, "A list needs a name"));
        }
        Ok(())
    }
}

/// A file picked by the user, sent as the multipart file field
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Upload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NewStory {
    pub title: String,
    pub summary: String,
    pub cover: Option<Upload>,
}

impl NewStory {
    pub fn validate(&self) -> Result<(), Error> {
        if self.title.trim().is_empty() {
            return Err(Error::rejected(400, "A story needs a title"));
        }
        if let Some(cover) = &self.cover {
            if !cover.mime.starts_with("image/") {
                return Err(Error::rejected(400, "The cover must be an image"));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewReview {
    pub rating: u8,
    pub content: String,
}

impl NewReview {
    pub fn validate(&self) -> Result<(), Error> {
        if !(1..=5).contains(&self.rating) {
            return Err(Error::rejected(400, "Rating must be between 1 and 5"));
        }
        if self.content.trim().is_empty() {
            return Err(Error::rejected(400, "A review cannot be empty"));
        }
        Ok(())
    }
}
