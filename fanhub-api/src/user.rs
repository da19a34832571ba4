use crate::{CollectionId, StoryId, UserId};

/// The part of a user record embedded in other entities
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct UserCounts {
    pub stories: u32,
    pub collections: u32,
    pub followers: u32,
    pub following: u32,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct SocialPoints {
    pub comment: u32,
    pub review: u32,
    pub like: u32,
    pub read: u32,
    pub write: u32,
}

impl SocialPoints {
    pub fn total(&self) -> u32 {
        self.comment + self.review + self.like + self.read + self.write
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Streak {
    pub current: u32,
    pub longest: u32,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SavedKind {
    Story,
    Collection,
}

impl SavedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SavedKind::Story => "story",
            SavedKind::Collection => "collection",
        }
    }
}

/// One entry of a user's reading list
#[derive(Clone, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct SavedItem {
    pub kind: SavedKind,
    pub id: String,
}

impl SavedItem {
    pub fn story(id: &StoryId) -> SavedItem {
        SavedItem {
            kind: SavedKind::Story,
            id: id.0.clone(),
        }
    }

    pub fn collection(id: &CollectionId) -> SavedItem {
        SavedItem {
            kind: SavedKind::Collection,
            id: id.0.clone(),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub counts: UserCounts,
    #[serde(default)]
    pub social_points: SocialPoints,
    #[serde(default)]
    pub streak: Streak,
    #[serde(default)]
    pub followers: Vec<UserRef>,
    #[serde(default)]
    pub following: Vec<UserRef>,
    #[serde(default)]
    pub reading_list: Vec<SavedItem>,
}

impl User {
    pub fn to_ref(&self) -> UserRef {
        UserRef {
            id: self.id.clone(),
            username: self.username.clone(),
            profile_picture: self.profile_picture.clone(),
        }
    }
}
