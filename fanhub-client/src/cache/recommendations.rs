use super::{apply_like, Cache, MutationResult};
use crate::api::{Api, Error, ListId, NewList, RecommendationList, StoryId, UserId};

/// Recommendation lists of one user
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Recommendations(Cache<Vec<RecommendationList>>);

impl Recommendations {
    pub fn new() -> Recommendations {
        Recommendations::default()
    }

    pub fn lists(&self) -> &[RecommendationList] {
        self.0.state()
    }

    pub fn get(&self, list: &ListId) -> Option<&RecommendationList> {
        self.lists().iter().find(|l| l.id == *list)
    }

    pub fn error(&self) -> Option<&Error> {
        self.0.error()
    }

    pub fn is_loaded(&self) -> bool {
        self.0.is_loaded()
    }

    pub async fn fetch_all<A: Api + ?Sized>(&mut self, api: &A, owner: &UserId) -> bool {
        let res = api.fetch_lists(owner).await;
        self.0.load(res, |lists, fetched| *lists = fetched)
    }

    pub async fn create<A: Api + ?Sized>(&mut self, api: &A, new: &NewList) -> MutationResult {
        if let Err(err) = new.validate() {
            return MutationResult::failed(&err);
        }
        self.0
            .settle(api.create_list(new), |lists, created| {
                tracing::debug!(list = %created.id, "created recommendation list");
                lists.push(created);
                String::from("List created")
            })
            .await
    }

    pub async fn delete<A: Api + ?Sized>(&mut self, api: &A, list: &ListId) -> MutationResult {
        self.0
            .mutate(
                |lists| lists.retain(|l| l.id != *list),
                api.delete_list(list),
                |m| m.message,
            )
            .await
    }

    /// Appends `story` to `list`; calling it twice adds it twice
    pub async fn add_story<A: Api + ?Sized>(
        &mut self,
        api: &A,
        list: &ListId,
        story: &StoryId,
    ) -> MutationResult {
        self.0
            .mutate(
                |lists| patch_list(lists, list, |l| l.stories.push(story.clone())),
                api.add_story_to_list(list, story),
                |m| m.message,
            )
            .await
    }

    pub async fn remove_story<A: Api + ?Sized>(
        &mut self,
        api: &A,
        list: &ListId,
        story: &StoryId,
    ) -> MutationResult {
        self.0
            .mutate(
                |lists| patch_list(lists, list, |l| l.stories.retain(|s| s != story)),
                api.remove_story_from_list(list, story),
                |m| m.message,
            )
            .await
    }

    pub async fn set_published<A: Api + ?Sized>(
        &mut self,
        api: &A,
        list: &ListId,
        published: bool,
    ) -> MutationResult {
        self.0
            .mutate(
                |lists| patch_list(lists, list, |l| l.published = published),
                api.set_list_published(list, published),
                |m| m.message,
            )
            .await
    }

    pub async fn like<A: Api + ?Sized>(&mut self, api: &A, list: &ListId) -> MutationResult {
        self.0
            .settle(api.like_list(list), |lists, m| {
                patch_list(lists, list, |l| apply_like(&mut l.likes, &m.message));
                m.message
            })
            .await
    }

    pub fn contains(&self, list: &ListId, story: &StoryId) -> bool {
        self.get(list)
            .map(|l| l.stories.contains(story))
            .unwrap_or(false)
    }

    pub fn lists_containing(&self, story: &StoryId) -> Vec<&RecommendationList> {
        self.lists()
            .iter()
            .filter(|l| l.stories.contains(story))
            .collect()
    }
}

fn patch_list(
    lists: &mut [RecommendationList],
    id: &ListId,
    patch: impl FnOnce(&mut RecommendationList),
) {
    match lists.iter_mut().find(|l| l.id == *id) {
        Some(l) => patch(l),
        None => tracing::debug!(list = %id, "patching a list that is not cached"),
    }
}
