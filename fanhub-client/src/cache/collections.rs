use super::{apply_like, Cache, MutationResult};
use crate::api::{Api, Collection, CollectionId, Error, StoryId, UserId};

/// Story collections of one user
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Collections(Cache<Vec<Collection>>);

impl Collections {
    pub fn new() -> Collections {
        Collections::default()
    }

    pub fn collections(&self) -> &[Collection] {
        self.0.state()
    }

    pub fn get(&self, id: &CollectionId) -> Option<&Collection> {
        self.collections().iter().find(|c| c.id == *id)
    }

    pub fn error(&self) -> Option<&Error> {
        self.0.error()
    }

    pub async fn fetch<A: Api + ?Sized>(&mut self, api: &A, owner: &UserId) -> bool {
        let res = api.fetch_collections(owner).await;
        self.0.load(res, |collections, fetched| *collections = fetched)
    }

    pub async fn add_story<A: Api + ?Sized>(
        &mut self,
        api: &A,
        collection: &CollectionId,
        story: &StoryId,
    ) -> MutationResult {
        self.0
            .mutate(
                |cs| patch(cs, collection, |c| c.stories.push(story.clone())),
                api.add_story_to_collection(collection, story),
                |m| m.message,
            )
            .await
    }

    pub async fn remove_story<A: Api + ?Sized>(
        &mut self,
        api: &A,
        collection: &CollectionId,
        story: &StoryId,
    ) -> MutationResult {
        self.0
            .mutate(
                |cs| patch(cs, collection, |c| c.stories.retain(|s| s != story)),
                api.remove_story_from_collection(collection, story),
                |m| m.message,
            )
            .await
    }

    pub async fn like<A: Api + ?Sized>(
        &mut self,
        api: &A,
        collection: &CollectionId,
    ) -> MutationResult {
        self.0
            .settle(api.like_collection(collection), |cs, m| {
                patch(cs, collection, |c| apply_like(&mut c.likes, &m.message));
                m.message
            })
            .await
    }

    pub fn contains(&self, collection: &CollectionId, story: &StoryId) -> bool {
        self.get(collection)
            .map(|c| c.stories.contains(story))
            .unwrap_or(false)
    }

    pub fn collections_containing(&self, story: &StoryId) -> Vec<&Collection> {
        self.collections()
            .iter()
            .filter(|c| c.stories.contains(story))
            .collect()
    }
}

fn patch(collections: &mut [Collection], id: &CollectionId, f: impl FnOnce(&mut Collection)) {
    match collections.iter_mut().find(|c| c.id == *id) {
        Some(c) => f(c),
        None => tracing::debug!(collection = %id, "patching a collection that is not cached"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fanhub_mock_server::MockServer;
    use futures::executor::block_on;

    #[test]
    fn add_remove_and_like() {
        let server = MockServer::new();
        let bob = server.test_create_user("bob", "bob@example.org", "password2");
        let story = server.test_create_story(&bob, "Night Shift");
        let coll = server.test_create_collection(&bob, "Mysteries", &[]);
        server.test_login_as(&bob);

        let mut c = Collections::new();
        assert!(block_on(c.fetch(&server, &bob)));
        assert!(block_on(c.add_story(&server, &coll, &story)).success);
        assert_eq!(
            c.collections_containing(&story)
                .iter()
                .map(|c| c.id.clone())
                .collect::<Vec<_>>(),
            vec![coll.clone()]
        );
        assert!(c.contains(&coll, &story));

        assert!(block_on(c.like(&server, &coll)).success);
        assert_eq!(c.get(&coll).unwrap().likes, 1);

        assert!(block_on(c.remove_story(&server, &coll, &story)).success);
        assert!(c.collections_containing(&story).is_empty());
        assert!(!c.contains(&coll, &story));
    }

    #[test]
    fn foreign_collection_is_left_untouched() {
        let server = MockServer::new();
        let bob = server.test_create_user("bob", "bob@example.org", "password2");
        let eve = server.test_create_user("eve", "eve@example.org", "password3");
        let story = server.test_create_story(&bob, "Night Shift");
        let coll = server.test_create_collection(&bob, "Mysteries", &[]);
        server.test_login_as(&eve);

        let mut c = Collections::new();
        block_on(c.fetch(&server, &bob));
        let res = block_on(c.add_story(&server, &coll, &story));
        assert_eq!(res.message, "This collection is not yours");
        assert!(!res.success);
        assert!(c.get(&coll).unwrap().stories.is_empty());
    }
}
