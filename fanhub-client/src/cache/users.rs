use std::collections::HashMap;

use super::{Cache, MutationResult};
use crate::api::{Api, Error, SavedItem, User, UserId, UserRef};

/// Cached profiles, seen from the logged-in viewer
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UserDirectory {
    viewer: Option<UserRef>,
    profiles: Cache<HashMap<UserId, User>>,
}

impl UserDirectory {
    pub fn new(viewer: Option<UserRef>) -> UserDirectory {
        UserDirectory {
            viewer,
            profiles: Cache::default(),
        }
    }

    pub fn viewer(&self) -> Option<&UserId> {
        self.viewer.as_ref().map(|v| &v.id)
    }

    pub fn set_viewer(&mut self, viewer: Option<UserRef>) {
        self.viewer = viewer;
    }

    pub fn profile(&self, user: &UserId) -> Option<&User> {
        self.profiles.state().get(user)
    }

    pub fn error(&self) -> Option<&Error> {
        self.profiles.error()
    }

    pub async fn fetch<A: Api + ?Sized>(&mut self, api: &A, user: &UserId) -> bool {
        let res = api.fetch_user(user).await;
        self.profiles.load(res, |profiles, u| {
            profiles.insert(u.id.clone(), u);
        })
    }

    /// Puts a profile obtained elsewhere (eg. at login) in the directory
    pub fn insert(&mut self, user: User) {
        self.profiles.load(Ok(user), |profiles, u| {
            profiles.insert(u.id.clone(), u);
        });
    }

    pub async fn follow<A: Api + ?Sized>(
        &mut self,
        api: &A,
        subject: &UserRef,
    ) -> MutationResult {
        let viewer = self.viewer.clone();
        self.profiles
            .mutate(
                |profiles| patch_follow(profiles, viewer.as_ref(), subject),
                api.follow(&subject.id),
                |m| m.message,
            )
            .await
    }

    pub async fn unfollow<A: Api + ?Sized>(
        &mut self,
        api: &A,
        subject: &UserId,
    ) -> MutationResult {
        let viewer = self.viewer.clone();
        self.profiles
            .mutate(
                |profiles| patch_unfollow(profiles, viewer.as_ref().map(|v| &v.id), subject),
                api.unfollow(subject),
                |m| m.message,
            )
            .await
    }

    pub async fn save<A: Api + ?Sized>(&mut self, api: &A, item: &SavedItem) -> MutationResult {
        let viewer = self.viewer.clone();
        self.profiles
            .mutate(
                |profiles| {
                    if let Some(me) = viewer_mut(profiles, viewer.as_ref().map(|v| &v.id)) {
                        me.reading_list.push(item.clone());
                    }
                },
                api.save_to_reading_list(item),
                |m| m.message,
            )
            .await
    }

    pub async fn unsave<A: Api + ?Sized>(&mut self, api: &A, item: &SavedItem) -> MutationResult {
        let viewer = self.viewer.clone();
        self.profiles
            .mutate(
                |profiles| {
                    if let Some(me) = viewer_mut(profiles, viewer.as_ref().map(|v| &v.id)) {
                        me.reading_list.retain(|i| i != item);
                    }
                },
                api.remove_from_reading_list(item),
                |m| m.message,
            )
            .await
    }

    pub fn is_saved(&self, item: &SavedItem) -> bool {
        self.viewer_profile()
            .map(|me| me.reading_list.iter().any(|i| i == item))
            .unwrap_or(false)
    }

    pub fn is_following(&self, subject: &UserId) -> bool {
        self.viewer_profile()
            .map(|me| me.following.iter().any(|f| f.id == *subject))
            .unwrap_or(false)
    }

    fn viewer_profile(&self) -> Option<&User> {
        self.profile(self.viewer()?)
    }
}

fn viewer_mut<'a>(
    profiles: &'a mut HashMap<UserId, User>,
    viewer: Option<&UserId>,
) -> Option<&'a mut User> {
    profiles.get_mut(viewer?)
}

/// Adds the follow edge to whichever side is cached; count and array move together
fn patch_follow(
    profiles: &mut HashMap<UserId, User>,
    viewer: Option<&UserRef>,
    subject: &UserRef,
) {
    let viewer = match viewer {
        Some(v) => v,
        None => {
            tracing::warn!(subject = %subject.id, "follow without a logged-in viewer");
            return;
        }
    };
    if let Some(s) = profiles.get_mut(&subject.id) {
        s.counts.followers += 1;
        s.followers.push(viewer.clone());
    }
    if let Some(v) = profiles.get_mut(&viewer.id) {
        v.counts.following += 1;
        v.following.push(subject.clone());
    }
}

fn patch_unfollow(
    profiles: &mut HashMap<UserId, User>,
    viewer: Option<&UserId>,
    subject: &UserId,
) {
    let viewer = match viewer {
        Some(v) => v,
        None => {
            tracing::warn!(%subject, "unfollow without a logged-in viewer");
            return;
        }
    };
    if let Some(s) = profiles.get_mut(subject) {
        s.counts.followers = s.counts.followers.saturating_sub(1);
        s.followers.retain(|f| f.id != *viewer);
    }
    if let Some(v) = profiles.get_mut(viewer) {
        v.counts.following = v.counts.following.saturating_sub(1);
        v.following.retain(|f| f.id != *subject);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::StoryId;
    use fanhub_mock_server::MockServer;
    use futures::executor::block_on;

    struct Fixture {
        server: MockServer,
        alice: UserId,
        bob: UserId,
        dir: UserDirectory,
    }

    fn fixture() -> Fixture {
        let server = MockServer::new();
        let alice = server.test_create_user("alice", "alice@example.org", "password1");
        let bob = server.test_create_user("bob", "bob@example.org", "password2");
        server.test_login_as(&alice);
        let mut dir = UserDirectory::new(Some(server.test_user(&alice).to_ref()));
        assert!(block_on(dir.fetch(&server, &alice)));
        assert!(block_on(dir.fetch(&server, &bob)));
        Fixture {
            server,
            alice,
            bob,
            dir,
        }
    }

    #[test]
    fn follow_patches_both_profiles() {
        let mut f = fixture();
        let bob_ref = f.server.test_user(&f.bob).to_ref();
        assert!(block_on(f.dir.follow(&f.server, &bob_ref)).success);
        assert!(f.dir.is_following(&f.bob));

        let bob = f.dir.profile(&f.bob).unwrap();
        assert_eq!(bob.counts.followers, 1);
        assert_eq!(bob.followers[0].id, f.alice);
        assert_eq!(f.dir.profile(&f.alice).unwrap().counts.following, 1);

        // the patched cache matches what the server now says
        assert_eq!(bob, &f.server.test_user(&f.bob));
        assert_eq!(
            f.dir.profile(&f.alice).unwrap(),
            &f.server.test_user(&f.alice)
        );

        assert!(block_on(f.dir.unfollow(&f.server, &f.bob)).success);
        assert!(!f.dir.is_following(&f.bob));
        assert_eq!(f.dir.profile(&f.bob).unwrap().counts.followers, 0);
    }

    #[test]
    fn follow_without_own_profile_cached() {
        let server = MockServer::new();
        let alice = server.test_create_user("alice", "alice@example.org", "password1");
        let bob = server.test_create_user("bob", "bob@example.org", "password2");
        server.test_login_as(&alice);
        let mut dir = UserDirectory::new(Some(server.test_user(&alice).to_ref()));
        assert!(block_on(dir.fetch(&server, &bob)));
        assert!(dir.profile(&alice).is_none());

        let bob_ref = dir.profile(&bob).unwrap().to_ref();
        assert!(block_on(dir.follow(&server, &bob_ref)).success);
        let cached = dir.profile(&bob).unwrap();
        assert_eq!(cached.counts.followers, 1);
        assert_eq!(cached.followers.len(), 1);
        assert_eq!(cached, &server.test_user(&bob));

        assert!(block_on(dir.unfollow(&server, &bob)).success);
        let cached = dir.profile(&bob).unwrap();
        assert_eq!((cached.counts.followers, cached.followers.len()), (0, 0));
        assert_eq!(cached, &server.test_user(&bob));
    }

    #[test]
    fn refused_follow_is_rolled_back() {
        let mut f = fixture();
        let before = f.dir.clone();
        f.server.fail_next(Error::Network(String::from("connection reset")));
        let bob_ref = f.server.test_user(&f.bob).to_ref();
        let res = block_on(f.dir.follow(&f.server, &bob_ref));
        assert!(!res.success);
        assert_eq!(res.message, crate::api::CONNECTIVITY_MESSAGE);
        assert_eq!(f.dir, before);
    }

    #[test]
    fn reading_list_membership() {
        let mut f = fixture();
        let story = f.server.test_create_story(&f.bob, "Tides");
        let item = SavedItem::story(&story);
        assert!(!f.dir.is_saved(&item));
        assert!(block_on(f.dir.save(&f.server, &item)).success);
        assert!(f.dir.is_saved(&item));
        assert!(!f.dir.is_saved(&SavedItem::story(&StoryId::from("other"))));
        assert!(block_on(f.dir.unsave(&f.server, &item)).success);
        assert!(!f.dir.is_saved(&item));
    }

    #[test]
    fn nothing_is_saved_without_viewer() {
        let f = fixture();
        let anonymous = UserDirectory::new(None);
        assert!(!anonymous.is_saved(&SavedItem::story(&StoryId::from("s"))));
        assert!(!anonymous.is_following(&f.bob));
    }
}
