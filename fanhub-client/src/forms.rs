//! Submission of the account and content forms
//!
//! Every flow validates locally first, so a form refused by validation makes no
//! request at all.

use crate::{
    api::{
        Api, Credentials, NewReview, NewStory, NewUser, PasswordReset, PointAction, StoryId,
    },
    Outcome, Route, Session, Store,
};

pub async fn signup<A: Api + ?Sized>(api: &A, user: &NewUser, confirmation: &str) -> Outcome {
    if let Err(err) = user.validate(confirmation) {
        return Outcome::from_error(&err);
    }
    match api.signup(user).await {
        Ok(created) => {
            tracing::info!(user = %created.id, "account created");
            Outcome::navigate(Route::Login)
        }
        Err(err) => Outcome::from_error(&err),
    }
}

pub async fn login<A: Api + ?Sized, S: Store>(
    api: &A,
    session: &mut Session,
    store: &mut S,
    credentials: &Credentials,
) -> Outcome {
    if let Err(err) = credentials.validate() {
        return Outcome::from_error(&err);
    }
    match api.login(credentials).await {
        Ok(user) => {
            session.login(store, user);
            Outcome::navigate(Route::Home)
        }
        Err(err) => Outcome::from_error(&err),
    }
}

/// The local session is dropped even if the server could not be told
pub async fn logout<A: Api + ?Sized, S: Store>(
    api: &A,
    session: &mut Session,
    store: &mut S,
) -> Outcome {
    if let Err(err) = api.logout().await {
        tracing::warn!(?err, "server-side logout failed");
    }
    session.logout(store);
    Outcome::navigate(Route::Login)
}

pub async fn forgot_password<A: Api + ?Sized>(api: &A, email: &str) -> Outcome {
    let email = email.trim();
    if email.is_empty() {
        return Outcome::inline("Please enter your email");
    }
    match api.forgot_password(email).await {
        Ok(m) => Outcome::notice(m.message),
        Err(err) => Outcome::from_error(&err),
    }
}

pub async fn reset_password<A: Api + ?Sized>(
    api: &A,
    reset: &PasswordReset,
    confirmation: &str,
) -> Outcome {
    if let Err(err) = reset.validate(confirmation) {
        return Outcome::from_error(&err);
    }
    match api.reset_password(reset).await {
        Ok(_) => Outcome::navigate(Route::Login),
        Err(err) => Outcome::from_error(&err),
    }
}

/// Posts a review, then awards its social points
///
/// A failed award does not undo the review: the story is still shown, with the
/// award failure reported inline.
pub async fn review<A: Api + ?Sized>(api: &A, story: &StoryId, review: &NewReview) -> Outcome {
    if let Err(err) = review.validate() {
        return Outcome::from_error(&err);
    }
    if let Err(err) = api.create_review(story, review).await {
        return Outcome::from_error(&err);
    }
    let mut res = Outcome::navigate(Route::Story(story.clone()));
    if let Err(err) = api.award_points(PointAction::Review).await {
        tracing::warn!(?err, %story, "review posted but points were not awarded");
        res.inline_error = Some(err.user_message());
    }
    res
}

pub async fn create_story<A: Api + ?Sized>(api: &A, story: &NewStory) -> Outcome {
    if let Err(err) = story.validate() {
        return Outcome::from_error(&err);
    }
    match api.create_story(story).await {
        Ok(created) => {
            tracing::info!(story = %created.id, "story created");
            Outcome::navigate(Route::Story(created.id))
        }
        Err(err) => Outcome::from_error(&err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::{Error, Upload, CONNECTIVITY_MESSAGE},
        MemoryStore,
    };
    use fanhub_mock_server::MockServer;
    use futures::executor::block_on;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: String::from(username),
            email: String::from(email),
            password: String::from("correct horse"),
        }
    }

    #[test]
    fn signup_success_goes_to_login() {
        let server = MockServer::new();
        let out = block_on(signup(&server, &new_user("alice", "a@x.org"), "correct horse"));
        assert_eq!(out, Outcome::navigate(Route::Login));
    }

    #[test]
    fn signup_rejection_stays_inline() {
        let server = MockServer::new();
        server.test_create_user("alice", "other@x.org", "password1");
        let out = block_on(signup(&server, &new_user("alice", "a@x.org"), "correct horse"));
        assert_eq!(out, Outcome::inline("Username taken"));
    }

    #[test]
    fn signup_server_error_shows_error_page() {
        let server = MockServer::new();
        server.fail_next(Error::Server(String::from("Database is down")));
        let out = block_on(signup(&server, &new_user("alice", "a@x.org"), "correct horse"));
        assert_eq!(out, Outcome::navigate(Route::error("Database is down")));
    }

    #[test]
    fn signup_network_error_shows_connectivity_page() {
        let server = MockServer::new();
        server.fail_next(Error::Network(String::from("connection refused")));
        let out = block_on(signup(&server, &new_user("alice", "a@x.org"), "correct horse"));
        assert_eq!(out, Outcome::navigate(Route::error(CONNECTIVITY_MESSAGE)));
    }

    #[test]
    fn mismatched_confirmation_makes_no_request() {
        let server = MockServer::new();
        let out = block_on(signup(&server, &new_user("alice", "a@x.org"), "typo"));
        assert!(out.inline_error.is_some());
        assert_eq!(out.navigate, None);
        assert!(server.calls().is_empty());
    }

    #[test]
    fn login_then_logout() {
        let server = MockServer::new();
        server.test_create_user("alice", "a@x.org", "password1");
        let mut store = MemoryStore::default();
        let mut session = Session::default();

        let wrong = Credentials {
            email: String::from("a@x.org"),
            password: String::from("password2"),
        };
        let out = block_on(login(&server, &mut session, &mut store, &wrong));
        assert_eq!(out, Outcome::inline("Invalid email or password"));
        assert!(!session.is_logged_in());

        let right = Credentials {
            email: String::from("a@x.org"),
            password: String::from("password1"),
        };
        let out = block_on(login(&server, &mut session, &mut store, &right));
        assert_eq!(out, Outcome::navigate(Route::Home));
        assert_eq!(session.user().map(|u| u.username.as_str()), Some("alice"));
        assert!(Session::hydrate(&store).is_logged_in());

        server.fail_next(Error::Network(String::from("offline")));
        let out = block_on(logout(&server, &mut session, &mut store));
        assert_eq!(out, Outcome::navigate(Route::Login));
        assert!(!session.is_logged_in());
        assert!(!Session::hydrate(&store).is_logged_in());
    }

    #[test]
    fn password_reset_flow() {
        let server = MockServer::new();
        let alice = server.test_create_user("alice", "a@x.org", "password1");

        assert_eq!(
            block_on(forgot_password(&server, " ")),
            Outcome::inline("Please enter your email")
        );
        let out = block_on(forgot_password(&server, "a@x.org"));
        assert!(out.notice.is_some());
        assert_eq!(out.navigate, None);

        let reset = PasswordReset {
            token: server.test_issue_reset_token(&alice),
            password: String::from("new password"),
        };
        assert_eq!(
            block_on(reset_password(&server, &reset, "new password")),
            Outcome::navigate(Route::Login)
        );
        // tokens are single use
        assert_eq!(
            block_on(reset_password(&server, &reset, "new password")),
            Outcome::inline("Reset link is invalid or has expired")
        );
    }

    #[test]
    fn review_survives_failed_point_award() {
        let server = MockServer::new();
        let alice = server.test_create_user("alice", "a@x.org", "password1");
        let story = server.test_create_story(&alice, "Tides");
        server.test_login_as(&alice);
        server.fail_next_call_to("award_points", Error::rejected(429, "Too many points today"));

        let out = block_on(review(
            &server,
            &story,
            &NewReview {
                rating: 4,
                content: String::from("Lovely"),
            },
        ));
        assert_eq!(out.navigate, Some(Route::Story(story.clone())));
        assert_eq!(out.inline_error.as_deref(), Some("Too many points today"));
        assert_eq!(server.test_reviews(&story), 1);
    }

    #[test]
    fn review_awards_points() {
        let server = MockServer::new();
        let alice = server.test_create_user("alice", "a@x.org", "password1");
        let story = server.test_create_story(&alice, "Tides");
        server.test_login_as(&alice);
        let out = block_on(review(
            &server,
            &story,
            &NewReview {
                rating: 5,
                content: String::from("Great"),
            },
        ));
        assert_eq!(out, Outcome::navigate(Route::Story(story)));
        assert_eq!(server.test_user(&alice).social_points.review, 1);
    }

    #[test]
    fn story_creation_checks_cover_type() {
        let server = MockServer::new();
        let alice = server.test_create_user("alice", "a@x.org", "password1");
        server.test_login_as(&alice);
        let mut story = NewStory {
            title: String::from("Tides"),
            summary: String::from("The sea, mostly"),
            cover: Some(Upload {
                file_name: String::from("cover.txt"),
                mime: String::from("text/plain"),
                bytes: b"not an image".to_vec(),
            }),
        };
        assert_eq!(
            block_on(create_story(&server, &story)),
            Outcome::inline("The cover must be an image")
        );
        assert_eq!(server.count_calls("create_story"), 0);

        story.cover = Some(Upload {
            file_name: String::from("cover.png"),
            mime: String::from("image/png"),
            bytes: vec![0x89, b'P', b'N', b'G'],
        });
        let out = block_on(create_story(&server, &story));
        assert!(matches!(out.navigate, Some(Route::Story(_))));
        assert_eq!(server.test_user(&alice).counts.stories, 1);
    }
}
