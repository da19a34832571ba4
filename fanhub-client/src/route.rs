use crate::api::{CommentId, ContentKind, Error, Reaction, StoryId, UserId};

/// The screens of the application
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Route {
    Home,
    Login,
    Signup,
    ForgotPassword,
    ResetPassword {
        token: String,
    },
    Profile(UserId),
    NewStory,
    Story(StoryId),

    /// Replies of one comment; `owner` owns the content the comment hangs off
    Thread {
        kind: ContentKind,
        comment: CommentId,
        owner: UserId,
    },

    /// Full-page error view
    Error {
        message: String,
    },
}

impl Route {
    pub fn error(message: impl Into<String>) -> Route {
        Route::Error {
            message: message.into(),
        }
    }
}

/// What a finished user action asks the UI to do
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Outcome {
    pub navigate: Option<Route>,
    pub inline_error: Option<String>,

    /// Confirmation shown next to the form
    pub notice: Option<String>,
}

impl Outcome {
    pub fn navigate(route: Route) -> Outcome {
        Outcome {
            navigate: Some(route),
            ..Outcome::default()
        }
    }

    pub fn inline(message: impl Into<String>) -> Outcome {
        Outcome {
            inline_error: Some(message.into()),
            ..Outcome::default()
        }
    }

    pub fn notice(message: impl Into<String>) -> Outcome {
        Outcome {
            notice: Some(message.into()),
            ..Outcome::default()
        }
    }

    /// Fatal errors go to the error page, others stay next to the control
    pub fn from_error(err: &Error) -> Outcome {
        match err.reaction() {
            Reaction::Inline(message) => Outcome::inline(message),
            Reaction::ErrorPage(message) => {
                tracing::error!(?err, "routing to error page");
                Outcome::navigate(Route::error(message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::CONNECTIVITY_MESSAGE;

    #[test]
    fn errors_map_to_outcomes() {
        assert_eq!(
            Outcome::from_error(&Error::rejected(403, "Nope")),
            Outcome::inline("Nope")
        );
        assert_eq!(
            Outcome::from_error(&Error::Network(String::from("dns"))),
            Outcome::navigate(Route::error(CONNECTIVITY_MESSAGE)),
        );
    }
}
