use http::StatusCode;
use serde_json::json;

/// Shown on the error page when the request never got a response
pub const CONNECTIVITY_MESSAGE: &str =
    "Unable to reach the server. Please check your internet connection and try again.";

/// Shown on the error page when a 500 response carried no message
pub const DEFAULT_SERVER_MESSAGE: &str = "Something went wrong on our side. Please try again later.";

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// Non-success, non-500 answer: validation or business rule failure
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Server error: {0}")]
    Server(String),

    /// The request threw before any response was obtained
    #[error("Network error: {0}")]
    Network(String),

    /// A success response whose body could not be decoded
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// What the caller of a failed request must do about it
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Reaction {
    /// Show the message next to the control that triggered the request
    Inline(String),

    /// Replace the current screen with the full-page error view
    ErrorPage(String),
}

impl Error {
    pub fn rejected(status: u16, message: impl Into<String>) -> Error {
        Error::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Classify a non-success response from its status and raw body
    pub fn from_response(status: StatusCode, body: &[u8]) -> Error {
        let message = message_of(body);
        if status.is_server_error() {
            Error::Server(message.unwrap_or_else(|| String::from(DEFAULT_SERVER_MESSAGE)))
        } else {
            Error::Rejected {
                status: status.as_u16(),
                message: message.unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("Request failed")
                        .to_string()
                }),
            }
        }
    }

    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::Rejected { .. })
    }

    pub fn reaction(&self) -> Reaction {
        match self {
            Error::Rejected { message, .. } => Reaction::Inline(message.clone()),
            Error::Server(message) => Reaction::ErrorPage(message.clone()),
            Error::Network(_) => Reaction::ErrorPage(String::from(CONNECTIVITY_MESSAGE)),
            Error::Malformed(_) => Reaction::ErrorPage(String::from(DEFAULT_SERVER_MESSAGE)),
        }
    }

    /// The user-facing message, whichever way it ends up being displayed
    pub fn user_message(&self) -> String {
        match self.reaction() {
            Reaction::Inline(m) | Reaction::ErrorPage(m) => m,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Rejected { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST)
            }
            Error::Server(_) | Error::Malformed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Network(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Body the API sends alongside `status_code`
    pub fn contents(&self) -> Vec<u8> {
        serde_json::to_vec(&json!({ "message": self.user_message() }))
            .expect("serializing error message")
    }
}

fn message_of(body: &[u8]) -> Option<String> {
    let data: serde_json::Value = serde_json::from_slice(body).ok()?;
    data.get("message")
        .and_then(|m| m.as_str())
        .filter(|m| !m.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_request_is_inline() {
        let err = Error::from_response(StatusCode::BAD_REQUEST, br#"{"message":"Username taken"}"#);
        assert_eq!(err, Error::rejected(400, "Username taken"));
        assert!(!err.is_fatal());
        assert_eq!(err.reaction(), Reaction::Inline(String::from("Username taken")));
    }

    #[test]
    fn server_error_keeps_message() {
        let err = Error::from_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            br#"{"message":"database exploded"}"#,
        );
        assert_eq!(
            err.reaction(),
            Reaction::ErrorPage(String::from("database exploded"))
        );
    }

    #[test]
    fn server_error_without_body_uses_default() {
        let err = Error::from_response(StatusCode::INTERNAL_SERVER_ERROR, b"<html>oops</html>");
        assert_eq!(err, Error::Server(String::from(DEFAULT_SERVER_MESSAGE)));
    }

    #[test]
    fn rejection_without_message_uses_reason() {
        let err = Error::from_response(StatusCode::NOT_FOUND, b"");
        assert_eq!(err, Error::rejected(404, "Not Found"));
    }

    #[test]
    fn network_error_shows_connectivity_message() {
        let err = Error::Network(String::from("connection refused"));
        assert!(err.is_fatal());
        assert_eq!(
            err.reaction(),
            Reaction::ErrorPage(String::from(CONNECTIVITY_MESSAGE))
        );
    }

    #[test]
    fn contents_round_trip_through_classification() {
        let err = Error::rejected(409, "List name already used");
        assert_eq!(Error::from_response(err.status_code(), &err.contents()), err);
    }
}
