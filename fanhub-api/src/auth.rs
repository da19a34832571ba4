use crate::Error;

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl NewUser {
    /// Checks done before bothering the server; `confirmation` is the repeated password
    pub fn validate(&self, confirmation: &str) -> Result<(), Error> {
        if self.username.trim().is_empty() {
            return Err(Error::rejected(400, "Username is required"));
        }
        if !self.username.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(Error::rejected(
                400,
                "Username may only contain letters, digits and underscores",
            ));
        }
        if !self.email.contains('@') {
            return Err(Error::rejected(400, "Please enter a valid email address"));
        }
        validate_password(&self.password, confirmation)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn validate(&self) -> Result<(), Error> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(Error::rejected(400, "Email and password are required"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PasswordReset {
    #[serde(skip)]
    pub token: String,
    pub password: String,
}

impl PasswordReset {
    pub fn validate(&self, confirmation: &str) -> Result<(), Error> {
        if self.token.is_empty() {
            return Err(Error::rejected(400, "This reset link is invalid"));
        }
        validate_password(&self.password, confirmation)
    }
}

fn validate_password(password: &str, confirmation: &str) -> Result<(), Error> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::rejected(
            400,
            format!("Password must be at least {MIN_PASSWORD_LEN} characters long"),
        ));
    }
    if password != confirmation {
        return Err(Error::rejected(400, "Passwords do not match"));
    }
    Ok(())
}

/// Actions the server rewards with social points
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PointAction {
    Comment,
    Review,
    Like,
    Read,
    Write,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, password: &str) -> NewUser {
        NewUser {
            username: String::from(username),
            email: String::from("someone@example.org"),
            password: String::from(password),
        }
    }

    #[test]
    fn signup_validation() {
        assert_eq!(new_user("alice", "correct horse").validate("correct horse"), Ok(()));
        assert_eq!(
            new_user("", "correct horse").validate("correct horse"),
            Err(Error::rejected(400, "Username is required")),
        );
        assert!(new_user("al ice", "correct horse")
            .validate("correct horse")
            .is_err());
        assert!(new_user("alice", "short").validate("short").is_err());
        assert_eq!(
            new_user("alice", "correct horse").validate("correct h0rse"),
            Err(Error::rejected(400, "Passwords do not match")),
        );
    }

    #[test]
    fn point_actions_serialize_lowercase() {
        assert_eq!(
            serde_json::to_string(&PointAction::Review).unwrap(),
            r#""review""#
        );
    }
}
