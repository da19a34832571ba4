use std::collections::HashMap;

use anyhow::Context;

use crate::api::{User, UserId};

const USER_KEY: &str = "user";
const THEME_KEY: &str = "theme";

/// Persistent key-value storage for the session, eg. the browser's local storage
pub trait Store {
    fn load(&self, key: &str) -> Option<serde_json::Value>;
    fn save(&mut self, key: &str, value: serde_json::Value) -> anyhow::Result<()>;
    fn remove(&mut self, key: &str);
}

/// Store that forgets everything on exit
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(HashMap<String, serde_json::Value>);

impl Store for MemoryStore {
    fn load(&self, key: &str) -> Option<serde_json::Value> {
        self.0.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: serde_json::Value) -> anyhow::Result<()> {
        self.0.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.0.remove(key);
    }
}

#[derive(
    Clone, Copy, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// Logged-in user and display preferences, mirrored into a `Store`
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Session {
    user: Option<User>,
    theme: Theme,
}

impl Session {
    /// Restores the session persisted by a previous run; unreadable entries are dropped
    pub fn hydrate(store: &impl Store) -> Session {
        Session {
            user: restore(store, USER_KEY),
            theme: restore(store, THEME_KEY).unwrap_or_default(),
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user.as_ref().map(|u| &u.id)
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn login(&mut self, store: &mut impl Store, user: User) {
        tracing::info!(user = %user.id, username = %user.username, "logged in");
        if let Err(err) = persist(store, USER_KEY, &user) {
            tracing::error!(?err, "failed persisting the session");
        }
        self.user = Some(user);
    }

    pub fn logout(&mut self, store: &mut impl Store) {
        if let Some(user) = self.user.take() {
            tracing::info!(user = %user.id, "logged out");
        }
        store.remove(USER_KEY);
    }

    pub fn set_theme(&mut self, store: &mut impl Store, theme: Theme) {
        if let Err(err) = persist(store, THEME_KEY, &theme) {
            tracing::error!(?err, "failed persisting the theme");
        }
        self.theme = theme;
    }
}

fn persist<T: serde::Serialize>(store: &mut impl Store, key: &str, value: &T) -> anyhow::Result<()> {
    let value = serde_json::to_value(value).with_context(|| format!("serializing {key}"))?;
    store
        .save(key, value)
        .with_context(|| format!("saving {key} to storage"))
}

fn restore<T: serde::de::DeserializeOwned>(store: &impl Store, key: &str) -> Option<T> {
    let value = store.load(key)?;
    match serde_json::from_value(value) {
        Ok(v) => Some(v),
        Err(err) => {
            tracing::warn!(?err, key, "dropping unreadable stored value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fanhub_mock_server::MockServer;

    fn alice() -> User {
        let server = MockServer::new();
        let id = server.test_create_user("alice", "alice@example.org", "password1");
        server.test_user(&id)
    }

    #[test]
    fn login_survives_reload() {
        let mut store = MemoryStore::default();
        let mut s = Session::hydrate(&store);
        assert!(!s.is_logged_in());
        assert_eq!(s.theme(), Theme::Light);

        let user = alice();
        s.login(&mut store, user.clone());
        s.set_theme(&mut store, Theme::Dark);

        let reloaded = Session::hydrate(&store);
        assert_eq!(reloaded.user(), Some(&user));
        assert_eq!(reloaded.theme(), Theme::Dark);
    }

    #[test]
    fn logout_clears_memory_and_storage() {
        let mut store = MemoryStore::default();
        let mut s = Session::default();
        s.login(&mut store, alice());
        s.set_theme(&mut store, Theme::Dark);
        s.logout(&mut store);
        assert_eq!(s.user(), None);
        assert!(store.load(USER_KEY).is_none());

        // the theme is a preference of the device, not of the user
        assert_eq!(Session::hydrate(&store).theme(), Theme::Dark);
    }

    #[test]
    fn garbage_in_storage_is_ignored() {
        let mut store = MemoryStore::default();
        store
            .save(USER_KEY, serde_json::json!({ "not": "a user" }))
            .unwrap();
        store.save(THEME_KEY, serde_json::json!("sepia")).unwrap();
        assert_eq!(Session::hydrate(&store), Session::default());
    }
}
