use anyhow::Context;
use fanhub_client::Store;
use gloo_storage::{LocalStorage, Storage};

/// The browser's local storage
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LocalStore;

impl Store for LocalStore {
    fn load(&self, key: &str) -> Option<serde_json::Value> {
        LocalStorage::get(key).ok()
    }

    fn save(&mut self, key: &str, value: serde_json::Value) -> anyhow::Result<()> {
        LocalStorage::set(key, &value).with_context(|| format!("writing {key} to local storage"))
    }

    fn remove(&mut self, key: &str) {
        LocalStorage::delete(key)
    }
}
