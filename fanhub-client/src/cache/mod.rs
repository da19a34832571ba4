use std::future::Future;

use crate::api::Error;

mod collections;
pub use collections::Collections;

mod recommendations;
pub use recommendations::Recommendations;

mod users;
pub use users::UserDirectory;

/// Answer of a cache mutation; failures never escape as errors
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MutationResult {
    pub success: bool,
    pub message: String,
}

impl MutationResult {
    pub fn succeeded(message: impl Into<String>) -> MutationResult {
        MutationResult {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(err: &Error) -> MutationResult {
        MutationResult {
            success: false,
            message: err.user_message(),
        }
    }
}

/// State from before an optimistic patch, put back if the server refuses it
#[must_use]
pub struct Snapshot<S>(S);

/// Locally held server state with the last fetch error
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Cache<S> {
    state: S,
    error: Option<Error>,
    loaded: bool,
}

impl<S: Clone> Cache<S> {
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Error of the last fetch, if it failed
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Whether a fetch ever succeeded
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Stores a fetch result; on failure the previous contents stay
    pub fn load<R>(&mut self, res: Result<R, Error>, store: impl FnOnce(&mut S, R)) -> bool {
        match res {
            Ok(r) => {
                store(&mut self.state, r);
                self.error = None;
                self.loaded = true;
                true
            }
            Err(err) => {
                tracing::warn!(?err, "fetch failed, keeping cached contents");
                self.error = Some(err);
                false
            }
        }
    }

    pub fn apply(&mut self, patch: impl FnOnce(&mut S)) -> Snapshot<S> {
        let snapshot = Snapshot(self.state.clone());
        patch(&mut self.state);
        snapshot
    }

    pub fn reconcile<R>(
        &mut self,
        snapshot: Snapshot<S>,
        res: Result<R, Error>,
        describe: impl FnOnce(R) -> String,
    ) -> MutationResult {
        match res {
            Ok(r) => MutationResult::succeeded(describe(r)),
            Err(err) => {
                tracing::warn!(?err, "mutation refused, restoring snapshot");
                self.state = snapshot.0;
                MutationResult::failed(&err)
            }
        }
    }

    /// Patches right away, then undoes the patch if `call` fails
    pub async fn mutate<R>(
        &mut self,
        patch: impl FnOnce(&mut S),
        call: impl Future<Output = Result<R, Error>>,
        describe: impl FnOnce(R) -> String,
    ) -> MutationResult {
        let snapshot = self.apply(patch);
        let res = call.await;
        self.reconcile(snapshot, res, describe)
    }

    /// For mutations whose patch depends on the server's answer
    pub async fn settle<R>(
        &mut self,
        call: impl Future<Output = Result<R, Error>>,
        patch: impl FnOnce(&mut S, R) -> String,
    ) -> MutationResult {
        match call.await {
            Ok(r) => MutationResult::succeeded(patch(&mut self.state, r)),
            Err(err) => {
                tracing::warn!(?err, "mutation refused");
                MutationResult::failed(&err)
            }
        }
    }
}

/// Adjusts a counter after a like toggle answer
pub(crate) fn apply_like(likes: &mut u32, message: &str) {
    if message == crate::api::LIKED_MESSAGE {
        *likes += 1;
    } else {
        *likes = likes.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn refused_patch_is_undone() {
        let mut c = Cache::<Vec<u32>>::default();
        let res = block_on(c.mutate(
            |v| v.push(1),
            async { Err::<(), _>(Error::rejected(403, "Nope")) },
            |()| String::from("ok"),
        ));
        assert_eq!(
            res,
            MutationResult {
                success: false,
                message: String::from("Nope"),
            }
        );
        assert!(c.state().is_empty());
    }

    #[test]
    fn accepted_patch_stays() {
        let mut c = Cache::<Vec<u32>>::default();
        let res = block_on(c.mutate(
            |v| v.push(1),
            async { Ok::<_, Error>(()) },
            |()| String::from("Added"),
        ));
        assert_eq!(res, MutationResult::succeeded("Added"));
        assert_eq!(c.state(), &vec![1]);
    }

    #[test]
    fn failed_load_keeps_contents() {
        let mut c = Cache::<Vec<u32>>::default();
        assert!(c.load(Ok(vec![1, 2]), |s, v| *s = v));
        assert!(!c.load(Err(Error::Server(String::from("down"))), |s, v| *s = v));
        assert_eq!(c.state(), &vec![1, 2]);
        assert!(c.is_loaded());
        assert_eq!(c.error(), Some(&Error::Server(String::from("down"))));

        let mut fresh = Cache::<Vec<u32>>::default();
        fresh.load(Err(Error::Network(String::from("offline"))), |s, v| *s = v);
        assert!(fresh.state().is_empty());
        assert!(!fresh.is_loaded());
    }
}
