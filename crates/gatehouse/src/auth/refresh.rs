//! Single-flight coordination of token refreshes.
//!
//! The coordinator owns the refresh state of one client. The first request
//! that needs a refresh installs a shared future; every other request that
//! faults while it is pending awaits that same future and sees the same
//! outcome. The future clears the state itself when it completes, so the
//! state returns to idle exactly once per refresh.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use thiserror::Error;

use super::tokens::AccessToken;

/// Why a refresh could not produce a new access token.
#[derive(Debug, Clone, Error)]
pub(crate) enum RefreshFailure {
    #[error("no refresh token stored")]
    MissingRefreshToken,

    #[error("refresh rejected with HTTP {status}")]
    Rejected { status: u16 },

    #[error("refresh endpoint unreachable: {message}")]
    Unreachable { message: String },

    #[error("refresh response malformed: {message}")]
    Malformed { message: String },

    #[error("could not persist refreshed token: {message}")]
    Store { message: String },
}

pub(crate) type RefreshOutcome = Result<AccessToken, RefreshFailure>;

/// A refresh in flight, awaitable by any number of requests.
pub(crate) type PendingRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

enum RefreshState {
    Idle,
    Refreshing(PendingRefresh),
}

/// How a caller attached to a refresh.
pub(crate) enum Attached {
    /// This caller started the refresh.
    Initiated(PendingRefresh),
    /// A refresh was already pending; this caller waits on it.
    Joined(PendingRefresh),
}

impl Attached {
    pub(crate) fn into_pending(self) -> PendingRefresh {
        match self {
            Attached::Initiated(pending) | Attached::Joined(pending) => pending,
        }
    }
}

pub(crate) struct RefreshCoordinator {
    state: Mutex<RefreshState>,
    started: AtomicU64,
}

impl RefreshCoordinator {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(RefreshState::Idle),
            started: AtomicU64::new(0),
        }
    }

    /// Join the pending refresh, or start one with `start` when idle.
    ///
    /// `start` only builds the future; nothing runs until it is awaited. The
    /// built future must call [`RefreshCoordinator::finish`] before it
    /// resolves.
    pub(crate) fn attach<F>(&self, start: F) -> Attached
    where
        F: FnOnce() -> BoxFuture<'static, RefreshOutcome>,
    {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match &*state {
            RefreshState::Refreshing(pending) => Attached::Joined(pending.clone()),
            RefreshState::Idle => {
                let pending = start().shared();
                *state = RefreshState::Refreshing(pending.clone());
                self.started.fetch_add(1, Ordering::SeqCst);
                Attached::Initiated(pending)
            }
        }
    }

    /// Return to idle. Called by the refresh future as its last step.
    pub(crate) fn finish(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *state = RefreshState::Idle;
    }

    pub(crate) fn is_refreshing(&self) -> bool {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        matches!(*state, RefreshState::Refreshing(_))
    }

    /// Number of refreshes started over the coordinator's lifetime.
    pub(crate) fn started(&self) -> u64 {
        self.started.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("refreshing", &self.is_refreshing())
            .field("started", &self.started())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::oneshot;

    use super::*;

    fn gated_refresh(
        coordinator: Arc<RefreshCoordinator>,
        gate: oneshot::Receiver<RefreshOutcome>,
    ) -> BoxFuture<'static, RefreshOutcome> {
        async move {
            let outcome = gate.await.unwrap_or(Err(RefreshFailure::Unreachable {
                message: "gate dropped".to_string(),
            }));
            coordinator.finish();
            outcome
        }
        .boxed()
    }

    #[tokio::test]
    async fn second_caller_joins_pending_refresh() {
        let coordinator = Arc::new(RefreshCoordinator::new());
        let (tx, rx) = oneshot::channel();

        let first = coordinator.attach(|| gated_refresh(coordinator.clone(), rx));
        assert!(matches!(first, Attached::Initiated(_)));
        assert!(coordinator.is_refreshing());

        let second = coordinator.attach(|| panic!("must not start a second refresh"));
        assert!(matches!(second, Attached::Joined(_)));

        tx.send(Ok(AccessToken::new("T2"))).unwrap();

        let (a, b) = tokio::join!(first.into_pending(), second.into_pending());
        assert_eq!(a.unwrap().as_str(), "T2");
        assert_eq!(b.unwrap().as_str(), "T2");

        assert!(!coordinator.is_refreshing());
        assert_eq!(coordinator.started(), 1);
    }

    #[tokio::test]
    async fn failure_is_shared_with_every_waiter() {
        let coordinator = Arc::new(RefreshCoordinator::new());
        let (tx, rx) = oneshot::channel();

        let first = coordinator.attach(|| gated_refresh(coordinator.clone(), rx));
        let second = coordinator.attach(|| panic!("must not start a second refresh"));

        tx.send(Err(RefreshFailure::Rejected { status: 400 }))
            .unwrap();

        let (a, b) = tokio::join!(first.into_pending(), second.into_pending());
        assert!(matches!(a, Err(RefreshFailure::Rejected { status: 400 })));
        assert!(matches!(b, Err(RefreshFailure::Rejected { status: 400 })));
    }

    #[tokio::test]
    async fn new_refresh_starts_after_completion() {
        let coordinator = Arc::new(RefreshCoordinator::new());

        let (tx, rx) = oneshot::channel();
        let first = coordinator.attach(|| gated_refresh(coordinator.clone(), rx));
        tx.send(Ok(AccessToken::new("T2"))).unwrap();
        first.into_pending().await.unwrap();

        let (tx, rx) = oneshot::channel();
        let second = coordinator.attach(|| gated_refresh(coordinator.clone(), rx));
        assert!(matches!(second, Attached::Initiated(_)));
        tx.send(Ok(AccessToken::new("T3"))).unwrap();
        assert_eq!(second.into_pending().await.unwrap().as_str(), "T3");

        assert_eq!(coordinator.started(), 2);
    }
}
