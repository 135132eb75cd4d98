//! Single-flight token refresh coordination.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use riptide_domain::{RefreshError, TokenPair, token_preview};
use tokio::sync::oneshot;

use crate::ports::{RefreshEndpoint, SessionStore};

/// Refresh lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshState {
    /// No refresh is running.
    #[default]
    Idle,
    /// A refresh is in flight; new arrivals queue behind it.
    Refreshing,
}

/// Mutable coordinator state. One mutex guards both fields so the
/// check-and-set on arrival is atomic even across OS threads.
#[derive(Debug, Default)]
struct CoordinatorState {
    state: RefreshState,
    queue: Vec<oneshot::Sender<Result<TokenPair, RefreshError>>>,
}

/// What a caller is handed when it asks for a refresh.
enum Ticket {
    /// This caller performs the exchange.
    Leader,
    /// Another exchange is in flight; wait for its outcome.
    Follower(oneshot::Receiver<Result<TokenPair, RefreshError>>),
}

/// Serializes token refreshes so a burst of 401s produces exactly one
/// exchange against the auth service.
///
/// The first caller to arrive while the coordinator is idle becomes the
/// leader and performs the exchange; everyone arriving before it settles
/// receives the same outcome. On success the new pair is persisted before
/// any waiter is woken. On failure the stored session is cleared and
/// every waiter receives a clone of the same terminal error.
pub struct RefreshCoordinator {
    store: Arc<dyn SessionStore>,
    endpoint: Arc<dyn RefreshEndpoint>,
    inner: Mutex<CoordinatorState>,
}

impl RefreshCoordinator {
    /// Creates a coordinator over `store` and `endpoint`.
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>, endpoint: Arc<dyn RefreshEndpoint>) -> Self {
        Self {
            store,
            endpoint,
            inner: Mutex::new(CoordinatorState::default()),
        }
    }

    /// Current lifecycle state, exposed for diagnostics.
    #[must_use]
    pub fn state(&self) -> RefreshState {
        self.lock().state
    }

    /// Number of callers parked behind the in-flight exchange.
    #[must_use]
    pub fn waiter_count(&self) -> usize {
        self.lock().queue.len()
    }

    /// Obtains a fresh token pair, joining an in-flight refresh when one
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns a [`RefreshError`] when the exchange failed; every caller
    /// waiting on the same exchange sees the same error.
    pub async fn refresh(&self) -> Result<TokenPair, RefreshError> {
        match self.begin() {
            Ticket::Leader => self.lead().await,
            Ticket::Follower(receiver) => match receiver.await {
                Ok(outcome) => outcome,
                Err(_) => Err(RefreshError::Interrupted),
            },
        }
    }

    fn begin(&self) -> Ticket {
        let mut inner = self.lock();
        match inner.state {
            RefreshState::Idle => {
                inner.state = RefreshState::Refreshing;
                Ticket::Leader
            }
            RefreshState::Refreshing => {
                let (sender, receiver) = oneshot::channel();
                inner.queue.push(sender);
                Ticket::Follower(receiver)
            }
        }
    }

    async fn lead(&self) -> Result<TokenPair, RefreshError> {
        // If the leading future is dropped mid-exchange, the guard wakes
        // every waiter with `Interrupted` instead of leaving them parked.
        let mut guard = SettleGuard {
            coordinator: self,
            armed: true,
        };
        let outcome = self.attempt().await;
        guard.armed = false;
        drop(guard);
        self.settle(&outcome);
        outcome
    }

    async fn attempt(&self) -> Result<TokenPair, RefreshError> {
        let Some(refresh_token) = self.store.refresh_token() else {
            self.store.clear();
            return Err(RefreshError::MissingToken);
        };
        match self.endpoint.refresh(&refresh_token).await {
            Ok(tokens) => {
                self.store.set_tokens(&tokens);
                tracing::debug!(
                    access_token = %token_preview(&tokens.access_token),
                    "token refresh succeeded"
                );
                Ok(tokens)
            }
            Err(err) => {
                self.store.clear();
                tracing::warn!(error = %err, "token refresh failed; session cleared");
                Err(err)
            }
        }
    }

    /// Returns to idle and fans `outcome` out to every queued waiter.
    fn settle(&self, outcome: &Result<TokenPair, RefreshError>) {
        let waiters = {
            let mut inner = self.lock();
            inner.state = RefreshState::Idle;
            std::mem::take(&mut inner.queue)
        };
        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }
    }

    fn lock(&self) -> MutexGuard<'_, CoordinatorState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct SettleGuard<'a> {
    coordinator: &'a RefreshCoordinator,
    armed: bool,
}

impl Drop for SettleGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.coordinator.settle(&Err(RefreshError::Interrupted));
        }
    }
}
