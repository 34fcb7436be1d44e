//! SessionManager - authentication state and its side effects.
//!
//! The remote service keeps the session in an HTTP-only cookie, so the client
//! can only learn whether it is still valid by making an authenticated call.
//! The manager does that once at startup, periodically afterwards, and
//! publishes the result as a [`SessionSnapshot`] on a `watch` channel.

use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use chrono::Utc;
use pawmatch_core::catalog::CatalogApi;
use pawmatch_core::session::{Access, Credentials, Route, SessionSnapshot};
use pawmatch_core::storage::{KeyValueStore, KeyValueStoreExt, PersistedKey};
use pawmatch_core::{PawError, Result};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Default period of background revalidation.
pub const DEFAULT_REVALIDATE_INTERVAL: Duration = Duration::from_secs(5 * 60);

struct RevalidationTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct SessionManager {
    api: Arc<dyn CatalogApi>,
    store: Arc<dyn KeyValueStore>,
    state: watch::Sender<SessionSnapshot>,
    revalidate_interval: Duration,
    revalidation: Mutex<Option<RevalidationTask>>,
}

impl SessionManager {
    pub fn new(api: Arc<dyn CatalogApi>, store: Arc<dyn KeyValueStore>) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::initial());
        Self {
            api,
            store,
            state,
            revalidate_interval: DEFAULT_REVALIDATE_INTERVAL,
            revalidation: Mutex::new(None),
        }
    }

    pub fn with_revalidate_interval(mut self, interval: Duration) -> Self {
        self.revalidate_interval = interval;
        self
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    /// Guard decision for the protected view.
    pub fn access(&self) -> Access {
        self.state.borrow().access()
    }

    /// Whether the service still honours the session cookie.
    ///
    /// Uses the breed list as the probe. Never fails: any error means
    /// "not authenticated".
    pub async fn validate_session(&self) -> bool {
        match self.api.breeds().await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!("[SessionManager] Session check failed: {}", e);
                false
            }
        }
    }

    /// Resolves the initial session check.
    pub async fn initialize(&self) {
        self.state
            .send_modify(|s| s.is_loading_initial_check = true);

        let valid = self.validate_session().await;
        if valid {
            let credentials = self.load_persisted_user();
            self.state.send_modify(|s| {
                s.authenticated = true;
                s.credentials = credentials;
                s.route = Route::Search;
                s.last_validated_at = Some(Utc::now());
            });
        } else {
            self.forget_user();
            self.state.send_modify(|s| {
                s.authenticated = false;
                s.credentials = None;
                s.route = Route::Entry;
            });
        }

        self.state
            .send_modify(|s| s.is_loading_initial_check = false);
        tracing::info!(
            "[SessionManager] Initial session check: {}",
            if valid { "authenticated" } else { "not authenticated" }
        );
    }

    /// Re-checks the session and applies any transition.
    ///
    /// valid -> invalid runs the logout cleanup; invalid -> valid adopts the
    /// persisted credentials.
    pub async fn revalidate(&self) {
        let was_authenticated = self.state.borrow().authenticated;
        let valid = self.validate_session().await;

        match (was_authenticated, valid) {
            (true, false) => {
                tracing::info!("[SessionManager] Session expired, clearing local state");
                self.clear_local_state();
            }
            (false, true) => {
                tracing::info!("[SessionManager] Session became valid, restoring user");
                let credentials = self.load_persisted_user();
                self.state.send_modify(|s| {
                    s.authenticated = true;
                    s.credentials = credentials;
                    s.route = Route::Search;
                    s.last_validated_at = Some(Utc::now());
                });
            }
            (true, true) => {
                self.state
                    .send_modify(|s| s.last_validated_at = Some(Utc::now()));
            }
            (false, false) => {}
        }
    }

    /// Starts periodic revalidation.
    ///
    /// The task holds only a weak reference, so it never keeps the manager
    /// alive; dropping the manager cancels it.
    pub fn start_revalidation(self: &Arc<Self>) {
        let mut slot = self.revalidation_slot();
        if slot.is_some() {
            tracing::warn!("[SessionManager] Revalidation already running, skipping");
            return;
        }

        let period = self.revalidate_interval;
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let manager: Weak<Self> = Arc::downgrade(self);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::debug!("[SessionManager] Revalidation started ({:?} interval)", period);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let Some(manager) = manager.upgrade() else {
                            break;
                        };
                        manager.revalidate().await;
                    }
                }
            }

            tracing::debug!("[SessionManager] Revalidation stopped");
        });

        *slot = Some(RevalidationTask { cancel, handle });
    }

    pub fn stop_revalidation(&self) {
        if let Some(task) = self.revalidation_slot().take() {
            task.cancel.cancel();
            drop(task.handle);
        }
    }

    pub fn is_revalidating(&self) -> bool {
        self.revalidation_slot()
            .as_ref()
            .is_some_and(|task| !task.handle.is_finished())
    }

    /// Logs in with `credentials`.
    ///
    /// Input is validated before any network call. On failure the session
    /// state is left as it was.
    pub async fn login(&self, credentials: Credentials) -> Result<()> {
        credentials.validate()?;

        if let Err(e) = self.api.login(&credentials).await {
            tracing::warn!("[SessionManager] Login failed: {}", e);
            return Err(match e {
                PawError::Authentication(_) => e,
                other => PawError::Authentication(other.to_string()),
            });
        }

        if let Err(e) = self.store.write_json(PersistedKey::User, &credentials) {
            tracing::warn!("[SessionManager] Failed to persist user: {}", e);
        }

        tracing::info!("[SessionManager] Logged in as {}", credentials.name);
        self.state.send_modify(|s| {
            s.authenticated = true;
            s.credentials = Some(credentials);
            s.is_loading_initial_check = false;
            s.route = Route::Search;
            s.last_validated_at = Some(Utc::now());
        });
        Ok(())
    }

    /// Logs out. The remote call is best effort; local cleanup always runs.
    pub async fn logout(&self) {
        if let Err(e) = self.api.logout().await {
            tracing::warn!("[SessionManager] Remote logout failed: {}", e);
        }
        self.clear_local_state();
        tracing::info!("[SessionManager] Logged out");
    }

    fn clear_local_state(&self) {
        for key in PersistedKey::ALL {
            if let Err(e) = self.store.clear(key) {
                tracing::warn!("[SessionManager] Failed to clear '{}': {}", key.as_str(), e);
            }
        }
        self.state.send_modify(|s| {
            s.authenticated = false;
            s.credentials = None;
            s.route = Route::Entry;
        });
    }

    /// Reads the stored user, discarding it when it cannot be decoded.
    fn load_persisted_user(&self) -> Option<Credentials> {
        match self.store.read_json::<Credentials>(PersistedKey::User) {
            Ok(credentials) => credentials,
            Err(e) => {
                tracing::warn!("[SessionManager] Discarding stored user: {}", e);
                self.forget_user();
                None
            }
        }
    }

    fn forget_user(&self) {
        if let Err(e) = self.store.clear(PersistedKey::User) {
            tracing::warn!("[SessionManager] Failed to remove stored user: {}", e);
        }
    }

    fn revalidation_slot(&self) -> std::sync::MutexGuard<'_, Option<RevalidationTask>> {
        self.revalidation.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        let slot = self
            .revalidation
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = slot.take() {
            task.cancel.cancel();
        }
    }
}
