//! Session state of the signed-in staff member
//!
//! One [`Session`] exists per running client. It is created empty at startup,
//! hydrated once from the persisted token and afterwards only changed through
//! [`Session::set_auth`], [`Session::set_user`] and [`Session::logout`].
//! Navigation is not performed here: logout publishes a
//! [`SessionEvent::LoggedOut`] that the route guard turns into a redirect.

use crate::storage::Persistence;
use crate::types::{Role, TokenResponse, User};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Key the token is persisted under
pub const DEFAULT_TOKEN_KEY: &str = "token";

/// Destination requested when the session ends
pub const DEFAULT_LOGIN_PATH: &str = "/login";

const EVENT_CAPACITY: usize = 16;

/// Snapshot of the session fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub token: Option<String>,
    pub user: Option<User>,
}

impl SessionState {
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|user| user.role)
    }
}

/// Notifications published by the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A token was stored through `set_auth`
    Authenticated,
    /// The session was cleared and the consumer should navigate to `redirect_to`
    LoggedOut { redirect_to: String },
}

/// Process-wide session holder
#[derive(Debug)]
pub struct Session {
    state: RwLock<SessionState>,
    persistence: Persistence,
    token_key: String,
    login_path: String,
    events: broadcast::Sender<SessionEvent>,
}

impl Session {
    /// Create an empty session backed by `persistence`
    pub fn new(persistence: Persistence) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: RwLock::new(SessionState::default()),
            persistence,
            token_key: DEFAULT_TOKEN_KEY.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            events,
        }
    }

    /// Override the key the token is persisted under
    #[must_use]
    pub fn with_token_key(mut self, key: impl Into<String>) -> Self {
        self.token_key = key.into();
        self
    }

    /// Override the destination published on logout
    #[must_use]
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub const fn persistence(&self) -> &Persistence {
        &self.persistence
    }

    /// Hydrate the token from persistence unless one is already held
    pub fn init(&self) {
        if self.read().token.is_some() {
            return;
        }

        let Some(stored) = self
            .persistence
            .load(&self.token_key)
            .filter(|token| !token.is_empty())
        else {
            return;
        };

        let mut state = self.write();
        if state.token.is_none() {
            debug!("Restored session token from storage");
            state.token = Some(stored);
        }
    }

    /// Store the token of a successful login; the user record is left untouched
    pub fn set_auth(&self, credentials: &TokenResponse) {
        self.write().token = Some(credentials.access_token.clone());
        self.persistence
            .save(&self.token_key, &credentials.access_token);
        info!(role = %credentials.role, "Session authenticated");
        let _ = self.events.send(SessionEvent::Authenticated);
    }

    /// Cache the user record in memory only
    pub fn set_user(&self, user: User) {
        self.write().user = Some(user);
    }

    /// Clear the session and its persisted token, then request navigation to login
    pub fn logout(&self) {
        {
            let mut state = self.write();
            state.token = None;
            state.user = None;
        }
        self.persistence.remove(&self.token_key);
        info!("Session cleared");
        let _ = self.events.send(SessionEvent::LoggedOut {
            redirect_to: self.login_path.clone(),
        });
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.read().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated()
    }

    pub fn role(&self) -> Option<Role> {
        self.read().role()
    }

    pub fn snapshot(&self) -> SessionState {
        self.read().clone()
    }

    /// Subscribe to session notifications
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Persistence::Unavailable)
    }
}
