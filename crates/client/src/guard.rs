//! Navigation guard backed by the session

use crate::session::{Session, SessionEvent};
use std::sync::Arc;
use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};
use tracing::warn;

/// Outcome of a navigation check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(String),
}

/// Gates navigation on the session being authenticated
#[derive(Debug, Clone)]
pub struct RouteGuard {
    session: Arc<Session>,
}

impl RouteGuard {
    pub const fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    pub fn login_path(&self) -> &str {
        self.session.login_path()
    }

    /// Decide whether navigation to `path` may proceed
    ///
    /// The first check hydrates the session from persisted storage.
    pub fn check(&self, path: &str) -> GuardDecision {
        if !self.session.is_authenticated() {
            self.session.init();
        }

        if path == self.login_path() || self.session.is_authenticated() {
            GuardDecision::Allow
        } else {
            GuardDecision::Redirect(self.login_path().to_string())
        }
    }

    /// Stream of redirects requested by logouts
    pub fn redirects(&self) -> Redirects {
        Redirects {
            events: self.session.subscribe(),
        }
    }
}

/// Redirect destinations published when the session ends
#[derive(Debug)]
pub struct Redirects {
    events: broadcast::Receiver<SessionEvent>,
}

impl Redirects {
    /// Wait for the next logout; `None` once the session is gone
    pub async fn next(&mut self) -> Option<String> {
        loop {
            match self.events.recv().await {
                Ok(SessionEvent::LoggedOut { redirect_to }) => return Some(redirect_to),
                Ok(SessionEvent::Authenticated) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Missed {} session events", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Latest redirect already published, without waiting
    pub fn try_next(&mut self) -> Option<String> {
        let mut latest = None;
        loop {
            match self.events.try_recv() {
                Ok(SessionEvent::LoggedOut { redirect_to }) => latest = Some(redirect_to),
                Ok(SessionEvent::Authenticated) | Err(TryRecvError::Lagged(_)) => {}
                Err(TryRecvError::Empty | TryRecvError::Closed) => return latest,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryTokenStore, Persistence, TokenStore};
    use crate::types::TokenResponse;

    fn guard_with(store: &MemoryTokenStore) -> (Arc<Session>, RouteGuard) {
        let session = Arc::new(Session::new(Persistence::available(store.clone())));
        (session.clone(), RouteGuard::new(session))
    }

    #[test]
    fn unauthenticated_navigation_redirects_to_login() {
        let (_, guard) = guard_with(&MemoryTokenStore::new());
        assert_eq!(guard.check("/items"), GuardDecision::Redirect("/login".to_string()));
    }

    #[test]
    fn login_page_is_always_allowed() {
        let (_, guard) = guard_with(&MemoryTokenStore::new());
        assert_eq!(guard.check("/login"), GuardDecision::Allow);
    }

    #[test]
    fn login_path_comes_from_the_session() {
        let session = Arc::new(Session::default().with_login_path("/signin"));
        let guard = RouteGuard::new(session);

        assert_eq!(guard.check("/signin"), GuardDecision::Allow);
        assert_eq!(guard.check("/items"), GuardDecision::Redirect("/signin".to_string()));
    }

    #[test]
    fn first_check_hydrates_from_storage() {
        let store = MemoryTokenStore::new();
        store.set("token", "xyz").unwrap();
        let (session, guard) = guard_with(&store);

        assert_eq!(guard.check("/dashboard"), GuardDecision::Allow);
        assert_eq!(session.token().as_deref(), Some("xyz"));
    }

    #[tokio::test]
    async fn logout_is_published_as_redirect() {
        let (session, guard) = guard_with(&MemoryTokenStore::new());
        let mut redirects = guard.redirects();

        session.set_auth(&TokenResponse {
            access_token: "abc123".to_string(),
            token_type: "bearer".to_string(),
            role: "CASHIER".to_string(),
        });
        session.logout();

        assert_eq!(redirects.next().await.as_deref(), Some("/login"));
        assert_eq!(guard.check("/sales"), GuardDecision::Redirect("/login".to_string()));
    }

    #[test]
    fn try_next_reports_pending_logout_only() {
        let (session, guard) = guard_with(&MemoryTokenStore::new());
        let mut redirects = guard.redirects();
        assert_eq!(redirects.try_next(), None);

        session.logout();

        assert_eq!(redirects.try_next().as_deref(), Some("/login"));
        assert_eq!(redirects.try_next(), None);
    }
}
