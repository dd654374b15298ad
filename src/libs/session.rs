//! The session-state holder.
//!
//! One [`SessionContext`] is created at startup and passed explicitly to
//! everything that needs the current identity: the task repository reads it
//! to scope its paths, the dashboard watches it to resubscribe when the user
//! changes. Identity changes are published through a `watch` channel, so a
//! new observer immediately sees the current state and then every change.
//!
//! The refresh token is cached encrypted on disk ([`Secret`]) so that a
//! session survives between command invocations.

use crate::api::{FederatedCredential, SessionProvider, User};
use crate::libs::error::{user_message, AppError};
use crate::libs::messages::Message;
use crate::libs::secret::Secret;
use crate::msg_warning;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

pub const SESSION_FILE: &str = ".session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<User>,
    /// True until the initial identity check has completed.
    pub loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self { user: None, loading: true }
    }
}

impl SessionState {
    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.uid.as_str())
    }
}

/// Read-only view of the session, handed to components that only need the identity.
pub type SessionWatch = watch::Receiver<SessionState>;

#[derive(Serialize, Deserialize)]
struct CachedSession {
    uid: String,
    email: Option<String>,
    refresh_token: String,
}

pub struct SessionContext<P: SessionProvider> {
    provider: P,
    cache: Secret,
    state: watch::Sender<SessionState>,
}

impl<P: SessionProvider> SessionContext<P> {
    pub fn new(provider: P, cache: Secret) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self { provider, cache, state }
    }

    /// Restores the cached session, if any, and ends the loading phase.
    ///
    /// A cached token the provider no longer accepts is discarded; the
    /// context then simply starts signed out.
    pub async fn start(&self) {
        let user = match self.cache.load() {
            Some(raw) => match self.restore(&raw).await {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!(error = %e, "cached session rejected");
                    msg_warning!(Message::SessionRestoreFailed(user_message(&e, Message::SessionExpired).to_string()));
                    if let Err(e) = self.cache.clear() {
                        tracing::error!(error = %e, "failed to clear session cache");
                    }
                    None
                }
            },
            None => None,
        };
        self.publish(user);
    }

    async fn restore(&self, raw: &str) -> Result<User> {
        let cached: CachedSession = serde_json::from_str(raw)?;
        let user = self.provider.refresh(&cached.refresh_token, cached.email).await?;
        if user.uid != cached.uid {
            tracing::warn!(cached = %cached.uid, issued = %user.uid, "refresh returned a different user");
        }
        self.persist(&user)?;
        tracing::debug!(uid = %user.uid, "session restored");
        Ok(user)
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<User> {
        let user = self.provider.sign_up(email.trim(), password).await?;
        self.establish(user)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User> {
        let user = self.provider.sign_in(email.trim(), password).await?;
        self.establish(user)
    }

    pub async fn sign_in_with_federated_provider(&self, credential: &FederatedCredential) -> Result<User> {
        let user = self.provider.sign_in_with_idp(credential).await?;
        self.establish(user)
    }

    /// Exchanges the current refresh token for a fresh id token and publishes it.
    ///
    /// A refresh the provider rejects invalidates the session: the cache is
    /// cleared and observers see the user signed out. Transport failures
    /// leave the session as it is.
    pub async fn renew(&self) -> Result<User> {
        let current = self.require_user()?;
        match self.provider.refresh(&current.refresh_token, current.email.clone()).await {
            Ok(user) => {
                if let Err(e) = self.persist(&user) {
                    tracing::error!(error = %e, "failed to cache session");
                }
                self.publish(Some(user.clone()));
                tracing::debug!(uid = %user.uid, "session renewed");
                Ok(user)
            }
            Err(e) => {
                if let Some(AppError::AuthenticationFailed(code)) = e.downcast_ref::<AppError>() {
                    tracing::warn!(uid = %current.uid, code = %code, "refresh rejected, ending session");
                    self.sign_out()?;
                }
                Err(e)
            }
        }
    }

    pub fn sign_out(&self) -> Result<()> {
        self.cache.clear()?;
        self.publish(None);
        tracing::debug!("signed out");
        Ok(())
    }

    /// Observer that sees the current state right away, then every change.
    pub fn on_identity_change(&self) -> SessionWatch {
        self.state.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    pub fn require_user(&self) -> Result<User, AppError> {
        self.current_user().ok_or(AppError::AuthenticationRequired)
    }

    fn establish(&self, user: User) -> Result<User> {
        if let Err(e) = self.persist(&user) {
            // The session still works for this run, it just won't be remembered.
            tracing::error!(error = %e, "failed to cache session");
        }
        self.publish(Some(user.clone()));
        tracing::debug!(uid = %user.uid, "signed in");
        Ok(user)
    }

    fn persist(&self, user: &User) -> Result<()> {
        let cached = CachedSession {
            uid: user.uid.clone(),
            email: user.email.clone(),
            refresh_token: user.refresh_token.clone(),
        };
        self.cache.save(&serde_json::to_string(&cached)?)
    }

    fn publish(&self, user: Option<User>) {
        self.state.send_replace(SessionState { user, loading: false });
    }
}
