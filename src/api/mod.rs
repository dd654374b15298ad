//! Clients for the two external services dincharya depends on.
//!
//! - **Remote store**: a realtime key-value tree holding every user's tasks
//!   ([`store::RemoteStore`], implemented by [`database::RealtimeDatabase`]
//!   and the in-process [`memory::MemoryStore`])
//! - **Session provider**: credential verification and identity issuance
//!   ([`SessionProvider`], implemented by [`auth::IdentityToolkit`])
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dincharya::api::{auth::IdentityToolkit, SessionProvider};
//! use dincharya::libs::config::Config;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let config = Config::read()?.firebase()?;
//! let user = IdentityToolkit::new(&config).sign_in("me@example.com", "secret").await?;
//! println!("signed in as {}", user.uid);
//! # Ok(())
//! # }
//! ```

use anyhow::Result;

pub mod auth;
pub mod database;
pub mod memory;
pub mod store;

pub use auth::{FederatedCredential, User};

/// Issues user identities after verifying credentials.
///
/// Every method either returns a fresh [`User`] or fails with
/// [`AppError::AuthenticationFailed`](crate::libs::error::AppError) carrying
/// the provider's reason.
#[allow(async_fn_in_trait)]
pub trait SessionProvider {
    /// Creates an account and signs it in.
    async fn sign_up(&self, email: &str, password: &str) -> Result<User>;

    /// Verifies an email/password pair.
    async fn sign_in(&self, email: &str, password: &str) -> Result<User>;

    /// Exchanges a token from an external identity provider for an identity.
    async fn sign_in_with_idp(&self, credential: &FederatedCredential) -> Result<User>;

    /// Exchanges a refresh token for a fresh id token.
    ///
    /// The token endpoint does not return the email address, so the caller
    /// passes the one it already knows.
    async fn refresh(&self, refresh_token: &str, email: Option<String>) -> Result<User>;
}
