//! Domain error taxonomy.
//!
//! Library code propagates `anyhow::Error`; values of [`AppError`] are placed
//! inside it wherever a caller needs to branch on the failure kind, and are
//! recovered with `downcast_ref::<AppError>()`.

use crate::libs::messages::Message;
use thiserror::Error;

/// Provider-specific reason for a rejected credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthErrorCode {
    InvalidEmail,
    UserNotFound,
    WrongPassword,
    EmailAlreadyInUse,
    WeakPassword,
    TooManyRequests,
    UserDisabled,
    PopupClosed,
    PopupBlocked,
    AccountExistsWithDifferentCredential,
    TokenExpired,
    Other(String),
}

impl AuthErrorCode {
    /// Maps an identity REST API error string to a code.
    ///
    /// The API sometimes appends detail after a colon
    /// (`WEAK_PASSWORD : Password should be at least 6 characters`), so only
    /// the leading token is compared.
    pub fn from_provider(raw: &str) -> Self {
        let code = raw.split(':').next().unwrap_or(raw).trim();
        match code {
            "INVALID_EMAIL" | "MISSING_EMAIL" => Self::InvalidEmail,
            "EMAIL_NOT_FOUND" | "USER_NOT_FOUND" => Self::UserNotFound,
            "INVALID_PASSWORD" | "MISSING_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => Self::WrongPassword,
            "EMAIL_EXISTS" => Self::EmailAlreadyInUse,
            "WEAK_PASSWORD" => Self::WeakPassword,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => Self::TooManyRequests,
            "USER_DISABLED" => Self::UserDisabled,
            "FEDERATED_USER_ID_ALREADY_LINKED" | "EMAIL_EXISTS_WITH_DIFFERENT_CREDENTIAL" => {
                Self::AccountExistsWithDifferentCredential
            }
            "TOKEN_EXPIRED" | "INVALID_REFRESH_TOKEN" | "INVALID_ID_TOKEN" => Self::TokenExpired,
            other => Self::Other(other.to_string()),
        }
    }

    /// Short user-facing text for this code.
    pub fn message(&self) -> Message {
        match self {
            Self::InvalidEmail => Message::AuthInvalidEmail,
            Self::UserNotFound => Message::AuthUserNotFound,
            Self::WrongPassword => Message::AuthWrongPassword,
            Self::EmailAlreadyInUse => Message::AuthEmailAlreadyInUse,
            Self::WeakPassword => Message::AuthWeakPassword,
            Self::TooManyRequests => Message::AuthTooManyRequests,
            Self::UserDisabled => Message::AuthUserDisabled,
            Self::PopupClosed => Message::AuthFederatedCancelled,
            Self::PopupBlocked => Message::AuthFederatedBlocked,
            Self::AccountExistsWithDifferentCredential => Message::AuthAccountExistsWithDifferentCredential,
            Self::TokenExpired => Message::SessionExpired,
            Self::Other(_) => Message::AuthFailed,
        }
    }
}

impl std::fmt::Display for AuthErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Other(code) => write!(f, "{}", code),
            known => write!(f, "{:?}", known),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("authentication required")]
    AuthenticationRequired,

    #[error("authentication failed: {0}")]
    AuthenticationFailed(AuthErrorCode),

    #[error("store operation failed: {0}")]
    StoreOperationFailed(String),

    #[error("subscription failed: {0}")]
    SubscriptionFailed(String),

    #[error("invalid input: {0}")]
    Validation(String),
}

impl AppError {
    /// Short user-facing text for this error.
    pub fn message(&self) -> Message {
        match self {
            Self::AuthenticationRequired => Message::LoginRequired,
            Self::AuthenticationFailed(code) => code.message(),
            Self::StoreOperationFailed(_) => Message::StoreOperationFailed,
            Self::SubscriptionFailed(_) => Message::TasksLoadFailed,
            Self::Validation(reason) => Message::InvalidTask(reason.clone()),
        }
    }
}

/// User-facing text for any error, falling back to `fallback` for errors outside the taxonomy.
pub fn user_message(error: &anyhow::Error, fallback: Message) -> Message {
    match error.downcast_ref::<AppError>() {
        Some(app_error) => app_error.message(),
        None => fallback,
    }
}

/// Like [`user_message`], but provider codes without a dedicated text also fall back.
///
/// Used by the auth commands so that an unknown code reads as "Failed to
/// login" or "Failed to create account" depending on the flow.
pub fn auth_failure_message(error: &anyhow::Error, fallback: Message) -> Message {
    match error.downcast_ref::<AppError>() {
        Some(AppError::AuthenticationFailed(AuthErrorCode::Other(_))) | None => fallback,
        Some(app_error) => app_error.message(),
    }
}
