#![allow(dead_code)]

use anyhow::Result;
use dincharya::api::{FederatedCredential, SessionProvider, User};
use dincharya::libs::error::{AppError, AuthErrorCode};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

pub fn user(uid: &str) -> User {
    User {
        uid: uid.to_string(),
        email: Some(format!("{}@example.com", uid)),
        id_token: format!("id-{}", uid),
        refresh_token: format!("refresh-{}", uid),
    }
}

/// A stored task node as the database would hold it.
pub fn task_json(title: &str, category: &str, created_at: &str) -> Value {
    json!({
        "title": title,
        "description": "",
        "category": category,
        "dueDate": "2026-10-20",
        "status": "pending",
        "createdAt": created_at,
        "updatedAt": created_at,
    })
}

/// In-memory identity provider with a fixed set of rules:
/// passwords shorter than 6 characters are weak, refresh tokens are
/// `refresh-{uid}`, and the Google token `"bad"` is rejected.
#[derive(Clone, Default)]
pub struct ScriptedProvider {
    accounts: Arc<Mutex<HashMap<String, (String, String)>>>,
    refresh_rejected: Arc<Mutex<bool>>,
}

impl ScriptedProvider {
    pub fn with_account(email: &str, password: &str, uid: &str) -> Self {
        let provider = Self::default();
        provider
            .accounts
            .lock()
            .insert(email.to_string(), (password.to_string(), uid.to_string()));
        provider
    }

    pub fn reject_refresh(&self) {
        *self.refresh_rejected.lock() = true;
    }

    fn issue(uid: &str, email: Option<String>) -> User {
        User {
            uid: uid.to_string(),
            email,
            id_token: format!("id-{}", uid),
            refresh_token: format!("refresh-{}", uid),
        }
    }

    fn reject(code: AuthErrorCode) -> anyhow::Error {
        AppError::AuthenticationFailed(code).into()
    }
}

impl SessionProvider for ScriptedProvider {
    async fn sign_up(&self, email: &str, password: &str) -> Result<User> {
        let mut accounts = self.accounts.lock();
        if accounts.contains_key(email) {
            return Err(Self::reject(AuthErrorCode::EmailAlreadyInUse));
        }
        if password.len() < 6 {
            return Err(Self::reject(AuthErrorCode::WeakPassword));
        }
        let uid = format!("uid-{}", accounts.len() + 1);
        accounts.insert(email.to_string(), (password.to_string(), uid.clone()));
        Ok(Self::issue(&uid, Some(email.to_string())))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<User> {
        match self.accounts.lock().get(email) {
            None => Err(Self::reject(AuthErrorCode::UserNotFound)),
            Some((stored, _)) if stored != password => Err(Self::reject(AuthErrorCode::WrongPassword)),
            Some((_, uid)) => Ok(Self::issue(uid, Some(email.to_string()))),
        }
    }

    async fn sign_in_with_idp(&self, credential: &FederatedCredential) -> Result<User> {
        if credential.id_token == "bad" {
            return Err(Self::reject(AuthErrorCode::Other("INVALID_IDP_RESPONSE".to_string())));
        }
        Ok(Self::issue(&format!("google-{}", credential.id_token), None))
    }

    async fn refresh(&self, refresh_token: &str, email: Option<String>) -> Result<User> {
        if *self.refresh_rejected.lock() {
            return Err(Self::reject(AuthErrorCode::TokenExpired));
        }
        match refresh_token.strip_prefix("refresh-") {
            Some(uid) => Ok(Self::issue(uid, email)),
            None => Err(Self::reject(AuthErrorCode::TokenExpired)),
        }
    }
}
