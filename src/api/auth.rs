//! Identity REST API client.
//!
//! Email/password sign-up and sign-in, federated sign-in with an identity
//! provider token, and refresh-token exchange. Every rejected request is
//! turned into [`AppError::AuthenticationFailed`] carrying the provider's
//! error code so the command layer can pick the right message.

use super::SessionProvider;
use crate::libs::config::FirebaseConfig;
use crate::libs::error::{AppError, AuthErrorCode};
use anyhow::Result;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const SIGN_UP: &str = "accounts:signUp";
const SIGN_IN_WITH_PASSWORD: &str = "accounts:signInWithPassword";
const SIGN_IN_WITH_IDP: &str = "accounts:signInWithIdp";
const IDP_REQUEST_URI: &str = "http://localhost";

pub const GOOGLE_PROVIDER_ID: &str = "google.com";

/// Identity issued by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uid: String,
    pub email: Option<String>,
    pub id_token: String,
    pub refresh_token: String,
}

/// Token obtained from an external identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedCredential {
    pub provider_id: String,
    pub id_token: String,
}

impl FederatedCredential {
    pub fn google(id_token: &str) -> Self {
        Self {
            provider_id: GOOGLE_PROVIDER_ID.to_string(),
            id_token: id_token.trim().to_string(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdpRequest {
    post_body: String,
    request_uri: &'static str,
    return_idp_credential: bool,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    email: Option<String>,
    id_token: String,
    refresh_token: String,
}

impl From<AccountResponse> for User {
    fn from(response: AccountResponse) -> Self {
        User {
            uid: response.local_id,
            email: response.email.filter(|e| !e.is_empty()),
            id_token: response.id_token,
            refresh_token: response.refresh_token,
        }
    }
}

#[derive(Deserialize)]
struct RefreshResponse {
    user_id: String,
    id_token: String,
    refresh_token: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

#[derive(Debug, Clone)]
pub struct IdentityToolkit {
    client: Client,
    api_key: String,
    identity_url: String,
    token_url: String,
}

impl IdentityToolkit {
    pub fn new(config: &FirebaseConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            identity_url: config.identity_url.trim_end_matches('/').to_string(),
            token_url: config.token_url.clone(),
        }
    }

    async fn post_account<B: Serialize>(&self, endpoint: &str, body: &B) -> Result<User> {
        let url = format!("{}/{}", self.identity_url, endpoint);
        tracing::debug!(endpoint, "identity request");
        let response = self.client.post(url).query(&[("key", &self.api_key)]).json(body).send().await?;
        let account: AccountResponse = Self::parse(response).await?;
        Ok(account.into())
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
        if response.status().is_success() {
            return Ok(response.json::<T>().await?);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let code = match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(error) => AuthErrorCode::from_provider(&error.error.message),
            Err(_) => AuthErrorCode::Other(format!("HTTP {}", status)),
        };
        tracing::debug!(%status, code = %code, "identity request rejected");
        Err(AppError::AuthenticationFailed(code).into())
    }
}

impl SessionProvider for IdentityToolkit {
    async fn sign_up(&self, email: &str, password: &str) -> Result<User> {
        let body = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        self.post_account(SIGN_UP, &body).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<User> {
        let body = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        self.post_account(SIGN_IN_WITH_PASSWORD, &body).await
    }

    async fn sign_in_with_idp(&self, credential: &FederatedCredential) -> Result<User> {
        let body = IdpRequest {
            post_body: format!("id_token={}&providerId={}", credential.id_token, credential.provider_id),
            request_uri: IDP_REQUEST_URI,
            return_idp_credential: true,
            return_secure_token: true,
        };
        self.post_account(SIGN_IN_WITH_IDP, &body).await
    }

    async fn refresh(&self, refresh_token: &str, email: Option<String>) -> Result<User> {
        let response = self
            .client
            .post(&self.token_url)
            .query(&[("key", &self.api_key)])
            .form(&[("grant_type", "refresh_token"), ("refresh_token", refresh_token)])
            .send()
            .await?;
        let refreshed: RefreshResponse = Self::parse(response).await?;
        Ok(User {
            uid: refreshed.user_id,
            email,
            id_token: refreshed.id_token,
            refresh_token: refreshed.refresh_token,
        })
    }
}
