use super::AppContext;
use crate::{
    api::FederatedCredential,
    libs::{
        error::{auth_failure_message, AppError, AuthErrorCode},
        messages::Message,
    },
    msg_error, msg_success,
};
use anyhow::Result;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Input, Password};
use std::io::IsTerminal;

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account email; prompted for when omitted
    #[arg(short, long)]
    email: Option<String>,

    /// Sign in with a Google ID token instead of a password
    #[arg(long, conflicts_with = "email")]
    google: bool,
}

pub async fn cmd(args: LoginArgs) -> Result<()> {
    let context = AppContext::start().await?;

    if args.google {
        let result = match read_google_credential() {
            Ok(credential) => context.session.sign_in_with_federated_provider(&credential).await,
            Err(e) => Err(e.into()),
        };
        return match result {
            Ok(user) => {
                msg_success!(Message::LoginSucceeded(user.email.unwrap_or(user.uid)));
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "federated login failed");
                msg_error!(auth_failure_message(&e, Message::AuthFederatedFailed));
                Ok(())
            }
        };
    }

    let Some((email, password)) = prompt_credentials(args.email)? else {
        msg_error!(Message::EmailAndPasswordRequired);
        return Ok(());
    };

    match context.session.sign_in(&email, &password).await {
        Ok(user) => msg_success!(Message::LoginSucceeded(user.email.unwrap_or(email))),
        Err(e) => {
            tracing::error!(error = %e, "login failed");
            msg_error!(auth_failure_message(&e, Message::AuthFailed));
        }
    }
    Ok(())
}

/// Asks for the missing email and the password. `None` when either is blank.
pub(crate) fn prompt_credentials(email: Option<String>) -> Result<Option<(String, String)>> {
    let email = match email {
        Some(email) => email,
        None => Input::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptEmail.to_string())
            .allow_empty(true)
            .interact_text()?,
    };
    let password = Password::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptPassword.to_string())
        .allow_empty_password(true)
        .interact()?;

    if email.trim().is_empty() || password.is_empty() {
        return Ok(None);
    }
    Ok(Some((email.trim().to_string(), password)))
}

/// Collects the identity provider token.
///
/// There is no browser popup on a terminal, so the user pastes the token
/// instead. Without a terminal to paste into, the flow counts as blocked;
/// an empty answer counts as cancelled.
fn read_google_credential() -> Result<FederatedCredential, AppError> {
    if !std::io::stdin().is_terminal() {
        return Err(AppError::AuthenticationFailed(AuthErrorCode::PopupBlocked));
    }

    let token: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptIdpToken.to_string())
        .allow_empty(true)
        .interact_text()
        .map_err(|_| AppError::AuthenticationFailed(AuthErrorCode::PopupClosed))?;

    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::AuthenticationFailed(AuthErrorCode::PopupClosed));
    }
    Ok(FederatedCredential::google(token))
}
