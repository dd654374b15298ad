use super::{login::prompt_credentials, AppContext};
use crate::{
    libs::{error::auth_failure_message, messages::Message},
    msg_error, msg_success,
};
use anyhow::Result;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Password};

#[derive(Debug, Args)]
pub struct RegisterArgs {
    /// Account email; prompted for when omitted
    #[arg(short, long)]
    email: Option<String>,
}

pub async fn cmd(args: RegisterArgs) -> Result<()> {
    let context = AppContext::start().await?;

    let Some((email, password)) = prompt_credentials(args.email)? else {
        msg_error!(Message::EmailAndPasswordRequired);
        return Ok(());
    };
    let confirmation = Password::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptConfirmPassword.to_string())
        .allow_empty_password(true)
        .interact()?;

    if password != confirmation {
        msg_error!(Message::PasswordsDoNotMatch);
        return Ok(());
    }

    match context.session.sign_up(&email, &password).await {
        Ok(user) => msg_success!(Message::RegisterSucceeded(user.email.unwrap_or(email))),
        Err(e) => {
            tracing::error!(error = %e, "registration failed");
            msg_error!(auth_failure_message(&e, Message::RegisterFailed));
        }
    }
    Ok(())
}
