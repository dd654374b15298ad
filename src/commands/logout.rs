use super::AppContext;
use crate::{libs::messages::Message, msg_error, msg_success};
use anyhow::Result;

pub async fn cmd() -> Result<()> {
    let context = AppContext::start().await?;

    match context.session.sign_out() {
        Ok(()) => msg_success!(Message::LoggedOut),
        Err(e) => {
            tracing::error!(error = %e, "logout failed");
            msg_error!(Message::LogoutFailed);
        }
    }
    Ok(())
}
