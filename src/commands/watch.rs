//! Live dashboard.
//!
//! Renders the selected category and redraws it every time the remote list
//! or the session changes, until Ctrl-C. The subscription is released on
//! every way out of the loop.
//!
//! Id tokens expire after an hour and the server then revokes the stream.
//! The loop renews the session shortly before that, and once more whenever
//! the stream fails, then reopens the stream with the new token.

use super::AppContext;
use crate::{
    api::{database::RealtimeDatabase, store::RemoteStore},
    libs::{dashboard::Dashboard, error::user_message, messages::Message, task::Category, view::View},
    msg_error, msg_info,
};
use anyhow::Result;
use clap::Args;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

const TOKEN_REFRESH_PERIOD: Duration = Duration::from_secs(50 * 60);

#[derive(Debug, Args)]
pub struct WatchArgs {
    #[arg(short, long, value_enum)]
    category: Option<Category>,
}

pub async fn cmd(args: WatchArgs) -> Result<()> {
    let context = AppContext::start().await?;
    let category = context.category(args.category);

    // The realtime client shares its credentials between clones, so keeping
    // one here lets the loop re-authorize the dashboard's stream.
    let store = context.store();
    let mut dashboard = Dashboard::new(store.clone(), context.session.on_identity_change(), category);
    if let Err(e) = dashboard.mount() {
        msg_error!(e.message());
        return Ok(());
    }

    msg_info!(Message::WatchStarted(category));
    let mut list_updates = dashboard.list_updates();
    let mut session_updates = dashboard.session_updates();
    let mut refresh = interval_at(Instant::now() + TOKEN_REFRESH_PERIOD, TOKEN_REFRESH_PERIOD);
    refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    // One renewal per failure; reset by the next healthy list.
    let mut retried = false;

    let result = loop {
        if let Err(e) = render(&dashboard) {
            break Err(e);
        }

        tokio::select! {
            changed = list_updates.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let (failed, healthy) = {
                    let state = list_updates.borrow_and_update();
                    (state.error.is_some(), !state.loading && state.error.is_none())
                };
                if healthy {
                    retried = false;
                } else if failed && !retried && dashboard.is_subscribed() {
                    retried = true;
                    reauthorize(&context, &store, &mut dashboard).await;
                }
            }
            changed = session_updates.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let id_token = session_updates.borrow_and_update().user.as_ref().map(|u| u.id_token.clone());
                store.set_auth(id_token);
                dashboard.sync_identity();
            }
            _ = refresh.tick() => {
                if dashboard.is_subscribed() {
                    reauthorize(&context, &store, &mut dashboard).await;
                }
            }
            signal = &mut ctrl_c => {
                match signal {
                    Ok(()) => msg_info!(Message::WatchReceivedCtrlC),
                    Err(e) => msg_error!(Message::WatchCtrlCListenFailed(e.to_string())),
                }
                break Ok(());
            }
        }
    };

    dashboard.unmount();
    msg_info!(Message::WatchStopped);
    result
}

/// Renews the session and reopens the stream with the new id token.
///
/// A rejected renewal signs the user out; the session branch of the loop
/// then drops the subscription.
async fn reauthorize(context: &AppContext, store: &RealtimeDatabase, dashboard: &mut Dashboard<RealtimeDatabase>) {
    match context.session.renew().await {
        Ok(user) => {
            store.set_auth(Some(user.id_token));
            dashboard.resubscribe();
            tracing::debug!(uid = %user.uid, "task stream re-authorized");
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to renew session");
            msg_error!(user_message(&e, Message::SessionExpired));
        }
    }
}

fn render<S: RemoteStore>(dashboard: &Dashboard<S>) -> Result<()> {
    View::dashboard(&dashboard.state(), dashboard.selected_category(), &dashboard.visible_tasks())
}
