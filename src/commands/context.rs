use crate::api::auth::IdentityToolkit;
use crate::api::database::RealtimeDatabase;
use crate::libs::config::{Config, FirebaseConfig};
use crate::libs::secret::Secret;
use crate::libs::session::{SessionContext, SESSION_FILE};
use crate::libs::task::Category;
use anyhow::Result;

/// Everything a backend command needs: configuration and a started session.
pub struct AppContext {
    pub config: Config,
    pub firebase: FirebaseConfig,
    pub session: SessionContext<IdentityToolkit>,
}

impl AppContext {
    /// Reads the configuration, applies environment overrides and restores the cached session.
    pub async fn start() -> Result<Self> {
        let config = Config::read()?.apply_env();
        let firebase = config.firebase()?;
        let session = SessionContext::new(IdentityToolkit::new(&firebase), Secret::new(SESSION_FILE));
        session.start().await;

        Ok(Self {
            config,
            firebase,
            session,
        })
    }

    /// Database client authorized as the current user, if any.
    pub fn store(&self) -> RealtimeDatabase {
        let id_token = self.session.current_user().map(|user| user.id_token);
        RealtimeDatabase::new(&self.firebase.database_url, id_token)
    }

    pub fn category(&self, requested: Option<Category>) -> Category {
        requested.unwrap_or_else(|| self.config.default_category())
    }
}
