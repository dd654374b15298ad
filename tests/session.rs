mod common;

#[cfg(test)]
mod tests {
    use super::common::ScriptedProvider;
    use dincharya::api::FederatedCredential;
    use dincharya::libs::error::{AppError, AuthErrorCode};
    use dincharya::libs::secret::Secret;
    use dincharya::libs::session::SessionContext;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use test_context::{test_context, AsyncTestContext};

    struct SessionTestContext {
        _temp_dir: TempDir,
        cache_path: PathBuf,
        provider: ScriptedProvider,
    }

    impl AsyncTestContext for SessionTestContext {
        async fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let cache_path = temp_dir.path().join(".session");
            SessionTestContext {
                _temp_dir: temp_dir,
                cache_path,
                provider: ScriptedProvider::with_account("ana@example.com", "secret123", "uid-ana"),
            }
        }
    }

    impl SessionTestContext {
        fn session(&self) -> SessionContext<ScriptedProvider> {
            SessionContext::new(self.provider.clone(), Secret::at(&self.cache_path))
        }
    }

    fn auth_code(error: &anyhow::Error) -> Option<AuthErrorCode> {
        match error.downcast_ref::<AppError>() {
            Some(AppError::AuthenticationFailed(code)) => Some(code.clone()),
            _ => None,
        }
    }

    #[test_context(SessionTestContext)]
    #[tokio::test]
    async fn test_loading_until_started(ctx: &mut SessionTestContext) {
        let session = ctx.session();
        assert!(session.state().loading);

        session.start().await;

        let state = session.state();
        assert!(!state.loading);
        assert!(state.user.is_none());
    }

    #[test_context(SessionTestContext)]
    #[tokio::test]
    async fn test_sign_in_publishes_identity(ctx: &mut SessionTestContext) {
        let session = ctx.session();
        session.start().await;
        let mut identity = session.on_identity_change();
        assert!(identity.borrow_and_update().user.is_none());

        let user = session.sign_in(" ana@example.com ", "secret123").await.unwrap();

        assert_eq!(user.uid, "uid-ana");
        assert!(identity.has_changed().unwrap());
        assert_eq!(identity.borrow_and_update().user_id(), Some("uid-ana"));
        assert_eq!(session.current_user(), Some(user));
    }

    #[test_context(SessionTestContext)]
    #[tokio::test]
    async fn test_new_observer_sees_current_identity(ctx: &mut SessionTestContext) {
        let session = ctx.session();
        session.start().await;
        session.sign_in("ana@example.com", "secret123").await.unwrap();

        let identity = session.on_identity_change();

        assert_eq!(identity.borrow().user_id(), Some("uid-ana"));
    }

    #[test_context(SessionTestContext)]
    #[tokio::test]
    async fn test_rejected_credentials(ctx: &mut SessionTestContext) {
        let session = ctx.session();
        session.start().await;

        let wrong = session.sign_in("ana@example.com", "nope").await.unwrap_err();
        let unknown = session.sign_in("bob@example.com", "secret123").await.unwrap_err();

        assert_eq!(auth_code(&wrong), Some(AuthErrorCode::WrongPassword));
        assert_eq!(auth_code(&unknown), Some(AuthErrorCode::UserNotFound));
        assert!(session.current_user().is_none());
        assert!(!ctx.cache_path.exists());
    }

    #[test_context(SessionTestContext)]
    #[tokio::test]
    async fn test_sign_up(ctx: &mut SessionTestContext) {
        let session = ctx.session();
        session.start().await;

        let taken = session.sign_up("ana@example.com", "another1").await.unwrap_err();
        let weak = session.sign_up("new@example.com", "123").await.unwrap_err();
        let user = session.sign_up("new@example.com", "longenough").await.unwrap();

        assert_eq!(auth_code(&taken), Some(AuthErrorCode::EmailAlreadyInUse));
        assert_eq!(auth_code(&weak), Some(AuthErrorCode::WeakPassword));
        assert_eq!(user.email.as_deref(), Some("new@example.com"));
        assert_eq!(session.current_user(), Some(user));
    }

    #[test_context(SessionTestContext)]
    #[tokio::test]
    async fn test_federated_sign_in(ctx: &mut SessionTestContext) {
        let session = ctx.session();
        session.start().await;

        let user = session
            .sign_in_with_federated_provider(&FederatedCredential::google("tok"))
            .await
            .unwrap();
        assert_eq!(user.uid, "google-tok");

        let rejected = session
            .sign_in_with_federated_provider(&FederatedCredential::google("bad"))
            .await
            .unwrap_err();
        assert!(matches!(auth_code(&rejected), Some(AuthErrorCode::Other(_))));
        assert_eq!(session.current_user().map(|u| u.uid), Some("google-tok".to_string()));
    }

    #[test_context(SessionTestContext)]
    #[tokio::test]
    async fn test_session_survives_restart(ctx: &mut SessionTestContext) {
        let first = ctx.session();
        first.start().await;
        first.sign_in("ana@example.com", "secret123").await.unwrap();
        assert!(ctx.cache_path.exists());

        let second = ctx.session();
        second.start().await;

        let state = second.state();
        assert!(!state.loading);
        assert_eq!(state.user_id(), Some("uid-ana"));
        assert_eq!(state.user.unwrap().email.as_deref(), Some("ana@example.com"));
    }

    #[test_context(SessionTestContext)]
    #[tokio::test]
    async fn test_rejected_cache_is_discarded(ctx: &mut SessionTestContext) {
        let first = ctx.session();
        first.start().await;
        first.sign_in("ana@example.com", "secret123").await.unwrap();

        ctx.provider.reject_refresh();
        let second = ctx.session();
        second.start().await;

        assert!(!second.state().loading);
        assert!(second.current_user().is_none());
        assert!(!ctx.cache_path.exists());
    }

    #[test_context(SessionTestContext)]
    #[tokio::test]
    async fn test_renew_publishes_fresh_identity(ctx: &mut SessionTestContext) {
        let session = ctx.session();
        session.start().await;
        session.sign_in("ana@example.com", "secret123").await.unwrap();
        let mut identity = session.on_identity_change();
        identity.borrow_and_update();

        let user = session.renew().await.unwrap();

        assert_eq!(user.uid, "uid-ana");
        assert_eq!(user.email.as_deref(), Some("ana@example.com"));
        assert!(identity.has_changed().unwrap());
        assert_eq!(identity.borrow_and_update().user_id(), Some("uid-ana"));
        assert!(ctx.cache_path.exists());
    }

    #[test_context(SessionTestContext)]
    #[tokio::test]
    async fn test_rejected_renewal_ends_session(ctx: &mut SessionTestContext) {
        let session = ctx.session();
        session.start().await;
        session.sign_in("ana@example.com", "secret123").await.unwrap();
        let mut identity = session.on_identity_change();
        identity.borrow_and_update();

        ctx.provider.reject_refresh();
        let error = session.renew().await.unwrap_err();

        assert_eq!(auth_code(&error), Some(AuthErrorCode::TokenExpired));
        assert!(identity.has_changed().unwrap());
        assert!(identity.borrow_and_update().user.is_none());
        assert!(!ctx.cache_path.exists());
    }

    #[test_context(SessionTestContext)]
    #[tokio::test]
    async fn test_renew_requires_sign_in(ctx: &mut SessionTestContext) {
        let session = ctx.session();
        session.start().await;

        let error = session.renew().await.unwrap_err();

        assert!(matches!(error.downcast_ref::<AppError>(), Some(AppError::AuthenticationRequired)));
    }

    #[test_context(SessionTestContext)]
    #[tokio::test]
    async fn test_sign_out(ctx: &mut SessionTestContext) {
        let session = ctx.session();
        session.start().await;
        session.sign_in("ana@example.com", "secret123").await.unwrap();
        let mut identity = session.on_identity_change();
        identity.borrow_and_update();

        session.sign_out().unwrap();

        assert!(identity.has_changed().unwrap());
        assert!(identity.borrow_and_update().user.is_none());
        assert!(!ctx.cache_path.exists());
        assert!(matches!(session.require_user(), Err(AppError::AuthenticationRequired)));
    }
}
