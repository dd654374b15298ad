#[cfg(test)]
mod tests {
    use dincharya::libs::error::{auth_failure_message, user_message, AppError, AuthErrorCode};
    use dincharya::libs::messages::Message;

    #[test]
    fn test_provider_codes_map_to_reasons() {
        let cases = [
            ("INVALID_EMAIL", AuthErrorCode::InvalidEmail),
            ("EMAIL_NOT_FOUND", AuthErrorCode::UserNotFound),
            ("INVALID_PASSWORD", AuthErrorCode::WrongPassword),
            ("INVALID_LOGIN_CREDENTIALS", AuthErrorCode::WrongPassword),
            ("EMAIL_EXISTS", AuthErrorCode::EmailAlreadyInUse),
            ("TOO_MANY_ATTEMPTS_TRY_LATER", AuthErrorCode::TooManyRequests),
            ("USER_DISABLED", AuthErrorCode::UserDisabled),
            ("FEDERATED_USER_ID_ALREADY_LINKED", AuthErrorCode::AccountExistsWithDifferentCredential),
            ("TOKEN_EXPIRED", AuthErrorCode::TokenExpired),
        ];

        for (raw, expected) in cases {
            assert_eq!(AuthErrorCode::from_provider(raw), expected, "{}", raw);
        }
    }

    #[test]
    fn test_provider_detail_after_colon_is_ignored() {
        assert_eq!(
            AuthErrorCode::from_provider("WEAK_PASSWORD : Password should be at least 6 characters"),
            AuthErrorCode::WeakPassword
        );
    }

    #[test]
    fn test_unknown_provider_code_is_kept() {
        assert_eq!(
            AuthErrorCode::from_provider("OPERATION_NOT_ALLOWED"),
            AuthErrorCode::Other("OPERATION_NOT_ALLOWED".to_string())
        );
    }

    #[test]
    fn test_reason_messages() {
        let text = |code: AuthErrorCode| code.message().to_string();

        assert_eq!(text(AuthErrorCode::InvalidEmail), "Invalid email address");
        assert_eq!(text(AuthErrorCode::UserNotFound), "No account found with this email");
        assert_eq!(text(AuthErrorCode::WrongPassword), "Incorrect password");
        assert_eq!(text(AuthErrorCode::EmailAlreadyInUse), "An account with this email already exists");
        assert_eq!(text(AuthErrorCode::WeakPassword), "Password should be at least 6 characters");
        assert_eq!(text(AuthErrorCode::TooManyRequests), "Too many failed attempts. Please try again later.");
        assert_eq!(text(AuthErrorCode::PopupClosed), "Login cancelled. Please try again.");
        assert_eq!(
            text(AuthErrorCode::PopupBlocked),
            "Login popup was blocked. Please allow popups and try again."
        );
    }

    #[test]
    fn test_auth_failure_message_falls_back_for_unknown_codes() {
        let unknown: anyhow::Error = AppError::AuthenticationFailed(AuthErrorCode::Other("X".to_string())).into();
        let known: anyhow::Error = AppError::AuthenticationFailed(AuthErrorCode::WrongPassword).into();
        let foreign = anyhow::anyhow!("connection reset");

        assert_eq!(
            auth_failure_message(&unknown, Message::RegisterFailed).to_string(),
            "Failed to create account. Please try again."
        );
        assert_eq!(auth_failure_message(&known, Message::AuthFailed).to_string(), "Incorrect password");
        assert_eq!(
            auth_failure_message(&foreign, Message::AuthFederatedFailed).to_string(),
            "Failed to login with Google. Please try again."
        );
    }

    #[test]
    fn test_user_message_for_domain_errors() {
        let required: anyhow::Error = AppError::AuthenticationRequired.into();
        let rejected: anyhow::Error = AppError::StoreOperationFailed("401".to_string()).into();
        let foreign = anyhow::anyhow!("disk full");

        assert_eq!(user_message(&required, Message::TaskCreateFailed).to_string(), Message::LoginRequired.to_string());
        assert_eq!(
            user_message(&rejected, Message::TaskCreateFailed).to_string(),
            Message::StoreOperationFailed.to_string()
        );
        assert_eq!(
            user_message(&foreign, Message::TaskCreateFailed).to_string(),
            "Failed to add task. Please try again."
        );
    }
}
