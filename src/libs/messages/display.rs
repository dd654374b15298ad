//! Display implementation for dincharya messages.
//!
//! All user-facing text lives here, in one match, so wording stays
//! consistent between the register, login and task screens.

use super::types::Message;
use std::fmt;

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            // === AUTH MESSAGES ===
            Message::AuthInvalidEmail => "Invalid email address".to_string(),
            Message::AuthUserNotFound => "No account found with this email".to_string(),
            Message::AuthWrongPassword => "Incorrect password".to_string(),
            Message::AuthEmailAlreadyInUse => "An account with this email already exists".to_string(),
            Message::AuthWeakPassword => "Password should be at least 6 characters".to_string(),
            Message::AuthTooManyRequests => "Too many failed attempts. Please try again later.".to_string(),
            Message::AuthUserDisabled => "This account has been disabled".to_string(),
            Message::AuthFederatedCancelled => "Login cancelled. Please try again.".to_string(),
            Message::AuthFederatedBlocked => "Login popup was blocked. Please allow popups and try again.".to_string(),
            Message::AuthFederatedFailed => "Failed to login with Google. Please try again.".to_string(),
            Message::AuthAccountExistsWithDifferentCredential => {
                "An account already exists with the same email address but different sign-in credentials.".to_string()
            }
            Message::AuthFailed => "Failed to login. Please check your credentials.".to_string(),
            Message::RegisterFailed => "Failed to create account. Please try again.".to_string(),
            Message::SessionExpired => "Your session has expired. Please log in again.".to_string(),
            Message::SessionRestoreFailed(error) => format!("Could not restore the previous session: {}", error),
            Message::LoginRequired => "You must be logged in. Run `dincharya login` first.".to_string(),
            Message::LoginSucceeded(email) => format!("Logged in as {}", email),
            Message::RegisterSucceeded(email) => format!("Account created for {}", email),
            Message::LoggedOut => "Logged out".to_string(),
            Message::LogoutFailed => "Failed to logout".to_string(),
            Message::PasswordsDoNotMatch => "Passwords do not match".to_string(),
            Message::EmailAndPasswordRequired => "Please enter both email and password".to_string(),

            // === TASK MESSAGES ===
            Message::TaskCreated(title) => format!("Task '{}' added", title),
            Message::TaskCreateFailed => "Failed to add task. Please try again.".to_string(),
            Message::TaskStatusChanged(title, status) => format!("Task '{}' is now {}", title, status),
            Message::TaskUpdated(title) => format!("Task '{}' updated", title),
            Message::TaskUpdateFailed => "Failed to update task. Please try again.".to_string(),
            Message::TaskDeleted(title) => format!("Task '{}' deleted", title),
            Message::TaskDeleteFailed => "Failed to delete task. Please try again.".to_string(),
            Message::TaskNotFound(id) => format!("Task with ID {} not found", id),
            Message::TasksHeader(category) => format!("{} {} Tasks", category.icon(), category.title()),
            Message::TasksLoading => "Loading tasks...".to_string(),
            Message::TasksLoadFailed => "Failed to load tasks. Please try again.".to_string(),
            Message::NoTasksFound => "📝 No tasks found".to_string(),
            Message::NoTasksFoundHint => "Get started by creating a new task".to_string(),
            Message::InvalidTask(reason) => format!("Invalid task: {}", reason),
            Message::InvalidDueDate(raw) => format!("'{}' is not a valid date, expected YYYY-MM-DD", raw),
            Message::StoreOperationFailed => "The database rejected the request. Please try again.".to_string(),
            Message::NoChangesDetected => "No changes detected".to_string(),
            Message::ConfirmDeleteTask(title) => format!("Delete task '{}'?", title),
            Message::SelectTaskAction => "What do you want to do?".to_string(),
            Message::SelectTask => "Select task".to_string(),

            // === WATCH MESSAGES ===
            Message::WatchStarted(category) => format!("Watching {} tasks, press Ctrl-C to stop", category),
            Message::WatchStopped => "Stopped watching tasks".to_string(),
            Message::WatchReceivedCtrlC => "Received Ctrl-C, shutting down".to_string(),
            Message::WatchCtrlCListenFailed(error) => format!("Failed to listen for Ctrl-C: {}", error),

            // === CONFIGURATION MESSAGES ===
            Message::ConfigSaved => "Configuration saved successfully".to_string(),
            Message::ConfigDeleted => "Configuration removed".to_string(),
            Message::ConfigModuleFirebase => "Firebase settings".to_string(),
            Message::ConfigModuleDashboard => "Dashboard settings".to_string(),
            Message::ConfigMissingFirebase => "Firebase is not configured. Run `dincharya init` first.".to_string(),

            // === PROMPTS ===
            Message::PromptSelectModules => "Select nodes to configure".to_string(),
            Message::PromptApiKey => "Enter the Firebase web API key".to_string(),
            Message::PromptDatabaseUrl => "Enter the realtime database URL".to_string(),
            Message::PromptDefaultCategory => "Select the default category".to_string(),
            Message::PromptEmail => "Email".to_string(),
            Message::PromptPassword => "Password".to_string(),
            Message::PromptConfirmPassword => "Confirm password".to_string(),
            Message::PromptIdpToken => "Paste the Google ID token (leave empty to cancel)".to_string(),
            Message::PromptTaskTitle => "Enter task title".to_string(),
            Message::PromptTaskDescription => "Enter task description".to_string(),
            Message::PromptTaskDueDate => "Due date (YYYY-MM-DD)".to_string(),
            Message::PromptTaskCategory => "Category".to_string(),

            // === GENERAL MESSAGES ===
            Message::OperationCancelled => "Operation cancelled".to_string(),
        };

        write!(f, "{}", text)
    }
}
