use crate::libs::task::{Category, Status};

#[derive(Debug, Clone)]
pub enum Message {
    // === AUTH MESSAGES ===
    AuthInvalidEmail,
    AuthUserNotFound,
    AuthWrongPassword,
    AuthEmailAlreadyInUse,
    AuthWeakPassword,
    AuthTooManyRequests,
    AuthUserDisabled,
    AuthFederatedCancelled,
    AuthFederatedBlocked,
    AuthFederatedFailed,
    AuthAccountExistsWithDifferentCredential,
    AuthFailed,
    RegisterFailed,
    SessionExpired,
    SessionRestoreFailed(String), // error
    LoginRequired,
    LoginSucceeded(String),    // email
    RegisterSucceeded(String), // email
    LoggedOut,
    LogoutFailed,
    PasswordsDoNotMatch,
    EmailAndPasswordRequired,

    // === TASK MESSAGES ===
    TaskCreated(String),             // title
    TaskCreateFailed,
    TaskStatusChanged(String, Status), // title, new status
    TaskUpdated(String),             // title
    TaskUpdateFailed,
    TaskDeleted(String), // title or id
    TaskDeleteFailed,
    TaskNotFound(String), // id
    TasksHeader(Category),
    TasksLoading,
    TasksLoadFailed,
    NoTasksFound,
    NoTasksFoundHint,
    InvalidTask(String),      // reason
    InvalidDueDate(String),   // raw input
    StoreOperationFailed,
    NoChangesDetected,
    ConfirmDeleteTask(String), // title
    SelectTaskAction,
    SelectTask,

    // === WATCH MESSAGES ===
    WatchStarted(Category),
    WatchStopped,
    WatchReceivedCtrlC,
    WatchCtrlCListenFailed(String),

    // === CONFIGURATION MESSAGES ===
    ConfigSaved,
    ConfigDeleted,
    ConfigModuleFirebase,
    ConfigModuleDashboard,
    ConfigMissingFirebase,

    // === PROMPTS ===
    PromptSelectModules,
    PromptApiKey,
    PromptDatabaseUrl,
    PromptDefaultCategory,
    PromptEmail,
    PromptPassword,
    PromptConfirmPassword,
    PromptIdpToken,
    PromptTaskTitle,
    PromptTaskDescription,
    PromptTaskDueDate,
    PromptTaskCategory,

    // === GENERAL MESSAGES ===
    OperationCancelled,
}
