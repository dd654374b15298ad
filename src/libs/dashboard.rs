//! View model behind the task screens.
//!
//! A [`Dashboard`] ties the session to a [`TaskListSynchronizer`]: it
//! subscribes for the signed-in user when mounted, resubscribes when the
//! identity changes, and releases the subscription when unmounted or
//! dropped. The category filter is purely local state.

use crate::api::store::RemoteStore;
use crate::libs::error::AppError;
use crate::libs::session::{SessionState, SessionWatch};
use crate::libs::sync::{TaskListState, TaskListSynchronizer};
use crate::libs::task::{Category, Task};
use tokio::sync::watch;

pub struct Dashboard<S: RemoteStore> {
    sync: TaskListSynchronizer<S>,
    session: SessionWatch,
    selected: Category,
}

impl<S: RemoteStore> Dashboard<S> {
    pub fn new(store: S, session: SessionWatch, selected: Category) -> Self {
        Self {
            sync: TaskListSynchronizer::new(store),
            session,
            selected,
        }
    }

    /// Starts following the current user's tasks.
    ///
    /// Fails with [`AppError::AuthenticationRequired`] when the session has
    /// finished loading and nobody is signed in. While the session is still
    /// loading nothing is subscribed; call [`Dashboard::sync_identity`] once
    /// it settles.
    pub fn mount(&mut self) -> Result<(), AppError> {
        let session = self.session.borrow_and_update().clone();
        self.follow(&session);
        if !session.loading && session.user.is_none() {
            return Err(AppError::AuthenticationRequired);
        }
        Ok(())
    }

    /// Re-reads the session and resubscribes if the signed-in user changed.
    ///
    /// Returns true when the subscription was switched.
    pub fn sync_identity(&mut self) -> bool {
        let session = self.session.borrow_and_update().clone();
        self.follow(&session)
    }

    fn follow(&mut self, session: &SessionState) -> bool {
        let wanted = if session.loading { None } else { session.user_id() };
        if wanted == self.sync.user_id() {
            return false;
        }

        self.sync.unsubscribe();
        self.sync.clear();
        if let Some(user_id) = wanted {
            self.sync.subscribe(user_id);
        }
        true
    }

    /// Releases the subscription. Also happens on drop.
    pub fn unmount(&mut self) {
        self.sync.unsubscribe();
    }

    pub fn select_category(&mut self, category: Category) {
        self.selected = category;
    }

    pub fn selected_category(&self) -> Category {
        self.selected
    }

    pub fn state(&self) -> TaskListState {
        self.sync.state()
    }

    /// Tasks in the selected category, newest first.
    pub fn visible_tasks(&self) -> Vec<Task> {
        filter_by_category(&self.sync.state().tasks, self.selected)
    }

    /// Looks a task up by id in the full list, regardless of the filter.
    pub fn find(&self, task_id: &str) -> Option<Task> {
        self.sync.state().tasks.into_iter().find(|t| t.id == task_id)
    }

    pub fn list_updates(&self) -> watch::Receiver<TaskListState> {
        self.sync.watch()
    }

    pub fn session_updates(&self) -> SessionWatch {
        self.session.clone()
    }

    pub fn is_subscribed(&self) -> bool {
        self.sync.is_subscribed()
    }

    /// Waits until the current subscription has delivered its first notification.
    pub async fn loaded(&self) -> TaskListState {
        let mut updates = self.sync.watch();
        let state = match updates.wait_for(|state| !state.loading).await {
            Ok(state) => state.clone(),
            Err(_) => self.sync.state(),
        };
        state
    }

    /// Like [`Dashboard::loaded`], but a failed subscription is an error
    /// rather than an empty list.
    pub async fn load(&self) -> Result<TaskListState, AppError> {
        let state = self.loaded().await;
        match state.error {
            Some(reason) => Err(AppError::SubscriptionFailed(reason)),
            None => Ok(state),
        }
    }

    /// Drops the current subscription and opens a new one for the same user.
    ///
    /// Used after the store credential was replaced, since an open stream
    /// keeps the credential it was opened with.
    pub fn resubscribe(&mut self) -> bool {
        let Some(user_id) = self.sync.user_id().map(str::to_string) else {
            return false;
        };
        self.sync.subscribe(&user_id);
        true
    }
}

pub fn filter_by_category(tasks: &[Task], category: Category) -> Vec<Task> {
    tasks.iter().filter(|t| t.category == category).cloned().collect()
}
