//! Keeps an ordered task list in step with a user's task subtree.
//!
//! The synchronizer holds at most one subscription. Each snapshot the store
//! delivers is decoded into tasks, sorted newest first and published as a
//! whole, replacing the previous list: there is no merging, because the
//! store always sends the full subtree.
//!
//! Every subscription gets a generation number. Unsubscribing advances the
//! generation, and a listener whose generation is stale drops whatever it
//! receives, so a store that delivers late notifications cannot leak one
//! user's tasks into a view that has moved on.

use crate::api::store::{tasks_path, RemoteStore, StoreEvent, SubscriptionHandle};
use crate::libs::task::Task;
use parking_lot::Mutex;
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::Arc;
use tokio::sync::watch;

/// What the view layer observes.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskListState {
    pub tasks: Vec<Task>,
    /// True between subscribing and the first notification.
    pub loading: bool,
    /// Set when the subscription reported a failure; the previous list is kept.
    pub error: Option<String>,
}

impl Default for TaskListState {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            loading: false,
            error: None,
        }
    }
}

/// Converts a subtree snapshot into tasks ordered by creation time, newest first.
///
/// An absent payload is an empty list. Entries that do not decode as tasks
/// are skipped with a warning.
pub fn snapshot_to_tasks(payload: Option<&Value>) -> Vec<Task> {
    let entries = match payload {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Object(entries)) => entries,
        Some(other) => {
            tracing::warn!(kind = ?other, "task subtree is not an object, ignoring");
            return Vec::new();
        }
    };

    let mut tasks: Vec<Task> = entries
        .iter()
        .filter_map(|(key, value)| match Task::from_entry(key, value) {
            Ok(task) => Some(task),
            Err(e) => {
                tracing::warn!(task_id = %key, error = %e, "skipping malformed task");
                None
            }
        })
        .collect();

    sort_newest_first(&mut tasks);
    tasks
}

/// Sorts by creation time descending; equal timestamps fall back to id descending.
pub fn sort_newest_first(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| match b.created_at.cmp(&a.created_at) {
        Ordering::Equal => b.id.cmp(&a.id),
        other => other,
    });
}

struct Shared {
    generation: Mutex<u64>,
    state: watch::Sender<TaskListState>,
}

impl Shared {
    fn apply(&self, generation: u64, event: StoreEvent) {
        let current = self.generation.lock();
        if *current != generation {
            tracing::debug!(generation, current = *current, "dropping notification for a released subscription");
            return;
        }

        match event {
            StoreEvent::Snapshot(payload) => {
                let tasks = snapshot_to_tasks(payload.as_ref());
                tracing::debug!(count = tasks.len(), "task list replaced");
                self.state.send_replace(TaskListState {
                    tasks,
                    loading: false,
                    error: None,
                });
            }
            StoreEvent::Error(reason) => {
                tracing::error!(error = %reason, "task subscription failed");
                self.state.send_modify(|state| {
                    state.loading = false;
                    state.error = Some(reason);
                });
            }
        }
    }
}

struct ActiveSubscription {
    user_id: String,
    handle: SubscriptionHandle,
}

pub struct TaskListSynchronizer<S: RemoteStore> {
    store: S,
    shared: Arc<Shared>,
    active: Option<ActiveSubscription>,
}

impl<S: RemoteStore> TaskListSynchronizer<S> {
    pub fn new(store: S) -> Self {
        let (state, _) = watch::channel(TaskListState::default());
        Self {
            store,
            shared: Arc::new(Shared {
                generation: Mutex::new(0),
                state,
            }),
            active: None,
        }
    }

    /// Opens the standing subscription for `user_id`, replacing any existing one.
    pub fn subscribe(&mut self, user_id: &str) {
        self.unsubscribe();

        let generation = {
            let mut current = self.shared.generation.lock();
            *current += 1;
            *current
        };
        self.shared.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });

        let shared = Arc::clone(&self.shared);
        let handle = self
            .store
            .subscribe(&tasks_path(user_id), Arc::new(move |event| shared.apply(generation, event)));

        tracing::debug!(user_id, generation, "subscribed to tasks");
        self.active = Some(ActiveSubscription {
            user_id: user_id.to_string(),
            handle,
        });
    }

    /// Cancels the standing subscription. The last published list stays as it is.
    pub fn unsubscribe(&mut self) {
        *self.shared.generation.lock() += 1;
        if let Some(active) = self.active.take() {
            active.handle.unsubscribe();
            tracing::debug!(user_id = %active.user_id, "unsubscribed from tasks");
        }
        self.shared.state.send_if_modified(|state| std::mem::replace(&mut state.loading, false));
    }

    /// Publishes an empty list and clears any error.
    pub fn clear(&mut self) {
        let loading = self.active.is_some() && self.shared.state.borrow().loading;
        self.shared.state.send_replace(TaskListState {
            loading,
            ..TaskListState::default()
        });
    }

    pub fn watch(&self) -> watch::Receiver<TaskListState> {
        self.shared.state.subscribe()
    }

    pub fn state(&self) -> TaskListState {
        self.shared.state.borrow().clone()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.user_id.as_str())
    }

    pub fn is_subscribed(&self) -> bool {
        self.active.is_some()
    }
}

impl<S: RemoteStore> Drop for TaskListSynchronizer<S> {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
