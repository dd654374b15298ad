//! Create, update and delete tasks in the signed-in user's subtree.
//!
//! Every operation resolves the current identity from the injected session
//! and refuses to run without one. Operations return once the store has
//! acknowledged the write; the resulting list change reaches views through
//! the [`TaskListSynchronizer`](crate::libs::sync::TaskListSynchronizer)
//! subscription, never through the operation's return value.

use crate::api::store::{task_path, RemoteStore};
use crate::libs::error::AppError;
use crate::libs::push_id::PushIdGenerator;
use crate::libs::session::SessionWatch;
use crate::libs::task::{timestamp_value, NewTask, Status, TaskChanges};
use anyhow::Result;
use chrono::{DateTime, SubsecRound, Utc};
use parking_lot::Mutex;
use serde_json::{Map, Value};

pub struct TaskRepository<S: RemoteStore> {
    store: S,
    session: SessionWatch,
    ids: Mutex<PushIdGenerator>,
}

impl<S: RemoteStore> TaskRepository<S> {
    pub fn new(store: S, session: SessionWatch) -> Self {
        Self {
            store,
            session,
            ids: Mutex::new(PushIdGenerator::new()),
        }
    }

    fn user_id(&self) -> Result<String, AppError> {
        self.session.borrow().user_id().map(str::to_string).ok_or(AppError::AuthenticationRequired)
    }

    /// Rejects ids that would address a node outside the task's own subtree.
    fn task_key(task_id: &str) -> Result<&str, AppError> {
        let forbidden = |c: char| matches!(c, '/' | '.' | '#' | '$' | '[' | ']') || c.is_control();
        if task_id.is_empty() || task_id.contains(forbidden) {
            return Err(AppError::Validation(format!("'{}' is not a task id", task_id)));
        }
        Ok(task_id)
    }

    fn now() -> DateTime<Utc> {
        Utc::now().trunc_subsecs(3)
    }

    /// Writes a new pending task and returns its id.
    pub async fn create(&self, fields: NewTask) -> Result<String> {
        let user_id = self.user_id()?;
        fields.validate()?;

        let id = self.ids.lock().next();
        let task = fields.into_task(&id, Self::now());
        let record = serde_json::to_value(&task)?;

        self.store.write(&task_path(&user_id, &id), record).await?;
        tracing::debug!(task_id = %id, "task created");
        Ok(id)
    }

    /// Sets the status and refreshes `updatedAt`. The current status is not consulted.
    pub async fn update_status(&self, task_id: &str, status: Status) -> Result<()> {
        let user_id = self.user_id()?;
        let task_id = Self::task_key(task_id)?;

        let mut fields = Map::new();
        fields.insert("status".into(), Value::String(status.to_string()));
        fields.insert("updatedAt".into(), timestamp_value(Self::now()));

        self.store.update(&task_path(&user_id, task_id), fields).await?;
        tracing::debug!(task_id, %status, "task status updated");
        Ok(())
    }

    /// Applies a partial edit and refreshes `updatedAt`.
    pub async fn update_fields(&self, task_id: &str, changes: &TaskChanges) -> Result<()> {
        let user_id = self.user_id()?;
        let task_id = Self::task_key(task_id)?;
        changes.validate()?;
        if changes.is_empty() {
            return Ok(());
        }

        let fields = changes.to_fields(Self::now());
        self.store.update(&task_path(&user_id, task_id), fields).await?;
        tracing::debug!(task_id, "task fields updated");
        Ok(())
    }

    /// Removes the task node. Deleting an id that no longer exists succeeds.
    pub async fn delete(&self, task_id: &str) -> Result<()> {
        let user_id = self.user_id()?;
        let task_id = Self::task_key(task_id)?;
        self.store.delete(&task_path(&user_id, task_id)).await?;
        tracing::debug!(task_id, "task deleted");
        Ok(())
    }
}
