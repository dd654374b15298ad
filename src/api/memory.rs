//! In-process implementation of [`RemoteStore`].
//!
//! Notifications are delivered synchronously on the calling task, after the
//! tree lock is released, and only to subscribers whose snapshot actually
//! changed. Besides backing the test suite it exposes a few knobs for
//! simulating store misbehavior: rejected operations, subscription errors
//! and late delivery to cancelled listeners.

use super::store::{tree, Listener, RemoteStore, StoreEvent, SubscriptionHandle};
use crate::libs::error::AppError;
use anyhow::Result;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::sync::Arc;

struct Registration {
    id: u64,
    path: String,
    listener: Listener,
    cancelled: bool,
}

#[derive(Default)]
struct Inner {
    root: Value,
    registrations: Vec<Registration>,
    next_id: u64,
    late_delivery: bool,
    failure: Option<String>,
    writes: usize,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that keeps notifying listeners after their subscription was cancelled,
    /// like a store with notifications already in flight.
    pub fn with_late_delivery() -> Self {
        let store = Self::new();
        store.inner.lock().late_delivery = true;
        store
    }

    /// Makes the next write, update or delete fail with `reason`.
    pub fn fail_next_operation(&self, reason: &str) {
        self.inner.lock().failure = Some(reason.to_string());
    }

    /// Sends an error to every live subscriber of `path`.
    pub fn emit_error(&self, path: &str, reason: &str) {
        let path = tree::segments(path).join("/");
        let listeners: Vec<Listener> = {
            let inner = self.inner.lock();
            inner
                .registrations
                .iter()
                .filter(|r| (!r.cancelled || inner.late_delivery) && r.path == path)
                .map(|r| r.listener.clone())
                .collect()
        };
        for listener in listeners {
            listener(StoreEvent::Error(reason.to_string()));
        }
    }

    /// Current value at `path`.
    pub fn snapshot(&self, path: &str) -> Option<Value> {
        let inner = self.inner.lock();
        tree::get_at(&inner.root, &tree::segments(path)).cloned()
    }

    /// Number of subscriptions that have not been cancelled.
    pub fn active_subscriptions(&self) -> usize {
        self.inner.lock().registrations.iter().filter(|r| !r.cancelled).count()
    }

    /// Number of acknowledged writes, updates and deletes.
    pub fn acknowledged_operations(&self) -> usize {
        self.inner.lock().writes
    }

    fn mutate(&self, path: &str, op: impl FnOnce(&mut Value, &[&str])) -> Result<()> {
        let segments = tree::segments(path);
        let pending: Vec<(Listener, Option<Value>)> = {
            let mut inner = self.inner.lock();
            if let Some(reason) = inner.failure.take() {
                tracing::debug!(path, reason = %reason, "memory store rejected operation");
                return Err(AppError::StoreOperationFailed(reason).into());
            }

            let late_delivery = inner.late_delivery;
            let watchers: Vec<(Listener, Vec<String>, Option<Value>)> = inner
                .registrations
                .iter()
                .filter(|r| !r.cancelled || late_delivery)
                .filter(|r| tree::overlaps(&tree::segments(&r.path), &segments))
                .map(|r| {
                    let watched = tree::segments(&r.path);
                    let before = tree::get_at(&inner.root, &watched).cloned();
                    (r.listener.clone(), watched.into_iter().map(String::from).collect(), before)
                })
                .collect();

            op(&mut inner.root, &segments);
            inner.writes += 1;

            watchers
                .into_iter()
                .filter_map(|(listener, watched, before)| {
                    let watched: Vec<&str> = watched.iter().map(String::as_str).collect();
                    let after = tree::get_at(&inner.root, &watched).cloned();
                    (after != before).then_some((listener, after))
                })
                .collect()
        };

        for (listener, snapshot) in pending {
            listener(StoreEvent::Snapshot(snapshot));
        }
        Ok(())
    }
}

impl RemoteStore for MemoryStore {
    async fn write(&self, path: &str, value: Value) -> Result<()> {
        self.mutate(path, |root, segments| tree::set_at(root, segments, value))
    }

    async fn update(&self, path: &str, fields: Map<String, Value>) -> Result<()> {
        self.mutate(path, |root, segments| tree::merge_at(root, segments, fields))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.mutate(path, |root, segments| tree::set_at(root, segments, Value::Null))
    }

    fn subscribe(&self, path: &str, listener: Listener) -> SubscriptionHandle {
        let (id, initial) = {
            let mut inner = self.inner.lock();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.registrations.push(Registration {
                id,
                path: tree::segments(path).join("/"),
                listener: listener.clone(),
                cancelled: false,
            });
            (id, tree::get_at(&inner.root, &tree::segments(path)).cloned())
        };

        listener(StoreEvent::Snapshot(initial));

        let inner = Arc::downgrade(&self.inner);
        SubscriptionHandle::new(move || {
            if let Some(inner) = inner.upgrade() {
                let mut inner = inner.lock();
                if inner.late_delivery {
                    if let Some(registration) = inner.registrations.iter_mut().find(|r| r.id == id) {
                        registration.cancelled = true;
                    }
                } else {
                    inner.registrations.retain(|r| r.id != id);
                }
            }
        })
    }
}
