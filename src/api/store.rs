//! Remote store abstraction: a JSON tree addressed by slash-separated paths.
//!
//! The store supports point writes, partial updates, point deletes and
//! subscriptions. A subscriber always receives the full current value of
//! the subscribed subtree, never a diff: every [`StoreEvent::Snapshot`] is
//! authoritative and replaces whatever the subscriber saw before.

use anyhow::Result;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Notification delivered to a subscriber.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// Full value of the subtree, `None` when nothing is stored there.
    Snapshot(Option<Value>),
    /// The subscription failed (permission denied, revoked credentials, network).
    Error(String),
}

/// Callback invoked for every notification on a subscription.
pub type Listener = Arc<dyn Fn(StoreEvent) + Send + Sync>;

/// Releases a subscription when dropped or explicitly unsubscribed.
pub struct SubscriptionHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl SubscriptionHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHandle").field("active", &self.cancel.is_some()).finish()
    }
}

/// Key-value tree with change subscriptions.
///
/// Write operations resolve once the store acknowledged them. They do not
/// return the new subtree: subscribers learn about the change through their
/// own notifications.
#[allow(async_fn_in_trait)]
pub trait RemoteStore {
    /// Replaces the node at `path` with `value`.
    async fn write(&self, path: &str, value: Value) -> Result<()>;

    /// Merges `fields` into the node at `path`. Keys may themselves be relative paths.
    async fn update(&self, path: &str, fields: Map<String, Value>) -> Result<()>;

    /// Removes the node at `path`. Removing an absent node succeeds.
    async fn delete(&self, path: &str) -> Result<()>;

    /// Starts delivering snapshots of `path` to `listener`, beginning with the current value.
    fn subscribe(&self, path: &str, listener: Listener) -> SubscriptionHandle;
}

/// `users/{user_id}/tasks`
pub fn tasks_path(user_id: &str) -> String {
    format!("users/{}/tasks", user_id)
}

/// `users/{user_id}/tasks/{task_id}`
pub fn task_path(user_id: &str, task_id: &str) -> String {
    format!("{}/{}", tasks_path(user_id), task_id)
}

/// Tree manipulation shared by the store implementations.
///
/// `Value::Null` stands for "absent": writing null removes a node, and
/// objects left without children are removed as well, so the tree never
/// holds empty objects or explicit nulls.
pub mod tree {
    use serde_json::{Map, Value};

    pub fn segments(path: &str) -> Vec<&str> {
        path.split('/').filter(|segment| !segment.is_empty()).collect()
    }

    /// True when one path is a prefix of the other.
    pub fn overlaps(a: &[&str], b: &[&str]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| x == y)
    }

    pub fn get_at<'a>(node: &'a Value, segments: &[&str]) -> Option<&'a Value> {
        let mut current = node;
        for segment in segments {
            current = current.as_object()?.get(*segment)?;
        }
        if current.is_null() {
            None
        } else {
            Some(current)
        }
    }

    pub fn set_at(node: &mut Value, segments: &[&str], value: Value) {
        let Some((head, rest)) = segments.split_first() else {
            *node = prune(value);
            return;
        };

        if !node.is_object() {
            if value.is_null() {
                return;
            }
            *node = Value::Object(Map::new());
        }

        if let Value::Object(children) = node {
            let child_is_null = {
                let child = children.entry(head.to_string()).or_insert(Value::Null);
                set_at(child, rest, value);
                child.is_null()
            };
            if child_is_null {
                children.remove(*head);
            }
            if children.is_empty() {
                *node = Value::Null;
            }
        }
    }

    /// Applies every entry of `fields` below `segments`, as a multi-path update.
    pub fn merge_at(node: &mut Value, segments: &[&str], fields: Map<String, Value>) {
        for (key, value) in fields {
            let mut target: Vec<&str> = segments.to_vec();
            target.extend(key.split('/').filter(|s| !s.is_empty()));
            set_at(node, &target, value);
        }
    }

    /// Drops nulls and empty objects.
    pub fn prune(value: Value) -> Value {
        match value {
            Value::Object(children) => {
                let children: Map<String, Value> = children
                    .into_iter()
                    .map(|(key, child)| (key, prune(child)))
                    .filter(|(_, child)| !child.is_null())
                    .collect();
                if children.is_empty() {
                    Value::Null
                } else {
                    Value::Object(children)
                }
            }
            other => other,
        }
    }
}
