//! Realtime database client over the REST and streaming API.
//!
//! Point operations map to `PUT`, `PATCH` and `DELETE` on
//! `{database_url}/{path}.json`. A subscription is a long-lived `GET` with
//! `Accept: text/event-stream`; the server sends `put` and `patch` events
//! whose `path` is relative to the subscribed node. The client keeps its own
//! copy of the subtree, applies each event to it and hands listeners the
//! full snapshot, so consumers never deal with partial updates.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dincharya::api::database::RealtimeDatabase;
//! use dincharya::api::store::{tasks_path, RemoteStore, StoreEvent};
//! use std::sync::Arc;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let db = RealtimeDatabase::new("https://example-default-rtdb.firebaseio.com", Some("id-token".into()));
//! let _handle = db.subscribe(&tasks_path("uid"), Arc::new(|event: StoreEvent| println!("{:?}", event)));
//! # Ok(())
//! # }
//! ```

use super::store::{tree, Listener, RemoteStore, StoreEvent, SubscriptionHandle};
use crate::libs::error::AppError;
use anyhow::Result;
use futures::StreamExt;
use parking_lot::RwLock;
use reqwest::{header::ACCEPT, Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;

const EVENT_STREAM: &str = "text/event-stream";

#[derive(Clone, Debug)]
pub struct RealtimeDatabase {
    client: Client,
    base_url: String,
    auth: Arc<RwLock<Option<String>>>,
}

impl RealtimeDatabase {
    pub fn new(database_url: &str, id_token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: database_url.trim_end_matches('/').to_string(),
            auth: Arc::new(RwLock::new(id_token)),
        }
    }

    /// Replaces the credential sent with subsequent requests.
    pub fn set_auth(&self, id_token: Option<String>) {
        *self.auth.write() = id_token;
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}.json", self.base_url, tree::segments(path).join("/"))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.auth.read().as_deref() {
            Some(token) => request.query(&[("auth", token)]),
            None => request,
        }
    }

    async fn acknowledge(response: Response) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        let reason = serde_json::from_str::<ErrorBody>(&body).map(|b| b.error).unwrap_or(body);
        Err(AppError::StoreOperationFailed(format!("{}: {}", status, reason)).into())
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl RemoteStore for RealtimeDatabase {
    async fn write(&self, path: &str, value: Value) -> Result<()> {
        tracing::debug!(path, "PUT");
        let request = self.authorize(self.client.put(self.url(path)).json(&value));
        let response = request.send().await.map_err(|e| AppError::StoreOperationFailed(e.to_string()))?;
        Self::acknowledge(response).await
    }

    async fn update(&self, path: &str, fields: Map<String, Value>) -> Result<()> {
        tracing::debug!(path, fields = fields.len(), "PATCH");
        let request = self.authorize(self.client.patch(self.url(path)).json(&fields));
        let response = request.send().await.map_err(|e| AppError::StoreOperationFailed(e.to_string()))?;
        Self::acknowledge(response).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        tracing::debug!(path, "DELETE");
        let request = self.authorize(self.client.delete(self.url(path)));
        let response = request.send().await.map_err(|e| AppError::StoreOperationFailed(e.to_string()))?;
        Self::acknowledge(response).await
    }

    fn subscribe(&self, path: &str, listener: Listener) -> SubscriptionHandle {
        let request = self.authorize(self.client.get(self.url(path)).header(ACCEPT, EVENT_STREAM));
        let path = path.to_string();
        let task = tokio::spawn(async move {
            if let Err(e) = stream_snapshots(request, &listener).await {
                tracing::warn!(path = %path, error = %e, "subscription ended");
                listener(StoreEvent::Error(e.to_string()));
            }
        });
        SubscriptionHandle::new(move || task.abort())
    }
}

async fn stream_snapshots(request: RequestBuilder, listener: &Listener) -> Result<()> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let reason = serde_json::from_str::<ErrorBody>(&body).map(|b| b.error).unwrap_or(body);
        return Err(AppError::SubscriptionFailed(format!("{}: {}", status, reason)).into());
    }

    let mut parser = EventStreamParser::default();
    let mut cache = Value::Null;
    let mut chunks = response.bytes_stream();

    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        for event in parser.feed(&chunk) {
            match apply_event(&mut cache, &event)? {
                EventOutcome::Changed => {
                    let snapshot = if cache.is_null() { None } else { Some(cache.clone()) };
                    listener(StoreEvent::Snapshot(snapshot));
                }
                EventOutcome::Ignored => {}
                EventOutcome::Closed(reason) => {
                    return Err(AppError::SubscriptionFailed(reason).into());
                }
            }
        }
    }

    Err(AppError::SubscriptionFailed("event stream closed by server".to_string()).into())
}

/// One server-sent event.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ServerEvent {
    pub name: String,
    pub data: String,
}

/// Incremental `text/event-stream` parser.
///
/// Bytes are buffered until a blank line terminates an event, so chunks may
/// split lines or multi-byte characters anywhere.
#[derive(Debug, Default)]
pub struct EventStreamParser {
    buffer: Vec<u8>,
}

impl EventStreamParser {
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<ServerEvent> {
        self.buffer.extend(chunk.iter().copied().filter(|&b| b != b'\r'));

        let mut events = Vec::new();
        while let Some(end) = self.buffer.windows(2).position(|w| w == b"\n\n") {
            let block: Vec<u8> = self.buffer.drain(..end + 2).collect();
            let block = String::from_utf8_lossy(&block[..end]);
            if let Some(event) = Self::parse_block(&block) {
                events.push(event);
            }
        }
        events
    }

    fn parse_block(block: &str) -> Option<ServerEvent> {
        let mut event = ServerEvent::default();
        let mut data_lines = Vec::new();
        for line in block.lines() {
            if line.starts_with(':') {
                continue;
            }
            let (field, value) = line.split_once(':').unwrap_or((line, ""));
            let value = value.strip_prefix(' ').unwrap_or(value);
            match field {
                "event" => event.name = value.to_string(),
                "data" => data_lines.push(value),
                _ => {}
            }
        }
        if event.name.is_empty() && data_lines.is_empty() {
            return None;
        }
        event.data = data_lines.join("\n");
        Some(event)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    Changed,
    Ignored,
    Closed(String),
}

#[derive(Deserialize)]
struct EventPayload {
    path: String,
    data: Value,
}

/// Applies a streamed event to the locally cached subtree.
pub fn apply_event(cache: &mut Value, event: &ServerEvent) -> Result<EventOutcome> {
    match event.name.as_str() {
        "put" => {
            let payload: EventPayload = serde_json::from_str(&event.data)?;
            tree::set_at(cache, &tree::segments(&payload.path), payload.data);
            Ok(EventOutcome::Changed)
        }
        "patch" => {
            let payload: EventPayload = serde_json::from_str(&event.data)?;
            let Value::Object(fields) = payload.data else {
                return Ok(EventOutcome::Ignored);
            };
            tree::merge_at(cache, &tree::segments(&payload.path), fields);
            Ok(EventOutcome::Changed)
        }
        "cancel" => Ok(EventOutcome::Closed(format!("subscription cancelled by server: {}", event.data))),
        "auth_revoked" => Ok(EventOutcome::Closed("credential revoked, sign in again".to_string())),
        _ => Ok(EventOutcome::Ignored),
    }
}
