//! Task model and its wire representation.
//!
//! A task node under `users/{uid}/tasks/{id}` is stored as a camelCase JSON
//! object: `{ id, title, description, category, dueDate, status, createdAt,
//! updatedAt }`. The node key is authoritative for the id; the embedded `id`
//! field is written for readers that only see the node value.

use crate::libs::error::AppError;
use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Personal,
    Business,
    Future,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Personal, Category::Business, Category::Future];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Personal => "personal",
            Category::Business => "business",
            Category::Future => "future",
        }
    }

    /// Capitalized name used in headers.
    pub fn title(&self) -> &'static str {
        match self {
            Category::Personal => "Personal",
            Category::Business => "Business",
            Category::Future => "Future",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Category::Personal => "👤",
            Category::Business => "💼",
            Category::Future => "🎯",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "personal" => Ok(Category::Personal),
            "business" => Ok(Category::Business),
            "future" => Ok(Category::Future),
            other => Err(AppError::Validation(format!("unknown category '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Pending,
    Completed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Completed => "completed",
        }
    }

    /// The status a toggle action moves to.
    pub fn toggled(&self) -> Status {
        match self {
            Status::Pending => Status::Completed,
            Status::Completed => Status::Pending,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    pub due_date: NaiveDate,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Builds a task from one entry of a subtree snapshot, using `key` as the id.
    pub fn from_entry(key: &str, value: &Value) -> Result<Self> {
        let mut task: Task = serde_json::from_value(value.clone())?;
        task.id = key.to_string();
        Ok(task)
    }

    pub fn is_completed(&self) -> bool {
        self.status == Status::Completed
    }
}

/// User-submitted fields for a new task.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub due_date: NaiveDate,
}

impl NewTask {
    pub fn new(title: &str, description: &str, category: Category, due_date: NaiveDate) -> Self {
        Self {
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            category,
            due_date,
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("title is required".to_string()));
        }
        Ok(())
    }

    /// The full record written on creation.
    pub fn into_task(self, id: &str, now: DateTime<Utc>) -> Task {
        Task {
            id: id.to_string(),
            title: self.title,
            description: self.description,
            category: self.category,
            due_date: self.due_date,
            status: Status::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial edit of an existing task. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub due_date: Option<NaiveDate>,
}

impl TaskChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.category.is_none() && self.due_date.is_none()
    }

    /// Keeps only the fields that differ from `task`.
    pub fn diff_against(self, task: &Task) -> Self {
        Self {
            title: self.title.filter(|t| t != &task.title),
            description: self.description.filter(|d| d != &task.description),
            category: self.category.filter(|c| c != &task.category),
            due_date: self.due_date.filter(|d| d != &task.due_date),
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(AppError::Validation("title is required".to_string()));
            }
        }
        Ok(())
    }

    /// Field map for a partial update, always including `updatedAt`.
    pub fn to_fields(&self, updated_at: DateTime<Utc>) -> Map<String, Value> {
        let mut fields = Map::new();
        if let Some(title) = &self.title {
            fields.insert("title".into(), Value::String(title.trim().to_string()));
        }
        if let Some(description) = &self.description {
            fields.insert("description".into(), Value::String(description.trim().to_string()));
        }
        if let Some(category) = &self.category {
            fields.insert("category".into(), Value::String(category.to_string()));
        }
        if let Some(due_date) = &self.due_date {
            fields.insert("dueDate".into(), Value::String(due_date.format(DUE_DATE_FORMAT).to_string()));
        }
        fields.insert("updatedAt".into(), timestamp_value(updated_at));
        fields
    }
}

pub fn parse_due_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), DUE_DATE_FORMAT).map_err(|_| AppError::Validation(format!("invalid due date '{}'", raw.trim())))
}

pub(crate) fn timestamp_value(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
}
