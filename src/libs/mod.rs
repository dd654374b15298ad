//! Core library modules for dincharya.
//!
//! ## Features
//!
//! - **Core Infrastructure**: configuration, data storage, encrypted secrets, messaging, logging
//! - **Identity**: the session context and its cached refresh token
//! - **Tasks**: the task model, id generation, the repository and the live list synchronizer
//! - **User Interface**: the dashboard view model and table rendering
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dincharya::api::memory::MemoryStore;
//! use dincharya::libs::dashboard::Dashboard;
//! use dincharya::libs::session::SessionState;
//! use dincharya::libs::task::Category;
//! use tokio::sync::watch;
//!
//! let (_session, identity) = watch::channel(SessionState::default());
//! let mut dashboard = Dashboard::new(MemoryStore::new(), identity, Category::Personal);
//! dashboard.mount()?;
//! println!("{} tasks", dashboard.visible_tasks().len());
//! # Ok::<(), dincharya::libs::error::AppError>(())
//! ```

pub mod config;
pub mod dashboard;
pub mod data_storage;
pub mod error;
pub mod logger;
pub mod messages;
pub mod push_id;
pub mod repository;
pub mod secret;
pub mod session;
pub mod sync;
pub mod task;
pub mod view;
