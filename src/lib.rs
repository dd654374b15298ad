//! # Dincharya - personal task tracker
//!
//! A command-line client for a task list kept in a realtime database.
//! Each user's tasks live under their own subtree; the client signs the
//! user in, writes changes to that subtree and follows it live.
//!
//! ## Features
//!
//! - **Accounts**: email/password registration and login, Google sign-in
//! - **Tasks**: add, edit, complete and delete tasks in three categories
//! - **Live view**: a dashboard that redraws whenever the remote list changes
//! - **Session cache**: the refresh token is stored encrypted between runs
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dincharya::commands::Cli;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     Cli::menu().await
//! }
//! ```

pub mod api;
pub mod commands;
pub mod libs;
