//! Command-line front end.
//!
//! Each subcommand lives in its own module with a `cmd` entry point.
//! Commands that talk to the backend build an [`AppContext`] first, which
//! reads the configuration and restores the cached session.

pub mod context;
pub mod init;
pub mod login;
pub mod logout;
pub mod register;
pub mod task;
pub mod watch;

pub use context::AppContext;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Configuration initialization")]
    Init(init::InitArgs),
    #[command(about = "Create an account")]
    Register(register::RegisterArgs),
    #[command(about = "Sign in with email and password, or with Google")]
    Login(login::LoginArgs),
    #[command(about = "Sign out and forget the cached session")]
    Logout,
    #[command(about = "Manage tasks")]
    Task(task::TaskArgs),
    #[command(about = "Follow the task list live")]
    Watch(watch::WatchArgs),
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub async fn menu() -> Result<()> {
        let cli = Self::parse();
        match cli.command {
            Commands::Init(args) => init::cmd(args),
            Commands::Register(args) => register::cmd(args).await,
            Commands::Login(args) => login::cmd(args).await,
            Commands::Logout => logout::cmd().await,
            Commands::Task(args) => task::cmd(args).await,
            Commands::Watch(args) => watch::cmd(args).await,
        }
    }
}
