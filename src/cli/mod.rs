//! Command-line interface for tonight
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command group is implemented in its own submodule.

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::api::HttpApi;
use crate::config::Config;
use crate::error::Result;
use crate::output::OutputOptions;
use crate::store::Store;

mod plan;
mod session;
mod tasks;

/// tonight - task list client
///
/// A client for the tonight server: search and edit tasks, append work
/// logs, and manage the current plan from the command line.
#[derive(Parser, Debug)]
#[command(name = "tonight")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Base URL of the server (overrides the config file)
    #[arg(long, global = true, env = "TONIGHT_API_URL")]
    pub api_url: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and verify the session
    Login {
        /// Username
        username: String,

        /// Password (falls back to TONIGHT_PASSWORD)
        #[arg(long, env = "TONIGHT_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out
    Logout,

    /// Show the current session
    Whoami,

    /// Set a custom colour for a tag
    Tag {
        /// Tag name
        tag: String,

        /// Colour, e.g. "#ff8800"
        colour: String,
    },

    /// Task list commands
    #[command(subcommand)]
    Tasks(TaskCommands),

    /// Plan commands
    #[command(subcommand)]
    Plan(PlanCommands),
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Search and list tasks
    List {
        /// Full-text search query
        #[arg(long)]
        query: Option<String>,

        /// Status filter: pending, done, "won't do" (repeatable)
        #[arg(long)]
        status: Vec<String>,

        /// Sort field: score, createdAt, deadline
        #[arg(long)]
        sort: Option<String>,

        /// Raw query string, as copied from a shared link
        #[arg(long, conflicts_with_all = ["query", "status", "sort"])]
        from_query: Option<String>,
    },

    /// Create a task from its text form
    Add {
        /// Task content, e.g. "buy milk +errands ~15m !2"
        content: String,
    },

    /// Rewrite a task's text form
    Edit {
        /// Task id
        id: u64,

        /// New content
        content: String,
    },

    /// Append a log entry to a task
    Log {
        /// Task id
        id: u64,

        /// Log entry, e.g. "done", "50%", "pause: lunch"
        entry: String,
    },

    /// Delete a task
    Delete {
        /// Task id
        id: u64,
    },
}

/// Plan subcommands
#[derive(Subcommand, Debug)]
pub enum PlanCommands {
    /// Show the current plan
    Show,

    /// Start a plan for the given time budget
    Start {
        /// Time budget, e.g. "2h" or "1h30m"
        input: String,
    },

    /// Dismiss the current plan
    Dismiss,
}

impl Cli {
    /// Execute the CLI command
    pub async fn run(self) -> Result<()> {
        let options = OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };
        let store = build_store(self.api_url)?;

        match self.command {
            Commands::Login { username, password } => {
                session::run_login(&store, username, password, options).await
            }
            Commands::Logout => session::run_logout(&store, options).await,
            Commands::Whoami => session::run_whoami(&store, options).await,
            Commands::Tag { tag, colour } => {
                session::run_tag(&store, tag, colour, options).await
            }
            Commands::Tasks(cmd) => match cmd {
                TaskCommands::List {
                    query,
                    status,
                    sort,
                    from_query,
                } => {
                    tasks::run_list(
                        &store,
                        tasks::ListOptions {
                            query,
                            statuses: status,
                            sort,
                            from_query,
                            output: options,
                        },
                    )
                    .await
                }
                TaskCommands::Add { content } => tasks::run_add(&store, content, options).await,
                TaskCommands::Edit { id, content } => {
                    tasks::run_edit(&store, id, content, options).await
                }
                TaskCommands::Log { id, entry } => {
                    tasks::run_log(&store, id, entry, options).await
                }
                TaskCommands::Delete { id } => tasks::run_delete(&store, id, options).await,
            },
            Commands::Plan(cmd) => match cmd {
                PlanCommands::Show => plan::run_show(&store, options).await,
                PlanCommands::Start { input } => plan::run_start(&store, input, options).await,
                PlanCommands::Dismiss => plan::run_dismiss(&store, options).await,
            },
        }
    }
}

/// Build the store over the HTTP API, honoring config and overrides.
fn build_store(api_url: Option<String>) -> Result<Store> {
    let mut config = Config::load_default()?;
    if let Some(url) = api_url {
        config.api.url = url;
    }

    let api = HttpApi::new(&config.api.url)?;
    Ok(Store::with_hide_after(
        Arc::new(api),
        config.notifications.hide_after(),
    ))
}
