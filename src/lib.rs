//! tonight - task list client library
//!
//! This library provides the state layer and HTTP client behind the
//! tonight CLI, a client for the tonight task server.
//!
//! # Core Concepts
//!
//! - **Store**: One shared state tree split into module slices
//! - **Actions**: Requested operations, asynchronous and fallible
//! - **Mutations**: Synchronous state transitions, one module slice each
//! - **Triggers**: Declarative cross-module subscriptions that keep the
//!   task list and the plan fresh after relevant changes
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `tonight.toml`
//! - `error`: Error types and result aliases
//! - `api`: HTTP access to the server, behind the `Api` trait
//! - `store`: Store composition, dispatch, and trigger tables
//! - `events`: The action and mutation catalog
//! - `task`: Task model and derived log predicates
//! - `filter`: Task filters and their query-string mirror
//! - `session`: Session identity state
//! - `planning`: The current plan
//! - `notifications`: Ephemeral notifications with auto-expiry
//! - `output`: Shared CLI output formatting

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod filter;
pub mod notifications;
pub mod output;
pub mod planning;
pub mod session;
pub mod store;
pub mod task;

pub use error::{Error, Result};
