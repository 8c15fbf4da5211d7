#![forbid(unsafe_code)]
#![warn(
    unused,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::redundant_pub_crate)]

//! Command-line client for the Recoup platform API.
//!
//! Layout:
//! - `cli.rs`: argument parsing, command dispatch, and the error/exit boundary
//! - `config.rs`: API key and base URL resolution
//! - `client.rs`: authenticated HTTP client and error types
//! - `models.rs`: response envelope and typed payload views
//! - `commands/`: command handlers grouped by resource
//! - `output.rs`: table, JSON, and error renderers
//! - `main.rs`: thin entrypoint delegating to `run()`

pub(crate) mod cli;
pub(crate) mod client;
pub(crate) mod commands;
pub(crate) mod config;
pub(crate) mod models;
pub(crate) mod output;

pub use cli::run;
