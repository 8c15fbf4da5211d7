#![forbid(unsafe_code)]
#![warn(
    unused,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]

//! Logging bootstrap shared by the Recoup command-line tools.
//!
//! Logs are diagnostics only: they always go to standard error so that
//! standard output carries nothing but command results.

pub mod error;
pub mod init;

pub use error::{Result, TelemetryError};
pub use init::{
    DEFAULT_LOG_LEVEL, LOG_ENV, LOG_FORMAT_ENV, LogFormat, LoggingConfig, init_logging,
};
