//! Command-line interface and orchestration for gh-harvest
//!
//! This module implements the CLI commands and wires the fetch and output layers
//! together. It handles argument parsing, configuration management, logging setup,
//! and progress display.
//!
//! ## Commands
//!
//! - **harvest**: Read logins from the input CSV, fetch each user's profile,
//!   repositories, and latest commits through a pool of workers, and write one
//!   CSV row per repository. Users that cannot be fetched are logged to the error log.
//! - **init**: Generate a default configuration file
//!
//! ## Configuration
//!
//! Settings come from a TOML file (`gh-harvest.toml` by default), and command-line
//! flags override them. The GitHub token is only ever taken from the command line
//! or the `GITHUB_TOKEN` environment variable.

mod common;
mod config;
mod harvest;
mod host;
mod init;
mod progress_reporter;
mod run;

#[cfg(debug_assertions)]
pub use config::Config;

pub use harvest::{HarvestArgs, process_harvest};
pub use host::Host;
pub use init::{InitArgs, init_config};
pub use run::run;
