#![doc(hidden)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core library for gh-harvest
//!
//! This library holds all functionality for the gh-harvest tool, which collects GitHub
//! profile, repository, and latest-commit data for a list of users and flattens it into CSV.
//!
//! # Module Organization
//!
//! - [`commands`]: Command-line interface, configuration, and orchestration
//! - [`fetch`]: GitHub API client, per-user fetch pipeline, and the worker pool
//! - [`output`]: Input CSV reading and the concurrent result sink

pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

#[cfg(any(debug_assertions, test))]
pub mod commands;
#[cfg(not(any(debug_assertions, test)))]
mod commands;

#[cfg(any(debug_assertions, test))]
pub mod fetch;
#[cfg(not(any(debug_assertions, test)))]
mod fetch;

#[cfg(any(debug_assertions, test))]
pub mod output;
#[cfg(not(any(debug_assertions, test)))]
mod output;

pub use crate::commands::{Host, run};
