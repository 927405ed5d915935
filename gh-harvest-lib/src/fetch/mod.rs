//! Fetching GitHub data for a list of users.
//!
//! The [`Client`] performs single GET requests with bounded rate-limit retries, the
//! [`UserPipeline`] turns one login into a [`FetchOutcome`], and the [`Dispatcher`]
//! spreads the logins over a fixed pool of concurrent workers.

mod client;
mod dispatcher;
mod flat_row;
mod models;
mod outcome;
mod pipeline;
mod progress;
mod work_tracker;

pub use client::{Client, FetchError, RateLimitInfo, RetryPolicy};
pub use dispatcher::{DEFAULT_MAX_CONCURRENT_WORKERS, DispatchSummary, Dispatcher, OutcomeSink, worker_count};
pub use flat_row::{FlatRow, HEADERS, NOT_AVAILABLE, ProfileFields, RepositoryFields};
pub use models::{CommitAuthor, CommitDetail, CommitEntry, License, RepositoryOwner, RepositorySummary, UserProfile};
pub use outcome::FetchOutcome;
pub use pipeline::{Processor, UserPipeline};
pub use progress::Progress;
pub use work_tracker::{WorkSnapshot, WorkTracker};
