//! Per-user fetch sequence: profile, then repositories, then the commits of each repository.

use super::client::{Client, FetchError};
use super::flat_row::{FlatRow, ProfileFields, RepositoryFields};
use super::models::{CommitEntry, RepositorySummary, UserProfile};
use super::outcome::FetchOutcome;

const LOG_TARGET: &str = "  pipeline";

/// Turns one identifier into its terminal outcome.
///
/// Implementations must not fail: every error is reported as [`FetchOutcome::Failure`].
pub trait Processor: Send + Sync {
    fn process(&self, identifier: String) -> impl Future<Output = FetchOutcome> + Send;
}

#[derive(Debug, thiserror::Error)]
enum PipelineError {
    #[error("User not found")]
    UserNotFound,

    #[error("Unable to fetch repositories")]
    RepositoriesUnavailable,

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Fetches a GitHub user, their repositories, and each repository's latest commit.
#[derive(Debug, Clone)]
pub struct UserPipeline {
    client: Client,
}

impl UserPipeline {
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    async fn fetch_rows(&self, identifier: &str) -> Result<Vec<FlatRow>, PipelineError> {
        log::info!(target: LOG_TARGET, "Querying GitHub for user '{identifier}'");

        let profile: UserProfile = self
            .client
            .fetch(&self.client.endpoint(["users", identifier]))
            .await?
            .ok_or(PipelineError::UserNotFound)?;

        let repos: Vec<RepositorySummary> = self
            .client
            .fetch(&self.client.endpoint(["users", identifier, "repos"]))
            .await?
            .ok_or(PipelineError::RepositoriesUnavailable)?;

        let profile = ProfileFields::from(profile);

        if repos.is_empty() {
            log::debug!(target: LOG_TARGET, "User '{identifier}' has no public repositories");
            return Ok(vec![FlatRow::new(profile, RepositoryFields::not_applicable())]);
        }

        // At most one request in flight per worker.
        let mut rows = Vec::with_capacity(repos.len());
        for repo in repos {
            let owner = repo.owner.as_ref().map_or(identifier, |o| o.login.as_str());
            let url = self.client.endpoint(["repos", owner, repo.name.as_str(), "commits"]);
            let commits: Option<Vec<CommitEntry>> = self.client.fetch(&url).await?;

            log::debug!(
                target: LOG_TARGET,
                "Fetched {} commit(s) for '{owner}/{}'",
                commits.as_ref().map_or(0, Vec::len),
                repo.name
            );

            rows.push(FlatRow::new(profile.clone(), RepositoryFields::new(repo, commits)));
        }

        Ok(rows)
    }
}

impl Processor for UserPipeline {
    async fn process(&self, identifier: String) -> FetchOutcome {
        match self.fetch_rows(&identifier).await {
            Ok(rows) => FetchOutcome::Rows { identifier, rows },
            Err(e) => FetchOutcome::Failure {
                identifier,
                reason: e.to_string(),
            },
        }
    }
}
