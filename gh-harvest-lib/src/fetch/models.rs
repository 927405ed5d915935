//! Serde models for the three GitHub API resources consumed by the pipeline.
//!
//! Only the fields that end up in the flattened output are modeled. Anything the API
//! omits or sends as `null` deserializes to `None` and is normalized later.

use serde::Deserialize;

/// A user profile from `/users/{login}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub login: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub email: Option<String>,
    pub blog: Option<String>,
    pub twitter_username: Option<String>,
    pub followers: Option<u64>,
    pub following: Option<u64>,
    pub public_repos: Option<u64>,
    pub public_gists: Option<u64>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// One element of the `/users/{login}/repos` array.
#[derive(Debug, Clone, Deserialize)]
pub struct RepositorySummary {
    pub name: String,
    pub owner: Option<RepositoryOwner>,
    pub description: Option<String>,
    pub html_url: Option<String>,
    pub stargazers_count: Option<u64>,
    pub forks_count: Option<u64>,
    pub watchers_count: Option<u64>,
    pub language: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub pushed_at: Option<String>,
    pub size: Option<u64>,
    pub open_issues_count: Option<u64>,
    pub license: Option<License>,
    pub default_branch: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryOwner {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct License {
    pub name: Option<String>,
}

/// One element of the `/repos/{owner}/{repo}/commits` array.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitEntry {
    pub sha: Option<String>,
    pub commit: Option<CommitDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitDetail {
    pub message: Option<String>,
    pub author: Option<CommitAuthor>,
}

/// Git author signature. `date` is kept verbatim as the API formats it.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitAuthor {
    pub name: Option<String>,
    pub date: Option<String>,
}
