//! The flattened output record joining a profile with one repository and its latest commit.

use super::models::{CommitEntry, RepositorySummary, UserProfile};

/// Sentinel written for any value the API did not provide.
pub const NOT_AVAILABLE: &str = "N/A";

/// Column names of the output table, in write order.
pub const HEADERS: [&str; 34] = [
    "username",
    "name",
    "avatarUrl",
    "bio",
    "company",
    "location",
    "email",
    "website",
    "twitter",
    "followersCount",
    "followingCount",
    "publicRepos",
    "publicGists",
    "createdAt",
    "updatedAt",
    "repoName",
    "repoDescription",
    "repoUrl",
    "repoStars",
    "repoForks",
    "repoWatchers",
    "repoLanguage",
    "repoCreatedAt",
    "repoUpdatedAt",
    "repoPushedAt",
    "repoSize",
    "repoOpenIssues",
    "repoLicense",
    "repoDefaultBranch",
    "repoCommitCountFirstPage",
    "repoLatestCommitSha",
    "repoLatestCommitMessage",
    "repoLatestCommitAuthor",
    "repoLatestCommitDate",
];

/// Profile columns, repeated identically on every row of one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileFields {
    pub username: String,
    pub name: String,
    pub avatar_url: String,
    pub bio: String,
    pub company: String,
    pub location: String,
    pub email: String,
    pub website: String,
    pub twitter: String,
    pub followers_count: String,
    pub following_count: String,
    pub public_repos: String,
    pub public_gists: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Repository and latest-commit columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryFields {
    pub name: String,
    pub description: String,
    pub url: String,
    pub stars: String,
    pub forks: String,
    pub watchers: String,
    pub language: String,
    pub created_at: String,
    pub updated_at: String,
    pub pushed_at: String,
    pub size: String,
    pub open_issues: String,
    pub license: String,
    pub default_branch: String,
    pub commit_count_first_page: String,
    pub latest_commit_sha: String,
    pub latest_commit_message: String,
    pub latest_commit_author: String,
    pub latest_commit_date: String,
}

/// One output row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatRow {
    pub profile: ProfileFields,
    pub repository: RepositoryFields,
}

fn text(value: Option<String>) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn count(value: Option<impl core::fmt::Display>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| v.to_string())
}

impl From<UserProfile> for ProfileFields {
    fn from(profile: UserProfile) -> Self {
        Self {
            username: text(Some(profile.login)),
            name: text(profile.name),
            avatar_url: text(profile.avatar_url),
            bio: text(profile.bio),
            company: text(profile.company),
            location: text(profile.location),
            email: text(profile.email),
            website: text(profile.blog),
            twitter: text(profile.twitter_username),
            followers_count: count(profile.followers),
            following_count: count(profile.following),
            public_repos: count(profile.public_repos),
            public_gists: count(profile.public_gists),
            created_at: text(profile.created_at),
            updated_at: text(profile.updated_at),
        }
    }
}

impl RepositoryFields {
    /// The placeholder used for a user that owns no repositories.
    #[must_use]
    pub fn not_applicable() -> Self {
        let na = || NOT_AVAILABLE.to_string();
        Self {
            name: na(),
            description: na(),
            url: na(),
            stars: na(),
            forks: na(),
            watchers: na(),
            language: na(),
            created_at: na(),
            updated_at: na(),
            pushed_at: na(),
            size: na(),
            open_issues: na(),
            license: na(),
            default_branch: na(),
            commit_count_first_page: na(),
            latest_commit_sha: na(),
            latest_commit_message: na(),
            latest_commit_author: na(),
            latest_commit_date: na(),
        }
    }

    /// Project a repository and the first page of its commits.
    ///
    /// `commits` is `None` when the commit list could not be found; the commit columns and
    /// the count then fall back to [`NOT_AVAILABLE`]. The first element is taken as the latest commit.
    #[must_use]
    pub fn new(repo: RepositorySummary, commits: Option<Vec<CommitEntry>>) -> Self {
        let commit_count_first_page = commits.as_ref().map(Vec::len);
        let latest = commits.and_then(|c| c.into_iter().next());
        let (sha, detail) = latest.map_or((None, None), |entry| (entry.sha, entry.commit));
        let (message, author) = detail.map_or((None, None), |d| (d.message, d.author));
        let (author_name, author_date) = author.map_or((None, None), |a| (a.name, a.date));

        Self {
            name: text(Some(repo.name)),
            description: text(repo.description),
            url: text(repo.html_url),
            stars: count(repo.stargazers_count),
            forks: count(repo.forks_count),
            watchers: count(repo.watchers_count),
            language: text(repo.language),
            created_at: text(repo.created_at),
            updated_at: text(repo.updated_at),
            pushed_at: text(repo.pushed_at),
            size: count(repo.size),
            open_issues: count(repo.open_issues_count),
            license: text(repo.license.and_then(|l| l.name)),
            default_branch: text(repo.default_branch),
            commit_count_first_page: count(commit_count_first_page),
            latest_commit_sha: text(sha),
            latest_commit_message: text(message),
            latest_commit_author: text(author_name),
            latest_commit_date: text(author_date),
        }
    }
}

impl FlatRow {
    #[must_use]
    pub const fn new(profile: ProfileFields, repository: RepositoryFields) -> Self {
        Self { profile, repository }
    }

    /// The row's values in [`HEADERS`] order.
    #[must_use]
    pub fn record(&self) -> [&str; 34] {
        let p = &self.profile;
        let r = &self.repository;
        [
            &p.username,
            &p.name,
            &p.avatar_url,
            &p.bio,
            &p.company,
            &p.location,
            &p.email,
            &p.website,
            &p.twitter,
            &p.followers_count,
            &p.following_count,
            &p.public_repos,
            &p.public_gists,
            &p.created_at,
            &p.updated_at,
            &r.name,
            &r.description,
            &r.url,
            &r.stars,
            &r.forks,
            &r.watchers,
            &r.language,
            &r.created_at,
            &r.updated_at,
            &r.pushed_at,
            &r.size,
            &r.open_issues,
            &r.license,
            &r.default_branch,
            &r.commit_count_first_page,
            &r.latest_commit_sha,
            &r.latest_commit_message,
            &r.latest_commit_author,
            &r.latest_commit_date,
        ]
    }
}
