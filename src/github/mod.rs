//! Contains definitions of common types (repository name, label, pull request) needed
//! for working with (GitHub) repositories.
use std::fmt::{Debug, Display, Formatter};

use chrono::{DateTime, Utc};

pub mod api;
pub mod error;
pub mod server;
pub mod webhook;

pub use api::operations::{LabelRemoval, MergeError};
pub use error::{AuthError, CredentialError, ParseError};
pub use webhook::WebhookSecret;

/// Unique identifier of a GitHub repository
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct GithubRepoName {
    owner: String,
    name: String,
}

impl GithubRepoName {
    pub fn new(owner: &str, name: &str) -> Self {
        Self {
            owner: owner.to_string(),
            name: name.to_string(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Display for GithubRepoName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}/{}", self.owner, self.name))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PullRequestNumber(pub u64);

impl From<u64> for PullRequestNumber {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl Display for PullRequestNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        <u64 as Display>::fmt(&self.0, f)
    }
}

/// A named, colored tag attached to issues and pull requests.
///
/// Two labels are considered equal when their names match; color and description
/// are only used when the label has to be created.
#[derive(Clone, Debug)]
pub struct Label {
    pub name: String,
    pub color: String,
    pub description: Option<String>,
}

impl Label {
    pub fn new(name: &str, color: &str) -> Self {
        Self {
            name: name.to_string(),
            color: color.to_string(),
            description: None,
        }
    }

    /// Creates a `<queue>: <suffix>` label. The full name doubles as its description.
    pub fn queue(queue: &str, suffix: &str, color: &str) -> Self {
        let name = format!("{queue}: {suffix}");
        Self {
            description: Some(name.clone()),
            name,
            color: color.to_string(),
        }
    }

    /// Labels seen on a remote pull request only carry a name that we care about.
    pub fn named(name: &str) -> Self {
        Self::new(name, "")
    }
}

impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Label {}

impl Display for Label {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// A repository together with the branches whose pull requests should be scanned.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepoRef {
    pub name: String,
    pub branches: Vec<String>,
}

/// Snapshot of a remote pull request, valid for a single reconciliation pass.
#[derive(Clone, Debug)]
pub struct PullRequestRecord {
    /// Repository the pull request was opened against.
    pub repository: GithubRepoName,
    pub number: PullRequestNumber,
    pub title: String,
    /// Name of the repository holding the head branch, if it still exists.
    pub head_repo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub labels: Vec<Label>,
}

impl PullRequestRecord {
    pub fn has_label(&self, label: &Label) -> bool {
        self.labels.contains(label)
    }
}

impl Display for PullRequestRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.repository, self.number)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitSha(pub String);

impl From<String> for CommitSha {
    fn from(value: String) -> Self {
        Self(value)
    }
}
impl AsRef<str> for CommitSha {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}
impl Display for CommitSha {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

#[derive(Clone, Debug)]
pub struct CommitSummary {
    pub sha: CommitSha,
    pub message: String,
}

/// How far apart two commits are.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommitComparison {
    pub ahead_by: u64,
    pub behind_by: u64,
}

/// A commit status reported by an external system (e.g. CI).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitStatus {
    pub context: String,
    pub state: String,
    pub target_url: Option<String>,
}
