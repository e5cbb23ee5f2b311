use std::sync::Arc;

use axum::async_trait;

use crate::config::QueueConfig;
use crate::github::{
    CommitComparison, CommitSha, CommitStatus, CommitSummary, GithubRepoName, Label,
    LabelRemoval, MergeError, PullRequestNumber, PullRequestRecord,
};

mod command;
mod comment;
pub mod event;
mod handlers;
pub mod reconcile;
pub mod router;

pub use command::KeeperCommand;
pub use event::{IssueRef, WebhookEvent};
pub use reconcile::{ReconcileError, RetryPolicy};
pub use router::{dispatch, RouteOutcome};

/// Provides functionality for working with the repositories of a single installation.
#[async_trait]
pub trait RepositoryClient: Send + Sync {
    /// Returns the permission level (`admin`, `write`, `read`, `none`) of a user.
    async fn get_collaborator_permission(
        &self,
        repo: &GithubRepoName,
        username: &str,
    ) -> anyhow::Result<String>;

    /// Find a label by its name. Returns `None` if the repository does not have it.
    async fn get_label(&self, repo: &GithubRepoName, name: &str) -> anyhow::Result<Option<Label>>;

    async fn create_label(&self, repo: &GithubRepoName, label: &Label) -> anyhow::Result<()>;

    /// Add a set of labels to a PR.
    async fn add_labels(
        &self,
        repo: &GithubRepoName,
        pr: PullRequestNumber,
        labels: &[String],
    ) -> anyhow::Result<()>;

    /// Remove a single label from a PR.
    async fn remove_label(
        &self,
        repo: &GithubRepoName,
        pr: PullRequestNumber,
        label: &str,
    ) -> anyhow::Result<LabelRemoval>;

    /// Lists all open pull requests targeting `branch`, oldest first.
    async fn list_pull_requests(
        &self,
        repo: &GithubRepoName,
        branch: &str,
    ) -> anyhow::Result<Vec<PullRequestRecord>>;

    /// Resolve a pull request from this repository by its number.
    async fn get_pull_request(
        &self,
        repo: &GithubRepoName,
        pr: PullRequestNumber,
    ) -> anyhow::Result<PullRequestRecord>;

    async fn list_commits(
        &self,
        repo: &GithubRepoName,
        branch: &str,
    ) -> anyhow::Result<Vec<CommitSummary>>;

    async fn compare_commits(
        &self,
        repo: &GithubRepoName,
        base: &str,
        head: &str,
    ) -> anyhow::Result<CommitComparison>;

    /// Merge `head` into `base`. Returns the SHA of the merge commit.
    async fn merge_branch(
        &self,
        repo: &GithubRepoName,
        base: &str,
        head: &str,
        commit_message: &str,
    ) -> Result<CommitSha, MergeError>;

    async fn list_statuses(
        &self,
        repo: &GithubRepoName,
        reference: &str,
    ) -> anyhow::Result<Vec<CommitStatus>>;

    async fn list_collaborators(&self, repo: &GithubRepoName) -> anyhow::Result<Vec<String>>;

    /// Post a comment to the issue or pull request with the given number.
    async fn post_comment(
        &self,
        repo: &GithubRepoName,
        issue: PullRequestNumber,
        text: &str,
    ) -> anyhow::Result<()>;
}

/// Everything needed to process a single webhook delivery.
/// It is created when the delivery arrives and dropped once the response is sent.
pub struct RequestContext<Client: RepositoryClient> {
    pub event: WebhookEvent,
    pub client: Client,
    pub retry: RetryPolicy,
    pub queue: Option<Arc<QueueConfig>>,
}

impl<Client: RepositoryClient> RequestContext<Client> {
    pub fn new(
        event: WebhookEvent,
        client: Client,
        retry: RetryPolicy,
        queue: Option<Arc<QueueConfig>>,
    ) -> Self {
        Self {
            event,
            client,
            retry,
            queue,
        }
    }
}
