use anyhow::Context;
use axum::async_trait;
use octocrab::models::pulls::PullRequest;
use octocrab::params;
use octocrab::Octocrab;

use crate::github::api::operations::{self, api_path, LabelRemoval, MergeError};
use crate::github::{
    CommitComparison, CommitSha, CommitStatus, CommitSummary, GithubRepoName, Label,
    PullRequestNumber, PullRequestRecord,
};
use crate::keeper::RepositoryClient;

/// GitHub returns at most this many items per page.
const PAGE_SIZE: u8 = 100;

/// Provides access to the repositories of a single app installation using the GitHub API.
pub struct InstallationClient {
    /// The client caches the installation access token and refreshes it once it expires.
    client: Octocrab,
}

impl InstallationClient {
    pub fn new(client: Octocrab) -> Self {
        Self { client }
    }
}

fn github_pr_to_record(
    repo: &GithubRepoName,
    pr: PullRequest,
) -> anyhow::Result<PullRequestRecord> {
    let created_at = pr
        .created_at
        .with_context(|| format!("PR {repo}#{} has no creation time", pr.number))?;
    Ok(PullRequestRecord {
        repository: repo.clone(),
        number: pr.number.into(),
        title: pr.title.unwrap_or_default(),
        head_repo: pr.head.repo.map(|repo| repo.name),
        created_at,
        labels: pr
            .labels
            .unwrap_or_default()
            .into_iter()
            .map(Label::from)
            .collect(),
    })
}

#[async_trait]
impl RepositoryClient for InstallationClient {
    async fn get_collaborator_permission(
        &self,
        repo: &GithubRepoName,
        username: &str,
    ) -> anyhow::Result<String> {
        #[derive(serde::Deserialize)]
        struct PermissionResponse {
            permission: String,
        }

        let url = api_path(&[
            "repos",
            repo.owner(),
            repo.name(),
            "collaborators",
            username,
            "permission",
        ]);
        let response: PermissionResponse = self
            .client
            .get(url, None::<&()>)
            .await
            .with_context(|| format!("Cannot get permission of {username} in {repo}"))?;
        Ok(response.permission)
    }

    async fn get_label(&self, repo: &GithubRepoName, name: &str) -> anyhow::Result<Option<Label>> {
        operations::get_label(&self.client, repo, name).await
    }

    async fn create_label(&self, repo: &GithubRepoName, label: &Label) -> anyhow::Result<()> {
        self.client
            .issues(repo.owner(), repo.name())
            .create_label(
                &label.name,
                &label.color,
                label.description.as_deref().unwrap_or_default(),
            )
            .await
            .with_context(|| format!("Cannot create label `{label}` in {repo}"))?;
        Ok(())
    }

    async fn add_labels(
        &self,
        repo: &GithubRepoName,
        pr: PullRequestNumber,
        labels: &[String],
    ) -> anyhow::Result<()> {
        if labels.is_empty() {
            return Ok(());
        }
        self.client
            .issues(repo.owner(), repo.name())
            .add_labels(pr.0, labels)
            .await
            .with_context(|| format!("Cannot add label(s) {labels:?} to {repo}#{pr}"))?;
        Ok(())
    }

    async fn remove_label(
        &self,
        repo: &GithubRepoName,
        pr: PullRequestNumber,
        label: &str,
    ) -> anyhow::Result<LabelRemoval> {
        operations::remove_label(&self.client, repo, pr, label).await
    }

    async fn list_pull_requests(
        &self,
        repo: &GithubRepoName,
        branch: &str,
    ) -> anyhow::Result<Vec<PullRequestRecord>> {
        let page = self
            .client
            .pulls(repo.owner(), repo.name())
            .list()
            .state(params::State::Open)
            .base(branch)
            .sort(params::pulls::Sort::Created)
            .direction(params::Direction::Ascending)
            .per_page(PAGE_SIZE)
            .send()
            .await
            .with_context(|| format!("Cannot list pull requests of {repo} ({branch})"))?;
        let pulls = self
            .client
            .all_pages(page)
            .await
            .with_context(|| format!("Cannot list pull requests of {repo} ({branch})"))?;
        pulls
            .into_iter()
            .map(|pr| github_pr_to_record(repo, pr))
            .collect()
    }

    async fn get_pull_request(
        &self,
        repo: &GithubRepoName,
        pr: PullRequestNumber,
    ) -> anyhow::Result<PullRequestRecord> {
        let pr = self
            .client
            .pulls(repo.owner(), repo.name())
            .get(pr.0)
            .await
            .with_context(|| format!("Could not get PR {repo}#{pr}"))?;
        github_pr_to_record(repo, pr)
    }

    async fn list_commits(
        &self,
        repo: &GithubRepoName,
        branch: &str,
    ) -> anyhow::Result<Vec<CommitSummary>> {
        let commits = self
            .client
            .repos(repo.owner(), repo.name())
            .list_commits()
            .sha(branch)
            .send()
            .await
            .with_context(|| format!("Cannot list commits of {repo} ({branch})"))?;
        Ok(commits
            .items
            .into_iter()
            .map(|commit| CommitSummary {
                sha: commit.sha.into(),
                message: commit.commit.message,
            })
            .collect())
    }

    async fn compare_commits(
        &self,
        repo: &GithubRepoName,
        base: &str,
        head: &str,
    ) -> anyhow::Result<CommitComparison> {
        #[derive(serde::Deserialize)]
        struct ComparisonPayload {
            ahead_by: u64,
            behind_by: u64,
        }

        let comparison: ComparisonPayload = self
            .client
            .get(format!("/repos/{repo}/compare/{base}...{head}"), None::<&()>)
            .await
            .with_context(|| format!("Cannot compare {base}...{head} in {repo}"))?;
        Ok(CommitComparison {
            ahead_by: comparison.ahead_by,
            behind_by: comparison.behind_by,
        })
    }

    async fn merge_branch(
        &self,
        repo: &GithubRepoName,
        base: &str,
        head: &str,
        commit_message: &str,
    ) -> Result<CommitSha, MergeError> {
        operations::merge_branch(&self.client, repo, base, head, commit_message).await
    }

    async fn list_statuses(
        &self,
        repo: &GithubRepoName,
        reference: &str,
    ) -> anyhow::Result<Vec<CommitStatus>> {
        #[derive(serde::Deserialize)]
        struct StatusPayload {
            context: String,
            state: String,
            target_url: Option<String>,
        }

        let statuses: Vec<StatusPayload> = self
            .client
            .get(
                format!("/repos/{repo}/commits/{reference}/statuses"),
                None::<&()>,
            )
            .await
            .with_context(|| format!("Cannot list statuses of {reference} in {repo}"))?;
        Ok(statuses
            .into_iter()
            .map(|status| CommitStatus {
                context: status.context,
                state: status.state,
                target_url: status.target_url,
            })
            .collect())
    }

    async fn list_collaborators(&self, repo: &GithubRepoName) -> anyhow::Result<Vec<String>> {
        #[derive(serde::Deserialize)]
        struct CollaboratorPayload {
            login: String,
        }

        let collaborators: Vec<CollaboratorPayload> = self
            .client
            .get(format!("/repos/{repo}/collaborators"), None::<&()>)
            .await
            .with_context(|| format!("Cannot list collaborators of {repo}"))?;
        Ok(collaborators.into_iter().map(|user| user.login).collect())
    }

    /// The comment will be posted as the GitHub App user.
    async fn post_comment(
        &self,
        repo: &GithubRepoName,
        issue: PullRequestNumber,
        text: &str,
    ) -> anyhow::Result<()> {
        self.client
            .issues(repo.owner(), repo.name())
            .create_comment(issue.0, text)
            .await
            .with_context(|| format!("Cannot post comment to {repo}#{issue}"))?;
        Ok(())
    }
}
