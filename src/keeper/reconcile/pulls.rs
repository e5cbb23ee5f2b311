use crate::github::{GithubRepoName, Label, PullRequestRecord, RepoRef};
use crate::keeper::reconcile::ReconcileError;
use crate::keeper::RepositoryClient;

/// Lists the open pull requests targeting any of the configured branches, oldest first.
///
/// Listing is not retried. Pull requests created at the same instant keep the order in
/// which they were listed.
pub async fn list_open_pull_requests<Client: RepositoryClient>(
    client: &Client,
    owner: &str,
    repos: &[RepoRef],
) -> Result<Vec<PullRequestRecord>, ReconcileError> {
    let mut pulls = Vec::new();
    for repo in repos {
        let name = GithubRepoName::new(owner, &repo.name);
        for branch in &repo.branches {
            let batch = client
                .list_pull_requests(&name, branch)
                .await
                .map_err(|error| {
                    ReconcileError::new("list-pull-requests", format!("{name} ({branch})"), error)
                })?;
            tracing::debug!("Found {} open PR(s) in {name} ({branch})", batch.len());
            pulls.extend(batch);
        }
    }
    pulls.sort_by_key(|pr| pr.created_at);
    Ok(pulls)
}

pub fn filter_by_label(pulls: Vec<PullRequestRecord>, label: &Label) -> Vec<PullRequestRecord> {
    pulls.into_iter().filter(|pr| pr.has_label(label)).collect()
}

pub fn exclude_by_label(pulls: Vec<PullRequestRecord>, label: &Label) -> Vec<PullRequestRecord> {
    pulls.into_iter().filter(|pr| !pr.has_label(label)).collect()
}
