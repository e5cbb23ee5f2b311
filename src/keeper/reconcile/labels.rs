use futures::future::join_all;
use regex::Regex;

use crate::github::{GithubRepoName, Label, LabelRemoval, PullRequestRecord, RepoRef};
use crate::keeper::reconcile::{with_retry, ReconcileError, RetryPolicy};
use crate::keeper::RepositoryClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelState {
    /// The label was already present and has been left untouched.
    Existing,
    Created,
}

/// Creates `label` in `repo` unless a label with the same name already exists.
/// An existing label keeps its color and description.
pub async fn ensure_label<Client: RepositoryClient>(
    client: &Client,
    retry: RetryPolicy,
    repo: &GithubRepoName,
    label: &Label,
) -> Result<LabelState, ReconcileError> {
    let target = format!("{repo} label `{label}`");
    let existing = client
        .get_label(repo, &label.name)
        .await
        .map_err(|error| ReconcileError::new("get-label", &target, error))?;
    if existing.is_some() {
        tracing::debug!("Label `{label}` already exists in {repo}");
        return Ok(LabelState::Existing);
    }

    let mut retrying = false;
    let state = with_retry(retry, "create-label", &target, || {
        let check_first = std::mem::replace(&mut retrying, true);
        async move {
            // A failed create may still have been applied remotely
            if check_first && client.get_label(repo, &label.name).await?.is_some() {
                return Ok(LabelState::Existing);
            }
            client.create_label(repo, label).await?;
            Ok(LabelState::Created)
        }
    })
    .await?;
    tracing::info!("Label `{label}` in {repo}: {state:?}");
    Ok(state)
}

/// Ensures every label exists in every repository.
/// Stops at the first pair that cannot be reconciled.
pub async fn ensure_labels_across_repos<Client: RepositoryClient>(
    client: &Client,
    retry: RetryPolicy,
    owner: &str,
    repos: &[RepoRef],
    labels: &[Label],
) -> Result<(), ReconcileError> {
    for repo in repos {
        let repo = GithubRepoName::new(owner, &repo.name);
        for label in labels {
            ensure_label(client, retry, &repo, label).await?;
        }
    }
    Ok(())
}

pub async fn add_label<Client: RepositoryClient>(
    client: &Client,
    retry: RetryPolicy,
    pr: &PullRequestRecord,
    label: &Label,
) -> Result<(), ReconcileError> {
    let target = format!("{pr} label `{label}`");
    let labels = [label.name.clone()];
    with_retry(retry, "add-label", &target, || {
        client.add_labels(&pr.repository, pr.number, &labels)
    })
    .await?;
    tracing::info!("Added label `{label}` to {pr}");
    Ok(())
}

/// Removes every label of `pr` that is contained in `labels`.
/// Returns the labels that were selected for removal.
pub async fn remove_labels_matching<Client: RepositoryClient>(
    client: &Client,
    retry: RetryPolicy,
    pr: &PullRequestRecord,
    labels: &[Label],
) -> Result<Vec<Label>, ReconcileError> {
    let selected = pr
        .labels
        .iter()
        .filter(|label| labels.contains(label))
        .cloned()
        .collect();
    remove_selected(client, retry, pr, selected).await
}

/// Removes every label of `pr` whose name matches `pattern`.
pub async fn remove_labels_matching_pattern<Client: RepositoryClient>(
    client: &Client,
    retry: RetryPolicy,
    pr: &PullRequestRecord,
    pattern: &str,
) -> Result<Vec<Label>, ReconcileError> {
    let regex = Regex::new(pattern).map_err(|error| {
        ReconcileError::new("remove-labels-matching-pattern", pattern, error.into())
    })?;
    let selected = pr
        .labels
        .iter()
        .filter(|label| regex.is_match(&label.name))
        .cloned()
        .collect();
    remove_selected(client, retry, pr, selected).await
}

/// Every selected label is attempted, even when another removal fails.
/// The first failure is reported.
async fn remove_selected<Client: RepositoryClient>(
    client: &Client,
    retry: RetryPolicy,
    pr: &PullRequestRecord,
    selected: Vec<Label>,
) -> Result<Vec<Label>, ReconcileError> {
    let results =
        join_all(selected.iter().map(|label| remove_label(client, retry, pr, label))).await;
    let mut outcome = Ok(());
    for (label, result) in selected.iter().zip(results) {
        if let Err(error) = result {
            tracing::warn!("Label `{label}` was left on {pr}");
            if outcome.is_ok() {
                outcome = Err(error);
            }
        }
    }
    outcome.map(|()| selected)
}

async fn remove_label<Client: RepositoryClient>(
    client: &Client,
    retry: RetryPolicy,
    pr: &PullRequestRecord,
    label: &Label,
) -> Result<(), ReconcileError> {
    let target = format!("{pr} label `{label}`");
    let removal = with_retry(retry, "remove-label", &target, || {
        client.remove_label(&pr.repository, pr.number, &label.name)
    })
    .await?;
    match removal {
        LabelRemoval::Removed => tracing::info!("Removed label `{label}` from {pr}"),
        LabelRemoval::NotPresent => {
            tracing::debug!("Label `{label}` was already removed from {pr}")
        }
    }
    Ok(())
}
