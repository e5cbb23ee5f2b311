use crate::config::QueueConfig;
use crate::github::{GithubRepoName, PullRequestRecord};
use crate::keeper::comment::{
    already_queued_comment, excluded_comment, labels_synchronized_comment,
    queue_not_configured_comment, queue_status_comment, queued_comment, unqueued_comment,
    Comment,
};
use crate::keeper::reconcile::{
    add_label, ensure_label, ensure_labels_across_repos, exclude_by_label, filter_by_label,
    list_open_pull_requests, remove_labels_matching_pattern, ReconcileError,
};
use crate::keeper::router::HandlerError;
use crate::keeper::{IssueRef, RepositoryClient, RequestContext};

/// Puts the pull request into the queue, unless it is excluded from it.
pub(super) async fn command_queue<Client: RepositoryClient>(
    ctx: &RequestContext<Client>,
    repo: &GithubRepoName,
    issue: &IssueRef,
) -> Result<Comment, HandlerError> {
    let Some(queue) = ctx.queue.as_deref() else {
        return Ok(queue_not_configured_comment());
    };
    let pr = load_pull_request(ctx, repo, issue).await?;

    let queued = queue.queued_label();
    let exclude = queue.exclude_label();
    if pr.has_label(&exclude) {
        return Ok(excluded_comment(&exclude));
    }
    if pr.has_label(&queued) {
        return Ok(already_queued_comment(&queued));
    }
    ensure_label(&ctx.client, ctx.retry, repo, &queued).await?;
    add_label(&ctx.client, ctx.retry, &pr, &queued).await?;
    Ok(queued_comment(&queued))
}

/// Removes every label of the queue from the pull request.
/// The exclusion marker is set by maintainers and is kept.
pub(super) async fn command_unqueue<Client: RepositoryClient>(
    ctx: &RequestContext<Client>,
    repo: &GithubRepoName,
    issue: &IssueRef,
) -> Result<Comment, HandlerError> {
    let Some(queue) = ctx.queue.as_deref() else {
        return Ok(queue_not_configured_comment());
    };
    let mut pr = load_pull_request(ctx, repo, issue).await?;
    let exclude = queue.exclude_label();
    pr.labels.retain(|label| label != &exclude);
    let removed =
        remove_labels_matching_pattern(&ctx.client, ctx.retry, &pr, &queue.label_pattern())
            .await?;
    Ok(unqueued_comment(&removed))
}

/// Lists the queued pull requests of all configured repositories, oldest first.
pub(super) async fn command_queue_status<Client: RepositoryClient>(
    ctx: &RequestContext<Client>,
    repo: &GithubRepoName,
) -> Result<Comment, HandlerError> {
    let Some(queue) = ctx.queue.as_deref() else {
        return Ok(queue_not_configured_comment());
    };
    let pulls = list_open_pull_requests(&ctx.client, repo.owner(), &queue.repositories).await?;
    let pulls = filter_by_label(pulls, &queue.queued_label());
    let pulls = exclude_by_label(pulls, &queue.exclude_label());
    tracing::info!("{} PR(s) are waiting in queue `{}`", pulls.len(), queue.name);
    Ok(queue_status_comment(&queue.name, &pulls))
}

/// Creates the queue labels in all configured repositories.
pub(super) async fn command_sync_labels<Client: RepositoryClient>(
    ctx: &RequestContext<Client>,
    repo: &GithubRepoName,
) -> Result<Comment, HandlerError> {
    let Some(queue) = ctx.queue.as_deref() else {
        return Ok(queue_not_configured_comment());
    };
    sync_labels(ctx, repo, queue).await?;
    Ok(labels_synchronized_comment(
        queue.repositories.len(),
        &queue.labels(),
    ))
}

async fn sync_labels<Client: RepositoryClient>(
    ctx: &RequestContext<Client>,
    repo: &GithubRepoName,
    queue: &QueueConfig,
) -> Result<(), ReconcileError> {
    ensure_labels_across_repos(
        &ctx.client,
        ctx.retry,
        repo.owner(),
        &queue.repositories,
        &queue.labels(),
    )
    .await
}

async fn load_pull_request<Client: RepositoryClient>(
    ctx: &RequestContext<Client>,
    repo: &GithubRepoName,
    issue: &IssueRef,
) -> Result<PullRequestRecord, ReconcileError> {
    ctx.client
        .get_pull_request(repo, issue.number)
        .await
        .map_err(|error| {
            ReconcileError::new("get-pull-request", format!("{repo}#{}", issue.number), error)
        })
}
