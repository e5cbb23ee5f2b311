use tracing::Instrument;

use crate::github::GithubRepoName;
use crate::keeper::command::KeeperCommand;
use crate::keeper::comment::{not_a_pull_request_comment, run_all_tests_comment, Comment};
use crate::keeper::handlers::queue::{
    command_queue, command_queue_status, command_sync_labels, command_unqueue,
};
use crate::keeper::router::{HandlerError, RouteOutcome};
use crate::keeper::{IssueRef, RepositoryClient, RequestContext};
use crate::permissions::has_write_access;
use crate::utils::logging::LogError;

mod queue;

/// Executes a command found in a newly created issue comment.
///
/// Unknown comments and users without write access are expected and answered with a
/// successful outcome. Only a command that was actually executed is acknowledged.
pub(super) async fn handle_issue_comment<Client: RepositoryClient>(
    ctx: &RequestContext<Client>,
) -> Result<RouteOutcome, HandlerError> {
    let text = ctx.event.comment_text();
    let Some(command) = KeeperCommand::parse(text) else {
        tracing::debug!("Ignoring comment {text:?}");
        return Ok(RouteOutcome::ok(format!(
            "Received an unhandled comment: {text}"
        )));
    };

    let repo = ctx.event.repository()?;
    let issue = ctx.event.issue()?;
    let sender = ctx.event.sender()?;

    if !has_write_access(&ctx.client, &repo, sender).await? {
        tracing::info!("{sender} is not allowed to run `{command}` in {repo}");
        return Ok(RouteOutcome::ok(format!(
            "User {sender} is unauthorized to run command: {command}"
        )));
    }

    let span = tracing::info_span!(
        "Command",
        pr = format!("{repo}#{}", issue.number),
        author = sender,
        command = command.as_str()
    );
    let comment = execute_command(ctx, &repo, issue, sender, command)
        .instrument(span.clone())
        .await?;

    if let Err(error) = ctx
        .client
        .post_comment(&repo, issue.number, &comment.render())
        .await
    {
        span.log_error(error.context("Cannot post acknowledgement"));
    }
    Ok(RouteOutcome::ok(format!("Received comment: {command}")))
}

async fn execute_command<Client: RepositoryClient>(
    ctx: &RequestContext<Client>,
    repo: &GithubRepoName,
    issue: &IssueRef,
    sender: &str,
    command: KeeperCommand,
) -> Result<Comment, HandlerError> {
    if command.needs_pull_request() && !issue.is_pull_request {
        return Ok(not_a_pull_request_comment());
    }
    match command {
        KeeperCommand::RunAllTests => {
            tracing::info!("Received request to run all tests");
            Ok(run_all_tests_comment(sender))
        }
        KeeperCommand::Queue => command_queue(ctx, repo, issue).await,
        KeeperCommand::Unqueue => command_unqueue(ctx, repo, issue).await,
        KeeperCommand::QueueStatus => command_queue_status(ctx, repo).await,
        KeeperCommand::SyncLabels => command_sync_labels(ctx, repo).await,
    }
}

pub(super) fn handle_installation_created<Client: RepositoryClient>(
    ctx: &RequestContext<Client>,
) -> RouteOutcome {
    tracing::info!(
        "App was installed (installation {})",
        ctx.event.installation_id
    );
    RouteOutcome::ok("Received installation request")
}
