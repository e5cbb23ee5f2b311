use anyhow::Context;
use http::StatusCode;
use octocrab::Octocrab;
use thiserror::Error;
use url::Url;

use crate::github::{CommitSha, GithubRepoName, Label, PullRequestNumber};

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("Branch not found")]
    NotFound,
    #[error("Merge conflict")]
    Conflict,
    #[error("Branch was already merged")]
    AlreadyMerged,
    #[error("Unknown error ({status}): {text}")]
    Unknown { status: StatusCode, text: String },
    #[error("Network error: {0}")]
    NetworkError(#[from] octocrab::Error),
}

/// Outcome of removing a label from an issue or pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelRemoval {
    Removed,
    /// The label was not on the issue (anymore).
    NotPresent,
}

/// Builds an API path out of segments, percent-encoding each of them.
/// Label names routinely contain spaces and colons.
pub(crate) fn api_path(segments: &[&str]) -> String {
    let mut url = Url::parse("https://api.github.com").expect("Static URL is valid");
    url.path_segments_mut()
        .expect("Static URL can be a base")
        .extend(segments);
    url.path().to_string()
}

fn repo_path<'a>(repo: &'a GithubRepoName, rest: &[&'a str]) -> String {
    let mut segments = vec!["repos", repo.owner(), repo.name()];
    segments.extend_from_slice(rest);
    api_path(&segments)
}

impl From<octocrab::models::Label> for Label {
    fn from(label: octocrab::models::Label) -> Self {
        Label {
            name: label.name,
            color: label.color,
            description: label.description,
        }
    }
}

/// Looks up a label of a repository by its name.
///
/// Documentation: https://docs.github.com/en/rest/issues/labels?apiVersion=2022-11-28#get-a-label
pub async fn get_label(
    client: &Octocrab,
    repo: &GithubRepoName,
    name: &str,
) -> anyhow::Result<Option<Label>> {
    let response = client._get(repo_path(repo, &["labels", name])).await?;
    let status = response.status();
    let text = client.body_to_string(response).await.unwrap_or_default();

    tracing::trace!("Response from getting label `{name}` in `{repo}`: {status} ({text})");

    match status {
        StatusCode::OK => {
            let label: octocrab::models::Label =
                serde_json::from_str(&text).context("Cannot deserialize label")?;
            Ok(Some(label.into()))
        }
        StatusCode::NOT_FOUND => Ok(None),
        _ => Err(anyhow::anyhow!(
            "Cannot get label `{name}` of {repo} ({status}): {text}"
        )),
    }
}

/// Removes a single label from an issue or pull request.
/// A label that is already gone is not an error.
///
/// Documentation: https://docs.github.com/en/rest/issues/labels?apiVersion=2022-11-28#remove-a-label-from-an-issue
pub async fn remove_label(
    client: &Octocrab,
    repo: &GithubRepoName,
    pr: PullRequestNumber,
    label: &str,
) -> anyhow::Result<LabelRemoval> {
    let number = pr.to_string();
    let url = repo_path(repo, &["issues", &number, "labels", label]);
    let response = client._delete(url, None::<&()>).await?;
    let status = response.status();

    tracing::trace!("Removing label `{label}` from {repo}#{pr}: {status}");

    match status {
        StatusCode::OK | StatusCode::NO_CONTENT => Ok(LabelRemoval::Removed),
        StatusCode::NOT_FOUND => Ok(LabelRemoval::NotPresent),
        _ => {
            let text = client.body_to_string(response).await.unwrap_or_default();
            Err(anyhow::anyhow!(
                "Cannot remove label `{label}` from {repo}#{pr} ({status}): {text}"
            ))
        }
    }
}

#[derive(serde::Serialize)]
struct MergeRequest<'a, 'b, 'c> {
    base: &'a str,
    head: &'b str,
    commit_message: &'c str,
}

#[derive(serde::Deserialize)]
struct MergeResponse {
    sha: String,
}

/// Merges `head` into the `base` branch of the given repository.
///
/// Documentation: https://docs.github.com/en/rest/branches/branches?apiVersion=2022-11-28#merge-a-branch
pub async fn merge_branch(
    client: &Octocrab,
    repo: &GithubRepoName,
    base_ref: &str,
    head: &str,
    commit_message: &str,
) -> Result<CommitSha, MergeError> {
    let request = MergeRequest {
        base: base_ref,
        head,
        commit_message,
    };
    let response = client
        ._post(repo_path(repo, &["merges"]), Some(&request))
        .await;

    match response {
        Ok(response) => {
            let status = response.status();
            let text = client.body_to_string(response).await.unwrap_or_default();

            tracing::trace!(
                "Response from merging `{head}` into `{base_ref}` in `{repo}`: {status} ({text})",
            );

            match status {
                StatusCode::CREATED => {
                    let response: MergeResponse =
                        serde_json::from_str(&text).map_err(|error| MergeError::Unknown {
                            status,
                            text: format!("{error:?}"),
                        })?;
                    Ok(response.sha.into())
                }
                StatusCode::NOT_FOUND => Err(MergeError::NotFound),
                StatusCode::CONFLICT => Err(MergeError::Conflict),
                StatusCode::NO_CONTENT => Err(MergeError::AlreadyMerged),
                _ => Err(MergeError::Unknown { status, text }),
            }
        }
        Err(error) => {
            tracing::debug!("Merging `{head}` into `{base_ref}` in `{repo}` failed: {error:?}");
            Err(MergeError::NetworkError(error))
        }
    }
}
