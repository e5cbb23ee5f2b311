use thiserror::Error;

use crate::github::GithubRepoName;
use crate::keeper::RepositoryClient;

/// Permission level of a repository collaborator, as reported by GitHub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionLevel {
    Admin,
    Write,
    Read,
    Triage,
    None,
    Other(String),
}

impl PermissionLevel {
    pub fn can_write(&self) -> bool {
        matches!(self, PermissionLevel::Admin | PermissionLevel::Write)
    }
}

impl From<&str> for PermissionLevel {
    fn from(level: &str) -> Self {
        match level {
            "admin" => PermissionLevel::Admin,
            "write" => PermissionLevel::Write,
            "read" => PermissionLevel::Read,
            "triage" => PermissionLevel::Triage,
            "none" => PermissionLevel::None,
            other => PermissionLevel::Other(other.to_string()),
        }
    }
}

/// The permission level of a user could not be determined.
/// This is different from the user being denied.
#[derive(Error, Debug)]
#[error("Cannot load permission of {username} in {repo}: {error:#}")]
pub struct GateError {
    pub repo: GithubRepoName,
    pub username: String,
    pub error: anyhow::Error,
}

/// Returns true if the user is allowed to push to the repository.
pub async fn has_write_access<Client: RepositoryClient>(
    client: &Client,
    repo: &GithubRepoName,
    username: &str,
) -> Result<bool, GateError> {
    let level = client
        .get_collaborator_permission(repo, username)
        .await
        .map_err(|error| GateError {
            repo: repo.clone(),
            username: username.to_string(),
            error,
        })?;
    let level = PermissionLevel::from(level.as_str());
    tracing::debug!("User {username} has permission {level:?} in {repo}");
    Ok(level.can_write())
}
