use crate::github::{GithubRepoName, ParseError, PullRequestNumber};

/// An authenticated webhook delivery, reduced to the fields the app acts upon.
///
/// Only the event type and the installation are guaranteed to be present. Other fields are
/// resolved lazily by the handlers that need them.
#[derive(Debug, Clone)]
pub struct WebhookEvent {
    pub event_type: String,
    pub action: Option<String>,
    pub installation_id: u64,
    pub repository_owner: Option<String>,
    pub repository_name: Option<String>,
    /// Login of the user that triggered the event.
    pub sender: Option<String>,
    pub issue: Option<IssueRef>,
    pub comment_body: Option<String>,
    pub delivery_id: Option<String>,
    /// Raw value of the signature header, empty if it was missing.
    pub signature: String,
}

/// The issue (or pull request) an event refers to.
#[derive(Debug, Clone)]
pub struct IssueRef {
    pub number: PullRequestNumber,
    pub is_pull_request: bool,
}

impl WebhookEvent {
    pub fn repository(&self) -> Result<GithubRepoName, ParseError> {
        let name = self
            .repository_name
            .as_deref()
            .ok_or(ParseError::MissingField("repository.name"))?;
        let owner = self
            .repository_owner
            .as_deref()
            .ok_or(ParseError::MissingField("repository.owner"))?;
        Ok(GithubRepoName::new(owner, name))
    }

    pub fn sender(&self) -> Result<&str, ParseError> {
        self.sender
            .as_deref()
            .ok_or(ParseError::MissingField("sender.login"))
    }

    pub fn issue(&self) -> Result<&IssueRef, ParseError> {
        self.issue.as_ref().ok_or(ParseError::MissingField("issue"))
    }

    /// The comment text without surrounding whitespace.
    pub fn comment_text(&self) -> &str {
        self.comment_body.as_deref().unwrap_or_default().trim()
    }
}
