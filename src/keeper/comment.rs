use itertools::Itertools;

use crate::github::{Label, PullRequestRecord};
use crate::utils::text::pluralize;

/// A comment that can be posted to an issue or pull request.
pub struct Comment {
    text: String,
}

impl Comment {
    pub fn new(text: String) -> Self {
        Self { text }
    }

    pub fn render(&self) -> String {
        self.text.clone()
    }
}

pub fn run_all_tests_comment(sender: &str) -> Comment {
    Comment::new(format!(":test_tube: @{sender} requested a run of all tests."))
}

pub fn queue_not_configured_comment() -> Comment {
    Comment::new(":warning: No label queue is configured for this app.".to_string())
}

pub fn not_a_pull_request_comment() -> Comment {
    Comment::new(":warning: Only pull requests can be queued.".to_string())
}

pub fn queued_comment(label: &Label) -> Comment {
    Comment::new(format!(":clock1: Pull request queued with label `{label}`."))
}

pub fn already_queued_comment(label: &Label) -> Comment {
    Comment::new(format!(
        ":information_source: Pull request is already queued with label `{label}`."
    ))
}

pub fn excluded_comment(label: &Label) -> Comment {
    Comment::new(format!(
        ":no_entry_sign: Pull request is excluded from the queue by label `{label}`."
    ))
}

pub fn unqueued_comment(removed: &[Label]) -> Comment {
    if removed.is_empty() {
        return Comment::new(":information_source: Pull request was not queued.".to_string());
    }
    let labels = removed
        .iter()
        .map(|label| format!("`{label}`"))
        .join(", ");
    Comment::new(format!(
        ":wastebasket: Removed {} {labels}.",
        pluralize("label", removed.len())
    ))
}

pub fn queue_status_comment(queue: &str, pulls: &[PullRequestRecord]) -> Comment {
    if pulls.is_empty() {
        return Comment::new(format!("Queue `{queue}` is empty."));
    }
    let entries = pulls
        .iter()
        .enumerate()
        .map(|(position, pr)| format!("{}. {pr} {}", position + 1, pr.title))
        .join("\n");
    Comment::new(format!(
        "Queue `{queue}` contains {} {}:\n{entries}",
        pulls.len(),
        pluralize("pull request", pulls.len())
    ))
}

pub fn labels_synchronized_comment(repositories: usize, labels: &[Label]) -> Comment {
    let labels = labels
        .iter()
        .map(|label| format!("`{label}`"))
        .join(", ");
    let noun = if repositories == 1 {
        "repository"
    } else {
        "repositories"
    };
    Comment::new(format!(
        ":label: Synchronized {labels} in {repositories} {noun}."
    ))
}
