//! Brings remote labels and pull requests into the desired state.
//!
//! Every operation that mutates remote state goes through [`with_retry`], reads are
//! attempted only once.
use thiserror::Error;

mod labels;
mod pulls;
mod retry;

pub use labels::{
    add_label, ensure_label, ensure_labels_across_repos, remove_labels_matching,
    remove_labels_matching_pattern, LabelState,
};
pub use pulls::{exclude_by_label, filter_by_label, list_open_pull_requests};
pub use retry::{with_retry, RetryPolicy};

/// A remote operation that did not succeed, even after being retried.
#[derive(Error, Debug)]
#[error("{operation} failed for {target}: {error:#}")]
pub struct ReconcileError {
    pub operation: &'static str,
    /// Repository, pull request or label the operation was applied to.
    pub target: String,
    pub error: anyhow::Error,
}

impl ReconcileError {
    pub fn new(operation: &'static str, target: impl ToString, error: anyhow::Error) -> Self {
        Self {
            operation,
            target: target.to_string(),
            error,
        }
    }
}
