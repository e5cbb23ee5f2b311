use crate::config::{QueueConfig, RetryConfig};
use crate::github::api::GithubAppCredentials;
use crate::github::server::ServerState;
use crate::github::RepoRef;
use crate::tests::TEST_WEBHOOK_SECRET;
use crate::WebhookSecret;

mod app;
mod github;
mod pull_request;
mod webhook;

pub(crate) use app::GITHUB_MOCK_PRIVATE_KEY;
pub use github::GitHubMockServer;
pub use pull_request::{
    comment_json, commit_json, label_json, pull_request_json, pull_request_record,
};
pub use webhook::{create_webhook_request, sign, sign_sha1};

pub const TEST_INSTALLATION_ID: u64 = 1234;

pub fn test_credentials(api_url: &str) -> GithubAppCredentials {
    GithubAppCredentials::new(
        1,
        GITHUB_MOCK_PRIVATE_KEY.as_bytes().to_vec().into(),
        Some(api_url.to_string()),
    )
}

pub fn test_queue() -> QueueConfig {
    QueueConfig {
        name: "merge-queue".to_string(),
        color: "ededed".to_string(),
        repositories: vec![RepoRef {
            name: "service".to_string(),
            branches: vec!["main".to_string()],
        }],
    }
}

pub fn test_server_state(api_url: &str) -> ServerState {
    ServerState::new(
        test_credentials(api_url),
        WebhookSecret::new(TEST_WEBHOOK_SECRET.to_string()),
        (&RetryConfig::default()).into(),
        Some(test_queue()),
    )
}
