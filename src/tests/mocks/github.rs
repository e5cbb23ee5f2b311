use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::app::setup_app_installation_token_mock;
use super::{comment_json, test_credentials, TEST_INSTALLATION_ID};
use crate::github::api::InstallationClient;

/// Mocked GitHub REST API, already prepared to hand out installation tokens.
pub struct GitHubMockServer {
    server: MockServer,
}

impl GitHubMockServer {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        setup_app_installation_token_mock(&server).await;
        Self { server }
    }

    pub fn server(&self) -> &MockServer {
        &self.server
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn client(&self) -> InstallationClient {
        test_credentials(&self.uri())
            .installation_client(TEST_INSTALLATION_ID)
            .unwrap()
    }

    /// Reports `level` as the permission of `username` in acme/service.
    pub async fn mock_permission(&self, username: &str, level: &str) {
        Mock::given(method("GET"))
            .and(path(format!(
                "/repos/acme/service/collaborators/{username}/permission"
            )))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "permission": level,
                "user": { "login": username },
            })))
            .mount(&self.server)
            .await;
    }

    /// Accepts comments posted to acme/service#`issue`, `expected` times.
    pub async fn expect_comments(&self, issue: u64, expected: u64) {
        Mock::given(method("POST"))
            .and(path(format!("/repos/acme/service/issues/{issue}/comments")))
            .respond_with(ResponseTemplate::new(201).set_body_json(comment_json(issue, "")))
            .expect(expected)
            .mount(&self.server)
            .await;
    }

    /// Number of requests received so far with the given method and path.
    pub async fn request_count(&self, method: &str, path: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.method.as_str() == method && request.url.path() == path)
            .count()
    }

    /// Returns all comment bodies that were posted so far.
    pub async fn posted_comments(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|request| {
                request.method.as_str() == "POST"
                    && request.url.path().ends_with("/comments")
            })
            .map(|request| {
                let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
                body["body"].as_str().unwrap_or_default().to_string()
            })
            .collect()
    }
}
