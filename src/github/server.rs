use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{any, get};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tracing::Instrument;

use crate::config::QueueConfig;
use crate::github::api::GithubAppCredentials;
use crate::github::webhook::{GitHubWebhook, WebhookSecret};
use crate::keeper::{dispatch, RequestContext, RetryPolicy};
use crate::utils::text::with_delivery;

/// Shared server state for all axum handlers.
/// It is loaded once at startup and never modified afterwards.
pub struct ServerState {
    credentials: GithubAppCredentials,
    webhook_secret: WebhookSecret,
    retry: RetryPolicy,
    queue: Option<Arc<QueueConfig>>,
}

impl ServerState {
    pub fn new(
        credentials: GithubAppCredentials,
        webhook_secret: WebhookSecret,
        retry: RetryPolicy,
        queue: Option<QueueConfig>,
    ) -> Self {
        Self {
            credentials,
            webhook_secret,
            retry,
            queue: queue.map(Arc::new),
        }
    }

    pub fn get_webhook_secret(&self) -> &WebhookSecret {
        &self.webhook_secret
    }
}

pub type ServerStateRef = Arc<ServerState>;

pub fn create_app(state: ServerState) -> Router {
    Router::new()
        // Other methods are rejected by the webhook extractor
        .route("/github", any(github_webhook_handler))
        .route("/health", get(health_handler))
        .layer(ConcurrencyLimitLayer::new(100))
        .with_state(Arc::new(state))
        .fallback(not_found_handler)
}

async fn not_found_handler() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "")
}

/// Axum handler that authenticates as the installation which sent the webhook and
/// processes the event.
pub async fn github_webhook_handler(
    State(state): State<ServerStateRef>,
    GitHubWebhook(event): GitHubWebhook,
) -> impl IntoResponse {
    let span = tracing::info_span!(
        "Webhook",
        delivery = event.delivery_id.as_deref().unwrap_or_default(),
        installation = event.installation_id
    );
    async move {
        let client = match state.credentials.installation_client(event.installation_id) {
            Ok(client) => client,
            Err(error) => {
                tracing::error!("Cannot authenticate as installation: {error:?}");
                let message = format!("cannot authenticate as installation: {error}");
                return (
                    StatusCode::UNAUTHORIZED,
                    with_delivery(&message, event.delivery_id.as_deref()).into_owned(),
                );
            }
        };
        let ctx = RequestContext::new(event, client, state.retry, state.queue.clone());
        let outcome = dispatch(&ctx).await;
        tracing::info!("Responding with {}: {}", outcome.status, outcome.body);
        (outcome.status, outcome.body)
    }
    .instrument(span)
    .await
}
