//! This is the library of the labelkeeper GitHub App.
pub mod config;
pub mod github;
pub mod keeper;
pub mod permissions;
pub mod utils;

pub use config::{AppConfig, QueueConfig, RetryConfig};
pub use github::api::{create_github_client, GithubAppCredentials};
pub use github::server::{create_app, ServerState};
pub use github::WebhookSecret;

#[cfg(test)]
mod tests;
