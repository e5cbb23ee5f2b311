use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use secrecy::{ExposeSecret, SecretString, SecretVec};
use url::Url;

use crate::github::{Label, RepoRef, WebhookSecret};

/// Configuration of the app, loaded once at startup from a TOML file.
#[derive(serde::Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub github: GithubConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    pub queue: Option<QueueConfig>,
}

#[derive(serde::Deserialize, Debug)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct GithubConfig {
    /// Identifier of the GitHub App.
    pub app_id: u64,
    /// PEM encoded private key of the GitHub App.
    pub private_key: Option<SecretString>,
    /// Path to a PEM file, used when `private-key` is not given inline.
    pub private_key_path: Option<PathBuf>,
    /// Secret shared with GitHub, used to sign webhook deliveries.
    pub webhook_secret: SecretString,
    /// Base URL of the GitHub REST API.
    pub api_url: Option<Url>,
}

/// How often remote mutations are retried.
#[derive(serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct RetryConfig {
    #[serde(default = "default_retries")]
    pub retries: u32,
    pub attempt_timeout_secs: Option<u64>,
}

fn default_retries() -> u32 {
    1
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retries: default_retries(),
            attempt_timeout_secs: None,
        }
    }
}

impl RetryConfig {
    pub fn attempt_timeout(&self) -> Option<Duration> {
        self.attempt_timeout_secs.map(Duration::from_secs)
    }
}

/// Describes the label queue that pull requests can be put into.
#[derive(serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct QueueConfig {
    pub name: String,
    #[serde(default = "default_label_color")]
    pub color: String,
    #[serde(default)]
    pub repositories: Vec<RepoRef>,
}

fn default_label_color() -> String {
    "ededed".to_string()
}

impl QueueConfig {
    /// Marks pull requests that are waiting in the queue.
    pub fn queued_label(&self) -> Label {
        Label::queue(&self.name, "queued", &self.color)
    }

    /// Marks pull requests that should be skipped by the queue.
    pub fn exclude_label(&self) -> Label {
        Label::queue(&self.name, "exclude", &self.color)
    }

    pub fn labels(&self) -> Vec<Label> {
        vec![self.queued_label(), self.exclude_label()]
    }

    /// Regular expression matching every label that belongs to this queue,
    /// including the exclusion marker.
    pub fn label_pattern(&self) -> String {
        format!("^{}: ", regex::escape(&self.name))
    }
}

impl AppConfig {
    /// Loads the configuration from the given path.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read configuration file {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Cannot parse configuration file {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        if config.github.private_key.is_none() && config.github.private_key_path.is_none() {
            return Err(anyhow::anyhow!(
                "Either `private-key` or `private-key-path` has to be configured"
            ));
        }
        Ok(config)
    }

    /// Returns the PEM bytes of the GitHub App private key.
    pub fn private_key(&self) -> anyhow::Result<SecretVec<u8>> {
        if let Some(key) = &self.github.private_key {
            return Ok(key.expose_secret().as_bytes().to_vec().into());
        }
        match &self.github.private_key_path {
            Some(path) => {
                let key = std::fs::read(path)
                    .with_context(|| format!("Cannot read private key {}", path.display()))?;
                Ok(key.into())
            }
            None => Err(anyhow::anyhow!("GitHub App private key is not configured")),
        }
    }

    pub fn webhook_secret(&self) -> WebhookSecret {
        WebhookSecret::new(self.github.webhook_secret.expose_secret().to_string())
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn parse_minimal() {
        let config = AppConfig::parse(
            r#"
[github]
app-id = 42
private-key = "key"
webhook-secret = "secret"
"#,
        )
        .unwrap();
        assert_eq!(config.github.app_id, 42);
        assert_eq!(config.github.webhook_secret.expose_secret(), "secret");
        assert_eq!(config.retry, RetryConfig::default());
        assert_eq!(config.retry.retries, 1);
        assert!(config.queue.is_none());
        assert_eq!(config.private_key().unwrap().expose_secret(), b"key");
    }

    #[test]
    fn parse_full() {
        let config = AppConfig::parse(
            r#"
[github]
app-id = 42
private-key = "key"
webhook-secret = "secret"
api-url = "https://github.example.com/api/v3/"

[retry]
retries = 2
attempt-timeout-secs = 5

[queue]
name = "merge-queue"
color = "0e8a16"

[[queue.repositories]]
name = "service"
branches = ["main", "release"]
"#,
        )
        .unwrap();
        assert_eq!(config.retry.retries, 2);
        assert_eq!(config.retry.attempt_timeout(), Some(Duration::from_secs(5)));
        let queue = config.queue.unwrap();
        assert_eq!(queue.queued_label().name, "merge-queue: queued");
        assert_eq!(queue.exclude_label().color, "0e8a16");
        assert_eq!(
            queue.repositories,
            vec![RepoRef {
                name: "service".to_string(),
                branches: vec!["main".to_string(), "release".to_string()],
            }]
        );
    }

    #[test]
    fn reject_unknown_keys() {
        assert!(AppConfig::parse(
            r#"
[github]
app-id = 42
private-key = "key"
webhook-secret = "secret"
aws-region = "eu-west-1"
"#,
        )
        .is_err());
    }

    #[test]
    fn require_private_key() {
        assert!(AppConfig::parse(
            r#"
[github]
app-id = 42
webhook-secret = "secret"
"#,
        )
        .is_err());
    }

    #[test]
    fn queue_label_pattern_escapes_name() {
        let queue = QueueConfig {
            name: "queue.v2".to_string(),
            color: default_label_color(),
            repositories: vec![],
        };
        assert_eq!(queue.label_pattern(), r"^queue\.v2: ");
    }
}
