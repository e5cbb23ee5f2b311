use octocrab::models::{AppId, InstallationId};
use octocrab::service::middleware::retry::RetryConfig;
use octocrab::Octocrab;
use secrecy::{ExposeSecret, SecretVec};

use crate::github::CredentialError;

pub mod client;
pub(crate) mod operations;

pub use client::InstallationClient;

/// Everything needed to act on behalf of the GitHub App.
///
/// The private key is kept around so that a fresh installation client can be derived for
/// every webhook delivery. Clients are never shared between deliveries.
pub struct GithubAppCredentials {
    app_id: AppId,
    private_key: SecretVec<u8>,
    api_url: Option<String>,
}

impl GithubAppCredentials {
    pub fn new(app_id: u64, private_key: SecretVec<u8>, api_url: Option<String>) -> Self {
        Self {
            app_id: AppId(app_id),
            private_key,
            api_url,
        }
    }

    /// Creates a client for the given installation. Every call made through it is
    /// authenticated with an installation access token, which octocrab requests and
    /// refreshes on demand.
    pub fn installation_client(
        &self,
        installation_id: u64,
    ) -> Result<InstallationClient, CredentialError> {
        let app_client =
            create_github_client(self.app_id, self.api_url.as_deref(), &self.private_key)?;
        let client = app_client.installation(InstallationId(installation_id));
        tracing::debug!("Created client for installation {installation_id}");
        Ok(InstallationClient::new(client))
    }
}

/// Creates a client authenticated as the GitHub App itself.
///
/// Transport level retries are disabled. Remote mutations are retried by the reconciler.
pub fn create_github_client(
    app_id: AppId,
    base_url: Option<&str>,
    private_key: &SecretVec<u8>,
) -> Result<Octocrab, CredentialError> {
    let key = jsonwebtoken::EncodingKey::from_rsa_pem(private_key.expose_secret().as_ref())?;

    let mut builder = Octocrab::builder();
    builder.add_retry_config(RetryConfig::None);
    if let Some(base_url) = base_url {
        builder = builder.base_uri(base_url)?;
    }
    Ok(builder.app(app_id, key).build()?)
}
