use thiserror::Error;

/// The webhook request could not be authenticated.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    #[error("signature header not found")]
    MissingSignature,
    #[error("malformed signature header")]
    MalformedSignature,
    #[error("unsupported signature algorithm `{0}`")]
    UnsupportedAlgorithm(String),
    #[error("signature does not match payload")]
    Unauthorized,
}

/// The authenticated payload could not be turned into a webhook event.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed webhook payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0} header not found")]
    MissingHeader(&'static str),
    #[error("webhook payload is missing `{0}`")]
    MissingField(&'static str),
}

/// An installation-scoped API client could not be derived.
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("could not decode GitHub App private key: {0}")]
    InvalidKey(#[from] jsonwebtoken::errors::Error),
    #[error("could not build GitHub client: {0}")]
    Client(#[from] octocrab::Error),
}
