use std::borrow::Cow;
use std::collections::HashMap;

use axum::async_trait;
use axum::extract::{FromRequest, Request};
use axum::http::{HeaderMap, Method, StatusCode};
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::de::IgnoredAny;
use sha1::Sha1;
use sha2::Sha256;

use crate::github::server::ServerStateRef;
use crate::github::{AuthError, ParseError, PullRequestNumber};
use crate::keeper::event::{IssueRef, WebhookEvent};
use crate::utils::text::with_delivery;

pub const SIGNATURE_256_HEADER: &str = "X-Hub-Signature-256";
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature";
pub const EVENT_HEADER: &str = "X-GitHub-Event";
pub const DELIVERY_HEADER: &str = "X-GitHub-Delivery";
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";

/// GitHub caps webhook payloads at 25 MB.
const MAX_WEBHOOK_SIZE: usize = 25 * 1024 * 1024;

/// Something that headers of an inbound request can be looked up in.
pub trait HeaderSource {
    /// Returns the value of the header with exactly this name.
    fn header(&self, name: &str) -> Option<&str>;
}

impl HeaderSource for HeaderMap {
    fn header(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|value| value.to_str().ok())
    }
}

/// Raw header maps handed over by API gateways keep the case chosen by the proxy.
impl HeaderSource for HashMap<String, String> {
    fn header(&self, name: &str) -> Option<&str> {
        self.get(name).map(|value| value.as_str())
    }
}

/// Looks up a header by its canonical name first, then by its lowercase form.
pub fn header_value<'a, H: HeaderSource + ?Sized>(
    headers: &'a H,
    canonical: &str,
) -> Option<&'a str> {
    headers
        .header(canonical)
        .filter(|value| !value.is_empty())
        .or_else(|| headers.header(&canonical.to_ascii_lowercase()))
        .filter(|value| !value.is_empty())
}

/// Returns the signature header, preferring the SHA-256 variant over the legacy SHA-1 one.
pub fn signature_header<H: HeaderSource + ?Sized>(headers: &H) -> Option<&str> {
    header_value(headers, SIGNATURE_256_HEADER)
        .or_else(|| header_value(headers, SIGNATURE_HEADER))
}

/// Verifies that `body` was signed by GitHub with the passed `secret`.
///
/// The signature header has the form `<algorithm>=<hex digest>`, where the algorithm is
/// either `sha256` or `sha1`. The MAC is always computed over the raw request body.
/// On success, the JSON payload is returned; for form-encoded deliveries it is taken
/// from the `payload` field.
pub fn verify_signature<'a>(
    body: &'a [u8],
    content_type: Option<&str>,
    signature: Option<&str>,
    secret: &WebhookSecret,
) -> Result<Cow<'a, [u8]>, AuthError> {
    let signature = signature.ok_or(AuthError::MissingSignature)?;
    let (algorithm, digest) = signature
        .split_once('=')
        .ok_or(AuthError::MalformedSignature)?;
    let digest = hex::decode(digest).map_err(|_| AuthError::MalformedSignature)?;

    let key = secret.expose().as_bytes();
    let valid = match algorithm {
        "sha256" => verify_mac::<Hmac<Sha256>>(key, body, &digest),
        "sha1" => verify_mac::<Hmac<Sha1>>(key, body, &digest),
        other => return Err(AuthError::UnsupportedAlgorithm(other.to_string())),
    };
    if !valid {
        return Err(AuthError::Unauthorized);
    }
    Ok(form_payload(body, content_type))
}

fn verify_mac<M: Mac + KeyInit>(key: &[u8], body: &[u8], digest: &[u8]) -> bool {
    let Ok(mut mac) = <M as KeyInit>::new_from_slice(key) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(digest).is_ok()
}

fn form_payload<'a>(body: &'a [u8], content_type: Option<&str>) -> Cow<'a, [u8]> {
    let is_form = content_type.is_some_and(|content_type| {
        content_type.starts_with("application/x-www-form-urlencoded")
    });
    if !is_form {
        return Cow::Borrowed(body);
    }
    url::form_urlencoded::parse(body)
        .find(|(key, _)| key == "payload")
        .map(|(_, value)| Cow::Owned(value.into_owned().into_bytes()))
        .unwrap_or(Cow::Borrowed(body))
}

#[derive(serde::Deserialize, Debug)]
struct WebhookPayload {
    action: Option<String>,
    installation: Option<InstallationPayload>,
    repository: Option<RepositoryPayload>,
    sender: Option<UserPayload>,
    issue: Option<IssuePayload>,
    comment: Option<CommentPayload>,
}

#[derive(serde::Deserialize, Debug)]
struct InstallationPayload {
    id: u64,
}

#[derive(serde::Deserialize, Debug)]
struct RepositoryPayload {
    name: String,
    owner: Option<UserPayload>,
}

#[derive(serde::Deserialize, Debug)]
struct UserPayload {
    login: String,
}

#[derive(serde::Deserialize, Debug)]
struct IssuePayload {
    number: u64,
    pull_request: Option<IgnoredAny>,
}

#[derive(serde::Deserialize, Debug)]
struct CommentPayload {
    body: Option<String>,
}

/// Decodes an authenticated payload and overlays the event type and delivery id
/// taken from the request headers.
pub fn parse_event<H: HeaderSource + ?Sized>(
    payload: &[u8],
    headers: &H,
) -> Result<WebhookEvent, ParseError> {
    let event_type =
        header_value(headers, EVENT_HEADER).ok_or(ParseError::MissingHeader(EVENT_HEADER))?;
    let payload: WebhookPayload = serde_json::from_slice(payload)?;
    let installation = payload
        .installation
        .ok_or(ParseError::MissingField("installation.id"))?;

    let (repository_owner, repository_name) = match payload.repository {
        Some(repository) => (
            repository.owner.map(|owner| owner.login),
            Some(repository.name),
        ),
        None => (None, None),
    };

    Ok(WebhookEvent {
        event_type: event_type.to_string(),
        action: payload.action,
        installation_id: installation.id,
        repository_owner,
        repository_name,
        sender: payload.sender.map(|sender| sender.login),
        issue: payload.issue.map(|issue| IssueRef {
            number: PullRequestNumber(issue.number),
            is_pull_request: issue.pull_request.is_some(),
        }),
        comment_body: payload.comment.and_then(|comment| comment.body),
        delivery_id: header_value(headers, DELIVERY_HEADER).map(|id| id.to_string()),
        signature: signature_header(headers).unwrap_or_default().to_string(),
    })
}

/// axum extractor for authenticated GitHub webhook events.
#[derive(Debug)]
pub struct GitHubWebhook(pub WebhookEvent);

/// Extracts a webhook event from a HTTP request.
///
/// Requests that are not `POST`ed are rejected before their body is even read.
#[async_trait]
impl FromRequest<ServerStateRef> for GitHubWebhook {
    type Rejection = (StatusCode, String);

    async fn from_request(
        request: Request,
        state: &ServerStateRef,
    ) -> Result<Self, Self::Rejection> {
        let (parts, body) = request.into_parts();
        let delivery = header_value(&parts.headers, DELIVERY_HEADER).map(|id| id.to_string());
        let reject = |status: StatusCode, message: String| {
            (status, with_delivery(&message, delivery.as_deref()).into_owned())
        };

        if parts.method != Method::POST {
            let message = format!("method not allowed: {}", parts.method);
            tracing::error!("{message}");
            return Err(reject(StatusCode::METHOD_NOT_ALLOWED, message));
        }

        // Eagerly load body
        let body = axum::body::to_bytes(body, MAX_WEBHOOK_SIZE)
            .await
            .map_err(|error| {
                tracing::error!("Reading webhook body failed: {error:?}");
                reject(StatusCode::BAD_REQUEST, "cannot read webhook body".to_string())
            })?;

        // The signature has to be checked against the raw bytes, before any decoding
        let payload = verify_signature(
            &body,
            header_value(&parts.headers, CONTENT_TYPE_HEADER),
            signature_header(&parts.headers),
            state.get_webhook_secret(),
        )
        .map_err(|error| {
            tracing::error!("Webhook request failed, could not authenticate webhook: {error}");
            reject(StatusCode::UNAUTHORIZED, format!("unauthorized: {error}"))
        })?;

        match parse_event(&payload, &parts.headers) {
            Ok(event) => {
                tracing::info!("Webhook event loaded ({:?})", event.delivery_id);
                Ok(GitHubWebhook(event))
            }
            Err(error) => {
                tracing::error!("Cannot parse webhook event: {error}");
                Err(reject(StatusCode::BAD_REQUEST, error.to_string()))
            }
        }
    }
}

/// Wrapper for a secret which is zeroed on drop and can be exposed only through the [`WebhookSecret::expose`] method.
pub struct WebhookSecret(SecretString);

impl WebhookSecret {
    pub fn new(secret: String) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret().as_str()
    }
}
