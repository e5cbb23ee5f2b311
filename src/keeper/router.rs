//! Dispatches webhook events to handlers based on their event type and action.
use axum::http::StatusCode;
use thiserror::Error;
use tracing::Instrument;

use crate::github::ParseError;
use crate::keeper::handlers::{handle_installation_created, handle_issue_comment};
use crate::keeper::reconcile::ReconcileError;
use crate::keeper::{RepositoryClient, RequestContext};
use crate::permissions::GateError;
use crate::utils::logging::LogError;
use crate::utils::text::with_delivery;

/// Final result of processing a webhook event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteOutcome {
    pub status: StatusCode,
    /// Short human-readable diagnostic.
    pub body: String,
}

impl RouteOutcome {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.into(),
        }
    }
}

/// Failures that handlers propagate to the router, which turns them into a response.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Gate(#[from] GateError),
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

impl HandlerError {
    fn status(&self) -> StatusCode {
        match self {
            HandlerError::Parse(_) => StatusCode::BAD_REQUEST,
            HandlerError::Gate(_) | HandlerError::Reconcile(_) => StatusCode::FAILED_DEPENDENCY,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Matcher {
    Exact(&'static str),
    Any,
}

impl Matcher {
    fn matches(&self, value: Option<&str>) -> bool {
        match self {
            Matcher::Exact(expected) => value == Some(*expected),
            Matcher::Any => true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handler {
    IssueCommentCreated,
    InstallationCreated,
    /// No handler exists for the event.
    Unhandled,
}

struct Route {
    event: Matcher,
    action: Matcher,
    handler: Handler,
}

/// Routes are tried in declaration order. When the event type of a route matches but its
/// action does not, the next route is tried.
const ROUTES: &[Route] = &[
    Route {
        event: Matcher::Exact("issue_comment"),
        action: Matcher::Exact("created"),
        handler: Handler::IssueCommentCreated,
    },
    Route {
        event: Matcher::Exact("installation"),
        action: Matcher::Exact("created"),
        handler: Handler::InstallationCreated,
    },
    // Any event type with any action
    Route {
        event: Matcher::Any,
        action: Matcher::Any,
        handler: Handler::Unhandled,
    },
];

pub fn resolve(event_type: &str, action: Option<&str>) -> Handler {
    for route in ROUTES {
        if !route.event.matches(Some(event_type)) {
            continue;
        }
        if route.action.matches(action) {
            return route.handler;
        }
        tracing::trace!("{event_type} matched, but action {action:?} did not, trying next route");
    }
    Handler::Unhandled
}

/// Processes a single webhook event and computes the response for it.
/// Errors are converted into status codes here and never leave the router.
pub async fn dispatch<Client: RepositoryClient>(ctx: &RequestContext<Client>) -> RouteOutcome {
    let event = &ctx.event;
    let action = event.action.as_deref();
    let handler = resolve(&event.event_type, action);
    let span = tracing::info_span!(
        "Event",
        event = event.event_type,
        action = action.unwrap_or_default(),
        handler = ?handler
    );

    let result = async {
        match handler {
            Handler::IssueCommentCreated => handle_issue_comment(ctx).await,
            Handler::InstallationCreated => Ok(handle_installation_created(ctx)),
            Handler::Unhandled => Ok(unhandled(&event.event_type, action)),
        }
    }
    .instrument(span.clone())
    .await;

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(error) => {
            let status = error.status();
            let body = error.to_string();
            span.log_error(error);
            RouteOutcome { status, body }
        }
    };
    if outcome.status.is_success() {
        outcome
    } else {
        RouteOutcome {
            body: with_delivery(&outcome.body, event.delivery_id.as_deref()).into_owned(),
            ..outcome
        }
    }
}

fn unhandled(event_type: &str, action: Option<&str>) -> RouteOutcome {
    let body = format!(
        "cannot find handler for event type: {event_type} and/or action type: {}",
        action.unwrap_or_default()
    );
    tracing::warn!("{body}");
    RouteOutcome {
        status: StatusCode::NOT_FOUND,
        body,
    }
}
