// src/presentation/http/error.rs
use crate::application::error::ApplicationError;
use crate::domain::{constraint::ConstraintErrorParser, errors::DomainError};
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::panic::Location;

use super::middleware::request_context;
use super::response::{ErrorEnvelope, ErrorResponseBuilder, ErrorSource};

const INTERNAL_ERROR_TITLE: &str = "InternalError";
const INTERNAL_ERROR_DETAIL: &str = "Internal Server Error";

/// A failure raised by the HTTP machinery itself (routing, extraction).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    status: StatusCode,
    title: String,
    detail: String,
}

impl TransportError {
    /// Statuses outside 4xx/5xx are reported as 500.
    pub fn new(status: StatusCode, title: impl Into<String>, detail: impl Into<String>) -> Self {
        let status = if status.is_client_error() || status.is_server_error() {
            status
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            title: title.into(),
            detail: detail.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "NotFound", "Not Found")
    }

    pub fn method_not_allowed() -> Self {
        Self::new(
            StatusCode::METHOD_NOT_ALLOWED,
            "MethodNotAllowed",
            "Method Not Allowed",
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<JsonRejection> for TransportError {
    fn from(rejection: JsonRejection) -> Self {
        let title = match &rejection {
            JsonRejection::JsonDataError(_) => "JsonDataError",
            JsonRejection::JsonSyntaxError(_) => "JsonSyntaxError",
            JsonRejection::MissingJsonContentType(_) => "MissingJsonContentType",
            JsonRejection::BytesRejection(_) => "BytesRejection",
            _ => "JsonRejection",
        };
        Self::new(rejection.status(), title, rejection.body_text())
    }
}

impl From<PathRejection> for TransportError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(rejection.status(), "PathRejection", rejection.body_text())
    }
}

impl From<QueryRejection> for TransportError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(rejection.status(), "QueryRejection", rejection.body_text())
    }
}

/// Dispatch categories, in the order the dispatcher checks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    Domain,
    Integrity,
    Transport,
    Database,
    Unhandled,
}

#[derive(Debug)]
pub enum Failure {
    Application(ApplicationError),
    Transport(TransportError),
}

impl Failure {
    pub fn category(&self) -> FailureCategory {
        match self {
            Self::Application(ApplicationError::Domain(_)) => FailureCategory::Domain,
            Self::Application(ApplicationError::Integrity(_)) => FailureCategory::Integrity,
            Self::Transport(_) => FailureCategory::Transport,
            Self::Application(ApplicationError::Database { .. }) => FailureCategory::Database,
            Self::Application(ApplicationError::Unexpected(_)) => FailureCategory::Unhandled,
        }
    }
}

/// Status, title, detail and context of a classified failure, before the
/// source and timestamp are attached.
#[derive(Debug, Clone, PartialEq)]
struct Rendered {
    status: u16,
    title: String,
    detail: String,
    context: Option<crate::domain::errors::ErrorContext>,
}

impl From<DomainError> for Rendered {
    fn from(err: DomainError) -> Self {
        Self {
            status: err.status(),
            title: err.title().to_string(),
            detail: err.detail().to_string(),
            context: err.context().cloned(),
        }
    }
}

type Handler = fn(Failure) -> Rendered;

const HANDLERS: &[(FailureCategory, Handler)] = &[
    (FailureCategory::Domain, render_domain),
    (FailureCategory::Integrity, render_integrity),
    (FailureCategory::Transport, render_transport),
    (FailureCategory::Database, render_database),
    (FailureCategory::Unhandled, render_unhandled),
];

fn render_domain(failure: Failure) -> Rendered {
    match failure {
        Failure::Application(ApplicationError::Domain(err)) => err.into(),
        other => render_unhandled(other),
    }
}

fn render_integrity(failure: Failure) -> Rendered {
    match failure {
        Failure::Application(ApplicationError::Integrity(raw)) => {
            ConstraintErrorParser::global().parse(&raw).into()
        }
        other => render_unhandled(other),
    }
}

fn render_transport(failure: Failure) -> Rendered {
    match failure {
        Failure::Transport(err) => Rendered {
            status: err.status.as_u16(),
            title: err.title,
            detail: err.detail,
            context: None,
        },
        other => render_unhandled(other),
    }
}

fn render_database(failure: Failure) -> Rendered {
    match failure {
        Failure::Application(ApplicationError::Database { kind, message }) => Rendered {
            status: 500,
            title: kind.to_string(),
            detail: after_last_colon(&message).to_string(),
            context: None,
        },
        other => render_unhandled(other),
    }
}

fn render_unhandled(failure: Failure) -> Rendered {
    let detail = match &failure {
        Failure::Application(err) => err.to_string(),
        Failure::Transport(err) => err.detail.clone(),
    };
    Rendered {
        status: 500,
        title: INTERNAL_ERROR_TITLE.to_string(),
        detail: if detail.trim().is_empty() {
            INTERNAL_ERROR_DETAIL.to_string()
        } else {
            detail
        },
        context: None,
    }
}

/// Text after the last `:`, trimmed; the whole message when there is none.
pub fn after_last_colon(message: &str) -> &str {
    match message.rsplit_once(':') {
        Some((_, tail)) if !tail.trim().is_empty() => tail.trim(),
        _ => message.trim(),
    }
}

/// Turns any caught failure into a status and a single-entry envelope.
pub struct ErrorDispatcher;

impl ErrorDispatcher {
    pub fn dispatch(failure: Failure, source: Option<ErrorSource>) -> (StatusCode, ErrorEnvelope) {
        let category = failure.category();
        let handler = HANDLERS
            .iter()
            .find(|(candidate, _)| *candidate == category)
            .map(|(_, handler)| *handler)
            .unwrap_or(render_unhandled);
        let rendered = handler(failure);

        let status =
            StatusCode::from_u16(rendered.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let envelope = ErrorResponseBuilder::new(status.as_u16(), rendered.title, rendered.detail)
            .source(source)
            .context(rendered.context)
            .build();
        (status, envelope)
    }
}

/// A failure on its way out of a handler, tagged with where it was caught.
///
/// Conversions are `#[track_caller]`, so `?` in a handler records the
/// handler's file and line.
#[derive(Debug)]
pub struct HttpError {
    failure: Failure,
    location: &'static Location<'static>,
}

impl HttpError {
    #[track_caller]
    pub fn new(failure: Failure) -> Self {
        Self {
            failure,
            location: Location::caller(),
        }
    }

    pub fn failure(&self) -> &Failure {
        &self.failure
    }

    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }
}

impl From<ApplicationError> for HttpError {
    #[track_caller]
    fn from(err: ApplicationError) -> Self {
        Self::new(Failure::Application(err))
    }
}

impl From<DomainError> for HttpError {
    #[track_caller]
    fn from(err: DomainError) -> Self {
        Self::new(Failure::Application(ApplicationError::Domain(err)))
    }
}

impl From<sqlx::Error> for HttpError {
    #[track_caller]
    fn from(err: sqlx::Error) -> Self {
        Self::new(Failure::Application(ApplicationError::from(err)))
    }
}

impl From<anyhow::Error> for HttpError {
    #[track_caller]
    fn from(err: anyhow::Error) -> Self {
        Self::new(Failure::Application(ApplicationError::Unexpected(err)))
    }
}

impl From<TransportError> for HttpError {
    #[track_caller]
    fn from(err: TransportError) -> Self {
        Self::new(Failure::Transport(err))
    }
}

impl From<JsonRejection> for HttpError {
    #[track_caller]
    fn from(rejection: JsonRejection) -> Self {
        Self::new(Failure::Transport(rejection.into()))
    }
}

impl From<PathRejection> for HttpError {
    #[track_caller]
    fn from(rejection: PathRejection) -> Self {
        Self::new(Failure::Transport(rejection.into()))
    }
}

impl From<QueryRejection> for HttpError {
    #[track_caller]
    fn from(rejection: QueryRejection) -> Self {
        Self::new(Failure::Transport(rejection.into()))
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let request = request_context::current();
        let source = ErrorSource::new(self.location, request.as_ref());
        let category = self.failure.category();
        let (status, envelope) = ErrorDispatcher::dispatch(self.failure, Some(source));

        if let Some(entry) = envelope.errors.first() {
            if status.is_server_error() {
                tracing::error!(
                    status = status.as_u16(),
                    title = %entry.title,
                    detail = %entry.detail,
                    ?category,
                    file = self.location.file(),
                    line = self.location.line(),
                    "request failed"
                );
            } else {
                tracing::warn!(
                    status = status.as_u16(),
                    title = %entry.title,
                    ?category,
                    file = self.location.file(),
                    line = self.location.line(),
                    "request rejected"
                );
            }
        }

        (status, Json(envelope)).into_response()
    }
}

pub type HttpResult<T> = Result<T, HttpError>;
