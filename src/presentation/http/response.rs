// src/presentation/http/response.rs
use crate::domain::errors::ErrorContext;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::panic::Location;
use utoipa::ToSchema;

use super::middleware::request_context::RequestContext;

/// Where a failure was caught and which request it belonged to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorSource {
    pub file: String,
    pub line_number: u32,
    pub function_name: Option<String>,
    pub api_path: Option<String>,
    pub api_method: Option<String>,
}

impl ErrorSource {
    pub fn new(location: &Location<'_>, request: Option<&RequestContext>) -> Self {
        Self {
            file: location.file().to_string(),
            line_number: location.line(),
            function_name: None,
            api_path: request.map(|ctx| ctx.path.clone()),
            api_method: request.map(|ctx| ctx.method.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorEntry {
    pub status: u16,
    pub title: String,
    pub detail: String,
    pub source: Option<ErrorSource>,
    #[schema(value_type = Option<Object>)]
    pub context: Option<ErrorContext>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Meta {
    /// RFC 3339 UTC timestamp of when the response was built.
    pub timestamp: String,
}

/// Body of every error response. `errors` always holds exactly one entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorEnvelope {
    pub errors: Vec<ErrorEntry>,
    pub meta: Meta,
}

pub struct ErrorResponseBuilder {
    entry: ErrorEntry,
    timestamp: Option<DateTime<Utc>>,
}

impl ErrorResponseBuilder {
    pub fn new(status: u16, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            entry: ErrorEntry {
                status,
                title: title.into(),
                detail: detail.into(),
                source: None,
                context: None,
            },
            timestamp: None,
        }
    }

    pub fn source(mut self, source: Option<ErrorSource>) -> Self {
        self.entry.source = source;
        self
    }

    pub fn context(mut self, context: Option<ErrorContext>) -> Self {
        self.entry.context = context;
        self
    }

    /// Pins the envelope timestamp; the current time is used otherwise.
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn build(self) -> ErrorEnvelope {
        let timestamp = self.timestamp.unwrap_or_else(Utc::now);
        ErrorEnvelope {
            errors: vec![self.entry],
            meta: Meta {
                timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
            },
        }
    }
}
