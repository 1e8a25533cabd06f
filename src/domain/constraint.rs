// src/domain/constraint.rs
//! Best-effort classification of integrity failures from driver error text.
//!
//! The text is expected to look like
//! `<class 'pkg.errors.UniqueViolationError'>: duplicate key ...\nDETAIL:  Key (...)`.
//! Any part may be missing; parsing never fails and degrades to a generic
//! integrity violation.
use crate::domain::constraint_messages::ConstraintMessages;
use crate::domain::errors::{DomainError, ErrorContext};
use once_cell::sync::Lazy;
use regex::Regex;

pub const UNIQUE_VIOLATION_CLASS: &str = "UniqueViolationError";
pub const NOT_NULL_VIOLATION_CLASS: &str = "NotNullViolationError";

static CLASS_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<class '.+?\.(\w+)'>").expect("valid class name regex"));
static MESSAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r">: (.+?)\nDETAIL:").expect("valid message regex"));
static UNIQUE_CONSTRAINT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"unique constraint "(.*?)""#).expect("valid constraint regex"));
static NOT_NULL_COLUMN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([^"]+)" of relation"#).expect("valid column regex"));
static NOT_NULL_RELATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"of relation "([^"]+)""#).expect("valid relation regex"));

/// The two fragments pulled out of a driver error string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrityDetails {
    pub class_name: Option<String>,
    pub message: Option<String>,
}

impl IntegrityDetails {
    pub fn extract(raw: &str) -> Self {
        let capture = |re: &Regex| {
            re.captures(raw)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        };

        Self {
            class_name: capture(&CLASS_NAME_RE),
            message: capture(&MESSAGE_RE),
        }
    }
}

pub struct ConstraintErrorParser<'a> {
    messages: &'a ConstraintMessages,
}

impl ConstraintErrorParser<'static> {
    /// Parser backed by the process-wide constraint message table.
    pub fn global() -> Self {
        Self::new(ConstraintMessages::global())
    }
}

impl<'a> ConstraintErrorParser<'a> {
    pub fn new(messages: &'a ConstraintMessages) -> Self {
        Self { messages }
    }

    /// Classifies an integrity failure raised by an insert or update.
    pub fn parse(&self, raw: &str) -> DomainError {
        let IntegrityDetails {
            class_name,
            message,
        } = IntegrityDetails::extract(raw);

        match (class_name.as_deref(), message) {
            (Some(UNIQUE_VIOLATION_CLASS), Some(message)) => {
                self.unique_violation(UNIQUE_VIOLATION_CLASS, message)
            }
            (Some(NOT_NULL_VIOLATION_CLASS), Some(message)) => not_null_violation(message),
            (class_name, message) => generic_violation(class_name, message),
        }
    }

    fn unique_violation(&self, class_name: &str, message: String) -> DomainError {
        let mut context = ErrorContext::new();
        context.insert("exception_class".into(), class_name.into());
        context.insert("exception_message".into(), message.as_str().into());

        let constraint = first_capture(&UNIQUE_CONSTRAINT_RE, &message).map(str::to_string);
        let detail = match constraint {
            Some(constraint) => self
                .messages
                .get(&constraint)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Unique constraint violated: {constraint}")),
            None => message,
        };

        DomainError::unique_violation()
            .with_detail(detail)
            .with_context(context)
    }
}

/// Builds the error raised when a delete is rejected by the store, typically
/// because dependent rows still reference the target.
pub fn delete_failed(raw: &str) -> DomainError {
    let IntegrityDetails {
        class_name,
        message,
    } = IntegrityDetails::extract(raw);

    let mut context = ErrorContext::new();
    if let Some(class_name) = class_name {
        context.insert("class_name".into(), class_name.into());
    }
    if let Some(message) = message {
        context.insert("exception_message".into(), message.into());
    }

    DomainError::delete_failed().with_context(context)
}

fn not_null_violation(message: String) -> DomainError {
    let column = first_capture(&NOT_NULL_COLUMN_RE, &message);
    let relation = first_capture(&NOT_NULL_RELATION_RE, &message);

    let detail = match (relation, column) {
        (Some(relation), Some(column)) => format!("{relation}.{column} cannot be null"),
        _ => message.clone(),
    };
    DomainError::not_null_violation().with_detail(detail)
}

fn generic_violation(class_name: Option<&str>, message: Option<String>) -> DomainError {
    let mut context = ErrorContext::new();
    if let Some(class_name) = class_name {
        context.insert("exception_class".into(), class_name.into());
    }
    if let Some(message) = &message {
        context.insert("exception_message".into(), message.as_str().into());
    }

    let mut err = DomainError::integrity_violation(class_name);
    if let Some(message) = message {
        err = err.with_detail(message);
    }
    if context.is_empty() {
        err
    } else {
        err.with_context(context)
    }
}

fn first_capture<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
