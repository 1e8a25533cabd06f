// src/domain/errors.rs
use serde_json::{Map, Value};
use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// Structured debugging payload attached to an error entry.
pub type ErrorContext = Map<String, Value>;

/// Label substituted into titles and details when the caller names no entity.
pub const DEFAULT_LABEL: &str = "Entity";

/// Every failure kind the scaffold can raise deliberately.
///
/// The first block mirrors the standard HTTP client/server error statuses; the
/// trailing four only ever come out of the constraint parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    PaymentRequired,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    NotAcceptable,
    ProxyAuthRequired,
    RequestTimeout,
    Conflict,
    Gone,
    LengthRequired,
    PreconditionFailed,
    PayloadTooLarge,
    UriTooLong,
    UnsupportedMediaType,
    RangeNotSatisfiable,
    ExpectationFailed,
    UnprocessableEntity,
    Locked,
    FailedDependency,
    UpgradeRequired,
    TooManyRequests,
    UnavailableForLegalReasons,
    InternalServerError,
    NotImplemented,
    BadGateway,
    ServiceUnavailable,
    GatewayTimeout,
    HttpVersionNotSupported,
    UniqueViolation,
    NotNullViolation,
    IntegrityViolation,
    DeleteFailed,
}

impl ErrorKind {
    pub const fn status(self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::PaymentRequired => 402,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::MethodNotAllowed => 405,
            Self::NotAcceptable => 406,
            Self::ProxyAuthRequired => 407,
            Self::RequestTimeout => 408,
            Self::Conflict => 409,
            Self::Gone => 410,
            Self::LengthRequired => 411,
            Self::PreconditionFailed => 412,
            Self::PayloadTooLarge => 413,
            Self::UriTooLong => 414,
            Self::UnsupportedMediaType => 415,
            Self::RangeNotSatisfiable => 416,
            Self::ExpectationFailed => 417,
            Self::UnprocessableEntity => 422,
            Self::Locked => 423,
            Self::FailedDependency => 424,
            Self::UpgradeRequired => 426,
            Self::TooManyRequests => 429,
            Self::UnavailableForLegalReasons => 451,
            Self::InternalServerError => 500,
            Self::NotImplemented => 501,
            Self::BadGateway => 502,
            Self::ServiceUnavailable => 503,
            Self::GatewayTimeout => 504,
            Self::HttpVersionNotSupported => 505,
            Self::UniqueViolation => 409,
            Self::NotNullViolation | Self::IntegrityViolation | Self::DeleteFailed => 400,
        }
    }

    /// Title for this kind; `label` is ignored by kinds with a fixed title.
    pub fn title(self, label: &str) -> String {
        match self {
            Self::BadRequest => format!("Invalid{label}RequestError"),
            Self::Unauthorized => format!("{label}UnauthorizedError"),
            Self::PaymentRequired => "PaymentRequiredError".into(),
            Self::Forbidden => format!("{label}AccessDeniedError"),
            Self::NotFound => format!("{label}NotFoundError"),
            Self::MethodNotAllowed => "MethodNotAllowedError".into(),
            Self::NotAcceptable => format!("{label}ContentNotAcceptableError"),
            Self::ProxyAuthRequired => format!("{label}ProxyAuthenticationError"),
            Self::RequestTimeout => format!("{label}RequestTimeoutError"),
            Self::Conflict => format!("{label}ConflictError"),
            Self::Gone => format!("{label}ResourceGoneError"),
            Self::LengthRequired => "RequestLengthRequiredError".into(),
            Self::PreconditionFailed => format!("{label}PreconditionFailedError"),
            Self::PayloadTooLarge => "PayloadTooLargeError".into(),
            Self::UriTooLong => "URITooLongError".into(),
            Self::UnsupportedMediaType => format!("{label}UnsupportedMediaTypeError"),
            Self::RangeNotSatisfiable => format!("{label}RangeNotSatisfiableError"),
            Self::ExpectationFailed => format!("{label}ExpectationFailedError"),
            Self::UnprocessableEntity => format!("{label}UnprocessableEntityError"),
            Self::Locked => format!("{label}ResourceLockedError"),
            Self::FailedDependency => format!("{label}DependencyFailedError"),
            Self::UpgradeRequired => format!("{label}UpgradeRequiredError"),
            Self::TooManyRequests => format!("{label}RateLimitExceededError"),
            Self::UnavailableForLegalReasons => format!("{label}LegalRestrictionsError"),
            Self::InternalServerError => format!("{label}ServerError"),
            Self::NotImplemented => format!("{label}NotImplementedError"),
            Self::BadGateway => format!("{label}GatewayError"),
            Self::ServiceUnavailable => format!("{label}ServiceUnavailableError"),
            Self::GatewayTimeout => format!("{label}GatewayTimeoutError"),
            Self::HttpVersionNotSupported => format!("{label}HTTPVersionNotSupportedError"),
            Self::UniqueViolation => format!("{label}UniqueViolationError"),
            Self::NotNullViolation => format!("{label}NotNullViolationError"),
            Self::IntegrityViolation => format!("{label}IntegrityViolationError"),
            Self::DeleteFailed => format!("{label}DeleteFailedError"),
        }
    }

    pub fn default_detail(self, label: &str) -> String {
        match self {
            Self::BadRequest => {
                format!("Invalid request for {label}. Check your input parameters.")
            }
            Self::Unauthorized => format!("Authentication required to access {label} resources."),
            Self::PaymentRequired => {
                format!("Payment is required to access premium {label} resources.")
            }
            Self::Forbidden => {
                format!("You do not have permission to access the requested {label}.")
            }
            Self::NotFound => format!("The requested {label} was not found."),
            Self::MethodNotAllowed => "The HTTP method is not allowed.".into(),
            Self::NotAcceptable => {
                format!("The requested {label} resource cannot generate acceptable content.")
            }
            Self::ProxyAuthRequired => {
                format!("Authentication required to access the proxy for {label} resources.")
            }
            Self::RequestTimeout => {
                format!("The server timed out while processing the {label} request.")
            }
            Self::Conflict => {
                format!("The request conflicts with the current state of {label} data.")
            }
            Self::Gone => format!("The requested {label} resource is no longer available."),
            Self::LengthRequired => "Content-Length header is required.".into(),
            Self::PreconditionFailed => {
                format!("Preconditions for updating {label} data have failed.")
            }
            Self::PayloadTooLarge => "The uploaded file exceeds the size limit.".into(),
            Self::UriTooLong => "The URI is too long to be processed.".into(),
            Self::UnsupportedMediaType => {
                format!("The server cannot process the media type provided for {label} upload.")
            }
            Self::RangeNotSatisfiable => {
                format!("The requested range for {label} is not satisfiable.")
            }
            Self::ExpectationFailed => {
                format!("The server could not meet the expectations for {label} processing.")
            }
            Self::UnprocessableEntity => {
                format!("The server cannot process the given data for {label}.")
            }
            Self::Locked => format!("The requested {label} resource is currently locked."),
            Self::FailedDependency => {
                format!("The {label} request failed due to unmet dependencies.")
            }
            Self::UpgradeRequired => format!("Upgrade is required to access {label} resources."),
            Self::TooManyRequests => {
                format!("Too many requests have been made for {label}. Please try again later.")
            }
            Self::UnavailableForLegalReasons => format!(
                "The requested {label} resource is unavailable due to legal restrictions."
            ),
            Self::InternalServerError => format!(
                "An unexpected error occurred on the server while processing {label} data."
            ),
            Self::NotImplemented => {
                format!("The requested feature for {label} is not implemented.")
            }
            Self::BadGateway => {
                format!("Received an invalid response while processing {label} data.")
            }
            Self::ServiceUnavailable => {
                format!("The server is currently unavailable for {label} resources.")
            }
            Self::GatewayTimeout => {
                format!("The gateway timed out while processing {label} data.")
            }
            Self::HttpVersionNotSupported => {
                format!("The server does not support the HTTP version used for {label} requests.")
            }
            Self::UniqueViolation => "Unique constraint violated".into(),
            Self::NotNullViolation => "Not null constraint violated".into(),
            Self::IntegrityViolation => "Integrity Error".into(),
            Self::DeleteFailed => "Delete operation failed due to some dependency".into(),
        }
    }
}

/// A deliberate, typed failure carrying everything needed to render an error entry.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{title} [{}]: {detail}", .kind.status())]
pub struct DomainError {
    kind: ErrorKind,
    title: String,
    detail: String,
    context: Option<ErrorContext>,
}

macro_rules! labelled_constructors {
    ($($name:ident => $kind:ident),* $(,)?) => {
        $(
            pub fn $name(label: impl AsRef<str>) -> Self {
                Self::labelled(ErrorKind::$kind, label)
            }
        )*
    };
}

impl DomainError {
    /// Builds an error of `kind` using the default `"Entity"` label.
    pub fn from_kind(kind: ErrorKind) -> Self {
        Self::labelled(kind, DEFAULT_LABEL)
    }

    pub fn labelled(kind: ErrorKind, label: impl AsRef<str>) -> Self {
        let label = label.as_ref();
        Self {
            kind,
            title: kind.title(label),
            detail: kind.default_detail(label),
            context: None,
        }
    }

    labelled_constructors! {
        bad_request => BadRequest,
        unauthorized => Unauthorized,
        payment_required => PaymentRequired,
        forbidden => Forbidden,
        not_found => NotFound,
        not_acceptable => NotAcceptable,
        proxy_auth_required => ProxyAuthRequired,
        request_timeout => RequestTimeout,
        conflict => Conflict,
        gone => Gone,
        precondition_failed => PreconditionFailed,
        unsupported_media_type => UnsupportedMediaType,
        range_not_satisfiable => RangeNotSatisfiable,
        expectation_failed => ExpectationFailed,
        unprocessable_entity => UnprocessableEntity,
        locked => Locked,
        failed_dependency => FailedDependency,
        upgrade_required => UpgradeRequired,
        too_many_requests => TooManyRequests,
        unavailable_for_legal_reasons => UnavailableForLegalReasons,
        internal_server_error => InternalServerError,
        not_implemented => NotImplemented,
        bad_gateway => BadGateway,
        service_unavailable => ServiceUnavailable,
        gateway_timeout => GatewayTimeout,
        http_version_not_supported => HttpVersionNotSupported,
    }

    pub fn method_not_allowed() -> Self {
        Self::from_kind(ErrorKind::MethodNotAllowed)
    }

    pub fn length_required() -> Self {
        Self::from_kind(ErrorKind::LengthRequired)
    }

    pub fn payload_too_large() -> Self {
        Self::from_kind(ErrorKind::PayloadTooLarge)
    }

    pub fn uri_too_long() -> Self {
        Self::from_kind(ErrorKind::UriTooLong)
    }

    pub fn unique_violation() -> Self {
        Self::labelled(ErrorKind::UniqueViolation, "")
    }

    pub fn not_null_violation() -> Self {
        Self::labelled(ErrorKind::NotNullViolation, "")
    }

    /// Generic integrity failure; the title is the driver's class name when one is known.
    pub fn integrity_violation(exception_class: Option<&str>) -> Self {
        let mut err = Self::labelled(ErrorKind::IntegrityViolation, "");
        if let Some(class) = exception_class.filter(|c| !c.is_empty()) {
            err.title = class.to_string();
        }
        err
    }

    pub fn delete_failed() -> Self {
        Self::labelled(ErrorKind::DeleteFailed, "")
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }

    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context
            .get_or_insert_with(ErrorContext::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn status(&self) -> u16 {
        self.kind.status()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub fn context(&self) -> Option<&ErrorContext> {
        self.context.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ALL_KINDS: [ErrorKind; 34] = [
        ErrorKind::BadRequest,
        ErrorKind::Unauthorized,
        ErrorKind::PaymentRequired,
        ErrorKind::Forbidden,
        ErrorKind::NotFound,
        ErrorKind::MethodNotAllowed,
        ErrorKind::NotAcceptable,
        ErrorKind::ProxyAuthRequired,
        ErrorKind::RequestTimeout,
        ErrorKind::Conflict,
        ErrorKind::Gone,
        ErrorKind::LengthRequired,
        ErrorKind::PreconditionFailed,
        ErrorKind::PayloadTooLarge,
        ErrorKind::UriTooLong,
        ErrorKind::UnsupportedMediaType,
        ErrorKind::RangeNotSatisfiable,
        ErrorKind::ExpectationFailed,
        ErrorKind::UnprocessableEntity,
        ErrorKind::Locked,
        ErrorKind::FailedDependency,
        ErrorKind::UpgradeRequired,
        ErrorKind::TooManyRequests,
        ErrorKind::UnavailableForLegalReasons,
        ErrorKind::InternalServerError,
        ErrorKind::NotImplemented,
        ErrorKind::BadGateway,
        ErrorKind::ServiceUnavailable,
        ErrorKind::GatewayTimeout,
        ErrorKind::HttpVersionNotSupported,
        ErrorKind::UniqueViolation,
        ErrorKind::NotNullViolation,
        ErrorKind::IntegrityViolation,
        ErrorKind::DeleteFailed,
    ];

    #[test]
    fn every_kind_has_an_error_status() {
        for kind in ALL_KINDS {
            let status = DomainError::from_kind(kind).status();
            assert!((400..=599).contains(&status), "{kind:?} -> {status}");
        }
    }

    #[test]
    fn not_found_title_embeds_label() {
        for label in ["User", "Invoice", "Entity", ""] {
            let err = DomainError::not_found(label);
            assert_eq!(err.status(), 404);
            assert_eq!(err.title(), format!("{label}NotFoundError"));
        }
    }

    #[test]
    fn default_label_is_entity() {
        let err = DomainError::from_kind(ErrorKind::BadRequest);
        assert_eq!(err.title(), "InvalidEntityRequestError");
        assert_eq!(
            err.detail(),
            "Invalid request for Entity. Check your input parameters."
        );
    }

    #[test]
    fn override_detail_and_context_are_kept() {
        let err = DomainError::conflict("Order")
            .with_detail("order already shipped")
            .with_context_entry("id", 7);

        assert_eq!(err.status(), 409);
        assert_eq!(err.title(), "OrderConflictError");
        assert_eq!(err.detail(), "order already shipped");
        assert_eq!(err.context().and_then(|c| c.get("id")), Some(&json!(7)));
    }

    #[test]
    fn fixed_titles_ignore_label() {
        assert_eq!(DomainError::method_not_allowed().title(), "MethodNotAllowedError");
        assert_eq!(DomainError::payment_required("User").title(), "PaymentRequiredError");
        assert_eq!(DomainError::uri_too_long().status(), 414);
    }

    #[test]
    fn integrity_violation_uses_class_name_as_title() {
        let err = DomainError::integrity_violation(Some("ForeignKeyViolationError"));
        assert_eq!(err.title(), "ForeignKeyViolationError");
        assert_eq!(err.status(), 400);

        let generic = DomainError::integrity_violation(None);
        assert_eq!(generic.title(), "IntegrityViolationError");
        assert_eq!(generic.detail(), "Integrity Error");
    }

    #[test]
    fn display_includes_status() {
        let err = DomainError::not_found("User");
        assert_eq!(
            err.to_string(),
            "UserNotFoundError [404]: The requested User was not found."
        );
    }
}
