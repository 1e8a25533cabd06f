// src/infrastructure/repositories/error.rs
use crate::application::ApplicationError;
use crate::domain::constraint::{ConstraintErrorParser, delete_failed};
use sqlx::error::DatabaseError;
use sqlx::postgres::PgDatabaseError;

const INTEGRITY_CLASS: &str = "23";

/// Driver exception class for a SQLSTATE in the integrity constraint class.
pub fn sqlstate_class_name(code: &str) -> &'static str {
    match code {
        "23505" => "UniqueViolationError",
        "23502" => "NotNullViolationError",
        "23503" => "ForeignKeyViolationError",
        "23514" => "CheckViolationError",
        "23P01" => "ExclusionViolationError",
        "23001" => "RestrictViolationError",
        _ => "IntegrityConstraintViolationError",
    }
}

pub fn is_integrity_violation(db_err: &(dyn DatabaseError + 'static)) -> bool {
    db_err
        .code()
        .is_some_and(|code| code.starts_with(INTEGRITY_CLASS))
}

/// Renders a database error in the bracketed form the constraint parser reads:
/// `<class 'postgres.errors.UniqueViolationError'>: message\nDETAIL:  detail`.
pub fn driver_text(db_err: &(dyn DatabaseError + 'static)) -> String {
    let class_name = db_err
        .code()
        .map(|code| sqlstate_class_name(&code))
        .unwrap_or("IntegrityConstraintViolationError");
    let detail = db_err
        .try_downcast_ref::<PgDatabaseError>()
        .and_then(PgDatabaseError::detail)
        .unwrap_or_default();

    format!(
        "<class 'postgres.errors.{class_name}'>: {}\nDETAIL:  {detail}",
        db_err.message()
    )
}

fn database_kind(err: &sqlx::Error) -> &'static str {
    match err {
        sqlx::Error::Configuration(_) => "DatabaseConfigurationError",
        sqlx::Error::Database(_) => "DatabaseError",
        sqlx::Error::Io(_) => "DatabaseIoError",
        sqlx::Error::Tls(_) => "DatabaseTlsError",
        sqlx::Error::Protocol(_) => "DatabaseProtocolError",
        sqlx::Error::RowNotFound => "RowNotFoundError",
        sqlx::Error::TypeNotFound { .. } => "TypeNotFoundError",
        sqlx::Error::ColumnIndexOutOfBounds { .. } => "ColumnIndexOutOfBoundsError",
        sqlx::Error::ColumnNotFound(_) => "ColumnNotFoundError",
        sqlx::Error::ColumnDecode { .. } => "ColumnDecodeError",
        sqlx::Error::Decode(_) => "DecodeError",
        sqlx::Error::PoolTimedOut => "PoolTimedOutError",
        sqlx::Error::PoolClosed => "PoolClosedError",
        sqlx::Error::WorkerCrashed => "WorkerCrashedError",
        _ => "DatabaseError",
    }
}

/// Unclassified conversion: integrity failures keep their driver text for the
/// HTTP boundary to parse, everything else is a database access failure.
impl From<sqlx::Error> for ApplicationError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if is_integrity_violation(db_err.as_ref()) {
                return ApplicationError::integrity(driver_text(db_err.as_ref()));
            }
        }
        ApplicationError::database(database_kind(&err), err.to_string())
    }
}

/// Maps an insert/update/select failure, classifying integrity violations.
pub fn map_sqlx(err: sqlx::Error) -> ApplicationError {
    match ApplicationError::from(err) {
        ApplicationError::Integrity(raw) => {
            tracing::debug!(raw = %raw, "classifying integrity failure");
            ConstraintErrorParser::global().parse(&raw).into()
        }
        other => other,
    }
}

/// Maps a delete failure; any integrity violation means dependents still exist.
pub fn map_delete_sqlx(err: sqlx::Error) -> ApplicationError {
    match ApplicationError::from(err) {
        ApplicationError::Integrity(raw) => delete_failed(&raw).into(),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlstate_maps_to_driver_class() {
        assert_eq!(sqlstate_class_name("23505"), "UniqueViolationError");
        assert_eq!(sqlstate_class_name("23502"), "NotNullViolationError");
        assert_eq!(sqlstate_class_name("23503"), "ForeignKeyViolationError");
        assert_eq!(sqlstate_class_name("23000"), "IntegrityConstraintViolationError");
    }

    #[test]
    fn non_database_errors_are_database_failures() {
        let err = ApplicationError::from(sqlx::Error::PoolTimedOut);
        match err {
            ApplicationError::Database { kind, message } => {
                assert_eq!(kind, "PoolTimedOutError");
                assert!(!message.is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn map_sqlx_keeps_access_failures_unclassified() {
        let err = map_sqlx(sqlx::Error::RowNotFound);
        assert!(matches!(
            err,
            ApplicationError::Database {
                kind: "RowNotFoundError",
                ..
            }
        ));
    }
}
