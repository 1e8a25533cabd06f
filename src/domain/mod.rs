// src/domain/mod.rs
pub mod constraint;
pub mod constraint_messages;
pub mod entity;
pub mod errors;
pub mod query;

pub use entity::{AUDIT_COLUMNS, Audit, AuditFields, Column, ColumnKind, Entity, Record, SqlValue};
pub use errors::{DomainError, DomainResult, ErrorContext, ErrorKind};
pub use query::{BulkUpsertConflict, BulkUpsertOptions, Changes, FieldChange, Filter, FilterOp};
