// src/domain/entity.rs
use crate::domain::errors::{DomainError, DomainResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A row as a column-name keyed JSON object.
pub type Record = Map<String, Value>;

/// Audit columns every persisted entity carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Audit {
    pub id: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_by_id: Option<i64>,
    pub updated_by_id: Option<i64>,
    pub deleted_by_id: Option<i64>,
}

impl Audit {
    pub fn with_id(id: i64) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }
}

pub const AUDIT_COLUMNS: &[Column] = &[
    Column::generated("id", ColumnKind::Int),
    Column::generated("created_at", ColumnKind::Timestamp),
    Column::generated("updated_at", ColumnKind::Timestamp),
    Column::new("deleted_at", ColumnKind::Timestamp),
    Column::new("created_by_id", ColumnKind::Int),
    Column::new("updated_by_id", ColumnKind::Int),
    Column::new("deleted_by_id", ColumnKind::Int),
];

/// Read/write access to the audit columns of an entity.
pub trait AuditFields {
    fn audit(&self) -> &Audit;
    fn audit_mut(&mut self) -> &mut Audit;

    fn id(&self) -> Option<i64> {
        self.audit().id
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.audit().created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.audit().updated_at
    }

    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.audit().deleted_at
    }

    fn created_by_id(&self) -> Option<i64> {
        self.audit().created_by_id
    }

    fn updated_by_id(&self) -> Option<i64> {
        self.audit().updated_by_id
    }

    fn deleted_by_id(&self) -> Option<i64> {
        self.audit().deleted_by_id
    }

    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.audit_mut().created_at = Some(at);
    }
}

/// A table-backed record type the generic repository and service can manage.
///
/// `COLUMNS` lists the entity's own columns; the audit columns are implied.
pub trait Entity: AuditFields + Serialize + Send + Sync + Unpin + 'static {
    /// Label used in error titles and details, e.g. `"User"`.
    const NAME: &'static str;
    const TABLE: &'static str;
    const COLUMNS: &'static [Column];
    const PRIMARY_KEY: &'static [&'static str] = &["id"];
    /// Whether the service should stamp `created_at` on create.
    const TRACKS_CREATED_AT: bool = true;

    fn all_columns() -> impl Iterator<Item = &'static Column> {
        AUDIT_COLUMNS.iter().chain(Self::COLUMNS.iter())
    }

    fn column(name: &str) -> Option<&'static Column> {
        Self::all_columns().find(|column| column.name == name)
    }

    /// Column lookup that reports unknown names as a bad request.
    fn require_column(name: &str) -> DomainResult<&'static Column> {
        Self::column(name).ok_or_else(|| {
            DomainError::bad_request(Self::NAME)
                .with_detail(format!("unknown column `{name}` for {}", Self::NAME))
                .with_context_entry("column", name)
        })
    }

    /// Values to insert for this record. Null values of generated columns are
    /// left out so the store can fill them.
    fn insert_record(&self) -> DomainResult<Record> {
        let value = serde_json::to_value(self).map_err(|err| {
            DomainError::unprocessable_entity(Self::NAME).with_detail(err.to_string())
        })?;
        let Value::Object(object) = value else {
            return Err(DomainError::unprocessable_entity(Self::NAME)
                .with_detail(format!("{} does not serialize to an object", Self::NAME)));
        };

        Ok(object
            .into_iter()
            .filter(|(name, value)| match Self::column(name) {
                Some(column) => !(column.generated && value.is_null()),
                None => false,
            })
            .collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Bool,
    Int,
    Float,
    Text,
    Timestamp,
    Json,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "boolean",
            Self::Int => "integer",
            Self::Float => "number",
            Self::Text => "text",
            Self::Timestamp => "timestamp",
            Self::Json => "json",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    /// The store supplies a value when none is given (serial ids, `now()` defaults).
    pub generated: bool,
}

impl Column {
    pub const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            generated: false,
        }
    }

    pub const fn generated(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            generated: true,
        }
    }

    /// Converts a JSON value into a typed value for this column. Strings are
    /// parsed into the column's kind so query-string input works unchanged.
    pub fn coerce(&self, label: &str, value: &Value) -> DomainResult<SqlValue> {
        let coerced = match (self.kind, value) {
            (kind, Value::Null) => Some(SqlValue::null(kind)),
            (ColumnKind::Bool, Value::Bool(b)) => Some(SqlValue::Bool(Some(*b))),
            (ColumnKind::Bool, Value::String(s)) => {
                s.parse::<bool>().ok().map(|b| SqlValue::Bool(Some(b)))
            }
            (ColumnKind::Int, Value::Number(n)) => n.as_i64().map(|i| SqlValue::Int(Some(i))),
            (ColumnKind::Int, Value::String(s)) => {
                s.trim().parse::<i64>().ok().map(|i| SqlValue::Int(Some(i)))
            }
            (ColumnKind::Float, Value::Number(n)) => {
                n.as_f64().map(|f| SqlValue::Float(Some(f)))
            }
            (ColumnKind::Float, Value::String(s)) => {
                s.trim().parse::<f64>().ok().map(|f| SqlValue::Float(Some(f)))
            }
            (ColumnKind::Text, Value::String(s)) => Some(SqlValue::Text(Some(s.clone()))),
            (ColumnKind::Text, Value::Number(n)) => Some(SqlValue::Text(Some(n.to_string()))),
            (ColumnKind::Text, Value::Bool(b)) => Some(SqlValue::Text(Some(b.to_string()))),
            (ColumnKind::Timestamp, Value::String(s)) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|at| SqlValue::Timestamp(Some(at.with_timezone(&Utc)))),
            (ColumnKind::Json, other) => Some(SqlValue::Json(Some(other.clone()))),
            _ => None,
        };

        coerced.ok_or_else(|| {
            DomainError::unprocessable_entity(label)
                .with_detail(format!(
                    "column `{}` expects a {} value",
                    self.name, self.kind
                ))
                .with_context_entry("column", self.name)
                .with_context_entry("value", value.clone())
        })
    }
}

/// A typed value ready to be bound to a statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Bool(Option<bool>),
    Int(Option<i64>),
    Float(Option<f64>),
    Text(Option<String>),
    Timestamp(Option<DateTime<Utc>>),
    Json(Option<Value>),
}

impl SqlValue {
    pub fn null(kind: ColumnKind) -> Self {
        match kind {
            ColumnKind::Bool => Self::Bool(None),
            ColumnKind::Int => Self::Int(None),
            ColumnKind::Float => Self::Float(None),
            ColumnKind::Text => Self::Text(None),
            ColumnKind::Timestamp => Self::Timestamp(None),
            ColumnKind::Json => Self::Json(None),
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            Self::Bool(v) => v.is_none(),
            Self::Int(v) => v.is_none(),
            Self::Float(v) => v.is_none(),
            Self::Text(v) => v.is_none(),
            Self::Timestamp(v) => v.is_none(),
            Self::Json(v) => v.is_none(),
        }
    }
}
