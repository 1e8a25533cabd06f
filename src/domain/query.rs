// src/domain/query.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    Like,
    Ilike,
    In,
    IsNull,
    IsNotNull,
}

/// A single column predicate. A list of filters is combined with `AND`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    #[serde(default)]
    pub value: Value,
}

impl Filter {
    pub fn new(column: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, FilterOp::Eq, value)
    }

    pub fn ne(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, FilterOp::Ne, value)
    }

    pub fn gt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, FilterOp::Gt, value)
    }

    pub fn lt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, FilterOp::Lt, value)
    }

    pub fn is_in(column: impl Into<String>, values: Vec<Value>) -> Self {
        Self::new(column, FilterOp::In, Value::Array(values))
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Self::new(column, FilterOp::IsNull, Value::Null)
    }

    pub fn is_not_null(column: impl Into<String>) -> Self {
        Self::new(column, FilterOp::IsNotNull, Value::Null)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldChange {
    /// Write the value; a JSON `null` means "leave the column unchanged".
    Set(Value),
    /// Write SQL `NULL`.
    Clear,
}

/// A partial update keyed by column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Changes {
    fields: BTreeMap<String, FieldChange>,
}

impl Changes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields
            .insert(column.into(), FieldChange::Set(value.into()));
        self
    }

    pub fn clear(mut self, column: impl Into<String>) -> Self {
        self.fields.insert(column.into(), FieldChange::Clear);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldChange)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Entries that actually modify the row: `Set(null)` is dropped.
    pub fn effective(&self) -> impl Iterator<Item = (&str, &FieldChange)> {
        self.iter()
            .filter(|(_, change)| !matches!(change, FieldChange::Set(Value::Null)))
    }
}

impl From<serde_json::Map<String, Value>> for Changes {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        Self {
            fields: map
                .into_iter()
                .map(|(k, v)| (k, FieldChange::Set(v)))
                .collect(),
        }
    }
}

/// Conflict clause of a bulk upsert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkUpsertConflict {
    /// Conflict target; the primary key when unset.
    #[serde(default)]
    pub columns: Option<Vec<String>>,
    /// Restricts conflict detection to a partial index.
    #[serde(default, rename = "where")]
    pub where_: Vec<Filter>,
    #[serde(default)]
    pub do_nothing: bool,
}

impl BulkUpsertConflict {
    pub fn on(columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            columns: Some(columns.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn do_nothing(mut self) -> Self {
        self.do_nothing = true;
        self
    }

    pub fn where_(mut self, filters: Vec<Filter>) -> Self {
        self.where_ = filters;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkUpsertOptions {
    /// Columns overwritten on conflict; every non-target column in the batch when unset.
    #[serde(default)]
    pub update_columns: Option<Vec<String>>,
    /// Scopes the `DO UPDATE` branch to existing rows matching these filters.
    #[serde(default)]
    pub update_where: Vec<Filter>,
    #[serde(default)]
    pub conflict: BulkUpsertConflict,
    #[serde(default)]
    pub returning_columns: Option<Vec<String>>,
}

impl BulkUpsertOptions {
    pub fn returning(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.returning_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn conflict(mut self, conflict: BulkUpsertConflict) -> Self {
        self.conflict = conflict;
        self
    }

    pub fn update_columns(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.update_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn update_where(mut self, filters: Vec<Filter>) -> Self {
        self.update_where = filters;
        self
    }
}
