// src/infrastructure/repositories/sql.rs
use crate::domain::{
    entity::{Entity, SqlValue},
    errors::{DomainError, DomainResult},
    query::{Filter, FilterOp},
};
use serde_json::Value;
use sqlx::{Postgres, QueryBuilder, types::Json};

/// Double-quotes an identifier, splitting on `.` for schema-qualified names.
pub fn quote_ident(name: &str) -> String {
    name.split('.')
        .map(|part| format!("\"{}\"", part.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(".")
}

pub fn push_value(builder: &mut QueryBuilder<'_, Postgres>, value: SqlValue) {
    match value {
        SqlValue::Bool(v) => builder.push_bind(v),
        SqlValue::Int(v) => builder.push_bind(v),
        SqlValue::Float(v) => builder.push_bind(v),
        SqlValue::Text(v) => builder.push_bind(v),
        SqlValue::Timestamp(v) => builder.push_bind(v),
        SqlValue::Json(v) => builder.push_bind(v.map(Json)),
    };
}

/// Appends ` WHERE a AND b ...` for `filters`; nothing when the list is empty.
///
/// `qualifier` prefixes every column, which the upsert update branch needs to
/// address the existing row.
pub fn push_where<E: Entity>(
    builder: &mut QueryBuilder<'_, Postgres>,
    filters: &[Filter],
    qualifier: Option<&str>,
) -> DomainResult<()> {
    for (index, filter) in filters.iter().enumerate() {
        builder.push(if index == 0 { " WHERE " } else { " AND " });
        push_predicate::<E>(builder, filter, qualifier)?;
    }
    Ok(())
}

fn push_predicate<E: Entity>(
    builder: &mut QueryBuilder<'_, Postgres>,
    filter: &Filter,
    qualifier: Option<&str>,
) -> DomainResult<()> {
    let column = E::require_column(&filter.column)?;
    let target = match qualifier {
        Some(qualifier) => format!("{}.{}", quote_ident(qualifier), quote_ident(column.name)),
        None => quote_ident(column.name),
    };

    let comparison = match filter.op {
        FilterOp::Eq if filter.value.is_null() => {
            builder.push(format!("{target} IS NULL"));
            return Ok(());
        }
        FilterOp::Ne if filter.value.is_null() => {
            builder.push(format!("{target} IS NOT NULL"));
            return Ok(());
        }
        FilterOp::IsNull => {
            builder.push(format!("{target} IS NULL"));
            return Ok(());
        }
        FilterOp::IsNotNull => {
            builder.push(format!("{target} IS NOT NULL"));
            return Ok(());
        }
        FilterOp::In => {
            let values = match &filter.value {
                Value::Array(values) => values.clone(),
                other => vec![other.clone()],
            };
            if values.is_empty() {
                builder.push("FALSE");
                return Ok(());
            }
            builder.push(format!("{target} IN ("));
            for (index, value) in values.iter().enumerate() {
                if index > 0 {
                    builder.push(", ");
                }
                push_value(builder, column.coerce(E::NAME, value)?);
            }
            builder.push(")");
            return Ok(());
        }
        FilterOp::Eq => "=",
        FilterOp::Ne => "<>",
        FilterOp::Lt => "<",
        FilterOp::Lte => "<=",
        FilterOp::Gt => ">",
        FilterOp::Gte => ">=",
        FilterOp::Like => "LIKE",
        FilterOp::Ilike => "ILIKE",
    };

    if matches!(filter.op, FilterOp::Like | FilterOp::Ilike) && !filter.value.is_string() {
        return Err(DomainError::unprocessable_entity(E::NAME)
            .with_detail(format!("`{}` patterns must be strings", column.name))
            .with_context_entry("column", column.name));
    }

    builder.push(format!("{target} {comparison} "));
    push_value(builder, column.coerce(E::NAME, &filter.value)?);
    Ok(())
}
