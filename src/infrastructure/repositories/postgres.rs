// src/infrastructure/repositories/postgres.rs
use super::error::{map_delete_sqlx, map_sqlx};
use super::sql::{push_value, push_where, quote_ident};
use crate::application::{ApplicationResult, ports::repository::Repository};
use crate::domain::{
    entity::{Column, Entity, Record},
    errors::{DomainError, DomainResult},
    query::{BulkUpsertOptions, Changes, FieldChange, Filter},
};
use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, postgres::PgRow, types::Json};
use std::marker::PhantomData;

const ID_COLUMN: &str = "id";

/// Repository for any [`Entity`] whose rows decode with `FromRow`.
pub struct PgRepository<E> {
    pool: PgPool,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for PgRepository<E> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E> PgRepository<E> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }
}

fn table<E: Entity>() -> String {
    quote_ident(E::TABLE)
}

pub(crate) fn insert_statement<E: Entity>(
    record: &Record,
) -> DomainResult<QueryBuilder<'static, Postgres>> {
    let columns: Vec<&Column> = E::all_columns()
        .filter(|column| record.contains_key(column.name))
        .collect();

    let mut builder = QueryBuilder::new(format!("INSERT INTO {}", table::<E>()));
    if columns.is_empty() {
        builder.push(" DEFAULT VALUES");
    } else {
        builder.push(" (");
        builder.push(column_list(&columns));
        builder.push(") VALUES (");
        for (index, column) in columns.iter().enumerate() {
            if index > 0 {
                builder.push(", ");
            }
            let value = record.get(column.name).unwrap_or(&serde_json::Value::Null);
            push_value(&mut builder, column.coerce(E::NAME, value)?);
        }
        builder.push(")");
    }
    builder.push(" RETURNING *");
    Ok(builder)
}

pub(crate) fn select_statement<E: Entity>(
    filters: &[Filter],
    limit_one: bool,
) -> DomainResult<QueryBuilder<'static, Postgres>> {
    let mut builder = QueryBuilder::new(format!("SELECT * FROM {}", table::<E>()));
    push_where::<E>(&mut builder, filters, None)?;
    if limit_one {
        builder.push(" LIMIT 1");
    }
    Ok(builder)
}

/// `None` when no change touches a known column.
pub(crate) fn update_statement<E: Entity>(
    id: i64,
    changes: &Changes,
) -> DomainResult<Option<QueryBuilder<'static, Postgres>>> {
    let mut assignments = Vec::new();
    for (name, change) in changes.effective() {
        let Some(column) = E::column(name) else {
            tracing::debug!(entity = E::NAME, column = name, "ignoring unknown column in update");
            continue;
        };
        let value = match change {
            FieldChange::Set(value) => column.coerce(E::NAME, value)?,
            FieldChange::Clear => crate::domain::entity::SqlValue::null(column.kind),
        };
        assignments.push((column, value));
    }

    if assignments.is_empty() {
        return Ok(None);
    }

    let mut builder = QueryBuilder::new(format!("UPDATE {} SET ", table::<E>()));
    for (index, (column, value)) in assignments.into_iter().enumerate() {
        if index > 0 {
            builder.push(", ");
        }
        builder.push(format!("{} = ", quote_ident(column.name)));
        push_value(&mut builder, value);
    }
    builder.push(format!(" WHERE {} = ", quote_ident(ID_COLUMN)));
    builder.push_bind(id);
    builder.push(" RETURNING *");
    Ok(Some(builder))
}

pub(crate) fn delete_statement<E: Entity>(id: i64) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!(
        "DELETE FROM {} WHERE {} = ",
        table::<E>(),
        quote_ident(ID_COLUMN)
    ));
    builder.push_bind(id);
    builder
}

/// Builds the single-statement upsert. With returning columns the affected
/// rows come back as one JSON object each.
pub(crate) fn bulk_upsert_statement<E: Entity>(
    records: &[Record],
    options: &BulkUpsertOptions,
) -> DomainResult<QueryBuilder<'static, Postgres>> {
    for record in records {
        for name in record.keys() {
            E::require_column(name)?;
        }
    }
    let columns: Vec<&Column> = E::all_columns()
        .filter(|column| records.iter().any(|record| record.contains_key(column.name)))
        .collect();
    if columns.is_empty() {
        return Err(DomainError::bad_request(E::NAME)
            .with_detail("bulk upsert records carry no columns"));
    }

    let target: Vec<&Column> = match &options.conflict.columns {
        Some(names) => names
            .iter()
            .map(|name| E::require_column(name))
            .collect::<DomainResult<_>>()?,
        None => E::PRIMARY_KEY
            .iter()
            .map(|name| E::require_column(name))
            .collect::<DomainResult<_>>()?,
    };
    if target.is_empty() {
        return Err(DomainError::bad_request(E::NAME)
            .with_detail("bulk upsert conflict target names no columns"));
    }
    let returning: Vec<&Column> = options
        .returning_columns
        .iter()
        .flatten()
        .map(|name| E::require_column(name))
        .collect::<DomainResult<_>>()?;

    let mut builder = QueryBuilder::new("");
    if !returning.is_empty() {
        builder.push("WITH upserted AS (");
    }

    builder.push(format!("INSERT INTO {} (", table::<E>()));
    builder.push(column_list(&columns));
    builder.push(") VALUES ");
    for (row, record) in records.iter().enumerate() {
        builder.push(if row == 0 { "(" } else { ", (" });
        for (index, column) in columns.iter().enumerate() {
            if index > 0 {
                builder.push(", ");
            }
            match record.get(column.name) {
                Some(value) => push_value(&mut builder, column.coerce(E::NAME, value)?),
                None => {
                    builder.push("DEFAULT");
                }
            }
        }
        builder.push(")");
    }

    builder.push(" ON CONFLICT (");
    builder.push(column_list(&target));
    builder.push(")");
    push_where::<E>(&mut builder, &options.conflict.where_, None)?;

    if options.conflict.do_nothing {
        builder.push(" DO NOTHING");
    } else {
        let updated: Vec<&Column> = match options.update_columns.as_deref() {
            Some(names) if !names.is_empty() => names
                .iter()
                .map(|name| E::require_column(name))
                .collect::<DomainResult<_>>()?,
            _ => columns
                .iter()
                .copied()
                .filter(|column| !target.iter().any(|t| t.name == column.name))
                .collect(),
        };
        // Touch the first target column so conflicting rows still count as affected.
        let updated = if updated.is_empty() {
            target[..1].to_vec()
        } else {
            updated
        };

        builder.push(" DO UPDATE SET ");
        for (index, column) in updated.iter().enumerate() {
            if index > 0 {
                builder.push(", ");
            }
            let name = quote_ident(column.name);
            builder.push(format!("{name} = EXCLUDED.{name}"));
        }
        push_where::<E>(&mut builder, &options.update_where, Some(E::TABLE))?;
    }

    if !returning.is_empty() {
        builder.push(" RETURNING ");
        builder.push(column_list(&returning));
        builder.push(") SELECT to_jsonb(upserted) FROM upserted");
    }
    Ok(builder)
}

fn column_list(columns: &[&Column]) -> String {
    columns
        .iter()
        .map(|column| quote_ident(column.name))
        .collect::<Vec<_>>()
        .join(", ")
}

#[async_trait]
impl<E> Repository<E> for PgRepository<E>
where
    E: Entity + for<'r> FromRow<'r, PgRow>,
{
    async fn create(&self, record: E) -> ApplicationResult<Option<E>> {
        let values = record.insert_record()?;
        let mut builder = insert_statement::<E>(&values)?;
        let created = builder
            .build_query_as::<E>()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> ApplicationResult<Option<E>> {
        let mut builder = select_statement::<E>(&[Filter::eq(ID_COLUMN, id)], false)?;
        let record = builder
            .build_query_as::<E>()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(record)
    }

    async fn get_by_params(&self, filters: &[Filter]) -> ApplicationResult<Vec<E>> {
        let mut builder = select_statement::<E>(filters, false)?;
        let records = builder
            .build_query_as::<E>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(records)
    }

    async fn get_one_by_params(&self, filters: &[Filter]) -> ApplicationResult<Option<E>> {
        let mut builder = select_statement::<E>(filters, true)?;
        let record = builder
            .build_query_as::<E>()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(record)
    }

    async fn get_all(&self) -> ApplicationResult<Vec<E>> {
        self.get_by_params(&[]).await
    }

    async fn update(&self, record: E, changes: Changes) -> ApplicationResult<E> {
        let Some(id) = record.id() else {
            return Err(DomainError::bad_request(E::NAME)
                .with_detail(format!("cannot update a {} without an id", E::NAME))
                .into());
        };
        let Some(mut builder) = update_statement::<E>(id, &changes)? else {
            return Ok(record);
        };

        let updated = builder
            .build_query_as::<E>()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        updated.ok_or_else(|| {
            DomainError::not_found(E::NAME)
                .with_context_entry("id", id)
                .into()
        })
    }

    async fn delete_by_id(&self, id: i64) -> ApplicationResult<()> {
        let result = delete_statement::<E>(id)
            .build()
            .execute(&self.pool)
            .await
            .map_err(map_delete_sqlx)?;
        if result.rows_affected() == 0 {
            tracing::debug!(entity = E::NAME, id, "delete matched no row");
        }
        Ok(())
    }

    async fn bulk_upsert(
        &self,
        records: Vec<Record>,
        options: BulkUpsertOptions,
    ) -> ApplicationResult<Vec<Record>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = bulk_upsert_statement::<E>(&records, &options)?;
        if options.returning_columns.as_ref().is_none_or(Vec::is_empty) {
            builder
                .build()
                .execute(&self.pool)
                .await
                .map_err(map_sqlx)?;
            return Ok(Vec::new());
        }

        let rows = builder
            .build_query_scalar::<Json<Record>>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(rows.into_iter().map(|Json(row)| row).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{Audit, AuditFields, ColumnKind};
    use crate::domain::query::{BulkUpsertConflict, Changes};
    use serde::Serialize;
    use serde_json::{Value, json};

    #[derive(Debug, Clone, Serialize)]
    struct Tag {
        #[serde(flatten)]
        audit: Audit,
        name: String,
        active: bool,
    }

    impl AuditFields for Tag {
        fn audit(&self) -> &Audit {
            &self.audit
        }

        fn audit_mut(&mut self) -> &mut Audit {
            &mut self.audit
        }
    }

    impl Entity for Tag {
        const NAME: &'static str = "Tag";
        const TABLE: &'static str = "tags";
        const COLUMNS: &'static [Column] = &[
            Column::new("name", ColumnKind::Text),
            Column::new("active", ColumnKind::Bool),
        ];
    }

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn insert_lists_present_columns_in_schema_order() {
        let values = record(json!({"name": "rust", "active": true, "created_at": "2024-01-01T00:00:00Z"}));
        let builder = insert_statement::<Tag>(&values).unwrap();
        assert_eq!(
            builder.sql(),
            "INSERT INTO \"tags\" (\"created_at\", \"name\", \"active\") VALUES ($1, $2, $3) RETURNING *"
        );
    }

    #[test]
    fn insert_without_values_uses_defaults() {
        let builder = insert_statement::<Tag>(&Record::new()).unwrap();
        assert_eq!(builder.sql(), "INSERT INTO \"tags\" DEFAULT VALUES RETURNING *");
    }

    #[test]
    fn update_skips_nulls_and_unknown_columns() {
        let changes = Changes::new()
            .set("name", "go")
            .set("active", Value::Null)
            .set("colour", "red")
            .clear("deleted_at");
        let builder = update_statement::<Tag>(7, &changes).unwrap().unwrap();
        assert_eq!(
            builder.sql(),
            "UPDATE \"tags\" SET \"deleted_at\" = $1, \"name\" = $2 WHERE \"id\" = $3 RETURNING *"
        );
    }

    #[test]
    fn update_without_effective_changes_builds_nothing() {
        let changes = Changes::new().set("active", Value::Null).set("colour", "red");
        assert!(update_statement::<Tag>(7, &changes).unwrap().is_none());
    }

    #[test]
    fn update_rejects_uncoercible_values() {
        let changes = Changes::new().set("active", json!([1, 2]));
        let Err(err) = update_statement::<Tag>(7, &changes) else {
            panic!("an array cannot be stored in a boolean column");
        };
        assert_eq!(err.status(), 422);
    }

    #[test]
    fn delete_targets_primary_key() {
        assert_eq!(
            delete_statement::<Tag>(3).sql(),
            "DELETE FROM \"tags\" WHERE \"id\" = $1"
        );
    }

    #[test]
    fn bulk_upsert_defaults_to_primary_key_update() {
        let records = vec![
            record(json!({"id": 1, "name": "A"})),
            record(json!({"id": 2, "name": "B"})),
        ];
        let options = BulkUpsertOptions::default().returning(["id"]);
        let builder = bulk_upsert_statement::<Tag>(&records, &options).unwrap();
        assert_eq!(
            builder.sql(),
            "WITH upserted AS (INSERT INTO \"tags\" (\"id\", \"name\") VALUES ($1, $2), ($3, $4) \
             ON CONFLICT (\"id\") DO UPDATE SET \"name\" = EXCLUDED.\"name\" RETURNING \"id\") \
             SELECT to_jsonb(upserted) FROM upserted"
        );
    }

    #[test]
    fn bulk_upsert_do_nothing_with_partial_index() {
        let records = vec![record(json!({"name": "A", "active": true}))];
        let options = BulkUpsertOptions::default().conflict(
            BulkUpsertConflict::on(["name"])
                .where_(vec![Filter::eq("active", true)])
                .do_nothing(),
        );
        let builder = bulk_upsert_statement::<Tag>(&records, &options).unwrap();
        assert_eq!(
            builder.sql(),
            "INSERT INTO \"tags\" (\"name\", \"active\") VALUES ($1, $2) \
             ON CONFLICT (\"name\") WHERE \"active\" = $3 DO NOTHING"
        );
    }

    #[test]
    fn bulk_upsert_missing_keys_fall_back_to_default() {
        let records = vec![
            record(json!({"id": 1, "name": "A"})),
            record(json!({"id": 2, "active": false})),
        ];
        let options = BulkUpsertOptions::default()
            .update_columns(["name"])
            .update_where(vec![Filter::is_null("deleted_at")]);
        let builder = bulk_upsert_statement::<Tag>(&records, &options).unwrap();
        assert_eq!(
            builder.sql(),
            "INSERT INTO \"tags\" (\"id\", \"name\", \"active\") VALUES ($1, $2, DEFAULT), ($3, DEFAULT, $4) \
             ON CONFLICT (\"id\") DO UPDATE SET \"name\" = EXCLUDED.\"name\" \
             WHERE \"tags\".\"deleted_at\" IS NULL"
        );
    }

    #[test]
    fn bulk_upsert_with_only_target_columns_touches_target() {
        let records = vec![record(json!({"id": 1}))];
        let builder =
            bulk_upsert_statement::<Tag>(&records, &BulkUpsertOptions::default()).unwrap();
        assert!(builder.sql().ends_with("DO UPDATE SET \"id\" = EXCLUDED.\"id\""));
    }

    #[test]
    fn bulk_upsert_empty_update_columns_updates_every_non_target_column() {
        let records = vec![record(json!({"id": 1, "name": "A", "active": true}))];
        let options = BulkUpsertOptions::default().update_columns(Vec::<String>::new());
        let builder = bulk_upsert_statement::<Tag>(&records, &options).unwrap();
        assert!(builder.sql().ends_with(
            "DO UPDATE SET \"name\" = EXCLUDED.\"name\", \"active\" = EXCLUDED.\"active\""
        ));
    }

    #[test]
    fn bulk_upsert_rejects_unknown_columns() {
        let records = vec![record(json!({"id": 1, "colour": "red"}))];
        let Err(err) = bulk_upsert_statement::<Tag>(&records, &BulkUpsertOptions::default()) else {
            panic!("unknown columns must be rejected");
        };
        assert_eq!(err.status(), 400);
    }
}
