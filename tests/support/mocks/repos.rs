// tests/support/mocks/repos.rs
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use crud_scaffold::application::{ApplicationError, ApplicationResult, ports::repository::Repository};
use crud_scaffold::domain::{
    AuditFields, BulkUpsertOptions, Changes, DomainError, FieldChange, Filter, FilterOp, Record,
};
use serde_json::Value;

use super::entity::Widget;

/// Widget store backed by a map; supports equality filters only.
#[derive(Default)]
pub struct InMemoryWidgetRepo {
    rows: Mutex<BTreeMap<i64, Widget>>,
    next_id: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub deleted: Mutex<Vec<i64>>,
    create_returns_none: bool,
}

impl InMemoryWidgetRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose `create` reports that no row was inserted.
    pub fn returning_none_on_create() -> Self {
        Self {
            create_returns_none: true,
            ..Self::default()
        }
    }

    pub fn with_rows(rows: impl IntoIterator<Item = Widget>) -> Self {
        let repo = Self::new();
        {
            let mut map = repo.rows.lock().unwrap();
            for row in rows {
                let id = row.id().expect("seeded widgets need an id");
                map.insert(id, row);
            }
        }
        let max = repo.rows.lock().unwrap().keys().max().copied().unwrap_or(0);
        repo.next_id.store(max as usize, Ordering::SeqCst);
        repo
    }

    pub fn rows(&self) -> Vec<Widget> {
        self.rows.lock().unwrap().values().cloned().collect()
    }

    fn matches(widget: &Widget, filters: &[Filter]) -> bool {
        let value = serde_json::to_value(widget).unwrap();
        filters.iter().all(|filter| {
            let field = value.get(&filter.column).cloned().unwrap_or(Value::Null);
            match filter.op {
                FilterOp::Eq => loosely_equal(&field, &filter.value),
                FilterOp::Ne => !loosely_equal(&field, &filter.value),
                FilterOp::IsNull => field.is_null(),
                FilterOp::IsNotNull => !field.is_null(),
                _ => false,
            }
        })
    }
}

/// Query-string filters arrive as strings, so compare on rendered text too.
fn loosely_equal(field: &Value, expected: &Value) -> bool {
    match (field, expected) {
        (Value::String(a), Value::String(b)) => a == b,
        (other, Value::String(b)) => other.to_string() == *b,
        (a, b) => a == b,
    }
}

#[async_trait]
impl Repository<Widget> for InMemoryWidgetRepo {
    async fn create(&self, mut record: Widget) -> ApplicationResult<Option<Widget>> {
        if self.create_returns_none {
            return Ok(None);
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1;
        record.audit_mut().id = Some(id);
        self.rows.lock().unwrap().insert(id, record.clone());
        Ok(Some(record))
    }

    async fn get_by_id(&self, id: i64) -> ApplicationResult<Option<Widget>> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn get_by_params(&self, filters: &[Filter]) -> ApplicationResult<Vec<Widget>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|widget| Self::matches(widget, filters))
            .cloned()
            .collect())
    }

    async fn get_one_by_params(&self, filters: &[Filter]) -> ApplicationResult<Option<Widget>> {
        Ok(self.get_by_params(filters).await?.into_iter().next())
    }

    async fn get_all(&self) -> ApplicationResult<Vec<Widget>> {
        self.get_by_params(&[]).await
    }

    async fn update(&self, record: Widget, changes: Changes) -> ApplicationResult<Widget> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        let id = record.id().ok_or_else(|| DomainError::bad_request("Widget"))?;

        let mut value = serde_json::to_value(&record).unwrap();
        let object = value.as_object_mut().unwrap();
        for (column, change) in changes.effective() {
            if !object.contains_key(column) {
                continue;
            }
            let next = match change {
                FieldChange::Set(value) => value.clone(),
                FieldChange::Clear => Value::Null,
            };
            object.insert(column.to_string(), next);
        }

        let updated: Widget = serde_json::from_value(value)
            .map_err(|err| DomainError::unprocessable_entity("Widget").with_detail(err.to_string()))?;
        self.rows.lock().unwrap().insert(id, updated.clone());
        Ok(updated)
    }

    async fn delete_by_id(&self, id: i64) -> ApplicationResult<()> {
        self.deleted.lock().unwrap().push(id);
        self.rows.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn bulk_upsert(
        &self,
        records: Vec<Record>,
        options: BulkUpsertOptions,
    ) -> ApplicationResult<Vec<Record>> {
        let returning = options.returning_columns.unwrap_or_default();
        Ok(records
            .into_iter()
            .map(|record| {
                record
                    .into_iter()
                    .filter(|(column, _)| returning.contains(column))
                    .collect::<Record>()
            })
            .filter(|record| !record.is_empty())
            .collect())
    }
}

/// Repository whose every call fails with an error built by `make`.
pub struct FailingRepo {
    make: fn() -> ApplicationError,
}

impl FailingRepo {
    pub fn new(make: fn() -> ApplicationError) -> Self {
        Self { make }
    }

    fn fail<T>(&self) -> ApplicationResult<T> {
        Err((self.make)())
    }
}

#[async_trait]
impl Repository<Widget> for FailingRepo {
    async fn create(&self, _record: Widget) -> ApplicationResult<Option<Widget>> {
        self.fail()
    }

    async fn get_by_id(&self, _id: i64) -> ApplicationResult<Option<Widget>> {
        self.fail()
    }

    async fn get_by_params(&self, _filters: &[Filter]) -> ApplicationResult<Vec<Widget>> {
        self.fail()
    }

    async fn get_one_by_params(&self, _filters: &[Filter]) -> ApplicationResult<Option<Widget>> {
        self.fail()
    }

    async fn get_all(&self) -> ApplicationResult<Vec<Widget>> {
        self.fail()
    }

    async fn update(&self, _record: Widget, _changes: Changes) -> ApplicationResult<Widget> {
        self.fail()
    }

    async fn delete_by_id(&self, _id: i64) -> ApplicationResult<()> {
        self.fail()
    }

    async fn bulk_upsert(
        &self,
        _records: Vec<Record>,
        _options: BulkUpsertOptions,
    ) -> ApplicationResult<Vec<Record>> {
        self.fail()
    }
}
