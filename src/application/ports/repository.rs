// src/application/ports/repository.rs
use crate::application::ApplicationResult;
use crate::domain::{
    entity::{Entity, Record},
    errors::DomainError,
    query::{BulkUpsertOptions, Changes, Filter},
};
use async_trait::async_trait;

/// Generic persistence for one entity type.
///
/// Each call is a single statement against the store; callers that need
/// several calls to be atomic own the surrounding transaction.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    /// Inserts `record` and returns it with generated columns filled in, or
    /// `None` when the store reported no inserted row.
    async fn create(&self, record: E) -> ApplicationResult<Option<E>>;

    async fn get_by_id(&self, id: i64) -> ApplicationResult<Option<E>>;

    async fn get_by_params(&self, filters: &[Filter]) -> ApplicationResult<Vec<E>>;

    async fn get_one_by_params(&self, filters: &[Filter]) -> ApplicationResult<Option<E>>;

    async fn get_all(&self) -> ApplicationResult<Vec<E>>;

    /// Applies the non-null entries of `changes` that name known columns.
    async fn update(&self, record: E, changes: Changes) -> ApplicationResult<E>;

    async fn delete_by_id(&self, id: i64) -> ApplicationResult<()>;

    /// Inserts `records` in one statement, resolving conflicts per `options`,
    /// and returns the requested columns of the affected rows.
    async fn bulk_upsert(
        &self,
        records: Vec<Record>,
        options: BulkUpsertOptions,
    ) -> ApplicationResult<Vec<Record>>;

    async fn update_by_id(&self, id: i64, changes: Changes) -> ApplicationResult<E> {
        let Some(record) = self.get_by_id(id).await? else {
            return Err(DomainError::not_found(E::NAME)
                .with_context_entry("id", id)
                .into());
        };
        self.update(record, changes).await
    }

    async fn delete(&self, record: &E) -> ApplicationResult<()> {
        let id = record.id().ok_or_else(|| {
            DomainError::bad_request(E::NAME)
                .with_detail(format!("cannot delete a {} without an id", E::NAME))
        })?;
        self.delete_by_id(id).await
    }
}
