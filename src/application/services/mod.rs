// src/application/services/mod.rs
use std::sync::Arc;

use crate::{
    application::{
        ApplicationResult,
        ports::{repository::Repository, time::Clock},
    },
    domain::{
        entity::{Entity, Record},
        errors::DomainError,
        query::{BulkUpsertOptions, Changes, Filter},
    },
};

/// Orchestration over one entity's repository.
///
/// The base service only stamps creation time and turns an empty insert into
/// a bad request; everything else is delegated. Entity-specific rules wrap or
/// replace it.
pub struct CrudService<E: Entity> {
    repository: Arc<dyn Repository<E>>,
    clock: Arc<dyn Clock>,
}

impl<E: Entity> Clone for CrudService<E> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<E: Entity> CrudService<E> {
    pub fn new(repository: Arc<dyn Repository<E>>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub async fn create(&self, mut record: E) -> ApplicationResult<E> {
        if E::TRACKS_CREATED_AT {
            record.set_created_at(self.clock.now());
        }

        self.repository.create(record).await?.ok_or_else(|| {
            DomainError::bad_request(E::NAME)
                .with_detail(format!("{} could not be created", E::NAME))
                .into()
        })
    }

    pub async fn get_by_id(&self, id: i64) -> ApplicationResult<Option<E>> {
        self.repository.get_by_id(id).await
    }

    pub async fn get_by_params(&self, filters: &[Filter]) -> ApplicationResult<Vec<E>> {
        self.repository.get_by_params(filters).await
    }

    pub async fn get_one_by_params(&self, filters: &[Filter]) -> ApplicationResult<Option<E>> {
        self.repository.get_one_by_params(filters).await
    }

    pub async fn get_all(&self) -> ApplicationResult<Vec<E>> {
        self.repository.get_all().await
    }

    pub async fn update(&self, record: E, changes: Changes) -> ApplicationResult<E> {
        self.repository.update(record, changes).await
    }

    pub async fn update_by_id(&self, id: i64, changes: Changes) -> ApplicationResult<E> {
        self.repository.update_by_id(id, changes).await
    }

    pub async fn delete(&self, record: &E) -> ApplicationResult<()> {
        self.repository.delete(record).await
    }

    pub async fn delete_by_id(&self, id: i64) -> ApplicationResult<()> {
        self.repository.delete_by_id(id).await
    }

    pub async fn bulk_upsert(
        &self,
        records: Vec<Record>,
        options: BulkUpsertOptions,
    ) -> ApplicationResult<Vec<Record>> {
        self.repository.bulk_upsert(records, options).await
    }
}
