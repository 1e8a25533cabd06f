// src/presentation/http/controllers/crud.rs
//! Generic REST endpoints for any entity managed by a [`CrudService`].
use crate::application::services::CrudService;
use crate::domain::{
    entity::{Entity, Record},
    errors::DomainError,
    query::{BulkUpsertOptions, Changes, Filter},
};
use crate::presentation::http::error::{HttpError, HttpResult};
use crate::presentation::http::extractors::{ApiJson, ApiPath, ApiQuery};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use std::collections::BTreeMap;

/// Body of `POST /bulk-upsert`: the rows plus the upsert options, flattened.
#[derive(Debug, Deserialize)]
pub struct BulkUpsertRequest {
    pub data: Vec<Record>,
    #[serde(flatten)]
    pub options: BulkUpsertOptions,
}

/// `POST /`, `GET /`, `GET|PATCH|DELETE /{id}` and `POST /bulk-upsert` for `E`.
///
/// `GET /` turns every query-string pair into an equality filter.
pub fn crud_router<E>(service: CrudService<E>) -> Router
where
    E: Entity + DeserializeOwned,
{
    Router::new()
        .route("/", post(create::<E>).get(list::<E>))
        .route("/bulk-upsert", post(bulk_upsert::<E>))
        .route(
            "/{id}",
            get(show::<E>).patch(update::<E>).delete(destroy::<E>),
        )
        .with_state(service)
}

async fn create<E>(
    State(service): State<CrudService<E>>,
    ApiJson(record): ApiJson<E>,
) -> HttpResult<(StatusCode, ApiJson<E>)>
where
    E: Entity + DeserializeOwned,
{
    let created = service.create(record).await?;
    Ok((StatusCode::CREATED, ApiJson(created)))
}

async fn list<E>(
    State(service): State<CrudService<E>>,
    ApiQuery(params): ApiQuery<BTreeMap<String, String>>,
) -> HttpResult<ApiJson<Vec<E>>>
where
    E: Entity + DeserializeOwned,
{
    let filters: Vec<Filter> = params
        .into_iter()
        .map(|(column, value)| Filter::eq(column, Value::String(value)))
        .collect();
    let records = service.get_by_params(&filters).await?;
    Ok(ApiJson(records))
}

async fn show<E>(
    State(service): State<CrudService<E>>,
    ApiPath(id): ApiPath<i64>,
) -> HttpResult<ApiJson<E>>
where
    E: Entity + DeserializeOwned,
{
    let Some(record) = service.get_by_id(id).await? else {
        return Err(HttpError::from(
            DomainError::not_found(E::NAME).with_context_entry("id", id),
        ));
    };
    Ok(ApiJson(record))
}

async fn update<E>(
    State(service): State<CrudService<E>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(changes): ApiJson<serde_json::Map<String, Value>>,
) -> HttpResult<ApiJson<E>>
where
    E: Entity + DeserializeOwned,
{
    let updated = service.update_by_id(id, Changes::from(changes)).await?;
    Ok(ApiJson(updated))
}

async fn destroy<E>(
    State(service): State<CrudService<E>>,
    ApiPath(id): ApiPath<i64>,
) -> HttpResult<StatusCode>
where
    E: Entity + DeserializeOwned,
{
    service.delete_by_id(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn bulk_upsert<E>(
    State(service): State<CrudService<E>>,
    ApiJson(request): ApiJson<BulkUpsertRequest>,
) -> HttpResult<ApiJson<Vec<Record>>>
where
    E: Entity + DeserializeOwned,
{
    let rows = service.bulk_upsert(request.data, request.options).await?;
    Ok(ApiJson(rows))
}
