// src/presentation/http/state.rs
use sqlx::PgPool;

#[derive(Clone)]
pub struct HttpState {
    pub db_pool: PgPool,
}
