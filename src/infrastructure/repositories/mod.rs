// src/infrastructure/repositories/mod.rs
mod error;
mod postgres;
mod sql;

pub use error::{driver_text, map_delete_sqlx, map_sqlx, sqlstate_class_name};
pub use postgres::PgRepository;
