// src/application/ports/time.rs
use chrono::{DateTime, Utc};

/// Source of the timestamps the service writes into audit columns.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
