// src/application/ports/mod.rs
pub mod repository;
pub mod time;
