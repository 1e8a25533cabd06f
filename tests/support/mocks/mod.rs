// tests/support/mocks/mod.rs
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod entity;
pub mod repos;
pub mod time;

pub use entity::{Widget, widget};
pub use repos::{FailingRepo, InMemoryWidgetRepo};
pub use time::{FixedClock, fixed_now};
