pub mod constraint_messages;
pub mod database;
pub mod repositories;
pub mod time;
