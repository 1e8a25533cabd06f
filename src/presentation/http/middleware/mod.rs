pub mod process_time;
pub mod request_context;

pub use process_time::process_time;
pub use request_context::request_context;
