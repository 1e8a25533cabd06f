// src/presentation/http/middleware/process_time.rs
use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

pub const RESPONSE_TIME_HEADER: HeaderName = HeaderName::from_static("x-response-time");

/// Adds `X-Response-Time: 0.012 seconds` to every response.
pub async fn process_time(req: Request, next: Next) -> Response {
    let started = Instant::now();
    let mut response = next.run(req).await;

    let elapsed = started.elapsed().as_secs_f64();
    if let Ok(value) = HeaderValue::from_str(&format!("{elapsed:.3} seconds")) {
        response
            .headers_mut()
            .insert(RESPONSE_TIME_HEADER, value);
    }
    response
}
