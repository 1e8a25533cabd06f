// src/presentation/http/middleware/request_context.rs
use axum::{extract::Request, middleware::Next, response::Response};

/// Path and method of the request being served on the current task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub path: String,
    pub method: String,
}

tokio::task_local! {
    static REQUEST_CONTEXT: RequestContext;
}

/// The context installed by [`request_context`], if any.
pub fn current() -> Option<RequestContext> {
    REQUEST_CONTEXT.try_with(RequestContext::clone).ok()
}

pub async fn request_context(req: Request, next: Next) -> Response {
    let context = RequestContext {
        path: req.uri().path().to_string(),
        method: req.method().to_string(),
    };
    REQUEST_CONTEXT.scope(context, next.run(req)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn context_is_visible_inside_scope_only() {
        assert!(current().is_none());

        let context = RequestContext {
            path: "/widgets".into(),
            method: "POST".into(),
        };
        let seen = REQUEST_CONTEXT.scope(context.clone(), async { current() }).await;
        assert_eq!(seen, Some(context));
    }
}
