// src/presentation/http/openapi.rs
use axum::Router;
use serde::{Deserialize, Serialize};
use std::{env, fs::File, io::BufWriter, path::Path};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use super::response::{ErrorEntry, ErrorEnvelope, ErrorSource, Meta};

const DEFAULT_SNAPSHOT_PATH: &str = "spec/openapi.json";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub data: String,
}

impl HealthResponse {
    pub fn success() -> Self {
        Self {
            data: "success!".into(),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        super::routes::health_check,
        super::routes::database_health_check
    ),
    components(
        schemas(HealthResponse, ErrorEnvelope, ErrorEntry, ErrorSource, Meta)
    ),
    tags(
        (name = "System", description = "System level endpoints")
    ),
    info(
        title = "CRUD Scaffold API",
        description = "Generic CRUD backend with a uniform error envelope",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;

/// Swagger UI at `/api/docs` backed by `/api/openapi.json`, titled after the project.
pub fn docs_router(project_name: &str) -> Router {
    let mut doc = ApiDoc::openapi();
    doc.info.title = project_name.to_string();
    Router::new().merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", doc))
}

pub fn snapshot_path() -> String {
    env::var("OPENAPI_SNAPSHOT_PATH").unwrap_or_else(|_| DEFAULT_SNAPSHOT_PATH.to_string())
}

pub fn write_openapi_snapshot() -> std::io::Result<()> {
    let spec = ApiDoc::openapi();
    let output_path = snapshot_path();
    let path = Path::new(&output_path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &spec)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_health_endpoints_and_envelope() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        assert!(doc["paths"]["/health-check"].is_object());
        assert!(doc["paths"]["/health-check/database"].is_object());
        assert!(doc["components"]["schemas"]["ErrorEnvelope"].is_object());
    }
}
