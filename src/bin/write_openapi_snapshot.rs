use anyhow::Result;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    crud_scaffold::presentation::http::openapi::write_openapi_snapshot()?;
    println!(
        "OpenAPI snapshot written to {}",
        crud_scaffold::presentation::http::openapi::snapshot_path()
    );
    Ok(())
}
