use crate::config::DatabaseSettings;
use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions},
};

pub async fn init_pool(settings: &DatabaseSettings) -> Result<PgPool, sqlx::Error> {
    let options = PgPoolOptions::new().max_connections(settings.max_connections());

    let pool = match settings.url() {
        Some(url) => options.connect(url).await?,
        None => {
            let connect = PgConnectOptions::new()
                .host(settings.host())
                .port(settings.port())
                .username(settings.user())
                .password(settings.password())
                .database(settings.database());
            options.connect_with(connect).await?
        }
    };

    Ok(pool)
}

/// Round-trips a trivial statement to prove the pool can reach the server.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
