//! Connection pool setup, mirroring the teacher's lazy-pool-with-migrate
//! pattern for its own Postgres-backed crates.

use labelforge_core::{LabelError, LabelResult};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub async fn connect(database_url: &str) -> LabelResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .map_err(|e| LabelError::Database(format!("failed to connect: {e}")))?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| LabelError::Database(format!("failed to run migrations: {e}")))?;

    Ok(pool)
}
