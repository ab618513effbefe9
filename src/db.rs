//! Postgres connection factory
//!
//! Creates a new pool per call; the caller owns the pool lifecycle.

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

const MAX_CONNECTIONS: u32 = 5;

/// Connection properties of a loader block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresTarget {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

impl PostgresTarget {
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .database(&self.database)
    }
}

pub async fn create_pool(target: &PostgresTarget) -> Result<PgPool, sqlx::Error> {
    tracing::debug!(host = %target.host, port = target.port, database = %target.database, "Connecting to Postgres");
    PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect_with(target.connect_options())
        .await
}
