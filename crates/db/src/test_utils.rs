//! Test utilities for database operations.
//!
//! Helpers for running the repository layer against a migrated Postgres
//! database. Unit tests use `MockDatabase` instead.

use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr, Statement};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use tracing::info;

/// Messaging tables, children first.
const TABLES: [&str; 5] = ["notice", "message", "offering_student", "offering", "user"];

/// Connection settings for the integration database, read from `TEST_DB_*`.
#[derive(Debug, Clone)]
pub struct TestDbConfig {
    /// Database host.
    pub host: String,
    /// Database port.
    pub port: u16,
    /// Database username.
    pub username: String,
    /// Database password.
    pub password: String,
    /// Database name.
    pub database: String,
}

impl Default for TestDbConfig {
    fn default() -> Self {
        let var = |key: &str, fallback: &str| std::env::var(key).unwrap_or_else(|_| fallback.to_string());
        Self {
            host: var("TEST_DB_HOST", "localhost"),
            port: std::env::var("TEST_DB_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5433),
            username: var("TEST_DB_USER", "campus_test"),
            password: var("TEST_DB_PASSWORD", "campus_test"),
            database: var("TEST_DB_NAME", "campus_test"),
        }
    }
}

impl TestDbConfig {
    /// Connection URL for the configured database.
    #[must_use]
    pub fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database
        )
    }
}

/// A migrated integration database shared by the repositories under test.
pub struct TestDatabase {
    conn: Arc<DatabaseConnection>,
}

impl TestDatabase {
    /// Connect with the `TEST_DB_*` settings and run all migrations.
    pub async fn new() -> Result<Self, DbErr> {
        Self::with_config(&TestDbConfig::default()).await
    }

    /// Connect with explicit settings and run all migrations.
    pub async fn with_config(config: &TestDbConfig) -> Result<Self, DbErr> {
        let conn = Database::connect(&config.database_url()).await?;
        crate::migrations::Migrator::up(&conn, None).await?;

        info!(database = %config.database, "Connected to test database");

        Ok(Self {
            conn: Arc::new(conn),
        })
    }

    /// Shared handle for building repositories.
    #[must_use]
    pub fn connection(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.conn)
    }

    /// Empty every messaging table, keeping the schema.
    pub async fn reset(&self) -> Result<(), DbErr> {
        let truncate = format!(
            "TRUNCATE TABLE {} CASCADE",
            TABLES.map(|t| format!("\"{t}\"")).join(", ")
        );
        self.conn
            .execute(Statement::from_string(DatabaseBackend::Postgres, truncate))
            .await?;

        info!("Reset test database");
        Ok(())
    }
}
