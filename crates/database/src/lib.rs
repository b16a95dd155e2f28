//! Twitter Database Crate
//!
//! Connection management, migrations, entities and the generic repository /
//! unit of work used by the service layer.

use sqlx::SqlitePool;
use twitter_config::DatabaseConfig;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

pub use connection::{prepare_database, DatabaseConnection};
pub use migrations::run_migrations;

pub use entities::{AppUser, AuthSession, Entity, Follow, Like, Mention, Tweet};
pub use repos::{Include, Predicate, Projection, Repository, RowId, UnitOfWork};
pub use types::{DatabaseError, DatabaseResult, SqlValue};

/// Re-export commonly used types for convenience
pub use sqlx::SqlitePool as Pool;

/// Initialize the database with migrations
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;

    Ok(pool)
}

#[cfg(test)]
pub(crate) mod test_utils {
    use super::*;
    use tempfile::TempDir;

    pub async fn create_test_pool() -> (SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let config = DatabaseConfig {
            url: format!("sqlite:{}", db_path.display()),
            max_connections: 2,
            page_size: 10,
        };

        let pool = initialize_database(&config).await.unwrap();
        (pool, temp_dir)
    }

    pub fn new_user(user_name: &str) -> AppUser {
        AppUser {
            user_name: user_name.to_string(),
            normalized_user_name: user_name.to_uppercase(),
            name: user_name.to_string(),
            security_stamp: "stamp".to_string(),
            concurrency_stamp: format!("{user_name}-concurrency"),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
            ..Default::default()
        }
    }
}
