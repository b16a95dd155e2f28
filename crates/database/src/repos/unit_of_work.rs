//! Aggregates the per-entity repositories over one pool.

use sqlx::SqlitePool;
use tracing::debug;
use twitter_config::DatabaseConfig;

use super::repository::Repository;
use crate::entities::{AppUser, AuthSession, Follow, Like, Mention, Tweet};
use crate::types::values::to_arguments;
use crate::types::{DatabaseResult, SqlValue};

/// Entry point to storage. Cheap to clone; every call commits on its own.
#[derive(Debug, Clone)]
pub struct UnitOfWork {
    pool: SqlitePool,
    page_size: u32,
}

impl UnitOfWork {
    pub fn new(pool: SqlitePool, page_size: u32) -> Self {
        Self {
            pool,
            page_size: page_size.max(1),
        }
    }

    pub fn from_config(pool: SqlitePool, config: &DatabaseConfig) -> Self {
        Self::new(pool, config.page_size)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn app_users(&self) -> Repository<AppUser> {
        self.repository()
    }

    pub fn follows(&self) -> Repository<Follow> {
        self.repository()
    }

    pub fn tweets(&self) -> Repository<Tweet> {
        self.repository()
    }

    pub fn likes(&self) -> Repository<Like> {
        self.repository()
    }

    pub fn mentions(&self) -> Repository<Mention> {
        self.repository()
    }

    pub fn sessions(&self) -> Repository<AuthSession> {
        self.repository()
    }

    fn repository<E: crate::entities::Entity>(&self) -> Repository<E> {
        Repository::new(self.pool.clone(), self.page_size)
    }

    /// Run a raw statement with positional parameters and return the number
    /// of affected rows. Parameters are bound, never interpolated.
    pub async fn execute_sql_raw(
        &self,
        statement: &str,
        parameters: &[SqlValue],
    ) -> DatabaseResult<u64> {
        debug!(statement, parameters = parameters.len(), "executing raw statement");
        let result = sqlx::query_with(statement, to_arguments(parameters))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
