//! Persisted entities and the table metadata the generic repository needs.

pub mod follow;
pub mod session;
pub mod tweet;
pub mod user;

use sqlx::sqlite::SqliteRow;
use sqlx::FromRow;

use crate::types::SqlValue;

pub use follow::Follow;
pub use session::AuthSession;
pub use tweet::{Like, Mention, Tweet};
pub use user::AppUser;

/// A row type stored in its own table with an integer primary key `id`.
pub trait Entity: for<'r> FromRow<'r, SqliteRow> + Send + Sync + Unpin {
    const TABLE: &'static str;
    /// Select list producing every field of the entity.
    const COLUMNS: &'static str;

    fn id(&self) -> i64;

    /// Writable columns and their current values, excluding `id`.
    fn values(&self) -> Vec<(&'static str, SqlValue)>;
}
