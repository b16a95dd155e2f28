//! Shared types and result types for the database layer

pub mod errors;
pub mod values;

pub use errors::DatabaseError;
pub use values::SqlValue;

pub type DatabaseResult<T> = Result<T, DatabaseError>;
