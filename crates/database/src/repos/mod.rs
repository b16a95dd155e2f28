//! Generic data access over the entity tables

pub mod predicate;
pub mod repository;
pub mod unit_of_work;

pub use predicate::Predicate;
pub use repository::{Include, Projection, Repository, RowId};
pub use unit_of_work::UnitOfWork;
