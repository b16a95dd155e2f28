//! Shared types for the users crate.

pub mod dtos;
pub mod errors;

pub use dtos::*;
pub use errors::{UserError, UserResult};
