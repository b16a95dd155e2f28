//! Error types for the account and social-graph services.

use thiserror::Error;
use twitter_database::{AppUser, DatabaseError};
use twitter_identity::{IdentityError, IdentityFailure};

#[derive(Debug, Error)]
pub enum UserError {
    #[error("validation failed: {}", describe(.0))]
    Validation(Vec<IdentityFailure>),

    /// The account exists; only issuing its session failed.
    #[error("user {} was registered but could not be signed in: {source}", .user.id)]
    RegisteredWithoutSession {
        user: Box<AppUser>,
        #[source]
        source: IdentityError,
    },

    #[error("storage error: {0}")]
    Storage(#[from] DatabaseError),

    #[error("identity error: {0}")]
    Identity(IdentityError),

    #[error("users cannot follow themselves")]
    SelfFollow,

    #[error("already following user {0}")]
    AlreadyFollowing(i64),

    #[error("user {0} not found")]
    UserNotFound(i64),

    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error("avatar storage failed: {0}")]
    AvatarIo(#[from] std::io::Error),
}

impl From<IdentityError> for UserError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Validation(failures) => Self::Validation(failures),
            IdentityError::Database(err) => Self::Storage(err),
            other => Self::Identity(other),
        }
    }
}

pub type UserResult<T> = Result<T, UserError>;

fn describe(failures: &[IdentityFailure]) -> String {
    failures
        .iter()
        .map(|failure| failure.description.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
