use serde::Serialize;
use thiserror::Error;
use twitter_database::DatabaseError;

/// A single reason an identity operation was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityFailure {
    pub code: String,
    pub description: String,
}

impl IdentityFailure {
    fn new(code: &str, description: String) -> Self {
        Self {
            code: code.to_string(),
            description,
        }
    }

    pub fn invalid_user_name(user_name: &str) -> Self {
        Self::new(
            "InvalidUserName",
            format!("User name '{user_name}' is invalid, can only contain letters or digits."),
        )
    }

    pub fn duplicate_user_name(user_name: &str) -> Self {
        Self::new(
            "DuplicateUserName",
            format!("User name '{user_name}' is already taken."),
        )
    }

    pub fn invalid_email(email: &str) -> Self {
        Self::new("InvalidEmail", format!("Email '{email}' is invalid."))
    }

    pub fn duplicate_email(email: &str) -> Self {
        Self::new("DuplicateEmail", format!("Email '{email}' is already taken."))
    }

    pub fn password_too_short(length: usize) -> Self {
        Self::new(
            "PasswordTooShort",
            format!("Passwords must be at least {length} characters."),
        )
    }

    pub fn password_requires_digit() -> Self {
        Self::new(
            "PasswordRequiresDigit",
            "Passwords must have at least one digit ('0'-'9').".to_string(),
        )
    }

    pub fn password_requires_lower() -> Self {
        Self::new(
            "PasswordRequiresLower",
            "Passwords must have at least one lowercase ('a'-'z').".to_string(),
        )
    }

    pub fn password_requires_upper() -> Self {
        Self::new(
            "PasswordRequiresUpper",
            "Passwords must have at least one uppercase ('A'-'Z').".to_string(),
        )
    }

    pub fn password_requires_non_alphanumeric() -> Self {
        Self::new(
            "PasswordRequiresNonAlphanumeric",
            "Passwords must have at least one non alphanumeric character.".to_string(),
        )
    }
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity validation failed: {}", describe(.0))]
    Validation(Vec<IdentityFailure>),
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("password hashing failed: {0}")]
    PasswordHash(#[from] argon2::password_hash::Error),
    #[error("session not found")]
    SessionNotFound,
    #[error("session expired")]
    SessionExpired,
    #[error("invalid session token")]
    InvalidSession,
}

pub type IdentityResult<T> = Result<T, IdentityError>;

fn describe(failures: &[IdentityFailure]) -> String {
    failures
        .iter()
        .map(|failure| failure.code.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
