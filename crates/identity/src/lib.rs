//! Identity subsystem: account creation, credential checks and sessions.

use cuid2::CuidConstructor;
use once_cell::sync::Lazy;

pub mod error;
pub mod password;
pub mod sign_in;
pub mod user_manager;

pub use error::{IdentityError, IdentityFailure, IdentityResult};
pub use password::{PasswordHasher, PasswordValidator};
pub use sign_in::{Session, SignInManager, SignInOutcome};
pub use user_manager::{normalize, UserManager};

static CUID: Lazy<CuidConstructor> = Lazy::new(CuidConstructor::new);

/// Fresh opaque value for security and concurrency stamps.
pub fn new_stamp() -> String {
    CUID.create_id()
}
