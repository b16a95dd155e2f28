//! Account persistence with validation, normalization and lockout tracking.

use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};
use twitter_config::{IdentityConfig, LockoutConfig};
use twitter_database::{AppUser, DatabaseError, Predicate, UnitOfWork};

use crate::error::{IdentityError, IdentityFailure, IdentityResult};
use crate::new_stamp;
use crate::password::{PasswordHasher, PasswordValidator};

static USER_NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9\-._@+]+$").expect("invalid user name pattern")
});

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+$").expect("invalid email pattern"));

/// Lookup key for user names and emails.
pub fn normalize(value: &str) -> String {
    value.to_uppercase()
}

#[derive(Clone)]
pub struct UserManager {
    uow: UnitOfWork,
    hasher: PasswordHasher,
    validator: PasswordValidator,
    require_unique_email: bool,
    lockout: LockoutConfig,
}

impl UserManager {
    pub fn new(uow: UnitOfWork, config: &IdentityConfig) -> Self {
        Self {
            uow,
            hasher: PasswordHasher,
            validator: PasswordValidator::new(config.password.clone()),
            require_unique_email: config.require_unique_email,
            lockout: config.lockout.clone(),
        }
    }

    pub fn unit_of_work(&self) -> &UnitOfWork {
        &self.uow
    }

    /// Validate and persist a new account with a hashed password.
    ///
    /// Every failed rule is reported at once in `IdentityError::Validation`;
    /// nothing is written in that case.
    pub async fn create(&self, mut user: AppUser, password: &str) -> IdentityResult<AppUser> {
        let mut failures = self.validate_user(&user).await?;
        failures.extend(self.validate_password(password));
        if !failures.is_empty() {
            debug!(user_name = %user.user_name, failures = failures.len(), "rejected new user");
            return Err(IdentityError::Validation(failures));
        }

        let now = Utc::now().to_rfc3339();
        user.password_hash = Some(self.hash_password(password)?);
        user.security_stamp = new_stamp();
        user.concurrency_stamp = new_stamp();
        user.created_at = now.clone();
        user.updated_at = now;
        normalize_user(&mut user);

        user.id = match self.uow.app_users().add(&user).await {
            Ok(id) => id,
            // Lost a race with a concurrent registration of the same name.
            Err(DatabaseError::Duplicate(_)) => {
                return Err(IdentityError::Validation(vec![
                    IdentityFailure::duplicate_user_name(&user.user_name),
                ]))
            }
            Err(err) => return Err(err.into()),
        };

        info!(user_id = user.id, user_name = %user.user_name, "created user");
        Ok(user)
    }

    pub async fn find_by_id(&self, id: i64) -> IdentityResult<Option<AppUser>> {
        Ok(self.uow.app_users().get_by_id(id).await?)
    }

    /// Case-insensitive lookup by user name.
    pub async fn find_by_name(&self, user_name: &str) -> IdentityResult<Option<AppUser>> {
        let predicate = Predicate::eq("normalized_user_name", normalize(user_name));
        Ok(self.uow.app_users().find_first(&predicate).await?)
    }

    /// Case-insensitive lookup by email.
    pub async fn find_by_email(&self, email: &str) -> IdentityResult<Option<AppUser>> {
        let predicate = Predicate::eq("normalized_email", normalize(email));
        Ok(self.uow.app_users().find_first(&predicate).await?)
    }

    /// Change the user name in memory; persisted by the next `update`.
    pub fn set_user_name(&self, user: &mut AppUser, user_name: &str) {
        user.user_name = user_name.to_string();
        user.normalized_user_name = normalize(user_name);
        user.security_stamp = new_stamp();
    }

    /// Change the email in memory and mark it unconfirmed; persisted by the
    /// next `update`.
    pub fn set_email(&self, user: &mut AppUser, email: &str) {
        user.email = Some(email.to_string());
        user.normalized_email = Some(normalize(email));
        user.email_confirmed = false;
        user.security_stamp = new_stamp();
    }

    pub fn validate_password(&self, password: &str) -> Vec<IdentityFailure> {
        self.validator.validate(password)
    }

    pub fn hash_password(&self, password: &str) -> IdentityResult<String> {
        Ok(self.hasher.hash(password)?)
    }

    pub fn check_password(&self, user: &AppUser, password: &str) -> IdentityResult<bool> {
        let Some(hash) = user.password_hash.as_deref() else {
            return Ok(false);
        };
        Ok(self.hasher.verify(password, hash)?)
    }

    /// Validate and persist `user`, refreshing its concurrency stamp.
    ///
    /// Fails with `DatabaseError::ConcurrencyConflict` when the stored row was
    /// changed since `user` was loaded.
    pub async fn update(&self, user: &mut AppUser) -> IdentityResult<()> {
        let failures = self.validate_user(user).await?;
        if !failures.is_empty() {
            return Err(IdentityError::Validation(failures));
        }

        normalize_user(user);
        let expected_stamp = std::mem::replace(&mut user.concurrency_stamp, new_stamp());
        user.updated_at = Utc::now().to_rfc3339();

        let guard = Predicate::eq("concurrency_stamp", expected_stamp.clone());
        if let Err(err) = self.uow.app_users().update_where(user, &guard).await {
            user.concurrency_stamp = expected_stamp;
            warn!(user_id = user.id, error = %err, "failed to update user");
            return Err(err.into());
        }

        debug!(user_id = user.id, "updated user");
        Ok(())
    }

    pub fn is_locked_out(&self, user: &AppUser) -> bool {
        user.lockout_end
            .as_deref()
            .and_then(|end| DateTime::parse_from_rfc3339(end).ok())
            .is_some_and(|end| end.with_timezone(&Utc) > Utc::now())
    }

    /// Record a failed sign-in; locks the account once the configured number
    /// of consecutive failures is reached.
    pub async fn access_failed(&self, user: &mut AppUser) -> IdentityResult<()> {
        user.access_failed_count += 1;

        if user.access_failed_count >= i64::from(self.lockout.max_failed_access_attempts) {
            let end = expiry_after(Utc::now(), self.lockout.lockout_seconds);
            user.lockout_end = Some(end.to_rfc3339());
            user.access_failed_count = 0;
            info!(user_id = user.id, lockout_end = %end, "user locked out");
        }

        self.update(user).await
    }

    pub async fn reset_access_failed_count(&self, user: &mut AppUser) -> IdentityResult<()> {
        if user.access_failed_count == 0 {
            return Ok(());
        }
        user.access_failed_count = 0;
        self.update(user).await
    }

    /// Why `user_name` cannot be given to account `user_id`, if at all.
    pub async fn check_user_name(
        &self,
        user_id: i64,
        user_name: &str,
    ) -> IdentityResult<Option<IdentityFailure>> {
        if !USER_NAME_PATTERN.is_match(user_name) {
            return Ok(Some(IdentityFailure::invalid_user_name(user_name)));
        }
        let taken = self
            .find_by_name(user_name)
            .await?
            .is_some_and(|owner| owner.id != user_id);
        Ok(taken.then(|| IdentityFailure::duplicate_user_name(user_name)))
    }

    /// Why `email` cannot be given to account `user_id`, if at all. Emails
    /// are only checked when unique emails are required.
    pub async fn check_email(
        &self,
        user_id: i64,
        email: &str,
    ) -> IdentityResult<Option<IdentityFailure>> {
        if !self.require_unique_email {
            return Ok(None);
        }
        if !EMAIL_PATTERN.is_match(email) {
            return Ok(Some(IdentityFailure::invalid_email(email)));
        }
        let taken = self
            .find_by_email(email)
            .await?
            .is_some_and(|owner| owner.id != user_id);
        Ok(taken.then(|| IdentityFailure::duplicate_email(email)))
    }

    async fn validate_user(&self, user: &AppUser) -> IdentityResult<Vec<IdentityFailure>> {
        let mut failures = Vec::new();
        failures.extend(self.check_user_name(user.id, &user.user_name).await?);
        failures.extend(
            self.check_email(user.id, user.email.as_deref().unwrap_or_default())
                .await?,
        );
        Ok(failures)
    }
}

fn normalize_user(user: &mut AppUser) {
    user.normalized_user_name = normalize(&user.user_name);
    user.normalized_email = user.email.as_deref().map(normalize);
}

/// 9999-12-31T23:59:59Z, the last instant RFC 3339 can represent.
const LATEST_TIMESTAMP: i64 = 253_402_300_799;

/// Keeps `chrono::Duration::seconds` within its representable range.
fn clamp_seconds(seconds: u64) -> i64 {
    const MAX_SECONDS: i64 = i64::MAX / 1_000;
    i64::try_from(seconds).map_or(MAX_SECONDS, |value| value.min(MAX_SECONDS))
}

/// `from + seconds`, saturating at the last instant that still round-trips
/// through `to_rfc3339` / `parse_from_rfc3339`.
pub(crate) fn expiry_after(from: DateTime<Utc>, seconds: u64) -> DateTime<Utc> {
    let latest = DateTime::<Utc>::from_timestamp(LATEST_TIMESTAMP, 0).unwrap_or(from);
    from.checked_add_signed(Duration::seconds(clamp_seconds(seconds)))
        .map_or(latest, |end| end.min(latest))
}
