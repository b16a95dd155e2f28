//! Password hashing and policy checks

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use twitter_config::PasswordPolicy;

use crate::error::IdentityFailure;

/// Argon2 hasher producing PHC strings.
#[derive(Debug, Clone, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    pub fn hash(&self, password: &str) -> Result<String, argon2::password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
        Ok(hash.to_string())
    }

    /// `Ok(false)` on mismatch; `Err` only when `hash` is not a PHC string.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
        let stored_hash = PasswordHash::new(hash)?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &stored_hash)
            .is_ok())
    }
}

#[derive(Debug, Clone)]
pub struct PasswordValidator {
    policy: PasswordPolicy,
}

impl PasswordValidator {
    pub fn new(policy: PasswordPolicy) -> Self {
        Self { policy }
    }

    /// Every rule the password breaks, in a stable order. Empty when valid.
    pub fn validate(&self, password: &str) -> Vec<IdentityFailure> {
        let mut failures = Vec::new();

        if password.chars().count() < self.policy.required_length {
            failures.push(IdentityFailure::password_too_short(
                self.policy.required_length,
            ));
        }
        if self.policy.require_non_alphanumeric && password.chars().all(|c| c.is_ascii_alphanumeric()) {
            failures.push(IdentityFailure::password_requires_non_alphanumeric());
        }
        if self.policy.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            failures.push(IdentityFailure::password_requires_digit());
        }
        if self.policy.require_lowercase && !password.chars().any(|c| c.is_ascii_lowercase()) {
            failures.push(IdentityFailure::password_requires_lower());
        }
        if self.policy.require_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
            failures.push(IdentityFailure::password_requires_upper());
        }

        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(failures: &[IdentityFailure]) -> Vec<&str> {
        failures.iter().map(|f| f.code.as_str()).collect()
    }

    #[test]
    fn hash_and_verify() {
        let hasher = PasswordHasher;
        let hash = hasher.hash("Secret1!").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(hasher.verify("Secret1!", &hash).unwrap());
        assert!(!hasher.verify("secret1!", &hash).unwrap());
        assert!(hasher.verify("Secret1!", "not-a-phc-string").is_err());
    }

    #[test]
    fn default_policy_reports_every_broken_rule() {
        let validator = PasswordValidator::new(PasswordPolicy::default());

        assert!(validator.validate("Secret1!").is_empty());
        assert_eq!(
            codes(&validator.validate("abc")),
            vec![
                "PasswordTooShort",
                "PasswordRequiresNonAlphanumeric",
                "PasswordRequiresDigit",
                "PasswordRequiresUpper",
            ]
        );
    }

    #[test]
    fn relaxed_policy_only_checks_length() {
        let validator = PasswordValidator::new(PasswordPolicy {
            required_length: 4,
            require_digit: false,
            require_lowercase: false,
            require_uppercase: false,
            require_non_alphanumeric: false,
        });

        assert!(validator.validate("abcd").is_empty());
        assert_eq!(codes(&validator.validate("abc")), vec!["PasswordTooShort"]);
    }
}
