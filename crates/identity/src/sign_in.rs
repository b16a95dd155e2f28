//! Password sign-in and token-backed sessions.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::Serialize;
use tracing::{debug, info};
use twitter_config::IdentityConfig;
use twitter_database::{AppUser, AuthSession, Predicate};

use crate::error::{IdentityError, IdentityResult};
use crate::user_manager::{expiry_after, UserManager};

/// Caller-held sign-in state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated {
        user_id: i64,
        user_name: String,
        token: String,
        persistent: bool,
    },
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    pub fn user_id(&self) -> Option<i64> {
        match self {
            Self::Authenticated { user_id, .. } => Some(*user_id),
            Self::Anonymous => None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Authenticated { token, .. } => Some(token),
            Self::Anonymous => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SignInOutcome {
    Succeeded,
    LockedOut,
    NotAllowed,
    Failed,
}

impl SignInOutcome {
    pub fn succeeded(self) -> bool {
        self == Self::Succeeded
    }
}

#[derive(Clone)]
pub struct SignInManager {
    users: UserManager,
    session_ttl_seconds: u64,
    require_confirmed_email: bool,
}

impl SignInManager {
    pub fn new(users: UserManager, config: &IdentityConfig) -> Self {
        Self {
            users,
            session_ttl_seconds: config.session_ttl_seconds,
            require_confirmed_email: config.require_confirmed_email,
        }
    }

    pub fn user_manager(&self) -> &UserManager {
        &self.users
    }

    /// Verify credentials and, on success, sign `session` in.
    pub async fn password_sign_in(
        &self,
        session: &mut Session,
        user_name: &str,
        password: &str,
        persistent: bool,
        lockout_on_failure: bool,
    ) -> IdentityResult<SignInOutcome> {
        let Some(mut user) = self.users.find_by_name(user_name).await? else {
            debug!(user_name, "sign-in for unknown user");
            return Ok(SignInOutcome::Failed);
        };

        let outcome = self
            .check_password_sign_in(&mut user, password, lockout_on_failure)
            .await?;

        if outcome.succeeded() {
            self.sign_in(session, &user, persistent).await?;
        } else {
            info!(user_id = user.id, ?outcome, "sign-in rejected");
        }

        Ok(outcome)
    }

    /// Credential and account-state checks without touching any session.
    pub async fn check_password_sign_in(
        &self,
        user: &mut AppUser,
        password: &str,
        lockout_on_failure: bool,
    ) -> IdentityResult<SignInOutcome> {
        if self.require_confirmed_email && !user.email_confirmed {
            return Ok(SignInOutcome::NotAllowed);
        }
        if self.users.is_locked_out(user) {
            return Ok(SignInOutcome::LockedOut);
        }

        if self.users.check_password(user, password)? {
            self.users.reset_access_failed_count(user).await?;
            return Ok(SignInOutcome::Succeeded);
        }

        if lockout_on_failure {
            self.users.access_failed(user).await?;
            if self.users.is_locked_out(user) {
                return Ok(SignInOutcome::LockedOut);
            }
        }

        Ok(SignInOutcome::Failed)
    }

    /// Issue a fresh token for `user` and mark `session` authenticated. Any
    /// token the session already held is revoked first.
    pub async fn sign_in(
        &self,
        session: &mut Session,
        user: &AppUser,
        persistent: bool,
    ) -> IdentityResult<()> {
        if session.is_authenticated() {
            self.sign_out(session).await?;
        }

        let token = generate_session_token();
        let now = Utc::now();
        let expires_at = expiry_after(now, self.session_ttl_seconds);

        self.users
            .unit_of_work()
            .sessions()
            .add(&AuthSession {
                user_id: user.id,
                token: token.clone(),
                persistent,
                created_at: now.to_rfc3339(),
                expires_at: expires_at.to_rfc3339(),
                ..Default::default()
            })
            .await?;

        *session = Session::Authenticated {
            user_id: user.id,
            user_name: user.user_name.clone(),
            token,
            persistent,
        };

        info!(user_id = user.id, persistent, "user signed in");
        Ok(())
    }

    /// Revoke the session's token and make it anonymous.
    pub async fn sign_out(&self, session: &mut Session) -> IdentityResult<()> {
        if let Session::Authenticated { user_id, token, .. } = session {
            self.users
                .unit_of_work()
                .sessions()
                .delete_where(&Predicate::eq("token", token.as_str()))
                .await?;
            info!(user_id = *user_id, "user signed out");
        }

        *session = Session::Anonymous;
        Ok(())
    }

    /// Resolve a token to its user. Expired tokens are deleted.
    pub async fn authenticate_token(&self, token: &str) -> IdentityResult<(AppUser, Session)> {
        let sessions = self.users.unit_of_work().sessions();
        let Some(stored) = sessions.find_first(&Predicate::eq("token", token)).await? else {
            return Err(IdentityError::SessionNotFound);
        };

        let expires_at = DateTime::parse_from_rfc3339(&stored.expires_at)
            .map_err(|_| IdentityError::InvalidSession)?
            .with_timezone(&Utc);

        if expires_at <= Utc::now() {
            sessions.delete(stored.id).await?;
            return Err(IdentityError::SessionExpired);
        }

        let user = self
            .users
            .find_by_id(stored.user_id)
            .await?
            .ok_or(IdentityError::SessionNotFound)?;

        let session = Session::Authenticated {
            user_id: user.id,
            user_name: user.user_name.clone(),
            token: stored.token,
            persistent: stored.persistent,
        };

        Ok((user, session))
    }
}

fn generate_session_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
