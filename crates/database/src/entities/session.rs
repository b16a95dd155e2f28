//! Session entity definitions

use serde::{Deserialize, Serialize};

use super::Entity;
use crate::types::SqlValue;

/// Server-side record of a signed-in user, looked up by its opaque token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuthSession {
    pub id: i64,
    pub user_id: i64,
    pub token: String,
    pub persistent: bool,
    pub created_at: String,
    pub expires_at: String,
}

impl Entity for AuthSession {
    const TABLE: &'static str = "sessions";
    const COLUMNS: &'static str = "id, user_id, token, persistent, created_at, expires_at";

    fn id(&self) -> i64 {
        self.id
    }

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("user_id", self.user_id.into()),
            ("token", self.token.clone().into()),
            ("persistent", self.persistent.into()),
            ("created_at", self.created_at.clone().into()),
            ("expires_at", self.expires_at.clone().into()),
        ]
    }
}
