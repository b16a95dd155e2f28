//! Follow edge entity

use serde::{Deserialize, Serialize};

use super::Entity;
use crate::types::SqlValue;

/// Directed edge: `follower_id` follows `following_id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Follow {
    pub id: i64,
    pub follower_id: i64,
    pub following_id: i64,
    pub created_at: String,
}

impl Entity for Follow {
    const TABLE: &'static str = "follows";
    const COLUMNS: &'static str = "id, follower_id, following_id, created_at";

    fn id(&self) -> i64 {
        self.id
    }

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("follower_id", self.follower_id.into()),
            ("following_id", self.following_id.into()),
            ("created_at", self.created_at.clone().into()),
        ]
    }
}
