//! Application user entity

use serde::{Deserialize, Serialize};

use super::Entity;
use crate::types::SqlValue;

/// Registered account, the root aggregate of the social graph.
///
/// Tweets, followers and followings reference a user by id; they are loaded
/// through filtered queries rather than held on the struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AppUser {
    pub id: i64,
    pub user_name: String,
    pub normalized_user_name: String,
    pub email: Option<String>,
    pub normalized_email: Option<String>,
    pub email_confirmed: bool,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub image_path: Option<String>,
    #[serde(skip_serializing)]
    pub security_stamp: String,
    pub concurrency_stamp: String,
    pub access_failed_count: i64,
    pub lockout_end: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Entity for AppUser {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static str = "id, user_name, normalized_user_name, email, normalized_email, email_confirmed, name, password_hash, image_path, security_stamp, concurrency_stamp, access_failed_count, lockout_end, created_at, updated_at";

    fn id(&self) -> i64 {
        self.id
    }

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("user_name", self.user_name.clone().into()),
            ("normalized_user_name", self.normalized_user_name.clone().into()),
            ("email", self.email.clone().into()),
            ("normalized_email", self.normalized_email.clone().into()),
            ("email_confirmed", self.email_confirmed.into()),
            ("name", self.name.clone().into()),
            ("password_hash", self.password_hash.clone().into()),
            ("image_path", self.image_path.clone().into()),
            ("security_stamp", self.security_stamp.clone().into()),
            ("concurrency_stamp", self.concurrency_stamp.clone().into()),
            ("access_failed_count", self.access_failed_count.into()),
            ("lockout_end", self.lockout_end.clone().into()),
            ("created_at", self.created_at.clone().into()),
            ("updated_at", self.updated_at.clone().into()),
        ]
    }
}
