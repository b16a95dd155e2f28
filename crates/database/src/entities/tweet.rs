//! Tweet, like and mention entities

use serde::{Deserialize, Serialize};

use super::Entity;
use crate::types::SqlValue;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tweet {
    pub id: i64,
    pub app_user_id: i64,
    pub text: String,
    pub image_path: Option<String>,
    pub created_at: String,
}

impl Entity for Tweet {
    const TABLE: &'static str = "tweets";
    const COLUMNS: &'static str = "id, app_user_id, text, image_path, created_at";

    fn id(&self) -> i64 {
        self.id
    }

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("app_user_id", self.app_user_id.into()),
            ("text", self.text.clone().into()),
            ("image_path", self.image_path.clone().into()),
            ("created_at", self.created_at.clone().into()),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Like {
    pub id: i64,
    pub app_user_id: i64,
    pub tweet_id: i64,
    pub created_at: String,
}

impl Entity for Like {
    const TABLE: &'static str = "likes";
    const COLUMNS: &'static str = "id, app_user_id, tweet_id, created_at";

    fn id(&self) -> i64 {
        self.id
    }

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("app_user_id", self.app_user_id.into()),
            ("tweet_id", self.tweet_id.into()),
            ("created_at", self.created_at.clone().into()),
        ]
    }
}

/// A user referenced from inside a tweet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Mention {
    pub id: i64,
    pub app_user_id: i64,
    pub tweet_id: i64,
    pub text: String,
    pub created_at: String,
}

impl Entity for Mention {
    const TABLE: &'static str = "mentions";
    const COLUMNS: &'static str = "id, app_user_id, tweet_id, text, created_at";

    fn id(&self) -> i64 {
        self.id
    }

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("app_user_id", self.app_user_id.into()),
            ("tweet_id", self.tweet_id.into()),
            ("text", self.text.clone().into()),
            ("created_at", self.created_at.clone().into()),
        ]
    }
}
