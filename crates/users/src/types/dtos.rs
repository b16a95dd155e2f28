//! Request and response shapes exchanged with callers.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use twitter_database::{AppUser, Include, Projection};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegisterDto {
    pub user_name: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginDto {
    pub user_name: String,
    #[serde(skip_serializing)]
    pub password: String,
}

/// Profile patch: only fields that are `Some` are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditProfileDto {
    pub id: i64,
    pub user_name: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub image_path: Option<String>,
    /// Raw uploaded avatar, any format the image decoder understands.
    #[serde(skip)]
    pub image: Option<Bytes>,
}

impl EditProfileDto {
    /// Whether the patch carries anything to apply.
    pub fn is_empty(&self) -> bool {
        self.user_name.is_none()
            && self.name.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.image.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProfileSummaryDto {
    pub user_name: String,
    pub name: String,
    pub image_path: Option<String>,
    pub tweet_count: i64,
    pub follower_count: i64,
    pub following_count: i64,
}

impl Projection<AppUser> for ProfileSummaryDto {
    const SELECT: &'static str = "t.user_name, t.name, t.image_path, \
        (SELECT COUNT(*) FROM tweets tw WHERE tw.app_user_id = t.id) AS tweet_count, \
        (SELECT COUNT(*) FROM follows fr WHERE fr.following_id = t.id) AS follower_count, \
        (SELECT COUNT(*) FROM follows fg WHERE fg.follower_id = t.id) AS following_count";
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowDto {
    pub follower_id: i64,
    pub following_id: i64,
}

/// One row of a follower/following listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FollowListVm {
    pub id: i64,
    pub user_name: String,
    pub name: String,
    pub image_path: Option<String>,
    /// Ids of the users following this row's user.
    #[sqlx(skip)]
    pub follows: Vec<i64>,
}

impl Projection<AppUser> for FollowListVm {
    const SELECT: &'static str = "t.id, t.user_name, t.name, t.image_path";

    fn row_id(&self) -> Option<i64> {
        Some(self.id)
    }

    fn attach(&mut self, include: Include, ids: Vec<i64>) {
        if include == Include::Followers {
            self.follows = ids;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeDto {
    pub app_user_id: i64,
    pub tweet_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddTweetDto {
    pub app_user_id: i64,
    pub text: String,
    pub image_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddMentionDto {
    pub app_user_id: i64,
    pub tweet_id: i64,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_patch_detection_ignores_id_and_image_path() {
        let patch = EditProfileDto {
            id: 7,
            image_path: Some("/images/users/a.jpg".to_string()),
            ..Default::default()
        };
        assert!(patch.is_empty());

        let patch = EditProfileDto {
            name: Some("Alice".to_string()),
            ..patch
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn secrets_are_not_serialized() {
        let login = LoginDto {
            user_name: "alice".to_string(),
            password: "Secret1!".to_string(),
        };
        let json = serde_json::to_value(&login).unwrap();
        assert_eq!(json, serde_json::json!({ "user_name": "alice" }));
    }
}
