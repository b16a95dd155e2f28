//! Entity <-> DTO conversions.
//!
//! Fields correspond by name. Target fields with no counterpart keep their
//! `Default`, so no conversion can fail.

use twitter_database::{AppUser, Follow, Like, Mention, Tweet};

use crate::types::{
    AddMentionDto, AddTweetDto, EditProfileDto, FollowDto, LikeDto, LoginDto, ProfileSummaryDto,
    RegisterDto,
};

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

impl From<AppUser> for RegisterDto {
    fn from(user: AppUser) -> Self {
        Self {
            user_name: user.user_name,
            email: user.email.unwrap_or_default(),
            name: user.name,
            password: String::new(),
        }
    }
}

impl From<RegisterDto> for AppUser {
    fn from(dto: RegisterDto) -> Self {
        Self {
            user_name: dto.user_name,
            email: non_empty(dto.email),
            name: dto.name,
            ..Default::default()
        }
    }
}

impl From<AppUser> for LoginDto {
    fn from(user: AppUser) -> Self {
        Self {
            user_name: user.user_name,
            password: String::new(),
        }
    }
}

impl From<LoginDto> for AppUser {
    fn from(dto: LoginDto) -> Self {
        Self {
            user_name: dto.user_name,
            ..Default::default()
        }
    }
}

impl From<AppUser> for EditProfileDto {
    fn from(user: AppUser) -> Self {
        Self {
            id: user.id,
            user_name: Some(user.user_name),
            name: Some(user.name),
            email: user.email,
            password: None,
            image_path: user.image_path,
            image: None,
        }
    }
}

impl From<EditProfileDto> for AppUser {
    fn from(dto: EditProfileDto) -> Self {
        Self {
            id: dto.id,
            user_name: dto.user_name.unwrap_or_default(),
            name: dto.name.unwrap_or_default(),
            email: dto.email,
            image_path: dto.image_path,
            ..Default::default()
        }
    }
}

impl From<AppUser> for ProfileSummaryDto {
    fn from(user: AppUser) -> Self {
        Self {
            user_name: user.user_name,
            name: user.name,
            image_path: user.image_path,
            ..Default::default()
        }
    }
}

impl From<ProfileSummaryDto> for AppUser {
    fn from(dto: ProfileSummaryDto) -> Self {
        Self {
            user_name: dto.user_name,
            name: dto.name,
            image_path: dto.image_path,
            ..Default::default()
        }
    }
}

impl From<Follow> for FollowDto {
    fn from(follow: Follow) -> Self {
        Self {
            follower_id: follow.follower_id,
            following_id: follow.following_id,
        }
    }
}

impl From<FollowDto> for Follow {
    fn from(dto: FollowDto) -> Self {
        Self {
            follower_id: dto.follower_id,
            following_id: dto.following_id,
            ..Default::default()
        }
    }
}

impl From<Like> for LikeDto {
    fn from(like: Like) -> Self {
        Self {
            app_user_id: like.app_user_id,
            tweet_id: like.tweet_id,
        }
    }
}

impl From<LikeDto> for Like {
    fn from(dto: LikeDto) -> Self {
        Self {
            app_user_id: dto.app_user_id,
            tweet_id: dto.tweet_id,
            ..Default::default()
        }
    }
}

impl From<Tweet> for AddTweetDto {
    fn from(tweet: Tweet) -> Self {
        Self {
            app_user_id: tweet.app_user_id,
            text: tweet.text,
            image_path: tweet.image_path,
        }
    }
}

impl From<AddTweetDto> for Tweet {
    fn from(dto: AddTweetDto) -> Self {
        Self {
            app_user_id: dto.app_user_id,
            text: dto.text,
            image_path: dto.image_path,
            ..Default::default()
        }
    }
}

impl From<Mention> for AddMentionDto {
    fn from(mention: Mention) -> Self {
        Self {
            app_user_id: mention.app_user_id,
            tweet_id: mention.tweet_id,
            text: mention.text,
        }
    }
}

impl From<AddMentionDto> for Mention {
    fn from(dto: AddMentionDto) -> Self {
        Self {
            app_user_id: dto.app_user_id,
            tweet_id: dto.tweet_id,
            text: dto.text,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored_user() -> AppUser {
        AppUser {
            id: 42,
            user_name: "alice".to_string(),
            normalized_user_name: "ALICE".to_string(),
            email: Some("alice@example.com".to_string()),
            name: "Alice".to_string(),
            password_hash: Some("$argon2id$...".to_string()),
            image_path: Some("/images/users/a.jpg".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn register_round_trip_preserves_shared_fields() {
        let user = stored_user();

        let back = AppUser::from(RegisterDto::from(user.clone()));

        assert_eq!(back.user_name, user.user_name);
        assert_eq!(back.email, user.email);
        assert_eq!(back.name, user.name);
        // Not part of the DTO, so defaulted.
        assert_eq!(back.id, 0);
        assert_eq!(back.password_hash, None);
    }

    #[test]
    fn empty_register_email_maps_to_none() {
        let user = AppUser::from(RegisterDto {
            user_name: "bob".to_string(),
            ..Default::default()
        });
        assert_eq!(user.email, None);
    }

    #[test]
    fn edit_profile_prefill_carries_current_values() {
        let dto = EditProfileDto::from(stored_user());

        assert_eq!(dto.id, 42);
        assert_eq!(dto.user_name.as_deref(), Some("alice"));
        assert_eq!(dto.image_path.as_deref(), Some("/images/users/a.jpg"));
        assert_eq!(dto.password, None);
        assert_eq!(dto.image, None);

        let back = AppUser::from(dto);
        assert_eq!(back.id, 42);
        assert_eq!(back.email.as_deref(), Some("alice@example.com"));
    }

    #[test]
    fn summary_counts_default_to_zero_without_source() {
        let summary = ProfileSummaryDto::from(stored_user());
        assert_eq!(summary.user_name, "alice");
        assert_eq!(summary.tweet_count, 0);
        assert_eq!(summary.follower_count, 0);
    }

    #[test]
    fn social_entities_map_both_ways() {
        let follow = Follow::from(FollowDto {
            follower_id: 1,
            following_id: 2,
        });
        assert_eq!((follow.follower_id, follow.following_id), (1, 2));
        assert_eq!(FollowDto::from(follow).following_id, 2);

        let like = LikeDto::from(Like::from(LikeDto {
            app_user_id: 3,
            tweet_id: 4,
        }));
        assert_eq!(like, LikeDto { app_user_id: 3, tweet_id: 4 });

        let tweet = Tweet::from(AddTweetDto {
            app_user_id: 5,
            text: "hello".to_string(),
            image_path: None,
        });
        assert_eq!(AddTweetDto::from(tweet).text, "hello");

        let mention = AddMentionDto::from(Mention::from(AddMentionDto {
            app_user_id: 6,
            tweet_id: 7,
            text: "@alice".to_string(),
        }));
        assert_eq!(mention.tweet_id, 7);
    }
}
