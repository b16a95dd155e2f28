//! # Twitter Users Crate
//!
//! Account and social-graph services: registration, sign-in, profile
//! editing with avatar upload, profile summaries and follower listings.
//!
//! ## Architecture
//!
//! - **Types**: request/response DTOs and view models, error types
//! - **Mapping**: entity <-> DTO conversions
//! - **Services**: `AppUserService` and the follow graph
//! - **Storage**: avatar persistence
//!
//! ## Usage
//!
//! ```rust,no_run
//! # async fn demo(uow: twitter_database::UnitOfWork) -> Result<(), twitter_users::UserError> {
//! use twitter_config::AppConfig;
//! use twitter_identity::Session;
//! use twitter_users::{AppUserService, RegisterDto};
//!
//! let service = AppUserService::new(uow, &AppConfig::default());
//! let mut session = Session::Anonymous;
//! let dto = RegisterDto {
//!     user_name: "alice".into(),
//!     email: "alice@example.com".into(),
//!     name: "Alice".into(),
//!     password: "Secret1!".into(),
//! };
//! service.register(&mut session, dto).await?;
//! # Ok(())
//! # }
//! ```

pub mod mapping;
pub mod services;
pub mod storage;
pub mod types;

pub use services::{AppUserService, FollowGraph, FollowService};
pub use storage::{AvatarStore, DiskAvatarStore};
pub use types::{
    AddMentionDto, AddTweetDto, EditProfileDto, FollowDto, FollowListVm, LikeDto, LoginDto,
    ProfileSummaryDto, RegisterDto, UserError, UserResult,
};
