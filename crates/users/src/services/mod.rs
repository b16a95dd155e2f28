//! Service layer

pub mod app_user_service;
pub mod follow_service;

pub use app_user_service::AppUserService;
pub use follow_service::{FollowGraph, FollowService};
