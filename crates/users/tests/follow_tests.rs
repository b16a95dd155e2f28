use tempfile::TempDir;
use twitter_config::DatabaseConfig;
use twitter_database::{initialize_database, AppUser, UnitOfWork};
use twitter_users::{FollowGraph, FollowService, UserError};

async fn setup() -> (FollowService, UnitOfWork, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let config = DatabaseConfig {
        url: format!("sqlite://{}", temp_dir.path().join("follows.db").display()),
        max_connections: 2,
        page_size: 10,
    };
    let pool = initialize_database(&config).await.unwrap();
    let uow = UnitOfWork::from_config(pool, &config);
    (FollowService::new(uow.clone()), uow, temp_dir)
}

async fn user(uow: &UnitOfWork, user_name: &str) -> i64 {
    uow.app_users()
        .add(&AppUser {
            user_name: user_name.to_string(),
            normalized_user_name: user_name.to_uppercase(),
            security_stamp: "stamp".to_string(),
            concurrency_stamp: "stamp".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
            ..Default::default()
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn test_follow_creates_edge_visible_from_both_sides() {
    let (follows, uow, _temp_dir) = setup().await;
    let alice = user(&uow, "alice").await;
    let bob = user(&uow, "bob").await;

    let edge = follows.follow(alice, bob).await.unwrap();

    assert!(edge.id > 0);
    assert!(follows.is_following(alice, bob).await.unwrap());
    assert!(!follows.is_following(bob, alice).await.unwrap());
    assert_eq!(follows.followers(bob).await.unwrap(), vec![alice]);
    assert_eq!(follows.followings(alice).await.unwrap(), vec![bob]);
    assert!(follows.followers(alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_follow_rejects_self_duplicate_and_unknown_users() {
    let (follows, uow, _temp_dir) = setup().await;
    let alice = user(&uow, "alice").await;
    let bob = user(&uow, "bob").await;
    follows.follow(alice, bob).await.unwrap();

    assert!(matches!(
        follows.follow(alice, alice).await,
        Err(UserError::SelfFollow)
    ));
    assert!(matches!(
        follows.follow(alice, bob).await,
        Err(UserError::AlreadyFollowing(id)) if id == bob
    ));
    assert!(matches!(
        follows.follow(alice, 999).await,
        Err(UserError::UserNotFound(999))
    ));
}

#[tokio::test]
async fn test_unfollow_reports_whether_edge_existed() {
    let (follows, uow, _temp_dir) = setup().await;
    let alice = user(&uow, "alice").await;
    let bob = user(&uow, "bob").await;
    follows.follow(alice, bob).await.unwrap();

    assert!(follows.unfollow(alice, bob).await.unwrap());
    assert!(!follows.unfollow(alice, bob).await.unwrap());
    assert!(follows.followings(alice).await.unwrap().is_empty());

    // Can follow again after unfollowing.
    follows.follow(alice, bob).await.unwrap();
}
