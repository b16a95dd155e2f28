//! Follow edges between users.

use chrono::Utc;
use tracing::{debug, info};
use twitter_database::{DatabaseError, Follow, Predicate, UnitOfWork};

use crate::types::{UserError, UserResult};

/// Source of follower/following id lists.
pub trait FollowGraph {
    /// Ids of users following `user_id`, oldest edge first.
    async fn followers(&self, user_id: i64) -> UserResult<Vec<i64>>;
    /// Ids of users `user_id` follows, oldest edge first.
    async fn followings(&self, user_id: i64) -> UserResult<Vec<i64>>;
}

#[derive(Debug, Clone)]
pub struct FollowService {
    uow: UnitOfWork,
}

impl FollowService {
    pub fn new(uow: UnitOfWork) -> Self {
        Self { uow }
    }

    /// Create the edge `follower_id -> following_id`.
    pub async fn follow(&self, follower_id: i64, following_id: i64) -> UserResult<Follow> {
        if follower_id == following_id {
            return Err(UserError::SelfFollow);
        }
        for id in [follower_id, following_id] {
            if self.uow.app_users().get_by_id(id).await?.is_none() {
                return Err(UserError::UserNotFound(id));
            }
        }
        if self.is_following(follower_id, following_id).await? {
            return Err(UserError::AlreadyFollowing(following_id));
        }

        let mut follow = Follow {
            follower_id,
            following_id,
            created_at: Utc::now().to_rfc3339(),
            ..Default::default()
        };

        follow.id = match self.uow.follows().add(&follow).await {
            Ok(id) => id,
            Err(DatabaseError::Duplicate(_)) => {
                return Err(UserError::AlreadyFollowing(following_id))
            }
            Err(err) => return Err(err.into()),
        };

        info!(follower_id, following_id, "user followed");
        Ok(follow)
    }

    /// Remove the edge; `false` when it did not exist.
    pub async fn unfollow(&self, follower_id: i64, following_id: i64) -> UserResult<bool> {
        let removed = self
            .uow
            .follows()
            .delete_where(&edge(follower_id, following_id))
            .await?;

        debug!(follower_id, following_id, removed, "unfollow");
        Ok(removed > 0)
    }

    pub async fn is_following(&self, follower_id: i64, following_id: i64) -> UserResult<bool> {
        let count = self
            .uow
            .follows()
            .count(&edge(follower_id, following_id))
            .await?;
        Ok(count > 0)
    }
}

impl FollowGraph for FollowService {
    async fn followers(&self, user_id: i64) -> UserResult<Vec<i64>> {
        let edges = self
            .uow
            .follows()
            .list(&Predicate::eq("following_id", user_id))
            .await?;
        Ok(edges.into_iter().map(|edge| edge.follower_id).collect())
    }

    async fn followings(&self, user_id: i64) -> UserResult<Vec<i64>> {
        let edges = self
            .uow
            .follows()
            .list(&Predicate::eq("follower_id", user_id))
            .await?;
        Ok(edges.into_iter().map(|edge| edge.following_id).collect())
    }
}

fn edge(follower_id: i64, following_id: i64) -> Predicate {
    Predicate::eq("follower_id", follower_id).and(Predicate::eq("following_id", following_id))
}
