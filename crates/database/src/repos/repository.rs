//! Generic repository over a single entity table.

use std::collections::HashMap;
use std::marker::PhantomData;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use super::predicate::Predicate;
use crate::entities::Entity;
use crate::types::values::to_arguments;
use crate::types::{DatabaseError, DatabaseResult, SqlValue};

/// Edge collections that can be eager-loaded alongside user rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Include {
    /// Ids of users following each row.
    Followers,
    /// Ids of users each row follows.
    Followings,
}

impl Include {
    /// `(owner, other)` columns of the follows table for this direction.
    fn columns(self) -> (&'static str, &'static str) {
        match self {
            Self::Followers => ("following_id", "follower_id"),
            Self::Followings => ("follower_id", "following_id"),
        }
    }
}

/// A read model selected from an entity's table.
///
/// `SELECT` is evaluated with the entity table aliased as `t`, so correlated
/// subqueries can refer to `t.id`.
pub trait Projection<E: Entity>: for<'r> FromRow<'r, SqliteRow> + Send + Unpin {
    const SELECT: &'static str;

    /// Row id used to attach eager-loaded collections.
    fn row_id(&self) -> Option<i64> {
        None
    }

    fn attach(&mut self, _include: Include, _ids: Vec<i64>) {}
}

/// Projection of just the primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct RowId {
    pub id: i64,
}

impl<E: Entity> Projection<E> for RowId {
    const SELECT: &'static str = "t.id AS id";
}

pub struct Repository<E> {
    pool: SqlitePool,
    page_size: u32,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            page_size: self.page_size,
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> Repository<E> {
    pub fn new(pool: SqlitePool, page_size: u32) -> Self {
        Self {
            pool,
            page_size: page_size.max(1),
            _entity: PhantomData,
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Find an entity by primary key
    pub async fn get_by_id(&self, id: i64) -> DatabaseResult<Option<E>> {
        let sql = format!("SELECT {} FROM {} t WHERE t.id = ?", E::COLUMNS, E::TABLE);
        let entity = sqlx::query_as::<_, E>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(entity)
    }

    /// First entity matching `predicate`, in id order.
    pub async fn find_first(&self, predicate: &Predicate) -> DatabaseResult<Option<E>> {
        let mut params = Vec::new();
        let sql = format!(
            "SELECT {} FROM {} t WHERE {} ORDER BY t.id LIMIT 1",
            E::COLUMNS,
            E::TABLE,
            predicate.render("t.", &mut params)
        );
        let entity = sqlx::query_as_with::<_, E, _>(&sql, to_arguments(&params))
            .fetch_optional(&self.pool)
            .await?;
        Ok(entity)
    }

    /// Every entity matching `predicate`, in id order, without paging.
    pub async fn list(&self, predicate: &Predicate) -> DatabaseResult<Vec<E>> {
        let mut params = Vec::new();
        let sql = format!(
            "SELECT {} FROM {} t WHERE {} ORDER BY t.id",
            E::COLUMNS,
            E::TABLE,
            predicate.render("t.", &mut params)
        );
        let entities = sqlx::query_as_with::<_, E, _>(&sql, to_arguments(&params))
            .fetch_all(&self.pool)
            .await?;
        Ok(entities)
    }

    /// Project the first row matching `predicate`, or `None` when nothing matches.
    pub async fn get_filtered_first_or_default<P>(
        &self,
        predicate: &Predicate,
    ) -> DatabaseResult<Option<P>>
    where
        P: Projection<E>,
    {
        let mut params = Vec::new();
        let sql = format!(
            "SELECT {} FROM {} t WHERE {} ORDER BY t.id LIMIT 1",
            P::SELECT,
            E::TABLE,
            predicate.render("t.", &mut params)
        );
        let row = sqlx::query_as_with::<_, P, _>(&sql, to_arguments(&params))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// One page of projected rows matching `predicate`, ordered by id.
    pub async fn get_filtered_list<P>(
        &self,
        predicate: &Predicate,
        include: Option<Include>,
        page_index: u32,
    ) -> DatabaseResult<Vec<P>>
    where
        P: Projection<E>,
    {
        let mut params = Vec::new();
        let sql = format!(
            "SELECT {} FROM {} t WHERE {} ORDER BY t.id LIMIT ? OFFSET ?",
            P::SELECT,
            E::TABLE,
            predicate.render("t.", &mut params)
        );
        let limit = i64::from(self.page_size);
        params.push(SqlValue::Integer(limit));
        params.push(SqlValue::Integer(i64::from(page_index) * limit));

        let mut rows = sqlx::query_as_with::<_, P, _>(&sql, to_arguments(&params))
            .fetch_all(&self.pool)
            .await?;

        if let Some(include) = include {
            self.load_include(include, &mut rows).await?;
        }

        debug!(table = E::TABLE, page_index, rows = rows.len(), "loaded page");
        Ok(rows)
    }

    async fn load_include<P>(&self, include: Include, rows: &mut [P]) -> DatabaseResult<()>
    where
        P: Projection<E>,
    {
        let ids: Vec<i64> = rows.iter().filter_map(P::row_id).collect();
        if ids.is_empty() {
            return Ok(());
        }

        let (owner, other) = include.columns();
        let mut params = Vec::new();
        let filter = Predicate::In(owner, ids).render("f.", &mut params);
        let sql = format!(
            "SELECT f.{owner}, f.{other} FROM follows f WHERE {filter} ORDER BY f.id"
        );

        let edges: Vec<(i64, i64)> = sqlx::query_as_with(&sql, to_arguments(&params))
            .fetch_all(&self.pool)
            .await?;

        let mut grouped: HashMap<i64, Vec<i64>> = HashMap::new();
        for (owner_id, other_id) in edges {
            grouped.entry(owner_id).or_default().push(other_id);
        }

        for row in rows.iter_mut() {
            if let Some(id) = row.row_id() {
                row.attach(include, grouped.remove(&id).unwrap_or_default());
            }
        }

        Ok(())
    }

    /// Count rows matching `predicate`
    pub async fn count(&self, predicate: &Predicate) -> DatabaseResult<i64> {
        let mut params = Vec::new();
        let sql = format!(
            "SELECT COUNT(*) FROM {} t WHERE {}",
            E::TABLE,
            predicate.render("t.", &mut params)
        );
        let count: i64 = sqlx::query_scalar_with(&sql, to_arguments(&params))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Insert a new row and return its id. The entity's own `id` is ignored.
    pub async fn add(&self, entity: &E) -> DatabaseResult<i64> {
        let (columns, params): (Vec<&str>, Vec<SqlValue>) = entity.values().into_iter().unzip();
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            E::TABLE,
            columns.join(", "),
            placeholders
        );

        let result = sqlx::query_with(&sql, to_arguments(&params))
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    /// Overwrite every writable column of an existing row.
    pub async fn update(&self, entity: &E) -> DatabaseResult<()> {
        self.update_where(entity, &Predicate::All).await
    }

    /// Update only while `guard` still holds for the stored row; a row that
    /// exists but fails the guard is reported as a concurrency conflict.
    pub async fn update_where(&self, entity: &E, guard: &Predicate) -> DatabaseResult<()> {
        let values = entity.values();
        let assignments = values
            .iter()
            .map(|(column, _)| format!("{column} = ?"))
            .collect::<Vec<_>>()
            .join(", ");
        let mut params: Vec<SqlValue> = values.into_iter().map(|(_, value)| value).collect();
        params.push(SqlValue::Integer(entity.id()));
        let guard_sql = guard.render("", &mut params);

        let sql = format!(
            "UPDATE {} SET {} WHERE id = ? AND {}",
            E::TABLE,
            assignments,
            guard_sql
        );

        let result = sqlx::query_with(&sql, to_arguments(&params))
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            let target = format!("{} {}", E::TABLE, entity.id());
            return match self.get_by_id(entity.id()).await? {
                Some(_) => Err(DatabaseError::ConcurrencyConflict(target)),
                None => Err(DatabaseError::NotFound(target)),
            };
        }

        Ok(())
    }

    /// Delete by primary key, returning whether a row was removed
    pub async fn delete(&self, id: i64) -> DatabaseResult<bool> {
        let removed = self.delete_where(&Predicate::eq("id", id)).await?;
        Ok(removed > 0)
    }

    pub async fn delete_where(&self, predicate: &Predicate) -> DatabaseResult<u64> {
        let mut params = Vec::new();
        let sql = format!(
            "DELETE FROM {} WHERE {}",
            E::TABLE,
            predicate.render("", &mut params)
        );
        let result = sqlx::query_with(&sql, to_arguments(&params))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{AppUser, Follow, Tweet};
    use crate::test_utils::{create_test_pool, new_user};

    #[derive(Debug, sqlx::FromRow)]
    struct NameWithFollowers {
        id: i64,
        user_name: String,
        #[sqlx(skip)]
        followers: Vec<i64>,
    }

    impl Projection<AppUser> for NameWithFollowers {
        const SELECT: &'static str = "t.id, t.user_name";

        fn row_id(&self) -> Option<i64> {
            Some(self.id)
        }

        fn attach(&mut self, include: Include, ids: Vec<i64>) {
            if include == Include::Followers {
                self.followers = ids;
            }
        }
    }

    #[derive(Debug, sqlx::FromRow)]
    struct TweetCount {
        user_name: String,
        tweet_count: i64,
    }

    impl Projection<AppUser> for TweetCount {
        const SELECT: &'static str =
            "t.user_name, (SELECT COUNT(*) FROM tweets tw WHERE tw.app_user_id = t.id) AS tweet_count";
    }

    async fn follow(repo: &Repository<Follow>, follower_id: i64, following_id: i64) {
        repo.add(&Follow {
            follower_id,
            following_id,
            created_at: "2024-01-01T00:00:00Z".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_add_and_get_by_id_round_trip() {
        let (pool, _temp_dir) = create_test_pool().await;
        let users = Repository::<AppUser>::new(pool, 10);

        let id = users.add(&new_user("alice")).await.unwrap();
        let stored = users.get_by_id(id).await.unwrap().unwrap();

        assert_eq!(stored.id, id);
        assert_eq!(stored.user_name, "alice");
        assert_eq!(stored.normalized_user_name, "ALICE");
        assert!(users.get_by_id(id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_unique_column_maps_to_duplicate_error() {
        let (pool, _temp_dir) = create_test_pool().await;
        let users = Repository::<AppUser>::new(pool, 10);

        users.add(&new_user("alice")).await.unwrap();
        let result = users.add(&new_user("alice")).await;

        assert!(matches!(result, Err(DatabaseError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_filtered_first_or_default_projects_counts() {
        let (pool, _temp_dir) = create_test_pool().await;
        let users = Repository::<AppUser>::new(pool.clone(), 10);
        let tweets = Repository::<Tweet>::new(pool, 10);

        let alice = users.add(&new_user("alice")).await.unwrap();
        for text in ["one", "two"] {
            tweets
                .add(&Tweet {
                    app_user_id: alice,
                    text: text.to_string(),
                    created_at: "2024-01-01T00:00:00Z".to_string(),
                    ..Default::default()
                })
                .await
                .unwrap();
        }

        let summary: TweetCount = users
            .get_filtered_first_or_default(&Predicate::eq("user_name", "alice"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(summary.user_name, "alice");
        assert_eq!(summary.tweet_count, 2);

        let missing: Option<TweetCount> = users
            .get_filtered_first_or_default(&Predicate::eq("user_name", "nobody"))
            .await
            .unwrap();
        assert!(missing.is_none());

        let id: RowId = users
            .get_filtered_first_or_default(&Predicate::eq("user_name", "alice"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(id.id, alice);
    }

    #[tokio::test]
    async fn test_filtered_list_paginates_in_id_order() {
        let (pool, _temp_dir) = create_test_pool().await;
        let users = Repository::<AppUser>::new(pool, 2);

        let mut ids = Vec::new();
        for name in ["u1", "u2", "u3", "u4", "u5"] {
            ids.push(users.add(&new_user(name)).await.unwrap());
        }

        let predicate = Predicate::id_in(ids.clone());
        let page0: Vec<RowId> = users.get_filtered_list(&predicate, None, 0).await.unwrap();
        let page2: Vec<RowId> = users.get_filtered_list(&predicate, None, 2).await.unwrap();
        let page3: Vec<RowId> = users.get_filtered_list(&predicate, None, 3).await.unwrap();

        assert_eq!(page0.iter().map(|r| r.id).collect::<Vec<_>>(), ids[..2].to_vec());
        assert_eq!(page2.iter().map(|r| r.id).collect::<Vec<_>>(), ids[4..].to_vec());
        assert!(page3.is_empty());

        let none: Vec<RowId> = users
            .get_filtered_list(&Predicate::id_in(Vec::new()), None, 0)
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_filtered_list_eager_loads_followers() {
        let (pool, _temp_dir) = create_test_pool().await;
        let users = Repository::<AppUser>::new(pool.clone(), 10);
        let follows = Repository::<Follow>::new(pool, 10);

        let alice = users.add(&new_user("alice")).await.unwrap();
        let bob = users.add(&new_user("bob")).await.unwrap();
        let carol = users.add(&new_user("carol")).await.unwrap();
        follow(&follows, bob, alice).await;
        follow(&follows, carol, alice).await;

        let rows: Vec<NameWithFollowers> = users
            .get_filtered_list(&Predicate::id_in([alice, bob]), Some(Include::Followers), 0)
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].user_name, "alice");
        assert_eq!(rows[0].followers, vec![bob, carol]);
        assert!(rows[1].followers.is_empty());
    }

    #[tokio::test]
    async fn test_update_detects_stale_guard() {
        let (pool, _temp_dir) = create_test_pool().await;
        let users = Repository::<AppUser>::new(pool, 10);

        let id = users.add(&new_user("alice")).await.unwrap();
        let mut user = users.get_by_id(id).await.unwrap().unwrap();
        user.name = "Alice A.".to_string();

        let stale = Predicate::eq("concurrency_stamp", "not-the-stamp");
        let result = users.update_where(&user, &stale).await;
        assert!(matches!(result, Err(DatabaseError::ConcurrencyConflict(_))));

        let fresh = Predicate::eq("concurrency_stamp", user.concurrency_stamp.clone());
        users.update_where(&user, &fresh).await.unwrap();
        assert_eq!(users.get_by_id(id).await.unwrap().unwrap().name, "Alice A.");

        user.id = 999;
        assert!(matches!(
            users.update(&user).await,
            Err(DatabaseError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_and_count() {
        let (pool, _temp_dir) = create_test_pool().await;
        let users = Repository::<AppUser>::new(pool, 10);

        let alice = users.add(&new_user("alice")).await.unwrap();
        users.add(&new_user("bob")).await.unwrap();
        assert_eq!(users.count(&Predicate::All).await.unwrap(), 2);

        assert!(users.delete(alice).await.unwrap());
        assert!(!users.delete(alice).await.unwrap());
        assert_eq!(users.count(&Predicate::All).await.unwrap(), 1);
    }
}
