use anyhow::Result;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, SqlErr, Statement,
};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::{reviews, watchlist_items};

pub mod migrator;
pub mod repositories;

pub use repositories::user::{ProfileUpdate, User};

/// Raised when a uniqueness constraint rejects a write (duplicate review,
/// duplicate follow edge, duplicate watchlist entry, taken username).
/// Translated to a 400 at the API boundary.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct UniqueViolation(pub String);

/// Map a unique-constraint rejection to [`UniqueViolation`] with a
/// caller-facing message; everything else stays a raw database error.
pub(crate) fn map_unique(err: DbErr, message: &str) -> anyhow::Error {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        UniqueViolation(message.to_string()).into()
    } else {
        err.into()
    }
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn review_repo(&self) -> repositories::review::ReviewRepository {
        repositories::review::ReviewRepository::new(self.conn.clone())
    }

    fn follow_repo(&self) -> repositories::follow::FollowRepository {
        repositories::follow::FollowRepository::new(self.conn.clone())
    }

    fn watchlist_repo(&self) -> repositories::watchlist::WatchlistRepository {
        repositories::watchlist::WatchlistRepository::new(self.conn.clone())
    }

    // ========== Users ==========

    pub async fn create_user(&self, username: &str, password: &str, role: &str) -> Result<User> {
        self.user_repo().create(username, password, role).await
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_users_by_ids(&self, ids: &[i32]) -> Result<Vec<User>> {
        self.user_repo().get_by_ids(ids).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn verify_user_password(&self, username: &str, password: &str) -> Result<bool> {
        self.user_repo().verify_password(username, password).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repo().list_all().await
    }

    pub async fn update_user_profile(
        &self,
        id: i32,
        update: ProfileUpdate,
    ) -> Result<Option<User>> {
        self.user_repo().update_profile(id, update).await
    }

    pub async fn update_user_role(&self, id: i32, role: &str) -> Result<Option<User>> {
        self.user_repo().update_role(id, role).await
    }

    // ========== Reviews ==========

    #[allow(clippy::too_many_arguments)]
    pub async fn create_review(
        &self,
        user_id: i32,
        movie_id: &str,
        movie_title: &str,
        movie_poster: Option<&str>,
        rating: i32,
        review_text: &str,
        is_featured: bool,
    ) -> Result<reviews::Model> {
        self.review_repo()
            .create(
                user_id,
                movie_id,
                movie_title,
                movie_poster,
                rating,
                review_text,
                is_featured,
            )
            .await
    }

    pub async fn get_review(&self, id: i32) -> Result<Option<reviews::Model>> {
        self.review_repo().get(id).await
    }

    pub async fn reviews_for_movie(&self, movie_id: &str) -> Result<Vec<reviews::Model>> {
        self.review_repo().list_for_movie(movie_id).await
    }

    pub async fn recent_reviews(&self, limit: u64) -> Result<Vec<reviews::Model>> {
        self.review_repo().list_recent(limit).await
    }

    pub async fn featured_reviews(&self) -> Result<Vec<reviews::Model>> {
        self.review_repo().list_featured().await
    }

    pub async fn reviews_for_user(&self, user_id: i32) -> Result<Vec<reviews::Model>> {
        self.review_repo().list_for_user(user_id).await
    }

    pub async fn review_count_for_user(&self, user_id: i32) -> Result<u64> {
        self.review_repo().count_for_user(user_id).await
    }

    pub async fn update_review(
        &self,
        id: i32,
        rating: i32,
        review_text: &str,
    ) -> Result<Option<reviews::Model>> {
        self.review_repo().update(id, rating, review_text).await
    }

    pub async fn delete_review(&self, id: i32) -> Result<()> {
        self.review_repo().delete(id).await
    }

    pub async fn toggle_review_like(&self, review_id: i32, user_id: i32) -> Result<i64> {
        self.review_repo().toggle_like(review_id, user_id).await
    }

    pub async fn remove_review_like(&self, review_id: i32, user_id: i32) -> Result<i64> {
        self.review_repo().remove_like(review_id, user_id).await
    }

    pub async fn review_like_count(&self, review_id: i32) -> Result<i64> {
        self.review_repo().like_count(review_id).await
    }

    pub async fn review_like_counts(&self, review_ids: &[i32]) -> Result<HashMap<i32, i64>> {
        self.review_repo().like_counts(review_ids).await
    }

    pub async fn set_review_tags(&self, id: i32, tags_json: &str) -> Result<Option<reviews::Model>> {
        self.review_repo().set_tags(id, tags_json).await
    }

    pub async fn set_review_featured(
        &self,
        id: i32,
        featured: bool,
    ) -> Result<Option<reviews::Model>> {
        self.review_repo().set_featured(id, featured).await
    }

    pub async fn merge_critic_details(
        &self,
        id: i32,
        details: repositories::review::CriticDetailsUpdate,
    ) -> Result<Option<reviews::Model>> {
        self.review_repo().merge_critic_details(id, details).await
    }

    // ========== Follows ==========

    pub async fn add_follow(&self, follower_id: i32, following_id: i32) -> Result<()> {
        self.follow_repo().add(follower_id, following_id).await
    }

    pub async fn remove_follow(&self, follower_id: i32, following_id: i32) -> Result<bool> {
        self.follow_repo().remove(follower_id, following_id).await
    }

    pub async fn is_following(&self, follower_id: i32, following_id: i32) -> Result<bool> {
        self.follow_repo().exists(follower_id, following_id).await
    }

    pub async fn follower_ids(&self, user_id: i32) -> Result<Vec<i32>> {
        self.follow_repo().follower_ids(user_id).await
    }

    pub async fn following_ids(&self, user_id: i32) -> Result<Vec<i32>> {
        self.follow_repo().following_ids(user_id).await
    }

    pub async fn follower_count(&self, user_id: i32) -> Result<u64> {
        self.follow_repo().follower_count(user_id).await
    }

    pub async fn following_count(&self, user_id: i32) -> Result<u64> {
        self.follow_repo().following_count(user_id).await
    }

    // ========== Watchlist ==========

    pub async fn watchlist_for_user(&self, user_id: i32) -> Result<Vec<watchlist_items::Model>> {
        self.watchlist_repo().list_for_user(user_id).await
    }

    pub async fn add_to_watchlist(
        &self,
        user_id: i32,
        movie_id: &str,
        movie_title: &str,
        movie_poster: Option<&str>,
    ) -> Result<()> {
        self.watchlist_repo()
            .add(user_id, movie_id, movie_title, movie_poster)
            .await
    }

    pub async fn remove_from_watchlist(&self, user_id: i32, movie_id: &str) -> Result<()> {
        self.watchlist_repo().remove(user_id, movie_id).await
    }

    pub async fn watchlist_contains(&self, user_id: i32, movie_id: &str) -> Result<bool> {
        self.watchlist_repo().contains(user_id, movie_id).await
    }
}
