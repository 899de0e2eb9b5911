use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::db::map_unique;
use crate::entities::watchlist_items;

pub struct WatchlistRepository {
    conn: DatabaseConnection,
}

impl WatchlistRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<watchlist_items::Model>> {
        watchlist_items::Entity::find()
            .filter(watchlist_items::Column::UserId.eq(user_id))
            .order_by_asc(watchlist_items::Column::AddedAt)
            .all(&self.conn)
            .await
            .context("Failed to list watchlist")
    }

    /// Add a movie. Existing entries are never updated; a duplicate movie id
    /// is rejected by the unique (user, movie) index.
    pub async fn add(
        &self,
        user_id: i32,
        movie_id: &str,
        movie_title: &str,
        movie_poster: Option<&str>,
    ) -> Result<()> {
        let active = watchlist_items::ActiveModel {
            user_id: Set(user_id),
            movie_id: Set(movie_id.to_string()),
            movie_title: Set(movie_title.to_string()),
            movie_poster: Set(movie_poster.map(ToString::to_string)),
            added_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .map_err(|e| map_unique(e, "Movie already in watchlist"))?;

        Ok(())
    }

    /// Remove by movie id; removing an absent movie is a no-op.
    pub async fn remove(&self, user_id: i32, movie_id: &str) -> Result<()> {
        watchlist_items::Entity::delete_many()
            .filter(watchlist_items::Column::UserId.eq(user_id))
            .filter(watchlist_items::Column::MovieId.eq(movie_id))
            .exec(&self.conn)
            .await
            .context("Failed to remove watchlist entry")?;

        Ok(())
    }

    pub async fn contains(&self, user_id: i32, movie_id: &str) -> Result<bool> {
        let found = watchlist_items::Entity::find()
            .filter(watchlist_items::Column::UserId.eq(user_id))
            .filter(watchlist_items::Column::MovieId.eq(movie_id))
            .one(&self.conn)
            .await
            .context("Failed to check watchlist entry")?;

        Ok(found.is_some())
    }
}
