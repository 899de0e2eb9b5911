use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::db::map_unique;
use crate::entities::follows;

pub struct FollowRepository {
    conn: DatabaseConnection,
}

impl FollowRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a follow edge. The composite primary key deduplicates; the
    /// self-follow check lives at the API layer before this is reached.
    pub async fn add(&self, follower_id: i32, following_id: i32) -> Result<()> {
        let active = follows::ActiveModel {
            follower_id: Set(follower_id),
            following_id: Set(following_id),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        active
            .insert(&self.conn)
            .await
            .map_err(|e| map_unique(e, "Already following this user"))?;

        Ok(())
    }

    /// Remove the edge; returns whether it existed.
    pub async fn remove(&self, follower_id: i32, following_id: i32) -> Result<bool> {
        let result = follows::Entity::delete_by_id((follower_id, following_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete follow edge")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn exists(&self, follower_id: i32, following_id: i32) -> Result<bool> {
        let found = follows::Entity::find_by_id((follower_id, following_id))
            .one(&self.conn)
            .await
            .context("Failed to query follow edge")?;

        Ok(found.is_some())
    }

    /// Ids of users following `user_id`, most recent edge first.
    pub async fn follower_ids(&self, user_id: i32) -> Result<Vec<i32>> {
        let edges = follows::Entity::find()
            .filter(follows::Column::FollowingId.eq(user_id))
            .order_by_desc(follows::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list followers")?;

        Ok(edges.into_iter().map(|e| e.follower_id).collect())
    }

    /// Ids of users that `user_id` follows, most recent edge first.
    pub async fn following_ids(&self, user_id: i32) -> Result<Vec<i32>> {
        let edges = follows::Entity::find()
            .filter(follows::Column::FollowerId.eq(user_id))
            .order_by_desc(follows::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list following")?;

        Ok(edges.into_iter().map(|e| e.following_id).collect())
    }

    pub async fn follower_count(&self, user_id: i32) -> Result<u64> {
        follows::Entity::find()
            .filter(follows::Column::FollowingId.eq(user_id))
            .count(&self.conn)
            .await
            .context("Failed to count followers")
    }

    pub async fn following_count(&self, user_id: i32) -> Result<u64> {
        follows::Entity::find()
            .filter(follows::Column::FollowerId.eq(user_id))
            .count(&self.conn)
            .await
            .context("Failed to count following")
    }
}
