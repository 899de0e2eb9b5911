use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use std::collections::HashMap;

use crate::db::map_unique;
use crate::entities::{review_likes, reviews};

/// Field-wise update of the five critic sub-scores. `None` keeps the stored
/// value; this is a merge, not an overwrite.
#[derive(Debug, Default, Clone, Copy)]
pub struct CriticDetailsUpdate {
    pub screenplay: Option<i32>,
    pub acting: Option<i32>,
    pub cinematography: Option<i32>,
    pub soundtrack: Option<i32>,
    pub directing: Option<i32>,
}

pub struct ReviewRepository {
    conn: DatabaseConnection,
}

impl ReviewRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a review. The unique (user, movie) index rejects duplicates,
    /// including the loser of a concurrent double-submit.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        user_id: i32,
        movie_id: &str,
        movie_title: &str,
        movie_poster: Option<&str>,
        rating: i32,
        review_text: &str,
        is_featured: bool,
    ) -> Result<reviews::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = reviews::ActiveModel {
            user_id: Set(user_id),
            movie_id: Set(movie_id.to_string()),
            movie_title: Set(movie_title.to_string()),
            movie_poster: Set(movie_poster.map(ToString::to_string)),
            rating: Set(rating),
            review_text: Set(review_text.to_string()),
            is_featured: Set(is_featured),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .map_err(|e| map_unique(e, "You have already reviewed this movie"))
    }

    pub async fn get(&self, id: i32) -> Result<Option<reviews::Model>> {
        reviews::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query review by ID")
    }

    pub async fn list_for_movie(&self, movie_id: &str) -> Result<Vec<reviews::Model>> {
        reviews::Entity::find()
            .filter(reviews::Column::MovieId.eq(movie_id))
            .order_by_desc(reviews::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list reviews for movie")
    }

    pub async fn list_recent(&self, limit: u64) -> Result<Vec<reviews::Model>> {
        reviews::Entity::find()
            .order_by_desc(reviews::Column::CreatedAt)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to list recent reviews")
    }

    pub async fn list_featured(&self) -> Result<Vec<reviews::Model>> {
        reviews::Entity::find()
            .filter(reviews::Column::IsFeatured.eq(true))
            .order_by_desc(reviews::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list featured reviews")
    }

    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<reviews::Model>> {
        reviews::Entity::find()
            .filter(reviews::Column::UserId.eq(user_id))
            .order_by_desc(reviews::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list reviews for user")
    }

    pub async fn count_for_user(&self, user_id: i32) -> Result<u64> {
        reviews::Entity::find()
            .filter(reviews::Column::UserId.eq(user_id))
            .count(&self.conn)
            .await
            .context("Failed to count reviews for user")
    }

    /// Update rating and text. Returns `None` when the review no longer
    /// exists, which can happen when a delete wins the race after the
    /// handler's ownership check.
    pub async fn update(
        &self,
        id: i32,
        rating: i32,
        review_text: &str,
    ) -> Result<Option<reviews::Model>> {
        let Some(review) = reviews::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query review for update")?
        else {
            return Ok(None);
        };

        let mut active: reviews::ActiveModel = review.into();
        active.rating = Set(rating);
        active.review_text = Set(review_text.to_string());
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active.update(&self.conn).await.context("Failed to update review")?;
        Ok(Some(model))
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        reviews::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete review")?;
        Ok(())
    }

    /// Toggle the caller's membership in the review's like set and return
    /// the resulting count.
    pub async fn toggle_like(&self, review_id: i32, user_id: i32) -> Result<i64> {
        let existing = review_likes::Entity::find_by_id((review_id, user_id))
            .one(&self.conn)
            .await
            .context("Failed to query review like")?;

        if existing.is_some() {
            review_likes::Entity::delete_by_id((review_id, user_id))
                .exec(&self.conn)
                .await
                .context("Failed to remove review like")?;
        } else {
            let active = review_likes::ActiveModel {
                review_id: Set(review_id),
                user_id: Set(user_id),
            };
            active
                .insert(&self.conn)
                .await
                .map_err(|e| map_unique(e, "Review already liked"))?;
        }

        self.like_count(review_id).await
    }

    /// Unconditional removal; a no-op when the caller never liked the review.
    pub async fn remove_like(&self, review_id: i32, user_id: i32) -> Result<i64> {
        review_likes::Entity::delete_many()
            .filter(review_likes::Column::ReviewId.eq(review_id))
            .filter(review_likes::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to remove review like")?;

        self.like_count(review_id).await
    }

    pub async fn like_count(&self, review_id: i32) -> Result<i64> {
        let count = review_likes::Entity::find()
            .filter(review_likes::Column::ReviewId.eq(review_id))
            .count(&self.conn)
            .await
            .context("Failed to count review likes")?;

        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    pub async fn like_counts(&self, review_ids: &[i32]) -> Result<HashMap<i32, i64>> {
        if review_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = review_likes::Entity::find()
            .filter(review_likes::Column::ReviewId.is_in(review_ids.to_vec()))
            .all(&self.conn)
            .await
            .context("Failed to batch-count review likes")?;

        let mut counts = HashMap::new();
        for row in rows {
            *counts.entry(row.review_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    pub async fn set_tags(&self, id: i32, tags_json: &str) -> Result<Option<reviews::Model>> {
        let Some(review) = reviews::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query review for tag update")?
        else {
            return Ok(None);
        };

        let mut active: reviews::ActiveModel = review.into();
        active.critic_tags = Set(Some(tags_json.to_string()));
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to set review tags")?;
        Ok(Some(model))
    }

    pub async fn set_featured(&self, id: i32, featured: bool) -> Result<Option<reviews::Model>> {
        let Some(review) = reviews::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query review for feature update")?
        else {
            return Ok(None);
        };

        let mut active: reviews::ActiveModel = review.into();
        active.is_featured = Set(featured);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to set review featured")?;
        Ok(Some(model))
    }

    pub async fn merge_critic_details(
        &self,
        id: i32,
        details: CriticDetailsUpdate,
    ) -> Result<Option<reviews::Model>> {
        let Some(review) = reviews::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query review for critic details")?
        else {
            return Ok(None);
        };

        let mut active: reviews::ActiveModel = review.into();
        if let Some(v) = details.screenplay {
            active.critic_screenplay = Set(Some(v));
        }
        if let Some(v) = details.acting {
            active.critic_acting = Set(Some(v));
        }
        if let Some(v) = details.cinematography {
            active.critic_cinematography = Set(Some(v));
        }
        if let Some(v) = details.soundtrack {
            active.critic_soundtrack = Set(Some(v));
        }
        if let Some(v) = details.directing {
            active.critic_directing = Set(Some(v));
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to merge critic details")?;
        Ok(Some(model))
    }
}
