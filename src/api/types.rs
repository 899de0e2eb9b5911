use serde::{Deserialize, Serialize};

use crate::db::repositories::user::User;
use crate::entities::{reviews, watchlist_items};

/// Structured rating vocabulary critics may attach to their reviews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CriticTag {
    Masterpiece,
    MustWatch,
    Overrated,
    Underrated,
    Classic,
    Innovative,
    Disappointing,
    CrowdPleaser,
}

impl std::str::FromStr for CriticTag {
    type Err = crate::api::ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| crate::api::ApiError::validation(format!("Unknown critic tag: {s}")))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i32,
    pub username: String,
    pub role: String,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub favorite_genres: Vec<String>,
    pub is_private: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            bio: user.bio,
            avatar: user.avatar,
            favorite_genres: user.favorite_genres,
            is_private: user.is_private,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Compact author embed carried on reviews and follower listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummaryDto {
    pub id: i32,
    pub username: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub role: String,
}

impl From<&User> for UserSummaryDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            avatar: user.avatar.clone(),
            bio: user.bio.clone(),
            role: user.role.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticDetailsDto {
    pub screenplay: Option<i32>,
    pub acting: Option<i32>,
    pub cinematography: Option<i32>,
    pub soundtrack: Option<i32>,
    pub directing: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDto {
    pub id: i32,
    pub user: UserSummaryDto,
    pub movie_id: String,
    pub movie_title: String,
    pub movie_poster: Option<String>,
    pub rating: i32,
    pub review_text: String,
    pub likes: i64,
    pub is_featured: bool,
    pub critic_tags: Vec<CriticTag>,
    pub critic_details: CriticDetailsDto,
    pub created_at: String,
    pub updated_at: String,
}

impl ReviewDto {
    #[must_use]
    pub fn from_parts(review: reviews::Model, author: UserSummaryDto, likes: i64) -> Self {
        let critic_tags = review
            .critic_tags
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default();

        Self {
            id: review.id,
            user: author,
            movie_id: review.movie_id,
            movie_title: review.movie_title,
            movie_poster: review.movie_poster,
            rating: review.rating,
            review_text: review.review_text,
            likes,
            is_featured: review.is_featured,
            critic_tags,
            critic_details: CriticDetailsDto {
                screenplay: review.critic_screenplay,
                acting: review.critic_acting,
                cinematography: review.critic_cinematography,
                soundtrack: review.critic_soundtrack,
                directing: review.critic_directing,
            },
            created_at: review.created_at,
            updated_at: review.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsDto {
    pub reviews: u64,
    pub followers: u64,
    pub following: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileDto {
    #[serde(flatten)]
    pub user: UserDto,
    pub stats: StatsDto,
    pub is_following: bool,
}

#[derive(Debug, Serialize)]
pub struct LikesDto {
    pub likes: i64,
}

#[derive(Debug, Serialize)]
pub struct MessageDto {
    pub message: String,
}

impl MessageDto {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowStatusDto {
    pub is_following: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistMovieDto {
    pub movie_id: String,
    pub movie_title: String,
    pub movie_poster: Option<String>,
    pub added_at: String,
}

impl From<watchlist_items::Model> for WatchlistMovieDto {
    fn from(item: watchlist_items::Model) -> Self {
        Self {
            movie_id: item.movie_id,
            movie_title: item.movie_title,
            movie_poster: item.movie_poster,
            added_at: item.added_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistDto {
    pub movies: Vec<WatchlistMovieDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InWatchlistDto {
    pub in_watchlist: bool,
}

/// Login/register response: the session cookie is set alongside, the token
/// serves bearer-only clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserDto,
    pub token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthDto {
    pub status: &'static str,
    pub timestamp: String,
}
