pub use super::follows::Entity as Follows;
pub use super::review_likes::Entity as ReviewLikes;
pub use super::reviews::Entity as Reviews;
pub use super::users::Entity as Users;
pub use super::watchlist_items::Entity as WatchlistItems;
