pub mod prelude;

pub mod follows;
pub mod review_likes;
pub mod reviews;
pub mod users;
pub mod watchlist_items;
