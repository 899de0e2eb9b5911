pub mod follow;
pub mod review;
pub mod user;
pub mod watchlist;
