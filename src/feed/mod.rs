//! Bridges one tick source to a display session.

pub mod controller;
pub mod history;
pub mod session;

pub use controller::PriceFeed;
pub use history::{one_minute_ago_price, History, DEFAULT_HISTORY_LEN, ONE_MINUTE_MS};
pub use session::{FeedSession, FeedState};
