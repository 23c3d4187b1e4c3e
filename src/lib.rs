pub mod config;
pub mod error;
pub mod feed;
pub mod model;
pub mod pnl;
pub mod stream;
pub mod ui;
