//! HTTP route handlers.

pub mod health;
pub mod leaderboard;
pub mod metrics;
pub mod orders;
pub mod products;
pub mod timeline;
