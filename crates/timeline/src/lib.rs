//! Timeline query engine.
//!
//! Rebuilds the newest-first event history of one product from a store
//! partitioned by `(product, day)`:
//! - [`TimelineWindow`] normalizes the requested date range and limit
//! - [`PartitionScan`] walks the window's days, newest first
//! - [`TimelineQueryEngine`] reads partitions with a shrinking budget and
//!   stops as soon as the limit is met
//!
//! Unreachable partitions shrink the result; they never fail the query.

pub mod engine;
pub mod window;

pub use engine::{TimelineConfig, TimelineQueryEngine};
pub use window::{PartitionScan, TimelineWindow};
