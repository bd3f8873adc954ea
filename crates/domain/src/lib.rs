//! Read-assembly and write fan-out over the three stores.
//!
//! This crate provides:
//! - [`ProductService`]: cache-aside product lookup with view counting,
//!   leaderboard scoring and view events
//! - [`OrderService`]: order placement with per-item purchase events
//! - [`EventRecorder`]: detached event-log writes that callers never wait on

pub mod error;
pub mod order;
pub mod product;
pub mod recorder;

pub use error::{DomainError, Result};
pub use order::OrderService;
pub use product::{ProductService, ProductServiceConfig, RankedProduct, Viewer};
pub use recorder::EventRecorder;
