//! Order placement.

mod service;

pub use service::OrderService;
