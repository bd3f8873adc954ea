//! Product read assembly.

mod service;
mod viewer;

pub use service::{ProductService, ProductServiceConfig, RankedProduct};
pub use viewer::{ANONYMOUS_USER, UNKNOWN_SESSION, VIEW_SOURCE, Viewer};
