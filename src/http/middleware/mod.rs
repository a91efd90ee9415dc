//! Axum middleware adapters.

pub mod vhost;

pub use vhost::dispatch_layer;
