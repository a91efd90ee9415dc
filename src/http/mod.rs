//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, trace/timeout/request-id layers)
//!     → middleware/vhost.rs (switch dispatch)
//!         → request.rs (hostname extraction)
//!         → matched vhost handler, or
//!     → fallback response
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::hostname;
pub use response::{SetHeaders, StaticResponse};
pub use server::HttpServer;
