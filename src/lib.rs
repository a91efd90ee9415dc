//! Host-based request dispatch for axum.
//!
//! Handlers are registered per virtual host; a request is routed by its
//! hostname to the matching handler, or falls through to the next layer.
//!
//! ```rust,ignore
//! use vhost_switch::{handler_fn, App, VhostSwitch};
//!
//! let mut switch = VhostSwitch::default();
//! switch
//!     .vhost("example.com", handler_fn(home))?
//!     .vhost("api.example.com", vec![handler_fn(auth), handler_fn(api)])?
//!     .vhost("admin.example.com", App::new().with(auth).with(admin))?;
//! ```

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::SwitchConfig;
pub use error::VhostError;
pub use handler::{handler_fn, App, Handler, HandlerSource, Next};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{HostKey, Route, SwitchOptions, Vhost, VhostSwitch};
