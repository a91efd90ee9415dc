//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (at startup):
//!     Vhost { host, app }
//!     → host.rs (RFC 1123 check, canonical HostKey)
//!     → handler::normalize (canonical Handler)
//!     → registry.rs (insert, reject duplicates)
//!
//! Incoming Request (hostname):
//!     → host.rs (same canonicalization, no validation)
//!     → registry.rs (map lookup)
//!     → Return: matched Handler or NoMatch
//! ```
//!
//! # Design Decisions
//! - Registry built at startup, immutable at runtime
//! - Exact host match only; no wildcards, no path routing
//! - Deterministic: same hostname always matches same handler

pub mod host;
pub mod registry;

pub use host::HostKey;
pub use registry::{Route, SwitchOptions, Vhost, VhostSet, VhostSwitch};
