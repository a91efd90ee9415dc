//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks)
//!     → SwitchConfig (validated, immutable)
//!     → apps.rs (vhost tables → HandlerSource → VhostSwitch)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Host and app values stay raw TOML until registration, so shape errors
//!   surface as registration errors naming the offending value

pub mod apps;
pub mod loader;
pub mod schema;
pub mod validation;

pub use apps::{build_switch, AppCatalog};
pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    FallbackConfig, ListenerConfig, ObservabilityConfig, SwitchConfig, TimeoutConfig,
    VhostConfig,
};
