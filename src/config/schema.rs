//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the switch.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SwitchConfig {
    /// Treat `www.<host>` as `<host>`.
    pub trim_www: bool,

    /// Take the hostname from `X-Forwarded-Host` when present.
    pub trust_proxy: bool,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Response for requests no vhost claims.
    pub fallback: FallbackConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Virtual host definitions.
    pub vhosts: Vec<VhostConfig>,
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self {
            trim_www: true,
            trust_proxy: false,
            listener: ListenerConfig::default(),
            timeouts: TimeoutConfig::default(),
            fallback: FallbackConfig::default(),
            observability: ObservabilityConfig::default(),
            vhosts: Vec::new(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Fallback response configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FallbackConfig {
    pub status: u16,
    pub body: String,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            status: 404,
            body: "Not Found".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Emit JSON lines instead of human-readable output.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "vhost_switch=info,tower_http=info".to_string(),
            json_logs: false,
        }
    }
}

/// A virtual host as written in the config file.
///
/// Both fields stay raw so that registration can report exactly what was
/// written when it is the wrong type.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VhostConfig {
    /// Hostname to match.
    pub host: Option<toml::Value>,

    /// App mounted on the host: a catalog name, a response table, or a list.
    pub app: Option<toml::Value>,
}
