//! Hostname validation and canonicalization.
//!
//! # Responsibilities
//! - Validate registered hosts against the RFC 1123 grammar
//! - Produce the canonical lookup key (lowercase, optional `www.` trim)
//!
//! # Design Decisions
//! - Matching is case-insensitive (RFC 9110)
//! - No regex; labels are checked byte by byte
//! - No IDNA or port handling: keys are plain ASCII hostnames

use std::borrow::Borrow;
use std::fmt;

use crate::error::VhostError;

const MAX_LABEL_LEN: usize = 63;
const MAX_HOST_LEN: usize = 253;
const WWW_PREFIX: &str = "www.";

/// Canonical host used as the registry key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostKey(String);

impl HostKey {
    /// Validate `raw` and canonicalize it.
    pub fn parse(raw: &str, trim_www: bool) -> Result<Self, VhostError> {
        if !is_rfc1123(raw) {
            return Err(VhostError::InvalidHost {
                host: raw.to_string(),
            });
        }
        Ok(Self::lookup(raw, trim_www))
    }

    /// Canonicalize without validation.
    ///
    /// Used on the dispatch path, where a malformed request host simply
    /// misses instead of failing.
    pub fn lookup(raw: &str, trim_www: bool) -> Self {
        let host = raw.to_ascii_lowercase();
        if trim_www {
            if let Some(rest) = host.strip_prefix(WWW_PREFIX) {
                return Self(rest.to_string());
            }
        }
        Self(host)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HostKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for HostKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for HostKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Returns true if `host` is a dot-separated sequence of RFC 1123 labels.
pub fn is_rfc1123(host: &str) -> bool {
    !host.is_empty() && host.len() <= MAX_HOST_LEN && host.split('.').all(is_label)
}

fn is_label(label: &str) -> bool {
    let bytes = label.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) => {
            bytes.len() <= MAX_LABEL_LEN
                && first.is_ascii_alphanumeric()
                && last.is_ascii_alphanumeric()
                && bytes.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'-')
        }
        _ => false,
    }
}
