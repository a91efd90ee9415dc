//! Registration errors.
//!
//! Every variant is raised while the switch is being built. Dispatch never
//! produces one of these: an unmatched host is a `NoMatch`, not an error.

use thiserror::Error;

use crate::routing::host::HostKey;

#[derive(Debug, Error)]
pub enum VhostError {
    #[error("host {host:?} is not an RFC 1123 hostname")]
    InvalidHost { host: String },

    #[error("mount for virtual host \"{0}\" already exists")]
    DuplicateHost(HostKey),

    #[error("app type is invalid: {found}")]
    InvalidAppType { found: String },

    #[error("app `{name}` should accept at least 1 argument")]
    TooFewArguments { name: &'static str },

    #[error("app `{name}` should accept 2 arguments at most, it accepts {arity}")]
    TooManyArguments { name: &'static str, arity: usize },

    #[error("sub-application passed as a handler has no middleware")]
    CorruptSubApp,

    #[error("zero vhosts were passed to be registered")]
    EmptyBatch,

    #[error("no app named {0:?} in the catalog")]
    UnknownApp(String),

    #[error("invalid app table: {0}")]
    InvalidAppTable(String),
}
