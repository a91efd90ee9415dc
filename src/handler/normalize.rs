//! Coercion of handler shapes into a single [`Handler`].
//!
//! # Responsibilities
//! - Validate function arity (1 or 2 parameters)
//! - Flatten nested lists depth-first, preserving order
//! - Compose sequences into one onion-style chain
//!
//! # Design Decisions
//! - Fail fast on the first invalid shape
//! - A chain is a shared slice plus an index carried by `Next`, not nested
//!   closures; a chain of one is the handler itself
//! - An empty list composes to a pass-through

use std::sync::Arc;

use super::app::App;
use super::func::{HandlerFn, IntoHandlerFn};
use super::{Handler, Next};
use crate::error::VhostError;

/// The handler shapes accepted at registration.
#[derive(Debug, Clone)]
pub enum HandlerSource {
    /// A plain function.
    Fn(HandlerFn),
    /// An ordered, possibly nested, list of sources.
    List(Vec<HandlerSource>),
    /// A sub-application mounted as a unit.
    SubApp(App),
}

impl HandlerSource {
    /// Source for a plain function.
    pub fn func<F, M>(f: F) -> Self
    where
        F: IntoHandlerFn<M>,
    {
        Self::Fn(f.into_handler_fn())
    }
}

impl From<HandlerFn> for HandlerSource {
    fn from(f: HandlerFn) -> Self {
        Self::Fn(f)
    }
}

impl From<App> for HandlerSource {
    fn from(app: App) -> Self {
        Self::SubApp(app)
    }
}

impl<T: Into<HandlerSource>> From<Vec<T>> for HandlerSource {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<HandlerSource>, const N: usize> From<[T; N]> for HandlerSource {
    fn from(items: [T; N]) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

/// Turn any accepted shape into a single handler.
pub fn normalize(source: HandlerSource) -> Result<Handler, VhostError> {
    match source {
        HandlerSource::SubApp(app) => {
            if app.is_empty() {
                return Err(VhostError::CorruptSubApp);
            }
            let handlers = app
                .into_middleware()
                .into_iter()
                .map(normalize_fn)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(compose(handlers))
        }
        HandlerSource::List(items) => {
            let mut flat = Vec::with_capacity(items.len());
            flatten(items, &mut flat);
            let handlers = flat
                .into_iter()
                .map(normalize)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(compose(handlers))
        }
        HandlerSource::Fn(f) => normalize_fn(f),
    }
}

fn normalize_fn(f: HandlerFn) -> Result<Handler, VhostError> {
    let (name, arity, handler) = f.into_parts();
    if arity < 1 {
        return Err(VhostError::TooFewArguments { name });
    }
    if arity > 2 {
        return Err(VhostError::TooManyArguments { name, arity });
    }
    handler.ok_or_else(|| VhostError::InvalidAppType {
        found: name.to_string(),
    })
}

fn flatten(items: Vec<HandlerSource>, out: &mut Vec<HandlerSource>) {
    for item in items {
        match item {
            HandlerSource::List(nested) => flatten(nested, out),
            other => out.push(other),
        }
    }
}

/// Compose handlers into one chain.
///
/// Calling the result with `(req, next)` runs `handlers[0]` with a
/// continuation into `handlers[1]`, and so on; the last handler's
/// continuation is `next`.
pub fn compose(mut handlers: Vec<Handler>) -> Handler {
    if handlers.len() == 1 {
        if let Some(handler) = handlers.pop() {
            return handler;
        }
    }

    let chain: Arc<[Handler]> = handlers.into();
    Handler::new(move |req, next| Next::chained(Arc::clone(&chain), next).run(req))
}
