//! Handler normalization subsystem.
//!
//! # Data Flow
//! ```text
//! Registration:
//!     HandlerSource (Fn | List | SubApp)
//!     → normalize.rs (arity checks, flatten nested lists)
//!     → compose (index-based chain)
//!     → Handler (stored in the registry)
//!
//! Request time:
//!     Handler::call(request, next)
//!     → chain[0] ── next.run ──▶ chain[1] ── … ──▶ outer continuation
//! ```
//!
//! # Design Decisions
//! - Shape checks happen once, at registration; the hot path only calls
//! - `Next` is consumed by `run`, so a continuation fires at most once
//! - Handlers are `Send + Sync` and return `'static` futures so they run on
//!   the multi-threaded runtime

pub mod app;
pub mod func;
pub mod normalize;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use futures_util::future::BoxFuture;

pub use app::App;
pub use func::{handler_fn, HandlerFn, IntoHandlerFn};
pub use normalize::{compose, normalize, HandlerSource};

/// Future returned by every handler.
pub type HandlerFuture = BoxFuture<'static, Response>;

type Continuation = Box<dyn FnOnce(Request<Body>) -> HandlerFuture + Send>;

/// A normalized `(request, next)` callable.
#[derive(Clone)]
pub struct Handler {
    inner: Arc<dyn Fn(Request<Body>, Next) -> HandlerFuture + Send + Sync>,
}

impl Handler {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Request<Body>, Next) -> HandlerFuture + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Invoke the handler.
    pub fn call(&self, req: Request<Body>, next: Next) -> HandlerFuture {
        (self.inner)(req, next)
    }

    /// Returns true if both values share the same underlying callable.
    pub fn ptr_eq(&self, other: &Handler) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").finish_non_exhaustive()
    }
}

/// Continuation handed to every handler.
///
/// Runs the rest of the chain it belongs to and then the continuation that
/// chain was itself invoked with.
pub struct Next {
    chain: Arc<[Handler]>,
    position: usize,
    tail: Continuation,
}

impl Next {
    /// A continuation that runs `f`.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: FnOnce(Request<Body>) -> Fut + Send + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        Self {
            chain: Arc::from(Vec::new()),
            position: 0,
            tail: Box::new(move |req: Request<Body>| -> HandlerFuture { Box::pin(f(req)) }),
        }
    }

    /// Continue at the head of `chain`, then fall back to `outer`.
    pub(crate) fn chained(chain: Arc<[Handler]>, outer: Next) -> Self {
        Self {
            chain,
            position: 0,
            tail: Box::new(move |req: Request<Body>| outer.run(req)),
        }
    }

    /// Run the remainder of the chain.
    pub fn run(self, req: Request<Body>) -> HandlerFuture {
        let Next {
            chain,
            position,
            tail,
        } = self;

        match chain.get(position).cloned() {
            Some(handler) => {
                let next = Next {
                    chain,
                    position: position + 1,
                    tail,
                };
                handler.call(req, next)
            }
            None => tail(req),
        }
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("position", &self.position)
            .field("remaining", &self.chain.len().saturating_sub(self.position))
            .finish_non_exhaustive()
    }
}
