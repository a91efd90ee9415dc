//! Plain functions as handlers.
//!
//! Functions are accepted through [`IntoHandlerFn`], implemented for closures
//! and `async fn`s of every arity up to six, Axum-style. The arity is recorded
//! so that the normalizer can reject shapes that don't fit the
//! `(request, next)` convention. Only one- and two-argument functions are
//! callable:
//!
//! ```rust,ignore
//! async fn hello(_req: Request<Body>) -> &'static str { "Hello" }
//!
//! async fn powered_by(req: Request<Body>, next: Next) -> Response {
//!     let mut res = next.run(req).await;
//!     res.headers_mut().insert("x-powered-by", HeaderValue::from_static("vhost"));
//!     res
//! }
//! ```

use std::fmt;
use std::future::Future;

use axum::body::Body;
use axum::http::Request;
use axum::response::IntoResponse;

use super::{Handler, Next};

/// A function erased together with its declared arity.
#[derive(Clone)]
pub struct HandlerFn {
    name: &'static str,
    arity: usize,
    /// `None` when the arity doesn't fit `(request, next)`.
    handler: Option<Handler>,
}

impl HandlerFn {
    /// Number of parameters the function declares.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Type name of the wrapped function.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn into_parts(self) -> (&'static str, usize, Option<Handler>) {
        (self.name, self.arity, self.handler)
    }

    fn declared<F>(arity: usize) -> Self {
        Self {
            name: std::any::type_name::<F>(),
            arity,
            handler: None,
        }
    }
}

impl fmt::Debug for HandlerFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerFn")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

/// Conversion of a function into a [`HandlerFn`].
///
/// `M` is a marker describing the argument list; it is inferred.
pub trait IntoHandlerFn<M> {
    fn into_handler_fn(self) -> HandlerFn;
}

/// Wrap a function as a [`HandlerFn`].
pub fn handler_fn<F, M>(f: F) -> HandlerFn
where
    F: IntoHandlerFn<M>,
{
    f.into_handler_fn()
}

impl IntoHandlerFn<()> for HandlerFn {
    fn into_handler_fn(self) -> HandlerFn {
        self
    }
}

// Zero arguments: recorded, rejected at registration.
impl<F, Fut> IntoHandlerFn<((),)> for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future,
{
    fn into_handler_fn(self) -> HandlerFn {
        HandlerFn::declared::<F>(0)
    }
}

impl<F, Fut, R> IntoHandlerFn<(Request<Body>,)> for F
where
    F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    fn into_handler_fn(self) -> HandlerFn {
        let handler = Handler::new(move |req, _next| {
            let fut = (self)(req);
            Box::pin(async move { fut.await.into_response() })
        });

        HandlerFn {
            name: std::any::type_name::<F>(),
            arity: 1,
            handler: Some(handler),
        }
    }
}

impl<F, Fut, R> IntoHandlerFn<(Request<Body>, Next)> for F
where
    F: Fn(Request<Body>, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    fn into_handler_fn(self) -> HandlerFn {
        let handler = Handler::new(move |req, next| {
            let fut = (self)(req, next);
            Box::pin(async move { fut.await.into_response() })
        });

        HandlerFn {
            name: std::any::type_name::<F>(),
            arity: 2,
            handler: Some(handler),
        }
    }
}

/// Arities above two are recorded, then rejected at registration.
macro_rules! impl_declared_arity {
    ($arity:expr; $($ty:ident),+) => {
        impl<F, Fut, $($ty,)+> IntoHandlerFn<($($ty,)+)> for F
        where
            F: Fn($($ty,)+) -> Fut + Send + Sync + 'static,
            Fut: Future,
        {
            fn into_handler_fn(self) -> HandlerFn {
                HandlerFn::declared::<F>($arity)
            }
        }
    };
}

impl_declared_arity!(3; T1, T2, T3);
impl_declared_arity!(4; T1, T2, T3, T4);
impl_declared_arity!(5; T1, T2, T3, T4, T5);
impl_declared_arity!(6; T1, T2, T3, T4, T5, T6);
