//! Virtual host dispatch as an axum middleware.
//!
//! Wraps axum's `Next` as the fall-through continuation, so an unmatched
//! host continues down the router's own stack:
//!
//! ```rust,ignore
//! let switch = Arc::new(switch);
//! let app = Router::new()
//!     .fallback(not_found)
//!     .layer(axum::middleware::from_fn_with_state(switch.as_middleware(), dispatch_layer));
//! ```

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware,
    response::Response,
};

use crate::handler::{Handler, Next};

pub async fn dispatch_layer(
    State(handler): State<Handler>,
    req: Request<Body>,
    next: middleware::Next,
) -> Response {
    let fallthrough = Next::new(move |req| next.run(req));
    handler.call(req, fallthrough).await
}
