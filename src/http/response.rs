//! Built-in response apps.
//!
//! # Responsibilities
//! - Static responses (status, headers, body) for config-declared vhosts
//! - Header-setting middleware applied on the way out
//!
//! # Design Decisions
//! - Both are ordinary handler functions: the registry treats them like any
//!   user-supplied app
//! - Bodies are `Bytes`, so each response clones a reference, not the payload

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::handler::{handler_fn, HandlerFn, Next};

/// A fixed response. Terminal: never continues the chain.
#[derive(Debug, Clone)]
pub struct StaticResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl StaticResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    pub fn into_handler_fn(self) -> HandlerFn {
        handler_fn(move |_req: Request<Body>| {
            let res = self.clone();
            async move { res }
        })
    }
}

impl IntoResponse for StaticResponse {
    fn into_response(self) -> Response {
        (self.status, self.headers, self.body).into_response()
    }
}

/// Runs the rest of the chain, then sets headers on its response.
#[derive(Debug, Clone)]
pub struct SetHeaders {
    headers: HeaderMap,
}

impl SetHeaders {
    pub fn new(headers: HeaderMap) -> Self {
        Self { headers }
    }

    pub fn into_handler_fn(self) -> HandlerFn {
        handler_fn(move |req: Request<Body>, next: Next| {
            let headers = self.headers.clone();
            async move {
                let mut res = next.run(req).await;
                res.headers_mut().extend(headers);
                res
            }
        })
    }
}
