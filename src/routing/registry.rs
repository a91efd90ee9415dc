//! Virtual host registry and dispatch.
//!
//! # Responsibilities
//! - Store normalized handlers keyed by canonical host
//! - Reject duplicate hosts without overwriting
//! - Look up the handler for a request hostname
//! - Expose the registry as a single middleware handler
//!
//! # Design Decisions
//! - Mutable only while building; frozen behind `Arc` once serving
//! - O(1) host lookup via HashMap
//! - Explicit `NoMatch` rather than silent default
//! - Batches are not atomic: entries before a failure stay registered

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;

use crate::error::VhostError;
use crate::handler::{normalize, Handler, HandlerFuture, HandlerSource, Next};
use crate::http::request::hostname;
use crate::routing::host::HostKey;

/// A single registration: a raw host and the app mounted on it.
#[derive(Debug, Clone)]
pub struct Vhost {
    pub host: String,
    pub app: HandlerSource,
}

impl Vhost {
    pub fn new(host: impl Into<String>, app: impl Into<HandlerSource>) -> Self {
        Self {
            host: host.into(),
            app: app.into(),
        }
    }
}

/// One or more registrations, possibly nested.
#[derive(Debug, Clone)]
pub enum VhostSet {
    One(Vhost),
    Many(Vec<VhostSet>),
}

impl VhostSet {
    fn flatten(self, out: &mut Vec<Vhost>) {
        match self {
            VhostSet::One(vhost) => out.push(vhost),
            VhostSet::Many(sets) => {
                for set in sets {
                    set.flatten(out);
                }
            }
        }
    }
}

impl From<Vhost> for VhostSet {
    fn from(vhost: Vhost) -> Self {
        VhostSet::One(vhost)
    }
}

impl From<Vec<Vhost>> for VhostSet {
    fn from(vhosts: Vec<Vhost>) -> Self {
        VhostSet::Many(vhosts.into_iter().map(VhostSet::One).collect())
    }
}

impl From<Vec<VhostSet>> for VhostSet {
    fn from(sets: Vec<VhostSet>) -> Self {
        VhostSet::Many(sets)
    }
}

impl<const N: usize> From<[Vhost; N]> for VhostSet {
    fn from(vhosts: [Vhost; N]) -> Self {
        VhostSet::Many(vhosts.into_iter().map(VhostSet::One).collect())
    }
}

/// Construction options.
#[derive(Debug, Clone)]
pub struct SwitchOptions {
    /// Treat `www.example.com` and `example.com` as the same host.
    pub trim_www: bool,
    /// Read the hostname from `X-Forwarded-Host` when present.
    pub trust_proxy: bool,
    /// Registrations applied at construction.
    pub vhosts: Vec<Vhost>,
}

impl Default for SwitchOptions {
    fn default() -> Self {
        Self {
            trim_www: true,
            trust_proxy: false,
            vhosts: Vec::new(),
        }
    }
}

/// Outcome of a host lookup.
#[derive(Debug, Clone, Copy)]
pub enum Route<'a> {
    Matched(&'a Handler),
    NoMatch,
}

impl<'a> Route<'a> {
    pub fn is_match(&self) -> bool {
        matches!(self, Route::Matched(_))
    }

    pub fn handler(self) -> Option<&'a Handler> {
        match self {
            Route::Matched(handler) => Some(handler),
            Route::NoMatch => None,
        }
    }
}

/// Host-keyed handler registry.
#[derive(Debug)]
pub struct VhostSwitch {
    trim_www: bool,
    trust_proxy: bool,
    vhosts: HashMap<HostKey, Handler>,
}

impl Default for VhostSwitch {
    fn default() -> Self {
        Self {
            trim_www: true,
            trust_proxy: false,
            vhosts: HashMap::new(),
        }
    }
}

impl VhostSwitch {
    /// Build a switch and apply the initial registrations.
    ///
    /// Fails if any initial registration fails; no partial switch is returned.
    pub fn new(options: SwitchOptions) -> Result<Self, VhostError> {
        let SwitchOptions {
            trim_www,
            trust_proxy,
            vhosts,
        } = options;

        let mut switch = Self {
            trim_www,
            trust_proxy,
            vhosts: HashMap::with_capacity(vhosts.len()),
        };

        if !vhosts.is_empty() {
            switch.register(vhosts)?;
        }

        tracing::debug!(
            vhosts = switch.len(),
            trim_www,
            trust_proxy,
            "Virtual host switch built"
        );
        Ok(switch)
    }

    /// Register one or more virtual hosts.
    ///
    /// Entries are registered in order. On failure the offending entry is
    /// rejected and the error returned; entries registered before it stay.
    pub fn register(&mut self, vhosts: impl Into<VhostSet>) -> Result<&mut Self, VhostError> {
        let mut batch = Vec::new();
        vhosts.into().flatten(&mut batch);
        if batch.is_empty() {
            return Err(VhostError::EmptyBatch);
        }

        for vhost in batch {
            self.register_one(vhost).inspect_err(|e| {
                tracing::warn!(error = %e, "Virtual host registration rejected");
            })?;
        }
        Ok(self)
    }

    /// Register a single virtual host.
    pub fn vhost(
        &mut self,
        host: impl Into<String>,
        app: impl Into<HandlerSource>,
    ) -> Result<&mut Self, VhostError> {
        self.register(Vhost::new(host, app))
    }

    fn register_one(&mut self, vhost: Vhost) -> Result<(), VhostError> {
        let key = HostKey::parse(&vhost.host, self.trim_www)?;
        let handler = normalize(vhost.app)?;

        if self.vhosts.contains_key(&key) {
            return Err(VhostError::DuplicateHost(key));
        }

        tracing::debug!(host = %key, raw = %vhost.host, "Virtual host registered");
        self.vhosts.insert(key, handler);
        Ok(())
    }

    /// Look up the handler for a request hostname.
    pub fn dispatch(&self, hostname: &str) -> Route<'_> {
        let key = HostKey::lookup(hostname, self.trim_www);
        match self.vhosts.get(key.as_str()) {
            Some(handler) => Route::Matched(handler),
            None => Route::NoMatch,
        }
    }

    /// Route a request: run the matched handler, or `next` when nothing matches.
    pub fn handle(&self, req: Request<Body>, next: Next) -> HandlerFuture {
        let route = match hostname(&req, self.trust_proxy) {
            Some(host) => {
                let route = self.dispatch(host);
                tracing::trace!(host = %host, matched = route.is_match(), "Virtual host dispatch");
                route
            }
            None => {
                tracing::trace!("Request carries no hostname");
                Route::NoMatch
            }
        };

        match route {
            Route::Matched(handler) => handler.call(req, next),
            Route::NoMatch => next.run(req),
        }
    }

    /// The switch as a standing `(request, next)` handler.
    pub fn as_middleware(self: &Arc<Self>) -> Handler {
        let switch = Arc::clone(self);
        Handler::new(move |req, next| switch.handle(req, next))
    }

    pub fn trim_www(&self) -> bool {
        self.trim_www
    }

    pub fn trust_proxy(&self) -> bool {
        self.trust_proxy
    }

    pub fn len(&self) -> usize {
        self.vhosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vhosts.is_empty()
    }

    /// Registered canonical hosts, in no particular order.
    pub fn hosts(&self) -> impl Iterator<Item = &HostKey> {
        self.vhosts.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{handler_fn, App};
    use axum::http::{header, StatusCode};
    use axum::response::{IntoResponse, Response};
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn hello(_req: Request<Body>) -> &'static str {
        "Hello"
    }

    async fn world(_req: Request<Body>) -> &'static str {
        "World"
    }

    fn request_for(host: &str) -> Request<Body> {
        Request::builder()
            .uri("/")
            .header(header::HOST, host)
            .body(Body::empty())
            .unwrap()
    }

    fn counting_next(calls: &Arc<AtomicUsize>) -> Next {
        let calls = Arc::clone(calls);
        Next::new(move |_req| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            (StatusCode::NOT_FOUND, "nothing matched").into_response()
        })
    }

    async fn body_of(res: Response) -> String {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_default_construction() {
        let switch = VhostSwitch::new(SwitchOptions::default()).unwrap();
        assert!(switch.is_empty());
        assert!(switch.trim_www());
        assert!(!switch.trust_proxy());
        assert!(VhostSwitch::default().trim_www());
    }

    #[test]
    fn test_construction_with_vhosts() {
        let switch = VhostSwitch::new(SwitchOptions {
            vhosts: vec![Vhost::new("localhost", handler_fn(hello))],
            ..Default::default()
        })
        .unwrap();

        let hosts: Vec<_> = switch.hosts().map(HostKey::as_str).collect();
        assert_eq!(hosts, ["localhost"]);
    }

    #[test]
    fn test_construction_fails_on_bad_vhost() {
        let result = VhostSwitch::new(SwitchOptions {
            vhosts: vec![
                Vhost::new("localhost", handler_fn(hello)),
                Vhost::new("test@test", handler_fn(hello)),
            ],
            ..Default::default()
        });
        assert!(matches!(result, Err(VhostError::InvalidHost { .. })));
    }

    #[test]
    fn test_register_returns_self_for_chaining() {
        let mut switch = VhostSwitch::default();
        switch
            .vhost("localhost", handler_fn(hello))
            .unwrap()
            .vhost("testhost", handler_fn(world))
            .unwrap();
        assert_eq!(switch.len(), 2);
    }

    #[test]
    fn test_register_batches() {
        let mut switch = VhostSwitch::default();
        switch
            .register(vec![
                Vhost::new("localhost", handler_fn(hello)),
                Vhost::new("testhost", handler_fn(hello)),
            ])
            .unwrap();
        switch
            .register(VhostSet::Many(vec![
                Vhost::new("a.example", handler_fn(hello)).into(),
                VhostSet::from([
                    Vhost::new("b.example", handler_fn(hello)),
                    Vhost::new("c.example", handler_fn(hello)),
                ]),
            ]))
            .unwrap();
        assert_eq!(switch.len(), 5);
    }

    #[test]
    fn test_empty_batch() {
        let mut switch = VhostSwitch::default();
        assert!(matches!(
            switch.register(Vec::<Vhost>::new()),
            Err(VhostError::EmptyBatch)
        ));
        assert!(matches!(
            switch.register(VhostSet::Many(vec![VhostSet::Many(Vec::new())])),
            Err(VhostError::EmptyBatch)
        ));
    }

    #[test]
    fn test_duplicate_host() {
        let mut switch = VhostSwitch::default();
        switch.vhost("localhost", handler_fn(hello)).unwrap();

        for raw in ["localhost", "LOCALHOST", "www.localhost", "WWW.LocalHost"] {
            match switch.vhost(raw, handler_fn(world)) {
                Err(VhostError::DuplicateHost(key)) => assert_eq!(key.as_str(), "localhost"),
                other => panic!("{raw} should collide, got {other:?}"),
            }
        }
        assert_eq!(switch.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_does_not_overwrite() {
        let mut switch = VhostSwitch::default();
        switch.vhost("localhost", handler_fn(hello)).unwrap();
        assert!(switch.vhost("localhost", handler_fn(world)).is_err());

        let calls = Arc::new(AtomicUsize::new(0));
        let res = switch.handle(request_for("localhost"), counting_next(&calls)).await;
        assert_eq!(body_of(res).await, "Hello");
    }

    #[test]
    fn test_www_hosts_distinct_without_trim() {
        let mut switch = VhostSwitch::new(SwitchOptions {
            trim_www: false,
            ..Default::default()
        })
        .unwrap();
        switch.vhost("example.com", handler_fn(hello)).unwrap();
        switch.vhost("www.example.com", handler_fn(world)).unwrap();
        assert_eq!(switch.len(), 2);
    }

    #[test]
    fn test_batch_is_not_atomic() {
        let mut switch = VhostSwitch::default();
        let result = switch.register(vec![
            Vhost::new("first", handler_fn(hello)),
            Vhost::new("first", handler_fn(world)),
            Vhost::new("third", handler_fn(world)),
        ]);

        assert!(matches!(result, Err(VhostError::DuplicateHost(_))));
        assert!(switch.dispatch("first").is_match());
        assert!(!switch.dispatch("third").is_match());
    }

    #[test]
    fn test_invalid_app_rejected() {
        let mut switch = VhostSwitch::default();
        assert!(matches!(
            switch.vhost("localhost", App::new()),
            Err(VhostError::CorruptSubApp)
        ));
        assert!(matches!(
            switch.vhost("localhost", HandlerSource::func(|| async {})),
            Err(VhostError::TooFewArguments { .. })
        ));
        assert!(switch.is_empty());
    }

    #[test]
    fn test_dispatch() {
        let mut switch = VhostSwitch::default();
        switch.vhost("localhost", handler_fn(hello)).unwrap();
        switch.vhost("www.example.com", handler_fn(world)).unwrap();

        assert!(switch.dispatch("localhost").is_match());
        assert!(switch.dispatch("LOCALHOST").is_match());
        assert!(switch.dispatch("www.localhost").is_match());
        assert!(switch.dispatch("example.com").is_match());
        assert!(switch.dispatch("other").handler().is_none());
        assert!(!switch.dispatch("not a host").is_match());
    }

    #[tokio::test]
    async fn test_handle_matched_and_unmatched() {
        let mut switch = VhostSwitch::default();
        switch.vhost("localhost", handler_fn(hello)).unwrap();
        switch.vhost("127.0.0.1", handler_fn(world)).unwrap();

        let calls = Arc::new(AtomicUsize::new(0));

        let res = switch.handle(request_for("LOCALHOST"), counting_next(&calls)).await;
        assert_eq!(body_of(res).await, "Hello");

        let res = switch.handle(request_for("127.0.0.1:8080"), counting_next(&calls)).await;
        assert_eq!(body_of(res).await, "World");
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let res = switch.handle(request_for("other"), counting_next(&calls)).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_of(res).await, "nothing matched");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_as_middleware_without_host() {
        let mut switch = VhostSwitch::default();
        switch.vhost("localhost", handler_fn(hello)).unwrap();
        let middleware = Arc::new(switch).as_middleware();

        let calls = Arc::new(AtomicUsize::new(0));
        let res = middleware
            .call(Request::new(Body::empty()), counting_next(&calls))
            .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_matched_handler_receives_outer_next() {
        let mut switch = VhostSwitch::default();
        switch
            .vhost(
                "localhost",
                handler_fn(|req: Request<Body>, next: Next| async move {
                    let mut res = next.run(req).await;
                    res.headers_mut()
                        .insert("x-vhost", header::HeaderValue::from_static("localhost"));
                    res
                }),
            )
            .unwrap();
        let middleware = Arc::new(switch).as_middleware();

        let calls = Arc::new(AtomicUsize::new(0));
        let res = middleware
            .call(request_for("localhost"), counting_next(&calls))
            .await;
        assert_eq!(res.headers()["x-vhost"], "localhost");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_trust_proxy() {
        let mut switch = VhostSwitch::new(SwitchOptions {
            trust_proxy: true,
            ..Default::default()
        })
        .unwrap();
        switch.vhost("public.example", handler_fn(hello)).unwrap();

        let req = Request::builder()
            .header(header::HOST, "internal:3000")
            .header("x-forwarded-host", "public.example, internal")
            .body(Body::empty())
            .unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let res = switch.handle(req, counting_next(&calls)).await;
        assert_eq!(body_of(res).await, "Hello");
    }
}
