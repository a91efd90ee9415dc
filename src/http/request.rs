//! Request inspection.
//!
//! # Responsibilities
//! - Extract the hostname a request is addressed to
//!
//! # Design Decisions
//! - `X-Forwarded-Host` only when the deployment trusts its proxy
//! - `Host` header first, URI authority second (HTTP/2 `:authority`)
//! - Header values parsed as `Authority`; port stripped, bracketed IPv6 kept
//! - Userinfo is dropped from the URI authority only; in a header it is a NoMatch

use axum::body::Body;
use axum::http::uri::Authority;
use axum::http::{header, HeaderMap, Request};

pub const X_FORWARDED_HOST: &str = "x-forwarded-host";

/// Hostname the request targets, without port.
pub fn hostname(req: &Request<Body>, trust_proxy: bool) -> Option<&str> {
    if trust_proxy {
        if let Some(value) = forwarded_host(req.headers()) {
            return authority_host(value);
        }
    }

    match header_str(req.headers(), header::HOST.as_str()) {
        Some(value) => authority_host(value.trim()),
        None => req
            .uri()
            .authority()
            .map(Authority::host)
            .filter(|host| !host.is_empty()),
    }
}

fn forwarded_host(headers: &HeaderMap) -> Option<&str> {
    header_str(headers, X_FORWARDED_HOST)
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|host| !host.is_empty())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Host part of a `host[:port]` header value.
fn authority_host(value: &str) -> Option<&str> {
    if value.contains('@') {
        return None;
    }
    let authority: Authority = value.parse().ok()?;
    // without userinfo the host is a prefix of the value
    let host = value.get(..authority.host().len())?;
    (!host.is_empty()).then_some(host)
}
