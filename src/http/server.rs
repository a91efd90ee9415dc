//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router around the virtual host switch
//! - Answer unmatched hosts with the configured fallback response
//! - Wire up middleware (tracing, timeout, request ID)
//! - Serve on a listener until shutdown

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{FallbackConfig, SwitchConfig};
use crate::http::middleware::dispatch_layer;
use crate::routing::VhostSwitch;

/// Response served when no virtual host matches.
#[derive(Debug, Clone)]
struct Fallback {
    status: StatusCode,
    body: Bytes,
}

impl Fallback {
    fn from_config(config: &FallbackConfig) -> Self {
        let status = StatusCode::from_u16(config.status).unwrap_or_else(|_| {
            tracing::warn!(status = config.status, "Invalid fallback status, using 404");
            StatusCode::NOT_FOUND
        });
        Self {
            status,
            body: Bytes::from(config.body.clone()),
        }
    }
}

/// HTTP server dispatching on virtual hosts.
pub struct HttpServer {
    router: Router,
    switch: Arc<VhostSwitch>,
}

impl HttpServer {
    /// Create a new HTTP server serving `switch`.
    pub fn new(config: SwitchConfig, switch: VhostSwitch) -> Self {
        let switch = Arc::new(switch);
        let router = Self::build_router(&config, &switch);
        Self { router, switch }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &SwitchConfig, switch: &Arc<VhostSwitch>) -> Router {
        Router::new()
            .fallback(fallback_handler)
            .with_state(Fallback::from_config(&config.fallback))
            .layer(middleware::from_fn_with_state(
                switch.as_middleware(),
                dispatch_layer,
            ))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    ))),
            )
    }

    /// The router, for serving in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            vhosts = self.switch.len(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn fallback_handler(State(fallback): State<Fallback>) -> Response {
    (fallback.status, fallback.body).into_response()
}
