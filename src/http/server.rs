//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router around the muxer dispatcher
//! - Wire up middleware (tracing, timeout, body limit, request ID, panic guard)
//! - Bind server to listener and serve until shutdown

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::Request;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::http::request::UuidRequestId;
use crate::routing::Dispatcher;

/// HTTP server for the web application.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    /// Create a new HTTP server that hands every request to `dispatcher`.
    pub fn new(config: AppConfig, dispatcher: Dispatcher) -> Self {
        let router = Self::build_router(&config, Arc::new(dispatcher));
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, dispatcher: Arc<Dispatcher>) -> Router {
        Router::new()
            .fallback(move |req: Request| {
                let dispatcher = dispatcher.clone();
                async move { dispatcher.dispatch(req).await }
            })
            .layer(CatchPanicLayer::new())
            .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// The fully layered router, for driving the app in memory.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            app = %self.config.app_name,
            "HTTP server starting"
        );

        let graceful = self.config.graceful_shutdown;
        let serve = axum::serve(listener, self.router);
        if graceful {
            serve
                .with_graceful_shutdown(async move {
                    let _ = shutdown.recv().await;
                    tracing::info!("HTTP server draining connections");
                })
                .await?;
        } else {
            tokio::select! {
                result = serve.into_future() => result?,
                _ = shutdown.recv() => {}
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::X_REQUEST_ID;
    use crate::routing::Muxer;
    use axum::body::Body;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    async fn boom() -> &'static str {
        panic!("handler blew up")
    }

    fn server() -> HttpServer {
        let mut mux = Muxer::new(());
        mux.get("/", || async { "home" }).unwrap();
        mux.get("/panic", boom).unwrap();
        HttpServer::new(AppConfig::default(), mux.build().unwrap())
    }

    #[tokio::test]
    async fn test_routes_through_dispatcher_with_request_id() {
        let res = server()
            .router()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().contains_key(X_REQUEST_ID));
    }

    #[tokio::test]
    async fn test_keeps_client_request_id() {
        let req = Request::builder()
            .uri("/")
            .header(X_REQUEST_ID, "client-id")
            .body(Body::empty())
            .unwrap();
        let res = server().router().oneshot(req).await.unwrap();
        assert_eq!(res.headers().get(X_REQUEST_ID).unwrap(), "client-id");
    }

    #[tokio::test]
    async fn test_panic_becomes_500() {
        let res = server()
            .router()
            .oneshot(Request::builder().uri("/panic").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let (tx, rx) = broadcast::channel(1);
        let handle = tokio::spawn(server().run(listener, rx));

        tx.send(()).unwrap();
        let result = tokio::time::timeout(Duration::from_secs(5), handle).await;
        assert!(matches!(result, Ok(Ok(Ok(())))));
    }
}
