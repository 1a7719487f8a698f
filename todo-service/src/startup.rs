//! Application startup and lifecycle management.
//!
//! Builds the store selected by configuration, wires the HTTP router and
//! runs the server until a shutdown signal, then drains in-flight requests
//! for at most the configured grace period.

use crate::config::{StoreBackend, TodoConfig};
use crate::handlers::{
    create_todo, delete_todo, health_check, home, list_todos, metrics_endpoint, readiness_check,
    update_todo,
};
use crate::services::{InMemoryTodoStore, MongoTodoStore, TodoStore};
use axum::{
    middleware::from_fn,
    routing::{get, put},
    Router,
};
use secrecy::ExposeSecret;
use service_core::error::AppError;
use service_core::middleware::{
    metrics_middleware, request_id_middleware, security_headers_middleware, REQUEST_ID_HEADER,
};
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Slack between the per-request store deadline and the outer timeout layer,
/// so a slow store surfaces as a JSON error from the handler.
const TIMEOUT_LAYER_MARGIN: Duration = Duration::from_secs(5);

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: TodoConfig,
    pub store: Arc<dyn TodoStore>,
}

pub fn build_router(state: AppState) -> Router {
    let layer_timeout = state.config.server.request_timeout + TIMEOUT_LAYER_MARGIN;

    Router::new()
        .route("/", get(home))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_endpoint))
        .route("/todo", get(list_todos).post(create_todo))
        .route("/todo/", get(list_todos).post(create_todo))
        .route("/todo/:id", put(update_todo).delete(delete_todo))
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(TimeoutLayer::new(layer_timeout))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the store backend named in `config`.
    ///
    /// An unreachable MongoDB is fatal here; the service never starts
    /// without a working store.
    pub async fn build(config: TodoConfig) -> Result<Self, AppError> {
        let store: Arc<dyn TodoStore> = match config.store {
            StoreBackend::Mongo => {
                let store = MongoTodoStore::connect(
                    config.mongodb.uri.expose_secret(),
                    &config.mongodb.database,
                    &config.mongodb.collection,
                )
                .await
                .map_err(|e| {
                    tracing::error!("Failed to connect to MongoDB: {}", e);
                    e
                })?;

                store.initialize_indexes().await.map_err(|e| {
                    tracing::error!("Failed to initialize database indexes: {}", e);
                    e
                })?;

                Arc::new(store)
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory todo store, data is lost on restart");
                Arc::new(InMemoryTodoStore::new())
            }
        };

        Self::with_store(config, store).await
    }

    /// Build the application around an already constructed store.
    pub async fn with_store(
        config: TodoConfig,
        store: Arc<dyn TodoStore>,
    ) -> Result<Self, AppError> {
        // Port 0 binds a random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            service = %config.service_name,
            environment = ?config.environment,
            port,
            "Todo service listening"
        );

        Ok(Self {
            port,
            listener,
            state: AppState { config, store },
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn store(&self) -> Arc<dyn TodoStore> {
        self.state.store.clone()
    }

    /// Run the application until SIGINT or SIGTERM.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.run_with_shutdown(shutdown_signal()).await
    }

    /// Run the application until `signal` resolves.
    ///
    /// New connections stop being accepted as soon as the signal fires.
    /// Requests already in flight get `shutdown_grace` to finish; whatever is
    /// still running after that is dropped.
    pub async fn run_with_shutdown<S>(self, signal: S) -> std::io::Result<()>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        let grace = self.state.config.server.shutdown_grace;
        let token = CancellationToken::new();
        let router = build_router(self.state.clone());

        let mut server = Box::pin(
            axum::serve(self.listener, router)
                .with_graceful_shutdown(token.clone().cancelled_owned())
                .into_future(),
        );

        tokio::select! {
            result = &mut server => {
                if let Err(e) = &result {
                    tracing::error!("HTTP server error: {}", e);
                }
                return result;
            }
            _ = signal => {}
        }

        tracing::info!(
            grace_seconds = grace.as_secs(),
            "Shutting down, draining in-flight requests"
        );
        token.cancel();

        match tokio::time::timeout(grace, server).await {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!("In-flight requests did not finish within the grace period")
            }
        }

        tracing::info!("Service shutdown complete");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
