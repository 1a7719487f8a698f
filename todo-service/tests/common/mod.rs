#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use todo_service::config::{StoreBackend, TodoConfig};
use todo_service::services::{InMemoryTodoStore, TodoStore};
use todo_service::startup::{build_router, AppState, Application};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower::ServiceExt;

pub fn memory_config() -> TodoConfig {
    let mut config = TodoConfig {
        store: StoreBackend::Memory,
        ..TodoConfig::default()
    };
    // Use random port for testing (port 0)
    config.common.port = 0;
    config
}

/// Router driven in-process through `oneshot`, backed by a memory store.
pub struct TestRouter {
    router: Router,
    pub store: Arc<InMemoryTodoStore>,
}

impl TestRouter {
    pub fn new() -> Self {
        Self::wrapping(memory_config(), |store| store as Arc<dyn TodoStore>)
    }

    /// Serves `config` through a store built around the shared memory store,
    /// e.g. one that adds latency.
    pub fn wrapping<F>(config: TodoConfig, wrap: F) -> Self
    where
        F: FnOnce(Arc<InMemoryTodoStore>) -> Arc<dyn TodoStore>,
    {
        let store = Arc::new(InMemoryTodoStore::new());
        let router = build_router(AppState {
            config,
            store: wrap(store.clone()),
        });
        Self { router, store }
    }

    pub async fn raw(&self, method: &str, uri: &str, body: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(body) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };

        self.router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    /// Sends a request and returns the status with the body parsed as JSON
    /// (`Value::Null` when the body is not JSON).
    pub async fn send(&self, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let response = self.raw(method, uri, body).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    /// Creates a todo and returns its hex id.
    pub async fn create(&self, title: &str) -> String {
        let body = serde_json::json!({ "title": title }).to_string();
        let (status, json) = self.send("POST", "/todo/", Some(&body)).await;
        assert_eq!(status, StatusCode::OK, "create failed: {json}");
        json["todo_id"].as_str().unwrap().to_string()
    }
}

/// Server bound to a real port, stopped through [`TestApp::stop`].
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub store: Arc<dyn TodoStore>,
    shutdown: oneshot::Sender<()>,
    server: JoinHandle<std::io::Result<()>>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_store(Arc::new(InMemoryTodoStore::new())).await
    }

    pub async fn spawn_with_store(store: Arc<dyn TodoStore>) -> Self {
        let app = Application::with_store(memory_config(), store)
            .await
            .expect("Failed to build application");
        Self::start(app)
    }

    pub async fn spawn_with_config(config: TodoConfig) -> Self {
        let app = Application::build(config)
            .await
            .expect("Failed to build application");
        Self::start(app)
    }

    fn start(app: Application) -> Self {
        let port = app.port();
        let store = app.store();
        let (shutdown, stopped) = oneshot::channel::<()>();

        let server = tokio::spawn(app.run_with_shutdown(async move {
            let _ = stopped.await;
        }));

        Self {
            address: format!("http://127.0.0.1:{}", port),
            port,
            store,
            shutdown,
            server,
        }
    }

    pub async fn stop(self) -> std::io::Result<()> {
        let _ = self.shutdown.send(());
        self.server.await.expect("server task panicked")
    }
}
