//! Per-request context handed from the handlers down to the store.
//!
//! Carries the request id minted by `request_id_middleware` and a deadline
//! derived from the configured request timeout. Store calls run through
//! [`RequestContext::run`] so a slow database cannot outlive the request.

use crate::startup::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use service_core::error::AppError;
use service_core::middleware::REQUEST_ID_HEADER;
use std::convert::Infallible;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    deadline: Instant,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>, timeout: Duration) -> Self {
        Self {
            request_id: request_id.into(),
            deadline: Instant::now() + timeout,
        }
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Awaits `operation` no later than the request deadline.
    pub async fn run<T, F>(&self, name: &'static str, operation: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        match tokio::time::timeout_at(self.deadline, operation).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    request_id = %self.request_id,
                    operation = name,
                    "Store operation exceeded the request deadline"
                );
                Err(AppError::DatabaseError(anyhow::anyhow!(
                    "{} timed out before the request deadline",
                    name
                )))
            }
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let request_id = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        Ok(Self::new(request_id, state.config.server.request_timeout))
    }
}
