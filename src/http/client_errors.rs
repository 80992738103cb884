//! Client error intake.
//!
//! Web and mobile clients report runtime errors here. Reports are logged
//! and the most recent ones kept in a bounded in-memory buffer for
//! inspection; nothing is persisted.

use std::collections::VecDeque;
use std::sync::Mutex;

use axum::http::{Method, StatusCode};
use axum::response::Response;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::http::dispatch::RequestContext;
use crate::http::response;
use crate::routing::Params;

const MAX_ENTRIES: usize = 100;
const BODY_LIMIT: usize = 64 * 1024;

/// One error report from a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

/// Bounded buffer of the most recent client error reports.
#[derive(Default)]
pub struct ClientErrorLog {
    entries: Mutex<VecDeque<ClientError>>,
}

impl ClientErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a report, evicting the oldest entry once full.
    pub fn record(&self, error: ClientError) {
        let mut entries = self.entries.lock().expect("client error log mutex poisoned");
        if entries.len() == MAX_ENTRIES {
            entries.pop_front();
        }
        entries.push_back(error);
    }

    /// Snapshot of the buffered reports, oldest first.
    pub fn recent(&self) -> Vec<ClientError> {
        let entries = self.entries.lock().expect("client error log mutex poisoned");
        entries.iter().cloned().collect()
    }
}

/// `POST /api/v1/client-errors` — intake for client-side runtime errors.
pub async fn report(ctx: RequestContext, _params: Params) -> Result<Response, ApiError> {
    if ctx.request.method() != Method::POST {
        return Err(ApiError::NotFound);
    }
    let state = ctx.state;
    let bytes = axum::body::to_bytes(ctx.request.into_body(), BODY_LIMIT)
        .await
        .map_err(|_| ApiError::BadRequest("unreadable body".into()))?;
    let report: ClientError = serde_json::from_slice(&bytes)
        .map_err(|_| ApiError::BadRequest("invalid error report".into()))?;

    tracing::error!(
        message = %report.message,
        platform = report.platform.as_deref().unwrap_or("unknown"),
        "client reported an error"
    );
    state.client_errors.record(report);
    Ok(response::status(StatusCode::OK))
}
