//! Request dispatch.
//!
//! # Responsibilities
//! - Resolve a handler through the score-based route table
//! - Enforce the route's auth policy before the handler body runs
//! - Map handler errors and no-match to the right status codes
//!
//! # Design Decisions
//! - Auth short-circuits with 401 before any handler work
//! - A passing session check slides the session expiry as a side effect
//! - No route match is not an error, just a 404

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::error::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::routing::Params;
use crate::security::session::{cookie_value, session_cookie_name};

/// Who may invoke a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPolicy {
    /// No gate.
    Public,
    /// One of the web/mobile client keys on `x-api-key`.
    ClientKey,
    /// A valid editor session cookie.
    Session,
    /// The automation key on `x-api-key`.
    Automation,
    /// Either a valid session or the automation key.
    SessionOrAutomation,
}

/// Everything a handler needs: shared state plus the raw request.
pub struct RequestContext {
    pub state: AppState,
    pub request: Request<Body>,
}

type HandlerFuture = Pin<Box<dyn Future<Output = Result<Response, ApiError>> + Send>>;

type BoxedHandler = Arc<dyn Fn(RequestContext, Params) -> HandlerFuture + Send + Sync>;

/// One registered route: an auth policy and a boxed async handler.
#[derive(Clone)]
pub struct Route {
    pub auth: AuthPolicy,
    handler: BoxedHandler,
}

impl Route {
    pub fn new<F, Fut>(auth: AuthPolicy, handler: F) -> Self
    where
        F: Fn(RequestContext, Params) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response, ApiError>> + Send + 'static,
    {
        Self {
            auth,
            handler: Arc::new(move |ctx, params| Box::pin(handler(ctx, params))),
        }
    }

    pub fn invoke(&self, ctx: RequestContext, params: Params) -> HandlerFuture {
        (self.handler)(ctx, params)
    }
}

/// Session token from the `Cookie` header, if any.
pub fn session_token<'a>(state: &AppState, headers: &'a HeaderMap) -> Option<&'a str> {
    let name = session_cookie_name(state.config.session.secure_cookies);
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| cookie_value(cookies, name))
}

/// True when the request carries a live editor session. Renews the session.
pub fn has_valid_session(state: &AppState, headers: &HeaderMap) -> bool {
    session_token(state, headers).is_some_and(|token| state.sessions.is_valid(token))
}

fn authorize(state: &AppState, policy: AuthPolicy, headers: &HeaderMap) -> bool {
    match policy {
        AuthPolicy::Public => true,
        AuthPolicy::ClientKey => state.api_keys.is_client(headers),
        AuthPolicy::Session => has_valid_session(state, headers),
        AuthPolicy::Automation => state.api_keys.is_automation(headers),
        AuthPolicy::SessionOrAutomation => {
            has_valid_session(state, headers) || state.api_keys.is_automation(headers)
        }
    }
}

/// Top-level entry point for every request.
pub async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let routes = Arc::clone(&state.routes);
    let Some((route, params)) = routes.lookup(&path) else {
        tracing::debug!(method = %method, path = %path, "no route matched");
        metrics::record_request(&method, 404, start);
        return ApiError::NotFound.into_response();
    };

    if !authorize(&state, route.auth, request.headers()) {
        tracing::debug!(method = %method, path = %path, "unauthorized");
        metrics::record_request(&method, 401, start);
        return ApiError::Unauthorized.into_response();
    }

    let ctx = RequestContext {
        state: state.clone(),
        request,
    };
    let response = match route.invoke(ctx, params).await {
        Ok(response) => response,
        Err(error) => error.into_response(),
    };

    let status = response.status();
    if status == StatusCode::SWITCHING_PROTOCOLS {
        tracing::debug!(path = %path, "connection upgraded");
    }
    metrics::record_request(&method, status.as_u16(), start);
    response
}
