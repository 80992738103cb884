//! HTTP server setup.
//!
//! # Responsibilities
//! - Assemble shared state and the route table
//! - Create the axum router (catch-all into the dispatcher) with middleware
//! - Spawn the lock and session sweep tasks
//! - Serve with graceful shutdown
//!
//! # Design Decisions
//! - axum's own router only provides the transport entry point; all route
//!   resolution happens in the score-based table
//! - Every collaborator is injected through `AppState`; handlers reach
//!   nothing global

use std::sync::Arc;
use std::time::Duration;

use axum::routing::any;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::content::{ContentCache, ContentSource};
use crate::http::client_errors::ClientErrorLog;
use crate::http::dispatch::{self, Route};
use crate::http::routes;
use crate::lifecycle::Shutdown;
use crate::realtime::{BroadcastHub, LockTable, ServerMessage};
use crate::routing::RouteTable;
use crate::security::{ApiKeys, SessionStore};
use crate::translations::TranslationStore;

/// Shared state injected into the dispatcher and every handler.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable<Route>>,
    pub sessions: Arc<SessionStore>,
    pub locks: Arc<LockTable>,
    pub hub: BroadcastHub,
    pub cache: Arc<ContentCache>,
    pub content: Arc<dyn ContentSource>,
    pub translations: Arc<dyn TranslationStore>,
    pub api_keys: Arc<ApiKeys>,
    pub client_errors: Arc<ClientErrorLog>,
    pub config: Arc<AppConfig>,
}

/// The content-and-translations HTTP server.
pub struct HttpServer {
    router: Router,
    state: AppState,
    config: AppConfig,
}

impl HttpServer {
    /// Create a server with its collaborators injected.
    pub fn new(
        config: AppConfig,
        content: Arc<dyn ContentSource>,
        translations: Arc<dyn TranslationStore>,
    ) -> Self {
        let api_keys = ApiKeys::new(
            vec![
                config.keys.web_client_key.clone(),
                config.keys.mobile_client_key.clone(),
            ],
            config.keys.automation_key.clone(),
        );

        let state = AppState {
            routes: Arc::new(routes::route_table()),
            sessions: Arc::new(SessionStore::new(
                config.session.pool_size,
                config.session.cookie_age(),
            )),
            locks: Arc::new(LockTable::new(config.locks.ttl())),
            hub: BroadcastHub::new(),
            cache: Arc::new(ContentCache::new()),
            content,
            translations,
            api_keys: Arc::new(api_keys),
            client_errors: Arc::new(ClientErrorLog::new()),
            config: Arc::new(config.clone()),
        };

        let router = Self::build_router(&config, state.clone());
        Self {
            router,
            state,
            config,
        }
    }

    /// Build the axum router with all middleware layers.
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch::dispatch))
            .route("/", any(dispatch::dispatch))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.listener.request_timeout_secs,
            )))
            .layer(TraceLayer::new_for_http())
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The assembled router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Spawn the background sweeps for expired locks and sessions.
    pub fn spawn_sweeps(&self, shutdown: &Shutdown) {
        let interval = self.config.locks.sweep_interval();

        let locks = Arc::clone(&self.state.locks);
        let hub = self.state.hub.clone();
        let mut rx = shutdown.subscribe();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        // Subscribers learn the key became free even though
                        // nobody sent an explicit release.
                        for key in locks.sweep() {
                            hub.publish(&ServerMessage::Released { key });
                        }
                    }
                    _ = rx.recv() => break,
                }
            }
        });

        let sessions = Arc::clone(&self.state.sessions);
        let mut rx = shutdown.subscribe();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => sessions.sweep(),
                    _ = rx.recv() => break,
                }
            }
        });
    }

    /// Run the server on the given listener until shutdown.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: Arc<Shutdown>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        self.spawn_sweeps(&shutdown);

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Wait for ctrl-c or a programmatic shutdown trigger; make sure the sweep
/// tasks see the signal either way.
async fn shutdown_signal(shutdown: Arc<Shutdown>) {
    let mut rx = shutdown.subscribe();
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(error) = result {
                tracing::error!(%error, "failed to install ctrl-c handler");
            }
            tracing::info!("shutdown signal received");
            shutdown.trigger();
        }
        _ = rx.recv() => {}
    }
}
