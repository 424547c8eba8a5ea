use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::post;
use log::{debug, error, info};
use tokio::net::TcpListener;

use crate::cleanup::RetentionSweeper;
use crate::clock::{Clock, SystemClock};
use crate::config::ServerConfig;
use crate::handlers;
use crate::limiter::ClientLimiterStore;
use crate::middleware::{log_requests, rate_limit};
use crate::rpc::RpcClient;
use crate::tasks::PeriodicTask;

/// Shared state handed to every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub limiter: Arc<ClientLimiterStore>,
    pub rpc: Arc<RpcClient>,
    pub clock: Arc<dyn Clock>,
}

pub struct Server {
    listener: TcpListener,
    state: AppState,
}

impl Server {
    pub async fn new(config: ServerConfig) -> Self {
        let config = Arc::new(config);

        // The build toolchain is an external requirement; refusing to start
        // without it beats failing every provisioning request later.
        let toolchain_dir = Path::new(&config.toolchain.directory);
        if !toolchain_dir.is_dir() {
            error!(
                "Toolchain directory not found: {}",
                config.toolchain.directory
            );
            panic!(
                "Server startup failed: toolchain directory {} does not exist",
                config.toolchain.directory
            );
        }
        info!(
            "Toolchain directory check passed: {}",
            config.toolchain.directory
        );

        let addr = config.server.socket_addr();
        let listener = match TcpListener::bind(&addr).await {
            Ok(listener) => {
                info!("Server bound to {}", addr);
                listener
            }
            Err(e) => {
                error!("Failed to bind to {}: {}", addr, e);
                panic!("Server startup failed on socket {}: {}", addr, e);
            }
        };

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let limiter = Arc::new(ClientLimiterStore::new(&config.limiter, Arc::clone(&clock)));
        let rpc = match RpcClient::new(&config.rpc) {
            Ok(client) => Arc::new(client),
            Err(e) => {
                error!("Failed to build RPC client: {}", e);
                panic!("Server startup failed building the RPC client: {}", e);
            }
        };

        Self {
            listener,
            state: AppState {
                config,
                limiter,
                rpc,
                clock,
            },
        }
    }

    /// Builds the API router over the given state.
    ///
    /// Kept separate from `start` so tests can serve the router on an
    /// ephemeral socket with a state of their own making.
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route(
                "/api/token/add",
                post(handlers::add_token)
                    .layer(middleware::from_fn_with_state(state.clone(), rate_limit)),
            )
            .route("/api/token/publish", post(handlers::publish_token))
            .layer(middleware::from_fn(log_requests))
            .with_state(state)
    }

    pub async fn start(self) {
        let config = Arc::clone(&self.state.config);

        info!(
            "Starting cleanup task: every {} minutes, retaining working directories for {} minutes",
            config.cleanup.interval_minutes, config.cleanup.retention_minutes
        );
        let sweeper = Arc::new(RetentionSweeper::new(
            &config.template.template_path(),
            config.cleanup.retention(),
            Arc::clone(&self.state.clock),
        ));
        let _cleanup_task =
            PeriodicTask::spawn("cleanup", config.cleanup.interval(), true, move || {
                let sweeper = Arc::clone(&sweeper);
                async move {
                    sweeper.sweep();
                }
            });

        let limiter = Arc::clone(&self.state.limiter);
        let _eviction_task = PeriodicTask::spawn(
            "limiter-eviction",
            config.limiter.eviction_interval(),
            false,
            move || {
                let limiter = Arc::clone(&limiter);
                async move {
                    let evicted = limiter.evict_idle();
                    if evicted > 0 {
                        debug!("Evicted {} idle limiter entries", evicted);
                    }
                }
            },
        );

        info!(
            "Starting token forge server on {} ({}/s, {}/min tokens per client)",
            config.server.socket_addr(),
            config.limiter.second_tokens,
            config.limiter.minute_tokens
        );

        let app = Self::router(self.state.clone());
        if let Err(e) = axum::serve(
            self.listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        {
            error!("Server error: {}", e);
        }
    }
}
