//! `shipyard-api` -- dispatch API, client gateway and log relay.
//!
//! Serves `POST /project` on `API_SERVER_PORT` and the WebSocket gateway on
//! `SOCKET_PORT`; the relay feeds the gateway from the message bus. See
//! [`shipyard_api::config`] for the environment variables.

use std::future::IntoFuture;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shipyard_api::config::ApiConfig;
use shipyard_api::dispatch::Dispatcher;
use shipyard_api::relay::LogRelay;
use shipyard_api::router::{build_api_router, build_gateway_router};
use shipyard_api::state::AppState;
use shipyard_api::ws;
use shipyard_cloud::aws::load_sdk_config;
use shipyard_cloud::EcsJobRunner;
use shipyard_events::RedisBus;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shipyard_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ApiConfig::from_env().unwrap_or_else(|e| {
        tracing::error!("{e}");
        std::process::exit(1);
    });
    let server = config.server.clone();
    tracing::info!(
        host = %server.host,
        api_port = server.api_port,
        socket_port = server.socket_port,
        "Loaded server configuration",
    );

    // --- Message bus ---
    let bus = RedisBus::connect(&config.redis_url)
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to connect to the message bus");
            std::process::exit(1);
        });
    let bus = Arc::new(bus);

    // --- Job runner ---
    let sdk_config = load_sdk_config(&config.aws).await;
    let runner = Arc::new(EcsJobRunner::new(&sdk_config, config.placement.clone()));
    let dispatcher = Arc::new(Dispatcher::new(runner, server.proxy_domain.clone()));

    // --- Gateway ---
    // Stops the heartbeat and the relay once the servers are down.
    let background = CancellationToken::new();
    let registry = Arc::new(ws::ChannelRegistry::new());
    let heartbeat_handle = ws::start_heartbeat(
        Arc::clone(&registry),
        ws::HEARTBEAT_INTERVAL,
        background.clone(),
    );

    // --- Relay ---
    let relay_handle = LogRelay::new(bus, Arc::clone(&registry))
        .start(background.clone())
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to subscribe to log topics");
            std::process::exit(1);
        });

    // --- App state ---
    let state = AppState {
        config: Arc::new(server.clone()),
        dispatcher,
        registry: Arc::clone(&registry),
    };

    let api_app = build_api_router(state.clone(), &server);
    let gateway_app = build_gateway_router(state, &server);

    // --- Listeners ---
    let host = server.host.parse::<IpAddr>().unwrap_or_else(|e| {
        tracing::error!(host = %server.host, error = %e, "Invalid HOST address");
        std::process::exit(1);
    });
    let api_listener = bind(SocketAddr::new(host, server.api_port)).await;
    let gateway_listener = bind(SocketAddr::new(host, server.socket_port)).await;

    // Upgraded sockets outlive the HTTP server's graceful shutdown, so they
    // are closed explicitly once the signal arrives.
    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        let registry = Arc::clone(&registry);
        async move {
            shutdown_signal().await;
            registry.shutdown_all().await;
            shutdown.cancel();
        }
    });

    let api_server = axum::serve(api_listener, api_app)
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .into_future();
    let gateway_server = axum::serve(gateway_listener, gateway_app)
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .into_future();

    if let Err(e) = tokio::try_join!(api_server, gateway_server) {
        tracing::error!(error = %e, "Server error");
    }

    // --- Post-shutdown cleanup ---
    tracing::info!("Servers stopped accepting connections, cleaning up");

    background.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), relay_handle).await;
    tracing::info!("Log relay stopped");

    let _ = tokio::time::timeout(Duration::from_secs(5), heartbeat_handle).await;
    tracing::info!("Heartbeat task stopped");

    tracing::info!("Graceful shutdown complete");
}

async fn bind(addr: SocketAddr) -> tokio::net::TcpListener {
    tracing::info!(%addr, "Starting listener");
    tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!(%addr, error = %e, "Failed to bind to address");
            std::process::exit(1);
        })
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
