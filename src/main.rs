//! prodsched server entry point
//!
//! Serves the JSON API, Swagger UI and the built dashboard from one process.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::{net::TcpListener, signal};
use tokio_util::sync::CancellationToken;

use prodsched::{Config, create_app, init_tracing};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // reqwest's rustls backend needs a process-wide crypto provider
    let _ = rustls::crypto::ring::default_provider().install_default();

    run_server().await
}

/// Run the HTTP server
async fn run_server() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = dotenvy::dotenv() {
        // Only warn if it's not a "file not found" error
        if !e.not_found() {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Loading also validates; missing keys fail here before anything binds
    let config = Config::load().map_err(|e| {
        std::io::Error::other(format!(
            "Failed to load configuration. Check DATABASE_URL and PRODSCHED__* env vars: {}",
            e
        ))
    })?;

    // Initialize tracing (after config is loaded so we can use logging config)
    init_tracing(&config.logging)?;

    tracing::info!(
        environment = %config.environment,
        "Starting prodsched server"
    );
    tracing::info!(
        "Configuration loaded: server={}:{}",
        config.server.host,
        config.server.port
    );

    // Create application router using shared initialization logic
    let server_host = config.server.host.clone();
    let server_port = config.server.port;
    let enable_docs = config.server.enable_docs;
    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_seconds);

    let app_handle = create_app(config)
        .await
        .map_err(|e| std::io::Error::other(format!("Failed to create application: {:#}", e)))?;

    // Create server address
    let addr = SocketAddr::new(server_host.parse()?, server_port);

    tracing::info!("Server listening on {}", addr);
    if enable_docs {
        tracing::info!("API documentation available at http://{}/docs", addr);
    } else {
        tracing::info!("API documentation disabled");
    }

    // Start server with graceful shutdown
    let listener = TcpListener::bind(addr).await?;
    let shutdown_token = app_handle.shutdown_token;
    let server = axum::serve(listener, app_handle.router)
        .with_graceful_shutdown(shutdown_signal(shutdown_token.clone()))
        .into_future();

    // In-flight requests get shutdown_timeout_seconds to finish
    let drain_deadline = async {
        shutdown_token.cancelled().await;
        tokio::time::sleep(shutdown_timeout).await;
    };

    tokio::select! {
        result = server => result?,
        _ = drain_deadline => {
            tracing::warn!(
                grace_seconds = shutdown_timeout.as_secs(),
                "Grace period elapsed with requests still in flight"
            );
        }
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM and cancel the shared shutdown token
async fn shutdown_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        },
    }

    shutdown_token.cancel();
}
