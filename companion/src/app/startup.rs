//! Listener setup and server lifecycle.

use core::net::{IpAddr, SocketAddr};
use std::path::Path;

use eyre::WrapErr as _;
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};

use crate::{app::AppState, config::LoadedConfig, http::create_app, platform::Platform};

/// Resolves when SIGTERM (unix) or Ctrl-C is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {e}");
            core::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to create SIGTERM signal handler: {e}");
                core::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = core::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

/// Serves the app on an already bound listener until a shutdown signal arrives.
///
/// # Errors
///
/// Returns an error if the server fails while running.
pub async fn start_with_listener(listener: TcpListener, app_state: AppState) -> eyre::Result<()> {
    app_state.log_capabilities();
    let app = create_app(app_state);

    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            info!("Received shutdown, shutting down");
        })
        .await?;
    Ok(())
}

/// Loads the configuration, binds the listener and runs the service.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded, the bind address
/// is invalid, or the listener cannot be bound.
pub async fn start(
    config_path: Option<&Path>,
    port_override: Option<u16>,
    bind_override: Option<&str>,
) -> eyre::Result<()> {
    let loaded = LoadedConfig::from_optional_path(config_path).await?;

    // Apply optional overrides from CLI/tests
    let listen_port = port_override.unwrap_or(loaded.config.server.port);
    let bind_str = bind_override.unwrap_or(&loaded.config.server.bind);
    let listen_ip: IpAddr = bind_str
        .parse()
        .wrap_err(format!("Invalid bind address: {bind_str}"))?;

    let addr = SocketAddr::from((listen_ip, listen_port));
    let listener = TcpListener::bind(addr)
        .await
        .wrap_err(format!("Failed to bind {addr}"))?;

    let app_state = AppState::new(&loaded, Platform::detect());
    start_with_listener(listener, app_state).await
}
