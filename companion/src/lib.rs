//! Library entry for the `pomodoro_companion` crate.
//!
//! Exposes `inner_main` so a workspace-level shim binary can call into the service logic.
//!
//! The service keeps timer sessions of several clients in sync over a WebSocket
//! and blocks distracting sites through a tagged region of the system hosts file.
#![cfg_attr(
    test,
    expect(clippy::indexing_slicing, reason = "This is not problematic in tests",)
)]

extern crate alloc;
extern crate core;

pub mod app;
pub mod blocking;
pub mod cli;
pub mod config;
pub mod http;
pub mod platform;
pub mod rooms;
pub mod websocket;

// for use in integration tests
pub use rooms::events::ServerEvent;

use std::{env, sync::Once};

use eyre::Result;
use tracing::{Instrument as _, info};
use tracing_subscriber::{EnvFilter, fmt::time::ChronoLocal};

use cli::{Cli, Command, LogFormat};

static INIT_TRACING: Once = Once::new();

fn init_tracing(log_format: LogFormat) {
    INIT_TRACING.call_once(move || {
        let default_level = if env::var("POMODORO_INTEGRATION_TEST").is_ok() {
            "error"
        } else {
            "info"
        };

        let builder = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
            )
            .with_timer(ChronoLocal::rfc_3339());

        match log_format {
            LogFormat::Compact => builder.compact().init(),
            LogFormat::Json => builder.json().init(),
            LogFormat::Pretty => builder.pretty().init(),
        }
    });
}

/// The service's main function; can be called from a shim binary.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or the server fails to start.
pub async fn inner_main(invocation: Cli) -> Result<()> {
    match invocation.command {
        Command::Serve(args) => {
            init_tracing(args.log_format);

            let startup_span = tracing::info_span!(
                "companion.startup",
                config_path = ?args.config,
                pid = ?std::process::id(),
                version = env!("CARGO_PKG_VERSION")
            );

            async {
                info!("Starting companion service");
                app::start(args.config.as_deref(), args.port, args.bind.as_deref()).await
            }
            .instrument(startup_span)
            .await
        }
    }
}
