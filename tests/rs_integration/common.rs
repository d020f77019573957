//! Common utilities for integration tests.
//!
//! Spawns the companion in-process on a free port, with its hosts file and
//! storage redirected into a temporary directory, and provides a small
//! WebSocket client for the room protocol.

use core::{
    sync::atomic::{AtomicU16, Ordering},
    time::Duration,
};
use std::{fs, path::Path, time::Instant};

use clap::Parser as _;
use futures_util::{SinkExt as _, StreamExt as _};
use pomodoro_companion::{ServerEvent, cli::Cli};
use serde_json::Value;
use tempfile::TempDir;
use tokio::{
    net::TcpStream,
    task,
    time::{self, timeout},
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

static NEXT_PORT: AtomicU16 = AtomicU16::new(18000);

pub(crate) fn get_free_port() -> u16 {
    NEXT_PORT.fetch_add(1, Ordering::SeqCst)
}

/// A running companion. Aborts the server task when dropped.
pub(crate) struct Companion {
    pub port: u16,
    dir: TempDir,
    handle: task::JoinHandle<()>,
}

impl Companion {
    /// Directory holding the config, hosts file and storage of this instance.
    pub(crate) fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{path}", self.port)
    }
}

impl Drop for Companion {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Spawn the companion with a config pointing all file access into a fresh temp dir.
pub(crate) async fn spawn_companion() -> Companion {
    let port = get_free_port();
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let config_path = dir.path().join("companion.toml");
    fs::write(
        &config_path,
        format!(
            r#"
        [server]
        port = {port}
        bind = "127.0.0.1"

        [blocking]
        hosts_path = "{}"

        [storage]
        static_dir = "."
        export_path = "./cloud.json"
        "#,
            dir.path().join("hosts").display()
        ),
    )
    .expect("failed to write config");
    fs::write(dir.path().join("hosts"), "127.0.0.1 localhost\n").expect("failed to write hosts");

    let cli = Cli::parse_from([
        "pomodoro_companion",
        "serve",
        "--config",
        config_path.to_str().unwrap(),
    ]);
    let handle = tokio::spawn(async move {
        // SAFETY: This is only used in integration tests and no user-facing code. It just tells the service to log less verbose output.
        unsafe {
            std::env::set_var("POMODORO_INTEGRATION_TEST", "1");
        }
        pomodoro_companion::inner_main(cli)
            .await
            .expect("inner_main failed");
    });
    wait_for_listening(port, 5).await;
    Companion { port, dir, handle }
}

/// Block until a TCP listener is accepting on `127.0.0.1:port` or timeout.
pub(crate) async fn wait_for_listening(port: u16, timeout_secs: u64) {
    let start = Instant::now();
    while TcpStream::connect(("127.0.0.1", port)).await.is_err() {
        assert!(
            start.elapsed() <= Duration::from_secs(timeout_secs),
            "server did not start within timeout"
        );
        time::sleep(Duration::from_millis(100)).await;
    }
}

pub(crate) type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub(crate) async fn connect_ws(companion: &Companion) -> Ws {
    let (ws, _) = connect_async(format!("ws://127.0.0.1:{}/ws", companion.port))
        .await
        .expect("failed to connect websocket");
    ws
}

pub(crate) async fn send_frame(ws: &mut Ws, frame: &Value) {
    ws.send(Message::Text(frame.to_string().into()))
        .await
        .expect("failed to send frame");
}

/// Next event pushed by the server, skipping control frames.
pub(crate) async fn next_event(ws: &mut Ws) -> ServerEvent {
    timeout(Duration::from_secs(5), async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    return serde_json::from_str(&text).expect("server sent invalid event");
                }
                Some(Ok(_)) => {}
                other => panic!("websocket ended unexpectedly: {other:?}"),
            }
        }
    })
    .await
    .expect("timed out waiting for server event")
}

/// Asserts that nothing arrives within a short grace period.
pub(crate) async fn assert_silent(ws: &mut Ws) {
    let next = timeout(Duration::from_millis(300), ws.next()).await;
    assert!(next.is_err(), "expected no event, got {next:?}");
}
