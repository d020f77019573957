use alloc::sync::Arc;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::{
    blocking::HostsBlocker,
    config::LoadedConfig,
    platform::{NotifierPort, Platform},
    rooms::RoomRegistry,
};

/// Application state shared across request handlers and WebSocket connections.
///
/// The blocking side and the room side share nothing but this struct.
#[derive(Clone)]
pub struct AppState {
    /// Manager of the tagged hosts file region.
    pub blocker: HostsBlocker,

    /// Room membership and relay.
    pub rooms: Arc<RoomRegistry>,

    /// Desktop notification dispatch.
    pub notifier: Arc<dyn NotifierPort>,

    /// Directory `index.html` is served from.
    pub static_dir: PathBuf,

    /// JSON file backing export/import.
    pub export_path: PathBuf,
}

impl AppState {
    /// Builds the state from configuration and the platform capabilities.
    #[must_use]
    pub fn new(loaded: &LoadedConfig, platform: Platform) -> Self {
        Self {
            blocker: HostsBlocker::new(
                loaded.config.blocking.hosts_path.clone(),
                platform.privilege,
                platform.dns_flush,
            ),
            rooms: Arc::new(RoomRegistry::new()),
            notifier: platform.notifier,
            static_dir: loaded.static_dir(),
            export_path: loaded.export_path(),
        }
    }

    /// Emit startup information about optional capabilities.
    pub(super) fn log_capabilities(&self) {
        if self.blocker.is_enabled() {
            info!(hosts = %self.blocker.path().display(), "Hosts blocking ENABLED (running with elevated privileges)");
        } else {
            warn!("Hosts blocking DISABLED (run as root to enable)");
        }
        if !self.static_dir.join("index.html").exists() {
            warn!(static_dir = %self.static_dir.display(), "No index.html found, the web UI will not be served");
        }
    }
}
