//! OS capabilities the service relies on, behind injectable ports.
//!
//! Each port has a production implementation and, where the platform lacks
//! the capability, a no-op one. [`Platform::detect`] wires up whatever the
//! current target supports so that the core never branches on the OS itself.

use alloc::sync::Arc;

use futures::future::BoxFuture;
#[cfg(target_os = "macos")]
use std::process::Stdio;

#[cfg(target_os = "macos")]
use tokio::process::Command;
#[cfg(target_os = "macos")]
use tracing::debug;

/// Answers whether the process may modify system owned files such as the hosts file.
pub trait PrivilegePort: Send + Sync {
    fn is_elevated(&self) -> bool;
}

/// Flushes the OS resolver cache. Best-effort: failures are logged, never returned.
pub trait DnsFlushPort: Send + Sync {
    fn flush(&self) -> BoxFuture<'_, ()>;
}

/// Shows a desktop notification. Returns whether the notification was dispatched.
pub trait NotifierPort: Send + Sync {
    fn notify<'call>(&'call self, title: &'call str, body: &'call str) -> BoxFuture<'call, bool>;
}

/// Effective-uid based privilege check.
#[derive(Debug, Clone, Copy, Default)]
pub struct EffectiveUid;

impl PrivilegePort for EffectiveUid {
    #[cfg(unix)]
    fn is_elevated(&self) -> bool {
        nix::unistd::geteuid().is_root()
    }

    #[cfg(not(unix))]
    fn is_elevated(&self) -> bool {
        false
    }
}

/// A privilege answer fixed at construction, for tests and dry runs.
#[derive(Debug, Clone, Copy)]
pub struct FixedPrivilege(pub bool);

impl PrivilegePort for FixedPrivilege {
    fn is_elevated(&self) -> bool {
        self.0
    }
}

/// Does nothing. Used where the platform has no resolver cache we know how to flush.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDnsFlush;

impl DnsFlushPort for NoopDnsFlush {
    fn flush(&self) -> BoxFuture<'_, ()> {
        Box::pin(async {})
    }
}

/// Always reports that no notification was shown.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl NotifierPort for NoopNotifier {
    fn notify<'call>(
        &'call self,
        _title: &'call str,
        _body: &'call str,
    ) -> BoxFuture<'call, bool> {
        Box::pin(async { false })
    }
}

/// Flushes `dscacheutil` and `mDNSResponder` caches.
#[cfg(target_os = "macos")]
#[derive(Debug, Clone, Copy, Default)]
pub struct MacosDnsFlush;

#[cfg(target_os = "macos")]
impl DnsFlushPort for MacosDnsFlush {
    fn flush(&self) -> BoxFuture<'_, ()> {
        Box::pin(async {
            const COMMANDS: [&[&str]; 2] = [
                &["dscacheutil", "-flushcache"],
                &["killall", "-HUP", "mDNSResponder"],
            ];
            for &command in &COMMANDS {
                let Some((program, args)) = command.split_first() else {
                    continue;
                };
                match Command::new(program)
                    .args(args)
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .status()
                    .await
                {
                    Ok(status) => debug!(?command, %status, "DNS flush step finished"),
                    Err(e) => debug!(?command, "DNS flush step failed: {e}"),
                }
            }
        })
    }
}

/// Dispatches notifications through `osascript`.
#[cfg(target_os = "macos")]
#[derive(Debug, Clone, Copy, Default)]
pub struct MacosNotifier;

#[cfg(target_os = "macos")]
impl NotifierPort for MacosNotifier {
    fn notify<'call>(&'call self, title: &'call str, body: &'call str) -> BoxFuture<'call, bool> {
        Box::pin(async move {
            let script = format!(
                "display notification \"{}\" with title \"{}\"",
                applescript_escape(body),
                applescript_escape(title)
            );
            match Command::new("osascript").arg("-e").arg(script).status().await {
                Ok(_) => true,
                Err(e) => {
                    tracing::warn!("Failed to dispatch notification: {e}");
                    false
                }
            }
        })
    }
}

/// Escapes a value for use inside an AppleScript string literal.
#[cfg_attr(
    all(not(target_os = "macos"), not(test)),
    expect(dead_code, reason = "only the macOS notifier builds AppleScript")
)]
fn applescript_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// The set of OS capabilities handed to the application state.
#[derive(Clone)]
pub struct Platform {
    pub privilege: Arc<dyn PrivilegePort>,
    pub dns_flush: Arc<dyn DnsFlushPort>,
    pub notifier: Arc<dyn NotifierPort>,
}

impl Platform {
    /// Capabilities of the platform this binary was built for.
    #[must_use]
    pub fn detect() -> Self {
        #[cfg(target_os = "macos")]
        {
            Self {
                privilege: Arc::new(EffectiveUid),
                dns_flush: Arc::new(MacosDnsFlush),
                notifier: Arc::new(MacosNotifier),
            }
        }
        #[cfg(not(target_os = "macos"))]
        {
            Self {
                privilege: Arc::new(EffectiveUid),
                dns_flush: Arc::new(NoopDnsFlush),
                notifier: Arc::new(NoopNotifier),
            }
        }
    }
}
