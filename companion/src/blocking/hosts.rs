//! Ownership of the tagged region inside the system hosts file.
//!
//! The region is delimited by [`BLOCK_START`] and [`BLOCK_END`]. Everything
//! between (and including) the markers belongs to this service and is replaced
//! wholesale on every apply; everything outside is preserved byte for byte.
//!
//! Nothing is cached between calls: each apply/clear reads the file, rewrites
//! it and lets go of it. Concurrent calls are not serialized, the last writer
//! wins.

use alloc::sync::Arc;
use core::fmt::Write as _;
use std::{
    io,
    path::{Path, PathBuf},
};

use thiserror::Error as ThisError;
use tokio::fs;
use tracing::{info, warn};

use crate::{
    blocking::normalize_domains,
    platform::{DnsFlushPort, PrivilegePort},
};

/// Opening marker line of the owned region.
pub const BLOCK_START: &str = "# === ULTRA_POMODORO_BLOCK_START ===";
/// Closing marker line of the owned region.
pub const BLOCK_END: &str = "# === ULTRA_POMODORO_BLOCK_END ===";

/// Default location of the system hosts file.
pub const DEFAULT_HOSTS_PATH: &str = "/etc/hosts";

/// Failures of apply/clear.
#[derive(Debug, ThisError)]
pub enum BlockError {
    /// The process lacks the privilege to touch the hosts file. Raised before any file access.
    #[error("elevated privileges are required to modify the hosts file")]
    Permission,
    /// Reading or writing the hosts file failed after the privilege check passed.
    #[error("failed to update the hosts file: {0}")]
    WriteFailed(#[source] io::Error),
}

impl BlockError {
    /// Stable identifier used on the wire.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match *self {
            Self::Permission => "permission",
            Self::WriteFailed(_) => "write_failed",
        }
    }
}

/// A hosts document split around the owned region.
///
/// Works on raw bytes: the markers are ASCII, and whatever else the file
/// holds (including bytes that are not UTF-8) is carried through untouched.
///
/// A lone marker (start without end, or end without start) does not form a
/// block. Such a document is treated as all preamble and left as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostsDocument {
    preamble: Vec<u8>,
    block: Option<Vec<u8>>,
    postamble: Vec<u8>,
}

fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

fn rfind_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).rposition(|window| window == needle)
}

/// Locates the first complete block in `text`, returning its byte range.
///
/// Each end marker pairs with the nearest start marker before it, so an
/// orphaned start marker never swallows the lines between it and a later
/// block. The range covers the start marker through the end marker plus the
/// line break directly following it, if any.
fn find_block(text: &[u8]) -> Option<(usize, usize)> {
    let mut from = 0;
    loop {
        let end_marker = from + find_bytes(text.get(from..)?, BLOCK_END.as_bytes())?;
        let scanned = text.get(from..end_marker)?;
        if let Some(offset) = rfind_bytes(scanned, BLOCK_START.as_bytes()) {
            let mut end = end_marker + BLOCK_END.len();
            if text.get(end) == Some(&b'\n') {
                end += 1;
            }
            return Some((from + offset, end));
        }
        // end marker without a start: not a block, keep looking after it
        from = end_marker + BLOCK_END.len();
    }
}

impl HostsDocument {
    /// Splits `text` around its tagged block.
    #[must_use]
    pub fn parse(text: &[u8]) -> Self {
        match find_block(text) {
            Some((start, end)) => Self {
                preamble: text.get(..start).unwrap_or_default().to_vec(),
                block: text.get(start..end).map(<[u8]>::to_vec),
                postamble: text.get(end..).unwrap_or_default().to_vec(),
            },
            None => Self {
                preamble: text.to_vec(),
                block: None,
                postamble: Vec::new(),
            },
        }
    }

    /// Whether a complete tagged block was found.
    #[must_use]
    pub const fn has_block(&self) -> bool {
        self.block.is_some()
    }

    /// Content outside the owned region.
    ///
    /// Hand edited files may carry more than one block; all of them go.
    #[must_use]
    pub fn without_block(&self) -> Vec<u8> {
        let mut rest = self.postamble.clone();
        while let Some((start, end)) = find_block(&rest) {
            rest.drain(start..end);
        }
        let mut text = self.preamble.clone();
        text.extend_from_slice(&rest);
        text
    }

    /// Renders the owned region for the given, already normalized, domains.
    #[must_use]
    pub fn render_block(domains: &[String]) -> String {
        let mut block = format!("{BLOCK_START}\n");
        for domain in domains {
            // writing into a String cannot fail
            drop(writeln!(block, "127.0.0.1 {domain}"));
            drop(writeln!(block, "::1 {domain}"));
        }
        block.push_str(BLOCK_END);
        block.push('\n');
        block
    }

    /// Document text with any previous block replaced by a fresh one at the end.
    #[must_use]
    pub fn with_block(&self, domains: &[String]) -> Vec<u8> {
        let mut text = self.without_block();
        if text.last().is_some_and(|&last| last != b'\n') {
            text.push(b'\n');
        }
        text.extend_from_slice(Self::render_block(domains).as_bytes());
        text
    }
}

/// Applies and clears the tagged region of a hosts file.
///
/// Stateless apart from the file location and the OS capability ports.
#[derive(Clone)]
pub struct HostsBlocker {
    path: PathBuf,
    privilege: Arc<dyn PrivilegePort>,
    dns_flush: Arc<dyn DnsFlushPort>,
}

impl HostsBlocker {
    #[must_use]
    pub fn new(
        path: impl Into<PathBuf>,
        privilege: Arc<dyn PrivilegePort>,
        dns_flush: Arc<dyn DnsFlushPort>,
    ) -> Self {
        Self {
            path: path.into(),
            privilege,
            dns_flush,
        }
    }

    /// Location of the managed hosts file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether apply/clear would pass the privilege check right now.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.privilege.is_elevated()
    }

    /// Reads the current document. A missing file counts as empty.
    ///
    /// Any other read failure aborts the update: writing back a document that
    /// could not be read would wipe the entries around the block.
    async fn read(&self) -> Result<Vec<u8>, BlockError> {
        match fs::read(&self.path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(path = %self.path.display(), "Hosts file does not exist, starting from an empty document");
                Ok(Vec::new())
            }
            Err(e) => {
                warn!(path = %self.path.display(), "Failed to read hosts file, leaving it untouched: {e}");
                Err(BlockError::WriteFailed(e))
            }
        }
    }

    async fn write(&self, text: &[u8]) -> Result<(), BlockError> {
        fs::write(&self.path, text)
            .await
            .map_err(BlockError::WriteFailed)
    }

    /// Replaces the tagged block with one covering `domains`.
    ///
    /// Returns the normalized domain list that was written.
    ///
    /// # Errors
    ///
    /// [`BlockError::Permission`] without elevated privileges (the file is not
    /// touched), [`BlockError::WriteFailed`] if the file cannot be read or
    /// written.
    pub async fn apply<I, S>(&self, domains: I) -> Result<Vec<String>, BlockError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if !self.privilege.is_elevated() {
            return Err(BlockError::Permission);
        }

        let domains = normalize_domains(domains);
        let document = HostsDocument::parse(&self.read().await?);
        self.write(&document.with_block(&domains)).await?;
        info!(count = domains.len(), path = %self.path.display(), "Applied hosts block");

        self.dns_flush.flush().await;
        Ok(domains)
    }

    /// Removes the tagged block. Succeeds when there was none.
    ///
    /// # Errors
    ///
    /// Same as [`Self::apply`].
    pub async fn clear(&self) -> Result<(), BlockError> {
        if !self.privilege.is_elevated() {
            return Err(BlockError::Permission);
        }

        let document = HostsDocument::parse(&self.read().await?);
        self.write(&document.without_block()).await?;
        info!(path = %self.path.display(), "Cleared hosts block");

        self.dns_flush.flush().await;
        Ok(())
    }

    /// Flushes the resolver cache without touching the hosts file.
    pub async fn flush(&self) {
        self.dns_flush.flush().await;
    }
}
