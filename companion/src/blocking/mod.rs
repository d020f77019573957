//! Host based site blocking: domain normalization, the hosts file region and resolution checks.

mod domains;
mod hosts;
pub mod probe;

pub use domains::normalize_domains;
pub use hosts::{
    BLOCK_END, BLOCK_START, BlockError, DEFAULT_HOSTS_PATH, HostsBlocker, HostsDocument,
};
