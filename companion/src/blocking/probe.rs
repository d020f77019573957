//! Read-only name resolution, used by the UI to check whether blocking took effect.

use core::net::IpAddr;
use std::collections::{BTreeMap, BTreeSet};

use futures::future;
use tokio::net;
use tracing::debug;

/// Resolves `domain` through the system resolver.
///
/// Every distinct address (v4 and v6) is returned once, sorted. A domain that
/// fails to resolve yields an empty set.
pub async fn resolve(domain: &str) -> BTreeSet<IpAddr> {
    match net::lookup_host((domain, 0)).await {
        Ok(addrs) => addrs.map(|addr| addr.ip()).collect(),
        Err(e) => {
            debug!(%domain, "Resolution failed: {e}");
            BTreeSet::new()
        }
    }
}

/// Resolves every domain concurrently, keyed by domain.
pub async fn resolve_all(domains: &[String]) -> BTreeMap<String, BTreeSet<IpAddr>> {
    let lookups = domains.iter().map(|domain| async move {
        (domain.clone(), resolve(domain).await)
    });
    future::join_all(lookups).await.into_iter().collect()
}
