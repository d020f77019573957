//! Canonicalization of user supplied domain strings.
//!
//! Input comes straight from the web UI, so anything goes: schemes, paths,
//! mixed case, stray whitespace. Output is the ordered, deduplicated list of
//! hostnames that ends up in the hosts file, each bare domain followed by its
//! `www.` variant.

use std::collections::HashSet;

const WWW_PREFIX: &str = "www.";

/// Reduces a single raw entry to its bare hostname.
///
/// Returns `None` when nothing usable is left.
fn canonicalize(raw: &str) -> Option<String> {
    let lowered = raw.trim().to_lowercase();
    let without_scheme = lowered
        .strip_prefix("http://")
        .or_else(|| lowered.strip_prefix("https://"))
        .unwrap_or(&lowered);
    let host = without_scheme
        .split_once('/')
        .map_or(without_scheme, |(host, _path)| host);

    (!host.is_empty()).then(|| host.to_owned())
}

/// Expands raw domain entries into the canonical, deduplicated block list.
///
/// Every usable entry yields itself and, unless it already starts with `www.`,
/// a `www.`-prefixed variant. Duplicates are dropped keeping the first
/// occurrence, across the whole expanded sequence. Unusable entries are skipped
/// silently.
pub fn normalize_domains<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let expanded = raw
        .into_iter()
        .filter_map(|entry| canonicalize(entry.as_ref()))
        .flat_map(|host| {
            let www = (!host.starts_with(WWW_PREFIX)).then(|| format!("{WWW_PREFIX}{host}"));
            core::iter::once(host).chain(www)
        });

    let mut seen = HashSet::new();
    expanded.filter(|host| seen.insert(host.clone())).collect()
}
